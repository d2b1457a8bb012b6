use crate::domain::event::PaymentEvent;
use crate::domain::{Amount, Reservation, ReservationStatus};
use crate::library::communication::event::NotificationPublisher;
use crate::module::booking::ReservationStore;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;
use log::warn;
use serde::Deserialize;
use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;
use uuid::Uuid;
use warp::http::StatusCode;
use warp::hyper::body::Bytes;
use warp::{Filter, Rejection, Reply};

use crate::library::scheduling::{Job, TaskManager};

const MAX_BODY_SIZE: u64 = 1024 * 16;

fn default_user_id() -> String {
    "anon".into()
}

fn default_amount() -> Amount {
    Amount::from_cents(10_000)
}

/// Body of a reservation creation request, all fields optional
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateReservationRequest {
    #[serde(default = "default_user_id")]
    user_id: String,
    #[serde(default = "default_amount")]
    amount: Amount,
}

impl Default for CreateReservationRequest {
    fn default() -> Self {
        Self {
            user_id: default_user_id(),
            amount: default_amount(),
        }
    }
}

/// Job serving the public reservation API
///
/// Creating a reservation persists it in `PENDING_PAYMENT` and kicks off the
/// payment saga by publishing a [`PaymentEvent::PaymentRequested`].
pub struct ApiServerJob<S, P> {
    port: u16,
    store: Arc<S>,
    publisher: P,
}

impl<S, P> ApiServerJob<S, P> {
    /// Creates a new instance from raw parts
    pub fn new(port: u16, store: Arc<S>, publisher: P) -> Self {
        Self {
            port,
            store,
            publisher,
        }
    }
}

#[async_trait]
impl<S, P> Job for ApiServerJob<S, P>
where
    S: ReservationStore + Send + Sync + 'static,
    P: NotificationPublisher + Clone + Send + Sync + 'static,
{
    fn name(&self) -> String {
        "ApiServerJob".into()
    }

    fn supports_graceful_termination(&self) -> bool {
        true
    }

    async fn execute(&self, manager: TaskManager) -> Result<()> {
        let routes = routes(self.store.clone(), self.publisher.clone());

        let signal_manager = manager.clone();
        let (_, server) = warp::serve(routes)
            .try_bind_with_graceful_shutdown(([0, 0, 0, 0], self.port), async move {
                signal_manager.termination_signal().await
            })
            .map_err(|e| anyhow!(e))?;

        manager.ready().await;
        server.await;

        Ok(())
    }
}

fn routes<S, P>(
    store: Arc<S>,
    publisher: P,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone
where
    S: ReservationStore + Send + Sync + 'static,
    P: NotificationPublisher + Clone + Send + Sync + 'static,
{
    let create = warp::path!("reservations")
        .and(warp::post())
        .and(lenient_json_body())
        .and(with_state(store.clone()))
        .and(with_state(publisher))
        .and_then(create_reservation);

    let fetch = warp::path!("reservations" / Uuid)
        .and(warp::get())
        .and(with_state(store))
        .and_then(fetch_reservation);

    let health = warp::path!("health")
        .and(warp::get())
        .map(|| warp::reply::json(&json!({ "status": "ok" })));

    create.or(fetch).or(health)
}

/// Parses the request body as JSON, falling back to defaults for absent or broken bodies
fn lenient_json_body(
) -> impl Filter<Extract = (CreateReservationRequest,), Error = Rejection> + Clone {
    warp::body::content_length_limit(MAX_BODY_SIZE)
        .and(warp::body::bytes())
        .map(|body: Bytes| serde_json::from_slice(&body).unwrap_or_default())
}

fn with_state<T: Clone + Send>(
    value: T,
) -> impl Filter<Extract = (T,), Error = Infallible> + Clone {
    warp::any().map(move || value.clone())
}

async fn create_reservation<S, P>(
    request: CreateReservationRequest,
    store: Arc<S>,
    publisher: P,
) -> Result<impl Reply, Infallible>
where
    S: ReservationStore + Send + Sync,
    P: NotificationPublisher + Send + Sync,
{
    let now = Utc::now();
    let reservation = Reservation {
        reservation_id: Uuid::new_v4(),
        user_id: request.user_id,
        amount: request.amount,
        status: ReservationStatus::PendingPayment,
        created_at: now,
        updated_at: now,
    };

    if let Err(e) = store.insert(&reservation).await {
        warn!("Failed to persist reservation: {}", e);
        return Ok(error_reply(StatusCode::INTERNAL_SERVER_ERROR));
    }

    let event = PaymentEvent::PaymentRequested {
        reservation_id: reservation.reservation_id,
        user_id: reservation.user_id.clone(),
        amount: reservation.amount,
        correlation_id: Some(reservation.reservation_id),
        timestamp: now,
    };

    if let Err(e) = publisher.publish(&event).await {
        warn!("Failed to publish payment request: {}", e);
        return Ok(error_reply(StatusCode::INTERNAL_SERVER_ERROR));
    }

    Ok(warp::reply::with_status(
        warp::reply::json(&reservation),
        StatusCode::ACCEPTED,
    ))
}

async fn fetch_reservation<S>(id: Uuid, store: Arc<S>) -> Result<impl Reply, Infallible>
where
    S: ReservationStore + Send + Sync,
{
    match store.fetch(id).await {
        Ok(Some(reservation)) => Ok(warp::reply::with_status(
            warp::reply::json(&reservation),
            StatusCode::OK,
        )),
        Ok(None) => Ok(error_reply(StatusCode::NOT_FOUND)),
        Err(e) => {
            warn!("Failed to fetch reservation {}: {}", id, e);
            Ok(error_reply(StatusCode::INTERNAL_SERVER_ERROR))
        }
    }
}

fn error_reply(status: StatusCode) -> warp::reply::WithStatus<warp::reply::Json> {
    let reason = status.canonical_reason().unwrap_or("unknown");
    warp::reply::with_status(warp::reply::json(&json!({ "error": reason })), status)
}

#[cfg(test)]
mod does {
    use super::*;
    use crate::domain::ReservationId;
    use crate::library::communication::implementation::mock::MockCommunicationFactory;
    use crate::library::communication::CommunicationFactory;
    use crate::module::booking::MemoryReservationStore;

    fn pending_reservation(id: ReservationId) -> Reservation {
        let now = Utc::now();
        Reservation {
            reservation_id: id,
            user_id: "alice".into(),
            amount: Amount::from_cents(25_000),
            status: ReservationStatus::PendingPayment,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn accept_new_reservations() {
        let store = Arc::new(MemoryReservationStore::default());
        let factory = MockCommunicationFactory::ignoring();

        let request = CreateReservationRequest {
            user_id: "alice".into(),
            amount: Amount::from_cents(25_000),
        };

        let reply = create_reservation(request, store, factory.notification_publisher())
            .await
            .unwrap();

        assert_eq!(reply.into_response().status(), StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn persist_reservations_as_pending() {
        let store = Arc::new(MemoryReservationStore::default());
        let factory = MockCommunicationFactory::ignoring();

        let reply = create_reservation(
            CreateReservationRequest::default(),
            store.clone(),
            factory.notification_publisher(),
        )
        .await
        .unwrap();

        let response = reply.into_response();
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        let body = warp::hyper::body::to_bytes(response.into_body())
            .await
            .unwrap();
        let reservation: Reservation = serde_json::from_slice(&body).unwrap();

        assert_eq!(reservation.user_id, "anon");
        assert_eq!(reservation.amount, Amount::from_cents(10_000));
        assert_eq!(reservation.status, ReservationStatus::PendingPayment);

        let stored = store
            .fetch(reservation.reservation_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, ReservationStatus::PendingPayment);
    }

    #[tokio::test]
    async fn return_stored_reservations() {
        let id = Uuid::new_v4();
        let store = Arc::new(MemoryReservationStore::preloaded([pending_reservation(id)]));

        let reply = fetch_reservation(id, store).await.unwrap();
        assert_eq!(reply.into_response().status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn reject_unknown_reservations() {
        let store = Arc::new(MemoryReservationStore::default());

        let reply = fetch_reservation(Uuid::new_v4(), store).await.unwrap();
        assert_eq!(reply.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn fall_back_to_defaults_for_broken_bodies() {
        let request: CreateReservationRequest =
            serde_json::from_slice(b"{}").unwrap_or_default();
        assert_eq!(request.user_id, "anon");
        assert_eq!(request.amount, Amount::from_cents(10_000));

        let request: CreateReservationRequest =
            serde_json::from_slice(b"not json").unwrap_or_default();
        assert_eq!(request.user_id, "anon");
    }
}
