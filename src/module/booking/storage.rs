use crate::constants::RECONNECT_INTERVAL;
use crate::domain::{Amount, Reservation, ReservationId, ReservationStatus};
use crate::library::BoxedError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::warn;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::time::sleep;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS reservations (
    reservation_id TEXT PRIMARY KEY,
    user_id        TEXT NOT NULL,
    amount_cents   BIGINT NOT NULL,
    status         TEXT NOT NULL,
    created_at     TIMESTAMPTZ NOT NULL,
    updated_at     TIMESTAMPTZ NOT NULL
)";

/// Persistent storage of reservations keyed by their identifier
#[async_trait]
pub trait ReservationStore {
    /// Inserts a freshly created reservation
    async fn insert(&self, reservation: &Reservation) -> Result<(), BoxedError>;

    /// Retrieves a reservation, `None` if the identifier is unknown
    async fn fetch(&self, id: ReservationId) -> Result<Option<Reservation>, BoxedError>;

    /// Moves a reservation to a new status
    ///
    /// Returns whether a reservation with the given identifier existed.
    async fn update_status(
        &self,
        id: ReservationId,
        status: ReservationStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, BoxedError>;
}

/// [`ReservationStore`] implementation backed by Postgres
pub struct PostgresReservationStore {
    pool: PgPool,
}

impl PostgresReservationStore {
    /// Connects to the given database and bootstraps the schema
    ///
    /// Retries at a fixed interval until the database accepts connections; the module
    /// startup timeout bounds how long this may take overall.
    pub async fn connect(url: &str) -> Result<Self, BoxedError> {
        let pool = loop {
            match PgPoolOptions::new().max_connections(5).connect(url).await {
                Ok(pool) => break pool,
                Err(e) => warn!("Failed to connect to database: {}", e),
            }

            sleep(RECONNECT_INTERVAL).await;
        };

        sqlx::query(SCHEMA).execute(&pool).await?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl ReservationStore for PostgresReservationStore {
    async fn insert(&self, reservation: &Reservation) -> Result<(), BoxedError> {
        sqlx::query(
            "INSERT INTO reservations (reservation_id, user_id, amount_cents, status, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(reservation.reservation_id.to_string())
        .bind(&reservation.user_id)
        .bind(reservation.amount.cents())
        .bind(reservation.status.as_str())
        .bind(reservation.created_at)
        .bind(reservation.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn fetch(&self, id: ReservationId) -> Result<Option<Reservation>, BoxedError> {
        let row = sqlx::query(
            "SELECT user_id, amount_cents, status, created_at, updated_at \
             FROM reservations WHERE reservation_id = $1",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        let row = match row {
            Some(row) => row,
            None => return Ok(None),
        };

        let status: String = row.try_get("status")?;

        Ok(Some(Reservation {
            reservation_id: id,
            user_id: row.try_get("user_id")?,
            amount: Amount::from_cents(row.try_get("amount_cents")?),
            status: status.parse()?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        }))
    }

    async fn update_status(
        &self,
        id: ReservationId,
        status: ReservationStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, BoxedError> {
        let result = sqlx::query(
            "UPDATE reservations SET status = $1, updated_at = $2 WHERE reservation_id = $3",
        )
        .bind(status.as_str())
        .bind(updated_at)
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// In-memory [`ReservationStore`] implementation for tests
#[derive(Default)]
pub struct MemoryReservationStore {
    reservations: Mutex<HashMap<ReservationId, Reservation>>,
}

impl MemoryReservationStore {
    /// Creates an instance already containing the given reservations
    pub fn preloaded(reservations: impl IntoIterator<Item = Reservation>) -> Self {
        Self {
            reservations: Mutex::new(
                reservations
                    .into_iter()
                    .map(|r| (r.reservation_id, r))
                    .collect(),
            ),
        }
    }
}

#[async_trait]
impl ReservationStore for MemoryReservationStore {
    async fn insert(&self, reservation: &Reservation) -> Result<(), BoxedError> {
        self.reservations
            .lock()
            .unwrap()
            .insert(reservation.reservation_id, reservation.clone());
        Ok(())
    }

    async fn fetch(&self, id: ReservationId) -> Result<Option<Reservation>, BoxedError> {
        Ok(self.reservations.lock().unwrap().get(&id).cloned())
    }

    async fn update_status(
        &self,
        id: ReservationId,
        status: ReservationStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, BoxedError> {
        match self.reservations.lock().unwrap().get_mut(&id) {
            Some(reservation) => {
                reservation.status = status;
                reservation.updated_at = updated_at;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
