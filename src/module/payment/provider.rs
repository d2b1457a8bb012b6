use crate::domain::Amount;
use async_trait::async_trait;
use hyper::client::HttpConnector;
use hyper::header::CONTENT_TYPE;
use hyper::{Body, Client, Method, Request};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;

/// Failure modes of a charge attempt
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider answered with a non-success status code
    #[error("provider rejected the charge with status {0}")]
    Status(u16),
    /// The request never made it to the provider
    #[error("transport failure: {0}")]
    Transport(#[from] hyper::Error),
    /// The charge request could not be constructed
    #[error("malformed provider request: {0}")]
    Request(#[from] hyper::http::Error),
    /// The provider did not answer in time
    #[error("provider did not answer within {0:?}")]
    Timeout(Duration),
}

/// External system charging the actual money
#[async_trait]
pub trait PaymentProvider {
    /// Attempts to charge the given amount, any error counts as a failed attempt
    async fn charge(&self, amount: Amount) -> Result<(), ProviderError>;
}

/// [`PaymentProvider`] implementation talking to an HTTP charge endpoint
///
/// Every request is bounded by a timeout since the breaker can only count
/// outcomes, not calls that never return.
pub struct HttpPaymentProvider {
    client: Client<HttpConnector>,
    url: String,
    timeout: Duration,
}

impl HttpPaymentProvider {
    /// Creates a new instance charging against the given endpoint
    pub fn new(url: &str, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            url: url.to_owned(),
            timeout,
        }
    }
}

#[async_trait]
impl PaymentProvider for HttpPaymentProvider {
    async fn charge(&self, amount: Amount) -> Result<(), ProviderError> {
        let request = Request::builder()
            .method(Method::POST)
            .uri(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json!({ "amount": amount }).to_string()))?;

        let response = timeout(self.timeout, self.client.request(request))
            .await
            .map_err(|_| ProviderError::Timeout(self.timeout))??;

        match response.status() {
            status if status.is_success() => Ok(()),
            status => Err(ProviderError::Status(status.as_u16())),
        }
    }
}
