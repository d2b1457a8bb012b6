use super::super::super::EmptyResult;
use super::{Address, Notification};
use async_trait::async_trait;

/// Structure which allows publishing of serialized data to an [`Address`]
#[async_trait]
pub trait RawNotificationPublisher {
    /// Sends an opaque payload to the given address
    async fn publish_raw(&self, data: &[u8], address: Address) -> EmptyResult;
}

/// Publisher for [`Notifications`](Notification)
#[async_trait]
pub trait NotificationPublisher {
    /// Publishes a [`Notification`] to its designated address
    async fn publish<N: Notification + Send + Sync>(&self, notification: &N) -> EmptyResult;

    /// Publishes a [`Notification`] to an explicit address, overriding its designated one
    async fn publish_to<N: Notification + Send + Sync>(
        &self,
        address: Address,
        notification: &N,
    ) -> EmptyResult;
}
