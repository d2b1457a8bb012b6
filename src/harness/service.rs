use crate::library::communication::event::ConsumerExt;
use crate::library::communication::implementation::amqp::AmqpCommunicationFactory;
use crate::library::communication::CommunicationFactory;
use crate::library::scheduling::{Job, TaskManager};
use anyhow::{anyhow, Result};
use async_trait::async_trait;

/// Structure which can be instantiated with a [`CommunicationFactory`]
pub trait Service<F: CommunicationFactory + Send + Sync> {
    /// Name of the service displayed in log messages
    const NAME: &'static str;
    /// Instance type which will be instantiated
    type Instance: Send + Sync;
    /// Configuration type passed to the service
    type Config: Send + Sync;

    /// Creates a new instance which could be of a different type
    fn instantiate(factory: F, config: &Self::Config) -> Self::Instance;
}

/// Runner for [`Service`] implementations where [`Service::Instance`] conforms to the
/// [`ConsumerExt`] trait
///
/// Connects the service to the bus and keeps it consuming until the process shuts down.
/// A lost connection makes the consumption loop return an error which restarts this job.
pub struct ServiceRunner<S: Service<AmqpCommunicationFactory>> {
    factory: AmqpCommunicationFactory,
    config: <S as Service<AmqpCommunicationFactory>>::Config,
}

impl<S> ServiceRunner<S>
where
    S: Service<AmqpCommunicationFactory>,
    S::Instance: ConsumerExt + Send + Sync,
{
    /// Creates a new runner job on top of the given factory
    pub fn new(
        factory: AmqpCommunicationFactory,
        config: <S as Service<AmqpCommunicationFactory>>::Config,
    ) -> Self {
        Self { factory, config }
    }
}

#[async_trait]
impl<S> Job for ServiceRunner<S>
where
    S: Service<AmqpCommunicationFactory> + Send + Sync,
    S::Instance: ConsumerExt,
{
    fn name(&self) -> String {
        format!("ServiceRunner({})", S::NAME)
    }

    fn supports_graceful_termination(&self) -> bool {
        true
    }

    async fn execute(&self, manager: TaskManager) -> Result<()> {
        let provider = self.factory.queue_provider();
        let service = S::instantiate(self.factory.clone(), &self.config);

        manager.ready().await;

        tokio::select! {
            result = service.consume_queue(provider) => result.map_err(|e| anyhow!(e))?,
            _ = manager.termination_signal() => {}
        }

        Ok(())
    }
}
