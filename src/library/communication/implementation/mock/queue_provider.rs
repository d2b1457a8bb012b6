use crate::library::communication::event::{
    QueueDescriptor, QueueProvider, RawQueueEntry,
};
use crate::library::communication::implementation::json::JsonQueueEntry;
use crate::library::{BoxedError, EmptyResult};
use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Single scripted delivery handed out by the [`MockQueueProvider`]
pub struct MockQueueEntry {
    payload: Vec<u8>,
    acknowledgements: Arc<AtomicUsize>,
}

#[async_trait]
impl RawQueueEntry for MockQueueEntry {
    fn payload(&self) -> &[u8] {
        &self.payload
    }

    async fn acknowledge(&mut self) -> EmptyResult {
        self.acknowledgements.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl JsonQueueEntry for MockQueueEntry {}

/// [`QueueProvider`] implementation replaying scripted payloads
///
/// The stream ends once all payloads have been handed out.
#[derive(Clone, Default)]
pub struct MockQueueProvider {
    payloads: Arc<Mutex<VecDeque<Vec<u8>>>>,
    acknowledgements: Arc<AtomicUsize>,
}

impl MockQueueProvider {
    /// Creates an instance handing out the given payloads in order
    pub fn preloaded<I, P>(payloads: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Vec<u8>>,
    {
        Self {
            payloads: Arc::new(Mutex::new(payloads.into_iter().map(Into::into).collect())),
            acknowledgements: Default::default(),
        }
    }

    /// Number of entries that have been acknowledged so far
    pub fn acknowledgement_count(&self) -> usize {
        self.acknowledgements.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QueueProvider for MockQueueProvider {
    type Entry = MockQueueEntry;

    async fn consume(
        &self,
        _queue: QueueDescriptor,
    ) -> Result<BoxStream<'static, Result<Self::Entry, BoxedError>>, BoxedError> {
        let acknowledgements = self.acknowledgements.clone();
        let payloads: Vec<_> = self.payloads.lock().unwrap().drain(..).collect();

        let entries = payloads.into_iter().map(move |payload| {
            Ok(MockQueueEntry {
                payload,
                acknowledgements: acknowledgements.clone(),
            })
        });

        Ok(futures::stream::iter(entries).boxed())
    }
}
