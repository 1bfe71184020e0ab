//! Events flowing out of readers and providers.

use dashcore::Header as BlockHeader;
use tokio::sync::{broadcast, oneshot};

use crate::error::{ChainError, SyncError};
use crate::types::HeaderBatch;

/// Buffered events per subscriber. Historical runs emit one `ChainUpdated`
/// per delivered batch, so the buffer absorbs bursts while a consumer is
/// busy; beyond that the oldest events are shed.
const PROVIDER_EVENT_BUFFER: usize = 256;

/// One-shot capability to reject a delivered batch.
///
/// Dropping the confirmer accepts the batch. Calling
/// [`reject`](Self::reject) destroys the delivering stream with the given
/// error; the stream's normal error path then decides between retry and
/// failure. The capability is consumed either way, so a batch cannot be
/// answered twice.
#[derive(Debug)]
pub struct BatchConfirmer {
    reply: Option<oneshot::Sender<ChainError>>,
}

impl BatchConfirmer {
    /// Create a confirmer and the receiver the delivering stream waits on.
    pub(crate) fn pair() -> (Self, oneshot::Receiver<ChainError>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                reply: Some(tx),
            },
            rx,
        )
    }

    /// Reject the batch, destroying the stream that delivered it.
    pub fn reject(mut self, err: ChainError) {
        if let Some(reply) = self.reply.take() {
            let _ = reply.send(err);
        }
    }
}

/// Events emitted by [`BlockHeadersReader`](crate::sync::BlockHeadersReader).
#[derive(Debug)]
pub enum ReaderEvent {
    /// A contiguous header batch from one sub-stream or the continuous
    /// subscription.
    Batch {
        batch: HeaderBatch,
        confirmer: BatchConfirmer,
    },
    /// Every sub-stream of a historical run finished cleanly. Emitted
    /// exactly once per successful `read_historical` call, strictly after
    /// all of the run's batches.
    HistoricalDataObtained,
    /// The run failed. No streams remain live when this fires.
    Error(SyncError),
}

/// Events emitted by [`BlockHeadersProvider`](crate::sync::BlockHeadersProvider).
#[derive(Debug, Clone)]
pub enum ProviderEvent {
    /// Headers were accepted into the chain.
    ChainUpdated {
        /// Headers the chain actually appended.
        headers: Vec<BlockHeader>,
        /// Height of the first appended header.
        head_height: u32,
    },
    /// A historical run completed and the chain validated.
    HistoricalDataObtained,
    /// The current run was stopped by the caller.
    Stopped,
    /// The current run failed.
    Error(SyncError),
}

impl ProviderEvent {
    /// Get a short description of this event for logging.
    pub fn description(&self) -> String {
        match self {
            ProviderEvent::ChainUpdated {
                headers,
                head_height,
            } => {
                format!("ChainUpdated(head={}, count={})", head_height, headers.len())
            }
            ProviderEvent::HistoricalDataObtained => "HistoricalDataObtained".to_string(),
            ProviderEvent::Stopped => "Stopped".to_string(),
            ProviderEvent::Error(err) => format!("Error({})", err),
        }
    }
}

/// Fan-out point for provider events.
///
/// The provider and its dispatch task each hold a handle; events reach
/// every live [`ProviderEvents`] subscription. Emitting with nobody
/// listening is fine, sync runs do not depend on being observed.
#[derive(Debug, Clone)]
pub(crate) struct ProviderEventSink {
    sender: broadcast::Sender<ProviderEvent>,
}

impl ProviderEventSink {
    pub(crate) fn new() -> Self {
        let (sender, _) = broadcast::channel(PROVIDER_EVENT_BUFFER);
        Self {
            sender,
        }
    }

    /// Open a subscription for events emitted from now on.
    pub(crate) fn subscribe(&self) -> ProviderEvents {
        ProviderEvents {
            receiver: self.sender.subscribe(),
        }
    }

    /// Deliver `event` to all current subscribers.
    pub(crate) fn emit(&self, event: ProviderEvent) {
        tracing::debug!(event = %event.description(), "provider event");
        let _ = self.sender.send(event);
    }
}

/// A provider's event feed.
///
/// Subscribers see every event emitted after they subscribed. A consumer
/// that falls more than the buffer behind loses the oldest events rather
/// than stalling the provider: the gap is logged and delivery resumes,
/// still in emission order, with what remains buffered.
#[derive(Debug)]
pub struct ProviderEvents {
    receiver: broadcast::Receiver<ProviderEvent>,
}

impl ProviderEvents {
    /// Receive the next event.
    ///
    /// Returns `None` once the provider is gone and the buffer is drained.
    pub async fn recv(&mut self) -> Option<ProviderEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "slow event consumer, shedding oldest events");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Receive without waiting; `None` when nothing is pending.
    pub fn try_recv(&mut self) -> Option<ProviderEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "slow event consumer, shedding oldest events");
                }
                Err(
                    broadcast::error::TryRecvError::Empty | broadcast::error::TryRecvError::Closed,
                ) => return None,
            }
        }
    }
}
