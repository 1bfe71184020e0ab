//! Provider state machine above the header reader.
//!
//! Binds a [`BlockHeadersReader`] to an SPV chain: feeds accepted batches
//! into the chain, normalizes head heights for deduplicated overlap, and
//! publishes the public event contract on a broadcast [`ProviderEvents`]
//! feed.

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};

use crate::chain::SpvChain;
use crate::error::{SyncError, SyncResult};
use crate::stream::StreamOpener;
use crate::sync::events::{ProviderEvent, ProviderEventSink, ProviderEvents, ReaderEvent};
use crate::sync::reader::BlockHeadersReader;
use crate::types::{ProviderState, ReaderConfig};

/// Builder for [`BlockHeadersProvider`].
pub struct BlockHeadersProviderBuilder<C: SpvChain> {
    chain: C,
    opener: Option<Arc<dyn StreamOpener>>,
    config: ReaderConfig,
}

impl<C: SpvChain> BlockHeadersProviderBuilder<C> {
    /// Inject the stream opener. Sync operations fail with
    /// [`SyncError::NotConfigured`] without one.
    pub fn with_opener(mut self, opener: Arc<dyn StreamOpener>) -> Self {
        self.opener = Some(opener);
        self
    }

    /// Override the reader configuration.
    pub fn with_config(mut self, config: ReaderConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the provider.
    pub fn build(self) -> BlockHeadersProvider<C> {
        BlockHeadersProvider {
            chain: Arc::new(Mutex::new(self.chain)),
            opener: self.opener,
            config: self.config,
            state: Arc::new(Mutex::new(ProviderState::Idle)),
            events: ProviderEventSink::new(),
            reader: Arc::new(Mutex::new(None)),
        }
    }
}

/// Synchronizes an SPV chain from header streams.
///
/// One historical read or continuous subscription runs at a time; the
/// provider returns to [`ProviderState::Idle`] when a run completes, fails
/// or is stopped.
pub struct BlockHeadersProvider<C: SpvChain> {
    chain: Arc<Mutex<C>>,
    opener: Option<Arc<dyn StreamOpener>>,
    config: ReaderConfig,
    state: Arc<Mutex<ProviderState>>,
    events: ProviderEventSink,
    reader: Arc<Mutex<Option<Arc<BlockHeadersReader>>>>,
}

impl<C: SpvChain> BlockHeadersProvider<C> {
    /// Start building a provider around `chain`.
    pub fn builder(chain: C) -> BlockHeadersProviderBuilder<C> {
        BlockHeadersProviderBuilder {
            chain,
            opener: None,
            config: ReaderConfig::default(),
        }
    }

    /// Subscribe to provider events.
    pub fn events(&self) -> ProviderEvents {
        self.events.subscribe()
    }

    /// Current state.
    pub async fn state(&self) -> ProviderState {
        *self.state.lock().await
    }

    /// Shared handle to the chain collaborator.
    pub fn chain(&self) -> Arc<Mutex<C>> {
        self.chain.clone()
    }

    /// Read historical headers over `[from_height, to_height]` and feed
    /// them into the chain.
    ///
    /// Returns once all sub-streams are opened. Completion is signalled by
    /// [`ProviderEvent::HistoricalDataObtained`] after the chain validates.
    pub async fn read_historical(&self, from_height: u32, to_height: u32) -> SyncResult<()> {
        let opener = self.opener.clone().ok_or(SyncError::NotConfigured)?;
        if from_height < 1 {
            return Err(SyncError::InvalidHeight(from_height));
        }
        if to_height < from_height {
            return Err(SyncError::InvalidRange {
                from_height,
                to_height,
            });
        }
        self.enter_state(ProviderState::HistoricalSync).await?;

        if let Err(err) = self.start_reader(opener, from_height, Some(to_height)).await {
            *self.state.lock().await = ProviderState::Idle;
            return Err(err);
        }
        Ok(())
    }

    /// Subscribe to newly mined headers starting at `from_height` and feed
    /// them into the chain.
    pub async fn start_continuous_sync(&self, from_height: u32) -> SyncResult<()> {
        let opener = self.opener.clone().ok_or(SyncError::NotConfigured)?;
        if from_height < 1 {
            return Err(SyncError::InvalidHeight(from_height));
        }
        self.enter_state(ProviderState::ContinuousSync).await?;

        if let Err(err) = self.start_reader(opener, from_height, None).await {
            *self.state.lock().await = ProviderState::Idle;
            return Err(err);
        }
        Ok(())
    }

    /// Stop the current run, if any. Cancellation is silent: the reader
    /// produces no error, and the provider emits [`ProviderEvent::Stopped`].
    pub async fn stop(&self) {
        let previous = {
            let mut state = self.state.lock().await;
            std::mem::replace(&mut *state, ProviderState::Idle)
        };

        if let Some(reader) = self.reader.lock().await.take() {
            match previous {
                ProviderState::HistoricalSync => reader.stop_reading_historical().await,
                ProviderState::ContinuousSync => reader.unsubscribe_from_new().await,
                ProviderState::Idle => {}
            }
        }

        if previous != ProviderState::Idle {
            tracing::info!(from = %previous, "sync stopped");
            self.events.emit(ProviderEvent::Stopped);
        }
    }

    async fn enter_state(&self, next: ProviderState) -> SyncResult<()> {
        let mut state = self.state.lock().await;
        if *state != ProviderState::Idle {
            return Err(SyncError::Busy(state.name()));
        }
        *state = next;
        Ok(())
    }

    /// Anchor the chain so the requested range can attach.
    ///
    /// A chain without a header at `from_height - 1` cannot link the first
    /// delivered batch; resetting re-anchors it at `from_height` so syncs
    /// can start above genesis without prior history.
    async fn ensure_chain_root(&self, from_height: u32) {
        let mut chain = self.chain.lock().await;
        if chain.hash_at_height(from_height - 1).is_none() {
            tracing::info!(from_height, "no chain root below start height, resetting chain");
            chain.reset(from_height);
        }
    }

    async fn start_reader(
        &self,
        opener: Arc<dyn StreamOpener>,
        from_height: u32,
        to_height: Option<u32>,
    ) -> SyncResult<()> {
        self.ensure_chain_root(from_height).await;

        let (reader, event_rx) = BlockHeadersReader::new(self.config.clone(), opener);
        let reader = Arc::new(reader);
        match to_height {
            Some(to_height) => reader.read_historical(from_height, to_height).await?,
            None => reader.subscribe_to_new(from_height).await?,
        }

        *self.reader.lock().await = Some(reader.clone());
        tokio::spawn(dispatch_reader_events(
            event_rx,
            self.chain.clone(),
            self.state.clone(),
            self.events.clone(),
            self.reader.clone(),
            Arc::downgrade(&reader),
        ));
        Ok(())
    }
}

/// Translate reader events into chain updates and public events.
///
/// Runs until the reader's run reaches a terminal event or the channel
/// closes after a stop. Holds the reader only weakly so a stopped reader
/// can drop, close its event channel and end this task.
async fn dispatch_reader_events<C: SpvChain>(
    mut event_rx: mpsc::UnboundedReceiver<ReaderEvent>,
    chain: Arc<Mutex<C>>,
    state: Arc<Mutex<ProviderState>>,
    events: ProviderEventSink,
    reader_slot: Arc<Mutex<Option<Arc<BlockHeadersReader>>>>,
    reader: std::sync::Weak<BlockHeadersReader>,
) {
    while let Some(event) = event_rx.recv().await {
        match event {
            ReaderEvent::Batch {
                batch,
                confirmer,
            } => {
                let result = chain.lock().await.add_headers(&batch.headers, batch.head_height);
                match result {
                    Ok(accepted) => {
                        // Heights overlapping known state were dropped from
                        // the front of the batch. The chain may also return
                        // more than the batch when buffered ranges connect;
                        // the batch head is already right in that case.
                        let difference =
                            batch.headers.len().saturating_sub(accepted.len()) as u32;
                        if !accepted.is_empty() {
                            events.emit(ProviderEvent::ChainUpdated {
                                head_height: batch.head_height + difference,
                                headers: accepted,
                            });
                        }
                    }
                    Err(err) if err.is_rejection() => {
                        tracing::warn!(
                            head_height = batch.head_height,
                            count = batch.headers.len(),
                            %err,
                            "chain rejected header batch"
                        );
                        confirmer.reject(err);
                    }
                    Err(err) => {
                        tracing::error!(%err, "chain failure, aborting sync");
                        if let Some(reader) = reader.upgrade() {
                            reader.stop_reading_historical().await;
                            reader.unsubscribe_from_new().await;
                        }
                        reader_slot.lock().await.take();
                        *state.lock().await = ProviderState::Idle;
                        events.emit(ProviderEvent::Error(SyncError::Chain(err)));
                        return;
                    }
                }
            }
            ReaderEvent::HistoricalDataObtained => {
                let validated = chain.lock().await.validate();
                reader_slot.lock().await.take();
                *state.lock().await = ProviderState::Idle;
                match validated {
                    Ok(()) => {
                        tracing::info!("historical data obtained and validated");
                        events.emit(ProviderEvent::HistoricalDataObtained);
                    }
                    Err(err) => {
                        tracing::error!(%err, "chain validation failed after historical sync");
                        events.emit(ProviderEvent::Error(SyncError::Chain(err)));
                    }
                }
                return;
            }
            ReaderEvent::Error(err) => {
                reader_slot.lock().await.take();
                *state.lock().await = ProviderState::Idle;
                events.emit(ProviderEvent::Error(err));
                return;
            }
        }
    }
}
