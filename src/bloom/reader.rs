//! Transaction stream reader with Bloom filter management.
//!
//! Reads interleaved frames of filtered transactions and merkle blocks over
//! a single stream per run. Merkle blocks drive a two-phase protocol: the
//! consumer must resolve each block through its [`MerkleBlockHandle`]
//! before the next frame is processed. Accepting a block together with
//! newly generated addresses regrows the Bloom filter and restarts the
//! stream just past the accepted height, so no matching transaction is
//! missed by a stale filter.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashcore::{merkle_tree::MerkleBlock, Address, Transaction};
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio_util::sync::CancellationToken;

use crate::bloom::session::BloomFilterSession;
use crate::error::{ChainError, StreamError, SyncError, SyncResult};
use crate::stream::{StreamArgs, TxFrame, TxStream, TxStreamMessage, TxStreamOpener};
use crate::sync::reader::{release_run_slot, ActiveRun, RunSlot};

/// Configuration for transaction stream readers.
#[derive(Debug, Clone)]
pub struct TxReaderConfig {
    /// Maximum retry attempts per run.
    pub max_retries: u32,
    /// Delay before reopening a failed stream. Zero yields to the scheduler
    /// once instead of sleeping.
    pub retry_delay: Duration,
}

impl Default for TxReaderConfig {
    fn default() -> Self {
        Self {
            max_retries: 10,
            retry_delay: Duration::ZERO,
        }
    }
}

impl TxReaderConfig {
    /// Create config with custom max retries.
    pub fn with_max_retries(mut self, max: u32) -> Self {
        self.max_retries = max;
        self
    }

    /// Create config with custom retry delay.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }
}

/// Buffers consumer-generated addresses into the session.
///
/// Handed out with every `NewTransactions` event; cheap to clone. Appended
/// addresses join the live filter when the next merkle block is accepted.
#[derive(Debug, Clone)]
pub struct AddressAppender {
    tx: mpsc::UnboundedSender<Vec<Address>>,
}

impl AddressAppender {
    /// Buffer addresses generated by the consumer.
    pub fn append(&self, addresses: Vec<Address>) {
        let _ = self.tx.send(addresses);
    }
}

/// The consumer's verdict on one merkle block.
#[derive(Debug)]
enum MerkleDecision {
    Accept {
        height: u32,
        new_addresses: Vec<Address>,
    },
    Reject(ChainError),
}

/// One-shot capability to accept or reject a merkle block.
///
/// Every method consumes the handle, so exactly one verdict can be given.
/// The reader processes no further frames until the handle resolves;
/// dropping it without a verdict destroys the stream.
#[derive(Debug)]
pub struct MerkleBlockHandle {
    reply: Option<oneshot::Sender<MerkleDecision>>,
}

impl MerkleBlockHandle {
    fn pair() -> (Self, oneshot::Receiver<MerkleDecision>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                reply: Some(tx),
            },
            rx,
        )
    }

    fn send(mut self, decision: MerkleDecision) {
        if let Some(reply) = self.reply.take() {
            let _ = reply.send(decision);
        }
    }

    /// Accept the block at `height`.
    pub fn accept(self, height: u32) {
        self.send(MerkleDecision::Accept {
            height,
            new_addresses: Vec::new(),
        });
    }

    /// Accept the block at `height` and expand the watched set.
    ///
    /// A non-empty expansion restarts the stream from `height + 1` with a
    /// regrown filter.
    pub fn accept_with_addresses(self, height: u32, new_addresses: Vec<Address>) {
        self.send(MerkleDecision::Accept {
            height,
            new_addresses,
        });
    }

    /// Reject the block, destroying the stream that delivered it.
    pub fn reject(self, err: ChainError) {
        self.send(MerkleDecision::Reject(err));
    }
}

/// Events emitted by [`TransactionsReader`].
#[derive(Debug)]
pub enum TxReaderEvent {
    /// Transactions matching the watched address set.
    NewTransactions {
        transactions: Vec<Transaction>,
        /// Buffer for addresses the consumer generates while processing.
        addresses: AddressAppender,
    },
    /// A merkle block awaiting the consumer's verdict.
    MerkleBlock {
        block: MerkleBlock,
        handle: MerkleBlockHandle,
    },
    /// The historical range was fully delivered.
    HistoricalDataObtained,
    /// The run failed. The stream is gone when this fires.
    Error(SyncError),
}

/// Which kind of run a stream task is driving.
#[derive(Debug, Clone, Copy)]
enum StreamMode {
    Historical {
        from_height: u32,
        count: u32,
    },
    Continuous {
        from_height: u32,
    },
}

impl StreamMode {
    fn start(&self) -> u32 {
        match self {
            StreamMode::Historical {
                from_height, ..
            }
            | StreamMode::Continuous {
                from_height,
            } => *from_height,
        }
    }

    fn is_historical(&self) -> bool {
        matches!(self, StreamMode::Historical { .. })
    }

    fn accepts_height(&self, height: u32) -> bool {
        match self {
            StreamMode::Historical {
                from_height,
                count,
            } => height <= from_height + count - 1,
            StreamMode::Continuous {
                from_height,
            } => height >= *from_height,
        }
    }

    /// Headers left after `height`; `None` for continuous runs.
    fn remaining_after(&self, height: u32) -> Option<u32> {
        match self {
            StreamMode::Historical {
                from_height,
                count,
            } => Some(count.saturating_sub((height + 1).saturating_sub(*from_height))),
            StreamMode::Continuous {
                ..
            } => None,
        }
    }
}

/// Reads filtered transactions and merkle blocks over transport streams.
///
/// At most one historical run and one continuous subscription may be live
/// at a time; both share the reader's [`BloomFilterSession`].
pub struct TransactionsReader {
    config: TxReaderConfig,
    opener: Arc<dyn TxStreamOpener>,
    session: Arc<Mutex<BloomFilterSession>>,
    event_tx: mpsc::UnboundedSender<TxReaderEvent>,
    historical: RunSlot,
    continuous: RunSlot,
    next_run_id: AtomicU64,
}

impl TransactionsReader {
    /// Create a reader and the channel its events arrive on.
    pub fn new(
        config: TxReaderConfig,
        session: BloomFilterSession,
        opener: Arc<dyn TxStreamOpener>,
    ) -> (Self, mpsc::UnboundedReceiver<TxReaderEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        (
            Self {
                config,
                opener,
                session: Arc::new(Mutex::new(session)),
                event_tx,
                historical: Arc::new(Mutex::new(None)),
                continuous: Arc::new(Mutex::new(None)),
                next_run_id: AtomicU64::new(0),
            },
            event_rx,
        )
    }

    /// Shared handle to the filter session.
    pub fn session(&self) -> Arc<Mutex<BloomFilterSession>> {
        self.session.clone()
    }

    fn new_run(&self) -> ActiveRun {
        ActiveRun {
            id: self.next_run_id.fetch_add(1, Ordering::Relaxed),
            token: CancellationToken::new(),
        }
    }

    /// Read historical transactions over `[from_height, to_height]`.
    ///
    /// Returns once the stream is opened.
    pub async fn read_historical(&self, from_height: u32, to_height: u32) -> SyncResult<()> {
        if from_height < 1 {
            return Err(SyncError::InvalidHeight(from_height));
        }
        if to_height < from_height {
            return Err(SyncError::InvalidRange {
                from_height,
                to_height,
            });
        }
        let count = to_height - from_height + 1;
        self.start_stream(StreamMode::Historical {
            from_height,
            count,
        })
        .await
    }

    /// Subscribe to new filtered transactions starting at `from_height`.
    pub async fn start_continuous_sync(&self, from_height: u32) -> SyncResult<()> {
        if from_height < 1 {
            return Err(SyncError::InvalidHeight(from_height));
        }
        self.start_stream(StreamMode::Continuous {
            from_height,
        })
        .await
    }

    /// Cancel the historical run, if any. Idempotent and silent.
    pub async fn stop_reading_historical(&self) {
        if let Some(run) = self.historical.lock().await.take() {
            tracing::debug!("stopping historical transaction read");
            run.token.cancel();
        }
    }

    /// Cancel the continuous subscription, if any. Idempotent and silent.
    pub async fn unsubscribe_from_new(&self) {
        if let Some(run) = self.continuous.lock().await.take() {
            tracing::debug!("unsubscribing from new transactions");
            run.token.cancel();
        }
    }

    async fn start_stream(&self, mode: StreamMode) -> SyncResult<()> {
        let slot = match mode {
            StreamMode::Historical { .. } => &self.historical,
            StreamMode::Continuous { .. } => &self.continuous,
        };

        let run = self.new_run();
        let run_id = run.id;
        let token = run.token.clone();
        {
            let mut slot = slot.lock().await;
            if slot.is_some() {
                return Err(SyncError::AlreadyRunning);
            }
            *slot = Some(run);
        }

        let filter = { self.session.lock().await.build_filter() };
        let filter = match filter {
            Ok(filter) => filter,
            Err(err) => {
                release_run_slot(slot, run_id).await;
                return Err(err);
            }
        };

        let count = match mode {
            StreamMode::Historical {
                count, ..
            } => count,
            StreamMode::Continuous {
                ..
            } => 0,
        };
        let stream = match self.opener.open(&filter, mode.start(), count).await {
            Ok(stream) => stream,
            Err(err) => {
                release_run_slot(slot, run_id).await;
                return Err(err.into());
            }
        };

        tracing::info!(
            from_height = mode.start(),
            count,
            addresses = self.session.lock().await.addresses().len(),
            "transaction stream opened"
        );

        tokio::spawn(run_transaction_stream(
            mode,
            stream,
            self.opener.clone(),
            self.config.clone(),
            self.session.clone(),
            self.event_tx.clone(),
            token,
            slot.clone(),
            run_id,
        ));

        Ok(())
    }
}

/// Fold everything the consumer appended so far into the session.
async fn drain_generated(
    generated_rx: &mut mpsc::UnboundedReceiver<Vec<Address>>,
    session: &Arc<Mutex<BloomFilterSession>>,
) {
    while let Ok(addresses) = generated_rx.try_recv() {
        session.lock().await.buffer_generated(addresses);
    }
}

/// Drive one transaction stream run.
#[allow(clippy::too_many_arguments)]
async fn run_transaction_stream(
    mode: StreamMode,
    mut stream: Box<dyn TxStream>,
    opener: Arc<dyn TxStreamOpener>,
    config: TxReaderConfig,
    session: Arc<Mutex<BloomFilterSession>>,
    event_tx: mpsc::UnboundedSender<TxReaderEvent>,
    token: CancellationToken,
    slot: RunSlot,
    run_id: u64,
) {
    let (generated_tx, mut generated_rx) = mpsc::unbounded_channel();
    let appender = AddressAppender {
        tx: generated_tx,
    };
    let mut last_accepted: Option<u32> = None;
    let mut retries_left = config.max_retries;
    // Armed restart after a filter expansion; consumed by the cancellation
    // it triggers. At most one restart per arming.
    let mut restart: Option<StreamArgs> = None;

    loop {
        let message = tokio::select! {
            biased;
            _ = token.cancelled() => {
                stream.cancel();
                release_run_slot(&slot, run_id).await;
                return;
            }
            message = stream.recv() => message,
        };

        match message {
            TxStreamMessage::Data(TxFrame::Transactions(transactions)) => {
                let matched = { session.lock().await.matching_transactions(&transactions) };
                if matched.is_empty() {
                    continue;
                }
                if event_tx
                    .send(TxReaderEvent::NewTransactions {
                        transactions: matched,
                        addresses: appender.clone(),
                    })
                    .is_err()
                {
                    release_run_slot(&slot, run_id).await;
                    return;
                }
            }
            TxStreamMessage::Data(TxFrame::MerkleBlock(block)) => {
                let (handle, decision) = MerkleBlockHandle::pair();
                if event_tx
                    .send(TxReaderEvent::MerkleBlock {
                        block,
                        handle,
                    })
                    .is_err()
                {
                    release_run_slot(&slot, run_id).await;
                    return;
                }
                let decision = decision.await;
                drain_generated(&mut generated_rx, &session).await;

                let failure = match decision {
                    Err(_) => {
                        Some(StreamError::Rejected("merkle block left undecided".to_string()))
                    }
                    Ok(MerkleDecision::Reject(err)) => {
                        tracing::warn!(%err, "merkle block rejected");
                        Some(StreamError::Rejected(err.to_string()))
                    }
                    Ok(MerkleDecision::Accept {
                        height,
                        new_addresses,
                    }) => {
                        if !mode.accepts_height(height) {
                            Some(StreamError::Rejected(format!(
                                "merkle block height {} out of range",
                                height
                            )))
                        } else {
                            last_accepted = Some(height);
                            let mut pending = { session.lock().await.take_generated() };
                            pending.extend(new_addresses);
                            if !pending.is_empty() && restart.is_none() {
                                let added = { session.lock().await.merge(pending) };
                                if added > 0 {
                                    match mode.remaining_after(height) {
                                        Some(0) => {
                                            // The accepted block was the last
                                            // of the range.
                                            release_run_slot(&slot, run_id).await;
                                            let _ = event_tx
                                                .send(TxReaderEvent::HistoricalDataObtained);
                                            return;
                                        }
                                        remaining => {
                                            tracing::info!(
                                                new_addresses = added,
                                                restart_from = height + 1,
                                                "expanding bloom filter, restarting stream"
                                            );
                                            restart = Some(StreamArgs {
                                                from_height: height + 1,
                                                count: remaining.unwrap_or(0),
                                            });
                                            stream.cancel();
                                        }
                                    }
                                }
                            }
                            None
                        }
                    }
                };

                if let Some(err) = failure {
                    stream.destroy(err.clone());
                    match retry_or_fail(
                        mode,
                        err,
                        last_accepted,
                        &mut retries_left,
                        &opener,
                        &config,
                        &session,
                        &event_tx,
                        &slot,
                        run_id,
                    )
                    .await
                    {
                        Some(replacement) => stream = replacement,
                        None => return,
                    }
                }
            }
            TxStreamMessage::BeforeReconnect(handle) => {
                let from_height = last_accepted.map(|h| h + 1).unwrap_or_else(|| mode.start());
                tracing::debug!(from_height, "updating reconnect arguments");
                handle.update(StreamArgs {
                    from_height,
                    count: 0,
                });
            }
            TxStreamMessage::Error(err) if err.is_cancellation() => {
                if let Some(args) = restart.take() {
                    let filter = { session.lock().await.build_filter() };
                    let filter = match filter {
                        Ok(filter) => filter,
                        Err(build_err) => {
                            release_run_slot(&slot, run_id).await;
                            let _ = event_tx.send(TxReaderEvent::Error(build_err));
                            return;
                        }
                    };
                    match opener.open(&filter, args.from_height, args.count).await {
                        Ok(replacement) => {
                            tracing::debug!(
                                from_height = args.from_height,
                                count = args.count,
                                "stream restarted with regrown filter"
                            );
                            stream = replacement;
                        }
                        Err(open_err) => {
                            release_run_slot(&slot, run_id).await;
                            let _ =
                                event_tx.send(TxReaderEvent::Error(SyncError::Reopen(open_err)));
                            return;
                        }
                    }
                } else {
                    // Caller-initiated teardown.
                    release_run_slot(&slot, run_id).await;
                    return;
                }
            }
            TxStreamMessage::Error(err) => {
                match retry_or_fail(
                    mode,
                    err,
                    last_accepted,
                    &mut retries_left,
                    &opener,
                    &config,
                    &session,
                    &event_tx,
                    &slot,
                    run_id,
                )
                .await
                {
                    Some(replacement) => stream = replacement,
                    None => return,
                }
            }
            TxStreamMessage::End => {
                release_run_slot(&slot, run_id).await;
                if mode.is_historical() {
                    tracing::info!("historical transaction read complete");
                    let _ = event_tx.send(TxReaderEvent::HistoricalDataObtained);
                }
                return;
            }
        }
    }
}

/// Reopen the stream after a non-cancellation error.
///
/// Returns `None` when the task must exit; the terminal event has already
/// been sent.
#[allow(clippy::too_many_arguments)]
async fn retry_or_fail(
    mode: StreamMode,
    err: StreamError,
    last_accepted: Option<u32>,
    retries_left: &mut u32,
    opener: &Arc<dyn TxStreamOpener>,
    config: &TxReaderConfig,
    session: &Arc<Mutex<BloomFilterSession>>,
    event_tx: &mpsc::UnboundedSender<TxReaderEvent>,
    slot: &RunSlot,
    run_id: u64,
) -> Option<Box<dyn TxStream>> {
    if *retries_left == 0 {
        tracing::warn!(%err, "retries exhausted");
        release_run_slot(slot, run_id).await;
        let _ = event_tx.send(TxReaderEvent::Error(SyncError::RetriesExhausted(err)));
        return None;
    }
    *retries_left -= 1;

    let from_height = last_accepted.map(|h| h + 1).unwrap_or_else(|| mode.start());
    let count = match last_accepted {
        Some(height) => mode.remaining_after(height).unwrap_or(0),
        None => match mode {
            StreamMode::Historical {
                count, ..
            } => count,
            StreamMode::Continuous {
                ..
            } => 0,
        },
    };
    if mode.is_historical() && count == 0 {
        // Everything was delivered before the stream broke.
        release_run_slot(slot, run_id).await;
        let _ = event_tx.send(TxReaderEvent::HistoricalDataObtained);
        return None;
    }

    if config.retry_delay.is_zero() {
        tokio::task::yield_now().await;
    } else {
        tokio::time::sleep(config.retry_delay).await;
    }

    let filter = { session.lock().await.build_filter() };
    let filter = match filter {
        Ok(filter) => filter,
        Err(build_err) => {
            release_run_slot(slot, run_id).await;
            let _ = event_tx.send(TxReaderEvent::Error(build_err));
            return None;
        }
    };
    match opener.open(&filter, from_height, count).await {
        Ok(stream) => {
            tracing::debug!(
                from_height,
                count,
                retries_left = *retries_left,
                %err,
                "reopened transaction stream after error"
            );
            Some(stream)
        }
        Err(open_err) => {
            tracing::error!(%open_err, "failed to reopen transaction stream");
            release_run_slot(slot, run_id).await;
            let _ = event_tx.send(TxReaderEvent::Error(SyncError::Reopen(open_err)));
            None
        }
    }
}
