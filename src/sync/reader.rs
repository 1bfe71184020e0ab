//! Parallel block header reader.
//!
//! Fans a historical height range out into bounded parallel sub-streams and
//! funnels their frames into a single `batch` event channel. Each
//! sub-stream owns its slice of the plan, retries transient transport
//! errors from the exact height it last delivered, and reports its fate to
//! a per-run coordinator over one command channel. A separate long-lived
//! subscription delivers newly mined headers and survives transport
//! reconnects without re-delivering a height.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;

use crate::error::{StreamError, SyncError, SyncResult};
use crate::stream::{HeaderStream, StreamArgs, StreamMessage, StreamOpener};
use crate::sync::events::{BatchConfirmer, ReaderEvent};
use crate::sync::plan::{partition, SubStreamSlice};
use crate::types::{HeaderBatch, ReaderConfig};

/// A live historical run or continuous subscription.
#[derive(Debug)]
pub(crate) struct ActiveRun {
    pub(crate) id: u64,
    pub(crate) token: CancellationToken,
}

pub(crate) type RunSlot = Arc<Mutex<Option<ActiveRun>>>;

/// Clear `slot` if it still belongs to run `id`.
pub(crate) async fn release_run_slot(slot: &RunSlot, id: u64) {
    let mut slot = slot.lock().await;
    if slot.as_ref().is_some_and(|run| run.id == id) {
        *slot = None;
    }
}

/// Commands sub-streams report to the run coordinator.
#[derive(Debug)]
enum SubStreamCmd {
    /// A replacement stream was opened after a transient error.
    Retried {
        index: usize,
        from_height: u32,
        count: u32,
    },
    /// The sub-stream was cancelled; not an error.
    Cancelled {
        index: usize,
    },
    /// The sub-stream delivered its whole slice.
    Ended {
        index: usize,
    },
    /// The sub-stream is out of options; the run must fail.
    Failed {
        index: usize,
        error: SyncError,
    },
}

/// Reads block headers over transport streams.
///
/// Create with [`BlockHeadersReader::new`], consume [`ReaderEvent`]s from
/// the returned receiver. At most one historical run and one continuous
/// subscription may be live at a time.
pub struct BlockHeadersReader {
    config: ReaderConfig,
    opener: Arc<dyn StreamOpener>,
    event_tx: mpsc::UnboundedSender<ReaderEvent>,
    historical: RunSlot,
    continuous: RunSlot,
    next_run_id: AtomicU64,
}

impl BlockHeadersReader {
    /// Create a reader and the channel its events arrive on.
    pub fn new(
        config: ReaderConfig,
        opener: Arc<dyn StreamOpener>,
    ) -> (Self, mpsc::UnboundedReceiver<ReaderEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        (
            Self {
                config,
                opener,
                event_tx,
                historical: Arc::new(Mutex::new(None)),
                continuous: Arc::new(Mutex::new(None)),
                next_run_id: AtomicU64::new(0),
            },
            event_rx,
        )
    }

    fn new_run(&self) -> ActiveRun {
        ActiveRun {
            id: self.next_run_id.fetch_add(1, Ordering::Relaxed),
            token: CancellationToken::new(),
        }
    }

    /// Read `[from_height, to_height]` through parallel sub-streams.
    ///
    /// Returns once every sub-stream is opened; batches then arrive on the
    /// event channel until `HistoricalDataObtained` or `Error`.
    pub async fn read_historical(&self, from_height: u32, to_height: u32) -> SyncResult<()> {
        let slices = partition(
            from_height,
            to_height,
            self.config.target_batch_size,
            self.config.max_parallel_streams,
        )?;

        let run = self.new_run();
        let run_id = run.id;
        let token = run.token.clone();
        {
            let mut slot = self.historical.lock().await;
            if slot.is_some() {
                return Err(SyncError::AlreadyRunning);
            }
            *slot = Some(run);
        }

        tracing::info!(
            from_height,
            to_height,
            sub_streams = slices.len(),
            "starting historical header read"
        );

        let opens = futures::future::join_all(
            slices.iter().map(|s| self.opener.open_historical(s.from_height, s.count)),
        )
        .await;

        let mut streams = Vec::with_capacity(opens.len());
        let mut open_failure = None;
        for result in opens {
            match result {
                Ok(stream) => streams.push(stream),
                Err(err) => open_failure = Some(err),
            }
        }
        if let Some(err) = open_failure {
            for stream in &mut streams {
                stream.cancel();
            }
            release_run_slot(&self.historical, run_id).await;
            return Err(err.into());
        }

        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        for (index, (slice, stream)) in slices.iter().zip(streams).enumerate() {
            tokio::spawn(run_historical_sub_stream(
                index,
                *slice,
                stream,
                self.opener.clone(),
                self.config.clone(),
                self.event_tx.clone(),
                cmd_tx.clone(),
                token.clone(),
            ));
        }

        tokio::spawn(coordinate_historical_run(
            cmd_rx,
            slices.len(),
            self.event_tx.clone(),
            token,
            self.historical.clone(),
            run_id,
        ));

        Ok(())
    }

    /// Subscribe to newly mined headers starting at `from_height`.
    ///
    /// Returns once the stream is opened.
    pub async fn subscribe_to_new(&self, from_height: u32) -> SyncResult<()> {
        if from_height < 1 {
            return Err(SyncError::InvalidHeight(from_height));
        }

        let run = self.new_run();
        let run_id = run.id;
        let token = run.token.clone();
        {
            let mut slot = self.continuous.lock().await;
            if slot.is_some() {
                return Err(SyncError::AlreadyRunning);
            }
            *slot = Some(run);
        }

        let stream = match self.opener.open_continuous(from_height).await {
            Ok(stream) => stream,
            Err(err) => {
                release_run_slot(&self.continuous, run_id).await;
                return Err(err.into());
            }
        };

        tracing::info!(from_height, "subscribed to new headers");

        tokio::spawn(run_continuous_stream(
            from_height,
            stream,
            self.event_tx.clone(),
            token,
            self.continuous.clone(),
            run_id,
        ));

        Ok(())
    }

    /// Cancel the historical run, if any. Idempotent and silent: no
    /// `Error` event is produced.
    pub async fn stop_reading_historical(&self) {
        if let Some(run) = self.historical.lock().await.take() {
            tracing::debug!("stopping historical header read");
            run.token.cancel();
        }
    }

    /// Cancel the continuous subscription, if any. Idempotent and silent.
    pub async fn unsubscribe_from_new(&self) {
        if let Some(run) = self.continuous.lock().await.take() {
            tracing::debug!("unsubscribing from new headers");
            run.token.cancel();
        }
    }

    /// Whether a historical run is live.
    pub async fn is_reading_historical(&self) -> bool {
        self.historical.lock().await.is_some()
    }

    /// Whether the continuous subscription is live.
    pub async fn is_subscribed_to_new(&self) -> bool {
        self.continuous.lock().await.is_some()
    }
}

/// Drive one sub-stream over its slice of the plan.
#[allow(clippy::too_many_arguments)]
async fn run_historical_sub_stream(
    index: usize,
    slice: SubStreamSlice,
    mut stream: Box<dyn HeaderStream>,
    opener: Arc<dyn StreamOpener>,
    config: ReaderConfig,
    event_tx: mpsc::UnboundedSender<ReaderEvent>,
    cmd_tx: mpsc::UnboundedSender<SubStreamCmd>,
    token: CancellationToken,
) {
    let mut last_delivered = slice.from_height - 1;
    let mut remaining = slice.count;
    let mut retries_left = config.max_retries;

    loop {
        let message = tokio::select! {
            biased;
            _ = token.cancelled() => {
                stream.cancel();
                let _ = cmd_tx.send(SubStreamCmd::Cancelled { index });
                return;
            }
            message = stream.recv() => message,
        };

        match message {
            StreamMessage::Data(headers) => {
                if headers.is_empty() {
                    continue;
                }
                let delivered = headers.len() as u32;
                let (confirmer, decision) = BatchConfirmer::pair();
                let batch = HeaderBatch {
                    head_height: last_delivered + 1,
                    headers,
                };
                if event_tx
                    .send(ReaderEvent::Batch {
                        batch,
                        confirmer,
                    })
                    .is_err()
                {
                    // Consumer is gone; nothing left to deliver to.
                    return;
                }
                match decision.await {
                    Err(_) => {
                        last_delivered += delivered;
                        remaining = remaining.saturating_sub(delivered);
                    }
                    Ok(rejection) => {
                        let err = StreamError::Rejected(rejection.to_string());
                        tracing::warn!(
                            sub_stream = index,
                            head_height = last_delivered + 1,
                            %err,
                            "batch rejected, destroying stream"
                        );
                        stream.destroy(err.clone());
                        match attempt_retry(
                            index,
                            err,
                            last_delivered,
                            remaining,
                            &mut retries_left,
                            &opener,
                            &config,
                            &cmd_tx,
                        )
                        .await
                        {
                            Some(replacement) => stream = replacement,
                            None => return,
                        }
                    }
                }
            }
            StreamMessage::Error(err) if err.is_cancellation() => {
                let _ = cmd_tx.send(SubStreamCmd::Cancelled {
                    index,
                });
                return;
            }
            StreamMessage::Error(err) => {
                match attempt_retry(
                    index,
                    err,
                    last_delivered,
                    remaining,
                    &mut retries_left,
                    &opener,
                    &config,
                    &cmd_tx,
                )
                .await
                {
                    Some(replacement) => stream = replacement,
                    None => return,
                }
            }
            StreamMessage::BeforeReconnect(_) => {
                // Historical streams resume through the retry machinery;
                // the transport keeps its arguments.
            }
            StreamMessage::End => {
                let _ = cmd_tx.send(SubStreamCmd::Ended {
                    index,
                });
                return;
            }
        }
    }
}

/// Open a replacement stream after a non-cancellation error.
///
/// Returns `None` when the task must exit; the appropriate command has
/// already been sent.
#[allow(clippy::too_many_arguments)]
async fn attempt_retry(
    index: usize,
    err: StreamError,
    last_delivered: u32,
    remaining: u32,
    retries_left: &mut u32,
    opener: &Arc<dyn StreamOpener>,
    config: &ReaderConfig,
    cmd_tx: &mpsc::UnboundedSender<SubStreamCmd>,
) -> Option<Box<dyn HeaderStream>> {
    if *retries_left == 0 {
        tracing::warn!(sub_stream = index, %err, "retries exhausted");
        let _ = cmd_tx.send(SubStreamCmd::Failed {
            index,
            error: SyncError::RetriesExhausted(err),
        });
        return None;
    }
    *retries_left -= 1;

    if remaining == 0 {
        // Everything was delivered before the stream broke.
        let _ = cmd_tx.send(SubStreamCmd::Ended {
            index,
        });
        return None;
    }

    if config.retry_delay.is_zero() {
        tokio::task::yield_now().await;
    } else {
        tokio::time::sleep(config.retry_delay).await;
    }

    let from_height = last_delivered + 1;
    match opener.open_historical(from_height, remaining).await {
        Ok(stream) => {
            tracing::debug!(
                sub_stream = index,
                from_height,
                count = remaining,
                retries_left = *retries_left,
                %err,
                "reopened sub-stream after error"
            );
            let _ = cmd_tx.send(SubStreamCmd::Retried {
                index,
                from_height,
                count: remaining,
            });
            Some(stream)
        }
        Err(open_err) => {
            tracing::error!(sub_stream = index, %open_err, "failed to reopen sub-stream");
            let _ = cmd_tx.send(SubStreamCmd::Failed {
                index,
                error: SyncError::Reopen(open_err),
            });
            None
        }
    }
}

/// Track the live set of one historical run and emit its terminal event.
async fn coordinate_historical_run(
    mut cmd_rx: mpsc::UnboundedReceiver<SubStreamCmd>,
    total: usize,
    event_tx: mpsc::UnboundedSender<ReaderEvent>,
    token: CancellationToken,
    slot: RunSlot,
    run_id: u64,
) {
    let mut live = total;
    let mut failure: Option<SyncError> = None;
    let mut cancelled = false;

    while live > 0 {
        let Some(cmd) = cmd_rx.recv().await else {
            break;
        };
        match cmd {
            SubStreamCmd::Retried {
                index,
                from_height,
                count,
            } => {
                tracing::debug!(sub_stream = index, from_height, count, "sub-stream retried");
            }
            SubStreamCmd::Ended {
                index,
            } => {
                live -= 1;
                tracing::debug!(sub_stream = index, live, "sub-stream finished");
            }
            SubStreamCmd::Cancelled {
                index,
            } => {
                live -= 1;
                cancelled = true;
                tracing::debug!(sub_stream = index, live, "sub-stream cancelled");
            }
            SubStreamCmd::Failed {
                index,
                error,
            } => {
                live -= 1;
                if failure.is_none() {
                    tracing::warn!(
                        sub_stream = index,
                        %error,
                        "sub-stream failed, cancelling remaining streams"
                    );
                    failure = Some(error);
                    token.cancel();
                } else {
                    tracing::debug!(sub_stream = index, %error, "additional sub-stream failure");
                }
            }
        }
    }

    release_run_slot(&slot, run_id).await;

    if let Some(error) = failure {
        let _ = event_tx.send(ReaderEvent::Error(error));
    } else if !cancelled && !token.is_cancelled() {
        tracing::info!("historical header read complete");
        let _ = event_tx.send(ReaderEvent::HistoricalDataObtained);
    }
}

/// Drive the continuous subscription.
async fn run_continuous_stream(
    from_height: u32,
    mut stream: Box<dyn HeaderStream>,
    event_tx: mpsc::UnboundedSender<ReaderEvent>,
    token: CancellationToken,
    slot: RunSlot,
    run_id: u64,
) {
    // Height the next delivered header will occupy. Before the first frame
    // this is the subscription height, afterwards one past the last
    // delivered header, which is exactly what a reconnect must resume from.
    let mut next_height = from_height;

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
            StreamMessage::Data(headers) => {
                if headers.is_empty() {
                    continue;
                }
                let delivered = headers.len() as u32;
                let (confirmer, decision) = BatchConfirmer::pair();
                let batch = HeaderBatch {
                    head_height: next_height,
                    headers,
                };
                if event_tx
                    .send(ReaderEvent::Batch {
                        batch,
                        confirmer,
                    })
                    .is_err()
                {
                    release_run_slot(&slot, run_id).await;
                    return;
                }
                match decision.await {
                    Err(_) => next_height += delivered,
                    Ok(rejection) => {
                        tracing::warn!(
                            head_height = next_height,
                            %rejection,
                            "continuous batch rejected, destroying stream"
                        );
                        stream.destroy(StreamError::Rejected(rejection.to_string()));
                        release_run_slot(&slot, run_id).await;
                        let _ = event_tx.send(ReaderEvent::Error(SyncError::Chain(rejection)));
                        return;
                    }
                }
            }
            StreamMessage::BeforeReconnect(handle) => {
                tracing::debug!(from_height = next_height, "updating reconnect arguments");
                handle.update(StreamArgs {
                    from_height: next_height,
                    count: 0,
                });
            }
            StreamMessage::Error(err) if err.is_cancellation() => {
                release_run_slot(&slot, run_id).await;
                return;
            }
            StreamMessage::Error(err) => {
                tracing::warn!(%err, "continuous stream failed");
                release_run_slot(&slot, run_id).await;
                let _ = event_tx.send(ReaderEvent::Error(err.into()));
                return;
            }
            StreamMessage::End => {
                tracing::debug!("continuous stream ended");
                release_run_slot(&slot, run_id).await;
                return;
            }
        }
    }
}
