//! Scripted transaction streams and a recording opener.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use dashcore::bloom::BloomFilter;
use dashcore::{merkle_tree::MerkleBlock, Transaction};

use crate::error::{StreamError, StreamResult};
use crate::stream::{ReconnectHandle, TxFrame, TxStream, TxStreamMessage, TxStreamOpener};
use crate::test_utils::StreamProbe;

#[derive(Debug)]
enum TxScriptAction {
    Transactions(Vec<Transaction>),
    MerkleBlock(MerkleBlock),
    Error(StreamError),
    BeforeReconnect,
    End,
}

/// A transaction stream that plays back a scripted message sequence.
#[derive(Debug)]
pub struct MockTxStream {
    script: VecDeque<TxScriptAction>,
    cancelled: bool,
    destroyed: Option<StreamError>,
    hang: bool,
    probe: Arc<StreamProbe>,
}

impl Default for MockTxStream {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTxStream {
    pub fn new() -> Self {
        Self {
            script: VecDeque::new(),
            cancelled: false,
            destroyed: None,
            hang: false,
            probe: Arc::new(StreamProbe::default()),
        }
    }

    /// Append a raw transactions frame to the script.
    pub fn transactions(mut self, transactions: Vec<Transaction>) -> Self {
        self.script.push_back(TxScriptAction::Transactions(transactions));
        self
    }

    /// Append a merkle block frame to the script.
    pub fn merkle_block(mut self, block: MerkleBlock) -> Self {
        self.script.push_back(TxScriptAction::MerkleBlock(block));
        self
    }

    /// Append an error to the script.
    pub fn error(mut self, err: StreamError) -> Self {
        self.script.push_back(TxScriptAction::Error(err));
        self
    }

    /// Append a reconnect invitation to the script.
    pub fn before_reconnect(mut self) -> Self {
        self.script.push_back(TxScriptAction::BeforeReconnect);
        self
    }

    /// Append a clean end to the script.
    pub fn end(mut self) -> Self {
        self.script.push_back(TxScriptAction::End);
        self
    }

    /// Keep the stream open once the script is exhausted.
    pub fn hang_when_exhausted(mut self) -> Self {
        self.hang = true;
        self
    }

    /// Shared lifecycle observations.
    pub fn probe(&self) -> Arc<StreamProbe> {
        self.probe.clone()
    }
}

#[async_trait]
impl TxStream for MockTxStream {
    async fn recv(&mut self) -> TxStreamMessage {
        if let Some(err) = self.destroyed.take() {
            return TxStreamMessage::Error(err);
        }
        if self.cancelled {
            return TxStreamMessage::Error(StreamError::Cancelled);
        }
        match self.script.pop_front() {
            Some(TxScriptAction::Transactions(transactions)) => {
                TxStreamMessage::Data(TxFrame::Transactions(transactions))
            }
            Some(TxScriptAction::MerkleBlock(block)) => {
                TxStreamMessage::Data(TxFrame::MerkleBlock(block))
            }
            Some(TxScriptAction::Error(err)) => TxStreamMessage::Error(err),
            Some(TxScriptAction::BeforeReconnect) => {
                let (handle, rx) = ReconnectHandle::pair();
                self.probe.record_reconnect(rx);
                TxStreamMessage::BeforeReconnect(handle)
            }
            Some(TxScriptAction::End) => TxStreamMessage::End,
            None => {
                if self.hang {
                    std::future::pending().await
                } else {
                    TxStreamMessage::End
                }
            }
        }
    }

    fn cancel(&mut self) {
        self.cancelled = true;
        self.probe.record_cancel();
    }

    fn destroy(&mut self, err: StreamError) {
        self.probe.record_destroy(err.clone());
        self.destroyed = Some(err);
    }
}

/// Arguments of one transaction stream open call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxOpenCall {
    pub from_height: u32,
    pub count: u32,
}

/// A transaction stream opener serving scripted streams in push order.
#[derive(Debug, Default)]
pub struct MockTxStreamOpener {
    streams: Mutex<VecDeque<StreamResult<MockTxStream>>>,
    opens: Mutex<Vec<TxOpenCall>>,
}

impl MockTxStreamOpener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a stream for the next open call.
    pub fn push_stream(&self, stream: MockTxStream) {
        self.streams.lock().unwrap().push_back(Ok(stream));
    }

    /// Queue a failure for the next open call.
    pub fn push_open_error(&self, err: StreamError) {
        self.streams.lock().unwrap().push_back(Err(err));
    }

    /// Every open call, in call order.
    pub fn opens(&self) -> Vec<TxOpenCall> {
        self.opens.lock().unwrap().clone()
    }
}

#[async_trait]
impl TxStreamOpener for MockTxStreamOpener {
    async fn open(
        &self,
        _filter: &BloomFilter,
        from_height: u32,
        count: u32,
    ) -> StreamResult<Box<dyn TxStream>> {
        self.opens.lock().unwrap().push(TxOpenCall {
            from_height,
            count,
        });
        match self.streams.lock().unwrap().pop_front() {
            Some(Ok(stream)) => Ok(Box::new(stream)),
            Some(Err(err)) => Err(err),
            None => Err(StreamError::Connection("no scripted stream available".to_string())),
        }
    }
}
