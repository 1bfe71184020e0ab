//! Scripted header streams and a recording opener.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use dashcore::Header as BlockHeader;
use tokio::sync::oneshot;

use crate::error::{StreamError, StreamResult};
use crate::stream::{HeaderStream, ReconnectHandle, StreamArgs, StreamMessage, StreamOpener};

/// Observations of one mock stream's lifecycle, shared with the test.
#[derive(Debug, Default)]
pub struct StreamProbe {
    cancels: Mutex<usize>,
    destroys: Mutex<Vec<StreamError>>,
    reconnects: Mutex<Vec<oneshot::Receiver<StreamArgs>>>,
}

impl StreamProbe {
    pub(crate) fn record_cancel(&self) {
        *self.cancels.lock().unwrap() += 1;
    }

    pub(crate) fn record_destroy(&self, err: StreamError) {
        self.destroys.lock().unwrap().push(err);
    }

    pub(crate) fn record_reconnect(&self, rx: oneshot::Receiver<StreamArgs>) {
        self.reconnects.lock().unwrap().push(rx);
    }

    /// How many times `cancel` was called.
    pub fn cancel_count(&self) -> usize {
        *self.cancels.lock().unwrap()
    }

    /// Errors `destroy` was called with.
    pub fn destroys(&self) -> Vec<StreamError> {
        self.destroys.lock().unwrap().clone()
    }

    /// Wait for the reply to the oldest `BeforeReconnect` invitation.
    pub async fn reconnect_update(&self) -> StreamArgs {
        loop {
            let rx = {
                let mut reconnects = self.reconnects.lock().unwrap();
                if reconnects.is_empty() {
                    None
                } else {
                    Some(reconnects.remove(0))
                }
            };
            match rx {
                Some(rx) => return rx.await.expect("reconnect handle dropped without update"),
                None => tokio::time::sleep(Duration::from_millis(1)).await,
            }
        }
    }
}

#[derive(Debug)]
enum ScriptAction {
    Frame(Vec<BlockHeader>),
    Error(StreamError),
    BeforeReconnect,
    End,
}

/// A header stream that plays back a scripted message sequence.
///
/// `cancel` makes the next receive report `Error(Cancelled)` regardless of
/// remaining script; `destroy` does the same with the given error. An
/// exhausted script ends the stream unless
/// [`hang_when_exhausted`](Self::hang_when_exhausted) keeps it open.
#[derive(Debug)]
pub struct MockHeaderStream {
    script: VecDeque<ScriptAction>,
    cancelled: bool,
    destroyed: Option<StreamError>,
    hang: bool,
    probe: Arc<StreamProbe>,
}

impl Default for MockHeaderStream {
    fn default() -> Self {
        Self::new()
    }
}

impl MockHeaderStream {
    pub fn new() -> Self {
        Self {
            script: VecDeque::new(),
            cancelled: false,
            destroyed: None,
            hang: false,
            probe: Arc::new(StreamProbe::default()),
        }
    }

    /// Append a data frame to the script.
    pub fn frame(mut self, headers: Vec<BlockHeader>) -> Self {
        self.script.push_back(ScriptAction::Frame(headers));
        self
    }

    /// Append an error to the script.
    pub fn error(mut self, err: StreamError) -> Self {
        self.script.push_back(ScriptAction::Error(err));
        self
    }

    /// Append a reconnect invitation to the script.
    pub fn before_reconnect(mut self) -> Self {
        self.script.push_back(ScriptAction::BeforeReconnect);
        self
    }

    /// Append a clean end to the script.
    pub fn end(mut self) -> Self {
        self.script.push_back(ScriptAction::End);
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
impl HeaderStream for MockHeaderStream {
    async fn recv(&mut self) -> StreamMessage {
        if let Some(err) = self.destroyed.take() {
            return StreamMessage::Error(err);
        }
        if self.cancelled {
            return StreamMessage::Error(StreamError::Cancelled);
        }
        match self.script.pop_front() {
            Some(ScriptAction::Frame(headers)) => StreamMessage::Data(headers),
            Some(ScriptAction::Error(err)) => StreamMessage::Error(err),
            Some(ScriptAction::BeforeReconnect) => {
                let (handle, rx) = ReconnectHandle::pair();
                self.probe.record_reconnect(rx);
                StreamMessage::BeforeReconnect(handle)
            }
            Some(ScriptAction::End) => StreamMessage::End,
            None => {
                if self.hang {
                    std::future::pending().await
                } else {
                    StreamMessage::End
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

/// A stream opener serving scripted streams in push order.
#[derive(Debug, Default)]
pub struct MockStreamOpener {
    streams: Mutex<VecDeque<StreamResult<MockHeaderStream>>>,
    historical_opens: Mutex<Vec<(u32, u32)>>,
    continuous_opens: Mutex<Vec<u32>>,
}

impl MockStreamOpener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a stream for the next open call.
    pub fn push_stream(&self, stream: MockHeaderStream) {
        self.streams.lock().unwrap().push_back(Ok(stream));
    }

    /// Queue a failure for the next open call.
    pub fn push_open_error(&self, err: StreamError) {
        self.streams.lock().unwrap().push_back(Err(err));
    }

    /// `(from_height, count)` of every historical open, in call order.
    pub fn historical_opens(&self) -> Vec<(u32, u32)> {
        self.historical_opens.lock().unwrap().clone()
    }

    /// `from_height` of every continuous open, in call order.
    pub fn continuous_opens(&self) -> Vec<u32> {
        self.continuous_opens.lock().unwrap().clone()
    }

    fn next_stream(&self) -> StreamResult<Box<dyn HeaderStream>> {
        match self.streams.lock().unwrap().pop_front() {
            Some(Ok(stream)) => Ok(Box::new(stream)),
            Some(Err(err)) => Err(err),
            None => Err(StreamError::Connection("no scripted stream available".to_string())),
        }
    }
}

#[async_trait]
impl StreamOpener for MockStreamOpener {
    async fn open_historical(
        &self,
        from_height: u32,
        count: u32,
    ) -> StreamResult<Box<dyn HeaderStream>> {
        self.historical_opens.lock().unwrap().push((from_height, count));
        self.next_stream()
    }

    async fn open_continuous(&self, from_height: u32) -> StreamResult<Box<dyn HeaderStream>> {
        self.continuous_opens.lock().unwrap().push(from_height);
        self.next_stream()
    }
}
