//! Transport seam for header and transaction streams.
//!
//! The engine never speaks the wire protocol itself. A transport hands it
//! streams of already-decoded frames through the traits below:
//!
//! - [`HeaderStream`] / [`StreamOpener`] carry block headers for historical
//!   and continuous synchronization.
//! - [`TxStream`] / [`TxStreamOpener`] carry filtered transactions and
//!   merkle blocks for the Bloom-filter variant.
//!
//! Streams deliver [`StreamMessage`]s until they report `End` or `Error`,
//! and accept `cancel` (orderly shutdown, surfaces as a cancellation error)
//! and `destroy` (shutdown with a specific error).

use async_trait::async_trait;
use dashcore::{bloom::BloomFilter, merkle_tree::MerkleBlock, Header as BlockHeader, Transaction};
use tokio::sync::oneshot;

use crate::error::{StreamError, StreamResult};

/// Subscription arguments a transport uses to (re)establish a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamArgs {
    /// First height the stream should deliver.
    pub from_height: u32,
    /// Number of headers to deliver; `0` means unbounded (continuous).
    pub count: u32,
}

/// One-shot capability to amend subscription arguments before a transparent
/// transport reconnect.
///
/// The transport creates the handle, sends it inside
/// [`StreamMessage::BeforeReconnect`], and waits for the reply before
/// redialing. Dropping the handle without calling [`update`](Self::update)
/// tells the transport to keep its current arguments.
#[derive(Debug)]
pub struct ReconnectHandle {
    reply: oneshot::Sender<StreamArgs>,
}

impl ReconnectHandle {
    /// Create a handle and the receiver the transport waits on.
    pub fn pair() -> (Self, oneshot::Receiver<StreamArgs>) {
        let (reply, rx) = oneshot::channel();
        (
            Self {
                reply,
            },
            rx,
        )
    }

    /// Reply with amended subscription arguments.
    pub fn update(self, args: StreamArgs) {
        let _ = self.reply.send(args);
    }
}

/// A message delivered by a header stream.
#[derive(Debug)]
pub enum StreamMessage {
    /// One wire frame of decoded headers.
    Data(Vec<BlockHeader>),
    /// The transport is about to reconnect and invites the consumer to
    /// amend the subscription arguments. Continuous streams only.
    BeforeReconnect(ReconnectHandle),
    /// The stream failed. Terminal.
    Error(StreamError),
    /// The stream finished delivering its range. Terminal.
    End,
}

/// A unidirectional stream of block header frames.
///
/// After a terminal message (`End` or `Error`) the stream must not be
/// polled again.
#[async_trait]
pub trait HeaderStream: Send {
    /// Receive the next message.
    async fn recv(&mut self) -> StreamMessage;

    /// Request cancellation. The stream reports `Error(Cancelled)` once the
    /// transport acknowledges.
    fn cancel(&mut self);

    /// Tear the stream down with a specific error.
    fn destroy(&mut self, err: StreamError);
}

/// Constructor for header streams.
#[async_trait]
pub trait StreamOpener: Send + Sync {
    /// Open a stream delivering `count` headers starting at `from_height`.
    async fn open_historical(
        &self,
        from_height: u32,
        count: u32,
    ) -> StreamResult<Box<dyn HeaderStream>>;

    /// Open a long-lived stream delivering new headers from `from_height`.
    async fn open_continuous(&self, from_height: u32) -> StreamResult<Box<dyn HeaderStream>>;
}

/// One wire frame of a transaction stream.
#[derive(Debug)]
pub enum TxFrame {
    /// Raw transactions that passed the server-side Bloom filter.
    Transactions(Vec<Transaction>),
    /// A merkle block proving inclusion of filtered transactions.
    MerkleBlock(MerkleBlock),
}

/// A message delivered by a transaction stream.
#[derive(Debug)]
pub enum TxStreamMessage {
    /// One wire frame.
    Data(TxFrame),
    /// Reconnect invitation, as for header streams.
    BeforeReconnect(ReconnectHandle),
    /// The stream failed. Terminal.
    Error(StreamError),
    /// The stream finished delivering its range. Terminal.
    End,
}

/// A unidirectional stream of filtered transactions and merkle blocks.
#[async_trait]
pub trait TxStream: Send {
    /// Receive the next message.
    async fn recv(&mut self) -> TxStreamMessage;

    /// Request cancellation.
    fn cancel(&mut self);

    /// Tear the stream down with a specific error.
    fn destroy(&mut self, err: StreamError);
}

/// Constructor for transaction streams.
///
/// `count == 0` opens a continuous subscription.
#[async_trait]
pub trait TxStreamOpener: Send + Sync {
    async fn open(
        &self,
        filter: &BloomFilter,
        from_height: u32,
        count: u32,
    ) -> StreamResult<Box<dyn TxStream>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reconnect_handle_update() {
        let (handle, rx) = ReconnectHandle::pair();
        handle.update(StreamArgs {
            from_height: 102,
            count: 0,
        });

        let args = rx.await.unwrap();
        assert_eq!(args.from_height, 102);
        assert_eq!(args.count, 0);
    }

    #[tokio::test]
    async fn test_reconnect_handle_dropped_keeps_args() {
        let (handle, rx) = ReconnectHandle::pair();
        drop(handle);
        assert!(rx.await.is_err());
    }
}
