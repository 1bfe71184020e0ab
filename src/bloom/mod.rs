//! Bloom-filtered transaction stream synchronization.

pub mod reader;
pub mod session;

pub use reader::{
    AddressAppender, MerkleBlockHandle, TransactionsReader, TxReaderConfig, TxReaderEvent,
};
pub use session::{BloomFilterConfig, BloomFilterSession};
