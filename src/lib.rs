//! Parallel stream synchronization engine for Dash SPV clients.
//!
//! This library pulls block headers from a remote node over streaming
//! transports and feeds them into an SPV chain validator:
//!
//! - Historical ranges are fanned out into bounded parallel sub-streams,
//!   each retrying transient transport errors from the exact height it last
//!   delivered
//! - A long-lived continuous stream delivers newly mined headers and
//!   survives transport reconnects without re-delivering a height
//! - A transaction-stream variant manages a BIP37 Bloom filter and a
//!   two-phase merkle-block accept/reject protocol, restarting the stream
//!   when the watched address set grows
//!
//! The wire transport is injected through the [`stream`] traits; the engine
//! itself never decodes frames or talks to the network.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use dash_stream_sync::chain::HeaderChain;
//! use dash_stream_sync::stream::StreamOpener;
//! use dash_stream_sync::sync::{BlockHeadersProvider, ProviderEvent};
//!
//! # async fn example(opener: Arc<dyn StreamOpener>) -> Result<(), Box<dyn std::error::Error>> {
//! let provider = BlockHeadersProvider::builder(HeaderChain::new(1))
//!     .with_opener(opener)
//!     .build();
//! let mut events = provider.events();
//!
//! provider.read_historical(1, 750_000).await?;
//!
//! while let Some(event) = events.recv().await {
//!     match event {
//!         ProviderEvent::ChainUpdated { head_height, headers } => {
//!             println!("accepted {} headers at {}", headers.len(), head_height);
//!         }
//!         ProviderEvent::HistoricalDataObtained => break,
//!         ProviderEvent::Stopped => break,
//!         ProviderEvent::Error(err) => return Err(err.into()),
//!     }
//! }
//! # Ok(())
//! # }
//! ```

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub mod bloom;
pub mod chain;
pub mod error;
pub mod logging;
pub mod stream;
pub mod sync;
pub mod types;

// Re-export main types for convenience
pub use bloom::{BloomFilterConfig, BloomFilterSession, TransactionsReader, TxReaderEvent};
pub use chain::{HeaderChain, SpvChain};
pub use error::{ChainError, ChainResult, StreamError, SyncError, SyncResult};
pub use logging::{init_console_logging, LoggingError, LoggingResult};
pub use sync::{
    BlockHeadersProvider, BlockHeadersReader, ProviderEvent, ProviderEvents, ReaderEvent,
};
pub use tracing::level_filters::LevelFilter;
pub use types::{HeaderBatch, ProviderState, ReaderConfig};

// Re-export commonly used dashcore types
pub use dashcore::{Address, BlockHash, Header as BlockHeader, Transaction};

/// Current version of the dash-stream-sync library.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
