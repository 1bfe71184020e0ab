//! Header stream synchronization.

pub mod events;
pub mod plan;
pub mod provider;
pub mod reader;

pub use events::{BatchConfirmer, ProviderEvent, ProviderEvents, ReaderEvent};
pub use plan::{partition, SubStreamSlice};
pub use provider::{BlockHeadersProvider, BlockHeadersProviderBuilder};
pub use reader::BlockHeadersReader;
