//! SPV chain collaborator interface.
//!
//! The engine drives a chain validator through the small capability set
//! below; reorg resolution, proof-of-work rules and pruning live behind it.
//! [`HeaderChain`] is a minimal in-memory implementation with an orphan
//! buffer, enough for demos and integration tests.

mod header_chain;

pub use header_chain::HeaderChain;

use dashcore::{BlockHash, Header as BlockHeader};

use crate::error::ChainResult;

/// Capability set the engine requires from an SPV chain.
///
/// All calls happen serially from the provider's dispatch task; the chain
/// never needs internal synchronization for the engine's sake.
pub trait SpvChain: Send + 'static {
    /// Add a contiguous batch of headers whose first header sits at
    /// `head_height`.
    ///
    /// Returns the headers actually appended. Headers overlapping known or
    /// pruned state are silently dropped from the result; batches that do
    /// not connect yet may be buffered and returned by a later call.
    ///
    /// Errors where [`ChainError::is_rejection`](crate::error::ChainError::is_rejection)
    /// holds reject the delivered content without poisoning chain state;
    /// any other error means the chain itself is broken.
    fn add_headers(
        &mut self,
        headers: &[BlockHeader],
        head_height: u32,
    ) -> ChainResult<Vec<BlockHeader>>;

    /// Verify the chain is complete and consistent after a sync run.
    fn validate(&mut self) -> ChainResult<()>;

    /// Drop all state and re-anchor the chain at `height`.
    fn reset(&mut self, height: u32);

    /// Hash of the stored header at `height`, if present.
    fn hash_at_height(&self, height: u32) -> Option<BlockHash>;

    /// Height of the best stored header, if any.
    fn tip_height(&self) -> Option<u32>;
}
