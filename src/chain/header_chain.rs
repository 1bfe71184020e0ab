//! In-memory header chain with out-of-order tolerance.

use dashcore::{BlockHash, Header as BlockHeader};
use tracing::{debug, warn};

use crate::chain::SpvChain;
use crate::error::{ChainError, ChainResult};

/// Maximum number of disconnected ranges buffered while waiting for a gap
/// to fill.
const MAX_ORPHAN_RANGES: usize = 64;

/// A batch that arrived ahead of the chain tip.
#[derive(Debug, Clone)]
struct OrphanRange {
    head_height: u32,
    headers: Vec<BlockHeader>,
}

/// Append-only in-memory header chain.
///
/// Headers are stored contiguously from an anchor height. Batches arriving
/// ahead of the tip are buffered and folded in once the gap closes, so
/// parallel readers can deliver ranges in any order. Overlap with already
/// stored headers is deduplicated silently; conflicting overlap is rejected
/// (reorg resolution is the job of a full validator).
#[derive(Debug)]
pub struct HeaderChain {
    /// Height of `headers[0]`.
    anchor: u32,
    headers: Vec<BlockHeader>,
    orphans: Vec<OrphanRange>,
    max_orphan_ranges: usize,
}

impl HeaderChain {
    /// Create an empty chain anchored at `height`.
    pub fn new(height: u32) -> Self {
        Self {
            anchor: height,
            headers: Vec::new(),
            orphans: Vec::new(),
            max_orphan_ranges: MAX_ORPHAN_RANGES,
        }
    }

    /// Create a chain with a custom orphan range cap.
    pub fn with_max_orphan_ranges(mut self, max: usize) -> Self {
        self.max_orphan_ranges = max.max(1);
        self
    }

    /// Height the next appended header will occupy.
    pub fn next_height(&self) -> u32 {
        self.anchor + self.headers.len() as u32
    }

    /// Number of stored headers.
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    /// Whether the chain holds no headers.
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Number of buffered disconnected ranges.
    pub fn orphaned_ranges(&self) -> usize {
        self.orphans.len()
    }

    /// Stored header at `height`, if present.
    pub fn header_at_height(&self, height: u32) -> Option<&BlockHeader> {
        if height < self.anchor {
            return None;
        }
        self.headers.get((height - self.anchor) as usize)
    }

    fn tip_hash(&self) -> Option<BlockHash> {
        self.headers.last().map(|h| h.block_hash())
    }

    /// Append one internally-linked batch, deduplicating overlap.
    ///
    /// Returns the newly appended suffix. Batches starting ahead of the tip
    /// are not handled here.
    fn integrate(
        &mut self,
        headers: &[BlockHeader],
        head_height: u32,
        accepted: &mut Vec<BlockHeader>,
    ) -> ChainResult<()> {
        // Drop the part below the anchor; it overlaps pruned state.
        let (headers, head_height) = if head_height < self.anchor {
            let skip = (self.anchor - head_height) as usize;
            if skip >= headers.len() {
                return Ok(());
            }
            (&headers[skip..], self.anchor)
        } else {
            (headers, head_height)
        };

        let next = self.next_height();
        debug_assert!(head_height <= next);

        // Overlap with stored headers must match exactly.
        let overlap = (next - head_height) as usize;
        for (i, header) in headers.iter().take(overlap).enumerate() {
            let height = head_height + i as u32;
            let stored = self
                .header_at_height(height)
                .map(|h| h.block_hash())
                .ok_or_else(|| ChainError::Internal(format!("missing header at height {}", height)))?;
            if stored != header.block_hash() {
                return Err(ChainError::NonContiguous(format!(
                    "conflicts with stored header at height {}",
                    height
                )));
            }
        }

        if overlap >= headers.len() {
            return Ok(());
        }

        let fresh = &headers[overlap..];
        if let Some(tip) = self.tip_hash() {
            if fresh[0].prev_blockhash != tip {
                return Err(ChainError::NonContiguous(format!(
                    "header at height {} does not extend the tip",
                    next
                )));
            }
        }

        self.headers.extend_from_slice(fresh);
        accepted.extend_from_slice(fresh);
        Ok(())
    }

    fn stash_orphan(&mut self, headers: &[BlockHeader], head_height: u32) {
        if self.orphans.iter().any(|o| o.head_height == head_height) {
            debug!(head_height, "orphan range already buffered");
            return;
        }
        while self.orphans.len() >= self.max_orphan_ranges {
            let evicted = self.orphans.remove(0);
            warn!(head_height = evicted.head_height, "evicting oldest orphan range");
        }
        debug!(head_height, count = headers.len(), "buffering out-of-order range");
        self.orphans.push(OrphanRange {
            head_height,
            headers: headers.to_vec(),
        });
    }

    fn drain_orphans(&mut self, accepted: &mut Vec<BlockHeader>) {
        loop {
            let next = self.next_height();
            let Some(pos) = self.orphans.iter().position(|o| o.head_height <= next) else {
                break;
            };
            let orphan = self.orphans.remove(pos);
            if let Err(err) = self.integrate(&orphan.headers, orphan.head_height, accepted) {
                warn!(head_height = orphan.head_height, %err, "dropping conflicting orphan range");
            }
        }
    }

    fn check_batch_linkage(headers: &[BlockHeader]) -> ChainResult<()> {
        for pair in headers.windows(2) {
            if pair[1].prev_blockhash != pair[0].block_hash() {
                return Err(ChainError::NonContiguous(
                    "batch is not internally linked".to_string(),
                ));
            }
        }
        Ok(())
    }
}

impl SpvChain for HeaderChain {
    fn add_headers(
        &mut self,
        headers: &[BlockHeader],
        head_height: u32,
    ) -> ChainResult<Vec<BlockHeader>> {
        if headers.is_empty() {
            return Ok(Vec::new());
        }
        Self::check_batch_linkage(headers)?;

        let mut accepted = Vec::new();
        if head_height > self.next_height() {
            self.stash_orphan(headers, head_height);
        } else {
            self.integrate(headers, head_height, &mut accepted)?;
        }
        self.drain_orphans(&mut accepted);
        Ok(accepted)
    }

    fn validate(&mut self) -> ChainResult<()> {
        if !self.orphans.is_empty() {
            return Err(ChainError::Internal(format!(
                "{} header ranges never connected to the chain",
                self.orphans.len()
            )));
        }
        Ok(())
    }

    fn reset(&mut self, height: u32) {
        debug!(height, "resetting chain anchor");
        self.anchor = height;
        self.headers.clear();
        self.orphans.clear();
    }

    fn hash_at_height(&self, height: u32) -> Option<BlockHash> {
        self.header_at_height(height).map(|h| h.block_hash())
    }

    fn tip_height(&self) -> Option<u32> {
        if self.headers.is_empty() {
            None
        } else {
            Some(self.anchor + self.headers.len() as u32 - 1)
        }
    }
}
