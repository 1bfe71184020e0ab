//! Recording chain collaborator for provider tests.

use std::collections::{HashSet, VecDeque};

use dashcore::hashes::Hash;
use dashcore::{BlockHash, Header as BlockHeader};

use crate::chain::SpvChain;
use crate::error::ChainResult;

/// A chain that records every call and plays back scripted responses.
///
/// Responses are `Ok(n)` to accept the batch minus its first `n` headers
/// (known overlap) or an error; an exhausted script accepts everything.
#[derive(Debug, Default)]
pub struct MockChain {
    add_calls: Vec<(u32, usize)>,
    resets: Vec<u32>,
    validate_calls: usize,
    present_heights: HashSet<u32>,
    responses: VecDeque<ChainResult<usize>>,
    tip: Option<u32>,
}

impl MockChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretend a header exists at `height`.
    pub fn with_present_height(mut self, height: u32) -> Self {
        self.present_heights.insert(height);
        self
    }

    /// Script the response to the next unanswered `add_headers` call.
    pub fn with_response(mut self, response: ChainResult<usize>) -> Self {
        self.responses.push_back(response);
        self
    }

    /// `(head_height, len)` of every `add_headers` call.
    pub fn add_calls(&self) -> Vec<(u32, usize)> {
        self.add_calls.clone()
    }

    /// Heights `reset` was called with.
    pub fn resets(&self) -> Vec<u32> {
        self.resets.clone()
    }

    /// How many times `validate` was called.
    pub fn validate_calls(&self) -> usize {
        self.validate_calls
    }
}

impl SpvChain for MockChain {
    fn add_headers(
        &mut self,
        headers: &[BlockHeader],
        head_height: u32,
    ) -> ChainResult<Vec<BlockHeader>> {
        self.add_calls.push((head_height, headers.len()));
        match self.responses.pop_front().unwrap_or(Ok(0)) {
            Ok(dropped) => {
                let dropped = dropped.min(headers.len());
                let accepted = headers[dropped..].to_vec();
                if !accepted.is_empty() {
                    self.tip = Some(head_height + headers.len() as u32 - 1);
                }
                Ok(accepted)
            }
            Err(err) => Err(err),
        }
    }

    fn validate(&mut self) -> ChainResult<()> {
        self.validate_calls += 1;
        Ok(())
    }

    fn reset(&mut self, height: u32) {
        self.resets.push(height);
        self.tip = None;
    }

    fn hash_at_height(&self, height: u32) -> Option<BlockHash> {
        if self.present_heights.contains(&height) {
            let mut bytes = [0u8; 32];
            bytes[..4].copy_from_slice(&height.to_le_bytes());
            Some(BlockHash::from_byte_array(bytes))
        } else {
            None
        }
    }

    fn tip_height(&self) -> Option<u32> {
        self.tip
    }
}
