//! Common types for the stream synchronization engine.

use std::time::Duration;

use dashcore::Header as BlockHeader;

/// A contiguous run of headers delivered atomically with a starting height.
#[derive(Debug, Clone)]
pub struct HeaderBatch {
    /// Ordered headers; heights are contiguous and increasing.
    pub headers: Vec<BlockHeader>,
    /// Height of `headers[0]`.
    pub head_height: u32,
}

impl HeaderBatch {
    /// Number of headers in the batch.
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    /// Whether the batch carries no headers.
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Height of the last header in the batch.
    ///
    /// Equals `head_height` for a single-header batch.
    pub fn tail_height(&self) -> u32 {
        self.head_height + self.headers.len().saturating_sub(1) as u32
    }
}

/// Configuration for header stream readers.
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Maximum retry attempts per sub-stream (not per plan).
    pub max_retries: u32,
    /// Hard cap on concurrently live sub-streams.
    pub max_parallel_streams: u32,
    /// Preferred number of headers per sub-stream.
    pub target_batch_size: u32,
    /// Delay before reopening a failed stream. Zero yields to the scheduler
    /// once instead of sleeping.
    pub retry_delay: Duration,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            max_retries: 10,
            max_parallel_streams: 6,
            target_batch_size: 50_000,
            retry_delay: Duration::ZERO,
        }
    }
}

impl ReaderConfig {
    /// Create config with custom max retries.
    pub fn with_max_retries(mut self, max: u32) -> Self {
        self.max_retries = max;
        self
    }

    /// Create config with custom parallel stream cap.
    pub fn with_max_parallel_streams(mut self, max: u32) -> Self {
        self.max_parallel_streams = max.max(1);
        self
    }

    /// Create config with custom target batch size.
    pub fn with_target_batch_size(mut self, size: u32) -> Self {
        self.target_batch_size = size.max(1);
        self
    }

    /// Create config with custom retry delay.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }
}

/// States of a block headers provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderState {
    /// No sync in progress.
    Idle,
    /// A historical read is running.
    HistoricalSync,
    /// A continuous subscription is running.
    ContinuousSync,
}

impl ProviderState {
    /// Short name for logging and busy errors.
    pub fn name(&self) -> &'static str {
        match self {
            ProviderState::Idle => "idle",
            ProviderState::HistoricalSync => "historical sync",
            ProviderState::ContinuousSync => "continuous sync",
        }
    }
}

impl std::fmt::Display for ProviderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_config_builders() {
        let config = ReaderConfig::default()
            .with_max_retries(3)
            .with_max_parallel_streams(4)
            .with_target_batch_size(100)
            .with_retry_delay(Duration::from_millis(5));

        assert_eq!(config.max_retries, 3);
        assert_eq!(config.max_parallel_streams, 4);
        assert_eq!(config.target_batch_size, 100);
        assert_eq!(config.retry_delay, Duration::from_millis(5));
    }

    #[test]
    fn test_reader_config_floors() {
        let config = ReaderConfig::default().with_max_parallel_streams(0).with_target_batch_size(0);
        assert_eq!(config.max_parallel_streams, 1);
        assert_eq!(config.target_batch_size, 1);
    }

    #[test]
    fn test_provider_state_names() {
        assert_eq!(ProviderState::Idle.name(), "idle");
        assert_eq!(ProviderState::HistoricalSync.to_string(), "historical sync");
    }
}
