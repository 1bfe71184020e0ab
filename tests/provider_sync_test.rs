//! Integration tests for the provider state machine over a real in-memory
//! chain.

use std::sync::Arc;

use dash_stream_sync::chain::{HeaderChain, SpvChain};
use dash_stream_sync::error::{ChainError, StreamError, SyncError};
use dash_stream_sync::sync::{BlockHeadersProvider, ProviderEvent};
use dash_stream_sync::test_utils::{
    test_header_chain_from, test_headers, MockChain, MockHeaderStream, MockStreamOpener,
};
use dash_stream_sync::types::{ProviderState, ReaderConfig};
use dash_stream_sync::BlockHash;
use dashcore::hashes::Hash;
use log::info;

fn zero_hash() -> BlockHash {
    BlockHash::from_byte_array([0u8; 32])
}

/// Collect provider events until a terminal one.
async fn collect_until_terminal(
    events: &mut dash_stream_sync::ProviderEvents,
) -> Vec<ProviderEvent> {
    let mut seen = Vec::new();
    loop {
        let event = events.recv().await.expect("provider dropped");
        let terminal = matches!(
            event,
            ProviderEvent::HistoricalDataObtained
                | ProviderEvent::Stopped
                | ProviderEvent::Error(_)
        );
        seen.push(event);
        if terminal {
            return seen;
        }
    }
}

#[tokio::test]
async fn test_historical_sync_into_header_chain() {
    let _ = env_logger::try_init();

    // Linked chain split across two sub-streams delivered out of order:
    // the orphan buffer must reassemble it.
    let headers = test_header_chain_from(1, zero_hash(), 40);
    let opener = Arc::new(MockStreamOpener::new());
    opener.push_stream(MockHeaderStream::new().frame(headers[..20].to_vec()).end());
    opener.push_stream(MockHeaderStream::new().frame(headers[20..].to_vec()).end());

    let provider = BlockHeadersProvider::builder(HeaderChain::new(1))
        .with_opener(opener)
        .with_config(ReaderConfig::default().with_target_batch_size(20).with_max_parallel_streams(2))
        .build();
    let mut events = provider.events();

    provider.read_historical(1, 40).await.expect("read should start");
    let seen = collect_until_terminal(&mut events).await;

    assert!(matches!(seen.last(), Some(ProviderEvent::HistoricalDataObtained)));

    let updated: u32 = seen
        .iter()
        .filter_map(|e| match e {
            ProviderEvent::ChainUpdated {
                headers, ..
            } => Some(headers.len() as u32),
            _ => None,
        })
        .sum();
    assert_eq!(updated, 40, "every height must be reported accepted exactly once");

    let chain = provider.chain();
    let chain = chain.lock().await;
    assert_eq!(chain.tip_height(), Some(40));
    assert_eq!(provider.state().await, ProviderState::Idle);
    info!("historical sync assembled 40 headers across 2 sub-streams");
}

#[tokio::test]
async fn test_ensure_chain_root_allows_anchored_start() {
    let _ = env_logger::try_init();

    let headers = test_header_chain_from(5, zero_hash(), 6);
    let opener = Arc::new(MockStreamOpener::new());
    opener.push_stream(MockHeaderStream::new().frame(headers).end());

    // The chain is anchored at 1 and holds nothing at height 4, so the
    // provider must reset it to 5 before syncing [5, 10].
    let provider = BlockHeadersProvider::builder(HeaderChain::new(1)).with_opener(opener).build();
    let mut events = provider.events();

    provider.read_historical(5, 10).await.expect("read should start");
    let seen = collect_until_terminal(&mut events).await;

    assert!(matches!(seen.last(), Some(ProviderEvent::HistoricalDataObtained)));
    let chain = provider.chain();
    let chain = chain.lock().await;
    assert_eq!(chain.tip_height(), Some(10));
    assert_eq!(chain.hash_at_height(4), None);
}

#[tokio::test]
async fn test_ensure_chain_root_reset_recorded() {
    let _ = env_logger::try_init();

    let opener = Arc::new(MockStreamOpener::new());
    opener.push_stream(MockHeaderStream::new().end());
    let provider = BlockHeadersProvider::builder(MockChain::new()).with_opener(opener).build();

    provider.read_historical(5, 10).await.expect("read should start");

    let chain = provider.chain();
    assert_eq!(chain.lock().await.resets(), vec![5]);
}

#[tokio::test]
async fn test_chain_rejection_is_not_surfaced_and_retries() {
    let _ = env_logger::try_init();

    let opener = Arc::new(MockStreamOpener::new());
    let poisoned = MockHeaderStream::new().frame(test_headers(1, 10));
    let probe = poisoned.probe();
    opener.push_stream(poisoned);
    opener.push_stream(MockHeaderStream::new().frame(test_headers(1, 10)).end());

    let chain =
        MockChain::new().with_response(Err(ChainError::InvalidHeader("bad pow".to_string())));
    let provider = BlockHeadersProvider::builder(chain)
        .with_opener(opener.clone())
        .with_config(ReaderConfig::default().with_max_retries(1))
        .build();
    let mut events = provider.events();

    provider.read_historical(1, 10).await.expect("read should start");
    let seen = collect_until_terminal(&mut events).await;

    // The rejection stayed internal; the run completed on the replacement
    // stream.
    assert!(matches!(seen.last(), Some(ProviderEvent::HistoricalDataObtained)));
    assert!(!seen.iter().any(|e| matches!(e, ProviderEvent::Error(_))));
    assert_eq!(probe.destroys().len(), 1);
    assert_eq!(opener.historical_opens(), vec![(1, 10), (1, 10)]);
}

#[tokio::test]
async fn test_busy_and_stop_transitions() {
    let _ = env_logger::try_init();

    let opener = Arc::new(MockStreamOpener::new());
    opener.push_stream(MockHeaderStream::new().hang_when_exhausted());
    opener.push_stream(MockHeaderStream::new().hang_when_exhausted());
    let provider = BlockHeadersProvider::builder(MockChain::new()).with_opener(opener).build();
    let mut events = provider.events();

    provider.read_historical(1, 100).await.expect("read should start");
    assert_eq!(provider.state().await, ProviderState::HistoricalSync);
    assert!(matches!(provider.read_historical(1, 100).await, Err(SyncError::Busy(_))));
    assert!(matches!(provider.start_continuous_sync(1).await, Err(SyncError::Busy(_))));

    provider.stop().await;
    assert_eq!(provider.state().await, ProviderState::Idle);
    let seen = collect_until_terminal(&mut events).await;
    assert!(matches!(seen.as_slice(), [ProviderEvent::Stopped]));

    // Stopped means free: a new run may begin, lower than the first.
    provider.start_continuous_sync(1).await.expect("continuous should start");
    assert_eq!(provider.state().await, ProviderState::ContinuousSync);
    provider.stop().await;
}

#[tokio::test]
async fn test_continuous_sync_delivers_and_reconnects() {
    let _ = env_logger::try_init();

    let headers = test_header_chain_from(100, zero_hash(), 3);
    let opener = Arc::new(MockStreamOpener::new());
    let stream = MockHeaderStream::new()
        .frame(headers[..2].to_vec())
        .before_reconnect()
        .frame(headers[2..].to_vec())
        .hang_when_exhausted();
    let probe = stream.probe();
    opener.push_stream(stream);

    let provider =
        BlockHeadersProvider::builder(HeaderChain::new(100)).with_opener(opener.clone()).build();
    let mut events = provider.events();

    provider.start_continuous_sync(100).await.expect("continuous should start");
    assert_eq!(opener.continuous_opens(), vec![100]);

    match events.recv().await.unwrap() {
        ProviderEvent::ChainUpdated {
            head_height,
            headers,
        } => {
            assert_eq!(head_height, 100);
            assert_eq!(headers.len(), 2);
        }
        other => panic!("expected ChainUpdated, got {:?}", other),
    }

    // The reconnect reply must resume exactly past the delivered heights.
    let args = probe.reconnect_update().await;
    assert_eq!(args.from_height, 102);
    assert_eq!(args.count, 0);

    match events.recv().await.unwrap() {
        ProviderEvent::ChainUpdated {
            head_height,
            headers,
        } => {
            assert_eq!(head_height, 102);
            assert_eq!(headers.len(), 1);
        }
        other => panic!("expected ChainUpdated, got {:?}", other),
    }

    provider.stop().await;
    let chain = provider.chain();
    assert_eq!(chain.lock().await.tip_height(), Some(102));
}

#[tokio::test]
async fn test_continuous_rejection_surfaces_error() {
    let _ = env_logger::try_init();

    // Headers that do not link: the chain rejects the second frame, which
    // destroys the stream and ends the run with an error.
    let linked = test_header_chain_from(100, zero_hash(), 2);
    let opener = Arc::new(MockStreamOpener::new());
    let stream = MockHeaderStream::new()
        .frame(linked.clone())
        .frame(test_headers(500, 2))
        .hang_when_exhausted();
    let probe = stream.probe();
    opener.push_stream(stream);

    let provider =
        BlockHeadersProvider::builder(HeaderChain::new(100)).with_opener(opener).build();
    let mut events = provider.events();

    provider.start_continuous_sync(100).await.expect("continuous should start");

    let seen = collect_until_terminal(&mut events).await;
    assert!(matches!(seen.last(), Some(ProviderEvent::Error(SyncError::Chain(_)))));
    assert_eq!(probe.destroys().len(), 1);
    assert_eq!(provider.state().await, ProviderState::Idle);
}

#[tokio::test]
async fn test_fatal_chain_error_drops_reader() {
    let _ = env_logger::try_init();

    let opener = Arc::new(MockStreamOpener::new());
    opener.push_stream(MockHeaderStream::new().frame(test_headers(1, 5)).hang_when_exhausted());
    let chain = MockChain::new().with_response(Err(ChainError::Internal("corrupt".to_string())));
    let provider = BlockHeadersProvider::builder(chain).with_opener(opener).build();
    let mut events = provider.events();

    provider.read_historical(1, 5).await.expect("read should start");

    let seen = collect_until_terminal(&mut events).await;
    match seen.last() {
        Some(ProviderEvent::Error(SyncError::Chain(err))) => assert!(!err.is_rejection()),
        other => panic!("expected fatal chain error, got {:?}", other),
    }
    assert_eq!(provider.state().await, ProviderState::Idle);

    // Fatal errors leave the provider reusable, not stuck busy.
    let result = provider.read_historical(1, 5).await;
    assert!(!matches!(result, Err(SyncError::Busy(_))));
}

#[tokio::test]
async fn test_stream_error_with_no_retries_returns_to_idle() {
    let _ = env_logger::try_init();

    let opener = Arc::new(MockStreamOpener::new());
    opener.push_stream(MockHeaderStream::new().error(StreamError::Timeout));
    let provider = BlockHeadersProvider::builder(MockChain::new())
        .with_opener(opener)
        .with_config(ReaderConfig::default().with_max_retries(0))
        .build();
    let mut events = provider.events();

    provider.read_historical(1, 10).await.expect("read should start");

    let seen = collect_until_terminal(&mut events).await;
    assert!(matches!(seen.last(), Some(ProviderEvent::Error(SyncError::RetriesExhausted(_)))));
    assert_eq!(provider.state().await, ProviderState::Idle);
}
