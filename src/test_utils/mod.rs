//! Shared test fixtures: scripted streams, recording openers and chains.

mod chain;
mod stream;
mod tx_stream;

pub use chain::MockChain;
pub use stream::{MockHeaderStream, MockStreamOpener, StreamProbe};
pub use tx_stream::{MockTxStream, MockTxStreamOpener, TxOpenCall};

use dashcore::address::{Address, Payload};
use dashcore::hash_types::PubkeyHash;
use dashcore::hashes::Hash;
use dashcore::merkle_tree::MerkleBlock;
use dashcore::{
    Block, BlockHash, CompactTarget, Header as BlockHeader, Network, Transaction, TxMerkleNode,
    TxOut,
};

/// Deterministic header at `height` linking to `prev_hash`.
pub fn test_header(height: u32, prev_hash: BlockHash) -> BlockHeader {
    let mut merkle = [0u8; 32];
    merkle[..4].copy_from_slice(&height.to_le_bytes());
    BlockHeader {
        version: dashcore::block::Version::from_consensus(1),
        prev_blockhash: prev_hash,
        merkle_root: TxMerkleNode::from_byte_array(merkle),
        time: 1_234_567_890 + height,
        bits: CompactTarget::from_consensus(0x1d00ffff),
        nonce: height,
    }
}

/// Distinct but unlinked headers for stream-level tests.
pub fn test_headers(from_height: u32, count: usize) -> Vec<BlockHeader> {
    (0..count)
        .map(|i| test_header(from_height + i as u32, BlockHash::from_byte_array([0u8; 32])))
        .collect()
}

/// A properly linked header chain starting at `from_height`.
pub fn test_header_chain_from(
    from_height: u32,
    prev_hash: BlockHash,
    count: usize,
) -> Vec<BlockHeader> {
    let mut headers = Vec::with_capacity(count);
    let mut prev = prev_hash;
    for i in 0..count {
        let header = test_header(from_height + i as u32, prev);
        prev = header.block_hash();
        headers.push(header);
    }
    headers
}

/// Deterministic P2PKH address from a seed byte.
pub fn test_address(seed: u8) -> Address {
    Address::new(Network::Dash, Payload::PubkeyHash(PubkeyHash::from([seed; 20])))
}

/// A transaction paying `address`.
pub fn test_transaction_to(address: &Address) -> Transaction {
    Transaction {
        version: 1,
        lock_time: 0,
        input: vec![],
        output: vec![TxOut {
            value: 5000,
            script_pubkey: address.script_pubkey(),
        }],
        special_transaction_payload: None,
    }
}

/// A merkle block for a synthetic block at `height`.
pub fn test_merkle_block(height: u32) -> MerkleBlock {
    let tx = test_transaction_to(&test_address((height % 251) as u8));
    let block = Block {
        header: test_header(height, BlockHash::from_byte_array([0u8; 32])),
        txdata: vec![tx],
    };
    MerkleBlock::from_block_with_predicate(&block, |_| true)
}
