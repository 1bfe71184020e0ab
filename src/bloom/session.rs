//! Bloom filter session for transaction streams.

use dashcore::bloom::{BloomFilter, BloomFlags};
use dashcore::{Address, Transaction};

use crate::error::{SyncError, SyncResult};

/// Configuration for the BIP37 filter a session builds.
#[derive(Debug, Clone)]
pub struct BloomFilterConfig {
    /// Minimum element capacity; grows with the watched set.
    pub elements: u32,
    /// Desired false positive rate (0.0 to 1.0).
    pub false_positive_rate: f64,
    /// Random value added to hash seeds.
    pub tweak: u32,
    /// Update behavior flags.
    pub flags: BloomFlags,
}

impl Default for BloomFilterConfig {
    fn default() -> Self {
        Self {
            elements: 100,
            false_positive_rate: 0.001,
            tweak: rand::random::<u32>(),
            flags: BloomFlags::All,
        }
    }
}

/// Watched address set backing one transaction stream.
///
/// Holds the addresses the server-side filter was built from, plus
/// addresses the consumer generated since (HD gap-limit advancement) that
/// are not part of the live filter yet. Generated addresses fold into the
/// watched set when a merkle block is accepted, which is also the point
/// where the stream restarts with a regrown filter.
#[derive(Debug)]
pub struct BloomFilterSession {
    config: BloomFilterConfig,
    addresses: Vec<Address>,
    generated: Vec<Address>,
}

impl BloomFilterSession {
    /// Create a session watching `addresses`.
    pub fn new(config: BloomFilterConfig, addresses: Vec<Address>) -> Self {
        let mut session = Self {
            config,
            addresses: Vec::new(),
            generated: Vec::new(),
        };
        session.merge(addresses);
        session
    }

    /// Addresses the live filter covers.
    pub fn addresses(&self) -> &[Address] {
        &self.addresses
    }

    /// Addresses generated since the filter was built.
    pub fn generated(&self) -> &[Address] {
        &self.generated
    }

    /// Buffer consumer-generated addresses until the next merkle block is
    /// accepted. Already-watched duplicates are dropped.
    pub fn buffer_generated(&mut self, addresses: Vec<Address>) {
        for address in addresses {
            if !self.addresses.contains(&address) && !self.generated.contains(&address) {
                self.generated.push(address);
            }
        }
    }

    /// Take the pending generated addresses.
    pub fn take_generated(&mut self) -> Vec<Address> {
        std::mem::take(&mut self.generated)
    }

    /// Fold `addresses` into the watched set; returns how many were new.
    pub fn merge(&mut self, addresses: Vec<Address>) -> usize {
        let mut added = 0;
        for address in addresses {
            if !self.addresses.contains(&address) {
                self.addresses.push(address);
                added += 1;
            }
        }
        added
    }

    /// Build the BIP37 filter over the watched set.
    pub fn build_filter(&self) -> SyncResult<BloomFilter> {
        let elements = self.config.elements.max(self.addresses.len() as u32).max(1);
        let mut filter = BloomFilter::new(
            elements,
            self.config.false_positive_rate,
            self.config.tweak,
            self.config.flags,
        )
        .map_err(|e| SyncError::Filter(format!("{:?}", e)))?;

        for address in &self.addresses {
            let script = address.script_pubkey();
            filter.insert(script.as_bytes());

            // Peers match P2PKH spends against the bare key hash rather
            // than the full script, so watch that payload as well.
            if let Some(payload) = p2pkh_payload(script.as_bytes()) {
                filter.insert(payload);
            }
        }

        Ok(filter)
    }

    /// Transactions from `transactions` paying to a watched address.
    pub fn matching_transactions(&self, transactions: &[Transaction]) -> Vec<Transaction> {
        transactions.iter().filter(|tx| self.matches(tx)).cloned().collect()
    }

    fn matches(&self, tx: &Transaction) -> bool {
        tx.output.iter().any(|output| {
            self.addresses.iter().any(|address| address.script_pubkey() == output.script_pubkey)
        })
    }
}

/// Hash160 payload of a standard pay-to-pubkey-hash script, if the script
/// has that shape.
fn p2pkh_payload(script: &[u8]) -> Option<&[u8]> {
    match script {
        // DUP HASH160 <push 20> <hash160> EQUALVERIFY CHECKSIG
        [0x76, 0xa9, 0x14, payload @ .., 0x88, 0xac] if payload.len() == 20 => Some(payload),
        _ => None,
    }
}
