//! Longest-valid-chain reconciliation
//!
//! The [`ConsensusEngine`] polls a set of [peer chain sources]
//! (PeerChainSource), keeps the longest candidate that survives full
//! validation, and swaps it in for the local block list. An unreachable
//! peer is skipped, never fatal to the pass. Equal length never
//! replaces: the local chain wins ties.
//!
//! Fork choice is raw block count. A peer could in principle serve a
//! long chain mined entirely at a low recorded difficulty; there is no
//! cumulative-work weighting to stop it. Known simplification.

use crate::chain::Chain;
use crate::core::blockchain::Blockchain;
use crate::traits::io::{ByteIO, JsonIO};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum PeerError {
    #[error("peer unreachable: {0}")]
    Unreachable(String),
}

/// What a peer reports: its chain and the length it claims for it.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
pub struct PeerChain {
    pub length: u64,
    pub blocks: Blockchain,
}

impl PeerChain {
    pub fn snapshot(chain: &Chain) -> PeerChain {
        PeerChain {
            length: chain.blocks.height(),
            blocks: chain.blocks.clone(),
        }
    }
}

impl ByteIO for PeerChain {}
impl JsonIO for PeerChain {}

/// Something that can produce a peer's chain on demand. Transport is
/// somebody else's problem; implementations may sit on HTTP, a file, or
/// a test fixture.
pub trait PeerChainSource {
    fn fetch(&self) -> Result<PeerChain, PeerError>;
}

/// Applies the longest-valid-chain rule over a fixed set of peers.
/// Holds the peer sources; the chain it operates on is handed in per
/// reconciliation pass by whoever owns the write access.
pub struct ConsensusEngine {
    peers: Vec<Box<dyn PeerChainSource>>,
}

impl ConsensusEngine {
    pub fn new(peers: Vec<Box<dyn PeerChainSource>>) -> ConsensusEngine {
        ConsensusEngine { peers }
    }

    pub fn add_peer(&mut self, peer: Box<dyn PeerChainSource>) {
        self.peers.push(peer);
    }

    pub fn peer_count(&self) -> usize {
        self.peers.len()
    }

    /// One reconciliation pass. Scans every peer, keeps the strictly
    /// longest candidate that validates, and atomically swaps it in.
    /// Returns whether the local chain was replaced. On `false` the
    /// local state is untouched.
    pub fn reconcile(&self, chain: &mut Chain) -> bool {
        let mut best: Option<Blockchain> = None;
        let mut best_length = chain.blocks.height();

        for (index, peer) in self.peers.iter().enumerate() {
            let candidate = match peer.fetch() {
                Ok(candidate) => candidate,
                Err(err) => {
                    log::warn!("skipping peer {}: {}", index, err);
                    continue;
                }
            };

            // Strictly longer than both the local chain and the best
            // candidate so far; ties lose.
            if candidate.length <= best_length {
                continue;
            }
            if candidate.blocks.height() != candidate.length {
                log::warn!(
                    "peer {} reported length {} but sent {} blocks",
                    index,
                    candidate.length,
                    candidate.blocks.height()
                );
                continue;
            }
            if !Chain::validate_blocks(&candidate.blocks) {
                log::warn!("peer {} sent an invalid chain, ignoring", index);
                continue;
            }

            best_length = candidate.length;
            best = Some(candidate.blocks);
        }

        match best {
            Some(blocks) => {
                log::info!(
                    "adopting peer chain: {} -> {} blocks",
                    chain.blocks.height(),
                    best_length
                );
                chain.replace_blocks(blocks);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consensus::ConsensusRules;

    struct StaticPeer {
        chain: PeerChain,
    }

    impl StaticPeer {
        fn from_chain(chain: &Chain) -> StaticPeer {
            StaticPeer {
                chain: PeerChain::snapshot(chain),
            }
        }
    }

    impl PeerChainSource for StaticPeer {
        fn fetch(&self) -> Result<PeerChain, PeerError> {
            Ok(self.chain.clone())
        }
    }

    struct UnreachablePeer;

    impl PeerChainSource for UnreachablePeer {
        fn fetch(&self) -> Result<PeerChain, PeerError> {
            Err(PeerError::Unreachable("connection refused".to_string()))
        }
    }

    /// A seeded chain extended to the given number of blocks.
    fn chain_of_length(length: u64) -> Chain {
        let mut chain = Chain::new(ConsensusRules::new(1));
        chain.seed("alice".into(), 100);
        for i in 1..length {
            chain
                .submit_transaction("alice".into(), "bob".into(), i)
                .unwrap();
            chain.mine_pending().unwrap();
        }
        chain
    }

    #[test]
    fn longer_valid_chain_replaces() {
        let mut local = chain_of_length(3);
        let remote = chain_of_length(5);

        let engine = ConsensusEngine::new(vec![Box::new(StaticPeer::from_chain(&remote))]);

        assert!(engine.reconcile(&mut local));
        assert_eq!(local.blocks.height(), 5);
        assert_eq!(local.blocks.tip().hash(), remote.blocks.tip().hash());
        assert!(local.validate());
    }

    #[test]
    fn equal_length_never_replaces() {
        let mut local = chain_of_length(3);
        let remote = chain_of_length(3);
        let tip = local.blocks.tip().hash().clone();

        let engine = ConsensusEngine::new(vec![Box::new(StaticPeer::from_chain(&remote))]);

        assert!(!engine.reconcile(&mut local));
        assert_eq!(local.blocks.height(), 3);
        assert_eq!(*local.blocks.tip().hash(), tip);
    }

    #[test]
    fn shorter_chain_never_replaces() {
        let mut local = chain_of_length(4);
        let remote = chain_of_length(2);

        let engine = ConsensusEngine::new(vec![Box::new(StaticPeer::from_chain(&remote))]);

        assert!(!engine.reconcile(&mut local));
        assert_eq!(local.blocks.height(), 4);
    }

    #[test]
    fn invalid_longer_chain_rejected() {
        let mut local = chain_of_length(3);
        let remote = chain_of_length(5);

        // Corrupt the candidate before serving it.
        let mut peer_chain = PeerChain::snapshot(&remote);
        let block = peer_chain.blocks.get_block(2).unwrap().clone();
        let stored_hash = block.hash().clone();
        let mut data = block.into_data();
        data.transactions[0].amount = 9999;
        peer_chain
            .blocks
            .replace_block(2, crate::core::block::Block::forge(stored_hash, data));

        let engine = ConsensusEngine::new(vec![Box::new(StaticPeer { chain: peer_chain })]);

        assert!(!engine.reconcile(&mut local));
        assert_eq!(local.blocks.height(), 3);
        assert!(local.validate());
    }

    #[test]
    fn misreported_length_rejected() {
        let mut local = chain_of_length(3);
        let remote = chain_of_length(4);

        let mut peer_chain = PeerChain::snapshot(&remote);
        peer_chain.length = 10;

        let engine = ConsensusEngine::new(vec![Box::new(StaticPeer { chain: peer_chain })]);

        assert!(!engine.reconcile(&mut local));
        assert_eq!(local.blocks.height(), 3);
    }

    #[test]
    fn unreachable_peer_is_skipped() {
        let mut local = chain_of_length(3);
        let remote = chain_of_length(5);

        let engine = ConsensusEngine::new(vec![
            Box::new(UnreachablePeer),
            Box::new(StaticPeer::from_chain(&remote)),
            Box::new(UnreachablePeer),
        ]);

        assert!(engine.reconcile(&mut local));
        assert_eq!(local.blocks.height(), 5);
    }

    #[test]
    fn longest_of_several_candidates_wins() {
        let mut local = chain_of_length(2);
        let remote_short = chain_of_length(4);
        let remote_long = chain_of_length(6);

        let engine = ConsensusEngine::new(vec![
            Box::new(StaticPeer::from_chain(&remote_short)),
            Box::new(StaticPeer::from_chain(&remote_long)),
            Box::new(StaticPeer::from_chain(&remote_short)),
        ]);

        assert!(engine.reconcile(&mut local));
        assert_eq!(local.blocks.height(), 6);
        assert_eq!(local.blocks.tip().hash(), remote_long.blocks.tip().hash());
    }

    #[test]
    fn replacement_discards_pending_pool() {
        let mut local = chain_of_length(3);
        local
            .submit_transaction("alice".into(), "bob".into(), 7)
            .unwrap();
        let remote = chain_of_length(5);

        let engine = ConsensusEngine::new(vec![Box::new(StaticPeer::from_chain(&remote))]);

        assert!(engine.reconcile(&mut local));
        assert!(local.pending.is_empty());
    }

    #[test]
    fn no_peers_is_a_noop() {
        let mut local = chain_of_length(3);
        let engine = ConsensusEngine::new(vec![]);

        assert!(!engine.reconcile(&mut local));
        assert_eq!(local.blocks.height(), 3);
    }
}
