//! Shared-access wrapper around a single chain
//!
//! [`Node`] is the single-writer front door: one mutex guards the chain,
//! its ledger and its pending pool, so every mutation is serialized and
//! readers always observe a consistent snapshot. Cloning a node clones
//! the handle, not the chain.
//!
//! Mining is the one long-running operation, so it runs off a snapshot:
//! the lock is held just long enough to take a block template, released
//! for the proof-of-work search, and re-taken to commit. If the tip
//! moved in between, the commit fails with [`ChainError::StaleTip`] and
//! the mined block is discarded.

use crate::chain::{Chain, ChainError, ChainStats, MineReport};
use crate::consensus::ConsensusRules;
use crate::core::transaction::{Address, Amount, TransactionError};
use crate::mining::miner;
use crate::sync::ConsensusEngine;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone)]
pub struct Node {
    chain: Arc<Mutex<Chain>>,
}

impl Node {
    pub fn new(rules: ConsensusRules) -> Node {
        Node::from_chain(Chain::new(rules))
    }

    /// Wrap an existing chain, e.g. one restored from a store.
    pub fn from_chain(chain: Chain) -> Node {
        Node {
            chain: Arc::new(Mutex::new(chain)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Chain> {
        // A poisoning panic cannot leave the chain half-mutated: every
        // write path validates before touching state.
        self.chain.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn seed(&self, address: Address, amount: Amount) {
        self.lock().seed(address, amount);
    }

    pub fn balance_of(&self, address: &Address) -> Amount {
        self.lock().balance_of(address)
    }

    pub fn submit_transaction(
        &self,
        sender: Address,
        recipient: Address,
        amount: Amount,
    ) -> Result<(), TransactionError> {
        self.lock().submit_transaction(sender, recipient, amount)
    }

    pub fn send_funds(
        &self,
        sender: Address,
        recipient: Address,
        amount: Amount,
    ) -> Result<(), ChainError> {
        self.lock().send_funds(sender, recipient, amount)
    }

    pub fn set_difficulty(&self, difficulty: u32) {
        self.lock().set_difficulty(difficulty);
    }

    pub fn stats(&self) -> ChainStats {
        self.lock().stats()
    }

    /// Mine the pending pool into the next block. The proof-of-work
    /// search runs without the lock; other callers can keep submitting
    /// transactions meanwhile. Returns [`ChainError::StaleTip`] when a
    /// competing commit won the race, leaving the pool for the next
    /// attempt.
    pub fn mine(&self) -> Result<MineReport, ChainError> {
        let (template, rules) = {
            let chain = self.lock();
            (chain.template(), chain.rules.clone())
        };

        let block = miner::mine(template, &rules);

        self.lock().commit_mined(block)
    }

    /// Run one reconciliation pass against the engine's peers. Returns
    /// whether the local chain was replaced.
    pub fn reconcile(&self, engine: &ConsensusEngine) -> bool {
        engine.reconcile(&mut self.lock())
    }

    pub fn validate(&self) -> bool {
        self.lock().validate()
    }

    /// Consistent copy of the whole chain state, for persistence or
    /// serving to peers.
    pub fn snapshot(&self) -> Chain {
        self.lock().clone()
    }
}
