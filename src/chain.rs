//! The chain: blocks, pending pool, ledger and validation
//!
//! [`Chain`] ties the pieces together. Callers submit transactions into
//! the pending pool; mining drains the pool into a sealed block, appends
//! it and applies its transactions to the [ledger](Ledger); consensus
//! reconciliation (see [`crate::sync`]) may later swap the whole block
//! list for a longer valid one, rebuilding the ledger and discarding the
//! pool.
//!
//! A transaction that was accepted into the pool without a balance check
//! can turn out to be underfunded by the time its block is mined. Such a
//! transaction stays in the block for the audit trail, but its economic
//! effect is void and it is reported back as rejected.

use crate::consensus::ConsensusRules;
use crate::core::block::{Block, BlockData};
use crate::core::blockchain::{Blockchain, BlockchainError};
use crate::core::hash::Hash;
use crate::core::ledger::{Ledger, LedgerError};
use crate::core::transaction::{Address, Amount, Transaction, TransactionError};
use crate::mining::miner;
use crate::traits::io::{ByteIO, FileIO, JsonIO};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Fixed timestamp of the genesis block, so that independently started
/// nodes with the same rules agree on block zero.
pub const GENESIS_TIMESTAMP: u64 = 0;

#[derive(Debug, Error, PartialEq)]
pub enum ChainError {
    #[error(transparent)]
    InvalidTransaction(#[from] TransactionError),
    #[error(transparent)]
    InsufficientFunds(#[from] LedgerError),
    #[error("mined block is stale: the chain tip moved while it was being mined")]
    StaleTip,
    #[error(transparent)]
    BrokenLink(#[from] BlockchainError),
}

/// What came out of mining one block.
#[derive(Debug, PartialEq)]
pub struct MineReport {
    pub height: u64,
    pub hash: Hash,
    /// Transactions recorded in the block whose economic effect was
    /// voided because the sender could not cover them.
    pub rejected: Vec<Transaction>,
}

#[derive(Debug, PartialEq)]
pub struct ChainStats {
    pub blocks: u64,
    pub transactions: u64,
    pub pending: u64,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
pub struct Chain {
    pub rules: ConsensusRules,
    pub blocks: Blockchain,
    pub pending: Vec<Transaction>,
    pub ledger: Ledger,
    /// Everything ever minted through [`Chain::seed`], kept so the ledger
    /// can be rebuilt after a consensus swap. Transfers live in blocks;
    /// seeds do not.
    seeds: HashMap<Address, Amount>,
}

impl Default for Chain {
    fn default() -> Chain {
        Chain::new(ConsensusRules::default())
    }
}

impl Chain {
    /// Start a fresh chain by mining its genesis block under the given
    /// rules. Genesis carries no transactions and the zero-hash sentinel.
    pub fn new(rules: ConsensusRules) -> Chain {
        let genesis = miner::mine(
            BlockData::new_with_timestamp(0, Hash::zero(), vec![], GENESIS_TIMESTAMP),
            &rules,
        );
        Chain {
            rules,
            blocks: Blockchain::new(genesis),
            pending: Vec::new(),
            ledger: Ledger::new(),
            seeds: HashMap::new(),
        }
    }

    pub fn balance_of(&self, address: &Address) -> Amount {
        self.ledger.balance_of(address)
    }

    /// Mint coins into an address, outside the transfer path. Credits
    /// saturate at the `u64::MAX` supply ceiling.
    pub fn seed(&mut self, address: Address, amount: Amount) {
        let seeded = self.seeds.entry(address.clone()).or_insert(0);
        *seeded = seeded.saturating_add(amount);
        self.ledger.seed(address, amount);
    }

    /// Accept a transaction into the pending pool. Shape is validated;
    /// balances are not. The pool keeps submission order.
    pub fn submit_transaction(
        &mut self,
        sender: Address,
        recipient: Address,
        amount: Amount,
    ) -> Result<(), TransactionError> {
        let tx = Transaction::new(sender, recipient, amount);
        tx.validate()?;
        self.pending.push(tx);
        Ok(())
    }

    /// Strict convenience path: like submission, but refuses up front when
    /// the committed balance cannot cover the amount. Other pending
    /// transactions may still outspend the balance before this one is
    /// mined; that is resolved by the void-and-report policy at mining
    /// time.
    pub fn send_funds(
        &mut self,
        sender: Address,
        recipient: Address,
        amount: Amount,
    ) -> Result<(), ChainError> {
        let tx = Transaction::new(sender, recipient, amount);
        tx.validate().map_err(ChainError::InvalidTransaction)?;

        let balance = self.ledger.balance_of(&tx.sender);
        if !tx.is_self_transfer() && balance < amount {
            return Err(LedgerError::InsufficientFunds {
                address: tx.sender,
                balance,
                amount,
            }
            .into());
        }
        self.pending.push(tx);
        Ok(())
    }

    /// Building block for the next mined block: next index, current tip
    /// hash, snapshot of the pending pool.
    pub fn template(&self) -> BlockData {
        BlockData::new(
            self.blocks.height(),
            self.blocks.tip().hash().clone(),
            self.pending.clone(),
        )
    }

    /// Mine the pending pool into the next block and commit it.
    pub fn mine_pending(&mut self) -> Result<MineReport, ChainError> {
        let block = miner::mine(self.template(), &self.rules);
        self.commit_mined(block)
    }

    /// Append a block mined from [`Chain::template`] and apply its
    /// transactions to the ledger. Fails with [`ChainError::StaleTip`],
    /// leaving the pool intact, when the tip is no longer the one the
    /// block was mined against.
    ///
    /// The pool is only ever appended to between template and commit
    /// (single-writer model), so the block's transactions are exactly a
    /// prefix of the pool and are drained as such.
    pub fn commit_mined(&mut self, block: Block) -> Result<MineReport, ChainError> {
        if block.prev_hash() != self.blocks.tip().hash() {
            return Err(ChainError::StaleTip);
        }

        let mined_count = block.transactions().len().min(self.pending.len());
        let height = self.blocks.append(block)?;
        self.pending.drain(..mined_count);

        let tip = self.blocks.tip();
        let rejected = self.ledger.apply_block(tip);
        Ok(MineReport {
            height,
            hash: tip.hash().clone(),
            rejected,
        })
    }

    /// Full chain validation: genesis sentinel, hash-link integrity,
    /// stored-hash integrity, proof-of-work under each block's recorded
    /// difficulty, and transaction shape. Fail-fast, no side effects.
    pub fn validate(&self) -> bool {
        Chain::validate_blocks(&self.blocks)
    }

    /// Same validation applied to a candidate block list, e.g. one
    /// fetched from a peer, judged against its own embedded genesis and
    /// difficulty trail.
    ///
    /// Each entity checks only its own invariants; this orchestrates.
    pub fn validate_blocks(blocks: &Blockchain) -> bool {
        let genesis = blocks.genesis();
        if genesis.index() != 0 || !genesis.prev_hash().is_zero() {
            return false;
        }

        for block in blocks.iter() {
            if !block.is_hash_valid() {
                return false;
            }
            if !ConsensusRules::new(block.difficulty()).validate_pow(block.hash()) {
                return false;
            }
            if block.transactions().iter().any(|tx| tx.validate().is_err()) {
                return false;
            }
        }

        let mut prev = genesis;
        for block in blocks.iter().skip(1) {
            if !block.follows(prev) {
                return false;
            }
            prev = block;
        }
        true
    }

    /// Wholesale replacement by consensus: swap in the new block list,
    /// rebuild the ledger (seeds first, then replayed history) and
    /// discard the pending pool, which may reference a stale predecessor.
    pub fn replace_blocks(&mut self, blocks: Blockchain) {
        self.blocks = blocks;
        let mut ledger = Ledger::new();
        for (address, amount) in &self.seeds {
            ledger.seed(address.clone(), *amount);
        }
        for block in self.blocks.iter() {
            ledger.apply_block(block);
        }
        self.ledger = ledger;
        self.pending.clear();
    }

    /// Difficulty for blocks mined from now on. Already-mined blocks keep
    /// the difficulty recorded at their mining time.
    pub fn set_difficulty(&mut self, difficulty: u32) {
        self.rules.difficulty = difficulty;
    }

    pub fn stats(&self) -> ChainStats {
        ChainStats {
            blocks: self.blocks.height(),
            transactions: self.blocks.transaction_count(),
            pending: self.pending.len() as u64,
        }
    }
}

impl ByteIO for Chain {}
impl FileIO for Chain {}
impl JsonIO for Chain {}
