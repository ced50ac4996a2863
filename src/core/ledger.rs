//! Address balances derived from transaction history
//!
//! The ledger maps addresses to balances. Balances are unsigned and every
//! debit is checked, so no balance can ever go negative. Transfers between
//! two addresses conserve the total supply; only [seeding](Ledger::seed)
//! mints new coins, and nothing in the mining path does (no block rewards
//! in this chain).
//!
//! The ledger kept by a [chain](crate::chain::Chain) is maintained
//! incrementally but is always reconstructible with [`Ledger::replay`],
//! which applies the committed history with the same skip policy as
//! block application.

use crate::core::block::Block;
use crate::core::transaction::{Address, Amount, Transaction};
use crate::traits::io::ByteIO;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum LedgerError {
    #[error("insufficient funds: {address} holds {balance}, needs {amount}")]
    InsufficientFunds {
        address: Address,
        balance: Amount,
        amount: Amount,
    },
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
pub struct Ledger {
    balances: HashMap<Address, Amount>,
}

impl Ledger {
    pub fn new() -> Ledger {
        Ledger::default()
    }

    /// Balance of an address, zero if never seen.
    pub fn balance_of(&self, address: &Address) -> Amount {
        self.balances.get(address).copied().unwrap_or(0)
    }

    /// Mint coins into an address. This is the only way value enters the
    /// system; transfers merely move it around. Credits saturate at
    /// `u64::MAX`, the supply ceiling; conservation holds below it.
    pub fn seed(&mut self, address: Address, amount: Amount) {
        let balance = self.balances.entry(address).or_insert(0);
        *balance = balance.saturating_add(amount);
    }

    /// Apply a transfer, debiting the sender and crediting the recipient.
    /// Fails without touching any balance when the sender cannot cover
    /// the amount. Self-transfers succeed as balance no-ops. A credit
    /// saturates at the `u64::MAX` ceiling.
    pub fn apply(&mut self, tx: &Transaction) -> Result<(), LedgerError> {
        if tx.is_self_transfer() {
            return Ok(());
        }

        let sender_balance = self.balance_of(&tx.sender);
        let remaining = sender_balance.checked_sub(tx.amount).ok_or_else(|| {
            LedgerError::InsufficientFunds {
                address: tx.sender.clone(),
                balance: sender_balance,
                amount: tx.amount,
            }
        })?;

        self.balances.insert(tx.sender.clone(), remaining);
        let recipient = self.balances.entry(tx.recipient.clone()).or_insert(0);
        *recipient = recipient.saturating_add(tx.amount);
        Ok(())
    }

    /// Apply every transaction of a block in order, skipping the ones the
    /// sender cannot cover. Returns the skipped transactions.
    pub fn apply_block(&mut self, block: &Block) -> Vec<Transaction> {
        let mut rejected = Vec::new();
        for tx in block.transactions() {
            if let Err(err) = self.apply(tx) {
                log::warn!("voiding transaction in block {}: {}", block.index(), err);
                rejected.push(tx.clone());
            }
        }
        rejected
    }

    /// Rebuild a ledger from committed history. Matches incremental
    /// application exactly, underfunded transactions included.
    pub fn replay<'a>(blocks: impl Iterator<Item = &'a Block>) -> Ledger {
        let mut ledger = Ledger::new();
        for block in blocks {
            ledger.apply_block(block);
        }
        ledger
    }

    /// Sum of all balances, clamped at `u64::MAX`. Invariant under
    /// transfers below the ceiling.
    pub fn total_supply(&self) -> Amount {
        self.balances
            .values()
            .fold(0u64, |total, balance| total.saturating_add(*balance))
    }
}

impl ByteIO for Ledger {}
