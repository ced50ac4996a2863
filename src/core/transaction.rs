//! The means for moving value between addresses
//!
//! A transaction moves `amount` coins from the sender's balance to the
//! recipient's. Addresses are opaque identifiers, not keys: there are no
//! signatures, and nothing is checked against balances at creation time.
//! A transaction only guarantees its own shape (positive amount, both
//! parties named); whether the sender can actually cover it is decided
//! when the transaction is applied to the [ledger](crate::core::ledger).

use crate::traits::io::{ByteIO, JsonIO};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Utility type for representing coin value.
pub type Amount = u64;

#[derive(Debug, Error, PartialEq)]
pub enum TransactionError {
    #[error("transaction amount must be greater than zero")]
    ZeroAmount,
    #[error("transaction {0} address is empty")]
    EmptyParty(&'static str),
}

/// Opaque identifier for a balance-holding participant.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(String);

impl Address {
    pub fn new(id: impl Into<String>) -> Address {
        Address(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Address {
    fn from(id: &str) -> Address {
        Address::new(id)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
pub struct Transaction {
    pub sender: Address,
    pub recipient: Address,
    pub amount: Amount,
}

impl Transaction {
    pub fn new(sender: Address, recipient: Address, amount: Amount) -> Transaction {
        Transaction {
            sender,
            recipient,
            amount,
        }
    }

    /// Shape validation only. Self-transfers are allowed; they are a
    /// no-op on balances once applied.
    pub fn validate(&self) -> Result<(), TransactionError> {
        if self.amount == 0 {
            return Err(TransactionError::ZeroAmount);
        }
        if self.sender.is_empty() {
            return Err(TransactionError::EmptyParty("sender"));
        }
        if self.recipient.is_empty() {
            return Err(TransactionError::EmptyParty("recipient"));
        }
        Ok(())
    }

    pub fn is_self_transfer(&self) -> bool {
        self.sender == self.recipient
    }
}

impl ByteIO for Transaction {}
impl JsonIO for Transaction {}
