pub mod block;
pub mod blockchain;
pub mod hash;
pub mod ledger;
pub mod testing;
pub mod transaction;
