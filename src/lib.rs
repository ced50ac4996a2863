pub mod chain;
pub mod consensus;
pub mod core;
pub mod mining;
pub mod node;
pub mod store;
pub mod sync;
pub mod traits;
