mod ledger;
#[cfg(test)]
pub mod memory;

pub use ledger::{DynLedgerRepo, LedgerRepo, PersistenceError};
