pub mod accounts;
pub mod amounts;
pub mod categories;
pub mod reports;
pub mod transactions;
