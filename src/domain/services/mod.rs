pub mod catalog;
pub mod dashboard;
pub mod ledger;
pub mod retry;
pub mod tickets;
