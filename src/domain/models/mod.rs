pub mod dashboard;
pub mod event;
pub mod principal;
pub mod registration;
pub mod scanner;
pub mod ticket;
