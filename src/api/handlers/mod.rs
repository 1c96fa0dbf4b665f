pub mod dashboard;
pub mod event;
pub mod health;
pub mod registration;
pub mod scanner;
pub mod ticket;
