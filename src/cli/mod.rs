//! Terminal views over the application state

pub mod compare;
pub mod history;
pub mod rates;
pub mod setup;
pub mod ui;
