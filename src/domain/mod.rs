//! Core domain types and logic.

pub mod account;
pub mod aggregator;
pub mod config_validation;
pub mod error;
pub mod operation;
pub mod summary;
