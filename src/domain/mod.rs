//! Core domain types and logic.

pub mod table;
pub mod price;
pub mod strategy;
pub mod indicator;
pub mod indicator_frame;
pub mod signal;
pub mod position;
pub mod returns;
pub mod universe;
pub mod backtest;
pub mod metrics;
pub mod alert;
pub mod config_validation;
pub mod error;
