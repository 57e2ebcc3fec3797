//! Core domain types and logic.

pub mod aggregator;
pub mod backtest;
pub mod bar;
pub mod config_validation;
pub mod engine;
pub mod error;
pub mod event;
pub mod exit_policy;
pub mod indicator;
pub mod live;
pub mod metrics;
pub mod pipeline;
pub mod position;
pub mod series;
pub mod session;
