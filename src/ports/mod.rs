//! Port traits at the boundary of the domain.

pub mod config_port;
pub mod data_port;
pub mod event_port;
pub mod report_port;
