//! Dashboard client for a remote port/vulnerability scanning service.
//!
//! `core` validates operator input, submits it to the service and turns
//! the returned report into chart and table data. The terminal UI in the
//! binary only renders what `core` produces.

pub mod config;
pub mod core;
