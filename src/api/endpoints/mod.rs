//! API endpoint handlers.
//!
//! Handlers parse the filter parameters, call the dashboard service and
//! shape its output for the page script.

pub mod charts;
pub mod health;
pub mod options;
pub mod records;
