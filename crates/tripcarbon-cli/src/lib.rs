//! Tripcarbon CLI library.
//!
//! Logging setup, terminal styling and report rendering shared by the
//! `tripcarbon` binary.

pub mod logging;
pub mod output;
pub mod terminal;
