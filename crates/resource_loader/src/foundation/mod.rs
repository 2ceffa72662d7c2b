//! Foundation module - Core utilities
//!
//! Currently only the logging bootstrap lives here.

pub mod logging;
