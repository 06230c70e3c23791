//! # Cachet Core
//!
//! Core error types and logging bootstrap shared by the Cachet crates.

pub mod error;
pub mod result;
pub mod telemetry;

pub use error::*;
pub use result::*;
pub use telemetry::{init_logging, LogFormat};
