//! secreview core
//!
//! Core types, traits, and error handling for the secreview checklist runner.

pub mod config;
pub mod error;
pub mod report;
pub mod traits;

pub use config::*;
pub use error::{ReviewError, Result};
pub use report::*;
pub use traits::*;
