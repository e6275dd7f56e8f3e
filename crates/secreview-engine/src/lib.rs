//! Orchestration engine for secreview checks
//!
//! Discovers checks from registered providers, runs them, and routes each
//! result back to the check that produced it.

mod output;
mod runner;

pub use output::*;
pub use runner::*;
