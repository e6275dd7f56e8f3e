//! Built-in check implementations

pub mod error_reporting;

pub use error_reporting::ErrorReporting;

use secreview_core::{Check, ConfigSource, ResultStore};
use std::sync::Arc;

/// Namespace of the built-in checks
pub const SECURITY_REVIEW: &str = "Security Review";

/// Fresh instances of every built-in check
pub fn builtin_checks(
    config: &Arc<dyn ConfigSource>,
    store: &Arc<dyn ResultStore>,
) -> Vec<Arc<dyn Check>> {
    vec![Arc::new(ErrorReporting::new(
        Arc::clone(config),
        Arc::clone(store),
    ))]
}
