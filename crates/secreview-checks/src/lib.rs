//! Built-in security review checks for secreview
//!
//! Provides the `Security Review` check provider and the configuration
//! sources its checks read from.
//!
//! # Example
//!
//! ```no_run
//! use secreview_checks::{MemoryConfigSource, SecurityReviewProvider};
//! use secreview_engine::Checklist;
//! use secreview_store::MemoryResultStore;
//! use std::sync::Arc;
//!
//! let config = MemoryConfigSource::new().with("system.logging", "error_level", "hide");
//! let store = Arc::new(MemoryResultStore::new());
//! let provider = SecurityReviewProvider::new(Arc::new(config), store);
//!
//! let checklist = Checklist::new().with_provider(Box::new(provider));
//! let report = checklist.run_audit(None);
//! println!("{} checks, {} failed", report.summary.total_checks, report.summary.fail);
//! ```

pub mod checks;
mod source;

pub use checks::{builtin_checks, ErrorReporting, SECURITY_REVIEW};
pub use source::{FileConfigSource, MemoryConfigSource};

use secreview_core::{Check, CheckProvider, ConfigSource, ResultStore};
use std::sync::Arc;

/// Provider contributing the built-in checks
pub struct SecurityReviewProvider {
    config: Arc<dyn ConfigSource>,
    store: Arc<dyn ResultStore>,
}

impl SecurityReviewProvider {
    /// Create a provider whose checks read `config` and persist to `store`
    pub fn new(config: Arc<dyn ConfigSource>, store: Arc<dyn ResultStore>) -> Self {
        Self { config, store }
    }
}

impl CheckProvider for SecurityReviewProvider {
    fn name(&self) -> &str {
        "security_review"
    }

    fn checks(&self) -> Vec<Arc<dyn Check>> {
        builtin_checks(&self.config, &self.store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secreview_core::{CheckKey, CheckStatus};
    use secreview_engine::Checklist;
    use secreview_store::{MemoryResultStore, SqliteResultStore};
    use serde_json::json;

    fn checklist(config: MemoryConfigSource, store: Arc<dyn ResultStore>) -> Checklist {
        Checklist::new().with_provider(Box::new(SecurityReviewProvider::new(
            Arc::new(config),
            store,
        )))
    }

    #[test]
    fn test_find_builtin_check() {
        let list = checklist(MemoryConfigSource::new(), Arc::new(MemoryResultStore::new()));

        let check = list
            .find_check("Security Review", "Error reporting")
            .expect("error reporting check is built in");
        assert_eq!(check.machine_namespace(), "security_review");
        assert_eq!(check.machine_title(), "error_reporting");

        assert!(list.find_check("Security Review", "Nonexistent").is_none());
    }

    #[test]
    fn test_audit_pass_persists_results() {
        let store = Arc::new(SqliteResultStore::in_memory().unwrap());
        let list = checklist(
            MemoryConfigSource::new().with("system.logging", "error_level", "verbose"),
            store.clone(),
        );

        let report = list.run_audit(Some(SECURITY_REVIEW));
        assert_eq!(report.summary.total_checks, 1);
        assert_eq!(report.summary.fail, 1);
        assert_eq!(report.entries[0].message, "Errors are written to the screen.");
        assert_eq!(report.entries[0].evaluation, "Error level: verbose");
        assert!(report.errors.is_empty());

        let stored = store
            .latest(&CheckKey::new("Security Review", "Error reporting"))
            .unwrap()
            .unwrap();
        assert_eq!(stored.result.status, CheckStatus::Fail);
        assert_eq!(stored.result.finding("level"), Some(&json!("verbose")));

        // A fresh instance reads back what the pass stored.
        let check = list.find_check("Security Review", "Error reporting").unwrap();
        let last = check.last_result().unwrap().unwrap();
        assert_eq!(last.result, stored.result);
    }

    #[test]
    fn test_other_namespace_is_empty() {
        let list = checklist(MemoryConfigSource::new(), Arc::new(MemoryResultStore::new()));
        let report = list.run_audit(Some("Views"));
        assert_eq!(report.summary.total_checks, 0);
        assert!(!report.has_failures());
    }
}
