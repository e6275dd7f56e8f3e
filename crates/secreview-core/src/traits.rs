//! Core traits that define the check abstraction layer.
//!
//! Checks, the providers that contribute them, and the configuration and
//! storage ports the checks talk to are all expressed here so the runner
//! can orchestrate any implementation.

use crate::error::Result;
use crate::report::{
    AuditReport, CheckHelp, CheckKey, CheckResult, CheckStatus, Evaluation, Findings,
    StoredResult,
};
use std::sync::Arc;

/// Generic summary for statuses a check does not describe
pub const UNEXPECTED_RESULT: &str = "Unexpected result.";

/// Turn a human identifier into a lowercase slug (`"Security Review"` -> `security_review`)
pub fn machine_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_sep = false;

    for c in name.chars() {
        if c.is_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.extend(c.to_lowercase());
        } else {
            pending_sep = true;
        }
    }

    out
}

/// A single audit rule.
///
/// A check only inspects state; it never changes it. It does own the
/// persistence of its own results, usually through a [`ResultStore`] handed
/// to it at construction.
pub trait Check: Send + Sync {
    /// Namespace grouping related checks, usually the provider's name
    fn namespace(&self) -> &str;

    /// Title, unique within the namespace
    fn title(&self) -> &str;

    /// Registry identity
    fn key(&self) -> CheckKey {
        CheckKey::new(self.namespace(), self.title())
    }

    fn machine_namespace(&self) -> String {
        machine_name(self.namespace())
    }

    fn machine_title(&self) -> String {
        machine_name(self.title())
    }

    /// Execute the audit logic now.
    ///
    /// Missing configuration is a finding (`Fail`), not an error. `Err` is
    /// reserved for unexpected faults.
    fn run(&self) -> Result<CheckResult>;

    /// Build a result stamped with this check's identity
    fn create_result(&self, status: CheckStatus, findings: Findings) -> CheckResult {
        CheckResult::new(self.key(), status, findings)
    }

    /// Persist a result produced by this check
    fn store_result(&self, result: &CheckResult) -> Result<()>;

    /// Most recent stored result, if any
    fn last_result(&self) -> Result<Option<StoredResult>>;

    /// Static remediation text
    fn help(&self) -> CheckHelp;

    /// Structured guidance for a past result; empty on success
    fn evaluate(&self, result: &CheckResult) -> Evaluation;

    /// Plain-text guidance for a past result; empty on success
    fn evaluate_plain(&self, result: &CheckResult) -> String;

    /// Short summary for a status
    fn message(&self, status: CheckStatus) -> String;

    /// Short summary for a raw stored status code
    fn message_for_code(&self, code: i64) -> String {
        match CheckStatus::from_code(code) {
            Some(status) => self.message(status),
            None => UNEXPECTED_RESULT.to_string(),
        }
    }
}

/// A provider that contributes checks
pub trait CheckProvider: Send + Sync {
    /// Provider name
    fn name(&self) -> &str;

    /// Fresh check instances for one audit pass
    fn checks(&self) -> Vec<Arc<dyn Check>>;
}

/// Read-only key/value configuration the checks inspect
pub trait ConfigSource: Send + Sync {
    /// Value of `key` in configuration object `object`.
    ///
    /// `None` covers both an absent key and an explicit null.
    fn get(&self, object: &str, key: &str) -> Option<serde_json::Value>;
}

/// Durable storage for check results
pub trait ResultStore: Send + Sync {
    /// Append a result, stamped with the current time
    fn save(&self, result: &CheckResult) -> Result<()>;

    /// Most recently stored result for a check
    fn latest(&self, check: &CheckKey) -> Result<Option<StoredResult>>;

    /// Stored results for a check, newest first
    fn history(&self, check: &CheckKey, limit: usize) -> Result<Vec<StoredResult>>;
}

/// Progress reporting abstraction for UI/CLI
pub trait ProgressReporter: Send + Sync {
    /// Called before a check runs
    fn check_started(&self, check: &CheckKey);

    /// Called with each result, including synthesized ones
    fn check_completed(&self, result: &CheckResult);

    /// Called on a fault or storage error
    fn error(&self, check: &CheckKey, message: &str);
}

/// No-op progress reporter for silent operation
pub struct NullProgressReporter;

impl ProgressReporter for NullProgressReporter {
    fn check_started(&self, _check: &CheckKey) {}
    fn check_completed(&self, _result: &CheckResult) {}
    fn error(&self, _check: &CheckKey, _message: &str) {}
}

/// Output format for audit reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON format
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "json-pretty" | "pretty" => Ok(OutputFormat::JsonPretty),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

/// Output handler for audit reports
pub trait OutputHandler: Send + Sync {
    /// Handle the complete audit report
    fn handle(&self, report: &AuditReport) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed;

    impl Check for Fixed {
        fn namespace(&self) -> &str {
            "Security Review"
        }
        fn title(&self) -> &str {
            "File permissions"
        }
        fn run(&self) -> Result<CheckResult> {
            Ok(self.create_result(CheckStatus::Success, Findings::new()))
        }
        fn store_result(&self, _result: &CheckResult) -> Result<()> {
            Ok(())
        }
        fn last_result(&self) -> Result<Option<StoredResult>> {
            Ok(None)
        }
        fn help(&self) -> CheckHelp {
            CheckHelp::default()
        }
        fn evaluate(&self, _result: &CheckResult) -> Evaluation {
            Evaluation::default()
        }
        fn evaluate_plain(&self, _result: &CheckResult) -> String {
            String::new()
        }
        fn message(&self, status: CheckStatus) -> String {
            match status {
                CheckStatus::Success => "Fine.".to_string(),
                _ => UNEXPECTED_RESULT.to_string(),
            }
        }
    }

    #[test]
    fn test_machine_name() {
        assert_eq!(machine_name("Security Review"), "security_review");
        assert_eq!(machine_name("Error reporting"), "error_reporting");
        assert_eq!(machine_name("  PHP -- files!"), "php_files");
        assert_eq!(machine_name(""), "");
    }

    #[test]
    fn test_create_result_stamps_key() {
        let check = Fixed;
        let result = check.run().unwrap();
        assert_eq!(result.check(), &check.key());
        assert_eq!(check.machine_namespace(), "security_review");
        assert_eq!(check.machine_title(), "file_permissions");
    }

    #[test]
    fn test_message_for_unknown_code() {
        let check = Fixed;
        assert_eq!(check.message_for_code(0), "Fine.");
        assert_eq!(check.message_for_code(17), UNEXPECTED_RESULT);
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("TEXT".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert!("xml".parse::<OutputFormat>().is_err());
    }
}
