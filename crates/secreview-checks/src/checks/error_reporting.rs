//! Error reporting check
//!
//! Errors printed to the screen disclose file paths and other internals, so
//! the site should only write them to the log.

use secreview_core::{
    Check, CheckHelp, CheckResult, CheckStatus, ConfigSource, Evaluation, Findings, Link, Result,
    ResultStore, StoredResult, UNEXPECTED_RESULT,
};
use serde_json::Value;
use std::sync::Arc;

use super::SECURITY_REVIEW;

/// Configuration object holding the logging settings
pub const LOGGING_OBJECT: &str = "system.logging";

/// Key of the error display level
pub const ERROR_LEVEL_KEY: &str = "error_level";

/// The only acceptable error level
const HIDE: &str = "hide";

/// Verifies errors are logged rather than displayed
pub struct ErrorReporting {
    config: Arc<dyn ConfigSource>,
    store: Arc<dyn ResultStore>,
}

impl ErrorReporting {
    pub fn new(config: Arc<dyn ConfigSource>, store: Arc<dyn ResultStore>) -> Self {
        Self { config, store }
    }
}

impl Check for ErrorReporting {
    fn namespace(&self) -> &str {
        SECURITY_REVIEW
    }

    fn title(&self) -> &str {
        "Error reporting"
    }

    fn run(&self) -> Result<CheckResult> {
        let level = self.config.get(LOGGING_OBJECT, ERROR_LEVEL_KEY);

        let status = match &level {
            Some(Value::String(level)) if level == HIDE => CheckStatus::Success,
            _ => CheckStatus::Fail,
        };

        let mut findings = Findings::new();
        findings.insert("level".to_string(), level.unwrap_or(Value::Null));

        Ok(self.create_result(status, findings))
    }

    fn store_result(&self, result: &CheckResult) -> Result<()> {
        self.store.save(result)
    }

    fn last_result(&self) -> Result<Option<StoredResult>> {
        self.store.latest(&self.key())
    }

    fn help(&self) -> CheckHelp {
        CheckHelp {
            title: "Error reporting".to_string(),
            paragraphs: vec![
                "As a form of hardening your site you should avoid information disclosure. \
                 By default errors are printed to the screen and written to the log. Error \
                 messages disclose the full path to the file where the error occurred."
                    .to_string(),
            ],
        }
    }

    fn evaluate(&self, result: &CheckResult) -> Evaluation {
        if result.is_success() {
            return Evaluation::default();
        }

        Evaluation {
            paragraphs: vec![
                "You have error reporting set to both the screen and the log.".to_string(),
                "Alter error reporting settings.".to_string(),
            ],
            items: Vec::new(),
            links: vec![Link {
                label: "Alter error reporting settings.".to_string(),
                target: "system.logging_settings".to_string(),
            }],
        }
    }

    fn evaluate_plain(&self, result: &CheckResult) -> String {
        if result.is_success() {
            return String::new();
        }

        match result.finding("level") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(level)) => format!("Error level: {}", level),
            Some(other) => format!("Error level: {}", other),
        }
    }

    fn message(&self, status: CheckStatus) -> String {
        match status {
            CheckStatus::Success => "Error reporting set to log only.".to_string(),
            CheckStatus::Fail => "Errors are written to the screen.".to_string(),
            _ => UNEXPECTED_RESULT.to_string(),
        }
    }
}
