//! Result and report types for security review checks

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Structured evidence attached to a result
pub type Findings = BTreeMap<String, serde_json::Value>;

/// Outcome of a single check run
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    /// The check passed
    Success,
    /// The check found a problem
    Fail,
    /// The check found something worth reviewing
    Warn,
    /// Informational only
    Info,
}

impl CheckStatus {
    /// All statuses in code order
    pub const ALL: [CheckStatus; 4] = [
        CheckStatus::Success,
        CheckStatus::Fail,
        CheckStatus::Warn,
        CheckStatus::Info,
    ];

    /// Stable numeric code used by result stores
    pub fn code(self) -> i64 {
        match self {
            CheckStatus::Success => 0,
            CheckStatus::Fail => 1,
            CheckStatus::Warn => 2,
            CheckStatus::Info => 3,
        }
    }

    /// Decode a stored status code
    pub fn from_code(code: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.code() == code)
    }
}

impl std::fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckStatus::Success => write!(f, "success"),
            CheckStatus::Fail => write!(f, "fail"),
            CheckStatus::Warn => write!(f, "warn"),
            CheckStatus::Info => write!(f, "info"),
        }
    }
}

/// Registry identity of a check
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CheckKey {
    pub namespace: String,
    pub title: String,
}

impl CheckKey {
    pub fn new(namespace: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            title: title.into(),
        }
    }

    /// Parse a `namespace/title` key
    pub fn parse(s: &str) -> Option<Self> {
        let (namespace, title) = s.split_once('/')?;
        if namespace.is_empty() || title.is_empty() {
            return None;
        }
        Some(Self::new(namespace, title))
    }
}

impl std::fmt::Display for CheckKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.namespace, self.title)
    }
}

/// Immutable outcome of running one check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    /// The check that produced this result
    pub check: CheckKey,

    /// Outcome
    pub status: CheckStatus,

    /// Evidence used later for remediation text
    #[serde(default)]
    pub findings: Findings,

    /// Set when the runner had to synthesize this result
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fault: Option<String>,
}

impl CheckResult {
    pub fn new(check: CheckKey, status: CheckStatus, findings: Findings) -> Self {
        Self {
            check,
            status,
            findings,
            fault: None,
        }
    }

    /// Result standing in for a check that errored, panicked or timed out
    pub fn faulted(check: CheckKey, message: impl Into<String>) -> Self {
        let message = message.into();
        let mut findings = Findings::new();
        findings.insert("fault".to_string(), serde_json::Value::String(message.clone()));
        Self {
            check,
            status: CheckStatus::Fail,
            findings,
            fault: Some(message),
        }
    }

    /// The check that produced this result
    pub fn check(&self) -> &CheckKey {
        &self.check
    }

    pub fn finding(&self, key: &str) -> Option<&serde_json::Value> {
        self.findings.get(key)
    }

    pub fn is_success(&self) -> bool {
        self.status == CheckStatus::Success
    }

    pub fn is_fault(&self) -> bool {
        self.fault.is_some()
    }
}

/// A result as kept by a result store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredResult {
    pub result: CheckResult,
    pub stored_at: chrono::DateTime<chrono::Utc>,
}

/// Static remediation text for a check
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckHelp {
    pub title: String,
    pub paragraphs: Vec<String>,
}

/// Link to a place where a finding can be fixed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub label: String,
    pub target: String,
}

/// Guidance derived from a specific result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    #[serde(default)]
    pub paragraphs: Vec<String>,
    #[serde(default)]
    pub items: Vec<String>,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl Evaluation {
    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty() && self.items.is_empty() && self.links.is_empty()
    }
}

/// One executed check in an audit report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportEntry {
    pub namespace: String,
    pub title: String,
    pub status: CheckStatus,
    /// Short summary from the check
    pub message: String,
    /// Plain evaluation, empty on success
    pub evaluation: String,
    #[serde(default)]
    pub findings: Findings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fault: Option<String>,
}

/// Counts per status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditSummary {
    pub total_checks: usize,
    pub success: usize,
    pub fail: usize,
    pub warn: usize,
    pub info: usize,
    /// Results synthesized for faulted checks (also counted as fail)
    pub faults: usize,
}

impl AuditSummary {
    pub fn add(&mut self, result: &CheckResult) {
        self.total_checks += 1;
        match result.status {
            CheckStatus::Success => self.success += 1,
            CheckStatus::Fail => self.fail += 1,
            CheckStatus::Warn => self.warn += 1,
            CheckStatus::Info => self.info += 1,
        }
        if result.is_fault() {
            self.faults += 1;
        }
    }
}

/// Error recorded during an audit pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditError {
    /// Check the error belongs to
    pub check: CheckKey,

    /// Error message
    pub message: String,

    /// When the error occurred
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl AuditError {
    pub fn new(check: CheckKey, message: impl Into<String>) -> Self {
        Self {
            check,
            message: message.into(),
            timestamp: chrono::Utc::now(),
        }
    }
}

/// Complete audit pass results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditReport {
    /// When the pass started
    pub started_at: chrono::DateTime<chrono::Utc>,

    /// When the pass completed
    pub completed_at: chrono::DateTime<chrono::Utc>,

    /// Executed checks in run order
    pub entries: Vec<ReportEntry>,

    /// Summary statistics
    pub summary: AuditSummary,

    /// Faults and storage errors
    pub errors: Vec<AuditError>,
}

impl AuditReport {
    pub fn new() -> Self {
        let now = chrono::Utc::now();
        Self {
            started_at: now,
            completed_at: now,
            entries: Vec::new(),
            summary: AuditSummary::default(),
            errors: Vec::new(),
        }
    }

    /// Add an entry for a result with the check's own wording
    pub fn add_entry(&mut self, result: &CheckResult, message: String, evaluation: String) {
        self.summary.add(result);
        self.entries.push(ReportEntry {
            namespace: result.check.namespace.clone(),
            title: result.check.title.clone(),
            status: result.status,
            message,
            evaluation,
            findings: result.findings.clone(),
            fault: result.fault.clone(),
        });
    }

    pub fn add_error(&mut self, error: AuditError) {
        self.errors.push(error);
    }

    /// Mark the pass as completed
    pub fn complete(&mut self) {
        self.completed_at = chrono::Utc::now();
    }

    pub fn entries_with_status(&self, status: CheckStatus) -> Vec<&ReportEntry> {
        self.entries.iter().filter(|e| e.status == status).collect()
    }

    pub fn has_failures(&self) -> bool {
        self.summary.fail > 0
    }
}

impl Default for AuditReport {
    fn default() -> Self {
        Self::new()
    }
}
