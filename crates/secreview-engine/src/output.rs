//! Output formatting for audit reports

use secreview_core::{AuditReport, CheckStatus, OutputHandler, Result, ReviewError};
use std::io::Write;
use std::sync::Mutex;

/// Text output handler
pub struct TextOutputHandler<W: Write> {
    writer: Mutex<W>,
    show_passed: bool,
}

impl<W: Write> TextOutputHandler<W> {
    /// Create a new text output handler
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
            show_passed: true,
        }
    }

    /// Include checks that passed
    pub fn with_passed(mut self, show_passed: bool) -> Self {
        self.show_passed = show_passed;
        self
    }

    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<W: Write + Send> OutputHandler for TextOutputHandler<W> {
    fn handle(&self, report: &AuditReport) -> Result<()> {
        let text = format_text(report, self.show_passed);
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| ReviewError::Other("Output writer lock poisoned".to_string()))?;
        writer.write_all(text.as_bytes())?;
        writer.flush()?;
        Ok(())
    }
}

/// JSON output handler
pub struct JsonOutputHandler<W: Write> {
    writer: Mutex<W>,
    pretty: bool,
}

impl<W: Write> JsonOutputHandler<W> {
    /// Create a new JSON output handler
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
            pretty: false,
        }
    }

    /// Use pretty printing
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<W: Write + Send> OutputHandler for JsonOutputHandler<W> {
    fn handle(&self, report: &AuditReport) -> Result<()> {
        let json = format_json(report, self.pretty)?;
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| ReviewError::Other("Output writer lock poisoned".to_string()))?;
        writeln!(writer, "{}", json)?;
        Ok(())
    }
}

fn status_label(status: CheckStatus) -> &'static str {
    match status {
        CheckStatus::Success => "PASS",
        CheckStatus::Fail => "FAIL",
        CheckStatus::Warn => "WARN",
        CheckStatus::Info => "INFO",
    }
}

/// Format an audit report as text
pub fn format_text(report: &AuditReport, show_passed: bool) -> String {
    let mut output = String::new();

    output.push_str(&format!("Security Review Report\n{}\n\n", "=".repeat(22)));

    output.push_str(&format!(
        "Duration: {}ms\n\n",
        (report.completed_at - report.started_at).num_milliseconds()
    ));

    // Summary
    output.push_str("Summary\n-------\n");
    output.push_str(&format!("Total Checks: {}\n", report.summary.total_checks));
    output.push_str(&format!("Passed: {}\n", report.summary.success));
    output.push_str(&format!("Failed: {}\n", report.summary.fail));
    output.push_str(&format!("Warnings: {}\n", report.summary.warn));
    output.push_str(&format!("Info: {}\n\n", report.summary.info));

    // Checks by namespace, in run order
    let mut current_namespace: Option<&str> = None;
    for entry in &report.entries {
        if entry.status == CheckStatus::Success && !show_passed {
            continue;
        }

        if current_namespace != Some(entry.namespace.as_str()) {
            output.push_str(&format!(
                "{}\n{}\n",
                entry.namespace,
                "-".repeat(entry.namespace.len())
            ));
            current_namespace = Some(entry.namespace.as_str());
        }

        output.push_str(&format!(
            "[{}] {}: {}\n",
            status_label(entry.status),
            entry.title,
            entry.message
        ));

        if !entry.evaluation.is_empty() {
            output.push_str(&format!("       {}\n", entry.evaluation));
        }
        if let Some(fault) = &entry.fault {
            output.push_str(&format!("       Fault: {}\n", fault));
        }
    }

    // Errors
    if !report.errors.is_empty() {
        output.push_str("\nErrors\n------\n");
        for error in &report.errors {
            output.push_str(&format!("[{}] {}\n", error.check, error.message));
        }
    }

    output
}

/// Format an audit report as JSON
pub fn format_json(report: &AuditReport, pretty: bool) -> Result<String> {
    if pretty {
        serde_json::to_string_pretty(report).map_err(Into::into)
    } else {
        serde_json::to_string(report).map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secreview_core::{CheckKey, CheckResult, Findings};
    use serde_json::json;

    fn sample_report() -> AuditReport {
        let mut report = AuditReport::new();

        let mut findings = Findings::new();
        findings.insert("level".to_string(), json!("verbose"));
        let fail = CheckResult::new(
            CheckKey::new("Security Review", "Error reporting"),
            CheckStatus::Fail,
            findings,
        );
        report.add_entry(
            &fail,
            "Errors are written to the screen.".to_string(),
            "Error level: verbose".to_string(),
        );

        let pass = CheckResult::new(
            CheckKey::new("Security Review", "File permissions"),
            CheckStatus::Success,
            Findings::new(),
        );
        report.add_entry(&pass, "Files are read-only.".to_string(), String::new());
        report.complete();
        report
    }

    #[test]
    fn test_format_text() {
        let text = format_text(&sample_report(), true);
        assert!(text.contains("Total Checks: 2"));
        assert!(text.contains("Security Review\n---------------\n"));
        assert!(text.contains("[FAIL] Error reporting: Errors are written to the screen."));
        assert!(text.contains("Error level: verbose"));
        assert!(text.contains("[PASS] File permissions"));
    }

    #[test]
    fn test_format_text_hides_passed() {
        let text = format_text(&sample_report(), false);
        assert!(text.contains("[FAIL] Error reporting"));
        assert!(!text.contains("[PASS]"));
    }

    #[test]
    fn test_format_json() {
        let json = format_json(&sample_report(), false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["entries"][0]["status"], json!("fail"));
        assert_eq!(value["entries"][0]["findings"]["level"], json!("verbose"));
        assert_eq!(value["summary"]["total_checks"], json!(2));
    }

    #[test]
    fn test_handlers_write() {
        let report = sample_report();

        let handler = TextOutputHandler::new(Vec::new()).with_passed(false);
        handler.handle(&report).unwrap();
        let text = String::from_utf8(handler.into_inner()).unwrap();
        assert!(text.starts_with("Security Review Report"));

        let handler = JsonOutputHandler::new(Vec::new()).pretty(true);
        handler.handle(&report).unwrap();
        let json = String::from_utf8(handler.into_inner()).unwrap();
        assert!(json.contains("\"Error reporting\""));
    }
}
