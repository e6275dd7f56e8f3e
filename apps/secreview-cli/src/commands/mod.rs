//! CLI command implementations

pub mod explain;
pub mod list;
pub mod run;
pub mod show;

use anyhow::Context;
use clap::Args;
use secreview_checks::{FileConfigSource, MemoryConfigSource, SecurityReviewProvider};
use secreview_core::{AuditConfig, Check, CheckKey, CheckResult, ConfigSource, ProgressReporter};
use secreview_engine::{Checklist, RunnerConfig};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Progress reporter that writes to the log
struct LogProgress;

impl ProgressReporter for LogProgress {
    fn check_started(&self, check: &CheckKey) {
        debug!("Running {}", check);
    }

    fn check_completed(&self, result: &CheckResult) {
        debug!("{} finished: {}", result.check, result.status);
    }

    fn error(&self, check: &CheckKey, message: &str) {
        debug!("{} reported: {}", check, message);
    }
}

/// Identifies one check
#[derive(Args)]
pub struct CheckArgs {
    /// Namespace of the check
    pub namespace: String,

    /// Title of the check
    pub title: String,
}

/// Configuration and checklist shared by every command
pub struct Session {
    pub config: AuditConfig,
    pub checklist: Checklist,
}

/// Read the configuration file, falling back to defaults without one
pub fn load_config(config_path: Option<&Path>) -> anyhow::Result<AuditConfig> {
    match config_path {
        Some(path) => {
            AuditConfig::from_file(path).with_context(|| format!("loading {}", path.display()))
        }
        None => Ok(AuditConfig::default()),
    }
}

impl Session {
    /// Wire up providers and stores for `config`
    pub fn new(config: AuditConfig) -> anyhow::Result<Self> {
        let site: Arc<dyn ConfigSource> = match &config.site.config_path {
            Some(path) => Arc::new(
                FileConfigSource::from_file(path)
                    .with_context(|| format!("loading site configuration {}", path.display()))?,
            ),
            None => Arc::new(MemoryConfigSource::new()),
        };

        let store = secreview_store::open_store(&config.store)?;

        let checklist = Checklist::new()
            .with_config(RunnerConfig::from(&config.runner))
            .with_progress(Arc::new(LogProgress))
            .with_provider(Box::new(SecurityReviewProvider::new(site, store)));

        Ok(Self { config, checklist })
    }

    /// Look up a check, treating a miss as a user error
    pub fn check(&self, args: &CheckArgs) -> anyhow::Result<Arc<dyn Check>> {
        self.checklist
            .find_check(&args.namespace, &args.title)
            .ok_or_else(|| anyhow::anyhow!("No check {}/{}", args.namespace, args.title))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secreview_core::CheckStatus;

    #[test]
    fn test_session_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let site = dir.path().join("site.yaml");
        std::fs::write(&site, "system.logging:\n  error_level: hide\n").unwrap();

        let config_path = dir.path().join("secreview.yaml");
        std::fs::write(
            &config_path,
            format!(
                "store:\n  database_path: {}\nsite:\n  config_path: {}\n",
                dir.path().join("results.db").display(),
                site.display()
            ),
        )
        .unwrap();

        let session = Session::new(load_config(Some(&config_path)).unwrap()).unwrap();
        let report = session.checklist.run_audit(None);
        assert_eq!(report.summary.success, 1);

        // A second session sees what the first one stored.
        let session = Session::new(load_config(Some(&config_path)).unwrap()).unwrap();
        let check = session
            .check(&CheckArgs {
                namespace: "Security Review".to_string(),
                title: "Error reporting".to_string(),
            })
            .unwrap();
        let last = check.last_result().unwrap().unwrap();
        assert_eq!(last.result.status, CheckStatus::Success);
    }

    #[derive(Clone, Default)]
    struct CapturedLog(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_malformed_skip_entry_is_logged() {
        use tracing_subscriber::prelude::*;

        let mut config = AuditConfig::default();
        config.runner.skip_checks = vec!["Error reporting".to_string()];

        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::registry().with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(move || writer.clone()),
        );

        let session =
            tracing::subscriber::with_default(subscriber, || Session::new(config)).unwrap();
        assert!(session.checklist.config().skip_checks.is_empty());

        let output = String::from_utf8(log.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("Ignoring malformed skip entry"));
    }

    #[test]
    fn test_unknown_check() {
        let session = Session::new(load_config(None).unwrap()).unwrap();
        let args = CheckArgs {
            namespace: "Security Review".to_string(),
            title: "Nonexistent".to_string(),
        };
        assert!(session.check(&args).is_err());
    }
}
