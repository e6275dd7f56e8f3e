//! Checklist runner that discovers, groups, runs and stores checks

use rayon::prelude::*;
use secreview_core::{
    AuditError, AuditReport, Check, CheckKey, CheckProvider, CheckResult, NullProgressReporter,
    ProgressReporter, ReviewError, RunnerSettings,
};
use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Configuration for the checklist runner
#[derive(Debug, Clone, Default)]
pub struct RunnerConfig {
    /// Run checks in parallel
    pub parallel: bool,
    /// Upper bound on a single check's run
    pub timeout: Option<Duration>,
    /// Checks left out of `run_audit`
    pub skip_checks: Vec<CheckKey>,
}

impl From<&RunnerSettings> for RunnerConfig {
    fn from(settings: &RunnerSettings) -> Self {
        let skip_checks = settings
            .skip_checks
            .iter()
            .filter_map(|s| {
                let key = CheckKey::parse(s);
                if key.is_none() {
                    warn!("Ignoring malformed skip entry {:?}, expected namespace/title", s);
                }
                key
            })
            .collect();

        Self {
            parallel: settings.parallel,
            timeout: settings.timeout(),
            skip_checks,
        }
    }
}

/// Registry of check providers and the runner for their checks
pub struct Checklist {
    providers: Vec<Box<dyn CheckProvider>>,
    config: RunnerConfig,
    progress: Arc<dyn ProgressReporter>,
}

impl Checklist {
    /// Create an empty checklist
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
            config: RunnerConfig::default(),
            progress: Arc::new(NullProgressReporter),
        }
    }

    /// Set the runner configuration
    pub fn with_config(mut self, config: RunnerConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the progress reporter
    pub fn with_progress(mut self, progress: Arc<dyn ProgressReporter>) -> Self {
        self.progress = progress;
        self
    }

    /// Register a provider
    pub fn with_provider(mut self, provider: Box<dyn CheckProvider>) -> Self {
        self.add_provider(provider);
        self
    }

    /// Register a provider
    pub fn add_provider(&mut self, provider: Box<dyn CheckProvider>) {
        debug!("Registered check provider: {}", provider.name());
        self.providers.push(provider);
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Checks from every provider in registration order.
    ///
    /// Entries with a blank namespace or title, or whose `(namespace, title)`
    /// was already contributed earlier in the pass, are dropped. With a
    /// filter only checks whose namespace equals it exactly are kept.
    pub fn list_checks(&self, namespace: Option<&str>) -> Vec<Arc<dyn Check>> {
        let mut seen = HashSet::new();
        let mut checks = Vec::new();

        for provider in &self.providers {
            for check in provider.checks() {
                if check.namespace().trim().is_empty() || check.title().trim().is_empty() {
                    warn!(
                        "Provider {} returned a check without namespace or title, ignoring it",
                        provider.name()
                    );
                    continue;
                }

                let key = check.key();
                if !seen.insert(key.clone()) {
                    warn!(
                        "Provider {} returned duplicate check {}, ignoring it",
                        provider.name(),
                        key
                    );
                    continue;
                }

                if namespace.map_or(true, |ns| check.namespace() == ns) {
                    checks.push(check);
                }
            }
        }

        checks
    }

    /// Partition checks by namespace.
    ///
    /// Groups appear in the order their namespace is first seen and keep the
    /// relative order of their checks.
    pub fn group_by_namespace(checks: &[Arc<dyn Check>]) -> Vec<(String, Vec<Arc<dyn Check>>)> {
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut groups: Vec<(String, Vec<Arc<dyn Check>>)> = Vec::new();

        for check in checks {
            let ns = check.namespace();
            match index.get(ns) {
                Some(&i) => groups[i].1.push(Arc::clone(check)),
                None => {
                    index.insert(ns, groups.len());
                    groups.push((ns.to_string(), vec![Arc::clone(check)]));
                }
            }
        }

        groups
    }

    /// Run every check, returning one result per check in input order.
    ///
    /// A check that errors, panics or overruns the timeout gets a synthetic
    /// `Fail` result carrying the fault.
    pub fn run_checks(&self, checks: &[Arc<dyn Check>]) -> Vec<CheckResult> {
        info!("Running {} checks", checks.len());

        if self.config.parallel {
            checks.par_iter().map(|check| self.execute(check)).collect()
        } else {
            checks.iter().map(|check| self.execute(check)).collect()
        }
    }

    /// Hand each result back to the check that produced it for storage.
    ///
    /// Failures, panicking stores included, are logged and returned; they
    /// never stop the remaining results from being stored.
    pub fn store_results(&self, results: &[CheckResult]) -> Vec<AuditError> {
        let checks = self.list_checks(None);
        let mut errors = Vec::new();

        for result in results {
            let owner = checks.iter().find(|c| {
                c.namespace() == result.check.namespace && c.title() == result.check.title
            });

            let outcome = match owner {
                Some(check) => {
                    match panic::catch_unwind(AssertUnwindSafe(|| check.store_result(result))) {
                        Ok(outcome) => outcome,
                        Err(payload) => Err(ReviewError::Other(format!(
                            "store panicked: {}",
                            panic_message(payload.as_ref())
                        ))),
                    }
                }
                None => Err(ReviewError::NotFound(format!(
                    "No registered check {}",
                    result.check
                ))),
            };

            if let Err(e) = outcome {
                let msg = format!("Failed to store result for {}: {}", result.check, e);
                warn!("{}", msg);
                self.progress.error(&result.check, &msg);
                errors.push(AuditError::new(result.check.clone(), msg));
            }
        }

        errors
    }

    /// First check in `namespace` with exactly this title
    pub fn find_check(&self, namespace: &str, title: &str) -> Option<Arc<dyn Check>> {
        self.list_checks(Some(namespace))
            .into_iter()
            .find(|check| check.title() == title)
    }

    /// One complete pass: list, run, store and summarise
    pub fn run_audit(&self, namespace: Option<&str>) -> AuditReport {
        let mut report = AuditReport::new();

        let checks: Vec<_> = self
            .list_checks(namespace)
            .into_iter()
            .filter(|check| {
                let skip = self.config.skip_checks.contains(&check.key());
                if skip {
                    debug!("Skipping {}", check.key());
                }
                !skip
            })
            .collect();

        info!(
            "Starting security review with {} providers, {} checks",
            self.providers.len(),
            checks.len()
        );

        let results = self.run_checks(&checks);

        for (check, result) in checks.iter().zip(&results) {
            if let Some(fault) = &result.fault {
                report.add_error(AuditError::new(result.check.clone(), fault.clone()));
            }
            report.add_entry(
                result,
                check.message(result.status),
                check.evaluate_plain(result),
            );
        }

        for error in self.store_results(&results) {
            report.add_error(error);
        }

        report.complete();
        info!(
            "Security review completed: {} passed, {} failed, {} errors",
            report.summary.success,
            report.summary.fail,
            report.errors.len()
        );

        report
    }

    fn execute(&self, check: &Arc<dyn Check>) -> CheckResult {
        let key = check.key();
        self.progress.check_started(&key);

        let result = match self.config.timeout {
            Some(timeout) => run_with_timeout(check, timeout),
            None => run_guarded(check.as_ref()),
        };

        if let Some(fault) = &result.fault {
            warn!("Check {} failed: {}", key, fault);
            self.progress.error(&key, fault);
        }
        self.progress.check_completed(&result);

        result
    }
}

impl Default for Checklist {
    fn default() -> Self {
        Self::new()
    }
}

fn run_guarded(check: &dyn Check) -> CheckResult {
    let key = check.key();

    match panic::catch_unwind(AssertUnwindSafe(|| check.run())) {
        Ok(Ok(mut result)) => {
            if result.check != key {
                warn!("Check {} stamped its result as {}", key, result.check);
                result.check = key;
            }
            result
        }
        Ok(Err(e)) => CheckResult::faulted(key, e.to_string()),
        Err(payload) => CheckResult::faulted(
            key,
            format!("Check panicked: {}", panic_message(payload.as_ref())),
        ),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

fn run_with_timeout(check: &Arc<dyn Check>, timeout: Duration) -> CheckResult {
    let key = check.key();
    let (tx, rx) = mpsc::channel();
    let worker = Arc::clone(check);

    // The thread is left behind if it overruns.
    let spawned = thread::Builder::new()
        .name(format!("check-{}", check.machine_title()))
        .spawn(move || {
            let _ = tx.send(run_guarded(worker.as_ref()));
        });

    if let Err(e) = spawned {
        return CheckResult::faulted(key, format!("Failed to start check thread: {}", e));
    }

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(RecvTimeoutError::Timeout) => {
            CheckResult::faulted(key, ReviewError::Timeout(timeout).to_string())
        }
        Err(RecvTimeoutError::Disconnected) => {
            CheckResult::faulted(key, "Check thread exited without a result")
        }
    }
}
