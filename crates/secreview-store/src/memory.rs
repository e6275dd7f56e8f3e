//! In-memory result store

use secreview_core::{CheckKey, CheckResult, Result, ResultStore, ReviewError, StoredResult};
use std::collections::HashMap;
use std::sync::Mutex;

/// Result store that keeps everything in process memory
#[derive(Default)]
pub struct MemoryResultStore {
    results: Mutex<HashMap<CheckKey, Vec<StoredResult>>>,
}

impl MemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored results across all checks
    pub fn len(&self) -> usize {
        self.results
            .lock()
            .map(|r| r.values().map(Vec::len).sum())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ResultStore for MemoryResultStore {
    fn save(&self, result: &CheckResult) -> Result<()> {
        let mut results = self
            .results
            .lock()
            .map_err(|_| ReviewError::Database("Result store lock poisoned".to_string()))?;

        results
            .entry(result.check.clone())
            .or_default()
            .push(StoredResult {
                result: result.clone(),
                stored_at: chrono::Utc::now(),
            });
        Ok(())
    }

    fn latest(&self, check: &CheckKey) -> Result<Option<StoredResult>> {
        Ok(self.history(check, 1)?.into_iter().next())
    }

    fn history(&self, check: &CheckKey, limit: usize) -> Result<Vec<StoredResult>> {
        let results = self
            .results
            .lock()
            .map_err(|_| ReviewError::Database("Result store lock poisoned".to_string()))?;

        Ok(results
            .get(check)
            .map(|stored| stored.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secreview_core::{CheckStatus, Findings};

    #[test]
    fn test_append_and_latest() {
        let store = MemoryResultStore::new();
        let key = CheckKey::new("ns", "check");
        assert!(store.is_empty());

        store
            .save(&CheckResult::new(key.clone(), CheckStatus::Fail, Findings::new()))
            .unwrap();
        store
            .save(&CheckResult::new(key.clone(), CheckStatus::Info, Findings::new()))
            .unwrap();

        assert_eq!(store.len(), 2);
        let latest = store.latest(&key).unwrap().unwrap();
        assert_eq!(latest.result.status, CheckStatus::Info);

        let history = store.history(&key, 10).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].result.status, CheckStatus::Fail);
        assert!(history[0].stored_at >= history[1].stored_at);
    }

    #[test]
    fn test_unknown_key() {
        let store = MemoryResultStore::new();
        assert!(store.latest(&CheckKey::new("ns", "missing")).unwrap().is_none());
        assert!(store.history(&CheckKey::new("ns", "missing"), 5).unwrap().is_empty());
    }
}
