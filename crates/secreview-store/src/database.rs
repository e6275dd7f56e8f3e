//! SQLite database for storing check results

use rusqlite::{params, Connection};
use secreview_core::{
    CheckKey, CheckResult, CheckStatus, Findings, Result, ResultStore, ReviewError, StoredResult,
};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

/// Result store backed by a SQLite database
pub struct SqliteResultStore {
    conn: Mutex<Connection>,
}

/// Row as read from the results table
struct RawRow {
    namespace: String,
    title: String,
    status: i64,
    findings: String,
    fault: Option<String>,
    stored_at: i64,
}

impl SqliteResultStore {
    /// Open (or create) a result database at `path`
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|e| {
            ReviewError::Database(format!("Failed to open database {}: {}", path.display(), e))
        })?;
        Self::init(conn)
    }

    /// Database that lives only as long as the store
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| {
            ReviewError::Database(format!("Failed to create database: {}", e))
        })?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS results (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                namespace TEXT NOT NULL,
                title TEXT NOT NULL,
                status INTEGER NOT NULL,
                findings TEXT NOT NULL,
                fault TEXT,
                stored_at INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_results_check ON results(namespace, title);
            ",
        )
        .map_err(|e| ReviewError::Database(format!("Failed to create tables: {}", e)))?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| ReviewError::Database("Connection lock poisoned".to_string()))
    }

    /// Number of stored results across all checks
    pub fn result_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn()?
            .query_row("SELECT COUNT(*) FROM results", [], |row| row.get(0))
            .map_err(|e| ReviewError::Database(format!("Failed to count results: {}", e)))?;
        Ok(count as usize)
    }

    fn query(&self, check: &CheckKey, limit: usize) -> Result<Vec<StoredResult>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT namespace, title, status, findings, fault, stored_at FROM results
                 WHERE namespace = ?1 AND title = ?2
                 ORDER BY id DESC LIMIT ?3",
            )
            .map_err(|e| ReviewError::Database(format!("Failed to prepare statement: {}", e)))?;

        let rows = stmt
            .query_map(params![check.namespace, check.title, limit as i64], |row| {
                Ok(RawRow {
                    namespace: row.get(0)?,
                    title: row.get(1)?,
                    status: row.get(2)?,
                    findings: row.get(3)?,
                    fault: row.get(4)?,
                    stored_at: row.get(5)?,
                })
            })
            .map_err(|e| ReviewError::Database(format!("Failed to query results: {}", e)))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| ReviewError::Database(format!("Failed to collect results: {}", e)))?;

        rows.into_iter().map(decode_row).collect()
    }
}

fn decode_row(row: RawRow) -> Result<StoredResult> {
    let status = CheckStatus::from_code(row.status)
        .ok_or_else(|| ReviewError::Database(format!("Unknown status code {}", row.status)))?;
    let findings: Findings = serde_json::from_str(&row.findings)?;
    let stored_at = chrono::DateTime::<chrono::Utc>::from_timestamp_millis(row.stored_at)
        .ok_or_else(|| ReviewError::Database(format!("Invalid timestamp {}", row.stored_at)))?;

    Ok(StoredResult {
        result: CheckResult {
            check: CheckKey::new(row.namespace, row.title),
            status,
            findings,
            fault: row.fault,
        },
        stored_at,
    })
}

impl ResultStore for SqliteResultStore {
    fn save(&self, result: &CheckResult) -> Result<()> {
        let findings = serde_json::to_string(&result.findings)?;
        let stored_at = chrono::Utc::now().timestamp_millis();

        self.conn()?
            .execute(
                "INSERT INTO results (namespace, title, status, findings, fault, stored_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    result.check.namespace,
                    result.check.title,
                    result.status.code(),
                    findings,
                    result.fault,
                    stored_at
                ],
            )
            .map_err(|e| ReviewError::Database(format!("Failed to store result: {}", e)))?;

        debug!("Stored {} result for {}", result.status, result.check);
        Ok(())
    }

    fn latest(&self, check: &CheckKey) -> Result<Option<StoredResult>> {
        Ok(self.query(check, 1)?.into_iter().next())
    }

    fn history(&self, check: &CheckKey, limit: usize) -> Result<Vec<StoredResult>> {
        self.query(check, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn level_result(level: serde_json::Value, status: CheckStatus) -> CheckResult {
        let mut findings = Findings::new();
        findings.insert("level".to_string(), level);
        CheckResult::new(
            CheckKey::new("Security Review", "Error reporting"),
            status,
            findings,
        )
    }

    #[test]
    fn test_latest_is_most_recent() {
        let store = SqliteResultStore::in_memory().unwrap();
        let key = CheckKey::new("Security Review", "Error reporting");

        assert!(store.latest(&key).unwrap().is_none());

        store.save(&level_result(json!(null), CheckStatus::Fail)).unwrap();
        store.save(&level_result(json!("hide"), CheckStatus::Success)).unwrap();

        let latest = store.latest(&key).unwrap().unwrap();
        assert_eq!(latest.result.status, CheckStatus::Success);
        assert_eq!(latest.result.finding("level"), Some(&json!("hide")));
        assert_eq!(store.result_count().unwrap(), 2);
    }

    #[test]
    fn test_history_newest_first() {
        let store = SqliteResultStore::in_memory().unwrap();
        let key = CheckKey::new("Security Review", "Error reporting");

        store.save(&level_result(json!("all"), CheckStatus::Fail)).unwrap();
        store.save(&level_result(json!("some"), CheckStatus::Fail)).unwrap();
        store.save(&level_result(json!("hide"), CheckStatus::Success)).unwrap();

        let history = store.history(&key, 2).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].result.finding("level"), Some(&json!("hide")));
        assert_eq!(history[1].result.finding("level"), Some(&json!("some")));
    }

    #[test]
    fn test_keys_are_isolated() {
        let store = SqliteResultStore::in_memory().unwrap();
        store.save(&level_result(json!("hide"), CheckStatus::Success)).unwrap();

        let other = CheckKey::new("Security Review", "Nonexistent");
        assert!(store.latest(&other).unwrap().is_none());
        let other_ns = CheckKey::new("security review", "Error reporting");
        assert!(store.latest(&other_ns).unwrap().is_none());
    }

    #[test]
    fn test_fault_round_trip() {
        let store = SqliteResultStore::in_memory().unwrap();
        let key = CheckKey::new("ns", "broken");
        store.save(&CheckResult::faulted(key.clone(), "panicked")).unwrap();

        let latest = store.latest(&key).unwrap().unwrap();
        assert_eq!(latest.result.fault.as_deref(), Some("panicked"));
        assert!(latest.result.is_fault());
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.db");
        let key = CheckKey::new("Security Review", "Error reporting");

        {
            let store = SqliteResultStore::open(&path).unwrap();
            store.save(&level_result(json!("verbose"), CheckStatus::Fail)).unwrap();
        }

        let store = SqliteResultStore::open(&path).unwrap();
        let latest = store.latest(&key).unwrap().unwrap();
        assert_eq!(latest.result.finding("level"), Some(&json!("verbose")));
    }
}
