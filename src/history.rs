use crate::activity::ActivityKind;
use crate::app_dirs::AppDirs;
use chrono::{DateTime, Local};
use rusqlite::{params, Connection, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// One finished practice attempt, as stored locally.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptRecord {
    pub activity_kind: ActivityKind,
    pub activity_id: String,
    /// Final score on the backend's 0-100 scale.
    pub score: f64,
    /// Word counts for scorer-based activities; zero for the others.
    pub tokens_total: u32,
    pub tokens_matched: u32,
    pub timestamp: DateTime<Local>,
}

/// Per-kind aggregate over the attempt history.
#[derive(Debug, Clone, PartialEq)]
pub struct KindSummary {
    pub activity_kind: ActivityKind,
    pub attempts: i64,
    pub avg_score: f64,
    pub best_score: f64,
}

/// Local attempt history, independent of the backend: results are recorded
/// here even when the completion call could not reach the server.
#[derive(Debug)]
pub struct HistoryDb {
    conn: Connection,
}

impl HistoryDb {
    /// Open (and if needed create) the history database in the app state dir.
    pub fn new() -> Result<Self> {
        let db_path = AppDirs::db_path().unwrap_or_else(|| PathBuf::from("echodrill_history.db"));
        Self::open(&db_path)
    }

    /// Open a history database at an explicit path.
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
                    Some(format!("Failed to create directory: {}", e)),
                )
            })?;
        }

        let conn = Connection::open(db_path)?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS practice_attempts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                activity_kind TEXT NOT NULL,
                activity_id TEXT NOT NULL,
                score REAL NOT NULL,
                tokens_total INTEGER NOT NULL,
                tokens_matched INTEGER NOT NULL,
                timestamp TEXT NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_practice_attempts_activity ON practice_attempts(activity_id)",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_practice_attempts_timestamp ON practice_attempts(timestamp)",
            [],
        )?;

        Ok(HistoryDb { conn })
    }

    /// Record one finished attempt.
    pub fn record_attempt(&self, attempt: &AttemptRecord) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO practice_attempts
            (activity_kind, activity_id, score, tokens_total, tokens_matched, timestamp)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                attempt.activity_kind.to_string(),
                attempt.activity_id,
                attempt.score,
                attempt.tokens_total,
                attempt.tokens_matched,
                attempt.timestamp.to_rfc3339(),
            ],
        )?;

        Ok(())
    }

    /// Most recent attempts, newest first.
    pub fn recent(&self, limit: usize) -> Result<Vec<AttemptRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT activity_kind, activity_id, score, tokens_total, tokens_matched, timestamp
            FROM practice_attempts
            ORDER BY timestamp DESC
            LIMIT ?1
            "#,
        )?;

        let attempt_iter = stmt.query_map([limit as i64], |row| {
            let kind_str: String = row.get(0)?;
            let activity_kind = ActivityKind::from_str(&kind_str).map_err(|_| {
                rusqlite::Error::InvalidColumnType(
                    0,
                    "activity_kind".to_string(),
                    rusqlite::types::Type::Text,
                )
            })?;

            let timestamp_str: String = row.get(5)?;
            let timestamp = DateTime::parse_from_rfc3339(&timestamp_str)
                .map_err(|_| {
                    rusqlite::Error::InvalidColumnType(
                        5,
                        "timestamp".to_string(),
                        rusqlite::types::Type::Text,
                    )
                })?
                .with_timezone(&Local);

            Ok(AttemptRecord {
                activity_kind,
                activity_id: row.get(1)?,
                score: row.get(2)?,
                tokens_total: row.get(3)?,
                tokens_matched: row.get(4)?,
                timestamp,
            })
        })?;

        let mut attempts = Vec::new();
        for attempt in attempt_iter {
            attempts.push(attempt?);
        }

        Ok(attempts)
    }

    /// Average score across all attempts at one activity.
    pub fn average_score(&self, activity_id: &str) -> Result<Option<f64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT AVG(score) FROM practice_attempts WHERE activity_id = ?1")?;

        let avg: Option<f64> = stmt.query_row([activity_id], |row| row.get(0))?;
        Ok(avg)
    }

    /// Best score across all attempts at one activity.
    pub fn best_score(&self, activity_id: &str) -> Result<Option<f64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT MAX(score) FROM practice_attempts WHERE activity_id = ?1")?;

        let best: Option<f64> = stmt.query_row([activity_id], |row| row.get(0))?;
        Ok(best)
    }

    /// Aggregate attempts per activity kind.
    pub fn kind_summary(&self) -> Result<Vec<KindSummary>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT
                activity_kind,
                COUNT(*) as attempts,
                AVG(score) as avg_score,
                MAX(score) as best_score
            FROM practice_attempts
            GROUP BY activity_kind
            ORDER BY activity_kind
            "#,
        )?;

        let summary_iter = stmt.query_map([], |row| {
            let kind_str: String = row.get(0)?;
            let activity_kind = ActivityKind::from_str(&kind_str).map_err(|_| {
                rusqlite::Error::InvalidColumnType(
                    0,
                    "activity_kind".to_string(),
                    rusqlite::types::Type::Text,
                )
            })?;

            Ok(KindSummary {
                activity_kind,
                attempts: row.get(1)?,
                avg_score: row.get(2)?,
                best_score: row.get(3)?,
            })
        })?;

        let mut summary = Vec::new();
        for item in summary_iter {
            summary.push(item?);
        }

        Ok(summary)
    }

    /// Write the full history as CSV, newest first.
    pub fn export_csv<W: Write>(&self, out: &mut W) -> anyhow::Result<()> {
        writeln!(
            out,
            "timestamp,activity_kind,activity_id,score,tokens_matched,tokens_total"
        )?;

        for attempt in self.recent(usize::MAX)? {
            writeln!(
                out,
                "{},{},{},{},{},{}",
                attempt.timestamp.to_rfc3339(),
                attempt.activity_kind,
                attempt.activity_id,
                attempt.score,
                attempt.tokens_matched,
                attempt.tokens_total,
            )?;
        }

        Ok(())
    }

    /// Clear all recorded attempts (for testing or reset purposes).
    pub fn clear_all(&self) -> Result<()> {
        self.conn.execute("DELETE FROM practice_attempts", [])?;
        Ok(())
    }
}
