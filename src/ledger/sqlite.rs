//! Durable ledger backed by a local `SQLite` database

use super::{LeaderboardEntry, Ledger, LedgerError, apply_delta};
use crate::core::Word;
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Ledger stored in a `SQLite` file
///
/// Every operation is a single statement or a single immediate
/// transaction, so several processes can share one database file. Queries
/// run on the blocking pool; a caller waiting on a locked database can be
/// cancelled without stalling its runtime.
pub struct SqliteLedger {
    db: Arc<Mutex<Connection>>,
}

impl SqliteLedger {
    const SCHEMA: &'static str = "
        CREATE TABLE IF NOT EXISTS banks (
            username TEXT PRIMARY KEY,
            balance  INTEGER NOT NULL DEFAULT 0 CHECK (balance >= 0)
        );
        CREATE TABLE IF NOT EXISTS solved_words (
            username TEXT NOT NULL,
            word     TEXT NOT NULL,
            PRIMARY KEY (username, word)
        );
        CREATE TABLE IF NOT EXISTS leaderboard (
            username TEXT PRIMARY KEY,
            score    INTEGER NOT NULL CHECK (score >= 0),
            seq      INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_leaderboard_rank
            ON leaderboard (score DESC, seq ASC);
    ";

    /// Open or create the database at `path`
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created or the
    /// database cannot be opened and initialized.
    pub fn open(path: &Path) -> Result<Self, LedgerError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        let db = Connection::open(path)?;
        tracing::debug!(path = %path.display(), "Opened ledger database");
        Self::initialize(db)
    }

    fn initialize(db: Connection) -> Result<Self, LedgerError> {
        db.busy_timeout(BUSY_TIMEOUT)?;
        db.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        db.execute_batch(Self::SCHEMA)?;
        Ok(Self {
            db: Arc::new(Mutex::new(db)),
        })
    }

    /// Run `op` against the connection on the blocking pool
    async fn with_conn<T, F>(&self, op: F) -> Result<T, LedgerError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, LedgerError> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || {
            let mut conn = db
                .lock()
                .map_err(|_| LedgerError::Unavailable("ledger connection lock poisoned".to_string()))?;
            op(&mut conn)
        })
        .await
        .map_err(|e| LedgerError::Unavailable(format!("ledger task failed: {e}")))?
    }
}

/// Stored integers are always non-negative (`CHECK` constraints)
fn to_sql_int(value: u64) -> Result<i64, LedgerError> {
    i64::try_from(value).map_err(|_| LedgerError::Rejected(format!("{value} exceeds storage range")))
}

fn set_score(conn: &Connection, user: &str, score: u64) -> Result<(), LedgerError> {
    conn.execute(
        "INSERT INTO leaderboard (username, score, seq)
         VALUES (?1, ?2, (SELECT COALESCE(MAX(seq), 0) + 1 FROM leaderboard))
         ON CONFLICT(username) DO UPDATE SET score = excluded.score, seq = excluded.seq",
        params![user, to_sql_int(score)?],
    )?;
    Ok(())
}

impl Ledger for SqliteLedger {
    async fn get_bank(&self, user: &str) -> Result<u64, LedgerError> {
        let user = user.to_owned();
        self.with_conn(move |conn| {
            let balance: Option<i64> = conn
                .query_row(
                    "SELECT balance FROM banks WHERE username = ?1",
                    params![user],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(balance.unwrap_or(0).unsigned_abs())
        })
        .await
    }

    async fn increment_bank(&self, user: &str, delta: i64) -> Result<u64, LedgerError> {
        let user = user.to_owned();
        self.with_conn(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let balance: Option<i64> = tx
                .query_row(
                    "SELECT balance FROM banks WHERE username = ?1",
                    params![user],
                    |row| row.get(0),
                )
                .optional()?;
            let new_balance = apply_delta(&user, balance.unwrap_or(0).unsigned_abs(), delta)?;

            tx.execute(
                "INSERT INTO banks (username, balance) VALUES (?1, ?2)
                 ON CONFLICT(username) DO UPDATE SET balance = excluded.balance",
                params![user, to_sql_int(new_balance)?],
            )?;
            tx.commit()?;

            Ok(new_balance)
        })
        .await
    }

    async fn has_solved(&self, user: &str, word: &Word) -> Result<bool, LedgerError> {
        let user = user.to_owned();
        let word = *word;
        self.with_conn(move |conn| {
            let found = conn
                .query_row(
                    "SELECT 1 FROM solved_words WHERE username = ?1 AND word = ?2",
                    params![user, word.text()],
                    |_| Ok(()),
                )
                .optional()?;
            Ok(found.is_some())
        })
        .await
    }

    async fn add_solved_word(&self, user: &str, word: &Word) -> Result<(), LedgerError> {
        let user = user.to_owned();
        let word = *word;
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT OR IGNORE INTO solved_words (username, word) VALUES (?1, ?2)",
                params![user, word.text()],
            )?;
            Ok(())
        })
        .await
    }

    async fn solved_words(&self, user: &str) -> Result<Vec<Word>, LedgerError> {
        let user = user.to_owned();
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare("SELECT word FROM solved_words WHERE username = ?1")?;
            let rows = stmt.query_map(params![user], |row| row.get::<_, String>(0))?;

            let mut words = Vec::new();
            for text in rows {
                let text = text?;
                match Word::new(&text) {
                    Ok(word) => words.push(word),
                    Err(e) => {
                        tracing::warn!(user = %user, word = %text, "Skipping malformed solved word: {e}");
                    }
                }
            }
            Ok(words)
        })
        .await
    }

    async fn update_leaderboard_score(&self, user: &str, score: u64) -> Result<(), LedgerError> {
        let user = user.to_owned();
        self.with_conn(move |conn| set_score(conn, &user, score)).await
    }

    async fn resync_leaderboard(&self, user: &str) -> Result<u64, LedgerError> {
        let user = user.to_owned();
        self.with_conn(move |conn| {
            let score: i64 = conn.query_row(
                "INSERT INTO leaderboard (username, score, seq)
                 VALUES (
                     ?1,
                     COALESCE((SELECT balance FROM banks WHERE username = ?1), 0),
                     (SELECT COALESCE(MAX(seq), 0) + 1 FROM leaderboard)
                 )
                 ON CONFLICT(username) DO UPDATE SET score = excluded.score, seq = excluded.seq
                 RETURNING score",
                params![user],
                |row| row.get(0),
            )?;
            Ok(score.unsigned_abs())
        })
        .await
    }

    async fn top_entries(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, LedgerError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT username, score FROM leaderboard
                 ORDER BY score DESC, seq ASC
                 LIMIT ?1",
            )?;
            let rows = stmt.query_map(params![limit], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })?;

            let mut entries = Vec::new();
            for (row, rank) in rows.zip(1..) {
                let (username, score) = row?;
                entries.push(LeaderboardEntry {
                    username,
                    bank: score.unsigned_abs(),
                    rank,
                });
            }
            Ok(entries)
        })
        .await
    }

    async fn rank(&self, user: &str) -> Result<Option<u32>, LedgerError> {
        let user = user.to_owned();
        self.with_conn(move |conn| {
            let ahead: Option<i64> = conn
                .query_row(
                    "SELECT (
                         SELECT COUNT(*) FROM leaderboard other
                         WHERE other.score > me.score
                            OR (other.score = me.score AND other.seq < me.seq)
                     )
                     FROM leaderboard me WHERE me.username = ?1",
                    params![user],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(ahead.map(|count| u32::try_from(count).unwrap_or(u32::MAX - 1) + 1))
        })
        .await
    }
}
