//! Player ledger: bank balances, solved-word history and the leaderboard
//!
//! Every operation is individually atomic. Callers never read a balance and
//! write it back; [`Ledger::increment_bank`] applies a signed delta in one
//! step so concurrent settlements for the same player commute.
//!
//! Two implementations are provided:
//! - [`MemoryLedger`]: mutex-guarded maps, for tests and `--ledger memory`
//! - [`SqliteLedger`]: durable storage in a local `SQLite` database

mod memory;
mod sqlite;

pub use memory::MemoryLedger;
pub use sqlite::SqliteLedger;

use crate::core::Word;
use std::future::Future;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger storage error: {0}")]
    Storage(#[from] rusqlite::Error),
    #[error("ledger I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("insufficient funds for {user}: balance {balance}, delta {delta}")]
    InsufficientFunds { user: String, balance: u64, delta: i64 },
    #[error("settlement rejected: {0}")]
    Rejected(String),
    #[error("ledger unavailable: {0}")]
    Unavailable(String),
}

/// One ranked row of the leaderboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub username: String,
    pub bank: u64,
    /// 1 is the top of the board
    pub rank: u32,
}

/// Durable per-player state shared by every session
///
/// Unknown users read as a zero bank with no history; records are created on
/// first write and never deleted. Leaderboard ties are broken by update
/// order: the player whose score was set earlier ranks higher.
pub trait Ledger: Send + Sync {
    fn get_bank(&self, user: &str) -> impl Future<Output = Result<u64, LedgerError>> + Send;

    /// Apply a signed delta and return the new balance
    ///
    /// A delta that would take the balance below zero fails with
    /// `InsufficientFunds` and leaves the balance unchanged.
    fn increment_bank(
        &self,
        user: &str,
        delta: i64,
    ) -> impl Future<Output = Result<u64, LedgerError>> + Send;

    fn has_solved(
        &self,
        user: &str,
        word: &Word,
    ) -> impl Future<Output = Result<bool, LedgerError>> + Send;

    /// Record a solved word; adding one twice is a no-op
    fn add_solved_word(
        &self,
        user: &str,
        word: &Word,
    ) -> impl Future<Output = Result<(), LedgerError>> + Send;

    /// Every word the player has solved, in no particular order
    fn solved_words(&self, user: &str)
    -> impl Future<Output = Result<Vec<Word>, LedgerError>> + Send;

    /// Set or overwrite the player's ranked score
    fn update_leaderboard_score(
        &self,
        user: &str,
        score: u64,
    ) -> impl Future<Output = Result<(), LedgerError>> + Send;

    /// Set the ranked score to the current bank in one step and return it
    fn resync_leaderboard(&self, user: &str)
    -> impl Future<Output = Result<u64, LedgerError>> + Send;

    /// Highest scores first, at most `limit` entries
    fn top_entries(
        &self,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<LeaderboardEntry>, LedgerError>> + Send;

    /// 1-based rank, or `None` if the player has no ranked score
    fn rank(&self, user: &str) -> impl Future<Output = Result<Option<u32>, LedgerError>> + Send;
}

/// Ledger selected at runtime
///
/// Keeps static dispatch while letting the CLI pick a backend.
pub enum LedgerBackend {
    Memory(MemoryLedger),
    Sqlite(SqliteLedger),
}

impl LedgerBackend {
    /// Open the backend named by `location`
    ///
    /// `"memory"` selects a fresh in-memory ledger; anything else is a path
    /// to a `SQLite` database, created if missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be created or opened.
    pub fn open(location: &Path) -> Result<Self, LedgerError> {
        if location.as_os_str() == "memory" {
            tracing::info!("Using in-memory ledger");
            return Ok(Self::Memory(MemoryLedger::new()));
        }
        Ok(Self::Sqlite(SqliteLedger::open(location)?))
    }
}

impl Ledger for LedgerBackend {
    async fn get_bank(&self, user: &str) -> Result<u64, LedgerError> {
        match self {
            Self::Memory(l) => l.get_bank(user).await,
            Self::Sqlite(l) => l.get_bank(user).await,
        }
    }

    async fn increment_bank(&self, user: &str, delta: i64) -> Result<u64, LedgerError> {
        match self {
            Self::Memory(l) => l.increment_bank(user, delta).await,
            Self::Sqlite(l) => l.increment_bank(user, delta).await,
        }
    }

    async fn has_solved(&self, user: &str, word: &Word) -> Result<bool, LedgerError> {
        match self {
            Self::Memory(l) => l.has_solved(user, word).await,
            Self::Sqlite(l) => l.has_solved(user, word).await,
        }
    }

    async fn add_solved_word(&self, user: &str, word: &Word) -> Result<(), LedgerError> {
        match self {
            Self::Memory(l) => l.add_solved_word(user, word).await,
            Self::Sqlite(l) => l.add_solved_word(user, word).await,
        }
    }

    async fn solved_words(&self, user: &str) -> Result<Vec<Word>, LedgerError> {
        match self {
            Self::Memory(l) => l.solved_words(user).await,
            Self::Sqlite(l) => l.solved_words(user).await,
        }
    }

    async fn update_leaderboard_score(&self, user: &str, score: u64) -> Result<(), LedgerError> {
        match self {
            Self::Memory(l) => l.update_leaderboard_score(user, score).await,
            Self::Sqlite(l) => l.update_leaderboard_score(user, score).await,
        }
    }

    async fn resync_leaderboard(&self, user: &str) -> Result<u64, LedgerError> {
        match self {
            Self::Memory(l) => l.resync_leaderboard(user).await,
            Self::Sqlite(l) => l.resync_leaderboard(user).await,
        }
    }

    async fn top_entries(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, LedgerError> {
        match self {
            Self::Memory(l) => l.top_entries(limit).await,
            Self::Sqlite(l) => l.top_entries(limit).await,
        }
    }

    async fn rank(&self, user: &str) -> Result<Option<u32>, LedgerError> {
        match self {
            Self::Memory(l) => l.rank(user).await,
            Self::Sqlite(l) => l.rank(user).await,
        }
    }
}

/// Apply a signed delta to a balance, or report why it cannot be applied
fn apply_delta(user: &str, balance: u64, delta: i64) -> Result<u64, LedgerError> {
    if delta >= 0 {
        balance
            .checked_add(delta.unsigned_abs())
            .ok_or_else(|| LedgerError::Rejected(format!("bank overflow for {user}")))
    } else {
        balance
            .checked_sub(delta.unsigned_abs())
            .ok_or_else(|| LedgerError::InsufficientFunds {
                user: user.to_string(),
                balance,
                delta,
            })
    }
}


/// Behavior every ledger implementation must share
#[cfg(test)]
pub(crate) mod conformance {
    use super::*;
    use std::sync::Arc;

    fn word(text: &str) -> Word {
        Word::new(text).unwrap()
    }

    pub async fn unknown_user_reads_as_empty<L: Ledger>(ledger: &L) {
        assert_eq!(ledger.get_bank("ghost").await.unwrap(), 0);
        assert!(ledger.solved_words("ghost").await.unwrap().is_empty());
        assert!(!ledger.has_solved("ghost", &word("crane")).await.unwrap());
        assert_eq!(ledger.rank("ghost").await.unwrap(), None);
        assert!(ledger.top_entries(10).await.unwrap().is_empty());
    }

    pub async fn increment_rejects_overdraft<L: Ledger>(ledger: &L) {
        assert_eq!(ledger.increment_bank("alice", 1_000).await.unwrap(), 1_000);
        assert_eq!(ledger.increment_bank("alice", -400).await.unwrap(), 600);

        let err = ledger.increment_bank("alice", -601).await.unwrap_err();
        assert!(matches!(
            err,
            LedgerError::InsufficientFunds { balance: 600, .. }
        ));
        assert_eq!(ledger.get_bank("alice").await.unwrap(), 600);

        let err = ledger.increment_bank("newcomer", -1).await.unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientFunds { balance: 0, .. }));
    }

    pub async fn solved_words_are_a_set<L: Ledger>(ledger: &L) {
        ledger.add_solved_word("bob", &word("crane")).await.unwrap();
        ledger.add_solved_word("bob", &word("saber")).await.unwrap();
        ledger.add_solved_word("bob", &word("crane")).await.unwrap();

        let mut words = ledger.solved_words("bob").await.unwrap();
        words.sort();
        assert_eq!(words, vec![word("crane"), word("saber")]);
        assert!(ledger.has_solved("bob", &word("saber")).await.unwrap());
        assert!(!ledger.has_solved("carol", &word("saber")).await.unwrap());
    }

    pub async fn leaderboard_orders_by_score_then_update<L: Ledger>(ledger: &L) {
        ledger.update_leaderboard_score("early", 500).await.unwrap();
        ledger.update_leaderboard_score("top", 900).await.unwrap();
        ledger.update_leaderboard_score("late", 500).await.unwrap();
        ledger.update_leaderboard_score("low", 10).await.unwrap();

        let names: Vec<String> = ledger
            .top_entries(10)
            .await
            .unwrap()
            .into_iter()
            .map(|entry| entry.username)
            .collect();
        assert_eq!(names, ["top", "early", "late", "low"]);

        // Overwriting moves the player to the back of their new score group
        ledger.update_leaderboard_score("early", 500).await.unwrap();
        assert_eq!(ledger.rank("late").await.unwrap(), Some(2));
        assert_eq!(ledger.rank("early").await.unwrap(), Some(3));

        let top = ledger.top_entries(2).await.unwrap();
        assert_eq!(
            top,
            vec![
                LeaderboardEntry {
                    username: "top".to_string(),
                    bank: 900,
                    rank: 1
                },
                LeaderboardEntry {
                    username: "late".to_string(),
                    bank: 500,
                    rank: 2
                },
            ]
        );
        assert!(ledger.top_entries(0).await.unwrap().is_empty());
    }

    pub async fn rank_matches_bank_order_after_resync<L: Ledger>(ledger: &L) {
        for (user, bank) in [("a", 300), ("b", 12_000), ("c", 4_500), ("d", 0)] {
            ledger.increment_bank(user, bank).await.unwrap();
            assert_eq!(ledger.resync_leaderboard(user).await.unwrap(), bank.unsigned_abs());
        }
        ledger.increment_bank("a", 10_000).await.unwrap();
        assert_eq!(ledger.resync_leaderboard("a").await.unwrap(), 10_300);

        let entries = ledger.top_entries(10).await.unwrap();
        for pair in entries.windows(2) {
            assert!(pair[0].bank >= pair[1].bank);
        }
        for entry in &entries {
            assert_eq!(ledger.rank(&entry.username).await.unwrap(), Some(entry.rank));
            assert_eq!(ledger.get_bank(&entry.username).await.unwrap(), entry.bank);
        }
        assert_eq!(entries[0].username, "b");
        assert_eq!(entries[1].username, "a");
    }

    pub async fn concurrent_increments_all_land<L: Ledger + 'static>(ledger: Arc<L>) {
        const TASKS: i64 = 16;
        const ROUNDS: i64 = 25;

        let handles: Vec<_> = (0..TASKS)
            .map(|task| {
                let ledger = Arc::clone(&ledger);
                tokio::spawn(async move {
                    for _ in 0..ROUNDS {
                        ledger.increment_bank("shared", task + 1).await.unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        let expected = ROUNDS * (1..=TASKS).sum::<i64>();
        assert_eq!(ledger.get_bank("shared").await.unwrap(), expected.unsigned_abs());
    }
}
