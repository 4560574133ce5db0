//! In-process ledger

use super::{LeaderboardEntry, Ledger, LedgerError, apply_delta};
use crate::core::Word;
use rustc_hash::{FxHashMap, FxHashSet};
use std::cmp::Reverse;
use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard};

/// Ranking key: highest score first, then earliest update
type RankKey = (Reverse<u64>, u64, String);

#[derive(Debug, Default)]
struct State {
    banks: FxHashMap<String, u64>,
    solved: FxHashMap<String, FxHashSet<Word>>,
    /// user -> (score, update sequence)
    scores: FxHashMap<String, (u64, u64)>,
    ranking: BTreeSet<RankKey>,
    next_seq: u64,
}

impl State {
    fn bank(&self, user: &str) -> u64 {
        self.banks.get(user).copied().unwrap_or(0)
    }

    fn set_score(&mut self, user: &str, score: u64) {
        if let Some((old_score, old_seq)) = self.scores.remove(user) {
            self.ranking
                .remove(&(Reverse(old_score), old_seq, user.to_string()));
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.scores.insert(user.to_string(), (score, seq));
        self.ranking.insert((Reverse(score), seq, user.to_string()));
    }

    fn rank_of(&self, user: &str) -> Option<u32> {
        let &(score, seq) = self.scores.get(user)?;
        let key = (Reverse(score), seq, user.to_string());
        Some(self.ranking.range(..key).count() as u32 + 1)
    }
}

/// Ledger held entirely in memory behind a single mutex
///
/// Each trait call takes the lock once, so every operation is atomic with
/// respect to every other. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    state: Mutex<State>,
}

impl MemoryLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, LedgerError> {
        self.state
            .lock()
            .map_err(|_| LedgerError::Unavailable("memory ledger lock poisoned".to_string()))
    }
}

impl Ledger for MemoryLedger {
    async fn get_bank(&self, user: &str) -> Result<u64, LedgerError> {
        Ok(self.lock()?.bank(user))
    }

    async fn increment_bank(&self, user: &str, delta: i64) -> Result<u64, LedgerError> {
        let mut state = self.lock()?;
        let balance = apply_delta(user, state.bank(user), delta)?;
        state.banks.insert(user.to_string(), balance);
        Ok(balance)
    }

    async fn has_solved(&self, user: &str, word: &Word) -> Result<bool, LedgerError> {
        Ok(self
            .lock()?
            .solved
            .get(user)
            .is_some_and(|words| words.contains(word)))
    }

    async fn add_solved_word(&self, user: &str, word: &Word) -> Result<(), LedgerError> {
        self.lock()?
            .solved
            .entry(user.to_string())
            .or_default()
            .insert(*word);
        Ok(())
    }

    async fn solved_words(&self, user: &str) -> Result<Vec<Word>, LedgerError> {
        Ok(self
            .lock()?
            .solved
            .get(user)
            .map(|words| words.iter().copied().collect())
            .unwrap_or_default())
    }

    async fn update_leaderboard_score(&self, user: &str, score: u64) -> Result<(), LedgerError> {
        self.lock()?.set_score(user, score);
        Ok(())
    }

    async fn resync_leaderboard(&self, user: &str) -> Result<u64, LedgerError> {
        let mut state = self.lock()?;
        let bank = state.bank(user);
        state.set_score(user, bank);
        Ok(bank)
    }

    async fn top_entries(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, LedgerError> {
        let state = self.lock()?;
        Ok(state
            .ranking
            .iter()
            .take(limit)
            .zip(1..)
            .map(|((Reverse(score), _, user), rank)| LeaderboardEntry {
                username: user.clone(),
                bank: *score,
                rank,
            })
            .collect())
    }

    async fn rank(&self, user: &str) -> Result<Option<u32>, LedgerError> {
        Ok(self.lock()?.rank_of(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::conformance;
    use std::sync::Arc;

    #[tokio::test]
    async fn unknown_user_reads_as_empty() {
        conformance::unknown_user_reads_as_empty(&MemoryLedger::new()).await;
    }

    #[tokio::test]
    async fn increment_rejects_overdraft() {
        conformance::increment_rejects_overdraft(&MemoryLedger::new()).await;
    }

    #[tokio::test]
    async fn solved_words_are_a_set() {
        conformance::solved_words_are_a_set(&MemoryLedger::new()).await;
    }

    #[tokio::test]
    async fn leaderboard_orders_by_score_then_update() {
        conformance::leaderboard_orders_by_score_then_update(&MemoryLedger::new()).await;
    }

    #[tokio::test]
    async fn rank_matches_bank_order_after_resync() {
        conformance::rank_matches_bank_order_after_resync(&MemoryLedger::new()).await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_increments_all_land() {
        let ledger = Arc::new(MemoryLedger::new());
        conformance::concurrent_increments_all_land(ledger).await;
    }
}
