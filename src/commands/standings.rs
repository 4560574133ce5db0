//! Bank and leaderboard queries

use crate::ledger::{Ledger, LedgerError};

/// A player's standing on the ledger
pub struct PlayerSummary {
    pub username: String,
    pub bank: u64,
    pub solved: usize,
    pub rank: Option<u32>,
}

/// Read a player's bank, solved count and rank
///
/// # Errors
///
/// Returns the ledger error if any query fails.
pub async fn player_summary<L: Ledger>(ledger: &L, user: &str) -> Result<PlayerSummary, LedgerError> {
    Ok(PlayerSummary {
        username: user.to_string(),
        bank: ledger.get_bank(user).await?,
        solved: ledger.solved_words(user).await?.len(),
        rank: ledger.rank(user).await?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::ContractId;
    use crate::core::Word;
    use crate::ledger::MemoryLedger;
    use crate::settlement::{SettlementRequest, settle};

    #[tokio::test]
    async fn summary_for_new_player_is_empty() {
        let summary = player_summary(&MemoryLedger::new(), "newbie").await.unwrap();
        assert_eq!(summary.username, "newbie");
        assert_eq!(summary.bank, 0);
        assert_eq!(summary.solved, 0);
        assert_eq!(summary.rank, None);
    }

    #[tokio::test]
    async fn summary_reflects_settled_wins() {
        let ledger = MemoryLedger::new();
        for (user, word, winnings) in [("alice", "saber", 15_000), ("bob", "crane", 50_000)] {
            let request = SettlementRequest {
                word: Word::new(word).unwrap(),
                winnings,
                guess_count: 2,
                contract_id: ContractId::Hard,
            };
            settle(&ledger, user, &request).await.unwrap();
        }

        let summary = player_summary(&ledger, "alice").await.unwrap();
        assert_eq!(summary.bank, 15_000);
        assert_eq!(summary.solved, 1);
        assert_eq!(summary.rank, Some(2));
    }
}
