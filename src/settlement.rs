//! Round economy and settlement
//!
//! Computes what a win pays and converts it into a durable bank increment on
//! the ledger. The session produces a [`SettlementRequest`]; [`settle`] runs
//! on the ledger side and answers with a [`SettlementReceipt`].

use crate::contract::{ContractId, ContractTier};
use crate::core::Word;
use crate::ledger::{Ledger, LedgerError};

/// Payload the session hands to the ledger after a winning guess
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettlementRequest {
    pub word: Word,
    pub winnings: u64,
    pub guess_count: u32,
    pub contract_id: ContractId,
}

/// Authoritative state after the bank was credited
///
/// The credit is committed before the follow-up writes run, so a receipt is
/// returned even when one of them fails. The flags say which ones landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettlementReceipt {
    pub new_bank: u64,
    /// `None` if the history could not be read back
    pub total_solved: Option<u64>,
    pub word_recorded: bool,
    pub leaderboard_synced: bool,
}

impl SettlementReceipt {
    /// True when the history and the leaderboard both caught up with the bank
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.word_recorded && self.leaderboard_synced
    }
}

/// Payout for a win on guess number `guess_count` with the pot at `pot`
///
/// Within the contracted budget the multiplier applies. In overtime the pot
/// has already been decayed and is paid out as-is.
///
/// # Examples
/// ```
/// use flexword::contract::ContractId;
/// use flexword::settlement::winnings_for;
///
/// let risky = ContractId::Risky.tier();
/// assert_eq!(winnings_for(&risky, 10_000, 3), 30_000);
/// assert_eq!(winnings_for(&risky, 5_000, 5), 5_000);
/// ```
#[must_use]
pub fn winnings_for(contract: &ContractTier, pot: u64, guess_count: u32) -> u64 {
    if guess_count <= u32::from(contract.guesses) {
        contract.apply_multiplier(pot)
    } else {
        pot
    }
}

/// Apply a settlement request to the ledger for `user`
///
/// Increments the bank, records the solved word, resynchronizes the
/// leaderboard score to the new bank and reports the totals. Each step is a
/// single atomic ledger operation; the bank is never read and written back.
///
/// Once the increment has committed, the remaining steps are all attempted
/// and their failures are reported on the receipt instead of as an error.
/// The leaderboard is resynced even if recording the word failed.
///
/// Winnings are reported by the client. The ledger only rejects amounts no
/// contract could produce; it does not recompute the payout.
///
/// # Errors
///
/// Returns `LedgerError::Rejected` for an implausible request, or the
/// ledger's error if the bank increment itself fails.
pub async fn settle<L: Ledger>(
    ledger: &L,
    user: &str,
    request: &SettlementRequest,
) -> Result<SettlementReceipt, LedgerError> {
    let contract = request.contract_id.tier();
    if request.winnings > contract.max_payout() {
        return Err(LedgerError::Rejected(format!(
            "winnings {} exceed the {} contract maximum of {}",
            request.winnings,
            contract.id,
            contract.max_payout()
        )));
    }
    if request.guess_count == 0 {
        return Err(LedgerError::Rejected(
            "a win needs at least one guess".to_string(),
        ));
    }

    let delta = i64::try_from(request.winnings)
        .map_err(|_| LedgerError::Rejected("winnings out of range".to_string()))?;

    let new_bank = ledger.increment_bank(user, delta).await?;

    let word_recorded = match ledger.add_solved_word(user, &request.word).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(user, word = %request.word, "Failed to record solved word: {e}");
            false
        }
    };
    let leaderboard_synced = match ledger.resync_leaderboard(user).await {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!(user, new_bank, "Failed to resync leaderboard: {e}");
            false
        }
    };
    let total_solved = match ledger.solved_words(user).await {
        Ok(words) => Some(words.len() as u64),
        Err(e) => {
            tracing::warn!(user, "Failed to count solved words: {e}");
            None
        }
    };

    tracing::info!(
        user,
        word = %request.word,
        winnings = request.winnings,
        new_bank,
        word_recorded,
        leaderboard_synced,
        "Settled round"
    );

    Ok(SettlementReceipt {
        new_bank,
        total_solved,
        word_recorded,
        leaderboard_synced,
    })
}
