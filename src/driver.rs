//! Per-player orchestrator
//!
//! [`GameDriver`] owns one player's session, their locally cached ledger
//! snapshot, the lexicon and the ledger handle. It forwards input to the
//! session and runs settlement against the ledger under a timeout, falling
//! back to a local credit if the ledger does not answer.

use crate::contract::ContractId;
use crate::core::Word;
use crate::ledger::{LeaderboardEntry, Ledger, LedgerError};
use crate::session::{GameSession, SessionError, SubmitOutcome};
use crate::settlement::settle;
use crate::wordlists::Lexicon;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rustc_hash::FxHashSet;
use std::time::Duration;

pub const DEFAULT_SETTLEMENT_TIMEOUT: Duration = Duration::from_millis(3_000);
pub const DEFAULT_GRACE_INTERVAL: Duration = Duration::from_millis(1_500);

/// Timing knobs for settlement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverOptions {
    /// How long to wait for the ledger before crediting locally
    pub settlement_timeout: Duration,
    /// Pause between settlement and the round being marked won
    pub grace_interval: Duration,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            settlement_timeout: DEFAULT_SETTLEMENT_TIMEOUT,
            grace_interval: DEFAULT_GRACE_INTERVAL,
        }
    }
}

/// What the client knows about the player
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSnapshot {
    pub username: String,
    pub bank: u64,
    pub solved_words: FxHashSet<Word>,
}

/// Result of a completed settlement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WinReport {
    pub word: Word,
    pub winnings: u64,
    pub guess_count: u32,
    pub new_bank: u64,
    /// `false` when the ledger failed or timed out and the bank was only
    /// credited locally
    pub settled: bool,
    /// `false` when the bank was credited but the solved word or the
    /// leaderboard score did not catch up
    pub recorded: bool,
}

pub struct GameDriver<L, X> {
    ledger: L,
    lexicon: X,
    user: UserSnapshot,
    session: GameSession,
    options: DriverOptions,
    rng: StdRng,
}

impl<L: Ledger, X: Lexicon> GameDriver<L, X> {
    /// Hydrate the player's snapshot from the ledger
    ///
    /// # Errors
    ///
    /// Returns the ledger error if the bank or history cannot be read.
    pub async fn load(
        ledger: L,
        lexicon: X,
        username: impl Into<String>,
        options: DriverOptions,
    ) -> Result<Self, LedgerError> {
        let username = username.into();
        let bank = ledger.get_bank(&username).await?;
        let solved_words: FxHashSet<Word> = ledger.solved_words(&username).await?.into_iter().collect();

        tracing::info!(
            user = %username,
            bank,
            solved = solved_words.len(),
            "Loaded player"
        );

        Ok(Self {
            ledger,
            lexicon,
            user: UserSnapshot {
                username,
                bank,
                solved_words,
            },
            session: GameSession::new(),
            options,
            rng: StdRng::from_rng(&mut rand::rng()),
        })
    }

    /// Replace the target-drawing RNG
    #[must_use]
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    /// Open a new contract, avoiding words the player already solved
    ///
    /// # Errors
    ///
    /// `RoundInProgress` while a round is playing or settling.
    pub fn start_contract(&mut self, id: ContractId) -> Result<(), SessionError> {
        self.session
            .start(id.tier(), &self.lexicon, &self.user.solved_words, &mut self.rng)
    }

    /// # Errors
    ///
    /// `NotPlaying` outside the `Playing` phase.
    pub fn input(&mut self, ch: char) -> Result<(), SessionError> {
        self.session.input_letter(ch)
    }

    /// # Errors
    ///
    /// `NotPlaying` outside the `Playing` phase.
    pub fn backspace(&mut self) -> Result<(), SessionError> {
        self.session.backspace()
    }

    /// Submit the current guess
    ///
    /// A winning guess leaves the session `Settling`; follow it with
    /// [`settle_pending`](Self::settle_pending).
    ///
    /// # Errors
    ///
    /// See [`GameSession::submit`].
    pub fn submit(&mut self) -> Result<SubmitOutcome, SessionError> {
        self.session.submit(&self.lexicon)
    }

    /// Settle the pending win and move the round to `Won`
    ///
    /// On success the snapshot adopts the ledger's authoritative bank and
    /// records the word. If the ledger errors or does not answer within the
    /// timeout, the winnings are added to the local bank only and the solved
    /// set is left alone. Either way the round then waits out the grace
    /// interval and is marked won.
    ///
    /// # Errors
    ///
    /// `NothingToSettle` if no win is pending.
    pub async fn settle_pending(&mut self) -> Result<WinReport, SessionError> {
        let Some(request) = self.session.pending_settlement().copied() else {
            return Err(SessionError::NothingToSettle(self.session.phase()));
        };

        let outcome = tokio::time::timeout(
            self.options.settlement_timeout,
            settle(&self.ledger, &self.user.username, &request),
        )
        .await;

        let (settled, recorded) = match outcome {
            Ok(Ok(receipt)) => {
                self.user.bank = receipt.new_bank;
                if receipt.word_recorded {
                    self.user.solved_words.insert(request.word);
                }
                (true, receipt.is_complete())
            }
            Ok(Err(e)) => {
                tracing::warn!(
                    user = %self.user.username,
                    winnings = request.winnings,
                    "Settlement failed, crediting locally: {e}"
                );
                self.credit_locally(request.winnings);
                (false, false)
            }
            Err(_) => {
                tracing::warn!(
                    user = %self.user.username,
                    winnings = request.winnings,
                    timeout = ?self.options.settlement_timeout,
                    "Settlement timed out, crediting locally"
                );
                self.credit_locally(request.winnings);
                (false, false)
            }
        };

        if !self.options.grace_interval.is_zero() {
            tokio::time::sleep(self.options.grace_interval).await;
        }
        self.session.finish_settlement()?;

        Ok(WinReport {
            word: request.word,
            winnings: request.winnings,
            guess_count: request.guess_count,
            new_bank: self.user.bank,
            settled,
            recorded,
        })
    }

    fn credit_locally(&mut self, winnings: u64) {
        self.user.bank = self.user.bank.saturating_add(winnings);
    }

    /// Leave the current round, if one is being played
    pub fn exit(&mut self) {
        if self.session.abandon().is_ok() {
            tracing::info!(user = %self.user.username, "Left round in progress");
        }
    }

    /// # Errors
    ///
    /// Returns the ledger error if the board cannot be read.
    pub async fn leaderboard(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, LedgerError> {
        self.ledger.top_entries(limit).await
    }

    /// # Errors
    ///
    /// Returns the ledger error if the rank cannot be read.
    pub async fn rank(&self) -> Result<Option<u32>, LedgerError> {
        self.ledger.rank(&self.user.username).await
    }

    #[must_use]
    pub const fn session(&self) -> &GameSession {
        &self.session
    }

    #[must_use]
    pub const fn user(&self) -> &UserSnapshot {
        &self.user
    }

    #[must_use]
    pub const fn ledger(&self) -> &L {
        &self.ledger
    }

    #[must_use]
    pub const fn lexicon(&self) -> &X {
        &self.lexicon
    }
}
