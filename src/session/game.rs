//! The game session value and its transitions

use super::{GuessError, Phase, SessionError};
use crate::contract::{BASE_POT, ContractTier};
use crate::core::{Feedback, KeyboardState, WORD_LENGTH, Word};
use crate::settlement::{SettlementRequest, winnings_for};
use crate::wordlists::{Lexicon, draw_unsolved};
use rand::RngCore;
use rustc_hash::FxHashSet;

/// Explicit blank in the guess buffer
pub const PLACEHOLDER: char = '_';

/// One accepted guess and how it scored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuessRecord {
    pub word: Word,
    pub feedback: Feedback,
}

/// What happened on a submitted guess that missed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissReport {
    pub feedback: Feedback,
    pub guess_count: u32,
    /// The next guess is the last one the contract covers (fires once)
    pub last_chance: bool,
    /// This miss was in overtime and halved the pot
    pub pot_decayed: bool,
    pub pot: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Miss(MissReport),
    /// The guess solved the word; the session is now `Settling`
    Won {
        feedback: Feedback,
        request: SettlementRequest,
    },
}

/// State of one round
///
/// Owned by a single caller and mutated in place; nothing here is shared or
/// persisted. Only the settlement request leaves the session.
#[derive(Debug, Clone)]
pub struct GameSession {
    phase: Phase,
    contract: Option<ContractTier>,
    target: Option<Word>,
    guesses: Vec<GuessRecord>,
    current_guess: String,
    pot: u64,
    keyboard: KeyboardState,
    warning_shown: bool,
    last_error: Option<GuessError>,
    pending: Option<SettlementRequest>,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

impl GameSession {
    #[must_use]
    pub fn new() -> Self {
        Self {
            phase: Phase::Setup,
            contract: None,
            target: None,
            guesses: Vec::new(),
            current_guess: String::with_capacity(WORD_LENGTH),
            pot: BASE_POT,
            keyboard: KeyboardState::new(),
            warning_shown: false,
            last_error: None,
            pending: None,
        }
    }

    /// Open a contract with a freshly drawn target
    ///
    /// The target avoids `solved` when the lexicon allows it.
    ///
    /// # Errors
    ///
    /// `RoundInProgress` while a round is playing or settling.
    pub fn start<L: Lexicon + ?Sized>(
        &mut self,
        contract: ContractTier,
        lexicon: &L,
        solved: &FxHashSet<Word>,
        rng: &mut dyn RngCore,
    ) -> Result<(), SessionError> {
        if !self.phase.can_start() {
            return Err(SessionError::RoundInProgress(self.phase));
        }
        let target = draw_unsolved(lexicon, solved, rng);
        self.begin(contract, target)
    }

    /// Open a contract against a known target
    ///
    /// # Errors
    ///
    /// `RoundInProgress` while a round is playing or settling.
    pub fn begin(&mut self, contract: ContractTier, target: Word) -> Result<(), SessionError> {
        if !self.phase.can_start() {
            return Err(SessionError::RoundInProgress(self.phase));
        }

        self.contract = Some(contract);
        self.target = Some(target);
        self.guesses.clear();
        self.current_guess.clear();
        self.pot = BASE_POT;
        self.keyboard.clear();
        self.warning_shown = false;
        self.last_error = None;
        self.pending = None;
        self.phase = Phase::Playing;

        tracing::debug!(contract = %contract.id, "Contract opened");
        Ok(())
    }

    /// Type a character into the guess buffer
    ///
    /// Letters are uppercased; `_` and space enter a placeholder; anything
    /// else is ignored. Does nothing once five characters are buffered.
    ///
    /// # Errors
    ///
    /// `NotPlaying` outside the `Playing` phase.
    pub fn input_letter(&mut self, ch: char) -> Result<(), SessionError> {
        self.ensure_playing()?;
        self.last_error = None;

        let ch = match ch {
            PLACEHOLDER | ' ' => PLACEHOLDER,
            c if c.is_ascii_alphabetic() => c.to_ascii_uppercase(),
            _ => return Ok(()),
        };

        if self.current_guess.len() < WORD_LENGTH {
            self.current_guess.push(ch);
        }
        Ok(())
    }

    /// Remove the last buffered character, if any
    ///
    /// # Errors
    ///
    /// `NotPlaying` outside the `Playing` phase.
    pub fn backspace(&mut self) -> Result<(), SessionError> {
        self.ensure_playing()?;
        self.last_error = None;
        self.current_guess.pop();
        Ok(())
    }

    /// Submit the buffered guess
    ///
    /// A rejected guess leaves guesses, pot and phase untouched and is kept
    /// as [`last_error`](Self::last_error) until the next keystroke.
    ///
    /// On a miss, the player is warned once when the next guess is the last
    /// one the contract covers, and every miss from the contracted count
    /// onward halves the pot. There is no limit on overtime guesses.
    ///
    /// On a win the payout is fixed, the pot shows it, and the session moves
    /// to `Settling` until [`finish_settlement`](Self::finish_settlement).
    ///
    /// # Errors
    ///
    /// `NotPlaying` outside the `Playing` phase, or `InvalidGuess` with the
    /// first failed check (placeholder, length, word list).
    pub fn submit<L: Lexicon + ?Sized>(&mut self, lexicon: &L) -> Result<SubmitOutcome, SessionError> {
        self.ensure_playing()?;
        let (Some(contract), Some(target)) = (self.contract, self.target) else {
            return Err(SessionError::NotPlaying(self.phase));
        };

        let guess = match self.validate_guess(lexicon) {
            Ok(word) => word,
            Err(err) => {
                self.last_error = Some(err);
                return Err(err.into());
            }
        };

        let feedback = Feedback::calculate(&guess, &target);
        self.guesses.push(GuessRecord {
            word: guess,
            feedback,
        });
        self.keyboard.merge(&guess, &feedback);
        self.current_guess.clear();

        let guess_count = self.guesses.len() as u32;

        if guess == target {
            let winnings = winnings_for(&contract, self.pot, guess_count);
            self.pot = winnings;

            let request = SettlementRequest {
                word: target,
                winnings,
                guess_count,
                contract_id: contract.id,
            };
            self.pending = Some(request);
            self.phase = Phase::Settling;

            tracing::debug!(guess_count, winnings, "Winning guess, settling");
            return Ok(SubmitOutcome::Won { feedback, request });
        }

        let allowed = u32::from(contract.guesses);

        let last_chance = guess_count + 1 == allowed && !self.warning_shown;
        if last_chance {
            self.warning_shown = true;
        }

        let pot_decayed = guess_count >= allowed;
        if pot_decayed {
            self.pot /= 2;
            tracing::debug!(guess_count, pot = self.pot, "Overtime miss");
        }

        Ok(SubmitOutcome::Miss(MissReport {
            feedback,
            guess_count,
            last_chance,
            pot_decayed,
            pot: self.pot,
        }))
    }

    fn validate_guess<L: Lexicon + ?Sized>(&self, lexicon: &L) -> Result<Word, GuessError> {
        if self.current_guess.contains(PLACEHOLDER) {
            return Err(GuessError::IncompleteWord);
        }
        if self.current_guess.len() != WORD_LENGTH {
            return Err(GuessError::TooShort);
        }
        // The buffer only ever holds letters and placeholders
        let word = Word::new(&self.current_guess).map_err(|_| GuessError::IncompleteWord)?;
        if !lexicon.is_valid(&word) {
            return Err(GuessError::NotOnWordList);
        }
        Ok(word)
    }

    /// Complete a pending settlement and move to `Won`
    ///
    /// # Errors
    ///
    /// `NothingToSettle` unless the session is `Settling`.
    pub fn finish_settlement(&mut self) -> Result<SettlementRequest, SessionError> {
        if self.phase != Phase::Settling {
            return Err(SessionError::NothingToSettle(self.phase));
        }
        let Some(request) = self.pending.take() else {
            return Err(SessionError::NothingToSettle(self.phase));
        };

        self.phase = Phase::Won;
        tracing::debug!(word = %request.word, "Round won");
        Ok(request)
    }

    /// The player walks away from a round in progress
    ///
    /// # Errors
    ///
    /// `NotPlaying` outside the `Playing` phase; a settling round cannot be
    /// abandoned.
    pub fn abandon(&mut self) -> Result<(), SessionError> {
        self.ensure_playing()?;
        self.current_guess.clear();
        self.phase = Phase::Lost;
        tracing::debug!(guesses = self.guesses.len(), "Round abandoned");
        Ok(())
    }

    fn ensure_playing(&self) -> Result<(), SessionError> {
        if self.phase == Phase::Playing {
            Ok(())
        } else {
            Err(SessionError::NotPlaying(self.phase))
        }
    }

    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub const fn contract(&self) -> Option<&ContractTier> {
        self.contract.as_ref()
    }

    #[must_use]
    pub fn guesses(&self) -> &[GuessRecord] {
        &self.guesses
    }

    #[must_use]
    pub fn current_guess(&self) -> &str {
        &self.current_guess
    }

    #[must_use]
    pub const fn pot(&self) -> u64 {
        self.pot
    }

    #[must_use]
    pub const fn keyboard(&self) -> &KeyboardState {
        &self.keyboard
    }

    #[must_use]
    pub const fn warning_shown(&self) -> bool {
        self.warning_shown
    }

    /// The most recent rejected guess, cleared on the next keystroke
    #[must_use]
    pub const fn last_error(&self) -> Option<GuessError> {
        self.last_error
    }

    #[must_use]
    pub const fn pending_settlement(&self) -> Option<&SettlementRequest> {
        self.pending.as_ref()
    }

    /// The target, once the round can no longer be played
    #[must_use]
    pub fn revealed_target(&self) -> Option<Word> {
        match self.phase {
            Phase::Settling | Phase::Won | Phase::Lost => self.target,
            Phase::Setup | Phase::Playing => None,
        }
    }

    /// Guesses left before overtime
    #[must_use]
    pub fn guesses_remaining(&self) -> u32 {
        self.contract.map_or(0, |contract| {
            u32::from(contract.guesses).saturating_sub(self.guesses.len() as u32)
        })
    }

    /// Whether the contracted guesses are used up
    #[must_use]
    pub fn is_overtime(&self) -> bool {
        self.contract.is_some() && self.guesses_remaining() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::ContractId;
    use crate::core::TileStatus;
    use crate::wordlists::WordList;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn word(text: &str) -> Word {
        Word::new(text).unwrap()
    }

    /// Lexicon whose only target is SABER
    fn lexicon() -> WordList {
        let allowed = ["sable", "crane", "robot", "slate", "basis", "theme"].map(word);
        WordList::new(vec![word("saber")], allowed).unwrap()
    }

    fn started(contract: ContractId) -> (GameSession, WordList) {
        let lexicon = lexicon();
        let mut session = GameSession::new();
        let mut rng = StdRng::seed_from_u64(3);
        session
            .start(contract.tier(), &lexicon, &FxHashSet::default(), &mut rng)
            .unwrap();
        (session, lexicon)
    }

    fn type_text(session: &mut GameSession, text: &str) {
        for ch in text.chars() {
            session.input_letter(ch).unwrap();
        }
    }

    fn guess(session: &mut GameSession, lexicon: &WordList, text: &str) -> SubmitOutcome {
        type_text(session, text);
        session.submit(lexicon).unwrap()
    }

    fn miss(session: &mut GameSession, lexicon: &WordList, text: &str) -> MissReport {
        match guess(session, lexicon, text) {
            SubmitOutcome::Miss(report) => report,
            SubmitOutcome::Won { .. } => panic!("{text} unexpectedly won"),
        }
    }

    fn win(session: &mut GameSession, lexicon: &WordList) -> SettlementRequest {
        match guess(session, lexicon, "saber") {
            SubmitOutcome::Won { request, .. } => request,
            SubmitOutcome::Miss(_) => panic!("SABER should win"),
        }
    }

    #[test]
    fn new_session_waits_for_a_contract() {
        let mut session = GameSession::new();
        assert_eq!(session.phase(), Phase::Setup);
        assert_eq!(
            session.input_letter('A'),
            Err(SessionError::NotPlaying(Phase::Setup))
        );
        assert!(session.contract().is_none());
    }

    #[test]
    fn start_resets_round_state() {
        let (session, _) = started(ContractId::Standard);
        assert_eq!(session.phase(), Phase::Playing);
        assert_eq!(session.pot(), BASE_POT);
        assert!(session.guesses().is_empty());
        assert!(session.keyboard().is_empty());
        assert_eq!(session.guesses_remaining(), 5);
        assert_eq!(session.revealed_target(), None);
    }

    #[test]
    fn start_rejected_mid_round() {
        let (mut session, lexicon) = started(ContractId::Safe);
        let mut rng = StdRng::seed_from_u64(0);
        let result = session.start(
            ContractId::Hard.tier(),
            &lexicon,
            &FxHashSet::default(),
            &mut rng,
        );
        assert_eq!(result, Err(SessionError::RoundInProgress(Phase::Playing)));
        assert_eq!(session.contract().unwrap().id, ContractId::Safe);
    }

    #[test]
    fn buffer_accepts_letters_and_placeholders_up_to_five() {
        let (mut session, _) = started(ContractId::Safe);
        type_text(&mut session, "sa b");
        assert_eq!(session.current_guess(), "SA_B");

        type_text(&mut session, "1!");
        assert_eq!(session.current_guess(), "SA_B");

        type_text(&mut session, "_xyz");
        assert_eq!(session.current_guess(), "SA_B_");

        session.backspace().unwrap();
        session.backspace().unwrap();
        assert_eq!(session.current_guess(), "SA_");

        for _ in 0..10 {
            session.backspace().unwrap();
        }
        assert_eq!(session.current_guess(), "");
    }

    #[test]
    fn submit_validation_order_and_no_side_effects() {
        let (mut session, lexicon) = started(ContractId::Safe);

        // Placeholder is checked before length
        type_text(&mut session, "SA_");
        assert_eq!(
            session.submit(&lexicon),
            Err(SessionError::InvalidGuess(GuessError::IncompleteWord))
        );
        assert_eq!(session.last_error(), Some(GuessError::IncompleteWord));

        session.backspace().unwrap();
        assert_eq!(session.last_error(), None);
        assert_eq!(
            session.submit(&lexicon),
            Err(SessionError::InvalidGuess(GuessError::TooShort))
        );

        type_text(&mut session, "QQQ");
        assert_eq!(
            session.submit(&lexicon),
            Err(SessionError::InvalidGuess(GuessError::NotOnWordList))
        );

        assert!(session.guesses().is_empty());
        assert_eq!(session.pot(), BASE_POT);
        assert_eq!(session.phase(), Phase::Playing);
        assert_eq!(session.current_guess(), "SAQQQ");

        // Any keystroke clears the message
        session.input_letter('#').unwrap();
        assert_eq!(session.last_error(), None);
    }

    #[test]
    fn miss_records_guess_and_merges_keyboard() {
        let (mut session, lexicon) = started(ContractId::Safe);
        let report = miss(&mut session, &lexicon, "sable");

        assert_eq!(report.guess_count, 1);
        assert_eq!(report.feedback, "CCC-P".parse().unwrap());
        assert_eq!(session.current_guess(), "");
        assert_eq!(session.guesses()[0].word, word("sable"));
        assert_eq!(session.keyboard().status(b'L'), Some(TileStatus::Absent));
        assert_eq!(session.keyboard().status(b'E'), Some(TileStatus::Present));
    }

    #[test]
    fn win_within_budget_applies_multiplier() {
        let (mut session, lexicon) = started(ContractId::Risky);
        miss(&mut session, &lexicon, "crane");
        miss(&mut session, &lexicon, "robot");
        let request = win(&mut session, &lexicon);

        assert_eq!(request.winnings, 30_000);
        assert_eq!(request.guess_count, 3);
        assert_eq!(request.contract_id, ContractId::Risky);
        assert_eq!(request.word, word("saber"));
        assert_eq!(session.pot(), 30_000);
        assert_eq!(session.phase(), Phase::Settling);
    }

    #[test]
    fn overtime_win_pays_decayed_pot_without_multiplier() {
        let (mut session, lexicon) = started(ContractId::Risky);
        for text in ["crane", "robot", "slate"] {
            assert!(!miss(&mut session, &lexicon, text).pot_decayed);
        }
        assert_eq!(session.pot(), BASE_POT);

        let fourth = miss(&mut session, &lexicon, "sable");
        assert!(fourth.pot_decayed);
        assert_eq!(fourth.pot, 5_000);
        assert!(session.is_overtime());

        let request = win(&mut session, &lexicon);
        assert_eq!(request.guess_count, 5);
        assert_eq!(request.winnings, 5_000);
    }

    #[test]
    fn last_chance_warning_fires_once_before_final_contracted_guess() {
        let (mut session, lexicon) = started(ContractId::Risky);
        assert!(!miss(&mut session, &lexicon, "crane").last_chance);
        assert!(!miss(&mut session, &lexicon, "robot").last_chance);
        assert!(miss(&mut session, &lexicon, "slate").last_chance);
        assert!(session.warning_shown());
        assert!(!miss(&mut session, &lexicon, "sable").last_chance);

        let (mut session, lexicon) = started(ContractId::Extreme);
        assert!(miss(&mut session, &lexicon, "crane").last_chance);
    }

    #[test]
    fn pot_halves_to_zero_and_stays_there() {
        let (mut session, lexicon) = started(ContractId::Extreme);
        for _ in 0..20 {
            miss(&mut session, &lexicon, "crane");
        }
        assert_eq!(session.pot(), 0);

        let report = miss(&mut session, &lexicon, "robot");
        assert!(report.pot_decayed);
        assert_eq!(report.pot, 0);

        let request = win(&mut session, &lexicon);
        assert_eq!(request.winnings, 0);
    }

    #[test]
    fn settling_rejects_all_input_until_finished() {
        let (mut session, lexicon) = started(ContractId::Hard);
        win(&mut session, &lexicon);
        let settling = Err(SessionError::NotPlaying(Phase::Settling));

        assert_eq!(session.input_letter('S'), settling);
        assert_eq!(session.backspace(), settling);
        assert_eq!(
            session.submit(&lexicon),
            Err(SessionError::NotPlaying(Phase::Settling))
        );
        assert_eq!(session.abandon(), settling);
        assert_eq!(session.guesses().len(), 1);
        assert_eq!(
            session.begin(ContractId::Safe.tier(), word("crane")),
            Err(SessionError::RoundInProgress(Phase::Settling))
        );

        let request = session.finish_settlement().unwrap();
        assert_eq!(request.winnings, 50_000);
        assert_eq!(session.phase(), Phase::Won);
        assert_eq!(session.pot(), 50_000);
        assert_eq!(session.revealed_target(), Some(word("saber")));
        assert_eq!(
            session.finish_settlement(),
            Err(SessionError::NothingToSettle(Phase::Won))
        );
    }

    #[test]
    fn finish_settlement_requires_a_win() {
        let (mut session, _) = started(ContractId::Safe);
        assert_eq!(
            session.finish_settlement(),
            Err(SessionError::NothingToSettle(Phase::Playing))
        );
    }

    #[test]
    fn abandon_ends_round_and_allows_restart() {
        let (mut session, lexicon) = started(ContractId::Standard);
        miss(&mut session, &lexicon, "crane");
        session.abandon().unwrap();

        assert_eq!(session.phase(), Phase::Lost);
        assert_eq!(session.revealed_target(), Some(word("saber")));
        assert_eq!(
            session.input_letter('A'),
            Err(SessionError::NotPlaying(Phase::Lost))
        );

        session.begin(ContractId::Hard.tier(), word("crane")).unwrap();
        assert_eq!(session.phase(), Phase::Playing);
        assert!(session.guesses().is_empty());
    }

    #[test]
    fn new_round_after_win_resets_everything() {
        let (mut session, lexicon) = started(ContractId::Extreme);
        miss(&mut session, &lexicon, "crane");
        miss(&mut session, &lexicon, "robot");
        win(&mut session, &lexicon);
        session.finish_settlement().unwrap();

        let mut rng = StdRng::seed_from_u64(9);
        session
            .start(
                ContractId::Safe.tier(),
                &lexicon,
                &FxHashSet::default(),
                &mut rng,
            )
            .unwrap();

        assert_eq!(session.pot(), BASE_POT);
        assert!(session.keyboard().is_empty());
        assert!(!session.warning_shown());
        assert!(session.pending_settlement().is_none());
        assert_eq!(session.guesses_remaining(), 6);
    }
}
