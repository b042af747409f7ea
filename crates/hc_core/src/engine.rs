//! Two-innings turn engine.
//!
//! The player bats first. Each ball, both sides show a digit; equal
//! digits dismiss whichever side is batting, otherwise the batting side
//! scores its own digit. The first dismissal fixes the target and hands
//! the bat to the opponent; the match ends on the second dismissal, or as
//! soon as the opponent has passed the target.
//!
//! The engine owns the entire match state and `advance` is its only
//! mutator, so a session can be abandoned between any two balls without
//! leaving anything half-updated. It never draws randomness itself: the
//! opponent's digit is injected per ball, which is what makes seeded
//! match replays exact.

use crate::digit::Digit;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Setup,
    FirstInnings,
    SecondInnings,
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Player,
    Opponent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Pending,
    PlayerWin,
    OpponentWin,
    Tie,
}

/// Full match state. Owned exclusively by [`TurnEngine`] and handed out
/// by value; everything outside the engine reads, never writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchState {
    pub phase: Phase,
    pub batting_side: Side,
    pub player_runs: u32,
    pub opponent_runs: u32,
    /// Runs the second-innings side must exceed to win. Set at the first
    /// dismissal, `None` before that.
    pub target: Option<u32>,
    /// Whether the most recent ball dismissed the batting side. Reset
    /// when the second innings begins.
    pub dismissed: bool,
    pub outcome: Outcome,
}

impl MatchState {
    fn initial() -> Self {
        MatchState {
            phase: Phase::Setup,
            batting_side: Side::Player,
            player_runs: 0,
            opponent_runs: 0,
            target: None,
            dismissed: false,
            outcome: Outcome::Pending,
        }
    }
}

/// The match state machine: `Setup -> FirstInnings -> SecondInnings ->
/// Complete`.
#[derive(Debug, Clone)]
pub struct TurnEngine {
    state: MatchState,
}

impl Default for TurnEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TurnEngine {
    pub fn new() -> Self {
        TurnEngine { state: MatchState::initial() }
    }

    pub fn state(&self) -> MatchState {
        self.state
    }

    /// Begins the first innings.
    ///
    /// # Panics
    /// Outside `Setup`. Calling it twice is a programming error, not a
    /// recoverable condition.
    pub fn start(&mut self) {
        assert!(
            self.state.phase == Phase::Setup,
            "start called in {:?}, only valid in Setup",
            self.state.phase
        );
        self.state.phase = Phase::FirstInnings;
        log::debug!("match started, player batting");
    }

    /// Discards the match and returns to `Setup` for a fresh one.
    pub fn reset(&mut self) {
        self.state = MatchState::initial();
    }

    /// Applies one ball and returns the resulting state.
    ///
    /// # Panics
    /// Outside `FirstInnings` / `SecondInnings`. An out-of-phase call is
    /// a contract violation by the caller.
    pub fn advance(&mut self, player: Digit, opponent: Digit) -> MatchState {
        match self.state.phase {
            Phase::FirstInnings => self.advance_first(player, opponent),
            Phase::SecondInnings => self.advance_second(player, opponent),
            phase => panic!("advance called in {phase:?}, only valid during an innings"),
        }
        self.state
    }

    fn advance_first(&mut self, player: Digit, opponent: Digit) {
        if player == opponent {
            // first dismissal fixes the target and flips the bat;
            // the new innings starts with a clean dismissal flag
            self.state.target = Some(self.state.player_runs);
            self.state.phase = Phase::SecondInnings;
            self.state.batting_side = Side::Opponent;
            self.state.dismissed = false;
            log::debug!("player out for {}, opponent chasing", self.state.player_runs);
        } else {
            self.score(player, opponent);
        }
    }

    fn advance_second(&mut self, player: Digit, opponent: Digit) {
        if player == opponent {
            self.state.dismissed = true;
            self.complete();
            return;
        }
        self.score(player, opponent);
        let Some(target) = self.state.target else {
            unreachable!("target is set when the second innings begins")
        };
        // chase already won, no further balls needed
        if self.state.opponent_runs > target {
            self.complete();
        }
    }

    fn score(&mut self, player: Digit, opponent: Digit) {
        match self.state.batting_side {
            Side::Player => self.state.player_runs += u32::from(player.get()),
            Side::Opponent => self.state.opponent_runs += u32::from(opponent.get()),
        }
    }

    fn complete(&mut self) {
        self.state.phase = Phase::Complete;
        self.state.outcome = match self.state.player_runs.cmp(&self.state.opponent_runs) {
            Ordering::Greater => Outcome::PlayerWin,
            Ordering::Less => Outcome::OpponentWin,
            Ordering::Equal => Outcome::Tie,
        };
        log::debug!(
            "match complete: player {} / opponent {} -> {:?}",
            self.state.player_runs,
            self.state.opponent_runs,
            self.state.outcome
        );
    }
}

/// The automated opponent: a seedable uniform draw over [1, 10],
/// independent of prior balls.
#[derive(Debug, Clone)]
pub struct Opponent {
    rng: ChaCha8Rng,
}

impl Opponent {
    pub fn from_seed(seed: u64) -> Self {
        Opponent { rng: ChaCha8Rng::seed_from_u64(seed) }
    }

    pub fn from_entropy() -> Self {
        Opponent { rng: ChaCha8Rng::from_entropy() }
    }

    pub fn bowl(&mut self) -> Digit {
        Digit::random(&mut self.rng)
    }
}
