//! Round Driver — balance, bet, countdown and round flags
//!
//! Advanced once per frame tick. Converts frame deltas into whole-second
//! countdown steps that bound how long a spin runs.

use rk_core::FrameDelta;
use serde::{Deserialize, Serialize};

use crate::config::RoundConfig;

/// Milliseconds in one countdown step
pub const COUNTDOWN_STEP_MS: f64 = 1000.0;

/// Why a spin request was ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpinRejection {
    /// Round not started, or ended and waiting for its reset
    NotRunning,
    /// Balance is zero or negative
    InsufficientBalance,
    /// Input locked (spin in progress or reel not yet idle)
    InputLocked,
}

/// Round-level state, passed explicitly into every step function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundState {
    /// Balance restored on reset (before adding winnings)
    pub initial_balance: i64,
    pub balance: i64,
    pub bet: i64,
    /// Winnings accumulated since the last reset
    pub winnings: i64,
    /// Whole seconds left in the current spin
    pub countdown: u32,
    /// Countdown loaded on spin start
    pub countdown_max: u32,
    /// Milliseconds accumulated toward the next countdown step
    pub elapsed_ms: f64,
    pub input_allowed: bool,
    pub is_spinning: bool,
    pub round_started: bool,
    pub round_ended: bool,
    /// `round_started && !round_ended`, refreshed by `advance`
    pub can_run: bool,
}

impl RoundState {
    pub fn new(config: &RoundConfig) -> Self {
        Self {
            initial_balance: config.initial_balance,
            balance: config.initial_balance,
            bet: config.bet,
            winnings: 0,
            countdown: 0,
            countdown_max: config.spin_seconds,
            elapsed_ms: 0.0,
            input_allowed: false,
            is_spinning: false,
            round_started: false,
            round_ended: false,
            can_run: false,
        }
    }

    /// Mark the session started. Input unlocks on the reel's first idle step.
    pub fn begin(&mut self) {
        self.round_started = true;
    }

    /// Advance the countdown clock by one frame tick
    pub fn advance(&mut self, delta: FrameDelta) {
        if !self.round_started || self.round_ended {
            self.can_run = false;
            return;
        }
        self.can_run = true;

        if self.countdown > 0 {
            self.elapsed_ms += delta.sanitized().to_ms();
        } else {
            self.elapsed_ms = 0.0;
        }

        if self.elapsed_ms >= COUNTDOWN_STEP_MS && self.countdown > 0 {
            self.countdown -= 1;
            self.elapsed_ms -= COUNTDOWN_STEP_MS;
        }
    }

    /// Start a spin: load the countdown and deduct the bet.
    ///
    /// Leaves every field untouched when rejected.
    pub fn start_spin(&mut self) -> Result<(), SpinRejection> {
        if !self.can_run {
            return Err(SpinRejection::NotRunning);
        }
        if self.balance <= 0 {
            return Err(SpinRejection::InsufficientBalance);
        }
        if !self.input_allowed {
            return Err(SpinRejection::InputLocked);
        }

        self.countdown = self.countdown_max;
        self.is_spinning = true;
        self.balance = self.balance.saturating_sub(self.bet);
        Ok(())
    }

    /// Credit a payout
    pub fn credit(&mut self, amount: i64) {
        self.balance = self.balance.saturating_add(amount);
        self.winnings = self.winnings.saturating_add(amount);
    }

    /// Balance can no longer cover a spin
    pub fn is_exhausted(&self) -> bool {
        self.balance <= 0
    }

    /// Spinning with time left on the countdown
    pub fn is_in_motion(&self) -> bool {
        self.is_spinning && self.countdown > 0
    }

    /// Reinitialize for a new session. `round_started` is kept.
    pub fn reset(&mut self) {
        self.balance = self.initial_balance;
        self.winnings = 0;
        self.countdown = 0;
        self.elapsed_ms = 0.0;
        self.input_allowed = false;
        self.is_spinning = false;
        self.round_ended = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running() -> RoundState {
        let mut round = RoundState::new(&RoundConfig::default());
        round.begin();
        round.advance(FrameDelta::ONE);
        round.input_allowed = true;
        round
    }

    #[test]
    fn test_not_started_cannot_run() {
        let mut round = RoundState::new(&RoundConfig::default());
        round.advance(FrameDelta::ONE);
        assert!(!round.can_run);
        round.begin();
        round.advance(FrameDelta::ONE);
        assert!(round.can_run);
    }

    #[test]
    fn test_ended_round_freezes_clock() {
        let mut round = running();
        round.start_spin().unwrap();
        round.round_ended = true;
        for _ in 0..200 {
            round.advance(FrameDelta::ONE);
        }
        assert!(!round.can_run);
        assert_eq!(round.countdown, 2);
        assert_eq!(round.elapsed_ms, 0.0);
    }

    #[test]
    fn test_countdown_steps_once_per_second() {
        let mut round = running();
        round.start_spin().unwrap();
        assert_eq!(round.countdown, 2);

        for _ in 0..59 {
            round.advance(FrameDelta::ONE);
        }
        assert_eq!(round.countdown, 2);

        round.advance(FrameDelta::ONE);
        round.advance(FrameDelta::ONE);
        assert_eq!(round.countdown, 1);
    }

    #[test]
    fn test_variable_delta() {
        let mut round = running();
        round.start_spin().unwrap();
        // Two long frames: 1.5s worth of time, but only one step per tick
        round.advance(FrameDelta(90.0));
        assert_eq!(round.countdown, 1);
        assert!(round.elapsed_ms > 400.0);
        round.advance(FrameDelta(0.0));
        assert_eq!(round.countdown, 1);
    }

    #[test]
    fn test_elapsed_cleared_at_zero() {
        let mut round = running();
        round.elapsed_ms = 500.0;
        round.advance(FrameDelta::ONE);
        assert_eq!(round.elapsed_ms, 0.0);
    }

    #[test]
    fn test_start_spin_deducts_bet() {
        let mut round = running();
        round.start_spin().unwrap();
        assert!(round.is_spinning);
        assert!(round.is_in_motion());
        assert_eq!(round.balance, 99);
    }

    #[test]
    fn test_start_spin_gating_leaves_state() {
        let mut round = running();
        round.balance = 0;
        let before = round.clone();
        assert_eq!(round.start_spin(), Err(SpinRejection::InsufficientBalance));
        assert_eq!(round, before);

        let mut round = running();
        round.input_allowed = false;
        let before = round.clone();
        assert_eq!(round.start_spin(), Err(SpinRejection::InputLocked));
        assert_eq!(round, before);

        let mut round = RoundState::new(&RoundConfig::default());
        assert_eq!(round.start_spin(), Err(SpinRejection::NotRunning));
    }

    #[test]
    fn test_credit_saturates() {
        let mut round = running();
        round.credit(i64::MAX);
        round.credit(i64::MAX);
        assert_eq!(round.balance, i64::MAX);
        assert_eq!(round.winnings, i64::MAX);
    }

    #[test]
    fn test_reset() {
        let mut round = running();
        round.start_spin().unwrap();
        round.credit(5);
        round.round_ended = true;
        round.reset();
        assert_eq!(round.balance, 100);
        assert_eq!(round.winnings, 0);
        assert!(!round.is_spinning);
        assert!(!round.round_ended);
        assert!(round.round_started);
    }
}
