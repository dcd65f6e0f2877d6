//! Round Settlement — payouts, balance exhaustion and the delayed reset
//!
//! Settlement never talks to the bus directly. Each step pushes the signals
//! it raised into an outbox the caller stamps and emits.

use rk_signal::Signal;

use crate::evaluate::Evaluation;
use crate::reel::ReelEngine;
use crate::round::RoundState;

/// Result of the idle check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleOutcome {
    /// Input enabled
    Ready,
    /// Balance exhausted this tick; the caller must schedule the reset
    Exhausted,
    /// Reset already pending, nothing to do
    AwaitingReset,
}

/// Credit a settled spin.
///
/// Returns the payout applied (0 for a losing spin).
pub fn apply_evaluation(
    round: &mut RoundState,
    evaluation: &Evaluation,
    out: &mut Vec<Signal>,
) -> i64 {
    let result = evaluation.result;
    if !result.is_win() {
        return 0;
    }

    round.credit(result.amount);

    out.push(Signal::WinResult {
        amount: result.amount,
        multiplier: result.multiplier,
        is_jackpot: evaluation.is_jackpot(),
    });
    out.push(Signal::BalanceChanged {
        balance: round.balance,
    });
    out.push(Signal::WinningsChanged {
        winnings: round.winnings,
    });

    log::debug!(
        "Paid {} (x{}), balance now {}",
        result.amount,
        result.multiplier,
        round.balance
    );
    result.amount
}

/// Runs whenever the reel is idle: either unlock input or end the round.
pub fn idle_check(
    round: &mut RoundState,
    reset_pending: bool,
    out: &mut Vec<Signal>,
) -> IdleOutcome {
    if round.is_exhausted() {
        if round.round_ended || reset_pending {
            return IdleOutcome::AwaitingReset;
        }
        round.round_ended = true;
        round.input_allowed = false;
        out.push(Signal::RoundEnded {
            balance: round.balance,
        });
        log::info!(
            "Balance exhausted ({}), round ended with {} won",
            round.balance,
            round.winnings
        );
        return IdleOutcome::Exhausted;
    }

    round.input_allowed = true;
    round.round_ended = false;
    IdleOutcome::Ready
}

/// The delayed reset body. A no-op unless the round is still ended.
///
/// Returns `true` when the reset was applied.
pub fn apply_reset(round: &mut RoundState, reel: &mut ReelEngine, out: &mut Vec<Signal>) -> bool {
    if !round.round_ended {
        log::debug!("Reset fired after the round was already restored; ignoring");
        return false;
    }

    if round.winnings > 0 {
        out.push(Signal::TotalWin {
            amount: round.winnings,
        });
    }

    round.balance = round.initial_balance.saturating_add(round.winnings);
    round.winnings = 0;
    round.round_ended = false;
    round.input_allowed = true;

    reel.randomize_all();

    out.push(Signal::RoundReset {
        balance: round.balance,
    });
    out.push(Signal::BalanceChanged {
        balance: round.balance,
    });
    out.push(Signal::WinningsChanged { winnings: 0 });

    log::info!("Round reset, balance restored to {}", round.balance);
    true
}
