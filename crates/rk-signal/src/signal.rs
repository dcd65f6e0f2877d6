//! Signal — The notifications the reel core sends to presentation
//!
//! A Signal is NOT a render command. It is the meaning of a moment in the
//! round: a bet was placed, the reel stopped, a win landed. UI text, sound
//! and animation layers react to signals and never poll core state.

use serde::{Deserialize, Serialize};

/// Who asked for the spin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SpinSource {
    /// Player pressed the spin control
    #[default]
    Button,
    /// Simulator or autoplay loop
    Auto,
}

/// Presentation signal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Signal {
    // ═══════════════════════════════════════════════════════════════════════
    // SPIN LIFECYCLE
    // ═══════════════════════════════════════════════════════════════════════
    /// Spin accepted, countdown started
    SpinStarted {
        #[serde(default)]
        source: SpinSource,
    },

    /// Bet deducted from balance for this spin
    BetPlaced { amount: i64 },

    /// Quick stop accepted while the reel was spinning
    QuickStopRequested,

    /// Reel settled and was evaluated
    SpinStopped {
        /// The spin ended through quick stop
        quick_stop: bool,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // WIN LIFECYCLE
    // ═══════════════════════════════════════════════════════════════════════
    /// Payout for a settled spin (only sent when amount > 0)
    WinResult {
        amount: i64,
        multiplier: u32,
        /// Every window matched
        is_jackpot: bool,
    },

    /// Accumulated winnings paid out when the round resets
    TotalWin { amount: i64 },

    // ═══════════════════════════════════════════════════════════════════════
    // BALANCE / ROUND
    // ═══════════════════════════════════════════════════════════════════════
    BalanceChanged { balance: i64 },

    WinningsChanged { winnings: i64 },

    /// Balance exhausted, delayed reset scheduled
    RoundEnded { balance: i64 },

    /// Delayed reset applied
    RoundReset { balance: i64 },

    /// `can_run` flipped
    GameStatus { can_run: bool },
}

impl Signal {
    /// Get category
    pub fn category(&self) -> SignalCategory {
        match self {
            Signal::SpinStarted { .. }
            | Signal::BetPlaced { .. }
            | Signal::QuickStopRequested
            | Signal::SpinStopped { .. } => SignalCategory::Spin,

            Signal::WinResult { .. } | Signal::TotalWin { .. } => SignalCategory::Win,

            Signal::BalanceChanged { .. } | Signal::WinningsChanged { .. } => {
                SignalCategory::Balance
            }

            Signal::RoundEnded { .. } | Signal::RoundReset { .. } => SignalCategory::Round,

            Signal::GameStatus { .. } => SignalCategory::Status,
        }
    }

    /// Get type name as string (matches the serde tag)
    pub fn type_name(&self) -> &'static str {
        match self {
            Signal::SpinStarted { .. } => "spin_started",
            Signal::BetPlaced { .. } => "bet_placed",
            Signal::QuickStopRequested => "quick_stop_requested",
            Signal::SpinStopped { .. } => "spin_stopped",
            Signal::WinResult { .. } => "win_result",
            Signal::TotalWin { .. } => "total_win",
            Signal::BalanceChanged { .. } => "balance_changed",
            Signal::WinningsChanged { .. } => "winnings_changed",
            Signal::RoundEnded { .. } => "round_ended",
            Signal::RoundReset { .. } => "round_reset",
            Signal::GameStatus { .. } => "game_status",
        }
    }

    /// Does this signal carry a payout to celebrate?
    pub fn is_celebration(&self) -> bool {
        matches!(
            self,
            Signal::WinResult { amount, .. } | Signal::TotalWin { amount } if *amount > 0
        )
    }

    /// Is this the jackpot variant of a win
    pub fn is_jackpot(&self) -> bool {
        matches!(self, Signal::WinResult { is_jackpot: true, .. })
    }
}

/// Signal category for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalCategory {
    Spin,
    Win,
    Balance,
    Round,
    Status,
}
