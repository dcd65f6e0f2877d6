//! Session statistics

use serde::{Deserialize, Serialize};

/// Running totals for one machine session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub total_spins: u64,
    pub total_bet: i64,
    pub total_won: i64,
    pub wins: u64,
    pub losses: u64,
    pub jackpots: u64,
    pub quick_stops: u64,
    /// Delayed resets actually applied
    pub resets: u64,
    /// Settles where no slot met any window
    pub evaluation_faults: u64,
    pub max_multiplier: u32,
}

impl SessionStats {
    /// Calculate RTP
    pub fn rtp(&self) -> f64 {
        if self.total_bet > 0 {
            (self.total_won as f64 / self.total_bet as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Calculate hit rate
    pub fn hit_rate(&self) -> f64 {
        if self.total_spins > 0 {
            (self.wins as f64 / self.total_spins as f64) * 100.0
        } else {
            0.0
        }
    }

    pub(crate) fn record_spin(&mut self, bet: i64) {
        self.total_spins += 1;
        self.total_bet = self.total_bet.saturating_add(bet);
    }

    pub(crate) fn record_payout(&mut self, amount: i64, multiplier: u32, jackpot: bool) {
        if amount > 0 {
            self.wins += 1;
            self.total_won = self.total_won.saturating_add(amount);
        } else {
            self.losses += 1;
        }
        if jackpot {
            self.jackpots += 1;
        }
        self.max_multiplier = self.max_multiplier.max(multiplier);
    }
}
