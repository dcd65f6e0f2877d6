//! Slot machine configuration

use std::collections::HashSet;
use std::path::Path;

use rk_core::{RkError, RkResult};
use serde::{Deserialize, Serialize};

/// Upper bound on the starting balance. Payouts are at most
/// `bet * window_count` per spin, so credit math stays far from `i64::MAX`.
pub const MAX_CREDITS: i64 = 1_000_000_000_000;

/// Speed profile for the spin cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SpeedProfile {
    /// Reference gameplay timing
    #[default]
    Standard,
    /// Shorter spins and resets
    Turbo,
    /// Headless simulation (short reset delay)
    Studio,
    /// Hand-edited values
    Custom,
}

/// Round-level money and countdown settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoundConfig {
    /// Balance at session start and after each reset (before winnings)
    pub initial_balance: i64,
    /// Credits deducted per spin
    pub bet: i64,
    /// Countdown loaded on spin start, in whole seconds
    pub spin_seconds: u32,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            initial_balance: 100,
            bet: 1,
            spin_seconds: 2,
        }
    }
}

/// Reel motion parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReelConfig {
    /// Number of slots on the reel (wrap-around size)
    pub slot_count: usize,
    /// Speed restored whenever the reel is idle (px/tick)
    pub speed_max: f64,
    /// `speed = speed_scale * (timer * 0.5)`
    pub speed_scale: f64,
    /// Deceleration timer value at spin start
    pub timer_max: f64,
    /// Timer decay per tick while spinning
    pub timer_decay: f64,
    /// Slots laid out above the visible window
    pub lead_slots: u32,
    /// Extra slots the cursor jumps on quick stop
    pub quick_stop_slots: u32,
}

impl Default for ReelConfig {
    fn default() -> Self {
        Self {
            slot_count: 6,
            speed_max: 128.0,
            speed_scale: 64.0,
            timer_max: 2.0,
            timer_decay: 0.01,
            lead_slots: 3,
            quick_stop_slots: 3,
        }
    }
}

/// Pixel geometry supplied by the layout layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReelGeometry {
    /// Height of one slot in whole pixels
    pub slot_height: u32,
    /// Width of the reel strip
    pub slot_width: f64,
    /// Number of stacked hit-test windows
    pub window_count: usize,
}

impl ReelGeometry {
    /// Height covered by the window stack
    pub fn visible_height(&self) -> f64 {
        self.slot_height as f64 * self.window_count as f64
    }
}

impl Default for ReelGeometry {
    fn default() -> Self {
        Self {
            slot_height: 96,
            slot_width: 96.0,
            window_count: 3,
        }
    }
}

/// Balance exhaustion handling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettlementConfig {
    /// Real-time delay before an exhausted round is replenished
    pub reset_delay_ms: u64,
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            reset_delay_ms: 2500,
        }
    }
}

/// Complete machine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    pub profile: SpeedProfile,
    pub round: RoundConfig,
    pub reel: ReelConfig,
    pub geometry: ReelGeometry,
    pub settlement: SettlementConfig,
    /// Distinct symbol kinds the reel draws from
    pub palette: Vec<String>,
    /// Fixed RNG seed for reproducible sessions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

/// Six-symbol palette of the reference machine
pub fn default_palette() -> Vec<String> {
    ["SYM01", "SYM02", "SYM03", "SYM04", "SYM05", "SYM06"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl MachineConfig {
    /// Reference machine
    pub fn standard() -> Self {
        Self {
            profile: SpeedProfile::Standard,
            round: RoundConfig::default(),
            reel: ReelConfig::default(),
            geometry: ReelGeometry::default(),
            settlement: SettlementConfig::default(),
            palette: default_palette(),
            seed: None,
        }
    }

    /// One-second spins, faster reset
    pub fn turbo() -> Self {
        let mut config = Self::standard();
        config.profile = SpeedProfile::Turbo;
        config.round.spin_seconds = 1;
        config.reel.timer_max = 1.0;
        config.settlement.reset_delay_ms = 1000;
        config
    }

    /// Headless simulation: reference motion, near-instant reset
    pub fn studio() -> Self {
        let mut config = Self::standard();
        config.profile = SpeedProfile::Studio;
        config.settlement.reset_delay_ms = 50;
        config
    }

    /// Get config for profile
    pub fn from_profile(profile: SpeedProfile) -> Self {
        match profile {
            SpeedProfile::Standard => Self::standard(),
            SpeedProfile::Turbo => Self::turbo(),
            SpeedProfile::Studio => Self::studio(),
            SpeedProfile::Custom => Self {
                profile: SpeedProfile::Custom,
                ..Self::standard()
            },
        }
    }

    /// Builder: fixed seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builder: starting balance and bet
    pub fn with_stake(mut self, initial_balance: i64, bet: i64) -> Self {
        self.round.initial_balance = initial_balance;
        self.round.bet = bet;
        self
    }

    /// Check every value the engine divides by or indexes with
    pub fn validate(&self) -> RkResult<()> {
        if self.round.bet < 1 {
            return Err(RkError::config(format!("bet must be >= 1, got {}", self.round.bet)));
        }
        if self.round.initial_balance < 1 {
            return Err(RkError::config(format!(
                "initial_balance must be >= 1, got {}",
                self.round.initial_balance
            )));
        }
        if self.round.initial_balance > MAX_CREDITS {
            return Err(RkError::config(format!(
                "initial_balance must be <= {}, got {}",
                MAX_CREDITS, self.round.initial_balance
            )));
        }
        if self.round.bet > self.round.initial_balance {
            return Err(RkError::config(format!(
                "bet {} exceeds initial_balance {}",
                self.round.bet, self.round.initial_balance
            )));
        }
        if self.round.spin_seconds == 0 {
            return Err(RkError::config("spin_seconds must be >= 1"));
        }
        if self.reel.slot_count == 0 {
            return Err(RkError::config("reel needs at least one slot"));
        }
        if self.geometry.slot_height == 0 {
            return Err(RkError::config("slot_height must be >= 1 pixel"));
        }
        if !(self.geometry.slot_width > 0.0) {
            return Err(RkError::config("slot_width must be positive"));
        }
        if self.geometry.window_count == 0 {
            return Err(RkError::config("at least one window is required"));
        }
        if self.reel.slot_count < self.geometry.window_count {
            return Err(RkError::config(format!(
                "{} slots cannot fill {} windows",
                self.reel.slot_count, self.geometry.window_count
            )));
        }
        if !(self.reel.timer_decay.is_finite() && self.reel.timer_decay > 0.0) {
            return Err(RkError::config("timer_decay must be a positive number"));
        }
        if !(self.reel.timer_max.is_finite() && self.reel.timer_max >= 0.0) {
            return Err(RkError::config("timer_max must not be negative"));
        }
        if !(self.reel.speed_scale.is_finite() && self.reel.speed_scale >= 0.0) {
            return Err(RkError::config("speed_scale must not be negative"));
        }
        if self.palette.is_empty() {
            return Err(RkError::config("palette is empty"));
        }
        let mut seen = HashSet::new();
        for name in &self.palette {
            if !seen.insert(name.as_str()) {
                return Err(RkError::config(format!("duplicate palette symbol '{}'", name)));
            }
        }
        Ok(())
    }

    /// Export config as JSON
    pub fn to_json(&self) -> RkResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Import and validate config from JSON
    pub fn from_json(json: &str) -> RkResult<Self> {
        let config: MachineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> RkResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        log::debug!("Loaded machine config from {}", path.as_ref().display());
        Self::from_json(&text)
    }
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_validate() {
        for profile in [
            SpeedProfile::Standard,
            SpeedProfile::Turbo,
            SpeedProfile::Studio,
            SpeedProfile::Custom,
        ] {
            let config = MachineConfig::from_profile(profile);
            assert_eq!(config.profile, profile);
            config.validate().unwrap();
        }
    }

    #[test]
    fn test_turbo_is_faster() {
        let standard = MachineConfig::standard();
        let turbo = MachineConfig::turbo();
        assert!(turbo.round.spin_seconds < standard.round.spin_seconds);
        assert!(turbo.settlement.reset_delay_ms < standard.settlement.reset_delay_ms);
    }

    #[test]
    fn test_reference_values() {
        let config = MachineConfig::standard();
        assert_eq!(config.round.initial_balance, 100);
        assert_eq!(config.round.bet, 1);
        assert_eq!(config.round.spin_seconds, 2);
        assert_eq!(config.reel.slot_count, 6);
        assert_eq!(config.geometry.window_count, 3);
        assert_eq!(config.settlement.reset_delay_ms, 2500);
        assert_eq!(config.palette.len(), 6);
    }

    #[test]
    fn test_validate_rejects() {
        let mut config = MachineConfig::standard();
        config.round.bet = 0;
        assert!(config.validate().is_err());

        let mut config = MachineConfig::standard();
        config.geometry.slot_height = 0;
        assert!(config.validate().is_err());

        let mut config = MachineConfig::standard();
        config.palette.push("SYM01".into());
        assert!(config.validate().is_err());

        let mut config = MachineConfig::standard();
        config.reel.slot_count = 2;
        assert!(config.validate().is_err());

        let mut config = MachineConfig::standard();
        config.reel.timer_decay = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_stake_bounds() {
        assert!(MachineConfig::standard().with_stake(0, 1).validate().is_err());
        assert!(MachineConfig::standard().with_stake(-5, 1).validate().is_err());
        assert!(MachineConfig::standard().with_stake(10, 11).validate().is_err());
        assert!(
            MachineConfig::standard()
                .with_stake(MAX_CREDITS + 1, 1)
                .validate()
                .is_err()
        );
        MachineConfig::standard().with_stake(1, 1).validate().unwrap();
        MachineConfig::standard().with_stake(MAX_CREDITS, MAX_CREDITS).validate().unwrap();
    }

    #[test]
    fn test_huge_bet_json_is_rejected() {
        let json = r#"{"round":{"initial_balance":100,"bet":4611686018427387904}}"#;
        let err = MachineConfig::from_json(json).unwrap_err();
        assert!(matches!(err, RkError::InvalidConfig(_)));
    }

    #[test]
    fn test_json_roundtrip() {
        let config = MachineConfig::turbo().with_seed(7).with_stake(10, 2);
        let json = config.to_json().unwrap();
        let back = MachineConfig::from_json(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = MachineConfig::from_json(r#"{"round":{"bet":5}}"#).unwrap();
        assert_eq!(config.round.bet, 5);
        assert_eq!(config.round.initial_balance, 100);
        assert_eq!(config.geometry.slot_height, 96);
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_invalid_json_is_rejected() {
        assert!(MachineConfig::from_json(r#"{"round":{"bet":0}}"#).is_err());
        assert!(MachineConfig::from_json("{").is_err());
    }
}
