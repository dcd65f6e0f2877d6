//! # rk-reel — Reel simulation core for ReelKit
//!
//! A single rotating reel of symbol slots, driven once per render frame
//! through spin, deceleration, snap-stop and settle, then scored against a
//! stack of fixed windows.
//!
//! ## Features
//!
//! - **Round Driver**: balance, bet and a whole-second spin countdown
//! - **Reel Engine**: wrap-around cursor, decaying speed, quick stop, snap-settle
//! - **Win Evaluator**: window hit-testing and repeated-kind payout
//! - **Round Settlement**: credits, balance exhaustion, delayed reset
//! - **Schedulers**: real-time timer threads or a manually advanced clock
//!
//! ## Architecture
//!
//! ```text
//! SlotMachine::tick(delta)
//!     │
//!     ├── RoundState::advance   (countdown clock)
//!     ├── ReelEngine::step      (motion / settle)
//!     │       └── evaluate      (once per settle)
//!     └── settlement            (payout, idle check, reset task)
//!           │
//!           v
//!     SignalBus → Vec<SignalEvent>
//! ```

pub mod config;
pub mod evaluate;
pub mod machine;
pub mod reel;
pub mod round;
pub mod scheduler;
pub mod settlement;
pub mod stats;
pub mod symbols;
pub mod window;

pub use config::*;
pub use evaluate::*;
pub use machine::*;
pub use reel::*;
pub use round::*;
pub use scheduler::*;
pub use settlement::IdleOutcome;
pub use stats::*;
pub use symbols::*;
pub use window::*;
