//! # rk-signal — ReelKit Presentation Signals
//!
//! Defines the notifications the reel core sends outward.
//! Presentation layers never read core state — only SIGNALS.
//!
//! ## Philosophy
//!
//! Every round passes through the same observable moments:
//! - Bet placed → Spin started → Reel stopped → Win paid → Round reset
//!
//! This crate defines those signals, a non-blocking fan-out bus, and a
//! trace recorder for simulation and tests.

pub mod bus;
pub mod event;
pub mod signal;
pub mod trace;

pub use bus::*;
pub use event::*;
pub use signal::*;
pub use trace::*;
