//! rk-core: Shared types and utilities for ReelKit
//!
//! This crate provides the foundational types used across all ReelKit crates.

mod error;
mod geometry;
mod time;

pub use error::*;
pub use geometry::*;
pub use time::*;

/// Move `current` toward `target` by at most `step`, never overshooting.
#[inline]
pub fn approach(current: f64, target: f64, step: f64) -> f64 {
    if current < target {
        (current + step).min(target)
    } else {
        (current - step).max(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_approach_down() {
        assert_relative_eq!(approach(2.0, 0.0, 0.5), 1.5);
        assert_relative_eq!(approach(0.004, 0.0, 0.01), 0.0);
    }

    #[test]
    fn test_approach_up() {
        assert_relative_eq!(approach(0.0, 1.0, 0.25), 0.25);
        assert_relative_eq!(approach(0.95, 1.0, 0.25), 1.0);
    }

    #[test]
    fn test_approach_at_target() {
        assert_relative_eq!(approach(3.0, 3.0, 0.1), 3.0);
    }
}
