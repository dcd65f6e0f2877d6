//! Frame-relative time
//!
//! The render loop reports a delta in frames (1.0 = one frame at 60 fps),
//! not wall-clock milliseconds.

use serde::{Deserialize, Serialize};

/// Nominal frame rate the delta is expressed against
pub const FRAMES_PER_SECOND: f64 = 60.0;

/// Milliseconds covered by one nominal frame
pub const MS_PER_FRAME: f64 = 1000.0 / FRAMES_PER_SECOND;

/// Per-tick delta in frame units
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct FrameDelta(pub f64);

impl FrameDelta {
    /// Exactly one nominal frame
    pub const ONE: Self = Self(1.0);

    #[inline]
    pub fn from_ms(ms: f64) -> Self {
        Self(ms / MS_PER_FRAME)
    }

    #[inline]
    pub fn to_ms(self) -> f64 {
        self.0 * MS_PER_FRAME
    }

    /// Negative or non-finite deltas are treated as a stalled frame
    #[inline]
    pub fn sanitized(self) -> Self {
        if self.0.is_finite() && self.0 > 0.0 {
            self
        } else {
            Self(0.0)
        }
    }
}

impl From<f64> for FrameDelta {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

/// Monotonic frame counter used to stamp signals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FrameIndex(pub u64);

impl FrameIndex {
    pub const ZERO: Self = Self(0);

    #[inline]
    pub fn advance(&mut self) {
        self.0 += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_frame_delta_ms() {
        assert_relative_eq!(FrameDelta::ONE.to_ms(), 1000.0 / 60.0);
        assert_relative_eq!(FrameDelta::from_ms(1000.0).0, 60.0);
    }

    #[test]
    fn test_sanitized() {
        assert_eq!(FrameDelta(-2.0).sanitized(), FrameDelta(0.0));
        assert_eq!(FrameDelta(f64::NAN).sanitized(), FrameDelta(0.0));
        assert_eq!(FrameDelta(1.5).sanitized(), FrameDelta(1.5));
    }

    #[test]
    fn test_frame_index() {
        let mut idx = FrameIndex::ZERO;
        idx.advance();
        idx.advance();
        assert_eq!(idx, FrameIndex(2));
    }
}
