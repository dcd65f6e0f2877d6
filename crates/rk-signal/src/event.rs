//! SignalEvent — A signal stamped with the frame it was raised on

use rk_core::FrameIndex;
use serde::{Deserialize, Serialize};

use crate::signal::Signal;

/// A signal with frame metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalEvent {
    /// The signal
    pub signal: Signal,

    /// Frame index the signal was raised on
    pub frame: FrameIndex,

    /// Raised from the delayed reset task rather than from a frame tick
    #[serde(default)]
    pub deferred: bool,
}

impl SignalEvent {
    /// Create a new signal event raised inside a frame tick
    pub fn new(signal: Signal, frame: FrameIndex) -> Self {
        Self {
            signal,
            frame,
            deferred: false,
        }
    }

    /// Create an event raised by a scheduled task
    pub fn deferred(signal: Signal, frame: FrameIndex) -> Self {
        Self {
            signal,
            frame,
            deferred: true,
        }
    }

    /// Get signal type name
    pub fn type_name(&self) -> &'static str {
        self.signal.type_name()
    }
}
