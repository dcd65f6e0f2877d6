//! SignalTrace — A recorded sequence of signal events for a session

use chrono::{DateTime, Utc};
use crossbeam_channel::Receiver;
use serde::{Deserialize, Serialize};

use crate::event::SignalEvent;
use crate::signal::{Signal, SignalCategory};

/// A recorded run of signal events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalTrace {
    /// Identifier for this trace
    pub trace_id: String,

    /// All events in the order they were received
    pub events: Vec<SignalEvent>,

    /// When recording started
    pub recorded_at: DateTime<Utc>,

    /// Custom metadata
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl SignalTrace {
    /// Create a new empty trace
    pub fn new(trace_id: impl Into<String>) -> Self {
        Self {
            trace_id: trace_id.into(),
            events: Vec::new(),
            recorded_at: Utc::now(),
            metadata: serde_json::Map::new(),
        }
    }

    /// Add an event to the trace
    pub fn push(&mut self, event: SignalEvent) {
        self.events.push(event);
    }

    /// Drain everything currently queued on `rx` without blocking.
    /// Returns the number of events collected.
    pub fn collect_from(&mut self, rx: &Receiver<SignalEvent>) -> usize {
        let before = self.events.len();
        self.events.extend(rx.try_iter());
        self.events.len() - before
    }

    /// Add metadata
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Get events by category
    pub fn events_by_category(&self, category: SignalCategory) -> Vec<&SignalEvent> {
        self.events
            .iter()
            .filter(|e| e.signal.category() == category)
            .collect()
    }

    /// Get events by signal type name
    pub fn events_by_type(&self, type_name: &str) -> Vec<&SignalEvent> {
        self.events
            .iter()
            .filter(|e| e.type_name() == type_name)
            .collect()
    }

    /// Count events of a signal type
    pub fn count(&self, type_name: &str) -> usize {
        self.events.iter().filter(|e| e.type_name() == type_name).count()
    }

    /// Check if trace contains a specific signal type
    pub fn has_signal(&self, type_name: &str) -> bool {
        self.events.iter().any(|e| e.type_name() == type_name)
    }

    /// Sum of all per-spin payouts
    pub fn total_paid(&self) -> i64 {
        self.events
            .iter()
            .filter_map(|e| match e.signal {
                Signal::WinResult { amount, .. } => Some(amount),
                _ => None,
            })
            .sum()
    }

    /// Number of jackpot wins
    pub fn jackpots(&self) -> usize {
        self.events.iter().filter(|e| e.signal.is_jackpot()).count()
    }

    /// Most recent balance reported by any balance-carrying signal
    pub fn last_balance(&self) -> Option<i64> {
        self.events.iter().rev().find_map(|e| match e.signal {
            Signal::BalanceChanged { balance }
            | Signal::RoundEnded { balance }
            | Signal::RoundReset { balance } => Some(balance),
            _ => None,
        })
    }

    /// Export as pretty JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
