//! Win Evaluator
//!
//! Hit-tests slot centers against the fixed windows and pays out for
//! repeated kinds among the visible symbols.

use rk_core::{RkError, RkResult};
use serde::{Deserialize, Serialize};

use crate::reel::ReelEngine;
use crate::symbols::SymbolKind;
use crate::window::WindowSet;

/// Payout for one settled spin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WinResult {
    pub amount: i64,
    /// Number of visible symbols that share a kind with another one
    pub multiplier: u32,
}

impl WinResult {
    pub const NONE: Self = Self {
        amount: 0,
        multiplier: 0,
    };

    pub fn is_win(&self) -> bool {
        self.amount > 0
    }
}

/// A slot whose center met a window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub slot: usize,
    pub window: usize,
    pub kind: SymbolKind,
}

/// Full evaluator output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    /// One entry per (slot, window) hit
    pub candidates: Vec<Candidate>,
    /// Candidates whose kind appears more than once
    pub matched: Vec<Candidate>,
    pub result: WinResult,
    pub window_count: usize,
}

impl Evaluation {
    /// Every window shows the same kind
    pub fn is_jackpot(&self) -> bool {
        self.window_count > 0 && self.result.multiplier as usize == self.window_count
    }
}

/// Collect the slots visible in each window
pub fn collect_candidates(reel: &ReelEngine, windows: &WindowSet) -> Vec<Candidate> {
    let mut candidates = Vec::with_capacity(windows.len());
    for (slot_index, slot) in reel.slots().iter().enumerate() {
        let Some(center) = reel.slot_center(slot_index) else {
            continue;
        };
        for window in windows.iter() {
            if window.contains(center) {
                candidates.push(Candidate {
                    slot: slot_index,
                    window: window.index,
                    kind: slot.kind,
                });
            }
        }
    }
    candidates
}

/// Pay `bet * count` where count is the number of candidates sharing a
/// kind with at least one other candidate.
pub fn score(candidates: &[Candidate], bet: i64) -> (Vec<Candidate>, WinResult) {
    let matched: Vec<Candidate> = candidates
        .iter()
        .filter(|c| candidates.iter().filter(|o| o.kind == c.kind).count() > 1)
        .copied()
        .collect();

    let count = matched.len();
    let result = WinResult {
        amount: bet.saturating_mul(i64::try_from(count).unwrap_or(i64::MAX)),
        multiplier: u32::try_from(count).unwrap_or(u32::MAX),
    };
    (matched, result)
}

/// Evaluate the settled reel.
///
/// An empty candidate set means the geometry is broken (no symbol reached
/// any window); that is reported instead of silently paying nothing.
pub fn evaluate(reel: &ReelEngine, windows: &WindowSet, bet: i64) -> RkResult<Evaluation> {
    let candidates = collect_candidates(reel, windows);
    if candidates.is_empty() {
        return Err(RkError::NoCandidates {
            slots: reel.slot_count(),
            windows: windows.len(),
        });
    }

    let (matched, result) = score(&candidates, bet);
    log::debug!(
        "Evaluated {} candidate(s): {} matched, paid {}",
        candidates.len(),
        matched.len(),
        result.amount
    );

    Ok(Evaluation {
        candidates,
        matched,
        result,
        window_count: windows.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MachineConfig;
    use rk_core::Rect;

    fn kinds(ids: &[u16]) -> Vec<Candidate> {
        ids.iter()
            .enumerate()
            .map(|(i, &k)| Candidate {
                slot: i,
                window: i,
                kind: SymbolKind(k),
            })
            .collect()
    }

    #[test]
    fn test_pair_pays_two() {
        let (matched, result) = score(&kinds(&[0, 0, 1]), 1);
        assert_eq!(matched.len(), 2);
        assert_eq!(result, WinResult { amount: 2, multiplier: 2 });
    }

    #[test]
    fn test_triple_pays_three() {
        let (_, result) = score(&kinds(&[4, 4, 4]), 1);
        assert_eq!(result, WinResult { amount: 3, multiplier: 3 });
    }

    #[test]
    fn test_all_distinct_pays_nothing() {
        let (matched, result) = score(&kinds(&[0, 1, 2]), 1);
        assert!(matched.is_empty());
        assert_eq!(result, WinResult::NONE);
        assert!(!result.is_win());
    }

    #[test]
    fn test_bet_scales_amount() {
        let (_, result) = score(&kinds(&[3, 1, 3]), 5);
        assert_eq!(result.amount, 10);
        assert_eq!(result.multiplier, 2);
    }

    #[test]
    fn test_payout_saturates() {
        let (_, result) = score(&kinds(&[1, 1, 1]), i64::MAX / 2);
        assert_eq!(result.amount, i64::MAX);
        assert_eq!(result.multiplier, 3);
    }

    #[test]
    fn test_evaluate_settled_reel() {
        let config = MachineConfig::standard();
        let mut reel = ReelEngine::new(&config);
        let windows = WindowSet::stacked(&config.geometry);

        // Cursor 0: slots 3, 4, 5 sit behind windows 0, 1, 2
        reel.force_kinds(&[
            SymbolKind(0),
            SymbolKind(1),
            SymbolKind(2),
            SymbolKind(5),
            SymbolKind(5),
            SymbolKind(5),
        ]);
        let evaluation = evaluate(&reel, &windows, 1).unwrap();
        assert_eq!(evaluation.candidates.len(), 3);
        let slots: Vec<_> = evaluation.candidates.iter().map(|c| c.slot).collect();
        assert_eq!(slots, vec![3, 4, 5]);
        assert_eq!(evaluation.result, WinResult { amount: 3, multiplier: 3 });
        assert!(evaluation.is_jackpot());
        assert!(evaluation.candidates.iter().all(|c| c.kind == SymbolKind(5)));
    }

    #[test]
    fn test_pair_is_not_jackpot() {
        let config = MachineConfig::standard();
        let mut reel = ReelEngine::new(&config);
        let windows = WindowSet::stacked(&config.geometry);
        reel.force_kinds(&[
            SymbolKind(0),
            SymbolKind(1),
            SymbolKind(2),
            SymbolKind(5),
            SymbolKind(1),
            SymbolKind(5),
        ]);
        let evaluation = evaluate(&reel, &windows, 1).unwrap();
        assert_eq!(evaluation.result.multiplier, 2);
        assert!(!evaluation.is_jackpot());
    }

    #[test]
    fn test_no_candidates_is_error() {
        let config = MachineConfig::standard();
        let reel = ReelEngine::new(&config);
        // Windows far below the reel strip
        let windows = WindowSet::from_rects([Rect::new(0.0, 5000.0, 96.0, 96.0)]);
        let err = evaluate(&reel, &windows, 1).unwrap_err();
        assert!(err.is_geometry_fault());
    }
}
