//! Reel Engine — spin / quick-stop / settle state machine
//!
//! The reel is a fixed ring of N slot records. A floating cursor in
//! `[0, N)` drives every slot's vertical offset; while spinning the cursor
//! advances with a decaying speed and symbol kinds are re-drawn to blur the
//! strip. Once the countdown runs out the slots are nudged up into whole
//! slot positions and the Win Evaluator runs exactly once.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rk_core::{Point, RkResult, approach};
use serde::{Deserialize, Serialize};

use crate::config::MachineConfig;
use crate::evaluate::{Evaluation, evaluate};
use crate::round::RoundState;
use crate::symbols::{SymbolKind, SymbolPalette};
use crate::window::WindowSet;

/// One slot on the reel ring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub kind: SymbolKind,
    /// Top edge in reel-local pixels
    pub offset: i64,
}

/// Reel state-machine phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReelPhase {
    #[default]
    Idle,
    Spinning,
    QuickStopping,
    /// Countdown over, slots snapping into place
    Settling,
    /// Aligned and evaluated this tick
    Evaluated,
}

/// What a single engine step did
#[derive(Debug)]
pub enum ReelStep {
    /// Round not running or no slot geometry yet
    Halted,
    Spinning,
    /// Quick stop applied this tick
    QuickStopped,
    /// Still snapping into place
    Settling,
    /// All slots aligned; the evaluator ran
    Settled {
        evaluation: RkResult<Evaluation>,
        /// This spin ended through quick stop
        quick_stop: bool,
    },
    Idle,
}

impl ReelStep {
    pub fn phase(&self) -> Option<ReelPhase> {
        match self {
            ReelStep::Halted => None,
            ReelStep::Spinning => Some(ReelPhase::Spinning),
            ReelStep::QuickStopped => Some(ReelPhase::QuickStopping),
            ReelStep::Settling => Some(ReelPhase::Settling),
            ReelStep::Settled { .. } => Some(ReelPhase::Evaluated),
            ReelStep::Idle => Some(ReelPhase::Idle),
        }
    }
}

/// Wrap a cursor value into `[0, n)`
#[inline]
pub fn wrap_position(value: f64, slot_count: usize) -> f64 {
    if slot_count == 0 || !value.is_finite() {
        return 0.0;
    }
    let n = slot_count as f64;
    let wrapped = value.rem_euclid(n);
    // rem_euclid can round up to n for tiny negative inputs
    if wrapped >= n { 0.0 } else { wrapped }
}

/// Vertical offset of slot `index` for a given cursor.
///
/// Equals `floor(((cursor + index) mod N) * h - h * lead)`. The floor is
/// taken once on the cursor so every slot shares the same sub-slot
/// remainder. Slots are laid out `lead_slots` heights above the window
/// stack so incoming symbols enter from above.
#[inline]
pub fn slot_offset(
    cursor: f64,
    index: usize,
    slot_height: u32,
    slot_count: usize,
    lead_slots: u32,
) -> i64 {
    let h = slot_height as i64;
    let span = h * slot_count as i64;
    if span == 0 {
        return 0;
    }
    let base = (wrap_position(cursor, slot_count) * slot_height as f64).floor() as i64;
    (base + index as i64 * h).rem_euclid(span) - h * lead_slots as i64
}

/// The rotating reel
#[derive(Debug, Clone)]
pub struct ReelEngine {
    slots: Vec<Slot>,
    palette: SymbolPalette,
    slot_height: u32,
    slot_width: f64,
    lead_slots: u32,
    quick_stop_slots: u32,
    cursor: f64,
    speed: f64,
    speed_max: f64,
    speed_scale: f64,
    timer: f64,
    timer_max: f64,
    timer_decay: f64,
    quick_stop: bool,
    /// Quick stop fired during the current spin
    stopped_early: bool,
    randomize_counter: usize,
    phase: ReelPhase,
    evaluations: u64,
    rng: ChaCha8Rng,
}

impl ReelEngine {
    /// Build the reel from a validated config. Slots start in palette order.
    pub fn new(config: &MachineConfig) -> Self {
        let palette = SymbolPalette::new(config.palette.clone());
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_rng(&mut rand::rng()),
        };

        let slot_count = config.reel.slot_count;
        let palette_len = palette.len().max(1);
        let slots = (0..slot_count)
            .map(|i| Slot {
                kind: SymbolKind((i % palette_len) as u16),
                offset: 0,
            })
            .collect();

        let mut reel = Self {
            slots,
            palette,
            slot_height: config.geometry.slot_height,
            slot_width: config.geometry.slot_width,
            lead_slots: config.reel.lead_slots,
            quick_stop_slots: config.reel.quick_stop_slots,
            cursor: 0.0,
            speed: config.reel.speed_max,
            speed_max: config.reel.speed_max,
            speed_scale: config.reel.speed_scale,
            timer: config.reel.timer_max,
            timer_max: config.reel.timer_max,
            timer_decay: config.reel.timer_decay,
            quick_stop: false,
            stopped_early: false,
            randomize_counter: 0,
            phase: ReelPhase::Idle,
            evaluations: 0,
            rng,
        };
        reel.layout_slots();
        reel
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // ACCESSORS
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Owned snapshot of every slot's kind and offset, in ring order
    pub fn layout(&self) -> Vec<Slot> {
        self.slots.clone()
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn palette(&self) -> &SymbolPalette {
        &self.palette
    }

    pub fn slot_height(&self) -> u32 {
        self.slot_height
    }

    pub fn slot_width(&self) -> f64 {
        self.slot_width
    }

    /// Rotational cursor in `[0, N)`
    pub fn cursor(&self) -> f64 {
        self.cursor
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn timer(&self) -> f64 {
        self.timer
    }

    pub fn phase(&self) -> ReelPhase {
        self.phase
    }

    pub fn is_quick_stop(&self) -> bool {
        self.quick_stop
    }

    pub fn randomize_counter(&self) -> usize {
        self.randomize_counter
    }

    /// Total evaluator runs since construction
    pub fn evaluations(&self) -> u64 {
        self.evaluations
    }

    /// Geometric center of a slot in reel-local space
    pub fn slot_center(&self, index: usize) -> Option<Point> {
        let slot = self.slots.get(index)?;
        let h = self.slot_height as f64;
        Some(Point::new(self.slot_width / 2.0, slot.offset as f64 + h / 2.0))
    }

    /// Every slot sits on a whole-slot boundary
    pub fn is_aligned(&self) -> bool {
        let h = self.slot_height as i64;
        h > 0 && self.slots.iter().all(|s| s.offset.rem_euclid(h) == 0)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // CONTROL
    // ═══════════════════════════════════════════════════════════════════════════

    /// Reseed the symbol RNG
    pub fn seed(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }

    /// Flag a quick stop. Only honoured while the reel is in motion.
    ///
    /// Returns `true` the first time the flag is raised for this spin.
    pub fn request_quick_stop(&mut self, round: &RoundState) -> bool {
        if !round.can_run || !round.is_in_motion() {
            return false;
        }
        let first = !self.quick_stop;
        self.quick_stop = true;
        first
    }

    /// Re-draw every slot's kind from the palette
    pub fn randomize_all(&mut self) {
        for slot in &mut self.slots {
            slot.kind = self.palette.pick(&mut self.rng);
        }
    }

    /// Overwrite slot kinds in ring order (scripted outcomes).
    /// Extra kinds are ignored; missing ones leave slots unchanged.
    pub fn force_kinds(&mut self, kinds: &[SymbolKind]) {
        for (slot, &kind) in self.slots.iter_mut().zip(kinds) {
            slot.kind = kind;
        }
    }

    /// Recompute every offset from the cursor
    fn layout_slots(&mut self) {
        let n = self.slots.len();
        for (i, slot) in self.slots.iter_mut().enumerate() {
            slot.offset = slot_offset(self.cursor, i, self.slot_height, n, self.lead_slots);
        }
    }

    /// Nudge each misaligned slot up by one pixel
    fn snap_step(&mut self) {
        let h = self.slot_height as i64;
        for slot in &mut self.slots {
            if slot.offset.rem_euclid(h) != 0 {
                slot.offset -= 1;
            }
        }
    }

    /// Move the cursor onto the aligned layout so offsets follow it again
    fn sync_cursor_to_slots(&mut self) {
        if let Some(first) = self.slots.first() {
            let h = self.slot_height as i64;
            let whole = (first.offset + h * self.lead_slots as i64) / h;
            self.cursor = wrap_position(whole as f64, self.slots.len());
            self.layout_slots();
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // STEP
    // ═══════════════════════════════════════════════════════════════════════════

    /// Advance the reel by one frame tick
    pub fn step(&mut self, round: &mut RoundState, windows: &WindowSet) -> ReelStep {
        if !round.can_run {
            return ReelStep::Halted;
        }
        if self.slots.is_empty() || self.slot_height == 0 {
            return ReelStep::Halted;
        }

        if round.is_in_motion() {
            return self.step_motion(round);
        }

        let mut outcome = ReelStep::Idle;

        if round.is_spinning {
            self.quick_stop = false;
            self.snap_step();

            if self.is_aligned() {
                let evaluation = evaluate(self, windows, round.bet);
                self.evaluations += 1;
                self.sync_cursor_to_slots();
                round.is_spinning = false;
                self.phase = ReelPhase::Evaluated;

                log::debug!(
                    "Reel settled at cursor {:.0} after {} evaluation(s)",
                    self.cursor,
                    self.evaluations
                );

                outcome = ReelStep::Settled {
                    evaluation,
                    quick_stop: std::mem::take(&mut self.stopped_early),
                };
            } else {
                self.phase = ReelPhase::Settling;
                outcome = ReelStep::Settling;
            }
        }

        if !round.is_spinning {
            self.speed = self.speed_max;
            if matches!(outcome, ReelStep::Idle) {
                self.phase = ReelPhase::Idle;
            }
        }

        self.timer = self.timer_max;
        outcome
    }

    fn step_motion(&mut self, round: &mut RoundState) -> ReelStep {
        let n = self.slots.len();
        let h = self.slot_height as f64;

        round.input_allowed = false;

        self.timer = approach(self.timer, 0.0, self.timer_decay);
        self.speed = self.speed_scale * (self.timer * 0.5);
        self.cursor = wrap_position(self.cursor + self.speed / h, n);

        if self.quick_stop {
            // Push the visible symbols fully out of the windows
            self.cursor = wrap_position(self.cursor + self.quick_stop_slots as f64, n);
            round.countdown = 0;
            self.layout_slots();
            self.stopped_early = true;
            self.phase = ReelPhase::QuickStopping;
            log::debug!("Quick stop applied at cursor {:.3}", self.cursor);
            return ReelStep::QuickStopped;
        }

        self.layout_slots();

        if self.randomize_counter >= n - 1 {
            self.randomize_counter = 0;
            if round.countdown > 1 {
                self.randomize_all();
            }
        }
        self.randomize_counter += 1;

        self.phase = ReelPhase::Spinning;
        ReelStep::Spinning
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MachineConfig;
    use approx::assert_relative_eq;
    use rk_core::FrameDelta;

    fn setup() -> (ReelEngine, RoundState, WindowSet) {
        let config = MachineConfig::standard().with_seed(1);
        let reel = ReelEngine::new(&config);
        let mut round = RoundState::new(&config.round);
        round.begin();
        round.advance(FrameDelta::ONE);
        let windows = WindowSet::stacked(&config.geometry);
        (reel, round, windows)
    }

    fn tick(reel: &mut ReelEngine, round: &mut RoundState, windows: &WindowSet) -> ReelStep {
        round.advance(FrameDelta::ONE);
        reel.step(round, windows)
    }

    #[test]
    fn test_offset_formula() {
        // cursor 0: slot i sits at (i - 3) * h
        assert_eq!(slot_offset(0.0, 0, 96, 6, 3), -288);
        assert_eq!(slot_offset(0.0, 3, 96, 6, 3), 0);
        assert_eq!(slot_offset(0.0, 5, 96, 6, 3), 192);
        // wraps past the end of the ring
        assert_eq!(slot_offset(1.5, 5, 96, 6, 3), slot_offset(0.5, 0, 96, 6, 3));
        // floor, not round
        assert_eq!(slot_offset(0.001, 3, 96, 6, 3), 0);
        assert_eq!(slot_offset(0.999, 3, 96, 6, 3), 95);
    }

    #[test]
    fn test_offset_is_pure() {
        for i in 0..6 {
            let a = slot_offset(4.37, i, 96, 6, 3);
            let b = slot_offset(4.37, i, 96, 6, 3);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_wrap_position() {
        assert_relative_eq!(wrap_position(6.5, 6), 0.5);
        assert_relative_eq!(wrap_position(-0.5, 6), 5.5);
        assert_eq!(wrap_position(-1e-18, 6), 0.0);
        assert_eq!(wrap_position(f64::INFINITY, 6), 0.0);
        assert_eq!(wrap_position(3.0, 0), 0.0);
    }

    #[test]
    fn test_initial_layout_aligned() {
        let (reel, _, _) = setup();
        assert!(reel.is_aligned());
        assert_eq!(reel.phase(), ReelPhase::Idle);
        let kinds: Vec<_> = reel.slots().iter().map(|s| s.kind.0).collect();
        assert_eq!(kinds, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_halted_when_not_running() {
        let config = MachineConfig::standard();
        let mut reel = ReelEngine::new(&config);
        let mut round = RoundState::new(&config.round);
        let windows = WindowSet::stacked(&config.geometry);
        assert!(matches!(reel.step(&mut round, &windows), ReelStep::Halted));
    }

    #[test]
    fn test_idle_step_restores_speed_and_timer() {
        let (mut reel, mut round, windows) = setup();
        let step = tick(&mut reel, &mut round, &windows);
        assert!(matches!(step, ReelStep::Idle));
        assert_relative_eq!(reel.speed(), 128.0);
        assert_relative_eq!(reel.timer(), 2.0);
    }

    #[test]
    fn test_spin_decelerates_and_locks_input() {
        let (mut reel, mut round, windows) = setup();
        round.input_allowed = true;
        round.start_spin().unwrap();

        let step = tick(&mut reel, &mut round, &windows);
        assert!(matches!(step, ReelStep::Spinning));
        assert!(!round.input_allowed);
        assert_relative_eq!(reel.timer(), 1.99, epsilon = 1e-12);
        assert_relative_eq!(reel.speed(), 63.68, epsilon = 1e-9);
        assert_relative_eq!(reel.cursor(), 63.68 / 96.0, epsilon = 1e-9);

        let first_speed = reel.speed();
        tick(&mut reel, &mut round, &windows);
        assert!(reel.speed() < first_speed);
    }

    #[test]
    fn test_cursor_stays_wrapped_under_noisy_deltas() {
        let (mut reel, mut round, windows) = setup();
        round.input_allowed = true;
        round.start_spin().unwrap();

        let deltas = [1.0, 0.3, 2.7, 0.0, 5.0, -1.0, 1.0, 13.0];
        for i in 0..400 {
            round.advance(FrameDelta(deltas[i % deltas.len()]));
            reel.step(&mut round, &windows);
            assert!(reel.cursor() >= 0.0 && reel.cursor() < 6.0);
            assert!(reel.randomize_counter() < 6);
        }
    }

    #[test]
    fn test_quick_stop_jumps_three_slots() {
        let (mut reel, mut round, windows) = setup();
        round.input_allowed = true;
        round.start_spin().unwrap();
        tick(&mut reel, &mut round, &windows);
        tick(&mut reel, &mut round, &windows);

        let before = reel.cursor();
        assert!(reel.request_quick_stop(&round));

        round.advance(FrameDelta::ONE);
        let expected_speed = 64.0 * (approach(reel.timer(), 0.0, 0.01) * 0.5);
        let step = reel.step(&mut round, &windows);

        assert!(matches!(step, ReelStep::QuickStopped));
        assert_eq!(round.countdown, 0);
        assert!(reel.is_quick_stop());
        let expected = wrap_position(before + expected_speed / 96.0 + 3.0, 6);
        assert_relative_eq!(reel.cursor(), expected, epsilon = 1e-9);
    }

    #[test]
    fn test_quick_stop_idempotent() {
        let run = |requests: usize| {
            let (mut reel, mut round, windows) = setup();
            round.input_allowed = true;
            round.start_spin().unwrap();
            tick(&mut reel, &mut round, &windows);
            for _ in 0..requests {
                reel.request_quick_stop(&round);
            }
            tick(&mut reel, &mut round, &windows);
            // Requests after the stop landed are ignored
            for _ in 0..requests {
                assert!(!reel.request_quick_stop(&round));
            }
            (reel.cursor(), round.countdown)
        };

        let once = run(1);
        let many = run(5);
        assert_relative_eq!(once.0, many.0);
        assert_eq!(once.1, 0);
        assert_eq!(many.1, 0);
    }

    #[test]
    fn test_quick_stop_rejected_when_idle() {
        let (mut reel, round, _) = setup();
        assert!(!reel.request_quick_stop(&round));
        assert!(!reel.is_quick_stop());
    }

    #[test]
    fn test_settles_once_and_aligns() {
        let (mut reel, mut round, windows) = setup();
        round.input_allowed = true;
        round.start_spin().unwrap();

        let mut settled = 0;
        for _ in 0..600 {
            if let ReelStep::Settled {
                evaluation,
                quick_stop,
            } = tick(&mut reel, &mut round, &windows)
            {
                settled += 1;
                assert!(!quick_stop);
                assert!(evaluation.is_ok());
            }
        }
        assert_eq!(settled, 1);
        assert_eq!(reel.evaluations(), 1);
        assert!(!round.is_spinning);
        assert!(reel.is_aligned());
        // Cursor is a whole slot again and drives the offsets
        assert_relative_eq!(reel.cursor(), reel.cursor().round());
        for (i, slot) in reel.slots().iter().enumerate() {
            assert_eq!(slot.offset, slot_offset(reel.cursor(), i, 96, 6, 3));
        }
    }

    #[test]
    fn test_settle_reports_quick_stop() {
        let (mut reel, mut round, windows) = setup();
        round.input_allowed = true;
        round.start_spin().unwrap();
        tick(&mut reel, &mut round, &windows);
        reel.request_quick_stop(&round);

        let mut saw = None;
        for _ in 0..200 {
            if let ReelStep::Settled { quick_stop, .. } = tick(&mut reel, &mut round, &windows) {
                saw = Some(quick_stop);
            }
        }
        assert_eq!(saw, Some(true));
        assert!(!reel.is_quick_stop());
    }

    #[test]
    fn test_randomize_is_seeded() {
        let config = MachineConfig::standard().with_seed(77);
        let mut a = ReelEngine::new(&config);
        let mut b = ReelEngine::new(&config);
        a.randomize_all();
        b.randomize_all();
        assert_eq!(a.slots(), b.slots());
    }

    #[test]
    fn test_force_kinds() {
        let (mut reel, _, _) = setup();
        reel.force_kinds(&[SymbolKind(2); 3]);
        let kinds: Vec<_> = reel.slots().iter().map(|s| s.kind.0).collect();
        assert_eq!(kinds, vec![2, 2, 2, 3, 4, 5]);
    }
}
