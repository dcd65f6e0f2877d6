//! SlotMachine — wires round, reel, evaluator and settlement per tick
//!
//! All mutable state sits behind one `parking_lot::Mutex` so the delayed
//! reset, which may fire on a timer thread, sees the same round the tick
//! loop does. Signals are collected under the lock and emitted after it is
//! released.

use std::sync::{Arc, Weak};
use std::time::Duration;

use crossbeam_channel::Receiver;
use parking_lot::Mutex;
use rk_core::{FrameDelta, FrameIndex, RkError, RkResult};
use rk_signal::{Signal, SignalBus, SignalEvent, SpinSource};
use serde::{Deserialize, Serialize};

use crate::config::MachineConfig;
use crate::reel::{ReelEngine, ReelPhase, ReelStep, Slot};
use crate::round::{RoundState, SpinRejection};
use crate::scheduler::{Scheduler, TaskHandle, ThreadScheduler};
use crate::settlement::{self, IdleOutcome};
use crate::stats::SessionStats;
use crate::symbols::SymbolKind;
use crate::window::WindowSet;

/// What a button press turned into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ButtonAction {
    Spin,
    QuickStop,
    Ignored(SpinRejection),
}

/// Read-only view for presentation and tooling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineSnapshot {
    pub frame: FrameIndex,
    pub balance: i64,
    pub bet: i64,
    pub winnings: i64,
    pub countdown: u32,
    pub input_allowed: bool,
    pub is_spinning: bool,
    pub round_ended: bool,
    pub can_run: bool,
    pub phase: ReelPhase,
    pub cursor: f64,
    pub slots: Vec<Slot>,
    pub reset_pending: bool,
}

/// Everything the tick loop and the reset task share
#[derive(Debug)]
struct MachineState {
    round: RoundState,
    reel: ReelEngine,
    windows: WindowSet,
    stats: SessionStats,
    pending_reset: Option<TaskHandle>,
    frame: FrameIndex,
    /// `can_run` as of the previous tick, for `GameStatus` edges
    last_can_run: bool,
}

impl MachineState {
    fn reset_pending(&self) -> bool {
        self.pending_reset.as_ref().is_some_and(TaskHandle::is_pending)
    }
}

/// The slot machine
pub struct SlotMachine<S: Scheduler = ThreadScheduler> {
    config: MachineConfig,
    state: Arc<Mutex<MachineState>>,
    bus: SignalBus,
    scheduler: S,
}

impl SlotMachine<ThreadScheduler> {
    /// Machine whose reset runs on a real timer thread
    pub fn realtime(config: MachineConfig) -> RkResult<Self> {
        Self::new(config, ThreadScheduler::new().with_name("rk-round-reset"))
    }
}

impl<S: Scheduler> SlotMachine<S> {
    /// Validate the config and start the session
    pub fn new(config: MachineConfig, scheduler: S) -> RkResult<Self> {
        config.validate()?;

        let mut round = RoundState::new(&config.round);
        round.begin();

        let state = MachineState {
            round,
            reel: ReelEngine::new(&config),
            windows: WindowSet::stacked(&config.geometry),
            stats: SessionStats::default(),
            pending_reset: None,
            frame: FrameIndex::ZERO,
            last_can_run: false,
        };

        log::info!(
            "Slot machine ready: {:?} profile, balance {}, bet {}",
            config.profile,
            config.round.initial_balance,
            config.round.bet
        );

        Ok(Self {
            config,
            state: Arc::new(Mutex::new(state)),
            bus: SignalBus::new(),
            scheduler,
        })
    }

    /// Builder: replace the stacked windows with a layout-supplied set.
    ///
    /// The set must be non-empty and no two windows may overlap.
    pub fn with_windows(self, windows: WindowSet) -> RkResult<Self> {
        if windows.is_empty() {
            return Err(RkError::config("window set is empty"));
        }
        if !windows.is_disjoint() {
            return Err(RkError::config("slot windows overlap"));
        }
        self.state.lock().windows = windows;
        Ok(self)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // ACCESSORS
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn bus(&self) -> &SignalBus {
        &self.bus
    }

    /// Receive every signal emitted from now on
    pub fn subscribe(&self) -> Receiver<SignalEvent> {
        self.bus.subscribe()
    }

    pub fn stats(&self) -> SessionStats {
        self.state.lock().stats.clone()
    }

    pub fn round(&self) -> RoundState {
        self.state.lock().round.clone()
    }

    pub fn frame(&self) -> FrameIndex {
        self.state.lock().frame
    }

    pub fn is_reset_pending(&self) -> bool {
        self.state.lock().reset_pending()
    }

    /// Handle of the last scheduled reset, if any
    pub fn reset_handle(&self) -> Option<TaskHandle> {
        self.state.lock().pending_reset.clone()
    }

    pub fn snapshot(&self) -> MachineSnapshot {
        let state = self.state.lock();
        MachineSnapshot {
            frame: state.frame,
            balance: state.round.balance,
            bet: state.round.bet,
            winnings: state.round.winnings,
            countdown: state.round.countdown,
            input_allowed: state.round.input_allowed,
            is_spinning: state.round.is_spinning,
            round_ended: state.round.round_ended,
            can_run: state.round.can_run,
            phase: state.reel.phase(),
            cursor: state.reel.cursor(),
            slots: state.reel.layout(),
            reset_pending: state.reset_pending(),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // INPUT
    // ═══════════════════════════════════════════════════════════════════════════

    /// Reseed the reel RNG
    pub fn seed(&self, seed: u64) {
        self.state.lock().reel.seed(seed);
    }

    /// Overwrite slot kinds in ring order (scripted outcomes)
    pub fn force_kinds(&self, kinds: &[SymbolKind]) {
        self.state.lock().reel.force_kinds(kinds);
    }

    /// Start a spin if the round allows it
    pub fn request_spin(&self, source: SpinSource) -> Result<(), SpinRejection> {
        let mut out = Vec::new();
        let (result, frame) = {
            let mut state = self.state.lock();
            (Self::spin_locked(&mut state, source, &mut out), state.frame)
        };
        self.emit_all(out, frame);
        result
    }

    /// Flag a quick stop. Returns `true` if the request was accepted.
    pub fn request_quick_stop(&self) -> bool {
        let mut out = Vec::new();
        let (accepted, frame) = {
            let mut state = self.state.lock();
            (Self::quick_stop_locked(&mut state, &mut out), state.frame)
        };
        self.emit_all(out, frame);
        accepted
    }

    /// Single-button routing: quick stop while the reel is moving, spin
    /// otherwise.
    pub fn press(&self) -> ButtonAction {
        let mut out = Vec::new();
        let (action, frame) = {
            let mut state = self.state.lock();
            let action = if state.round.can_run && state.round.is_in_motion() {
                Self::quick_stop_locked(&mut state, &mut out);
                ButtonAction::QuickStop
            } else {
                match Self::spin_locked(&mut state, SpinSource::Button, &mut out) {
                    Ok(()) => ButtonAction::Spin,
                    Err(reason) => ButtonAction::Ignored(reason),
                }
            };
            (action, state.frame)
        };
        self.emit_all(out, frame);
        action
    }

    fn spin_locked(
        state: &mut MachineState,
        source: SpinSource,
        out: &mut Vec<Signal>,
    ) -> Result<(), SpinRejection> {
        if let Err(reason) = state.round.start_spin() {
            log::trace!("Spin request ignored: {:?}", reason);
            return Err(reason);
        }

        let bet = state.round.bet;
        state.stats.record_spin(bet);

        out.push(Signal::SpinStarted { source });
        out.push(Signal::BetPlaced { amount: bet });
        out.push(Signal::BalanceChanged {
            balance: state.round.balance,
        });

        log::debug!(
            "Spin #{} started ({:?}), balance {}",
            state.stats.total_spins,
            source,
            state.round.balance
        );
        Ok(())
    }

    fn quick_stop_locked(state: &mut MachineState, out: &mut Vec<Signal>) -> bool {
        let MachineState { round, reel, stats, .. } = state;
        if !reel.request_quick_stop(round) {
            log::trace!("Quick stop ignored");
            return false;
        }
        stats.quick_stops += 1;
        out.push(Signal::QuickStopRequested);
        true
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // TICK
    // ═══════════════════════════════════════════════════════════════════════════

    /// Advance one frame: round clock, reel step, settlement, idle check.
    ///
    /// Returns the reel phase after the step, or `None` when the round is
    /// not running.
    pub fn tick(&self, delta: impl Into<FrameDelta>) -> Option<ReelPhase> {
        let delta = delta.into();
        let mut out = Vec::new();

        let (phase, frame, begin_reset) = {
            let mut guard = self.state.lock();
            guard.frame.advance();
            let frame = guard.frame;

            let MachineState {
                round,
                reel,
                windows,
                stats,
                pending_reset,
                last_can_run,
                ..
            } = &mut *guard;

            round.advance(delta);
            if round.can_run != *last_can_run {
                *last_can_run = round.can_run;
                out.push(Signal::GameStatus {
                    can_run: round.can_run,
                });
            }

            let step = reel.step(round, windows);
            let phase = step.phase();

            if let ReelStep::Settled {
                evaluation,
                quick_stop,
            } = step
            {
                out.push(Signal::SpinStopped { quick_stop });
                match evaluation {
                    Ok(evaluation) => {
                        let paid = settlement::apply_evaluation(round, &evaluation, &mut out);
                        stats.record_payout(
                            paid,
                            evaluation.result.multiplier,
                            paid > 0 && evaluation.is_jackpot(),
                        );
                    }
                    Err(e) => {
                        log::error!("Settle paid nothing: {}", e);
                        stats.evaluation_faults += 1;
                        stats.record_payout(0, 0, false);
                    }
                }
            }

            let mut begin_reset = false;
            if matches!(phase, Some(ReelPhase::Idle | ReelPhase::Evaluated)) {
                let pending = pending_reset.as_ref().is_some_and(TaskHandle::is_pending);
                begin_reset =
                    settlement::idle_check(round, pending, &mut out) == IdleOutcome::Exhausted;
            }

            (phase, frame, begin_reset)
        };

        if begin_reset {
            self.schedule_reset(frame);
        }
        self.emit_all(out, frame);
        phase
    }

    fn schedule_reset(&self, frame: FrameIndex) {
        let delay = Duration::from_millis(self.config.settlement.reset_delay_ms);
        let weak: Weak<Mutex<MachineState>> = Arc::downgrade(&self.state);
        let bus = self.bus.clone();

        let handle = self.scheduler.schedule(
            delay,
            Box::new(move || {
                let Some(state) = weak.upgrade() else {
                    log::debug!("Machine dropped before its reset fired");
                    return;
                };
                let mut out = Vec::new();
                let frame = {
                    let mut guard = state.lock();
                    let frame = guard.frame;
                    let MachineState {
                        round, reel, stats, ..
                    } = &mut *guard;
                    if settlement::apply_reset(round, reel, &mut out) {
                        stats.resets += 1;
                    }
                    frame
                };
                for signal in out {
                    bus.emit(SignalEvent::deferred(signal, frame));
                }
            }),
        );

        log::debug!("Round reset scheduled in {:?} (frame {})", delay, frame.0);
        self.state.lock().pending_reset = Some(handle);
    }

    /// Start over: cancel any pending reset, restore the round and clear
    /// stats. Input unlocks on the next idle tick.
    pub fn reset_session(&self) {
        let mut out = Vec::new();
        let frame = {
            let mut state = self.state.lock();
            if let Some(handle) = state.pending_reset.take() {
                if handle.cancel() {
                    log::debug!("Pending round reset cancelled");
                }
            }
            state.round.reset();
            state.reel.randomize_all();
            state.stats = SessionStats::default();

            out.push(Signal::RoundReset {
                balance: state.round.balance,
            });
            out.push(Signal::BalanceChanged {
                balance: state.round.balance,
            });
            out.push(Signal::WinningsChanged { winnings: 0 });
            state.frame
        };
        log::info!("Session reset");
        self.emit_all(out, frame);
    }

    fn emit_all(&self, signals: Vec<Signal>, frame: FrameIndex) {
        for signal in signals {
            self.bus.emit(SignalEvent::new(signal, frame));
        }
    }
}

impl<S: Scheduler> Drop for SlotMachine<S> {
    fn drop(&mut self) {
        if let Some(handle) = self.state.lock().pending_reset.take() {
            handle.cancel();
        }
    }
}

impl<S: Scheduler> std::fmt::Debug for SlotMachine<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlotMachine")
            .field("profile", &self.config.profile)
            .field("state", &*self.state.lock())
            .finish()
    }
}
