//! One-shot delayed tasks
//!
//! The round reset is the only asynchronous work in the machine. It is
//! modelled as a task handed to a [`Scheduler`], with a [`TaskHandle`] the
//! caller can query or cancel.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

/// Boxed task body
pub type Task = Box<dyn FnOnce() + Send + 'static>;

const PENDING: u8 = 0;
const FIRED: u8 = 1;
const CANCELLED: u8 = 2;

/// Shared view of a scheduled task's lifecycle
#[derive(Debug, Clone)]
pub struct TaskHandle {
    state: Arc<AtomicU8>,
}

impl TaskHandle {
    fn new() -> Self {
        Self {
            state: Arc::new(AtomicU8::new(PENDING)),
        }
    }

    /// Cancel if it has not run yet. Returns `true` if this call cancelled it.
    pub fn cancel(&self) -> bool {
        self.state
            .compare_exchange(PENDING, CANCELLED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn is_pending(&self) -> bool {
        self.state.load(Ordering::Acquire) == PENDING
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.load(Ordering::Acquire) == CANCELLED
    }

    pub fn has_fired(&self) -> bool {
        self.state.load(Ordering::Acquire) == FIRED
    }

    /// Move Pending → Fired. Whoever wins this runs the task.
    fn claim(&self) -> bool {
        self.state
            .compare_exchange(PENDING, FIRED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

/// Runs a task once after a delay
pub trait Scheduler: Send + Sync {
    fn schedule(&self, delay: Duration, task: Task) -> TaskHandle;
}

// ═══════════════════════════════════════════════════════════════════════════════
// THREAD SCHEDULER
// ═══════════════════════════════════════════════════════════════════════════════

/// Real-time scheduler: one sleeping thread per task
#[derive(Debug, Clone, Default)]
pub struct ThreadScheduler {
    name: Option<String>,
}

impl ThreadScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: thread name prefix
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl Scheduler for ThreadScheduler {
    fn schedule(&self, delay: Duration, task: Task) -> TaskHandle {
        let handle = TaskHandle::new();
        let worker = handle.clone();
        let name = self.name.clone().unwrap_or_else(|| "rk-timer".to_string());

        let spawned = thread::Builder::new().name(name.clone()).spawn(move || {
            thread::sleep(delay);
            if worker.claim() {
                task();
            }
        });

        if let Err(e) = spawned {
            log::error!("Failed to spawn timer thread {}: {}. Task dropped.", name, e);
            handle.cancel();
        }
        handle
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// MANUAL SCHEDULER
// ═══════════════════════════════════════════════════════════════════════════════

struct Entry {
    due: Duration,
    seq: u64,
    handle: TaskHandle,
    task: Task,
}

#[derive(Default)]
struct ManualClock {
    now: Duration,
    next_seq: u64,
    queue: Vec<Entry>,
}

/// Virtual-clock scheduler. Nothing fires until [`ManualScheduler::advance`].
///
/// Clones share the same clock and queue.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    clock: Arc<Mutex<ManualClock>>,
}

impl std::fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let clock = self.clock.lock();
        f.debug_struct("ManualScheduler")
            .field("now", &clock.now)
            .field("queued", &clock.queue.len())
            .finish()
    }
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time elapsed so far
    pub fn now(&self) -> Duration {
        self.clock.lock().now
    }

    /// Tasks still waiting (cancelled ones excluded)
    pub fn pending(&self) -> usize {
        self.clock
            .lock()
            .queue
            .iter()
            .filter(|e| e.handle.is_pending())
            .count()
    }

    /// Move the clock forward and run every task that came due, earliest
    /// first. Returns how many tasks ran.
    pub fn advance(&self, dt: Duration) -> usize {
        let target = {
            let mut clock = self.clock.lock();
            clock.now += dt;
            clock.now
        };

        let mut ran = 0;
        // Tasks run outside the lock so they may schedule again
        while let Some(entry) = self.pop_due(target) {
            if entry.handle.claim() {
                (entry.task)();
                ran += 1;
            }
        }
        ran
    }

    fn pop_due(&self, now: Duration) -> Option<Entry> {
        let mut clock = self.clock.lock();
        clock.queue.retain(|e| !e.handle.is_cancelled());
        let index = clock
            .queue
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due <= now)
            .min_by_key(|(_, e)| (e.due, e.seq))
            .map(|(i, _)| i)?;
        Some(clock.queue.swap_remove(index))
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: Task) -> TaskHandle {
        let handle = TaskHandle::new();
        let mut clock = self.clock.lock();
        let seq = clock.next_seq;
        clock.next_seq += 1;
        let due = clock.now + delay;
        clock.queue.push(Entry {
            due,
            seq,
            handle: handle.clone(),
            task,
        });
        handle
    }
}
