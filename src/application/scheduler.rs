use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Called once per frame with the frame timestamp in milliseconds.
pub type FrameCallback = Box<dyn FnMut(u64) + Send>;

/// Injected frame driver. Every registered callback runs once per frame
/// until its handle is cancelled or dropped.
pub trait FrameScheduler: Send + Sync {
    fn now_ms(&self) -> u64;
    fn schedule(&self, callback: FrameCallback) -> FrameHandle;
}

#[derive(Default)]
struct Slots {
    next_id: u64,
    callbacks: BTreeMap<u64, FrameCallback>,
}

fn lock(slots: &Mutex<Slots>) -> MutexGuard<'_, Slots> {
    slots.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Registration table shared by the scheduler implementations. Frames run
/// under the table lock, so a cancel never lands in the middle of one.
#[derive(Clone, Default)]
pub struct FrameRegistry {
    slots: Arc<Mutex<Slots>>,
}

impl FrameRegistry {
    pub fn register(&self, callback: FrameCallback) -> FrameHandle {
        let mut slots = lock(&self.slots);
        let id = slots.next_id;
        slots.next_id += 1;
        slots.callbacks.insert(id, callback);
        FrameHandle {
            id,
            slots: Arc::downgrade(&self.slots),
        }
    }

    /// Runs every registered callback; returns how many ran.
    pub fn run_frame(&self, now_ms: u64) -> usize {
        let mut slots = lock(&self.slots);
        for callback in slots.callbacks.values_mut() {
            callback(now_ms);
        }
        slots.callbacks.len()
    }

    pub fn len(&self) -> usize {
        lock(&self.slots).callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Cancels its registration when dropped.
pub struct FrameHandle {
    id: u64,
    slots: Weak<Mutex<Slots>>,
}

impl FrameHandle {
    pub fn cancel(self) {}

    pub fn is_active(&self) -> bool {
        self.slots
            .upgrade()
            .map(|s| lock(&s).callbacks.contains_key(&self.id))
            .unwrap_or(false)
    }
}

impl Drop for FrameHandle {
    fn drop(&mut self) {
        if let Some(slots) = self.slots.upgrade() {
            lock(&slots).callbacks.remove(&self.id);
        }
    }
}

/// Frames advance only when the caller says so. Used by tests and by
/// anything that wants synthetic time.
#[derive(Default)]
pub struct ManualScheduler {
    registry: FrameRegistry,
    now_ms: AtomicU64,
}

impl ManualScheduler {
    pub fn new(start_ms: u64) -> Self {
        Self {
            registry: FrameRegistry::default(),
            now_ms: AtomicU64::new(start_ms),
        }
    }

    /// Moves the clock forward by `delta_ms` and runs one frame.
    pub fn advance(&self, delta_ms: u64) -> usize {
        let now = self.now_ms.fetch_add(delta_ms, Ordering::SeqCst) + delta_ms;
        self.registry.run_frame(now)
    }

    pub fn registered(&self) -> usize {
        self.registry.len()
    }
}

impl FrameScheduler for ManualScheduler {
    fn now_ms(&self) -> u64 {
        self.now_ms.load(Ordering::SeqCst)
    }

    fn schedule(&self, callback: FrameCallback) -> FrameHandle {
        self.registry.register(callback)
    }
}

/// Drives frames from a tokio interval, timestamped relative to creation.
pub struct IntervalScheduler {
    registry: FrameRegistry,
    origin: Instant,
    period: Duration,
}

impl IntervalScheduler {
    pub fn new(period: Duration) -> Self {
        Self {
            registry: FrameRegistry::default(),
            origin: Instant::now(),
            period,
        }
    }

    pub fn spawn(&self) -> JoinHandle<()> {
        let registry = self.registry.clone();
        let origin = self.origin;
        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::spawn(async move {
            loop {
                let tick = interval.tick().await;
                registry.run_frame(tick.duration_since(origin).as_millis() as u64);
            }
        })
    }
}

impl FrameScheduler for IntervalScheduler {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }

    fn schedule(&self, callback: FrameCallback) -> FrameHandle {
        self.registry.register(callback)
    }
}
