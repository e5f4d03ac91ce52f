//! Cooperative frame and timer scheduling
//!
//! A single-threaded scheduler with a virtual clock. It plays the role of the
//! host's "request next frame" and one-shot timeout primitives:
//!
//! - At most one frame request is outstanding; requesting again replaces it.
//! - Timers are one-shot and addressed by generational [`TimerKey`]s, so a
//!   stale key can never cancel a timer that later reused its slot.
//!
//! The clock only moves when the owner calls [`Scheduler::advance`], which
//! makes timing fully deterministic under test.

use std::time::Duration;
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Key to a pending one-shot timer
    pub struct TimerKey;
}

/// Work a timer performs when it fires
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Task {
    /// Bring the expired meteor back
    MeteorRespawn,
}

/// Handle to an outstanding frame request
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

impl FrameHandle {
    /// Monotonic id of the request
    pub fn id(self) -> u64 {
        self.0
    }
}

/// A timer that came due during [`Scheduler::advance`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FiredTimer {
    pub key: TimerKey,
    pub task: Task,
}

#[derive(Clone, Debug)]
struct Timer {
    due: Duration,
    /// Insertion order, breaks ties between timers due at the same instant
    seq: u64,
    task: Task,
}

/// Virtual-clock scheduler for frames and one-shot timers
#[derive(Debug, Default)]
pub struct Scheduler {
    now: Duration,
    timers: SlotMap<TimerKey, Timer>,
    next_seq: u64,
    frame: Option<FrameHandle>,
    next_frame_id: u64,
}

impl Scheduler {
    /// Create a scheduler with the clock at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Arm a one-shot timer that fires `delay` from now
    pub fn set_timeout(&mut self, delay: Duration, task: Task) -> TimerKey {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.timers.insert(Timer { due: self.now + delay, seq, task })
    }

    /// Cancel a pending timer
    ///
    /// Returns false if the timer already fired or was cancelled.
    pub fn clear_timeout(&mut self, key: TimerKey) -> bool {
        self.timers.remove(key).is_some()
    }

    /// Whether the timer is still pending
    pub fn is_pending(&self, key: TimerKey) -> bool {
        self.timers.contains_key(key)
    }

    /// Number of timers still pending
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Time at which a pending timer is due
    pub fn due_at(&self, key: TimerKey) -> Option<Duration> {
        self.timers.get(key).map(|t| t.due)
    }

    /// Move the clock forward and collect every timer that came due
    ///
    /// Fired timers are removed and returned in due order.
    pub fn advance(&mut self, dt: Duration) -> Vec<FiredTimer> {
        self.now += dt;
        let now = self.now;

        let mut due: Vec<(Duration, u64, TimerKey)> = self
            .timers
            .iter()
            .filter(|(_, t)| t.due <= now)
            .map(|(key, t)| (t.due, t.seq, key))
            .collect();
        due.sort_unstable_by_key(|&(due, seq, _)| (due, seq));

        due.into_iter()
            .filter_map(|(_, _, key)| {
                self.timers.remove(key).map(|t| FiredTimer { key, task: t.task })
            })
            .collect()
    }

    /// Request the next frame, replacing any outstanding request
    pub fn request_frame(&mut self) -> FrameHandle {
        let handle = FrameHandle(self.next_frame_id);
        self.next_frame_id += 1;
        self.frame = Some(handle);
        handle
    }

    /// Cancel a frame request
    ///
    /// Only the outstanding request can be cancelled; older handles are ignored.
    pub fn cancel_frame(&mut self, handle: FrameHandle) -> bool {
        if self.frame == Some(handle) {
            self.frame = None;
            true
        } else {
            false
        }
    }

    /// Whether a frame request is outstanding
    pub fn frame_pending(&self) -> bool {
        self.frame.is_some()
    }

    /// Consume the outstanding frame request, if any
    pub fn take_frame(&mut self) -> Option<FrameHandle> {
        self.frame.take()
    }
}
