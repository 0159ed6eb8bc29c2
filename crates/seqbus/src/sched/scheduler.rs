// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Time-based task scheduler.
//!
//! Tasks live in an intrusive list ordered by `(fire_time, task_id)`
//! ascending, so the head is always the next task due. Every insertion is
//! assigned a fresh monotonic task id; the id returned to callers (the
//! *origin* id) is stable across reschedules and periodic reinsertion.
//!
//! `fire()` first drains a cross-thread injection queue, then runs due tasks.
//! Tasks inserted during a pass carry ids above the fence captured at entry
//! and therefore never run in the same pass, which also guarantees a
//! repeating task runs at most once per period.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crossbeam::queue::SegQueue;
use log::warn;

use crate::core::list::{Handle, LinkedArena, NIL};

/// Boxed task body; receives the scheduler so it can cancel or reschedule
/// itself and schedule new work.
pub type TaskFn = Box<dyn FnMut(&mut Scheduler)>;

/// Boxed cross-thread injected work.
pub type InjectedFn = Box<dyn FnOnce() + Send>;

/// Scheduler argument errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    /// A duration or instant that must be positive was not.
    InvalidArgument {
        /// What was wrong.
        reason: &'static str,
    },
    /// Cancel/reschedule of an id that is not scheduled.
    UnknownTask {
        /// The offending origin id.
        task_id: u64,
    },
}

impl fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument { reason } => write!(f, "invalid argument: {}", reason),
            Self::UnknownTask { task_id } => write!(f, "unknown task {}", task_id),
        }
    }
}

impl std::error::Error for SchedulerError {}

struct ScheduledTask {
    /// Assigned id; fresh for every insertion, orders ties on fire time.
    id: u64,
    /// Stable id handed to the caller at schedule time.
    origin: u64,
    fire_time: u64,
    /// 0 = one-shot.
    interval: u64,
    label: &'static str,
    body: Option<TaskFn>,
}

struct Running {
    origin: u64,
    cancelled: bool,
    reschedule_at: Option<u64>,
}

/// Cross-thread producer side of the injection queue.
///
/// FIFO per producer; drained at the start of every `fire()` pass before any
/// time-based task runs.
#[derive(Clone)]
pub struct SchedulerInjector {
    queue: Arc<SegQueue<InjectedFn>>,
}

impl SchedulerInjector {
    /// Enqueue work to run on the event-loop thread.
    pub fn execute(&self, body: InjectedFn) {
        self.queue.push(body);
    }
}

/// Single-threaded time scheduler with a cross-thread injection queue.
pub struct Scheduler {
    tasks: LinkedArena<ScheduledTask>,
    by_origin: HashMap<u64, Handle>,
    next_id: u64,
    now: u64,
    injected: Arc<SegQueue<InjectedFn>>,
    running: Option<Running>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            tasks: LinkedArena::new(),
            by_origin: HashMap::new(),
            next_id: 1,
            now: 0,
            injected: Arc::new(SegQueue::new()),
            running: None,
        }
    }

    /// Producer handle for `execute()` from other threads.
    pub fn injector(&self) -> SchedulerInjector {
        SchedulerInjector {
            queue: Arc::clone(&self.injected),
        }
    }

    /// Number of scheduled (not yet fired) tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// The scheduler's view of "now" (set by the last `fire`).
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Schedule `body` to run once at absolute time `nanos`.
    pub fn schedule_at(
        &mut self,
        nanos: u64,
        label: &'static str,
        body: TaskFn,
    ) -> Result<u64, SchedulerError> {
        if nanos == 0 {
            return Err(SchedulerError::InvalidArgument {
                reason: "fire time must be positive",
            });
        }
        Ok(self.insert(nanos, 0, label, body, None))
    }

    /// Schedule `body` to run once `nanos` from now.
    pub fn schedule_in(
        &mut self,
        nanos: u64,
        label: &'static str,
        body: TaskFn,
    ) -> Result<u64, SchedulerError> {
        self.schedule_at(self.now.saturating_add(nanos).max(1), label, body)
    }

    /// Schedule `body` to run on the next pass.
    pub fn schedule_next(&mut self, label: &'static str, body: TaskFn) -> u64 {
        self.insert(self.now.max(1), 0, label, body, None)
    }

    /// Schedule `body` to repeat every `nanos`; first fire `now + nanos`.
    pub fn schedule_every(
        &mut self,
        nanos: u64,
        label: &'static str,
        body: TaskFn,
    ) -> Result<u64, SchedulerError> {
        if nanos == 0 {
            return Err(SchedulerError::InvalidArgument {
                reason: "interval must be positive",
            });
        }
        Ok(self.insert(self.now.saturating_add(nanos), nanos, label, body, None))
    }

    /// Atomically cancel `origin` and schedule it again at `nanos`, keeping
    /// its body, interval, and origin id.
    pub fn reschedule(&mut self, origin: u64, nanos: u64) -> Result<u64, SchedulerError> {
        if nanos == 0 {
            return Err(SchedulerError::InvalidArgument {
                reason: "fire time must be positive",
            });
        }
        if let Some(running) = self.running.as_mut() {
            if running.origin == origin {
                running.reschedule_at = Some(nanos);
                running.cancelled = false;
                return Ok(origin);
            }
        }
        let handle = self
            .by_origin
            .remove(&origin)
            .ok_or(SchedulerError::UnknownTask { task_id: origin })?;
        let task = self.tasks.remove(handle);
        let body = task.body.unwrap_or_else(|| unreachable!("scheduled task without body"));
        self.insert(nanos, task.interval, task.label, body, Some(origin));
        Ok(origin)
    }

    /// Cancel `origin`. Idempotent; always returns 0.
    pub fn cancel(&mut self, origin: u64) -> u64 {
        if let Some(running) = self.running.as_mut() {
            if running.origin == origin {
                running.cancelled = true;
                running.reschedule_at = None;
                return 0;
            }
        }
        if let Some(handle) = self.by_origin.remove(&origin) {
            self.tasks.remove(handle);
        }
        0
    }

    fn insert(
        &mut self,
        fire_time: u64,
        interval: u64,
        label: &'static str,
        body: TaskFn,
        origin: Option<u64>,
    ) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        let origin = origin.unwrap_or(id);
        let task = ScheduledTask {
            id,
            origin,
            fire_time,
            interval,
            label,
            body: Some(body),
        };

        // Walk from the head; ties on fire time order by assigned id, so a
        // fresh task lands after every equal-time task already present.
        let mut at = self.tasks.head();
        while at != NIL {
            let probe = self.tasks.get(at);
            if probe.fire_time > fire_time || (probe.fire_time == fire_time && probe.id > id) {
                break;
            }
            at = self.tasks.next(at);
        }
        let handle = if at == NIL {
            self.tasks.push_back(task)
        } else {
            self.tasks.insert_before(at, task)
        };
        self.by_origin.insert(origin, handle);
        id
    }

    /// Drain injected work, run every due task, and return nanoseconds until
    /// the next fire time (`u64::MAX` when nothing is scheduled).
    pub fn fire(&mut self, now: u64) -> u64 {
        self.now = now;

        while let Some(body) = self.injected.pop() {
            body();
        }

        // Tasks inserted after this point never run in this pass.
        let fence = self.next_id;
        loop {
            let head = self.tasks.head();
            if head == NIL {
                break;
            }
            let (fire_time, id, origin) = {
                let task = self.tasks.get(head);
                (task.fire_time, task.id, task.origin)
            };
            if fire_time > now || id >= fence {
                break;
            }

            self.by_origin.remove(&origin);
            let mut task = self.tasks.remove(head);
            let mut body = match task.body.take() {
                Some(body) => body,
                None => {
                    warn!("task {} ({}) had no body", task.origin, task.label);
                    continue;
                }
            };

            self.running = Some(Running {
                origin,
                cancelled: false,
                reschedule_at: None,
            });
            body(self);
            let running = self
                .running
                .take()
                .unwrap_or_else(|| unreachable!("running slot cleared inside task"));

            if let Some(at) = running.reschedule_at {
                self.insert(at, task.interval, task.label, body, Some(origin));
            } else if !running.cancelled && task.interval > 0 {
                let next = task.fire_time.saturating_add(task.interval);
                self.insert(next, task.interval, task.label, body, Some(origin));
            }
        }

        let head = self.tasks.head();
        if head == NIL {
            u64::MAX
        } else {
            self.tasks.get(head).fire_time.saturating_sub(now)
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
