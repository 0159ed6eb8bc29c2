// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The event loop.
//!
//! One iteration refreshes the clock, fires due tasks, then parks in the
//! poller for exactly as long as the scheduler allows: forever when nothing
//! is scheduled, not at all when the next task is closer than the spin
//! threshold, and for the remaining delta otherwise. `busy_poll` trades CPU
//! for latency by never parking.
//!
//! Cancellation is cooperative: `exit()` raises a flag observed between the
//! fire pass and the next select.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::config::SPIN_THRESHOLD;
use crate::core::time::Clock;

use super::scheduler::Scheduler;

/// Readiness poller driven by the loop; implemented by the I/O selector.
pub trait Poller {
    /// Wait up to `timeout` (`None` blocks) and dispatch readiness.
    /// Returns the number of channels serviced.
    fn poll(&mut self, timeout: Option<Duration>) -> io::Result<usize>;
}

/// Cooperative exit flag shared with handlers and other threads.
#[derive(Clone)]
pub struct ExitHandle {
    flag: Arc<AtomicBool>,
}

impl ExitHandle {
    pub fn exit(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_set(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// Scheduler + clock + poller combined into the platform's single thread.
pub struct EventLoop<C: Clock, P: Poller> {
    clock: C,
    scheduler: Scheduler,
    poller: P,
    exit: Arc<AtomicBool>,
    busy_poll: bool,
}

impl<C: Clock, P: Poller> EventLoop<C, P> {
    pub fn new(clock: C, poller: P) -> Self {
        Self {
            clock,
            scheduler: Scheduler::new(),
            poller,
            exit: Arc::new(AtomicBool::new(false)),
            busy_poll: false,
        }
    }

    /// Never park in the poller; spin through fire/select-now instead.
    pub fn set_busy_poll(&mut self, busy_poll: bool) {
        self.busy_poll = busy_poll;
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut Scheduler {
        &mut self.scheduler
    }

    pub fn poller_mut(&mut self) -> &mut P {
        &mut self.poller
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    pub fn exit_handle(&self) -> ExitHandle {
        ExitHandle {
            flag: Arc::clone(&self.exit),
        }
    }

    fn exiting(&self) -> bool {
        self.exit.load(Ordering::Acquire)
    }

    /// One loop iteration. Returns `false` once exit has been requested.
    pub fn tick(&mut self) -> io::Result<bool> {
        if self.exiting() {
            return Ok(false);
        }
        self.clock.update();
        let now = self.clock.nanos();

        if self.busy_poll {
            self.scheduler.fire(now);
            if self.exiting() {
                return Ok(false);
            }
            self.poller.poll(Some(Duration::ZERO))?;
            return Ok(!self.exiting());
        }

        let next = self.scheduler.fire(now);
        if self.exiting() {
            return Ok(false);
        }
        if next == u64::MAX {
            self.poller.poll(None)?;
        } else if next < SPIN_THRESHOLD.as_nanos() as u64 {
            self.poller.poll(Some(Duration::ZERO))?;
        } else {
            self.poller.poll(Some(Duration::from_nanos(next)))?;
        }
        Ok(!self.exiting())
    }

    /// Run until `exit()`.
    pub fn run(&mut self) -> io::Result<()> {
        while self.tick()? {}
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::ManualClock;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Poller that records the timeouts it is asked to wait for.
    struct RecordingPoller {
        timeouts: Rc<RefCell<Vec<Option<Duration>>>>,
    }

    impl Poller for RecordingPoller {
        fn poll(&mut self, timeout: Option<Duration>) -> io::Result<usize> {
            self.timeouts.borrow_mut().push(timeout);
            Ok(0)
        }
    }

    fn event_loop() -> (
        EventLoop<ManualClock, RecordingPoller>,
        Rc<RefCell<Vec<Option<Duration>>>>,
    ) {
        let timeouts = Rc::new(RefCell::new(Vec::new()));
        let poller = RecordingPoller {
            timeouts: Rc::clone(&timeouts),
        };
        (EventLoop::new(ManualClock::new(1_000), poller), timeouts)
    }

    #[test]
    fn test_blocks_forever_when_idle() {
        let (mut el, timeouts) = event_loop();
        el.tick().expect("Tick should succeed");
        assert_eq!(*timeouts.borrow(), vec![None]);
    }

    #[test]
    fn test_spins_when_task_is_imminent() {
        let (mut el, timeouts) = event_loop();
        el.scheduler_mut()
            .schedule_at(1_100, "soon", Box::new(|_| {}))
            .expect("Schedule should succeed");
        el.tick().expect("Tick should succeed");
        // 100ns away is below the spin threshold.
        assert_eq!(*timeouts.borrow(), vec![Some(Duration::ZERO)]);
    }

    #[test]
    fn test_waits_exact_delta_for_distant_task() {
        let (mut el, timeouts) = event_loop();
        el.scheduler_mut()
            .schedule_at(1_000 + 5_000_000, "later", Box::new(|_| {}))
            .expect("Schedule should succeed");
        el.tick().expect("Tick should succeed");
        assert_eq!(
            *timeouts.borrow(),
            vec![Some(Duration::from_nanos(5_000_000))]
        );
    }

    #[test]
    fn test_busy_poll_never_blocks() {
        let (mut el, timeouts) = event_loop();
        el.set_busy_poll(true);
        el.tick().expect("Tick should succeed");
        assert_eq!(*timeouts.borrow(), vec![Some(Duration::ZERO)]);
    }

    #[test]
    fn test_exit_observed_before_select() {
        let (mut el, timeouts) = event_loop();
        let handle = el.exit_handle();
        el.scheduler_mut()
            .schedule_at(1_000, "quit", {
                Box::new(move |_| {
                    handle.exit();
                })
            })
            .expect("Schedule should succeed");

        el.run().expect("Run should exit cleanly");
        assert!(
            timeouts.borrow().is_empty(),
            "exit requested during fire must skip the select"
        );
    }

    #[test]
    fn test_tick_false_after_exit() {
        let (mut el, _timeouts) = event_loop();
        el.exit_handle().exit();
        assert!(!el.tick().expect("Tick should succeed"));
    }
}
