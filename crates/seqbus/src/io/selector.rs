// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Readiness selector over `mio::Poll`.
//!
//! Channels register with an interest bitset and get their `on_ready` called
//! from `select`. A channel that returns an error is deregistered and
//! dropped; the selector itself keeps running.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use log::warn;
use mio::{Events, Interest, Poll, Token, Waker};

use crate::config::SELECTOR_EVENT_CAPACITY;
use crate::sched::Poller;

/// Interest bitset: read / write / accept / connect.
///
/// Accept maps onto read readiness and connect onto write readiness at the
/// OS level; keeping them distinct documents the channel's intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ops(u8);

impl Ops {
    pub const READ: Ops = Ops(0b0001);
    pub const WRITE: Ops = Ops(0b0010);
    pub const ACCEPT: Ops = Ops(0b0100);
    pub const CONNECT: Ops = Ops(0b1000);

    pub fn union(self, other: Ops) -> Ops {
        Ops(self.0 | other.0)
    }

    pub fn contains(self, other: Ops) -> bool {
        self.0 & other.0 == other.0
    }

    pub(crate) fn to_interest(self) -> Interest {
        let mut interest: Option<Interest> = None;
        if self.contains(Ops::READ) || self.contains(Ops::ACCEPT) {
            interest = Some(Interest::READABLE);
        }
        if self.contains(Ops::WRITE) || self.contains(Ops::CONNECT) {
            interest = Some(match interest {
                Some(i) => i | Interest::WRITABLE,
                None => Interest::WRITABLE,
            });
        }
        interest.unwrap_or(Interest::READABLE)
    }
}

/// A pollable endpoint owned by the selector's caller.
pub trait Channel {
    /// Register the underlying source with the poll registry.
    fn register(&mut self, registry: &mio::Registry, token: Token, ops: Ops) -> io::Result<()>;

    /// Remove the underlying source from the poll registry.
    fn deregister(&mut self, registry: &mio::Registry) -> io::Result<()>;

    /// Readiness callback. Returning an error closes the channel.
    fn on_ready(&mut self, readable: bool, writable: bool) -> io::Result<()>;
}

/// Token 0 is reserved for the cross-thread waker.
const WAKER_TOKEN: Token = Token(0);

/// The I/O selector.
pub struct Selector {
    poll: Poll,
    events: Events,
    waker: Arc<Waker>,
    channels: HashMap<Token, Rc<RefCell<dyn Channel>>>,
    next_token: usize,
    ready_scratch: Vec<(Token, bool, bool)>,
}

impl Selector {
    pub fn new() -> io::Result<Self> {
        let poll = Poll::new()?;
        let waker = Arc::new(Waker::new(poll.registry(), WAKER_TOKEN)?);
        Ok(Self {
            poll,
            events: Events::with_capacity(SELECTOR_EVENT_CAPACITY),
            waker,
            channels: HashMap::new(),
            next_token: 1,
            ready_scratch: Vec::new(),
        })
    }

    /// Waker for unparking a blocked `select` from another thread.
    pub fn waker(&self) -> Arc<Waker> {
        Arc::clone(&self.waker)
    }

    /// Register `channel` with the given interest; returns its token.
    pub fn register(
        &mut self,
        channel: Rc<RefCell<dyn Channel>>,
        ops: Ops,
    ) -> io::Result<Token> {
        let token = Token(self.next_token);
        self.next_token += 1;
        channel
            .borrow_mut()
            .register(self.poll.registry(), token, ops)?;
        self.channels.insert(token, channel);
        Ok(token)
    }

    /// Deregister and drop the channel at `token`.
    pub fn remove(&mut self, token: Token) {
        if let Some(channel) = self.channels.remove(&token) {
            if let Err(e) = channel.borrow_mut().deregister(self.poll.registry()) {
                warn!("deregister failed for {:?}: {}", token, e);
            }
        }
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Poll for readiness and dispatch to channels.
    pub fn select(&mut self, timeout: Option<Duration>) -> io::Result<usize> {
        match self.poll.poll(&mut self.events, timeout) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::Interrupted => return Ok(0),
            Err(e) => return Err(e),
        }

        self.ready_scratch.clear();
        for event in &self.events {
            if event.token() == WAKER_TOKEN {
                continue;
            }
            self.ready_scratch
                .push((event.token(), event.is_readable(), event.is_writable()));
        }

        let mut serviced = 0;
        for i in 0..self.ready_scratch.len() {
            let (token, readable, writable) = self.ready_scratch[i];
            let Some(channel) = self.channels.get(&token).cloned() else {
                continue;
            };
            serviced += 1;
            let result = channel.borrow_mut().on_ready(readable, writable);
            if let Err(e) = result {
                // One bad channel never takes down the loop.
                warn!("channel {:?} closed: {}", token, e);
                self.remove(token);
            }
        }
        Ok(serviced)
    }

    /// Poll without blocking.
    pub fn select_now(&mut self) -> io::Result<usize> {
        self.select(Some(Duration::ZERO))
    }
}

impl Poller for Selector {
    fn poll(&mut self, timeout: Option<Duration>) -> io::Result<usize> {
        self.select(timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ops_bitset() {
        let ops = Ops::READ.union(Ops::WRITE);
        assert!(ops.contains(Ops::READ));
        assert!(ops.contains(Ops::WRITE));
        assert!(!ops.contains(Ops::ACCEPT));
    }

    #[test]
    fn test_ops_interest_mapping() {
        assert_eq!(Ops::ACCEPT.to_interest(), Interest::READABLE);
        assert_eq!(Ops::CONNECT.to_interest(), Interest::WRITABLE);
        assert_eq!(
            Ops::READ.union(Ops::WRITE).to_interest(),
            Interest::READABLE | Interest::WRITABLE
        );
    }

    #[test]
    fn test_selector_select_now_empty() {
        let mut selector = Selector::new().expect("Selector creation should succeed");
        let serviced = selector.select_now().expect("Select should succeed");
        assert_eq!(serviced, 0);
        assert_eq!(selector.channel_count(), 0);
    }

    #[test]
    fn test_waker_unparks_blocking_select() {
        let mut selector = Selector::new().expect("Selector creation should succeed");
        let waker = selector.waker();
        let join = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(10));
            waker.wake().expect("Wake should succeed");
        });

        // Without the waker this would park for a second.
        let serviced = selector
            .select(Some(Duration::from_secs(1)))
            .expect("Select should succeed");
        join.join().expect("Thread should join");
        assert_eq!(serviced, 0, "waker events are not dispatched to channels");
    }
}
