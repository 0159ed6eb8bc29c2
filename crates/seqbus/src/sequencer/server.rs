// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The bus server.
//!
//! Accepts command datagrams from any number of publishers and produces the
//! single totally-ordered event stream that is the system of record. All
//! admission, handler dispatch, and event stamping happens on the event-loop
//! thread; the server never aborts the bus on a peer's bad input.

use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, warn};

use crate::codec::header;
use crate::config::{MAX_MESSAGE_SIZE, SEQUENCER_APPLICATION_ID};
use crate::core::time::{Clock, SystemClock};

use super::apps::AppRegistry;
use super::entities::EntityIndex;

/// Consumer of the sequenced event stream.
pub trait EventSink {
    /// `event_seq` is the global sequence of this event.
    fn on_event(&mut self, event_seq: u64, buffer: &[u8]);
}

/// Identity stamped into emitted events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EventIdentity {
    /// Echo the admitted command's identity.
    Command { application_id: u16, sequence: u32 },
    /// Sequencer-originated; uses the sequencer's own id and counter.
    Sequencer,
}

/// Handler-side view of one admission.
///
/// Events committed here are buffered and broadcast only after the handler
/// returns success; a failed handler discards them and yields a single
/// reject event instead.
pub struct SequencerContext<'a> {
    staging: &'a mut [u8],
    events: &'a mut Vec<Vec<u8>>,
    apps: &'a mut AppRegistry,
    entities: &'a mut EntityIndex,
    identity: EventIdentity,
    timestamp: u64,
}

impl SequencerContext<'_> {
    /// Staging region for the next event.
    pub fn acquire(&mut self) -> &mut [u8] {
        self.staging
    }

    /// Finalize `len` staged bytes as one event of this admission.
    ///
    /// The command's identity and the admission timestamp overwrite whatever
    /// the encoder left in those header fields.
    pub fn commit(&mut self, len: usize) -> Result<(), String> {
        if len < header::HEADER_SIZE || len > self.staging.len() {
            return Err(format!("event length {} out of range", len));
        }
        let event = &mut self.staging[..len];
        let (application_id, sequence) = match self.identity {
            EventIdentity::Command {
                application_id,
                sequence,
            } => (application_id, sequence),
            EventIdentity::Sequencer => (SEQUENCER_APPLICATION_ID, 0),
        };
        header::set_application_id(event, application_id)
            .and_then(|()| header::set_application_sequence_number(event, sequence))
            .and_then(|()| header::set_timestamp(event, self.timestamp))
            .map_err(|e| e.to_string())?;
        self.events.push(event.to_vec());
        Ok(())
    }

    /// Assign (or look up) an application id by name and re-address this
    /// admission's events to that application.
    ///
    /// Only meaningful inside the `ApplicationDefinition` handler: the
    /// defining command arrives before the publisher has an id, so its echo
    /// carries the assigned id with sequence 0.
    pub fn define_application(&mut self, name: &str) -> u16 {
        let id = self.apps.define(name);
        self.identity = EventIdentity::Command {
            application_id: id,
            sequence: 0,
        };
        id
    }

    /// Admission timestamp (nanoseconds since epoch).
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn entities(&self) -> &EntityIndex {
        self.entities
    }

    pub fn entities_mut(&mut self) -> &mut EntityIndex {
        self.entities
    }

    pub fn apps(&self) -> &AppRegistry {
        self.apps
    }
}

/// Per-message-type command handler.
///
/// Returns `Ok(())` after emitting zero or more events, or `Err(reason)` to
/// reject the command; the reason becomes the `SequencerReject` payload.
pub trait CommandHandler {
    fn on_command(&mut self, command: &[u8], ctx: &mut SequencerContext<'_>)
        -> Result<(), String>;
}

/// Builds a complete `SequencerReject` message into `staging`, embedding the
/// offending command and a short ASCII reason; returns the message length.
///
/// Supplied by the application because the reject message is schema-defined.
pub type RejectBuilder = Box<dyn FnMut(&mut [u8], &[u8], &str) -> Result<usize, String>>;

type SharedHandler = Rc<RefCell<dyn CommandHandler>>;

/// Message types the server itself must recognize.
pub struct SequencerConfig {
    /// `ApplicationDefinition` type byte; the only admissible command from
    /// an undefined publisher.
    pub application_definition_type: u8,
    /// `Heartbeat` type byte; echoed without a handler.
    pub heartbeat_type: Option<u8>,
}

/// The sequencer.
pub struct BusServer {
    clock: Box<dyn Clock>,
    apps: AppRegistry,
    entities: EntityIndex,
    handlers: Vec<Option<SharedHandler>>,
    sinks: Vec<Box<dyn EventSink>>,
    staging: Box<[u8]>,
    batch: Vec<Vec<u8>>,
    event_seq: u64,
    config: SequencerConfig,
    reject: RejectBuilder,
}

impl BusServer {
    pub fn new(config: SequencerConfig, reject: RejectBuilder) -> Self {
        Self::with_clock(config, reject, Box::new(SystemClock::new()))
    }

    pub fn with_clock(config: SequencerConfig, reject: RejectBuilder, clock: Box<dyn Clock>) -> Self {
        let mut handlers = Vec::with_capacity(256);
        handlers.resize_with(256, || None);
        Self {
            clock,
            apps: AppRegistry::new(),
            entities: EntityIndex::new(),
            handlers,
            sinks: Vec::new(),
            staging: vec![0u8; MAX_MESSAGE_SIZE].into_boxed_slice(),
            batch: Vec::new(),
            event_seq: 0,
            config,
            reject,
        }
    }

    /// Register `handler` for `message_type`; the same handler instance may
    /// be registered for several types.
    pub fn register_handler(&mut self, message_type: u8, handler: SharedHandler) {
        let slot = &mut self.handlers[usize::from(message_type)];
        debug_assert!(slot.is_none(), "handler already registered for type");
        *slot = Some(handler);
    }

    pub fn add_sink(&mut self, sink: Box<dyn EventSink>) {
        self.sinks.push(sink);
    }

    pub fn apps(&self) -> &AppRegistry {
        &self.apps
    }

    pub fn entities(&self) -> &EntityIndex {
        &self.entities
    }

    /// Global sequence of the last published event.
    pub fn event_seq(&self) -> u64 {
        self.event_seq
    }

    /// Process one upstream datagram: a sequence of length-prefixed commands.
    pub fn on_packet(&mut self, datagram: &[u8]) {
        let mut at = 0usize;
        while at + 2 <= datagram.len() {
            let len = u16::from_le_bytes([datagram[at], datagram[at + 1]]) as usize;
            let start = at + 2;
            let end = start + len;
            if end > datagram.len() {
                warn!("command datagram truncated at offset {}", start);
                return;
            }
            self.on_command(&datagram[start..end]);
            at = end;
        }
    }

    /// Admit and handle a single command.
    pub fn on_command(&mut self, command: &[u8]) {
        self.clock.update();
        let timestamp = self.clock.nanos();

        let (application_id, sequence, message_type) = match Self::parse_header(command) {
            Ok(parts) => parts,
            Err(()) => {
                self.emit_reject(command, "malformed", timestamp);
                return;
            }
        };

        // An undefined publisher may only define itself.
        if !self.apps.is_defined(application_id) {
            if message_type == self.config.application_definition_type {
                self.dispatch(command, message_type, EventIdentity::Sequencer, timestamp);
            } else {
                self.emit_reject(command, "unknown application", timestamp);
            }
            return;
        }

        let expected = self.apps.expected_next(application_id).unwrap_or(1);
        if sequence != expected {
            debug!(
                "app {}: sequence {} (expected {})",
                application_id, sequence, expected
            );
            self.emit_reject(command, "out-of-sequence", timestamp);
            return;
        }
        self.apps.record(application_id, sequence);

        self.dispatch(
            command,
            message_type,
            EventIdentity::Command {
                application_id,
                sequence,
            },
            timestamp,
        );
    }

    fn parse_header(command: &[u8]) -> Result<(u16, u32, u8), ()> {
        let application_id = header::application_id(command).map_err(|_| ())?;
        let sequence = header::application_sequence_number(command).map_err(|_| ())?;
        let message_type = header::message_type(command).map_err(|_| ())?;
        Ok((application_id, sequence, message_type))
    }

    fn dispatch(
        &mut self,
        command: &[u8],
        message_type: u8,
        identity: EventIdentity,
        timestamp: u64,
    ) {
        // Heartbeats are echoed without a handler.
        if Some(message_type) == self.config.heartbeat_type {
            self.batch.push(command.to_vec());
            self.stamp_timestamp_on_last(timestamp);
            self.publish_batch();
            return;
        }

        let Some(handler) = self.handlers[usize::from(message_type)].clone() else {
            self.emit_reject(command, "unhandled message type", timestamp);
            return;
        };

        self.batch.clear();
        let result = {
            let mut ctx = SequencerContext {
                staging: &mut self.staging,
                events: &mut self.batch,
                apps: &mut self.apps,
                entities: &mut self.entities,
                identity,
                timestamp,
            };
            handler.borrow_mut().on_command(command, &mut ctx)
        };

        match result {
            Ok(()) => self.publish_batch(),
            Err(reason) => {
                self.batch.clear();
                self.emit_reject(command, &reason, timestamp);
            }
        }
    }

    fn stamp_timestamp_on_last(&mut self, timestamp: u64) {
        if let Some(event) = self.batch.last_mut() {
            let _ = header::set_timestamp(event, timestamp);
        }
    }

    fn emit_reject(&mut self, command: &[u8], reason: &str, timestamp: u64) {
        debug!("reject: {}", reason);
        let len = match (self.reject)(&mut self.staging, command, reason) {
            Ok(len) => len,
            Err(e) => {
                warn!("reject builder failed: {}", e);
                return;
            }
        };
        if len < header::HEADER_SIZE || len > self.staging.len() {
            warn!("reject builder returned bad length {}", len);
            return;
        }
        let event = &mut self.staging[..len];
        if header::set_application_id(event, SEQUENCER_APPLICATION_ID)
            .and_then(|()| header::set_application_sequence_number(event, 0))
            .and_then(|()| header::set_timestamp(event, timestamp))
            .is_err()
        {
            return;
        }
        self.batch.push(event.to_vec());
        self.publish_batch();
    }

    fn publish_batch(&mut self) {
        for event in self.batch.drain(..) {
            self.event_seq += 1;
            for sink in &mut self.sinks {
                sink.on_event(self.event_seq, &event);
            }
        }
    }
}
