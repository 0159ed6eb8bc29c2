// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Command publishing.
//!
//! A publisher stages one message at a time, stamps the header identity at
//! commit, batches committed messages into a single upstream datagram, and
//! keeps every unacknowledged batch for retransmission until the sequencer
//! echoes the message back on the event stream.

use std::collections::VecDeque;
use std::fmt;

use log::warn;

use crate::codec::header;
use crate::config::{FRAME_PREFIX_SIZE, MAX_MESSAGE_SIZE};

use super::frame;

/// Errors surfaced by publishers and command sinks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishError {
    /// Commit length exceeds the maximum message size.
    MessageTooLarge {
        /// Committed length.
        len: usize,
    },
    /// Commit length smaller than the fixed header.
    MessageTooShort {
        /// Committed length.
        len: usize,
    },
    /// The transport refused the datagram.
    Transport {
        /// Short reason from the sink.
        reason: String,
    },
    /// The publisher has been closed by a transport error.
    Closed,
}

impl fmt::Display for PublishError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MessageTooLarge { len } => {
                write!(f, "message of {} bytes exceeds {}", len, MAX_MESSAGE_SIZE)
            }
            Self::MessageTooShort { len } => {
                write!(f, "message of {} bytes is shorter than the header", len)
            }
            Self::Transport { reason } => write!(f, "transport error: {}", reason),
            Self::Closed => write!(f, "publisher closed"),
        }
    }
}

impl std::error::Error for PublishError {}

/// Where upstream datagrams go (UDP socket, in-process sequencer, test capture).
pub trait CommandSink {
    fn submit(&mut self, datagram: &[u8]) -> Result<(), PublishError>;
}

/// Staged-message publisher contract.
///
/// `acquire` hands out the staging region; `commit` finalizes the staged
/// message and assigns the header identity; `send` transmits everything
/// committed so far in one datagram. Acquiring twice without a commit
/// overwrites the staging region and is only sane in batch use.
pub trait MessagePublisher {
    /// Mutable staging region of at least [`MAX_MESSAGE_SIZE`] bytes.
    fn acquire(&mut self) -> &mut [u8];

    /// Finalize `len` staged bytes: stamp applicationId and the next
    /// applicationSequenceNumber, and queue the message for transmission.
    fn commit(&mut self, len: usize) -> Result<(), PublishError>;

    /// Transmit all pending committed messages atomically.
    fn send(&mut self) -> Result<(), PublishError>;

    /// True iff every committed message has been echoed as an event.
    fn is_current(&self) -> bool;
}

struct Unacked {
    sequence: u32,
    message: Vec<u8>,
}

/// Publisher with MoldUDP64-style batching over a [`CommandSink`].
pub struct BufferedPublisher<S: CommandSink> {
    sink: S,
    application_id: u16,
    last_sequence: u32,
    staging: Box<[u8]>,
    staged: bool,
    pending: Vec<u8>,
    unacked: VecDeque<Unacked>,
    closed: bool,
}

impl<S: CommandSink> BufferedPublisher<S> {
    pub fn new(application_id: u16, sink: S) -> Self {
        Self {
            sink,
            application_id,
            last_sequence: 0,
            staging: vec![0u8; MAX_MESSAGE_SIZE].into_boxed_slice(),
            staged: false,
            pending: Vec::with_capacity(MAX_MESSAGE_SIZE),
            unacked: VecDeque::new(),
            closed: false,
        }
    }

    pub fn application_id(&self) -> u16 {
        self.application_id
    }

    /// Last assigned applicationSequenceNumber (0 before the first commit).
    pub fn last_sequence(&self) -> u32 {
        self.last_sequence
    }

    /// Note an event observed on the bus; acknowledges matching commits.
    ///
    /// Per-publisher FIFO means one echo acknowledges everything up to and
    /// including its sequence.
    pub fn observe_event(&mut self, application_id: u16, sequence: u32) {
        if application_id != self.application_id {
            return;
        }
        while let Some(front) = self.unacked.front() {
            if front.sequence <= sequence {
                self.unacked.pop_front();
            } else {
                break;
            }
        }
    }

    /// Retransmit every unacknowledged message, oldest first.
    ///
    /// Driven by a scheduler task at `RETRANSMIT_INTERVAL` when
    /// `is_current()` stays false.
    pub fn retransmit(&mut self) -> Result<(), PublishError> {
        if self.closed {
            return Err(PublishError::Closed);
        }
        if self.unacked.is_empty() {
            return Ok(());
        }
        let mut datagram = Vec::with_capacity(MAX_MESSAGE_SIZE);
        for entry in &self.unacked {
            if !datagram.is_empty()
                && datagram.len() + FRAME_PREFIX_SIZE + entry.message.len() > MAX_MESSAGE_SIZE
            {
                self.sink.submit(&datagram)?;
                datagram.clear();
            }
            frame::append_frame(&mut datagram, &entry.message)
                .map_err(|_| PublishError::MessageTooLarge {
                    len: entry.message.len(),
                })?;
        }
        if !datagram.is_empty() {
            self.sink.submit(&datagram)?;
        }
        Ok(())
    }
}

impl<S: CommandSink> MessagePublisher for BufferedPublisher<S> {
    fn acquire(&mut self) -> &mut [u8] {
        if self.staged {
            warn!(
                "app {}: acquire before commit overwrites the staging region",
                self.application_id
            );
        }
        self.staged = true;
        &mut self.staging
    }

    fn commit(&mut self, len: usize) -> Result<(), PublishError> {
        if self.closed {
            return Err(PublishError::Closed);
        }
        if len > MAX_MESSAGE_SIZE {
            return Err(PublishError::MessageTooLarge { len });
        }
        if len < header::HEADER_SIZE {
            return Err(PublishError::MessageTooShort { len });
        }

        let sequence = self.last_sequence + 1;
        let message = &mut self.staging[..len];
        // Stamp identity; the sequencer validates these on admission.
        header::set_application_id(message, self.application_id)
            .and_then(|()| header::set_application_sequence_number(message, sequence))
            .map_err(|_| PublishError::MessageTooShort { len })?;

        // Batch into the pending datagram; flush first if it would not fit.
        if !self.pending.is_empty()
            && self.pending.len() + FRAME_PREFIX_SIZE + len > MAX_MESSAGE_SIZE
        {
            self.send()?;
        }
        let message = &self.staging[..len];
        frame::append_frame(&mut self.pending, message)
            .map_err(|_| PublishError::MessageTooLarge { len })?;

        self.last_sequence = sequence;
        self.unacked.push_back(Unacked {
            sequence,
            message: message.to_vec(),
        });
        self.staged = false;
        Ok(())
    }

    fn send(&mut self) -> Result<(), PublishError> {
        if self.closed {
            return Err(PublishError::Closed);
        }
        if self.pending.is_empty() {
            return Ok(());
        }
        match self.sink.submit(&self.pending) {
            Ok(()) => {
                self.pending.clear();
                Ok(())
            }
            Err(e) => {
                // Transport failure closes the publisher; reconnect logic
                // rebuilds it and replays from the unacked queue.
                self.closed = true;
                Err(e)
            }
        }
    }

    fn is_current(&self) -> bool {
        self.pending.is_empty() && self.unacked.is_empty()
    }
}
