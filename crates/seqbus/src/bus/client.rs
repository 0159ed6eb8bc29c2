// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Event-stream client.
//!
//! Splits downstream packets into events, tracks the global event sequence,
//! and feeds every event to an [`EventHandler`] (the generated dispatcher
//! implements it). A gap in the sequence is reported once per packet; replay
//! itself happens at the transport layer.

use log::warn;

use super::frame::{self, FrameError};

/// Consumer of sequenced events; implemented by generated dispatchers.
pub trait EventHandler {
    fn on_event(&mut self, buffer: &[u8]);
}

impl<F: FnMut(&[u8])> EventHandler for F {
    fn on_event(&mut self, buffer: &[u8]) {
        self(buffer);
    }
}

/// Per-subscriber event stream state.
pub struct BusClient<H: EventHandler> {
    handler: H,
    next_event_seq: u64,
    gaps: u64,
}

impl<H: EventHandler> BusClient<H> {
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            next_event_seq: 1,
            gaps: 0,
        }
    }

    /// Next global event sequence this client expects.
    pub fn next_event_seq(&self) -> u64 {
        self.next_event_seq
    }

    /// Count of sequence gaps observed so far.
    pub fn gaps(&self) -> u64 {
        self.gaps
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    /// Process one downstream packet.
    ///
    /// Packets replaying already-seen sequences are skipped message by
    /// message; packets beyond the expected sequence are dispatched anyway
    /// after recording the gap, so one lost datagram does not stall the
    /// subscriber.
    pub fn on_packet(&mut self, datagram: &[u8]) -> Result<(), FrameError> {
        let (first_seq, count, region) = frame::read_downstream_header(datagram)?;
        if first_seq > self.next_event_seq {
            self.gaps += 1;
            warn!(
                "event stream gap: expected {}, packet starts at {}",
                self.next_event_seq, first_seq
            );
        }

        let mut seq = first_seq;
        let mut seen: u16 = 0;
        for framed in frame::FrameIter::new(region) {
            let message = framed?;
            if seq >= self.next_event_seq {
                self.handler.on_event(message);
                self.next_event_seq = seq + 1;
            }
            seq += 1;
            seen += 1;
        }
        if seen != count {
            warn!("downstream packet declared {} events, held {}", count, seen);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DOWNSTREAM_HEADER_SIZE;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn packet(first_seq: u64, events: &[&[u8]]) -> Vec<u8> {
        let mut out = vec![0u8; DOWNSTREAM_HEADER_SIZE];
        for event in events {
            frame::append_frame(&mut out, event).expect("Append should succeed");
        }
        frame::write_downstream_header(&mut out, first_seq, events.len() as u16);
        out
    }

    #[test]
    fn test_events_dispatched_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut client = BusClient::new(move |buf: &[u8]| {
            sink.borrow_mut().push(buf.to_vec());
        });

        client
            .on_packet(&packet(1, &[b"a", b"b"]))
            .expect("Packet should parse");
        client
            .on_packet(&packet(3, &[b"c"]))
            .expect("Packet should parse");

        assert_eq!(client.next_event_seq(), 4);
        assert_eq!(client.gaps(), 0);
        assert_eq!(
            *seen.borrow(),
            vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]
        );
    }

    #[test]
    fn test_replayed_events_skipped() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut client = BusClient::new(move |buf: &[u8]| {
            sink.borrow_mut().push(buf.to_vec());
        });

        client
            .on_packet(&packet(1, &[b"a", b"b"]))
            .expect("Packet should parse");
        // Retransmission of 2 plus the new 3.
        client
            .on_packet(&packet(2, &[b"b", b"c"]))
            .expect("Packet should parse");

        assert_eq!(
            *seen.borrow(),
            vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]
        );
    }

    #[test]
    fn test_gap_recorded_but_stream_continues() {
        let mut client = BusClient::new(|_buf: &[u8]| {});
        client
            .on_packet(&packet(1, &[b"a"]))
            .expect("Packet should parse");
        client
            .on_packet(&packet(5, &[b"e"]))
            .expect("Packet should parse");
        assert_eq!(client.gaps(), 1);
        assert_eq!(client.next_event_seq(), 6);
    }

    #[test]
    fn test_truncated_packet_is_error() {
        let mut client = BusClient::new(|_buf: &[u8]| {});
        let mut bad = packet(1, &[b"abc"]);
        bad.truncate(bad.len() - 1);
        assert!(client.on_packet(&bad).is_err());
    }
}
