// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Platform constants - single source of truth.
//!
//! Wire geometry, batching limits, and timing defaults live here; nothing
//! else in the tree hardcodes these values.

use std::time::Duration;

/// Maximum encoded message size in bytes.
///
/// Chosen so a full command batch fits one MoldUDP64 payload on a standard
/// 1500-byte MTU after IP/UDP/Mold headers.
pub const MAX_MESSAGE_SIZE: usize = 1450;

/// Per-message length prefix inside a packed datagram.
pub const FRAME_PREFIX_SIZE: usize = 2;

/// Downstream packet header: event sequence (u64) + message count (u16).
pub const DOWNSTREAM_HEADER_SIZE: usize = 10;

/// How long a publisher waits for an echo before retransmitting a batch.
pub const RETRANSMIT_INTERVAL: Duration = Duration::from_millis(250);

/// Selector readiness-event capacity per poll call.
pub const SELECTOR_EVENT_CAPACITY: usize = 128;

/// Below this remaining-time threshold the event loop spins instead of
/// parking in the selector.
pub const SPIN_THRESHOLD: Duration = Duration::from_millis(1);

/// Application id reserved for the sequencer itself.
pub const SEQUENCER_APPLICATION_ID: u16 = 1;

/// First application id handed out to a defined application.
pub const FIRST_APPLICATION_ID: u16 = 2;
