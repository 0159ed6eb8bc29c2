// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Message pipeline contracts: publisher, datagram framing, event client.
//!
//! Commands travel publisher -> sequencer; events travel sequencer -> every
//! subscriber. Per publisher, commit order equals wire order equals event
//! order equals dispatch order.

/// Event-stream client with gap tracking.
pub mod client;
/// Length-prefixed datagram framing.
pub mod frame;
/// Command staging, batching, and retransmission.
pub mod publisher;

pub use client::{BusClient, EventHandler};
pub use frame::{FrameError, FrameIter};
pub use publisher::{BufferedPublisher, CommandSink, MessagePublisher, PublishError};
