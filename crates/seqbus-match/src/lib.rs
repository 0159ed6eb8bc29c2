// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # seqbus-match - matching engine on the seqbus pipeline
//!
//! A per-instrument central-limit-order-book application: commands arrive
//! through the sequencer, the engine validates and matches in strict
//! price-then-time priority, and every outcome (accept, fill, cancel,
//! reject) is an event on the bus.
//!
//! The message layer lives in [`messages`], generated by `seqbus-gen` from
//! `schemas/match.xml` and checked in.

/// Price-time-priority order books.
pub mod book;
/// Command handlers and matching.
pub mod engine;
/// Generated Match schema codecs.
pub mod messages;
/// Sequencer wiring for this schema.
pub mod platform;

pub use book::{InstrumentBook, Order, SideBook};
pub use engine::MatchEngine;
pub use messages::{MatchDispatcher, MatchProvider, MatchSchema, Side};
pub use platform::{bus_server, install, reject_builder, sequencer_config};
