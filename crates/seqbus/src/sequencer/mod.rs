// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The sequencer: linearizes commands into the authoritative event stream.
//!
//! One [`BusServer`] per bus. Applications are defined by name on first
//! contact, commands are admitted strictly in per-application sequence, and
//! every admission failure becomes a reject event addressed back to the
//! peer; the server itself never aborts.

/// Application registry (name -> id, per-app sequencing).
pub mod apps;
/// Entity index for foreign-key resolution.
pub mod entities;
/// Command admission and event publication.
pub mod server;

pub use apps::AppRegistry;
pub use entities::EntityIndex;
pub use server::{
    BusServer, CommandHandler, EventSink, RejectBuilder, SequencerConfig, SequencerContext,
};
