// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Platform wiring for the Match schema.
//!
//! Builds a [`BusServer`] that understands the schema's platform messages:
//! the `ApplicationDefinition` handler, the heartbeat echo type, and the
//! `SequencerReject` builder. The matching engine installs on top.

use std::cell::RefCell;
use std::rc::Rc;

use seqbus::sequencer::{
    BusServer, CommandHandler, RejectBuilder, SequencerConfig, SequencerContext,
};

use crate::engine::MatchEngine;
use crate::messages::{
    message_type, ApplicationDefinitionDecoder, ApplicationDefinitionEncoder,
    SequencerRejectEncoder,
};

/// Longest command prefix embedded in a `SequencerReject`; keeps the reject
/// itself within one message buffer.
const MAX_EMBEDDED_COMMAND: usize = 512;

/// Handles `ApplicationDefinition`: assigns the id and echoes the definition.
pub struct ApplicationDefinitionHandler;

impl CommandHandler for ApplicationDefinitionHandler {
    fn on_command(
        &mut self,
        command: &[u8],
        ctx: &mut SequencerContext<'_>,
    ) -> Result<(), String> {
        let mut decoder = ApplicationDefinitionDecoder::wrap(command).map_err(|e| e.to_string())?;
        let raw = decoder
            .name()
            .map_err(|e| e.to_string())?
            .ok_or("missing application name")?;
        let name = std::str::from_utf8(raw)
            .map_err(|_| "application name is not valid UTF-8")?
            .to_string();

        ctx.define_application(&name);
        let mut encoder =
            ApplicationDefinitionEncoder::wrap(ctx.acquire()).map_err(|e| e.to_string())?;
        encoder.set_name(name.as_bytes()).map_err(|e| e.to_string())?;
        let length = encoder.encoded_length();
        ctx.commit(length)
    }
}

/// Sequencer configuration for this schema.
pub fn sequencer_config() -> SequencerConfig {
    SequencerConfig {
        application_definition_type: message_type::APPLICATION_DEFINITION,
        heartbeat_type: Some(message_type::HEARTBEAT),
    }
}

/// Builds `SequencerReject` events embedding the offending command.
pub fn reject_builder() -> RejectBuilder {
    Box::new(|staging, command, reason| {
        let mut encoder = SequencerRejectEncoder::wrap(staging).map_err(|e| e.to_string())?;
        encoder
            .set_reason(reason.as_bytes())
            .map_err(|e| e.to_string())?;
        let embedded = &command[..command.len().min(MAX_EMBEDDED_COMMAND)];
        encoder.set_command(embedded).map_err(|e| e.to_string())?;
        Ok(encoder.encoded_length())
    })
}

/// A bus server wired for this schema, with the matching engine installed.
///
/// Returns the server plus a handle to the engine for inspection.
pub fn bus_server() -> (BusServer, Rc<RefCell<MatchEngine>>) {
    let mut server = BusServer::new(sequencer_config(), reject_builder());
    let engine = install(&mut server);
    (server, engine)
}

/// Register the platform handlers and the matching engine on `server`.
pub fn install(server: &mut BusServer) -> Rc<RefCell<MatchEngine>> {
    server.register_handler(
        message_type::APPLICATION_DEFINITION,
        Rc::new(RefCell::new(ApplicationDefinitionHandler)),
    );
    let engine = Rc::new(RefCell::new(MatchEngine::new()));
    server.register_handler(message_type::EQUITY_DEFINITION, engine.clone());
    server.register_handler(message_type::ADD_ORDER_COMMAND, engine.clone());
    server.register_handler(message_type::CANCEL_ORDER_COMMAND, engine.clone());
    engine
}
