// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # seqbus-codegen - schema compiler
//!
//! Consumes an XML message schema and produces a self-contained Rust module:
//! one enum per `<enum>`, a zero-copy encoder and decoder per `<message>`,
//! a `<prefix>Schema` facade, a `<prefix>Dispatcher`, and a
//! `<prefix>Provider`. Generation is deterministic; required-field byte
//! offsets are assigned in declaration order from the fixed primitive size
//! table, after the platform header.
//!
//! Typical build-time use (the `seqbus-gen` tool wraps the same calls):
//!
//! ```no_run
//! let xml = std::fs::read_to_string("schemas/match.xml").unwrap();
//! let schema = seqbus_codegen::parse_schema(&xml).unwrap();
//! let code = seqbus_codegen::generate(&schema);
//! std::fs::write("src/messages.rs", code).unwrap();
//! ```

/// Rust code generation.
pub mod generator;
/// Schema model and validation.
pub mod schema;
/// Schema XML parsing.
pub mod xml;

pub use generator::generate;
pub use schema::{EnumDef, EnumValue, Field, FieldType, Message, Schema, SchemaError};
pub use xml::parse_schema;

/// Parse, validate, and generate in one step.
pub fn compile(xml: &str) -> Result<String, SchemaError> {
    let schema = parse_schema(xml)?;
    Ok(generate(&schema))
}
