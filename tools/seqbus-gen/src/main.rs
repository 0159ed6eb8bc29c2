// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Schema compiler CLI.
//!
//! `seqbus-gen <schema.xml> <out.rs>` parses and validates the schema, then
//! writes the generated codec module. Exit code 0 on success; 1 on a usage
//! error, I/O failure, or invalid schema.

use std::env;
use std::path::Path;

use anyhow::Context;

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args: Vec<String> = env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("--help" | "-h" | "help") => print_help(),
        Some(schema_path) if args.len() == 3 => {
            if let Err(e) = run(Path::new(schema_path), Path::new(&args[2])) {
                eprintln!("[ERROR] {:#}", e);
                std::process::exit(1);
            }
        }
        _ => {
            print_help();
            std::process::exit(1);
        }
    }
}

fn run(schema_path: &Path, out_path: &Path) -> anyhow::Result<()> {
    tracing::info!("reading schema {}", schema_path.display());
    let xml = std::fs::read_to_string(schema_path)
        .with_context(|| format!("failed to read {}", schema_path.display()))?;

    let schema = seqbus_codegen::parse_schema(&xml)
        .with_context(|| format!("invalid schema {}", schema_path.display()))?;
    tracing::info!(
        "schema {} v{}: {} messages, {} enums",
        schema.prefix,
        schema.version,
        schema.messages.len(),
        schema.enums.len()
    );

    let code = seqbus_codegen::generate(&schema);
    std::fs::write(out_path, code)
        .with_context(|| format!("failed to write {}", out_path.display()))?;
    tracing::info!("wrote {}", out_path.display());
    Ok(())
}

fn print_help() {
    println!("seqbus-gen");
    println!();
    println!("USAGE:");
    println!("    seqbus-gen <schema.xml> <out.rs>");
    println!();
    println!("Compiles an XML message schema into a Rust codec module");
    println!("(encoders, decoders, schema facade, dispatcher, provider).");
    println!();
    println!("EXAMPLES:");
    println!("    seqbus-gen schemas/match.xml src/messages.rs");
    println!();
}
