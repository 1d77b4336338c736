// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! mpschema-gen CLI
//!
//! ```bash
//! # base64 documents on stdin, one per line
//! echo "$DOC_B64" | mpschema-gen
//!
//! # plain JSON document from a file, logging every schema
//! RUST_LOG=debug mpschema-gen --input types.json --dump
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use mpschema::TypeSchema;
use mpschema_gen::{convert, input::GenerateInput, transport};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Validate mpschema type descriptions
#[derive(Parser, Debug)]
#[command(name = "mpschema-gen")]
#[command(version)]
struct Args {
    /// Read one JSON document from FILE instead of base64 lines on stdin
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Log every resulting schema
    #[arg(long)]
    dump: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let schemas = match &args.input {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let input = GenerateInput::from_json(&json)
                .with_context(|| format!("failed to parse {}", path.display()))?;
            let schemas = convert::schemas(&input)?;
            println!("ok");
            schemas
        }
        None => {
            let stdin = io::stdin();
            match transport::serve(stdin.lock(), io::stdout().lock())? {
                Some(schemas) => schemas,
                None => {
                    tracing::info!("input closed before a document was accepted");
                    return Ok(());
                }
            }
        }
    };

    tracing::info!("validated {} types", schemas.len());
    if args.dump {
        dump(&schemas)?;
    }
    Ok(())
}

fn dump(schemas: &[Arc<TypeSchema>]) -> Result<()> {
    for schema in schemas {
        let fields = serde_json::to_string(schema.fields())
            .with_context(|| format!("failed to serialize {}", schema.name()))?;
        tracing::info!("{}: {}", schema.name(), fields);
    }
    Ok(())
}
