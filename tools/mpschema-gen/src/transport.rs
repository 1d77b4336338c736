// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Line transport: each non-blank line is base64 of one JSON document.
//!
//! A valid document is answered with `ok` and ends the session. A bad one
//! is answered with `error: <message>` and the next line is read.

use crate::convert;
use crate::input::GenerateInput;
use anyhow::{Context, Result};
use base64::{engine::general_purpose, Engine as _};
use mpschema::TypeSchema;
use std::fmt;
use std::io::{BufRead, Write};
use std::sync::Arc;

/// Answer to one input line.
#[derive(Debug)]
pub enum Reply {
    Ok(Vec<Arc<TypeSchema>>),
    Error(String),
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Ok(_) => write!(f, "ok"),
            Reply::Error(message) => write!(f, "error: {}", message),
        }
    }
}

/// Decode base64 -> UTF-8 -> JSON.
pub fn decode_document(line: &str) -> Result<GenerateInput> {
    let raw = general_purpose::STANDARD
        .decode(line.trim())
        .context("input is not valid base64")?;
    let json = String::from_utf8(raw).context("decoded input is not UTF-8")?;
    GenerateInput::from_json(&json).context("input is not a valid generate document")
}

/// Handle one line; `None` for a blank line.
pub fn handle_line(line: &str) -> Option<Reply> {
    if line.trim().is_empty() {
        return None;
    }
    let outcome = decode_document(line).and_then(|input| convert::schemas(&input));
    Some(match outcome {
        Ok(schemas) => Reply::Ok(schemas),
        Err(e) => Reply::Error(format!("{:#}", e)),
    })
}

/// Read lines until one is accepted, writing a reply for each.
///
/// Returns the accepted schemas, or `None` when input ends first.
pub fn serve<R: BufRead, W: Write>(input: R, mut output: W) -> Result<Option<Vec<Arc<TypeSchema>>>> {
    for line in input.lines() {
        let line = line.context("failed to read input line")?;
        let Some(reply) = handle_line(&line) else {
            continue;
        };
        writeln!(output, "{}", reply)?;
        output.flush()?;
        match reply {
            Reply::Ok(schemas) => return Ok(Some(schemas)),
            Reply::Error(message) => tracing::warn!("rejected input: {}", message),
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const DOCUMENT: &str = r#"{
        "root": ".",
        "packages": [{
            "name": "demo", "path": "demo", "importTypeIds": [], "subPackages": [],
            "files": [{
                "id": "f", "path": "demo/point.mpc", "version": 1,
                "types": [{ "id": "t", "name": "Point", "modifier": "", "fields": [
                    { "name": "x", "index": 0,
                      "type": { "nullable": false, "primitive": "int32", "typeArguments": null, "typeName": "" } },
                    { "name": "y", "index": 1,
                      "type": { "nullable": false, "primitive": "int32", "typeArguments": null, "typeName": "" } }
                ]}]
            }]
        }]
    }"#;

    fn encoded(json: &str) -> String {
        general_purpose::STANDARD.encode(json)
    }

    #[test]
    fn test_blank_lines_ignored() {
        assert!(handle_line("").is_none());
        assert!(handle_line("   ").is_none());
    }

    #[test]
    fn test_valid_document() {
        let reply = handle_line(&encoded(DOCUMENT)).expect("reply");
        assert_eq!(reply.to_string(), "ok");
        match reply {
            Reply::Ok(schemas) => assert_eq!(schemas[0].name(), "demo.Point"),
            Reply::Error(message) => panic!("unexpected error: {message}"),
        }
    }

    #[test]
    fn test_invalid_base64() {
        let reply = handle_line("not base64!").expect("reply");
        assert!(reply.to_string().starts_with("error: input is not valid base64"));
    }

    #[test]
    fn test_serve_recovers_after_error() {
        let stdin = format!(
            "{}\n\n{}\n{}\n",
            encoded("{}"),
            encoded(DOCUMENT),
            encoded(DOCUMENT)
        );
        let mut stdout = Vec::new();
        let schemas = serve(Cursor::new(stdin), &mut stdout)
            .expect("serve")
            .expect("accepted");
        assert_eq!(schemas.len(), 1);

        let replies = String::from_utf8(stdout).expect("utf8");
        let lines: Vec<&str> = replies.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("error: "));
        assert_eq!(lines[1], "ok");
    }

    #[test]
    fn test_serve_end_of_input() {
        let mut stdout = Vec::new();
        let accepted = serve(Cursor::new("\n"), &mut stdout).expect("serve");
        assert!(accepted.is_none());
        assert!(stdout.is_empty());
    }
}
