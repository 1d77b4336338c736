// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Binary encoding.
//!
//! - [`msgpack`]: MessagePack reader/writer primitives
//! - [`engine`]: walks a schema and encodes or decodes every field

pub mod engine;
pub mod msgpack;

pub use engine::{encode, encode_into, merge_from, merge_from_exact, read_field, write_field};
pub use msgpack::{MsgPackReader, MsgPackWriter};
