// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # mpschema - schema-driven MessagePack objects
//!
//! Types are described at runtime by a list of field descriptors (name,
//! positional index, nullability, value kind, container element kinds).
//! Instances store one value slot per field and are encoded to, and merged
//! from, a compact MessagePack stream with no per-field tags.
//!
//! ## Quick Start
//!
//! ```rust
//! use mpschema::prelude::*;
//!
//! fn main() -> mpschema::Result<()> {
//!     let schema = TypeSchema::builder("Reading")
//!         .field(FieldDescriptor::scalar("sensor", 0, ValueKind::String)?)
//!         .field(FieldDescriptor::list("samples", 1, ValueKind::Float32)?)
//!         .field(FieldDescriptor::scalar("quality", 2, ValueKind::Uint8)?.nullable())
//!         .build()?;
//!     let registry = SerializerRegistry::default();
//!
//!     let mut reading = SchemaDefinition::new(&schema);
//!     reading.set_value(0, "thermo-1")?;
//!     reading.set_list(1, [20.5f32, 21.0])?;
//!     let bytes = reading.encode(&registry)?;
//!
//!     let mut decoded = SchemaDefinition::new(&schema);
//!     decoded.merge_from(&bytes, &registry)?;
//!     assert_eq!(decoded.get_value::<String>(0)?, "thermo-1");
//!     assert_eq!(decoded.get_value::<Option<u8>>(2)?, None);
//!     Ok(())
//! }
//! ```
//!
//! ## Layout
//!
//! ```text
//! +-------------------------------------------------------------+
//! |  SchemaType (generated types)  |  access (typed get/set)    |
//! +-------------------------------------------------------------+
//! |  schema: FieldDescriptor, TypeSchema, SchemaDefinition      |
//! +-------------------------------------------------------------+
//! |  codec::engine (kind table)    |  custom (serializer registry) |
//! +-------------------------------------------------------------+
//! |  codec::msgpack (reader / writer, DecodeLimits)             |
//! +-------------------------------------------------------------+
//! ```
//!
//! ## Features
//!
//! - `async`: [`asynchronous::encode_async`] / [`asynchronous::merge_from_async`]
//!   on tokio's blocking pool
//! - `serde`: `Serialize`/`Deserialize` for schema metadata

pub mod access;
#[cfg(feature = "async")]
pub mod asynchronous;
pub mod codec;
pub mod config;
pub mod custom;
pub mod error;
pub mod schema;
pub mod schema_type;
pub mod value;

pub use access::{FieldType, IntoField};
pub use config::DecodeLimits;
pub use custom::{SerializerRegistry, SerializerResolver, TypeSerializer};
pub use error::{Result, SchemaError};
pub use schema::{
    CustomKind, DefaultProvider, FieldDescriptor, SchemaDefinition, Slot, TypeArgument,
    TypeSchema, TypeSchemaBuilder, ValueKind,
};
pub use schema_type::SchemaType;
pub use value::{CustomValue, FieldMap, FieldValue, OpaqueValue};

/// Common imports for generated types.
pub mod prelude {
    pub use crate::access::{FieldType, IntoField};
    pub use crate::custom::{SerializerRegistry, SerializerResolver};
    pub use crate::schema::{
        CustomKind, FieldDescriptor, SchemaDefinition, TypeSchema, ValueKind,
    };
    pub use crate::schema_type::SchemaType;
    pub use crate::value::FieldValue;
}

