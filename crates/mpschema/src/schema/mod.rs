// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Schema metadata: value kinds, field descriptors, per-type schemas and
//! per-instance slot storage.
//!
//! # Example
//!
//! ```
//! use mpschema::schema::{FieldDescriptor, SchemaDefinition, TypeSchema, ValueKind};
//!
//! let schema = TypeSchema::builder("Sensor")
//!     .field(FieldDescriptor::scalar("id", 0, ValueKind::Uint32).unwrap())
//!     .field(FieldDescriptor::list("samples", 1, ValueKind::Float64).unwrap())
//!     .build()
//!     .unwrap();
//!
//! let instance = SchemaDefinition::new(&schema);
//! assert_eq!(instance.len(), 2);
//! assert!(!instance.is_set(0));
//! ```

mod definition;
mod field;
mod kind;

pub use definition::{DefaultProvider, SchemaDefinition, Slot, TypeSchema, TypeSchemaBuilder};
pub use field::FieldDescriptor;
pub use kind::{CustomKind, TypeArgument, ValueKind};
