// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Custom value kinds.
//!
//! Fields of kind `Custom` carry a [`CustomKind`] marker. The engine looks the
//! marker up through a [`SerializerResolver`] and hands the value to the
//! [`TypeSerializer`] registered for it. Built-in serializers cover UTC
//! timestamps, offset timestamps, durations and their nullable wrappers.
//!
//! # Example
//!
//! ```
//! use mpschema::custom::{SerializerRegistry, SerializerResolver};
//! use mpschema::schema::CustomKind;
//!
//! let registry = SerializerRegistry::with_defaults();
//! assert!(registry.resolve(&CustomKind::TIMESTAMP).is_ok());
//! assert!(registry.resolve(&CustomKind::new("money")).is_err());
//! ```

mod duration;
mod nullable;
mod registry;
mod timestamp;

pub use duration::DurationSerializer;
pub use nullable::NullableSerializer;
pub use registry::SerializerRegistry;
pub use timestamp::{OffsetTimestampSerializer, TimestampSerializer};

use crate::codec::msgpack::{MsgPackReader, MsgPackWriter};
use crate::error::{Result, SchemaError};
use crate::schema::CustomKind;
use crate::value::FieldValue;

/// Encodes and decodes the values of one custom kind.
pub trait TypeSerializer: Send + Sync {
    /// Write `value`; fails with `InvalidCustomValue` for a value of another kind.
    fn serialize(
        &self,
        value: &FieldValue,
        writer: &mut MsgPackWriter,
        resolver: &dyn SerializerResolver,
    ) -> Result<()>;

    fn deserialize(
        &self,
        reader: &mut MsgPackReader<'_>,
        resolver: &dyn SerializerResolver,
    ) -> Result<FieldValue>;
}

/// Looks up the serializer for a custom kind.
pub trait SerializerResolver {
    /// Fails with `UnregisteredCustomSerializer` when nothing is registered.
    fn resolve(&self, kind: &CustomKind) -> Result<&dyn TypeSerializer>;
}

/// Re-label a payload decode error with the custom kind being read.
pub(crate) fn within(kind: &CustomKind, err: SchemaError) -> SchemaError {
    match err {
        SchemaError::InvalidBinary { kind: inner, message } => SchemaError::invalid_binary(
            format!("custom({})", kind),
            format!("{}: {}", inner, message),
        ),
        other => other,
    }
}

pub(crate) fn invalid_value(kind: &CustomKind, value: &FieldValue) -> SchemaError {
    SchemaError::InvalidCustomValue {
        kind: kind.clone(),
        found: value.kind_name(),
    }
}
