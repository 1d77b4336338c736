// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error taxonomy for field access, schema construction and binary encoding.
//!
//! Every failure is local to the call that raised it. Accessor errors never
//! touch the slot they were validating; decode errors leave the fields that
//! were already read in place (decode is not transactional).

use crate::schema::CustomKind;
use thiserror::Error;

/// Errors raised by the schema runtime.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Field index is outside the schema.
    #[error("unknown field with index {0}")]
    UnknownField(usize),

    /// Null assigned to a field that is not nullable.
    #[error("trying to assign a null value to field {0} which is not nullable")]
    FieldNotNullable(usize),

    /// Value kind does not match the declared kind of the field.
    #[error("field {index} accepts {declared} values, given: {provided}")]
    InvalidFieldType {
        index: usize,
        provided: String,
        declared: String,
    },

    /// List accessor used on a field not declared as a list.
    #[error("field {0} is not a list")]
    FieldNotAList(usize),

    /// Map accessor used on a field not declared as a map.
    #[error("field {0} is not a map")]
    FieldNotAMap(usize),

    /// Encoded bytes cannot belong to the kind being read.
    #[error("binary could not be deserialized as {kind}: {message}")]
    InvalidBinary { kind: String, message: String },

    /// No serializer registered for a custom kind (configuration error).
    #[error("type serializer for custom kind `{0}` not found")]
    UnregisteredCustomSerializer(CustomKind),

    /// A custom serializer was handed a value it cannot encode.
    #[error("serializer for `{kind}` cannot encode value {found}")]
    InvalidCustomValue { kind: CustomKind, found: String },

    /// Field descriptor or type schema violates a structural rule.
    #[error("invalid descriptor for `{field}`: {reason}")]
    InvalidDescriptor { field: String, reason: String },

    /// A container declared inside a container.
    #[error("field `{0}` declares a container inside a container")]
    NestedContainer(String),

    /// Whole-instance merge between different schemas.
    #[error("cannot merge an instance of `{found}` into `{expected}`")]
    IncompatibleSchema { expected: String, found: String },

    /// Decoded length header above the configured limit.
    #[error("{what} length {len} exceeds the configured maximum {max}")]
    LimitExceeded {
        what: &'static str,
        len: usize,
        max: usize,
    },

    /// Background encode/decode task did not complete.
    #[cfg(feature = "async")]
    #[error("background task failed: {0}")]
    TaskFailed(String),
}

impl SchemaError {
    pub(crate) fn invalid_binary(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidBinary {
            kind: kind.into(),
            message: message.into(),
        }
    }

    pub(crate) fn invalid_descriptor(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDescriptor {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Errors caused by malformed or hostile input bytes.
    pub fn is_data_error(&self) -> bool {
        matches!(self, Self::InvalidBinary { .. } | Self::LimitExceeded { .. })
    }

    /// Errors caused by how the runtime was set up rather than by data.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::UnregisteredCustomSerializer(_)
                | Self::InvalidDescriptor { .. }
                | Self::NestedContainer(_)
        )
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SchemaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_variants() {
        assert_eq!(
            SchemaError::UnknownField(7).to_string(),
            "unknown field with index 7"
        );
        assert_eq!(
            SchemaError::InvalidFieldType {
                index: 3,
                provided: "string".into(),
                declared: "uint16".into(),
            }
            .to_string(),
            "field 3 accepts uint16 values, given: string"
        );
        assert_eq!(
            SchemaError::UnregisteredCustomSerializer(CustomKind::DURATION).to_string(),
            "type serializer for custom kind `duration` not found"
        );
    }

    #[test]
    fn test_error_classification() {
        let data = SchemaError::invalid_binary("uint8", "unexpected end of buffer");
        assert!(data.is_data_error());
        assert!(!data.is_configuration_error());

        let config = SchemaError::UnregisteredCustomSerializer(CustomKind::TIMESTAMP);
        assert!(config.is_configuration_error());
        assert!(!config.is_data_error());

        assert!(!SchemaError::FieldNotAMap(1).is_data_error());
    }
}
