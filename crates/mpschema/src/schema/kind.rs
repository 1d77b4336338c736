// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Value kinds, custom kind markers and container type arguments.

use crate::error::{Result, SchemaError};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Kind of value a field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ValueKind {
    Boolean,
    String,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    Binary,
    List,
    Map,
    Custom,
}

impl ValueKind {
    /// Every kind that may appear as a list element or map key/value.
    pub const SCALARS: [ValueKind; 14] = [
        Self::Boolean,
        Self::String,
        Self::Uint8,
        Self::Uint16,
        Self::Uint32,
        Self::Uint64,
        Self::Int8,
        Self::Int16,
        Self::Int32,
        Self::Int64,
        Self::Float32,
        Self::Float64,
        Self::Binary,
        Self::Custom,
    ];

    /// List or map.
    pub fn is_container(self) -> bool {
        matches!(self, Self::List | Self::Map)
    }

    /// Lowercase name, as used in schema documents.
    pub fn name(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::String => "string",
            Self::Uint8 => "uint8",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Binary => "binary",
            Self::List => "list",
            Self::Map => "map",
            Self::Custom => "custom",
        }
    }

    /// Inverse of [`ValueKind::name`].
    pub fn from_name(name: &str) -> Option<Self> {
        std::iter::once(Self::List)
            .chain(std::iter::once(Self::Map))
            .chain(Self::SCALARS)
            .find(|kind| kind.name() == name)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Marker naming an opaque value kind handled by a registered serializer.
///
/// A trailing `?` denotes the nullable wrapper of the marker without it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct CustomKind(Cow<'static, str>);

impl CustomKind {
    /// Absolute UTC timestamp.
    pub const TIMESTAMP: CustomKind = CustomKind::new("timestamp");
    /// Timestamp carrying its UTC offset.
    pub const TIMESTAMP_OFFSET: CustomKind = CustomKind::new("timestamp-offset");
    /// Signed duration, millisecond resolution.
    pub const DURATION: CustomKind = CustomKind::new("duration");
    pub const NULLABLE_TIMESTAMP: CustomKind = CustomKind::new("timestamp?");
    pub const NULLABLE_TIMESTAMP_OFFSET: CustomKind = CustomKind::new("timestamp-offset?");
    pub const NULLABLE_DURATION: CustomKind = CustomKind::new("duration?");

    const NULLABLE_SUFFIX: char = '?';

    /// Marker from a static name.
    pub const fn new(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// Marker from a runtime name (schema documents, plugins).
    pub fn from_name(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Nullable wrapper of this marker (idempotent).
    pub fn nullable(&self) -> CustomKind {
        if self.is_nullable_wrapper() {
            self.clone()
        } else {
            Self::from_name(format!("{}{}", self.0, Self::NULLABLE_SUFFIX))
        }
    }

    pub fn is_nullable_wrapper(&self) -> bool {
        self.0.ends_with(Self::NULLABLE_SUFFIX)
    }

    /// Wrapped marker if this is a nullable wrapper.
    pub fn wrapped(&self) -> Option<CustomKind> {
        self.0
            .strip_suffix(Self::NULLABLE_SUFFIX)
            .map(|inner| Self::from_name(inner))
    }
}

impl fmt::Display for CustomKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind of a container element, key or value (or of a whole field).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TypeArgument {
    kind: ValueKind,
    custom: Option<CustomKind>,
}

impl TypeArgument {
    /// Non-custom kind. Use [`TypeArgument::custom`] for custom markers.
    pub const fn of(kind: ValueKind) -> Self {
        Self { kind, custom: None }
    }

    pub fn custom(marker: CustomKind) -> Self {
        Self {
            kind: ValueKind::Custom,
            custom: Some(marker),
        }
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn custom_kind(&self) -> Option<&CustomKind> {
        self.custom.as_ref()
    }

    /// Exact match; a nullable-wrapper marker also accepts its wrapped marker.
    pub fn accepts(&self, provided: &TypeArgument) -> bool {
        if self.kind != provided.kind {
            return false;
        }
        match (&self.custom, &provided.custom) {
            (None, None) => true,
            (Some(declared), Some(given)) => {
                declared == given || declared.wrapped().as_ref() == Some(given)
            }
            _ => false,
        }
    }

    /// Whether a null element is representable under this kind.
    pub fn admits_null(&self) -> bool {
        self.custom
            .as_ref()
            .is_some_and(CustomKind::is_nullable_wrapper)
    }

    pub(crate) fn validate_scalar(&self, field: &str) -> Result<()> {
        if self.kind.is_container() {
            return Err(SchemaError::NestedContainer(field.to_string()));
        }
        self.validate_marker(field)
    }

    pub(crate) fn validate_marker(&self, field: &str) -> Result<()> {
        match (self.kind, &self.custom) {
            (ValueKind::Custom, None) => Err(SchemaError::invalid_descriptor(
                field,
                "custom kind without a marker",
            )),
            (ValueKind::Custom, Some(_)) | (_, None) => Ok(()),
            (kind, Some(marker)) => Err(SchemaError::invalid_descriptor(
                field,
                format!("marker `{}` on non-custom kind {}", marker, kind),
            )),
        }
    }
}

impl From<ValueKind> for TypeArgument {
    fn from(kind: ValueKind) -> Self {
        Self::of(kind)
    }
}

impl From<CustomKind> for TypeArgument {
    fn from(marker: CustomKind) -> Self {
        Self::custom(marker)
    }
}

impl fmt::Display for TypeArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.custom {
            Some(marker) => write!(f, "custom({})", marker),
            None => write!(f, "{}", self.kind),
        }
    }
}
