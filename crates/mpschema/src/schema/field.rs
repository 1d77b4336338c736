// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Field descriptors.

use crate::error::{Result, SchemaError};
use crate::schema::{CustomKind, TypeArgument, ValueKind};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;

/// Immutable metadata for one field of a schema type.
///
/// The index doubles as the slot address and the wire position.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FieldDescriptor {
    name: String,
    index: usize,
    nullable: bool,
    declared: TypeArgument,
    type_arguments: Vec<TypeArgument>,
}

impl FieldDescriptor {
    /// Create a descriptor from raw parts, validating every structural rule.
    pub fn new(
        name: impl Into<String>,
        index: usize,
        nullable: bool,
        value_kind: ValueKind,
        custom_kind: Option<CustomKind>,
        type_arguments: Vec<TypeArgument>,
    ) -> Result<Self> {
        let name = name.into();
        let declared = TypeArgument::of(value_kind);
        let declared = match custom_kind {
            Some(marker) if value_kind == ValueKind::Custom => TypeArgument::custom(marker),
            Some(marker) => {
                return Err(SchemaError::invalid_descriptor(
                    name,
                    format!("marker `{}` on non-custom kind {}", marker, value_kind),
                ))
            }
            None => declared,
        };
        declared.validate_marker(&name)?;

        let arity = match value_kind {
            ValueKind::List => 1,
            ValueKind::Map => 2,
            _ => 0,
        };
        if type_arguments.len() != arity {
            log::debug!(
                "[schema] field `{}` ({}) has {} type arguments, expected {}",
                name,
                value_kind,
                type_arguments.len(),
                arity
            );
            return Err(SchemaError::invalid_descriptor(
                name,
                format!(
                    "{} requires {} type arguments, got {}",
                    value_kind,
                    arity,
                    type_arguments.len()
                ),
            ));
        }
        for argument in &type_arguments {
            argument.validate_scalar(&name)?;
        }

        Ok(Self {
            name,
            index,
            nullable,
            declared,
            type_arguments,
        })
    }

    /// Scalar field of a built-in kind.
    pub fn scalar(name: impl Into<String>, index: usize, kind: ValueKind) -> Result<Self> {
        Self::new(name, index, false, kind, None, Vec::new())
    }

    /// Field of a custom kind.
    pub fn custom(name: impl Into<String>, index: usize, marker: CustomKind) -> Self {
        Self {
            name: name.into(),
            index,
            nullable: false,
            declared: TypeArgument::custom(marker),
            type_arguments: Vec::new(),
        }
    }

    /// List field.
    pub fn list(
        name: impl Into<String>,
        index: usize,
        element: impl Into<TypeArgument>,
    ) -> Result<Self> {
        Self::new(
            name,
            index,
            false,
            ValueKind::List,
            None,
            vec![element.into()],
        )
    }

    /// Map field.
    pub fn map(
        name: impl Into<String>,
        index: usize,
        key: impl Into<TypeArgument>,
        value: impl Into<TypeArgument>,
    ) -> Result<Self> {
        Self::new(
            name,
            index,
            false,
            ValueKind::Map,
            None,
            vec![key.into(), value.into()],
        )
    }

    /// Mark as nullable.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn value_kind(&self) -> ValueKind {
        self.declared.kind()
    }

    pub fn custom_kind(&self) -> Option<&CustomKind> {
        self.declared.custom_kind()
    }

    /// Declared kind (with marker for custom fields).
    pub fn declared(&self) -> &TypeArgument {
        &self.declared
    }

    pub fn type_arguments(&self) -> &[TypeArgument] {
        &self.type_arguments
    }

    /// Element kind of a list field.
    pub fn element(&self) -> Option<&TypeArgument> {
        match self.value_kind() {
            ValueKind::List => self.type_arguments.first(),
            _ => None,
        }
    }

    /// Key and value kinds of a map field.
    pub fn key_value(&self) -> Option<(&TypeArgument, &TypeArgument)> {
        match (self.value_kind(), self.type_arguments.as_slice()) {
            (ValueKind::Map, [key, value]) => Some((key, value)),
            _ => None,
        }
    }
}

impl fmt::Display for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{} ({})",
            self.name,
            if self.nullable { "?" } else { "" },
            self.index
        )
    }
}
