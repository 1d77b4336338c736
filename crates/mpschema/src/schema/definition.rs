// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-type schema and per-instance value slots.

use crate::error::{Result, SchemaError};
use crate::schema::FieldDescriptor;
use crate::value::{FieldValue, NULL};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// Produces the default value of one field.
pub type DefaultProvider = Arc<dyn Fn() -> FieldValue + Send + Sync>;

/// Field descriptors and default providers of one schema type.
///
/// Shared by every instance of the type through an `Arc`.
pub struct TypeSchema {
    name: String,
    fields: Vec<FieldDescriptor>,
    defaults: Vec<DefaultProvider>,
}

impl TypeSchema {
    /// Build a schema from descriptors and their default providers.
    ///
    /// Descriptors must carry dense indices `0..n` in order, with exactly
    /// one provider per descriptor.
    pub fn new(
        name: impl Into<String>,
        fields: Vec<FieldDescriptor>,
        defaults: Vec<DefaultProvider>,
    ) -> Result<Arc<Self>> {
        let name = name.into();
        if fields.len() != defaults.len() {
            return Err(SchemaError::invalid_descriptor(
                name,
                format!(
                    "{} fields but {} default providers",
                    fields.len(),
                    defaults.len()
                ),
            ));
        }
        for (position, field) in fields.iter().enumerate() {
            if field.index() != position {
                log::debug!(
                    "[schema] {}: field {} out of order, expected index {}",
                    name,
                    field,
                    position
                );
                return Err(SchemaError::invalid_descriptor(
                    field.name(),
                    format!("index {} where {} was expected", field.index(), position),
                ));
            }
        }

        Ok(Arc::new(Self {
            name,
            fields,
            defaults,
        }))
    }

    pub fn builder(name: impl Into<String>) -> TypeSchemaBuilder {
        TypeSchemaBuilder {
            name: name.into(),
            fields: Vec::new(),
            defaults: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, index: usize) -> Option<&FieldDescriptor> {
        self.fields.get(index)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Invoke the default provider of a field.
    pub fn default_value(&self, index: usize) -> Result<FieldValue> {
        self.defaults
            .get(index)
            .map(|provider| provider())
            .ok_or(SchemaError::UnknownField(index))
    }

    /// Same type name and same descriptors.
    pub fn is_compatible(&self, other: &TypeSchema) -> bool {
        std::ptr::eq(self, other) || (self.name == other.name && self.fields == other.fields)
    }
}

impl fmt::Debug for TypeSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeSchema")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}

/// Fluent construction of a [`TypeSchema`].
///
/// Indices are taken from the descriptors; `build` checks they are dense.
pub struct TypeSchemaBuilder {
    name: String,
    fields: Vec<FieldDescriptor>,
    defaults: Vec<DefaultProvider>,
}

impl TypeSchemaBuilder {
    /// Add a field whose default is the zero value of its kind.
    pub fn field(self, descriptor: FieldDescriptor) -> Self {
        let zero = FieldValue::zero_for(descriptor.declared());
        self.field_with_default(descriptor, move || zero.clone())
    }

    /// Add a field with an explicit default provider.
    pub fn field_with_default<F>(mut self, descriptor: FieldDescriptor, default: F) -> Self
    where
        F: Fn() -> FieldValue + Send + Sync + 'static,
    {
        self.fields.push(descriptor);
        self.defaults.push(Arc::new(default));
        self
    }

    pub fn build(self) -> Result<Arc<TypeSchema>> {
        TypeSchema::new(self.name, self.fields, self.defaults)
    }
}

/// State of one value slot.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Slot {
    /// Never written.
    #[default]
    Unset,
    /// Holds a materialized default.
    Defaulted(FieldValue),
    /// Written by a setter, decode or merge.
    Explicit(FieldValue),
}

impl Slot {
    pub fn value(&self) -> Option<&FieldValue> {
        match self {
            Self::Unset => None,
            Self::Defaulted(value) | Self::Explicit(value) => Some(value),
        }
    }

    pub fn is_set(&self) -> bool {
        !matches!(self, Self::Unset)
    }
}

/// Value slots of one instance, addressed by field index.
///
/// Raw `get`/`set` skip type verification; the typed accessors in
/// [`crate::access`] check values against the descriptors first.
#[derive(Debug, Clone)]
pub struct SchemaDefinition {
    schema: Arc<TypeSchema>,
    slots: Box<[Slot]>,
}

impl SchemaDefinition {
    pub fn new(schema: &Arc<TypeSchema>) -> Self {
        Self {
            schema: Arc::clone(schema),
            slots: vec![Slot::Unset; schema.len()].into_boxed_slice(),
        }
    }

    pub fn schema(&self) -> &Arc<TypeSchema> {
        &self.schema
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        self.schema.fields()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn descriptor(&self, index: usize) -> Result<&FieldDescriptor> {
        self.schema
            .field(index)
            .ok_or(SchemaError::UnknownField(index))
    }

    /// Raw stored value; `None` when unset or out of range.
    pub fn get(&self, index: usize) -> Option<&FieldValue> {
        self.slots.get(index).and_then(Slot::value)
    }

    pub fn slot(&self, index: usize) -> Option<&Slot> {
        self.slots.get(index)
    }

    /// Store without verification and mark the slot set.
    pub fn set(&mut self, index: usize, value: FieldValue) -> Result<()> {
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(SchemaError::UnknownField(index))?;
        *slot = Slot::Explicit(value);
        Ok(())
    }

    /// Replace every slot, in index order.
    pub fn set_all(&mut self, values: Vec<FieldValue>) -> Result<()> {
        if values.len() != self.slots.len() {
            return Err(SchemaError::invalid_descriptor(
                self.schema.name(),
                format!(
                    "{} values given for {} fields",
                    values.len(),
                    self.slots.len()
                ),
            ));
        }
        for (slot, value) in self.slots.iter_mut().zip(values) {
            *slot = Slot::Explicit(value);
        }
        Ok(())
    }

    /// Deep-copy every slot of `other` into this instance and mark all set.
    ///
    /// Slots `other` never set become the default (non-nullable) or null.
    pub fn merge_slots(&mut self, other: &SchemaDefinition) -> Result<()> {
        if !self.schema.is_compatible(&other.schema) {
            return Err(SchemaError::IncompatibleSchema {
                expected: self.schema.name().to_string(),
                found: other.schema.name().to_string(),
            });
        }
        for (index, (slot, source)) in self.slots.iter_mut().zip(other.slots.iter()).enumerate() {
            *slot = match source {
                Slot::Explicit(value) => Slot::Explicit(value.clone()),
                Slot::Defaulted(value) => Slot::Defaulted(value.clone()),
                Slot::Unset if self.schema.fields[index].is_nullable() => {
                    Slot::Explicit(FieldValue::Null)
                }
                Slot::Unset => Slot::Defaulted(self.schema.default_value(index)?),
            };
        }
        Ok(())
    }

    /// Whether the slot has ever been written.
    pub fn is_set(&self, index: usize) -> bool {
        self.slots.get(index).is_some_and(Slot::is_set)
    }

    pub fn default_value(&self, index: usize) -> Result<FieldValue> {
        self.schema.default_value(index)
    }

    /// Reset every slot to unset.
    pub fn clear(&mut self) {
        self.slots.fill(Slot::Unset);
    }

    /// Current value, materializing the default of a never-set non-nullable
    /// field. Unset nullable fields read as null without being stored.
    pub(crate) fn materialize(&mut self, index: usize) -> Result<&FieldValue> {
        let nullable = self.descriptor(index)?.is_nullable();
        if !self.slots[index].is_set() {
            if nullable {
                return Ok(&NULL);
            }
            let value = self.schema.default_value(index)?;
            log::trace!(
                "[schema] {}: materialized default for field {}",
                self.schema.name(),
                index
            );
            self.slots[index] = Slot::Defaulted(value);
        }
        Ok(self.slots[index].value().unwrap_or(&NULL))
    }

    /// Materialize the defaults of every never-set non-nullable field.
    pub(crate) fn materialize_all(&mut self) -> Result<()> {
        for index in 0..self.slots.len() {
            self.materialize(index)?;
        }
        Ok(())
    }

    /// Value a read would observe, without storing a materialized default.
    pub fn peek(&self, index: usize) -> Result<Cow<'_, FieldValue>> {
        let descriptor = self.descriptor(index)?;
        Ok(match self.slots[index].value() {
            Some(value) => Cow::Borrowed(value),
            None if descriptor.is_nullable() => Cow::Borrowed(&NULL),
            None => Cow::Owned(self.schema.default_value(index)?),
        })
    }

    pub(crate) fn store_decoded(&mut self, index: usize, value: FieldValue) {
        self.slots[index] = Slot::Explicit(value);
    }
}

impl PartialEq for SchemaDefinition {
    /// Compares the values reads would observe, so an unset field equals a
    /// field explicitly holding its default.
    fn eq(&self, other: &Self) -> bool {
        self.schema.is_compatible(&other.schema)
            && (0..self.len()).all(|index| match (self.peek(index), other.peek(index)) {
                (Ok(left), Ok(right)) => left == right,
                _ => false,
            })
    }
}
