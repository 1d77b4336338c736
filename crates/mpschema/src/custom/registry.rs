// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Custom serializer registry.

use super::{
    DurationSerializer, NullableSerializer, OffsetTimestampSerializer, SerializerResolver,
    TimestampSerializer, TypeSerializer,
};
use crate::error::{Result, SchemaError};
use crate::schema::CustomKind;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Map from custom kind markers to serializers.
///
/// Populate it before sharing; once behind `&` or `Arc` it is read-only.
#[derive(Clone)]
pub struct SerializerRegistry {
    serializers: HashMap<CustomKind, Arc<dyn TypeSerializer>>,
}

impl SerializerRegistry {
    /// Empty registry. [`Default`] pre-registers the built-in kinds.
    pub fn new() -> Self {
        Self {
            serializers: HashMap::new(),
        }
    }

    /// Registry with the timestamp, offset timestamp and duration
    /// serializers plus their nullable wrappers.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(CustomKind::TIMESTAMP, TimestampSerializer);
        registry.register(CustomKind::TIMESTAMP_OFFSET, OffsetTimestampSerializer);
        registry.register(CustomKind::DURATION, DurationSerializer);
        registry.register_nullable(CustomKind::TIMESTAMP);
        registry.register_nullable(CustomKind::TIMESTAMP_OFFSET);
        registry.register_nullable(CustomKind::DURATION);
        registry
    }

    /// Register a serializer, returning the one it replaced.
    pub fn register<S>(&mut self, kind: CustomKind, serializer: S) -> Option<Arc<dyn TypeSerializer>>
    where
        S: TypeSerializer + 'static,
    {
        log::debug!("[registry] registering serializer for `{}`", kind);
        self.serializers.insert(kind, Arc::new(serializer))
    }

    /// Register the nullable wrapper (`kind?`) of an existing kind.
    pub fn register_nullable(&mut self, kind: CustomKind) -> Option<Arc<dyn TypeSerializer>> {
        let wrapper = kind.nullable();
        self.register(wrapper, NullableSerializer::new(kind))
    }

    pub fn contains(&self, kind: &CustomKind) -> bool {
        self.serializers.contains_key(kind)
    }

    pub fn len(&self) -> usize {
        self.serializers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.serializers.is_empty()
    }

    /// Registered markers, sorted.
    pub fn kinds(&self) -> Vec<&CustomKind> {
        let mut kinds: Vec<_> = self.serializers.keys().collect();
        kinds.sort();
        kinds
    }
}

impl Default for SerializerRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl SerializerResolver for SerializerRegistry {
    fn resolve(&self, kind: &CustomKind) -> Result<&dyn TypeSerializer> {
        self.serializers
            .get(kind)
            .map(|serializer| serializer.as_ref())
            .ok_or_else(|| SchemaError::UnregisteredCustomSerializer(kind.clone()))
    }
}

impl fmt::Debug for SerializerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerializerRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}
