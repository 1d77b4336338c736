// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Contract implemented by generated types.
//!
//! A generated type owns one [`SchemaDefinition`] and exposes it through the
//! two required methods; encoding, decoding and merging come for free.
//! Property accessors are thin wrappers over the typed accessors of
//! [`SchemaDefinition`].
//!
//! # Example
//!
//! ```
//! use mpschema::prelude::*;
//! use std::sync::{Arc, OnceLock};
//!
//! fn schema() -> &'static Arc<TypeSchema> {
//!     static SCHEMA: OnceLock<Arc<TypeSchema>> = OnceLock::new();
//!     SCHEMA.get_or_init(|| {
//!         TypeSchema::builder("Greeting")
//!             .field(FieldDescriptor::scalar("text", 0, ValueKind::String).unwrap())
//!             .build()
//!             .unwrap()
//!     })
//! }
//!
//! struct Greeting(SchemaDefinition);
//!
//! impl Default for Greeting {
//!     fn default() -> Self {
//!         Self(SchemaDefinition::new(schema()))
//!     }
//! }
//!
//! impl SchemaType for Greeting {
//!     fn schema_definition(&self) -> &SchemaDefinition {
//!         &self.0
//!     }
//!     fn schema_definition_mut(&mut self) -> &mut SchemaDefinition {
//!         &mut self.0
//!     }
//! }
//!
//! let registry = SerializerRegistry::default();
//! let mut hello = Greeting::default();
//! hello.0.set_value(0, "hello").unwrap();
//! let bytes = hello.encode(&registry).unwrap();
//! assert_eq!(bytes, b"\xa5hello");
//!
//! let mut copy = Greeting::decode(&bytes, &registry).unwrap();
//! assert_eq!(copy.0.get_value::<String>(0).unwrap(), "hello");
//! ```

use crate::codec::engine;
use crate::config::DecodeLimits;
use crate::custom::SerializerResolver;
use crate::error::Result;
use crate::schema::SchemaDefinition;

/// Instance backed by a [`SchemaDefinition`].
pub trait SchemaType {
    fn schema_definition(&self) -> &SchemaDefinition;

    fn schema_definition_mut(&mut self) -> &mut SchemaDefinition;

    /// Encode every field in index order.
    fn encode(&mut self, resolver: &dyn SerializerResolver) -> Result<Vec<u8>> {
        engine::encode(self.schema_definition_mut(), resolver)
    }

    /// Decode `bytes` over the current values with the default limits.
    fn merge_from(&mut self, bytes: &[u8], resolver: &dyn SerializerResolver) -> Result<()> {
        self.merge_from_with(bytes, resolver, DecodeLimits::default())
    }

    fn merge_from_with(
        &mut self,
        bytes: &[u8],
        resolver: &dyn SerializerResolver,
        limits: DecodeLimits,
    ) -> Result<()> {
        engine::merge_from(self.schema_definition_mut(), bytes, resolver, limits).map(|_| ())
    }

    /// Deep-copy every field of `other` into `self`.
    fn merge_using(&mut self, other: &Self) -> Result<()>
    where
        Self: Sized,
    {
        self.schema_definition_mut()
            .merge_slots(other.schema_definition())
    }

    /// Fresh instance decoded from `bytes`.
    fn decode(bytes: &[u8], resolver: &dyn SerializerResolver) -> Result<Self>
    where
        Self: Default + Sized,
    {
        let mut instance = Self::default();
        instance.merge_from(bytes, resolver)?;
        Ok(instance)
    }
}

impl SchemaType for SchemaDefinition {
    fn schema_definition(&self) -> &SchemaDefinition {
        self
    }

    fn schema_definition_mut(&mut self) -> &mut SchemaDefinition {
        self
    }
}
