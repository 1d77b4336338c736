// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::{SerializerResolver, TypeSerializer};
use crate::codec::msgpack::{MsgPackReader, MsgPackWriter};
use crate::error::Result;
use crate::schema::CustomKind;
use crate::value::FieldValue;

/// Nullable wrapper: nil for null, otherwise the wrapped kind's encoding.
///
/// The wrapped serializer is resolved on every call, so it may be registered
/// after the wrapper.
#[derive(Debug, Clone)]
pub struct NullableSerializer {
    inner: CustomKind,
}

impl NullableSerializer {
    pub fn new(inner: CustomKind) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &CustomKind {
        &self.inner
    }
}

impl TypeSerializer for NullableSerializer {
    fn serialize(
        &self,
        value: &FieldValue,
        writer: &mut MsgPackWriter,
        resolver: &dyn SerializerResolver,
    ) -> Result<()> {
        if value.is_null() {
            writer.write_nil();
            return Ok(());
        }
        resolver.resolve(&self.inner)?.serialize(value, writer, resolver)
    }

    fn deserialize(
        &self,
        reader: &mut MsgPackReader<'_>,
        resolver: &dyn SerializerResolver,
    ) -> Result<FieldValue> {
        if reader.try_read_nil() {
            return Ok(FieldValue::Null);
        }
        resolver.resolve(&self.inner)?.deserialize(reader, resolver)
    }
}
