// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Encode and decode on tokio's blocking pool.
//!
//! The instance moves into the task and is handed back with the result.

use crate::custom::SerializerRegistry;
use crate::error::{Result, SchemaError};
use crate::schema_type::SchemaType;
use std::sync::Arc;

/// Encode `value` on the blocking pool, returning it with its bytes.
pub async fn encode_async<T>(mut value: T, registry: Arc<SerializerRegistry>) -> Result<(T, Vec<u8>)>
where
    T: SchemaType + Send + 'static,
{
    tokio::task::spawn_blocking(move || -> Result<(T, Vec<u8>)> {
        let bytes = value.encode(&*registry)?;
        Ok((value, bytes))
    })
    .await
    .map_err(|e| SchemaError::TaskFailed(e.to_string()))?
}

/// Merge `bytes` into `value` on the blocking pool.
pub async fn merge_from_async<T>(
    mut value: T,
    bytes: Vec<u8>,
    registry: Arc<SerializerRegistry>,
) -> Result<T>
where
    T: SchemaType + Send + 'static,
{
    tokio::task::spawn_blocking(move || -> Result<T> {
        value.merge_from(&bytes, &*registry)?;
        Ok(value)
    })
    .await
    .map_err(|e| SchemaError::TaskFailed(e.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldDescriptor, SchemaDefinition, TypeSchema, ValueKind};

    #[tokio::test]
    async fn test_async_roundtrip() {
        let schema = TypeSchema::builder("Async")
            .field(FieldDescriptor::scalar("n", 0, ValueKind::Int64).expect("n"))
            .build()
            .expect("schema");
        let registry = Arc::new(SerializerRegistry::default());

        let mut source = SchemaDefinition::new(&schema);
        source.set_value(0, -70_000i64).expect("set");

        let (source, bytes) = encode_async(source, Arc::clone(&registry))
            .await
            .expect("encode");
        let decoded = merge_from_async(SchemaDefinition::new(&schema), bytes, registry)
            .await
            .expect("merge");
        assert_eq!(decoded, source);
    }
}
