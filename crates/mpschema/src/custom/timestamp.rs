// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Timestamp serializers.
//!
//! Both encode as a two-element array `[unix seconds, offset seconds]`.
//! Sub-second precision is dropped on encode.

use super::{invalid_value, within, SerializerResolver, TypeSerializer};
use crate::codec::msgpack::{MsgPackReader, MsgPackWriter};
use crate::error::{Result, SchemaError};
use crate::schema::CustomKind;
use crate::value::{CustomValue, FieldValue};
use chrono::{DateTime, FixedOffset, Utc};

const TIMESTAMP_ARITY: usize = 2;

/// `timestamp`: UTC instant, offset element always 0.
#[derive(Debug, Default, Clone, Copy)]
pub struct TimestampSerializer;

impl TypeSerializer for TimestampSerializer {
    fn serialize(
        &self,
        value: &FieldValue,
        writer: &mut MsgPackWriter,
        _resolver: &dyn SerializerResolver,
    ) -> Result<()> {
        let FieldValue::Custom(CustomValue::Timestamp(instant)) = value else {
            return Err(invalid_value(&CustomKind::TIMESTAMP, value));
        };
        writer.write_array_header(TIMESTAMP_ARITY)?;
        writer.write_int(instant.timestamp());
        writer.write_int(0);
        Ok(())
    }

    fn deserialize(
        &self,
        reader: &mut MsgPackReader<'_>,
        _resolver: &dyn SerializerResolver,
    ) -> Result<FieldValue> {
        let kind = &CustomKind::TIMESTAMP;
        let (seconds, _) = read_pair(reader, kind)?;
        let instant = from_unix_seconds(seconds, kind)?;
        Ok(FieldValue::Custom(CustomValue::Timestamp(instant)))
    }
}

/// `timestamp-offset`: instant plus the UTC offset it was observed at.
#[derive(Debug, Default, Clone, Copy)]
pub struct OffsetTimestampSerializer;

impl TypeSerializer for OffsetTimestampSerializer {
    fn serialize(
        &self,
        value: &FieldValue,
        writer: &mut MsgPackWriter,
        _resolver: &dyn SerializerResolver,
    ) -> Result<()> {
        let FieldValue::Custom(CustomValue::OffsetTimestamp(instant)) = value else {
            return Err(invalid_value(&CustomKind::TIMESTAMP_OFFSET, value));
        };
        writer.write_array_header(TIMESTAMP_ARITY)?;
        writer.write_int(instant.timestamp());
        writer.write_int(i64::from(instant.offset().local_minus_utc()));
        Ok(())
    }

    fn deserialize(
        &self,
        reader: &mut MsgPackReader<'_>,
        _resolver: &dyn SerializerResolver,
    ) -> Result<FieldValue> {
        let kind = &CustomKind::TIMESTAMP_OFFSET;
        let (seconds, offset_seconds) = read_pair(reader, kind)?;
        let offset = FixedOffset::east_opt(offset_seconds).ok_or_else(|| {
            SchemaError::invalid_binary(
                format!("custom({})", kind),
                format!("offset {}s out of range", offset_seconds),
            )
        })?;
        let instant = from_unix_seconds(seconds, kind)?.with_timezone(&offset);
        Ok(FieldValue::Custom(CustomValue::OffsetTimestamp(instant)))
    }
}

fn read_pair(reader: &mut MsgPackReader<'_>, kind: &CustomKind) -> Result<(i64, i32)> {
    let count = reader.read_array_header().map_err(|e| within(kind, e))?;
    if count != TIMESTAMP_ARITY {
        return Err(SchemaError::invalid_binary(
            format!("custom({})", kind),
            format!("expected {} elements, found {}", TIMESTAMP_ARITY, count),
        ));
    }
    let seconds = reader.read_i64().map_err(|e| within(kind, e))?;
    let offset = reader.read_i32().map_err(|e| within(kind, e))?;
    Ok((seconds, offset))
}

fn from_unix_seconds(seconds: i64, kind: &CustomKind) -> Result<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(seconds, 0).ok_or_else(|| {
        SchemaError::invalid_binary(
            format!("custom({})", kind),
            format!("{} seconds out of range", seconds),
        )
    })
}
