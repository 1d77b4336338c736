// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::{invalid_value, within, SerializerResolver, TypeSerializer};
use crate::codec::msgpack::{MsgPackReader, MsgPackWriter};
use crate::error::{Result, SchemaError};
use crate::schema::CustomKind;
use crate::value::{CustomValue, FieldValue};
use chrono::TimeDelta;

/// `duration`: signed whole milliseconds.
#[derive(Debug, Default, Clone, Copy)]
pub struct DurationSerializer;

impl TypeSerializer for DurationSerializer {
    fn serialize(
        &self,
        value: &FieldValue,
        writer: &mut MsgPackWriter,
        _resolver: &dyn SerializerResolver,
    ) -> Result<()> {
        let FieldValue::Custom(CustomValue::Duration(delta)) = value else {
            return Err(invalid_value(&CustomKind::DURATION, value));
        };
        writer.write_int(delta.num_milliseconds());
        Ok(())
    }

    fn deserialize(
        &self,
        reader: &mut MsgPackReader<'_>,
        _resolver: &dyn SerializerResolver,
    ) -> Result<FieldValue> {
        let millis = reader
            .read_i64()
            .map_err(|e| within(&CustomKind::DURATION, e))?;
        let delta = TimeDelta::try_milliseconds(millis).ok_or_else(|| {
            SchemaError::invalid_binary(
                format!("custom({})", CustomKind::DURATION),
                format!("{}ms out of range", millis),
            )
        })?;
        Ok(FieldValue::Custom(CustomValue::Duration(delta)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::custom::SerializerRegistry;

    #[test]
    fn test_duration_is_milliseconds() {
        let registry = SerializerRegistry::new();
        let value = FieldValue::Custom(CustomValue::Duration(TimeDelta::milliseconds(-1500)));
        let mut writer = MsgPackWriter::new();
        DurationSerializer
            .serialize(&value, &mut writer, &registry)
            .expect("serialize");
        let bytes = writer.into_bytes();
        assert_eq!(bytes, vec![0xd1, 0xfa, 0x24]);

        let decoded = DurationSerializer
            .deserialize(&mut MsgPackReader::new(&bytes), &registry)
            .expect("deserialize");
        assert_eq!(decoded, value);
    }

    #[test]
    fn test_submillisecond_truncated() {
        let registry = SerializerRegistry::new();
        let value = FieldValue::Custom(CustomValue::Duration(TimeDelta::microseconds(2_999)));
        let mut writer = MsgPackWriter::new();
        DurationSerializer
            .serialize(&value, &mut writer, &registry)
            .expect("serialize");
        assert_eq!(writer.as_bytes(), &[0x02]);
    }

    #[test]
    fn test_bad_payload_labelled_with_kind() {
        let registry = SerializerRegistry::new();
        let err = DurationSerializer
            .deserialize(&mut MsgPackReader::new(&[0xa1, b'x']), &registry)
            .unwrap_err();
        match err {
            SchemaError::InvalidBinary { kind, .. } => assert_eq!(kind, "custom(duration)"),
            other => panic!("unexpected error {:?}", other),
        }
    }
}
