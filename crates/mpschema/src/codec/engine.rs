// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Schema-driven encoder and decoder.
//!
//! Fields are written in index order with no tags. Scalar kinds dispatch
//! through a static table of reader/writer pairs; lists and maps compose the
//! element entries of that table. Custom kinds go through the resolver.

use crate::codec::msgpack::{MsgPackReader, MsgPackWriter};
use crate::config::DecodeLimits;
use crate::custom::SerializerResolver;
use crate::error::{Result, SchemaError};
use crate::schema::{FieldDescriptor, SchemaDefinition, TypeArgument, ValueKind};
use crate::value::{FieldMap, FieldValue, NULL};
use std::sync::Arc;

type WriteFn =
    fn(&mut MsgPackWriter, usize, &FieldValue, &TypeArgument, &dyn SerializerResolver) -> Result<()>;
type ReadFn =
    fn(&mut MsgPackReader<'_>, &TypeArgument, &dyn SerializerResolver) -> Result<FieldValue>;

/// Reader/writer pair for one scalar kind.
struct ScalarCodec {
    kind: ValueKind,
    read: ReadFn,
    write: WriteFn,
}

/// Generate the reader/writer pair of a built-in scalar kind.
macro_rules! scalar_codec {
    ($write_fn:ident, $read_fn:ident, $variant:ident,
     |$w:ident, $v:ident| $write:expr,
     |$r:ident| $read:expr) => {
        fn $write_fn(
            writer: &mut MsgPackWriter,
            index: usize,
            value: &FieldValue,
            declared: &TypeArgument,
            _resolver: &dyn SerializerResolver,
        ) -> Result<()> {
            match value {
                FieldValue::$variant($v) => {
                    let $w = writer;
                    $write
                }
                other => Err(mismatch(index, other, declared)),
            }
        }

        fn $read_fn(
            $r: &mut MsgPackReader<'_>,
            _declared: &TypeArgument,
            _resolver: &dyn SerializerResolver,
        ) -> Result<FieldValue> {
            Ok(FieldValue::$variant($read?))
        }
    };
}

scalar_codec!(write_boolean, read_boolean, Boolean,
    |w, v| { w.write_bool(*v); Ok(()) },
    |r| r.read_bool());
scalar_codec!(write_string, read_string, String,
    |w, v| w.write_str(v),
    |r| r.read_str());
scalar_codec!(write_uint8, read_uint8, Uint8,
    |w, v| { w.write_uint(u64::from(*v)); Ok(()) },
    |r| r.read_u8());
scalar_codec!(write_uint16, read_uint16, Uint16,
    |w, v| { w.write_uint(u64::from(*v)); Ok(()) },
    |r| r.read_u16());
scalar_codec!(write_uint32, read_uint32, Uint32,
    |w, v| { w.write_uint(u64::from(*v)); Ok(()) },
    |r| r.read_u32());
scalar_codec!(write_uint64, read_uint64, Uint64,
    |w, v| { w.write_uint(*v); Ok(()) },
    |r| r.read_u64());
scalar_codec!(write_int8, read_int8, Int8,
    |w, v| { w.write_int(i64::from(*v)); Ok(()) },
    |r| r.read_i8());
scalar_codec!(write_int16, read_int16, Int16,
    |w, v| { w.write_int(i64::from(*v)); Ok(()) },
    |r| r.read_i16());
scalar_codec!(write_int32, read_int32, Int32,
    |w, v| { w.write_int(i64::from(*v)); Ok(()) },
    |r| r.read_i32());
scalar_codec!(write_int64, read_int64, Int64,
    |w, v| { w.write_int(*v); Ok(()) },
    |r| r.read_i64());
scalar_codec!(write_float32, read_float32, Float32,
    |w, v| { w.write_f32(*v); Ok(()) },
    |r| r.read_f32());
scalar_codec!(write_float64, read_float64, Float64,
    |w, v| { w.write_f64(*v); Ok(()) },
    |r| r.read_f64());
scalar_codec!(write_binary, read_binary, Binary,
    |w, v| w.write_bin(v),
    |r| r.read_bin());

fn write_custom(
    writer: &mut MsgPackWriter,
    index: usize,
    value: &FieldValue,
    declared: &TypeArgument,
    resolver: &dyn SerializerResolver,
) -> Result<()> {
    if !matches!(value, FieldValue::Custom(_)) {
        return Err(mismatch(index, value, declared));
    }
    resolver
        .resolve(marker(declared)?)?
        .serialize(value, writer, resolver)
}

fn read_custom(
    reader: &mut MsgPackReader<'_>,
    declared: &TypeArgument,
    resolver: &dyn SerializerResolver,
) -> Result<FieldValue> {
    resolver
        .resolve(marker(declared)?)?
        .deserialize(reader, resolver)
}

/// One entry per [`ValueKind::SCALARS`] kind, in the same order.
static SCALAR_CODECS: [ScalarCodec; 14] = [
    ScalarCodec { kind: ValueKind::Boolean, read: read_boolean, write: write_boolean },
    ScalarCodec { kind: ValueKind::String, read: read_string, write: write_string },
    ScalarCodec { kind: ValueKind::Uint8, read: read_uint8, write: write_uint8 },
    ScalarCodec { kind: ValueKind::Uint16, read: read_uint16, write: write_uint16 },
    ScalarCodec { kind: ValueKind::Uint32, read: read_uint32, write: write_uint32 },
    ScalarCodec { kind: ValueKind::Uint64, read: read_uint64, write: write_uint64 },
    ScalarCodec { kind: ValueKind::Int8, read: read_int8, write: write_int8 },
    ScalarCodec { kind: ValueKind::Int16, read: read_int16, write: write_int16 },
    ScalarCodec { kind: ValueKind::Int32, read: read_int32, write: write_int32 },
    ScalarCodec { kind: ValueKind::Int64, read: read_int64, write: write_int64 },
    ScalarCodec { kind: ValueKind::Float32, read: read_float32, write: write_float32 },
    ScalarCodec { kind: ValueKind::Float64, read: read_float64, write: write_float64 },
    ScalarCodec { kind: ValueKind::Binary, read: read_binary, write: write_binary },
    ScalarCodec { kind: ValueKind::Custom, read: read_custom, write: write_custom },
];

fn scalar_codec(kind: ValueKind) -> Option<&'static ScalarCodec> {
    SCALAR_CODECS.iter().find(|codec| codec.kind == kind)
}

fn mismatch(index: usize, value: &FieldValue, declared: &TypeArgument) -> SchemaError {
    SchemaError::InvalidFieldType {
        index,
        provided: value.kind_name(),
        declared: declared.to_string(),
    }
}

fn marker(declared: &TypeArgument) -> Result<&crate::schema::CustomKind> {
    declared.custom_kind().ok_or_else(|| {
        SchemaError::invalid_descriptor(declared.to_string(), "custom kind without a marker")
    })
}

// =======================================================================
// Encode
// =======================================================================

/// Write one scalar or container element.
fn write_scalar(
    writer: &mut MsgPackWriter,
    index: usize,
    value: &FieldValue,
    declared: &TypeArgument,
    resolver: &dyn SerializerResolver,
) -> Result<()> {
    if value.is_null() {
        if declared.admits_null() {
            writer.write_nil();
            return Ok(());
        }
        return Err(SchemaError::FieldNotNullable(index));
    }
    let codec = scalar_codec(declared.kind()).ok_or_else(|| mismatch(index, value, declared))?;
    (codec.write)(writer, index, value, declared, resolver)
}

fn write_list(
    writer: &mut MsgPackWriter,
    descriptor: &FieldDescriptor,
    value: &FieldValue,
    resolver: &dyn SerializerResolver,
) -> Result<()> {
    let (FieldValue::List(items), Some(element)) = (value, descriptor.element()) else {
        return Err(mismatch(descriptor.index(), value, descriptor.declared()));
    };
    writer.write_array_header(items.len())?;
    for item in items {
        write_scalar(writer, descriptor.index(), item, element, resolver)?;
    }
    Ok(())
}

fn write_map(
    writer: &mut MsgPackWriter,
    descriptor: &FieldDescriptor,
    value: &FieldValue,
    resolver: &dyn SerializerResolver,
) -> Result<()> {
    let (FieldValue::Map(entries), Some((key_arg, value_arg))) = (value, descriptor.key_value())
    else {
        return Err(mismatch(descriptor.index(), value, descriptor.declared()));
    };
    writer.write_map_header(entries.len())?;
    for (key, entry) in entries.iter() {
        write_scalar(writer, descriptor.index(), key, key_arg, resolver)?;
        write_scalar(writer, descriptor.index(), entry, value_arg, resolver)?;
    }
    Ok(())
}

/// Write the value of one field.
///
/// Null is written as nil on nullable fields and rejected on the others.
pub fn write_field(
    writer: &mut MsgPackWriter,
    descriptor: &FieldDescriptor,
    value: &FieldValue,
    resolver: &dyn SerializerResolver,
) -> Result<()> {
    if value.is_null() {
        if descriptor.is_nullable() {
            writer.write_nil();
            return Ok(());
        }
        if descriptor.value_kind().is_container() {
            return Err(SchemaError::FieldNotNullable(descriptor.index()));
        }
    }
    match descriptor.value_kind() {
        ValueKind::List => write_list(writer, descriptor, value, resolver),
        ValueKind::Map => write_map(writer, descriptor, value, resolver),
        _ => write_scalar(
            writer,
            descriptor.index(),
            value,
            descriptor.declared(),
            resolver,
        ),
    }
}

/// Append every field of `definition` to `writer`, materializing the
/// defaults of never-set non-nullable fields first.
pub fn encode_into(
    definition: &mut SchemaDefinition,
    writer: &mut MsgPackWriter,
    resolver: &dyn SerializerResolver,
) -> Result<()> {
    definition.materialize_all()?;
    let start = writer.len();
    for descriptor in definition.fields() {
        let value = definition.get(descriptor.index()).unwrap_or(&NULL);
        write_field(writer, descriptor, value, resolver).map_err(|e| {
            log::debug!(
                "[engine] {}: encoding field {} failed: {}",
                definition.schema().name(),
                descriptor,
                e
            );
            e
        })?;
    }
    log::trace!(
        "[engine] {}: encoded {} fields into {} bytes",
        definition.schema().name(),
        definition.len(),
        writer.len() - start
    );
    Ok(())
}

/// Encode `definition` into a fresh buffer.
pub fn encode(
    definition: &mut SchemaDefinition,
    resolver: &dyn SerializerResolver,
) -> Result<Vec<u8>> {
    let mut writer = MsgPackWriter::new();
    encode_into(definition, &mut writer, resolver)?;
    Ok(writer.into_bytes())
}

// =======================================================================
// Decode
// =======================================================================

fn read_scalar(
    reader: &mut MsgPackReader<'_>,
    declared: &TypeArgument,
    resolver: &dyn SerializerResolver,
) -> Result<FieldValue> {
    let codec = scalar_codec(declared.kind()).ok_or_else(|| {
        SchemaError::invalid_binary(declared.to_string(), "container nested in a container")
    })?;
    (codec.read)(reader, declared, resolver)
}

fn read_list(
    reader: &mut MsgPackReader<'_>,
    descriptor: &FieldDescriptor,
    resolver: &dyn SerializerResolver,
) -> Result<FieldValue> {
    let element = descriptor.element().ok_or_else(|| {
        SchemaError::invalid_descriptor(descriptor.name(), "list without an element kind")
    })?;
    let len = reader.read_array_header()?;
    let mut items = Vec::with_capacity(len.min(reader.remaining()));
    for _ in 0..len {
        items.push(read_scalar(reader, element, resolver)?);
    }
    Ok(FieldValue::List(items))
}

fn read_map(
    reader: &mut MsgPackReader<'_>,
    descriptor: &FieldDescriptor,
    resolver: &dyn SerializerResolver,
) -> Result<FieldValue> {
    let (key_arg, value_arg) = descriptor.key_value().ok_or_else(|| {
        SchemaError::invalid_descriptor(descriptor.name(), "map without key and value kinds")
    })?;
    let len = reader.read_map_header()?;
    let mut entries = FieldMap::with_capacity(len.min(reader.remaining()));
    for _ in 0..len {
        let key = read_scalar(reader, key_arg, resolver)?;
        let value = read_scalar(reader, value_arg, resolver)?;
        // duplicate keys: the later entry wins
        entries.insert(key, value);
    }
    Ok(FieldValue::Map(entries))
}

/// Read the value of one field.
pub fn read_field(
    reader: &mut MsgPackReader<'_>,
    descriptor: &FieldDescriptor,
    resolver: &dyn SerializerResolver,
) -> Result<FieldValue> {
    if descriptor.is_nullable() && reader.try_read_nil() {
        return Ok(FieldValue::Null);
    }
    match descriptor.value_kind() {
        ValueKind::List => read_list(reader, descriptor, resolver),
        ValueKind::Map => read_map(reader, descriptor, resolver),
        _ => read_scalar(reader, descriptor.declared(), resolver),
    }
}

/// Decode fields in index order from `reader`, storing each as it is read.
///
/// Not transactional: on error the fields decoded so far stay stored.
pub fn merge_from_reader(
    definition: &mut SchemaDefinition,
    reader: &mut MsgPackReader<'_>,
    resolver: &dyn SerializerResolver,
) -> Result<()> {
    let schema = Arc::clone(definition.schema());
    let start = reader.offset();
    for descriptor in schema.fields() {
        let value = read_field(reader, descriptor, resolver).map_err(|e| {
            log::debug!(
                "[engine] {}: decoding field {} at offset {} failed: {}",
                schema.name(),
                descriptor,
                reader.offset(),
                e
            );
            e
        })?;
        definition.store_decoded(descriptor.index(), value);
    }
    log::trace!(
        "[engine] {}: decoded {} fields from {} bytes",
        schema.name(),
        schema.len(),
        reader.offset() - start
    );
    Ok(())
}

/// Decode `bytes` into `definition`, returning the number of bytes consumed.
/// Bytes after the last field are ignored.
pub fn merge_from(
    definition: &mut SchemaDefinition,
    bytes: &[u8],
    resolver: &dyn SerializerResolver,
    limits: DecodeLimits,
) -> Result<usize> {
    let mut reader = MsgPackReader::with_limits(bytes, limits);
    merge_from_reader(definition, &mut reader, resolver)?;
    Ok(reader.offset())
}

/// Like [`merge_from`], but trailing bytes are an error.
pub fn merge_from_exact(
    definition: &mut SchemaDefinition,
    bytes: &[u8],
    resolver: &dyn SerializerResolver,
    limits: DecodeLimits,
) -> Result<()> {
    let consumed = merge_from(definition, bytes, resolver, limits)?;
    if consumed != bytes.len() {
        return Err(SchemaError::invalid_binary(
            definition.schema().name(),
            format!("{} trailing bytes after the last field", bytes.len() - consumed),
        ));
    }
    Ok(())
}
