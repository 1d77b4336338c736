// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! MessagePack reader and writer.
//!
//! Covers the subset the engine emits: nil, booleans, integers, floats,
//! str, bin, array and map. Payloads are big-endian. Integers are written in
//! the smallest representation that holds the value and read back from any
//! representation whose value fits the requested width.

use crate::config::DecodeLimits;
use crate::error::{Result, SchemaError};

// =======================================================================
// Format tags
// =======================================================================

pub const NIL_MARKER: u8 = 0xc0;
pub const FALSE_MARKER: u8 = 0xc2;
pub const TRUE_MARKER: u8 = 0xc3;

pub const BIN8: u8 = 0xc4;
pub const BIN16: u8 = 0xc5;
pub const BIN32: u8 = 0xc6;

pub const FLOAT32: u8 = 0xca;
pub const FLOAT64: u8 = 0xcb;

pub const UINT8: u8 = 0xcc;
pub const UINT16: u8 = 0xcd;
pub const UINT32: u8 = 0xce;
pub const UINT64: u8 = 0xcf;
pub const INT8: u8 = 0xd0;
pub const INT16: u8 = 0xd1;
pub const INT32: u8 = 0xd2;
pub const INT64: u8 = 0xd3;

pub const STR8: u8 = 0xd9;
pub const STR16: u8 = 0xda;
pub const STR32: u8 = 0xdb;

pub const ARRAY16: u8 = 0xdc;
pub const ARRAY32: u8 = 0xdd;
pub const MAP16: u8 = 0xde;
pub const MAP32: u8 = 0xdf;

const POSITIVE_FIXINT_MAX: u8 = 0x7f;
const FIXMAP_PREFIX: u8 = 0x80;
const FIXARRAY_PREFIX: u8 = 0x90;
const FIXSTR_PREFIX: u8 = 0xa0;
const NEGATIVE_FIXINT_MIN: u8 = 0xe0;

const FIXMAP_MAX_LEN: usize = 0x0f;
const FIXARRAY_MAX_LEN: usize = 0x0f;
const FIXSTR_MAX_LEN: usize = 0x1f;

// =======================================================================
// Writer
// =======================================================================

/// Growable MessagePack output buffer.
#[derive(Debug, Default, Clone)]
pub struct MsgPackWriter {
    buffer: Vec<u8>,
}

impl MsgPackWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    pub fn write_nil(&mut self) {
        self.buffer.push(NIL_MARKER);
    }

    pub fn write_bool(&mut self, value: bool) {
        self.buffer
            .push(if value { TRUE_MARKER } else { FALSE_MARKER });
    }

    /// Unsigned integer in its smallest representation.
    pub fn write_uint(&mut self, value: u64) {
        if value <= u64::from(POSITIVE_FIXINT_MAX) {
            self.buffer.push(value as u8);
        } else if let Ok(v) = u8::try_from(value) {
            self.buffer.extend_from_slice(&[UINT8, v]);
        } else if let Ok(v) = u16::try_from(value) {
            self.write_tagged(UINT16, &v.to_be_bytes());
        } else if let Ok(v) = u32::try_from(value) {
            self.write_tagged(UINT32, &v.to_be_bytes());
        } else {
            self.write_tagged(UINT64, &value.to_be_bytes());
        }
    }

    /// Signed integer in its smallest representation. Non-negative values
    /// use the unsigned forms.
    pub fn write_int(&mut self, value: i64) {
        if let Ok(unsigned) = u64::try_from(value) {
            self.write_uint(unsigned);
        } else if value >= -32 {
            self.buffer.push(value as i8 as u8);
        } else if let Ok(v) = i8::try_from(value) {
            self.write_tagged(INT8, &v.to_be_bytes());
        } else if let Ok(v) = i16::try_from(value) {
            self.write_tagged(INT16, &v.to_be_bytes());
        } else if let Ok(v) = i32::try_from(value) {
            self.write_tagged(INT32, &v.to_be_bytes());
        } else {
            self.write_tagged(INT64, &value.to_be_bytes());
        }
    }

    pub fn write_f32(&mut self, value: f32) {
        self.write_tagged(FLOAT32, &value.to_bits().to_be_bytes());
    }

    pub fn write_f64(&mut self, value: f64) {
        self.write_tagged(FLOAT64, &value.to_bits().to_be_bytes());
    }

    pub fn write_str(&mut self, value: &str) -> Result<()> {
        let len = value.len();
        if len <= FIXSTR_MAX_LEN {
            self.buffer.push(FIXSTR_PREFIX | len as u8);
        } else {
            self.write_length("string", STR8, STR16, STR32, len)?;
        }
        self.buffer.extend_from_slice(value.as_bytes());
        Ok(())
    }

    pub fn write_bin(&mut self, value: &[u8]) -> Result<()> {
        self.write_length("binary", BIN8, BIN16, BIN32, value.len())?;
        self.buffer.extend_from_slice(value);
        Ok(())
    }

    pub fn write_array_header(&mut self, len: usize) -> Result<()> {
        if len <= FIXARRAY_MAX_LEN {
            self.buffer.push(FIXARRAY_PREFIX | len as u8);
            Ok(())
        } else {
            self.write_header("array", ARRAY16, ARRAY32, len)
        }
    }

    pub fn write_map_header(&mut self, len: usize) -> Result<()> {
        if len <= FIXMAP_MAX_LEN {
            self.buffer.push(FIXMAP_PREFIX | len as u8);
            Ok(())
        } else {
            self.write_header("map", MAP16, MAP32, len)
        }
    }

    fn write_tagged(&mut self, tag: u8, payload: &[u8]) {
        self.buffer.push(tag);
        self.buffer.extend_from_slice(payload);
    }

    fn write_length(
        &mut self,
        what: &'static str,
        tag8: u8,
        tag16: u8,
        tag32: u8,
        len: usize,
    ) -> Result<()> {
        if let Ok(v) = u8::try_from(len) {
            self.write_tagged(tag8, &[v]);
            Ok(())
        } else {
            self.write_header(what, tag16, tag32, len)
        }
    }

    fn write_header(&mut self, what: &'static str, tag16: u8, tag32: u8, len: usize) -> Result<()> {
        if let Ok(v) = u16::try_from(len) {
            self.write_tagged(tag16, &v.to_be_bytes());
        } else if let Ok(v) = u32::try_from(len) {
            self.write_tagged(tag32, &v.to_be_bytes());
        } else {
            return Err(SchemaError::LimitExceeded {
                what,
                len,
                max: u32::MAX as usize,
            });
        }
        Ok(())
    }
}

// =======================================================================
// Reader
// =======================================================================

/// Integer as found on the wire, before narrowing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WireInt {
    Unsigned(u64),
    Signed(i64),
}

impl std::fmt::Display for WireInt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unsigned(v) => write!(f, "{}", v),
            Self::Signed(v) => write!(f, "{}", v),
        }
    }
}

/// Generate big-endian payload readers.
macro_rules! impl_read_be {
    ($name:ident, $type:ty, $size:expr) => {
        fn $name(&mut self, kind: &str) -> Result<$type> {
            let mut bytes = [0u8; $size];
            bytes.copy_from_slice(self.take($size, kind)?);
            Ok(<$type>::from_be_bytes(bytes))
        }
    };
}

/// Generate width-checked integer readers.
macro_rules! impl_read_int {
    ($name:ident, $type:ty, $kind:expr) => {
        pub fn $name(&mut self) -> Result<$type> {
            let start = self.offset;
            let value = self.read_wire_int($kind)?;
            let narrowed = match value {
                WireInt::Unsigned(v) => <$type>::try_from(v).ok(),
                WireInt::Signed(v) => <$type>::try_from(v).ok(),
            };
            narrowed.ok_or_else(|| {
                SchemaError::invalid_binary(
                    $kind,
                    format!("value {} at offset {} out of range", value, start),
                )
            })
        }
    };
}

/// Bounds-checked MessagePack reader over a borrowed buffer.
pub struct MsgPackReader<'a> {
    buffer: &'a [u8],
    offset: usize,
    limits: DecodeLimits,
}

impl<'a> MsgPackReader<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self::with_limits(buffer, DecodeLimits::default())
    }

    pub fn with_limits(buffer: &'a [u8], limits: DecodeLimits) -> Self {
        Self {
            buffer,
            offset: 0,
            limits,
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.offset)
    }

    pub fn is_eof(&self) -> bool {
        self.remaining() == 0
    }

    /// Next format tag without consuming it.
    pub fn peek_tag(&self) -> Option<u8> {
        self.buffer.get(self.offset).copied()
    }

    /// Consume a nil if one is next.
    pub fn try_read_nil(&mut self) -> bool {
        if self.peek_tag() == Some(NIL_MARKER) {
            self.offset += 1;
            true
        } else {
            false
        }
    }

    pub fn read_nil(&mut self) -> Result<()> {
        match self.read_tag("nil")? {
            NIL_MARKER => Ok(()),
            tag => Err(self.unexpected("nil", tag)),
        }
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        match self.read_tag("boolean")? {
            FALSE_MARKER => Ok(false),
            TRUE_MARKER => Ok(true),
            tag => Err(self.unexpected("boolean", tag)),
        }
    }

    impl_read_int!(read_u8, u8, "uint8");
    impl_read_int!(read_u16, u16, "uint16");
    impl_read_int!(read_u32, u32, "uint32");
    impl_read_int!(read_u64, u64, "uint64");
    impl_read_int!(read_i8, i8, "int8");
    impl_read_int!(read_i16, i16, "int16");
    impl_read_int!(read_i32, i32, "int32");
    impl_read_int!(read_i64, i64, "int64");

    pub fn read_f32(&mut self) -> Result<f32> {
        match self.read_tag("float32")? {
            FLOAT32 => Ok(f32::from_bits(self.read_be_u32("float32")?)),
            tag => Err(self.unexpected("float32", tag)),
        }
    }

    /// Reads float64, widening a float32 payload.
    pub fn read_f64(&mut self) -> Result<f64> {
        match self.read_tag("float64")? {
            FLOAT64 => Ok(f64::from_bits(self.read_be_u64("float64")?)),
            FLOAT32 => Ok(f64::from(f32::from_bits(self.read_be_u32("float64")?))),
            tag => Err(self.unexpected("float64", tag)),
        }
    }

    pub fn read_str(&mut self) -> Result<String> {
        let len = match self.read_tag("string")? {
            tag @ FIXSTR_PREFIX..=0xbf => usize::from(tag & 0x1f),
            STR8 => usize::from(self.read_be_u8("string")?),
            STR16 => usize::from(self.read_be_u16("string")?),
            STR32 => self.read_be_u32("string")? as usize,
            tag => return Err(self.unexpected("string", tag)),
        };
        check_limit("string", len, self.limits.max_string_len)?;
        let start = self.offset;
        let bytes = self.take(len, "string")?;
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|e| {
                SchemaError::invalid_binary(
                    "string",
                    format!("invalid utf-8 at offset {}: {}", start, e),
                )
            })
    }

    pub fn read_bin(&mut self) -> Result<Vec<u8>> {
        let len = match self.read_tag("binary")? {
            BIN8 => usize::from(self.read_be_u8("binary")?),
            BIN16 => usize::from(self.read_be_u16("binary")?),
            BIN32 => self.read_be_u32("binary")? as usize,
            tag => return Err(self.unexpected("binary", tag)),
        };
        check_limit("binary", len, self.limits.max_binary_len)?;
        Ok(self.take(len, "binary")?.to_vec())
    }

    /// Element count of an array.
    pub fn read_array_header(&mut self) -> Result<usize> {
        let len = match self.read_tag("array")? {
            tag @ FIXARRAY_PREFIX..=0x9f => usize::from(tag & 0x0f),
            ARRAY16 => usize::from(self.read_be_u16("array")?),
            ARRAY32 => self.read_be_u32("array")? as usize,
            tag => return Err(self.unexpected("array", tag)),
        };
        check_limit("array", len, self.limits.max_collection_len)?;
        Ok(len)
    }

    /// Entry count of a map.
    pub fn read_map_header(&mut self) -> Result<usize> {
        let len = match self.read_tag("map")? {
            tag @ FIXMAP_PREFIX..=0x8f => usize::from(tag & 0x0f),
            MAP16 => usize::from(self.read_be_u16("map")?),
            MAP32 => self.read_be_u32("map")? as usize,
            tag => return Err(self.unexpected("map", tag)),
        };
        check_limit("map", len, self.limits.max_collection_len)?;
        Ok(len)
    }

    fn read_wire_int(&mut self, kind: &str) -> Result<WireInt> {
        Ok(match self.read_tag(kind)? {
            tag @ 0..=POSITIVE_FIXINT_MAX => WireInt::Unsigned(u64::from(tag)),
            tag @ NEGATIVE_FIXINT_MIN..=0xff => WireInt::Signed(i64::from(tag as i8)),
            UINT8 => WireInt::Unsigned(u64::from(self.read_be_u8(kind)?)),
            UINT16 => WireInt::Unsigned(u64::from(self.read_be_u16(kind)?)),
            UINT32 => WireInt::Unsigned(u64::from(self.read_be_u32(kind)?)),
            UINT64 => WireInt::Unsigned(self.read_be_u64(kind)?),
            INT8 => WireInt::Signed(i64::from(self.read_be_u8(kind)? as i8)),
            INT16 => WireInt::Signed(i64::from(self.read_be_u16(kind)? as i16)),
            INT32 => WireInt::Signed(i64::from(self.read_be_u32(kind)? as i32)),
            INT64 => WireInt::Signed(self.read_be_u64(kind)? as i64),
            tag => return Err(self.unexpected(kind, tag)),
        })
    }

    impl_read_be!(read_be_u8, u8, 1);
    impl_read_be!(read_be_u16, u16, 2);
    impl_read_be!(read_be_u32, u32, 4);
    impl_read_be!(read_be_u64, u64, 8);

    fn read_tag(&mut self, kind: &str) -> Result<u8> {
        Ok(self.take(1, kind)?[0])
    }

    fn take(&mut self, count: usize, kind: &str) -> Result<&'a [u8]> {
        if count > self.remaining() {
            return Err(SchemaError::invalid_binary(
                kind,
                format!(
                    "unexpected end of buffer at offset {} (need {} bytes, {} left)",
                    self.offset,
                    count,
                    self.remaining()
                ),
            ));
        }
        let buffer = self.buffer;
        let bytes = &buffer[self.offset..self.offset + count];
        self.offset += count;
        Ok(bytes)
    }

    /// Error for a tag consumed at `offset - 1`.
    fn unexpected(&self, kind: &str, tag: u8) -> SchemaError {
        SchemaError::invalid_binary(
            kind,
            format!(
                "unexpected format tag 0x{:02x} at offset {}",
                tag,
                self.offset.saturating_sub(1)
            ),
        )
    }
}

fn check_limit(what: &'static str, len: usize, max: usize) -> Result<()> {
    if len > max {
        log::debug!("[msgpack] {} length {} above limit {}", what, len, max);
        return Err(SchemaError::LimitExceeded { what, len, max });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn written(f: impl FnOnce(&mut MsgPackWriter)) -> Vec<u8> {
        let mut writer = MsgPackWriter::new();
        f(&mut writer);
        writer.into_bytes()
    }

    #[test]
    fn test_uint_uses_smallest_representation() {
        assert_eq!(written(|w| w.write_uint(0)), vec![0x00]);
        assert_eq!(written(|w| w.write_uint(127)), vec![0x7f]);
        assert_eq!(written(|w| w.write_uint(128)), vec![0xcc, 0x80]);
        assert_eq!(written(|w| w.write_uint(256)), vec![0xcd, 0x01, 0x00]);
        assert_eq!(
            written(|w| w.write_uint(65_536)),
            vec![0xce, 0x00, 0x01, 0x00, 0x00]
        );
        assert_eq!(
            written(|w| w.write_uint(u64::MAX)),
            vec![0xcf, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]
        );
    }

    #[test]
    fn test_int_uses_smallest_representation() {
        assert_eq!(written(|w| w.write_int(5)), vec![0x05]);
        assert_eq!(written(|w| w.write_int(-1)), vec![0xff]);
        assert_eq!(written(|w| w.write_int(-32)), vec![0xe0]);
        assert_eq!(written(|w| w.write_int(-33)), vec![0xd0, 0xdf]);
        assert_eq!(written(|w| w.write_int(-129)), vec![0xd1, 0xff, 0x7f]);
        assert_eq!(written(|w| w.write_int(200)), vec![0xcc, 0xc8]);
    }

    #[test]
    fn test_str_headers() {
        assert_eq!(written(|w| w.write_str("ab").unwrap()), vec![0xa2, b'a', b'b']);
        let long = "x".repeat(40);
        let bytes = written(|w| w.write_str(&long).unwrap());
        assert_eq!(&bytes[..2], &[0xd9, 40]);
        let longer = "y".repeat(300);
        let bytes = written(|w| w.write_str(&longer).unwrap());
        assert_eq!(&bytes[..3], &[0xda, 0x01, 0x2c]);
    }

    #[test]
    fn test_bin_and_headers() {
        assert_eq!(written(|w| w.write_bin(&[1, 2]).unwrap()), vec![0xc4, 2, 1, 2]);
        assert_eq!(written(|w| w.write_array_header(3).unwrap()), vec![0x93]);
        assert_eq!(
            written(|w| w.write_array_header(16).unwrap()),
            vec![0xdc, 0x00, 0x10]
        );
        assert_eq!(written(|w| w.write_map_header(0).unwrap()), vec![0x80]);
        assert_eq!(
            written(|w| w.write_map_header(70_000).unwrap()),
            vec![0xdf, 0x00, 0x01, 0x11, 0x70]
        );
    }

    #[test]
    fn test_reader_accepts_any_fitting_representation() {
        // 5 as uint32
        let mut reader = MsgPackReader::new(&[0xce, 0, 0, 0, 5]);
        assert_eq!(reader.read_u8().expect("u8"), 5);

        // 5 as int64
        let mut reader = MsgPackReader::new(&[0xd3, 0, 0, 0, 0, 0, 0, 0, 5]);
        assert_eq!(reader.read_u16().expect("u16"), 5);

        // -1 as negative fixint
        let mut reader = MsgPackReader::new(&[0xff]);
        assert_eq!(reader.read_i64().expect("i64"), -1);
    }

    #[test]
    fn test_reader_rejects_out_of_range() {
        let mut reader = MsgPackReader::new(&[0xcd, 0x01, 0x00]);
        let err = reader.read_u8().unwrap_err();
        assert!(matches!(err, SchemaError::InvalidBinary { ref kind, .. } if kind == "uint8"));

        let mut reader = MsgPackReader::new(&[0xff]);
        assert!(reader.read_u32().is_err());
    }

    #[test]
    fn test_reader_rejects_wrong_tag_and_truncation() {
        let mut reader = MsgPackReader::new(&[0xa1, b'x']);
        assert!(matches!(
            reader.read_u16(),
            Err(SchemaError::InvalidBinary { .. })
        ));

        let mut reader = MsgPackReader::new(&[0xcd, 0x01]);
        let err = reader.read_u16().unwrap_err();
        assert!(err.to_string().contains("unexpected end of buffer"));

        let mut reader = MsgPackReader::new(&[]);
        assert!(reader.read_bool().is_err());
    }

    #[test]
    fn test_float_width_rules() {
        let bytes = written(|w| w.write_f32(1.5));
        assert_eq!(bytes, vec![0xca, 0x3f, 0xc0, 0x00, 0x00]);
        assert_eq!(MsgPackReader::new(&bytes).read_f64().expect("widen"), 1.5);
        assert_eq!(MsgPackReader::new(&bytes).read_f32().expect("f32"), 1.5);

        let bytes = written(|w| w.write_f64(2.25));
        assert!(MsgPackReader::new(&bytes).read_f32().is_err());
        assert_eq!(MsgPackReader::new(&bytes).read_f64().expect("f64"), 2.25);
    }

    #[test]
    fn test_limits_checked_before_payload() {
        let limits = DecodeLimits::default().with_max_collection_len(4);
        let mut reader = MsgPackReader::with_limits(&[0xdd, 0xff, 0xff, 0xff, 0xff], limits);
        assert!(matches!(
            reader.read_array_header(),
            Err(SchemaError::LimitExceeded { what: "array", .. })
        ));

        let limits = DecodeLimits::default().with_max_string_len(2);
        let mut reader = MsgPackReader::with_limits(&[0xa3, b'a', b'b', b'c'], limits);
        assert!(matches!(
            reader.read_str(),
            Err(SchemaError::LimitExceeded { what: "string", .. })
        ));
    }

    #[test]
    fn test_invalid_utf8_rejected() {
        let mut reader = MsgPackReader::new(&[0xa2, 0xc3, 0x28]);
        assert!(matches!(
            reader.read_str(),
            Err(SchemaError::InvalidBinary { .. })
        ));
    }

    #[test]
    fn test_try_read_nil() {
        let mut reader = MsgPackReader::new(&[0xc0, 0xc3]);
        assert!(reader.try_read_nil());
        assert!(!reader.try_read_nil());
        assert!(reader.read_bool().expect("bool"));
        assert!(reader.is_eof());
        assert!(!reader.try_read_nil());
    }
}
