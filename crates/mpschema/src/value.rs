// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime value representation.
//!
//! [`FieldValue`] is the storage type of every slot: one variant per value
//! kind plus `Null`. Containers own their elements, so cloning a value is a
//! deep copy.

use crate::schema::{CustomKind, TypeArgument, ValueKind};
use chrono::{DateTime, FixedOffset, TimeDelta, Utc};
use std::any::Any;
use std::collections::hash_map::RandomState;
use std::collections::HashMap;
use std::fmt;
use std::hash::{BuildHasher, Hash, Hasher};
use std::sync::Arc;

/// Shared null, returned for unset nullable fields.
pub(crate) static NULL: FieldValue = FieldValue::Null;

/// Value stored in a field slot.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldValue {
    #[default]
    Null,
    Boolean(bool),
    String(String),
    Uint8(u8),
    Uint16(u16),
    Uint32(u32),
    Uint64(u64),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    Binary(Vec<u8>),
    List(Vec<FieldValue>),
    Map(FieldMap),
    Custom(CustomValue),
}

impl FieldValue {
    /// Kind of the value, `None` for null.
    pub fn kind(&self) -> Option<ValueKind> {
        Some(match self {
            Self::Null => return None,
            Self::Boolean(_) => ValueKind::Boolean,
            Self::String(_) => ValueKind::String,
            Self::Uint8(_) => ValueKind::Uint8,
            Self::Uint16(_) => ValueKind::Uint16,
            Self::Uint32(_) => ValueKind::Uint32,
            Self::Uint64(_) => ValueKind::Uint64,
            Self::Int8(_) => ValueKind::Int8,
            Self::Int16(_) => ValueKind::Int16,
            Self::Int32(_) => ValueKind::Int32,
            Self::Int64(_) => ValueKind::Int64,
            Self::Float32(_) => ValueKind::Float32,
            Self::Float64(_) => ValueKind::Float64,
            Self::Binary(_) => ValueKind::Binary,
            Self::List(_) => ValueKind::List,
            Self::Map(_) => ValueKind::Map,
            Self::Custom(_) => ValueKind::Custom,
        })
    }

    /// Kind with the custom marker attached, `None` for null.
    pub fn type_argument(&self) -> Option<TypeArgument> {
        match self {
            Self::Custom(custom) => Some(TypeArgument::custom(custom.kind())),
            other => other.kind().map(TypeArgument::of),
        }
    }

    /// Name used in diagnostics.
    pub fn kind_name(&self) -> String {
        self.type_argument()
            .map_or_else(|| "null".to_string(), |arg| arg.to_string())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Zero value of a kind: `false`, `0`, empty string/binary/container,
    /// Unix epoch for timestamps, zero duration. Nullable custom wrappers and
    /// unknown markers yield `Null`.
    pub fn zero_for(argument: &TypeArgument) -> FieldValue {
        match argument.kind() {
            ValueKind::Boolean => Self::Boolean(false),
            ValueKind::String => Self::String(String::new()),
            ValueKind::Uint8 => Self::Uint8(0),
            ValueKind::Uint16 => Self::Uint16(0),
            ValueKind::Uint32 => Self::Uint32(0),
            ValueKind::Uint64 => Self::Uint64(0),
            ValueKind::Int8 => Self::Int8(0),
            ValueKind::Int16 => Self::Int16(0),
            ValueKind::Int32 => Self::Int32(0),
            ValueKind::Int64 => Self::Int64(0),
            ValueKind::Float32 => Self::Float32(0.0),
            ValueKind::Float64 => Self::Float64(0.0),
            ValueKind::Binary => Self::Binary(Vec::new()),
            ValueKind::List => Self::List(Vec::new()),
            ValueKind::Map => Self::Map(FieldMap::new()),
            ValueKind::Custom => argument
                .custom_kind()
                .and_then(CustomValue::zero_for)
                .map_or(Self::Null, Self::Custom),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Uint8(v) => Some(u64::from(*v)),
            Self::Uint16(v) => Some(u64::from(*v)),
            Self::Uint32(v) => Some(u64::from(*v)),
            Self::Uint64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int8(v) => Some(i64::from(*v)),
            Self::Int16(v) => Some(i64::from(*v)),
            Self::Int32(v) => Some(i64::from(*v)),
            Self::Int64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float32(v) => Some(f64::from(*v)),
            Self::Float64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Binary(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[FieldValue]> {
        match self {
            Self::List(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&FieldMap> {
        match self {
            Self::Map(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_custom(&self) -> Option<&CustomValue> {
        match self {
            Self::Custom(v) => Some(v),
            _ => None,
        }
    }
}

macro_rules! impl_from_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for FieldValue {
                fn from(v: $ty) -> Self {
                    Self::$variant(v)
                }
            }
        )*
    };
}

impl_from_value! {
    bool => Boolean,
    String => String,
    u8 => Uint8,
    u16 => Uint16,
    u32 => Uint32,
    u64 => Uint64,
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    f32 => Float32,
    f64 => Float64,
    Vec<FieldValue> => List,
    FieldMap => Map,
    CustomValue => Custom,
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// Map value preserving insertion order.
///
/// Keys are unique: inserting an equal key replaces the entry in place.
/// Equality ignores order. Positions are indexed by key hash.
#[derive(Clone, Default)]
pub struct FieldMap {
    entries: Vec<(FieldValue, FieldValue)>,
    positions: HashMap<u64, Vec<usize>>,
    state: RandomState,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            positions: HashMap::with_capacity(capacity),
            state: RandomState::new(),
        }
    }

    /// Insert, returning the previous value for an equal key.
    pub fn insert(&mut self, key: FieldValue, value: FieldValue) -> Option<FieldValue> {
        let hash = self.state.hash_one(KeyHash(&key));
        let bucket = self.positions.entry(hash).or_default();
        if let Some(&position) = bucket.iter().find(|&&p| self.entries[p].0 == key) {
            return Some(std::mem::replace(&mut self.entries[position].1, value));
        }
        bucket.push(self.entries.len());
        self.entries.push((key, value));
        None
    }

    pub fn get(&self, key: &FieldValue) -> Option<&FieldValue> {
        let hash = self.state.hash_one(KeyHash(key));
        self.positions
            .get(&hash)?
            .iter()
            .map(|&position| &self.entries[position])
            .find_map(|(k, v)| (k == key).then_some(v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldValue, &FieldValue)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }
}

/// Hash consistent with `FieldValue` equality.
///
/// Floats hash by bits with `-0.0` folded onto `0.0`. Maps hash only their
/// length and opaque values only their marker.
struct KeyHash<'a>(&'a FieldValue);

impl Hash for KeyHash<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let value = self.0;
        std::mem::discriminant(value).hash(state);
        match value {
            FieldValue::Null => {}
            FieldValue::Boolean(v) => v.hash(state),
            FieldValue::String(v) => v.hash(state),
            FieldValue::Uint8(v) => v.hash(state),
            FieldValue::Uint16(v) => v.hash(state),
            FieldValue::Uint32(v) => v.hash(state),
            FieldValue::Uint64(v) => v.hash(state),
            FieldValue::Int8(v) => v.hash(state),
            FieldValue::Int16(v) => v.hash(state),
            FieldValue::Int32(v) => v.hash(state),
            FieldValue::Int64(v) => v.hash(state),
            FieldValue::Float32(v) => (*v + 0.0).to_bits().hash(state),
            FieldValue::Float64(v) => (*v + 0.0).to_bits().hash(state),
            FieldValue::Binary(v) => v.hash(state),
            FieldValue::List(items) => {
                items.len().hash(state);
                for item in items {
                    KeyHash(item).hash(state);
                }
            }
            FieldValue::Map(entries) => entries.len().hash(state),
            FieldValue::Custom(custom) => match custom {
                CustomValue::Timestamp(v) => v.hash(state),
                CustomValue::OffsetTimestamp(v) => v.hash(state),
                CustomValue::Duration(v) => v.hash(state),
                CustomValue::Opaque(opaque) => opaque.kind().hash(state),
            },
        }
    }
}

impl fmt::Debug for FieldMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl PartialEq for FieldMap {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .entries
                .iter()
                .all(|(key, value)| other.get(key) == Some(value))
    }
}

impl FromIterator<(FieldValue, FieldValue)> for FieldMap {
    fn from_iter<I: IntoIterator<Item = (FieldValue, FieldValue)>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut map = Self::with_capacity(iter.size_hint().0);
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl IntoIterator for FieldMap {
    type Item = (FieldValue, FieldValue);
    type IntoIter = std::vec::IntoIter<(FieldValue, FieldValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Value of a custom kind.
#[derive(Debug, Clone, PartialEq)]
pub enum CustomValue {
    /// `timestamp`
    Timestamp(DateTime<Utc>),
    /// `timestamp-offset`
    OffsetTimestamp(DateTime<FixedOffset>),
    /// `duration`
    Duration(TimeDelta),
    /// Any other marker, handled by a user-registered serializer.
    Opaque(OpaqueValue),
}

impl CustomValue {
    pub fn kind(&self) -> CustomKind {
        match self {
            Self::Timestamp(_) => CustomKind::TIMESTAMP,
            Self::OffsetTimestamp(_) => CustomKind::TIMESTAMP_OFFSET,
            Self::Duration(_) => CustomKind::DURATION,
            Self::Opaque(opaque) => opaque.kind.clone(),
        }
    }

    fn zero_for(marker: &CustomKind) -> Option<Self> {
        if *marker == CustomKind::TIMESTAMP {
            Some(Self::Timestamp(DateTime::<Utc>::UNIX_EPOCH))
        } else if *marker == CustomKind::TIMESTAMP_OFFSET {
            Some(Self::OffsetTimestamp(DateTime::<Utc>::UNIX_EPOCH.fixed_offset()))
        } else if *marker == CustomKind::DURATION {
            Some(Self::Duration(TimeDelta::zero()))
        } else {
            None
        }
    }
}

/// Type-erased value for a marker outside the built-in set.
///
/// The payload is shared immutably, so clones stay independent values.
#[derive(Clone)]
pub struct OpaqueValue {
    kind: CustomKind,
    inner: Arc<dyn Any + Send + Sync>,
    eq: fn(&dyn Any, &dyn Any) -> bool,
    debug: fn(&dyn Any, &mut fmt::Formatter<'_>) -> fmt::Result,
}

impl OpaqueValue {
    pub fn new<T>(kind: CustomKind, value: T) -> Self
    where
        T: Any + Send + Sync + PartialEq + fmt::Debug,
    {
        Self {
            kind,
            inner: Arc::new(value),
            eq: |a, b| match (a.downcast_ref::<T>(), b.downcast_ref::<T>()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
            debug: |v, f| match v.downcast_ref::<T>() {
                Some(v) => fmt::Debug::fmt(v, f),
                None => f.write_str("<opaque>"),
            },
        }
    }

    pub fn kind(&self) -> &CustomKind {
        &self.kind
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }
}

impl PartialEq for OpaqueValue {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && (self.eq)(self.inner.as_ref(), other.inner.as_ref())
    }
}

impl fmt::Debug for OpaqueValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Opaque({}, ", self.kind)?;
        (self.debug)(self.inner.as_ref(), f)?;
        f.write_str(")")
    }
}
