// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Typed field access with kind verification.
//!
//! Rust types map to exactly one declared kind: no widening, no narrowing.
//! Setters validate before storing, so a failed call leaves the slot as it
//! was. Getters materialize the default of a never-set non-nullable field.
//!
//! # Example
//!
//! ```
//! use mpschema::schema::{FieldDescriptor, SchemaDefinition, TypeSchema, ValueKind};
//! use mpschema::SchemaError;
//!
//! let schema = TypeSchema::builder("Point")
//!     .field(FieldDescriptor::scalar("x", 0, ValueKind::Int32).unwrap())
//!     .field(FieldDescriptor::scalar("label", 1, ValueKind::String).unwrap().nullable())
//!     .build()
//!     .unwrap();
//! let mut point = SchemaDefinition::new(&schema);
//!
//! point.set_value(0, -4i32).unwrap();
//! assert_eq!(point.get_value::<i32>(0).unwrap(), -4);
//! assert!(matches!(point.set_value(0, 4u32), Err(SchemaError::InvalidFieldType { .. })));
//! assert_eq!(point.get_value::<Option<String>>(1).unwrap(), None);
//! ```

use crate::error::{Result, SchemaError};
use crate::schema::{CustomKind, SchemaDefinition, TypeArgument, ValueKind};
use crate::value::{CustomValue, FieldValue};
use chrono::{DateTime, FixedOffset, TimeDelta, Utc};

/// Rust type that can be stored into a field.
pub trait IntoField {
    /// Kind this type is declared as.
    fn type_argument() -> TypeArgument;

    fn into_field_value(self) -> FieldValue;
}

/// Rust type that can also be read back from a field.
pub trait FieldType: IntoField + Sized {
    /// `None` when the value is of another kind.
    fn from_field_value(value: &FieldValue) -> Option<Self>;
}

macro_rules! impl_field_type {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl IntoField for $ty {
                fn type_argument() -> TypeArgument {
                    TypeArgument::of(ValueKind::$variant)
                }

                fn into_field_value(self) -> FieldValue {
                    FieldValue::$variant(self)
                }
            }

            impl FieldType for $ty {
                #[allow(clippy::clone_on_copy)]
                fn from_field_value(value: &FieldValue) -> Option<Self> {
                    match value {
                        FieldValue::$variant(v) => Some(v.clone()),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_field_type! {
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
    Vec<u8> => Binary,
}

macro_rules! impl_custom_field_type {
    ($($ty:ty => $variant:ident, $marker:expr),* $(,)?) => {
        $(
            impl IntoField for $ty {
                fn type_argument() -> TypeArgument {
                    TypeArgument::custom($marker)
                }

                fn into_field_value(self) -> FieldValue {
                    FieldValue::Custom(CustomValue::$variant(self))
                }
            }

            impl FieldType for $ty {
                fn from_field_value(value: &FieldValue) -> Option<Self> {
                    match value {
                        FieldValue::Custom(CustomValue::$variant(v)) => Some(*v),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_custom_field_type! {
    DateTime<Utc> => Timestamp, CustomKind::TIMESTAMP,
    DateTime<FixedOffset> => OffsetTimestamp, CustomKind::TIMESTAMP_OFFSET,
    TimeDelta => Duration, CustomKind::DURATION,
}

impl IntoField for &str {
    fn type_argument() -> TypeArgument {
        TypeArgument::of(ValueKind::String)
    }

    fn into_field_value(self) -> FieldValue {
        FieldValue::String(self.to_string())
    }
}

/// Nullable view: `None` is null.
impl<T: IntoField> IntoField for Option<T> {
    fn type_argument() -> TypeArgument {
        T::type_argument()
    }

    fn into_field_value(self) -> FieldValue {
        self.map_or(FieldValue::Null, IntoField::into_field_value)
    }
}

impl<T: FieldType> FieldType for Option<T> {
    fn from_field_value(value: &FieldValue) -> Option<Self> {
        match value {
            FieldValue::Null => Some(None),
            other => T::from_field_value(other).map(Some),
        }
    }
}

fn invalid_type(index: usize, provided: &TypeArgument, declared: impl ToString) -> SchemaError {
    SchemaError::InvalidFieldType {
        index,
        provided: provided.to_string(),
        declared: declared.to_string(),
    }
}

/// View a stored value as `V`, naming the declared kind on failure.
fn view<V: FieldType>(index: usize, value: &FieldValue, declared: &TypeArgument) -> Result<V> {
    V::from_field_value(value).ok_or_else(|| {
        if value.is_null() {
            invalid_type(index, &V::type_argument(), format!("nullable {}", declared))
        } else {
            invalid_type(index, &V::type_argument(), declared)
        }
    })
}

fn check_nulls<'a>(
    index: usize,
    argument: &TypeArgument,
    mut values: impl Iterator<Item = &'a FieldValue>,
) -> Result<()> {
    if !argument.admits_null() && values.any(FieldValue::is_null) {
        return Err(SchemaError::FieldNotNullable(index));
    }
    Ok(())
}

impl SchemaDefinition {
    /// Read a scalar field.
    pub fn get_value<V: FieldType>(&mut self, index: usize) -> Result<V> {
        let declared = self.descriptor(index)?.declared().clone();
        if !declared.accepts(&V::type_argument()) {
            return Err(invalid_type(index, &V::type_argument(), &declared));
        }
        let value = self.materialize(index)?;
        view(index, value, &declared)
    }

    /// Read a scalar field without materializing its default.
    pub fn peek_value<V: FieldType>(&self, index: usize) -> Result<V> {
        let declared = self.descriptor(index)?.declared();
        if !declared.accepts(&V::type_argument()) {
            return Err(invalid_type(index, &V::type_argument(), declared));
        }
        let current = self.peek(index)?;
        view(index, &current, declared)
    }

    /// Write a scalar field.
    pub fn set_value<V: IntoField>(&mut self, index: usize, value: V) -> Result<()> {
        let descriptor = self.descriptor(index)?;
        let declared = descriptor.declared();
        let value = value.into_field_value();
        if value.is_null() && !descriptor.is_nullable() && !declared.admits_null() {
            return Err(SchemaError::FieldNotNullable(index));
        }
        let provided = V::type_argument();
        if !declared.accepts(&provided) {
            return Err(invalid_type(index, &provided, declared));
        }
        self.set(index, value)
    }

    /// Store null in a nullable field of any kind.
    pub fn set_null(&mut self, index: usize) -> Result<()> {
        let descriptor = self.descriptor(index)?;
        if !descriptor.is_nullable() && !descriptor.declared().admits_null() {
            return Err(SchemaError::FieldNotNullable(index));
        }
        self.set(index, FieldValue::Null)
    }

    /// Read a list field.
    ///
    /// A list field holding null is a type error; read it with
    /// [`Self::get_list_opt`].
    pub fn get_list<V: FieldType>(&mut self, index: usize) -> Result<Vec<V>> {
        self.get_list_opt(index)?
            .ok_or_else(|| invalid_type(index, &V::type_argument(), "nullable list"))
    }

    /// Read a list field, `None` when it holds null.
    pub fn get_list_opt<V: FieldType>(&mut self, index: usize) -> Result<Option<Vec<V>>> {
        let element = self
            .descriptor(index)?
            .element()
            .cloned()
            .ok_or(SchemaError::FieldNotAList(index))?;
        if !element.accepts(&V::type_argument()) {
            return Err(invalid_type(index, &V::type_argument(), &element));
        }
        match self.materialize(index)? {
            FieldValue::Null => Ok(None),
            FieldValue::List(items) => items
                .iter()
                .map(|item| view(index, item, &element))
                .collect::<Result<Vec<V>>>()
                .map(Some),
            other => Err(invalid_type(index, &V::type_argument(), other.kind_name())),
        }
    }

    /// Replace a list field.
    pub fn set_list<V, I>(&mut self, index: usize, items: I) -> Result<()>
    where
        V: IntoField,
        I: IntoIterator<Item = V>,
    {
        let element = self
            .descriptor(index)?
            .element()
            .ok_or(SchemaError::FieldNotAList(index))?;
        let provided = V::type_argument();
        if !element.accepts(&provided) {
            return Err(invalid_type(index, &provided, element));
        }
        let items: Vec<FieldValue> = items.into_iter().map(IntoField::into_field_value).collect();
        check_nulls(index, element, items.iter())?;
        self.set(index, FieldValue::List(items))
    }

    /// Read a map field into any collection of pairs.
    ///
    /// A map field holding null is a type error; read it with
    /// [`Self::get_map_opt`].
    pub fn get_map<K, V, M>(&mut self, index: usize) -> Result<M>
    where
        K: FieldType,
        V: FieldType,
        M: FromIterator<(K, V)>,
    {
        self.get_map_opt(index)?
            .ok_or_else(|| invalid_type(index, &K::type_argument(), "nullable map"))
    }

    /// Read a map field, `None` when it holds null.
    pub fn get_map_opt<K, V, M>(&mut self, index: usize) -> Result<Option<M>>
    where
        K: FieldType,
        V: FieldType,
        M: FromIterator<(K, V)>,
    {
        let (key_arg, value_arg) = self
            .descriptor(index)?
            .key_value()
            .map(|(k, v)| (k.clone(), v.clone()))
            .ok_or(SchemaError::FieldNotAMap(index))?;
        if !key_arg.accepts(&K::type_argument()) {
            return Err(invalid_type(index, &K::type_argument(), &key_arg));
        }
        if !value_arg.accepts(&V::type_argument()) {
            return Err(invalid_type(index, &V::type_argument(), &value_arg));
        }
        match self.materialize(index)? {
            FieldValue::Null => Ok(None),
            FieldValue::Map(entries) => entries
                .iter()
                .map(|(k, v)| -> Result<(K, V)> {
                    Ok((view(index, k, &key_arg)?, view(index, v, &value_arg)?))
                })
                .collect::<Result<M>>()
                .map(Some),
            other => Err(invalid_type(index, &K::type_argument(), other.kind_name())),
        }
    }

    /// Replace a map field. Later duplicates of a key win.
    pub fn set_map<K, V, I>(&mut self, index: usize, entries: I) -> Result<()>
    where
        K: IntoField,
        V: IntoField,
        I: IntoIterator<Item = (K, V)>,
    {
        let (key_arg, value_arg) = self
            .descriptor(index)?
            .key_value()
            .ok_or(SchemaError::FieldNotAMap(index))?;
        let (key_provided, value_provided) = (K::type_argument(), V::type_argument());
        if !key_arg.accepts(&key_provided) {
            return Err(invalid_type(index, &key_provided, key_arg));
        }
        if !value_arg.accepts(&value_provided) {
            return Err(invalid_type(index, &value_provided, value_arg));
        }
        let entries: crate::value::FieldMap = entries
            .into_iter()
            .map(|(k, v)| (k.into_field_value(), v.into_field_value()))
            .collect();
        check_nulls(index, key_arg, entries.iter().map(|(k, _)| k))?;
        check_nulls(index, value_arg, entries.iter().map(|(_, v)| v))?;
        self.set(index, FieldValue::Map(entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldDescriptor, TypeSchema};
    use chrono::TimeZone;
    use std::collections::{BTreeMap, HashMap};
    use std::sync::Arc;

    fn schema() -> Arc<TypeSchema> {
        TypeSchema::builder("Access")
            .field(FieldDescriptor::scalar("name", 0, ValueKind::String).expect("name"))
            .field(FieldDescriptor::list("names", 1, ValueKind::String).expect("names"))
            .field(
                FieldDescriptor::map("config", 2, ValueKind::String, ValueKind::Boolean)
                    .expect("config"),
            )
            .field(
                FieldDescriptor::scalar("myUint16", 3, ValueKind::Uint16)
                    .expect("myUint16")
                    .nullable(),
            )
            .field(FieldDescriptor::custom("created", 4, CustomKind::TIMESTAMP))
            .field(FieldDescriptor::list("delays", 5, CustomKind::NULLABLE_DURATION).expect("delays"))
            .field(FieldDescriptor::scalar("blob", 6, ValueKind::Binary).expect("blob"))
            .build()
            .expect("schema")
    }

    #[test]
    fn test_unknown_field() {
        let mut def = SchemaDefinition::new(&schema());
        assert_eq!(def.get_value::<String>(99), Err(SchemaError::UnknownField(99)));
        assert_eq!(def.set_value(99, 1u8), Err(SchemaError::UnknownField(99)));
        assert_eq!(
            def.set_list(99, Vec::<u8>::new()),
            Err(SchemaError::UnknownField(99))
        );
    }

    #[test]
    fn test_get_materializes_default() {
        let mut def = SchemaDefinition::new(&schema());
        assert!(!def.is_set(0));
        assert_eq!(def.get_value::<String>(0).expect("name"), "");
        assert!(def.is_set(0));

        assert_eq!(def.get_value::<Option<u16>>(3).expect("myUint16"), None);
        assert!(!def.is_set(3));
    }

    #[test]
    fn test_peek_does_not_store() {
        let def = SchemaDefinition::new(&schema());
        assert_eq!(def.peek_value::<String>(0).expect("name"), "");
        assert!(!def.is_set(0));
    }

    #[test]
    fn test_null_rejected_on_non_nullable() {
        let mut def = SchemaDefinition::new(&schema());
        def.set_value(0, "kept").expect("set");
        assert_eq!(
            def.set_value(0, None::<String>),
            Err(SchemaError::FieldNotNullable(0))
        );
        assert_eq!(def.get_value::<String>(0).expect("name"), "kept");

        def.set_value(3, Some(7u16)).expect("set");
        def.set_value(3, None::<u16>).expect("null");
        assert_eq!(def.get_value::<Option<u16>>(3).expect("get"), None);
    }

    #[test]
    fn test_kind_mismatch() {
        let mut def = SchemaDefinition::new(&schema());
        assert_eq!(
            def.set_value(3, "text"),
            Err(SchemaError::InvalidFieldType {
                index: 3,
                provided: "string".into(),
                declared: "uint16".into(),
            })
        );
        assert!(matches!(
            def.set_value(3, 7u32),
            Err(SchemaError::InvalidFieldType { .. })
        ));
        assert!(matches!(
            def.get_value::<i32>(3),
            Err(SchemaError::InvalidFieldType { .. })
        ));
        assert!(matches!(
            def.set_value(1, "not a list"),
            Err(SchemaError::InvalidFieldType { .. })
        ));
    }

    #[test]
    fn test_null_read_as_plain_type_is_a_type_error() {
        let mut def = SchemaDefinition::new(&schema());
        let err = def.get_value::<u16>(3).unwrap_err();
        assert_eq!(
            err,
            SchemaError::InvalidFieldType {
                index: 3,
                provided: "uint16".into(),
                declared: "nullable uint16".into(),
            }
        );
    }

    #[test]
    fn test_list_access() {
        let mut def = SchemaDefinition::new(&schema());
        assert!(def.get_list::<String>(1).expect("empty").is_empty());
        def.set_list(1, ["a", "b"]).expect("set");
        assert_eq!(def.get_list::<String>(1).expect("get"), vec!["a", "b"]);

        assert_eq!(
            def.set_list(2, ["a"]),
            Err(SchemaError::FieldNotAList(2))
        );
        assert!(matches!(
            def.set_list(1, [1u8]),
            Err(SchemaError::InvalidFieldType { .. })
        ));
        assert_eq!(
            def.set_list(1, [Some("a"), None]),
            Err(SchemaError::FieldNotNullable(1))
        );
        assert_eq!(def.get_list::<String>(1).expect("kept"), vec!["a", "b"]);
    }

    #[test]
    fn test_list_of_nullable_custom() {
        let mut def = SchemaDefinition::new(&schema());
        def.set_list(5, [Some(TimeDelta::seconds(1)), None])
            .expect("set");
        assert_eq!(
            def.get_list::<Option<TimeDelta>>(5).expect("get"),
            vec![Some(TimeDelta::seconds(1)), None]
        );
    }

    #[test]
    fn test_map_access() {
        let mut def = SchemaDefinition::new(&schema());
        def.set_map(2, [("on", true), ("off", false)]).expect("set");

        let map: HashMap<String, bool> = def.get_map(2).expect("hash map");
        assert_eq!(map.get("on"), Some(&true));
        let ordered: BTreeMap<String, bool> = def.get_map(2).expect("btree map");
        assert_eq!(ordered.keys().collect::<Vec<_>>(), vec!["off", "on"]);

        assert_eq!(
            def.set_map(1, [("x", true)]),
            Err(SchemaError::FieldNotAMap(1))
        );
        assert!(matches!(
            def.set_map(2, [("x", 1u8)]),
            Err(SchemaError::InvalidFieldType { .. })
        ));
        assert!(matches!(
            def.get_map::<String, u8, Vec<(String, u8)>>(2),
            Err(SchemaError::InvalidFieldType { .. })
        ));
    }

    #[test]
    fn test_nullable_containers() {
        let schema = TypeSchema::builder("Optional")
            .field(
                FieldDescriptor::list("tags", 0, ValueKind::String)
                    .expect("tags")
                    .nullable(),
            )
            .field(
                FieldDescriptor::map("limits", 1, ValueKind::String, ValueKind::Uint32)
                    .expect("limits")
                    .nullable(),
            )
            .build()
            .expect("schema");
        let mut def = SchemaDefinition::new(&schema);

        assert_eq!(def.get_list_opt::<String>(0).expect("unset tags"), None);
        assert_eq!(
            def.get_map_opt::<String, u32, Vec<(String, u32)>>(1)
                .expect("unset limits"),
            None
        );
        assert_eq!(
            def.get_list::<String>(0),
            Err(SchemaError::InvalidFieldType {
                index: 0,
                provided: "string".into(),
                declared: "nullable list".into(),
            })
        );

        def.set_list(0, ["a"]).expect("tags");
        def.set_map(1, [("cpu", 4u32)]).expect("limits");
        assert_eq!(
            def.get_list_opt::<String>(0).expect("tags"),
            Some(vec!["a".to_string()])
        );
        let limits: Option<HashMap<String, u32>> = def.get_map_opt(1).expect("limits");
        assert_eq!(limits.and_then(|m| m.get("cpu").copied()), Some(4));

        def.set_null(0).expect("null tags");
        def.set_null(1).expect("null limits");
        assert!(def.is_set(0));
        assert_eq!(def.get_list_opt::<String>(0).expect("tags"), None);
        assert_eq!(
            def.get_map_opt::<String, u32, Vec<(String, u32)>>(1)
                .expect("limits"),
            None
        );
    }

    #[test]
    fn test_set_null_requires_nullable() {
        let mut def = SchemaDefinition::new(&schema());
        def.set_list(1, ["kept"]).expect("names");
        assert_eq!(def.set_null(1), Err(SchemaError::FieldNotNullable(1)));
        assert_eq!(def.set_null(0), Err(SchemaError::FieldNotNullable(0)));
        assert_eq!(def.set_null(99), Err(SchemaError::UnknownField(99)));
        assert_eq!(def.get_list::<String>(1).expect("names"), vec!["kept"]);

        def.set_null(3).expect("nullable scalar");
        assert_eq!(def.get_value::<Option<u16>>(3).expect("myUint16"), None);
    }

    #[test]
    fn test_custom_and_binary_fields() {
        let mut def = SchemaDefinition::new(&schema());
        let created = Utc.with_ymd_and_hms(2020, 5, 6, 7, 8, 9).unwrap();
        def.set_value(4, created).expect("set");
        assert_eq!(def.get_value::<DateTime<Utc>>(4).expect("get"), created);
        assert!(matches!(
            def.set_value(4, TimeDelta::seconds(1)),
            Err(SchemaError::InvalidFieldType { .. })
        ));

        def.set_value(6, vec![1u8, 2, 3]).expect("set");
        assert_eq!(def.get_value::<Vec<u8>>(6).expect("get"), vec![1, 2, 3]);
    }
}
