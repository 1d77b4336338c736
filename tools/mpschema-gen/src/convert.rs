// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Input document -> validated runtime schemas.
//!
//! Every declared type becomes one [`TypeSchema`], named
//! `<package>.<type>`. Fields are ordered by index before building, so the
//! runtime's density check reports gaps and duplicates. Literal
//! `defaultValue`s become default providers.

use crate::input::{Field, GenerateInput, Package, TypeArg, TypeDecl};
use anyhow::{anyhow, bail, Context, Result};
use mpschema::{FieldDescriptor, FieldMap, FieldValue, TypeArgument, TypeSchema, ValueKind};
use serde_json::Value;
use std::sync::Arc;

/// Build the schema of every type in every package, depth first.
pub fn schemas(input: &GenerateInput) -> Result<Vec<Arc<TypeSchema>>> {
    let mut out = Vec::new();
    for package in &input.packages {
        collect_package(package, &mut out)?;
    }
    tracing::debug!("converted {} types under {}", out.len(), input.root);
    Ok(out)
}

fn collect_package(package: &Package, out: &mut Vec<Arc<TypeSchema>>) -> Result<()> {
    for file in &package.files {
        for decl in file.types.iter().flatten() {
            let schema = type_schema(&package.name, decl)
                .with_context(|| format!("in {} ({})", file.path, file.id))?;
            out.push(schema);
        }
    }
    for sub in &package.sub_packages {
        collect_package(sub, out)?;
    }
    Ok(())
}

/// Schema for a single type declaration.
pub fn type_schema(package: &str, decl: &TypeDecl) -> Result<Arc<TypeSchema>> {
    let name = format!("{}.{}", package, decl.name);
    let mut fields: Vec<&Field> = decl.fields.iter().collect();
    fields.sort_by_key(|field| field.index);

    let mut builder = TypeSchema::builder(name.clone());
    for field in fields {
        let descriptor =
            descriptor(field).with_context(|| format!("type `{}`, field `{}`", name, field.name))?;
        builder = match &field.default_value {
            None | Some(Value::Null) => builder.field(descriptor),
            Some(literal) => {
                let value = literal_default(descriptor.value_kind(), literal)
                    .with_context(|| format!("type `{}`, field `{}`", name, field.name))?;
                builder.field_with_default(descriptor, move || value.clone())
            }
        };
    }
    builder
        .build()
        .with_context(|| format!("type `{}`", name))
}

fn descriptor(field: &Field) -> Result<FieldDescriptor> {
    let index = usize::try_from(field.index)
        .map_err(|_| anyhow!("negative index {}", field.index))?;
    let arguments = field
        .ty
        .type_arguments
        .iter()
        .flatten()
        .map(type_argument)
        .collect::<Result<Vec<_>>>()?;
    let descriptor = FieldDescriptor::new(
        field.name.as_str(),
        index,
        field.ty.nullable,
        field.ty.primitive.kind(),
        None,
        arguments,
    )?;
    Ok(descriptor)
}

fn type_argument(arg: &TypeArg) -> Result<TypeArgument> {
    if arg.nullable {
        bail!(
            "nullable element kind {} is not supported; null elements need a custom kind \
             with a `?` wrapper marker, such as `duration?`",
            arg.primitive.kind()
        );
    }
    Ok(TypeArgument::of(arg.primitive.kind()))
}

/// Literal default for a scalar field. Containers only take `[]` / `{}`.
fn literal_default(kind: ValueKind, literal: &Value) -> Result<FieldValue> {
    let value = match (kind, literal) {
        (ValueKind::Boolean, Value::Bool(b)) => Some(FieldValue::Boolean(*b)),
        (ValueKind::String, Value::String(s)) => Some(FieldValue::String(s.clone())),
        (ValueKind::Uint8, Value::Number(n)) => unsigned(n).map(FieldValue::Uint8),
        (ValueKind::Uint16, Value::Number(n)) => unsigned(n).map(FieldValue::Uint16),
        (ValueKind::Uint32, Value::Number(n)) => unsigned(n).map(FieldValue::Uint32),
        (ValueKind::Uint64, Value::Number(n)) => n.as_u64().map(FieldValue::Uint64),
        (ValueKind::Int8, Value::Number(n)) => signed(n).map(FieldValue::Int8),
        (ValueKind::Int16, Value::Number(n)) => signed(n).map(FieldValue::Int16),
        (ValueKind::Int32, Value::Number(n)) => signed(n).map(FieldValue::Int32),
        (ValueKind::Int64, Value::Number(n)) => n.as_i64().map(FieldValue::Int64),
        (ValueKind::Float32, Value::Number(n)) => n.as_f64().map(|f| FieldValue::Float32(f as f32)),
        (ValueKind::Float64, Value::Number(n)) => n.as_f64().map(FieldValue::Float64),
        (ValueKind::List, Value::Array(items)) if items.is_empty() => {
            Some(FieldValue::List(Vec::new()))
        }
        (ValueKind::Map, Value::Object(entries)) if entries.is_empty() => {
            Some(FieldValue::Map(FieldMap::new()))
        }
        _ => None,
    };
    value.ok_or_else(|| anyhow!("default value {} does not fit {}", literal, kind))
}

fn unsigned<T: TryFrom<u64>>(n: &serde_json::Number) -> Option<T> {
    n.as_u64().and_then(|v| T::try_from(v).ok())
}

fn signed<T: TryFrom<i64>>(n: &serde_json::Number) -> Option<T> {
    n.as_i64().and_then(|v| T::try_from(v).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mpschema::{SchemaDefinition, SchemaError};
    use serde_json::json;

    fn decl(fields: Value) -> TypeDecl {
        serde_json::from_value(json!({
            "id": "t1",
            "name": "DefaultType",
            "modifier": "",
            "fields": fields,
        }))
        .expect("type declaration")
    }

    fn ty(primitive: &str, nullable: bool, args: &[&str]) -> Value {
        let args: Vec<Value> = args
            .iter()
            .map(|p| json!({ "nullable": false, "primitive": p, "typeArguments": null, "typeName": "" }))
            .collect();
        let args = if args.is_empty() {
            Value::Null
        } else {
            Value::Array(args)
        };
        json!({
            "nullable": nullable,
            "primitive": primitive,
            "typeArguments": args,
            "typeName": "",
        })
    }

    #[test]
    fn test_default_type_fields() {
        let decl = decl(json!([
            { "name": "config", "index": 2, "type": ty("map", false, &["string", "boolean"]) },
            { "name": "name", "index": 0, "type": ty("string", false, &[]) },
            { "name": "names", "index": 1, "type": ty("list", false, &["string"]) },
            { "name": "myUint16", "index": 3, "type": ty("uint16", true, &[]) },
        ]));
        let schema = type_schema("test", &decl).expect("schema");
        assert_eq!(schema.name(), "test.DefaultType");
        let names: Vec<&str> = schema.fields().iter().map(|f| f.name()).collect();
        assert_eq!(names, ["name", "names", "config", "myUint16"]);
        assert!(schema.fields()[3].is_nullable());
        assert_eq!(schema.fields()[2].value_kind(), ValueKind::Map);
    }

    #[test]
    fn test_literal_defaults() {
        let decl = decl(json!([
            { "name": "retries", "index": 0, "defaultValue": 3, "type": ty("uint8", false, &[]) },
            { "name": "label", "index": 1, "defaultValue": "none", "type": ty("string", false, &[]) },
            { "name": "ratio", "index": 2, "defaultValue": 0.5, "type": ty("float64", false, &[]) },
        ]));
        let schema = type_schema("test", &decl).expect("schema");
        let mut def = SchemaDefinition::new(&schema);
        assert_eq!(def.get_value::<u8>(0).expect("retries"), 3);
        assert_eq!(def.get_value::<String>(1).expect("label"), "none");
        assert_eq!(def.get_value::<f64>(2).expect("ratio"), 0.5);
    }

    #[test]
    fn test_bad_default_rejected() {
        let decl = decl(json!([
            { "name": "small", "index": 0, "defaultValue": 300, "type": ty("uint8", false, &[]) },
        ]));
        let err = type_schema("test", &decl).unwrap_err();
        assert!(format!("{err:#}").contains("does not fit uint8"), "{err:#}");
    }

    #[test]
    fn test_nested_container_rejected() {
        let decl = decl(json!([
            { "name": "grid", "index": 0, "type": ty("list", false, &["list"]) },
        ]));
        let err = type_schema("test", &decl).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SchemaError>(),
            Some(SchemaError::NestedContainer(_))
        ));
    }

    #[test]
    fn test_nullable_element_points_to_wrapper() {
        let mut field_type = ty("list", false, &["string"]);
        field_type["typeArguments"][0]["nullable"] = Value::Bool(true);
        let decl = decl(json!([
            { "name": "labels", "index": 0, "type": field_type },
        ]));
        let err = type_schema("test", &decl).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("nullable element kind string"), "{message}");
        assert!(message.contains("`?` wrapper marker"), "{message}");
    }

    #[test]
    fn test_sparse_indices_rejected() {
        let decl = decl(json!([
            { "name": "a", "index": 0, "type": ty("int32", false, &[]) },
            { "name": "c", "index": 2, "type": ty("int32", false, &[]) },
        ]));
        let err = type_schema("test", &decl).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SchemaError>(),
            Some(SchemaError::InvalidDescriptor { .. })
        ));
    }

    #[test]
    fn test_sub_packages_are_walked() {
        let input: GenerateInput = serde_json::from_value(json!({
            "root": ".",
            "packages": [{
                "name": "outer", "path": "outer", "importTypeIds": [],
                "files": [],
                "subPackages": [{
                    "name": "outer.inner", "path": "outer/inner", "importTypeIds": [],
                    "subPackages": [],
                    "files": [{
                        "id": "f", "path": "outer/inner/a.mpc", "version": 1,
                        "types": [{ "id": "t", "name": "Ping", "modifier": "", "fields": [
                            { "name": "seq", "index": 0, "type": ty("uint32", false, &[]) }
                        ]}]
                    }]
                }]
            }]
        }))
        .expect("input");
        let all = schemas(&input).expect("schemas");
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name(), "outer.inner.Ping");
    }
}
