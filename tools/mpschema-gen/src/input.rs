// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! JSON document describing packages, files, types and fields.

use mpschema::ValueKind;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateInput {
    pub root: String,
    pub packages: Vec<Package>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    pub name: String,
    pub path: String,
    pub files: Vec<File>,
    pub sub_packages: Vec<Package>,
    pub import_type_ids: Vec<Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct File {
    pub id: String,
    pub path: String,
    pub version: i64,
    /// `null` for a file that declares no types.
    pub types: Option<Vec<TypeDecl>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeDecl {
    pub id: String,
    pub name: String,
    pub modifier: String,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub name: String,
    pub index: i64,
    #[serde(default)]
    pub default_value: Option<Value>,
    #[serde(default)]
    pub metadata: Option<Value>,
    #[serde(rename = "type")]
    pub ty: TypeArg,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeArg {
    pub nullable: bool,
    pub primitive: Primitive,
    pub type_arguments: Option<Vec<TypeArg>>,
    pub type_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Primitive {
    Binary,
    Boolean,
    Float32,
    Float64,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    String,
    List,
    Map,
}

impl Primitive {
    pub fn kind(self) -> ValueKind {
        match self {
            Self::Binary => ValueKind::Binary,
            Self::Boolean => ValueKind::Boolean,
            Self::Float32 => ValueKind::Float32,
            Self::Float64 => ValueKind::Float64,
            Self::Int8 => ValueKind::Int8,
            Self::Int16 => ValueKind::Int16,
            Self::Int32 => ValueKind::Int32,
            Self::Int64 => ValueKind::Int64,
            Self::Uint8 => ValueKind::Uint8,
            Self::Uint16 => ValueKind::Uint16,
            Self::Uint32 => ValueKind::Uint32,
            Self::Uint64 => ValueKind::Uint64,
            Self::String => ValueKind::String,
            Self::List => ValueKind::List,
            Self::Map => ValueKind::Map,
        }
    }
}

impl GenerateInput {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
