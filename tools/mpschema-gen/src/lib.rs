// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! mpschema-gen - schema compiler front end.
//!
//! Parses the JSON type description, validates each type by building its
//! runtime [`mpschema::TypeSchema`], and acknowledges the document. No
//! source code is emitted.

pub mod convert;
pub mod input;
pub mod transport;
