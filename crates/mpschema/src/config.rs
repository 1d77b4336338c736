// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Decode limits.
//!
//! Length headers in untrusted input are checked against these limits before
//! anything is allocated.
//!
//! # Example
//!
//! ```
//! use mpschema::config::DecodeLimits;
//!
//! let limits = DecodeLimits::default().with_max_collection_len(1024);
//! assert_eq!(limits.max_collection_len, 1024);
//! ```

// =======================================================================
// Defaults
// =======================================================================

/// Default maximum number of list elements or map entries (1 Mi).
pub const DEFAULT_MAX_COLLECTION_LEN: usize = 1 << 20;

/// Default maximum binary payload (64 MiB).
pub const DEFAULT_MAX_BINARY_LEN: usize = 64 << 20;

/// Default maximum UTF-8 string payload (16 MiB).
pub const DEFAULT_MAX_STRING_LEN: usize = 16 << 20;

/// Upper bounds applied while decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeLimits {
    /// Maximum array or map header count.
    pub max_collection_len: usize,
    /// Maximum bin payload length in bytes.
    pub max_binary_len: usize,
    /// Maximum str payload length in bytes.
    pub max_string_len: usize,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_collection_len: DEFAULT_MAX_COLLECTION_LEN,
            max_binary_len: DEFAULT_MAX_BINARY_LEN,
            max_string_len: DEFAULT_MAX_STRING_LEN,
        }
    }
}

impl DecodeLimits {
    /// No limit beyond the input length itself.
    pub fn unlimited() -> Self {
        Self {
            max_collection_len: usize::MAX,
            max_binary_len: usize::MAX,
            max_string_len: usize::MAX,
        }
    }

    pub fn with_max_collection_len(mut self, max: usize) -> Self {
        self.max_collection_len = max;
        self
    }

    pub fn with_max_binary_len(mut self, max: usize) -> Self {
        self.max_binary_len = max;
        self
    }

    pub fn with_max_string_len(mut self, max: usize) -> Self {
        self.max_string_len = max;
        self
    }
}
