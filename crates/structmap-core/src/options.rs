//! Mapping options
//!
//! Options can be built in code or loaded from any serde-supported
//! configuration document; missing keys fall back to the defaults.

use serde::{Deserialize, Serialize};

/// Default recursion limit for nested records
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Options shared by encode and decode calls
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperOptions {
    /// Leave zero-valued fields out of the tree built when encoding
    pub omit_empty: bool,

    /// Hydrate by merging into the current destination instead of replacing it
    pub merge_into_destination: bool,

    /// Maximum nesting depth of records in either direction
    pub max_depth: usize,
}

impl Default for MapperOptions {
    fn default() -> Self {
        Self {
            omit_empty: true,
            merge_into_destination: true,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl MapperOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_omit_empty(mut self, omit_empty: bool) -> Self {
        self.omit_empty = omit_empty;
        self
    }

    pub fn with_merge_into_destination(mut self, merge: bool) -> Self {
        self.merge_into_destination = merge;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}
