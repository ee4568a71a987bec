// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Path-based access to untyped Kubernetes objects.
//!
//! Custom resources are listed as plain JSON; nothing about their schema is
//! assumed beyond the few paths read through the accessors below. Every accessor
//! returns `None` both when a segment is missing and when the value at the path
//! has a different JSON type.

use serde_json::{Map, Value};

/// One listed object, as returned by the API server
#[derive(Debug, Clone, PartialEq)]
pub struct RawObject(Value);

impl RawObject {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Object name from `metadata.name`, empty when missing
    pub fn name(&self) -> &str {
        self.get_string(&["metadata", "name"]).unwrap_or_default()
    }

    /// Walk a dotted path one segment at a time
    fn get(&self, path: &[&str]) -> Option<&Value> {
        path.iter()
            .try_fold(&self.0, |current, segment| current.as_object()?.get(*segment))
    }

    pub fn get_string(&self, path: &[&str]) -> Option<&str> {
        self.get(path)?.as_str()
    }

    pub fn get_slice(&self, path: &[&str]) -> Option<&[Value]> {
        self.get(path)?.as_array().map(Vec::as_slice)
    }

    pub fn get_map(&self, path: &[&str]) -> Option<&Map<String, Value>> {
        self.get(path)?.as_object()
    }
}
