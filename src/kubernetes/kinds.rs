// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Kind name resolution.
//!
//! Maps the short kind names callers send (e.g. "VsphereVMAnsible") to the
//! group/version/plural triple the Kubernetes API addresses collections by.
//! The table is built once at startup and only read afterwards.

use anyhow::{Result, bail};
use kube::api::{ApiResource, GroupVersionKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// API group shared by the built-in custom resources
const STUTTGART_THINGS_GROUP: &str = "resources.stuttgart-things.com";

/// Filter token selecting the default kind set
const WILDCARD: &str = "*";

/// Fully-qualified address of one collection of custom resources
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionId {
    /// Kind name used by callers and as the object Kind (e.g. "AnsibleRun")
    pub kind: String,
    pub group: String,
    pub version: String,
    /// Lowercase plural resource name (e.g. "ansibleruns")
    pub plural: String,
}

impl CollectionId {
    pub fn new(kind: &str, group: &str, version: &str, plural: &str) -> Self {
        Self {
            kind: kind.to_string(),
            group: group.to_string(),
            version: version.to_string(),
            plural: plural.to_string(),
        }
    }

    /// Get the full API group/version string
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }

    /// Build the dynamic API resource used for listing
    pub fn api_resource(&self) -> ApiResource {
        let gvk = GroupVersionKind::gvk(&self.group, &self.version, &self.kind);
        ApiResource::from_gvk_with_plural(&gvk, &self.plural)
    }
}

impl std::fmt::Display for CollectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.api_version(), self.plural)
    }
}

/// Static kind table plus the ordered default kind set
#[derive(Debug, Clone)]
pub struct KindMapping {
    by_kind: HashMap<String, CollectionId>,
    defaults: Vec<String>,
}

impl KindMapping {
    /// Build a mapping, rejecting duplicate kind names
    pub fn new(entries: Vec<CollectionId>, defaults: Vec<String>) -> Result<Self> {
        let mut by_kind = HashMap::with_capacity(entries.len());
        for entry in entries {
            if entry.kind.is_empty() {
                bail!("Kind mapping contains an entry with an empty kind name");
            }
            if by_kind.contains_key(&entry.kind) {
                bail!("Kind '{}' is mapped more than once", entry.kind);
            }
            by_kind.insert(entry.kind.clone(), entry);
        }

        Ok(Self { by_kind, defaults })
    }

    /// Look up the collection for a kind name (exact, case-sensitive)
    pub fn resolve(&self, kind: &str) -> Option<&CollectionId> {
        self.by_kind.get(kind)
    }

    /// Expand a raw comma-separated filter into the ordered list of kind names to query.
    ///
    /// An empty filter or a lone `*` selects the default kind set. Tokens are kept
    /// verbatim; whether they resolve is decided later, per kind.
    pub fn expand_filter(&self, filter: &str) -> Vec<String> {
        if filter.is_empty() || filter == WILDCARD {
            return self.defaults.clone();
        }
        filter.split(',').map(String::from).collect()
    }

    pub fn default_kinds(&self) -> &[String] {
        &self.defaults
    }

    /// Known kind names, sorted
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.by_kind.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }
}

/// Collections served when no kind table is configured
pub fn builtin_collections() -> Vec<CollectionId> {
    vec![
        CollectionId::new("AnsibleRun", STUTTGART_THINGS_GROUP, "v1alpha1", "ansibleruns"),
        CollectionId::new(
            "VsphereVMAnsible",
            STUTTGART_THINGS_GROUP,
            "v1alpha1",
            "vspherevmansibles",
        ),
    ]
}

/// Kinds queried for an empty or `*` filter when none are configured
pub fn builtin_default_kinds() -> Vec<String> {
    vec!["AnsibleRun".to_string(), "VsphereVMAnsible".to_string()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping() -> KindMapping {
        KindMapping::new(builtin_collections(), builtin_default_kinds()).unwrap()
    }

    #[test]
    fn test_resolve_known_kind() {
        let mapping = mapping();
        let id = mapping.resolve("VsphereVMAnsible").unwrap();
        assert_eq!(id.group, "resources.stuttgart-things.com");
        assert_eq!(id.version, "v1alpha1");
        assert_eq!(id.plural, "vspherevmansibles");
    }

    #[test]
    fn test_resolve_is_case_sensitive() {
        let mapping = mapping();
        assert!(mapping.resolve("ansiblerun").is_none());
        assert!(mapping.resolve("ANSIBLERUN").is_none());
        assert!(mapping.resolve("AnsibleRun").is_some());
    }

    #[test]
    fn test_resolve_unknown_and_empty() {
        let mapping = mapping();
        assert!(mapping.resolve("Bogus").is_none());
        assert!(mapping.resolve("").is_none());
        assert!(mapping.resolve(" AnsibleRun").is_none());
    }

    #[test]
    fn test_expand_empty_filter_uses_defaults() {
        let mapping = mapping();
        assert_eq!(mapping.expand_filter(""), vec!["AnsibleRun", "VsphereVMAnsible"]);
    }

    #[test]
    fn test_expand_wildcard_uses_defaults() {
        let mapping = mapping();
        assert_eq!(mapping.expand_filter("*"), vec!["AnsibleRun", "VsphereVMAnsible"]);
    }

    #[test]
    fn test_expand_keeps_caller_order() {
        let mapping = mapping();
        assert_eq!(
            mapping.expand_filter("VsphereVMAnsible,AnsibleRun"),
            vec!["VsphereVMAnsible", "AnsibleRun"]
        );
    }

    #[test]
    fn test_expand_keeps_tokens_verbatim() {
        let mapping = mapping();
        // Wildcard only counts on its own
        assert_eq!(mapping.expand_filter("*,AnsibleRun"), vec!["*", "AnsibleRun"]);
        assert_eq!(mapping.expand_filter("a, b"), vec!["a", " b"]);
        assert_eq!(mapping.expand_filter(","), vec!["", ""]);
    }

    #[test]
    fn test_duplicate_kind_rejected() {
        let mut entries = builtin_collections();
        entries.push(CollectionId::new("AnsibleRun", "other.io", "v1", "ansibleruns"));
        let err = KindMapping::new(entries, vec![]).unwrap_err();
        assert!(err.to_string().contains("AnsibleRun"));
    }

    #[test]
    fn test_empty_kind_rejected() {
        let entries = vec![CollectionId::new("", "other.io", "v1", "things")];
        assert!(KindMapping::new(entries, vec![]).is_err());
    }

    #[test]
    fn test_api_resource() {
        let mapping = mapping();
        let ar = mapping.resolve("AnsibleRun").unwrap().api_resource();
        assert_eq!(ar.group, "resources.stuttgart-things.com");
        assert_eq!(ar.version, "v1alpha1");
        assert_eq!(ar.api_version, "resources.stuttgart-things.com/v1alpha1");
        assert_eq!(ar.kind, "AnsibleRun");
        assert_eq!(ar.plural, "ansibleruns");
    }

    #[test]
    fn test_display_and_kinds() {
        let mapping = mapping();
        let id = mapping.resolve("AnsibleRun").unwrap();
        assert_eq!(id.to_string(), "resources.stuttgart-things.com/v1alpha1/ansibleruns");
        assert_eq!(mapping.kinds(), vec!["AnsibleRun", "VsphereVMAnsible"]);
        assert_eq!(mapping.default_kinds().len(), 2);
    }
}
