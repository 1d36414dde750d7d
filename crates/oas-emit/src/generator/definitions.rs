//! The document-wide definitions table.
//!
//! Keyed by schema node identity so a schema shared by several operations is
//! converted exactly once, and so a node encountered again while its own
//! conversion is still in progress resolves to a reference instead of
//! recursing forever.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde_json::{Value, json};

use super::OpenApiVersion;
use crate::errors::BuildError;
use crate::words;

pub(crate) struct DefinitionStore {
  /// Node identity to assigned definition name, reserved before the node's
  /// body is converted.
  assigned: HashMap<usize, String>,
  reserved: BTreeSet<String>,
  definitions: BTreeMap<String, Value>,
  referenced: BTreeSet<String>,
  ref_base: &'static str,
}

impl DefinitionStore {
  pub(crate) fn new(version: OpenApiVersion) -> Self {
    Self {
      assigned: HashMap::new(),
      reserved: BTreeSet::new(),
      definitions: BTreeMap::new(),
      referenced: BTreeSet::new(),
      ref_base: version.ref_base(),
    }
  }

  pub(crate) fn assigned_name(&self, key: usize) -> Option<String> {
    self.assigned.get(&key).cloned()
  }

  /// Reserve a collision-free name for a node and mark it in progress.
  pub(crate) fn reserve(&mut self, key: usize, base_name: &str) -> String {
    let name = ensure_unique(base_name, &self.reserved);
    self.reserved.insert(name.clone());
    self.assigned.insert(key, name.clone());
    name
  }

  pub(crate) fn complete(&mut self, name: String, body: Value) {
    self.definitions.insert(name, body);
  }

  /// Record that `name` is referenced and produce the `$ref` fragment.
  pub(crate) fn reference(&mut self, name: &str) -> Value {
    self.referenced.insert(name.to_string());
    json!({ words::REF: format!("{}/{name}", self.ref_base) })
  }

  /// Every reference handed out must point at a completed definition by the
  /// time the document is assembled. A miss means the walk's in-progress
  /// protocol was broken somewhere.
  pub(crate) fn audit(&self) -> Result<(), BuildError> {
    for name in &self.referenced {
      if !self.definitions.contains_key(name) {
        return Err(BuildError::UnresolvedReference { name: name.clone() });
      }
    }
    Ok(())
  }

  pub(crate) fn into_definitions(self) -> BTreeMap<String, Value> {
    self.definitions
  }
}

/// Resolve a name collision by suffixing: `Name`, `Name2`, `Name3`, ...
pub(crate) fn ensure_unique(base_name: &str, used_names: &BTreeSet<String>) -> String {
  if !used_names.contains(base_name) {
    return base_name.to_string();
  }

  let mut i = 2;
  loop {
    let candidate = format!("{base_name}{i}");
    if !used_names.contains(&candidate) {
      return candidate;
    }
    i += 1;
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_ensure_unique_no_collision() {
    let used = BTreeSet::new();
    assert_eq!(ensure_unique("Pet", &used), "Pet");
  }

  #[test]
  fn test_ensure_unique_suffixes_deterministically() {
    let mut used = BTreeSet::new();
    used.insert("Pet".to_string());
    assert_eq!(ensure_unique("Pet", &used), "Pet2");

    used.insert("Pet2".to_string());
    assert_eq!(ensure_unique("Pet", &used), "Pet3");
  }

  #[test]
  fn test_ensure_unique_skips_to_open_suffix() {
    let mut used = BTreeSet::new();
    used.insert("Pet".to_string());
    used.insert("Pet3".to_string());
    assert_eq!(ensure_unique("Pet", &used), "Pet2");
  }

  #[test]
  fn test_audit_flags_incomplete_reference() {
    let mut store = DefinitionStore::new(OpenApiVersion::V2);
    let name = store.reserve(1, "Ghost");
    let _ = store.reference(&name);
    assert!(matches!(
      store.audit(),
      Err(BuildError::UnresolvedReference { name }) if name == "Ghost"
    ));
  }

  #[test]
  fn test_audit_passes_once_completed() {
    let mut store = DefinitionStore::new(OpenApiVersion::V3);
    let name = store.reserve(1, "Pet");
    let reference = store.reference(&name);
    assert_eq!(
      reference,
      json!({ "$ref": "#/components/schemas/Pet" })
    );
    store.complete(name, json!({ "type": "object" }));
    assert!(store.audit().is_ok());
  }
}
