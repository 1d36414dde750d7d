//! Route registration: the handler registry the generator consumes.
//!
//! Registrations are declarative. Nothing here touches conversion; the
//! registry is just the ordered record of paths, methods and per-operation
//! configuration that [`crate::generator::Generator::generate`] walks.

use std::collections::BTreeMap;
use std::sync::Arc;

use http::Method;

use crate::generator::Authenticator;
use crate::schema::SchemaHandle;

/// Response declaration for one operation.
#[derive(Debug, Clone, Default)]
pub enum Responses {
  /// Nothing declared; the operation still gets the shared `default` error
  /// entry.
  #[default]
  None,
  /// A single `200` response.
  Single(SchemaHandle),
  /// One entry per status code. `None` marks a response with no body, such
  /// as a `204`.
  ByStatus(BTreeMap<u16, Option<SchemaHandle>>),
}

/// Header schema for one operation.
#[derive(Debug, Clone, Default)]
pub enum HeaderSelection {
  /// Inherit the registry-wide default headers schema, if one is set.
  #[default]
  UseDefault,
  /// No header parameters, even when a registry default exists.
  Omit,
  Schema(SchemaHandle),
}

/// One authenticator slot on an operation.
#[derive(Debug, Clone)]
pub enum AuthenticatorSelection {
  /// Expand to the registry-wide default authenticators.
  UseDefault,
  Use(Arc<Authenticator>),
}

/// Everything the generator needs to know about one route handler.
#[derive(Debug, Clone, bon::Builder)]
pub struct PathDefinition {
  /// Handler function name; the operationId when no override is given.
  #[builder(into)]
  pub func_name: String,
  /// Free-form documentation. The first paragraph (up to a blank line)
  /// becomes the operation summary, the remainder its description.
  #[builder(into)]
  pub doc: Option<String>,
  #[builder(into)]
  pub operation_id: Option<String>,
  pub request_body_schema: Option<SchemaHandle>,
  pub query_string_schema: Option<SchemaHandle>,
  #[builder(default)]
  pub headers_schema: HeaderSelection,
  #[builder(default)]
  pub responses: Responses,
  /// Defaults to a single [`AuthenticatorSelection::UseDefault`] slot; pass
  /// an empty list for an explicitly unauthenticated operation.
  #[builder(default = vec![AuthenticatorSelection::UseDefault])]
  pub authenticators: Vec<AuthenticatorSelection>,
  #[builder(default)]
  pub tags: Vec<String>,
  /// Excluded from the generated document, but still registered.
  #[builder(default)]
  pub hidden: bool,
}

impl PathDefinition {
  /// The concrete authenticators for this operation, with `UseDefault`
  /// slots expanded in place.
  pub(crate) fn effective_authenticators(&self, defaults: &[Arc<Authenticator>]) -> Vec<Arc<Authenticator>> {
    let mut authenticators = Vec::new();
    for selection in &self.authenticators {
      match selection {
        AuthenticatorSelection::UseDefault => authenticators.extend(defaults.iter().cloned()),
        AuthenticatorSelection::Use(authenticator) => authenticators.push(Arc::clone(authenticator)),
      }
    }
    authenticators
  }

  pub(crate) fn effective_headers(&self, default: Option<&SchemaHandle>) -> Option<SchemaHandle> {
    match &self.headers_schema {
      HeaderSelection::UseDefault => default.cloned(),
      HeaderSelection::Omit => None,
      HeaderSelection::Schema(schema) => Some(Arc::clone(schema)),
    }
  }
}

/// The ordered record of every registered route.
///
/// Paths and methods live in `BTreeMap`s so iteration, and therefore the
/// generated document, is deterministic.
#[derive(Default)]
pub struct HandlerRegistry {
  paths: BTreeMap<String, BTreeMap<String, PathDefinition>>,
  default_authenticators: Vec<Arc<Authenticator>>,
  default_headers_schema: Option<SchemaHandle>,
}

impl HandlerRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Register one handler. Registering the same path and method again
  /// replaces the earlier definition.
  pub fn add_handler(&mut self, path: impl Into<String>, method: Method, definition: PathDefinition) {
    self
      .paths
      .entry(path.into())
      .or_default()
      .insert(method.as_str().to_ascii_lowercase(), definition);
  }

  /// Authenticators applied wherever an operation keeps the default slot.
  pub fn set_default_authenticators(&mut self, authenticators: Vec<Arc<Authenticator>>) {
    self.default_authenticators = authenticators;
  }

  /// Headers schema applied wherever an operation keeps the default
  /// selection.
  pub fn set_default_headers_schema(&mut self, schema: SchemaHandle) {
    self.default_headers_schema = Some(schema);
  }

  pub fn paths(&self) -> impl Iterator<Item = (&str, &BTreeMap<String, PathDefinition>)> {
    self.paths.iter().map(|(path, methods)| (path.as_str(), methods))
  }

  pub fn default_authenticators(&self) -> &[Arc<Authenticator>] {
    &self.default_authenticators
  }

  pub fn default_headers_schema(&self) -> Option<&SchemaHandle> {
    self.default_headers_schema.as_ref()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_definition_defaults() {
    let definition = PathDefinition::builder().func_name("get_pet").build();
    assert!(definition.doc.is_none());
    assert!(!definition.hidden);
    assert!(matches!(definition.responses, Responses::None));
    assert!(matches!(definition.headers_schema, HeaderSelection::UseDefault));
    assert!(matches!(
      definition.authenticators.as_slice(),
      [AuthenticatorSelection::UseDefault]
    ));
  }

  #[test]
  fn test_effective_authenticators_expands_defaults_in_place() {
    let default_auth = Arc::new(Authenticator::header_api_key("default", "X-Default"));
    let extra = Arc::new(Authenticator::header_api_key("extra", "X-Extra"));
    let definition = PathDefinition::builder()
      .func_name("get_pet")
      .authenticators(vec![
        AuthenticatorSelection::Use(Arc::clone(&extra)),
        AuthenticatorSelection::UseDefault,
      ])
      .build();

    let effective = definition.effective_authenticators(std::slice::from_ref(&default_auth));
    let names: Vec<&str> = effective.iter().map(|a| a.scheme_name()).collect();
    assert_eq!(names, vec!["extra", "default"]);
  }

  #[test]
  fn test_methods_iterate_in_sorted_order() {
    let mut registry = HandlerRegistry::new();
    registry.add_handler("/pets", Method::POST, PathDefinition::builder().func_name("create_pet").build());
    registry.add_handler("/pets", Method::GET, PathDefinition::builder().func_name("list_pets").build());

    let (path, methods) = registry.paths().next().unwrap();
    assert_eq!(path, "/pets");
    let method_names: Vec<&str> = methods.keys().map(String::as_str).collect();
    assert_eq!(method_names, vec!["get", "post"]);
  }
}
