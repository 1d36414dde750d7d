//! Final document assembly.
//!
//! The generator owns the per-context converter registries, the
//! authenticator registry, and the document metadata; [`Generator::generate`]
//! walks a [`HandlerRegistry`] and produces the complete, recursively
//! key-sorted JSON document.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use itertools::Itertools;
use serde_json::{Map, Value, json};

use super::OpenApiVersion;
use super::converters::{ConversionContext, ConverterRegistry, fragment_value};
use super::definitions::DefinitionStore;
use super::paths::{PathArgument, format_path};
use super::security::{Authenticator, AuthenticatorConverterRegistry};
use crate::errors::BuildError;
use crate::registry::{AuthenticatorSelection, HandlerRegistry, PathDefinition, Responses};
use crate::schema::SchemaHandle;
use crate::validation;
use crate::words;

/// A top-level tag object for grouping operations.
#[derive(Debug, Clone, serde::Serialize, bon::Builder)]
pub struct TagObject {
  #[builder(into)]
  pub name: String,
  #[builder(into)]
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
}

/// The parameter type emitted for one path placeholder converter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathParameterType {
  pub type_word: String,
  pub format: Option<String>,
}

fn default_path_converters() -> BTreeMap<String, PathParameterType> {
  let mut converters = BTreeMap::new();
  let mut insert = |tag: &str, type_word: &str, format: Option<&str>| {
    converters.insert(
      tag.to_string(),
      PathParameterType {
        type_word: type_word.to_string(),
        format: format.map(str::to_string),
      },
    );
  };
  insert("string", words::STRING, None);
  insert("path", words::STRING, None);
  insert("int", words::INTEGER, None);
  insert("float", words::NUMBER, None);
  insert("uuid", words::STRING, Some(words::UUID));
  converters
}

/// One configured document build.
///
/// Registries default to the stock converter sets; replace them wholesale or
/// mutate them after building when custom field variants are in play.
#[derive(bon::Builder)]
pub struct Generator {
  #[builder(default)]
  version: OpenApiVersion,
  #[builder(into)]
  title: String,
  /// The API's own version string, written to `info.version`.
  #[builder(into)]
  api_version: String,
  #[builder(into)]
  description: Option<String>,
  /// Swagger 2.0 only.
  #[builder(into)]
  host: Option<String>,
  /// Swagger 2.0 only.
  #[builder(default)]
  schemes: Vec<String>,
  #[builder(default = vec![words::APPLICATION_JSON.to_string()])]
  consumes: Vec<String>,
  #[builder(default = vec![words::APPLICATION_JSON.to_string()])]
  produces: Vec<String>,
  /// OpenAPI 3.0 only: server URLs.
  #[builder(default)]
  servers: Vec<String>,
  #[builder(default)]
  tags: Vec<TagObject>,
  #[builder(default = ConverterRegistry::query_string())]
  query_string_registry: ConverterRegistry,
  #[builder(default = ConverterRegistry::headers())]
  headers_registry: ConverterRegistry,
  #[builder(default = ConverterRegistry::request_body())]
  request_body_registry: ConverterRegistry,
  #[builder(default = ConverterRegistry::response())]
  response_registry: ConverterRegistry,
  #[builder(default = AuthenticatorConverterRegistry::with_defaults())]
  authenticator_registry: AuthenticatorConverterRegistry,
  /// Schema behind every operation's `default` response entry.
  #[builder(default = validation::error_schema())]
  default_response_schema: SchemaHandle,
  #[builder(default = default_path_converters())]
  path_converters: BTreeMap<String, PathParameterType>,
}

impl Generator {
  pub fn query_string_registry_mut(&mut self) -> &mut ConverterRegistry {
    &mut self.query_string_registry
  }

  pub fn headers_registry_mut(&mut self) -> &mut ConverterRegistry {
    &mut self.headers_registry
  }

  pub fn request_body_registry_mut(&mut self) -> &mut ConverterRegistry {
    &mut self.request_body_registry
  }

  pub fn response_registry_mut(&mut self) -> &mut ConverterRegistry {
    &mut self.response_registry
  }

  pub fn authenticator_registry_mut(&mut self) -> &mut AuthenticatorConverterRegistry {
    &mut self.authenticator_registry
  }

  /// Map a path placeholder converter tag to a parameter type. Unregistered
  /// tags fall back to `string`.
  pub fn register_path_converter(&mut self, tag: impl Into<String>, type_word: impl Into<String>, format: Option<String>) {
    self.path_converters.insert(
      tag.into(),
      PathParameterType {
        type_word: type_word.into(),
        format,
      },
    );
  }

  /// Build the document for every visible registration in `registry`.
  pub fn generate(&self, registry: &HandlerRegistry) -> Result<Value, BuildError> {
    let mut store = DefinitionStore::new(self.version);

    let default_response_ref = {
      let mut ctx = ConversionContext::referenced(&self.response_registry, &mut store, self.version);
      ctx.define(&self.default_response_schema)?
    };
    let default_response_description = self
      .default_response_schema
      .description()
      .unwrap_or_else(|| self.default_response_schema.name())
      .to_string();

    let mut paths = Map::new();
    let mut parameter_types_by_template: BTreeMap<String, Vec<Value>> = BTreeMap::new();
    let mut used_authenticators: Vec<Arc<Authenticator>> = registry.default_authenticators().to_vec();

    for (registration_path, methods) in registry.paths() {
      let (template, arguments) = format_path(registration_path);

      let mut operations = Map::new();
      for (method, definition) in methods {
        if definition.hidden {
          tracing::debug!(path = %template, method = %method, "skipping hidden operation");
          continue;
        }
        let operation = self.operation_object(
          definition,
          registry,
          &mut store,
          &default_response_ref,
          &default_response_description,
        )?;
        operations.insert(method.clone(), operation);
        used_authenticators.extend(definition.effective_authenticators(&[]));
      }
      // A registration whose operations are all hidden contributes nothing,
      // so it is exempt from the template-conflict check too.
      if operations.is_empty() {
        continue;
      }

      let path_parameters = self.path_parameters(&arguments);
      match parameter_types_by_template.get(&template) {
        Some(existing) if *existing != path_parameters => {
          return Err(BuildError::ConflictingPathParameters { path: template });
        }
        Some(_) => {}
        None => {
          parameter_types_by_template.insert(template.clone(), path_parameters.clone());
        }
      }

      let path_item = match paths.entry(template) {
        serde_json::map::Entry::Vacant(entry) => {
          let mut item = Map::new();
          if !path_parameters.is_empty() {
            item.insert(words::PARAMETERS.to_string(), json!(path_parameters));
          }
          entry.insert(Value::Object(item))
        }
        serde_json::map::Entry::Occupied(entry) => entry.into_mut(),
      };
      if let Value::Object(item) = path_item {
        item.extend(operations);
      }
    }

    let mut security_schemes: BTreeMap<String, Value> = BTreeMap::new();
    for authenticator in &used_authenticators {
      for (name, scheme) in self.authenticator_registry.security_schemes(authenticator, self.version)? {
        security_schemes.insert(name, fragment_value(scheme));
      }
    }

    let mut default_security = Vec::new();
    for authenticator in registry.default_authenticators() {
      default_security.extend(
        self
          .authenticator_registry
          .security_requirements(authenticator, self.version)?,
      );
    }

    store.audit()?;
    let document = self.document_root(paths, store.into_definitions(), security_schemes, default_security);
    tracing::debug!(version = ?self.version, "generated document");
    Ok(sort_keys(document))
  }

  fn path_parameters(&self, arguments: &[PathArgument]) -> Vec<Value> {
    arguments
      .iter()
      .map(|argument| {
        let fallback = PathParameterType {
          type_word: words::STRING.to_string(),
          format: None,
        };
        let parameter_type = self.path_converters.get(&argument.converter).unwrap_or(&fallback);

        let mut type_fragment = Map::new();
        type_fragment.insert(words::TYPE.to_string(), json!(parameter_type.type_word));
        if let Some(format) = &parameter_type.format {
          type_fragment.insert(words::FORMAT.to_string(), json!(format));
        }

        let mut parameter = Map::new();
        parameter.insert(words::NAME.to_string(), json!(argument.name));
        parameter.insert(words::IN.to_string(), json!(words::PATH));
        parameter.insert(words::REQUIRED.to_string(), json!(true));
        match self.version {
          OpenApiVersion::V2 => parameter.extend(type_fragment),
          OpenApiVersion::V3 => {
            parameter.insert(words::SCHEMA.to_string(), Value::Object(type_fragment));
          }
        }
        Value::Object(parameter)
      })
      .collect()
  }

  fn operation_object(
    &self,
    definition: &PathDefinition,
    registry: &HandlerRegistry,
    store: &mut DefinitionStore,
    default_response_ref: &Value,
    default_response_description: &str,
  ) -> Result<Value, BuildError> {
    let mut operation = Map::new();
    let operation_id = definition.operation_id.as_deref().unwrap_or(&definition.func_name);
    operation.insert(words::OPERATION_ID.to_string(), json!(operation_id));

    if let Some(doc) = definition.doc.as_deref() {
      let (summary, description) = split_doc(doc);
      if let Some(summary) = summary {
        operation.insert(words::SUMMARY.to_string(), json!(summary));
      }
      if let Some(description) = description {
        operation.insert(words::DESCRIPTION.to_string(), json!(description));
      }
    }

    if !definition.tags.is_empty() {
      operation.insert(words::TAGS.to_string(), json!(definition.tags));
    }

    let mut parameters = Vec::new();
    if let Some(schema) = &definition.query_string_schema {
      parameters.extend(self.parameter_objects(schema, &self.query_string_registry, store, words::QUERY)?);
    }
    if let Some(schema) = definition.effective_headers(registry.default_headers_schema()) {
      parameters.extend(self.parameter_objects(&schema, &self.headers_registry, store, words::HEADER)?);
    }

    if let Some(schema) = &definition.request_body_schema {
      let mut ctx = ConversionContext::referenced(&self.request_body_registry, store, self.version);
      let converted = ctx.define(schema)?;
      match self.version {
        OpenApiVersion::V2 => {
          parameters.push(json!({
            words::NAME: schema.name(),
            words::IN: words::BODY,
            words::REQUIRED: true,
            words::SCHEMA: converted,
          }));
        }
        OpenApiVersion::V3 => {
          operation.insert(
            words::REQUEST_BODY.to_string(),
            json!({
              words::REQUIRED: true,
              words::CONTENT: { words::APPLICATION_JSON: { words::SCHEMA: converted } },
            }),
          );
        }
      }
    }
    if !parameters.is_empty() {
      operation.insert(words::PARAMETERS.to_string(), json!(parameters));
    }

    let mut responses = Map::new();
    match &definition.responses {
      Responses::None => {}
      Responses::Single(schema) => {
        responses.insert("200".to_string(), self.response_entry(Some(schema), store)?);
      }
      Responses::ByStatus(by_status) => {
        for (status, schema) in by_status {
          responses.insert(status.to_string(), self.response_entry(schema.as_ref(), store)?);
        }
      }
    }
    responses.insert(
      words::DEFAULT.to_string(),
      self.response_value(default_response_ref.clone(), default_response_description),
    );
    operation.insert(words::RESPONSES.to_string(), Value::Object(responses));

    if definition.authenticators.is_empty() {
      // Explicitly unauthenticated: overrides any document-level default.
      operation.insert(words::SECURITY.to_string(), json!([]));
    } else {
      let effective = definition.effective_authenticators(registry.default_authenticators());
      let uses_only_defaults = definition
        .authenticators
        .iter()
        .all(|selection| matches!(selection, AuthenticatorSelection::UseDefault));
      if !effective.is_empty() && !uses_only_defaults {
        let mut requirements = Vec::new();
        for authenticator in &effective {
          requirements.extend(
            self
              .authenticator_registry
              .security_requirements(authenticator, self.version)?,
          );
        }
        operation.insert(words::SECURITY.to_string(), json!(requirements));
      }
    }

    Ok(Value::Object(operation))
  }

  /// Flatten an inline-converted schema into a parameter list, one entry per
  /// field, sorted by name.
  fn parameter_objects(
    &self,
    schema: &SchemaHandle,
    registry: &ConverterRegistry,
    store: &mut DefinitionStore,
    location: &str,
  ) -> Result<Vec<Value>, BuildError> {
    let mut ctx = ConversionContext::inline(registry, store, self.version);
    let converted = ctx.define(schema)?;
    let Value::Object(object) = converted else {
      return Err(BuildError::MismatchedPayload {
        type_tag: location.to_string(),
        field: schema.name().to_string(),
        expected: "object",
      });
    };

    let required: BTreeSet<&str> = object
      .get(words::REQUIRED)
      .and_then(Value::as_array)
      .map(|names| names.iter().filter_map(Value::as_str).collect())
      .unwrap_or_default();
    let Some(Value::Object(properties)) = object.get(words::PROPERTIES) else {
      return Ok(Vec::new());
    };

    let mut parameters = Vec::new();
    for (name, property) in properties {
      let mut attributes = match property {
        Value::Object(map) => map.clone(),
        other => Map::from_iter([(words::SCHEMA.to_string(), other.clone())]),
      };

      let mut parameter = Map::new();
      parameter.insert(words::NAME.to_string(), json!(name));
      parameter.insert(words::IN.to_string(), json!(location));
      if required.contains(name.as_str()) {
        parameter.insert(words::REQUIRED.to_string(), json!(true));
      }

      match self.version {
        OpenApiVersion::V2 => parameter.extend(attributes),
        OpenApiVersion::V3 => {
          // description, style and explode are parameter-level keys in 3.0;
          // everything else nests under `schema`.
          for key in [words::DESCRIPTION, words::STYLE, words::EXPLODE] {
            if let Some(value) = attributes.remove(key) {
              parameter.insert(key.to_string(), value);
            }
          }
          parameter.insert(words::SCHEMA.to_string(), Value::Object(attributes));
        }
      }
      parameters.push(Value::Object(parameter));
    }
    Ok(parameters)
  }

  fn response_entry(&self, schema: Option<&SchemaHandle>, store: &mut DefinitionStore) -> Result<Value, BuildError> {
    match schema {
      Some(schema) => {
        let mut ctx = ConversionContext::referenced(&self.response_registry, store, self.version);
        let converted = ctx.define(schema)?;
        let description = schema.description().unwrap_or_else(|| schema.name()).to_string();
        Ok(self.response_value(converted, &description))
      }
      None => Ok(json!({ words::DESCRIPTION: "" })),
    }
  }

  fn response_value(&self, schema_value: Value, description: &str) -> Value {
    match self.version {
      OpenApiVersion::V2 => json!({
        words::DESCRIPTION: description,
        words::SCHEMA: schema_value,
      }),
      OpenApiVersion::V3 => json!({
        words::DESCRIPTION: description,
        words::CONTENT: { words::APPLICATION_JSON: { words::SCHEMA: schema_value } },
      }),
    }
  }

  fn document_root(
    &self,
    paths: Map<String, Value>,
    definitions: BTreeMap<String, Value>,
    security_schemes: BTreeMap<String, Value>,
    default_security: Vec<Value>,
  ) -> Value {
    let mut info = Map::new();
    info.insert(words::TITLE.to_string(), json!(self.title));
    info.insert(words::VERSION.to_string(), json!(self.api_version));
    if let Some(description) = &self.description {
      info.insert(words::DESCRIPTION.to_string(), json!(description));
    }

    let mut root = Map::new();
    root.insert(words::INFO.to_string(), Value::Object(info));
    root.insert(words::PATHS.to_string(), Value::Object(paths));

    match self.version {
      OpenApiVersion::V2 => {
        root.insert(words::SWAGGER.to_string(), json!(self.version.version_string()));
        if let Some(host) = &self.host {
          root.insert(words::HOST.to_string(), json!(host));
        }
        if !self.schemes.is_empty() {
          root.insert(words::SCHEMES.to_string(), json!(self.schemes));
        }
        if !self.consumes.is_empty() {
          root.insert(words::CONSUMES.to_string(), json!(self.consumes));
        }
        if !self.produces.is_empty() {
          root.insert(words::PRODUCES.to_string(), json!(self.produces));
        }
        root.insert(words::DEFINITIONS.to_string(), json!(definitions));
        if !security_schemes.is_empty() {
          root.insert(words::SECURITY_DEFINITIONS.to_string(), json!(security_schemes));
        }
      }
      OpenApiVersion::V3 => {
        root.insert(words::OPENAPI.to_string(), json!(self.version.version_string()));
        if !self.servers.is_empty() {
          let servers: Vec<Value> = self.servers.iter().map(|url| json!({ words::URL: url })).collect();
          root.insert(words::SERVERS.to_string(), json!(servers));
        }
        let mut components = Map::new();
        components.insert(words::SCHEMAS.to_string(), json!(definitions));
        if !security_schemes.is_empty() {
          components.insert(words::SECURITY_SCHEMES.to_string(), json!(security_schemes));
        }
        root.insert(words::COMPONENTS.to_string(), Value::Object(components));
      }
    }

    if !default_security.is_empty() {
      root.insert(words::SECURITY.to_string(), json!(default_security));
    }
    if !self.tags.is_empty() {
      root.insert(words::TAGS.to_string(), json!(self.tags));
    }

    Value::Object(root)
  }
}

/// First paragraph becomes the summary, the remainder the description.
fn split_doc(doc: &str) -> (Option<&str>, Option<&str>) {
  let trimmed = doc.trim();
  if trimmed.is_empty() {
    return (None, None);
  }
  match trimmed.split_once("\n\n") {
    Some((summary, description)) => (Some(summary.trim()), Some(description.trim())),
    None => (Some(trimmed), None),
  }
}

/// Recursively sort every object's keys so repeated builds serialize to
/// identical bytes.
fn sort_keys(value: Value) -> Value {
  match value {
    Value::Object(object) => Value::Object(
      object
        .into_iter()
        .map(|(key, value)| (key, sort_keys(value)))
        .sorted_by(|(a, _), (b, _)| a.cmp(b))
        .collect(),
    ),
    Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
    other => other,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_split_doc_single_paragraph() {
    assert_eq!(split_doc("List all pets."), (Some("List all pets."), None));
  }

  #[test]
  fn test_split_doc_summary_and_description() {
    let doc = "List all pets.\n\nSupports paging.\nSorted by name.";
    let (summary, description) = split_doc(doc);
    assert_eq!(summary, Some("List all pets."));
    assert_eq!(description, Some("Supports paging.\nSorted by name."));
  }

  #[test]
  fn test_sort_keys_recurses() {
    let sorted = sort_keys(json!({"b": {"z": 1, "a": 2}, "a": [{"y": 1, "x": 2}]}));
    assert_eq!(
      serde_json::to_string(&sorted).unwrap(),
      r#"{"a":[{"x":2,"y":1}],"b":{"a":2,"z":1}}"#
    );
  }

  #[test]
  fn test_default_path_converters_fall_back_to_string() {
    let generator = Generator::builder().title("t").api_version("1").build();
    let parameters = generator.path_parameters(&[PathArgument {
      name: "token".to_string(),
      converter: "custom".to_string(),
    }]);
    assert_eq!(parameters[0].get("schema").and_then(|s| s.get("type")), Some(&json!("string")));
  }
}
