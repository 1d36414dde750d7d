//! Converter traits, the dispatch registry, and the conversion context.
//!
//! A registry maps dispatch tags to converters. Lookup walks a field's type
//! chain from most specific to least specific and takes the first registered
//! match, so a custom variant built on top of `list` converts through the
//! list converter unless something more specific is registered for it.
//!
//! Contexts come in two modes. Referenced mode routes nested schemas through
//! the document-wide [`DefinitionStore`], producing `$ref` fragments and
//! registering named definitions as a side effect. Inline mode (query
//! strings, headers) expands everything in place and never touches the
//! definitions table.

use std::collections::BTreeMap;
use std::mem;

use itertools::Itertools;
use serde_json::{Map, Value, json};

use super::OpenApiVersion;
use super::definitions::DefinitionStore;
use crate::errors::BuildError;
use crate::schema::{self, Field, Schema, SchemaHandle, Validator};
use crate::words;

/// A partial document fragment: attribute name to value. Converters compose;
/// several of them may contribute attributes to the same fragment.
pub type Fragment = BTreeMap<String, Value>;

pub(crate) fn fragment_value(fragment: Fragment) -> Value {
  Value::Object(fragment.into_iter().collect::<Map<String, Value>>())
}

/// Produces the type-specific attributes for one field variant.
pub trait FieldConverter: Send + Sync {
  fn fragment(&self, name: &str, field: &Field, ctx: &mut ConversionContext<'_>) -> Result<Fragment, BuildError>;
}

/// Produces the attributes for one validator variant. Receives the fragment
/// built so far, so a length constraint can decide between string and array
/// vocabulary.
pub trait ValidatorConverter: Send + Sync {
  fn fragment(&self, validator: &Validator, memo: &Fragment, version: OpenApiVersion) -> Fragment;
}

/// Dispatch table from type tags to converters.
///
/// Distinct contexts use distinct registries because not every field variant
/// is valid everywhere: nested schemas have no query-string representation,
/// so the query registry simply never registers a converter for them and the
/// build fails fast instead.
#[derive(Default)]
pub struct ConverterRegistry {
  fields: BTreeMap<String, Box<dyn FieldConverter>>,
  validators: BTreeMap<String, Box<dyn ValidatorConverter>>,
}

impl ConverterRegistry {
  pub fn empty() -> Self {
    Self::default()
  }

  /// Registry for query-string schemas: scalars and the query list variants,
  /// no nesting.
  pub fn query_string() -> Self {
    let mut registry = Self::empty();
    super::fields::register_scalars(&mut registry);
    super::fields::register_lists(&mut registry);
    super::fields::register_query_lists(&mut registry);
    super::fields::register_validators(&mut registry);
    registry
  }

  /// Registry for header schemas; same surface as query strings.
  pub fn headers() -> Self {
    Self::query_string()
  }

  /// Registry for request bodies: scalars, lists, dicts, and nested schemas.
  pub fn request_body() -> Self {
    let mut registry = Self::empty();
    super::fields::register_scalars(&mut registry);
    super::fields::register_lists(&mut registry);
    super::fields::register_structured(&mut registry);
    super::fields::register_validators(&mut registry);
    registry
  }

  /// Registry for response bodies; same surface as request bodies.
  pub fn response() -> Self {
    Self::request_body()
  }

  pub fn register_field_converter(&mut self, tag: impl Into<String>, converter: impl FieldConverter + 'static) {
    self.fields.insert(tag.into(), Box::new(converter));
  }

  pub fn register_validator_converter(&mut self, tag: impl Into<String>, converter: impl ValidatorConverter + 'static) {
    self.validators.insert(tag.into(), Box::new(converter));
  }

  fn field_converter_for(&self, chain: &[String]) -> Option<&dyn FieldConverter> {
    chain.iter().find_map(|tag| self.fields.get(tag).map(Box::as_ref))
  }

  fn validator_converter_for(&self, chain: &[String]) -> Option<&dyn ValidatorConverter> {
    chain.iter().find_map(|tag| self.validators.get(tag).map(Box::as_ref))
  }
}

enum Mode {
  /// Nested schemas become named definitions referenced by `$ref`.
  Referenced,
  /// Everything is expanded in place; the definitions table is untouched.
  Inline,
}

/// State threaded through one conversion: the registry to dispatch against,
/// the document-wide definition store, and the enclosing schema's name for
/// error reporting.
pub struct ConversionContext<'a> {
  registry: &'a ConverterRegistry,
  store: &'a mut DefinitionStore,
  version: OpenApiVersion,
  schema_name: String,
  mode: Mode,
  inline_path: Vec<usize>,
}

impl<'a> ConversionContext<'a> {
  pub(crate) fn referenced(registry: &'a ConverterRegistry, store: &'a mut DefinitionStore, version: OpenApiVersion) -> Self {
    Self {
      registry,
      store,
      version,
      schema_name: String::new(),
      mode: Mode::Referenced,
      inline_path: Vec::new(),
    }
  }

  pub(crate) fn inline(registry: &'a ConverterRegistry, store: &'a mut DefinitionStore, version: OpenApiVersion) -> Self {
    Self {
      registry,
      store,
      version,
      schema_name: String::new(),
      mode: Mode::Inline,
      inline_path: Vec::new(),
    }
  }

  pub fn version(&self) -> OpenApiVersion {
    self.version
  }

  /// Display name of the schema currently being converted.
  pub fn schema_name(&self) -> &str {
    &self.schema_name
  }

  /// Convert one field through the registry, composing the type-specific
  /// fragment with the shared field attributes and any validator output.
  pub fn convert_field(&mut self, name: &str, field: &Field) -> Result<Fragment, BuildError> {
    let registry = self.registry;
    let Some(converter) = registry.field_converter_for(field.type_chain()) else {
      return Err(BuildError::UnconvertibleType {
        type_tag: field.type_name().to_string(),
        field: name.to_string(),
        schema: self.schema_name.clone(),
        chain: field.type_chain().to_vec(),
      });
    };

    let mut fragment = converter.fragment(name, field, self)?;

    // A reference fragment stands alone; JSON Schema ignores siblings of
    // `$ref`, and attaching them would leak into the named definition.
    if fragment.contains_key(words::REF) {
      return Ok(fragment);
    }

    if let Some(description) = field.field_description() {
      fragment
        .entry(words::DESCRIPTION.to_string())
        .or_insert_with(|| json!(description));
    }
    if let Some(default) = field.default() {
      fragment.entry(words::DEFAULT.to_string()).or_insert_with(|| default.clone());
    }
    if field.is_read_only() {
      fragment.insert(words::READ_ONLY.to_string(), json!(true));
    }
    if field.is_nullable() {
      let key = match self.version {
        OpenApiVersion::V2 => words::NULLABLE_EXTENSION,
        OpenApiVersion::V3 => words::NULLABLE,
      };
      fragment.insert(key.to_string(), json!(true));
    }

    for validator in field.validators() {
      match registry.validator_converter_for(validator.type_chain()) {
        Some(converter) => {
          let extra = converter.fragment(validator, &fragment, self.version);
          fragment.extend(extra);
        }
        None => {
          tracing::debug!(
            validator = validator.type_name(),
            field = name,
            schema = %self.schema_name,
            "skipping validator with no registered converter"
          );
        }
      }
    }

    Ok(fragment)
  }

  /// Walk a schema node. In referenced mode this registers the definition
  /// (once per node identity, across the whole document build) and returns a
  /// `$ref`; hitting a node already in progress on the current path returns
  /// the reference immediately, which is what breaks cycles.
  pub fn define(&mut self, handle: &SchemaHandle) -> Result<Value, BuildError> {
    match self.mode {
      Mode::Referenced => self.define_referenced(handle),
      Mode::Inline => self.convert_inline(handle),
    }
  }

  fn define_referenced(&mut self, handle: &SchemaHandle) -> Result<Value, BuildError> {
    let key = schema::identity(handle);

    if let Some(name) = self.store.assigned_name(key) {
      let reference = self.store.reference(&name);
      return Ok(wrap_many(handle, reference));
    }

    let assigned = self.store.reserve(key, handle.name());
    let previous = mem::replace(&mut self.schema_name, handle.name().to_string());
    let body = self.convert_schema_object(handle, Some(&assigned));
    self.schema_name = previous;

    self.store.complete(assigned.clone(), fragment_value(body?));
    let reference = self.store.reference(&assigned);
    Ok(wrap_many(handle, reference))
  }

  fn convert_inline(&mut self, handle: &SchemaHandle) -> Result<Value, BuildError> {
    let key = schema::identity(handle);
    // Inline mode has no definitions table to resolve a cycle against.
    if self.inline_path.contains(&key) {
      return Err(BuildError::CyclicInlineSchema {
        name: handle.name().to_string(),
      });
    }

    self.inline_path.push(key);
    let previous = mem::replace(&mut self.schema_name, handle.name().to_string());
    let body = self.convert_schema_object(handle, None);
    self.schema_name = previous;
    self.inline_path.pop();

    Ok(wrap_many(handle, fragment_value(body?)))
  }

  /// Convert a schema into its object fragment: sorted properties, sorted
  /// required list, title, description, and the strictness marker.
  pub(crate) fn convert_schema_object(&mut self, schema: &Schema, title: Option<&str>) -> Result<Fragment, BuildError> {
    let mut fragment = Fragment::new();
    fragment.insert(words::TYPE.to_string(), json!(words::OBJECT));

    let mut properties = Map::new();
    for (name, field) in schema.fields().sorted_by_key(|(name, _)| *name) {
      let converted = self.convert_field(name, field)?;
      properties.insert(name.to_string(), fragment_value(converted));
    }
    fragment.insert(words::PROPERTIES.to_string(), Value::Object(properties));

    let required: Vec<&str> = schema
      .fields()
      .filter(|(_, field)| field.is_required())
      .map(|(name, _)| name)
      .sorted()
      .collect();
    if !required.is_empty() {
      fragment.insert(words::REQUIRED.to_string(), json!(required));
    }

    fragment.insert(words::TITLE.to_string(), json!(title.unwrap_or_else(|| schema.name())));
    if let Some(description) = schema.description() {
      fragment.insert(words::DESCRIPTION.to_string(), json!(description));
    }
    if schema.strict() {
      fragment.insert(words::ADDITIONAL_PROPERTIES.to_string(), json!(false));
    }

    Ok(fragment)
  }
}

/// Wrap a converted schema value in an array envelope when the schema is
/// declared `many`.
pub(crate) fn wrap_many(schema: &SchemaHandle, value: Value) -> Value {
  if schema.many() {
    json!({ words::TYPE: words::ARRAY, words::ITEMS: value })
  } else {
    value
  }
}
