//! The declarative schema graph.
//!
//! A [`Schema`] is an ordered collection of named [`Field`]s. Fields carry a
//! type chain (most specific tag first) that converter registries walk to
//! find a matching converter, so a custom field variant can lean on the
//! converter registered for its nearest ancestor.
//!
//! Nested fields hold [`SchemaLink`]s. A link is usually a strong
//! [`SchemaHandle`], but a schema that nests itself uses a weak
//! back-reference created through [`SchemaBuilder::build_cyclic`], which
//! keeps the graph representable without infinite expansion.

use std::sync::{Arc, Weak};

use indexmap::IndexMap;
use serde_json::Value;

/// Dispatch tags for the built-in field and validator variants.
///
/// Custom variants pick their own tag and prepend it to the chain of the
/// built-in constructor they start from, mirroring a subclass relationship.
pub mod tags {
  pub const FIELD: &str = "field";

  pub const BOOLEAN: &str = "boolean";
  pub const CONSTANT: &str = "constant";
  pub const DATE: &str = "date";
  pub const DATE_TIME: &str = "date_time";
  pub const DICT: &str = "dict";
  pub const INTEGER: &str = "integer";
  pub const LIST: &str = "list";
  pub const NESTED: &str = "nested";
  pub const NUMBER: &str = "number";
  pub const STRING: &str = "string";
  pub const UUID: &str = "uuid";

  /// Query-string list rendered as one comma-separated value.
  pub const COMMA_SEPARATED_LIST: &str = "comma_separated_list";
  /// Query-string list rendered as a repeated parameter.
  pub const QUERY_PARAM_LIST: &str = "query_param_list";

  pub const VALIDATOR: &str = "validator";
  pub const LENGTH: &str = "length";
  pub const ONE_OF: &str = "one_of";
  pub const RANGE: &str = "range";
}

pub type SchemaHandle = Arc<Schema>;

/// Stable identity of a schema node for the document-wide visited set.
pub(crate) fn identity(handle: &SchemaHandle) -> usize {
  Arc::as_ptr(handle) as usize
}

/// Reference from a nested field to its child schema.
#[derive(Debug, Clone)]
pub enum SchemaLink {
  Handle(SchemaHandle),
  BackRef(Weak<Schema>),
}

impl SchemaLink {
  /// Upgrade to a strong handle. Returns `None` only when a back-reference
  /// outlived the schema it pointed at.
  pub fn resolve(&self) -> Option<SchemaHandle> {
    match self {
      Self::Handle(handle) => Some(Arc::clone(handle)),
      Self::BackRef(weak) => weak.upgrade(),
    }
  }
}

/// One declarative schema: a display name plus an ordered field map.
#[derive(Debug)]
pub struct Schema {
  name: String,
  description: Option<String>,
  many: bool,
  strict: bool,
  fields: IndexMap<String, Field>,
}

impl Schema {
  pub fn builder(name: impl Into<String>) -> SchemaBuilder {
    SchemaBuilder {
      name: name.into(),
      description: None,
      many: false,
      strict: false,
      fields: IndexMap::new(),
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn description(&self) -> Option<&str> {
    self.description.as_deref()
  }

  /// Whether the schema describes an array of itself.
  pub fn many(&self) -> bool {
    self.many
  }

  /// Whether undeclared properties are rejected (`additionalProperties: false`).
  pub fn strict(&self) -> bool {
    self.strict
  }

  pub fn fields(&self) -> impl Iterator<Item = (&str, &Field)> {
    self.fields.iter().map(|(name, field)| (name.as_str(), field))
  }
}

pub struct SchemaBuilder {
  name: String,
  description: Option<String>,
  many: bool,
  strict: bool,
  fields: IndexMap<String, Field>,
}

impl SchemaBuilder {
  pub fn description(mut self, description: impl Into<String>) -> Self {
    self.description = Some(description.into());
    self
  }

  pub fn many(mut self) -> Self {
    self.many = true;
    self
  }

  pub fn strict(mut self) -> Self {
    self.strict = true;
    self
  }

  pub fn field(mut self, name: impl Into<String>, field: Field) -> Self {
    self.fields.insert(name.into(), field);
    self
  }

  pub fn build(self) -> SchemaHandle {
    Arc::new(self.into_schema())
  }

  /// Build a schema whose fields may reference the schema itself.
  ///
  /// The closure receives a weak handle to the schema under construction;
  /// pass it to [`Field::nested_self`] to declare the self-reference.
  pub fn build_cyclic(self, complete: impl FnOnce(Self, Weak<Schema>) -> Self) -> SchemaHandle {
    Arc::new_cyclic(|weak| complete(self, weak.clone()).into_schema())
  }

  fn into_schema(self) -> Schema {
    Schema {
      name: self.name,
      description: self.description,
      many: self.many,
      strict: self.strict,
      fields: self.fields,
    }
  }
}

/// Payload of a field, interpreted by whichever converter its type chain
/// resolves to.
#[derive(Debug, Clone)]
pub enum FieldKind {
  Boolean,
  Constant(Value),
  Date,
  DateTime,
  Dict,
  Integer,
  List(Box<Field>),
  Nested { link: SchemaLink, many: bool },
  Number,
  String,
  Uuid,
}

/// One field of a schema.
#[derive(Debug, Clone)]
pub struct Field {
  type_chain: Vec<String>,
  kind: FieldKind,
  required: bool,
  nullable: bool,
  default: Option<Value>,
  description: Option<String>,
  read_only: bool,
  validators: Vec<Validator>,
  metadata: IndexMap<String, Value>,
}

impl Field {
  fn new(kind: FieldKind, chain: &[&str]) -> Self {
    Self {
      type_chain: chain.iter().map(|tag| (*tag).to_string()).collect(),
      kind,
      required: false,
      nullable: false,
      default: None,
      description: None,
      read_only: false,
      validators: Vec::new(),
      metadata: IndexMap::new(),
    }
  }

  pub fn string() -> Self {
    Self::new(FieldKind::String, &[tags::STRING, tags::FIELD])
  }

  pub fn integer() -> Self {
    Self::new(FieldKind::Integer, &[tags::INTEGER, tags::FIELD])
  }

  pub fn number() -> Self {
    Self::new(FieldKind::Number, &[tags::NUMBER, tags::FIELD])
  }

  pub fn boolean() -> Self {
    Self::new(FieldKind::Boolean, &[tags::BOOLEAN, tags::FIELD])
  }

  pub fn date() -> Self {
    Self::new(FieldKind::Date, &[tags::DATE, tags::STRING, tags::FIELD])
  }

  pub fn datetime() -> Self {
    Self::new(FieldKind::DateTime, &[tags::DATE_TIME, tags::STRING, tags::FIELD])
  }

  pub fn uuid() -> Self {
    Self::new(FieldKind::Uuid, &[tags::UUID, tags::STRING, tags::FIELD])
  }

  pub fn dict() -> Self {
    Self::new(FieldKind::Dict, &[tags::DICT, tags::FIELD])
  }

  pub fn constant(value: impl Into<Value>) -> Self {
    Self::new(FieldKind::Constant(value.into()), &[tags::CONSTANT, tags::FIELD])
  }

  pub fn list(item: Field) -> Self {
    Self::new(FieldKind::List(Box::new(item)), &[tags::LIST, tags::FIELD])
  }

  /// List rendered in a query string as one comma-separated value.
  pub fn comma_separated_list(item: Field) -> Self {
    Self::new(
      FieldKind::List(Box::new(item)),
      &[tags::COMMA_SEPARATED_LIST, tags::LIST, tags::FIELD],
    )
  }

  /// List rendered in a query string as a repeated parameter.
  pub fn query_param_list(item: Field) -> Self {
    Self::new(
      FieldKind::List(Box::new(item)),
      &[tags::QUERY_PARAM_LIST, tags::LIST, tags::FIELD],
    )
  }

  pub fn nested(schema: SchemaHandle) -> Self {
    Self::new(
      FieldKind::Nested {
        link: SchemaLink::Handle(schema),
        many: false,
      },
      &[tags::NESTED, tags::FIELD],
    )
  }

  pub fn nested_many(schema: SchemaHandle) -> Self {
    Self::new(
      FieldKind::Nested {
        link: SchemaLink::Handle(schema),
        many: true,
      },
      &[tags::NESTED, tags::FIELD],
    )
  }

  /// Nest the schema currently under construction; see
  /// [`SchemaBuilder::build_cyclic`].
  pub fn nested_self(schema: Weak<Schema>) -> Self {
    Self::new(
      FieldKind::Nested {
        link: SchemaLink::BackRef(schema),
        many: false,
      },
      &[tags::NESTED, tags::FIELD],
    )
  }

  pub fn nested_self_many(schema: Weak<Schema>) -> Self {
    Self::new(
      FieldKind::Nested {
        link: SchemaLink::BackRef(schema),
        many: true,
      },
      &[tags::NESTED, tags::FIELD],
    )
  }

  /// Prepend a custom dispatch tag, declaring this field a subtype of the
  /// variant it was constructed as.
  pub fn type_tag(mut self, tag: impl Into<String>) -> Self {
    self.type_chain.insert(0, tag.into());
    self
  }

  pub fn required(mut self) -> Self {
    self.required = true;
    self
  }

  pub fn nullable(mut self) -> Self {
    self.nullable = true;
    self
  }

  pub fn default_value(mut self, value: impl Into<Value>) -> Self {
    self.default = Some(value.into());
    self
  }

  pub fn description(mut self, description: impl Into<String>) -> Self {
    self.description = Some(description.into());
    self
  }

  pub fn read_only(mut self) -> Self {
    self.read_only = true;
    self
  }

  pub fn validator(mut self, validator: Validator) -> Self {
    self.validators.push(validator);
    self
  }

  /// Attach free-form metadata for custom converters to read.
  pub fn metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
    self.metadata.insert(key.into(), value.into());
    self
  }

  pub fn kind(&self) -> &FieldKind {
    &self.kind
  }

  pub fn type_chain(&self) -> &[String] {
    &self.type_chain
  }

  /// The most specific dispatch tag.
  pub fn type_name(&self) -> &str {
    self.type_chain.first().map(String::as_str).unwrap_or(tags::FIELD)
  }

  pub fn is_required(&self) -> bool {
    self.required
  }

  pub fn is_nullable(&self) -> bool {
    self.nullable
  }

  pub fn default(&self) -> Option<&Value> {
    self.default.as_ref()
  }

  pub fn field_description(&self) -> Option<&str> {
    self.description.as_deref()
  }

  pub fn is_read_only(&self) -> bool {
    self.read_only
  }

  pub fn validators(&self) -> &[Validator] {
    &self.validators
  }

  pub fn metadata_value(&self, key: &str) -> Option<&Value> {
    self.metadata.get(key)
  }
}

/// Constraint payloads understood by the built-in validator converters.
#[derive(Debug, Clone)]
pub enum ValidatorKind {
  Length { min: Option<u64>, max: Option<u64> },
  OneOf(Vec<Value>),
  Range { min: Option<f64>, max: Option<f64> },
}

/// A constraint attached to a field, dispatched like fields are.
#[derive(Debug, Clone)]
pub struct Validator {
  type_chain: Vec<String>,
  kind: ValidatorKind,
}

impl Validator {
  fn new(kind: ValidatorKind, chain: &[&str]) -> Self {
    Self {
      type_chain: chain.iter().map(|tag| (*tag).to_string()).collect(),
      kind,
    }
  }

  pub fn range(min: Option<f64>, max: Option<f64>) -> Self {
    Self::new(ValidatorKind::Range { min, max }, &[tags::RANGE, tags::VALIDATOR])
  }

  pub fn length(min: Option<u64>, max: Option<u64>) -> Self {
    Self::new(ValidatorKind::Length { min, max }, &[tags::LENGTH, tags::VALIDATOR])
  }

  pub fn one_of(choices: impl IntoIterator<Item = Value>) -> Self {
    Self::new(
      ValidatorKind::OneOf(choices.into_iter().collect()),
      &[tags::ONE_OF, tags::VALIDATOR],
    )
  }

  pub fn type_tag(mut self, tag: impl Into<String>) -> Self {
    self.type_chain.insert(0, tag.into());
    self
  }

  pub fn kind(&self) -> &ValidatorKind {
    &self.kind
  }

  pub fn type_chain(&self) -> &[String] {
    &self.type_chain
  }

  pub fn type_name(&self) -> &str {
    self.type_chain.first().map(String::as_str).unwrap_or(tags::VALIDATOR)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_fields_keep_declaration_order() {
    let schema = Schema::builder("Widget")
      .field("zeta", Field::string())
      .field("alpha", Field::integer())
      .build();

    let names: Vec<&str> = schema.fields().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["zeta", "alpha"]);
  }

  #[test]
  fn test_cyclic_schema_resolves_to_itself() {
    let node = Schema::builder("Node").build_cyclic(|builder, this| {
      builder
        .field("value", Field::string().required())
        .field("next", Field::nested_self(this))
    });

    let (_, next) = node.fields().find(|(name, _)| *name == "next").unwrap();
    let FieldKind::Nested { link, .. } = next.kind() else {
      panic!("expected nested field");
    };
    let child = link.resolve().unwrap();
    assert_eq!(identity(&child), identity(&node));
  }

  #[test]
  fn test_type_tag_prepends_to_chain() {
    let field = Field::list(Field::string()).type_tag("sorted_list");
    assert_eq!(field.type_name(), "sorted_list");
    assert_eq!(field.type_chain(), &["sorted_list", tags::LIST, tags::FIELD]);
  }
}
