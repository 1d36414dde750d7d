use thiserror::Error;

/// Failures raised while assembling a document.
///
/// Every variant aborts the build. A partially correct document would be
/// consumed by client generators downstream, so nothing here degrades into
/// a warning.
#[derive(Debug, Error)]
pub enum BuildError {
  /// No converter matched the field's type chain in the registry used for
  /// this conversion context.
  #[error(
    "no converter registered for field `{field}` (type `{type_tag}`) in schema `{schema}`; searched chain {chain:?}"
  )]
  UnconvertibleType {
    type_tag: String,
    field: String,
    schema: String,
    chain: Vec<String>,
  },

  /// No converter matched the authenticator's type chain.
  #[error("no converter registered for authenticator `{scheme}` (type `{type_tag}`); searched chain {chain:?}")]
  UnconvertibleAuthenticator {
    type_tag: String,
    scheme: String,
    chain: Vec<String>,
  },

  /// A converter was dispatched onto a field whose payload it cannot read.
  /// Happens when a custom type chain names an ancestor the field's kind
  /// does not actually match.
  #[error("converter for `{type_tag}` expected a {expected} payload on field `{field}`")]
  MismatchedPayload {
    type_tag: String,
    field: String,
    expected: &'static str,
  },

  /// An authenticator converter found its configuration incomplete.
  #[error("authenticator `{scheme}` is missing required configuration key `{key}`")]
  MissingAuthenticatorConfig { scheme: String, key: &'static str },

  /// A `$ref` was emitted during the walk but the named definition never
  /// completed. The walker protocol makes this unreachable; hitting it
  /// means an internal invariant was violated.
  #[error("definition `{name}` is referenced but was never completed")]
  UnresolvedReference { name: String },

  /// A cyclic schema was reached in an inline context (query string or
  /// headers), where there is no definitions table for a `$ref` to point
  /// back into.
  #[error("schema `{name}` references itself and cannot be converted inline")]
  CyclicInlineSchema { name: String },

  /// A schema back-reference outlived the schema it pointed at.
  #[error("field `{field}` in schema `{schema}` holds a back-reference to a dropped schema")]
  DanglingSchemaRef { schema: String, field: String },

  /// Two registrations map to the same document path but disagree on the
  /// types of its path parameters.
  #[error("path `{path}` is registered with conflicting path parameter types")]
  ConflictingPathParameters { path: String },
}
