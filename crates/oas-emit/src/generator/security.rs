//! Authenticator conversion: named security schemes plus per-operation
//! security requirements.
//!
//! Authenticators dispatch through the same ancestor-chain mechanism as
//! fields. Scheme names come from the authenticator's configured identity,
//! never from instance identity, so reusing one authenticator across many
//! operations lands on a single scheme entry.

use std::collections::BTreeMap;

use serde_json::{Value, json};

use super::OpenApiVersion;
use super::converters::Fragment;
use crate::errors::BuildError;
use crate::words;

/// Dispatch tags for the built-in authenticator variants.
pub mod auth_tags {
  pub const AUTHENTICATOR: &str = "authenticator";
  pub const HEADER_API_KEY: &str = "header_api_key";
}

/// One authentication mechanism attached to routes.
///
/// The payload is a small configuration map read by whichever converter the
/// type chain resolves to; custom authenticators add their own keys.
#[derive(Debug, Clone)]
pub struct Authenticator {
  type_chain: Vec<String>,
  scheme_name: String,
  config: BTreeMap<String, Value>,
}

impl Authenticator {
  /// API key carried in a request header.
  pub fn header_api_key(scheme_name: impl Into<String>, header: impl Into<String>) -> Self {
    let mut config = BTreeMap::new();
    config.insert("header".to_string(), json!(header.into()));
    Self {
      type_chain: vec![
        auth_tags::HEADER_API_KEY.to_string(),
        auth_tags::AUTHENTICATOR.to_string(),
      ],
      scheme_name: scheme_name.into(),
      config,
    }
  }

  /// An authenticator variant the crate knows nothing about; a converter
  /// must be registered for `tag` (or an ancestor added with
  /// [`Authenticator::type_tag`]) before the build.
  pub fn custom(tag: impl Into<String>, scheme_name: impl Into<String>) -> Self {
    Self {
      type_chain: vec![tag.into(), auth_tags::AUTHENTICATOR.to_string()],
      scheme_name: scheme_name.into(),
      config: BTreeMap::new(),
    }
  }

  /// Prepend a custom dispatch tag, declaring this authenticator a subtype
  /// of the variant it was constructed as.
  pub fn type_tag(mut self, tag: impl Into<String>) -> Self {
    self.type_chain.insert(0, tag.into());
    self
  }

  pub fn config_value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
    self.config.insert(key.into(), value.into());
    self
  }

  pub fn scheme_name(&self) -> &str {
    &self.scheme_name
  }

  pub fn type_name(&self) -> &str {
    self
      .type_chain
      .first()
      .map(String::as_str)
      .unwrap_or(auth_tags::AUTHENTICATOR)
  }

  pub fn type_chain(&self) -> &[String] {
    &self.type_chain
  }

  pub fn config(&self, key: &str) -> Option<&Value> {
    self.config.get(key)
  }

  fn config_str(&self, key: &'static str) -> Result<&str, BuildError> {
    self
      .config
      .get(key)
      .and_then(Value::as_str)
      .ok_or(BuildError::MissingAuthenticatorConfig {
        scheme: self.scheme_name.clone(),
        key,
      })
  }
}

/// Converts one authenticator variant into scheme and requirement fragments.
pub trait AuthenticatorConverter: Send + Sync {
  /// Named security schemes this authenticator relies on. Several
  /// authenticators may share scheme definitions; each returns every scheme
  /// it uses and the document merges them by name.
  fn security_schemes(
    &self,
    authenticator: &Authenticator,
    version: OpenApiVersion,
  ) -> Result<BTreeMap<String, Fragment>, BuildError>;

  /// Requirement objects for one operation using this authenticator. Each
  /// entry in the returned list is independently satisfiable (OR); keys
  /// within one entry must all be satisfied (AND).
  fn security_requirements(
    &self,
    authenticator: &Authenticator,
    version: OpenApiVersion,
  ) -> Result<Vec<Value>, BuildError>;
}

struct HeaderApiKeyConverter;

impl AuthenticatorConverter for HeaderApiKeyConverter {
  fn security_schemes(
    &self,
    authenticator: &Authenticator,
    _version: OpenApiVersion,
  ) -> Result<BTreeMap<String, Fragment>, BuildError> {
    let header = authenticator.config_str("header")?;
    let mut scheme = Fragment::new();
    scheme.insert(words::TYPE.to_string(), json!(words::API_KEY));
    scheme.insert(words::IN.to_string(), json!(words::HEADER));
    scheme.insert(words::NAME.to_string(), json!(header));

    let mut schemes = BTreeMap::new();
    schemes.insert(authenticator.scheme_name().to_string(), scheme);
    Ok(schemes)
  }

  fn security_requirements(
    &self,
    authenticator: &Authenticator,
    _version: OpenApiVersion,
  ) -> Result<Vec<Value>, BuildError> {
    Ok(vec![json!({ authenticator.scheme_name(): [] })])
  }
}

/// Dispatch table from authenticator tags to converters.
#[derive(Default)]
pub struct AuthenticatorConverterRegistry {
  converters: BTreeMap<String, Box<dyn AuthenticatorConverter>>,
}

impl AuthenticatorConverterRegistry {
  pub fn empty() -> Self {
    Self::default()
  }

  /// Registry with the built-in converters.
  pub fn with_defaults() -> Self {
    let mut registry = Self::empty();
    registry.register_converter(auth_tags::HEADER_API_KEY, HeaderApiKeyConverter);
    registry
  }

  pub fn register_converter(&mut self, tag: impl Into<String>, converter: impl AuthenticatorConverter + 'static) {
    self.converters.insert(tag.into(), Box::new(converter));
  }

  fn converter_for(&self, authenticator: &Authenticator) -> Result<&dyn AuthenticatorConverter, BuildError> {
    authenticator
      .type_chain()
      .iter()
      .find_map(|tag| self.converters.get(tag).map(Box::as_ref))
      .ok_or_else(|| BuildError::UnconvertibleAuthenticator {
        type_tag: authenticator.type_name().to_string(),
        scheme: authenticator.scheme_name().to_string(),
        chain: authenticator.type_chain().to_vec(),
      })
  }

  pub fn security_schemes(
    &self,
    authenticator: &Authenticator,
    version: OpenApiVersion,
  ) -> Result<BTreeMap<String, Fragment>, BuildError> {
    self.converter_for(authenticator)?.security_schemes(authenticator, version)
  }

  pub fn security_requirements(
    &self,
    authenticator: &Authenticator,
    version: OpenApiVersion,
  ) -> Result<Vec<Value>, BuildError> {
    self
      .converter_for(authenticator)?
      .security_requirements(authenticator, version)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_header_api_key_scheme_and_requirement() {
    let registry = AuthenticatorConverterRegistry::with_defaults();
    let authenticator = Authenticator::header_api_key("sharedSecret", "X-Api-Key");

    let schemes = registry
      .security_schemes(&authenticator, OpenApiVersion::V2)
      .unwrap();
    let scheme = schemes.get("sharedSecret").unwrap();
    assert_eq!(scheme.get("type"), Some(&json!("apiKey")));
    assert_eq!(scheme.get("in"), Some(&json!("header")));
    assert_eq!(scheme.get("name"), Some(&json!("X-Api-Key")));

    let requirements = registry
      .security_requirements(&authenticator, OpenApiVersion::V2)
      .unwrap();
    assert_eq!(requirements, vec![json!({ "sharedSecret": [] })]);
  }

  #[test]
  fn test_subtype_resolves_through_ancestor_converter() {
    let registry = AuthenticatorConverterRegistry::with_defaults();
    let authenticator = Authenticator::header_api_key("rotated", "X-Rotated-Key").type_tag("rotating_api_key");

    let requirements = registry
      .security_requirements(&authenticator, OpenApiVersion::V3)
      .unwrap();
    assert_eq!(requirements, vec![json!({ "rotated": [] })]);
  }

  #[test]
  fn test_unregistered_authenticator_fails() {
    let registry = AuthenticatorConverterRegistry::with_defaults();
    let authenticator = Authenticator::custom("mutual_tls", "mtls");

    let error = registry
      .security_schemes(&authenticator, OpenApiVersion::V2)
      .unwrap_err();
    assert!(matches!(
      error,
      BuildError::UnconvertibleAuthenticator { type_tag, .. } if type_tag == "mutual_tls"
    ));
  }
}
