//! Document generation: converter dispatch, the definitions table, path
//! templating, security mapping, and final assembly.

mod converters;
mod definitions;
mod document;
mod fields;
mod paths;
mod security;

pub use converters::{ConversionContext, ConverterRegistry, FieldConverter, Fragment, ValidatorConverter};
pub use document::{Generator, PathParameterType, TagObject};
pub use paths::{PathArgument, format_path};
pub use security::{Authenticator, AuthenticatorConverter, AuthenticatorConverterRegistry, auth_tags};

/// Which document dialect to emit.
///
/// The two dialects share the conversion machinery and differ in document
/// shape: root keys, where definitions live, how request bodies and list
/// parameters are spelled, and the nullability marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpenApiVersion {
  /// Swagger 2.0.
  V2,
  /// OpenAPI 3.0.x.
  #[default]
  V3,
}

impl OpenApiVersion {
  /// The version string written at the document root.
  pub fn version_string(self) -> &'static str {
    match self {
      Self::V2 => "2.0",
      Self::V3 => "3.0.2",
    }
  }

  /// Prefix for `$ref` pointers into the definitions table.
  pub(crate) fn ref_base(self) -> &'static str {
    match self {
      Self::V2 => "#/definitions",
      Self::V3 => "#/components/schemas",
    }
  }
}
