//! Route path templating.
//!
//! Registration paths use angle-bracket placeholders, optionally prefixed
//! with a converter tag: `/pets/<uuid:pet_id>/photos/<photo_id>`. The
//! document wants curly-brace templates, and the converter tags drive the
//! parameter types emitted alongside each path.

use std::sync::LazyLock;

use regex::Regex;

static PATH_ARGUMENT: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"<((?P<converter>[^:<>]+):)?(?P<name>[^:<>]+)>").expect("bad regex"));

/// One placeholder extracted from a registration path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathArgument {
  pub name: String,
  /// Converter tag from the placeholder, defaulting to `string` when the
  /// placeholder carries none.
  pub converter: String,
}

/// Rewrite a registration path into a document path template and collect its
/// placeholder arguments in order of appearance.
///
/// `/pets/<uuid:pet_id>` becomes `/pets/{pet_id}` with one argument named
/// `pet_id` using the `uuid` converter.
pub fn format_path(registration_path: &str) -> (String, Vec<PathArgument>) {
  let mut arguments = Vec::new();
  let formatted = PATH_ARGUMENT.replace_all(registration_path, |captures: &regex::Captures<'_>| {
    let name = captures.name("name").map(|m| m.as_str()).unwrap_or_default();
    let converter = captures
      .name("converter")
      .map(|m| m.as_str())
      .unwrap_or("string");
    arguments.push(PathArgument {
      name: name.to_string(),
      converter: converter.to_string(),
    });
    format!("{{{name}}}")
  });
  (formatted.into_owned(), arguments)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_format_path_no_arguments() {
    let (path, arguments) = format_path("/health");
    assert_eq!(path, "/health");
    assert!(arguments.is_empty());
  }

  #[test]
  fn test_format_path_bare_argument_defaults_to_string() {
    let (path, arguments) = format_path("/pets/<pet_id>");
    assert_eq!(path, "/pets/{pet_id}");
    assert_eq!(
      arguments,
      vec![PathArgument {
        name: "pet_id".to_string(),
        converter: "string".to_string(),
      }]
    );
  }

  #[test]
  fn test_format_path_converter_arguments_in_order() {
    let (path, arguments) = format_path("/owners/<uuid:owner_id>/pets/<int:pet_number>");
    assert_eq!(path, "/owners/{owner_id}/pets/{pet_number}");
    assert_eq!(arguments.len(), 2);
    assert_eq!(arguments[0].name, "owner_id");
    assert_eq!(arguments[0].converter, "uuid");
    assert_eq!(arguments[1].name, "pet_number");
    assert_eq!(arguments[1].converter, "int");
  }
}
