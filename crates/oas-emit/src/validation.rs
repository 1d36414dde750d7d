//! The stock error response body.

use crate::schema::{Field, Schema, SchemaHandle};

/// Default error schema: a human-readable message plus an optional map of
/// field-level errors. Used as the `default` response unless the generator
/// is configured with a different schema.
pub fn error_schema() -> SchemaHandle {
  Schema::builder("Error")
    .field("message", Field::string().required())
    .field(
      "errors",
      Field::dict().description("Field-level validation errors, keyed by field name."),
    )
    .build()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_error_schema_shape() {
    let schema = error_schema();
    assert_eq!(schema.name(), "Error");
    let names: Vec<&str> = schema.fields().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["message", "errors"]);
    let (_, message) = schema.fields().next().unwrap();
    assert!(message.is_required());
  }
}
