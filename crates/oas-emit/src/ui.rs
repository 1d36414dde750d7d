//! Swagger UI markup and the build-once document cache.
//!
//! This crate does not serve HTTP. Hosts mount the rendered HTML and the
//! serialized document on whatever routes they like.

use std::sync::OnceLock;

use serde_json::Value;

use crate::errors::BuildError;

/// Render the Swagger UI page for a document served at `spec_url`.
pub fn swagger_ui_html(spec_url: &str, title: &str) -> String {
  format!(
    r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>{title}</title>
  <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@5.9.0/swagger-ui.css" />
</head>
<body>
  <div id="swagger-ui"></div>
  <script src="https://unpkg.com/swagger-ui-dist@5.9.0/swagger-ui-bundle.js"></script>
  <script src="https://unpkg.com/swagger-ui-dist@5.9.0/swagger-ui-standalone-preset.js"></script>
  <script>
    window.onload = function() {{
      SwaggerUIBundle({{
        url: '{spec_url}',
        dom_id: '#swagger-ui',
        deepLinking: true,
        presets: [SwaggerUIBundle.presets.apis, SwaggerUIStandalonePreset],
        layout: "StandaloneLayout"
      }});
    }};
  </script>
</body>
</html>
"#
  )
}

/// Serialized-document cache for long-running processes.
///
/// The registry is immutable once serving starts, so the document is built
/// at most once; later calls return the cached bytes.
#[derive(Default)]
pub struct DocumentCache {
  serialized: OnceLock<String>,
}

impl DocumentCache {
  pub const fn new() -> Self {
    Self {
      serialized: OnceLock::new(),
    }
  }

  /// Return the cached serialization, building it on first use. A failed
  /// build caches nothing, so a later call retries.
  pub fn get_or_build(&self, build: impl FnOnce() -> Result<Value, BuildError>) -> Result<&str, BuildError> {
    if let Some(serialized) = self.serialized.get() {
      return Ok(serialized);
    }
    let document = build()?;
    Ok(self.serialized.get_or_init(|| document.to_string()))
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn test_swagger_ui_html_embeds_spec_url() {
    let html = swagger_ui_html("/api/swagger.json", "Pet Store");
    assert!(html.contains("SwaggerUIBundle"));
    assert!(html.contains("url: '/api/swagger.json'"));
    assert!(html.contains("<title>Pet Store</title>"));
  }

  #[test]
  fn test_document_cache_builds_once() {
    let cache = DocumentCache::new();
    let mut builds = 0;
    let first = cache
      .get_or_build(|| {
        builds += 1;
        Ok(json!({"openapi": "3.0.2"}))
      })
      .unwrap()
      .to_string();
    let second = cache.get_or_build(|| unreachable!()).unwrap();
    assert_eq!(first, second);
    assert_eq!(builds, 1);
  }

  #[test]
  fn test_document_cache_retries_after_failure() {
    let cache = DocumentCache::new();
    let failed = cache.get_or_build(|| {
      Err(BuildError::UnresolvedReference {
        name: "Ghost".to_string(),
      })
    });
    assert!(failed.is_err());
    assert!(cache.get_or_build(|| Ok(json!({}))).is_ok());
  }
}
