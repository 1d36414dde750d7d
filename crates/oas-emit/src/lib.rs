//! Declarative OpenAPI document generation.
//!
//! Route handlers are registered against a [`HandlerRegistry`] together with
//! declarative schema graphs for their bodies, query strings, headers and
//! responses. A [`Generator`] converts the registry into a complete
//! Swagger 2.0 or OpenAPI 3.0 JSON document: nested schemas become named,
//! deterministically suffixed definitions, cyclic schemas resolve to `$ref`
//! pointers, and authenticators map to security schemes. Custom field,
//! validator and authenticator variants plug in through converter
//! registries with ancestor-chain dispatch.
//!
//! ```
//! use http::Method;
//! use oas_emit::{Field, Generator, HandlerRegistry, OpenApiVersion, PathDefinition, Responses, Schema};
//!
//! let pet = Schema::builder("Pet")
//!   .field("name", Field::string().required())
//!   .build();
//!
//! let mut registry = HandlerRegistry::new();
//! registry.add_handler(
//!   "/pets/<uuid:pet_id>",
//!   Method::GET,
//!   PathDefinition::builder()
//!     .func_name("get_pet")
//!     .responses(Responses::Single(pet))
//!     .build(),
//! );
//!
//! let generator = Generator::builder()
//!   .version(OpenApiVersion::V3)
//!   .title("Pet Store")
//!   .api_version("1.0.0")
//!   .build();
//! let document = generator.generate(&registry)?;
//! assert_eq!(document["openapi"], "3.0.2");
//! # Ok::<(), oas_emit::BuildError>(())
//! ```

pub mod errors;
pub mod generator;
pub mod registry;
pub mod schema;
pub mod ui;
pub mod validation;
mod words;

pub use errors::BuildError;
pub use generator::{
  Authenticator, AuthenticatorConverter, AuthenticatorConverterRegistry, ConversionContext, ConverterRegistry,
  FieldConverter, Fragment, Generator, OpenApiVersion, TagObject, ValidatorConverter,
};
pub use registry::{AuthenticatorSelection, HandlerRegistry, HeaderSelection, PathDefinition, Responses};
pub use schema::{Field, FieldKind, Schema, SchemaHandle, SchemaLink, Validator, ValidatorKind};
pub use ui::{DocumentCache, swagger_ui_html};
