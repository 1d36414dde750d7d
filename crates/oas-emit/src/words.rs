//! The OpenAPI vocabulary, collected in one place so converters and the
//! assembler never spell a document key inline.

pub(crate) const ADDITIONAL_PROPERTIES: &str = "additionalProperties";
pub(crate) const API_KEY: &str = "apiKey";
pub(crate) const APPLICATION_JSON: &str = "application/json";
pub(crate) const ARRAY: &str = "array";
pub(crate) const BODY: &str = "body";
pub(crate) const BOOLEAN: &str = "boolean";
pub(crate) const COLLECTION_FORMAT: &str = "collectionFormat";
pub(crate) const COMPONENTS: &str = "components";
pub(crate) const CONSUMES: &str = "consumes";
pub(crate) const CONTENT: &str = "content";
pub(crate) const CSV: &str = "csv";
pub(crate) const DATE: &str = "date";
pub(crate) const DATE_TIME: &str = "date-time";
pub(crate) const DEFAULT: &str = "default";
pub(crate) const DEFINITIONS: &str = "definitions";
pub(crate) const DESCRIPTION: &str = "description";
pub(crate) const ENUM: &str = "enum";
pub(crate) const EXPLODE: &str = "explode";
pub(crate) const FORMAT: &str = "format";
pub(crate) const HEADER: &str = "header";
pub(crate) const HOST: &str = "host";
pub(crate) const IN: &str = "in";
pub(crate) const INFO: &str = "info";
pub(crate) const INTEGER: &str = "integer";
pub(crate) const ITEMS: &str = "items";
pub(crate) const MAXIMUM: &str = "maximum";
pub(crate) const MAX_ITEMS: &str = "maxItems";
pub(crate) const MAX_LENGTH: &str = "maxLength";
pub(crate) const MINIMUM: &str = "minimum";
pub(crate) const MIN_ITEMS: &str = "minItems";
pub(crate) const MIN_LENGTH: &str = "minLength";
pub(crate) const MULTI: &str = "multi";
pub(crate) const NAME: &str = "name";
pub(crate) const NULLABLE: &str = "nullable";
pub(crate) const NULLABLE_EXTENSION: &str = "x-nullable";
pub(crate) const NUMBER: &str = "number";
pub(crate) const OBJECT: &str = "object";
pub(crate) const OPENAPI: &str = "openapi";
pub(crate) const OPERATION_ID: &str = "operationId";
pub(crate) const PARAMETERS: &str = "parameters";
pub(crate) const PATH: &str = "path";
pub(crate) const PATHS: &str = "paths";
pub(crate) const PRODUCES: &str = "produces";
pub(crate) const PROPERTIES: &str = "properties";
pub(crate) const QUERY: &str = "query";
pub(crate) const READ_ONLY: &str = "readOnly";
pub(crate) const REF: &str = "$ref";
pub(crate) const REQUEST_BODY: &str = "requestBody";
pub(crate) const REQUIRED: &str = "required";
pub(crate) const RESPONSES: &str = "responses";
pub(crate) const SCHEMA: &str = "schema";
pub(crate) const SCHEMAS: &str = "schemas";
pub(crate) const SCHEMES: &str = "schemes";
pub(crate) const SECURITY: &str = "security";
pub(crate) const SECURITY_DEFINITIONS: &str = "securityDefinitions";
pub(crate) const SECURITY_SCHEMES: &str = "securitySchemes";
pub(crate) const SERVERS: &str = "servers";
pub(crate) const SIMPLE: &str = "simple";
pub(crate) const STRING: &str = "string";
pub(crate) const STYLE: &str = "style";
pub(crate) const SUMMARY: &str = "summary";
pub(crate) const SWAGGER: &str = "swagger";
pub(crate) const TAGS: &str = "tags";
pub(crate) const TITLE: &str = "title";
pub(crate) const TYPE: &str = "type";
pub(crate) const URL: &str = "url";
pub(crate) const UUID: &str = "uuid";
pub(crate) const VERSION: &str = "version";
