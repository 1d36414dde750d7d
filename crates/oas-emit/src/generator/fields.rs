//! Built-in converters for the field and validator variants.
//!
//! Each converter contributes only its type-specific attributes; the shared
//! field attributes (description, default, nullability, read-only) and the
//! validator pass are composed by [`ConversionContext::convert_field`].

use serde_json::json;

use super::OpenApiVersion;
use super::converters::{ConversionContext, ConverterRegistry, FieldConverter, Fragment, ValidatorConverter};
use crate::errors::BuildError;
use crate::schema::{Field, FieldKind, Validator, ValidatorKind, tags};
use crate::words;

fn list_item<'f>(name: &str, field: &'f Field) -> Result<&'f Field, BuildError> {
  match field.kind() {
    FieldKind::List(item) => Ok(item),
    _ => Err(BuildError::MismatchedPayload {
      type_tag: field.type_name().to_string(),
      field: name.to_string(),
      expected: "list",
    }),
  }
}

fn scalar_fragment(type_word: &str, format: Option<&str>) -> Fragment {
  let mut fragment = Fragment::new();
  fragment.insert(words::TYPE.to_string(), json!(type_word));
  if let Some(format) = format {
    fragment.insert(words::FORMAT.to_string(), json!(format));
  }
  fragment
}

struct StringConverter;

impl FieldConverter for StringConverter {
  fn fragment(&self, _name: &str, _field: &Field, _ctx: &mut ConversionContext<'_>) -> Result<Fragment, BuildError> {
    Ok(scalar_fragment(words::STRING, None))
  }
}

struct IntegerConverter;

impl FieldConverter for IntegerConverter {
  fn fragment(&self, _name: &str, _field: &Field, _ctx: &mut ConversionContext<'_>) -> Result<Fragment, BuildError> {
    Ok(scalar_fragment(words::INTEGER, None))
  }
}

struct NumberConverter;

impl FieldConverter for NumberConverter {
  fn fragment(&self, _name: &str, _field: &Field, _ctx: &mut ConversionContext<'_>) -> Result<Fragment, BuildError> {
    Ok(scalar_fragment(words::NUMBER, None))
  }
}

struct BooleanConverter;

impl FieldConverter for BooleanConverter {
  fn fragment(&self, _name: &str, _field: &Field, _ctx: &mut ConversionContext<'_>) -> Result<Fragment, BuildError> {
    Ok(scalar_fragment(words::BOOLEAN, None))
  }
}

struct DateConverter;

impl FieldConverter for DateConverter {
  fn fragment(&self, _name: &str, _field: &Field, _ctx: &mut ConversionContext<'_>) -> Result<Fragment, BuildError> {
    Ok(scalar_fragment(words::STRING, Some(words::DATE)))
  }
}

struct DateTimeConverter;

impl FieldConverter for DateTimeConverter {
  fn fragment(&self, _name: &str, _field: &Field, _ctx: &mut ConversionContext<'_>) -> Result<Fragment, BuildError> {
    Ok(scalar_fragment(words::STRING, Some(words::DATE_TIME)))
  }
}

struct UuidConverter;

impl FieldConverter for UuidConverter {
  fn fragment(&self, _name: &str, _field: &Field, _ctx: &mut ConversionContext<'_>) -> Result<Fragment, BuildError> {
    Ok(scalar_fragment(words::STRING, Some(words::UUID)))
  }
}

struct DictConverter;

impl FieldConverter for DictConverter {
  fn fragment(&self, _name: &str, _field: &Field, _ctx: &mut ConversionContext<'_>) -> Result<Fragment, BuildError> {
    Ok(scalar_fragment(words::OBJECT, None))
  }
}

struct ConstantConverter;

impl FieldConverter for ConstantConverter {
  fn fragment(&self, name: &str, field: &Field, _ctx: &mut ConversionContext<'_>) -> Result<Fragment, BuildError> {
    let FieldKind::Constant(value) = field.kind() else {
      return Err(BuildError::MismatchedPayload {
        type_tag: field.type_name().to_string(),
        field: name.to_string(),
        expected: "constant",
      });
    };
    let mut fragment = Fragment::new();
    fragment.insert(words::ENUM.to_string(), json!([value]));
    Ok(fragment)
  }
}

struct ListConverter;

impl FieldConverter for ListConverter {
  fn fragment(&self, name: &str, field: &Field, ctx: &mut ConversionContext<'_>) -> Result<Fragment, BuildError> {
    let item = list_item(name, field)?;
    let converted = ctx.convert_field(name, item)?;
    let mut fragment = Fragment::new();
    fragment.insert(words::TYPE.to_string(), json!(words::ARRAY));
    fragment.insert(words::ITEMS.to_string(), super::converters::fragment_value(converted));
    Ok(fragment)
  }
}

/// Comma-separated query list: `collectionFormat: csv` under 2.0,
/// `style: simple` under 3.0.
struct CommaSeparatedListConverter;

impl FieldConverter for CommaSeparatedListConverter {
  fn fragment(&self, name: &str, field: &Field, ctx: &mut ConversionContext<'_>) -> Result<Fragment, BuildError> {
    let mut fragment = ListConverter.fragment(name, field, ctx)?;
    match ctx.version() {
      OpenApiVersion::V2 => {
        fragment.insert(words::COLLECTION_FORMAT.to_string(), json!(words::CSV));
      }
      OpenApiVersion::V3 => {
        fragment.insert(words::STYLE.to_string(), json!(words::SIMPLE));
      }
    }
    Ok(fragment)
  }
}

/// Repeated query parameter list: `collectionFormat: multi` under 2.0,
/// `explode: true` under 3.0.
struct QueryParamListConverter;

impl FieldConverter for QueryParamListConverter {
  fn fragment(&self, name: &str, field: &Field, ctx: &mut ConversionContext<'_>) -> Result<Fragment, BuildError> {
    let mut fragment = ListConverter.fragment(name, field, ctx)?;
    match ctx.version() {
      OpenApiVersion::V2 => {
        fragment.insert(words::COLLECTION_FORMAT.to_string(), json!(words::MULTI));
      }
      OpenApiVersion::V3 => {
        fragment.insert(words::EXPLODE.to_string(), json!(true));
      }
    }
    Ok(fragment)
  }
}

struct NestedConverter;

impl FieldConverter for NestedConverter {
  fn fragment(&self, name: &str, field: &Field, ctx: &mut ConversionContext<'_>) -> Result<Fragment, BuildError> {
    let FieldKind::Nested { link, many } = field.kind() else {
      return Err(BuildError::MismatchedPayload {
        type_tag: field.type_name().to_string(),
        field: name.to_string(),
        expected: "nested",
      });
    };
    let Some(child) = link.resolve() else {
      return Err(BuildError::DanglingSchemaRef {
        schema: ctx.schema_name().to_string(),
        field: name.to_string(),
      });
    };

    let converted = ctx.define(&child)?;
    let mut fragment = Fragment::new();
    if *many {
      fragment.insert(words::TYPE.to_string(), json!(words::ARRAY));
      fragment.insert(words::ITEMS.to_string(), converted);
    } else if let serde_json::Value::Object(map) = converted {
      // Conversion of a schema always yields an object fragment, either a
      // `$ref` or the inline object body.
      fragment.extend(map);
    }
    Ok(fragment)
  }
}

struct RangeConverter;

impl ValidatorConverter for RangeConverter {
  fn fragment(&self, validator: &Validator, _memo: &Fragment, _version: OpenApiVersion) -> Fragment {
    let mut fragment = Fragment::new();
    if let ValidatorKind::Range { min, max } = validator.kind() {
      if let Some(min) = min {
        fragment.insert(words::MINIMUM.to_string(), json!(min));
      }
      if let Some(max) = max {
        fragment.insert(words::MAXIMUM.to_string(), json!(max));
      }
    }
    fragment
  }
}

struct LengthConverter;

impl ValidatorConverter for LengthConverter {
  fn fragment(&self, validator: &Validator, memo: &Fragment, _version: OpenApiVersion) -> Fragment {
    let mut fragment = Fragment::new();
    let ValidatorKind::Length { min, max } = validator.kind() else {
      return fragment;
    };

    let converted_type = memo.get(words::TYPE).and_then(|value| value.as_str());
    let (min_word, max_word) = match converted_type {
      Some(words::ARRAY) => (words::MIN_ITEMS, words::MAX_ITEMS),
      Some(words::STRING) => (words::MIN_LENGTH, words::MAX_LENGTH),
      _ => return fragment,
    };

    if let Some(min) = min {
      fragment.insert(min_word.to_string(), json!(min));
    }
    if let Some(max) = max {
      fragment.insert(max_word.to_string(), json!(max));
    }
    fragment
  }
}

struct OneOfConverter;

impl ValidatorConverter for OneOfConverter {
  fn fragment(&self, validator: &Validator, _memo: &Fragment, _version: OpenApiVersion) -> Fragment {
    let mut fragment = Fragment::new();
    if let ValidatorKind::OneOf(choices) = validator.kind() {
      fragment.insert(words::ENUM.to_string(), json!(choices));
    }
    fragment
  }
}

pub(crate) fn register_scalars(registry: &mut ConverterRegistry) {
  registry.register_field_converter(tags::STRING, StringConverter);
  registry.register_field_converter(tags::INTEGER, IntegerConverter);
  registry.register_field_converter(tags::NUMBER, NumberConverter);
  registry.register_field_converter(tags::BOOLEAN, BooleanConverter);
  registry.register_field_converter(tags::DATE, DateConverter);
  registry.register_field_converter(tags::DATE_TIME, DateTimeConverter);
  registry.register_field_converter(tags::UUID, UuidConverter);
  registry.register_field_converter(tags::CONSTANT, ConstantConverter);
}

pub(crate) fn register_lists(registry: &mut ConverterRegistry) {
  registry.register_field_converter(tags::LIST, ListConverter);
}

pub(crate) fn register_query_lists(registry: &mut ConverterRegistry) {
  registry.register_field_converter(tags::COMMA_SEPARATED_LIST, CommaSeparatedListConverter);
  registry.register_field_converter(tags::QUERY_PARAM_LIST, QueryParamListConverter);
}

pub(crate) fn register_structured(registry: &mut ConverterRegistry) {
  registry.register_field_converter(tags::DICT, DictConverter);
  registry.register_field_converter(tags::NESTED, NestedConverter);
}

pub(crate) fn register_validators(registry: &mut ConverterRegistry) {
  registry.register_validator_converter(tags::RANGE, RangeConverter);
  registry.register_validator_converter(tags::LENGTH, LengthConverter);
  registry.register_validator_converter(tags::ONE_OF, OneOfConverter);
}
