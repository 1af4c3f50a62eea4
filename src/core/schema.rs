use chrono::DateTime;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use validator::{Validate, ValidationErrors};

use super::error::{FieldError, FieldErrorKind, ValidationError};

/// Primitive shape a present field must have
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Bool,
    String,
    /// RFC 3339 / ISO-8601 string with an offset
    Timestamp,
    /// String restricted to the listed values
    Enum(&'static [&'static str]),
}

impl FieldKind {
    pub fn expected(&self) -> &'static str {
        match self {
            FieldKind::Bool => "boolean",
            FieldKind::String => "string",
            FieldKind::Timestamp => "ISO-8601 timestamp",
            FieldKind::Enum(_) => "string",
        }
    }

    /// Check a present, non-null value against this kind
    pub fn check(&self, value: &Value) -> Result<(), FieldErrorKind> {
        let mismatch = || FieldErrorKind::TypeMismatch {
            expected: self.expected(),
            found: json_type(value),
        };

        match self {
            FieldKind::Bool if value.is_boolean() => Ok(()),
            FieldKind::String if value.is_string() => Ok(()),
            FieldKind::Timestamp => match value.as_str() {
                Some(s) if DateTime::parse_from_rfc3339(s).is_ok() => Ok(()),
                _ => Err(mismatch()),
            },
            FieldKind::Enum(allowed) => match value.as_str() {
                Some(s) if allowed.contains(&s) => Ok(()),
                Some(s) => Err(FieldErrorKind::InvalidEnumValue {
                    value: s.to_string(),
                    allowed: *allowed,
                }),
                None => Err(mismatch()),
            },
            _ => Err(mismatch()),
        }
    }
}

/// Declaration of one field of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Name on the wire
    pub name: &'static str,
    /// Rust field name, used to map `validator` failures back to the wire
    pub ident: &'static str,
    /// Additional accepted input name
    pub alias: Option<&'static str>,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldSpec {
    pub const fn optional(name: &'static str, ident: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            ident,
            alias: None,
            kind,
            required: false,
        }
    }

    pub const fn required(name: &'static str, ident: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            ident,
            alias: None,
            kind,
            required: true,
        }
    }

    pub const fn with_alias(self, alias: &'static str) -> Self {
        Self {
            alias: Some(alias),
            ..self
        }
    }

    fn check(&self, map: &Map<String, Value>) -> Result<(), FieldErrorKind> {
        let primary = map.get(self.name);
        let aliased = self.alias.and_then(|alias| map.get(alias));

        let value = match (primary, aliased, self.alias) {
            (Some(_), Some(_), Some(alias)) => return Err(FieldErrorKind::Conflict { alias }),
            (Some(v), _, _) | (None, Some(v), _) => v,
            (None, None, _) if self.required => return Err(FieldErrorKind::MissingRequired),
            (None, None, _) => return Ok(()),
        };

        if value.is_null() {
            return if self.required {
                Err(FieldErrorKind::TypeMismatch {
                    expected: self.kind.expected(),
                    found: "null",
                })
            } else {
                Ok(())
            };
        }

        self.kind.check(value)
    }
}

/// A record that can be parsed and validated from a raw JSON value.
///
/// `FIELDS` is a list of field groups so an output record can list the
/// groups it embeds next to its own server-owned fields.
pub trait Schema: DeserializeOwned + Validate {
    const RECORD: &'static str;
    const FIELDS: &'static [&'static [FieldSpec]];

    /// Validate `raw` and build the record
    fn parse(raw: &Value) -> Result<Self, ValidationError> {
        parse_record(raw)
    }

    /// Decode a JSON document, then validate it
    fn parse_str(json: &str) -> Result<Self, ValidationError> {
        let raw: Value = serde_json::from_str(json)?;
        Self::parse(&raw)
    }
}

/// Iterate every field declared by `T`, across all of its groups
pub fn fields_of<T: Schema>() -> impl Iterator<Item = &'static FieldSpec> {
    T::FIELDS.iter().flat_map(|group| group.iter())
}

/// Structural check, typed decode, then the `validator` rules.
pub fn parse_record<T: Schema>(raw: &Value) -> Result<T, ValidationError> {
    let Some(map) = raw.as_object() else {
        return Err(ValidationError::NotAnObject {
            record: T::RECORD,
            found: json_type(raw),
        });
    };

    let errors: Vec<FieldError> = fields_of::<T>()
        .filter_map(|spec| {
            spec.check(map)
                .err()
                .map(|kind| FieldError::new(spec.name, kind))
        })
        .collect();

    if !errors.is_empty() {
        tracing::debug!(
            "{} rejected with {} field error(s): {:?}",
            T::RECORD,
            errors.len(),
            errors
        );
        return Err(ValidationError::Fields {
            record: T::RECORD,
            errors,
        });
    }

    let record = T::deserialize(raw)?;

    if let Err(errors) = record.validate() {
        let errors = rule_errors::<T>(&errors);
        tracing::debug!("{} failed field rules: {:?}", T::RECORD, errors);
        return Err(ValidationError::Fields {
            record: T::RECORD,
            errors,
        });
    }

    Ok(record)
}

fn rule_errors<T: Schema>(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut out: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(ident, failures)| {
            let ident = ident.to_string();
            let name = fields_of::<T>()
                .find(|spec| spec.ident == ident)
                .map(|spec| spec.name.to_string())
                .unwrap_or(ident);

            failures
                .iter()
                .map(|failure| {
                    let kind = match &*failure.code {
                        "length" => FieldErrorKind::Empty,
                        code => FieldErrorKind::Invalid {
                            code: code.to_string(),
                        },
                    };
                    FieldError::new(name.clone(), kind)
                })
                .collect::<Vec<_>>()
        })
        .collect();

    out.sort_by(|a, b| a.field.cmp(&b.field));
    out
}

/// Name of the JSON type of `value`, for error messages
pub fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
