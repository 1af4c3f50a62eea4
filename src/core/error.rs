use thiserror::Error;

/// Why a single field failed validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldErrorKind {
    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("`{value}` is not one of {}", .allowed.join(", "))]
    InvalidEnumValue {
        value: String,
        allowed: &'static [&'static str],
    },

    #[error("field is required")]
    MissingRequired,

    #[error("must not be empty")]
    Empty,

    #[error("also provided as `{alias}`")]
    Conflict { alias: &'static str },

    #[error("failed `{code}` check")]
    Invalid { code: String },
}

impl FieldErrorKind {
    /// Stable machine-readable code for client error bodies
    pub fn code(&self) -> &'static str {
        match self {
            FieldErrorKind::TypeMismatch { .. } => "type_mismatch",
            FieldErrorKind::InvalidEnumValue { .. } => "invalid_enum_value",
            FieldErrorKind::MissingRequired => "missing_required",
            FieldErrorKind::Empty => "empty",
            FieldErrorKind::Conflict { .. } => "conflict",
            FieldErrorKind::Invalid { .. } => "invalid",
        }
    }
}

/// A failing field, named by its wire name
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {kind}")]
pub struct FieldError {
    pub field: String,
    pub kind: FieldErrorKind,
}

impl FieldError {
    pub fn new(field: impl Into<String>, kind: FieldErrorKind) -> Self {
        Self {
            field: field.into(),
            kind,
        }
    }
}

/// Errors raised while turning a raw value into a typed record
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{record} must be a JSON object, found {found}")]
    NotAnObject {
        record: &'static str,
        found: &'static str,
    },

    #[error("{record} failed validation: {}", join_fields(.errors))]
    Fields {
        record: &'static str,
        errors: Vec<FieldError>,
    },

    #[error("Malformed JSON: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl ValidationError {
    /// Per-field failures; empty for record-level errors
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            ValidationError::Fields { errors, .. } => errors,
            _ => &[],
        }
    }

    /// Failure reported for the given wire field name, if any
    pub fn field(&self, name: &str) -> Option<&FieldErrorKind> {
        self.field_errors()
            .iter()
            .find(|e| e.field == name)
            .map(|e| &e.kind)
    }
}

fn join_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_lists_every_field() {
        let err = ValidationError::Fields {
            record: "DataExportJob",
            errors: vec![
                FieldError::new("id", FieldErrorKind::MissingRequired),
                FieldError::new(
                    "status",
                    FieldErrorKind::InvalidEnumValue {
                        value: "UNKNOWN".to_string(),
                        allowed: &["PENDING", "READY"],
                    },
                ),
            ],
        };

        assert_eq!(
            err.to_string(),
            "DataExportJob failed validation: id: field is required; \
             status: `UNKNOWN` is not one of PENDING, READY"
        );
    }

    #[test]
    fn test_field_lookup() {
        let err = ValidationError::Fields {
            record: "PrivacyPreferencesOut",
            errors: vec![FieldError::new("userId", FieldErrorKind::MissingRequired)],
        };

        assert_eq!(err.field("userId"), Some(&FieldErrorKind::MissingRequired));
        assert_eq!(err.field("essentialOnly"), None);
    }

    #[test]
    fn test_codes() {
        assert_eq!(FieldErrorKind::MissingRequired.code(), "missing_required");
        assert_eq!(FieldErrorKind::Empty.code(), "empty");
        assert_eq!(
            FieldErrorKind::TypeMismatch { expected: "boolean", found: "string" }.code(),
            "type_mismatch"
        );
    }
}
