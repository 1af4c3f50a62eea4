// Schema and validation exports
pub mod error;
pub mod schema;

pub use error::{FieldError, FieldErrorKind, ValidationError};
pub use schema::{fields_of, json_type, parse_record, FieldKind, FieldSpec, Schema};
