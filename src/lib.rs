//! Account preferences - notification, privacy and data-export schemas
//!
//! Typed request/response records for the account backend, with the
//! validation that turns raw JSON bodies into them and the merge rules for
//! partial preference updates.

pub mod config;
pub mod core;
pub mod http;
pub mod logging;
pub mod models;

// Re-export commonly used types
pub use crate::core::{FieldError, FieldErrorKind, Schema, ValidationError};
pub use models::{
    DataExportJob, ExportStatus, Field, NotificationPreferencesIn, NotificationPreferencesOut,
    PrivacyPreferencesIn, PrivacyPreferencesOut,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let prefs = NotificationPreferencesIn::parse_str(r#"{"email": true}"#).unwrap();
        assert_eq!(prefs.email, Field::Value(true));
    }
}
