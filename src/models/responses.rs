use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ExportSettings;
use crate::core::ValidationError;
use crate::models::export::{DataExportJob, ExportStatus};

/// Response when an export is requested, or an in-flight one is reused
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportJobAccepted {
    #[serde(rename = "jobId")]
    pub job_id: String,
    pub status: ExportStatus,
}

impl From<&DataExportJob> for ExportJobAccepted {
    fn from(job: &DataExportJob) -> Self {
        Self {
            job_id: job.id.clone(),
            status: job.status,
        }
    }
}

/// Signed link to a finished export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadLink {
    pub url: String,
    #[serde(rename = "expiresAt")]
    pub expires_at: DateTime<Utc>,
}

impl DownloadLink {
    /// Saturates at the latest representable instant.
    pub fn new(url: impl Into<String>, issued_at: DateTime<Utc>, settings: &ExportSettings) -> Self {
        Self {
            url: url.into(),
            expires_at: issued_at
                .checked_add_signed(settings.download_url_ttl())
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }
}

/// One failing field in an error response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldErrorResponse {
    pub field: String,
    pub code: String,
    pub message: String,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldErrorResponse>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>, status_code: u16) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status_code,
            fields: Vec::new(),
        }
    }
}

impl From<&ValidationError> for ErrorResponse {
    fn from(err: &ValidationError) -> Self {
        Self {
            error: "validation_failed".to_string(),
            message: err.to_string(),
            status_code: 400,
            fields: err
                .field_errors()
                .iter()
                .map(|e| FieldErrorResponse {
                    field: e.field.clone(),
                    code: e.kind.code().to_string(),
                    message: e.kind.to_string(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FieldError, FieldErrorKind};
    use chrono::TimeZone;

    #[test]
    fn test_accepted_from_job() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let job = DataExportJob::pending("u1", now);
        let accepted = ExportJobAccepted::from(&job);

        let json = serde_json::to_value(&accepted).unwrap();
        assert_eq!(json["jobId"], job.id.as_str());
        assert_eq!(json["status"], "PENDING");
    }

    #[test]
    fn test_download_link_expiry() {
        let issued = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let link = DownloadLink::new("https://storage.example/x", issued, &ExportSettings::default());

        assert_eq!(
            link.expires_at,
            Utc.with_ymd_and_hms(2024, 1, 1, 12, 15, 0).unwrap()
        );
    }

    #[test]
    fn test_download_link_expiry_saturates() {
        let settings = ExportSettings {
            download_url_ttl_secs: u32::MAX,
            ..ExportSettings::default()
        };
        let issued = DateTime::<Utc>::MAX_UTC - chrono::Duration::days(1);
        let link = DownloadLink::new("https://storage.example/x", issued, &settings);

        assert_eq!(link.expires_at, DateTime::<Utc>::MAX_UTC);
    }

    #[test]
    fn test_error_response_from_validation_error() {
        let err = ValidationError::Fields {
            record: "PrivacyPreferencesOut",
            errors: vec![FieldError::new("userId", FieldErrorKind::MissingRequired)],
        };

        let body = ErrorResponse::from(&err);
        assert_eq!(body.error, "validation_failed");
        assert_eq!(body.status_code, 400);
        assert_eq!(
            body.fields,
            vec![FieldErrorResponse {
                field: "userId".to_string(),
                code: "missing_required".to_string(),
                message: "field is required".to_string(),
            }]
        );
    }

    #[test]
    fn test_error_response_omits_empty_fields() {
        let json = serde_json::to_value(ErrorResponse::new("invalid_json", "bad", 400)).unwrap();
        assert!(json.get("fields").is_none());
    }
}
