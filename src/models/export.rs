use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

use super::USER_ID;
use crate::config::ExportSettings;
use crate::core::{FieldKind, FieldSpec, Schema};

/// Lifecycle state of a data export job.
///
/// Transitions are driven by the export worker:
/// `PENDING -> PROCESSING -> READY -> EXPIRED`, or `PROCESSING -> FAILED`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExportStatus {
    Pending,
    Processing,
    Ready,
    Failed,
    Expired,
}

impl ExportStatus {
    pub const ALL: [ExportStatus; 5] = [
        ExportStatus::Pending,
        ExportStatus::Processing,
        ExportStatus::Ready,
        ExportStatus::Failed,
        ExportStatus::Expired,
    ];

    /// Wire names, in lifecycle order
    pub const NAMES: &'static [&'static str] =
        &["PENDING", "PROCESSING", "READY", "FAILED", "EXPIRED"];

    pub fn as_str(self) -> &'static str {
        match self {
            ExportStatus::Pending => "PENDING",
            ExportStatus::Processing => "PROCESSING",
            ExportStatus::Ready => "READY",
            ExportStatus::Failed => "FAILED",
            ExportStatus::Expired => "EXPIRED",
        }
    }

    /// Job is queued or running
    pub fn is_in_flight(self) -> bool {
        matches!(self, ExportStatus::Pending | ExportStatus::Processing)
    }

    /// No further work will happen. READY only leaves for EXPIRED.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ExportStatus::Ready | ExportStatus::Failed | ExportStatus::Expired
        )
    }

    /// Whether the worker may move a job from `self` to `next`.
    ///
    /// Informational only; parsing never rejects a record on this basis.
    pub fn can_transition_to(self, next: ExportStatus) -> bool {
        matches!(
            (self, next),
            (ExportStatus::Pending, ExportStatus::Processing)
                | (ExportStatus::Processing, ExportStatus::Ready)
                | (ExportStatus::Processing, ExportStatus::Failed)
                | (ExportStatus::Ready, ExportStatus::Expired)
        )
    }
}

impl fmt::Display for ExportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown export status `{0}`")]
pub struct ParseExportStatusError(pub String);

impl FromStr for ExportStatus {
    type Err = ParseExportStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExportStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseExportStatusError(s.to_string()))
    }
}

pub const EXPORT_JOB_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("id", "id", FieldKind::String),
    USER_ID,
    FieldSpec::required("status", "status", FieldKind::Enum(ExportStatus::NAMES)),
    FieldSpec::optional("bucket", "bucket", FieldKind::String),
    FieldSpec::optional("objectKey", "object_key", FieldKind::String),
    FieldSpec::optional("readyAt", "ready_at", FieldKind::Timestamp),
    FieldSpec::optional("expiresAt", "expires_at", FieldKind::Timestamp),
    FieldSpec::required("createdAt", "created_at", FieldKind::Timestamp),
    FieldSpec::required("updatedAt", "updated_at", FieldKind::Timestamp),
];

/// A user's data export job as stored and returned.
///
/// `bucket`, `objectKey` and `readyAt` are expected only once the job is
/// READY; the worker owns that, so they are not cross-checked here.
///
/// This is a stored record, not a patch: an absent optional field and an
/// explicit `null` both read as `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DataExportJob {
    #[validate(length(min = 1))]
    pub id: String,
    #[validate(length(min = 1))]
    #[serde(alias = "user_id")]
    pub user_id: String,
    pub status: ExportStatus,
    #[serde(default)]
    pub bucket: Option<String>,
    #[serde(default)]
    pub object_key: Option<String>,
    #[serde(default)]
    pub ready_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Storage location of a finished export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportArtifact<'a> {
    pub bucket: Option<&'a str>,
    pub object_key: &'a str,
}

impl DataExportJob {
    /// Fresh PENDING job for `user_id`
    pub fn pending(user_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().simple().to_string(),
            user_id: user_id.into(),
            status: ExportStatus::Pending,
            bucket: None,
            object_key: None,
            ready_at: None,
            expires_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// READY with an object to point a download at
    pub fn is_downloadable(&self) -> bool {
        self.status == ExportStatus::Ready && self.object_key.is_some()
    }

    pub fn artifact(&self) -> Option<ExportArtifact<'_>> {
        if self.status != ExportStatus::Ready {
            return None;
        }

        self.object_key.as_deref().map(|object_key| ExportArtifact {
            bucket: self.bucket.as_deref(),
            object_key,
        })
    }

    /// Whether the export link is no longer valid at `now`.
    ///
    /// Without an explicit `expiresAt`, a READY job expires the configured
    /// link TTL after `readyAt`. A deadline past the representable range
    /// never expires.
    pub fn is_expired(&self, now: DateTime<Utc>, settings: &ExportSettings) -> bool {
        if self.status == ExportStatus::Expired {
            return true;
        }

        match (self.expires_at, self.ready_at) {
            (Some(expires_at), _) => expires_at <= now,
            (None, Some(ready_at)) => ready_at
                .checked_add_signed(settings.link_ttl())
                .is_some_and(|deadline| deadline <= now),
            (None, None) => false,
        }
    }

    /// Most recently created in-flight job, if any.
    ///
    /// A caller asking for a new export gets this one back instead of
    /// queueing a duplicate.
    pub fn latest_in_flight<'a, I>(jobs: I) -> Option<&'a DataExportJob>
    where
        I: IntoIterator<Item = &'a DataExportJob>,
    {
        jobs.into_iter()
            .filter(|job| job.status.is_in_flight())
            .max_by_key(|job| job.created_at)
    }
}

impl Schema for DataExportJob {
    const RECORD: &'static str = "DataExportJob";
    const FIELDS: &'static [&'static [FieldSpec]] = &[EXPORT_JOB_FIELDS];
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap()
    }

    fn ready_job() -> DataExportJob {
        DataExportJob {
            status: ExportStatus::Ready,
            bucket: Some("exports".to_string()),
            object_key: Some("exports/u1/job-1.zip".to_string()),
            ready_at: Some(day(2)),
            ..DataExportJob::pending("u1", day(1))
        }
    }

    #[test]
    fn test_status_round_trips_through_str() {
        for status in ExportStatus::ALL {
            assert_eq!(status.as_str().parse::<ExportStatus>(), Ok(status));
            assert_eq!(
                serde_json::to_value(status).unwrap(),
                serde_json::json!(status.as_str())
            );
        }
        assert_eq!(
            "ready".parse::<ExportStatus>(),
            Err(ParseExportStatusError("ready".to_string()))
        );
    }

    #[test]
    fn test_names_match_variants() {
        let names: Vec<&str> = ExportStatus::ALL.iter().map(|s| s.as_str()).collect();
        assert_eq!(names, ExportStatus::NAMES);
    }

    #[test]
    fn test_transitions() {
        use ExportStatus::*;

        assert!(Pending.can_transition_to(Processing));
        assert!(Processing.can_transition_to(Ready));
        assert!(Processing.can_transition_to(Failed));
        assert!(Ready.can_transition_to(Expired));

        assert!(!Pending.can_transition_to(Ready));
        assert!(!Failed.can_transition_to(Processing));
        assert!(!Expired.can_transition_to(Ready));
        assert!(!Pending.can_transition_to(Failed));
    }

    #[test]
    fn test_terminal_and_in_flight() {
        use ExportStatus::*;

        assert!(Pending.is_in_flight() && Processing.is_in_flight());
        assert!(!Ready.is_in_flight());
        assert!(Ready.is_terminal() && Failed.is_terminal() && Expired.is_terminal());
        assert!(!Processing.is_terminal());
    }

    #[test]
    fn test_pending_job() {
        let job = DataExportJob::pending("u1", day(1));
        assert_eq!(job.status, ExportStatus::Pending);
        assert_eq!(job.created_at, job.updated_at);
        assert_eq!(job.id.len(), 32);
        assert!(job.artifact().is_none());
        assert!(!job.is_downloadable());
    }

    #[test]
    fn test_artifact_only_when_ready() {
        let job = ready_job();
        assert!(job.is_downloadable());
        assert_eq!(
            job.artifact(),
            Some(ExportArtifact {
                bucket: Some("exports"),
                object_key: "exports/u1/job-1.zip"
            })
        );

        let failed = DataExportJob {
            status: ExportStatus::Failed,
            ..ready_job()
        };
        assert!(failed.artifact().is_none());

        let keyless = DataExportJob {
            object_key: None,
            ..ready_job()
        };
        assert!(!keyless.is_downloadable());
    }

    #[test]
    fn test_expiry() {
        let settings = ExportSettings::default();
        let job = ready_job();

        assert!(!job.is_expired(day(8), &settings));
        assert!(job.is_expired(day(9), &settings));

        let explicit = DataExportJob {
            expires_at: Some(day(3)),
            ..ready_job()
        };
        assert!(!explicit.is_expired(day(2), &settings));
        assert!(explicit.is_expired(day(3), &settings));

        let expired = DataExportJob {
            status: ExportStatus::Expired,
            ..DataExportJob::pending("u1", day(1))
        };
        assert!(expired.is_expired(day(1), &settings));

        assert!(!DataExportJob::pending("u1", day(1)).is_expired(day(1) + Duration::days(365), &settings));
    }

    #[test]
    fn test_expiry_with_unrepresentable_deadline() {
        let settings = ExportSettings {
            link_ttl_days: u32::MAX,
            ..ExportSettings::default()
        };
        let job = ready_job();

        assert!(!job.is_expired(day(9), &settings));
        assert!(!job.is_expired(DateTime::<Utc>::MAX_UTC, &settings));
    }

    #[test]
    fn test_latest_in_flight() {
        let older = DataExportJob::pending("u1", day(1));
        let newer = DataExportJob {
            status: ExportStatus::Processing,
            ..DataExportJob::pending("u1", day(3))
        };
        let newest_ready = DataExportJob {
            created_at: day(5),
            ..ready_job()
        };

        let jobs = vec![older, newer.clone(), newest_ready];
        assert_eq!(DataExportJob::latest_in_flight(&jobs), Some(&newer));

        let done: Vec<DataExportJob> = vec![ready_job()];
        assert_eq!(DataExportJob::latest_in_flight(&done), None);
    }
}
