// Model exports
pub mod export;
pub mod field;
pub mod notifications;
pub mod privacy;
pub mod responses;

use crate::core::{FieldKind, FieldSpec};

pub use export::{DataExportJob, ExportArtifact, ExportStatus, ParseExportStatusError};
pub use field::Field;
pub use notifications::{NotificationPreferencesIn, NotificationPreferencesOut};
pub use privacy::{PrivacyPreferencesIn, PrivacyPreferencesOut};
pub use responses::{DownloadLink, ErrorResponse, ExportJobAccepted, FieldErrorResponse};

/// Owning account, shared by every output record.
///
/// Emitted as `userId`; `user_id` is accepted on input as well.
pub(crate) const USER_ID: FieldSpec =
    FieldSpec::required("userId", "user_id", FieldKind::String).with_alias("user_id");
