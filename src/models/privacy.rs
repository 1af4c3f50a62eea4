use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{Field, USER_ID};
use crate::core::{FieldKind, FieldSpec, Schema};

pub const PRIVACY_FIELDS: &[FieldSpec] = &[
    FieldSpec::optional("analyticsConsent", "analytics_consent", FieldKind::Bool),
    FieldSpec::optional("essentialOnly", "essential_only", FieldKind::Bool),
    FieldSpec::optional("studentTargeting", "student_targeting", FieldKind::Bool),
    FieldSpec::optional("shareForResearch", "share_for_research", FieldKind::Bool),
];

/// Fields owned by the server on a privacy record
pub const PRIVACY_SERVER_FIELDS: &[FieldSpec] = &[FieldSpec::optional(
    "lastConsentAt",
    "last_consent_at",
    FieldKind::Timestamp,
)];

/// Partial update of privacy preferences.
///
/// `lastConsentAt` is not part of this record; a client that sends it has
/// the key ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PrivacyPreferencesIn {
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub analytics_consent: Field<bool>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub essential_only: Field<bool>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub student_targeting: Field<bool>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub share_for_research: Field<bool>,
}

impl PrivacyPreferencesIn {
    pub fn apply(&mut self, patch: &PrivacyPreferencesIn) {
        self.analytics_consent.apply(patch.analytics_consent);
        self.essential_only.apply(patch.essential_only);
        self.student_targeting.apply(patch.student_targeting);
        self.share_for_research.apply(patch.share_for_research);
    }

    /// Whether this update changes a consent-bearing switch.
    ///
    /// `studentTargeting` is a targeting flag, not consent.
    pub fn touches_consent(&self) -> bool {
        self.analytics_consent.is_provided()
            || self.essential_only.is_provided()
            || self.share_for_research.is_provided()
    }

    /// All switches default to off
    pub fn with_defaults(&self) -> Self {
        Self {
            analytics_consent: Field::Value(self.analytics_consent.unwrap_or(false)),
            essential_only: Field::Value(self.essential_only.unwrap_or(false)),
            student_targeting: Field::Value(self.student_targeting.unwrap_or(false)),
            share_for_research: Field::Value(self.share_for_research.unwrap_or(false)),
        }
    }
}

impl Schema for PrivacyPreferencesIn {
    const RECORD: &'static str = "PrivacyPreferencesIn";
    const FIELDS: &'static [&'static [FieldSpec]] = &[PRIVACY_FIELDS];
}

/// Privacy preferences as returned to the caller.
///
/// `lastConsentAt` reads as `None` whether it is absent or `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct PrivacyPreferencesOut {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[serde(flatten)]
    pub preferences: PrivacyPreferencesIn,
    #[serde(rename = "lastConsentAt", default)]
    pub last_consent_at: Option<DateTime<Utc>>,
}

impl PrivacyPreferencesOut {
    pub fn new(user_id: impl Into<String>, preferences: PrivacyPreferencesIn) -> Self {
        Self {
            user_id: user_id.into(),
            preferences,
            last_consent_at: None,
        }
    }

    /// Apply a client update, stamping `lastConsentAt` with `now` when the
    /// update touches consent.
    pub fn apply_update(&mut self, patch: &PrivacyPreferencesIn, now: DateTime<Utc>) {
        self.preferences.apply(patch);

        if patch.touches_consent() {
            self.last_consent_at = Some(now);
            tracing::info!("Recorded consent change for {} at {}", self.user_id, now);
        }
    }

    pub fn with_defaults(&self) -> Self {
        Self {
            user_id: self.user_id.clone(),
            preferences: self.preferences.with_defaults(),
            last_consent_at: self.last_consent_at,
        }
    }
}

impl Schema for PrivacyPreferencesOut {
    const RECORD: &'static str = "PrivacyPreferencesOut";
    const FIELDS: &'static [&'static [FieldSpec]] =
        &[&[USER_ID], PRIVACY_FIELDS, PRIVACY_SERVER_FIELDS];
}
