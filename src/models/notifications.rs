use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{Field, USER_ID};
use crate::core::{FieldKind, FieldSpec, Schema};

/// Channel and topic switches a user can toggle
pub const NOTIFICATION_FIELDS: &[FieldSpec] = &[
    FieldSpec::optional("productNews", "product_news", FieldKind::Bool),
    FieldSpec::optional("announcements", "announcements", FieldKind::Bool),
    FieldSpec::optional("offers", "offers", FieldKind::Bool),
    FieldSpec::optional("securityOnly", "security_only", FieldKind::Bool),
    FieldSpec::optional("email", "email", FieldKind::Bool),
    FieldSpec::optional("inapp", "inapp", FieldKind::Bool),
    FieldSpec::optional("sms", "sms", FieldKind::Bool),
];

/// Partial update of notification preferences.
///
/// Every field is tri-state: an absent key leaves the stored value alone,
/// `null` clears it back to its default, a boolean sets it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPreferencesIn {
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub product_news: Field<bool>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub announcements: Field<bool>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub offers: Field<bool>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub security_only: Field<bool>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub email: Field<bool>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub inapp: Field<bool>,
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub sms: Field<bool>,
}

impl NotificationPreferencesIn {
    /// Merge `patch` into these preferences
    pub fn apply(&mut self, patch: &NotificationPreferencesIn) {
        self.product_news.apply(patch.product_news);
        self.announcements.apply(patch.announcements);
        self.offers.apply(patch.offers);
        self.security_only.apply(patch.security_only);
        self.email.apply(patch.email);
        self.inapp.apply(patch.inapp);
        self.sms.apply(patch.sms);
    }

    /// Resolve every unset or cleared switch to its default
    pub fn with_defaults(&self) -> Self {
        Self {
            product_news: Field::Value(self.product_news.unwrap_or(false)),
            announcements: Field::Value(self.announcements.unwrap_or(true)),
            offers: Field::Value(self.offers.unwrap_or(false)),
            security_only: Field::Value(self.security_only.unwrap_or(true)),
            email: Field::Value(self.email.unwrap_or(true)),
            inapp: Field::Value(self.inapp.unwrap_or(true)),
            sms: Field::Value(self.sms.unwrap_or(false)),
        }
    }

    /// Wire names of the fields this update carries
    pub fn provided_fields(&self) -> Vec<&'static str> {
        [
            ("productNews", self.product_news),
            ("announcements", self.announcements),
            ("offers", self.offers),
            ("securityOnly", self.security_only),
            ("email", self.email),
            ("inapp", self.inapp),
            ("sms", self.sms),
        ]
        .into_iter()
        .filter(|(_, field)| field.is_provided())
        .map(|(name, _)| name)
        .collect()
    }
}

impl Schema for NotificationPreferencesIn {
    const RECORD: &'static str = "NotificationPreferencesIn";
    const FIELDS: &'static [&'static [FieldSpec]] = &[NOTIFICATION_FIELDS];
}

/// Notification preferences as returned to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct NotificationPreferencesOut {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[serde(flatten)]
    pub preferences: NotificationPreferencesIn,
}

impl NotificationPreferencesOut {
    pub fn new(user_id: impl Into<String>, preferences: NotificationPreferencesIn) -> Self {
        Self {
            user_id: user_id.into(),
            preferences,
        }
    }

    /// Apply a client update onto the current state
    pub fn apply_update(&mut self, patch: &NotificationPreferencesIn) {
        self.preferences.apply(patch);
        tracing::debug!(
            "Applied notification preferences update for {}: {:?}",
            self.user_id,
            patch.provided_fields()
        );
    }

    /// Same record with every switch resolved to a concrete value
    pub fn with_defaults(&self) -> Self {
        Self {
            user_id: self.user_id.clone(),
            preferences: self.preferences.with_defaults(),
        }
    }
}

impl Schema for NotificationPreferencesOut {
    const RECORD: &'static str = "NotificationPreferencesOut";
    const FIELDS: &'static [&'static [FieldSpec]] = &[&[USER_ID], NOTIFICATION_FIELDS];
}
