// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account model for storage and API.

use crate::error::AppError;
use crate::models::Patch;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// Identity asserted by the external identity provider after verification.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedIdentity {
    /// Provider subject ID (stable per Google account)
    pub subject: String,
    pub email: String,
    pub name: String,
    pub picture: Option<String>,
}

/// Account stored in Firestore (`accounts/{id}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Internal account ID (also used as document ID)
    pub id: String,
    /// Google subject ID, unique across accounts. Never leaves the server.
    pub google_id: String,
    /// Email address, unique across accounts
    pub email: String,
    /// Name as reported by the identity provider
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    /// Avatar URL
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub preferences: Preferences,
    /// True until the profile setup step has been completed
    #[serde(default)]
    pub is_new_user: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Seed a new account from a verified identity.
    pub fn from_identity(identity: &VerifiedIdentity, now: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            google_id: identity.subject.clone(),
            email: identity.email.clone(),
            name: identity.name.clone(),
            display_name: None,
            picture: identity.picture.clone(),
            bio: None,
            timezone: default_timezone(),
            language: default_language(),
            preferences: Preferences::default(),
            is_new_user: true,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum Theme {
    Light,
    Dark,
    #[default]
    Auto,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum ReminderFrequency {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct NotificationPreferences {
    #[serde(default = "default_true")]
    pub email: bool,
    #[serde(default = "default_true")]
    pub push: bool,
    #[serde(default = "default_true")]
    pub task_reminders: bool,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            email: true,
            push: true,
            task_reminders: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Preferences {
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub notifications: NotificationPreferences,
    #[serde(default = "default_categories")]
    pub default_categories: Vec<String>,
    #[serde(default)]
    pub reminder_frequency: ReminderFrequency,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            notifications: NotificationPreferences::default(),
            default_categories: default_categories(),
            reminder_frequency: ReminderFrequency::default(),
        }
    }
}

/// Body of the profile setup step (onboarding).
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSetup {
    #[validate(length(min = 1, max = 100))]
    pub display_name: String,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub bio: Option<String>,
    #[serde(default = "default_timezone")]
    #[validate(length(min = 1, max = 64))]
    pub timezone: String,
    #[serde(default = "default_language")]
    #[validate(length(min = 1, max = 16))]
    pub language: String,
    #[serde(default)]
    pub preferences: Preferences,
}

impl ProfileSetup {
    /// Trim text fields, then validate, so whitespace-only values are rejected.
    pub fn normalize(self) -> Result<Self, AppError> {
        let setup = Self {
            display_name: self.display_name.trim().to_string(),
            bio: self
                .bio
                .map(|bio| bio.trim().to_string())
                .filter(|bio| !bio.is_empty()),
            timezone: self.timezone.trim().to_string(),
            language: self.language.trim().to_string(),
            preferences: self.preferences,
        };
        setup.validate()?;
        Ok(setup)
    }
}

/// Partial preference update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesPatch {
    #[serde(default)]
    pub theme: Patch<Theme>,
    #[serde(default)]
    pub notifications: Patch<NotificationPreferences>,
    #[serde(default)]
    pub default_categories: Patch<Vec<String>>,
    #[serde(default)]
    pub reminder_frequency: Patch<ReminderFrequency>,
    #[serde(default)]
    pub timezone: Patch<String>,
    #[serde(default)]
    pub language: Patch<String>,
}

impl PreferencesPatch {
    /// Trim `timezone` and `language` and reject them when blank or too long.
    pub fn normalize(self) -> Result<Self, AppError> {
        Ok(Self {
            timezone: required_text("timezone", self.timezone, 64)?,
            language: required_text("language", self.language, 16)?,
            ..self
        })
    }
}

fn required_text(
    field: &str,
    value: Patch<String>,
    max: usize,
) -> Result<Patch<String>, AppError> {
    let Patch::Set(value) = value else {
        return Ok(Patch::Unset);
    };

    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::BadRequest(format!("{field} must not be empty")));
    }
    if value.chars().count() > max {
        return Err(AppError::BadRequest(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(Patch::Set(value.to_string()))
}

/// A mutation applied to a stored account.
#[derive(Debug, Clone)]
pub enum AccountChange {
    SetupProfile(ProfileSetup),
    UpdatePreferences(PreferencesPatch),
}

impl AccountChange {
    pub fn apply(&self, account: &mut Account, now: DateTime<Utc>) {
        match self {
            AccountChange::SetupProfile(setup) => {
                account.display_name = Some(setup.display_name.trim().to_string());
                account.bio = setup
                    .bio
                    .as_ref()
                    .map(|bio| bio.trim().to_string())
                    .filter(|bio| !bio.is_empty());
                account.timezone = setup.timezone.clone();
                account.language = setup.language.clone();
                account.preferences = setup.preferences.clone();
                account.is_new_user = false;
            }
            AccountChange::UpdatePreferences(patch) => {
                let prefs = &mut account.preferences;
                patch.theme.clone().apply_to(&mut prefs.theme);
                patch.notifications.clone().apply_to(&mut prefs.notifications);
                patch
                    .default_categories
                    .clone()
                    .apply_to(&mut prefs.default_categories);
                patch
                    .reminder_frequency
                    .clone()
                    .apply_to(&mut prefs.reminder_frequency);
                patch.timezone.clone().apply_to(&mut account.timezone);
                patch.language.clone().apply_to(&mut account.language);
            }
        }
        account.updated_at = now;
    }
}

/// Public account profile returned by the API.
///
/// Excludes the Google subject ID.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AccountResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    pub display_name: Option<String>,
    pub picture: Option<String>,
    pub bio: Option<String>,
    pub timezone: String,
    pub language: String,
    pub preferences: Preferences,
    pub is_new_user: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Account> for AccountResponse {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id.clone(),
            email: account.email.clone(),
            name: account.name.clone(),
            display_name: account.display_name.clone(),
            picture: account.picture.clone(),
            bio: account.bio.clone(),
            timezone: account.timezone.clone(),
            language: account.language.clone(),
            preferences: account.preferences.clone(),
            is_new_user: account.is_new_user,
            created_at: account.created_at,
        }
    }
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

fn default_true() -> bool {
    true
}

fn default_categories() -> Vec<String> {
    ["Work", "Personal", "Shopping", "Health"]
        .into_iter()
        .map(String::from)
        .collect()
}
