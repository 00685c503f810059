//! User account model.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use kinero_core::IdentityRecord;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Self-reported gender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    /// Male.
    Male,
    /// Female.
    Female,
    /// Other or undisclosed.
    Other,
}

/// Measurement units the user prefers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnitPreference {
    /// Kilograms and centimetres.
    Metric,
    /// Pounds and inches.
    Imperial,
}

/// A registered account.
///
/// The token subject of a user is their email.
#[derive(Clone, PartialEq)]
pub struct User {
    /// Account id.
    pub id: Uuid,
    /// Login email, unique across accounts.
    pub email: String,
    /// Encoded password hash; never the raw password.
    pub password_hash: String,
    /// Body weight, in the user's preferred units.
    pub weight: Option<f64>,
    /// Height, in the user's preferred units.
    pub height: Option<f64>,
    /// Date of birth.
    pub date_of_birth: Option<NaiveDate>,
    /// Gender.
    pub gender: Option<Gender>,
    /// Preferred units.
    pub preferred_units: Option<UnitPreference>,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last modified.
    pub updated_at: DateTime<Utc>,
    /// Tokens issued before this instant are no longer accepted.
    pub tokens_invalidated_at: Option<DateTime<Utc>>,
}

impl User {
    /// Creates a new account with a fresh id and an empty profile.
    #[must_use]
    pub fn new(email: impl Into<String>, password_hash: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            password_hash: password_hash.into(),
            weight: None,
            height: None,
            date_of_birth: None,
            gender: None,
            preferred_units: None,
            created_at: now,
            updated_at: now,
            tokens_invalidated_at: None,
        }
    }

    /// Returns the user's age in whole years on `today`.
    ///
    /// `None` without a date of birth, or if it lies after `today`.
    #[must_use]
    pub fn age_on(&self, today: NaiveDate) -> Option<u32> {
        let born = self.date_of_birth?;
        let mut years = today.year() - born.year();
        if (today.month(), today.day()) < (born.month(), born.day()) {
            years -= 1;
        }
        u32::try_from(years).ok()
    }

    /// Returns the public projection of this account.
    #[must_use]
    pub fn profile(&self) -> UserProfile {
        UserProfile::from(self)
    }
}

impl IdentityRecord for User {
    fn subject(&self) -> &str {
        &self.email
    }

    fn tokens_invalidated_at(&self) -> Option<DateTime<Utc>> {
        self.tokens_invalidated_at
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .field("tokens_invalidated_at", &self.tokens_invalidated_at)
            .finish_non_exhaustive()
    }
}

/// Account data returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Account id.
    pub id: Uuid,
    /// Login email.
    pub email: String,
    /// Body weight.
    pub weight: Option<f64>,
    /// Height.
    pub height: Option<f64>,
    /// Date of birth.
    pub date_of_birth: Option<NaiveDate>,
    /// Gender.
    pub gender: Option<Gender>,
    /// Preferred units.
    pub preferred_units: Option<UnitPreference>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            weight: user.weight,
            height: user.height,
            date_of_birth: user.date_of_birth,
            gender: user.gender,
            preferred_units: user.preferred_units,
        }
    }
}
