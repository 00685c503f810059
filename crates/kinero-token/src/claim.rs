//! Identity claims carried inside a token.

use chrono::{DateTime, Duration, DurationRound, Utc};
use serde::{Deserialize, Serialize};

/// Who a token was issued to and for how long.
///
/// Timestamps travel as Unix seconds, so construction truncates them to
/// whole seconds. A claim survives an encode/decode round trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaim {
    /// The stable login key of the identity.
    #[serde(rename = "sub")]
    subject: String,
    /// When the token was issued.
    #[serde(rename = "iat", with = "chrono::serde::ts_seconds")]
    issued_at: DateTime<Utc>,
    /// When the token stops being accepted.
    #[serde(rename = "exp", with = "chrono::serde::ts_seconds")]
    expires_at: DateTime<Utc>,
}

impl IdentityClaim {
    /// Creates a claim, truncating timestamps to whole seconds.
    pub fn new(
        subject: impl Into<String>,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            subject: subject.into(),
            issued_at: truncate(issued_at),
            expires_at: truncate(expires_at),
        }
    }

    /// Creates a claim issued at `now` and valid for `ttl`.
    ///
    /// An expiry past the representable range saturates at the latest instant.
    pub fn issued_for(subject: impl Into<String>, now: DateTime<Utc>, ttl: Duration) -> Self {
        let expires_at = now
            .checked_add_signed(ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self::new(subject, now, expires_at)
    }

    /// Returns the subject.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Returns the issue time.
    #[must_use]
    pub const fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    /// Returns the expiry time.
    #[must_use]
    pub const fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Returns `true` if the claim is expired at `now`, allowing `leeway`.
    ///
    /// The boundary is inclusive: a claim expiring exactly at `now` is expired.
    /// A leeway reaching before the earliest representable instant never expires.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>, leeway: Duration) -> bool {
        now.checked_sub_signed(leeway)
            .is_some_and(|cutoff| self.expires_at.timestamp() <= cutoff.timestamp())
    }
}

fn truncate(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant
        .duration_trunc(Duration::seconds(1))
        .unwrap_or(instant)
}
