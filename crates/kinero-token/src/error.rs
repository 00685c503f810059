//! Token error types.

use kinero_core::KineroError;
use thiserror::Error;

/// Result type for token operations.
pub type TokenResult<T> = Result<T, TokenError>;

/// Why a token was rejected.
///
/// These reasons are for logs. At the HTTP boundary every variant collapses
/// into a generic 401.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// The token is not three base64url segments of the expected JSON shape,
    /// or names an algorithm other than HS256.
    #[error("malformed token: {0}")]
    Malformed(String),

    /// The signature does not verify against any accepted secret.
    #[error("token signature is invalid")]
    SignatureInvalid,

    /// The token's expiry is at or before the verification time.
    #[error("token expired at {expired_at}")]
    Expired {
        /// Expiry as Unix seconds.
        expired_at: i64,
    },
}

impl TokenError {
    /// Creates a malformed token error.
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed(reason.into())
    }

    /// Returns a short stable label for structured logging.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::Malformed(_) => "malformed_token",
            Self::SignatureInvalid => "signature_invalid",
            Self::Expired { .. } => "token_expired",
        }
    }
}

impl From<TokenError> for KineroError {
    fn from(_: TokenError) -> Self {
        KineroError::unauthorized("Invalid token")
    }
}
