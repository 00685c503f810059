//! # Kinero Token
//!
//! Signed identity tokens for Kinero.
//!
//! - [`TokenCodec`] - HS256 JWT encoding, verification, and issuance
//! - [`IdentityClaim`] - Subject, issue time, and expiry carried in a token
//! - [`SigningSecret`] - Key material with redacted formatting
//! - [`TokenError`] - Why a token was rejected
//!
//! ## Example
//!
//! ```
//! use chrono::{Duration, Utc};
//! use kinero_token::{TokenCodec, TokenError};
//!
//! let codec = TokenCodec::new("0123456789abcdef0123456789abcdef");
//! let now = Utc::now();
//! let token = codec.issue("alice@example.com", now);
//!
//! assert!(codec.decode_at(token.as_str(), now).is_ok());
//! assert!(matches!(
//!     codec.decode_at(token.as_str(), now + Duration::hours(2)),
//!     Err(TokenError::Expired { .. })
//! ));
//! ```

#![doc(html_root_url = "https://docs.rs/kinero-token/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod claim;
mod codec;
mod error;
mod secret;

pub use claim::IdentityClaim;
pub use codec::{claim_matches, SignedToken, TokenCodec, ALGORITHM, DEFAULT_TTL_SECS};
pub use error::{TokenError, TokenResult};
pub use secret::SigningSecret;
