//! HS256 token encoding and verification.
//!
//! Tokens use the JWT compact serialization:
//!
//! ```text
//! base64url(header) "." base64url(claims) "." base64url(HMAC-SHA256(secret, header "." claims))
//! ```
//!
//! The header is always `{"alg":"HS256","typ":"JWT"}` and the claims are
//! `{"sub","iat","exp"}` in Unix seconds.
//!
//! ## Verification order
//!
//! 1. Structure: three segments, valid base64url, expected JSON, `alg` is
//!    HS256. Anything else is [`TokenError::Malformed`].
//! 2. Signature: compared in constant time against the current secret, then
//!    each retired secret. No match is [`TokenError::SignatureInvalid`].
//! 3. Expiry: `exp <= now - leeway` is [`TokenError::Expired`].
//!
//! ## Key rotation
//!
//! New tokens are always signed with the current secret. Retired secrets are
//! accepted for verification only, so tokens issued before a rotation keep
//! working until they expire.

use crate::claim::IdentityClaim;
use crate::error::{TokenError, TokenResult};
use crate::secret::SigningSecret;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use kinero_config::AuthConfig;
use kinero_core::IdentityRecord;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use subtle::ConstantTimeEq;

/// The only signing algorithm accepted.
pub const ALGORITHM: &str = "HS256";

/// Default lifetime of issued tokens.
pub const DEFAULT_TTL_SECS: i64 = 3600;

/// A signed token string.
#[derive(Clone, PartialEq, Eq)]
pub struct SignedToken(String);

impl SignedToken {
    /// Returns the token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the token, returning the inner string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for SignedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for SignedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SignedToken(..)")
    }
}

impl AsRef<str> for SignedToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    alg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    typ: Option<String>,
}

impl Header {
    fn hs256() -> Self {
        Self {
            alg: ALGORITHM.to_string(),
            typ: Some("JWT".to_string()),
        }
    }
}

/// Encodes, decodes, and issues signed identity tokens.
///
/// The codec is pure: verification time is either passed in
/// ([`decode_at`](Self::decode_at)) or read from the clock
/// ([`decode`](Self::decode)).
///
/// # Example
///
/// ```
/// use chrono::Utc;
/// use kinero_token::TokenCodec;
///
/// let codec = TokenCodec::new("0123456789abcdef0123456789abcdef");
/// let token = codec.issue("alice@example.com", Utc::now());
/// let claim = codec.decode(token.as_str()).unwrap();
/// assert_eq!(claim.subject(), "alice@example.com");
/// ```
pub struct TokenCodec {
    secret: SigningSecret,
    retired: Vec<SigningSecret>,
    leeway: Duration,
    ttl: Duration,
}

impl TokenCodec {
    /// Creates a codec signing with `secret`, a one hour TTL, and no leeway.
    pub fn new(secret: impl Into<SigningSecret>) -> Self {
        Self {
            secret: secret.into(),
            retired: Vec::new(),
            leeway: Duration::zero(),
            ttl: Duration::seconds(DEFAULT_TTL_SECS),
        }
    }

    /// Builds a codec from the `[auth]` configuration section.
    pub fn from_config(config: &AuthConfig) -> Self {
        config.retired_secrets.iter().fold(
            Self::new(config.secret.as_str())
                .with_ttl(seconds(config.token_ttl_secs))
                .with_leeway(seconds(config.leeway_secs)),
            |codec, retired| codec.with_retired_secret(retired.as_str()),
        )
    }

    /// Accepts tokens signed with a previous secret.
    ///
    /// Retired secrets are tried in the order they were added.
    #[must_use]
    pub fn with_retired_secret(mut self, secret: impl Into<SigningSecret>) -> Self {
        self.retired.push(secret.into());
        self
    }

    /// Sets the clock-skew allowance applied to expiry checks.
    #[must_use]
    pub fn with_leeway(mut self, leeway: Duration) -> Self {
        self.leeway = leeway;
        self
    }

    /// Sets the lifetime of tokens created by [`issue`](Self::issue).
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Returns the configured token lifetime.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the configured leeway.
    #[must_use]
    pub const fn leeway(&self) -> Duration {
        self.leeway
    }

    /// Issues a token for `subject`, valid from `now` for the configured TTL.
    pub fn issue(&self, subject: &str, now: DateTime<Utc>) -> SignedToken {
        self.encode(&IdentityClaim::issued_for(subject, now, self.ttl))
    }

    /// Encodes and signs a claim with the current secret.
    ///
    /// Deterministic: the same claim and secret always give the same token.
    pub fn encode(&self, claim: &IdentityClaim) -> SignedToken {
        let header = URL_SAFE_NO_PAD.encode(to_json(&Header::hs256()));
        let payload = URL_SAFE_NO_PAD.encode(to_json(claim));
        let signing_input = format!("{header}.{payload}");
        let signature = hmac_sha256(self.secret.expose_secret(), signing_input.as_bytes());

        SignedToken(format!(
            "{signing_input}.{}",
            URL_SAFE_NO_PAD.encode(signature)
        ))
    }

    /// Decodes and verifies a token against the current clock.
    pub fn decode(&self, token: &str) -> TokenResult<IdentityClaim> {
        self.decode_at(token, Utc::now())
    }

    /// Decodes and verifies a token as of `now`.
    pub fn decode_at(&self, token: &str, now: DateTime<Utc>) -> TokenResult<IdentityClaim> {
        let mut segments = token.split('.');
        let (Some(header_segment), Some(payload), Some(signature), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(TokenError::malformed("expected three segments"));
        };

        let signing_input = &token[..header_segment.len() + 1 + payload.len()];
        let header: Header = decode_segment(header_segment, "header")?;
        if header.alg != ALGORITHM {
            return Err(TokenError::malformed(format!(
                "unsupported algorithm {}",
                header.alg
            )));
        }
        let claim: IdentityClaim = decode_segment(payload, "claims")?;
        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| TokenError::malformed("signature is not base64url"))?;

        if !self.verify_signature(signing_input.as_bytes(), &signature) {
            return Err(TokenError::SignatureInvalid);
        }

        if claim.is_expired_at(now, self.leeway) {
            return Err(TokenError::Expired {
                expired_at: claim.expires_at().timestamp(),
            });
        }

        Ok(claim)
    }

    /// Returns `true` if the token verifies and belongs to `record`.
    ///
    /// Requires that decoding succeeds, that the claim's subject equals the
    /// record's subject, and that the token was not issued before the
    /// record's last token invalidation.
    pub fn is_valid_for<R: IdentityRecord + ?Sized>(&self, token: &str, record: &R) -> bool {
        self.is_valid_for_at(token, record, Utc::now())
    }

    /// Like [`is_valid_for`](Self::is_valid_for), verifying as of `now`.
    pub fn is_valid_for_at<R: IdentityRecord + ?Sized>(
        &self,
        token: &str,
        record: &R,
        now: DateTime<Utc>,
    ) -> bool {
        self.decode_at(token, now)
            .is_ok_and(|claim| claim_matches(&claim, record))
    }

    fn verify_signature(&self, signing_input: &[u8], provided: &[u8]) -> bool {
        std::iter::once(&self.secret)
            .chain(self.retired.iter())
            .any(|secret| {
                let expected = hmac_sha256(secret.expose_secret(), signing_input);
                expected.as_slice().ct_eq(provided).into()
            })
    }
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("secret", &self.secret)
            .field("retired_secrets", &self.retired.len())
            .field("leeway", &self.leeway)
            .field("ttl", &self.ttl)
            .finish()
    }
}

/// Returns `true` if an already-verified claim belongs to `record`.
pub fn claim_matches<R: IdentityRecord + ?Sized>(claim: &IdentityClaim, record: &R) -> bool {
    if claim.subject() != record.subject() {
        return false;
    }

    record
        .tokens_invalidated_at()
        .map_or(true, |invalidated| {
            claim.issued_at().timestamp() >= invalidated.timestamp()
        })
}

fn decode_segment<T: serde::de::DeserializeOwned>(segment: &str, what: &str) -> TokenResult<T> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| TokenError::malformed(format!("{what} is not base64url")))?;
    serde_json::from_slice(&bytes).map_err(|e| TokenError::malformed(format!("{what}: {e}")))
}

fn to_json<T: Serialize>(value: &T) -> Vec<u8> {
    // Header and claims contain only strings and integers.
    serde_json::to_vec(value).expect("token segments serialize")
}

fn seconds(value: u64) -> Duration {
    Duration::seconds(i64::try_from(value).unwrap_or(i64::MAX).min(i64::MAX / 1000))
}

fn hmac_sha256(secret: &[u8], message: &[u8]) -> [u8; 32] {
    const BLOCK_SIZE: usize = 64;
    let mut key_block = [0u8; BLOCK_SIZE];
    if secret.len() > BLOCK_SIZE {
        let digest = Sha256::digest(secret);
        key_block[..digest.len()].copy_from_slice(&digest);
    } else {
        key_block[..secret.len()].copy_from_slice(secret);
    }

    let mut inner = Sha256::new();
    inner.update(key_block.map(|b| b ^ 0x36));
    inner.update(message);
    let inner_hash = inner.finalize();

    let mut outer = Sha256::new();
    outer.update(key_block.map(|b| b ^ 0x5c));
    outer.update(inner_hash);
    outer.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const SECRET: &str = "kinero-test-secret-0123456789abcdef";

    fn t0() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    struct Record {
        email: &'static str,
        invalidated: Option<DateTime<Utc>>,
    }

    impl IdentityRecord for Record {
        fn subject(&self) -> &str {
            self.email
        }

        fn tokens_invalidated_at(&self) -> Option<DateTime<Utc>> {
            self.invalidated
        }
    }

    #[test]
    fn test_hmac_matches_rfc4231_case_2() {
        let mac = hmac_sha256(b"Jefe", b"what do ya want for nothing?");
        assert_eq!(
            mac.iter().map(|b| format!("{b:02x}")).collect::<String>(),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn test_header_is_hs256_jwt() {
        let codec = TokenCodec::new(SECRET);
        let token = codec.issue("a@b.io", t0());
        let header = token.as_str().split('.').next().unwrap();
        let json: serde_json::Value =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(header).unwrap()).unwrap();
        assert_eq!(json["alg"], "HS256");
        assert_eq!(json["typ"], "JWT");
    }

    #[test]
    fn test_encode_is_deterministic() {
        let codec = TokenCodec::new(SECRET);
        let claim = IdentityClaim::issued_for("a@b.io", t0(), Duration::hours(1));
        assert_eq!(codec.encode(&claim), codec.encode(&claim));
    }

    #[test]
    fn test_token_does_not_embed_secret() {
        let codec = TokenCodec::new(SECRET);
        let token = codec.issue("a@b.io", t0());
        assert!(!token.as_str().contains(SECRET));
        for segment in token.as_str().split('.').take(2) {
            let decoded = URL_SAFE_NO_PAD.decode(segment).unwrap();
            assert!(!String::from_utf8_lossy(&decoded).contains(SECRET));
        }
    }

    #[test]
    fn test_decode_round_trip() {
        let codec = TokenCodec::new(SECRET);
        let claim = IdentityClaim::issued_for("a@b.io", t0(), Duration::hours(1));
        let token = codec.encode(&claim);
        assert_eq!(codec.decode_at(token.as_str(), t0()).unwrap(), claim);
    }

    #[test]
    fn test_garbage_is_malformed() {
        let codec = TokenCodec::new(SECRET);
        for token in ["garbage", "a.b", "a.b.c.d", "", "..", "!!!.???.***"] {
            assert!(
                matches!(codec.decode_at(token, t0()), Err(TokenError::Malformed(_))),
                "{token:?}"
            );
        }
    }

    #[test]
    fn test_other_algorithm_is_malformed() {
        let codec = TokenCodec::new(SECRET);
        let token = codec.issue("a@b.io", t0());
        let rest = token.as_str().split_once('.').unwrap().1;
        let none_header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let forged = format!("{none_header}.{rest}");

        assert!(matches!(
            codec.decode_at(&forged, t0()),
            Err(TokenError::Malformed(_))
        ));
    }

    #[test]
    fn test_tampered_claims_fail_signature() {
        let codec = TokenCodec::new(SECRET);
        let token = codec.issue("a@b.io", t0());
        let parts: Vec<&str> = token.as_str().split('.').collect();
        let forged_claim = IdentityClaim::issued_for("admin@b.io", t0(), Duration::days(365));
        let forged_payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&forged_claim).unwrap());
        let forged = format!("{}.{}.{}", parts[0], forged_payload, parts[2]);

        assert_eq!(
            codec.decode_at(&forged, t0()),
            Err(TokenError::SignatureInvalid)
        );
    }

    #[test]
    fn test_expiry_boundary() {
        let codec = TokenCodec::new(SECRET);
        let token = codec.issue("a@b.io", t0());

        assert!(codec
            .decode_at(token.as_str(), t0() + Duration::seconds(3599))
            .is_ok());
        assert!(matches!(
            codec.decode_at(token.as_str(), t0() + Duration::seconds(3600)),
            Err(TokenError::Expired { .. })
        ));
        assert_eq!(
            codec.decode_at(token.as_str(), t0() + Duration::seconds(3601)),
            Err(TokenError::Expired {
                expired_at: 1_700_003_600
            })
        );
    }

    #[test]
    fn test_signature_checked_before_expiry() {
        let issuer = TokenCodec::new("another-secret-another-secret-xx");
        let verifier = TokenCodec::new(SECRET);
        let token = issuer.issue("a@b.io", t0());

        assert_eq!(
            verifier.decode_at(token.as_str(), t0() + Duration::days(2)),
            Err(TokenError::SignatureInvalid)
        );
    }

    #[test]
    fn test_retired_secret_still_verifies() {
        let old = TokenCodec::new("old-secret-old-secret-old-secret!");
        let token = old.issue("a@b.io", t0());

        let rotated = TokenCodec::new(SECRET).with_retired_secret("old-secret-old-secret-old-secret!");
        assert!(rotated.decode_at(token.as_str(), t0()).is_ok());

        let fresh = rotated.issue("a@b.io", t0());
        assert!(TokenCodec::new(SECRET).decode_at(fresh.as_str(), t0()).is_ok());
        assert_eq!(
            old.decode_at(fresh.as_str(), t0()),
            Err(TokenError::SignatureInvalid)
        );
    }

    #[test]
    fn test_is_valid_for_subject() {
        let codec = TokenCodec::new(SECRET);
        let token = codec.issue("a@b.io", t0());
        let owner = Record {
            email: "a@b.io",
            invalidated: None,
        };
        let other = Record {
            email: "c@d.io",
            invalidated: None,
        };

        assert!(codec.is_valid_for_at(token.as_str(), &owner, t0()));
        assert!(!codec.is_valid_for_at(token.as_str(), &other, t0()));
        assert!(!codec.is_valid_for_at("garbage", &owner, t0()));
    }

    #[test]
    fn test_is_valid_for_respects_invalidation() {
        let codec = TokenCodec::new(SECRET);
        let token = codec.issue("a@b.io", t0());

        let revoked = Record {
            email: "a@b.io",
            invalidated: Some(t0() + Duration::seconds(10)),
        };
        assert!(!codec.is_valid_for_at(token.as_str(), &revoked, t0() + Duration::seconds(20)));

        let reissued = codec.issue("a@b.io", t0() + Duration::seconds(10));
        assert!(codec.is_valid_for_at(reissued.as_str(), &revoked, t0() + Duration::seconds(20)));
    }

    #[test]
    fn test_leeway_from_builder() {
        let codec = TokenCodec::new(SECRET).with_leeway(Duration::seconds(30));
        let token = codec.issue("a@b.io", t0());
        assert!(codec
            .decode_at(token.as_str(), t0() + Duration::seconds(3620))
            .is_ok());
    }

    #[test]
    fn test_from_config() {
        let config = AuthConfig {
            secret: SECRET.to_string(),
            retired_secrets: vec!["old-secret-old-secret-old-secret!".to_string()],
            token_ttl_secs: 60,
            leeway_secs: 5,
            lookup_timeout_ms: 100,
        };
        let codec = TokenCodec::from_config(&config);
        assert_eq!(codec.ttl(), Duration::seconds(60));
        assert_eq!(codec.leeway(), Duration::seconds(5));

        let old = TokenCodec::new("old-secret-old-secret-old-secret!").issue("a@b.io", t0());
        assert!(codec.decode_at(old.as_str(), t0()).is_ok());
    }

    #[test]
    fn test_unbounded_config_durations_do_not_panic() {
        let config = AuthConfig {
            secret: SECRET.to_string(),
            retired_secrets: Vec::new(),
            token_ttl_secs: u64::MAX,
            leeway_secs: 10_000_000_000_000,
            lookup_timeout_ms: 100,
        };
        let codec = TokenCodec::from_config(&config);

        let token = TokenCodec::new(SECRET).issue("a@b.io", t0());
        assert!(codec.decode_at(token.as_str(), t0()).is_ok());
        assert!(codec.decode(token.as_str()).is_ok());

        let long_lived = codec.issue("a@b.io", t0());
        assert_eq!(long_lived.as_str().split('.').count(), 3);
    }

    #[test]
    fn test_debug_redacts_secret() {
        let codec = TokenCodec::new(SECRET);
        assert!(!format!("{codec:?}").contains(SECRET));
    }
}
