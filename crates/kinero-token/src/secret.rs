//! Signing secret wrapper.

use std::fmt;

/// Key material used to sign and verify tokens.
///
/// `Debug` and `Display` always print `[REDACTED]`. The bytes are only
/// reachable through [`expose_secret`](Self::expose_secret).
///
/// ```
/// use kinero_token::SigningSecret;
///
/// let secret = SigningSecret::new("a-very-long-signing-secret-value!");
/// assert_eq!(format!("{secret:?}"), "[REDACTED]");
/// ```
pub struct SigningSecret {
    bytes: Vec<u8>,
}

impl SigningSecret {
    /// Wraps secret bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// Returns the raw key bytes.
    ///
    /// Never log or display the result.
    #[must_use]
    pub fn expose_secret(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the key length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if the key is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl From<&str> for SigningSecret {
    fn from(value: &str) -> Self {
        Self::new(value.as_bytes())
    }
}

impl From<String> for SigningSecret {
    fn from(value: String) -> Self {
        Self::new(value.into_bytes())
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}
