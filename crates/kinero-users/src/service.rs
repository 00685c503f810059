//! Account operations: registration, login, lookup, password change.

use crate::error::{UserError, UserResult};
use crate::model::User;
use crate::password::{Argon2PasswordHasher, PasswordHasher};
use crate::store::InMemoryUserStore;
use chrono::{DateTime, NaiveDate, Utc};
use kinero_core::FieldErrors;
use kinero_token::TokenCodec;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Minimum password length, in characters.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Registration input.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterRequest {
    /// Login email.
    #[serde(default)]
    pub email: String,
    /// Raw password.
    #[serde(default)]
    pub password: String,
}

/// Login input.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    /// Login email.
    #[serde(default)]
    pub email: String,
    /// Raw password.
    #[serde(default)]
    pub password: String,
}

/// Successful login output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Signed bearer token.
    pub token: String,
}

/// Account operations over a [`InMemoryUserStore`].
pub struct UserService<H = Argon2PasswordHasher> {
    store: InMemoryUserStore,
    hasher: H,
    codec: Arc<TokenCodec>,
}

impl UserService<Argon2PasswordHasher> {
    /// Creates a service with the Argon2id hasher.
    pub fn new(store: InMemoryUserStore, codec: Arc<TokenCodec>) -> Self {
        Self::with_hasher(store, codec, Argon2PasswordHasher::new())
    }
}

impl<H: PasswordHasher> UserService<H> {
    /// Creates a service with a custom password hasher.
    pub fn with_hasher(store: InMemoryUserStore, codec: Arc<TokenCodec>, hasher: H) -> Self {
        Self {
            store,
            hasher,
            codec,
        }
    }

    /// Returns the backing store.
    #[must_use]
    pub const fn store(&self) -> &InMemoryUserStore {
        &self.store
    }

    /// Registers a new account.
    ///
    /// Fails with `Validation` on bad input and `AlreadyExists` naming
    /// `email` if the email is taken.
    pub fn register(&self, request: RegisterRequest) -> UserResult<User> {
        validate_registration(&request)?;

        let user = User::new(
            request.email,
            self.hasher.hash(&request.password)?,
            Utc::now(),
        );
        let user = self.store.insert(user)?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Checks credentials and issues a bearer token.
    ///
    /// Unknown emails and wrong passwords fail identically.
    pub fn login(&self, request: LoginRequest, now: DateTime<Utc>) -> UserResult<AuthResponse> {
        let Some(user) = self.store.find_by_email(&request.email) else {
            tracing::debug!(reason = "unknown_email", "Login rejected");
            return Err(UserError::InvalidCredentials);
        };

        if !self.hasher.verify(&request.password, &user.password_hash) {
            tracing::debug!(user_id = %user.id, reason = "wrong_password", "Login rejected");
            return Err(UserError::InvalidCredentials);
        }

        let token = self.codec.issue(&user.email, now);
        tracing::info!(user_id = %user.id, "User logged in");
        Ok(AuthResponse {
            token: token.into_string(),
        })
    }

    /// Finds an account by id.
    pub fn find_by_id(&self, id: Uuid) -> UserResult<User> {
        self.store.find_by_id(id).ok_or_else(|| UserError::NotFound {
            field: "id",
            value: id.to_string(),
        })
    }

    /// Finds an account by email.
    pub fn find_by_email(&self, email: &str) -> UserResult<User> {
        self.store
            .find_by_email(email)
            .ok_or_else(|| UserError::NotFound {
                field: "email",
                value: email.to_string(),
            })
    }

    /// Replaces the password and invalidates every token issued before `now`.
    pub fn change_password(
        &self,
        id: Uuid,
        new_password: &str,
        now: DateTime<Utc>,
    ) -> UserResult<User> {
        let errors = errors_for_password(new_password);
        if !errors.is_empty() {
            return Err(UserError::Validation(errors));
        }

        let hash = self.hasher.hash(new_password)?;
        let user = self
            .store
            .update(id, |user| {
                user.password_hash = hash;
                user.updated_at = now;
                user.tokens_invalidated_at = Some(now);
            })
            .ok_or_else(|| UserError::NotFound {
                field: "id",
                value: id.to_string(),
            })?;

        tracing::info!(user_id = %user.id, "Password changed, earlier tokens invalidated");
        Ok(user)
    }

    /// Removes an account. Its tokens stop authenticating immediately.
    pub fn delete(&self, id: Uuid) -> UserResult<()> {
        self.store
            .delete(id)
            .map(|user| tracing::info!(user_id = %user.id, "User deleted"))
            .ok_or_else(|| UserError::NotFound {
                field: "id",
                value: id.to_string(),
            })
    }

    /// Returns the user's age in whole years on `today`.
    #[must_use]
    pub fn calculate_age(&self, user: &User, today: NaiveDate) -> Option<u32> {
        user.age_on(today)
    }
}

impl<H> std::fmt::Debug for UserService<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserService")
            .field("users", &self.store.len())
            .finish_non_exhaustive()
    }
}

fn validate_registration(request: &RegisterRequest) -> UserResult<()> {
    let mut errors = FieldErrors::new();

    if request.email.trim().is_empty() {
        errors.add("email", "Email is required");
    } else if !is_valid_email(&request.email) {
        errors.add("email", "Must be a valid email address");
    }
    check_password(&mut errors, &request.password);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(UserError::Validation(errors))
    }
}

fn errors_for_password(password: &str) -> FieldErrors {
    let mut errors = FieldErrors::new();
    check_password(&mut errors, password);
    errors
}

fn check_password(errors: &mut FieldErrors, password: &str) {
    if password.trim().is_empty() {
        errors.add("password", "Password is required");
    } else if password.chars().count() < MIN_PASSWORD_LEN {
        errors.add("password", "Password must be at least 6 characters long");
    }
}

/// One `@` with a non-empty local part and domain, and no whitespace.
fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}
