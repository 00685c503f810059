//! Bearer token authentication middleware.
//!
//! Verifies the `Authorization: Bearer <token>` credential, loads the
//! identity record for the token's subject, and publishes it on the context.
//!
//! ## Outcomes
//!
//! | Situation                                | Result                         |
//! |------------------------------------------|--------------------------------|
//! | No header, or not the `Bearer ` scheme   | continue without identity      |
//! | Token does not decode or verify          | 401 "Invalid token"            |
//! | Subject unknown, store failure, timeout  | 401 "Authentication failed"    |
//! | Subject mismatch or token invalidated    | 401 "Invalid or expired token" |
//! | Verified                                 | continue with identity         |
//!
//! The precise reason for every rejection is logged at `warn`; response
//! bodies only carry the generic phrase.
//!
//! Routes that need a caller call
//! [`MiddlewareContext::require_identity`](crate::MiddlewareContext::require_identity).

use crate::context::MiddlewareContext;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::types::{MiddlewareResult, Request};
use chrono::{DateTime, Utc};
use kinero_config::AuthConfig;
use kinero_core::{AuthenticatedIdentity, IdentityStore, KineroError};
use kinero_token::TokenCodec;
use std::sync::Arc;
use std::time::Duration;

/// Scheme prefix of the `Authorization` header, including the space.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Message for tokens that fail to decode or verify.
pub const INVALID_TOKEN: &str = "Invalid token";

/// Message for tokens whose subject could not be resolved.
pub const AUTHENTICATION_FAILED: &str = "Authentication failed";

/// Message for tokens that do not belong to the resolved record.
pub const INVALID_OR_EXPIRED_TOKEN: &str = "Invalid or expired token";

/// Message for requests cancelled while authenticating.
pub const REQUEST_CANCELLED: &str = "Request cancelled";

/// Default bound on the identity lookup.
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(2);

/// Source of the current time used to verify tokens.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Middleware that authenticates bearer tokens against an identity store.
///
/// # Example
///
/// ```ignore
/// use kinero_middleware::stages::AuthenticationMiddleware;
/// use kinero_token::TokenCodec;
///
/// let codec = Arc::new(TokenCodec::new("a-secret-of-at-least-thirty-two-bytes"));
/// let auth = AuthenticationMiddleware::new(codec, store)
///     .with_lookup_timeout(Duration::from_millis(500));
/// ```
pub struct AuthenticationMiddleware<S> {
    codec: Arc<TokenCodec>,
    store: S,
    lookup_timeout: Duration,
    clock: Clock,
}

impl<S: IdentityStore> AuthenticationMiddleware<S> {
    /// Creates the middleware with the default lookup timeout.
    pub fn new(codec: Arc<TokenCodec>, store: S) -> Self {
        Self {
            codec,
            store,
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
            clock: Arc::new(Utc::now),
        }
    }

    /// Creates the middleware from the auth config section.
    pub fn from_config(codec: Arc<TokenCodec>, store: S, config: &AuthConfig) -> Self {
        Self::new(codec, store).with_lookup_timeout(config.lookup_timeout())
    }

    /// Sets the bound on the identity lookup.
    #[must_use]
    pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = timeout;
        self
    }

    /// Replaces the clock used to check expiry.
    #[must_use]
    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        self.clock = Arc::new(clock);
        self
    }

    /// Returns the bound on the identity lookup.
    #[must_use]
    pub const fn lookup_timeout(&self) -> Duration {
        self.lookup_timeout
    }

    /// Extracts the bearer token, if the request presents one.
    fn bearer_token(request: &Request) -> Option<&str> {
        request
            .headers()
            .get(http::header::AUTHORIZATION)?
            .to_str()
            .ok()?
            .strip_prefix(BEARER_PREFIX)
    }

    /// Verifies `token` and resolves its identity.
    async fn authenticate(
        &self,
        ctx: &MiddlewareContext,
        token: &str,
    ) -> Result<AuthenticatedIdentity, KineroError> {
        let correlation_id = ctx.correlation_id_str();
        let now = (self.clock)();

        let claim = self.codec.decode_at(token, now).map_err(|e| {
            tracing::warn!(
                correlation_id = %correlation_id,
                reason = e.reason(),
                error = %e,
                "Token rejected"
            );
            KineroError::from(e)
        })?;

        let lookup = tokio::time::timeout(
            self.lookup_timeout,
            self.store.find_by_subject(claim.subject()),
        );

        let cancellation = ctx.cancellation();
        let found = tokio::select! {
            biased;
            () = cancellation.cancelled() => return Err(cancelled(correlation_id)),
            found = lookup => found,
        };

        let record = match found {
            Ok(Ok(Some(record))) => record,
            Ok(Ok(None)) => {
                tracing::warn!(
                    correlation_id = %correlation_id,
                    reason = "unknown_subject",
                    subject = %claim.subject(),
                    "Token subject not found"
                );
                return Err(KineroError::unauthorized(AUTHENTICATION_FAILED));
            }
            Ok(Err(e)) => {
                tracing::warn!(
                    correlation_id = %correlation_id,
                    reason = "store_error",
                    error = %e,
                    "Identity lookup failed"
                );
                return Err(KineroError::unauthorized(AUTHENTICATION_FAILED));
            }
            Err(_elapsed) => {
                tracing::warn!(
                    correlation_id = %correlation_id,
                    reason = "lookup_timeout",
                    timeout_ms = u64::try_from(self.lookup_timeout.as_millis()).unwrap_or(u64::MAX),
                    "Identity lookup timed out"
                );
                return Err(KineroError::unauthorized(AUTHENTICATION_FAILED));
            }
        };

        if !self.codec.is_valid_for_at(token, &record, now) {
            tracing::warn!(
                correlation_id = %correlation_id,
                reason = "token_not_valid_for_identity",
                subject = %claim.subject(),
                "Token rejected for identity"
            );
            return Err(KineroError::unauthorized(INVALID_OR_EXPIRED_TOKEN));
        }

        if ctx.is_cancelled() {
            return Err(cancelled(correlation_id));
        }

        Ok(AuthenticatedIdentity::new(record))
    }
}

fn cancelled(correlation_id: &str) -> KineroError {
    tracing::debug!(correlation_id = %correlation_id, "Request cancelled during authentication");
    KineroError::unclassified(REQUEST_CANCELLED)
}

impl<S: IdentityStore> Middleware for AuthenticationMiddleware<S> {
    fn name(&self) -> &'static str {
        "authentication"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, MiddlewareResult> {
        Box::pin(async move {
            let Some(token) = Self::bearer_token(&request) else {
                tracing::debug!(
                    correlation_id = %ctx.correlation_id_str(),
                    "No bearer credential, continuing anonymously"
                );
                return next.run(ctx, request).await;
            };

            let identity = self.authenticate(ctx, token).await?;
            tracing::debug!(
                correlation_id = %ctx.correlation_id_str(),
                subject = %identity.log_id(),
                "Authenticated"
            );
            ctx.set_identity(identity);

            next.run(ctx, request).await
        })
    }
}

impl<S> std::fmt::Debug for AuthenticationMiddleware<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticationMiddleware")
            .field("codec", &self.codec)
            .field("lookup_timeout", &self.lookup_timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bytes::Bytes;
    use chrono::TimeZone;
    use http::{Request as HttpRequest, Response as HttpResponse, StatusCode};
    use http_body_util::Full;
    use kinero_core::{IdentityRecord, StoreError};
    use std::collections::HashMap;

    const SECRET: &str = "test-secret-test-secret-test-secret";

    #[derive(Debug, Clone)]
    struct Account {
        id: String,
        invalidated_at: Option<DateTime<Utc>>,
    }

    impl IdentityRecord for Account {
        fn subject(&self) -> &str {
            &self.id
        }

        fn tokens_invalidated_at(&self) -> Option<DateTime<Utc>> {
            self.invalidated_at
        }
    }

    #[derive(Default)]
    struct MapStore {
        accounts: HashMap<String, Account>,
        delay: Option<Duration>,
        fail: bool,
    }

    impl MapStore {
        fn with(id: &str) -> Self {
            let mut store = Self::default();
            store.accounts.insert(
                id.to_string(),
                Account {
                    id: id.to_string(),
                    invalidated_at: None,
                },
            );
            store
        }
    }

    #[async_trait]
    impl IdentityStore for MapStore {
        type Record = Account;

        async fn find_by_subject(&self, subject: &str) -> Result<Option<Account>, StoreError> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail {
                return Err(StoreError::Unavailable("database down".to_string()));
            }
            Ok(self.accounts.get(subject).cloned())
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn codec() -> Arc<TokenCodec> {
        Arc::new(TokenCodec::new(SECRET))
    }

    fn middleware(store: MapStore) -> AuthenticationMiddleware<MapStore> {
        AuthenticationMiddleware::new(codec(), store).with_clock(t0)
    }

    fn create_test_request(authorization: Option<&str>) -> Request {
        let mut builder = HttpRequest::builder().uri("/api/users/me");
        if let Some(value) = authorization {
            builder = builder.header(http::header::AUTHORIZATION, value);
        }
        builder.body(Full::new(Bytes::new())).unwrap()
    }

    fn subject_handler<'a>() -> Next<'a> {
        Next::handler(|ctx, _req| {
            let subject = ctx
                .identity()
                .map_or_else(|| "anonymous".to_string(), |i| i.subject().to_string());
            Box::pin(async move {
                Ok(HttpResponse::builder()
                    .status(StatusCode::OK)
                    .body(Full::new(Bytes::from(subject)))
                    .unwrap())
            })
        })
    }

    fn bearer(token: &str) -> String {
        format!("{BEARER_PREFIX}{token}")
    }

    fn unauthorized_message(result: MiddlewareResult) -> String {
        match result {
            Err(KineroError::Unauthorized { message }) => message,
            other => panic!("expected unauthorized, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_no_header_continues_without_identity() {
        let mw = middleware(MapStore::with("42"));
        let mut ctx = MiddlewareContext::new();

        let response = mw
            .process(&mut ctx, create_test_request(None), subject_handler())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(ctx.identity().is_none());
    }

    #[tokio::test]
    async fn test_other_scheme_continues_without_identity() {
        let mw = middleware(MapStore::with("42"));

        for value in ["Basic dXNlcjpwYXNz", "bearer abc", "Bearer"] {
            let mut ctx = MiddlewareContext::new();
            let result = mw
                .process(&mut ctx, create_test_request(Some(value)), subject_handler())
                .await;
            assert!(result.is_ok(), "{value} should pass through");
            assert!(ctx.identity().is_none());
        }
    }

    #[tokio::test]
    async fn test_valid_token_publishes_identity() {
        let token = codec().issue("42", t0());
        let mw = middleware(MapStore::with("42"));
        let mut ctx = MiddlewareContext::new();

        let response = mw
            .process(
                &mut ctx,
                create_test_request(Some(&bearer(token.as_str()))),
                subject_handler(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(ctx.identity().unwrap().subject(), "42");
        assert_eq!(ctx.identity().unwrap().user::<Account>().unwrap().id, "42");
    }

    #[tokio::test]
    async fn test_garbage_token_is_invalid() {
        let mw = middleware(MapStore::with("42"));
        let mut ctx = MiddlewareContext::new();

        let result = mw
            .process(&mut ctx, create_test_request(Some("Bearer garbage")), subject_handler())
            .await;

        assert_eq!(unauthorized_message(result), INVALID_TOKEN);
        assert!(ctx.identity().is_none());
    }

    #[tokio::test]
    async fn test_expired_token_is_invalid() {
        let token = codec().issue("42", t0() - chrono::Duration::seconds(3601));
        let mw = middleware(MapStore::with("42"));
        let mut ctx = MiddlewareContext::new();

        let result = mw
            .process(&mut ctx, create_test_request(Some(&bearer(token.as_str()))), subject_handler())
            .await;

        assert_eq!(unauthorized_message(result), INVALID_TOKEN);
    }

    #[tokio::test]
    async fn test_unknown_subject_fails_authentication() {
        let token = codec().issue("99", t0());
        let mw = middleware(MapStore::with("42"));
        let mut ctx = MiddlewareContext::new();

        let result = mw
            .process(&mut ctx, create_test_request(Some(&bearer(token.as_str()))), subject_handler())
            .await;

        assert_eq!(unauthorized_message(result), AUTHENTICATION_FAILED);
    }

    #[tokio::test]
    async fn test_store_failure_fails_authentication() {
        let token = codec().issue("42", t0());
        let mut store = MapStore::with("42");
        store.fail = true;
        let mw = middleware(store);
        let mut ctx = MiddlewareContext::new();

        let result = mw
            .process(&mut ctx, create_test_request(Some(&bearer(token.as_str()))), subject_handler())
            .await;

        assert_eq!(unauthorized_message(result), AUTHENTICATION_FAILED);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_lookup_times_out() {
        let token = codec().issue("42", t0());
        let mut store = MapStore::with("42");
        store.delay = Some(Duration::from_secs(30));
        let mw = middleware(store).with_lookup_timeout(Duration::from_millis(100));
        let mut ctx = MiddlewareContext::new();

        let result = mw
            .process(&mut ctx, create_test_request(Some(&bearer(token.as_str()))), subject_handler())
            .await;

        assert_eq!(unauthorized_message(result), AUTHENTICATION_FAILED);
        assert!(ctx.identity().is_none());
    }

    #[tokio::test]
    async fn test_invalidated_token_is_rejected() {
        let token = codec().issue("42", t0());
        let mut store = MapStore::with("42");
        store.accounts.get_mut("42").unwrap().invalidated_at =
            Some(t0() + chrono::Duration::seconds(1));
        let mw = middleware(store);
        let mut ctx = MiddlewareContext::new();

        let result = mw
            .process(&mut ctx, create_test_request(Some(&bearer(token.as_str()))), subject_handler())
            .await;

        assert_eq!(unauthorized_message(result), INVALID_OR_EXPIRED_TOKEN);
    }

    #[tokio::test]
    async fn test_cancelled_request_does_not_continue() {
        let token = codec().issue("42", t0());
        let mw = middleware(MapStore::with("42"));
        let mut ctx = MiddlewareContext::new();
        ctx.cancellation().cancel();

        let handler_ran = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let flag = handler_ran.clone();
        let next = Next::handler(move |_ctx, _req| {
            flag.store(true, std::sync::atomic::Ordering::SeqCst);
            Box::pin(async { Ok(HttpResponse::new(Full::new(Bytes::new()))) })
        });

        let result = mw
            .process(&mut ctx, create_test_request(Some(&bearer(token.as_str()))), next)
            .await;

        assert!(result.is_err());
        assert!(ctx.identity().is_none());
        assert!(!handler_ran.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[test]
    fn test_from_config_uses_lookup_timeout() {
        let config = AuthConfig {
            lookup_timeout_ms: 250,
            ..AuthConfig::default()
        };
        let mw = AuthenticationMiddleware::from_config(codec(), MapStore::default(), &config);
        assert_eq!(mw.lookup_timeout(), Duration::from_millis(250));
    }
}
