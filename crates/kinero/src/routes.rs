//! Account HTTP routes.
//!
//! | Method | Path                  | Auth     | Success             |
//! |--------|-----------------------|----------|---------------------|
//! | POST   | `/api/users/register` | none     | 201 + `UserProfile` |
//! | POST   | `/api/auth/login`     | none     | 200 + `{"token"}`   |
//! | GET    | `/api/users/me`       | required | 200 + `UserProfile` |
//! | GET    | `/api/users/{id}`     | required | 200 + `UserProfile` |
//!
//! Failures are returned as `Err` and rendered by the pipeline.

use bytes::Bytes;
use chrono::Utc;
use http::StatusCode;
use http_body_util::BodyExt;
use kinero_core::{AuthenticatedIdentity, KineroError, KineroResult};
use kinero_middleware::{BoxFuture, MiddlewareContext, MiddlewareResult, Request, Response, ResponseExt};
use kinero_users::{LoginRequest, RegisterRequest, User, UserService};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use uuid::Uuid;

const USERS_PREFIX: &str = "/api/users/";

/// Routes backed by a [`UserService`].
///
/// # Example
///
/// ```ignore
/// let routes = Arc::new(UserRoutes::new(service));
/// let response = gateway
///     .handle(request, move |ctx, req| routes.dispatch(ctx, req))
///     .await;
/// ```
#[derive(Debug)]
pub struct UserRoutes {
    service: Arc<UserService>,
}

impl UserRoutes {
    /// Creates the routes.
    pub fn new(service: Arc<UserService>) -> Self {
        Self { service }
    }

    /// Dispatches a request to its route.
    ///
    /// Reads what it needs from `ctx` up front, so the returned future owns
    /// its state.
    pub fn dispatch(
        self: Arc<Self>,
        ctx: &mut MiddlewareContext,
        request: Request,
    ) -> BoxFuture<'static, MiddlewareResult> {
        let identity = ctx.require_identity().cloned();

        Box::pin(async move {
            let method = request.method().clone();
            let path = request.uri().path().to_string();

            match (method.as_str(), path.as_str()) {
                ("POST", "/api/users/register") => {
                    let body: RegisterRequest = read_json(request).await?;
                    self.register(body)
                }
                ("POST", "/api/auth/login") => {
                    let body: LoginRequest = read_json(request).await?;
                    self.login(body)
                }
                ("GET", "/api/users/me") => self.me(&identity?),
                ("GET", p) if user_id_segment(p).is_some() => {
                    let _caller = identity?;
                    self.get_by_id(&p[USERS_PREFIX.len()..])
                }
                (m, p) => Err(KineroError::not_found(format!("No route for {m} {p}"))),
            }
        })
    }

    fn register(&self, body: RegisterRequest) -> MiddlewareResult {
        let user = self.service.register(body)?;
        kinero_telemetry::record_user_registration();
        let mut response = Response::json(StatusCode::CREATED, &user.profile());
        response.headers_mut().insert(
            http::header::LOCATION,
            format!("{USERS_PREFIX}{}", user.id)
                .parse()
                .expect("valid header value"),
        );
        Ok(response)
    }

    fn login(&self, body: LoginRequest) -> MiddlewareResult {
        let token = self.service.login(body, Utc::now())?;
        Ok(Response::json(StatusCode::OK, &token))
    }

    fn me(&self, identity: &AuthenticatedIdentity) -> MiddlewareResult {
        let user = identity
            .user::<User>()
            .ok_or_else(|| KineroError::unclassified("identity is not a user account"))?;
        Ok(Response::json(StatusCode::OK, &user.profile()))
    }

    fn get_by_id(&self, raw_id: &str) -> MiddlewareResult {
        let id = Uuid::parse_str(raw_id)
            .map_err(|_| KineroError::validation(format!("Invalid user id: '{raw_id}'")))?;
        let user = self.service.find_by_id(id)?;
        Ok(Response::json(StatusCode::OK, &user.profile()))
    }
}

/// Returns the `{id}` of `/api/users/{id}`, a single non-empty segment.
fn user_id_segment(path: &str) -> Option<&str> {
    path.strip_prefix(USERS_PREFIX)
        .filter(|segment| !segment.is_empty() && !segment.contains('/'))
}

async fn read_json<T: DeserializeOwned>(request: Request) -> KineroResult<T> {
    let bytes: Bytes = match request.into_body().collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(never) => match never {},
    };

    serde_json::from_slice(&bytes)
        .map_err(|e| KineroError::validation(format!("Malformed request body: {e}")))
}
