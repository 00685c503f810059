//! Account flows through the configured gateway.

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use kinero::config::AuthConfig;
use kinero::prelude::*;
use uuid::Uuid;

const SECRET: &str = "account-flow-secret-account-flow-00";

struct App {
    gateway: Gateway,
    routes: Arc<UserRoutes>,
    service: Arc<UserService>,
}

impl App {
    fn new(production: bool) -> Self {
        let mut config = if production {
            KineroConfig::production()
        } else {
            KineroConfig::development()
        };
        config.auth = AuthConfig {
            secret: SECRET.to_string(),
            ..AuthConfig::default()
        };

        let store = InMemoryUserStore::new();
        let gateway = Gateway::from_config(config, store.clone()).unwrap();
        let service = Arc::new(UserService::new(store, gateway.codec()));
        let routes = Arc::new(UserRoutes::new(service.clone()));

        Self {
            gateway,
            routes,
            service,
        }
    }

    async fn send(&self, request: Request) -> (StatusCode, String, serde_json::Value) {
        let routes = self.routes.clone();
        let response = self
            .gateway
            .handle(request, move |ctx, req| routes.dispatch(ctx, req))
            .await;

        let status = response.status();
        let correlation_id = response
            .headers()
            .get("x-correlation-id")
            .expect("every response carries a correlation id")
            .to_str()
            .unwrap()
            .to_string();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json = if body.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        (status, correlation_id, json)
    }

    async fn register(&self, email: &str, password: &str) -> (StatusCode, String, serde_json::Value) {
        self.send(post(
            "/api/users/register",
            &serde_json::json!({"email": email, "password": password}).to_string(),
        ))
        .await
    }

    async fn login(&self, email: &str, password: &str) -> String {
        let (status, _, json) = self
            .send(post(
                "/api/auth/login",
                &serde_json::json!({"email": email, "password": password}).to_string(),
            ))
            .await;
        assert_eq!(status, StatusCode::OK);
        json["token"].as_str().unwrap().to_string()
    }
}

fn post(path: &str, body: &str) -> Request {
    http::Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json")
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap()
}

fn get(path: &str, token: Option<&str>) -> Request {
    let mut builder = http::Request::builder().method("GET").uri(path);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Full::new(Bytes::new())).unwrap()
}

#[tokio::test]
async fn register_login_and_fetch_profile() {
    let app = App::new(false);

    let (status, _, profile) = app.register("ada@kinero.dev", "password123").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(profile["email"], "ada@kinero.dev");
    assert!(profile.get("passwordHash").is_none());

    let token = app.login("ada@kinero.dev", "password123").await;

    let (status, _, me) = app.send(get("/api/users/me", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["id"], profile["id"]);

    let by_id = format!("/api/users/{}", profile["id"].as_str().unwrap());
    let (status, _, fetched) = app.send(get(&by_id, Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["email"], "ada@kinero.dev");
}

#[tokio::test]
async fn duplicate_registration_is_conflict() {
    let app = App::new(false);
    app.register("dup@kinero.dev", "password123").await;

    let (status, correlation_id, body) = app.register("dup@kinero.dev", "other-password").await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["status"], 409);
    assert_eq!(body["error"], "Conflict");
    assert_eq!(body["message"], "User already exists with email: 'dup@kinero.dev'");
    assert_eq!(body["path"], "/api/users/register");
    assert_eq!(body["correlationId"], correlation_id.as_str());
}

#[tokio::test]
async fn invalid_registration_reports_first_field_error() {
    let app = App::new(false);

    let (status, _, body) = app.register("not-an-email", "123").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Bad Request");
    assert_eq!(body["message"], "Must be a valid email address");
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let app = App::new(false);
    app.register("ada@kinero.dev", "password123").await;

    let (status, _, body) = app
        .send(post(
            "/api/auth/login",
            r#"{"email":"ada@kinero.dev","password":"wrong-one"}"#,
        ))
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");
}

#[tokio::test]
async fn unknown_user_id_is_not_found_and_bad_id_is_bad_request() {
    let app = App::new(false);
    app.register("ada@kinero.dev", "password123").await;
    let token = app.login("ada@kinero.dev", "password123").await;

    let missing = Uuid::new_v4();
    let (status, _, body) = app
        .send(get(&format!("/api/users/{missing}"), Some(&token)))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], format!("User not found with id: '{missing}'"));

    let (status, _, _) = app.send(get("/api/users/not-a-uuid", Some(&token))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn password_change_revokes_earlier_tokens() {
    let app = App::new(false);
    let (_, _, profile) = app.register("ada@kinero.dev", "password123").await;
    let id: Uuid = profile["id"].as_str().unwrap().parse().unwrap();

    let token = app.login("ada@kinero.dev", "password123").await;
    let later = chrono::Utc::now() + chrono::Duration::seconds(5);
    app.service.change_password(id, "new-password", later).unwrap();

    let (status, _, body) = app.send(get("/api/users/me", Some(&token))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid or expired token");
}

#[tokio::test]
async fn deleted_account_token_is_unauthorized() {
    let app = App::new(false);
    let (_, _, profile) = app.register("ada@kinero.dev", "password123").await;
    let id: Uuid = profile["id"].as_str().unwrap().parse().unwrap();
    let token = app.login("ada@kinero.dev", "password123").await;

    app.service.delete(id).unwrap();

    let (status, _, body) = app.send(get("/api/users/me", Some(&token))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Authentication failed");
}

#[tokio::test]
async fn production_preset_hides_internal_messages() {
    let app = App::new(true);

    let response = app
        .gateway
        .handle(get("/api/anything", None), |_ctx, _req| {
            Box::pin(async { Err(KineroError::unclassified("pool exhausted on db-3")) })
        })
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_ne!(json["message"], "pool exhausted on db-3");
}
