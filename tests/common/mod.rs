#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use blogspace::router::init_router;
use blogspace::state::{AppState, init_app_state};
use blogspace_auth::{DirectoryError, Identity, InMemoryUserDirectory, ManualClock, UserDirectory};
use blogspace_config::{CorsConfig, JwtConfig};
use blogspace_core::{BcryptPasswordHasher, PasswordHasher};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_SECRET: &str = "integration-test-secret";
pub const TOKEN_TTL: u64 = 86_400;
pub const NOW: i64 = 1_700_000_000;

pub const USER_EMAIL: &str = "realuser@x.com";
pub const USER_PASSWORD: &str = "rightpass";

pub struct TestApp {
    pub router: Router,
    pub directory: Arc<InMemoryUserDirectory>,
    pub clock: Arc<ManualClock>,
    pub state: AppState,
    pub user_id: Uuid,
}

pub fn test_hasher() -> BcryptPasswordHasher {
    BcryptPasswordHasher::with_cost(4)
}

pub fn test_jwt_config() -> JwtConfig {
    JwtConfig::new(TEST_SECRET, TOKEN_TTL)
}

pub fn test_cors_config() -> CorsConfig {
    CorsConfig {
        allowed_origins: vec!["http://localhost:5173".to_string()],
    }
}

pub fn add_user(directory: &InMemoryUserDirectory, email: &str, password: &str) -> Uuid {
    let id = Uuid::new_v4();
    directory
        .insert(
            Identity::new(id, email, test_hasher().hash(password).unwrap(), "Real User")
                .with_authorities(["ROLE_USER"]),
        )
        .unwrap();
    id
}

pub fn build_state(directory: Arc<dyn UserDirectory>, clock: Arc<ManualClock>) -> AppState {
    init_app_state(
        directory,
        Arc::new(test_hasher()),
        &test_jwt_config(),
        test_cors_config(),
        clock,
    )
}

/// Router over an in-memory directory holding one user, at a fixed time.
pub fn setup_test_app() -> TestApp {
    let directory = Arc::new(InMemoryUserDirectory::new());
    let user_id = add_user(&directory, USER_EMAIL, USER_PASSWORD);
    let clock = Arc::new(ManualClock::at(NOW));
    let state = build_state(directory.clone(), clock.clone());

    TestApp {
        router: init_router(state.clone()),
        directory,
        clock,
        state,
        user_id,
    }
}

/// A directory whose backing store is down.
pub struct UnavailableDirectory;

#[async_trait::async_trait]
impl UserDirectory for UnavailableDirectory {
    async fn find_by_email(&self, _: &str) -> Result<Option<Identity>, DirectoryError> {
        Err(DirectoryError::Unavailable("connection refused".to_string()))
    }

    async fn find_by_id(&self, _: Uuid) -> Result<Option<Identity>, DirectoryError> {
        Err(DirectoryError::Unavailable("connection refused".to_string()))
    }
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn login_request(email: &str, password: &str) -> Request<Body> {
    json_request(
        "POST",
        "/api/v1/auth/login",
        json!({ "email": email, "password": password }),
    )
}

pub fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn send(router: &Router, request: Request<Body>) -> Response {
    router.clone().oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn login_token(router: &Router, email: &str, password: &str) -> String {
    let response = send(router, login_request(email, password)).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["token"]
        .as_str()
        .unwrap()
        .to_string()
}
