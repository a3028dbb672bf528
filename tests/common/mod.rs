#![allow(dead_code)]

use actix_web::body::MessageBody;
use actix_web::cookie::Cookie;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::middleware::Logger;
use actix_web::{test, App};
use serde_json::{json, Value};
use taskgate::auth::{PasswordHasher, CSRF_COOKIE, CSRF_HEADER, SESSION_COOKIE};
use taskgate::{routes, AppState, Config};

pub const TEST_SECRET: &str = "integration-test-secret-0123456789abcdef";

/// A signed-in test user: the session token plus the id the API reported.
pub struct TestUser {
    pub id: i64,
    pub email: String,
    pub session: String,
}

pub fn test_state() -> AppState {
    let config = Config::from_lookup(|key| match key {
        "JWT_SECRET" => Some(TEST_SECRET.to_string()),
        _ => None,
    })
    .expect("test configuration");
    AppState::in_memory(&config, PasswordHasher::new(4).expect("bcrypt hasher"))
}

pub async fn test_app() -> impl Service<
    actix_http::Request,
    Response = ServiceResponse<impl MessageBody>,
    Error = actix_web::Error,
> {
    let state = test_state();
    test::init_service(
        App::new()
            .wrap(Logger::default())
            .configure(move |cfg| routes::configure(cfg, &state)),
    )
    .await
}

/// Fetches a CSRF token; the returned value is both the cookie and the header to send.
pub async fn fetch_csrf<S, B>(app: &S) -> String
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::get().uri("/api/v1/csrf").to_request();
    let resp = test::call_service(app, req).await;
    assert!(resp.status().is_success(), "csrf fetch failed");

    let cookie = cookie_value(&resp, CSRF_COOKIE).expect("csrf cookie");
    let body: Value = test::read_body_json(resp).await;
    let token = body["data"]["token"].as_str().expect("csrf token").to_string();
    assert_eq!(cookie, token);
    token
}

/// Attaches a matching CSRF cookie/header pair.
pub fn with_csrf(req: test::TestRequest, token: &str) -> test::TestRequest {
    req.cookie(Cookie::new(CSRF_COOKIE, token.to_string()))
        .insert_header((CSRF_HEADER, token.to_string()))
}

pub fn with_session(req: test::TestRequest, session: &str) -> test::TestRequest {
    req.cookie(Cookie::new(SESSION_COOKIE, session.to_string()))
}

/// Request carrying a fresh CSRF pair and, optionally, a session.
pub async fn protected<S, B>(
    app: &S,
    req: test::TestRequest,
    session: Option<&str>,
) -> test::TestRequest
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let csrf = fetch_csrf(app).await;
    let req = with_csrf(req, &csrf);
    match session {
        Some(session) => with_session(req, session),
        None => req,
    }
}

pub fn cookie_value<B>(resp: &ServiceResponse<B>, name: &str) -> Option<String> {
    resp.response()
        .cookies()
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.value().to_string())
}

pub fn response_cookie<B>(resp: &ServiceResponse<B>, name: &str) -> Option<Cookie<'static>> {
    resp.response()
        .cookies()
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.into_owned())
}

pub fn credentials(email: &str, password: &str) -> Value {
    json!({ "user": { "email": email, "password": password } })
}

pub async fn sign_up<S, B>(app: &S, email: &str, password: &str) -> TestUser
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = protected(
        app,
        test::TestRequest::post()
            .uri("/api/v1/signup")
            .set_json(credentials(email, password)),
        None,
    )
    .await
    .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::CREATED, "signup failed");

    let session = cookie_value(&resp, SESSION_COOKIE).expect("session cookie");
    let body: Value = test::read_body_json(resp).await;
    TestUser {
        id: body["data"]["id"].as_i64().expect("user id"),
        email: body["data"]["email"].as_str().expect("user email").to_string(),
        session,
    }
}
