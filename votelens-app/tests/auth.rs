mod common;

use axum::http::StatusCode;
use chrono::{Duration as ChronoDuration, Utc};
use common::{get, get_with_cookie, post_json, set_cookie, ScriptedLlm, TestApp};
use serde_json::json;

async fn app() -> TestApp {
    TestApp::new(ScriptedLlm::new(Vec::<String>::new())).await
}

fn signup_body(email: &str) -> serde_json::Value {
    json!({ "fullName": "Asha Verma", "email": email, "password": "secret1" })
}

async fn signed_up_and_logged_in(app: &TestApp) -> String {
    let (status, _, _) = app
        .send(post_json("/api/auth/signup", &signup_body("asha@example.in")))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, headers, _) = app
        .send(post_json(
            "/api/auth/login",
            &json!({ "email": "asha@example.in", "password": "secret1" }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    let raw = set_cookie(&headers).unwrap();
    raw.split(';').next().unwrap().to_string()
}

#[tokio::test]
async fn signup_creates_one_account_per_email() {
    let app = app().await;
    let (status, _, body) = app
        .send(post_json("/api/auth/signup", &signup_body("Asha@Example.in ")))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["email"], "asha@example.in");
    assert_eq!(body["user"]["fullName"], "Asha Verma");
    assert!(body["user"].get("passwordHash").is_none());

    let (status, _, body) = app
        .send(post_json("/api/auth/signup", &signup_body("asha@example.in")))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "An account with this email already exists");
    assert_eq!(app.store.count_users().await.unwrap(), 1);
}

#[tokio::test]
async fn signup_validates_fields() {
    let app = app().await;
    let cases = [
        json!({ "email": "a@b.in", "password": "secret1" }),
        json!({ "fullName": "A", "email": "not-an-email", "password": "secret1" }),
        json!({ "fullName": "A", "email": "a@b.in", "password": "12345" }),
    ];
    for body in cases {
        let (status, _, _) = app.send(post_json("/api/auth/signup", &body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    }
    assert_eq!(app.store.count_users().await.unwrap(), 0);
}

#[tokio::test]
async fn login_sets_a_one_day_http_only_cookie() {
    let app = app().await;
    app.send(post_json("/api/auth/signup", &signup_body("asha@example.in")))
        .await;

    let (status, headers, body) = app
        .send(post_json(
            "/api/auth/login",
            &json!({ "email": "asha@example.in", "password": "secret1" }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], "asha@example.in");

    let cookie = set_cookie(&headers).unwrap();
    assert!(cookie.starts_with("token="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Path=/"));
    assert!(cookie.contains("SameSite=Lax"));
    assert!(cookie.contains("Max-Age=86400"));
    assert!(!cookie.contains("Secure"));
}

#[tokio::test]
async fn login_rejects_bad_credentials() {
    let app = app().await;
    app.send(post_json("/api/auth/signup", &signup_body("asha@example.in")))
        .await;

    for body in [
        json!({ "email": "asha@example.in", "password": "wrong-one" }),
        json!({ "email": "nobody@example.in", "password": "secret1" }),
    ] {
        let (status, headers, _) = app.send(post_json("/api/auth/login", &body)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(set_cookie(&headers).is_none());
    }
}

#[tokio::test]
async fn me_returns_the_session_user() {
    let app = app().await;
    let cookie = signed_up_and_logged_in(&app).await;

    let (status, _, body) = app.send(get_with_cookie("/api/auth/me", &cookie)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["fullName"], "Asha Verma");

    let (status, _, _) = app.send(get("/api/auth/me")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn me_clears_invalid_and_expired_sessions() {
    let app = app().await;
    let cookie = signed_up_and_logged_in(&app).await;
    let user = app
        .store
        .find_user_by_email("asha@example.in")
        .await
        .unwrap()
        .unwrap();
    let expired = app
        .tokens
        .issue_at(user.id, &user.email, Utc::now() - ChronoDuration::days(2))
        .unwrap();

    for bad in ["token=garbage".to_string(), format!("token={expired}")] {
        let (status, headers, _) = app.send(get_with_cookie("/api/auth/me", &bad)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let cleared = set_cookie(&headers).unwrap();
        assert!(cleared.starts_with("token=;"), "{cleared}");
        assert!(cleared.contains("Max-Age=0"));
    }

    // The original session is unaffected.
    let (status, _, _) = app.send(get_with_cookie("/api/auth/me", &cookie)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn logout_clears_the_cookie() {
    let app = app().await;
    let cookie = signed_up_and_logged_in(&app).await;

    let mut request = post_json("/api/auth/logout", &json!({}));
    request
        .headers_mut()
        .insert(axum::http::header::COOKIE, cookie.parse().unwrap());
    let (status, headers, _) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert!(set_cookie(&headers).unwrap().contains("Max-Age=0"));
}
