//! Account endpoints. The session is a signed token in an HTTP-only cookie.

use crate::app::{AppState, CookieSettings};
use crate::error::ApiError;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use serde_json::{json, Value};
use votelens_auth::MIN_PASSWORD_LEN;
use votelens_common::VotelensError;
use votelens_store::{NewUser, User};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignupBody {
    #[serde(default)]
    full_name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    password: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LoginBody {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    password: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/me", get(me))
}

fn present(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn session_cookie(settings: &CookieSettings, token: String) -> Cookie<'static> {
    let max_age = i64::try_from(settings.max_age.as_secs()).unwrap_or(i64::MAX);
    Cookie::build((settings.name.clone(), token))
        .http_only(true)
        .path("/")
        .same_site(SameSite::Lax)
        .secure(settings.secure)
        .max_age(time::Duration::seconds(max_age))
        .build()
}

fn cleared_cookie(settings: &CookieSettings) -> Cookie<'static> {
    Cookie::build((settings.name.clone(), String::new()))
        .http_only(true)
        .path("/")
        .same_site(SameSite::Lax)
        .secure(settings.secure)
        .max_age(time::Duration::ZERO)
        .build()
}

async fn signup(
    State(state): State<AppState>,
    body: Result<Json<SignupBody>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(body) = body?;
    let (Some(full_name), Some(email), Some(password)) = (
        present(&body.full_name),
        present(&body.email),
        body.password.as_deref().filter(|p| !p.is_empty()),
    ) else {
        return Err(ApiError::bad_request("All fields are required"));
    };
    if !email.contains('@') {
        return Err(ApiError::bad_request("A valid email address is required"));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::bad_request(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    // Checked before hashing; the unique index still guards concurrent signups.
    if state.store.find_user_by_email(email).await?.is_some() {
        return Err(ApiError::bad_request("An account with this email already exists"));
    }

    let password_hash = state.hasher.hash(password).await?;
    let user = state
        .store
        .create_user(NewUser {
            full_name: full_name.to_string(),
            email: email.to_string(),
            password_hash,
        })
        .await?;
    tracing::info!(user_id = %user.id, "auth.signup.created");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Account created", "user": user })),
    ))
}

async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Result<Json<LoginBody>, JsonRejection>,
) -> Result<(CookieJar, Json<Value>), ApiError> {
    let Json(body) = body?;
    let (Some(email), Some(password)) = (present(&body.email), body.password.as_deref()) else {
        return Err(ApiError::bad_request("Email and password are required"));
    };
    let invalid = || ApiError::unauthorized("Invalid email or password");

    let user = state.store.find_user_by_email(email).await?.ok_or_else(invalid)?;
    if !state.hasher.verify(password, &user.password_hash).await? {
        tracing::info!(user_id = %user.id, "auth.login.rejected");
        return Err(invalid());
    }

    let token = state.tokens.issue(user.id, &user.email)?;
    tracing::info!(user_id = %user.id, "auth.login.succeeded");
    Ok((
        jar.add(session_cookie(&state.cookie, token)),
        Json(json!({ "message": "Logged in", "user": user })),
    ))
}

/// Clears the cookie only; an issued token stays valid until it expires.
async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Json<Value>) {
    (
        jar.add(cleared_cookie(&state.cookie)),
        Json(json!({ "message": "Logged out" })),
    )
}

async fn me(State(state): State<AppState>, jar: CookieJar) -> Response {
    let Some(token) = jar.get(&state.cookie.name).map(|c| c.value().to_string()) else {
        return ApiError::unauthorized("Not authenticated").into_response();
    };
    match current_user(&state, &token).await {
        Ok(user) => Json(json!({ "user": user })).into_response(),
        Err(e @ VotelensError::Unauthorized(_)) => {
            tracing::debug!(error = %e, "auth.me.cleared_session");
            (jar.add(cleared_cookie(&state.cookie)), ApiError::from(e)).into_response()
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}

async fn current_user(state: &AppState, token: &str) -> votelens_common::Result<User> {
    let claims = state.tokens.verify(token)?;
    state
        .store
        .find_user_by_id(claims.user_id()?)
        .await?
        .ok_or_else(|| VotelensError::Unauthorized("account no longer exists".into()))
}
