//! Account and session endpoints
//!
//! Sessions are signed, time-limited tokens carried in an HttpOnly cookie.

use axum::{
    async_trait,
    extract::{FromRequestParts, State},
    http::{request::Parts, StatusCode},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use quietcast_common::db::listeners as db;
use quietcast_common::db::models::{Listener, ProfilePatch};
use quietcast_common::time as clock;
use quietcast_common::{password, session};

use crate::api::listeners::new_listener;
use crate::error::ApiError;
use crate::AppState;

/// Session cookie name
pub const SESSION_COOKIE: &str = "quietcast_session";

fn session_cookie(token: String, days: i64) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, token);
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_path("/");
    cookie.set_max_age(time::Duration::days(days));
    cookie
}

fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, "");
    cookie.set_path("/");
    cookie
}

/// The authenticated listener, resolved from the session cookie
pub struct CurrentListener(pub Listener);

#[async_trait]
impl FromRequestParts<AppState> for CurrentListener {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(SESSION_COOKIE)
            .ok_or_else(|| ApiError::Unauthorized("Not signed in".to_string()))?;

        let claims = session::verify_token(&state.session_secret, token.value())
            .map_err(|_| ApiError::Unauthorized("Invalid session".to_string()))?;

        let listener = db::fetch_listener(&state.db, &claims.sub)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("Account no longer exists".to_string()))?;

        Ok(CurrentListener(listener))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub username: Option<String>,
}

/// POST /api/auth/signup
pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<SignupRequest>,
) -> Result<(CookieJar, (StatusCode, Json<Value>)), ApiError> {
    if request.name.trim().is_empty()
        || request.email.trim().is_empty()
        || request.password.is_empty()
    {
        return Err(ApiError::BadRequest("Missing required fields".to_string()));
    }

    let email = request.email.trim().to_lowercase();
    if db::fetch_listener_by_email(&state.db, &email).await?.is_some() {
        return Err(ApiError::Conflict(
            "User with this email already exists".to_string(),
        ));
    }

    let hash = password::hash_password(&request.password)?;
    let username = request.username.map(|u| u.trim().to_lowercase());
    let listener = new_listener(&request.name, &email, hash, username);
    db::insert_listener(&state.db, &listener).await?;
    info!("Listener signed up: {}", listener.email);

    let token = session::sign_token(&state.session_secret, &listener.guid, session::SESSION_DAYS)?;
    let jar = jar.add(session_cookie(token, session::SESSION_DAYS));

    Ok((
        jar,
        (
            StatusCode::CREATED,
            Json(json!({
                "success": true,
                "message": "Sign up successful",
                "data": listener,
            })),
        ),
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub remember_me: bool,
}

/// POST /api/auth/login
///
/// The same message covers unknown email and wrong password.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Result<(CookieJar, Json<Value>), ApiError> {
    let invalid = || ApiError::Unauthorized("Invalid email or password".to_string());

    let listener = db::fetch_listener_by_email(&state.db, &request.email.trim().to_lowercase())
        .await?
        .ok_or_else(invalid)?;

    if !password::verify_password(&request.password, &listener.password_hash)? {
        return Err(invalid());
    }

    db::record_login(&state.db, &listener.guid, clock::now_ms()).await?;

    let days = if request.remember_me {
        session::SESSION_DAYS_REMEMBERED
    } else {
        session::SESSION_DAYS
    };
    let token = session::sign_token(&state.session_secret, &listener.guid, days)?;
    let jar = jar.add(session_cookie(token, days));

    // Re-read so the response reflects the login bookkeeping
    let listener = db::fetch_listener(&state.db, &listener.guid)
        .await?
        .ok_or_else(invalid)?;

    Ok((
        jar,
        Json(json!({
            "success": true,
            "message": "Login successful",
            "data": listener,
        })),
    ))
}

/// POST /api/auth/logout
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<Value>) {
    let jar = jar.remove(removal_cookie());
    (
        jar,
        Json(json!({
            "success": true,
            "message": "Logged out successfully",
        })),
    )
}

/// GET /api/auth/session
///
/// Always 200; an absent or invalid session is simply not authenticated.
pub async fn session(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Json<Value>, ApiError> {
    let unauthenticated = json!({
        "success": false,
        "isAuthenticated": false,
    });

    let Some(token) = jar.get(SESSION_COOKIE) else {
        return Ok(Json(unauthenticated));
    };
    let Ok(claims) = session::verify_token(&state.session_secret, token.value()) else {
        return Ok(Json(unauthenticated));
    };
    let Some(listener) = db::fetch_listener(&state.db, &claims.sub).await? else {
        return Ok(Json(unauthenticated));
    };

    Ok(Json(json!({
        "success": true,
        "isAuthenticated": true,
        "data": listener,
    })))
}

/// PATCH /api/profile
pub async fn update_profile(
    State(state): State<AppState>,
    current: CurrentListener,
    Json(patch): Json<ProfilePatch>,
) -> Result<Json<Value>, ApiError> {
    let listener = db::apply_profile_patch(&state.db, &current.0.guid, &patch, clock::now_ms())
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(json!({
        "success": true,
        "message": "Profile updated successfully",
        "data": listener,
    })))
}

/// DELETE /api/account
pub async fn delete_account(
    State(state): State<AppState>,
    current: CurrentListener,
    jar: CookieJar,
) -> Result<(CookieJar, Json<Value>), ApiError> {
    db::delete_listener(&state.db, &current.0.guid).await?;
    info!("Account deleted: {}", current.0.email);

    let jar = jar.remove(removal_cookie());
    Ok((
        jar,
        Json(json!({
            "success": true,
            "message": "Account deleted successfully",
        })),
    ))
}
