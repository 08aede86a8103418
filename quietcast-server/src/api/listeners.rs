//! Listener roster endpoints (admin-facing)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use quietcast_common::db::listeners as db;
use quietcast_common::db::models::{Listener, ListenerPatch};
use quietcast_common::{password, time};

use crate::error::ApiError;
use crate::AppState;

/// GET /api/listeners
///
/// Full roster, newest account first. Password hashes never serialize.
pub async fn list_listeners(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let listeners = db::list_listeners(&state.db).await?;

    Ok(Json(json!({
        "success": true,
        "data": listeners,
    })))
}

#[derive(Debug, Deserialize)]
pub struct CreateListenerRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Build a new listener row from signup fields
pub fn new_listener(name: &str, email: &str, password_hash: String, username: Option<String>) -> Listener {
    let now_ms = time::now_ms();
    let username = username.or_else(|| {
        name.split_whitespace()
            .next()
            .map(|first| first.to_lowercase())
    });

    Listener {
        guid: Uuid::new_v4().to_string(),
        name: name.trim().to_string(),
        email: email.trim().to_lowercase(),
        password_hash,
        username,
        bio: "Intentional listener exploring quiet forces.".to_string(),
        favorite_topic: "Inner Order".to_string(),
        avatar_id: 1,
        avatar_url: None,
        notifications: true,
        newsletter: true,
        episodes_completed: 0,
        total_time: 0,
        status: "active".to_string(),
        join_date: now_ms,
        last_login: None,
        login_count: 0,
        created_at: now_ms,
        updated_at: now_ms,
    }
}

/// POST /api/listeners
///
/// Admin roster creation. 409 when the email is already registered.
pub async fn create_listener(
    State(state): State<AppState>,
    Json(request): Json<CreateListenerRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    if request.name.trim().is_empty()
        || request.email.trim().is_empty()
        || request.password.is_empty()
    {
        return Err(ApiError::BadRequest("Missing required fields".to_string()));
    }

    let email = request.email.trim().to_lowercase();
    if db::fetch_listener_by_email(&state.db, &email).await?.is_some() {
        return Err(ApiError::Conflict("Email already registered".to_string()));
    }

    let hash = password::hash_password(&request.password)?;
    let listener = new_listener(&request.name, &email, hash, None);
    db::insert_listener(&state.db, &listener).await?;
    info!("Listener created: {}", listener.email);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "data": listener,
        })),
    ))
}

/// PATCH /api/listeners/:id
///
/// Status toggle plus optional engagement counter updates.
pub async fn update_listener(
    State(state): State<AppState>,
    Path(guid): Path<String>,
    Json(patch): Json<ListenerPatch>,
) -> Result<Json<Value>, ApiError> {
    if let Some(status) = &patch.status {
        if status != "active" && status != "inactive" {
            return Err(ApiError::BadRequest(format!(
                "'{}' is not a valid listener status",
                status
            )));
        }
    }
    if matches!(patch.episodes_completed, Some(n) if n < 0)
        || matches!(patch.total_time, Some(n) if n < 0)
    {
        return Err(ApiError::BadRequest(
            "Counters cannot be negative".to_string(),
        ));
    }

    let listener = db::apply_listener_patch(&state.db, &guid, &patch, time::now_ms())
        .await?
        .ok_or_else(|| ApiError::NotFound("Listener not found".to_string()))?;

    Ok(Json(json!({
        "success": true,
        "data": listener,
    })))
}

/// DELETE /api/listeners/:id
pub async fn delete_listener(
    State(state): State<AppState>,
    Path(guid): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let removed = db::delete_listener(&state.db, &guid).await?;
    if !removed {
        return Err(ApiError::NotFound("Listener not found".to_string()));
    }

    Ok(Json(json!({
        "success": true,
        "message": "Listener removed",
    })))
}
