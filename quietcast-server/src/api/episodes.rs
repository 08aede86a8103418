//! Episode endpoints: admin list, public feed, change polling, CRUD,
//! audio attachment, listen counting, and the auto-publish sweep.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

use quietcast_common::db::episodes as db;
use quietcast_common::db::models::{AudioAttachment, Episode, EpisodePatch, PublicEpisode};
use quietcast_common::publish::{
    determine_publish_state, parse_publish_date, parse_publish_time, EpisodeStatus,
};
use quietcast_common::time;

use crate::error::ApiError;
use crate::AppState;

/// GET /api/episodes
///
/// Full admin list, newest upload first, with the latest change timestamp
/// so a client can seed its polling cursor from the same response.
pub async fn list_episodes(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let episodes = db::list_episodes(&state.db).await?;
    let last_update = db::latest_update_ms(&state.db).await?;

    Ok(Json(json!({
        "success": true,
        "data": episodes,
        "lastUpdate": last_update,
    })))
}

#[derive(Debug, Deserialize)]
pub struct ChangesQuery {
    /// Client's last-seen change timestamp (epoch ms)
    #[serde(default)]
    pub since: i64,
}

/// GET /api/episodes/changes?since=<ms>
///
/// Check-only polling endpoint. `changed` is true only when the server's
/// latest timestamp strictly exceeds `since`; equal timestamps are not a
/// change.
pub async fn episode_changes(
    State(state): State<AppState>,
    Query(query): Query<ChangesQuery>,
) -> Result<Json<Value>, ApiError> {
    let last_update = db::latest_update_ms(&state.db).await?;

    Ok(Json(json!({
        "success": true,
        "lastUpdate": last_update,
        "changed": last_update > query.since,
    })))
}

#[derive(Debug, Deserialize)]
pub struct PublicQuery {
    pub topic: Option<String>,
}

/// GET /api/episodes/public?topic=<topic>
///
/// Listener feed: published AND public episodes only, admin fields omitted.
pub async fn public_episodes(
    State(state): State<AppState>,
    Query(query): Query<PublicQuery>,
) -> Result<Json<Value>, ApiError> {
    let topic = query
        .topic
        .as_deref()
        .filter(|t| !t.is_empty() && *t != "all");

    let episodes = db::list_public_episodes(&state.db, topic).await?;
    let feed: Vec<PublicEpisode> = episodes.into_iter().map(PublicEpisode::from).collect();

    Ok(Json(json!({
        "success": true,
        "count": feed.len(),
        "data": feed,
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEpisodeRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub duration: String,
    pub topic: String,
    pub publish_date: Option<String>,
    pub publish_time: Option<String>,
    pub cover_image: Option<String>,
    pub created_by: Option<String>,
}

/// POST /api/episodes
///
/// Create an episode. Status and visibility are computed once, here, from
/// the supplied publish date/time versus the current server time.
pub async fn create_episode(
    State(state): State<AppState>,
    Json(request): Json<CreateEpisodeRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let title = request.title.trim().to_string();
    if title.len() < 3 {
        return Err(ApiError::BadRequest(
            "Title must be at least 3 characters".to_string(),
        ));
    }
    if request.duration.trim().is_empty() {
        return Err(ApiError::BadRequest("Duration is required".to_string()));
    }
    if request.topic.trim().is_empty() {
        return Err(ApiError::BadRequest("Topic is required".to_string()));
    }

    let publish_state = determine_publish_state(
        request.publish_date.as_deref(),
        request.publish_time.as_deref(),
        time::now_local(),
    )?;

    let now_ms = time::now_ms();
    let episode = Episode {
        guid: Uuid::new_v4().to_string(),
        title,
        description: request.description.trim().to_string(),
        status: publish_state.status.as_str().to_string(),
        upload_date: time::now().to_rfc3339(),
        duration: request.duration.trim().to_string(),
        listens: 0,
        topic: request.topic.trim().to_string(),
        publish_date: request.publish_date.filter(|d| !d.is_empty()),
        publish_time: request.publish_time.filter(|t| !t.is_empty()),
        audio_url: None,
        audio_public_id: None,
        audio_file_name: None,
        audio_size: None,
        audio_duration: None,
        audio_format: None,
        cover_image: request.cover_image,
        created_by: request.created_by,
        is_public: publish_state.is_public,
        created_at: now_ms,
        updated_at: now_ms,
    };

    db::insert_episode(&state.db, &episode).await?;
    info!("Episode created: {} ({})", episode.title, episode.guid);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Episode uploaded successfully",
            "data": episode,
        })),
    ))
}

/// GET /api/episodes/:id
pub async fn get_episode(
    State(state): State<AppState>,
    Path(guid): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let episode = db::fetch_episode(&state.db, &guid)
        .await?
        .ok_or_else(|| ApiError::NotFound("Episode not found".to_string()))?;

    Ok(Json(json!({
        "success": true,
        "data": episode,
    })))
}

/// PATCH /api/episodes/:id
///
/// Direct field-level partial update; absent fields are unchanged.
pub async fn update_episode(
    State(state): State<AppState>,
    Path(guid): Path<String>,
    Json(patch): Json<EpisodePatch>,
) -> Result<Json<Value>, ApiError> {
    if let Some(status) = &patch.status {
        EpisodeStatus::parse(status)?;
    }
    if let Some(date) = patch.publish_date.as_deref().filter(|d| !d.is_empty()) {
        parse_publish_date(date)?;
    }
    if let Some(time) = patch.publish_time.as_deref().filter(|t| !t.is_empty()) {
        parse_publish_time(time)?;
    }
    if let Some(title) = &patch.title {
        if title.trim().len() < 3 {
            return Err(ApiError::BadRequest(
                "Title must be at least 3 characters".to_string(),
            ));
        }
    }
    if matches!(patch.listens, Some(listens) if listens < 0) {
        return Err(ApiError::BadRequest("Listens cannot be negative".to_string()));
    }

    let episode = db::apply_episode_patch(&state.db, &guid, &patch, time::now_ms())
        .await?
        .ok_or_else(|| ApiError::NotFound("Episode not found".to_string()))?;

    Ok(Json(json!({
        "success": true,
        "message": "Episode updated successfully",
        "data": episode,
    })))
}

/// DELETE /api/episodes/:id
///
/// Best-effort remote media deletion first; a remote failure is logged and
/// never blocks local deletion (an orphaned remote object is accepted).
pub async fn delete_episode(
    State(state): State<AppState>,
    Path(guid): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let episode = db::fetch_episode(&state.db, &guid)
        .await?
        .ok_or_else(|| ApiError::NotFound("Episode not found".to_string()))?;

    if let Some(public_id) = &episode.audio_public_id {
        if let Err(e) = state.media.destroy(public_id).await {
            warn!(
                "Remote media deletion failed for {} (continuing): {}",
                public_id, e
            );
        }
    }

    db::delete_episode(&state.db, &guid).await?;
    info!("Episode deleted: {} ({})", episode.title, guid);

    Ok(Json(json!({
        "success": true,
        "message": "Episode deleted successfully",
    })))
}

/// POST /api/episodes/:id/audio
///
/// Attach an uploaded media reference; the episode auto-publishes.
pub async fn attach_audio(
    State(state): State<AppState>,
    Path(guid): Path<String>,
    Json(audio): Json<AudioAttachment>,
) -> Result<Json<Value>, ApiError> {
    let episode = db::attach_audio(&state.db, &guid, &audio, time::now_ms())
        .await?
        .ok_or_else(|| ApiError::NotFound("Episode not found".to_string()))?;

    Ok(Json(json!({
        "success": true,
        "message": "Audio linked to episode successfully",
        "data": episode,
    })))
}

/// POST /api/episodes/:id/listen
pub async fn register_listen(
    State(state): State<AppState>,
    Path(guid): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let listens = db::increment_listens(&state.db, &guid, time::now_ms())
        .await?
        .ok_or_else(|| ApiError::NotFound("Episode not found".to_string()))?;

    Ok(Json(json!({
        "success": true,
        "listens": listens,
    })))
}

/// POST /api/episodes/publish-due
///
/// Stateless idempotent sweep: every scheduled episode whose publish
/// instant has passed flips to published+public. Each row is updated
/// independently; running the sweep again with no time elapsed publishes
/// nothing further. Intended for periodic external invocation.
pub async fn publish_due(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let today = time::today_string();
    let now = time::time_string();

    let due = db::due_scheduled(&state.db, &today, &now).await?;
    info!(
        "Publish sweep at {} {}: {} episode(s) due",
        today,
        now,
        due.len()
    );

    let now_ms = time::now_ms();
    for episode in &due {
        db::mark_published(&state.db, &episode.guid, now_ms).await?;
        info!("Published: {}", episode.title);
    }

    let published: Vec<Value> = due
        .iter()
        .map(|ep| {
            json!({
                "guid": ep.guid,
                "title": ep.title,
                "publishDate": ep.publish_date,
                "publishTime": ep.publish_time,
            })
        })
        .collect();

    Ok(Json(json!({
        "success": true,
        "published": due.len(),
        "episodes": published,
    })))
}
