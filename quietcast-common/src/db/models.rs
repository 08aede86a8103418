//! Database models and patch types
//!
//! Wire format is camelCase JSON; column names are snake_case. Listener
//! password hashes never serialize.

use serde::{Deserialize, Serialize};

/// A single podcast audio unit with metadata and lifecycle status
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    pub guid: String,
    pub title: String,
    pub description: String,
    /// draft | scheduled | published
    pub status: String,
    /// RFC3339 timestamp of upload submission
    pub upload_date: String,
    /// Display duration, e.g. "42:17"
    pub duration: String,
    /// Denormalized listen counter (not attributed to listeners)
    pub listens: i64,
    pub topic: String,
    /// Optional YYYY-MM-DD
    pub publish_date: Option<String>,
    /// Optional HH:MM
    pub publish_time: Option<String>,
    pub audio_url: Option<String>,
    pub audio_public_id: Option<String>,
    pub audio_file_name: Option<String>,
    pub audio_size: Option<i64>,
    pub audio_duration: Option<f64>,
    pub audio_format: Option<String>,
    pub cover_image: Option<String>,
    pub created_by: Option<String>,
    /// Visibility flag, normally correlated with status == published but
    /// not enforced (a published episode may be hidden)
    pub is_public: bool,
    /// Epoch milliseconds
    pub created_at: i64,
    /// Epoch milliseconds; drives change-detection polling
    pub updated_at: i64,
}

/// Listener-facing projection of an episode (admin fields omitted)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicEpisode {
    pub guid: String,
    pub title: String,
    pub description: String,
    pub status: String,
    pub upload_date: String,
    pub duration: String,
    pub listens: i64,
    pub topic: String,
    pub audio_url: Option<String>,
    pub audio_duration: Option<f64>,
    pub audio_format: Option<String>,
    pub cover_image: Option<String>,
    pub updated_at: i64,
}

impl From<Episode> for PublicEpisode {
    fn from(ep: Episode) -> Self {
        Self {
            guid: ep.guid,
            title: ep.title,
            description: ep.description,
            status: ep.status,
            upload_date: ep.upload_date,
            duration: ep.duration,
            listens: ep.listens,
            topic: ep.topic,
            audio_url: ep.audio_url,
            audio_duration: ep.audio_duration,
            audio_format: ep.audio_format,
            cover_image: ep.cover_image,
            updated_at: ep.updated_at,
        }
    }
}

/// Field-level partial update for an episode. Absent fields are unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub duration: Option<String>,
    pub topic: Option<String>,
    pub publish_date: Option<String>,
    pub publish_time: Option<String>,
    pub listens: Option<i64>,
    pub cover_image: Option<String>,
    pub is_public: Option<bool>,
}

/// Media reference attached to an episode after upload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioAttachment {
    pub url: String,
    pub public_id: String,
    pub file_name: String,
    pub size: i64,
    pub duration: Option<f64>,
    pub format: Option<String>,
}

/// A registered end-user account
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Listener {
    pub guid: String,
    pub name: String,
    pub email: String,
    /// Argon2 hash, not exposed in JSON
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub username: Option<String>,
    pub bio: String,
    pub favorite_topic: String,
    pub avatar_id: i64,
    pub avatar_url: Option<String>,
    pub notifications: bool,
    pub newsletter: bool,
    pub episodes_completed: i64,
    /// Total listening time in seconds
    pub total_time: i64,
    /// active | inactive
    pub status: String,
    pub join_date: i64,
    pub last_login: Option<i64>,
    pub login_count: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Admin roster patch: status toggle plus engagement counters
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListenerPatch {
    pub status: Option<String>,
    pub episodes_completed: Option<i64>,
    pub total_time: Option<i64>,
}

/// Self-service profile patch
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub username: Option<String>,
    pub bio: Option<String>,
    pub favorite_topic: Option<String>,
    pub avatar_id: Option<i64>,
    pub avatar_url: Option<String>,
    pub notifications: Option<bool>,
    pub newsletter: Option<bool>,
}
