//! Listener queries

use crate::db::models::{Listener, ListenerPatch, ProfilePatch};
use crate::Result;
use sqlx::SqlitePool;

/// Insert a new listener row
pub async fn insert_listener(db: &SqlitePool, listener: &Listener) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO listeners (
            guid, name, email, password_hash, username, bio, favorite_topic,
            avatar_id, avatar_url, notifications, newsletter,
            episodes_completed, total_time, status, join_date, last_login,
            login_count, created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&listener.guid)
    .bind(&listener.name)
    .bind(&listener.email)
    .bind(&listener.password_hash)
    .bind(&listener.username)
    .bind(&listener.bio)
    .bind(&listener.favorite_topic)
    .bind(listener.avatar_id)
    .bind(&listener.avatar_url)
    .bind(listener.notifications)
    .bind(listener.newsletter)
    .bind(listener.episodes_completed)
    .bind(listener.total_time)
    .bind(&listener.status)
    .bind(listener.join_date)
    .bind(listener.last_login)
    .bind(listener.login_count)
    .bind(listener.created_at)
    .bind(listener.updated_at)
    .execute(db)
    .await?;

    Ok(())
}

/// Fetch a listener by guid
pub async fn fetch_listener(db: &SqlitePool, guid: &str) -> Result<Option<Listener>> {
    let listener = sqlx::query_as::<_, Listener>("SELECT * FROM listeners WHERE guid = ?")
        .bind(guid)
        .fetch_optional(db)
        .await?;
    Ok(listener)
}

/// Fetch a listener by (lowercased) email
pub async fn fetch_listener_by_email(db: &SqlitePool, email: &str) -> Result<Option<Listener>> {
    let listener = sqlx::query_as::<_, Listener>("SELECT * FROM listeners WHERE email = ?")
        .bind(email.to_lowercase())
        .fetch_optional(db)
        .await?;
    Ok(listener)
}

/// Full roster, newest account first
pub async fn list_listeners(db: &SqlitePool) -> Result<Vec<Listener>> {
    let listeners =
        sqlx::query_as::<_, Listener>("SELECT * FROM listeners ORDER BY created_at DESC")
            .fetch_all(db)
            .await?;
    Ok(listeners)
}

/// Login bookkeeping: stamp last_login and bump login_count
pub async fn record_login(db: &SqlitePool, guid: &str, now_ms: i64) -> Result<()> {
    sqlx::query(
        "UPDATE listeners SET last_login = ?, login_count = login_count + 1, updated_at = ? WHERE guid = ?",
    )
    .bind(now_ms)
    .bind(now_ms)
    .bind(guid)
    .execute(db)
    .await?;
    Ok(())
}

/// Admin roster patch: status toggle plus optional engagement counters.
/// Returns the updated listener, or None if the guid does not exist.
pub async fn apply_listener_patch(
    db: &SqlitePool,
    guid: &str,
    patch: &ListenerPatch,
    now_ms: i64,
) -> Result<Option<Listener>> {
    let Some(mut listener) = fetch_listener(db, guid).await? else {
        return Ok(None);
    };

    if let Some(status) = &patch.status {
        listener.status = status.clone();
    }
    if let Some(episodes_completed) = patch.episodes_completed {
        listener.episodes_completed = episodes_completed;
    }
    if let Some(total_time) = patch.total_time {
        listener.total_time = total_time;
    }
    listener.updated_at = now_ms;

    sqlx::query(
        r#"
        UPDATE listeners SET
            status = ?, episodes_completed = ?, total_time = ?, updated_at = ?
        WHERE guid = ?
        "#,
    )
    .bind(&listener.status)
    .bind(listener.episodes_completed)
    .bind(listener.total_time)
    .bind(listener.updated_at)
    .bind(guid)
    .execute(db)
    .await?;

    Ok(Some(listener))
}

/// Self-service profile patch
pub async fn apply_profile_patch(
    db: &SqlitePool,
    guid: &str,
    patch: &ProfilePatch,
    now_ms: i64,
) -> Result<Option<Listener>> {
    let Some(mut listener) = fetch_listener(db, guid).await? else {
        return Ok(None);
    };

    if let Some(name) = &patch.name {
        listener.name = name.clone();
    }
    if let Some(username) = &patch.username {
        listener.username = Some(username.clone());
    }
    if let Some(bio) = &patch.bio {
        listener.bio = bio.clone();
    }
    if let Some(favorite_topic) = &patch.favorite_topic {
        listener.favorite_topic = favorite_topic.clone();
    }
    if let Some(avatar_id) = patch.avatar_id {
        listener.avatar_id = avatar_id;
    }
    if let Some(avatar_url) = &patch.avatar_url {
        listener.avatar_url = Some(avatar_url.clone());
    }
    if let Some(notifications) = patch.notifications {
        listener.notifications = notifications;
    }
    if let Some(newsletter) = patch.newsletter {
        listener.newsletter = newsletter;
    }
    listener.updated_at = now_ms;

    sqlx::query(
        r#"
        UPDATE listeners SET
            name = ?, username = ?, bio = ?, favorite_topic = ?, avatar_id = ?,
            avatar_url = ?, notifications = ?, newsletter = ?, updated_at = ?
        WHERE guid = ?
        "#,
    )
    .bind(&listener.name)
    .bind(&listener.username)
    .bind(&listener.bio)
    .bind(&listener.favorite_topic)
    .bind(listener.avatar_id)
    .bind(&listener.avatar_url)
    .bind(listener.notifications)
    .bind(listener.newsletter)
    .bind(listener.updated_at)
    .bind(guid)
    .execute(db)
    .await?;

    Ok(Some(listener))
}

/// Delete a listener row. Returns false if the guid did not exist.
pub async fn delete_listener(db: &SqlitePool, guid: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM listeners WHERE guid = ?")
        .bind(guid)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}
