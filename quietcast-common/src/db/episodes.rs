//! Episode queries

use crate::db::models::{AudioAttachment, Episode, EpisodePatch};
use crate::Result;
use sqlx::SqlitePool;

/// Insert a new episode row
pub async fn insert_episode(db: &SqlitePool, episode: &Episode) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO episodes (
            guid, title, description, status, upload_date, duration, listens,
            topic, publish_date, publish_time, audio_url, audio_public_id,
            audio_file_name, audio_size, audio_duration, audio_format,
            cover_image, created_by, is_public, created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&episode.guid)
    .bind(&episode.title)
    .bind(&episode.description)
    .bind(&episode.status)
    .bind(&episode.upload_date)
    .bind(&episode.duration)
    .bind(episode.listens)
    .bind(&episode.topic)
    .bind(&episode.publish_date)
    .bind(&episode.publish_time)
    .bind(&episode.audio_url)
    .bind(&episode.audio_public_id)
    .bind(&episode.audio_file_name)
    .bind(episode.audio_size)
    .bind(episode.audio_duration)
    .bind(&episode.audio_format)
    .bind(&episode.cover_image)
    .bind(&episode.created_by)
    .bind(episode.is_public)
    .bind(episode.created_at)
    .bind(episode.updated_at)
    .execute(db)
    .await?;

    Ok(())
}

/// Fetch a single episode by guid
pub async fn fetch_episode(db: &SqlitePool, guid: &str) -> Result<Option<Episode>> {
    let episode = sqlx::query_as::<_, Episode>("SELECT * FROM episodes WHERE guid = ?")
        .bind(guid)
        .fetch_optional(db)
        .await?;
    Ok(episode)
}

/// All episodes, newest upload first (admin view)
pub async fn list_episodes(db: &SqlitePool) -> Result<Vec<Episode>> {
    let episodes =
        sqlx::query_as::<_, Episode>("SELECT * FROM episodes ORDER BY upload_date DESC")
            .fetch_all(db)
            .await?;
    Ok(episodes)
}

/// Published AND public episodes, optionally filtered by topic (listener view)
pub async fn list_public_episodes(db: &SqlitePool, topic: Option<&str>) -> Result<Vec<Episode>> {
    let episodes = match topic {
        Some(topic) => {
            sqlx::query_as::<_, Episode>(
                r#"
                SELECT * FROM episodes
                WHERE status = 'published' AND is_public = 1 AND topic = ?
                ORDER BY upload_date DESC
                "#,
            )
            .bind(topic)
            .fetch_all(db)
            .await?
        }
        None => {
            sqlx::query_as::<_, Episode>(
                r#"
                SELECT * FROM episodes
                WHERE status = 'published' AND is_public = 1
                ORDER BY upload_date DESC
                "#,
            )
            .fetch_all(db)
            .await?
        }
    };
    Ok(episodes)
}

/// Apply a field-level partial update. Absent patch fields are unchanged.
/// Returns the updated episode, or None if the guid does not exist.
pub async fn apply_episode_patch(
    db: &SqlitePool,
    guid: &str,
    patch: &EpisodePatch,
    now_ms: i64,
) -> Result<Option<Episode>> {
    let Some(mut episode) = fetch_episode(db, guid).await? else {
        return Ok(None);
    };

    if let Some(title) = &patch.title {
        episode.title = title.clone();
    }
    if let Some(description) = &patch.description {
        episode.description = description.clone();
    }
    if let Some(status) = &patch.status {
        episode.status = status.clone();
    }
    if let Some(duration) = &patch.duration {
        episode.duration = duration.clone();
    }
    if let Some(topic) = &patch.topic {
        episode.topic = topic.clone();
    }
    if let Some(publish_date) = &patch.publish_date {
        episode.publish_date = Some(publish_date.clone());
    }
    if let Some(publish_time) = &patch.publish_time {
        episode.publish_time = Some(publish_time.clone());
    }
    if let Some(listens) = patch.listens {
        episode.listens = listens;
    }
    if let Some(cover_image) = &patch.cover_image {
        episode.cover_image = Some(cover_image.clone());
    }
    if let Some(is_public) = patch.is_public {
        episode.is_public = is_public;
    }
    episode.updated_at = now_ms;

    sqlx::query(
        r#"
        UPDATE episodes SET
            title = ?, description = ?, status = ?, duration = ?, topic = ?,
            publish_date = ?, publish_time = ?, listens = ?, cover_image = ?,
            is_public = ?, updated_at = ?
        WHERE guid = ?
        "#,
    )
    .bind(&episode.title)
    .bind(&episode.description)
    .bind(&episode.status)
    .bind(&episode.duration)
    .bind(&episode.topic)
    .bind(&episode.publish_date)
    .bind(&episode.publish_time)
    .bind(episode.listens)
    .bind(&episode.cover_image)
    .bind(episode.is_public)
    .bind(episode.updated_at)
    .bind(guid)
    .execute(db)
    .await?;

    Ok(Some(episode))
}

/// Attach an uploaded media reference and auto-publish the episode
pub async fn attach_audio(
    db: &SqlitePool,
    guid: &str,
    audio: &AudioAttachment,
    now_ms: i64,
) -> Result<Option<Episode>> {
    let result = sqlx::query(
        r#"
        UPDATE episodes SET
            audio_url = ?, audio_public_id = ?, audio_file_name = ?,
            audio_size = ?, audio_duration = ?, audio_format = ?,
            status = 'published', is_public = 1, updated_at = ?
        WHERE guid = ?
        "#,
    )
    .bind(&audio.url)
    .bind(&audio.public_id)
    .bind(&audio.file_name)
    .bind(audio.size)
    .bind(audio.duration)
    .bind(&audio.format)
    .bind(now_ms)
    .bind(guid)
    .execute(db)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    fetch_episode(db, guid).await
}

/// Delete an episode row. Returns false if the guid did not exist.
pub async fn delete_episode(db: &SqlitePool, guid: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM episodes WHERE guid = ?")
        .bind(guid)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Most recent updated_at across all episodes (0 when the table is empty).
/// This is the value the check-only polling endpoint reports.
pub async fn latest_update_ms(db: &SqlitePool) -> Result<i64> {
    let latest: Option<i64> = sqlx::query_scalar("SELECT MAX(updated_at) FROM episodes")
        .fetch_one(db)
        .await?;
    Ok(latest.unwrap_or(0))
}

/// Scheduled episodes whose publish instant has passed: either the date is
/// already behind us, or it is today and the time (midnight when absent)
/// is not in the future.
pub async fn due_scheduled(db: &SqlitePool, date: &str, time: &str) -> Result<Vec<Episode>> {
    let episodes = sqlx::query_as::<_, Episode>(
        r#"
        SELECT * FROM episodes
        WHERE status = 'scheduled'
          AND (
            publish_date < ?
            OR (publish_date = ? AND COALESCE(publish_time, '00:00') <= ?)
          )
        "#,
    )
    .bind(date)
    .bind(date)
    .bind(time)
    .fetch_all(db)
    .await?;
    Ok(episodes)
}

/// Flip one episode to published and public
pub async fn mark_published(db: &SqlitePool, guid: &str, now_ms: i64) -> Result<()> {
    sqlx::query(
        "UPDATE episodes SET status = 'published', is_public = 1, updated_at = ? WHERE guid = ?",
    )
    .bind(now_ms)
    .bind(guid)
    .execute(db)
    .await?;
    Ok(())
}

/// Increment the denormalized listen counter, returning the new count.
/// The RETURNING clause makes the read-back atomic with the update, so
/// concurrent listens each observe a distinct count.
pub async fn increment_listens(db: &SqlitePool, guid: &str, now_ms: i64) -> Result<Option<i64>> {
    let listens: Option<i64> = sqlx::query_scalar(
        "UPDATE episodes SET listens = listens + 1, updated_at = ? WHERE guid = ? RETURNING listens",
    )
    .bind(now_ms)
    .bind(guid)
    .fetch_optional(db)
    .await?;
    Ok(listens)
}
