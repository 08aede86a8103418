//! Integration tests for database initialization and queries

use quietcast_common::db::models::{AudioAttachment, Episode, EpisodePatch, Listener};
use quietcast_common::db::{episodes, init_database, listeners};
use sqlx::SqlitePool;
use tempfile::TempDir;

async fn setup_db() -> (TempDir, SqlitePool) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let pool = init_database(&dir.path().join("quietcast.db"))
        .await
        .expect("init database");
    (dir, pool)
}

fn test_episode(guid: &str, status: &str) -> Episode {
    Episode {
        guid: guid.to_string(),
        title: format!("Episode {}", guid),
        description: "A quiet hour.".to_string(),
        status: status.to_string(),
        upload_date: "2026-03-01T10:00:00Z".to_string(),
        duration: "42:17".to_string(),
        listens: 0,
        topic: "Inner Order".to_string(),
        publish_date: None,
        publish_time: None,
        audio_url: None,
        audio_public_id: None,
        audio_file_name: None,
        audio_size: None,
        audio_duration: None,
        audio_format: None,
        cover_image: None,
        created_by: None,
        is_public: status == "published",
        created_at: 1_000,
        updated_at: 1_000,
    }
}

fn test_listener(guid: &str, email: &str) -> Listener {
    Listener {
        guid: guid.to_string(),
        name: "Ada".to_string(),
        email: email.to_string(),
        password_hash: "$argon2id$test".to_string(),
        username: Some("ada".to_string()),
        bio: "Intentional listener exploring quiet forces.".to_string(),
        favorite_topic: "Inner Order".to_string(),
        avatar_id: 1,
        avatar_url: None,
        notifications: true,
        newsletter: true,
        episodes_completed: 0,
        total_time: 0,
        status: "active".to_string(),
        join_date: 1_000,
        last_login: None,
        login_count: 0,
        created_at: 1_000,
        updated_at: 1_000,
    }
}

#[tokio::test]
async fn init_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("quietcast.db");

    let pool = init_database(&db_path).await.expect("first init");
    drop(pool);

    // Re-opening an existing database must not fail or lose data
    let pool = init_database(&db_path).await.expect("second init");
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM episodes")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn episode_insert_fetch_list() {
    let (_dir, pool) = setup_db().await;

    episodes::insert_episode(&pool, &test_episode("ep-1", "draft"))
        .await
        .unwrap();
    episodes::insert_episode(&pool, &test_episode("ep-2", "published"))
        .await
        .unwrap();

    let fetched = episodes::fetch_episode(&pool, "ep-1").await.unwrap();
    assert_eq!(fetched.unwrap().title, "Episode ep-1");

    let all = episodes::list_episodes(&pool).await.unwrap();
    assert_eq!(all.len(), 2);

    let public = episodes::list_public_episodes(&pool, None).await.unwrap();
    assert_eq!(public.len(), 1);
    assert_eq!(public[0].guid, "ep-2");

    // Topic filter with no matches
    let public = episodes::list_public_episodes(&pool, Some("Other"))
        .await
        .unwrap();
    assert!(public.is_empty());
}

#[tokio::test]
async fn patch_updates_fields_and_bumps_timestamp() {
    let (_dir, pool) = setup_db().await;
    episodes::insert_episode(&pool, &test_episode("ep-1", "draft"))
        .await
        .unwrap();

    let patch = EpisodePatch {
        title: Some("Renamed".to_string()),
        listens: Some(5),
        ..Default::default()
    };
    let updated = episodes::apply_episode_patch(&pool, "ep-1", &patch, 2_000)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.title, "Renamed");
    assert_eq!(updated.listens, 5);
    assert_eq!(updated.updated_at, 2_000);
    // Untouched fields survive
    assert_eq!(updated.topic, "Inner Order");

    // Unknown guid is None
    let missing = episodes::apply_episode_patch(&pool, "nope", &patch, 2_000)
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn published_episode_can_be_hidden() {
    // Visibility is independent of status: published + hidden is representable
    let (_dir, pool) = setup_db().await;
    episodes::insert_episode(&pool, &test_episode("ep-1", "published"))
        .await
        .unwrap();

    let patch = EpisodePatch {
        is_public: Some(false),
        ..Default::default()
    };
    let updated = episodes::apply_episode_patch(&pool, "ep-1", &patch, 2_000)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.status, "published");
    assert!(!updated.is_public);

    // Hidden episodes drop out of the public feed
    let public = episodes::list_public_episodes(&pool, None).await.unwrap();
    assert!(public.is_empty());
}

#[tokio::test]
async fn due_scheduled_matches_past_and_boundary() {
    let (_dir, pool) = setup_db().await;

    let mut yesterday = test_episode("ep-past", "scheduled");
    yesterday.publish_date = Some("2026-02-28".to_string());
    yesterday.publish_time = Some("09:00".to_string());

    let mut today_exact = test_episode("ep-boundary", "scheduled");
    today_exact.publish_date = Some("2026-03-01".to_string());
    today_exact.publish_time = Some("12:00".to_string());

    let mut today_later = test_episode("ep-future", "scheduled");
    today_later.publish_date = Some("2026-03-01".to_string());
    today_later.publish_time = Some("12:01".to_string());

    let mut today_no_time = test_episode("ep-midnight", "scheduled");
    today_no_time.publish_date = Some("2026-03-01".to_string());

    for ep in [&yesterday, &today_exact, &today_later, &today_no_time] {
        episodes::insert_episode(&pool, ep).await.unwrap();
    }

    let due = episodes::due_scheduled(&pool, "2026-03-01", "12:00")
        .await
        .unwrap();
    let mut guids: Vec<&str> = due.iter().map(|e| e.guid.as_str()).collect();
    guids.sort();
    assert_eq!(guids, vec!["ep-boundary", "ep-midnight", "ep-past"]);
}

#[tokio::test]
async fn latest_update_tracks_max_timestamp() {
    let (_dir, pool) = setup_db().await;
    assert_eq!(episodes::latest_update_ms(&pool).await.unwrap(), 0);

    let mut a = test_episode("ep-1", "draft");
    a.updated_at = 1_500;
    let mut b = test_episode("ep-2", "draft");
    b.updated_at = 3_500;
    episodes::insert_episode(&pool, &a).await.unwrap();
    episodes::insert_episode(&pool, &b).await.unwrap();

    assert_eq!(episodes::latest_update_ms(&pool).await.unwrap(), 3_500);
}

#[tokio::test]
async fn listen_counter_increments() {
    let (_dir, pool) = setup_db().await;
    episodes::insert_episode(&pool, &test_episode("ep-1", "published"))
        .await
        .unwrap();

    assert_eq!(
        episodes::increment_listens(&pool, "ep-1", 2_000).await.unwrap(),
        Some(1)
    );
    assert_eq!(
        episodes::increment_listens(&pool, "ep-1", 2_001).await.unwrap(),
        Some(2)
    );
    assert_eq!(
        episodes::increment_listens(&pool, "missing", 2_002)
            .await
            .unwrap(),
        None
    );
}

#[tokio::test]
async fn concurrent_listens_each_see_a_distinct_count() {
    let (_dir, pool) = setup_db().await;
    episodes::insert_episode(&pool, &test_episode("ep-1", "published"))
        .await
        .unwrap();

    let mut handles = Vec::new();
    for i in 0..5 {
        let pool = pool.clone();
        handles.push(tokio::spawn(async move {
            episodes::increment_listens(&pool, "ep-1", 2_000 + i)
                .await
                .unwrap()
                .unwrap()
        }));
    }

    let mut counts = Vec::new();
    for handle in handles {
        counts.push(handle.await.unwrap());
    }
    counts.sort_unstable();
    assert_eq!(counts, vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn attach_audio_auto_publishes() {
    let (_dir, pool) = setup_db().await;
    episodes::insert_episode(&pool, &test_episode("ep-1", "draft"))
        .await
        .unwrap();

    let audio = AudioAttachment {
        url: "https://media.example/audio/ep-1.mp3".to_string(),
        public_id: "quietcast/audio/ep-1".to_string(),
        file_name: "ep-1.mp3".to_string(),
        size: 12_345,
        duration: Some(2537.0),
        format: Some("mp3".to_string()),
    };

    let updated = episodes::attach_audio(&pool, "ep-1", &audio, 2_000)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.status, "published");
    assert!(updated.is_public);
    assert_eq!(updated.audio_public_id.as_deref(), Some("quietcast/audio/ep-1"));
}

#[tokio::test]
async fn listener_email_is_unique() {
    let (_dir, pool) = setup_db().await;
    listeners::insert_listener(&pool, &test_listener("l-1", "ada@example.com"))
        .await
        .unwrap();

    let duplicate =
        listeners::insert_listener(&pool, &test_listener("l-2", "ada@example.com")).await;
    assert!(duplicate.is_err());
}

#[tokio::test]
async fn listener_login_and_patches() {
    let (_dir, pool) = setup_db().await;
    listeners::insert_listener(&pool, &test_listener("l-1", "ada@example.com"))
        .await
        .unwrap();

    listeners::record_login(&pool, "l-1", 5_000).await.unwrap();
    listeners::record_login(&pool, "l-1", 6_000).await.unwrap();

    let listener = listeners::fetch_listener(&pool, "l-1").await.unwrap().unwrap();
    assert_eq!(listener.login_count, 2);
    assert_eq!(listener.last_login, Some(6_000));

    let patch = quietcast_common::db::models::ListenerPatch {
        status: Some("inactive".to_string()),
        episodes_completed: Some(12),
        total_time: None,
    };
    let updated = listeners::apply_listener_patch(&pool, "l-1", &patch, 7_000)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.status, "inactive");
    assert_eq!(updated.episodes_completed, 12);
    assert_eq!(updated.total_time, 0);

    assert!(listeners::delete_listener(&pool, "l-1").await.unwrap());
    assert!(!listeners::delete_listener(&pool, "l-1").await.unwrap());
}
