//! Integration tests for playlists and users

mod test_helpers;

use jukebox_core::types::*;
use jukebox_core::JukeboxError;
use test_helpers::*;

#[tokio::test]
async fn test_create_and_get_playlist_with_tracks() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let owner = create_test_user(pool, "alice").await;
    let playlist = jukebox_storage::playlists::create(
        pool,
        CreatePlaylist {
            name: "Road Trip".to_string(),
            description: Some("Long drives".to_string()),
            owner_id: Some(owner),
        },
    )
    .await
    .expect("Failed to create playlist");

    assert_eq!(playlist.name, "Road Trip");
    assert_eq!(playlist.owner_id, Some(owner));
    assert!(playlist.tracks.is_none());

    let a = create_test_track(pool, "a", "A").await;
    let b = create_test_track(pool, "b", "B").await;

    assert!(jukebox_storage::playlists::add_track(pool, playlist.id, b.id).await.unwrap());
    assert!(jukebox_storage::playlists::add_track(pool, playlist.id, a.id).await.unwrap());
    // Duplicates are ignored
    assert!(!jukebox_storage::playlists::add_track(pool, playlist.id, b.id).await.unwrap());

    let ids = jukebox_storage::playlists::track_ids(pool, playlist.id).await.unwrap();
    assert_eq!(ids, vec![b.id, a.id]);

    let full = jukebox_storage::playlists::get_with_tracks(pool, playlist.id)
        .await
        .unwrap()
        .unwrap();
    let tracks = full.tracks.unwrap();
    assert_eq!(tracks.len(), 2);
    assert_eq!(tracks[0].position, 1);
    assert_eq!(tracks[0].name.as_deref(), Some("B"));
    assert_eq!(tracks[1].duration_ms, Some(200_000));
}

#[tokio::test]
async fn test_add_track_to_missing_playlist() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let track = create_test_track(pool, "a", "A").await;
    let err = jukebox_storage::playlists::add_track(pool, 42, track.id)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_delete_playlist() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let playlist = jukebox_storage::playlists::create(
        pool,
        CreatePlaylist {
            name: "Temp".to_string(),
            description: None,
            owner_id: None,
        },
    )
    .await
    .unwrap();

    jukebox_storage::playlists::delete(pool, playlist.id).await.unwrap();
    assert!(jukebox_storage::playlists::get_by_id(pool, playlist.id).await.unwrap().is_none());
    assert!(jukebox_storage::playlists::delete(pool, playlist.id).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_users() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let bob = jukebox_storage::users::create(pool, " bob ").await.unwrap();
    jukebox_storage::users::create(pool, "alice").await.unwrap();

    assert_eq!(bob.name, "bob");
    assert_eq!(
        jukebox_storage::users::get_by_id(pool, bob.id).await.unwrap().unwrap().name,
        "bob"
    );

    let names: Vec<String> = jukebox_storage::users::get_all(pool)
        .await
        .unwrap()
        .into_iter()
        .map(|user| user.name)
        .collect();
    assert_eq!(names, vec!["alice", "bob"]);

    // Names are unique
    let err = jukebox_storage::users::create(pool, "bob").await.unwrap_err();
    assert!(matches!(err, JukeboxError::RecordNotSaved { .. }));

    let err = jukebox_storage::users::create(pool, "").await.unwrap_err();
    assert!(matches!(err, JukeboxError::InvalidInput(_)));
}
