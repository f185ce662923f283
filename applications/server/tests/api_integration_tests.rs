/// API integration tests
/// Tests complete HTTP request/response cycles with a real database
mod common;

use axum::http::{Method, StatusCode};
use common::{create_test_app, create_test_track, send};
use serde_json::json;

/// Test GET /api/health
#[tokio::test]
async fn test_health() {
    let (app, _pool, _temp_dir) = create_test_app().await;

    let (status, body) = send(&app, Method::GET, "/api/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["backends"], json!(["spotify"]));
}

/// Test queue create, get, list and delete
#[tokio::test]
async fn test_queue_crud() {
    let (app, _pool, _temp_dir) = create_test_app().await;

    let (status, queue) = send(
        &app,
        Method::POST,
        "/api/queues",
        Some(json!({"name": "Office", "description": "Shared radio"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = queue["id"].as_i64().unwrap();

    let (status, fetched) = send(&app, Method::GET, &format!("/api/queues/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["name"], "Office");

    let (status, listed) = send(&app, Method::GET, "/api/queues", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, _) = send(&app, Method::DELETE, &format!("/api/queues/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, Method::GET, &format!("/api/queues/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("Queue not found"));
}

/// Test blank queue names are rejected
#[tokio::test]
async fn test_create_queue_requires_name() {
    let (app, _pool, _temp_dir) = create_test_app().await;

    let (status, _) = send(&app, Method::POST, "/api/queues", Some(json!({"name": " "}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

/// Test the player protocol: append, poll head, report state, advance
#[tokio::test]
async fn test_head_protocol() {
    let (app, pool, _temp_dir) = create_test_app().await;
    let first = create_test_track(&pool, "one").await;
    let second = create_test_track(&pool, "two").await;

    let (_, queue) = send(&app, Method::POST, "/api/queues", Some(json!({"name": "Q"}))).await;
    let id = queue["id"].as_i64().unwrap();

    for track in [&first, &second] {
        let (status, appended) = send(
            &app,
            Method::POST,
            &format!("/api/queues/{id}/tracks"),
            Some(json!({"track": track.id})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(appended.as_array().unwrap().len(), 1);
    }

    let (status, head) = send(&app, Method::GET, &format!("/api/queues/{id}/head"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(head["track"]["id"], first.id);
    assert_eq!(head["position"], 1);

    let (status, updated) = send(
        &app,
        Method::PATCH,
        &format!("/api/queues/{id}/head"),
        Some(json!({"id": head["id"], "state": "playing", "time_position": 12345})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["state"], "playing");
    assert_eq!(updated["time_position"], 12345);

    let (_, listing) = send(&app, Method::GET, &format!("/api/queues/{id}/tracks"), None).await;
    assert_eq!(listing[0]["state"], "playing");
    assert_eq!(listing.as_array().unwrap().len(), 2);

    let (status, next) = send(&app, Method::DELETE, &format!("/api/queues/{id}/head"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(next["track"]["id"], second.id);
    assert_eq!(next["position"], 1);

    let (_, track) = send(&app, Method::GET, &format!("/api/tracks/{}", first.id), None).await;
    assert_eq!(track["play_count"], 1);

    let (status, history) =
        send(&app, Method::GET, &format!("/api/queues/{id}/history?limit=10"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history.as_array().unwrap().len(), 2);
}

/// Test empty queues without auto-fill and advancing an empty queue
#[tokio::test]
async fn test_empty_queue_head() {
    let (app, _pool, _temp_dir) = create_test_app().await;
    let (_, queue) = send(&app, Method::POST, "/api/queues", Some(json!({"name": "Q"}))).await;
    let id = queue["id"].as_i64().unwrap();

    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/api/queues/{id}/head?autofill=false"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, &format!("/api/queues/{id}/head"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/api/queues/{id}/head"),
        Some(json!({"state": "paused"})),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());
}

/// Test append body validation
#[tokio::test]
async fn test_append_requires_exactly_one_target() {
    let (app, pool, _temp_dir) = create_test_app().await;
    let track = create_test_track(&pool, "one").await;
    let (_, queue) = send(&app, Method::POST, "/api/queues", Some(json!({"name": "Q"}))).await;
    let uri = format!("/api/queues/{}/tracks", queue["id"]);

    let (status, _) = send(&app, Method::POST, &uri, Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::POST,
        &uri,
        Some(json!({"track": track.id, "playlist": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::POST, &uri, Some(json!({"track": 999}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

/// Test appending a playlist after a single track
#[tokio::test]
async fn test_append_playlist() {
    let (app, pool, _temp_dir) = create_test_app().await;
    let single = create_test_track(&pool, "single").await;

    let (_, queue) = send(&app, Method::POST, "/api/queues", Some(json!({"name": "Q2"}))).await;
    let queue_uri = format!("/api/queues/{}/tracks", queue["id"]);

    let (status, playlist) = send(
        &app,
        Method::POST,
        "/api/playlists",
        Some(json!({"name": "Nine"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let playlist_id = playlist["id"].as_i64().unwrap();

    for source_id in ["p1", "p2", "p3"] {
        let track = create_test_track(&pool, source_id).await;
        let (status, _) = send(
            &app,
            Method::POST,
            &format!("/api/playlists/{playlist_id}/tracks"),
            Some(json!({"track_id": track.id})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, fetched) = send(&app, Method::GET, &format!("/api/playlists/{playlist_id}"), None).await;
    assert_eq!(fetched["tracks"].as_array().unwrap().len(), 3);

    let (_, appended) = send(&app, Method::POST, &queue_uri, Some(json!({"track": single.id}))).await;
    assert_eq!(appended[0]["position"], 1);

    let (status, appended) = send(
        &app,
        Method::POST,
        &queue_uri,
        Some(json!({"playlist": playlist_id})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let positions: Vec<i64> = appended
        .as_array()
        .unwrap()
        .iter()
        .map(|q| q["position"].as_i64().unwrap())
        .collect();
    assert_eq!(positions, vec![2, 3, 4]);
}

/// Test moving and removing queued tracks
#[tokio::test]
async fn test_move_and_remove() {
    let (app, pool, _temp_dir) = create_test_app().await;
    let (_, queue) = send(&app, Method::POST, "/api/queues", Some(json!({"name": "Q"}))).await;
    let id = queue["id"].as_i64().unwrap();

    let mut queued_ids = Vec::new();
    for source_id in ["a", "b", "c"] {
        let track = create_test_track(&pool, source_id).await;
        let (_, appended) = send(
            &app,
            Method::POST,
            &format!("/api/queues/{id}/tracks"),
            Some(json!({"track": track.id})),
        )
        .await;
        queued_ids.push(appended[0]["id"].as_i64().unwrap());
    }

    let (status, moved) = send(
        &app,
        Method::PUT,
        &format!("/api/queues/{id}/tracks/{}", queued_ids[2]),
        Some(json!({"position": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(moved["position"], 1);

    let (_, head) = send(&app, Method::GET, &format!("/api/queues/{id}/head"), None).await;
    assert_eq!(head["id"], queued_ids[2]);

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/queues/{id}/tracks/{}", queued_ids[0]),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, listing) = send(&app, Method::GET, &format!("/api/queues/{id}/tracks"), None).await;
    let listed: Vec<(i64, i64)> = listing
        .as_array()
        .unwrap()
        .iter()
        .map(|q| (q["id"].as_i64().unwrap(), q["position"].as_i64().unwrap()))
        .collect();
    assert_eq!(listed, vec![(queued_ids[2], 1), (queued_ids[1], 2)]);
}

/// Test a head that vanished upstream is replaced
#[tokio::test]
async fn test_vanished_head_is_skipped() {
    let (app, pool, _temp_dir) = create_test_app().await;
    let gone = create_test_track(&pool, "gone-1").await;
    let live = create_test_track(&pool, "live-1").await;
    let (_, queue) = send(&app, Method::POST, "/api/queues", Some(json!({"name": "Q"}))).await;
    let id = queue["id"].as_i64().unwrap();

    for track in [&gone, &live] {
        send(
            &app,
            Method::POST,
            &format!("/api/queues/{id}/tracks"),
            Some(json!({"track": track.id})),
        )
        .await;
    }

    let (status, head) = send(&app, Method::GET, &format!("/api/queues/{id}/head"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(head["track"]["id"], live.id);

    let (status, _) = send(&app, Method::GET, &format!("/api/tracks/{}", gone.id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

/// Test remote and local search
#[tokio::test]
async fn test_search() {
    let (app, pool, _temp_dir) = create_test_app().await;
    create_test_track(&pool, "stored").await;

    let (status, hits) = send(&app, Method::GET, "/api/search?source=spotify&q=lofi&limit=2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(hits.as_array().unwrap().len(), 2);
    assert_eq!(hits[0]["name"], "lofi 0");

    let (status, local) = send(&app, Method::GET, "/api/search?q=stored", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(local[0]["source_id"], "stored");

    let (status, _) = send(&app, Method::GET, "/api/search?source=napster&q=lofi", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::GET, "/api/search?source=youtube&q=lofi", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::GET, "/api/search?source=spotify&q=outage", None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

/// Test importing a backend track
#[tokio::test]
async fn test_import_track() {
    let (app, _pool, _temp_dir) = create_test_app().await;

    let (status, track) = send(
        &app,
        Method::POST,
        "/api/tracks/import",
        Some(json!({"source": "spotify", "source_id": "abc"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(track["name"], "Song abc");
    assert_eq!(track["artists"][0]["name"], "The Band");

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/tracks/import",
        Some(json!({"source": "spotify", "source_id": "gone-2"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
