//! Store behaviour against a mocked backend.

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use stream_overlay::api::ApiClient;
use stream_overlay::overlay::Overlay;
use stream_overlay::store::Store;

async fn setup() -> (MockServer, Store) {
    let server = MockServer::start().await;
    let api = ApiClient::new(&format!("{}/api", server.uri())).unwrap();
    (server, Store::new(api))
}

fn saved(id: &str, name: &str) -> serde_json::Value {
    json!({
        "_id": id,
        "name": name,
        "type": "text",
        "content": "Hello",
        "position": {"x": 10, "y": 10},
        "size": {"width": 30, "height": 10},
        "style": {"color": "#ffffff", "fontSize": "24px", "zIndex": 1}
    })
}

#[tokio::test]
async fn test_start_then_stop_stream() {
    let (server, store) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/stream/start"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Stream started",
            "hlsUrl": "/static/stream.m3u8"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/stream/stop"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Stream stopped"})))
        .mount(&server)
        .await;

    store.start_stream("rtsp://camera.local/live").await.unwrap();
    let state = store.state();
    assert!(state.is_stream_active);
    assert_eq!(state.stream_url.as_deref(), Some("/static/stream.m3u8"));
    assert!(!state.loading);
    assert!(state.error.is_none());

    store.stop_stream().await.unwrap();
    let state = store.state();
    assert!(!state.is_stream_active);
    assert!(state.stream_url.is_none());
    assert!(!state.loading);
}

#[tokio::test]
async fn test_failed_start_keeps_state_and_records_error() {
    let (server, store) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/stream/start"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"error": "FFmpeg failed to start"})),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/stream/start"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Stream started",
            "hlsUrl": "/static/stream.m3u8"
        })))
        .mount(&server)
        .await;

    let err = store.start_stream("rtsp://camera.local/live").await.unwrap_err();
    assert_eq!(err.to_string(), "FFmpeg failed to start");

    let state = store.state();
    assert!(!state.is_stream_active);
    assert!(state.stream_url.is_none());
    assert!(!state.loading);
    assert_eq!(state.error.as_deref(), Some("FFmpeg failed to start"));

    // The next action clears the previous error.
    store.start_stream("rtsp://camera.local/live").await.unwrap();
    let state = store.state();
    assert!(state.error.is_none());
    assert!(state.is_stream_active);
}

#[tokio::test]
async fn test_save_refreshes_saved_list() {
    let (server, store) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/overlays"))
        .respond_with(ResponseTemplate::new(201).set_body_json(saved("1", "Title")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/overlays"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([saved("1", "Title")])))
        .expect(1)
        .mount(&server)
        .await;

    let overlay = Overlay::text("Title", "Hello").at(10.0, 10.0).sized(30.0, 10.0);
    let stored = store.save_overlay(&overlay).await.unwrap();
    assert_eq!(stored.id.as_deref(), Some("1"));

    let state = store.state();
    assert_eq!(state.saved_overlays.len(), 1);
    assert!(state.saved_by_id("1").unwrap().same_content(&overlay));
    assert!(!state.loading);
}

#[tokio::test]
async fn test_failed_save_keeps_saved_list() {
    let (server, store) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/overlays"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([saved("1", "Title")])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/overlays"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"error": "Invalid overlay"})))
        .mount(&server)
        .await;

    store.fetch_saved_overlays().await.unwrap();
    let before = store.state().saved_overlays;

    let err = store
        .save_overlay(&Overlay::text("Other", "x"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Invalid overlay");

    let state = store.state();
    assert_eq!(state.saved_overlays, before);
    assert_eq!(state.error.as_deref(), Some("Invalid overlay"));
}

#[tokio::test]
async fn test_delete_refreshes_saved_list() {
    let (server, store) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/overlays"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([saved("1", "a"), saved("2", "b")])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/overlays"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([saved("2", "b")])))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/overlays/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Overlay deleted successfully"})))
        .expect(1)
        .mount(&server)
        .await;

    store.fetch_saved_overlays().await.unwrap();
    assert_eq!(store.state().saved_overlays.len(), 2);

    store.delete_overlay("1").await.unwrap();
    let state = store.state();
    assert_eq!(state.saved_overlays.len(), 1);
    assert!(state.saved_by_id("1").is_none());
}

#[tokio::test]
async fn test_initialize_restores_active_stream() {
    let (server, store) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/stream/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "isActive": true,
            "hlsUrl": "/static/stream.m3u8"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/overlays"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([saved("1", "Title")])))
        .expect(1)
        .mount(&server)
        .await;

    store.initialize().await;
    let state = store.state();
    assert!(state.is_stream_active);
    assert_eq!(state.stream_url.as_deref(), Some("/static/stream.m3u8"));
    assert_eq!(state.saved_overlays.len(), 1);
    assert!(state.error.is_none());
    assert!(!state.loading);
}

#[tokio::test]
async fn test_initialize_tolerates_status_failure() {
    let (server, store) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/stream/status"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/overlays"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    store.initialize().await;
    let state = store.state();
    assert!(!state.is_stream_active);
    assert!(state.stream_url.is_none());
    // A failed status check is not surfaced as a user-facing error.
    assert!(state.error.is_none());
}

#[tokio::test]
async fn test_status_inactive_clears_url() {
    let (server, store) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/stream/start"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"hlsUrl": "/static/stream.m3u8"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/stream/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"isActive": false, "hlsUrl": null})))
        .mount(&server)
        .await;

    store.start_stream("rtsp://camera.local/live").await.unwrap();
    store.check_stream_status().await.unwrap();

    let state = store.state();
    assert!(!state.is_stream_active);
    assert!(state.stream_url.is_none());
}

#[tokio::test]
async fn test_subscriber_sees_loading_cleared() {
    let (server, store) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/overlays"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let mut rx = store.subscribe();
    store.fetch_saved_overlays().await.unwrap();
    assert!(rx.has_changed().unwrap());
    assert!(!rx.borrow_and_update().loading);
}

#[tokio::test]
async fn test_fetch_keeps_documents_with_odd_z_index() {
    let (server, store) = setup().await;

    let mut odd = saved("2", "Odd");
    odd["style"]["zIndex"] = json!(2.0);
    let mut negative = saved("3", "Negative");
    negative["style"]["zIndex"] = json!(-1);
    Mock::given(method("GET"))
        .and(path("/api/overlays"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([saved("1", "Good"), odd, negative])),
        )
        .mount(&server)
        .await;

    let overlays = store.fetch_saved_overlays().await.unwrap();
    assert_eq!(overlays.len(), 3);

    let state = store.state();
    assert!(state.error.is_none());
    assert_eq!(state.saved_by_id("2").unwrap().style.z_index, 2);
    assert_eq!(state.saved_by_id("3").unwrap().style.z_index, 1);
}

#[tokio::test]
async fn test_update_refreshes_saved_list() {
    let (server, store) = setup().await;

    let mut renamed = saved("1", "Renamed");
    renamed["content"] = json!("Updated");
    Mock::given(method("PUT"))
        .and(path("/api/overlays/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(renamed.clone()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/overlays"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([renamed, saved("2", "Other")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let overlay = Overlay::text("Renamed", "Updated").at(10.0, 10.0).sized(30.0, 10.0);
    let updated = store.update_overlay("1", &overlay).await.unwrap();
    assert_eq!(updated.id.as_deref(), Some("1"));
    assert!(updated.same_content(&overlay));

    let state = store.state();
    assert_eq!(state.saved_overlays.len(), 2);
    assert_eq!(state.saved_by_id("1").unwrap().name, "Renamed");
    assert!(!state.loading);
    assert!(state.error.is_none());
}

#[tokio::test]
async fn test_failed_update_keeps_saved_list() {
    let (server, store) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/overlays"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([saved("1", "Title")])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/overlays/1"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "Overlay not found"})))
        .mount(&server)
        .await;

    store.fetch_saved_overlays().await.unwrap();
    let before = store.state().saved_overlays;

    let err = store
        .update_overlay("1", &Overlay::text("Title", "Changed"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Overlay not found");

    let state = store.state();
    assert_eq!(state.saved_overlays, before);
    assert_eq!(state.error.as_deref(), Some("Overlay not found"));
    assert!(!state.loading);
}
