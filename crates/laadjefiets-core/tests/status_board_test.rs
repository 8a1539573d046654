//! Status board integration tests: backend-first ordering, offline
//! detection and the backend notice.

use std::sync::Arc;

use laadjefiets_core::api::ApiClient;
use laadjefiets_core::auth::MemoryTokenStore;
use laadjefiets_core::models::ServiceState;
use laadjefiets_core::status::{StatusBoard, BACKEND};
use mockito::Server;

fn client_for(base_url: &str) -> ApiClient {
    ApiClient::new(base_url, Arc::new(MemoryTokenStore::new())).expect("Failed to create client")
}

#[tokio::test]
async fn test_refresh_marks_each_service() {
    let mut server = Server::new_async().await;
    for (service, status) in [
        ("backend", "online"),
        ("mysql", "online"),
        ("amafamily", "offline"),
    ] {
        server
            .mock("GET", format!("/api/health/{}", service).as_str())
            .with_status(200)
            .with_body(format!(r#"{{"status": "{}"}}"#, status))
            .create_async()
            .await;
    }
    server
        .mock("GET", "/api/health/broncofanclub")
        .with_status(503)
        .with_body("Service Unavailable")
        .create_async()
        .await;

    let client = client_for(&format!("{}/api", server.url()));
    let mut board = StatusBoard::new();
    board.refresh(&client).await;

    assert_eq!(board.get(BACKEND).unwrap().state, ServiceState::Online);
    assert_eq!(board.get("mysql").unwrap().state, ServiceState::Online);
    assert_eq!(board.get("amafamily").unwrap().state, ServiceState::Offline);

    let bronco = board.get("broncofanclub").unwrap();
    assert_eq!(bronco.state, ServiceState::Offline);
    assert_eq!(bronco.last_error.as_deref(), Some("Unknown error"));

    assert!(board.services().iter().all(|s| !s.checking && s.last_checked.is_some()));
    assert!(!board.backend_offline());
}

#[tokio::test]
async fn test_unreachable_backend_raises_notice() {
    // Nothing listens on port 1
    let client = client_for("http://127.0.0.1:1/api");
    let mut board = StatusBoard::with_services(&[(BACKEND, "Backend")]);

    board.refresh(&client).await;

    assert_eq!(board.get(BACKEND).unwrap().state, ServiceState::Offline);
    assert!(board.get(BACKEND).unwrap().last_error.is_some());
    assert!(board.backend_offline());
}

#[tokio::test]
async fn test_health_results_are_cached_until_refresh() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/health/mysql")
        .with_status(200)
        .with_body(r#"{"status": "online"}"#)
        .expect(2)
        .create_async()
        .await;

    let client = client_for(&format!("{}/api", server.url()));
    client.status().check("mysql").await.unwrap();
    client.status().check("mysql").await.unwrap();
    client.status().refresh("mysql").await.unwrap();

    mock.assert_async().await;
}
