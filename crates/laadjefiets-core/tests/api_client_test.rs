//! Integration tests for the API client against a mock HTTP server.
//!
//! Covers header construction, error message extraction, response caching
//! and cache invalidation by mutating calls.

use std::sync::Arc;

use laadjefiets_core::api::{ApiClient, ApiError, RequestOptions};
use laadjefiets_core::auth::{MemoryTokenStore, TokenStore};
use laadjefiets_core::models::{Credentials, NewLocation, NewSocket, Registration, Role};
use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;

async fn setup(token: Option<&str>) -> (ServerGuard, ApiClient, Arc<MemoryTokenStore>) {
    let server = Server::new_async().await;
    let store = Arc::new(match token {
        Some(t) => MemoryTokenStore::with_token(t),
        None => MemoryTokenStore::new(),
    });
    let client = ApiClient::new(&format!("{}/api", server.url()), store.clone())
        .expect("Failed to create client");
    (server, client, store)
}

fn sockets_body() -> String {
    json!([
        {"id": 1, "socket_id": "A1", "name": "Voordeur", "status": "Beschikbaar"},
        {"id": 2, "socket_id": 42, "location": "Utrecht"}
    ])
    .to_string()
}

#[tokio::test]
async fn test_authorization_header_sent_when_token_stored() {
    let (mut server, client, _) = setup(Some("abc")).await;
    let mock = server
        .mock("GET", "/api/user")
        .match_header("authorization", "Bearer abc")
        .match_header("content-type", "application/json")
        .with_status(200)
        .with_body(r#"{"id": 7, "username": "imad", "role": "Admin"}"#)
        .create_async()
        .await;

    let user = client.user().get().await.expect("profile fetch failed");
    assert_eq!(user.id, 7);
    assert_eq!(user.role, Role::Admin);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_no_authorization_header_without_token() {
    let (mut server, client, _) = setup(None).await;
    let mock = server
        .mock("GET", "/api/health/backend")
        .match_header("authorization", Matcher::Missing)
        .with_status(200)
        .with_body(r#"{"status": "online"}"#)
        .create_async()
        .await;

    let report = client.status().check("backend").await.expect("health check failed");
    assert!(report.is_online());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_caller_header_overrides_default() {
    let (mut server, client, _) = setup(Some("stored")).await;
    let mock = server
        .mock("GET", "/api/user")
        .match_header("authorization", "Bearer other")
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let options = RequestOptions::get().header(
        reqwest::header::AUTHORIZATION,
        reqwest::header::HeaderValue::from_static("Bearer other"),
    );
    client.request("/user", options).await.expect("request failed");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_error_message_from_json_body() {
    let (mut server, client, _) = setup(Some("abc")).await;
    server
        .mock("POST", "/api/login")
        .with_status(401)
        .with_body(r#"{"message": "Invalid credentials"}"#)
        .create_async()
        .await;

    let err = client
        .user()
        .login(&Credentials {
            username: "imad".to_string(),
            password: "wrong".to_string(),
        })
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Invalid credentials");
    assert!(err.is_unauthorized());
}

#[tokio::test]
async fn test_error_fallback_messages() {
    let (mut server, client, _) = setup(None).await;
    server
        .mock("GET", "/api/credits/balance")
        .with_status(500)
        .with_body("<html>Internal Server Error</html>")
        .create_async()
        .await;
    server
        .mock("GET", "/api/locations/user/3")
        .with_status(404)
        .with_body(r#"{"error": "not found"}"#)
        .create_async()
        .await;

    let err = client.credits().balance().await.unwrap_err();
    assert_eq!(err.message(), "Unknown error");
    assert_eq!(err.status().map(|s| s.as_u16()), Some(500));

    let err = client.locations().for_user(3).await.unwrap_err();
    assert_eq!(err.message(), "API request failed");
}

#[tokio::test]
async fn test_login_stores_token_and_profile_is_cached() {
    let (mut server, client, store) = setup(None).await;
    server
        .mock("POST", "/api/login")
        .match_body(Matcher::Json(json!({"username": "imad", "password": "geheim"})))
        .with_status(200)
        .with_body(r#"{"token": "t-123"}"#)
        .create_async()
        .await;
    let profile = server
        .mock("GET", "/api/user")
        .match_header("authorization", "Bearer t-123")
        .with_status(200)
        .with_body(r#"{"id": 3, "username": "imad"}"#)
        .expect(1)
        .create_async()
        .await;

    client
        .user()
        .login(&Credentials {
            username: "imad".to_string(),
            password: "geheim".to_string(),
        })
        .await
        .expect("login failed");
    assert_eq!(store.load().unwrap().as_deref(), Some("t-123"));

    let first = client.user().get().await.unwrap();
    let second = client.user().get().await.unwrap();
    assert_eq!(first.username, second.username);
    profile.assert_async().await;
}

#[tokio::test]
async fn test_socket_create_invalidates_list() {
    let (mut server, client, _) = setup(Some("abc")).await;
    let list = server
        .mock("POST", "/api/sockets")
        .with_status(200)
        .with_body(sockets_body())
        .expect(2)
        .create_async()
        .await;
    let create = server
        .mock("POST", "/api/socket/new")
        .match_body(Matcher::PartialJson(json!({"socket_id": "B7"})))
        .with_status(201)
        .with_body(r#"{"message": "Socket aangemaakt"}"#)
        .create_async()
        .await;

    let sockets = client.sockets().get_all().await.unwrap();
    assert_eq!(sockets.len(), 2);
    assert_eq!(sockets[1].socket_id, "42");
    assert_eq!(sockets[1].display_name(), "Laadstation 42");

    // Served from cache
    client.sockets().get_all().await.unwrap();

    let ack = client
        .sockets()
        .create(&NewSocket {
            socket_id: "B7".to_string(),
            name: None,
            location_id: None,
        })
        .await
        .unwrap();
    assert_eq!(ack.message.as_deref(), Some("Socket aangemaakt"));

    // Cache was cleared, so this refetches
    client.sockets().get_all().await.unwrap();

    list.assert_async().await;
    create.assert_async().await;
}

#[tokio::test]
async fn test_session_start_clears_socket_cache() {
    let (mut server, client, _) = setup(Some("abc")).await;
    let list = server
        .mock("POST", "/api/sockets")
        .with_status(200)
        .with_body(r#"{"data": []}"#)
        .expect(2)
        .create_async()
        .await;
    let start = server
        .mock("POST", "/api/3/socket/start/A1")
        .match_body(Matcher::Json(json!({"socket_id": "A1"})))
        .with_status(200)
        .with_body("")
        .create_async()
        .await;

    client.sockets().get_all().await.unwrap();
    let ack = client.sessions().start(3, "A1").await.unwrap();
    assert!(ack.message.is_none());
    client.sockets().get_all().await.unwrap();

    list.assert_async().await;
    start.assert_async().await;
}

#[tokio::test]
async fn test_empty_body_delete_succeeds() {
    let (mut server, client, _) = setup(Some("abc")).await;
    let mock = server
        .mock("DELETE", "/api/socket/delete/9")
        .with_status(204)
        .create_async()
        .await;

    client.sockets().delete("9").await.expect("delete failed");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_decode_error_is_not_cached() {
    let (mut server, client, _) = setup(Some("abc")).await;
    let mock = server
        .mock("GET", "/api/user")
        .with_status(200)
        .with_body(r#"{"unexpected": true}"#)
        .expect(2)
        .create_async()
        .await;

    let err = client.user().get().await.unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
    assert!(client.cache().get("user").is_none());

    client.user().get().await.unwrap_err();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_logout_clears_local_session_even_on_failure() {
    let (mut server, client, store) = setup(Some("abc")).await;
    server
        .mock("POST", "/api/logout")
        .with_status(500)
        .with_body(r#"{"message": "Session store unavailable"}"#)
        .create_async()
        .await;
    client
        .cache()
        .set("user", json!({"id": 1, "username": "x"}), std::time::Duration::from_secs(30));

    let err = client.user().logout().await.unwrap_err();
    assert_eq!(err.message(), "Session store unavailable");
    assert_eq!(store.load().unwrap(), None);
    assert!(client.cache().is_empty());
    assert!(!client.has_token());
}

#[tokio::test]
async fn test_credits_add_returns_refreshed_balance() {
    let (mut server, client, _) = setup(Some("abc")).await;
    let add = server
        .mock("POST", "/api/credits/balance/add")
        .match_query(Matcher::UrlEncoded("amount".into(), "20".into()))
        .match_body(Matcher::Json(json!({"amount": 20})))
        .with_status(200)
        .with_body(r#"{"message": "ok"}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/api/credits/balance")
        .with_status(200)
        .with_body(r#"{"balance": "32.50"}"#)
        .create_async()
        .await;

    let balance = client.credits().add(20).await.unwrap();
    assert_eq!(balance.display(), "€ 32.50");
    add.assert_async().await;
}

#[tokio::test]
async fn test_users_update_invalidates_user_lists() {
    let (mut server, client, _) = setup(Some("abc")).await;
    let list = server
        .mock("GET", "/api/users")
        .with_status(200)
        .with_body(r#"[{"id": 1, "username": "admin", "role": "Admin"}]"#)
        .expect(2)
        .create_async()
        .await;
    server
        .mock("PUT", "/api/users/1")
        .with_status(200)
        .with_body(r#"{"message": "Gebruiker bijgewerkt"}"#)
        .create_async()
        .await;

    client.users().get_all().await.unwrap();
    client.users().get_all().await.unwrap();
    client
        .users()
        .update(
            1,
            &laadjefiets_core::models::UserUpdate {
                email: Some("admin@laadjefiets.nl".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    client.users().get_all().await.unwrap();

    list.assert_async().await;
}

#[tokio::test]
async fn test_socket_delete_and_delete_all_invalidate_list() {
    let (mut server, client, _) = setup(Some("abc")).await;
    let list = server
        .mock("POST", "/api/sockets")
        .with_status(200)
        .with_body(sockets_body())
        .expect(3)
        .create_async()
        .await;
    let delete = server
        .mock("DELETE", "/api/socket/delete/A1")
        .with_status(204)
        .create_async()
        .await;
    let delete_all = server
        .mock("DELETE", "/api/sockets/delete-all")
        .with_status(200)
        .with_body(r#"{"message": "Alle laadpalen verwijderd"}"#)
        .create_async()
        .await;

    client.sockets().get_all().await.unwrap();
    client.sockets().get_all().await.unwrap();

    client.sockets().delete("A1").await.unwrap();
    client.sockets().get_all().await.unwrap();

    client.sockets().delete_all().await.unwrap();
    client.sockets().get_all().await.unwrap();

    list.assert_async().await;
    delete.assert_async().await;
    delete_all.assert_async().await;
}

#[tokio::test]
async fn test_users_delete_invalidates_user_list() {
    let (mut server, client, _) = setup(Some("abc")).await;
    let list = server
        .mock("GET", "/api/users")
        .with_status(200)
        .with_body(r#"[{"id": 1, "username": "admin"}, {"id": 2, "username": "imad"}]"#)
        .expect(2)
        .create_async()
        .await;
    server
        .mock("DELETE", "/api/users/2")
        .with_status(200)
        .with_body(r#"{"message": "Gebruiker verwijderd"}"#)
        .create_async()
        .await;

    client.users().get_all().await.unwrap();
    client.users().get_all().await.unwrap();

    let ack = client.users().delete(2).await.unwrap();
    assert_eq!(ack.message.as_deref(), Some("Gebruiker verwijderd"));
    client.users().get_all().await.unwrap();

    list.assert_async().await;
}

#[tokio::test]
async fn test_account_delete_removes_token_and_cache() {
    let (mut server, client, store) = setup(Some("abc")).await;
    let profile = server
        .mock("GET", "/api/user")
        .with_status(200)
        .with_body(r#"{"id": 3, "username": "imad"}"#)
        .expect(1)
        .create_async()
        .await;
    let delete = server
        .mock("DELETE", "/api/user/delete")
        .match_header("authorization", "Bearer abc")
        .with_status(200)
        .with_body(r#"{"message": "Account verwijderd"}"#)
        .create_async()
        .await;

    client.user().get().await.unwrap();
    assert!(!client.cache().is_empty());

    client.user().delete().await.unwrap();

    assert_eq!(store.load().unwrap(), None);
    assert!(!client.has_token());
    assert!(client.cache().is_empty());
    profile.assert_async().await;
    delete.assert_async().await;
}

#[tokio::test]
async fn test_failed_account_delete_keeps_token() {
    let (mut server, client, store) = setup(Some("abc")).await;
    server
        .mock("DELETE", "/api/user/delete")
        .with_status(500)
        .with_body(r#"{"message": "Verwijderen mislukt"}"#)
        .create_async()
        .await;

    let err = client.user().delete().await.unwrap_err();
    assert_eq!(err.message(), "Verwijderen mislukt");
    assert_eq!(store.load().unwrap().as_deref(), Some("abc"));
}

#[tokio::test]
async fn test_register_posts_email_and_password() {
    let (mut server, client, store) = setup(None).await;
    let mock = server
        .mock("POST", "/api/register")
        .match_header("authorization", Matcher::Missing)
        .match_body(Matcher::Json(json!({"email": "a@b.nl", "password": "geheim"})))
        .with_status(201)
        .with_body(r#"{"message": "Account aangemaakt"}"#)
        .create_async()
        .await;

    let response = client
        .user()
        .register(&Registration {
            email: "a@b.nl".to_string(),
            password: "geheim".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(response["message"], "Account aangemaakt");
    // Registering does not sign in
    assert_eq!(store.load().unwrap(), None);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_admin_socket_list_with_owners() {
    let (mut server, client, _) = setup(Some("admin")).await;
    let all = server
        .mock("POST", "/api/allsockets")
        .with_status(200)
        .with_body(r#"{"data": [{"socket_id": "A1"}, {"socket_id": 7}]}"#)
        .expect(2)
        .create_async()
        .await;
    let bulk = server
        .mock("POST", "/api/socketbelongsto/bulk")
        .match_body(Matcher::Json(json!({"socket_ids": ["A1", "7"]})))
        .with_status(200)
        .with_body(r#"[{"socket_id": "A1", "username": "imad"}, {"socket_id": 7}]"#)
        .create_async()
        .await;
    let single = server
        .mock("GET", "/api/socketbelongsto/7")
        .with_status(200)
        .with_body(r#"{"socket_id": 7, "username": "matthijs", "email": "m@bronco.nl"}"#)
        .create_async()
        .await;

    let sockets = client.sockets().get_all_admin().await.unwrap();
    let ids: Vec<String> = sockets.iter().map(|s| s.socket_id.clone()).collect();
    assert_eq!(ids, ["A1", "7"]);

    // Not cached
    client.sockets().get_all_admin().await.unwrap();

    let owners = client.sockets().owners(&ids).await.unwrap();
    assert_eq!(owners[0].username_display(), "imad");
    assert_eq!(owners[1].username_display(), "Geen klant");

    let owner = client.sockets().owner("7").await.unwrap();
    assert_eq!(owner.socket_id.as_deref(), Some("7"));
    assert_eq!(owner.email_display(), "m@bronco.nl");

    all.assert_async().await;
    bulk.assert_async().await;
    single.assert_async().await;
}

#[tokio::test]
async fn test_location_get_create_and_delete() {
    let (mut server, client, _) = setup(Some("abc")).await;
    let get = server
        .mock("GET", "/api/locations/5")
        .with_status(200)
        .with_body(r#"{"data": {"id": 5, "name": "Thuis", "tariff_per_kwh": "0.30"}}"#)
        .create_async()
        .await;
    let create = server
        .mock("POST", "/api/locations")
        .match_body(Matcher::PartialJson(json!({"user_id": 3, "name": "Werk"})))
        .with_status(201)
        .with_body(r#"{"id": 6, "user_id": 3, "name": "Werk", "address": "Kade 2", "tariff_per_kwh": 0.25}"#)
        .create_async()
        .await;
    let delete = server
        .mock("DELETE", "/api/locations/6")
        .with_status(204)
        .create_async()
        .await;

    let location = client.locations().get(5).await.unwrap();
    assert_eq!(location.name, "Thuis");
    assert_eq!(location.tariff_display(), "€0.30 per kWh");

    let created = client
        .locations()
        .create(&NewLocation {
            user_id: 3,
            name: "Werk".to_string(),
            address: "Kade 2".to_string(),
            tariff_per_kwh: 0.25,
        })
        .await
        .unwrap();
    assert_eq!(created.id, 6);
    assert_eq!(created.address_display(), "Kade 2");

    let ack = client.locations().delete(6).await.unwrap();
    assert!(ack.message.is_none());

    get.assert_async().await;
    create.assert_async().await;
    delete.assert_async().await;
}
