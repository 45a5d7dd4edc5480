use super::*;
use crate::config::{Endpoints, FirebaseOptions};
use httpmock::prelude::*;
use serde_json::json;

fn create_test_app(server: &MockServer) -> FirebaseApp {
    let options = FirebaseOptions::new("test-project", "test-api-key")
        .with_database_url(server.url("/rtdb"))
        .with_endpoints(Endpoints::all_at(&server.base_url()));
    FirebaseApp::initialize(options).unwrap()
}

#[tokio::test]
async fn test_set_overwrites_node() {
    let server = MockServer::start();
    let db = create_test_app(&server).database();

    let mock = server.mock(|when, then| {
        when.method(PUT)
            .path("/rtdb/users/alice.json")
            .json_body(json!({ "online": true, "score": 7 }));
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({ "online": true, "score": 7 }));
    });

    db.reference("/users/alice/")
        .set(&json!({ "online": true, "score": 7 }))
        .await
        .unwrap();

    mock.assert();
}

#[tokio::test]
async fn test_get_missing_node_is_none() {
    let server = MockServer::start();
    let db = create_test_app(&server).database();

    server.mock(|when, then| {
        when.method(GET).path("/rtdb/users/ghost.json");
        then.status(200)
            .header("content-type", "application/json")
            .body("null");
    });

    let value: Option<serde_json::Value> = db.reference("users/ghost").get().await.unwrap();
    assert!(value.is_none());
}

#[tokio::test]
async fn test_get_existing_node() {
    let server = MockServer::start();
    let db = create_test_app(&server).database();

    server.mock(|when, then| {
        when.method(GET).path("/rtdb/scores/alice.json");
        then.status(200)
            .header("content-type", "application/json")
            .body("42");
    });

    let value: Option<u32> = db.reference("scores").child("alice").get().await.unwrap();
    assert_eq!(value, Some(42));
}

#[tokio::test]
async fn test_remove_node() {
    let server = MockServer::start();
    let db = create_test_app(&server).database();

    let mock = server.mock(|when, then| {
        when.method(DELETE).path("/rtdb/users/alice.json");
        then.status(200)
            .header("content-type", "application/json")
            .body("null");
    });

    db.reference("users/alice").remove().await.unwrap();

    mock.assert();
}

#[tokio::test]
async fn test_permission_denied_passes_through() {
    let server = MockServer::start();
    let db = create_test_app(&server).database();

    server.mock(|when, then| {
        when.method(GET).path("/rtdb/private.json");
        then.status(401)
            .header("content-type", "application/json")
            .json_body(json!({ "error": "Permission denied" }));
    });

    let result = db.reference("private").get::<serde_json::Value>().await;

    match result {
        Err(DatabaseError::ApiError(message)) => assert!(message.starts_with("Permission denied")),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn test_signed_in_user_token_is_sent_as_auth_param() {
    let server = MockServer::start();
    let app = create_test_app(&server);

    server.mock(|when, then| {
        when.method(POST).path("/identitytoolkit/v1/accounts:signInWithPassword");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({
                "localId": "alice-uid",
                "idToken": "alice-id-token",
                "refreshToken": "refresh",
                "expiresIn": "3600"
            }));
    });
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/rtdb/users/alice-uid.json")
            .query_param("auth", "alice-id-token");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({ "online": true }));
    });

    app.auth()
        .sign_in_with_email_and_password("alice@example.com", "secret1")
        .await
        .unwrap();
    let value: Option<serde_json::Value> =
        app.database().reference("users/alice-uid").get().await.unwrap();

    assert_eq!(value, Some(json!({ "online": true })));
    mock.assert();
}

#[test]
fn test_reference_paths() {
    let options = FirebaseOptions::new("test-project", "test-api-key");
    let app = FirebaseApp::initialize(options).unwrap();
    let db = app.database();

    let root = db.reference("");
    assert_eq!(root.key(), None);
    assert_eq!(root.child("users").path(), "users");
    assert_eq!(root.child("users").child("/alice/").key(), Some("alice"));
}
