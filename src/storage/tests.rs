use super::*;
use crate::config::{Endpoints, FirebaseOptions};
use crate::storage::file::ObjectMetadata;
use httpmock::prelude::*;
use serde_json::json;

const OBJECTS: &str = "/storage/v0/b/test-project.appspot.com/o";

fn create_test_app(server: &MockServer) -> FirebaseApp {
    let options = FirebaseOptions::new("test-project", "test-api-key")
        .with_endpoints(Endpoints::all_at(&server.base_url()));
    FirebaseApp::initialize(options).unwrap()
}

fn avatar_metadata() -> serde_json::Value {
    json!({
        "name": "avatar.png",
        "bucket": "test-project.appspot.com",
        "generation": "1700000000000000",
        "contentType": "image/png",
        "timeCreated": "2024-01-01T00:00:00.000Z",
        "updated": "2024-01-01T00:00:00.000Z",
        "size": "5",
        "downloadTokens": "tok-1,tok-2"
    })
}

#[tokio::test]
async fn test_save_uploads_media() {
    let server = MockServer::start();
    let storage = create_test_app(&server).storage();

    let mock = server.mock(|when, then| {
        when.method(POST)
            .path(OBJECTS)
            .query_param("uploadType", "media")
            .query_param("name", "avatar.png")
            .header("content-type", "image/png")
            .body("hello");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(avatar_metadata());
    });

    let file = storage.file("avatar.png");
    let metadata = file.save(b"hello".to_vec(), "image/png").await.unwrap();

    assert_eq!(metadata.content_type.as_deref(), Some("image/png"));
    assert_eq!(metadata.download_token(), Some("tok-1"));
    assert!(metadata.time_created.is_some());
    mock.assert();
}

#[tokio::test]
async fn test_download_url_uses_first_token() {
    let server = MockServer::start();
    let storage = create_test_app(&server).storage();

    server.mock(|when, then| {
        when.method(GET).path(format!("{}/avatar.png", OBJECTS));
        then.status(200)
            .header("content-type", "application/json")
            .json_body(avatar_metadata());
    });

    let url = storage.file("avatar.png").download_url().await.unwrap();

    assert_eq!(
        url,
        format!("{}{}/avatar.png?alt=media&token=tok-1", server.base_url(), OBJECTS)
    );
}

#[tokio::test]
async fn test_download_url_of_missing_object() {
    let server = MockServer::start();
    let storage = create_test_app(&server).storage();

    server.mock(|when, then| {
        when.method(GET).path(format!("{}/missing.png", OBJECTS));
        then.status(404)
            .header("content-type", "application/json")
            .json_body(json!({ "error": { "code": 404, "message": "Not Found." } }));
    });

    let result = storage.file("missing.png").download_url().await;

    assert!(matches!(result, Err(StorageError::ObjectNotFound(path)) if path == "missing.png"));
}

#[tokio::test]
async fn test_delete_object() {
    let server = MockServer::start();
    let storage = create_test_app(&server).storage();

    let mock = server.mock(|when, then| {
        when.method(DELETE).path(format!("{}/avatar.png", OBJECTS));
        then.status(204);
    });

    storage.file("avatar.png").delete().await.unwrap();

    mock.assert();
}

#[test]
fn test_download_url_encodes_nested_paths() {
    let options = FirebaseOptions::new("test-project", "test-api-key").with_storage_bucket("bucket");
    let app = FirebaseApp::initialize(options).unwrap();
    let file = app.storage().file("images/a b.png");

    let metadata = ObjectMetadata {
        download_tokens: Some("tok".to_string()),
        ..Default::default()
    };

    assert_eq!(
        file.download_url_from(&metadata).unwrap(),
        "https://firebasestorage.googleapis.com/v0/b/bucket/o/images%2Fa%20b.png?alt=media&token=tok"
    );
}

#[test]
fn test_missing_download_token() {
    let options = FirebaseOptions::new("test-project", "test-api-key");
    let app = FirebaseApp::initialize(options).unwrap();
    let file = app.storage().file("avatar.png");

    let result = file.download_url_from(&ObjectMetadata::default());

    assert!(matches!(result, Err(StorageError::NoDownloadToken(_))));
}
