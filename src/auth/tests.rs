use super::*;
use crate::config::{Endpoints, FirebaseOptions};
use httpmock::prelude::*;
use serde_json::json;

fn create_test_app(server: &MockServer) -> FirebaseApp {
    let options = FirebaseOptions::new("test-project", "test-api-key")
        .with_endpoints(Endpoints::all_at(&server.base_url()));
    FirebaseApp::initialize(options).unwrap()
}

fn auth_response(uid: &str, email: &str) -> serde_json::Value {
    json!({
        "kind": "identitytoolkit#SignupNewUserResponse",
        "localId": uid,
        "email": email,
        "idToken": format!("id-token-{}", uid),
        "refreshToken": "refresh-token",
        "expiresIn": "3600"
    })
}

#[tokio::test]
async fn test_create_user_signs_in() {
    let server = MockServer::start();
    let app = create_test_app(&server);
    let auth = app.auth();

    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/identitytoolkit/v1/accounts:signUp")
            .header("x-goog-api-key", "test-api-key")
            .json_body(json!({
                "email": "alice@example.com",
                "password": "hunter22",
                "returnSecureToken": true
            }));
        then.status(200)
            .header("content-type", "application/json")
            .json_body(auth_response("alice-uid", "alice@example.com"));
    });

    let user = auth
        .create_user_with_email_and_password("alice@example.com", "hunter22")
        .await
        .unwrap();

    assert_eq!(user.uid, "alice-uid");
    assert_eq!(user.email.as_deref(), Some("alice@example.com"));
    assert!(user.display_name.is_none());
    assert!(!user.is_expired());
    assert_eq!(auth.current_user().await.unwrap().uid, "alice-uid");
    mock.assert();
}

#[tokio::test]
async fn test_sign_in_with_wrong_password() {
    let server = MockServer::start();
    let app = create_test_app(&server);
    let auth = app.auth();

    server.mock(|when, then| {
        when.method(POST).path("/identitytoolkit/v1/accounts:signInWithPassword");
        then.status(400)
            .header("content-type", "application/json")
            .json_body(json!({
                "error": {
                    "code": 400,
                    "message": "INVALID_LOGIN_CREDENTIALS",
                    "errors": [{ "message": "INVALID_LOGIN_CREDENTIALS", "domain": "global", "reason": "invalid" }]
                }
            }));
    });

    let result = auth
        .sign_in_with_email_and_password("alice@example.com", "wrong")
        .await;

    assert!(matches!(result, Err(AuthError::InvalidCredentials(_))));
    assert!(auth.current_user().await.is_none());
}

#[tokio::test]
async fn test_other_backend_errors_pass_through() {
    let server = MockServer::start();
    let app = create_test_app(&server);
    let auth = app.auth();

    server.mock(|when, then| {
        when.method(POST).path("/identitytoolkit/v1/accounts:signUp");
        then.status(400)
            .header("content-type", "application/json")
            .json_body(json!({
                "error": { "code": 400, "message": "EMAIL_EXISTS" }
            }));
    });

    let err = auth
        .create_user_with_email_and_password("alice@example.com", "hunter22")
        .await
        .unwrap_err();

    match err {
        AuthError::ApiError(message) => assert_eq!(message, "EMAIL_EXISTS (code: 400)"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_delete_current_user_without_session() {
    let server = MockServer::start();
    let app = create_test_app(&server);

    let result = app.auth().delete_current_user().await;

    assert!(matches!(result, Err(AuthError::NoUserSignedIn)));
    assert_eq!(
        AuthError::NoUserSignedIn.to_string(),
        "No user currently signed in."
    );
}

#[tokio::test]
async fn test_delete_current_user_clears_session() {
    let server = MockServer::start();
    let app = create_test_app(&server);
    let auth = app.auth();

    server.mock(|when, then| {
        when.method(POST).path("/identitytoolkit/v1/accounts:signInWithPassword");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(auth_response("bob-uid", "bob@example.com"));
    });
    let delete_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/identitytoolkit/v1/accounts:delete")
            .json_body(json!({ "idToken": "id-token-bob-uid" }));
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({ "kind": "identitytoolkit#DeleteAccountResponse" }));
    });

    auth.sign_in_with_email_and_password("bob@example.com", "secret1")
        .await
        .unwrap();
    auth.delete_current_user().await.unwrap();

    delete_mock.assert();
    assert!(auth.current_user().await.is_none());
}
