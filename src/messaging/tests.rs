use super::*;
use crate::config::{Endpoints, FirebaseOptions};
use httpmock::prelude::*;
use serde_json::json;
use std::time::Duration;
use tokio::sync::mpsc;

fn push_subscription() -> PushSubscription {
    PushSubscription {
        endpoint: "https://push.example.com/send/abc".to_string(),
        auth: "auth-secret".to_string(),
        p256dh: "p256dh-key".to_string(),
    }
}

fn create_test_app(server: &MockServer) -> FirebaseApp {
    let options = FirebaseOptions::new("test-project", "test-api-key")
        .with_messaging_sender_id("1234567890")
        .with_app_id("1:1234567890:web:abcdef")
        .with_web_push(push_subscription())
        .with_endpoints(Endpoints::all_at(&server.base_url()));
    FirebaseApp::initialize(options).unwrap()
}

fn mock_installation(server: &MockServer) -> httpmock::Mock<'_> {
    server.mock(|when, then| {
        when.method(POST)
            .path("/installations/v1/projects/test-project/installations")
            .header("x-goog-api-key", "test-api-key")
            .body_includes("\"authVersion\":\"FIS_v2\"")
            .body_includes("\"appId\":\"1:1234567890:web:abcdef\"");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({
                "name": "projects/test-project/installations/fid",
                "fid": "cAbCdEfGhIjKlMnOpQrStU",
                "refreshToken": "fis-refresh-token",
                "authToken": { "token": "fis-auth-token", "expiresIn": "604800s" }
            }));
    })
}

#[test]
fn test_missing_messaging_config_is_unsupported() {
    let options = FirebaseOptions::new("test-project", "test-api-key").with_app_id("app");
    let app = FirebaseApp::initialize(options).unwrap();

    let result = FirebaseMessaging::new(&app);

    assert!(matches!(result, Err(MessagingError::Unsupported(_))));
}

#[tokio::test]
async fn test_get_token_with_default_vapid_key() {
    let server = MockServer::start();
    let messaging = create_test_app(&server).messaging().unwrap();

    let installation = mock_installation(&server);
    let registration = server.mock(|when, then| {
        when.method(POST)
            .path("/fcmregistrations/v1/projects/test-project/registrations")
            .header("x-goog-firebase-installations-auth", "FIS fis-auth-token")
            .json_body(json!({
                "web": {
                    "endpoint": "https://push.example.com/send/abc",
                    "auth": "auth-secret",
                    "p256dh": "p256dh-key"
                }
            }));
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({ "token": "fcm-token-1" }));
    });

    let token = messaging.get_token(None).await.unwrap();

    assert_eq!(token, "fcm-token-1");
    installation.assert();
    registration.assert();
}

#[tokio::test]
async fn test_installation_is_reused_and_custom_vapid_key_is_sent() {
    let server = MockServer::start();
    let messaging = create_test_app(&server).messaging().unwrap();

    let installation = mock_installation(&server);
    server.mock(|when, then| {
        when.method(POST)
            .path("/fcmregistrations/v1/projects/test-project/registrations")
            .json_body(json!({
                "web": {
                    "endpoint": "https://push.example.com/send/abc",
                    "auth": "auth-secret",
                    "p256dh": "p256dh-key",
                    "applicationPubKey": "custom-vapid"
                }
            }));
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({ "token": "fcm-token-custom" }));
    });

    let first = messaging.get_token(Some("custom-vapid")).await.unwrap();
    let second = messaging.get_token(Some("custom-vapid")).await.unwrap();

    assert_eq!(first, "fcm-token-custom");
    assert_eq!(second, "fcm-token-custom");
    installation.assert();
}

#[tokio::test]
async fn test_registration_error_passes_through() {
    let server = MockServer::start();
    let messaging = create_test_app(&server).messaging().unwrap();

    mock_installation(&server);
    server.mock(|when, then| {
        when.method(POST)
            .path("/fcmregistrations/v1/projects/test-project/registrations");
        then.status(401)
            .header("content-type", "application/json")
            .json_body(json!({
                "error": {
                    "code": 401,
                    "message": "Request is missing required authentication credential.",
                    "status": "UNAUTHENTICATED"
                }
            }));
    });

    let result = messaging.get_token(None).await;

    match result {
        Err(MessagingError::ApiError(message)) => {
            assert!(message.contains("missing required authentication credential"))
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn test_on_message_receives_payloads_in_order() {
    let server = MockServer::start();
    let messaging = create_test_app(&server).messaging().unwrap();

    let (tx, mut rx) = mpsc::unbounded_channel();
    let subscription = messaging
        .on_message(move |payload| {
            let _ = tx.send(payload);
        })
        .unwrap();
    assert!(subscription.is_active());

    for id in ["m-1", "m-2"] {
        let payload = MessagePayload {
            message_id: Some(id.to_string()),
            ..Default::default()
        };
        assert_eq!(messaging.deliver(payload), 1);
    }

    for expected in ["m-1", "m-2"] {
        let payload = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(payload.message_id.as_deref(), Some(expected));
    }

    subscription.unsubscribe();
}

#[tokio::test]
async fn test_deliver_without_subscribers() {
    let server = MockServer::start();
    let messaging = create_test_app(&server).messaging().unwrap();

    assert_eq!(messaging.deliver(MessagePayload::default()), 0);
}

#[test]
fn test_on_message_outside_runtime() {
    let server = MockServer::start();
    let messaging = create_test_app(&server).messaging().unwrap();

    let result = messaging.on_message(|_| {});

    assert!(matches!(result, Err(MessagingError::NoRuntime)));
}

#[test]
fn test_message_payload_from_json() {
    let payload: MessagePayload = serde_json::from_value(json!({
        "messageId": "m-1",
        "from": "1234567890",
        "notification": { "title": "Hi", "body": "There" },
        "data": { "orderId": "42" }
    }))
    .unwrap();

    assert_eq!(payload.from.as_deref(), Some("1234567890"));
    assert_eq!(payload.notification.unwrap().title.as_deref(), Some("Hi"));
    assert_eq!(payload.data.get("orderId").map(String::as_str), Some("42"));
}

#[test]
fn test_generated_fid_shape() {
    for _ in 0..32 {
        let fid = generate_fid();
        assert_eq!(fid.len(), 22);
        assert!(matches!(fid.chars().next(), Some('c' | 'd' | 'e' | 'f')));
    }
}

#[tokio::test]
async fn test_handles_from_one_app_share_installation_and_inbound() {
    let server = MockServer::start();
    let app = create_test_app(&server);
    let first = FirebaseMessaging::new(&app).unwrap();
    let second = app.messaging().unwrap();

    let installation = mock_installation(&server);
    server.mock(|when, then| {
        when.method(POST)
            .path("/fcmregistrations/v1/projects/test-project/registrations");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({ "token": "fcm-token-1" }));
    });

    assert_eq!(first.get_token(None).await.unwrap(), "fcm-token-1");
    assert_eq!(second.get_token(None).await.unwrap(), "fcm-token-1");
    installation.assert();

    let _subscription = first.on_message(|_| {}).unwrap();
    assert_eq!(second.deliver(MessagePayload::default()), 1);
}
