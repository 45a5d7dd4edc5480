use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A Web Push subscription, as produced by the browser's `PushManager`.
///
/// `auth` and `p256dh` are the base64url-encoded subscription keys.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PushSubscription {
    pub endpoint: String,
    pub auth: String,
    pub p256dh: String,
}

/// A message received through Cloud Messaging.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MessagePayload {
    pub message_id: Option<String>,
    pub from: Option<String>,
    pub collapse_key: Option<String>,
    pub notification: Option<NotificationPayload>,
    #[serde(default)]
    pub data: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct NotificationPayload {
    pub title: Option<String>,
    pub body: Option<String>,
    pub image: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateInstallationRequest<'a> {
    pub fid: &'a str,
    pub auth_version: &'static str,
    pub app_id: &'a str,
    pub sdk_version: &'static str,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InstallationResponse {
    pub fid: String,
    pub auth_token: InstallationAuthToken,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct InstallationAuthToken {
    pub token: String,
}

#[derive(Serialize)]
pub(crate) struct RegistrationRequest<'a> {
    pub web: WebRegistration<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WebRegistration<'a> {
    pub endpoint: &'a str,
    pub auth: &'a str,
    pub p256dh: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_pub_key: Option<&'a str>,
}

#[derive(Deserialize)]
pub(crate) struct RegistrationResponse {
    pub token: String,
}
