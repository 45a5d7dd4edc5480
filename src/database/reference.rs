use super::{DatabaseError, DatabaseErrorResponse};
use crate::auth::session::Session;
use crate::core::encode_path_segment;
use reqwest::header;
use reqwest_middleware::ClientWithMiddleware;
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

/// A reference to a node in the Realtime Database.
#[derive(Clone)]
pub struct DatabaseReference<'a> {
    pub(crate) client: &'a ClientWithMiddleware,
    pub(crate) base_url: &'a str,
    pub(crate) session: &'a Session,
    pub(crate) path: String,
}

impl<'a> DatabaseReference<'a> {
    /// The node's path, without leading or trailing slashes.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The last path segment, or `None` for the root.
    pub fn key(&self) -> Option<&str> {
        self.path.rsplit('/').next().filter(|key| !key.is_empty())
    }

    pub fn child(&self, path: &str) -> DatabaseReference<'a> {
        let child = path.trim_matches('/');
        let path = match (self.path.is_empty(), child.is_empty()) {
            (_, true) => self.path.clone(),
            (true, false) => child.to_string(),
            (false, false) => format!("{}/{}", self.path, child),
        };
        DatabaseReference { path, ..self.clone() }
    }

    async fn node_url(&self) -> Result<Url, DatabaseError> {
        let encoded = self
            .path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(encode_path_segment)
            .collect::<Vec<_>>()
            .join("/");

        let mut url = Url::parse(&format!("{}/{}.json", self.base_url, encoded))?;
        if let Some(token) = self.session.id_token().await {
            url.query_pairs_mut().append_pair("auth", &token);
        }
        Ok(url)
    }

    /// Overwrites the node with `value`.
    pub async fn set<T: Serialize + ?Sized>(&self, value: &T) -> Result<(), DatabaseError> {
        let url = self.node_url().await?;
        tracing::debug!(path = %self.path, "database set");

        let response = self
            .client
            .put(url)
            .header(header::CONTENT_TYPE, "application/json")
            .body(serde_json::to_vec(value)?)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::api_error(response, "Set failed").await);
        }

        Ok(())
    }

    /// Reads the node. A missing node (JSON `null`) is `None`.
    pub async fn get<T: DeserializeOwned>(&self) -> Result<Option<T>, DatabaseError> {
        let url = self.node_url().await?;
        tracing::debug!(path = %self.path, "database get");

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(Self::api_error(response, "Get failed").await);
        }

        let value: serde_json::Value = response.json().await?;
        if value.is_null() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_value(value)?))
    }

    /// Removes the node and everything below it.
    pub async fn remove(&self) -> Result<(), DatabaseError> {
        let url = self.node_url().await?;
        tracing::debug!(path = %self.path, "database remove");

        let response = self.client.delete(url).send().await?;

        if !response.status().is_success() {
            return Err(Self::api_error(response, "Remove failed").await);
        }

        Ok(())
    }

    async fn api_error(response: reqwest::Response, context: &str) -> DatabaseError {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        match serde_json::from_str::<DatabaseErrorResponse>(&text) {
            Ok(error) => DatabaseError::ApiError(format!("{} (status: {})", error.error, status)),
            Err(_) => DatabaseError::ApiError(format!("{} {}: {}", context, status, text)),
        }
    }
}
