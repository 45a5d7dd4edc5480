use crate::core::{encode_path_segment, parse_error_response};
use crate::storage::StorageError;
use chrono::{DateTime, Utc};
use reqwest::header;
use reqwest::StatusCode;
use reqwest_middleware::ClientWithMiddleware;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use url::Url;

/// Represents an object within a Firebase Storage bucket.
pub struct File {
    client: ClientWithMiddleware,
    base_url: String,
    bucket_name: String,
    name: String,
}

/// Metadata of a Firebase Storage object.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMetadata {
    pub name: Option<String>,
    pub bucket: Option<String>,
    pub generation: Option<String>,
    pub metageneration: Option<String>,
    pub content_type: Option<String>,
    pub time_created: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
    pub storage_class: Option<String>,
    pub size: Option<String>,
    pub md5_hash: Option<String>,
    pub content_encoding: Option<String>,
    pub content_disposition: Option<String>,
    pub cache_control: Option<String>,
    /// Comma-separated download tokens.
    pub download_tokens: Option<String>,
    pub metadata: Option<HashMap<String, String>>,
}

impl ObjectMetadata {
    /// The first download token, if the object has any.
    pub fn download_token(&self) -> Option<&str> {
        self.download_tokens
            .as_deref()
            .and_then(|tokens| tokens.split(',').map(str::trim).find(|t| !t.is_empty()))
    }
}

impl File {
    pub(crate) fn new(
        client: ClientWithMiddleware,
        base_url: String,
        bucket_name: String,
        name: String,
    ) -> Self {
        Self {
            client,
            base_url,
            bucket_name,
            name,
        }
    }

    /// Returns the path of the object.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the name of the bucket containing the object.
    pub fn bucket(&self) -> &str {
        &self.bucket_name
    }

    fn object_url(&self) -> String {
        format!(
            "{}/b/{}/o/{}",
            self.base_url,
            self.bucket_name,
            encode_path_segment(&self.name)
        )
    }

    /// Uploads data to the object, replacing any previous content.
    ///
    /// # Arguments
    ///
    /// * `body` - The data to upload.
    /// * `mime_type` - The MIME type of the data.
    pub async fn save(
        &self,
        body: impl Into<reqwest::Body>,
        mime_type: &str,
    ) -> Result<ObjectMetadata, StorageError> {
        let mut url = Url::parse(&format!("{}/b/{}/o", self.base_url, self.bucket_name))?;
        url.query_pairs_mut()
            .append_pair("uploadType", "media")
            .append_pair("name", &self.name);

        let response = self
            .client
            .post(url)
            .header(header::CONTENT_TYPE, mime_type)
            .body(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StorageError::ApiError(
                parse_error_response(response, "Upload failed").await,
            ));
        }

        Ok(response.json().await?)
    }

    /// Gets the object's metadata.
    pub async fn get_metadata(&self) -> Result<ObjectMetadata, StorageError> {
        let response = self.client.get(self.object_url()).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(StorageError::ObjectNotFound(self.name.clone()));
        }

        if !response.status().is_success() {
            return Err(StorageError::ApiError(
                parse_error_response(response, "Get metadata failed").await,
            ));
        }

        Ok(response.json().await?)
    }

    /// Resolves a long-lived download URL for the object.
    pub async fn download_url(&self) -> Result<String, StorageError> {
        let metadata = self.get_metadata().await?;
        self.download_url_from(&metadata)
    }

    /// Builds the download URL from already-fetched metadata.
    pub fn download_url_from(&self, metadata: &ObjectMetadata) -> Result<String, StorageError> {
        let token = metadata
            .download_token()
            .ok_or_else(|| StorageError::NoDownloadToken(self.name.clone()))?;

        let mut url = Url::parse(&self.object_url())?;
        url.query_pairs_mut()
            .append_pair("alt", "media")
            .append_pair("token", token);
        Ok(url.to_string())
    }

    /// Downloads the object's content.
    pub async fn download(&self) -> Result<bytes::Bytes, StorageError> {
        let response = self
            .client
            .get(format!("{}?alt=media", self.object_url()))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(StorageError::ObjectNotFound(self.name.clone()));
        }

        if !response.status().is_success() {
            return Err(StorageError::ApiError(
                parse_error_response(response, "Download failed").await,
            ));
        }

        Ok(response.bytes().await?)
    }

    /// Deletes the object.
    pub async fn delete(&self) -> Result<(), StorageError> {
        let response = self.client.delete(self.object_url()).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(StorageError::ObjectNotFound(self.name.clone()));
        }

        if !response.status().is_success() {
            return Err(StorageError::ApiError(
                parse_error_response(response, "Delete failed").await,
            ));
        }

        Ok(())
    }
}
