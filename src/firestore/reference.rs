use super::models::{
    ArrayValue, Document, DocumentWrite, ListDocumentsResponse, MapValue, Value,
};
use super::snapshot::DocumentSnapshot;
use super::FirestoreError;
use crate::core::{encode_path_segment, parse_error_response};
use reqwest::header;
use reqwest_middleware::ClientWithMiddleware;
use serde::de::Error;
use serde::Serialize;
use serde_json::map::Map;
use serde_json::Value as SerdeValue;
use std::collections::HashMap;
use url::Url;

const LIST_PAGE_SIZE: u32 = 300;

// Helper to convert Firestore's value map to a standard serde_json::Value
pub(crate) fn convert_fields_to_serde_value(
    fields: HashMap<String, Value>,
) -> Result<SerdeValue, FirestoreError> {
    let mut map = Map::new();
    for (key, value) in fields {
        map.insert(key, convert_value_to_serde_value(value)?);
    }
    Ok(SerdeValue::Object(map))
}

pub(crate) fn convert_value_to_serde_value(value: Value) -> Result<SerdeValue, FirestoreError> {
    use serde_json::json;
    Ok(match value {
        Value::StringValue(s) => SerdeValue::String(s),
        Value::IntegerValue(s) => {
            let i: i64 = s.parse().map_err(|e| {
                <serde_json::Error as Error>::custom(format!(
                    "Failed to parse integer string '{}': {}",
                    s, e
                ))
            })?;
            SerdeValue::Number(i.into())
        }
        Value::DoubleValue(d) => SerdeValue::Number(
            serde_json::Number::from_f64(d).ok_or_else(|| {
                <serde_json::Error as Error>::custom(format!("Invalid f64 value: {}", d))
            })?,
        ),
        Value::BooleanValue(b) => SerdeValue::Bool(b),
        Value::MapValue(map_value) => convert_fields_to_serde_value(map_value.fields)?,
        Value::ArrayValue(array_value) => {
            let values = array_value
                .values
                .into_iter()
                .map(convert_value_to_serde_value)
                .collect::<Result<Vec<_>, _>>()?;
            SerdeValue::Array(values)
        }
        Value::NullValue(_) => SerdeValue::Null,
        Value::TimestampValue(s) => SerdeValue::String(s),
        Value::GeoPointValue(gp) => {
            json!({ "latitude": gp.latitude, "longitude": gp.longitude })
        }
        Value::BytesValue(s) => SerdeValue::String(s),
        Value::ReferenceValue(s) => SerdeValue::String(s),
    })
}

// Helper to convert a serializable Rust value to Firestore's value map
pub(crate) fn convert_serializable_to_fields<T: Serialize + ?Sized>(
    value: &T,
) -> Result<HashMap<String, Value>, FirestoreError> {
    match serde_json::to_value(value)? {
        SerdeValue::Object(map) => map
            .into_iter()
            .map(|(k, v)| convert_serde_value_to_firestore_value(v).map(|v| (k, v)))
            .collect(),
        _ => Err(FirestoreError::SerializationError(
            <serde_json::Error as Error>::custom("Can only set objects as documents"),
        )),
    }
}

pub(crate) fn convert_serde_value_to_firestore_value(
    value: SerdeValue,
) -> Result<Value, FirestoreError> {
    Ok(match value {
        SerdeValue::Null => Value::NullValue(()),
        SerdeValue::Bool(b) => Value::BooleanValue(b),
        SerdeValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::IntegerValue(i.to_string())
            } else if n.is_u64() {
                return Err(FirestoreError::SerializationError(
                    <serde_json::Error as Error>::custom(format!(
                        "Integer {} does not fit in a 64-bit signed integer",
                        n
                    )),
                ));
            } else if let Some(f) = n.as_f64() {
                Value::DoubleValue(f)
            } else {
                return Err(FirestoreError::SerializationError(
                    <serde_json::Error as Error>::custom(format!("Unsupported number type: {}", n)),
                ));
            }
        }
        SerdeValue::String(s) => Value::StringValue(s),
        SerdeValue::Array(a) => {
            let values = a
                .into_iter()
                .map(convert_serde_value_to_firestore_value)
                .collect::<Result<Vec<_>, _>>()?;
            Value::ArrayValue(ArrayValue { values })
        }
        SerdeValue::Object(o) => {
            let fields = o
                .into_iter()
                .map(|(k, v)| convert_serde_value_to_firestore_value(v).map(|v| (k, v)))
                .collect::<Result<HashMap<_, _>, _>>()?;
            Value::MapValue(MapValue { fields })
        }
    })
}

/// Quotes a top-level field name for use in an update mask.
///
/// Names that are not simple identifiers are wrapped in backticks, with
/// backticks and backslashes escaped.
pub(crate) fn quote_field_path(field: &str) -> String {
    let mut chars = field.chars();
    let simple = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if simple {
        field.to_string()
    } else {
        let escaped = field.replace('\\', "\\\\").replace('`', "\\`");
        format!("`{}`", escaped)
    }
}

#[derive(Clone)]
pub struct DocumentReference<'a> {
    pub(crate) client: &'a ClientWithMiddleware,
    pub(crate) path: String,
    pub(crate) id: String,
}

impl<'a> DocumentReference<'a> {
    /// The document's ID within its collection.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Reads the document. A missing document yields a snapshot whose `exists()` is `false`.
    pub async fn get(&self) -> Result<DocumentSnapshot, FirestoreError> {
        let response = self.client.get(&self.path).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(DocumentSnapshot::missing(self.id.clone()));
        }

        if !response.status().is_success() {
            return Err(FirestoreError::ApiError(
                parse_error_response(response, "Get document failed").await,
            ));
        }

        let doc: Document = response.json().await?;
        Ok(DocumentSnapshot::from_document(doc))
    }

    /// Overwrites the document, creating it if needed.
    pub async fn set<T: Serialize + ?Sized>(&self, value: &T) -> Result<(), FirestoreError> {
        let url = Url::parse(&self.path)?;
        self.patch(url, value, "Set document failed").await
    }

    /// Writes the given top-level fields, creating the document if needed.
    /// Fields not present in `value` are left untouched.
    pub async fn merge<T: Serialize + ?Sized>(&self, value: &T) -> Result<(), FirestoreError> {
        let fields = convert_serializable_to_fields(value)?;
        if fields.is_empty() {
            return Ok(());
        }
        let url = self.masked_url(fields.keys(), false)?;
        self.send_fields(url, fields, "Merge document failed").await
    }

    /// Updates the given top-level fields of an existing document.
    /// Fields not present in `value` are left untouched.
    pub async fn update<T: Serialize + ?Sized>(&self, value: &T) -> Result<(), FirestoreError> {
        let fields = convert_serializable_to_fields(value)?;
        if fields.is_empty() {
            // An empty mask cannot be expressed as query parameters; only check existence.
            if self.get().await?.exists() {
                return Ok(());
            }
            return Err(FirestoreError::NotFound(self.path.clone()));
        }
        let url = self.masked_url(fields.keys(), true)?;
        self.send_fields(url, fields, "Update document failed").await
    }

    /// Deletes the document. Deleting a missing document succeeds.
    pub async fn delete(&self) -> Result<(), FirestoreError> {
        let response = self.client.delete(&self.path).send().await?;

        if !response.status().is_success() {
            return Err(FirestoreError::ApiError(
                parse_error_response(response, "Delete document failed").await,
            ));
        }

        Ok(())
    }

    fn masked_url<'f>(
        &self,
        field_names: impl Iterator<Item = &'f String>,
        must_exist: bool,
    ) -> Result<Url, FirestoreError> {
        let mut url = Url::parse(&self.path)?;
        {
            let mut query = url.query_pairs_mut();
            let mut names: Vec<&String> = field_names.collect();
            names.sort();
            for name in names {
                query.append_pair("updateMask.fieldPaths", &quote_field_path(name));
            }
            if must_exist {
                query.append_pair("currentDocument.exists", "true");
            }
        }
        Ok(url)
    }

    async fn patch<T: Serialize + ?Sized>(
        &self,
        url: Url,
        value: &T,
        context: &str,
    ) -> Result<(), FirestoreError> {
        let fields = convert_serializable_to_fields(value)?;
        self.send_fields(url, fields, context).await
    }

    async fn send_fields(
        &self,
        url: Url,
        fields: HashMap<String, Value>,
        context: &str,
    ) -> Result<(), FirestoreError> {
        let body = serde_json::to_vec(&DocumentWrite { fields })?;

        let response = self
            .client
            .patch(url)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FirestoreError::ApiError(
                parse_error_response(response, context).await,
            ));
        }

        Ok(())
    }
}

#[derive(Clone)]
pub struct CollectionReference<'a> {
    pub(crate) client: &'a ClientWithMiddleware,
    pub(crate) path: String,
    pub(crate) id: String,
}

impl<'a> CollectionReference<'a> {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn doc(&self, document_id: &str) -> DocumentReference<'a> {
        DocumentReference {
            client: self.client,
            path: format!("{}/{}", self.path, encode_path_segment(document_id)),
            id: document_id.to_string(),
        }
    }

    /// Lists every document in the collection, following pagination.
    pub async fn list_documents(&self) -> Result<Vec<DocumentSnapshot>, FirestoreError> {
        let mut snapshots = Vec::new();
        let mut next_page_token: Option<String> = None;

        loop {
            let mut url = Url::parse(&self.path)?;
            {
                let mut query = url.query_pairs_mut();
                query.append_pair("pageSize", &LIST_PAGE_SIZE.to_string());
                if let Some(token) = next_page_token.take() {
                    query.append_pair("pageToken", &token);
                }
            }

            let response = self.client.get(url).send().await?;

            if !response.status().is_success() {
                return Err(FirestoreError::ApiError(
                    parse_error_response(response, "List documents failed").await,
                ));
            }

            let list: ListDocumentsResponse = response.json().await?;
            snapshots.extend(list.documents.into_iter().map(DocumentSnapshot::from_document));

            match list.next_page_token {
                Some(token) if !token.is_empty() => next_page_token = Some(token),
                _ => break,
            }
        }

        Ok(snapshots)
    }

    /// Adds a document with a backend-assigned ID.
    pub async fn add<T: Serialize + ?Sized>(
        &self,
        value: &T,
    ) -> Result<DocumentSnapshot, FirestoreError> {
        let fields = convert_serializable_to_fields(value)?;
        let body = serde_json::to_vec(&DocumentWrite { fields })?;

        let response = self
            .client
            .post(&self.path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FirestoreError::ApiError(
                parse_error_response(response, "Add document failed").await,
            ));
        }

        let doc: Document = response.json().await?;
        Ok(DocumentSnapshot::from_document(doc))
    }
}
