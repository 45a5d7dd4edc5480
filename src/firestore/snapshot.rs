use super::models::{Document, DocumentData};
use super::reference::{convert_fields_to_serde_value, convert_value_to_serde_value};
use super::FirestoreError;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;

/// A snapshot of a document in Firestore.
///
/// It contains data read from a document in your Firestore database.
/// The data can be extracted with `.data()`.
#[derive(Debug, Clone)]
pub struct DocumentSnapshot {
    pub(crate) id: String,
    pub(crate) document: Option<Document>,
}

impl DocumentSnapshot {
    pub(crate) fn from_document(document: Document) -> Self {
        Self {
            id: document.id().to_string(),
            document: Some(document),
        }
    }

    pub(crate) fn missing(id: String) -> Self {
        Self { id, document: None }
    }

    /// The ID of the document.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns `true` if the document exists.
    pub fn exists(&self) -> bool {
        self.document.is_some()
    }

    /// The time the document was created. Returns `None` if the document does not exist.
    pub fn create_time(&self) -> Option<DateTime<Utc>> {
        self.document.as_ref().and_then(|d| d.create_time)
    }

    /// The time the document was last updated. Returns `None` if the document does not exist.
    pub fn update_time(&self) -> Option<DateTime<Utc>> {
        self.document.as_ref().and_then(|d| d.update_time)
    }

    /// Retrieves all fields in the document as a specific type.
    ///
    /// Returns `Ok(None)` if the document does not exist.
    pub fn data<T: DeserializeOwned>(&self) -> Result<Option<T>, FirestoreError> {
        match &self.document {
            Some(doc) => {
                let serde_value = convert_fields_to_serde_value(doc.fields.clone())?;
                Ok(Some(serde_json::from_value(serde_value)?))
            }
            None => Ok(None),
        }
    }

    /// The document's fields with its ID merged in under `"id"`.
    pub fn data_with_id(&self) -> Result<Option<DocumentData>, FirestoreError> {
        Ok(self.data::<DocumentData>()?.map(|mut data| {
            data.insert("id".to_string(), serde_json::Value::String(self.id.clone()));
            data
        }))
    }

    /// Retrieves a top-level field from the document.
    pub fn get_field<T: DeserializeOwned>(&self, field: &str) -> Result<Option<T>, FirestoreError> {
        let value = self
            .document
            .as_ref()
            .and_then(|doc| doc.fields.get(field));

        match value {
            Some(value) => {
                let serde_value = convert_value_to_serde_value(value.clone())?;
                Ok(Some(serde_json::from_value(serde_value)?))
            }
            None => Ok(None),
        }
    }
}
