use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use super::firestore_codec::{decode_fields, document_id, encode_fields};
use super::{AuthSession, DocumentStore, StorageError};
use crate::model::RoundRecord;

pub const FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com/v1";

#[derive(Clone)]
pub struct FirestoreStore {
    client: reqwest::Client,
    base_url: String,
    project_id: String,
}

#[derive(Deserialize)]
struct FirestoreDocument {
    name: String,
    #[serde(default)]
    fields: serde_json::Map<String, Value>,
}

#[derive(Deserialize)]
struct RunQueryRow {
    document: Option<FirestoreDocument>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl FirestoreStore {
    #[must_use]
    pub fn new(project_id: impl Into<String>) -> Self {
        Self::with_base_url(project_id, FIRESTORE_BASE_URL)
    }

    #[must_use]
    pub fn with_base_url(project_id: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            project_id: project_id.into(),
        }
    }

    fn documents_url(&self) -> String {
        format!(
            "{}/projects/{}/databases/(default)/documents",
            self.base_url, self.project_id
        )
    }

    fn headers(session: &AuthSession) -> Result<HeaderMap, StorageError> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", session.id_token))
            .map_err(|e| StorageError::new(e.to_string()))?;
        headers.insert(AUTHORIZATION, bearer);
        Ok(headers)
    }

    async fn check(resp: reqwest::Response, op: &str) -> Result<reqwest::Response, StorageError> {
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorEnvelope>(&body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| format!("{op} failed with status {status}"));
        Err(StorageError::new(message))
    }

    fn record_from_document(doc: FirestoreDocument) -> Result<(String, RoundRecord), StorageError> {
        let fields = decode_fields(&doc.fields)?;
        let record: RoundRecord = serde_json::from_value(Value::Object(fields))
            .map_err(|e| StorageError::new(format!("document {}: {e}", doc.name)))?;
        Ok((document_id(&doc.name).to_string(), record))
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn create(
        &self,
        session: &AuthSession,
        collection: &str,
        record: &RoundRecord,
    ) -> Result<String, StorageError> {
        let plain = serde_json::to_value(record).map_err(|e| StorageError::new(e.to_string()))?;
        let Value::Object(map) = plain else {
            return Err(StorageError::new("round did not serialize to an object"));
        };
        let url = format!("{}/{collection}", self.documents_url());
        let resp = self
            .client
            .post(url)
            .headers(Self::headers(session)?)
            .json(&json!({ "fields": encode_fields(&map) }))
            .send()
            .await
            .map_err(|e| StorageError::new(e.to_string()))?;
        let doc: FirestoreDocument = Self::check(resp, "create")
            .await?
            .json()
            .await
            .map_err(|e| StorageError::new(e.to_string()))?;
        let id = document_id(&doc.name).to_string();
        debug!(%id, collection, "created document");
        Ok(id)
    }

    async fn query_by_owner(
        &self,
        session: &AuthSession,
        collection: &str,
        owner_id: &str,
    ) -> Result<Vec<(String, RoundRecord)>, StorageError> {
        let url = format!("{}:runQuery", self.documents_url());
        let body = json!({
            "structuredQuery": {
                "from": [{ "collectionId": collection }],
                "where": {
                    "fieldFilter": {
                        "field": { "fieldPath": "userId" },
                        "op": "EQUAL",
                        "value": { "stringValue": owner_id }
                    }
                }
            }
        });
        let resp = self
            .client
            .post(url)
            .headers(Self::headers(session)?)
            .json(&body)
            .send()
            .await
            .map_err(|e| StorageError::new(e.to_string()))?;
        let rows: Vec<RunQueryRow> = Self::check(resp, "query")
            .await?
            .json()
            .await
            .map_err(|e| StorageError::new(e.to_string()))?;
        let docs = rows
            .into_iter()
            .filter_map(|row| row.document)
            .map(Self::record_from_document)
            .collect::<Result<Vec<_>, _>>()?;
        debug!(count = docs.len(), collection, "queried documents");
        Ok(docs)
    }

    async fn delete_by_id(
        &self,
        session: &AuthSession,
        collection: &str,
        id: &str,
    ) -> Result<(), StorageError> {
        let url = format!("{}/{collection}/{id}", self.documents_url());
        let resp = self
            .client
            .delete(url)
            .headers(Self::headers(session)?)
            .send()
            .await
            .map_err(|e| StorageError::new(e.to_string()))?;
        Self::check(resp, "delete").await?;
        debug!(%id, collection, "deleted document");
        Ok(())
    }
}
