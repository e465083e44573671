//! Cloud Firestore document store
//!
//! Talks to the Firestore REST API (`projects/{p}/databases/(default)/documents`).
//! Requests carry the signed-in user's ID token so security rules apply as
//! they would for the web SDK.

use super::{Document, DocumentStore, Fields};
use crate::auth::{firebase, SessionHandle};
use crate::config;
use crate::error::{AppError, Result};
use crate::services::settings::FirebaseSettings;
use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Deserialize, Serialize, Debug, Default)]
struct RemoteDocument {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    name: String,
    #[serde(default)]
    fields: Fields,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    documents: Vec<RemoteDocument>,
    next_page_token: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize, Debug)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

#[derive(Clone)]
pub struct FirestoreStore {
    client: reqwest::Client,
    api_key: String,
    /// `{endpoint}/projects/{project}/databases/(default)/documents`
    documents_url: String,
    token_endpoint: String,
    session: SessionHandle,
}

impl FirestoreStore {
    pub fn new(client: reqwest::Client, settings: &FirebaseSettings, session: SessionHandle) -> Self {
        Self {
            client,
            api_key: settings.api_key.clone(),
            documents_url: format!(
                "{}/projects/{}/databases/(default)/documents",
                settings.firestore_endpoint.trim_end_matches('/'),
                settings.project_id
            ),
            token_endpoint: settings.token_endpoint.clone(),
            session,
        }
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/{}", self.documents_url, collection)
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!("{}/{}/{}", self.documents_url, collection, id)
    }

    /// Current ID token, refreshed first when it is about to expire
    async fn id_token(&self) -> Result<Option<String>> {
        let Some(session) = self.session.read().await.clone() else {
            return Ok(None);
        };

        if !session.needs_refresh(chrono::Utc::now()) {
            return Ok(Some(session.token));
        }

        let renewed =
            firebase::refresh_session(&self.client, &self.token_endpoint, &self.api_key, &session)
                .await?;

        let mut current = self.session.write().await;
        let Some(active) = current.as_mut() else {
            return Ok(None);
        };

        // Only replace the session the refresh started from
        if active.refresh_token == session.refresh_token {
            *active = renewed;
        }
        Ok(Some(active.token.clone()))
    }

    /// Attach the API key and, when signed in, the user's ID token
    async fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        let request = request.query(&[("key", self.api_key.as_str())]);

        Ok(match self.id_token().await? {
            Some(token) => request.bearer_auth(token),
            None => request,
        })
    }
}

/// Turn a non-success response into a store error
async fn check(response: Response, collection: &str, id: Option<&str>) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::NOT_FOUND {
        if let Some(id) = id {
            return Err(AppError::DocumentNotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }
    }

    let body = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<ErrorEnvelope>(&body)
        .map(|envelope| {
            if envelope.error.status.is_empty() {
                envelope.error.message
            } else {
                format!("{}: {}", envelope.error.status, envelope.error.message)
            }
        })
        .unwrap_or(body);

    tracing::warn!("Firestore request for {} failed ({}): {}", collection, status, detail);
    Err(AppError::Store(format!("{} ({})", detail, status)))
}

/// Last path segment of a Firestore resource name
fn document_id(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

/// Backtick-quote field names that are not simple identifiers
fn field_path(key: &str) -> String {
    let simple = key
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');

    if simple {
        key.to_string()
    } else {
        format!("`{}`", key.replace('\\', "\\\\").replace('`', "\\`"))
    }
}

/// Convert a Firestore typed value into plain JSON
pub fn decode_value(value: &Value) -> Value {
    let Some((kind, inner)) = value.as_object().and_then(|map| map.iter().next()) else {
        return Value::Null;
    };

    match kind.as_str() {
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => inner.clone(),
        "integerValue" => match inner {
            Value::String(s) => s
                .parse::<i64>()
                .map(Value::from)
                .unwrap_or_else(|_| inner.clone()),
            other => other.clone(),
        },
        "doubleValue" | "booleanValue" | "geoPointValue" => inner.clone(),
        "nullValue" => Value::Null,
        "mapValue" => Value::Object(decode_fields(
            inner.get("fields").and_then(Value::as_object).unwrap_or(&Fields::new()),
        )),
        "arrayValue" => Value::Array(
            inner
                .get("values")
                .and_then(Value::as_array)
                .map(|values| values.iter().map(decode_value).collect())
                .unwrap_or_default(),
        ),
        _ => inner.clone(),
    }
}

/// Convert a Firestore `fields` map into plain JSON
pub fn decode_fields(fields: &Fields) -> Fields {
    fields
        .iter()
        .map(|(key, value)| (key.clone(), decode_value(value)))
        .collect()
}

/// Convert plain JSON into a Firestore typed value
pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => match n.as_i64() {
            Some(i) => json!({ "integerValue": i.to_string() }),
            None => json!({ "doubleValue": n.as_f64() }),
        },
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(values) => {
            json!({ "arrayValue": { "values": values.iter().map(encode_value).collect::<Vec<_>>() } })
        }
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

/// Convert a plain JSON field map into Firestore typed fields
pub fn encode_fields(fields: &Fields) -> Fields {
    fields
        .iter()
        .map(|(key, value)| (key.clone(), encode_value(value)))
        .collect()
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn list_all(&self, collection: &str) -> Result<Vec<Document>> {
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![("pageSize", config::FIRESTORE_PAGE_SIZE.to_string())];
            if let Some(token) = &page_token {
                query.push(("pageToken", token.clone()));
            }

            let request = self.client.get(self.collection_url(collection)).query(&query);
            let response = self.authorize(request).await?.send().await?;
            let page: ListResponse = check(response, collection, None).await?.json().await?;

            documents.extend(page.documents.into_iter().map(|remote| Document {
                id: document_id(&remote.name).to_string(),
                fields: decode_fields(&remote.fields),
            }));

            match page.next_page_token.filter(|token| !token.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        tracing::debug!("Fetched {} documents from {}", documents.len(), collection);
        Ok(documents)
    }

    async fn create(&self, collection: &str, fields: Fields) -> Result<String> {
        let body = RemoteDocument {
            name: String::new(),
            fields: encode_fields(&fields),
        };

        let request = self.client.post(self.collection_url(collection)).json(&body);
        let response = self.authorize(request).await?.send().await?;
        let created: RemoteDocument = check(response, collection, None).await?.json().await?;

        let id = document_id(&created.name).to_string();
        if id.is_empty() {
            return Err(AppError::Store(
                "Firestore did not return a document name".to_string(),
            ));
        }

        tracing::debug!("Created Firestore document {}/{}", collection, id);
        Ok(id)
    }

    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<()> {
        let mut query: Vec<(&str, String)> = fields
            .keys()
            .map(|key| ("updateMask.fieldPaths", field_path(key)))
            .collect();
        query.push(("currentDocument.exists", "true".to_string()));

        let body = RemoteDocument {
            name: String::new(),
            fields: encode_fields(&fields),
        };

        let request = self
            .client
            .patch(self.document_url(collection, id))
            .query(&query)
            .json(&body);
        let response = self.authorize(request).await?.send().await?;
        check(response, collection, Some(id)).await?;

        tracing::debug!("Updated Firestore document {}/{}", collection, id);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        let request = self.client.delete(self.document_url(collection, id));
        let response = self.authorize(request).await?.send().await?;
        check(response, collection, Some(id)).await?;

        tracing::debug!("Deleted Firestore document {}/{}", collection, id);
        Ok(())
    }
}
