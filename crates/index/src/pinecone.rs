//! Pinecone index backend.
//!
//! Uses the REST data plane of a single index:
//! - `POST {host}/query`          nearest-neighbour query with metadata
//! - `POST {host}/vectors/upsert` batch upsert into a namespace
//!
//! When no host is configured, it is resolved once from the control plane
//! (`GET https://api.pinecone.io/indexes/{name}`).

use async_trait::async_trait;
use paperforge_core::error::IndexError;
use paperforge_core::index::{IndexQuery, RetrievalMatch, VectorIndex, VectorRecord};
use serde::Deserialize;
use tracing::{debug, info, warn};

const CONTROL_PLANE_URL: &str = "https://api.pinecone.io";
const API_VERSION: &str = "2024-07";

/// Error bodies are truncated to this many characters.
const MAX_ERROR_BODY: usize = 500;

/// A handle on one Pinecone index.
pub struct PineconeIndex {
    api_key: String,
    host: String,
    client: reqwest::Client,
}

impl PineconeIndex {
    /// Create a handle for a known data-plane host.
    pub fn new(api_key: impl Into<String>, host: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(90))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            api_key: api_key.into(),
            host: normalize_host(host),
            client,
        }
    }

    /// Create a handle, resolving the host from the index name when needed.
    pub async fn connect(
        api_key: impl Into<String>,
        index_name: &str,
        host: Option<&str>,
    ) -> Result<Self, IndexError> {
        let api_key = api_key.into();
        if let Some(host) = host.filter(|h| !h.trim().is_empty()) {
            return Ok(Self::new(api_key, host));
        }

        let index = Self::new(api_key, CONTROL_PLANE_URL);
        let url = format!("{CONTROL_PLANE_URL}/indexes/{index_name}");
        let response = index
            .client
            .get(&url)
            .header("Api-Key", &index.api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
            .send()
            .await
            .map_err(|e| IndexError::Network(e.to_string()))?;

        let response = check_status(response).await?;
        let described: DescribeIndexResponse = response
            .json()
            .await
            .map_err(|e| IndexError::MalformedResponse(e.to_string()))?;

        let host = described
            .host
            .filter(|h| !h.trim().is_empty())
            .ok_or_else(|| {
                IndexError::NotConfigured(format!("index '{index_name}' has no host yet"))
            })?;

        info!(index = %index_name, host = %host, "Resolved Pinecone index host");
        Ok(Self {
            host: normalize_host(&host),
            ..index
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    async fn post(&self, path: &str, body: &serde_json::Value) -> Result<reqwest::Response, IndexError> {
        let url = format!("{}{}", self.host, path);
        let response = self
            .client
            .post(&url)
            .header("Api-Key", &self.api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| IndexError::Network(e.to_string()))?;

        check_status(response).await
    }
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    fn name(&self) -> &str {
        "pinecone"
    }

    async fn query(&self, query: IndexQuery) -> Result<Vec<RetrievalMatch>, IndexError> {
        debug!(namespace = %query.namespace, top_k = query.top_k, "Querying Pinecone");

        let response = self.post("/query", &query_body(&query)).await?;
        let parsed: QueryResponse = response
            .json()
            .await
            .map_err(|e| IndexError::MalformedResponse(e.to_string()))?;

        Ok(parsed.matches)
    }

    async fn upsert(&self, namespace: &str, records: Vec<VectorRecord>) -> Result<usize, IndexError> {
        let count = records.len();
        let body = serde_json::json!({
            "vectors": records,
            "namespace": namespace,
        });

        let response = self.post("/vectors/upsert", &body).await?;
        let parsed: UpsertResponse = response
            .json()
            .await
            .map_err(|e| IndexError::MalformedResponse(e.to_string()))?;

        Ok(parsed.upserted_count.unwrap_or(count))
    }
}

/// Prefix `https://` when the scheme is missing and drop trailing slashes.
fn normalize_host(host: &str) -> String {
    let host = host.trim();
    let base = if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{host}")
    };
    base.trim_end_matches('/').to_string()
}

fn query_body(query: &IndexQuery) -> serde_json::Value {
    let mut body = serde_json::json!({
        "vector": query.vector,
        "topK": query.top_k,
        "includeMetadata": true,
        "includeValues": false,
        "namespace": query.namespace,
    });

    if let Some(filter) = query.filter.as_ref().filter(|f| !f.is_empty()) {
        body["filter"] = filter.to_json();
    }

    body
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, IndexError> {
    let status = response.status();
    if status.is_client_error() || status.is_server_error() {
        let body = response.text().await.unwrap_or_default();
        let message = truncate_chars(&body, MAX_ERROR_BODY);
        warn!(status = status.as_u16(), body = %message, "Pinecone returned error");
        return Err(IndexError::Api {
            status_code: status.as_u16(),
            message,
        });
    }
    Ok(response)
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

// --- Pinecone API types (internal) ---

#[derive(Deserialize)]
struct DescribeIndexResponse {
    host: Option<String>,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<RetrievalMatch>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpsertResponse {
    upserted_count: Option<usize>,
}
