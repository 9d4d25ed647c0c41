//! Managed remote index speaking the Pinecone data-plane REST API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use super::store::{ScoredPassage, StoreError, VectorStoreBackend};
use crate::core::config::PineconeConfig;

#[derive(Clone)]
pub struct PineconeStore {
    index_host: String,
    api_key: Option<String>,
    namespace: Option<String>,
    text_key: String,
    api_version: String,
    client: Client,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Deserialize)]
struct QueryMatch {
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: Option<Value>,
}

#[derive(Deserialize)]
struct IndexStats {
    dimension: Option<usize>,
}

impl PineconeStore {
    pub fn new(config: &PineconeConfig, timeout: Duration) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let host = config.index_host.trim().trim_end_matches('/');
        let index_host = if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else {
            format!("https://{}", host)
        };

        Ok(Self {
            index_host,
            api_key: config.api_key.clone().filter(|key| !key.trim().is_empty()),
            namespace: config.namespace.clone().filter(|ns| !ns.is_empty()),
            text_key: config.text_key.clone(),
            api_version: config.api_version.clone(),
            client,
        })
    }

    async fn post(&self, path: &str, body: &Value) -> Result<reqwest::Response, StoreError> {
        let url = format!("{}{}", self.index_host, path);
        let mut request = self
            .client
            .post(&url)
            .header("X-Pinecone-API-Version", &self.api_version)
            .json(body);
        if let Some(key) = &self.api_key {
            request = request.header("Api-Key", key);
        }

        let res = request.send().await?;
        let status = res.status();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(StoreError::Unauthorized);
        }
        if !status.is_success() {
            let text = res.text().await.unwrap_or_default();
            return Err(StoreError::Query(format!("{}: {}", status, text)));
        }
        Ok(res)
    }

    fn passage_from_match(&self, item: QueryMatch) -> Option<ScoredPassage> {
        let metadata = item.metadata?;
        let text = metadata.get(&self.text_key)?.as_str()?.to_string();
        let source = metadata
            .get("source")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());
        Some(ScoredPassage {
            text,
            score: item.score,
            source,
        })
    }
}

#[async_trait]
impl VectorStoreBackend for PineconeStore {
    fn name(&self) -> &str {
        "pinecone"
    }

    async fn similarity_search(
        &self,
        query_embedding: &[f32],
        k: usize,
    ) -> Result<Vec<ScoredPassage>, StoreError> {
        let mut body = json!({
            "vector": query_embedding,
            "topK": k,
            "includeMetadata": true,
            "includeValues": false,
        });
        if let (Some(ns), Some(obj)) = (&self.namespace, body.as_object_mut()) {
            obj.insert("namespace".to_string(), json!(ns));
        }

        let response: QueryResponse = self
            .post("/query", &body)
            .await?
            .json()
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        let total = response.matches.len();
        let passages: Vec<ScoredPassage> = response
            .matches
            .into_iter()
            .filter_map(|item| self.passage_from_match(item))
            .collect();

        if passages.len() < total {
            tracing::warn!(
                "Dropped {} Pinecone matches without a '{}' metadata field",
                total - passages.len(),
                self.text_key
            );
        }

        Ok(passages)
    }

    async fn dimension(&self) -> Result<Option<usize>, StoreError> {
        let stats: IndexStats = self
            .post("/describe_index_stats", &json!({}))
            .await?
            .json()
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;
        Ok(stats.dimension)
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        match self.dimension().await {
            Ok(_) => Ok(true),
            Err(StoreError::Unavailable(_)) | Err(StoreError::Timeout) => Ok(false),
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::State;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use std::sync::{Arc, Mutex};
    use tokio::net::TcpListener;

    #[derive(Clone, Default)]
    struct Seen {
        bodies: Arc<Mutex<Vec<Value>>>,
        keys: Arc<Mutex<Vec<String>>>,
    }

    async fn query(
        State(seen): State<Seen>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> Json<Value> {
        let key = headers
            .get("api-key")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        seen.keys.lock().unwrap().push(key);
        seen.bodies.lock().unwrap().push(body);
        Json(json!({
            "matches": [
                { "id": "a", "score": 0.91, "metadata": { "text": "Lavender blooms in June.", "source": "almanac" } },
                { "id": "b", "score": 0.80, "metadata": { "page": 3 } },
                { "id": "c", "score": 0.75, "metadata": { "text": "Bees love the borders." } }
            ],
            "namespace": "garden"
        }))
    }

    async fn spawn(app: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn store_for(host: String) -> PineconeStore {
        let config = PineconeConfig {
            index_host: host,
            api_key: Some("pc-key".to_string()),
            namespace: Some("garden".to_string()),
            ..PineconeConfig::default()
        };
        PineconeStore::new(&config, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn query_returns_passages_with_text_metadata() {
        let seen = Seen::default();
        let app = Router::new()
            .route("/query", post(query))
            .route(
                "/describe_index_stats",
                post(|| async { Json(json!({ "dimension": 1024, "totalVectorCount": 12 })) }),
            )
            .with_state(seen.clone());
        let store = store_for(spawn(app).await);

        let passages = store.similarity_search(&[0.1, 0.2], 3).await.unwrap();
        let texts: Vec<&str> = passages.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, vec!["Lavender blooms in June.", "Bees love the borders."]);
        assert_eq!(passages[0].source.as_deref(), Some("almanac"));

        let body = seen.bodies.lock().unwrap()[0].clone();
        assert_eq!(body["topK"], 3);
        assert_eq!(body["namespace"], "garden");
        assert_eq!(body["includeMetadata"], true);
        assert_eq!(seen.keys.lock().unwrap()[0], "pc-key");

        assert_eq!(store.dimension().await.unwrap(), Some(1024));
        assert!(store.health_check().await.unwrap());
    }

    #[tokio::test]
    async fn empty_namespace_is_left_out_of_query() {
        let seen = Seen::default();
        let app = Router::new()
            .route("/query", post(query))
            .with_state(seen.clone());
        let config = PineconeConfig {
            index_host: spawn(app).await,
            namespace: Some(String::new()),
            ..PineconeConfig::default()
        };
        let store = PineconeStore::new(&config, Duration::from_secs(5)).unwrap();

        store.similarity_search(&[0.1, 0.2], 2).await.unwrap();

        let body = seen.bodies.lock().unwrap()[0].clone();
        assert!(body.get("namespace").is_none(), "{}", body);
        assert_eq!(body["topK"], 2);
        assert_eq!(seen.keys.lock().unwrap()[0], "");
    }

    #[tokio::test]
    async fn rejected_key_is_unauthorized() {
        let app = Router::new().route("/query", post(|| async { StatusCode::UNAUTHORIZED }));
        let store = store_for(spawn(app).await);

        let err = store.similarity_search(&[0.1], 1).await.unwrap_err();
        assert!(matches!(err, StoreError::Unauthorized));
    }

    #[tokio::test]
    async fn unreachable_index_reports_unhealthy() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let store = store_for(format!("http://{}", addr));
        assert!(!store.health_check().await.unwrap());
        assert!(matches!(
            store.similarity_search(&[0.1], 1).await.unwrap_err(),
            StoreError::Unavailable(_)
        ));
    }

    #[test]
    fn bare_host_gets_https_scheme() {
        let config = PineconeConfig {
            index_host: "garden-abc123.svc.pinecone.io/".to_string(),
            ..PineconeConfig::default()
        };
        let store = PineconeStore::new(&config, Duration::from_secs(1)).unwrap();
        assert_eq!(store.index_host, "https://garden-abc123.svc.pinecone.io");
    }
}
