//! HTTP client for a remote embedding service.

use crate::config::EmbeddingConfig;
use crate::error::EmbeddingError;
use log::{debug, warn};

/// Expected embedding dimensionality.
pub const EMBEDDING_DIMENSIONS: usize = 768;

/// Response format from the embedding API.
#[derive(serde::Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

/// Client for a remote embedding service.
///
/// Issues one request per text. Failures are never retried; retry policy
/// belongs to the caller.
pub struct EmbeddingClient {
    client: reqwest::Client,
    config: EmbeddingConfig,
}

impl EmbeddingClient {
    /// Create a client with the fixed request timeout from the config.
    pub fn new(config: EmbeddingConfig) -> Result<Self, EmbeddingError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| EmbeddingError::Api(format!("failed to build http client: {err}")))?;
        Ok(Self { client, config })
    }

    /// Sets a custom reqwest client (e.g. for testing with `no_proxy()`).
    #[must_use]
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Expected embedding dimensionality.
    pub fn dimensions(&self) -> usize {
        EMBEDDING_DIMENSIONS
    }

    /// Generate an embedding vector for one text.
    ///
    /// A vector whose dimensionality differs from
    /// [`EMBEDDING_DIMENSIONS`] is still returned; models may
    /// legitimately differ, so a mismatch only logs a warning.
    pub async fn generate_embedding(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let url = format!("{}/api/embeddings", self.config.api_url);
        let body = serde_json::json!({
            "model": self.config.model,
            "prompt": text,
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_else(|_| "unknown".into());
            return Err(EmbeddingError::Api(format!(
                "embedding request failed with {status}: {body_text}"
            )));
        }

        let parsed: EmbeddingResponse = response.json().await.map_err(|err| {
            EmbeddingError::InvalidResponse(format!("missing or malformed embedding field: {err}"))
        })?;
        if parsed.embedding.len() != EMBEDDING_DIMENSIONS {
            warn!(
                "embedding dimension mismatch (model={}, expected={}, got={})",
                self.config.model,
                EMBEDDING_DIMENSIONS,
                parsed.embedding.len()
            );
        }
        debug!(
            "generated embedding (model={}, text_len={}, dimensions={})",
            self.config.model,
            text.len(),
            parsed.embedding.len()
        );
        Ok(parsed.embedding)
    }

    /// Generate embeddings for a batch of texts, one request per text,
    /// results in input order. An empty batch makes no network call; the
    /// first per-text failure fails the whole batch.
    pub async fn generate_embeddings(
        &self,
        texts: &[String],
    ) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.generate_embedding(text).await?);
        }
        Ok(embeddings)
    }

    /// A fresh all-zero vector of the expected dimensionality.
    pub fn empty_embedding(&self) -> Vec<f32> {
        vec![0.0; EMBEDDING_DIMENSIONS]
    }
}

/// Map a reqwest error to the embedding error taxonomy.
fn map_transport_error(err: reqwest::Error) -> EmbeddingError {
    if err.is_connect() || err.is_timeout() {
        EmbeddingError::Connectivity(err.to_string())
    } else {
        EmbeddingError::Api(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{EMBEDDING_DIMENSIONS, EmbeddingClient};
    use crate::config::EmbeddingConfig;
    use crate::error::EmbeddingError;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn no_proxy_client() -> reqwest::Client {
        reqwest::Client::builder().no_proxy().build().expect("client")
    }

    fn test_client(api_url: &str) -> EmbeddingClient {
        let config = EmbeddingConfig {
            api_url: api_url.to_string(),
            model: "test-model".to_string(),
            ..EmbeddingConfig::default()
        };
        EmbeddingClient::new(config)
            .expect("client")
            .with_client(no_proxy_client())
    }

    #[tokio::test]
    async fn sends_model_and_prompt_to_embeddings_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embeddings"))
            .and(body_partial_json(json!({
                "model": "test-model",
                "prompt": "hello",
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "embedding": vec![0.5; EMBEDDING_DIMENSIONS] })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let embedding = client.generate_embedding("hello").await.expect("embedding");
        assert_eq!(embedding.len(), EMBEDDING_DIMENSIONS);
        assert!((embedding[0] - 0.5).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn mismatched_dimensions_are_returned_not_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embeddings"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "embedding": [1.0, 2.0, 3.0] })),
            )
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let embedding = client.generate_embedding("short").await.expect("embedding");
        assert_eq!(embedding, vec![1.0, 2.0, 3.0]);
    }

    #[tokio::test]
    async fn missing_embedding_field_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "vectors": [] })))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let result = client.generate_embedding("hello").await;
        assert!(matches!(
            result,
            Err(EmbeddingError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn non_success_status_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embeddings"))
            .respond_with(ResponseTemplate::new(500).set_body_string("model not loaded"))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let result = client.generate_embedding("hello").await;
        match result {
            Err(EmbeddingError::Api(message)) => assert!(message.contains("model not loaded")),
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn refused_connection_is_connectivity_error() {
        // Port 9 (discard) is expected to refuse connections.
        let client = test_client("http://127.0.0.1:9");
        let result = client.generate_embedding("hello").await;
        assert!(matches!(result, Err(EmbeddingError::Connectivity(_))));
    }

    #[tokio::test]
    async fn batch_preserves_input_order() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embeddings"))
            .and(body_partial_json(json!({ "prompt": "first" })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "embedding": [1.0] })),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/embeddings"))
            .and(body_partial_json(json!({ "prompt": "second" })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "embedding": [2.0] })),
            )
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let results = client
            .generate_embeddings(&["first".to_string(), "second".to_string()])
            .await
            .expect("batch");
        assert_eq!(results, vec![vec![1.0], vec![2.0]]);
    }

    #[tokio::test]
    async fn batch_fails_fast_on_first_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embeddings"))
            .and(body_partial_json(json!({ "prompt": "good" })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "embedding": [1.0] })),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/embeddings"))
            .and(body_partial_json(json!({ "prompt": "bad" })))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let result = client
            .generate_embeddings(&["good".to_string(), "bad".to_string(), "never".to_string()])
            .await;
        assert!(matches!(result, Err(EmbeddingError::Api(_))));
    }

    #[tokio::test]
    async fn empty_batch_makes_no_network_call() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "embedding": [] })))
            .expect(0)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let results = client.generate_embeddings(&[]).await.expect("batch");
        assert_eq!(results, Vec::<Vec<f32>>::new());
    }

    #[test]
    fn empty_embedding_returns_fresh_zero_vectors() {
        let client = test_client("http://localhost");
        let mut first = client.empty_embedding();
        let second = client.empty_embedding();

        assert_eq!(first.len(), EMBEDDING_DIMENSIONS);
        assert!(first.iter().all(|value| *value == 0.0));
        first[0] = 1.0;
        assert!(second.iter().all(|value| *value == 0.0));
        assert_eq!(client.dimensions(), EMBEDDING_DIMENSIONS);
    }
}
