use std::time::Duration;

use feedview_core::{ExtractionResult, FetchFailure, SummaryResult};
use feedview_logging::{feed_info, feed_warn};
use futures_util::StreamExt;
use serde::de::DeserializeOwned;
use url::Url;

#[derive(Debug, Clone)]
pub struct ServiceSettings {
    /// Root of the content API, e.g. `https://reader.example/api`.
    pub api_base: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_bytes: u64,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            api_base: "http://127.0.0.1:8080/api".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_bytes: 2 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("http status {status}")]
    HttpStatus { status: u16, body: FetchFailure },
    #[error("request timed out")]
    Timeout,
    #[error("response too large (max {max_bytes} bytes)")]
    TooLarge { max_bytes: u64 },
    #[error("network error: {0}")]
    Network(String),
    #[error("malformed response: {0}")]
    Decode(String),
}

impl ServiceError {
    /// Converts into the text-bearing failure the controller understands.
    ///
    /// HTTP errors expose whatever `error`/`message` fields their JSON body
    /// carried; every other error exposes its display text as `message`.
    pub fn into_failure(self) -> FetchFailure {
        match self {
            ServiceError::HttpStatus { body, .. } => body,
            other => FetchFailure::from_message(other.to_string()),
        }
    }
}

/// The two request/response collaborators consumed by the detail view.
#[async_trait::async_trait]
pub trait ContentService: Send + Sync {
    async fn fetch_alternate(&self, link: &str) -> Result<ExtractionResult, ServiceError>;

    async fn fetch_summary(&self, article_id: &str) -> Result<SummaryResult, ServiceError>;
}

#[derive(Debug, Clone)]
pub struct HttpContentService {
    settings: ServiceSettings,
    client: reqwest::Client,
}

impl HttpContentService {
    pub fn new(settings: ServiceSettings) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ServiceError::Network(err.to_string()))?;
        Ok(Self { settings, client })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ServiceError> {
        let mut url = Url::parse(&self.settings.api_base)
            .map_err(|err| ServiceError::InvalidUrl(format!("{}: {err}", self.settings.api_base)))?;
        url.path_segments_mut()
            .map_err(|_| ServiceError::InvalidUrl(self.settings.api_base.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ServiceError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if let Some(content_len) = response.content_length() {
            if content_len > self.settings.max_bytes {
                return Err(ServiceError::TooLarge {
                    max_bytes: self.settings.max_bytes,
                });
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            if bytes.len() as u64 + chunk.len() as u64 > self.settings.max_bytes {
                return Err(ServiceError::TooLarge {
                    max_bytes: self.settings.max_bytes,
                });
            }
            bytes.extend_from_slice(&chunk);
        }

        if !status.is_success() {
            feed_warn!("{} answered {}", url.path(), status);
            // Error bodies are best effort: anything that is not the expected
            // JSON object simply contributes no text.
            let body = serde_json::from_slice::<FetchFailure>(&bytes).unwrap_or_default();
            return Err(ServiceError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_slice(&bytes).map_err(|err| ServiceError::Decode(err.to_string()))
    }
}

#[async_trait::async_trait]
impl ContentService for HttpContentService {
    async fn fetch_alternate(&self, link: &str) -> Result<ExtractionResult, ServiceError> {
        Url::parse(link).map_err(|err| ServiceError::InvalidUrl(format!("{link}: {err}")))?;
        let mut url = self.endpoint(&["extract"])?;
        url.query_pairs_mut().append_pair("url", link);
        feed_info!("fetching alternate extraction for {link}");
        self.get_json(url).await
    }

    async fn fetch_summary(&self, article_id: &str) -> Result<SummaryResult, ServiceError> {
        let url = self.endpoint(&["articles", article_id, "summary"])?;
        feed_info!("fetching summary for article {article_id}");
        self.get_json(url).await
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ServiceError {
    if err.is_timeout() {
        return ServiceError::Timeout;
    }
    ServiceError::Network(err.to_string())
}
