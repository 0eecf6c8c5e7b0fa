use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, RequestBuilder, Response, header};
use serde::Deserialize;
use std::env;
use std::time::{Duration, Instant};
use url::Url;

use crate::backend::Backend;
use crate::error::{Error, Result};
use crate::observability;
use crate::types::{
    ChatReply, ChatRequest, Conversation, ConversationId, ConversationSummary, ModelDirectory,
};

/// Default URL where the relay backend listens.
pub const DEFAULT_RELAY_URL: &str = "http://localhost:5001";

/// Environment variable consulted when no relay URL is given explicitly.
pub const RELAY_URL_ENV: &str = "COLLOQUY_RELAY_URL";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(25);

/// Client for the relay backend.
///
/// The relay fronts the hosted language-model API: it owns the API
/// credentials and the conversation store, and this client only ever
/// speaks JSON over HTTP to it.
#[derive(Debug, Clone)]
pub struct Relay {
    client: ReqwestClient,
    base_url: String,
    timeout: Duration,
}

impl Relay {
    /// Create a new relay client.
    ///
    /// The base URL can be provided directly, read from the COLLOQUY_RELAY_URL
    /// environment variable, or left to the localhost default.
    pub fn new(base_url: Option<String>) -> Result<Self> {
        Self::with_options(base_url, None)
    }

    /// Create a new client with custom settings.
    pub fn with_options(base_url: Option<String>, timeout: Option<Duration>) -> Result<Self> {
        let base_url = base_url
            .or_else(|| env::var(RELAY_URL_ENV).ok())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_RELAY_URL.to_string());
        Url::parse(&base_url)
            .map_err(|e| Error::url(format!("Invalid relay URL: {}", e), Some(e)))?;
        let base_url = base_url.trim_end_matches('/').to_string();

        let timeout = timeout.unwrap_or(DEFAULT_TIMEOUT);
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                Error::http_client(
                    format!("Failed to build HTTP client: {}", e),
                    Some(Box::new(e)),
                )
            })?;

        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    /// The base URL requests are issued against, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Create and return default headers for relay requests.
    fn default_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Issue a request and hand back the response if the relay accepted it.
    async fn dispatch(&self, request: RequestBuilder) -> Result<Response> {
        observability::RELAY_REQUESTS.click();
        let start = Instant::now();
        let result = request.headers(self.default_headers()).send().await;
        observability::RELAY_REQUEST_DURATION.add(start.elapsed().as_secs_f64());

        let response = result.map_err(|e| {
            observability::RELAY_REQUEST_ERRORS.click();
            if e.is_timeout() {
                Error::timeout(
                    format!("Request timed out: {}", e),
                    Some(self.timeout.as_secs_f64()),
                )
            } else if e.is_connect() {
                Error::connection(format!("Connection error: {}", e), Some(Box::new(e)))
            } else {
                Error::http_client(format!("Request failed: {}", e), Some(Box::new(e)))
            }
        })?;

        if !response.status().is_success() {
            observability::RELAY_REQUEST_ERRORS.click();
            return Err(Self::process_error_response(response).await);
        }

        Ok(response)
    }

    /// Process relay response errors and convert to our Error type.
    async fn process_error_response(response: Response) -> Error {
        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return Error::http_client(
                    format!("Failed to read error response: {}", e),
                    Some(Box::new(e)),
                );
            }
        };
        error_for_response(status.as_u16(), status.canonical_reason(), &body)
    }

    /// Fetch the directory of models the relay is willing to serve.
    pub async fn fetch_models(&self) -> Result<ModelDirectory> {
        let url = self.endpoint("models");
        let response = self.dispatch(self.client.get(&url)).await?;
        response.json::<ModelDirectory>().await.map_err(|e| {
            Error::serialization(
                format!("Failed to parse response: {}", e),
                Some(Box::new(e)),
            )
        })
    }

    /// List stored conversations, most recent first.
    ///
    /// Ordering is whatever the relay returns; the client does not re-sort.
    pub async fn list_conversations(&self) -> Result<Vec<ConversationSummary>> {
        let url = self.endpoint("conversations");
        let response = self.dispatch(self.client.get(&url)).await?;
        response
            .json::<Vec<ConversationSummary>>()
            .await
            .map_err(|e| {
                Error::serialization(
                    format!("Failed to parse response: {}", e),
                    Some(Box::new(e)),
                )
            })
    }

    /// Fetch one conversation with its full message history.
    pub async fn get_conversation(&self, id: &ConversationId) -> Result<Conversation> {
        let url = self.endpoint(&format!("conversations/{}", id));
        let response = self.dispatch(self.client.get(&url)).await?;
        response.json::<Conversation>().await.map_err(|e| {
            Error::serialization(
                format!("Failed to parse response: {}", e),
                Some(Box::new(e)),
            )
        })
    }

    /// Create a fresh, empty conversation and return its identifier.
    pub async fn create_conversation(&self) -> Result<ConversationId> {
        #[derive(Deserialize)]
        struct ConversationCreated {
            conversation_id: ConversationId,
        }

        let url = self.endpoint("conversations");
        let response = self.dispatch(self.client.post(&url)).await?;
        let created = response
            .json::<ConversationCreated>()
            .await
            .map_err(|e| {
                Error::serialization(
                    format!("Failed to parse response: {}", e),
                    Some(Box::new(e)),
                )
            })?;
        Ok(created.conversation_id)
    }

    /// Delete one conversation.
    pub async fn delete_conversation(&self, id: &ConversationId) -> Result<()> {
        let url = self.endpoint(&format!("conversations/{}", id));
        self.dispatch(self.client.delete(&url)).await?;
        Ok(())
    }

    /// Send one user message and wait for the model's reply.
    ///
    /// When the request carries no conversation id, the relay mints a new
    /// conversation and reports its id in the reply.
    pub async fn chat(&self, request: ChatRequest) -> Result<ChatReply> {
        if request.message.trim().is_empty() {
            return Err(Error::validation(
                "message must not be empty",
                Some("message".to_string()),
            ));
        }

        let url = self.endpoint("chat");
        let response = self.dispatch(self.client.post(&url).json(&request)).await?;
        response.json::<ChatReply>().await.map_err(|e| {
            Error::serialization(
                format!("Failed to parse response: {}", e),
                Some(Box::new(e)),
            )
        })
    }
}

/// Extract the failure message from a non-2xx response body.
///
/// The relay reports failures as `{"error": "..."}`; when that shape is
/// absent, fall back to the raw body, then to the status line.
fn error_for_response(status_code: u16, canonical_reason: Option<&str>, body: &str) -> Error {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: Option<String>,
    }

    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.error)
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                canonical_reason.unwrap_or("request failed").to_string()
            } else {
                body.to_string()
            }
        });

    error_for_status(status_code, message)
}

/// Map an HTTP status code and error message onto our Error type.
fn error_for_status(status_code: u16, message: String) -> Error {
    match status_code {
        400 => Error::bad_request(message, None),
        404 => Error::not_found(message),
        408 => Error::timeout(message, None),
        500 => Error::internal_server(message),
        502..=504 => Error::service_unavailable(message),
        _ => Error::api(status_code, message),
    }
}

#[async_trait::async_trait]
impl Backend for Relay {
    async fn fetch_models(&self) -> Result<ModelDirectory> {
        Relay::fetch_models(self).await
    }

    async fn list_conversations(&self) -> Result<Vec<ConversationSummary>> {
        Relay::list_conversations(self).await
    }

    async fn get_conversation(&self, id: &ConversationId) -> Result<Conversation> {
        Relay::get_conversation(self, id).await
    }

    async fn create_conversation(&self) -> Result<ConversationId> {
        Relay::create_conversation(self).await
    }

    async fn delete_conversation(&self, id: &ConversationId) -> Result<()> {
        Relay::delete_conversation(self, id).await
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatReply> {
        Relay::chat(self, request).await
    }
}
