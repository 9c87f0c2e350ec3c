//! HTTP transport for the knowledge base service.
//!
//! [`KnowledgeBase`] owns the connection to the service: it attaches the
//! stored credential to every request and classifies every failure into the
//! crate's [`Error`] taxonomy. Retry policy, if any, belongs to callers.

use std::env;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::{Client as ReqwestClient, Response, header};
use serde::Deserialize;

use crate::attachment::Attachment;
use crate::credentials::CredentialStore;
use crate::error::{Error, Result};
use crate::observability;
use crate::types::{CompletionRequest, CompletionResponse, FileInfo, TokenResponse};

const DEFAULT_BASE_URL: &str = "http://localhost:8000/";
const BASE_URL_ENV: &str = "KBASE_URL";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// The interface the stateful components speak to the service through.
///
/// [`KnowledgeBase`] is the production implementation; tests substitute
/// canned ones.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Exchange a username and password for a bearer token.
    async fn exchange_credentials(&self, username: &str, password: &str) -> Result<TokenResponse>;

    /// Submit a chat turn and return the assistant's answer.
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse>;

    /// Upload a document for ingestion.
    async fn upload(&self, attachment: &Attachment) -> Result<FileInfo>;
}

/// Client for the knowledge base service.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    http: ReqwestClient,
    base_url: String,
    credentials: CredentialStore,
    timeout: Duration,
}

impl KnowledgeBase {
    /// Create a new client.
    ///
    /// The base URL is read from the KBASE_URL environment variable, falling
    /// back to the local development default.
    pub fn new(credentials: CredentialStore) -> Result<Self> {
        Self::with_options(credentials, None, None)
    }

    /// Create a new client with custom settings.
    pub fn with_options(
        credentials: CredentialStore,
        base_url: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let base_url = base_url
            .or_else(|| env::var(BASE_URL_ENV).ok())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = normalize_base_url(base_url)?;

        let timeout = timeout.unwrap_or(DEFAULT_TIMEOUT);
        let http = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                Error::network(
                    format!("Failed to build HTTP client: {}", e),
                    Some(Box::new(e)),
                )
            })?;

        Ok(Self {
            http,
            base_url,
            credentials,
            timeout,
        })
    }

    /// Returns the normalized base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Create and return default headers for authenticated requests.
    fn default_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(token) = self.credentials.get()
            && let Ok(value) = HeaderValue::from_str(&format!("Bearer {token}"))
        {
            headers.insert(header::AUTHORIZATION, value);
        }
        headers
    }

    /// Classify a request that failed before producing a response.
    fn classify_send_error(&self, err: reqwest::Error) -> Error {
        observability::CLIENT_REQUEST_ERRORS.click();
        let message = if err.is_timeout() {
            format!(
                "request timed out after {} seconds: {}",
                self.timeout.as_secs(),
                err
            )
        } else if err.is_connect() {
            format!("connection error: {}", err)
        } else {
            format!("request failed: {}", err)
        };
        Error::network(message, Some(Box::new(err)))
    }

    /// Process API response errors and convert to our Error type.
    async fn process_error_response(response: Response) -> Error {
        let status = response.status().as_u16();

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return Error::malformed(
                    format!("failed to read error response: {}", e),
                    Some(Box::new(e)),
                );
            }
        };

        // The service reports errors as {"detail": "..."}.
        #[derive(Deserialize)]
        struct ErrorBody {
            detail: Option<String>,
        }

        let detail = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.detail);

        let err = classify_status(status, detail);
        observability::CLIENT_REQUEST_ERRORS.click();
        if err.is_unauthorized() {
            observability::CLIENT_UNAUTHORIZED.click();
        }
        err
    }

    /// Exchange a username and password for a bearer token.
    ///
    /// This is the one endpoint that does not attach the stored credential.
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenResponse> {
        let url = format!("{}login/token", self.base_url);
        observability::CLIENT_REQUESTS.click();

        let response = self
            .http
            .post(&url)
            .header(header::ACCEPT, HeaderValue::from_static("application/json"))
            .form(&[("username", username), ("password", password)])
            .send()
            .await
            .map_err(|e| self.classify_send_error(e))?;

        if !response.status().is_success() {
            return Err(Self::process_error_response(response).await);
        }

        response.json::<TokenResponse>().await.map_err(|e| {
            Error::malformed(
                format!("failed to parse token response: {}", e),
                Some(Box::new(e)),
            )
        })
    }

    /// Submit a chat turn and return the assistant's answer.
    pub async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        let url = format!("{}chat/completions", self.base_url);
        observability::CLIENT_REQUESTS.click();

        let response = self
            .http
            .post(&url)
            .headers(self.default_headers())
            .json(request)
            .send()
            .await
            .map_err(|e| self.classify_send_error(e))?;

        if !response.status().is_success() {
            return Err(Self::process_error_response(response).await);
        }

        response.json::<CompletionResponse>().await.map_err(|e| {
            Error::malformed(
                format!("failed to parse completion response: {}", e),
                Some(Box::new(e)),
            )
        })
    }

    /// Upload a document for ingestion.
    pub async fn upload(&self, attachment: &Attachment) -> Result<FileInfo> {
        let url = format!("{}files/upload", self.base_url);
        observability::CLIENT_REQUESTS.click();

        let part = Part::bytes(attachment.bytes().to_vec())
            .file_name(attachment.name().to_string());
        let form = Form::new().part("file", part);

        let response = self
            .http
            .post(&url)
            .headers(self.default_headers())
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.classify_send_error(e))?;

        if !response.status().is_success() {
            return Err(Self::process_error_response(response).await);
        }

        response.json::<FileInfo>().await.map_err(|e| {
            Error::malformed(
                format!("failed to parse upload response: {}", e),
                Some(Box::new(e)),
            )
        })
    }
}

#[async_trait::async_trait]
impl Transport for KnowledgeBase {
    async fn exchange_credentials(&self, username: &str, password: &str) -> Result<TokenResponse> {
        self.login(username, password).await
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        KnowledgeBase::complete(self, request).await
    }

    async fn upload(&self, attachment: &Attachment) -> Result<FileInfo> {
        KnowledgeBase::upload(self, attachment).await
    }
}

/// Map an HTTP status code and optional detail to the error taxonomy.
fn classify_status(status: u16, detail: Option<String>) -> Error {
    match status {
        401 => Error::unauthorized(detail.unwrap_or_else(|| "credential rejected".to_string())),
        500..=599 => Error::server(status, detail.unwrap_or_else(|| "server error".to_string())),
        _ => Error::client(status, detail),
    }
}

/// Validate the base URL and guarantee a trailing slash.
fn normalize_base_url(base_url: String) -> Result<String> {
    url::Url::parse(&base_url).map_err(|e| {
        Error::validation(
            format!("invalid base URL {base_url:?}: {e}"),
            Some("base_url".to_string()),
        )
    })?;
    if base_url.ends_with('/') {
        Ok(base_url)
    } else {
        Ok(format!("{base_url}/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store() -> (tempfile::TempDir, CredentialStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::with_path(dir.path().join("token"));
        (dir, store)
    }

    #[test]
    fn test_client_creation() {
        let (_dir, store) = test_store();
        let client = KnowledgeBase::with_options(
            store.clone(),
            Some("https://kb.example.com/".to_string()),
            Some(Duration::from_secs(30)),
        )
        .unwrap();
        assert_eq!(client.base_url(), "https://kb.example.com/");
        assert_eq!(client.timeout, Duration::from_secs(30));
    }

    #[test]
    fn base_url_gains_trailing_slash() {
        let (_dir, store) = test_store();
        let client =
            KnowledgeBase::with_options(store, Some("https://kb.example.com".to_string()), None)
                .unwrap();
        assert_eq!(client.base_url(), "https://kb.example.com/");
    }

    #[test]
    fn invalid_base_url_rejected() {
        let (_dir, store) = test_store();
        let err =
            KnowledgeBase::with_options(store, Some("not a url".to_string()), None).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn bearer_header_tracks_store() {
        let (_dir, store) = test_store();
        let client = KnowledgeBase::with_options(
            store.clone(),
            Some("https://kb.example.com/".to_string()),
            None,
        )
        .unwrap();

        assert!(!client.default_headers().contains_key(header::AUTHORIZATION));

        store.set("tok-123").unwrap();
        let headers = client.default_headers();
        assert_eq!(
            headers.get(header::AUTHORIZATION).unwrap(),
            "Bearer tok-123"
        );
    }

    #[test]
    fn status_classification() {
        assert!(classify_status(401, None).is_unauthorized());
        assert!(classify_status(500, None).is_server());
        assert!(classify_status(503, None).is_server());

        let err = classify_status(422, Some("field required".to_string()));
        assert!(err.is_client());
        assert_eq!(err.status_code(), Some(422));
        assert_eq!(err.detail(), Some("field required"));
    }
}
