//! Where credentials come from.
//!
//! [`TokenSource`] is the seam between the bootstrap controller and the
//! issuer. [`HttpTokenSource`] talks to the issuer's `GET /token` endpoint.

use std::future::Future;

use heydoc_models::{ErrorResponse, TokenResponse};
use reqwest::Url;
use tracing::debug;

use crate::credentials::{IssuedToken, TokenRequest};
use crate::error::SdkError;

/// Anything that can turn a [`TokenRequest`] into a signed token.
pub trait TokenSource: Send + Sync {
    /// Request one credential. Each call is independent.
    fn fetch_token(
        &self,
        request: &TokenRequest,
    ) -> impl Future<Output = Result<IssuedToken, SdkError>> + Send;
}

/// Fetches credentials from the issuer over HTTP.
///
/// Status mapping:
///
/// | Response | Error |
/// |----------|-------|
/// | 4xx      | [`SdkError::InvalidRequest`] |
/// | 5xx      | [`SdkError::Issuance`] |
/// | transport failure | [`SdkError::Http`] |
#[derive(Debug, Clone)]
pub struct HttpTokenSource {
    http: reqwest::Client,
    base_url: String,
}

impl HttpTokenSource {
    /// Target the issuer at `base_url` (e.g. `http://localhost:3000`).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Target the issuer with a caller-supplied client (timeouts, proxies…).
    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// The issuer base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn token_url(&self, request: &TokenRequest) -> Result<Url, SdkError> {
        let mut params = vec![
            ("room", request.room.as_str()),
            ("username", request.identity.as_str()),
        ];
        if request.kind.is_agent() {
            params.push(("isAgent", "true"));
        }

        let endpoint = format!("{}/token", self.base_url.trim_end_matches('/'));
        Url::parse_with_params(&endpoint, &params)
            .map_err(|e| SdkError::Config(format!("invalid token URL {endpoint}: {e}")))
    }
}

impl TokenSource for HttpTokenSource {
    async fn fetch_token(&self, request: &TokenRequest) -> Result<IssuedToken, SdkError> {
        let url = self.token_url(request)?;
        debug!(identity = %request.identity, kind = %request.kind, "requesting token");

        let res = self.http.get(url).send().await?;
        let status = res.status();
        let text = res.text().await?;

        if status.is_success() {
            let body: TokenResponse = serde_json::from_str(&text)?;
            return Ok(IssuedToken::new(request, body.token));
        }

        let message = serde_json::from_str::<ErrorResponse>(&text)
            .map(|body| body.error)
            .unwrap_or(text);

        if status.is_client_error() {
            Err(SdkError::InvalidRequest(message))
        } else {
            Err(SdkError::Issuance(format!("{status}: {message}")))
        }
    }
}
