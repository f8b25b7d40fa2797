use reqwest::Url;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use crate::api::Endpoint;
use crate::error::ClientError;

// ============================================================================
// TRANSPORT
// ============================================================================

/// A completed response: the body and the HTTP status code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        HttpResponse { status, body: body.into() }
    }

    /// The API signals success with 200 and nothing else
    pub fn is_found(&self) -> bool {
        self.status == 200
    }
}

/// Issues a single GET and resolves once the response has been read.
/// One call is one request: no retries, no caching.
pub trait HttpGet {
    fn get(&self, url: &Url) -> impl Future<Output = Result<HttpResponse, ClientError>> + Send;
}

/// `HttpGet` backed by a pooled reqwest client
#[derive(Debug, Clone)]
pub struct ReqwestHttp {
    client: reqwest::Client,
}

impl ReqwestHttp {
    /// Without a timeout a hung request simply never completes, as on the site.
    pub fn new(timeout: Option<Duration>) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(ReqwestHttp { client: builder.build()? })
    }
}

impl HttpGet for ReqwestHttp {
    async fn get(&self, url: &Url) -> Result<HttpResponse, ClientError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(HttpResponse { status, body })
    }
}

// ============================================================================
// API CLIENT
// ============================================================================

/// Binds an `HttpGet` to the server hosting the results API
#[derive(Debug, Clone)]
pub struct ApiClient<H> {
    http: H,
    base_url: Url,
}

impl<H: HttpGet> ApiClient<H> {
    pub fn new(http: H, base_url: Url) -> Self {
        ApiClient { http, base_url }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn http(&self) -> &H {
        &self.http
    }

    /// Fetches an endpoint and returns the raw response whatever its status
    pub async fn get(&self, endpoint: &Endpoint) -> Result<HttpResponse, ClientError> {
        let url = endpoint.url(&self.base_url)?;
        debug!(%url, "GET");
        let response = self.http.get(&url).await?;
        debug!(%url, status = response.status, bytes = response.body.len(), "response");
        Ok(response)
    }

    /// Fetches an endpoint and decodes its JSON body.
    /// Status != 200 is `NotFound`; a body that does not decode is `BadResponse`.
    pub async fn fetch_json<T: DeserializeOwned>(&self, endpoint: &Endpoint) -> Result<T, ClientError> {
        let response = self.get(endpoint).await?;
        let url = endpoint.url(&self.base_url)?.to_string();
        decode_response(&response, url)
    }
}

/// Classifies a completed response and decodes it
pub fn decode_response<T: DeserializeOwned>(response: &HttpResponse, url: String) -> Result<T, ClientError> {
    if !response.is_found() {
        return Err(ClientError::NotFound { status: response.status, url });
    }

    serde_json::from_str(&response.body).map_err(|source| {
        warn!(%url, error = %source, "could not decode response body");
        ClientError::BadResponse { url, source }
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RaceInfo;

    #[test]
    fn test_decode_response_not_found() {
        let response = HttpResponse::new(404, "404 Not Found: Could not find the requested race\n");
        let err = decode_response::<RaceInfo>(&response, "http://x/api/raceinfo/raceid/1".into()).unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("HTTP 404"));
    }

    #[test]
    fn test_decode_response_bad_body() {
        let response = HttpResponse::new(200, "{not json");
        let err = decode_response::<RaceInfo>(&response, "http://x/api/raceinfo/raceid/1".into()).unwrap_err();
        assert!(err.is_bad_response());
    }

    #[test]
    fn test_decode_response_ok() {
        let response = HttpResponse::new(200, r#"{"raceid": 1, "location": "Falun"}"#);
        let info: RaceInfo = decode_response(&response, "http://x".into()).unwrap();
        assert_eq!(info.location.as_deref(), Some("Falun"));
    }

    #[test]
    fn test_other_success_codes_are_not_found() {
        // 204 means the race exists but has no results
        let response = HttpResponse::new(204, "[]");
        let err = decode_response::<Vec<RaceInfo>>(&response, "http://x".into()).unwrap_err();
        assert!(err.is_not_found());
    }
}
