/// IAM bearer-token retrieval from an API key
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};

/// Public identity service endpoint
pub const DEFAULT_IAM_ENDPOINT: &str = "https://iam.cloud.ibm.com";

const GRANT_TYPE: &str = "urn:ibm:params:oauth:grant-type:apikey";

/// Request timeout in seconds
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Token-endpoint response fields the classifier cares about
#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default, rename = "errorMessage")]
    error_message: Option<String>,
}

/// Client for the identity service's token endpoint
#[derive(Clone)]
pub struct IamClient {
    client: Client,
    endpoint: String,
}

impl IamClient {
    /// Create a client against an identity endpoint (no trailing slash)
    pub fn new(endpoint: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::TransferFailed(format!("failed to create HTTP client: {}", e)))?;
        Ok(Self { client, endpoint })
    }

    /// Exchange an API key for a bearer token.
    ///
    /// One fresh request per call; nothing is cached and expiry is not
    /// tracked. Retries stay inside the transport layer.
    pub async fn request_bearer_token(&self, api_key: &str) -> Result<String> {
        let url = format!("{}/identity/token", self.endpoint);
        debug!("POST {}", url);

        let params = [("grant_type", GRANT_TYPE), ("apikey", api_key)];
        let response = self
            .client
            .post(&url)
            .form(&params)
            .send()
            .await
            .map_err(|e| Error::TransferFailed(format!("failed to reach {}: {}", url, e)))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| Error::TransferFailed(format!("failed to read response: {}", e)))?;

        classify_response(status, &body)
    }
}

/// Turn a raw token-endpoint response into a bearer token or a typed
/// failure. A service-level error message wins over token inspection.
fn classify_response(status: u16, body: &str) -> Result<String> {
    if status != 200 {
        return Err(Error::HttpError {
            status,
            body: body.to_string(),
        });
    }

    let parsed: TokenResponse = serde_json::from_str(body)
        .map_err(|e| Error::MalformedResponse(format!("unparseable token payload: {}", e)))?;

    if let Some(message) = parsed.error_message.filter(|m| !m.is_empty()) {
        return Err(Error::ApiError { message });
    }

    match parsed.access_token {
        Some(token) if !token.is_empty() && token != "null" => Ok(token),
        _ => Err(Error::MalformedResponse(
            "token endpoint returned no access_token".to_string(),
        )),
    }
}
