//! IAM Authentication
//!
//! Exchanges the API key from the `IC_API_KEY` environment variable for a
//! bearer token at the IAM identity service. The token is obtained once per
//! run; a failed exchange is fatal.

use anyhow::{Context, Result};

use super::http::HttpClient;

/// Environment variable holding the IBM Cloud API key.
pub const API_KEY_ENV: &str = "IC_API_KEY";

/// IAM identity service token endpoint.
pub const IAM_TOKEN_URL: &str = "https://iam.cloud.ibm.com/identity/token";

const APIKEY_GRANT_TYPE: &str = "urn:ibm:params:oauth:grant-type:apikey";

/// Read the API key from the environment. Absence is fatal.
pub fn api_key_from_env() -> Result<String> {
    std::env::var(API_KEY_ENV).with_context(|| {
        format!("IBM Cloud API key not found. Set the {API_KEY_ENV} environment variable")
    })
}

/// Obtain a bearer token for the given API key.
pub async fn get_iam_token(http: &HttpClient, api_key: &str) -> Result<String> {
    get_iam_token_at(http, IAM_TOKEN_URL, api_key).await
}

/// Token exchange against an explicit endpoint (overridable in tests).
pub async fn get_iam_token_at(http: &HttpClient, endpoint: &str, api_key: &str) -> Result<String> {
    let body = http
        .post_form(
            endpoint,
            &[("grant_type", APIKEY_GRANT_TYPE), ("apikey", api_key)],
        )
        .await
        .context("Invalid token request")?;

    body.get("access_token")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .context("IAM response did not contain an access_token")
}
