//! VPC Client
//!
//! Per-region client for the VPC IaaS API, combining the shared HTTP client
//! with the region's endpoint, the bearer token and the API version query
//! parameters. The all-regions loop builds one client per region instead of
//! mutating a shared endpoint.

use anyhow::{Context, Result};
use serde_json::Value;
use url::Url;

use super::http::HttpClient;
use super::regions::Region;
use crate::config::ApiConfig;

/// Endpoint used for region listing/lookup before any regional client exists.
pub const DEFAULT_REGIONS_ENDPOINT: &str = "https://us-south.iaas.cloud.ibm.com";

/// Global tagging service endpoint.
pub const DEFAULT_TAGGING_ENDPOINT: &str = "https://tags.global-search-tagging.cloud.ibm.com";

/// Page size requested from paginated listings.
pub const PAGE_LIMIT: u32 = 100;

/// Per-region VPC client
#[derive(Clone)]
pub struct VpcClient {
    http: HttpClient,
    token: String,
    endpoint: String,
    tagging_endpoint: String,
    api_query: String,
    pub region: String,
}

impl VpcClient {
    pub fn new(
        http: HttpClient,
        token: String,
        region: &Region,
        api: &ApiConfig,
        tagging_endpoint: &str,
    ) -> Self {
        Self {
            http,
            token,
            endpoint: region.endpoint.clone(),
            tagging_endpoint: tagging_endpoint.to_string(),
            api_query: api.query_string(),
            region: region.name.clone(),
        }
    }

    /// Make a GET request with the client's bearer token.
    pub async fn get(&self, url: &str) -> Result<Value> {
        self.http.get(url, &self.token).await
    }

    /// First-page URL for a regional collection listing, e.g. `instances`.
    pub fn list_url(&self, collection: &str) -> String {
        format!(
            "{}/v1/{}?{}&limit={}",
            self.endpoint, collection, self.api_query, PAGE_LIMIT
        )
    }

    /// Lookup URL for a resource's network interface, keyed by resource id
    /// and interface id.
    pub fn interface_url(&self, collection: &str, resource_id: &str, interface_id: &str) -> String {
        format!(
            "{}/v1/{}/{}/network_interfaces/{}?{}",
            self.endpoint, collection, resource_id, interface_id, self.api_query
        )
    }

    /// First-page URL for the global tag listing attached to a CRN.
    pub fn tags_url(&self, crn: &str) -> Result<String> {
        let url = Url::parse_with_params(
            &format!("{}/v3/tags", self.tagging_endpoint),
            &[("attached_to", crn), ("limit", &PAGE_LIMIT.to_string())],
        )
        .context("Failed to build tag listing URL")?;
        Ok(url.into())
    }
}
