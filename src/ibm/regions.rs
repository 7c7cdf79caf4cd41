//! Region Resolver
//!
//! Resolves the configured region name into the list of regions to query.
//! A named region must exist and be `available`; the `all` sentinel expands
//! to every available region returned by the provider.

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use super::http::HttpClient;

/// Sentinel region name that expands to every available region.
pub const ALL_REGIONS: &str = "all";

/// A region descriptor as returned by `GET /v1/regions`.
#[derive(Debug, Clone, Deserialize)]
pub struct Region {
    pub name: String,
    /// Regional IaaS API endpoint, e.g. `https://us-south.iaas.cloud.ibm.com`.
    pub endpoint: String,
    pub status: String,
}

impl Region {
    pub fn is_available(&self) -> bool {
        self.status == "available"
    }
}

#[derive(Deserialize)]
struct RegionList {
    regions: Vec<Region>,
}

/// Resolve the configured region string into the ordered list of regions to
/// query. Fatal if a named region cannot be resolved or is unavailable.
pub async fn resolve_regions(
    http: &HttpClient,
    token: &str,
    base_endpoint: &str,
    configured: &str,
    api_query: &str,
) -> Result<Vec<Region>> {
    if configured == ALL_REGIONS {
        let url = format!("{base_endpoint}/v1/regions?{api_query}");
        let body = http
            .get(&url, token)
            .await
            .context("Failed to list regions")?;
        let list: RegionList =
            serde_json::from_value(body).context("Unexpected region list payload")?;

        let mut regions = Vec::new();
        for region in list.regions {
            if region.is_available() {
                regions.push(region);
            } else {
                tracing::warn!("Skipping region {} (status: {})", region.name, region.status);
            }
        }
        if regions.is_empty() {
            bail!("No available regions returned by the provider");
        }
        Ok(regions)
    } else {
        let url = format!("{base_endpoint}/v1/regions/{configured}?{api_query}");
        let body = http
            .get(&url, token)
            .await
            .with_context(|| format!("Failed to look up region {configured}"))?;
        let region: Region =
            serde_json::from_value(body).context("Unexpected region payload")?;

        if !region.is_available() {
            bail!(
                "Region {} not available or invalid (status: {})",
                region.name,
                region.status
            );
        }
        Ok(vec![region])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn region_deserializes_from_api_payload() {
        let region: Region = serde_json::from_value(json!({
            "name": "us-south",
            "endpoint": "https://us-south.iaas.cloud.ibm.com",
            "status": "available",
            "href": "https://us-south.iaas.cloud.ibm.com/v1/regions/us-south"
        }))
        .unwrap();

        assert_eq!(region.name, "us-south");
        assert!(region.is_available());
    }

    #[test]
    fn unavailable_region_is_flagged() {
        let region = Region {
            name: "eu-de".to_string(),
            endpoint: "https://eu-de.iaas.cloud.ibm.com".to_string(),
            status: "unavailable".to_string(),
        };
        assert!(!region.is_available());
    }
}
