//! Inventory pipeline
//!
//! Drives the collect → enrich → group → assemble pipeline over every
//! resolved region and both resource kinds. Execution is strictly
//! sequential; the first failed request aborts the whole run with no
//! partial output.
//!
//! # Module Structure
//!
//! - [`collector`] - paginated instance and bare-metal listing
//! - [`enricher`] - per-host attribute record construction
//! - [`groups`] - group label derivation and sanitization
//! - [`assembler`] - terminal inventory document

pub mod assembler;
pub mod collector;
pub mod enricher;
pub mod groups;

use anyhow::Result;

use crate::config::InventoryConfig;
use crate::ibm::client::{VpcClient, DEFAULT_REGIONS_ENDPOINT, DEFAULT_TAGGING_ENDPOINT};
use crate::ibm::http::HttpClient;
use crate::ibm::regions;

use assembler::Inventory;
use collector::ResourceKind;

/// Service base URLs; overridable so tests can point at a mock server.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub regions: String,
    pub tagging: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            regions: DEFAULT_REGIONS_ENDPOINT.to_string(),
            tagging: DEFAULT_TAGGING_ENDPOINT.to_string(),
        }
    }
}

/// Run the full inventory pipeline and return the accumulated document.
pub async fn run(
    http: &HttpClient,
    token: &str,
    cfg: &InventoryConfig,
    endpoints: &Endpoints,
) -> Result<Inventory> {
    let regions = regions::resolve_regions(
        http,
        token,
        &endpoints.regions,
        &cfg.api.region,
        &cfg.api.query_string(),
    )
    .await?;

    let mut inventory = Inventory::new();
    for region in &regions {
        tracing::info!("Collecting resources in region {}", region.name);
        let client = VpcClient::new(
            http.clone(),
            token.to_string(),
            region,
            &cfg.api,
            &endpoints.tagging,
        );
        collect_region(&client, cfg, &mut inventory).await?;
    }

    tracing::info!("Inventory complete: {} hosts", inventory.host_count());
    Ok(inventory)
}

async fn collect_region(
    client: &VpcClient,
    cfg: &InventoryConfig,
    inventory: &mut Inventory,
) -> Result<()> {
    for kind in [ResourceKind::Instance, ResourceKind::BareMetalServer] {
        let resources = collector::list(client, kind).await?;
        tracing::debug!(
            "Region {}: {} {} returned",
            client.region,
            resources.len(),
            kind.collection()
        );

        for resource in &resources {
            let Some((name, record)) =
                enricher::enrich(client, &cfg.ibmcloud, kind, resource).await?
            else {
                continue;
            };
            let labels = groups::derive_groups(&cfg.ibmcloud, &record);
            inventory.add(&name, &record, &labels)?;
        }
    }
    Ok(())
}
