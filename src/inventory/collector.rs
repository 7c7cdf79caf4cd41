//! Resource Collector
//!
//! Paginated listing of instances and bare metal servers for one region.
//! Pages are fetched strictly in sequence, following the `next.href` cursor
//! embedded in each response until it is absent. Any page failure aborts the
//! whole run; provider ordering is preserved.

use anyhow::{bail, Context, Result};
use serde_json::Value;

use crate::ibm::client::VpcClient;

/// The two compute resource kinds enumerated by the inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Instance,
    BareMetalServer,
}

impl ResourceKind {
    /// API collection path segment, also the items key in list responses.
    pub fn collection(self) -> &'static str {
        match self {
            ResourceKind::Instance => "instances",
            ResourceKind::BareMetalServer => "bare_metal_servers",
        }
    }

    /// Singular label used for the `resource_type` attribute and group.
    pub fn label(self) -> &'static str {
        match self {
            ResourceKind::Instance => "instance",
            ResourceKind::BareMetalServer => "bare_metal_server",
        }
    }
}

/// List every resource of the given kind in the client's region.
pub async fn list(client: &VpcClient, kind: ResourceKind) -> Result<Vec<Value>> {
    let collection = kind.collection();
    collect_paginated(client, client.list_url(collection), collection)
        .await
        .with_context(|| format!("Failed to list {} in region {}", collection, client.region))
}

/// Follow the `next.href` cursor until exhausted, accumulating the array
/// found under `items_key` on each page.
pub(crate) async fn collect_paginated(
    client: &VpcClient,
    first_url: String,
    items_key: &str,
) -> Result<Vec<Value>> {
    let mut items = Vec::new();
    let mut url = first_url;

    loop {
        let page = client.get(&url).await?;

        match page.get(items_key).and_then(Value::as_array) {
            Some(page_items) => items.extend(page_items.iter().cloned()),
            None => bail!("Response is missing the {items_key} array"),
        }

        match page.pointer("/next/href").and_then(Value::as_str) {
            Some(next) => url = next.to_string(),
            None => break,
        }
    }

    Ok(items)
}
