//! Attribute Enricher
//!
//! Flattens one raw resource payload plus its secondary lookups (primary
//! network interface, tag set) into the per-host attribute record exposed as
//! hostvars. Resource group name/id are read inline from the resource record;
//! the VPC API embeds both, so no separate lookup is made.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;

use crate::config::{AnsibleHostMode, GroupingConfig};
use crate::ibm::client::VpcClient;
use crate::inventory::collector::{self, ResourceKind};

/// Connection user presented to the inventory consumer.
const SSH_USER: &str = "root";

/// The enriched, flattened view of one resource. Optional fields are omitted
/// from the serialized record when the source data does not expose them.
#[derive(Debug, Clone, Serialize)]
pub struct AttributeRecord {
    pub href: String,
    pub id: String,
    pub created_at: String,
    pub memory: u64,
    /// The `vcpu` block of an instance, or the `cpu` block of a bare metal
    /// server, carried through as-is.
    pub cpu: Value,
    pub region: String,
    pub vpc: String,
    pub zone: String,
    pub status: String,
    pub profile: String,
    pub resource_group: String,
    pub resource_group_id: String,
    pub resource_type: String,
    pub primary_ipv4_address: String,
    pub subnet: String,
    pub subnet_id: String,
    pub security_group: String,
    pub security_group_id: String,
    pub ansible_ssh_user: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub floating_ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ansible_host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata_service: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dedicated_host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placement_target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gpu: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secure_boot: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trusted_platform_module: Option<String>,
    pub tags: Vec<String>,
}

/// Whether the status filter admits this resource: `running` hosts always,
/// everything when `all_instances` is set.
pub fn admitted(cfg: &GroupingConfig, resource: &Value) -> bool {
    cfg.all_instances
        || resource.get("status").and_then(Value::as_str) == Some("running")
}

/// Enrich one raw resource. Returns `None` when the status filter skips it;
/// otherwise the host name and its attribute record. Lookup failures are
/// fatal and propagate.
pub async fn enrich(
    client: &VpcClient,
    cfg: &GroupingConfig,
    kind: ResourceKind,
    resource: &Value,
) -> Result<Option<(String, AttributeRecord)>> {
    let name = str_field(resource, "name")?;

    if !admitted(cfg, resource) {
        tracing::debug!(
            "Skipping {} {} (status: {})",
            kind.label(),
            name,
            resource.get("status").and_then(serde_json::Value::as_str).unwrap_or("unknown")
        );
        return Ok(None);
    }

    let id = str_field(resource, "id")?;
    let interface_id = str_path(resource, "/primary_network_interface/id")
        .with_context(|| format!("{name} has no primary network interface"))?;
    let interface = client
        .get(&client.interface_url(kind.collection(), &id, &interface_id))
        .await
        .with_context(|| format!("Failed to look up primary network interface of {name}"))?;

    let crn = str_field(resource, "crn")?;
    let tags = fetch_tags(client, &crn)
        .await
        .with_context(|| format!("Failed to list tags attached to {name}"))?;

    let record = build_record(cfg, kind, &client.region, resource, &interface, tags)?;
    Ok(Some((name, record)))
}

/// Pure record construction from the already-fetched payloads.
pub fn build_record(
    cfg: &GroupingConfig,
    kind: ResourceKind,
    region: &str,
    resource: &Value,
    interface: &Value,
    tags: Vec<String>,
) -> Result<AttributeRecord> {
    let primary_ipv4_address = str_field(interface, "primary_ipv4_address")?;
    let floating_ip = opt_str_path(interface, "/floating_ips/0/address");

    let ansible_host = match cfg.ansible_host_variable {
        AnsibleHostMode::PrivateIp => Some(primary_ipv4_address.clone()),
        // Silently omitted when no floating IP is attached.
        AnsibleHostMode::FloatingIp => floating_ip.clone(),
    };

    Ok(AttributeRecord {
        href: str_field(resource, "href")?,
        id: str_field(resource, "id")?,
        created_at: str_field(resource, "created_at")?,
        memory: resource
            .get("memory")
            .and_then(Value::as_u64)
            .context("Missing field memory")?,
        cpu: resource
            .get("cpu")
            .or_else(|| resource.get("vcpu"))
            .cloned()
            .context("Missing cpu/vcpu block")?,
        region: region.to_string(),
        vpc: str_path(resource, "/vpc/name")?,
        zone: str_path(resource, "/zone/name")?,
        status: str_field(resource, "status")?,
        profile: str_path(resource, "/profile/name")?,
        resource_group: str_path(resource, "/resource_group/name")?,
        resource_group_id: str_path(resource, "/resource_group/id")?,
        resource_type: resource
            .get("resource_type")
            .and_then(Value::as_str)
            .unwrap_or(kind.label())
            .to_string(),
        primary_ipv4_address,
        subnet: str_path(interface, "/subnet/name")?,
        subnet_id: str_path(interface, "/subnet/id")?,
        security_group: str_path(interface, "/security_groups/0/name")?,
        security_group_id: str_path(interface, "/security_groups/0/id")?,
        ansible_ssh_user: SSH_USER.to_string(),
        image: opt_str_path(resource, "/image/name"),
        floating_ip,
        ansible_host,
        metadata_service: resource
            .pointer("/metadata_service/enabled")
            .and_then(Value::as_bool),
        dedicated_host: opt_str_path(resource, "/dedicated_host/name"),
        placement_target: opt_str_path(resource, "/placement_target/name"),
        gpu: resource.pointer("/gpu/count").and_then(Value::as_u64),
        secure_boot: resource.get("enable_secure_boot").and_then(Value::as_bool),
        trusted_platform_module: opt_str_path(resource, "/trusted_platform_module/mode"),
        tags,
    })
}

/// Tag names attached to a CRN, paginated the same way as resource listings.
async fn fetch_tags(client: &VpcClient, crn: &str) -> Result<Vec<String>> {
    let items = collector::collect_paginated(client, client.tags_url(crn)?, "items").await?;
    Ok(items
        .iter()
        .filter_map(|tag| tag.get("name").and_then(Value::as_str).map(str::to_string))
        .collect())
}

fn str_field(value: &Value, key: &str) -> Result<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .with_context(|| format!("Missing field {key}"))
}

fn str_path(value: &Value, pointer: &str) -> Result<String> {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .map(str::to_string)
        .with_context(|| format!("Missing field {pointer}"))
}

fn opt_str_path(value: &Value, pointer: &str) -> Option<String> {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .map(str::to_string)
}
