//! Inventory Assembler
//!
//! Accumulates (name, record, groups) triples across all regions and both
//! resource kinds into the terminal inventory document: the `All` host list,
//! the `_meta.hostvars` block, and one entry per derived group in first-seen
//! order.

use anyhow::{Context, Result};
use serde_json::{json, Map, Value};

use crate::inventory::enricher::AttributeRecord;

/// The accumulated inventory. Built fresh each run, rendered once.
#[derive(Debug, Default)]
pub struct Inventory {
    hosts: Vec<String>,
    hostvars: Map<String, Value>,
    /// Group label -> member names, in first-seen order across the run.
    groups: Vec<(String, Vec<String>)>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one host. Names are not deduplicated in `All`; a duplicate name
    /// overwrites the earlier hostvars record, keeping the one seen last.
    pub fn add(&mut self, name: &str, record: &AttributeRecord, groups: &[String]) -> Result<()> {
        self.hosts.push(name.to_string());

        let value = serde_json::to_value(record).context("Failed to serialize host record")?;
        if self.hostvars.insert(name.to_string(), value).is_some() {
            tracing::warn!(
                "Duplicate host name {}; an earlier record was overwritten",
                name
            );
        }

        for group in groups {
            match self.groups.iter_mut().find(|(label, _)| label == group) {
                Some((_, members)) => members.push(name.to_string()),
                None => self.groups.push((group.clone(), vec![name.to_string()])),
            }
        }

        Ok(())
    }

    /// Number of hosts recorded so far (duplicates included).
    pub fn host_count(&self) -> usize {
        self.hosts.len()
    }

    /// Assemble the output document: `All`, `_meta`, then one key per group.
    pub fn to_json(&self) -> Value {
        let mut output = Map::new();
        output.insert("All".to_string(), json!({ "hosts": &self.hosts }));
        output.insert("_meta".to_string(), json!({ "hostvars": &self.hostvars }));
        for (group, members) in &self.groups {
            output.insert(group.clone(), json!({ "hosts": members }));
        }
        Value::Object(output)
    }

    /// Pretty-printed JSON for stdout.
    pub fn render(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.to_json()).context("Failed to render inventory")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnsibleHostMode;
    use crate::inventory::enricher::build_record;
    use crate::inventory::collector::ResourceKind;
    use crate::config::GroupingConfig;

    fn record(id: &str, zone: &str) -> AttributeRecord {
        let cfg = GroupingConfig {
            group_by_region: false,
            group_by_zone: false,
            group_by_platform: false,
            group_by_security_group: false,
            group_by_placement_target: false,
            group_by_vpc: false,
            group_by_resource_group: false,
            group_by_resource_type: false,
            group_by_tags: false,
            all_instances: false,
            ansible_host_variable: AnsibleHostMode::PrivateIp,
        };
        build_record(
            &cfg,
            ResourceKind::Instance,
            "us-south",
            &json!({
                "href": format!("https://api/v1/instances/{id}"),
                "id": id,
                "name": id,
                "created_at": "2024-03-01T12:00:00Z",
                "status": "running",
                "memory": 8,
                "vcpu": { "count": 2 },
                "vpc": { "name": "vpc" },
                "zone": { "name": zone },
                "profile": { "name": "bx2-2x8" },
                "resource_group": { "name": "default", "id": "rg-1" }
            }),
            &json!({
                "primary_ipv4_address": "10.0.0.1",
                "subnet": { "name": "sn", "id": "sn-1" },
                "security_groups": [ { "name": "sg", "id": "sg-1" } ]
            }),
            vec![],
        )
        .unwrap()
    }

    use serde_json::json;

    #[test]
    fn all_group_lists_every_host_in_order() {
        let mut inv = Inventory::new();
        inv.add("a", &record("a", "z1"), &["g1".to_string()]).unwrap();
        inv.add("b", &record("b", "z1"), &[]).unwrap();
        inv.add("c", &record("c", "z2"), &["g1".to_string(), "g2".to_string()])
            .unwrap();

        let out = inv.to_json();
        assert_eq!(out["All"]["hosts"], json!(["a", "b", "c"]));
        assert_eq!(inv.host_count(), 3);
    }

    #[test]
    fn every_group_member_has_hostvars_and_is_in_all() {
        let mut inv = Inventory::new();
        inv.add("a", &record("a", "z1"), &["g1".to_string()]).unwrap();
        inv.add("b", &record("b", "z1"), &["g1".to_string(), "g2".to_string()])
            .unwrap();

        let out = inv.to_json();
        let all: Vec<&str> = out["All"]["hosts"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();

        for group in ["g1", "g2"] {
            for member in out[group]["hosts"].as_array().unwrap() {
                let name = member.as_str().unwrap();
                assert!(all.contains(&name));
                assert!(out["_meta"]["hostvars"].get(name).is_some());
            }
        }
    }

    #[test]
    fn groups_keep_first_seen_order() {
        let mut inv = Inventory::new();
        inv.add("a", &record("a", "z1"), &["beta".to_string()]).unwrap();
        inv.add("b", &record("b", "z1"), &["alpha".to_string(), "beta".to_string()])
            .unwrap();

        let out = inv.to_json();
        let keys: Vec<&String> = out.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["All", "_meta", "beta", "alpha"]);
        assert_eq!(out["beta"]["hosts"], json!(["a", "b"]));
    }

    #[test]
    fn duplicate_name_keeps_the_last_record_but_both_all_entries() {
        let mut inv = Inventory::new();
        inv.add("dup", &record("first", "z1"), &[]).unwrap();
        inv.add("dup", &record("second", "z2"), &[]).unwrap();

        let out = inv.to_json();
        assert_eq!(out["All"]["hosts"], json!(["dup", "dup"]));
        assert_eq!(out["_meta"]["hostvars"]["dup"]["id"], json!("second"));
        assert_eq!(out["_meta"]["hostvars"]["dup"]["zone"], json!("z2"));
    }

    #[test]
    fn renders_pretty_json() {
        let mut inv = Inventory::new();
        inv.add("a", &record("a", "z1"), &[]).unwrap();
        let rendered = inv.render().unwrap();
        assert!(rendered.starts_with("{\n"));
        assert!(rendered.contains("\"All\""));
    }
}
