//! Group Deriver
//!
//! Computes the inventory group labels a host belongs to from its attribute
//! record and the per-criterion switches. Emission order is fixed so output
//! is reproducible: region, zone, platform, security group, placement target,
//! VPC, resource group, resource type, then one label per tag.

use crate::config::GroupingConfig;
use crate::inventory::enricher::AttributeRecord;

/// Characters replaced with `_` in name-valued labels.
const NAME_SANITIZE: &[char] = &[' ', '.', '-', '/'];

/// Sanitize a name-valued label (image names, tags, user-chosen names).
pub fn sanitize_name(value: &str) -> String {
    value
        .chars()
        .map(|c| if NAME_SANITIZE.contains(&c) { '_' } else { c })
        .collect()
}

/// Sanitize an identifier-valued label (regions, zones, resource kinds),
/// which only ever carry hyphens.
pub fn sanitize_id(value: &str) -> String {
    value.replace('-', "_")
}

/// Derive the ordered group list for one host. All switches off yields an
/// empty list; the host still lands in the `All` group.
pub fn derive_groups(cfg: &GroupingConfig, record: &AttributeRecord) -> Vec<String> {
    let mut groups = Vec::new();

    if cfg.group_by_region {
        groups.push(sanitize_id(&record.region));
    }
    if cfg.group_by_zone {
        groups.push(sanitize_id(&record.zone));
    }
    if cfg.group_by_platform {
        // Bare metal servers carry no image; fall back to the profile name.
        let platform = record.image.as_deref().unwrap_or(&record.profile);
        groups.push(sanitize_name(platform));
    }
    if cfg.group_by_security_group {
        groups.push(sanitize_name(&record.security_group));
    }
    if cfg.group_by_placement_target {
        if let Some(target) = &record.placement_target {
            groups.push(sanitize_name(target));
        }
    }
    if cfg.group_by_vpc {
        groups.push(sanitize_name(&record.vpc));
    }
    if cfg.group_by_resource_group {
        groups.push(sanitize_name(&record.resource_group));
    }
    if cfg.group_by_resource_type {
        groups.push(sanitize_id(&record.resource_type));
    }
    if cfg.group_by_tags {
        for tag in &record.tags {
            groups.push(sanitize_name(tag));
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnsibleHostMode;
    use serde_json::json;

    fn record() -> AttributeRecord {
        AttributeRecord {
            href: "https://api/v1/instances/i-1".to_string(),
            id: "i-1".to_string(),
            created_at: "2024-03-01T12:00:00Z".to_string(),
            memory: 16,
            cpu: json!({ "count": 4 }),
            region: "us-south".to_string(),
            vpc: "prod-vpc".to_string(),
            zone: "us-south-1".to_string(),
            status: "running".to_string(),
            profile: "bx2-4x16".to_string(),
            resource_group: "default".to_string(),
            resource_group_id: "rg-1".to_string(),
            resource_type: "instance".to_string(),
            primary_ipv4_address: "10.240.0.5".to_string(),
            subnet: "subnet-a".to_string(),
            subnet_id: "sn-1".to_string(),
            security_group: "allow-ssh".to_string(),
            security_group_id: "sg-1".to_string(),
            ansible_ssh_user: "root".to_string(),
            image: Some("ibm-ubuntu-22.04-minimal".to_string()),
            floating_ip: None,
            ansible_host: None,
            metadata_service: None,
            dedicated_host: None,
            placement_target: None,
            gpu: None,
            secure_boot: None,
            trusted_platform_module: None,
            tags: vec!["env-prod".to_string(), "team-x".to_string()],
        }
    }

    fn cfg() -> GroupingConfig {
        GroupingConfig {
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
        }
    }

    #[test]
    fn all_switches_off_yields_no_groups() {
        assert!(derive_groups(&cfg(), &record()).is_empty());
    }

    #[test]
    fn region_and_tag_grouping_matches_the_documented_example() {
        let mut cfg = cfg();
        cfg.group_by_region = true;
        cfg.group_by_zone = true;
        cfg.group_by_tags = true;

        assert_eq!(
            derive_groups(&cfg, &record()),
            vec!["us_south", "us_south_1", "env_prod", "team_x"]
        );
    }

    #[test]
    fn emission_follows_the_fixed_checklist_order() {
        let mut cfg = cfg();
        cfg.group_by_region = true;
        cfg.group_by_zone = true;
        cfg.group_by_platform = true;
        cfg.group_by_security_group = true;
        cfg.group_by_placement_target = true;
        cfg.group_by_vpc = true;
        cfg.group_by_resource_group = true;
        cfg.group_by_resource_type = true;
        cfg.group_by_tags = true;

        let mut record = record();
        record.placement_target = Some("rack-a".to_string());

        assert_eq!(
            derive_groups(&cfg, &record),
            vec![
                "us_south",
                "us_south_1",
                "ibm_ubuntu_22_04_minimal",
                "allow_ssh",
                "rack_a",
                "prod_vpc",
                "default",
                "instance",
                "env_prod",
                "team_x",
            ]
        );
    }

    #[test]
    fn placement_target_group_is_skipped_when_absent() {
        let mut cfg = cfg();
        cfg.group_by_placement_target = true;
        assert!(derive_groups(&cfg, &record()).is_empty());
    }

    #[test]
    fn platform_falls_back_to_profile_without_an_image() {
        let mut cfg = cfg();
        cfg.group_by_platform = true;
        let mut record = record();
        record.image = None;

        assert_eq!(derive_groups(&cfg, &record), vec!["bx2_4x16"]);
    }

    #[test]
    fn tag_grouping_emits_one_label_per_tag() {
        let mut cfg = cfg();
        cfg.group_by_tags = true;

        let mut record = record();
        record.tags.clear();
        assert!(derive_groups(&cfg, &record).is_empty());

        record.tags = vec!["a".to_string(), "b".to_string(), "c-d".to_string()];
        assert_eq!(derive_groups(&cfg, &record), vec!["a", "b", "c_d"]);
    }

    #[test]
    fn sanitization_is_idempotent() {
        for value in ["ubuntu 22.04/minimal", "us-south-1", "already_clean"] {
            assert_eq!(sanitize_name(value), sanitize_name(&sanitize_name(value)));
            assert_eq!(sanitize_id(value), sanitize_id(&sanitize_id(value)));
        }
    }
}
