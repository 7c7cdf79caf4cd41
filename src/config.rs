//! Configuration Management
//!
//! Loads the ini file controlling how groups are created and hosts filtered
//! (`[ibmcloud]` section) and which API version and region to use (`[api]`
//! section).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ::config::{Config, File, FileFormat};
use serde::Deserialize;

/// Default ini file name, looked up next to the executable.
pub const DEFAULT_INI_FILE: &str = "ibmcloud_inv.ini";

/// Full inventory configuration
#[derive(Debug, Clone, Deserialize)]
pub struct InventoryConfig {
    pub ibmcloud: GroupingConfig,
    pub api: ApiConfig,
}

/// `[ibmcloud]` section: grouping switches and host filtering
#[derive(Debug, Clone, Deserialize)]
pub struct GroupingConfig {
    #[serde(default)]
    pub group_by_region: bool,
    #[serde(default)]
    pub group_by_zone: bool,
    #[serde(default)]
    pub group_by_platform: bool,
    #[serde(default)]
    pub group_by_security_group: bool,
    #[serde(default)]
    pub group_by_placement_target: bool,
    #[serde(default)]
    pub group_by_vpc: bool,
    #[serde(default)]
    pub group_by_resource_group: bool,
    #[serde(default)]
    pub group_by_resource_type: bool,
    #[serde(default)]
    pub group_by_tags: bool,
    /// Include hosts regardless of status; by default only `running` hosts
    /// are listed.
    #[serde(default)]
    pub all_instances: bool,
    /// Which address becomes `ansible_host` on each record.
    pub ansible_host_variable: AnsibleHostMode,
}

/// Address selection mode for the `ansible_host` variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnsibleHostMode {
    PrivateIp,
    FloatingIp,
}

/// `[api]` section: API version parameters and target region
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub apiversion: String,
    pub generation: String,
    /// A region name, or `all` for every available region.
    pub region: String,
}

impl ApiConfig {
    /// Query string appended to every VPC API request.
    pub fn query_string(&self) -> String {
        format!("version={}&generation={}", self.apiversion, self.generation)
    }
}

impl InventoryConfig {
    /// Load configuration from an ini file. Missing file or missing required
    /// keys are fatal.
    pub fn load(path: &Path) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::from(path.to_path_buf()).format(FileFormat::Ini))
            .build()
            .with_context(|| format!("Unable to find or open ini file {}", path.display()))?;

        settings
            .try_deserialize()
            .with_context(|| format!("Invalid configuration in {}", path.display()))
    }

    /// Default ini path: alongside the executable, matching how inventory
    /// scripts sit in an ansible playbook directory.
    pub fn default_path() -> PathBuf {
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join(DEFAULT_INI_FILE)))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_INI_FILE))
    }
}
