use serde::{Deserialize, Serialize};

use crate::domain::service::{PageLimits, ServiceConfig};

/// Configuration for the roster module (`modules.roster` in the app config)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RosterConfig {
    #[serde(default = "default_group_page_size")]
    pub group_default_page_size: u64,
    #[serde(default = "default_group_page_size")]
    pub group_max_page_size: u64,
    #[serde(default = "default_member_page_size")]
    pub member_default_page_size: u64,
    #[serde(default = "default_member_page_size")]
    pub member_max_page_size: u64,
    #[serde(default)]
    pub hashing: HashingConfig,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            group_default_page_size: default_group_page_size(),
            group_max_page_size: default_group_page_size(),
            member_default_page_size: default_member_page_size(),
            member_max_page_size: default_member_page_size(),
            hashing: HashingConfig::default(),
        }
    }
}

impl RosterConfig {
    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            groups: PageLimits {
                default_limit: self.group_default_page_size,
                max_limit: self.group_max_page_size,
            },
            members: PageLimits {
                default_limit: self.member_default_page_size,
                max_limit: self.member_max_page_size,
            },
        }
    }
}

/// Argon2id cost parameters. Defaults follow the OWASP recommendation
/// (m=19456 KiB, t=2, p=1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HashingConfig {
    #[serde(default = "default_memory_kib")]
    pub memory_kib: u32,
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
    /// Longest accepted secret, in bytes.
    #[serde(default = "default_max_secret_len")]
    pub max_secret_len: usize,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            memory_kib: default_memory_kib(),
            iterations: default_iterations(),
            parallelism: default_parallelism(),
            max_secret_len: default_max_secret_len(),
        }
    }
}

fn default_group_page_size() -> u64 {
    15
}

fn default_member_page_size() -> u64 {
    40
}

fn default_memory_kib() -> u32 {
    19456
}

fn default_iterations() -> u32 {
    2
}

fn default_parallelism() -> u32 {
    1
}

fn default_max_secret_len() -> usize {
    1024
}
