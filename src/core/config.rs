/*!
 * Resolver Configuration
 * Runtime knobs loaded from the environment
 *
 * Environment variables:
 * - PROCPROFILE_SINGLE_FLIGHT: Coordinate first resolution per pid (default: true)
 * - PROCPROFILE_UNPROFILED_POLICY: `deny` or `allow` (default: deny)
 * - PROCPROFILE_FILE_INFO: Attach executable metadata (default: true)
 * - PROCPROFILE_PROFILES: Optional JSON profile seed file
 */

use super::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

pub const ENV_SINGLE_FLIGHT: &str = "PROCPROFILE_SINGLE_FLIGHT";
pub const ENV_UNPROFILED_POLICY: &str = "PROCPROFILE_UNPROFILED_POLICY";
pub const ENV_FILE_INFO: &str = "PROCPROFILE_FILE_INFO";
pub const ENV_PROFILES: &str = "PROCPROFILE_PROFILES";

/// What the enforcement layer should assume for a process with no bound profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnprofiledPolicy {
    /// No capabilities
    #[default]
    Deny,
    /// Internet and local network access only
    Allow,
}

impl FromStr for UnprofiledPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "deny" => Ok(UnprofiledPolicy::Deny),
            "allow" => Ok(UnprofiledPolicy::Allow),
            other => Err(ConfigError::InvalidValue {
                var: ENV_UNPROFILED_POLICY.to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Resolver configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ResolverConfig {
    pub single_flight: bool,
    pub unprofiled_policy: UnprofiledPolicy,
    pub file_info: bool,
    pub profiles_path: Option<PathBuf>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            single_flight: true,
            unprofiled_policy: UnprofiledPolicy::Deny,
            file_info: true,
            profiles_path: None,
        }
    }
}

impl ResolverConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_SINGLE_FLIGHT) {
            config.single_flight = parse_bool(ENV_SINGLE_FLIGHT, &value)?;
        }
        if let Some(value) = lookup(ENV_UNPROFILED_POLICY) {
            config.unprofiled_policy = value.parse()?;
        }
        if let Some(value) = lookup(ENV_FILE_INFO) {
            config.file_info = parse_bool(ENV_FILE_INFO, &value)?;
        }
        config.profiles_path = lookup(ENV_PROFILES)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        Ok(config)
    }

    pub fn with_single_flight(mut self, enabled: bool) -> Self {
        self.single_flight = enabled;
        self
    }

    pub fn with_unprofiled_policy(mut self, policy: UnprofiledPolicy) -> Self {
        self.unprofiled_policy = policy;
        self
    }

    pub fn with_file_info(mut self, enabled: bool) -> Self {
        self.file_info = enabled;
        self
    }
}

fn parse_bool(var: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            var: var.to_string(),
            value: value.to_string(),
        }),
    }
}
