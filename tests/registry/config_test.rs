/*!
 * Configuration Tests
 * Environment-driven resolver configuration
 */

use pretty_assertions::assert_eq;
use procprofile::core::config::{ENV_FILE_INFO, ENV_SINGLE_FLIGHT, ENV_UNPROFILED_POLICY};
use procprofile::{ConfigError, ResolverConfig, UnprofiledPolicy};
use serial_test::serial;

fn clear() {
    for var in [ENV_SINGLE_FLIGHT, ENV_UNPROFILED_POLICY, ENV_FILE_INFO] {
        std::env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_defaults_from_empty_env() {
    clear();
    let config = ResolverConfig::from_env().unwrap();
    assert!(config.single_flight);
    assert!(config.file_info);
    assert_eq!(config.unprofiled_policy, UnprofiledPolicy::Deny);
}

#[test]
#[serial]
fn test_env_overrides() {
    clear();
    std::env::set_var(ENV_SINGLE_FLIGHT, "off");
    std::env::set_var(ENV_UNPROFILED_POLICY, "allow");
    std::env::set_var(ENV_FILE_INFO, "0");

    let config = ResolverConfig::from_env().unwrap();
    clear();

    assert!(!config.single_flight);
    assert!(!config.file_info);
    assert_eq!(config.unprofiled_policy, UnprofiledPolicy::Allow);
}

#[test]
#[serial]
fn test_invalid_env_value() {
    clear();
    std::env::set_var(ENV_SINGLE_FLIGHT, "sometimes");
    let err = ResolverConfig::from_env().unwrap_err();
    clear();

    assert!(matches!(err, ConfigError::InvalidValue { .. }));
}
