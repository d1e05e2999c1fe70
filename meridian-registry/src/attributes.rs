//! Plain attribute watches on an interface's `config` subtree.
//!
//! Each child node is named after the attribute and carries its value as UTF-8 data.

use meridian_core::domain::attributes::Attributes;
use meridian_core::error::DecodeResult;
use meridian_core::{DiscoveryConfig, RegistryDecodeError};

use crate::entry::{ChangeKind, RegistryEntry};
use crate::error::AttributeError;
use crate::paths::entry_suffix;

/// Every attribute currently stored under `config_path`.
pub fn config_attributes(config_path: &str, entries: &[RegistryEntry]) -> DecodeResult<Attributes> {
    let mut attributes = Attributes::new();
    for entry in entries {
        let (key, value) = stored_attribute(config_path, entry)?;
        attributes.insert(key, value);
    }
    Ok(attributes)
}

/// The attribute affected by one change notification.
///
/// A removed node resolves to the configured fallback rather than to the deleted value.
pub fn config_attribute(
    config_path: &str,
    entry: &RegistryEntry,
    change: ChangeKind,
    config: &DiscoveryConfig,
) -> Result<(String, String), AttributeError> {
    if change == ChangeKind::Removed {
        let key = entry_suffix(config_path, entry.path())?;
        let fallback = config.default_value(key)?;
        return Ok((key.to_string(), fallback.to_string()));
    }
    Ok(stored_attribute(config_path, entry)?)
}

fn stored_attribute(config_path: &str, entry: &RegistryEntry) -> DecodeResult<(String, String)> {
    let key = entry_suffix(config_path, entry.path())?;
    let value = match entry.data() {
        Some(data) => std::str::from_utf8(data)
            .map_err(|_| RegistryDecodeError::InvalidUtf8 {
                input: entry.path().to_string(),
            })?
            .to_string(),
        None => String::new(),
    };
    Ok((key.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use meridian_core::ConfigAccessorError;

    const CONFIG: &str = "/rpc/a.B/config";

    #[test]
    fn reads_node_data() {
        let attrs = config_attributes(
            CONFIG,
            &[
                RegistryEntry::with_data(format!("{CONFIG}/timeout"), "5000"),
                RegistryEntry::new(format!("{CONFIG}/retries")),
            ],
        )
        .unwrap();
        assert_eq!(attrs.get("timeout"), Some("5000"));
        assert_eq!(attrs.get("retries"), Some(""));
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        let entry = RegistryEntry::with_data(format!("{CONFIG}/timeout"), vec![0xff, 0xfe]);
        assert!(config_attributes(CONFIG, &[entry]).is_err());
    }

    #[test]
    fn removal_resolves_to_fallback() {
        let mut config = DiscoveryConfig::default();
        config.defaults.insert("timeout".into(), "3000".into());
        let entry = RegistryEntry::with_data(format!("{CONFIG}/timeout"), "5000");

        assert_eq!(
            config_attribute(CONFIG, &entry, ChangeKind::Updated, &config).unwrap(),
            ("timeout".to_string(), "5000".to_string())
        );
        assert_eq!(
            config_attribute(CONFIG, &entry, ChangeKind::Removed, &config).unwrap(),
            ("timeout".to_string(), "3000".to_string())
        );
    }

    #[test]
    fn removal_without_fallback_is_an_accessor_error() {
        let entry = RegistryEntry::new(format!("{CONFIG}/retries"));
        assert_eq!(
            config_attribute(CONFIG, &entry, ChangeKind::Removed, &DiscoveryConfig::default()),
            Err(AttributeError::Accessor(ConfigAccessorError::new(
                "DiscoveryConfig",
                "retries"
            )))
        );
    }
}
