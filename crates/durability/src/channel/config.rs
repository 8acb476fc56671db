//! Buffered channel configuration.
//!
//! This module provides configuration for the write-back buffer and the
//! durability bound that caps how many bytes may sit unsynced.

use ledgerio_core::ChannelError;
use serde::{Deserialize, Serialize};

/// Buffered channel configuration parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Maximum resident size of the write buffer in bytes (default: 64KB).
    ///
    /// A single write larger than this is written straight through to the
    /// backing store. `0` disables buffering entirely. Negative values are
    /// rejected by [`ChannelConfig::validate`].
    pub write_capacity: i64,

    /// Unsynced bytes tolerated before a write forces a sync (default: 0).
    ///
    /// Once the bytes accepted since the last sync exceed this bound, the
    /// write flushes and syncs before returning. Non-positive disables
    /// forced syncs.
    pub unpersisted_bytes_bound: i64,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        ChannelConfig {
            write_capacity: 64 * 1024, // 64KB
            unpersisted_bytes_bound: 0,
        }
    }
}

impl ChannelConfig {
    /// Create a new channel configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set write buffer capacity (builder pattern).
    pub fn with_write_capacity(mut self, capacity: i64) -> Self {
        self.write_capacity = capacity;
        self
    }

    /// Set the forced-sync threshold (builder pattern).
    pub fn with_unpersisted_bytes_bound(mut self, bound: i64) -> Self {
        self.unpersisted_bytes_bound = bound;
        self
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), ChannelConfigError> {
        if self.write_capacity < 0 {
            return Err(ChannelConfigError::NegativeCapacity(self.write_capacity));
        }
        if usize::try_from(self.write_capacity).is_err() {
            return Err(ChannelConfigError::CapacityTooLarge(self.write_capacity));
        }
        Ok(())
    }

    /// Whether writes can force a sync.
    pub fn forced_sync_enabled(&self) -> bool {
        self.unpersisted_bytes_bound > 0
    }

    /// Create a configuration optimized for testing (tiny buffer, sync bound off).
    pub fn for_testing() -> Self {
        ChannelConfig {
            write_capacity: 64,
            unpersisted_bytes_bound: 0,
        }
    }
}

/// Channel configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChannelConfigError {
    /// Write capacity is negative.
    #[error("Write capacity must be non-negative, got {0}")]
    NegativeCapacity(i64),

    /// Write capacity does not fit in addressable memory.
    #[error("Write capacity {0} exceeds addressable memory")]
    CapacityTooLarge(i64),
}

impl From<ChannelConfigError> for ChannelError {
    fn from(e: ChannelConfigError) -> Self {
        ChannelError::InvalidArgument(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerio_core::ErrorKind;

    #[test]
    fn test_default_config() {
        let config = ChannelConfig::default();
        assert_eq!(config.write_capacity, 64 * 1024);
        assert_eq!(config.unpersisted_bytes_bound, 0);
        assert!(!config.forced_sync_enabled());
    }

    #[test]
    fn test_builder_pattern() {
        let config = ChannelConfig::new()
            .with_write_capacity(4096)
            .with_unpersisted_bytes_bound(1024);

        assert_eq!(config.write_capacity, 4096);
        assert_eq!(config.unpersisted_bytes_bound, 1024);
        assert!(config.forced_sync_enabled());
    }

    #[test]
    fn test_validation_valid() {
        assert!(ChannelConfig::default().validate().is_ok());
        assert!(ChannelConfig::new().with_write_capacity(0).validate().is_ok());
    }

    #[test]
    fn test_validation_negative_capacity() {
        let config = ChannelConfig::new().with_write_capacity(-1);
        assert!(matches!(
            config.validate(),
            Err(ChannelConfigError::NegativeCapacity(-1))
        ));
    }

    #[test]
    fn test_negative_bound_disables_forced_sync() {
        let config = ChannelConfig::new().with_unpersisted_bytes_bound(-5);
        assert!(config.validate().is_ok());
        assert!(!config.forced_sync_enabled());
    }

    #[test]
    fn test_config_error_converts_to_invalid_argument() {
        let err: ChannelError = ChannelConfigError::NegativeCapacity(-3).into();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(err.to_string().contains("-3"));
    }

    #[test]
    fn test_serde_roundtrip_with_defaults() {
        let config: ChannelConfig =
            serde_json::from_str(r#"{"unpersisted_bytes_bound": 512}"#).unwrap();
        assert_eq!(config.write_capacity, 64 * 1024);
        assert_eq!(config.unpersisted_bytes_bound, 512);

        let json = serde_json::to_string(&config).unwrap();
        let back: ChannelConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_testing_config() {
        let config = ChannelConfig::for_testing();
        assert!(config.validate().is_ok());
        assert!(config.write_capacity < ChannelConfig::default().write_capacity);
    }
}
