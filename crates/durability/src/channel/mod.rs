//! Buffered channel module
//!
//! - `config`: Buffer capacity and forced-sync bound (ChannelConfig, ChannelConfigError)
//! - `buffered`: Write-back channel over a backing store (BufferedChannel, ChannelCounters)

pub mod buffered;
pub mod config;

pub use buffered::{BufferedChannel, ChannelCounters};
pub use config::{ChannelConfig, ChannelConfigError};
