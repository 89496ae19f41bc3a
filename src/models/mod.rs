//! Display models for CLI output
//!
//! This module provides shared display model abstractions for converting
//! gateway resources into CLI-friendly display formats.

pub mod display;

pub use display::{
    AuditDisplay, BindingDisplay, CacheStatsDisplay, ChannelDisplay, ConnectionDisplay, Displayable,
    ExchangeDisplay, QueueDisplay,
};
