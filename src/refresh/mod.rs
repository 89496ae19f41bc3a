//! Refresh coordination on top of the cache
//!
//! [`ResourceController`] drives explicit loads, refreshes and fixed-period
//! auto-refresh for one resource type. [`StaleWhileRevalidate`] serves cached
//! data first and revalidates it in the background.

pub mod controller;
pub mod swr;
pub mod timer;

pub use controller::{LastRequest, LoadPhase, RefreshState, ResourceController, SessionExpiredHook};
pub use swr::{DEFAULT_STALE_CHECK_INTERVAL, DEFAULT_STALE_TIME, StaleWhileRevalidate, SwrState};
pub use timer::RepeatingTask;
