//! Background Tasks Module
//!
//! Contains background tasks that run periodically while an instance lives.
//!
//! # Tasks
//! - Refresh: re-fetches every cached location on a fixed period

mod refresh;

pub use refresh::{spawn_refresh_task, RefreshHandle};
