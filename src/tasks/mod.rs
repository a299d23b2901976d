//! Background Tasks Module
//!
//! - TTL Cleanup: sweeps expired listings and sessions out of the cache

mod cleanup;

pub use cleanup::spawn_cleanup_task;
