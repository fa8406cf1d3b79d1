//! Background Tasks Module
//!
//! # Tasks
//! - Expiry sweep: drops expired entries from every bin at the configured interval

mod cleanup;

pub use cleanup::spawn_cleanup_task;
