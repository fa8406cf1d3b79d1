//! restbin - a plain-text HTTP front end for key-value cache bins
//!
//! Each HTTP verb maps onto one cache operation: read, write, conditional
//! write, increment, decrement, remove, clear and enumerate. Bins are created
//! lazily by name; storage itself sits behind the [`backend::Backend`] trait.

pub mod api;
pub mod backend;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod key;
pub mod registry;
pub mod tasks;
pub mod ttl;

pub use api::AppState;
pub use config::Config;
pub use registry::{BinMode, CacheRegistry};
pub use tasks::spawn_cleanup_task;
