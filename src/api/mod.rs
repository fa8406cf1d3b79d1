//! API Module
//!
//! HTTP surface of the cache. All responses are `text/plain`.
//!
//! # Endpoints (multi-bin mode)
//! - `GET /` - List bin names
//! - `GET /:bin/` - List keys in a bin
//! - `GET /:bin/*key` - Fetch a value
//! - `PUT /:bin/+/*key`, `PUT /:bin/-/*key` - Increment / decrement
//! - `PUT /:bin/*key` - Write, TTL from `Cache-Control: max-age=N`
//! - `POST /:bin/*key` - Write if absent
//! - `DELETE /:bin/` - Clear a bin
//! - `DELETE /:bin/*key` - Remove a key
//!
//! Single-bin mode drops the `/:bin` segment; `GET /` then lists keys.

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
