//! Operation Dispatcher
//!
//! Translates a request into one cache operation and runs it.
//!
//! | Verb   | Path                 | Operation     |
//! |--------|----------------------|---------------|
//! | GET    | `/`                  | list bins (multi) or keys (single) |
//! | GET    | `/:bin/`             | list keys     |
//! | GET    | `/:bin/*key`         | get           |
//! | PUT    | `/:bin/+/*key`       | increment     |
//! | PUT    | `/:bin/-/*key`       | decrement     |
//! | PUT    | `/:bin/*key`         | put           |
//! | POST   | `/:bin/*key`         | put if absent |
//! | DELETE | `/:bin/`             | clear         |
//! | DELETE | `/:bin/*key`         | remove        |
//!
//! In single-bin mode the `/:bin` prefix is absent.

mod execute;
mod operation;

pub use execute::{execute, Reply};
pub use operation::{parse_delta, Operation};
