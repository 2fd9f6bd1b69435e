//! Common library for the alumni portal
//!
//! This crate provides the storage layer shared by the portal crates: the
//! [`store::KeyValueStore`] abstraction used to keep sessions, its memory,
//! file and Redis backends, and the error type they report.
//!
//! ```rust,no_run
//! use common::store::{FileStore, KeyValueStore};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = FileStore::open("session.json")?;
//!     store.set("access_token", "token")?;
//!     println!("Stored token: {:?}", store.get("access_token")?);
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod error;
pub mod store;

pub use cache::{RedisConfig, RedisStore};
pub use error::{StoreError, StoreResult};
pub use store::{FileStore, KeyValueStore, MemoryStore};
