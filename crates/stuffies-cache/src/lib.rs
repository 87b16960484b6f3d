//! Durable key-value storage for the Stuffies storefront.
//!
//! Provides a small byte-level [`KeyValueStore`] trait, a typed [`Cache`]
//! with automatic JSON serialization on top of it, and the stored shopper
//! [`Session`].
//!
//! # Example
//!
//! ```rust,ignore
//! use stuffies_cache::Cache;
//!
//! let cache = Cache::open_dir(".stuffies/store")?;
//!
//! // Store a value
//! cache.set("stuffies:cart", &items)?;
//!
//! // Retrieve a value
//! let items: Option<Vec<CartLineItem>> = cache.get("stuffies:cart")?;
//!
//! // Delete a value
//! cache.delete("stuffies:cart")?;
//! ```

mod error;
mod file;
mod kv;
mod memory;
mod session;
#[cfg(target_arch = "wasm32")]
mod spin;

pub use error::CacheError;
pub use file::FileStore;
pub use kv::{Cache, KeyValueStore};
pub use memory::MemoryStore;
pub use session::{Session, SessionProfile, SESSION_KEY, TOKEN_KEY};
#[cfg(target_arch = "wasm32")]
pub use spin::SpinStore;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{Cache, CacheError, KeyValueStore, Session, SessionProfile};
}
