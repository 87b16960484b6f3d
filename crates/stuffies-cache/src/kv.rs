//! Key-Value store abstraction with automatic serialization.

use std::path::Path;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};

use crate::{CacheError, FileStore, MemoryStore};

/// A raw byte-oriented key-value backend.
///
/// Writes replace the whole value for a key; there are no partial updates.
/// Backends give last-writer-wins semantics and nothing stronger.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Replace the value stored under `key`.
    fn set(&self, key: &str, value: &[u8]) -> Result<(), CacheError>;

    /// Remove `key`. Removing a missing key is not an error.
    fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// Check if a key exists.
    fn exists(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.get(key)?.is_some())
    }

    /// List every key in the store.
    fn keys(&self) -> Result<Vec<String>, CacheError>;
}

/// Type-safe cache over any [`KeyValueStore`].
///
/// Provides automatic JSON serialization for any type that implements
/// `Serialize` and `DeserializeOwned`. Cloning is cheap and clones share the
/// same backend.
#[derive(Clone)]
pub struct Cache {
    store: Arc<dyn KeyValueStore>,
}

impl Cache {
    /// Wrap an existing backend.
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// Wrap a shared backend.
    pub fn from_shared(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// A cache backed by process memory. Nothing survives a restart.
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    /// Open a file-backed cache rooted at `dir`, creating it if needed.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let cache = Cache::open_dir(".stuffies/store")?;
    /// ```
    pub fn open_dir(dir: impl AsRef<Path>) -> Result<Self, CacheError> {
        Ok(Self::new(FileStore::open(dir)?))
    }

    /// Open the default Spin Key-Value store.
    #[cfg(target_arch = "wasm32")]
    pub fn open_default() -> Result<Self, CacheError> {
        Ok(Self::new(crate::SpinStore::open_default()?))
    }

    /// Open a named Spin Key-Value store.
    #[cfg(target_arch = "wasm32")]
    pub fn open(name: &str) -> Result<Self, CacheError> {
        Ok(Self::new(crate::SpinStore::open(name)?))
    }

    /// Get a value from the cache.
    ///
    /// Returns `None` if the key doesn't exist and an error if the stored
    /// bytes do not decode as `T`.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let items: Option<Vec<CartLineItem>> = cache.get("stuffies:cart")?;
    /// ```
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        match self.store.get(key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Set a value in the cache.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        let bytes = serde_json::to_vec(value)?;
        self.store.set(key, &bytes)
    }

    /// Get a raw UTF-8 string, without JSON decoding.
    pub fn get_raw(&self, key: &str) -> Result<Option<String>, CacheError> {
        match self.store.get(key)? {
            Some(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|e| CacheError::StoreError(e.to_string())),
            None => Ok(None),
        }
    }

    /// Set a raw UTF-8 string, without JSON encoding.
    pub fn set_raw(&self, key: &str, value: &str) -> Result<(), CacheError> {
        self.store.set(key, value.as_bytes())
    }

    /// Delete a value from the cache.
    pub fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.store.delete(key)
    }

    /// Check if a key exists in the cache.
    pub fn exists(&self, key: &str) -> Result<bool, CacheError> {
        self.store.exists(key)
    }

    /// Get all keys in the cache.
    pub fn keys(&self) -> Result<Vec<String>, CacheError> {
        self.store.keys()
    }
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache").finish_non_exhaustive()
    }
}

/// Helper to build cache keys with namespacing.
///
/// # Example
///
/// ```rust
/// let key = stuffies_cache::cache_key!("stuffies", "cart");
/// assert_eq!(key, "stuffies:cart");
/// ```
#[macro_export]
macro_rules! cache_key {
    ($prefix:expr, $($part:expr),+) => {{
        let mut key = String::from($prefix);
        $(
            key.push(':');
            key.push_str(&$part.to_string());
        )+
        key
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Item {
        name: String,
        qty: u32,
    }

    #[test]
    fn test_typed_roundtrip() {
        let cache = Cache::in_memory();
        let item = Item {
            name: "polera".into(),
            qty: 2,
        };
        cache.set("item", &item).unwrap();

        let back: Option<Item> = cache.get("item").unwrap();
        assert_eq!(back, Some(item));
    }

    #[test]
    fn test_missing_key_is_none() {
        let cache = Cache::in_memory();
        let value: Option<Item> = cache.get("nope").unwrap();
        assert!(value.is_none());
        assert!(!cache.exists("nope").unwrap());
    }

    #[test]
    fn test_corrupt_value_is_error() {
        let cache = Cache::in_memory();
        cache.set_raw("item", "{not json").unwrap();
        let result: Result<Option<Item>, _> = cache.get("item");
        assert!(matches!(result, Err(CacheError::SerializeError(_))));
    }

    #[test]
    fn test_raw_strings_are_not_quoted() {
        let cache = Cache::in_memory();
        cache.set_raw("token", "abc.def").unwrap();
        assert_eq!(cache.get_raw("token").unwrap().as_deref(), Some("abc.def"));
    }

    #[test]
    fn test_clones_share_backend() {
        let a = Cache::in_memory();
        let b = a.clone();
        a.set("n", &1u8).unwrap();
        assert_eq!(b.get::<u8>("n").unwrap(), Some(1));
    }

    #[test]
    fn test_cache_key_macro() {
        assert_eq!(cache_key!("cart", "user", 7), "cart:user:7");
    }
}
