//! Directory-backed key-value store.
//!
//! Every key maps to one file under the root directory. Keys are
//! percent-encoded so that namespaced keys such as `stuffies:cart` are valid
//! file names on every platform.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::{CacheError, KeyValueStore};

const TEMP_PREFIX: &str = ".tmp-";

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A [`KeyValueStore`] persisted as one file per key.
///
/// Writes go to a temporary file in the same directory and are renamed over
/// the target, so readers never observe a half-written value. Each write gets
/// its own temporary file, named after the process and a counter, so
/// concurrent writers (threads or processes) never share one.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `root`.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, CacheError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)
            .map_err(|e| CacheError::OpenError(format!("{}: {}", root.display(), e)))?;
        tracing::debug!(root = %root.display(), "opened file store");
        Ok(Self { root })
    }

    /// The directory holding the values.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn temp_path_for(&self, key: &str) -> PathBuf {
        let n = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        self.root.join(format!(
            "{}{}.{}.{}",
            TEMP_PREFIX,
            encode_key(key),
            std::process::id(),
            n
        ))
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, CacheError> {
        if key.is_empty() {
            return Err(CacheError::InvalidKey("empty key".to_string()));
        }
        Ok(self.root.join(encode_key(key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let path = self.path_for(key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), CacheError> {
        let path = self.path_for(key)?;
        let tmp = self.temp_path_for(key);
        let written = fs::write(&tmp, value).and_then(|()| fs::rename(&tmp, &path));
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn exists(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.path_for(key)?.is_file())
    }

    fn keys(&self) -> Result<Vec<String>, CacheError> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if name.starts_with(TEMP_PREFIX) {
                continue;
            }
            if let Some(key) = decode_key(name) {
                keys.push(key);
            }
        }
        keys.sort();
        Ok(keys)
    }
}

fn encode_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for byte in key.bytes() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'_' => out.push(byte as char),
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

fn decode_key(name: &str) -> Option<String> {
    let bytes = name.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = name.get(i + 1..i + 3)?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn scratch_dir(name: &str) -> PathBuf {
        static COUNTER: AtomicU32 = AtomicU32::new(0);
        let n = COUNTER.fetch_add(1, Ordering::SeqCst);
        let dir = std::env::temp_dir().join(format!(
            "stuffies-file-store-{}-{}-{}",
            name,
            std::process::id(),
            n
        ));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_key_encoding() {
        assert_eq!(encode_key("stuffies:cart"), "stuffies%3Acart");
        assert_eq!(decode_key("stuffies%3Acart").as_deref(), Some("stuffies:cart"));
        assert_eq!(encode_key("../etc"), "%2E%2E%2Fetc");
        assert_eq!(decode_key("bad%Z"), None);
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = scratch_dir("reopen");
        let store = FileStore::open(&dir).unwrap();
        store.set("stuffies:cart", b"[]").unwrap();

        let reopened = FileStore::open(&dir).unwrap();
        assert_eq!(reopened.get("stuffies:cart").unwrap(), Some(b"[]".to_vec()));
        assert_eq!(reopened.keys().unwrap(), vec!["stuffies:cart"]);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_and_delete() {
        let dir = scratch_dir("delete");
        let store = FileStore::open(&dir).unwrap();
        assert_eq!(store.get("token").unwrap(), None);

        store.set("token", b"abc").unwrap();
        assert!(store.exists("token").unwrap());
        store.delete("token").unwrap();
        assert!(!store.exists("token").unwrap());
        store.delete("token").unwrap();

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_writers_use_distinct_temp_files() {
        let dir = scratch_dir("temp");
        let store = FileStore::open(&dir).unwrap();
        let a = store.temp_path_for("stuffies:cart");
        let b = store.temp_path_for("stuffies:cart");
        assert_ne!(a, b);
        let name = a.file_name().unwrap().to_str().unwrap().to_string();
        assert!(name.starts_with(".tmp-stuffies%3Acart."));
        assert!(name.contains(&std::process::id().to_string()));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_concurrent_writers_leave_a_whole_value() {
        let dir = scratch_dir("concurrent");
        let store = FileStore::open(&dir).unwrap();

        let values: Vec<Vec<u8>> = (0..8u8).map(|i| vec![b'a' + i; 64 * 1024]).collect();
        std::thread::scope(|scope| {
            for value in &values {
                let store = store.clone();
                scope.spawn(move || {
                    for _ in 0..10 {
                        store.set("stuffies:cart", value).unwrap();
                    }
                });
            }
        });

        let stored = store.get("stuffies:cart").unwrap().unwrap();
        assert!(values.contains(&stored));
        assert_eq!(store.keys().unwrap(), vec!["stuffies:cart"]);
        let leftovers = fs::read_dir(&dir)
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().starts_with(TEMP_PREFIX))
            .count();
        assert_eq!(leftovers, 0);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_empty_key_rejected() {
        let dir = scratch_dir("empty");
        let store = FileStore::open(&dir).unwrap();
        assert!(matches!(store.set("", b"x"), Err(CacheError::InvalidKey(_))));
        fs::remove_dir_all(&dir).unwrap();
    }
}
