//! Flat-file key/value cache with per-entry expiry.
//!
//! Each key is hashed with SHA-256 and stored as one JSON file under a
//! two-character fan-out directory: `<root>/ab/ab12….cache`. Expired or
//! unreadable entries are removed lazily on read, or in bulk by [`FileCache::gc`].

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::error::OpiResult;

const EXTENSION: &str = "cache";

/// One stored entry, as written to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The unhashed key.
    pub key: String,
    /// The stored value.
    pub value: Value,
    /// Unix seconds when the entry was written.
    pub created_at: i64,
    /// Unix seconds after which the entry is dead.
    pub expires_at: i64,
}

impl CacheEntry {
    /// Whether the entry is dead at `now` (unix seconds).
    pub fn is_expired(&self, now: i64) -> bool {
        now > self.expires_at
    }
}

/// A directory-backed cache. A disabled cache stores nothing.
#[derive(Debug, Clone)]
pub struct FileCache {
    root: Option<PathBuf>,
}

impl FileCache {
    /// A cache rooted at `root`. The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    /// A cache where every read misses and every write is dropped.
    pub fn disabled() -> Self {
        Self { root: None }
    }

    /// Whether this cache stores anything.
    pub fn is_enabled(&self) -> bool {
        self.root.is_some()
    }

    /// The root directory, if enabled.
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// Where `key` lives on disk.
    pub fn path_for(&self, key: &str) -> Option<PathBuf> {
        let root = self.root.as_ref()?;
        let hash = hex::encode(Sha256::digest(key.as_bytes()));
        Some(root.join(&hash[..2]).join(format!("{hash}.{EXTENSION}")))
    }

    /// Read `key` as of the current time.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get_at(key, Utc::now())
    }

    /// Read `key` as of `now`. Expired and corrupt entries are deleted.
    pub fn get_at<T: DeserializeOwned>(&self, key: &str, now: DateTime<Utc>) -> Option<T> {
        let path = self.path_for(key)?;
        let entry = read_entry(&path)?;
        if entry.key != key {
            return None;
        }
        if entry.is_expired(now.timestamp()) {
            tracing::debug!(key, "cache entry expired");
            remove_quietly(&path);
            return None;
        }
        match serde_json::from_value(entry.value) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::debug!(key, error = %err, "cache entry has unexpected shape");
                None
            }
        }
    }

    /// Store `value` under `key` for `ttl`, as of the current time.
    pub fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) -> OpiResult<()> {
        self.set_at(key, value, ttl, Utc::now())
    }

    /// Store `value` under `key` for `ttl` starting at `now`.
    ///
    /// Writes a temp file next to the target and renames it into place, so
    /// readers see either the old entry or the new one.
    pub fn set_at<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> OpiResult<()> {
        let Some(path) = self.path_for(key) else {
            return Ok(());
        };
        let created_at = now.timestamp();
        let ttl_secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        let entry = CacheEntry {
            key: key.to_string(),
            value: serde_json::to_value(value)?,
            created_at,
            expires_at: created_at.saturating_add(ttl_secs),
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = path.with_extension(format!("{EXTENSION}.tmp.{}", std::process::id()));
        fs::write(&tmp, serde_json::to_vec(&entry)?)?;
        if let Err(err) = fs::rename(&tmp, &path) {
            remove_quietly(&tmp);
            return Err(err.into());
        }
        tracing::debug!(key, expires_at = entry.expires_at, "cache entry written");
        Ok(())
    }

    /// Remove `key`. Returns whether an entry existed.
    pub fn delete(&self, key: &str) -> OpiResult<bool> {
        let Some(path) = self.path_for(key) else {
            return Ok(false);
        };
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    /// Remove every entry. Returns how many were removed.
    pub fn clear(&self) -> OpiResult<usize> {
        self.sweep(|_| true)
    }

    /// Remove expired and unreadable entries as of the current time.
    pub fn gc(&self) -> OpiResult<usize> {
        self.gc_at(Utc::now())
    }

    /// Remove expired and unreadable entries as of `now`.
    pub fn gc_at(&self, now: DateTime<Utc>) -> OpiResult<usize> {
        let now = now.timestamp();
        self.sweep(|path| match read_entry(path) {
            Some(entry) => entry.is_expired(now),
            None => true,
        })
    }

    fn sweep(&self, mut doomed: impl FnMut(&Path) -> bool) -> OpiResult<usize> {
        let Some(root) = self.root.as_ref() else {
            return Ok(0);
        };
        let buckets = match fs::read_dir(root) {
            Ok(dir) => dir,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(0),
            Err(err) => return Err(err.into()),
        };

        let mut removed = 0;
        for bucket in buckets {
            let bucket = bucket?.path();
            if !bucket.is_dir() {
                continue;
            }
            for file in fs::read_dir(&bucket)? {
                let file = file?.path();
                let is_entry = file.extension().is_some_and(|ext| ext == EXTENSION);
                if is_entry && doomed(&file) {
                    fs::remove_file(&file)?;
                    removed += 1;
                }
            }
            // Only succeeds when the bucket is empty.
            let _ = fs::remove_dir(&bucket);
        }
        tracing::debug!(removed, "cache sweep finished");
        Ok(removed)
    }
}

/// Read and parse an entry. A corrupt file is removed and reads as absent.
fn read_entry(path: &Path) -> Option<CacheEntry> {
    let bytes = fs::read(path).ok()?;
    match serde_json::from_slice(&bytes) {
        Ok(entry) => Some(entry),
        Err(err) => {
            tracing::debug!(path = %path.display(), error = %err, "dropping corrupt cache entry");
            remove_quietly(path);
            None
        }
    }
}

fn remove_quietly(path: &Path) {
    match fs::remove_file(path) {
        Err(err) if err.kind() != ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), error = %err, "could not remove cache file");
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 5, 12, 0, 0).unwrap()
    }

    fn secs(n: i64) -> chrono::Duration {
        chrono::Duration::seconds(n)
    }

    #[test]
    fn set_then_get_before_and_after_ttl() {
        let dir = TempDir::new().unwrap();
        let cache = FileCache::new(dir.path());
        cache
            .set_at("opi_2025030521", &42u8, Duration::from_secs(60), t0())
            .unwrap();

        assert_eq!(cache.get_at::<u8>("opi_2025030521", t0()), Some(42));
        assert_eq!(cache.get_at::<u8>("opi_2025030521", t0() + secs(60)), Some(42));
        assert_eq!(cache.get_at::<u8>("opi_2025030521", t0() + secs(61)), None);
        // The expired entry was removed on read.
        assert!(!cache.path_for("opi_2025030521").unwrap().exists());
    }

    #[test]
    fn layout_is_hash_fanout() {
        let dir = TempDir::new().unwrap();
        let cache = FileCache::new(dir.path());
        let path = cache.path_for("k").unwrap();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        let bucket = path.parent().unwrap().file_name().unwrap().to_string_lossy().to_string();
        assert_eq!(bucket.len(), 2);
        assert!(name.starts_with(&bucket));
        assert!(name.ends_with(".cache"));
        assert_eq!(name.len(), 64 + ".cache".len());
    }

    #[test]
    fn missing_key_is_absent() {
        let dir = TempDir::new().unwrap();
        let cache = FileCache::new(dir.path());
        assert_eq!(cache.get_at::<u8>("nope", t0()), None);
    }

    #[test]
    fn overwrite_is_last_write_wins() {
        let dir = TempDir::new().unwrap();
        let cache = FileCache::new(dir.path());
        let ttl = Duration::from_secs(60);
        cache.set_at("k", &"first", ttl, t0()).unwrap();
        cache.set_at("k", &"second", ttl, t0()).unwrap();
        assert_eq!(cache.get_at::<String>("k", t0()).as_deref(), Some("second"));
    }

    #[test]
    fn corrupt_entry_reads_absent_and_is_removed() {
        let dir = TempDir::new().unwrap();
        let cache = FileCache::new(dir.path());
        let path = cache.path_for("k").unwrap();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"{not json").unwrap();

        assert_eq!(cache.get_at::<u8>("k", t0()), None);
        assert!(!path.exists());
    }

    #[test]
    fn delete_reports_presence() {
        let dir = TempDir::new().unwrap();
        let cache = FileCache::new(dir.path());
        cache.set_at("k", &1u8, Duration::from_secs(60), t0()).unwrap();
        assert!(cache.delete("k").unwrap());
        assert!(!cache.delete("k").unwrap());
    }

    #[test]
    fn gc_removes_only_dead_entries() {
        let dir = TempDir::new().unwrap();
        let cache = FileCache::new(dir.path());
        cache.set_at("short", &1u8, Duration::from_secs(10), t0()).unwrap();
        cache.set_at("long", &2u8, Duration::from_secs(1000), t0()).unwrap();
        let junk = cache.path_for("junk").unwrap();
        fs::create_dir_all(junk.parent().unwrap()).unwrap();
        fs::write(&junk, b"garbage").unwrap();

        assert_eq!(cache.gc_at(t0() + secs(100)).unwrap(), 2);
        assert_eq!(cache.get_at::<u8>("long", t0() + secs(100)), Some(2));
    }

    #[test]
    fn clear_removes_everything() {
        let dir = TempDir::new().unwrap();
        let cache = FileCache::new(dir.path());
        for key in ["a", "b", "c"] {
            cache.set_at(key, &key, Duration::from_secs(60), t0()).unwrap();
        }
        assert_eq!(cache.clear().unwrap(), 3);
        assert_eq!(cache.get_at::<String>("a", t0()), None);
    }

    #[test]
    fn clear_on_missing_root_is_zero() {
        let dir = TempDir::new().unwrap();
        let cache = FileCache::new(dir.path().join("never-created"));
        assert_eq!(cache.clear().unwrap(), 0);
    }

    #[test]
    fn disabled_cache_stores_nothing() {
        let cache = FileCache::disabled();
        assert!(!cache.is_enabled());
        cache.set_at("k", &1u8, Duration::from_secs(60), t0()).unwrap();
        assert_eq!(cache.get_at::<u8>("k", t0()), None);
        assert_eq!(cache.gc().unwrap(), 0);
    }
}
