//! Parse cache keyed by input-file content
//!
//! Entries are keyed by the SHA-256 of the file plus a caller-chosen variant
//! (e.g. the sheet list used). The cache remembers which hash each path had
//! last time, so a changed file evicts its stale entries unless another path
//! still has the same contents.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::debug;

use fuelbench_types::{CacheError, Error, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

#[derive(Debug)]
pub struct FileCache<T> {
    entries: HashMap<(String, String), T>,
    path_hashes: HashMap<PathBuf, String>,
    hits: u64,
    misses: u64,
}

impl<T> Default for FileCache<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            path_hashes: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }
}

impl<T: Clone> FileCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hex SHA-256 of a file's contents
    pub fn hash_file(path: &Path) -> Result<String> {
        if !path.exists() {
            return Err(Error::FileNotFound(path.display().to_string()));
        }
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        let mut hasher = Sha256::new();
        std::io::copy(&mut reader, &mut hasher)
            .map_err(|e| CacheError::IoError(format!("{}: {}", path.display(), e)))?;
        Ok(format!("{:x}", hasher.finalize()))
    }

    /// Cached value for `(path contents, variant)`, loading it on a miss.
    ///
    /// Returns an owned copy so callers never mutate the cached value.
    pub fn get_or_load<F>(&mut self, path: &Path, variant: &str, load: F) -> Result<T>
    where
        F: FnOnce(&Path) -> Result<T>,
    {
        let hash = Self::hash_file(path)?;
        let canonical = path.to_path_buf();
        let stale = self.path_hashes.insert(canonical, hash.clone());
        if let Some(stale) = stale.filter(|h| h != &hash) {
            debug!(path = %path.display(), "input changed, evicting cached parse");
            self.evict_unreferenced(&stale);
        }

        let key = (hash, variant.to_string());
        if let Some(value) = self.entries.get(&key) {
            self.hits += 1;
            debug!(path = %path.display(), variant, "parse cache hit");
            return Ok(value.clone());
        }
        self.misses += 1;
        debug!(path = %path.display(), variant, "parse cache miss");
        let value = load(path)?;
        self.entries.insert(key, value.clone());
        Ok(value)
    }

    /// Drop everything cached for a path
    pub fn invalidate(&mut self, path: &Path) {
        if let Some(hash) = self.path_hashes.remove(path) {
            self.evict_unreferenced(&hash);
        }
    }

    /// Drop entries for `hash` once no tracked path has those contents
    fn evict_unreferenced(&mut self, hash: &str) {
        if self.path_hashes.values().any(|h| h == hash) {
            return;
        }
        self.entries.retain(|(h, _), _| h != hash);
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            hits: self.hits,
            misses: self.misses,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_hit_after_first_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bbm.xlsx");
        std::fs::write(&path, b"first").unwrap();

        let loads = Cell::new(0);
        let mut cache: FileCache<String> = FileCache::new();
        for _ in 0..3 {
            let v = cache
                .get_or_load(&path, "JAN", |_| {
                    loads.set(loads.get() + 1);
                    Ok("parsed".to_string())
                })
                .unwrap();
            assert_eq!(v, "parsed");
        }
        assert_eq!(loads.get(), 1);
        assert_eq!(cache.stats(), CacheStats { entries: 1, hits: 2, misses: 1 });
    }

    #[test]
    fn test_changed_file_evicts_stale_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("master.xlsx");
        std::fs::write(&path, b"v1").unwrap();

        let mut cache: FileCache<u32> = FileCache::new();
        assert_eq!(cache.get_or_load(&path, "", |_| Ok(1)).unwrap(), 1);
        std::fs::write(&path, b"v2").unwrap();
        assert_eq!(cache.get_or_load(&path, "", |_| Ok(2)).unwrap(), 2);
        assert_eq!(cache.stats().entries, 1);
        assert_eq!(cache.stats().misses, 2);
    }

    #[test]
    fn test_identical_copy_survives_rewrite_of_other_path() {
        let dir = tempfile::tempdir().unwrap();
        let original = dir.path().join("master.xlsx");
        let copy = dir.path().join("master_copy.xlsx");
        std::fs::write(&original, b"same").unwrap();
        std::fs::write(&copy, b"same").unwrap();

        let mut cache: FileCache<u32> = FileCache::new();
        cache.get_or_load(&original, "", |_| Ok(1)).unwrap();
        cache.get_or_load(&copy, "", |_| Ok(1)).unwrap();
        assert_eq!(cache.stats().hits, 1);

        std::fs::write(&original, b"edited").unwrap();
        assert_eq!(cache.get_or_load(&original, "", |_| Ok(2)).unwrap(), 2);
        // copy still has the old contents and still hits
        assert_eq!(cache.get_or_load(&copy, "", |_| Ok(99)).unwrap(), 1);
        assert_eq!(cache.stats().hits, 2);
        assert_eq!(cache.stats().entries, 2);

        cache.invalidate(&original);
        assert_eq!(cache.get_or_load(&copy, "", |_| Ok(99)).unwrap(), 1);
    }

    #[test]
    fn test_variants_are_separate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bbm.xlsx");
        std::fs::write(&path, b"x").unwrap();

        let mut cache: FileCache<&'static str> = FileCache::new();
        cache.get_or_load(&path, "all", |_| Ok("all")).unwrap();
        assert_eq!(cache.get_or_load(&path, "JAN", |_| Ok("jan")).unwrap(), "jan");
        assert_eq!(cache.stats().entries, 2);

        cache.invalidate(&path);
        assert_eq!(cache.stats().entries, 0);
    }

    #[test]
    fn test_failed_load_is_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bbm.xlsx");
        std::fs::write(&path, b"x").unwrap();

        let mut cache: FileCache<u32> = FileCache::new();
        assert!(cache
            .get_or_load(&path, "", |_| Err(Error::InvalidInput("bad".to_string())))
            .is_err());
        assert_eq!(cache.stats().entries, 0);
        assert!(matches!(
            cache.get_or_load(&dir.path().join("missing.xlsx"), "", |_| Ok(0)),
            Err(Error::FileNotFound(_))
        ));
    }
}
