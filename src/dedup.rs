/*
 * Cloakwatch - Decloak Alert Relay
 * File Path: src/dedup.rs
 * Responsibility: Per-file memory of the last alerted decloak timestamp.
 */

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// Last-value dedup: one stored key per file, overwritten on every novel
/// detection. Only an exact repeat of the stored key is suppressed.
#[derive(Debug, Default)]
pub struct DedupState {
    last_seen: Mutex<HashMap<PathBuf, String>>,
}

impl DedupState {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PathBuf, String>> {
        // Every write is a single insert, so a poisoned map is still consistent.
        self.last_seen.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn is_novel(&self, path: &Path, key: &str) -> bool {
        self.lock().get(path).map(String::as_str) != Some(key)
    }

    pub fn record(&self, path: &Path, key: &str) {
        self.lock().insert(path.to_path_buf(), key.to_string());
    }

    /// Check and record under one lock. Returns true when the key was novel.
    pub fn observe(&self, path: &Path, key: &str) -> bool {
        let mut map = self.lock();
        if map.get(path).map(String::as_str) == Some(key) {
            return false;
        }
        map.insert(path.to_path_buf(), key.to_string());
        true
    }

    pub fn last_seen(&self, path: &Path) -> Option<String> {
        self.lock().get(path).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
