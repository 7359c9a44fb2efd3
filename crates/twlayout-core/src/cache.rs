//! In-memory layout cache keyed by type name.

use std::collections::HashMap;

use serde::Serialize;

use crate::layout::Layout;

/// Statistics about cache usage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub entries: usize,
}

/// Memoized layouts for one profile and one descriptor set.
#[derive(Debug, Clone)]
pub struct LayoutCache {
    entries: HashMap<String, Layout>,
    hits: usize,
    misses: usize,
}

impl LayoutCache {
    /// Create a new empty cache.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }

    /// Look up a cached layout.
    pub fn lookup(&mut self, type_name: &str) -> Option<&Layout> {
        if self.entries.contains_key(type_name) {
            self.hits += 1;
            self.entries.get(type_name)
        } else {
            self.misses += 1;
            None
        }
    }

    /// Store a computed layout under its type name.
    pub fn store(&mut self, layout: Layout) {
        self.entries.insert(layout.type_name.clone(), layout);
    }

    /// Return cache usage statistics.
    pub fn statistics(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.entries.len(),
        }
    }
}

impl Default for LayoutCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Layout {
        Layout {
            type_name: "TW_FIX32".into(),
            size: 4,
            align: 2,
            fields: vec![],
        }
    }

    #[test]
    fn store_and_retrieve() {
        let mut cache = LayoutCache::new();
        assert!(cache.lookup("TW_FIX32").is_none());
        cache.store(sample());
        assert_eq!(cache.lookup("TW_FIX32").unwrap().size, 4);
    }

    #[test]
    fn statistics_count_hits_and_misses() {
        let mut cache = LayoutCache::new();
        let _ = cache.lookup("TW_FIX32");
        cache.store(sample());
        let _ = cache.lookup("TW_FIX32");
        let _ = cache.lookup("TW_FIX32");
        assert_eq!(
            cache.statistics(),
            CacheStats {
                hits: 2,
                misses: 1,
                entries: 1
            }
        );
    }
}
