//! Occurrence counters keyed by structural path.
//!
//! Keys are built by the tree builder from the live path of the open
//! elements, e.g. `/doc[1]/item`, `/doc[1]/text()` or `/doc[1]/comment()`.
//! Counters start at 1 and only ever grow for the lifetime of one parse.

use compact_str::CompactString;
use rapidhash::RapidHashMap as HashMap;

#[derive(Debug, Clone, Default)]
pub struct PathCounter {
    counts: HashMap<CompactString, u32>,
}

impl PathCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one more visit of `path` and return its new count.
    pub fn bump(&mut self, path: &str) -> u32 {
        if let Some(count) = self.counts.get_mut(path) {
            *count += 1;
            return *count;
        }
        self.counts.insert(CompactString::from(path), 1);
        1
    }

    /// Current count for `path`, 0 if it was never visited.
    pub fn get(&self, path: &str) -> u32 {
        self.counts.get(path).copied().unwrap_or(0)
    }

    /// Number of distinct paths seen.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_bump_is_one() {
        let mut counter = PathCounter::new();
        assert_eq!(counter.get("/a"), 0);
        assert_eq!(counter.bump("/a"), 1);
        assert_eq!(counter.get("/a"), 1);
    }

    #[test]
    fn paths_count_independently() {
        let mut counter = PathCounter::new();
        assert_eq!(counter.bump("/a[1]/b"), 1);
        assert_eq!(counter.bump("/a[1]/b"), 2);
        assert_eq!(counter.bump("/a[1]/text()"), 1);
        assert_eq!(counter.bump("/a[1]/b"), 3);
        assert_eq!(counter.len(), 2);
    }
}
