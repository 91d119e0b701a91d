//! Fixed-window text splitting for embedding.
//!
//! One strategy only: a sliding window with overlap (default size 100,
//! overlap 10). Deterministic for identical input, which re-indexing relies
//! on for debuggability.

use valet_core::TextSplitter;

/// Configuration for the sliding window splitter.
#[derive(Debug, Clone)]
pub struct SplitterConfig {
    /// Maximum size of a chunk in bytes (cut at UTF-8 boundaries).
    pub chunk_size: usize,
    /// Number of bytes to overlap between chunks for context preservation.
    pub overlap: usize,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            chunk_size: valet_core::defaults::CHUNK_SIZE,
            overlap: valet_core::defaults::CHUNK_OVERLAP,
        }
    }
}

/// Find UTF-8 safe boundary at or before the given position.
fn find_char_boundary_before(text: &str, mut pos: usize) -> usize {
    while pos > 0 && !text.is_char_boundary(pos) {
        pos -= 1;
    }
    pos
}

/// Find UTF-8 safe boundary at or after the given position.
fn find_char_boundary_after(text: &str, mut pos: usize) -> usize {
    while pos < text.len() && !text.is_char_boundary(pos) {
        pos += 1;
    }
    pos
}

/// Fixed-size chunks with configurable overlap.
#[derive(Debug, Clone, Default)]
pub struct SlidingWindowSplitter {
    config: SplitterConfig,
}

impl SlidingWindowSplitter {
    /// Create a new splitter with the given configuration.
    pub fn new(config: SplitterConfig) -> Self {
        Self { config }
    }

    /// Get the configuration used by this splitter.
    pub fn config(&self) -> &SplitterConfig {
        &self.config
    }
}

impl TextSplitter for SlidingWindowSplitter {
    fn split(&self, text: &str) -> Vec<String> {
        if text.is_empty() {
            return vec![];
        }

        if text.len() <= self.config.chunk_size {
            return vec![text.to_string()];
        }

        let step_size = if self.config.overlap >= self.config.chunk_size {
            1 // Prevent infinite loop
        } else {
            self.config
                .chunk_size
                .saturating_sub(self.config.overlap)
                .max(1)
        };

        let mut chunks = Vec::new();
        let mut start = 0;

        while start < text.len() {
            let mut end = (start + self.config.chunk_size).min(text.len());
            end = find_char_boundary_before(text, end);

            if end > start {
                chunks.push(text[start..end].to_string());
            }

            if end >= text.len() {
                break;
            }

            start += step_size;
            start = find_char_boundary_after(text, start);
        }

        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn splitter(chunk_size: usize, overlap: usize) -> SlidingWindowSplitter {
        SlidingWindowSplitter::new(SplitterConfig {
            chunk_size,
            overlap,
        })
    }

    #[test]
    fn test_empty_text_yields_no_chunks() {
        assert!(splitter(100, 10).split("").is_empty());
    }

    #[test]
    fn test_short_text_is_one_chunk() {
        let chunks = splitter(100, 10).split("hello world");
        assert_eq!(chunks, vec!["hello world".to_string()]);
    }

    #[test]
    fn test_long_text_windows_overlap() {
        let text = "abcdefghij".repeat(5); // 50 bytes
        let chunks = splitter(20, 5).split(&text);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.len() <= 20);
        }
        // Adjacent chunks share the overlap region.
        assert_eq!(&chunks[0][15..], &chunks[1][..5]);
    }

    #[test]
    fn test_split_is_deterministic() {
        let text = "the quick brown fox jumps over the lazy dog ".repeat(10);
        let s = splitter(100, 10);
        assert_eq!(s.split(&text), s.split(&text));
    }

    #[test]
    fn test_multibyte_boundaries_are_respected() {
        let text = "日本語のテキスト。".repeat(20);
        let chunks = splitter(25, 5).split(&text);

        assert!(!chunks.is_empty());
        // Every chunk must itself be valid UTF-8 slicing, and re-splitting
        // never panics on the boundaries.
        for chunk in &chunks {
            assert!(chunk.chars().count() > 0);
        }
    }

    #[test]
    fn test_overlap_larger_than_chunk_still_terminates() {
        let text = "abcdefghijklmnopqrstuvwxyz";
        let chunks = splitter(5, 10).split(text);
        assert!(!chunks.is_empty());
    }

    #[test]
    fn test_default_config_values() {
        let s = SlidingWindowSplitter::default();
        assert_eq!(s.config().chunk_size, 100);
        assert_eq!(s.config().overlap, 10);
    }
}
