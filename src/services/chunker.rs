//! Word-count chunking of text for correction requests.

use std::borrow::Cow;
use std::num::NonZeroUsize;

/// How chunk text is rebuilt from the words it covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChunkMode {
    /// Words joined by single spaces. Line breaks and runs of whitespace
    /// collapse.
    #[default]
    Words,
    /// Original slices of the input. Concatenating every chunk gives back the
    /// input exactly, line breaks included.
    PreserveLayout,
}

/// Splits text into chunks of at most `chunk_size` words.
#[derive(Debug, Clone, Copy)]
pub struct TextChunker {
    chunk_size: NonZeroUsize,
    mode: ChunkMode,
}

impl TextChunker {
    pub fn new(chunk_size: NonZeroUsize) -> Self {
        Self {
            chunk_size,
            mode: ChunkMode::default(),
        }
    }

    pub fn with_mode(mut self, mode: ChunkMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn split<'a>(&self, text: &'a str) -> ChunkedText<'a> {
        ChunkedText {
            text,
            words: word_spans(text),
            chunk_size: self.chunk_size.get(),
            mode: self.mode,
        }
    }
}

/// One chunk of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk<'a> {
    /// 0-based position among all chunks
    pub index: usize,
    pub word_count: usize,
    pub text: Cow<'a, str>,
}

/// Result of [`TextChunker::split`].
#[derive(Debug)]
pub struct ChunkedText<'a> {
    text: &'a str,
    /// Byte span of each whitespace-separated word.
    words: Vec<(usize, usize)>,
    chunk_size: usize,
    mode: ChunkMode,
}

impl<'a> ChunkedText<'a> {
    /// Number of chunks: `ceil(words / chunk_size)`, zero for blank text.
    pub fn len(&self) -> usize {
        self.words.len().div_ceil(self.chunk_size)
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    pub fn get(&self, index: usize) -> Option<Chunk<'a>> {
        let first = index.checked_mul(self.chunk_size)?;
        if first >= self.words.len() {
            return None;
        }
        let next = (first + self.chunk_size).min(self.words.len());
        let words = &self.words[first..next];

        let text = match self.mode {
            ChunkMode::Words => Cow::Owned(
                words
                    .iter()
                    .map(|&(start, end)| &self.text[start..end])
                    .collect::<Vec<_>>()
                    .join(" "),
            ),
            ChunkMode::PreserveLayout => {
                let start = if index == 0 { 0 } else { words[0].0 };
                let end = self
                    .words
                    .get(next)
                    .map_or(self.text.len(), |&(start, _)| start);
                Cow::Borrowed(&self.text[start..end])
            }
        };

        Some(Chunk {
            index,
            word_count: words.len(),
            text,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = Chunk<'a>> + '_ {
        (0..self.len()).filter_map(move |index| self.get(index))
    }
}

fn word_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start = None;
    for (i, c) in text.char_indices() {
        if c.is_whitespace() {
            if let Some(s) = start.take() {
                spans.push((s, i));
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        spans.push((s, text.len()));
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunker(size: usize) -> TextChunker {
        TextChunker::new(NonZeroUsize::new(size).unwrap())
    }

    fn texts(chunked: &ChunkedText<'_>) -> Vec<String> {
        chunked.iter().map(|c| c.text.into_owned()).collect()
    }

    #[test]
    fn test_word_chunks() {
        let chunked = chunker(2).split("a b c d e");
        assert_eq!(chunked.len(), 3);
        assert_eq!(texts(&chunked), vec!["a b", "c d", "e"]);
        let counts: Vec<_> = chunked.iter().map(|c| c.word_count).collect();
        assert_eq!(counts, vec![2, 2, 1]);
    }

    #[test]
    fn test_word_mode_collapses_whitespace() {
        let chunked = chunker(10).split("  dòng một\n\n  dòng\thai  ");
        assert_eq!(texts(&chunked), vec!["dòng một dòng hai"]);
    }

    #[test]
    fn test_blank_text_has_no_chunks() {
        for text in ["", "   ", "\n\t\n"] {
            let chunked = chunker(3).split(text);
            assert_eq!(chunked.len(), 0);
            assert!(chunked.is_empty());
            assert_eq!(chunked.iter().count(), 0);
        }
    }

    #[test]
    fn test_chunk_count_is_ceiling() {
        let text = vec!["w"; 4001].join(" ");
        assert_eq!(chunker(4000).split(&text).len(), 2);
        let text = vec!["w"; 4000].join(" ");
        assert_eq!(chunker(4000).split(&text).len(), 1);
        assert_eq!(chunker(4000).split(&text).word_count(), 4000);
    }

    #[test]
    fn test_word_sequence_is_preserved() {
        let text = "một hai  ba\nbốn năm\n\nsáu bảy tám chín";
        let original: Vec<&str> = text.split_whitespace().collect();
        for size in 1..=10 {
            for mode in [ChunkMode::Words, ChunkMode::PreserveLayout] {
                let chunked = chunker(size).with_mode(mode).split(text);
                let rebuilt: Vec<String> = chunked
                    .iter()
                    .flat_map(|c| {
                        c.text
                            .split_whitespace()
                            .map(str::to_string)
                            .collect::<Vec<_>>()
                    })
                    .collect();
                assert_eq!(rebuilt, original, "size {} mode {:?}", size, mode);
                assert!(chunked.iter().all(|c| c.word_count <= size));
            }
        }
    }

    #[test]
    fn test_preserve_layout_round_trips() {
        let text = "\n==========\nTRANG 1\n==========\nxin  chao\n\nthe gioi\n";
        for size in 1..=6 {
            let chunked = chunker(size).with_mode(ChunkMode::PreserveLayout).split(text);
            assert_eq!(texts(&chunked).concat(), text);
        }
    }

    #[test]
    fn test_preserve_layout_borrows() {
        let chunked = chunker(2)
            .with_mode(ChunkMode::PreserveLayout)
            .split(" a b\nc d ");
        let chunks: Vec<_> = chunked.iter().collect();
        assert!(matches!(chunks[0].text, Cow::Borrowed(" a b\n")));
        assert!(matches!(chunks[1].text, Cow::Borrowed("c d ")));
    }

    #[test]
    fn test_get_out_of_range() {
        let chunked = chunker(2).split("a b c");
        assert!(chunked.get(1).is_some());
        assert!(chunked.get(2).is_none());
        assert!(chunked.get(usize::MAX).is_none());
    }
}
