//! Splitting document text into bounded-length chunks for embedding.

mod sentences;

use std::mem::take;

pub use sentences::split_sentences;

/// Default maximum chunk length in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 512;

/// Splits plain text into ordered chunks.
pub trait Segmenter: Send + Sync {
    /// Split `text` into chunks, in document order.
    fn split(&self, text: &str) -> Vec<String>;
}

/// Packs whole sentences into chunks of at most `chunk_size` characters.
///
/// Sentences longer than a chunk are broken at whitespace; only a single word
/// longer than a chunk is ever cut mid-word. Whitespace inside a chunk is
/// collapsed to single spaces.
#[derive(Debug, Clone, Copy)]
pub struct SentenceSplitter {
    chunk_size: usize,
}

impl SentenceSplitter {
    /// Create a splitter producing chunks of at most `chunk_size` characters.
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
        }
    }

    /// Maximum chunk length in characters.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }
}

impl Default for SentenceSplitter {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE)
    }
}

impl Segmenter for SentenceSplitter {
    fn split(&self, text: &str) -> Vec<String> {
        let mut packer = ChunkPacker::new(self.chunk_size);
        for sentence in split_sentences(text) {
            packer.push_sentence(sentence);
        }
        packer.finish()
    }
}

/// Greedy accumulator behind [`SentenceSplitter`]
struct ChunkPacker {
    /// Maximum chunk length in characters
    limit: usize,
    /// Finished chunks
    chunks: Vec<String>,
    /// Chunk being filled
    current: String,
    /// Character count of `current`
    current_len: usize,
}

impl ChunkPacker {
    fn new(limit: usize) -> Self {
        Self {
            limit,
            chunks: Vec::default(),
            current: String::default(),
            current_len: 0,
        }
    }

    /// Add a sentence, keeping it whole when it fits in a chunk
    fn push_sentence(&mut self, sentence: &str) {
        let normalized = sentence.split_whitespace().collect::<Vec<_>>().join(" ");
        let length = normalized.chars().count();
        if length == 0 {
            return;
        }

        if length > self.limit {
            self.flush();
            for word in normalized.split(' ') {
                self.push_word(word);
            }
            self.flush();
        } else {
            self.append(&normalized, length);
        }
    }

    /// Add a single word, cutting it only when it cannot fit in any chunk
    fn push_word(&mut self, word: &str) {
        let length = word.chars().count();
        if length <= self.limit {
            self.append(word, length);
            return;
        }

        self.flush();
        let characters: Vec<char> = word.chars().collect();
        for piece in characters.chunks(self.limit) {
            self.append(&piece.iter().collect::<String>(), piece.len());
        }
    }

    /// Append `text` to the current chunk, starting a new one when it would overflow
    fn append(&mut self, text: &str, length: usize) {
        if self.current_len > 0 && self.current_len + 1 + length > self.limit {
            self.flush();
        }
        if self.current_len > 0 {
            self.current.push(' ');
            self.current_len += 1;
        }
        self.current.push_str(text);
        self.current_len += length;
    }

    fn flush(&mut self) {
        if self.current_len > 0 {
            self.chunks.push(take(&mut self.current));
            self.current_len = 0;
        }
    }

    fn finish(mut self) -> Vec<String> {
        self.flush();
        self.chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alternating_words(length: usize) -> String {
        let mut text = String::new();
        let mut toggle = false;
        while text.len() < length {
            if !text.is_empty() {
                text.push(' ');
            }
            text.push_str(if toggle { "beta" } else { "alpha" });
            toggle = !toggle;
        }
        text.truncate(length);
        text
    }

    #[test]
    fn test_chunks_respect_limit_without_splitting_words() {
        let text = alternating_words(1024);
        assert_eq!(text.chars().count(), 1024);

        let chunks = SentenceSplitter::new(512).split(&text);
        assert!(chunks.len() >= 2, "expected at least two chunks, got {chunks:?}");

        for chunk in &chunks {
            assert!(chunk.chars().count() <= 512, "chunk too long: {}", chunk.len());
        }
        // Every word except possibly the truncated last one is whole
        let words: Vec<&str> = chunks.iter().flat_map(|chunk| chunk.split(' ')).collect();
        let (last, rest) = words.split_last().expect("words");
        assert!(rest.iter().all(|word| *word == "alpha" || *word == "beta"));
        assert!("alpha".starts_with(last) || "beta".starts_with(last));

        // Nothing is lost
        assert_eq!(chunks.join(" "), text);
    }

    #[test]
    fn test_short_sentences_are_packed_together() {
        let chunks = SentenceSplitter::new(40).split("One fish. Two fish. Red fish. Blue fish.");
        assert_eq!(chunks, vec!["One fish. Two fish. Red fish. Blue fish."]);

        let narrow = SentenceSplitter::new(20).split("One fish. Two fish. Red fish. Blue fish.");
        assert_eq!(narrow, vec!["One fish. Two fish.", "Red fish. Blue fish."]);
    }

    #[test]
    fn test_sentence_is_not_split_when_it_fits_next_chunk() {
        let chunks = SentenceSplitter::new(16).split("Short one. A sentence here.");
        assert_eq!(chunks, vec!["Short one.", "A sentence here."]);
    }

    #[test]
    fn test_oversized_word_is_cut() {
        let word = "x".repeat(25);
        let chunks = SentenceSplitter::new(10).split(&format!("ab {word}"));
        assert_eq!(chunks, vec!["ab", "xxxxxxxxxx", "xxxxxxxxxx", "xxxxx"]);
    }

    #[test]
    fn test_multibyte_characters_are_counted_as_characters() {
        let text = "é".repeat(6);
        let chunks = SentenceSplitter::new(4).split(&text);
        assert_eq!(chunks, vec!["éééé", "éé"]);
    }

    #[test]
    fn test_whitespace_only_text_yields_nothing() {
        assert!(SentenceSplitter::default().split(" \n\t ").is_empty());
        assert!(SentenceSplitter::default().split("").is_empty());
    }

    #[test]
    fn test_zero_chunk_size_is_clamped() {
        assert_eq!(SentenceSplitter::new(0).chunk_size(), 1);
    }
}
