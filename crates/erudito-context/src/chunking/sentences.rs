//! Lightweight sentence segmentation.

/// Characters that may trail a sentence terminator and still belong to the sentence
const CLOSERS: &[char] = &['"', '\'', ')', ']', '”', '’', '.', '!', '?'];

/// Split `text` into trimmed sentences.
///
/// A sentence ends at `.`, `!` or `?` (plus any closing quotes or brackets)
/// followed by whitespace or the end of the text, or at a blank line.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((position, character)) = chars.next() {
        let boundary = match character {
            '.' | '!' | '?' => {
                let mut end = position + character.len_utf8();
                while let Some(&(next_position, next)) = chars.peek() {
                    if !CLOSERS.contains(&next) {
                        break;
                    }
                    end = next_position + next.len_utf8();
                    chars.next();
                }
                match chars.peek() {
                    None => Some(end),
                    Some(&(_, next)) if next.is_whitespace() => Some(end),
                    Some(_) => None,
                }
            }
            '\n' => {
                let rest = text[position + 1..].trim_start_matches([' ', '\t', '\r']);
                rest.starts_with('\n').then_some(position)
            }
            _ => None,
        };

        if let Some(end) = boundary {
            let sentence = text[start..end].trim();
            if !sentence.is_empty() {
                sentences.push(sentence);
            }
            start = end;
        }
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail);
    }
    sentences
}
