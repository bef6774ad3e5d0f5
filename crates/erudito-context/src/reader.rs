//! Plain-text extraction from documentation files.

use erudito_core::{Error, Result};
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

/// Images `![alt](url)` keep their alt text
static IMAGE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| match Regex::new(r"!\[([^\]]*)\]\([^)]*\)") {
        Ok(regex) => regex,
        Err(err) => panic!("Image regex is invalid: {err}"),
    });

/// Links `[text](url)` keep their text
static LINK_REGEX: LazyLock<Regex> =
    LazyLock::new(|| match Regex::new(r"\[([^\]]*)\]\([^)]*\)") {
        Ok(regex) => regex,
        Err(err) => panic!("Link regex is invalid: {err}"),
    });

/// Inline HTML tags
static HTML_TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| match Regex::new(r"</?[A-Za-z][^>]*>") {
        Ok(regex) => regex,
        Err(err) => panic!("HTML tag regex is invalid: {err}"),
    });

/// Star emphasis, only when the delimiters hug the emphasized text
static EMPHASIS_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    match Regex::new(r"\*{1,3}([^\s*](?:[^*]*[^\s*])?)\*{1,3}") {
        Ok(regex) => regex,
        Err(err) => panic!("Emphasis regex is invalid: {err}"),
    }
});

/// Paired `~~` strikethrough
static STRIKETHROUGH_REGEX: LazyLock<Regex> =
    LazyLock::new(|| match Regex::new(r"~~(.+?)~~") {
        Ok(regex) => regex,
        Err(err) => panic!("Strikethrough regex is invalid: {err}"),
    });

/// Inline code spans delimited by one or two backticks
static CODE_SPAN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| match Regex::new(r"``\s?(.+?)\s?``|`([^`]+)`") {
        Ok(regex) => regex,
        Err(err) => panic!("Code span regex is invalid: {err}"),
    });

/// Heading, blockquote and list markers at the start of a line
static LINE_PREFIX_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    match Regex::new(r"^\s{0,3}(?:#{1,6}\s+|>\s?|[-*+]\s+|\d+[.)]\s+)+") {
        Ok(regex) => regex,
        Err(err) => panic!("Line prefix regex is invalid: {err}"),
    }
});

/// Thematic breaks and fence lines
static RULE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| match Regex::new(r"^\s*(?:[-*_]\s*){3,}$|^\s*(?:```|~~~)") {
        Ok(regex) => regex,
        Err(err) => panic!("Rule regex is invalid: {err}"),
    });

/// Converts a document on disk into plain text.
pub trait TextExtractor: Send + Sync {
    /// Extract the text of `path`.
    ///
    /// Returns `Ok(None)` for documents without any text.
    ///
    /// # Errors
    /// Returns [`Error::UnsupportedFormat`] for documents that cannot be read as
    /// text, or an I/O error if the file cannot be read at all
    fn extract(&self, path: &Path) -> Result<Option<String>>;
}

/// Reads UTF-8 text files, stripping markup from Markdown.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, path: &Path) -> Result<Option<String>> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        if extension == "pdf" {
            return Err(Error::UnsupportedFormat(format!(
                "{} is a PDF document",
                path.display()
            )));
        }

        let bytes = fs::read(path)?;
        let Ok(text) = String::from_utf8(bytes) else {
            return Err(Error::UnsupportedFormat(format!(
                "{} is not a text file",
                path.display()
            )));
        };

        let text = if matches!(extension.as_str(), "md" | "markdown") {
            markdown_to_text(&text)
        } else {
            text
        };

        Ok((!text.trim().is_empty()).then_some(text))
    }
}

/// Strip Markdown markup, keeping the readable text.
pub fn markdown_to_text(markdown: &str) -> String {
    let mut lines = Vec::new();
    for line in markdown.lines() {
        if RULE_REGEX.is_match(line) {
            continue;
        }
        let line = LINE_PREFIX_REGEX.replace(line, "");
        let line = IMAGE_REGEX.replace_all(&line, "$1");
        let line = LINK_REGEX.replace_all(&line, "$1");
        let line = HTML_TAG_REGEX.replace_all(&line, "");
        let line = CODE_SPAN_REGEX.replace_all(&line, "$1$2");
        let line = STRIKETHROUGH_REGEX.replace_all(&line, "$1");
        let line = EMPHASIS_REGEX.replace_all(&line, "$1");
        lines.push(line.trim_end().to_owned());
    }
    lines.join("\n")
}
