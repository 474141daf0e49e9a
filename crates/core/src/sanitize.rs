//! Text cleanup for generated slide content.
//!
//! The generator is asked for plain text but still emits markdown emphasis
//! now and then. Every string that enters a [`crate::Deck`] passes through
//! [`TextSanitizer::clean`], which strips those markers and control
//! characters, applies NFC and collapses whitespace runs. Cleaning is
//! idempotent, so a deck survives any number of JSON round trips unchanged.

use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

/// Regex to collapse runs of spaces and tabs into one.
static WHITESPACE_COLLAPSE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]+").unwrap());

/// C0 control characters other than tab and line breaks.
static CONTROL_CHAR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\x00-\x08\x0B\x0C\x0E-\x1F]").unwrap());

/// `***both***`, `**bold**`, `*em*`, their underscore forms and `` `code` ``
/// spans. Star delimiters must not touch a word character on the outside, so
/// `5*3*2` is left alone.
static EMPHASIS_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"\B\*\*\*(\S(?:.*?\S)?)\*\*\*\B",
        r"|\B\*\*(\S(?:.*?\S)?)\*\*\B",
        r"|\B\*([^*\s](?:[^*]*?[^*\s])?)\*\B",
        r"|___(.+?)___",
        r"|__(.+?)__",
        r"|\b_([^_\s][^_]*?)_\b",
        r"|`([^`]+)`",
    ))
    .unwrap()
});

/// Leading heading hashes or list bullets, however many are stacked.
static LINE_MARKER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*(?:(?:#{1,6}|[-*+])\s+)+").unwrap());

/// Cleans generated text so it can be drawn as-is.
#[derive(Debug, Clone)]
pub struct TextSanitizer {
    /// Whether to keep line breaks inside a string.
    preserve_line_breaks: bool,
}

impl Default for TextSanitizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextSanitizer {
    /// Create a sanitizer that keeps line breaks.
    pub fn new() -> Self {
        Self {
            preserve_line_breaks: true,
        }
    }

    /// Set whether to keep line breaks.
    pub fn with_preserve_line_breaks(mut self, preserve: bool) -> Self {
        self.preserve_line_breaks = preserve;
        self
    }

    /// Strip markdown markers, normalize to NFC and collapse whitespace.
    pub fn clean(&self, text: &str) -> String {
        let text = text.replace("\r\n", "\n").replace('\r', "\n");
        let mut text = CONTROL_CHAR_REGEX.replace_all(&text, "").into_owned();

        // Nested spans unwrap one layer per pass.
        loop {
            let stripped = EMPHASIS_REGEX
                .replace_all(&text, |caps: &regex::Captures<'_>| {
                    (1..=7)
                        .find_map(|i| caps.get(i))
                        .map(|m| m.as_str().to_string())
                        .unwrap_or_default()
                })
                .into_owned();
            if stripped == text {
                break;
            }
            text = stripped;
        }
        let text = LINE_MARKER_REGEX.replace_all(&text, "");
        let text: String = text.nfc().collect();

        if self.preserve_line_breaks {
            text.lines()
                .map(|line| WHITESPACE_COLLAPSE_REGEX.replace_all(line, " ").trim().to_string())
                .filter(|line| !line.is_empty())
                .collect::<Vec<_>>()
                .join("\n")
        } else {
            text.split_whitespace().collect::<Vec<_>>().join(" ")
        }
    }
}
