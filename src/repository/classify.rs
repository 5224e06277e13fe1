//! Text/binary classification heuristic.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Serialize, Serializer};

use super::{DEFAULT_CLASSIFY_LIMIT, DEFAULT_TEXT_RATIO};

/// Content shorter than this (in decoded characters) is always text.
pub const MIN_CLASSIFY_CHARS: usize = 20;

/// Text hint attached to a listed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextHint {
    /// Content looks like text.
    Text,
    /// Content looks binary.
    Binary,
    /// Classification was skipped.
    Unknown,
}

impl TextHint {
    /// Whether the hint is [`TextHint::Text`].
    pub fn is_text(&self) -> bool {
        matches!(self, TextHint::Text)
    }
}

impl From<bool> for TextHint {
    fn from(is_text: bool) -> Self {
        if is_text {
            TextHint::Text
        } else {
            TextHint::Binary
        }
    }
}

/// Serialized as `true` / `false` / `null`.
impl Serialize for TextHint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TextHint::Text => serializer.serialize_bool(true),
            TextHint::Binary => serializer.serialize_bool(false),
            TextHint::Unknown => serializer.serialize_none(),
        }
    }
}

/// Classifies content as text or binary from its leading bytes.
///
/// Only the first `limit` bytes are examined. They are decoded as UTF-8
/// (invalid sequences become U+FFFD) and the share of printable ASCII plus
/// tab/newline/carriage return decides the outcome.
#[derive(Debug, Clone, Copy)]
pub struct TextClassifier {
    limit: usize,
    min_text_ratio: f64,
}

impl Default for TextClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_CLASSIFY_LIMIT, DEFAULT_TEXT_RATIO)
    }
}

impl TextClassifier {
    /// Create a classifier examining `limit` bytes with the given text ratio threshold.
    pub fn new(limit: usize, min_text_ratio: f64) -> Self {
        Self {
            limit,
            min_text_ratio,
        }
    }

    /// Number of leading bytes examined.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Classify in-memory content. Returns `true` for text.
    pub fn classify(&self, content: &[u8]) -> bool {
        let prefix = &content[..content.len().min(self.limit)];
        let decoded = String::from_utf8_lossy(prefix);

        let mut total = 0usize;
        let mut textual = 0usize;
        for c in decoded.chars() {
            total += 1;
            if is_textual(c) {
                textual += 1;
            }
        }

        if total < MIN_CLASSIFY_CHARS {
            return true;
        }

        textual as f64 / total as f64 >= self.min_text_ratio
    }

    /// Classify the leading bytes of a file on disk.
    ///
    /// Reads at most `limit` bytes; the buffer is dropped before returning.
    pub fn classify_file(&self, path: &Path) -> std::io::Result<bool> {
        let file = File::open(path)?;
        let mut buf = Vec::with_capacity(self.limit.min(64 * 1024));
        file.take(self.limit as u64).read_to_end(&mut buf)?;
        Ok(self.classify(&buf))
    }
}

fn is_textual(c: char) -> bool {
    matches!(c, ' '..='~' | '\t' | '\n' | '\r')
}
