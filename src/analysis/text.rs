//! Text utilities: flattening composite messages, question detection,
//! Persian orthographic normalization and word tokenization.

use crate::config::TextConfig;
use crate::models::{MessageText, TextSegment};
use once_cell::sync::Lazy;
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

/// ASCII and Arabic question marks.
const QUESTION_MARKS: &[char] = &['?', '؟'];

const TATWEEL: char = '\u{0640}';

/// Rebuild a message body as one string.
///
/// Segments are concatenated in order; segments that carry no text
/// (unknown records, non-string `text` fields) are skipped.
pub fn flatten_text(text: &MessageText) -> String {
    match text {
        MessageText::Plain(s) => s.clone(),
        MessageText::Segments(segments) => {
            let mut out = String::new();
            for segment in segments {
                match segment {
                    TextSegment::Plain(s) => out.push_str(s),
                    TextSegment::Entity { text, .. } => out.push_str(text),
                    TextSegment::Other(_) => {}
                }
            }
            out
        }
        MessageText::Other(_) => String::new(),
    }
}

/// Returns true if any sentence of `text` contains a question mark.
///
/// Segments without letters, such as a bare `؟`, count as sentences too.
pub fn has_question(text: &str) -> bool {
    text.split_sentence_bounds()
        .any(|sentence| sentence.contains(QUESTION_MARKS))
}

/// Canonicalizes Arabic-script text written with mixed Arabic/Persian
/// keyboards so that the same word always has the same spelling.
#[derive(Debug, Clone)]
pub struct Normalizer {
    remove_diacritics: bool,
    persian_digits: bool,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self {
            remove_diacritics: true,
            persian_digits: true,
        }
    }
}

impl From<&TextConfig> for Normalizer {
    fn from(config: &TextConfig) -> Self {
        Self {
            remove_diacritics: config.remove_diacritics,
            persian_digits: config.persian_digits,
        }
    }
}

impl Normalizer {
    /// Normalize `text`. Whitespace runs collapse to one space and the
    /// result is trimmed.
    pub fn normalize(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut pending_space = false;

        for c in text.chars() {
            if self.remove_diacritics && is_diacritic(c) {
                continue;
            }
            if c.is_whitespace() {
                pending_space = !out.is_empty();
                continue;
            }
            if pending_space {
                out.push(' ');
                pending_space = false;
            }
            out.push(self.translate(c));
        }

        out
    }

    fn translate(&self, c: char) -> char {
        match c {
            'ك' => 'ک',
            'ي' | 'ى' => 'ی',
            '“' | '”' => '"',
            '%' if self.persian_digits => '٪',
            '0'..='9' if self.persian_digits => shift_digit(c, '0'),
            '٠'..='٩' if self.persian_digits => shift_digit(c, '٠'),
            _ => c,
        }
    }
}

/// Harakat, superscript alef and tatweel.
fn is_diacritic(c: char) -> bool {
    matches!(c, '\u{064B}'..='\u{0652}' | '\u{0670}') || c == TATWEEL
}

fn shift_digit(c: char, zero: char) -> char {
    let offset = c as u32 - zero as u32;
    char::from_u32('۰' as u32 + offset).unwrap_or(c)
}

static TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w[\w']*").expect("token pattern is valid"));

/// Split text into word tokens, dropping a trailing possessive `'s`.
pub fn tokenize(text: &str) -> impl Iterator<Item = &str> {
    TOKEN.find_iter(text).map(|m| {
        let word = m.as_str();
        if word.len() > 2 && word.to_lowercase().ends_with("'s") {
            &word[..word.len() - 2]
        } else {
            word
        }
    })
}

/// True for tokens made only of digits (in any script).
pub fn is_numeric_token(token: &str) -> bool {
    !token.is_empty() && token.chars().all(char::is_numeric)
}
