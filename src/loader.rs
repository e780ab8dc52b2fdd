//! Input file loading.
//!
//! Reads the chat export, the stopword list and the font used by the
//! renderers. Every failure here is fatal for the run.

use crate::error::{ChatStatError, Result};
use crate::models::ChatExport;
use std::path::Path;
use tracing::{debug, info};

/// Read and decode a Telegram chat export.
pub fn read_chat_export(path: &Path) -> Result<ChatExport> {
    info!("Loading chat data from {}", path.display());

    let content = std::fs::read_to_string(path).map_err(|e| ChatStatError::io(path, e))?;
    let export: ChatExport =
        serde_json::from_str(&content).map_err(|source| ChatStatError::Json {
            path: path.to_path_buf(),
            source,
        })?;

    debug!("Loaded {} messages", export.messages.len());
    Ok(export)
}

/// Read a newline-delimited stopword file. Blank lines are skipped and
/// surrounding whitespace is trimmed.
pub fn read_stopwords(path: &Path) -> Result<Vec<String>> {
    info!("Loading stopwords from {}", path.display());

    let content = std::fs::read_to_string(path).map_err(|e| ChatStatError::io(path, e))?;
    let stopwords: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect();

    debug!("Loaded {} stopwords", stopwords.len());
    Ok(stopwords)
}

/// Load a TrueType/OpenType font.
pub fn load_font(path: &Path) -> Result<fontdue::Font> {
    info!("Loading font from {}", path.display());

    let bytes = std::fs::read(path).map_err(|e| ChatStatError::io(path, e))?;
    fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default()).map_err(|message| {
        ChatStatError::Font {
            path: path.to_path_buf(),
            message: message.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_chat_export() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("result.json");
        std::fs::write(
            &path,
            r#"{"name": "g", "messages": [{"id": 1, "from": "a", "text": "hi?"}]}"#,
        )
        .unwrap();

        let export = read_chat_export(&path).unwrap();
        assert_eq!(export.messages.len(), 1);
        assert_eq!(export.name.as_deref(), Some("g"));
    }

    #[test]
    fn test_missing_export_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let err = read_chat_export(&temp_dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, ChatStatError::Io { .. }));
    }

    #[test]
    fn test_invalid_json_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = read_chat_export(&path).unwrap_err();
        assert!(matches!(err, ChatStatError::Json { .. }));
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn test_read_stopwords() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("stopwords.txt");
        std::fs::write(&path, "the\n  a \n\nاز\r\n").unwrap();

        let stopwords = read_stopwords(&path).unwrap();
        assert_eq!(stopwords, vec!["the", "a", "از"]);
    }

    #[test]
    fn test_bundled_sample_export() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/sample.json");
        let export = read_chat_export(&path).unwrap();
        let stopwords =
            read_stopwords(&Path::new(env!("CARGO_MANIFEST_DIR")).join("data/stopwords.txt")).unwrap();

        let aggregator = crate::analysis::ChatAggregator::new(
            &export,
            &stopwords,
            crate::analysis::Normalizer::default(),
        );
        let top = aggregator.top_repliers(10);

        assert_eq!(top.entries[0].user, "Sara");
        assert_eq!(top.get("Sara"), Some(2));
        assert_eq!(top.get("Reza"), Some(1));
        assert_eq!(top.get("Ali"), None);
        assert!(!aggregator.word_text().split(' ').any(|w| w == "از"));
    }

    #[test]
    fn test_load_font() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/DejaVuSans.ttf");
        let font = load_font(&path).unwrap();
        assert!(font.lookup_glyph_index('س') != 0);
    }

    #[test]
    fn test_invalid_font_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("font.ttf");
        std::fs::write(&path, b"definitely not a font").unwrap();

        let err = load_font(&path).unwrap_err();
        assert!(matches!(err, ChatStatError::Font { .. }));
    }
}
