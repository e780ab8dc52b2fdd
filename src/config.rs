//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.chatstat.toml` files.

use crate::cli::OutputFormat;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".chatstat.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Input data locations.
    #[serde(default)]
    pub data: DataConfig,

    /// Text normalization settings.
    #[serde(default)]
    pub text: TextConfig,

    /// Top-repliers ranking settings.
    #[serde(default)]
    pub ranking: RankingConfig,

    /// Word cloud settings.
    #[serde(default)]
    pub wordcloud: WordCloudConfig,

    /// Bar chart settings.
    #[serde(default)]
    pub chart: ChartConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Directory receiving images and reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("data")
}

/// Paths of the supporting data files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Newline-delimited stopword list.
    #[serde(default = "default_stopwords")]
    pub stopwords: PathBuf,

    /// TrueType/OpenType font used by both renderers.
    #[serde(default = "default_font")]
    pub font: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            stopwords: default_stopwords(),
            font: default_font(),
        }
    }
}

fn default_stopwords() -> PathBuf {
    PathBuf::from("data/stopwords.txt")
}

fn default_font() -> PathBuf {
    PathBuf::from("data/Vazir-Code.ttf")
}

/// Normalization options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextConfig {
    /// Strip harakat and tatweel.
    #[serde(default = "default_true")]
    pub remove_diacritics: bool,

    /// Rewrite ASCII and Arabic-Indic digits as Persian digits.
    #[serde(default = "default_true")]
    pub persian_digits: bool,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            remove_diacritics: true,
            persian_digits: true,
        }
    }
}

/// Ranking settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingConfig {
    /// Number of users to keep.
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Report format.
    #[serde(default)]
    pub format: OutputFormat,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            format: OutputFormat::default(),
        }
    }
}

fn default_top_n() -> usize {
    crate::analysis::DEFAULT_TOP_N
}

/// Word cloud settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordCloudConfig {
    #[serde(default = "default_cloud_width")]
    pub width: u32,

    #[serde(default = "default_cloud_height")]
    pub height: u32,

    /// Font size of the most frequent word.
    #[serde(default = "default_max_font_size")]
    pub max_font_size: u32,

    /// Words that would need a smaller font are dropped.
    #[serde(default = "default_min_font_size")]
    pub min_font_size: u32,

    /// Named color or `#rrggbb`.
    #[serde(default = "default_background")]
    pub background_color: String,

    /// Maximum number of words drawn.
    #[serde(default = "default_max_words")]
    pub max_words: usize,

    /// Shorter tokens are ignored.
    #[serde(default = "default_min_word_length")]
    pub min_word_length: usize,

    /// Count "cats" as "cat" when both occur.
    #[serde(default = "default_true")]
    pub normalize_plurals: bool,

    /// How much font size follows frequency (0.0 - 1.0).
    #[serde(default = "default_relative_scaling")]
    pub relative_scaling: f32,

    /// Free space around each word, in pixels.
    #[serde(default = "default_margin")]
    pub margin: u32,
}

impl Default for WordCloudConfig {
    fn default() -> Self {
        Self {
            width: default_cloud_width(),
            height: default_cloud_height(),
            max_font_size: default_max_font_size(),
            min_font_size: default_min_font_size(),
            background_color: default_background(),
            max_words: default_max_words(),
            min_word_length: default_min_word_length(),
            normalize_plurals: true,
            relative_scaling: default_relative_scaling(),
            margin: default_margin(),
        }
    }
}

fn default_cloud_width() -> u32 {
    800
}

fn default_cloud_height() -> u32 {
    600
}

fn default_max_font_size() -> u32 {
    250
}

fn default_min_font_size() -> u32 {
    4
}

fn default_background() -> String {
    "white".to_string()
}

fn default_max_words() -> usize {
    200
}

fn default_min_word_length() -> usize {
    2
}

fn default_relative_scaling() -> f32 {
    0.5
}

fn default_margin() -> u32 {
    2
}

/// Bar chart settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Image width in pixels.
    #[serde(default = "default_chart_width")]
    pub width: u32,

    /// Height of one bar row in pixels.
    #[serde(default = "default_bar_height")]
    pub bar_height: u32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: default_chart_width(),
            bar_height: default_bar_height(),
        }
    }
}

fn default_chart_width() -> u32 {
    1200
}

fn default_bar_height() -> u32 {
    48
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were given explicitly.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref dir) = args.output_dir {
            self.general.output_dir = dir.clone();
        }
        if let Some(ref stopwords) = args.stopwords {
            self.data.stopwords = stopwords.clone();
        }
        if let Some(ref font) = args.font {
            self.data.font = font.clone();
        }

        if let Some(top_n) = args.top_n {
            self.ranking.top_n = top_n;
        }
        if let Some(format) = args.format {
            self.ranking.format = format;
        }

        if let Some(width) = args.width {
            self.wordcloud.width = width;
        }
        if let Some(height) = args.height {
            self.wordcloud.height = height;
        }
        if let Some(size) = args.max_font_size {
            self.wordcloud.max_font_size = size;
        }
        if let Some(ref background) = args.background {
            self.wordcloud.background_color = background.clone();
        }
    }

    /// Check values that serde cannot constrain.
    pub fn validate(&self) -> Result<(), String> {
        if self.ranking.top_n == 0 {
            return Err("top_n must be at least 1".to_string());
        }

        let cloud = &self.wordcloud;
        if cloud.width < 16 || cloud.height < 16 {
            return Err("Word cloud must be at least 16x16 pixels".to_string());
        }
        if cloud.max_font_size < 4 {
            return Err("max_font_size must be at least 4".to_string());
        }
        if cloud.min_font_size == 0 || cloud.min_font_size > cloud.max_font_size {
            return Err("min_font_size must be between 1 and max_font_size".to_string());
        }
        if !(0.0..=1.0).contains(&cloud.relative_scaling) {
            return Err("relative_scaling must be between 0.0 and 1.0".to_string());
        }
        if cloud.margin >= cloud.width.min(cloud.height) / 2 {
            return Err("margin must be less than half the word cloud's smaller side".to_string());
        }
        if cloud.max_words == 0 {
            return Err("max_words must be at least 1".to_string());
        }

        if self.chart.width < 200 || self.chart.bar_height < 8 {
            return Err("Chart must be at least 200px wide with 8px bars".to_string());
        }

        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.ranking.top_n, 10);
        assert_eq!(config.wordcloud.width, 800);
        assert_eq!(config.wordcloud.height, 600);
        assert_eq!(config.wordcloud.max_font_size, 250);
        assert_eq!(config.wordcloud.background_color, "white");
        assert_eq!(config.data.font, PathBuf::from("data/Vazir-Code.ttf"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r##"
[general]
output_dir = "out"

[ranking]
top_n = 5
format = "json"

[wordcloud]
width = 1024
background_color = "#000000"
"##;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.output_dir, PathBuf::from("out"));
        assert_eq!(config.ranking.top_n, 5);
        assert_eq!(config.ranking.format, OutputFormat::Json);
        assert_eq!(config.wordcloud.width, 1024);
        assert_eq!(config.wordcloud.height, 600);
        assert_eq!(config.wordcloud.background_color, "#000000");
        assert!(config.text.remove_diacritics);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.ranking.top_n = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.wordcloud.min_font_size = 300;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.wordcloud.relative_scaling = 1.5;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.wordcloud.margin = u32::MAX;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.wordcloud.height = 100;
        config.wordcloud.margin = 50;
        assert!(config.validate().is_err());
        config.wordcloud.margin = 49;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        std::fs::write(&path, "[chart]\nbar_height = 30\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.chart.bar_height, 30);
        assert_eq!(config.chart.width, 1200);
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[ranking]"));
        assert!(toml_str.contains("[wordcloud]"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.ranking.top_n, 10);
    }
}
