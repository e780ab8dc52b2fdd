//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// ChatStat - statistics from Telegram chat exports
///
/// Ranks the users who answer questions most often and draws a word
/// cloud of the conversation. Outputs PNG images plus a Markdown or
/// JSON ranking report.
///
/// Examples:
///   chatstat
///   chatstat --input data/result.json --top-n 5
///   chatstat --input export.json --format json --skip-wordcloud
///   chatstat --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Telegram export (result.json) to analyze
    #[arg(
        short,
        long,
        default_value = "data/online.json",
        value_name = "FILE",
        env = "CHATSTAT_INPUT"
    )]
    pub input: PathBuf,

    /// Newline-delimited stopword list
    ///
    /// Default: from config or data/stopwords.txt
    #[arg(short, long, value_name = "FILE")]
    pub stopwords: Option<PathBuf>,

    /// Font used to draw the images
    ///
    /// Default: from config or data/Vazir-Code.ttf
    #[arg(long, value_name = "FILE")]
    pub font: Option<PathBuf>,

    /// Directory for images and reports
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Number of users in the ranking
    #[arg(short = 'n', long, value_name = "COUNT")]
    pub top_n: Option<usize>,

    /// Word cloud width in pixels
    #[arg(long, value_name = "PX")]
    pub width: Option<u32>,

    /// Word cloud height in pixels
    #[arg(long, value_name = "PX")]
    pub height: Option<u32>,

    /// Font size of the most frequent word
    #[arg(long, value_name = "PX")]
    pub max_font_size: Option<u32>,

    /// Word cloud background (named color or #rrggbb)
    #[arg(long, value_name = "COLOR")]
    pub background: Option<String>,

    /// Ranking report format (markdown, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Do not render the word cloud
    #[arg(long)]
    pub skip_wordcloud: bool,

    /// Do not render the top users bar chart
    #[arg(long)]
    pub skip_chart: bool,

    /// Path to configuration file
    ///
    /// If not specified, looks for .chatstat.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .chatstat.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the ranking report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl OutputFormat {
    /// File extension for reports in this format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "md",
            OutputFormat::Json => "json",
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.skip_wordcloud && self.skip_chart {
            return Err("Nothing to do: both --skip-wordcloud and --skip-chart given".to_string());
        }

        if self.top_n == Some(0) {
            return Err("Top N must be at least 1".to_string());
        }

        if self.width.is_some_and(|w| w < 16) || self.height.is_some_and(|h| h < 16) {
            return Err("Word cloud must be at least 16x16 pixels".to_string());
        }

        if self.max_font_size.is_some_and(|size| size < 4) {
            return Err("Max font size must be at least 4".to_string());
        }

        if let Some(ref background) = self.background {
            if crate::render::parse_color(background).is_err() {
                return Err(format!("Unknown background color: {}", background));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
