//! ChatStat - statistics from Telegram chat exports
//!
//! A CLI tool that reads a Telegram Desktop JSON export and produces:
//! a ranking of the users who reply to questions most often (Markdown or
//! JSON report plus a bar chart), and a word cloud of the conversation.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Any error (bad arguments, unreadable input, rendering failure)

mod analysis;
mod cli;
mod config;
mod error;
mod loader;
mod models;
mod render;
mod report;

use analysis::{ChatAggregator, Normalizer, WordOptions};
use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::{Config, DEFAULT_CONFIG_FILE};
use indicatif::{ProgressBar, ProgressStyle};
use models::{RankingReport, ReportMetadata, TopRepliers};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("ChatStat v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(args) {
        error!("Run failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .chatstat.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", DEFAULT_CONFIG_FILE);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", DEFAULT_CONFIG_FILE);
    println!("   Edit it to customize paths, ranking size and image settings.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the complete pipeline.
fn run(args: Args) -> Result<()> {
    let start_time = Instant::now();

    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    config.validate().map_err(|e| anyhow!("Invalid configuration: {}", e))?;

    // Step 1: Load inputs
    println!("📥 Loading chat export: {}", args.input.display());
    let export = loader::read_chat_export(&args.input)?;
    let stopwords = loader::read_stopwords(&config.data.stopwords)?;
    let font = loader::load_font(&config.data.font)?;

    let output_dir = &config.general.output_dir;
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory {}", output_dir.display()))?;

    let aggregator = ChatAggregator::new(&export, &stopwords, Normalizer::from(&config.text));

    // Step 2: Word cloud
    let wordcloud_path = if args.skip_wordcloud {
        None
    } else {
        println!("☁️  Generating word cloud...");
        generate_word_cloud(&aggregator, &font, &config, args.quiet)?
    };

    // Step 3: Top repliers
    println!("🏆 Ranking users replying to questions...");
    let index = aggregator.question_index();
    let top = aggregator.top_repliers_with_index(&index, config.ranking.top_n);
    let summary = aggregator.summary(&index);

    let report = RankingReport {
        metadata: ReportMetadata {
            chat_name: export.name.clone(),
            source: args.input.display().to_string(),
            generated_at: Utc::now(),
            top_n: config.ranking.top_n,
            duration_seconds: start_time.elapsed().as_secs_f64(),
        },
        summary: summary.clone(),
        top_users: top.entries.clone(),
    };

    let format = config.ranking.format;
    let output = match format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&report),
    };
    let report_path = output_dir.join(format!("top_users.{}", format.extension()));
    std::fs::write(&report_path, &output)
        .with_context(|| format!("Failed to write report to {}", report_path.display()))?;
    info!("Saved ranking report to {}", report_path.display());

    let chart_path = if args.skip_chart {
        None
    } else {
        Some(generate_chart(&top, &font, &config)?)
    };

    // Print summary
    println!("\n📊 Chat Summary:");
    println!("   Messages: {} ({} with text)", summary.messages, summary.text_messages);
    println!("   Questions: {}", summary.questions);
    println!("   Replies to questions: {}", summary.replies_to_questions);
    for (i, tally) in top.entries.iter().enumerate() {
        println!("   {:>2}. {} ({})", i + 1, tally.user, tally.replies);
    }
    println!("   Duration: {:.1}s", start_time.elapsed().as_secs_f64());

    println!("\n✅ Done! Report saved to: {}", report_path.display());
    if let Some(path) = chart_path {
        println!("   Bar chart: {}", path.display());
    }
    if let Some(path) = wordcloud_path {
        println!("   Word cloud: {}", path.display());
    }

    Ok(())
}

/// Lay out and draw the word cloud. Returns `None` when no words survive
/// filtering.
fn generate_word_cloud(
    aggregator: &ChatAggregator,
    font: &fontdue::Font,
    config: &Config,
    quiet: bool,
) -> Result<Option<PathBuf>> {
    let frequencies = aggregator.word_frequencies(&WordOptions::from(&config.wordcloud));
    if frequencies.is_empty() {
        warn!("No words left after stopword filtering; skipping word cloud");
        return Ok(None);
    }

    let options = render::wordcloud::WordCloudOptions::from_config(&config.wordcloud)?;

    let progress = if quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(frequencies.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} words")
                .context("Invalid progress template")?
                .progress_chars("#>-"),
        );
        pb
    };

    let layout = render::wordcloud::layout(font, &frequencies, &options, &progress);
    progress.finish_and_clear();
    info!("Placed {} of {} words", layout.words.len(), frequencies.len());

    let img = render::wordcloud::render(font, &layout, options.background);
    let path = config.general.output_dir.join("wordcloud.png");
    render::canvas::save_png(&img, &path)?;
    info!("Saved word cloud to {}", path.display());

    Ok(Some(path))
}

/// Draw the top repliers bar chart.
fn generate_chart(top: &TopRepliers, font: &fontdue::Font, config: &Config) -> Result<PathBuf> {
    let options = render::chart::ChartOptions::new(&config.chart, config.ranking.top_n);
    let img = render::chart::render_chart(font, top, &options);

    let path = config.general.output_dir.join("top_users.png");
    render::canvas::save_png(&img, &path)?;
    info!("Saved bar chart to {}", path.display());

    Ok(path)
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", DEFAULT_CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
