use anyhow::{Context, Result};
use arisyn::artists::ArtistDatabase;
use arisyn::pipeline::{self, Outcome, Pipeline};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

/// Vocal analysis, artist matching and FX chain suggestions
#[derive(Parser)]
#[command(name = "arisyn", version)]
struct Cli {
    /// Path to a config file (defaults to ~/.config/arisyn/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Yaml,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze vocal recordings and suggest an FX chain for each
    Analyze {
        /// Audio files or directories to analyze
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Number of parallel workers (0 = auto-detect from config)
        #[arg(short = 'j', long, default_value = "0")]
        jobs: usize,

        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,

        /// Output format
        #[arg(long, value_enum, default_value = "json")]
        format: Format,

        /// Single-line JSON instead of pretty-printed
        #[arg(long)]
        compact: bool,

        /// Write output to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the reference artists used for matching, or show one in detail
    Artists {
        /// Artist name (case-insensitive)
        name: Option<String>,
    },
}

fn render<T: Serialize>(value: &T, format: Format, compact: bool) -> Result<String> {
    let text = match format {
        Format::Json if compact => serde_json::to_string(value)?,
        Format::Json => serde_json::to_string_pretty(value)?,
        Format::Yaml => serde_yaml::to_string(value)?,
    };
    Ok(text)
}

fn emit(text: &str, output: Option<&PathBuf>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, text)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            log::info!("Wrote {}", path.display());
        }
        None => println!("{}", text.trim_end()),
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Load config file (optional, defaults if missing)
    let config = arisyn::config::AppConfig::load(cli.config.as_deref());

    let artists = Arc::new(ArtistDatabase::new(&config.custom_artists));
    log::info!("Artist database: {} entries", artists.len());
    let pipeline = Pipeline::new(artists);

    match cli.command {
        Commands::Analyze {
            paths,
            jobs,
            seed,
            format,
            compact,
            output,
        } => {
            let files = arisyn::intake::collect_audio_files(&paths);
            if files.is_empty() {
                anyhow::bail!("No supported audio files found in the given paths");
            }

            let max_bytes = config.max_upload_bytes();

            if let [file] = files.as_slice() {
                let mut rng = pipeline::file_rng(seed, 0);
                let entry = pipeline::analyze_file(&pipeline, file, max_bytes, &mut rng);
                match entry.outcome {
                    Outcome::Report(report) => {
                        emit(&render(&report, format, compact)?, output.as_ref())?;
                    }
                    Outcome::Failure(envelope) => {
                        eprintln!("{}", render(&envelope, format, compact)?.trim_end());
                        anyhow::bail!("Analysis of {} failed: {}", entry.file, envelope.message);
                    }
                }
            } else {
                let workers = if jobs > 0 {
                    jobs
                } else {
                    config.resolve_workers()
                };
                let entries = pipeline::analyze_batch(&pipeline, &files, workers, seed, max_bytes)
                    .context("Batch analysis failed")?;
                emit(&render(&entries, format, compact)?, output.as_ref())?;

                let failed = entries.iter().filter(|e| !e.is_ok()).count();
                eprintln!(
                    "Analysis complete: {} analyzed, {} failed",
                    entries.len() - failed,
                    failed
                );
            }
        }

        Commands::Artists { name: Some(name) } => {
            let artist = pipeline
                .artists()
                .get(&name)
                .with_context(|| format!("No artist named '{name}'"))?;
            let (low, high) = artist.typical_bpm;
            println!("{} ({})", artist.name, artist.genre);
            println!("  BPM:             {low}-{high}");
            let characteristics = artist.vocal_characteristics.join(", ");
            let effects = artist.vocal_effects.join(", ");
            let recommended = artist.recommended_effects().join(", ");
            println!("  Characteristics: {characteristics}");
            println!("  Effects:         {effects}");
            println!("  Recommended:     {recommended}");
        }

        Commands::Artists { name: None } => {
            println!(
                "{:<16} {:<22} {:>9}  Signature effects",
                "Artist", "Genre", "BPM"
            );
            println!("{}", "-".repeat(80));
            for artist in pipeline.artists().artists() {
                let (low, high) = artist.typical_bpm;
                println!(
                    "{:<16} {:<22} {:>4}-{:<4}  {}",
                    artist.name,
                    artist.genre,
                    low,
                    high,
                    artist.vocal_effects.join(", ")
                );
            }
        }
    }

    Ok(())
}
