use crate::analyzer::profile::VocalProfile;
use crate::analyzer::{AnalyzeError, SyntheticAnalyzer, VocalAnalyzer};
use crate::artists::ArtistDatabase;
use crate::fx::{self, FxChain, FxError};
use crate::intake::{self, ErrorEnvelope};
use crate::matcher::{self, DnaAnalysis, MatchError, MatchResult};
use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Analyze(#[from] AnalyzeError),
    #[error(transparent)]
    Match(#[from] MatchError),
    #[error(transparent)]
    Fx(#[from] FxError),
    #[error("Worker pool error: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

impl PipelineError {
    /// Stable machine-readable error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Analyze(AnalyzeError::Input { .. }) => "input_error",
            Self::Match(MatchError::EmptyDatabase) => "empty_database",
            Self::Fx(FxError::NoMatch) => "no_match",
            Self::Pool(_) => "internal_error",
        }
    }
}

/// The full result for one file, as handed to the transport layer.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub vocal_analysis: VocalProfile,
    pub artist_matches: Vec<MatchResult>,
    pub artist_dna: DnaAnalysis,
    pub total_artists_analyzed: usize,
    pub analysis_confidence: f64,
    pub fx_chain: FxChain,
}

/// Synthesizer → scorer → assembler. Holds only read-only state, so one
/// instance can serve any number of threads.
pub struct Pipeline {
    analyzer: Box<dyn VocalAnalyzer>,
    artists: Arc<ArtistDatabase>,
}

impl Pipeline {
    pub fn new(artists: Arc<ArtistDatabase>) -> Self {
        Self::with_analyzer(Box::new(SyntheticAnalyzer), artists)
    }

    /// Use a different stage 1 backend.
    pub fn with_analyzer(
        analyzer: Box<dyn VocalAnalyzer>,
        artists: Arc<ArtistDatabase>,
    ) -> Self {
        Self { analyzer, artists }
    }

    pub fn artists(&self) -> &ArtistDatabase {
        &self.artists
    }

    /// Run all three stages for one file. Either every stage succeeds or
    /// nothing is returned.
    pub fn run(&self, path: &Path, rng: &mut dyn RngCore) -> Result<AnalysisReport, PipelineError> {
        let profile = self.analyzer.analyze(path, rng)?;
        let matched = matcher::score(&profile, &self.artists, rng)?;
        let fx_chain = fx::assemble(&profile, &matched.matches, rng)?;

        Ok(AnalysisReport {
            vocal_analysis: profile,
            artist_matches: matched.matches,
            artist_dna: matched.dna_analysis,
            total_artists_analyzed: matched.total_artists_analyzed,
            analysis_confidence: matched.analysis_confidence,
            fx_chain,
        })
    }
}

/// Generator for the `index`-th file of a run. With a seed every file gets
/// its own reproducible stream; without one it is seeded from the OS.
pub fn file_rng(seed: Option<u64>, index: usize) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s.wrapping_add(index as u64)),
        None => StdRng::from_os_rng(),
    }
}

#[derive(Debug, Serialize)]
pub enum Outcome {
    #[serde(rename = "report")]
    Report(Box<AnalysisReport>),
    #[serde(rename = "failure")]
    Failure(ErrorEnvelope),
}

#[derive(Debug, Serialize)]
pub struct BatchEntry {
    pub file: String,
    pub analyzed_at: DateTime<Utc>,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl BatchEntry {
    pub fn is_ok(&self) -> bool {
        matches!(self.outcome, Outcome::Report(_))
    }
}

/// Validate and analyze one file, folding any failure into an envelope.
pub fn analyze_file(
    pipeline: &Pipeline,
    path: &Path,
    max_bytes: u64,
    rng: &mut dyn RngCore,
) -> BatchEntry {
    let outcome = match intake::validate_upload(path, max_bytes) {
        Err(e) => {
            log::warn!("Rejected {}: {}", path.display(), e);
            Outcome::Failure(ErrorEnvelope::from(&e))
        }
        Ok(_) => match pipeline.run(path, rng) {
            Ok(report) => Outcome::Report(Box::new(report)),
            Err(e) => {
                log::warn!("Analysis failed for {}: {}", path.display(), e);
                Outcome::Failure(ErrorEnvelope::from(&e))
            }
        },
    };

    BatchEntry {
        file: path.display().to_string(),
        analyzed_at: Utc::now(),
        outcome,
    }
}

const PROGRESS_TEMPLATE: &str = "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}";

/// Analyze many files in parallel. Each file is independent: its own
/// generator, its own output record. Results keep the input order.
pub fn analyze_batch(
    pipeline: &Pipeline,
    files: &[PathBuf],
    jobs: usize,
    seed: Option<u64>,
    max_bytes: u64,
) -> Result<Vec<BatchEntry>, PipelineError> {
    if files.is_empty() {
        log::info!("No files to analyze");
        return Ok(Vec::new());
    }

    log::info!("Analyzing {} files with {} workers", files.len(), jobs);

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::with_template(PROGRESS_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    let pool = rayon::ThreadPoolBuilder::new().num_threads(jobs).build()?;

    let entries: Vec<BatchEntry> = pool.install(|| {
        use rayon::prelude::*;
        files
            .par_iter()
            .enumerate()
            .map(|(i, path)| {
                let mut rng = file_rng(seed, i);
                let entry = analyze_file(pipeline, path, max_bytes, &mut rng);
                pb.inc(1);
                entry
            })
            .collect()
    });

    let failed = entries.iter().filter(|e| !e.is_ok()).count();
    let analyzed = entries.len() - failed;
    pb.finish_with_message(format!("Done: {analyzed} analyzed, {failed} failed"));

    Ok(entries)
}
