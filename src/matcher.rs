use crate::analyzer::profile::VocalProfile;
use crate::artists::{ArtistDatabase, ArtistProfile, StyleTraits};
use crate::sampling::{round_to, uniform1, uniform2};
use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MatchError {
    #[error("Artist database is empty")]
    EmptyDatabase,
}

const MIN_CANDIDATES: usize = 3;
const MAX_CANDIDATES: usize = 5;
const MIN_CONFIDENCE: f64 = 45.0;
const MAX_CONFIDENCE: f64 = 97.0;
/// Foundation score above which every candidate gets a technique bonus.
const STRONG_FOUNDATION: f64 = 85.0;

const MATCHING_ATTRIBUTES: [&str; 12] = [
    "melodic phrasing",
    "vocal rhythm",
    "tonal quality",
    "breath control",
    "pitch variation",
    "emotional delivery",
    "vocal texture",
    "dynamic range",
    "harmonic choices",
    "vocal timing",
    "articulation style",
    "vocal runs",
];

const GENERIC_TRAITS: [&str; 6] = [
    "natural pitch accuracy",
    "distinctive vocal timbre",
    "unique vocal placement",
    "exceptional breath support",
    "natural melodic instinct",
    "distinctive vocal character",
];

const MIN_TRAITS: usize = 3;
const MAX_TRAITS: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarityFactors {
    pub vocal_style: f64,
    pub bpm_compatibility: f64,
    pub tonal_characteristics: f64,
    pub production_style: f64,
}

/// One candidate artist and how closely the voice resembles them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub artist: String,
    pub confidence: f64,
    pub genre: String,
    pub matching_attributes: Vec<String>,
    pub recommended_effects: Vec<String>,
    /// Descriptive only; `confidence` is computed independently.
    pub similarity_factors: SimilarityFactors,
    /// Production traits of the artist, read by the FX assembler.
    #[serde(skip)]
    pub style: StyleTraits,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence > 80.0 {
            Self::High
        } else if confidence > 65.0 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DnaAnalysis {
    pub dominant_influence: String,
    pub confidence_level: ConfidenceLevel,
    pub genre_classification: String,
    pub style_evolution_potential: f64,
    pub unique_characteristics: Vec<String>,
}

/// Stage 2 output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtistMatchReport {
    /// Sorted by descending confidence.
    pub matches: Vec<MatchResult>,
    pub dna_analysis: DnaAnalysis,
    pub total_artists_analyzed: usize,
    /// Mean confidence across `matches`.
    pub analysis_confidence: f64,
}

/// Score a random subset of the artist database against the profile.
///
/// The candidate set itself is random: the database is shuffled and the
/// first 3-5 entries are scored, so repeated calls on the same profile can
/// compare against different artists.
pub fn score<R: Rng + ?Sized>(
    profile: &VocalProfile,
    db: &ArtistDatabase,
    rng: &mut R,
) -> Result<ArtistMatchReport, MatchError> {
    if db.is_empty() {
        return Err(MatchError::EmptyDatabase);
    }

    let mut candidates: Vec<&ArtistProfile> = db.artists().iter().collect();
    candidates.shuffle(rng);
    let k = rng
        .random_range(MIN_CANDIDATES..=MAX_CANDIDATES)
        .min(candidates.len());
    candidates.truncate(k);

    let mut matches: Vec<MatchResult> = candidates
        .into_iter()
        .map(|artist| build_match(artist, profile, rng))
        .collect();

    // Stable: equal confidences keep their selection order.
    matches.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let analysis_confidence = round_to(
        matches.iter().map(|m| m.confidence).sum::<f64>() / matches.len() as f64,
        1,
    );

    let primary = &matches[0];
    let dna_analysis = DnaAnalysis {
        dominant_influence: primary.artist.clone(),
        confidence_level: ConfidenceLevel::from_confidence(primary.confidence),
        genre_classification: primary.genre.clone(),
        style_evolution_potential: uniform1(rng, 70.0, 95.0),
        unique_characteristics: unique_traits(profile, rng),
    };

    log::debug!(
        "Matched {} of {} artists, dominant influence {} ({:.1})",
        matches.len(),
        db.len(),
        primary.artist,
        primary.confidence
    );

    Ok(ArtistMatchReport {
        matches,
        dna_analysis,
        total_artists_analyzed: db.len(),
        analysis_confidence,
    })
}

fn build_match<R: Rng + ?Sized>(
    artist: &ArtistProfile,
    profile: &VocalProfile,
    rng: &mut R,
) -> MatchResult {
    let confidence = candidate_confidence(artist, profile, rng);

    let attribute_count = rng.random_range(2..=4);
    let matching_attributes = MATCHING_ATTRIBUTES
        .choose_multiple(rng, attribute_count)
        .map(|s| s.to_string())
        .collect();

    MatchResult {
        artist: artist.name.clone(),
        confidence,
        genre: artist.genre.clone(),
        matching_attributes,
        recommended_effects: artist.recommended_effects(),
        similarity_factors: SimilarityFactors {
            vocal_style: uniform2(rng, 0.6, 0.95),
            bpm_compatibility: uniform2(rng, 0.5, 0.9),
            tonal_characteristics: uniform2(rng, 0.5, 0.92),
            production_style: uniform2(rng, 0.4, 0.88),
        },
        style: artist.style.clone(),
    }
}

/// Additive confidence model: random base, a tempo term and a technique term,
/// clamped to 45-97.
fn candidate_confidence<R: Rng + ?Sized>(
    artist: &ArtistProfile,
    profile: &VocalProfile,
    rng: &mut R,
) -> f64 {
    let mut confidence: f64 = rng.random_range(60.0..=95.0);

    if artist.bpm_in_range(profile.tempo_bpm) {
        confidence += rng.random_range(5.0..=15.0);
    } else {
        confidence -= rng.random_range(5.0..=10.0);
    }

    if profile.foundation.overall_score() > STRONG_FOUNDATION {
        confidence += rng.random_range(3.0..=8.0);
    }

    round_to(confidence.clamp(MIN_CONFIDENCE, MAX_CONFIDENCE), 1)
}

/// Traits that stand out in the profile, padded with generic phrases to at
/// least three and capped at four.
fn unique_traits<R: Rng + ?Sized>(profile: &VocalProfile, rng: &mut R) -> Vec<String> {
    let c = &profile.characteristics;
    let f = &profile.foundation;

    let checks = [
        (c.brightness > 0.7, "bright vocal tone"),
        (c.warmth > 0.6, "warm vocal texture"),
        (c.raspiness > 0.4, "distinctive rasp"),
        (f.vibrato_control() > 85.0, "exceptional vibrato control"),
        (f.dynamic_range() > 88.0, "impressive dynamic range"),
    ];

    let mut traits: Vec<&str> = checks
        .iter()
        .filter(|(hit, _)| *hit)
        .map(|(_, phrase)| *phrase)
        .collect();

    while traits.len() < MIN_TRAITS {
        let unused: Vec<&str> = GENERIC_TRAITS
            .iter()
            .copied()
            .filter(|t| !traits.contains(t))
            .collect();
        match unused.choose(rng) {
            Some(t) => traits.push(*t),
            None => break,
        }
    }

    traits.truncate(MAX_TRAITS);
    traits.into_iter().map(String::from).collect()
}
