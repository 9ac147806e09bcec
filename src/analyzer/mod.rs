pub mod profile;

use crate::sampling::{round_to, uniform1, uniform2};
use profile::{
    Characteristics, Foundation, FrequencyAnalysis, KeySignature, Mode, PitchClass, VocalProfile,
    VocalRange, VoiceType,
};
use rand::seq::IndexedRandom;
use rand::{Rng, RngCore};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyzeError {
    #[error("Cannot read {path}: {source}")]
    Input {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Bytes per estimated second of audio (50 KiB/s).
const BYTES_PER_SECOND: f64 = 1024.0 * 50.0;
const MIN_DURATION_SECS: f64 = 30.0;
const MAX_DURATION_SECS: f64 = 300.0;

/// Produces a `VocalProfile` for an audio file.
///
/// `SyntheticAnalyzer` is the only implementation today; a real acoustic
/// backend can be dropped in behind this trait without touching the matcher
/// or the FX assembler.
pub trait VocalAnalyzer: Send + Sync {
    fn analyze(&self, path: &Path, rng: &mut dyn RngCore) -> Result<VocalProfile, AnalyzeError>;
}

/// Samples every metric from its documented range. Only the duration is
/// derived from the input (its byte size).
#[derive(Debug, Default, Clone, Copy)]
pub struct SyntheticAnalyzer;

impl VocalAnalyzer for SyntheticAnalyzer {
    fn analyze(&self, path: &Path, rng: &mut dyn RngCore) -> Result<VocalProfile, AnalyzeError> {
        synthesize(path, rng)
    }
}

/// Read the file size and synthesize a profile from it.
pub fn synthesize<R: Rng + ?Sized>(
    path: &Path,
    rng: &mut R,
) -> Result<VocalProfile, AnalyzeError> {
    let size = std::fs::metadata(path)
        .map_err(|source| AnalyzeError::Input {
            path: path.display().to_string(),
            source,
        })?
        .len();

    log::debug!(
        "Synthesizing profile for {} ({} bytes)",
        path.file_name().and_then(|f| f.to_str()).unwrap_or("?"),
        size
    );

    Ok(synthesize_from_size(size, rng))
}

/// Estimated duration in seconds for a file of `size` bytes, clamped to 30-300.
pub fn estimate_duration(size: u64) -> f64 {
    let secs = (size as f64 / BYTES_PER_SECOND).clamp(MIN_DURATION_SECS, MAX_DURATION_SECS);
    round_to(secs, 1)
}

/// Build a profile when the byte length is already known.
pub fn synthesize_from_size<R: Rng + ?Sized>(size: u64, rng: &mut R) -> VocalProfile {
    let key_signature = KeySignature {
        pitch: *PitchClass::ALL.choose(rng).unwrap_or(&PitchClass::C),
        mode: *Mode::ALL.choose(rng).unwrap_or(&Mode::Major),
    };
    let tempo_bpm = rng.random_range(65..=180);

    let voice_type = *VoiceType::ALL.choose(rng).unwrap_or(&VoiceType::Tenor);
    let vocal_range = VocalRange::new(
        voice_type,
        rng.random_range(80..=150),
        rng.random_range(300..=800),
    );

    let foundation = Foundation::new(
        uniform1(rng, 75.0, 98.0),
        uniform1(rng, 70.0, 95.0),
        uniform1(rng, 72.0, 96.0),
        uniform1(rng, 65.0, 92.0),
        uniform1(rng, 68.0, 94.0),
    );

    let characteristics = Characteristics {
        brightness: uniform2(rng, 0.3, 0.9),
        warmth: uniform2(rng, 0.2, 0.8),
        raspiness: uniform2(rng, 0.1, 0.6),
        nasal_quality: uniform2(rng, 0.1, 0.4),
        chest_voice_dominance: uniform2(rng, 0.3, 0.8),
        head_voice_presence: uniform2(rng, 0.2, 0.7),
    };

    // Disjoint ranges keep F1 < F2 < F3; rounding can only meet at a shared bound.
    let frequency_analysis = FrequencyAnalysis {
        fundamental_frequency: uniform1(rng, 100.0, 400.0),
        formant_frequencies: [
            uniform1(rng, 400.0, 799.9),
            uniform1(rng, 800.0, 1799.9),
            uniform1(rng, 1800.0, 3200.0),
        ],
        harmonic_richness: uniform2(rng, 0.4, 0.9),
        spectral_centroid: uniform1(rng, 800.0, 2500.0),
    };

    VocalProfile {
        key_signature,
        tempo_bpm,
        duration_seconds: estimate_duration(size),
        vocal_range,
        foundation,
        characteristics,
        frequency_analysis,
        confidence_score: uniform1(rng, 85.0, 97.0),
    }
}
