use serde::{Serialize, Serializer};
use std::fmt;

use crate::sampling::round_to;

/// The twelve pitch classes, sharps only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PitchClass {
    C,
    CSharp,
    D,
    DSharp,
    E,
    F,
    FSharp,
    G,
    GSharp,
    A,
    ASharp,
    B,
}

impl PitchClass {
    pub const ALL: [PitchClass; 12] = [
        Self::C,
        Self::CSharp,
        Self::D,
        Self::DSharp,
        Self::E,
        Self::F,
        Self::FSharp,
        Self::G,
        Self::GSharp,
        Self::A,
        Self::ASharp,
        Self::B,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::C => "C",
            Self::CSharp => "C#",
            Self::D => "D",
            Self::DSharp => "D#",
            Self::E => "E",
            Self::F => "F",
            Self::FSharp => "F#",
            Self::G => "G",
            Self::GSharp => "G#",
            Self::A => "A",
            Self::ASharp => "A#",
            Self::B => "B",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Major,
    Minor,
    Dorian,
    Mixolydian,
}

impl Mode {
    pub const ALL: [Mode; 4] = [Self::Major, Self::Minor, Self::Dorian, Self::Mixolydian];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Major => "Major",
            Self::Minor => "Minor",
            Self::Dorian => "Dorian",
            Self::Mixolydian => "Mixolydian",
        }
    }
}

/// Pitch class paired with a mode. Only meaningful as a display label,
/// serialized as e.g. `"F# Dorian"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeySignature {
    pub pitch: PitchClass,
    pub mode: Mode,
}

impl fmt::Display for KeySignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.pitch.name(), self.mode.name())
    }
}

impl Serialize for KeySignature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VoiceType {
    Soprano,
    Alto,
    Tenor,
    Bass,
    #[serde(rename = "Mezzo-Soprano")]
    MezzoSoprano,
    Baritone,
}

impl VoiceType {
    pub const ALL: [VoiceType; 6] = [
        Self::Soprano,
        Self::Alto,
        Self::Tenor,
        Self::Bass,
        Self::MezzoSoprano,
        Self::Baritone,
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VocalRange {
    #[serde(rename = "type")]
    pub voice_type: VoiceType,
    pub low_hz: u32,
    pub high_hz: u32,
    /// Rough span estimate: (high - low) / 10.
    pub span: f64,
}

impl VocalRange {
    pub fn new(voice_type: VoiceType, low_hz: u32, high_hz: u32) -> Self {
        let span = round_to((high_hz as f64 - low_hz as f64) / 10.0, 1);
        Self {
            voice_type,
            low_hz,
            high_hz,
            span,
        }
    }
}

/// Vocal technique metrics. `overall_score` is derived from the other five
/// and is recomputed on construction, so the fields are read-only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Foundation {
    pitch_accuracy: f64,
    breath_control: f64,
    tone_consistency: f64,
    vibrato_control: f64,
    dynamic_range: f64,
    overall_score: f64,
}

impl Foundation {
    pub fn new(
        pitch_accuracy: f64,
        breath_control: f64,
        tone_consistency: f64,
        vibrato_control: f64,
        dynamic_range: f64,
    ) -> Self {
        let sum =
            pitch_accuracy + breath_control + tone_consistency + vibrato_control + dynamic_range;
        Self {
            pitch_accuracy,
            breath_control,
            tone_consistency,
            vibrato_control,
            dynamic_range,
            overall_score: round_to(sum / 5.0, 1),
        }
    }

    pub fn pitch_accuracy(&self) -> f64 {
        self.pitch_accuracy
    }

    pub fn breath_control(&self) -> f64 {
        self.breath_control
    }

    pub fn tone_consistency(&self) -> f64 {
        self.tone_consistency
    }

    pub fn vibrato_control(&self) -> f64 {
        self.vibrato_control
    }

    pub fn dynamic_range(&self) -> f64 {
        self.dynamic_range
    }

    pub fn overall_score(&self) -> f64 {
        self.overall_score
    }
}

/// Timbre descriptors, each normalized to 0-1.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Characteristics {
    pub brightness: f64,
    pub warmth: f64,
    pub raspiness: f64,
    pub nasal_quality: f64,
    pub chest_voice_dominance: f64,
    pub head_voice_presence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyAnalysis {
    pub fundamental_frequency: f64,
    /// F1, F2, F3 in ascending order.
    pub formant_frequencies: [f64; 3],
    pub harmonic_richness: f64,
    pub spectral_centroid: f64,
}

/// Stage 1 output: everything downstream stages know about the voice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VocalProfile {
    pub key_signature: KeySignature,
    pub tempo_bpm: u32,
    pub duration_seconds: f64,
    pub vocal_range: VocalRange,
    pub foundation: Foundation,
    pub characteristics: Characteristics,
    pub frequency_analysis: FrequencyAnalysis,
    pub confidence_score: f64,
}
