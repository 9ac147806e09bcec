pub mod params;
pub mod rules;

use crate::analyzer::profile::VocalProfile;
use crate::matcher::MatchResult;
use crate::sampling::uniform1;
use params::Parameters;
use rand::Rng;
use rules::{Category, RuleContext};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FxError {
    #[error("No artist matches to build an FX chain from")]
    NoMatch,
}

/// One effect in the chain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectDescriptor {
    pub name: String,
    pub enabled: bool,
    pub parameters: Parameters,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PitchSection {
    pub enabled: Vec<EffectDescriptor>,
    pub disabled: Vec<EffectDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EqSection {
    pub chain: Vec<EffectDescriptor>,
    pub bypass_all: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DynamicsSection {
    pub chain: Vec<EffectDescriptor>,
    pub parallel_processing: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpaceSection {
    pub effects: Vec<EffectDescriptor>,
    pub send_levels: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSection {
    pub effects: Vec<EffectDescriptor>,
    pub tempo_sync: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChainComplexity {
    Low,
    Medium,
    High,
}

impl ChainComplexity {
    pub fn from_total(total_effects: usize) -> Self {
        match total_effects {
            0..=8 => Self::Low,
            9..=12 => Self::Medium,
            _ => Self::High,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UseCase {
    Recording,
    LivePerformance,
}

/// Chains under this many effects are light enough for live use.
const LIVE_EFFECT_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChainMetadata {
    pub total_effects: usize,
    pub processing_order: [Category; 5],
    pub cpu_usage_percent: f64,
    pub latency_ms: f64,
    pub artist_style: String,
    pub chain_complexity: ChainComplexity,
    pub recommended_for: Vec<UseCase>,
}

/// Stage 3 output: the recommended effects chain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FxChain {
    pub pitch: PitchSection,
    pub eq: EqSection,
    pub dynamics: DynamicsSection,
    pub space: SpaceSection,
    pub time: TimeSection,
    pub metadata: ChainMetadata,
    pub artist_inspiration: String,
    pub processing_confidence: f64,
    /// Seconds.
    pub estimated_processing_time: f64,
}

impl FxChain {
    /// Descriptors in one category, flattening the pitch enabled/disabled split.
    pub fn effects(&self, category: Category) -> Vec<&EffectDescriptor> {
        match category {
            Category::Pitch => {
                let pitch = &self.pitch;
                pitch.enabled.iter().chain(&pitch.disabled).collect()
            }
            Category::Eq => self.eq.chain.iter().collect(),
            Category::Dynamics => self.dynamics.chain.iter().collect(),
            Category::Space => self.space.effects.iter().collect(),
            Category::Time => self.time.effects.iter().collect(),
        }
    }

    /// Count of every descriptor present across all five categories.
    pub fn count_effects(&self) -> usize {
        Category::PROCESSING_ORDER
            .iter()
            .map(|&c| self.effects(c).len())
            .sum()
    }

    pub fn find(&self, name: &str) -> Option<&EffectDescriptor> {
        Category::PROCESSING_ORDER
            .iter()
            .flat_map(|&c| self.effects(c))
            .find(|e| e.name == name)
    }
}

/// Build the FX chain for a profile, styled after the top match.
pub fn assemble<R: Rng + ?Sized>(
    profile: &VocalProfile,
    matches: &[MatchResult],
    rng: &mut R,
) -> Result<FxChain, FxError> {
    let primary = matches.first().ok_or(FxError::NoMatch)?;
    let ctx = RuleContext {
        profile,
        artist: &primary.artist,
        style: &primary.style,
        recommended: &primary.recommended_effects,
    };

    let (enabled, disabled): (Vec<_>, Vec<_>) = evaluate(Category::Pitch, &ctx, rng)
        .into_iter()
        .partition(|e| e.enabled);
    let pitch = PitchSection { enabled, disabled };

    let eq = EqSection {
        chain: evaluate(Category::Eq, &ctx, rng),
        bypass_all: false,
    };

    let dynamics = DynamicsSection {
        chain: evaluate(Category::Dynamics, &ctx, rng),
        parallel_processing: rng.random_bool(0.3),
    };

    let space = SpaceSection {
        effects: evaluate(Category::Space, &ctx, rng),
        send_levels: uniform1(rng, 15.0, 35.0),
    };

    let time = TimeSection {
        effects: evaluate(Category::Time, &ctx, rng),
        tempo_sync: profile.tempo_bpm,
    };

    let total_effects = pitch.enabled.len()
        + pitch.disabled.len()
        + eq.chain.len()
        + dynamics.chain.len()
        + space.effects.len()
        + time.effects.len();

    let recommended_for = if total_effects < LIVE_EFFECT_LIMIT {
        vec![UseCase::Recording, UseCase::LivePerformance]
    } else {
        vec![UseCase::Recording]
    };

    let metadata = ChainMetadata {
        total_effects,
        processing_order: Category::PROCESSING_ORDER,
        cpu_usage_percent: uniform1(rng, 15.0, 45.0),
        latency_ms: uniform1(rng, 8.0, 25.0),
        artist_style: primary.artist.clone(),
        chain_complexity: ChainComplexity::from_total(total_effects),
        recommended_for,
    };

    log::debug!(
        "Assembled {} effects ({:?}) in the style of {}",
        total_effects,
        metadata.chain_complexity,
        ctx.artist
    );

    Ok(FxChain {
        pitch,
        eq,
        dynamics,
        space,
        time,
        metadata,
        artist_inspiration: primary.artist.clone(),
        processing_confidence: uniform1(rng, 82.0, 96.0),
        estimated_processing_time: uniform1(rng, 15.0, 45.0),
    })
}

/// Run every rule of a category and sample parameters for those that fire.
fn evaluate<R: Rng + ?Sized>(
    category: Category,
    ctx: &RuleContext<'_>,
    rng: &mut R,
) -> Vec<EffectDescriptor> {
    let mut effects = Vec::new();
    for rule in rules::rules_for(category) {
        if rule.when.holds(ctx, rng) {
            effects.push(EffectDescriptor {
                name: rule.name.to_string(),
                enabled: true,
                parameters: rule.sample_params(ctx, rng),
            });
        }
    }
    effects
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::profile::{
        Characteristics, Foundation, FrequencyAnalysis, KeySignature, Mode, PitchClass,
        VocalRange, VoiceType,
    };
    use crate::analyzer::synthesize_from_size;
    use crate::artists::{ArtistDatabase, ReverbType, StyleTraits};
    use crate::matcher::{self, SimilarityFactors};
    use params::ParamValue;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn profile(tone_consistency: f64, brightness: f64, warmth: f64) -> VocalProfile {
        VocalProfile {
            key_signature: KeySignature {
                pitch: PitchClass::D,
                mode: Mode::Mixolydian,
            },
            tempo_bpm: 128,
            duration_seconds: 90.0,
            vocal_range: VocalRange::new(VoiceType::Alto, 100, 600),
            foundation: Foundation::new(85.0, 80.0, tone_consistency, 80.0, 80.0),
            characteristics: Characteristics {
                brightness,
                warmth,
                raspiness: 0.3,
                nasal_quality: 0.2,
                chest_voice_dominance: 0.5,
                head_voice_presence: 0.4,
            },
            frequency_analysis: FrequencyAnalysis {
                fundamental_frequency: 200.0,
                formant_frequencies: [500.0, 1500.0, 2500.0],
                harmonic_richness: 0.7,
                spectral_centroid: 1600.0,
            },
            confidence_score: 91.0,
        }
    }

    fn match_for(artist: &str, recommended: &[&str], style: StyleTraits) -> MatchResult {
        MatchResult {
            artist: artist.to_string(),
            confidence: 80.0,
            genre: "Test".into(),
            matching_attributes: vec!["vocal rhythm".into(), "vocal runs".into()],
            recommended_effects: recommended.iter().map(|s| s.to_string()).collect(),
            similarity_factors: SimilarityFactors {
                vocal_style: 0.8,
                bpm_compatibility: 0.7,
                tonal_characteristics: 0.7,
                production_style: 0.6,
            },
            style,
        }
    }

    fn plain_match(recommended: &[&str]) -> MatchResult {
        match_for("Nobody", recommended, StyleTraits::default())
    }

    fn builtin_match(name: &str) -> MatchResult {
        let db = ArtistDatabase::default();
        let artist = db.get(name).unwrap();
        let recommended = artist.recommended_effects();
        let refs: Vec<&str> = recommended.iter().map(|s| s.as_str()).collect();
        match_for(&artist.name, &refs, artist.style.clone())
    }

    fn names(effects: &[EffectDescriptor]) -> Vec<&str> {
        effects.iter().map(|e| e.name.as_str()).collect()
    }

    fn param<'a>(chain: &'a FxChain, effect: &str, key: &str) -> &'a ParamValue {
        &chain.find(effect).unwrap().parameters[key]
    }

    #[test]
    fn test_no_matches_fails() {
        let mut rng = StdRng::seed_from_u64(1);
        let err = assemble(&profile(80.0, 0.5, 0.5), &[], &mut rng).unwrap_err();
        assert!(matches!(err, FxError::NoMatch));
    }

    #[test]
    fn test_noise_gate_follows_tone_consistency() {
        let mut rng = StdRng::seed_from_u64(2);
        let m = [builtin_match("Drake")];
        for _ in 0..50 {
            let low = assemble(&profile(60.0, 0.5, 0.5), &m, &mut rng).unwrap();
            assert!(names(&low.dynamics.chain).contains(&"noise_gate"));
            let high = assemble(&profile(90.0, 0.5, 0.5), &m, &mut rng).unwrap();
            assert!(!names(&high.dynamics.chain).contains(&"noise_gate"));
        }
    }

    #[test]
    fn test_eq_brightness_bands() {
        let mut rng = StdRng::seed_from_u64(3);
        let m = [builtin_match("Drake")];

        let dull = assemble(&profile(80.0, 0.4, 0.5), &m, &mut rng).unwrap();
        assert_eq!(
            names(&dull.eq.chain),
            vec!["high_pass", "presence_boost", "warmth", "air_boost"]
        );

        let bright = assemble(&profile(80.0, 0.8, 0.5), &m, &mut rng).unwrap();
        assert_eq!(
            names(&bright.eq.chain),
            vec!["high_pass", "presence_boost", "warmth", "de_esser"]
        );

        let middle = assemble(&profile(80.0, 0.65, 0.5), &m, &mut rng).unwrap();
        assert_eq!(
            names(&middle.eq.chain),
            vec!["high_pass", "presence_boost", "warmth"]
        );
    }

    #[test]
    fn test_warmth_gain_ranges() {
        let mut rng = StdRng::seed_from_u64(4);
        let m = [builtin_match("Drake")];
        for _ in 0..200 {
            let thin = assemble(&profile(80.0, 0.5, 0.3), &m, &mut rng).unwrap();
            let gain = param(&thin, "warmth", "gain").as_f64().unwrap();
            assert!((-1.0..=3.0).contains(&gain));

            let warm = assemble(&profile(80.0, 0.5, 0.7), &m, &mut rng).unwrap();
            let gain = param(&warm, "warmth", "gain").as_f64().unwrap();
            assert!((1.0..=4.0).contains(&gain));
        }
    }

    #[test]
    fn test_psychedelic_artist_chain() {
        let mut rng = StdRng::seed_from_u64(5);
        let m = [builtin_match("Travis Scott")];
        let chain = assemble(&profile(80.0, 0.5, 0.5), &m, &mut rng).unwrap();

        let autotune = chain.find("autotune").unwrap();
        assert_eq!(autotune.parameters["scale"].as_str(), Some("chromatic"));
        assert_eq!(autotune.parameters["key"].as_str(), Some("D Mixolydian"));
        assert!(chain.find("pitch_correction").is_none());

        assert_eq!(param(&chain, "reverb", "type").as_str(), Some("hall"));
        assert!(chain.find("stereo_widener").is_some());

        let delay = chain.find("ping_pong_delay").unwrap();
        assert!(delay.parameters.contains_key("spread"));
        assert!(matches!(delay.parameters["filter"], ParamValue::Group(_)));
        assert!(chain.find("stereo_delay").is_none());
    }

    #[test]
    fn test_autotune_artist_uses_major_scale() {
        let mut rng = StdRng::seed_from_u64(6);
        let m = [builtin_match("Future")];
        let chain = assemble(&profile(80.0, 0.5, 0.5), &m, &mut rng).unwrap();
        let autotune = chain.find("autotune").unwrap();
        assert_eq!(autotune.parameters["scale"].as_str(), Some("major"));

        let delay = chain.find("stereo_delay").unwrap();
        assert!(!delay.parameters.contains_key("spread"));
        assert!(chain.find("stereo_widener").is_none());
    }

    #[test]
    fn test_recommended_autotune_triggers_autotune() {
        let mut rng = StdRng::seed_from_u64(7);
        let m = [plain_match(&["autotune", "reverb", "eq"])];
        let chain = assemble(&profile(80.0, 0.5, 0.5), &m, &mut rng).unwrap();
        assert!(chain.find("autotune").is_some());
        assert!(chain.find("pitch_correction").is_none());
    }

    #[test]
    fn test_plain_artist_gets_pitch_correction() {
        let mut rng = StdRng::seed_from_u64(8);
        let m = [builtin_match("Drake")];
        for _ in 0..50 {
            let chain = assemble(&profile(80.0, 0.5, 0.5), &m, &mut rng).unwrap();
            assert!(chain.find("pitch_correction").is_some());
            assert!(chain.find("autotune").is_none());
            assert!(chain.find("stereo_delay").is_none());
            assert!(chain.find("ping_pong_delay").is_none());
            assert_eq!(param(&chain, "reverb", "type").as_str(), Some("room"));
        }
    }

    #[test]
    fn test_recommended_chorus_and_delay() {
        let mut rng = StdRng::seed_from_u64(9);
        let m = [plain_match(&["chorus", "delay", "reverb"])];
        for _ in 0..50 {
            let chain = assemble(&profile(80.0, 0.5, 0.5), &m, &mut rng).unwrap();
            assert!(chain.find("chorus").is_some());
            assert!(chain.find("stereo_delay").is_some());
        }
    }

    #[test]
    fn test_unlisted_artist_reverb_is_random_known_type() {
        let mut rng = StdRng::seed_from_u64(10);
        let m = [plain_match(&["eq"])];
        let allowed: Vec<&str> = ReverbType::ALL.iter().map(|r| r.as_str()).collect();
        for _ in 0..50 {
            let chain = assemble(&profile(80.0, 0.5, 0.5), &m, &mut rng).unwrap();
            let t = param(&chain, "reverb", "type").as_str().unwrap();
            assert!(allowed.contains(&t));
        }
    }

    #[test]
    fn test_harmony_parameters() {
        let mut rng = StdRng::seed_from_u64(11);
        let m = [builtin_match("Drake")];
        let mut seen = 0;
        for _ in 0..200 {
            let chain = assemble(&profile(80.0, 0.5, 0.5), &m, &mut rng).unwrap();
            if let Some(h) = chain.find("harmony") {
                seen += 1;
                match &h.parameters["voices"] {
                    ParamValue::Int(v) => assert!((1..=3).contains(v)),
                    other => panic!("voices should be an int, got {other:?}"),
                }
                match &h.parameters["intervals"] {
                    ParamValue::List(l) => {
                        assert!(l == &vec!["third", "fifth"] || l == &vec!["octave"])
                    }
                    other => panic!("intervals should be a list, got {other:?}"),
                }
            }
        }
        assert!(seen > 0);
    }

    #[test]
    fn test_random_rule_rates() {
        let mut rng = StdRng::seed_from_u64(12);
        // No chorus recommendation, so chorus only comes from its own roll.
        let m = [plain_match(&["reverb", "compression", "eq"])];
        let runs = 10_000;
        let (mut harmony, mut chorus, mut mod_delay, mut parallel) = (0, 0, 0, 0);

        for _ in 0..runs {
            let chain = assemble(&profile(80.0, 0.5, 0.5), &m, &mut rng).unwrap();
            harmony += usize::from(chain.find("harmony").is_some());
            chorus += usize::from(chain.find("chorus").is_some());
            mod_delay += usize::from(chain.find("modulation_delay").is_some());
            parallel += usize::from(chain.dynamics.parallel_processing);
        }

        let rate = |n: usize| n as f64 / runs as f64;
        for (name, observed, expected) in [
            ("harmony", rate(harmony), 0.4),
            ("chorus", rate(chorus), 0.4),
            ("modulation_delay", rate(mod_delay), 0.3),
            ("parallel_processing", rate(parallel), 0.3),
        ] {
            assert!(
                (observed - expected).abs() < 0.03,
                "{name}: observed {observed:.3}, expected {expected}"
            );
        }
    }

    #[test]
    fn test_metadata_consistent() {
        let db = ArtistDatabase::default();
        let mut rng = StdRng::seed_from_u64(12);
        for _ in 0..300 {
            let p = synthesize_from_size(6_000_000, &mut rng);
            let report = matcher::score(&p, &db, &mut rng).unwrap();
            let chain = assemble(&p, &report.matches, &mut rng).unwrap();
            let md = &chain.metadata;

            assert_eq!(md.total_effects, chain.count_effects());
            assert_eq!(
                md.chain_complexity,
                ChainComplexity::from_total(md.total_effects)
            );
            assert_eq!(md.processing_order, Category::PROCESSING_ORDER);
            assert_eq!(md.artist_style, report.matches[0].artist);
            assert_eq!(chain.time.tempo_sync, p.tempo_bpm);
            assert!(!chain.eq.bypass_all);
            if md.total_effects < 10 {
                assert_eq!(
                    md.recommended_for,
                    vec![UseCase::Recording, UseCase::LivePerformance]
                );
            } else {
                assert_eq!(md.recommended_for, vec![UseCase::Recording]);
            }
            // high_pass, presence_boost, warmth, compressor, limiter, reverb, one pitch effect
            assert!(md.total_effects >= 7);
        }
    }

    #[test]
    fn test_complexity_thresholds() {
        assert_eq!(ChainComplexity::from_total(7), ChainComplexity::Low);
        assert_eq!(ChainComplexity::from_total(8), ChainComplexity::Low);
        assert_eq!(ChainComplexity::from_total(9), ChainComplexity::Medium);
        assert_eq!(ChainComplexity::from_total(12), ChainComplexity::Medium);
        assert_eq!(ChainComplexity::from_total(13), ChainComplexity::High);
    }

    #[test]
    fn test_serialized_shape() {
        let mut rng = StdRng::seed_from_u64(13);
        let m = [builtin_match("The Weeknd")];
        let chain = assemble(&profile(70.0, 0.8, 0.5), &m, &mut rng).unwrap();
        let json = serde_json::to_value(&chain).unwrap();

        assert!(json["pitch"]["enabled"].is_array());
        assert!(json["pitch"]["disabled"].is_array());
        assert_eq!(json["eq"]["bypass_all"], serde_json::json!(false));
        assert!(json["dynamics"]["parallel_processing"].is_boolean());
        assert!(json["space"]["send_levels"].is_number());
        assert_eq!(json["time"]["tempo_sync"], serde_json::json!(128));
        assert_eq!(
            json["metadata"]["processing_order"],
            serde_json::json!(["pitch", "eq", "dynamics", "space", "time"])
        );
        let widener = json["space"]["effects"]
            .as_array()
            .unwrap()
            .iter()
            .find(|e| e["name"] == "stereo_widener")
            .unwrap();
        assert_eq!(widener["parameters"]["bass_mono"], serde_json::json!(true));
    }
}
