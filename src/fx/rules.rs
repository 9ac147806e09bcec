//! Declarative effect rules.
//!
//! Every effect the assembler can emit is one `EffectRule`: the category it
//! belongs to, the condition under which it appears, and the parameter specs
//! sampled when it does. Rules within a category are evaluated in table order,
//! which is also the order the effects appear in the chain.

use rand::Rng;
use serde::Serialize;

use super::params::{ParamSpec, Parameters, float, float2, int};
use crate::analyzer::profile::VocalProfile;
use crate::artists::StyleTraits;

/// Effect categories, in signal-processing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Pitch,
    Eq,
    Dynamics,
    Space,
    Time,
}

impl Category {
    pub const PROCESSING_ORDER: [Category; 5] = [
        Self::Pitch,
        Self::Eq,
        Self::Dynamics,
        Self::Space,
        Self::Time,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pitch => "pitch",
            Self::Eq => "eq",
            Self::Dynamics => "dynamics",
            Self::Space => "space",
            Self::Time => "time",
        }
    }
}

/// What the rules can see: the voice profile and the primary match.
pub struct RuleContext<'a> {
    pub profile: &'a VocalProfile,
    pub artist: &'a str,
    pub style: &'a StyleTraits,
    pub recommended: &'a [String],
}

impl RuleContext<'_> {
    fn recommends(&self, effect: &str) -> bool {
        self.recommended.iter().any(|e| e == effect)
    }
}

#[derive(Debug)]
pub enum Condition {
    Always,
    /// Holds with the given probability.
    Chance(f64),
    AutotuneArtist,
    DelayArtist,
    WideningArtist,
    PsychedelicArtist,
    /// The primary match recommends this effect.
    Recommends(&'static str),
    BrightnessBelow(f64),
    BrightnessAbove(f64),
    WarmthBelow(f64),
    ToneConsistencyBelow(f64),
    Not(&'static Condition),
    Any(&'static [Condition]),
    All(&'static [Condition]),
}

impl Condition {
    /// `Any` and `All` short-circuit, so a `Chance` after a satisfied
    /// alternative is never rolled.
    pub fn holds<R: Rng + ?Sized>(&self, ctx: &RuleContext<'_>, rng: &mut R) -> bool {
        match self {
            Self::Always => true,
            Self::Chance(p) => rng.random_bool(*p),
            Self::AutotuneArtist => ctx.style.autotune,
            Self::DelayArtist => ctx.style.delay,
            Self::WideningArtist => ctx.style.stereo_widening,
            Self::PsychedelicArtist => ctx.style.psychedelic,
            Self::Recommends(effect) => ctx.recommends(effect),
            Self::BrightnessBelow(t) => ctx.profile.characteristics.brightness < *t,
            Self::BrightnessAbove(t) => ctx.profile.characteristics.brightness > *t,
            Self::WarmthBelow(t) => ctx.profile.characteristics.warmth < *t,
            Self::ToneConsistencyBelow(t) => ctx.profile.foundation.tone_consistency() < *t,
            Self::Not(inner) => !inner.holds(ctx, rng),
            Self::Any(conds) => conds.iter().any(|c| c.holds(ctx, rng)),
            Self::All(conds) => conds.iter().all(|c| c.holds(ctx, rng)),
        }
    }
}

#[derive(Debug)]
pub struct EffectRule {
    pub category: Category,
    pub name: &'static str,
    pub when: Condition,
    pub params: &'static [ParamSpec],
}

impl EffectRule {
    pub fn sample_params<R: Rng + ?Sized>(&self, ctx: &RuleContext<'_>, rng: &mut R) -> Parameters {
        let mut params = Parameters::new();
        for spec in self.params {
            spec.sample_into(ctx, rng, &mut params);
        }
        params
    }
}

const AUTOTUNE_STYLE: Condition = Condition::Any(&[
    Condition::AutotuneArtist,
    Condition::Recommends("autotune"),
]);

const DELAY_STYLE: Condition =
    Condition::Any(&[Condition::DelayArtist, Condition::Recommends("delay")]);

const DELAY_FILTER: ParamSpec = ParamSpec::Group {
    name: "filter",
    params: &[
        float("high_cut", 6000.0, 12000.0),
        float("low_cut", 100.0, 300.0),
    ],
};

pub static RULES: &[EffectRule] = &[
    // ── Pitch ──
    EffectRule {
        category: Category::Pitch,
        name: "autotune",
        when: AUTOTUNE_STYLE,
        params: &[
            float2("intensity", 0.3, 0.9),
            float("speed", 5.0, 40.0),
            float("humanize", 10.0, 40.0),
            ParamSpec::Key { name: "key" },
            ParamSpec::Label {
                name: "scale",
                when: Condition::PsychedelicArtist,
                then: "chromatic",
                otherwise: "major",
            },
        ],
    },
    EffectRule {
        category: Category::Pitch,
        name: "pitch_correction",
        when: Condition::Not(&AUTOTUNE_STYLE),
        params: &[
            float2("strength", 0.2, 0.6),
            float("preserve_vibrato", 60.0, 90.0),
            float("cents_tolerance", 15.0, 35.0),
        ],
    },
    EffectRule {
        category: Category::Pitch,
        name: "harmony",
        when: Condition::Chance(0.4),
        params: &[
            int("voices", 1, 3),
            float("spread", 5.0, 15.0),
            float("mix", 15.0, 35.0),
            ParamSpec::AnyList {
                name: "intervals",
                options: &[&["third", "fifth"], &["octave"]],
            },
        ],
    },
    // ── EQ ──
    EffectRule {
        category: Category::Eq,
        name: "high_pass",
        when: Condition::Always,
        params: &[
            float("frequency", 60.0, 100.0),
            ParamSpec::OneOf {
                name: "slope",
                options: &[12, 18, 24],
            },
            float("resonance", 0.5, 1.2),
        ],
    },
    EffectRule {
        category: Category::Eq,
        name: "presence_boost",
        when: Condition::Always,
        params: &[
            float("frequency", 3000.0, 6000.0),
            float("gain", 2.0, 5.0),
            float("q", 1.0, 2.5),
        ],
    },
    EffectRule {
        category: Category::Eq,
        name: "warmth",
        when: Condition::Always,
        params: &[
            float("frequency", 400.0, 800.0),
            ParamSpec::Either {
                when: Condition::WarmthBelow(0.5),
                then: &float("gain", -1.0, 3.0),
                otherwise: &float("gain", 1.0, 4.0),
            },
            float("q", 1.0, 2.0),
        ],
    },
    // Brightness between 0.6 and 0.7 gets neither air nor de-essing.
    EffectRule {
        category: Category::Eq,
        name: "air_boost",
        when: Condition::BrightnessBelow(0.6),
        params: &[
            float("frequency", 10000.0, 15000.0),
            float("gain", 1.0, 3.0),
            float("q", 0.5, 1.5),
        ],
    },
    EffectRule {
        category: Category::Eq,
        name: "de_esser",
        when: Condition::BrightnessAbove(0.7),
        params: &[
            float("frequency", 5000.0, 8000.0),
            float("threshold", -15.0, -8.0),
            float("ratio", 3.0, 6.0),
        ],
    },
    // ── Dynamics ──
    EffectRule {
        category: Category::Dynamics,
        name: "vocal_compressor",
        when: Condition::Always,
        params: &[
            float("threshold", -18.0, -8.0),
            float("ratio", 3.0, 6.0),
            float("attack", 1.0, 5.0),
            float("release", 100.0, 300.0),
            float("knee", 1.0, 4.0),
            float("makeup_gain", 2.0, 8.0),
        ],
    },
    EffectRule {
        category: Category::Dynamics,
        name: "peak_limiter",
        when: Condition::Always,
        params: &[
            float("threshold", -2.0, -0.5),
            float("release", 10.0, 50.0),
            float("lookahead", 2.0, 8.0),
        ],
    },
    EffectRule {
        category: Category::Dynamics,
        name: "noise_gate",
        when: Condition::ToneConsistencyBelow(75.0),
        params: &[
            float("threshold", -45.0, -25.0),
            float("attack", 0.5, 3.0),
            float("release", 50.0, 150.0),
            float("hold", 5.0, 20.0),
        ],
    },
    // ── Space ──
    EffectRule {
        category: Category::Space,
        name: "reverb",
        when: Condition::Always,
        params: &[
            ParamSpec::Reverb { name: "type" },
            float2("size", 0.3, 0.8),
            float("decay", 1.2, 4.0),
            float("pre_delay", 10.0, 40.0),
            float("mix", 15.0, 35.0),
            float2("damping", 0.3, 0.7),
        ],
    },
    EffectRule {
        category: Category::Space,
        name: "chorus",
        when: Condition::Any(&[Condition::Recommends("chorus"), Condition::Chance(0.4)]),
        params: &[
            float2("rate", 0.3, 1.2),
            float("depth", 20.0, 60.0),
            float("mix", 10.0, 25.0),
            int("voices", 2, 4),
        ],
    },
    EffectRule {
        category: Category::Space,
        name: "stereo_widener",
        when: Condition::WideningArtist,
        params: &[
            float("width", 120.0, 180.0),
            ParamSpec::Flag {
                name: "bass_mono",
                value: true,
            },
            float("frequency_split", 200.0, 400.0),
        ],
    },
    // ── Time ──
    EffectRule {
        category: Category::Time,
        name: "ping_pong_delay",
        when: Condition::All(&[DELAY_STYLE, Condition::PsychedelicArtist]),
        params: &[
            float("time", 150.0, 400.0),
            float("feedback", 20.0, 50.0),
            float("mix", 12.0, 28.0),
            DELAY_FILTER,
            float("spread", 50.0, 100.0),
        ],
    },
    EffectRule {
        category: Category::Time,
        name: "stereo_delay",
        when: Condition::All(&[
            DELAY_STYLE,
            Condition::Not(&Condition::PsychedelicArtist),
        ]),
        params: &[
            float("time", 150.0, 400.0),
            float("feedback", 20.0, 50.0),
            float("mix", 12.0, 28.0),
            DELAY_FILTER,
        ],
    },
    EffectRule {
        category: Category::Time,
        name: "modulation_delay",
        when: Condition::Chance(0.3),
        params: &[
            float("time", 200.0, 600.0),
            float2("mod_rate", 0.2, 0.8),
            float("mod_depth", 10.0, 40.0),
            float("mix", 8.0, 20.0),
        ],
    },
];

/// Rules for one category, in table order.
pub fn rules_for(category: Category) -> impl Iterator<Item = &'static EffectRule> {
    RULES.iter().filter(move |r| r.category == category)
}
