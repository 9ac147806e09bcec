use rand::Rng;
use rand::seq::IndexedRandom;
use serde::Serialize;
use std::collections::BTreeMap;

use super::rules::{Condition, RuleContext};
use crate::artists::ReverbType;
use crate::sampling::uniform;

/// A single effect parameter value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<String>),
    Group(BTreeMap<String, ParamValue>),
}

#[cfg(test)]
impl ParamValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

pub type Parameters = BTreeMap<String, ParamValue>;

/// How to produce one parameter of an effect descriptor.
#[derive(Debug)]
pub enum ParamSpec {
    /// Uniform float in `[min, max]`, rounded to `places`.
    Float {
        name: &'static str,
        min: f64,
        max: f64,
        places: u32,
    },
    /// Uniform integer in `[min, max]`.
    Int {
        name: &'static str,
        min: i64,
        max: i64,
    },
    /// One of a fixed set of integers.
    OneOf {
        name: &'static str,
        options: &'static [i64],
    },
    Flag { name: &'static str, value: bool },
    /// One of two labels, chosen by a condition.
    Label {
        name: &'static str,
        when: Condition,
        then: &'static str,
        otherwise: &'static str,
    },
    /// One of several label lists, chosen uniformly.
    AnyList {
        name: &'static str,
        options: &'static [&'static [&'static str]],
    },
    /// The profile's key signature.
    Key { name: &'static str },
    /// The artist's reverb type, or a random one when the artist has none.
    Reverb { name: &'static str },
    /// Pick between two specs by a condition.
    Either {
        when: Condition,
        then: &'static ParamSpec,
        otherwise: &'static ParamSpec,
    },
    /// Nested parameter map.
    Group {
        name: &'static str,
        params: &'static [ParamSpec],
    },
}

impl ParamSpec {
    pub fn sample_into<R: Rng + ?Sized>(
        &self,
        ctx: &RuleContext<'_>,
        rng: &mut R,
        out: &mut Parameters,
    ) {
        let (name, value) = match self {
            Self::Float {
                name,
                min,
                max,
                places,
            } => {
                let v = uniform(rng, *min, *max, *places);
                (*name, ParamValue::Float(v))
            }
            Self::Int { name, min, max } => {
                let v = rng.random_range(*min..=*max);
                (*name, ParamValue::Int(v))
            }
            Self::OneOf { name, options } => {
                let v = options.choose(rng).copied().unwrap_or_default();
                (*name, ParamValue::Int(v))
            }
            Self::Flag { name, value } => (*name, ParamValue::Bool(*value)),
            Self::Label {
                name,
                when,
                then,
                otherwise,
            } => {
                let label = if when.holds(ctx, rng) {
                    *then
                } else {
                    *otherwise
                };
                (*name, ParamValue::Text(label.to_string()))
            }
            Self::AnyList { name, options } => {
                let list = options.choose(rng).copied().unwrap_or_default();
                let labels = list.iter().map(|s| s.to_string()).collect();
                (*name, ParamValue::List(labels))
            }
            Self::Key { name } => {
                let key = ctx.profile.key_signature.to_string();
                (*name, ParamValue::Text(key))
            }
            Self::Reverb { name } => {
                let reverb = ctx
                    .style
                    .reverb
                    .or_else(|| ReverbType::ALL.choose(rng).copied())
                    .unwrap_or(ReverbType::Hall);
                (*name, ParamValue::Text(reverb.as_str().to_string()))
            }
            Self::Either {
                when,
                then,
                otherwise,
            } => {
                let spec = if when.holds(ctx, rng) {
                    then
                } else {
                    otherwise
                };
                spec.sample_into(ctx, rng, out);
                return;
            }
            Self::Group { name, params } => {
                let mut group = Parameters::new();
                for spec in params.iter() {
                    spec.sample_into(ctx, rng, &mut group);
                }
                (*name, ParamValue::Group(group))
            }
        };
        out.insert(name.to_string(), value);
    }
}

/// Shorthand for the common one-decimal float parameter.
pub const fn float(name: &'static str, min: f64, max: f64) -> ParamSpec {
    ParamSpec::Float {
        name,
        min,
        max,
        places: 1,
    }
}

/// Two-decimal float parameter, for mix ratios and normalized amounts.
pub const fn float2(name: &'static str, min: f64, max: f64) -> ParamSpec {
    ParamSpec::Float {
        name,
        min,
        max,
        places: 2,
    }
}

pub const fn int(name: &'static str, min: i64, max: i64) -> ParamSpec {
    ParamSpec::Int { name, min, max }
}
