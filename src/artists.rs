use serde::{Deserialize, Serialize};

/// Reverb flavour associated with an artist's production style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReverbType {
    Hall,
    Room,
    Plate,
}

impl ReverbType {
    pub const ALL: [ReverbType; 3] = [Self::Hall, Self::Room, Self::Plate];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hall => "hall",
            Self::Room => "room",
            Self::Plate => "plate",
        }
    }
}

/// Production traits the FX assembler keys its artist-specific rules on.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct StyleTraits {
    /// Heavy pitch correction is part of the sound.
    pub autotune: bool,
    /// Audible delay throws are part of the sound.
    pub delay: bool,
    pub stereo_widening: bool,
    /// Psychedelic/experimental: chromatic autotune and ping-pong delay.
    pub psychedelic: bool,
    pub reverb: Option<ReverbType>,
}

/// A single reference artist.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtistProfile {
    pub name: String,
    /// Descriptive tags. Not consumed by scoring.
    pub vocal_characteristics: Vec<String>,
    /// Inclusive BPM range the artist typically performs at.
    pub typical_bpm: (u32, u32),
    /// Ordered, the first three are the recommended effects.
    pub vocal_effects: Vec<String>,
    pub genre: String,
    pub style: StyleTraits,
}

impl ArtistProfile {
    pub fn bpm_in_range(&self, bpm: u32) -> bool {
        self.typical_bpm.0 <= bpm && bpm <= self.typical_bpm.1
    }

    pub fn recommended_effects(&self) -> Vec<String> {
        self.vocal_effects.iter().take(3).cloned().collect()
    }
}

/// Config file artist definition (deserialized from TOML).
#[derive(Debug, Deserialize, Clone)]
pub struct CustomArtistConfig {
    pub name: String,
    pub genre: String,
    pub typical_bpm: (u32, u32),
    #[serde(default)]
    pub vocal_effects: Vec<String>,
    #[serde(default)]
    pub vocal_characteristics: Vec<String>,
    #[serde(default)]
    pub style: StyleTraits,
}

impl From<&CustomArtistConfig> for ArtistProfile {
    fn from(custom: &CustomArtistConfig) -> Self {
        let (lo, hi) = custom.typical_bpm;
        ArtistProfile {
            name: custom.name.clone(),
            vocal_characteristics: custom.vocal_characteristics.clone(),
            typical_bpm: (lo.min(hi), lo.max(hi)),
            vocal_effects: custom.vocal_effects.clone(),
            genre: custom.genre.clone(),
            style: custom.style.clone(),
        }
    }
}

/// The reference artist table. Built once at startup and shared read-only
/// (wrap in `Arc` to hand to worker threads).
#[derive(Debug, Clone)]
pub struct ArtistDatabase {
    artists: Vec<ArtistProfile>,
}

impl ArtistDatabase {
    /// Built-in artists merged with config-defined ones. A custom entry whose
    /// name matches a built-in (case-insensitive) replaces it.
    pub fn new(custom_artists: &[CustomArtistConfig]) -> Self {
        let mut artists = builtin_artists();

        for custom in custom_artists {
            let profile = ArtistProfile::from(custom);
            let existing = artists
                .iter_mut()
                .find(|a| a.name.to_lowercase() == custom.name.to_lowercase());

            match existing {
                Some(entry) => {
                    log::debug!("Overriding built-in artist {}", entry.name);
                    *entry = profile;
                }
                None => {
                    log::debug!("Adding custom artist {}", profile.name);
                    artists.push(profile);
                }
            }
        }

        Self { artists }
    }

    pub fn from_profiles(artists: Vec<ArtistProfile>) -> Self {
        Self { artists }
    }

    pub fn artists(&self) -> &[ArtistProfile] {
        &self.artists
    }

    pub fn len(&self) -> usize {
        self.artists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artists.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&ArtistProfile> {
        let lower = name.to_lowercase();
        self.artists.iter().find(|a| a.name.to_lowercase() == lower)
    }
}

impl Default for ArtistDatabase {
    fn default() -> Self {
        Self::new(&[])
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn builtin_artists() -> Vec<ArtistProfile> {
    vec![
        ArtistProfile {
            name: "Future".into(),
            vocal_characteristics: strings(&[
                "autotune_heavy",
                "melodic_rap",
                "mumbly",
                "atlanta_sound",
            ]),
            typical_bpm: (120, 150),
            vocal_effects: strings(&["pitch_correction", "reverb", "delay", "distortion"]),
            genre: "Hip-Hop/Trap".into(),
            style: StyleTraits {
                autotune: true,
                delay: true,
                reverb: Some(ReverbType::Hall),
                ..Default::default()
            },
        },
        ArtistProfile {
            name: "Travis Scott".into(),
            vocal_characteristics: strings(&[
                "psychedelic",
                "autotune_artistic",
                "energetic",
                "layered",
            ]),
            typical_bpm: (130, 160),
            vocal_effects: strings(&["heavy_autotune", "reverb", "phaser", "compression"]),
            genre: "Hip-Hop/Psychedelic Trap".into(),
            style: StyleTraits {
                autotune: true,
                delay: true,
                stereo_widening: true,
                psychedelic: true,
                reverb: Some(ReverbType::Hall),
            },
        },
        ArtistProfile {
            name: "The Weeknd".into(),
            vocal_characteristics: strings(&["falsetto", "dark", "smooth", "r&b_influenced"]),
            typical_bpm: (90, 130),
            vocal_effects: strings(&["reverb", "chorus", "compression", "eq_boost"]),
            genre: "R&B/Pop".into(),
            style: StyleTraits {
                delay: true,
                stereo_widening: true,
                reverb: Some(ReverbType::Plate),
                ..Default::default()
            },
        },
        ArtistProfile {
            name: "Drake".into(),
            vocal_characteristics: strings(&["melodic", "conversational", "canadian", "versatile"]),
            typical_bpm: (100, 140),
            vocal_effects: strings(&["subtle_autotune", "compression", "eq", "reverb"]),
            genre: "Hip-Hop/Pop".into(),
            style: StyleTraits {
                reverb: Some(ReverbType::Room),
                ..Default::default()
            },
        },
        ArtistProfile {
            name: "Post Malone".into(),
            vocal_characteristics: strings(&[
                "raspy",
                "melodic",
                "country_influenced",
                "versatile",
            ]),
            typical_bpm: (100, 140),
            vocal_effects: strings(&["autotune", "reverb", "compression", "distortion"]),
            genre: "Pop/Hip-Hop".into(),
            style: StyleTraits {
                autotune: true,
                reverb: Some(ReverbType::Room),
                ..Default::default()
            },
        },
        ArtistProfile {
            name: "Lil Uzi Vert".into(),
            vocal_characteristics: strings(&[
                "high_pitched",
                "energetic",
                "punk_influenced",
                "experimental",
            ]),
            typical_bpm: (140, 180),
            vocal_effects: strings(&["pitch_shift", "reverb", "delay", "distortion"]),
            genre: "Hip-Hop/Punk Rap".into(),
            style: StyleTraits::default(),
        },
        ArtistProfile {
            name: "Juice WRLD".into(),
            vocal_characteristics: strings(&["melodic", "emotional", "freestyle", "versatile"]),
            typical_bpm: (120, 150),
            vocal_effects: strings(&["autotune", "reverb", "compression", "eq"]),
            genre: "Hip-Hop/Emo Rap".into(),
            style: StyleTraits {
                autotune: true,
                ..Default::default()
            },
        },
        ArtistProfile {
            name: "Kanye West".into(),
            vocal_characteristics: strings(&[
                "soulful",
                "experimental",
                "pitched_vocals",
                "innovative",
            ]),
            typical_bpm: (90, 140),
            vocal_effects: strings(&["pitch_shift", "vocoder", "reverb", "compression"]),
            genre: "Hip-Hop/Experimental".into(),
            style: StyleTraits {
                delay: true,
                ..Default::default()
            },
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table() {
        let db = ArtistDatabase::default();
        assert_eq!(db.len(), 8);
        let travis = db.get("travis scott").unwrap();
        assert!(travis.style.psychedelic);
        assert_eq!(travis.style.reverb, Some(ReverbType::Hall));
        assert_eq!(
            travis.recommended_effects(),
            vec!["heavy_autotune", "reverb", "phaser"]
        );
    }

    #[test]
    fn test_only_one_psychedelic_artist() {
        let db = ArtistDatabase::default();
        let psychedelic: Vec<&str> = db
            .artists()
            .iter()
            .filter(|a| a.style.psychedelic)
            .map(|a| a.name.as_str())
            .collect();
        assert_eq!(psychedelic, vec!["Travis Scott"]);
    }

    #[test]
    fn test_bpm_range_inclusive() {
        let db = ArtistDatabase::default();
        let travis = db.get("Travis Scott").unwrap();
        assert!(travis.bpm_in_range(130));
        assert!(travis.bpm_in_range(140));
        assert!(travis.bpm_in_range(160));
        assert!(!travis.bpm_in_range(129));
        assert!(!travis.bpm_in_range(161));
    }

    #[test]
    fn test_custom_artist_added_and_override() {
        let custom = vec![
            CustomArtistConfig {
                name: "SZA".into(),
                genre: "R&B".into(),
                typical_bpm: (140, 70),
                vocal_effects: strings(&["reverb", "chorus", "delay"]),
                vocal_characteristics: vec![],
                style: StyleTraits::default(),
            },
            CustomArtistConfig {
                name: "drake".into(),
                genre: "Hip-Hop".into(),
                typical_bpm: (95, 120),
                vocal_effects: strings(&["eq"]),
                vocal_characteristics: vec![],
                style: StyleTraits {
                    delay: true,
                    ..Default::default()
                },
            },
        ];
        let db = ArtistDatabase::new(&custom);
        assert_eq!(db.len(), 9);

        let sza = db.get("SZA").unwrap();
        assert_eq!(sza.typical_bpm, (70, 140));

        let drake = db.get("Drake").unwrap();
        assert_eq!(drake.genre, "Hip-Hop");
        assert!(drake.style.delay);
        assert_eq!(drake.style.reverb, None);
    }

    #[test]
    fn test_custom_artist_from_toml() {
        let toml_str = r#"
            name = "Bon Iver"
            genre = "Indie Folk"
            typical_bpm = [70, 110]
            vocal_effects = ["vocoder", "reverb", "harmony"]

            [style]
            autotune = true
            reverb = "plate"
        "#;
        let custom: CustomArtistConfig = toml::from_str(toml_str).unwrap();
        let profile = ArtistProfile::from(&custom);
        assert_eq!(profile.typical_bpm, (70, 110));
        assert!(profile.style.autotune);
        assert_eq!(profile.style.reverb, Some(ReverbType::Plate));
        assert!(!profile.style.delay);
    }
}
