pub mod analyzer;
pub mod artists;
pub mod config;
pub mod fx;
pub mod intake;
pub mod matcher;
pub mod pipeline;
pub mod sampling;

/// Audio file extensions accepted for analysis
pub const SUPPORTED_EXTENSIONS: &[&str] = &["mp3", "wav", "m4a", "flac", "aac"];

/// Upload limit used when the config file doesn't set one
pub const DEFAULT_MAX_UPLOAD_MB: u64 = 50;

/// Application name for XDG paths
pub const APP_NAME: &str = "arisyn";
