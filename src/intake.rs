//! Upload boundary: which files get analyzed, and how failures are reported.
//!
//! The core pipeline only needs a readable path. Everything here belongs to
//! whatever front end hands files to it (the CLI today): extension and size
//! checks, directory expansion, and the `{"error", "message"}` envelope.

use crate::SUPPORTED_EXTENSIONS;
use crate::pipeline::PipelineError;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("Unsupported file type '{extension}' (allowed: {})", SUPPORTED_EXTENSIONS.join(", "))]
    UnsupportedFormat { extension: String },
    #[error("File is {size} bytes, limit is {limit} bytes")]
    TooLarge { size: u64, limit: u64 },
    #[error("Cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Lowercased file extension, or an empty string.
fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

pub fn is_supported(path: &Path) -> bool {
    SUPPORTED_EXTENSIONS.contains(&extension_of(path).as_str())
}

/// Check extension and size. Returns the size in bytes.
pub fn validate_upload(path: &Path, max_bytes: u64) -> Result<u64, IntakeError> {
    if !is_supported(path) {
        return Err(IntakeError::UnsupportedFormat {
            extension: extension_of(path),
        });
    }

    let size = std::fs::metadata(path)
        .map_err(|source| IntakeError::Io {
            path: path.display().to_string(),
            source,
        })?
        .len();

    if size > max_bytes {
        return Err(IntakeError::TooLarge {
            size,
            limit: max_bytes,
        });
    }

    Ok(size)
}

/// Expand the given paths into a list of files to analyze.
///
/// Directories are walked recursively and only supported audio files are
/// kept. Paths given explicitly are kept as-is so that validation can report
/// on them.
pub fn collect_audio_files(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for path in paths {
        if !path.is_dir() {
            files.push(path.clone());
            continue;
        }

        let mut found: Vec<PathBuf> = WalkDir::new(path)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file() && is_supported(e.path()))
            .map(|e| e.into_path())
            .collect();
        found.sort();

        log::debug!("Found {} audio files under {}", found.len(), path.display());
        files.extend(found);
    }

    files
}

/// Error body handed back to the caller: `{"error": <kind>, "message": <text>}`.
/// `status` is the HTTP-style code a web front end would answer with.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorEnvelope {
    pub error: String,
    pub message: String,
    #[serde(skip)]
    pub status: u16,
}

impl From<&IntakeError> for ErrorEnvelope {
    fn from(e: &IntakeError) -> Self {
        let (kind, status) = match e {
            IntakeError::UnsupportedFormat { .. } => ("unsupported_format", 400),
            IntakeError::TooLarge { .. } => ("file_too_large", 413),
            IntakeError::Io { .. } => ("input_error", 400),
        };
        Self {
            error: kind.to_string(),
            message: e.to_string(),
            status,
        }
    }
}

impl From<&PipelineError> for ErrorEnvelope {
    fn from(e: &PipelineError) -> Self {
        let status = match e {
            PipelineError::Analyze(_) => 400,
            _ => 500,
        };
        Self {
            error: e.kind().to_string(),
            message: e.to_string(),
            status,
        }
    }
}
