//! Errors of the pluggable collaborators.
//!
//! None of them escapes [`crate::compute`] or [`crate::Engine::compute`]:
//! the engine logs them and falls back (name lookup) or drops the
//! action (speech).

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Failure of a [`crate::naming::NameResolver`].
#[derive(Debug, Error)]
pub enum LookupError {
    /// The hex code is not of the form `#RRGGBB` or `RRGGBB`.
    #[error("invalid hex color “{0}” (expected 6 hex digits)")]
    InvalidHex(String),

    /// Transport, timeout or HTTP status failure.
    #[error("color name request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The response did not carry a usable color name.
    #[error("unusable color name payload: {0}")]
    Payload(String),
}

/// Failure of a [`crate::speech::Speech`] backend.
#[derive(Debug, Error)]
pub enum SpeechError {
    /// The synthesis service could not produce audio.
    #[error("speech synthesis failed: {0}")]
    Synthesis(String),

    #[error("file I/O during speech failed: {0}")]
    Io(#[from] std::io::Error),

    /// A required executable (player, converter) is not on `PATH`.
    #[error("playback unavailable: {0}")]
    Unavailable(String),

    #[error("command “{program}” failed ({status})")]
    Command { program: String, status: ExitStatus },

    #[error("unsupported platform for playback: {0}")]
    UnsupportedPlatform(String),
}

/// Failure to load a [`crate::Config`] from disk.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path:?}: {source}")]
    Io { path: PathBuf, source: std::io::Error },

    #[error("invalid config {path:?}: {source}")]
    Json { path: PathBuf, source: serde_json::Error },
}
