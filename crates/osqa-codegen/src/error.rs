//! Code generation errors.

use std::path::PathBuf;

use osqa_params::{DeriveError, ParamError};
use thiserror::Error;

use crate::emit::ArtifactKind;
use crate::literal::LiteralStyle;

/// Errors from encoding or decoding a single literal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LiteralError {
    #[error("value {value} ({value:#x}) does not fit in {bits} bits ({style} literal)")]
    EncodingRange {
        /// Saturates at `u64::MAX` for decoded text wider than 64 bits.
        value: u64,
        bits: u32,
        style: LiteralStyle,
    },

    #[error("literal width must be 1..=64 bits, got {bits}")]
    InvalidWidth { bits: u32 },

    #[error("malformed {style} literal '{text}': {detail}")]
    Malformed {
        text: String,
        style: LiteralStyle,
        detail: String,
    },
}

/// Errors from rendering one artifact.
#[derive(Debug, Error)]
pub enum EmitError {
    #[error("{artifact}: cannot encode {label}: {source}")]
    EncodingRange {
        artifact: ArtifactKind,
        label: String,
        #[source]
        source: LiteralError,
    },

    #[error("{artifact}: no derived value named {name}")]
    UnknownSource {
        artifact: ArtifactKind,
        name: String,
    },

    #[error("{artifact}: {source}")]
    Param {
        artifact: ArtifactKind,
        #[source]
        source: ParamError,
    },
}

impl EmitError {
    /// Artifact whose rendering failed.
    pub fn artifact(&self) -> ArtifactKind {
        match self {
            EmitError::EncodingRange { artifact, .. }
            | EmitError::UnknownSource { artifact, .. }
            | EmitError::Param { artifact, .. } => *artifact,
        }
    }
}

/// Errors that abort a generation run.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Profile(#[from] ParamError),

    #[error(transparent)]
    Derive(#[from] DeriveError),

    /// At least one artifact failed to render; nothing was written.
    #[error("{}", render_summary(failures, rendered))]
    Render {
        failures: Vec<EmitError>,
        /// Artifacts that rendered without error.
        rendered: Vec<ArtifactKind>,
    },

    /// Writing an artifact failed. `written` lists artifacts already replaced
    /// in this run.
    #[error("cannot write {}{}", path.display(), written_summary(written))]
    Write {
        path: PathBuf,
        written: Vec<PathBuf>,
        #[source]
        source: std::io::Error,
    },
}

fn render_summary(failures: &[EmitError], rendered: &[ArtifactKind]) -> String {
    let failed: Vec<String> = failures.iter().map(ToString::to_string).collect();
    let ok: Vec<&str> = rendered.iter().map(|k| k.name()).collect();
    let ok = if ok.is_empty() {
        "none".to_string()
    } else {
        ok.join(", ")
    };
    format!(
        "{} artifact(s) failed to render, nothing written: {}; rendered: {ok}",
        failures.len(),
        failed.join("; ")
    )
}

fn written_summary(written: &[PathBuf]) -> String {
    if written.is_empty() {
        return String::new();
    }
    let paths: Vec<String> = written.iter().map(|p| p.display().to_string()).collect();
    format!(" (already regenerated: {})", paths.join(", "))
}

/// Result type alias for generation runs.
pub type Result<T> = std::result::Result<T, GenerateError>;
