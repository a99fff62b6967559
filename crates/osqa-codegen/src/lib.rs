//! Code generation for osqa board configuration.
//!
//! Turns one board profile and its derived values into the four artifacts
//! consumed by the firmware, the emulator, and the hardware design.
//!
//! ## Modules
//!
//! - [`literal`]: integer literal encoders and decoders per target syntax
//! - [`template`]: declarative text/value templates and the banner
//! - [`emit`]: the four artifact templates and the fixed memory map
//! - [`generate`]: the run controller: load, derive once, render, write
//! - [`write`]: atomic artifact replacement

pub mod emit;
pub mod error;
pub mod generate;
pub mod literal;
pub mod template;
pub mod write;

#[cfg(test)]
mod testutil;

pub use emit::ArtifactKind;
pub use error::{EmitError, GenerateError, LiteralError};
pub use generate::{
    ArtifactOutcome, ArtifactStatus, Generator, OutputLayout, RunMode, RunReport, RunRequest,
};
pub use literal::{decode, encode, LiteralStyle};
pub use template::{RenderContext, Segment, Source, Template};
