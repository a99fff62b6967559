//! Declarative artifact templates.
//!
//! A template is an ordered list of static text and encoded values. Rendering
//! prefixes the machine-generated banner; templates never format values
//! themselves, they only name a source, a literal style, and a width.

use osqa_params::{BoardProfile, DerivedValues, ParameterSet};

use crate::emit::ArtifactKind;
use crate::error::EmitError;
use crate::literal::{encode, LiteralStyle};

/// Where a rendered value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// An unsigned profile parameter.
    Param(&'static str),
    /// A derived value.
    Derived(&'static str),
    /// A fixed hardware-defined constant.
    Const(u64),
}

/// One piece of a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(&'static str),
    Value {
        /// Name used in diagnostics.
        label: &'static str,
        source: Source,
        style: LiteralStyle,
        bits: u32,
    },
}

/// Read-only inputs shared by every template in a run.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    /// Profile name, shown in the banner.
    pub profile: &'a str,
    /// Authoritative source shown in the banner (the profile file).
    pub source: &'a str,
    pub params: &'a ParameterSet,
    pub derived: &'a DerivedValues,
}

impl<'a> RenderContext<'a> {
    pub fn new(profile: &'a BoardProfile, derived: &'a DerivedValues, source: &'a str) -> Self {
        Self {
            profile: &profile.name,
            source,
            params: &profile.parameters,
            derived,
        }
    }
}

/// A complete artifact body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub kind: ArtifactKind,
    /// Line comment leader of the target language.
    pub comment: &'static str,
    pub segments: Vec<Segment>,
}

impl Template {
    pub fn new(kind: ArtifactKind, comment: &'static str) -> Self {
        Self {
            kind,
            comment,
            segments: Vec::new(),
        }
    }

    /// Append static text.
    pub fn text(mut self, text: &'static str) -> Self {
        self.segments.push(Segment::Text(text));
        self
    }

    /// Append an encoded value.
    pub fn value(
        mut self,
        label: &'static str,
        source: Source,
        style: LiteralStyle,
        bits: u32,
    ) -> Self {
        self.segments.push(Segment::Value {
            label,
            source,
            style,
            bits,
        });
        self
    }

    /// First line of every artifact. Holds no timestamp so reruns are byte-identical.
    pub fn banner(&self, ctx: &RenderContext<'_>) -> String {
        format!(
            "{} generated - do not edit (profile `{}` from `{}`; regenerate with `osqa-config`)\n",
            self.comment, ctx.profile, ctx.source
        )
    }

    /// Render the banner followed by every segment.
    pub fn render(&self, ctx: &RenderContext<'_>) -> Result<String, EmitError> {
        let mut out = self.banner(ctx);
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Value {
                    label,
                    source,
                    style,
                    bits,
                } => {
                    let value = self.resolve(*source, ctx)?;
                    let literal = encode(value, *style, *bits).map_err(|source| {
                        EmitError::EncodingRange {
                            artifact: self.kind,
                            label: label.to_string(),
                            source,
                        }
                    })?;
                    out.push_str(&literal);
                }
            }
        }
        Ok(out)
    }

    fn resolve(&self, source: Source, ctx: &RenderContext<'_>) -> Result<u64, EmitError> {
        match source {
            Source::Param(name) => ctx.params.uint(name).map_err(|source| EmitError::Param {
                artifact: self.kind,
                source,
            }),
            Source::Derived(name) => {
                ctx.derived
                    .get(name)
                    .ok_or_else(|| EmitError::UnknownSource {
                        artifact: self.kind,
                        name: name.to_string(),
                    })
            }
            Source::Const(value) => Ok(value),
        }
    }
}
