//! The generation pass.
//!
//! One run loads the explicitly named profile, evaluates the derivation rules
//! once, renders every artifact from that single set of values, and only then
//! touches the filesystem. If any artifact fails to render nothing is written.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use osqa_params::profile::{discover_profiles, load_profile};
use osqa_params::{BoardProfile, DerivationEngine, DerivedValues, ProfileRef, Schema};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::emit::ArtifactKind;
use crate::error::{EmitError, GenerateError, Result};
use crate::template::RenderContext;
use crate::write::{is_up_to_date, write_if_changed};

/// Where each artifact goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    root: PathBuf,
    overrides: BTreeMap<ArtifactKind, PathBuf>,
}

impl OutputLayout {
    /// Default paths under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            overrides: BTreeMap::new(),
        }
    }

    /// Place `kind` at `path` (relative to the root unless absolute).
    pub fn with_override(mut self, kind: ArtifactKind, path: impl Into<PathBuf>) -> Self {
        self.overrides.insert(kind, path.into());
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Destination of one artifact.
    pub fn path(&self, kind: ArtifactKind) -> PathBuf {
        match self.overrides.get(&kind) {
            Some(path) => self.root.join(path),
            None => self.root.join(kind.default_path()),
        }
    }
}

/// Whether a run writes files or only compares them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    #[default]
    Write,
    /// Report stale artifacts without writing.
    Check,
}

/// Everything one run needs. The profile is always named explicitly.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub profiles_dir: PathBuf,
    pub profile: ProfileRef,
    pub layout: OutputLayout,
    pub mode: RunMode,
}

/// What happened to one artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactStatus {
    Written,
    /// Already held the rendered bytes; left untouched.
    Unchanged,
    /// Check mode: file matches.
    UpToDate,
    /// Check mode: file is missing or differs.
    Stale,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactOutcome {
    pub kind: ArtifactKind,
    pub path: PathBuf,
    pub status: ArtifactStatus,
}

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub profile: String,
    pub derived: DerivedValues,
    pub artifacts: Vec<ArtifactOutcome>,
}

impl RunReport {
    /// Paths written in this run.
    pub fn written(&self) -> impl Iterator<Item = &Path> {
        self.artifacts
            .iter()
            .filter(|a| a.status == ArtifactStatus::Written)
            .map(|a| a.path.as_path())
    }

    /// No artifact is stale.
    pub fn is_clean(&self) -> bool {
        self.artifacts
            .iter()
            .all(|a| a.status != ArtifactStatus::Stale)
    }
}

/// The run controller.
#[derive(Debug, Clone)]
pub struct Generator {
    schema: Schema,
    engine: DerivationEngine,
}

impl Generator {
    pub fn new(schema: Schema, engine: DerivationEngine) -> Self {
        Self { schema, engine }
    }

    /// osqa schema and derivation rules.
    pub fn osqa() -> Self {
        Self::new(Schema::osqa(), DerivationEngine::osqa())
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Load a profile and evaluate its derived values.
    pub fn prepare(
        &self,
        profiles_dir: &Path,
        reference: &ProfileRef,
    ) -> Result<(BoardProfile, DerivedValues)> {
        let profile = load_profile(profiles_dir, reference, &self.schema)?;
        let derived = self.engine.evaluate(&profile.parameters)?;
        Ok((profile, derived))
    }

    /// Load and derive every discovered profile.
    ///
    /// A profile passes only if it binds the full schema and every rule
    /// evaluates. One broken profile does not stop the others from being
    /// checked.
    pub fn validate_all(
        &self,
        profiles_dir: &Path,
    ) -> Result<Vec<(String, Result<(BoardProfile, DerivedValues)>)>> {
        let discovered = discover_profiles(profiles_dir)?;
        Ok(discovered
            .into_iter()
            .map(|(name, path)| {
                let result = self.prepare(profiles_dir, &ProfileRef::Path(path));
                (name, result)
            })
            .collect())
    }

    /// Render every artifact from one set of values.
    ///
    /// Every artifact is attempted; on failure the error lists each failing
    /// artifact together with those that rendered.
    pub fn render_all(
        &self,
        profile: &BoardProfile,
        derived: &DerivedValues,
        source: &str,
    ) -> Result<Vec<(ArtifactKind, String)>> {
        let ctx = RenderContext::new(profile, derived, source);
        let mut rendered = Vec::new();
        let mut failures: Vec<EmitError> = Vec::new();

        for kind in ArtifactKind::ALL {
            match kind.template().render(&ctx) {
                Ok(text) => {
                    debug!(artifact = %kind, bytes = text.len(), "rendered");
                    rendered.push((kind, text));
                }
                Err(e) => failures.push(e),
            }
        }

        if failures.is_empty() {
            Ok(rendered)
        } else {
            Err(GenerateError::Render {
                failures,
                rendered: rendered.into_iter().map(|(kind, _)| kind).collect(),
            })
        }
    }

    /// Run one full generation pass.
    pub fn run(&self, request: &RunRequest) -> Result<RunReport> {
        let (profile, derived) = self.prepare(&request.profiles_dir, &request.profile)?;
        let source = banner_source(&profile.source, request.layout.root());
        let rendered = self.render_all(&profile, &derived, &source)?;

        let mut artifacts = Vec::with_capacity(rendered.len());
        let mut written = Vec::new();
        for (kind, text) in rendered {
            let path = request.layout.path(kind);
            let status = match request.mode {
                RunMode::Write => match write_if_changed(&path, &text) {
                    Ok(true) => {
                        info!(artifact = %kind, path = %path.display(), "wrote");
                        written.push(path.clone());
                        ArtifactStatus::Written
                    }
                    Ok(false) => {
                        debug!(artifact = %kind, path = %path.display(), "unchanged");
                        ArtifactStatus::Unchanged
                    }
                    Err(source) => {
                        return Err(GenerateError::Write {
                            path,
                            written,
                            source,
                        })
                    }
                },
                RunMode::Check => match is_up_to_date(&path, &text) {
                    Ok(true) => ArtifactStatus::UpToDate,
                    Ok(false) => {
                        warn!(artifact = %kind, path = %path.display(), "stale");
                        ArtifactStatus::Stale
                    }
                    Err(source) => {
                        return Err(GenerateError::Write {
                            path,
                            written,
                            source,
                        })
                    }
                },
            };
            artifacts.push(ArtifactOutcome { kind, path, status });
        }

        Ok(RunReport {
            profile: profile.name,
            derived,
            artifacts,
        })
    }
}

/// Profile path as shown in banners: relative to the project root when
/// possible, with `/` separators, so output does not depend on where the
/// project is checked out.
fn banner_source(source: &Path, root: &Path) -> String {
    let relative = source.strip_prefix(root).unwrap_or(source);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
