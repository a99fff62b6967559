//! `osqa.toml` manifest parsing and project configuration.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use osqa_codegen::{ArtifactKind, OutputLayout};
use osqa_params::ProfileRef;
use serde::Deserialize;

/// File name searched for when locating the project root.
pub const MANIFEST_FILE: &str = "osqa.toml";

/// The top-level manifest structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OsqaManifest {
    #[serde(default)]
    pub profile: ProfileConfig,
    /// Per-artifact output path overrides, keyed by artifact name.
    #[serde(default)]
    pub outputs: BTreeMap<String, PathBuf>,
}

/// `[profile]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileConfig {
    /// Profile used when `--profile` is not given.
    #[serde(default)]
    pub active: Option<String>,
    /// Profiles directory, relative to the project root.
    #[serde(default = "default_directory")]
    pub directory: PathBuf,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            active: None,
            directory: default_directory(),
        }
    }
}

fn default_directory() -> PathBuf {
    PathBuf::from("profiles")
}

impl OsqaManifest {
    /// Search upward from `start_dir` for an `osqa.toml` file, parse and return it
    /// along with the directory it was found in.
    pub fn find_and_load(start_dir: &Path) -> Result<Option<(Self, PathBuf)>> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let candidate = dir.join(MANIFEST_FILE);
            if candidate.is_file() {
                let content = std::fs::read_to_string(&candidate)
                    .with_context(|| format!("reading {}", candidate.display()))?;
                let manifest: OsqaManifest = toml::from_str(&content)
                    .with_context(|| format!("parsing {}", candidate.display()))?;
                return Ok(Some((manifest, dir)));
            }
            if !dir.pop() {
                break;
            }
        }
        Ok(None)
    }

    /// Parse a manifest from a TOML string.
    #[cfg(test)]
    pub fn from_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("parsing osqa.toml")
    }

    /// Output overrides with artifact names checked.
    pub fn output_overrides(&self) -> Result<Vec<(ArtifactKind, &Path)>> {
        let mut overrides = Vec::with_capacity(self.outputs.len());
        for (name, path) in &self.outputs {
            let Some(kind) = ArtifactKind::parse(name) else {
                let known: Vec<&str> = ArtifactKind::ALL.iter().map(|k| k.name()).collect();
                bail!(
                    "unknown artifact '{name}' in [outputs] of {MANIFEST_FILE}; expected one of: {}",
                    known.join(", ")
                );
            };
            overrides.push((kind, path.as_path()));
        }
        Ok(overrides)
    }
}

/// The project a command runs in: its root directory and manifest, if any.
///
/// Without a manifest the working directory is the root and defaults apply.
#[derive(Debug, Clone)]
pub struct Project {
    pub root: PathBuf,
    pub manifest: OsqaManifest,
    /// Whether `osqa.toml` was found.
    pub has_manifest: bool,
}

impl Project {
    pub fn discover(cwd: &Path) -> Result<Self> {
        Ok(match OsqaManifest::find_and_load(cwd)? {
            Some((manifest, root)) => Self {
                root,
                manifest,
                has_manifest: true,
            },
            None => Self {
                root: cwd.to_path_buf(),
                manifest: OsqaManifest::default(),
                has_manifest: false,
            },
        })
    }

    pub fn profiles_dir(&self) -> PathBuf {
        self.root.join(&self.manifest.profile.directory)
    }

    pub fn layout(&self) -> Result<OutputLayout> {
        let mut layout = OutputLayout::new(&self.root);
        for (kind, path) in self.manifest.output_overrides()? {
            layout = layout.with_override(kind, path);
        }
        Ok(layout)
    }

    /// The profile to use: the explicit one, else `[profile] active`.
    ///
    /// Paths from the command line are relative to the working directory;
    /// paths from the manifest are relative to the project root.
    pub fn profile_ref(&self, explicit: Option<&str>) -> Result<ProfileRef> {
        if let Some(id) = explicit {
            return Ok(ProfileRef::parse(id));
        }
        match self.manifest.profile.active.as_deref() {
            Some(id) => Ok(match ProfileRef::parse(id) {
                ProfileRef::Path(path) if path.is_relative() => {
                    ProfileRef::Path(self.root.join(path))
                }
                other => other,
            }),
            None if self.has_manifest => bail!(
                "no profile selected: pass --profile <name> or set [profile] active in {MANIFEST_FILE}"
            ),
            None => bail!(
                "no {MANIFEST_FILE} found in {} or its parents: pass --profile <name>",
                self.root.display()
            ),
        }
    }
}
