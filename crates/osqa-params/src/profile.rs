//! Board profile loading, `extends` resolution, and discovery.
//!
//! Profiles are stored as `<name>.toml` files in a profiles directory
//! (`profiles/` by default). A profile may name a base profile with
//! `extends`; the base's parameters are loaded first and the profile's own
//! `[parameters]` entries override them one by one. The merged table must
//! bind every schema name.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{ParamError, Result};
use crate::schema::Schema;
use crate::set::ParameterSet;

/// Identifies a board profile: a bare name looked up in the profiles
/// directory, or an explicit path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileRef {
    Name(String),
    Path(PathBuf),
}

impl ProfileRef {
    /// Anything containing a path separator or ending in `.toml` is a path.
    pub fn parse(s: &str) -> Self {
        if s.contains('/') || s.contains(std::path::MAIN_SEPARATOR) || s.ends_with(".toml") {
            ProfileRef::Path(PathBuf::from(s))
        } else {
            ProfileRef::Name(s.to_string())
        }
    }

    /// File path of this profile. Names resolve inside `profiles_dir`; relative
    /// paths resolve against `base`.
    pub fn resolve(&self, profiles_dir: &Path, base: &Path) -> PathBuf {
        match self {
            ProfileRef::Name(name) => profiles_dir.join(format!("{name}.toml")),
            ProfileRef::Path(path) if path.is_absolute() => path.clone(),
            ProfileRef::Path(path) => base.join(path),
        }
    }
}

impl fmt::Display for ProfileRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileRef::Name(name) => write!(f, "{name}"),
            ProfileRef::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// On-disk shape of a profile file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProfileFile {
    /// Defaults to the file stem.
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    extends: Option<String>,
    #[serde(default)]
    parameters: toml::Table,
}

/// A fully resolved board profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardProfile {
    /// Profile name (e.g., "tang_nano_20k").
    pub name: String,
    /// Free-form description.
    pub description: Option<String>,
    /// File the profile was loaded from.
    pub source: PathBuf,
    /// Names of the profiles this one extends, nearest first.
    pub bases: Vec<String>,
    /// Validated parameters after overrides.
    pub parameters: ParameterSet,
}

/// Load a profile, resolve its `extends` chain, and validate it against `schema`.
///
/// `profiles_dir` is where bare names are looked up; relative paths resolve
/// against the current directory for the requested profile and against the
/// extending file's directory for bases.
pub fn load_profile(
    profiles_dir: &Path,
    reference: &ProfileRef,
    schema: &Schema,
) -> Result<BoardProfile> {
    let mut chain: Vec<(String, PathBuf, ProfileFile)> = Vec::new();
    let mut seen: Vec<PathBuf> = Vec::new();
    let mut next = Some(reference.resolve(profiles_dir, Path::new("")));

    while let Some(path) = next.take() {
        let file = read_profile_file(&path)?;
        let name = profile_name(&file, &path);

        let key = path.canonicalize().unwrap_or_else(|_| path.clone());
        if seen.contains(&key) {
            let mut names: Vec<String> = chain.iter().map(|(n, _, _)| n.clone()).collect();
            names.push(name);
            return Err(ParamError::ExtendsCycle { chain: names });
        }
        seen.push(key);

        if let Some(base) = &file.extends {
            let from = path.parent().unwrap_or_else(|| Path::new(""));
            next = Some(ProfileRef::parse(base).resolve(profiles_dir, from));
        }
        chain.push((name, path, file));
    }

    // Base first, so nearer profiles override.
    let mut merged = toml::Table::new();
    for (name, _, file) in chain.iter().rev() {
        for (key, value) in &file.parameters {
            if merged.insert(key.clone(), value.clone()).is_some() {
                debug!(profile = %name, parameter = %key, "override");
            }
        }
    }

    let mut chain = chain.into_iter();
    let Some((name, source, top)) = chain.next() else {
        return Err(ParamError::NotFound {
            path: reference.resolve(profiles_dir, Path::new("")),
        });
    };
    let bases = chain.map(|(n, _, _)| n).collect();
    let parameters = ParameterSet::from_table(schema, &name, &merged)?;
    debug!(profile = %name, source = %source.display(), count = parameters.len(), "loaded profile");

    Ok(BoardProfile {
        name,
        description: top.description,
        source,
        bases,
        parameters,
    })
}

fn read_profile_file(path: &Path) -> Result<ProfileFile> {
    if !path.is_file() {
        return Err(ParamError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|source| ParamError::Toml {
        path: path.to_path_buf(),
        source,
    })
}

fn profile_name(file: &ProfileFile, path: &Path) -> String {
    file.name.clone().unwrap_or_else(|| {
        path.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    })
}

/// Discover all `.toml` profiles in `profiles_dir`.
///
/// Returns (profile_name, file_path) pairs sorted by name.
pub fn discover_profiles(profiles_dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    if !profiles_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut profiles = Vec::new();
    for entry in std::fs::read_dir(profiles_dir)? {
        let path = entry?.path();
        if let Some(stem) = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.strip_suffix(".toml"))
        {
            profiles.push((stem.to_string(), path.clone()));
        }
    }
    profiles.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(profiles)
}
