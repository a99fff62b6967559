//! `osqa-config profile`: board profile listing, description, and validation.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use osqa_codegen::Generator;
use osqa_params::{BoardProfile, DerivedValues, ParamValue, ProfileRef};
use serde::Serialize;

use super::{print_json, OutputFormat};
use crate::manifest::Project;

/// List every profile in the profiles directory.
pub fn list(project: &Project) -> Result<()> {
    let dir = project.profiles_dir();
    let results = Generator::osqa()
        .validate_all(&dir)
        .with_context(|| format!("reading profiles directory {}", dir.display()))?;
    if results.is_empty() {
        println!("No profiles found in {}", dir.display());
        return Ok(());
    }

    let active = project.manifest.profile.active.as_deref();
    println!("Profiles in {}:", dir.display());
    println!();
    for (name, result) in results {
        let marker = if Some(name.as_str()) == active {
            "*"
        } else {
            " "
        };
        let summary = match result {
            Ok((profile, _)) => profile.description.unwrap_or_default(),
            Err(e) => format!("invalid: {:#}", anyhow::Error::new(e)),
        };
        println!("{marker} {name:<24} {summary}");
    }
    println!();
    println!("Use 'osqa-config profile describe <name>' for details.");
    Ok(())
}

#[derive(Serialize)]
struct Description<'a> {
    name: &'a str,
    description: Option<&'a str>,
    source: &'a Path,
    extends: &'a [String],
    parameters: BTreeMap<&'a str, &'a ParamValue>,
    derived: &'a DerivedValues,
}

/// Show a profile's parameters and derived values.
pub fn describe(project: &Project, id: &str, format: OutputFormat) -> Result<()> {
    let generator = Generator::osqa();
    let reference = ProfileRef::parse(id);
    let (profile, derived) = generator.prepare(&project.profiles_dir(), &reference)?;

    match format {
        OutputFormat::Json => print_json(&Description {
            name: &profile.name,
            description: profile.description.as_deref(),
            source: &profile.source,
            extends: &profile.bases,
            parameters: profile.parameters.iter().collect(),
            derived: &derived,
        }),
        OutputFormat::Text => {
            print_description(&generator, &profile, &derived);
            Ok(())
        }
    }
}

fn print_description(generator: &Generator, profile: &BoardProfile, derived: &DerivedValues) {
    println!("=== Profile: {} ===", profile.name);
    if let Some(description) = &profile.description {
        println!("{description}");
    }
    println!("Source:  {}", profile.source.display());
    if !profile.bases.is_empty() {
        println!("Extends: {}", profile.bases.join(" -> "));
    }
    println!();

    println!("--- Parameters ---");
    for spec in generator.schema().iter() {
        if let Some(value) = profile.parameters.get(spec.name) {
            println!("  {:<28} = {value}", spec.name);
        }
    }
    println!();

    println!("--- Derived ---");
    for (name, value) in derived.iter() {
        println!("  {name:<28} = {value} ({value:#x})");
    }
}

/// Validate one profile, the active one, or every discovered profile.
pub fn validate(project: &Project, id: Option<&str>, all: bool) -> Result<()> {
    let generator = Generator::osqa();
    let dir = project.profiles_dir();

    if !all {
        let reference = project.profile_ref(id)?;
        let (profile, _) = generator.prepare(&dir, &reference)?;
        println!("ok   {}", profile.name);
        return Ok(());
    }

    let results = generator
        .validate_all(&dir)
        .with_context(|| format!("reading profiles directory {}", dir.display()))?;
    if results.is_empty() {
        bail!("no profiles found in {}", dir.display());
    }

    let total = results.len();
    let mut failed = 0;
    for (name, result) in results {
        match result {
            Ok(_) => println!("ok   {name}"),
            Err(e) => {
                failed += 1;
                println!("FAIL {name}: {:#}", anyhow::Error::new(e));
            }
        }
    }

    if failed > 0 {
        bail!("{failed} of {total} profile(s) failed validation");
    }
    Ok(())
}
