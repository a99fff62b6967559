//! `osqa-config generate`: regenerate every artifact from one profile.

use std::path::Path;

use anyhow::{bail, Result};
use osqa_codegen::{ArtifactStatus, Generator, RunMode, RunReport, RunRequest};

use super::{print_json, OutputFormat};
use crate::manifest::Project;

pub fn run(
    project: &Project,
    profile: Option<&str>,
    check: bool,
    format: OutputFormat,
) -> Result<()> {
    let request = RunRequest {
        profiles_dir: project.profiles_dir(),
        profile: project.profile_ref(profile)?,
        layout: project.layout()?,
        mode: if check {
            RunMode::Check
        } else {
            RunMode::Write
        },
    };
    let report = Generator::osqa().run(&request)?;

    match format {
        OutputFormat::Text => print_text(&project.root, &report),
        OutputFormat::Json => print_json(&report)?,
    }

    if !report.is_clean() {
        let stale = report
            .artifacts
            .iter()
            .filter(|a| a.status == ArtifactStatus::Stale)
            .count();
        bail!(
            "{stale} artifact(s) out of date for profile '{}'; run `osqa-config generate`",
            report.profile
        );
    }
    Ok(())
}

fn print_text(root: &Path, report: &RunReport) {
    for line in text_lines(root, report) {
        println!("{line}");
    }
}

/// One line per artifact, whatever its status, with paths relative to `root`.
fn text_lines(root: &Path, report: &RunReport) -> Vec<String> {
    report
        .artifacts
        .iter()
        .map(|outcome| {
            let path = outcome.path.strip_prefix(root).unwrap_or(&outcome.path);
            let label = match outcome.status {
                ArtifactStatus::Written => "wrote",
                ArtifactStatus::Unchanged => "unchanged",
                ArtifactStatus::UpToDate => "up to date",
                ArtifactStatus::Stale => "stale",
            };
            format!("{label}: {}", path.display())
        })
        .collect()
}
