//! End-to-end generation runs against a scratch project directory.

use std::fs;
use std::path::{Path, PathBuf};

use osqa_codegen::{
    decode, ArtifactKind, ArtifactStatus, GenerateError, Generator, LiteralStyle, OutputLayout,
    RunMode, RunRequest,
};
use osqa_params::{DeriveError, ParamError, ProfileRef};

const TANG_NANO_20K: &str = include_str!("../../../profiles/tang_nano_20k.toml");

/// A project root holding `profiles/tang_nano_20k.toml`, with `edit` applied
/// to the profile text.
fn project(edit: impl FnOnce(String) -> String) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let profiles = dir.path().join("profiles");
    fs::create_dir_all(&profiles).unwrap();
    fs::write(
        profiles.join("tang_nano_20k.toml"),
        edit(TANG_NANO_20K.to_string()),
    )
    .unwrap();
    dir
}

fn request(root: &Path, mode: RunMode) -> RunRequest {
    RunRequest {
        profiles_dir: root.join("profiles"),
        profile: ProfileRef::parse("tang_nano_20k"),
        layout: OutputLayout::new(root),
        mode,
    }
}

fn read_all(root: &Path) -> Vec<(ArtifactKind, String)> {
    ArtifactKind::ALL
        .into_iter()
        .map(|kind| {
            let path = root.join(kind.default_path());
            (kind, fs::read_to_string(path).unwrap())
        })
        .collect()
}

fn without_line(text: String, key: &str) -> String {
    text.lines()
        .filter(|line| !line.starts_with(key))
        .map(|line| format!("{line}\n"))
        .collect()
}

fn with_value(text: String, key: &str, value: &str) -> String {
    text.lines()
        .map(|line| {
            if line.starts_with(&format!("{key} ")) {
                format!("{key} = {value}\n")
            } else {
                format!("{line}\n")
            }
        })
        .collect()
}

/// Literal text following `prefix` on the first line containing it, up to
/// the terminator.
fn literal_after<'a>(text: &'a str, prefix: &str, terminator: char) -> &'a str {
    let line = text
        .lines()
        .find(|line| line.contains(prefix))
        .unwrap_or_else(|| panic!("no line with {prefix:?}"));
    let start = line.find(prefix).unwrap() + prefix.len();
    let rest = &line[start..];
    rest.split(terminator).next().unwrap().trim()
}

#[test]
fn writes_all_four_artifacts() {
    let dir = project(|s| s);
    let report = Generator::osqa()
        .run(&request(dir.path(), RunMode::Write))
        .unwrap();

    assert_eq!(report.profile, "tang_nano_20k");
    assert_eq!(report.derived.get("memory_end_address"), Some(0x0080_0000));
    assert_eq!(report.artifacts.len(), 4);
    assert!(report
        .artifacts
        .iter()
        .all(|a| a.status == ArtifactStatus::Written));
    let written: Vec<PathBuf> = report.written().map(Path::to_path_buf).collect();
    assert_eq!(written.len(), 4);

    let boot = fs::read_to_string(dir.path().join("os/src/os_start.S")).unwrap();
    assert!(boot.contains("    li sp, 0x800000\n"));
    let header = fs::read_to_string(dir.path().join("os/src/os_config.hpp")).unwrap();
    assert!(header.contains("#define MEMORY_END 0x0080'0000\n"));
    let hdl = fs::read_to_string(dir.path().join("src/configuration.sv")).unwrap();
    assert!(hdl.contains("  parameter int unsigned MEMORY_END_ADDRESS = 32'h00800000;\n"));
    assert!(hdl.contains("  parameter int unsigned CLOCK_FREQUENCY_HZ = 27000000;\n"));
}

#[test]
fn every_artifact_agrees_on_memory_end() {
    let dir = project(|s| s);
    Generator::osqa()
        .run(&request(dir.path(), RunMode::Write))
        .unwrap();

    let files = read_all(dir.path());
    let text = |kind: ArtifactKind| {
        files
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, t)| t.as_str())
            .unwrap()
    };

    let values = [
        decode(
            literal_after(text(ArtifactKind::BootStub), "li sp,", '\n'),
            LiteralStyle::AsmHex,
            32,
        ),
        decode(
            literal_after(text(ArtifactKind::NativeHeader), "#define MEMORY_END ", '\n'),
            LiteralStyle::CHex,
            32,
        ),
        decode(
            literal_after(text(ArtifactKind::NativeNamespace), "memory_end =", ';'),
            LiteralStyle::CHex,
            32,
        ),
        decode(
            literal_after(text(ArtifactKind::HdlPackage), "MEMORY_END_ADDRESS =", ';'),
            LiteralStyle::SizedHex,
            32,
        ),
    ];
    for value in values {
        assert_eq!(value.unwrap(), 8_388_608);
    }
}

#[test]
fn regeneration_is_byte_identical_and_untouched() {
    let dir = project(|s| s);
    let generator = Generator::osqa();
    generator.run(&request(dir.path(), RunMode::Write)).unwrap();
    let first = read_all(dir.path());

    let report = generator.run(&request(dir.path(), RunMode::Write)).unwrap();
    assert!(report
        .artifacts
        .iter()
        .all(|a| a.status == ArtifactStatus::Unchanged));
    assert_eq!(report.written().count(), 0);
    assert_eq!(read_all(dir.path()), first);
}

#[test]
fn separate_projects_produce_identical_output() {
    let a = project(|s| s);
    let b = project(|s| s);
    Generator::osqa()
        .run(&request(a.path(), RunMode::Write))
        .unwrap();
    Generator::osqa()
        .run(&request(b.path(), RunMode::Write))
        .unwrap();
    assert_eq!(read_all(a.path()), read_all(b.path()));
}

#[test]
fn profile_change_regenerates_only_dependent_artifacts() {
    let dir = project(|s| s);
    Generator::osqa()
        .run(&request(dir.path(), RunMode::Write))
        .unwrap();

    let profile = dir.path().join("profiles/tang_nano_20k.toml");
    let text = fs::read_to_string(&profile).unwrap();
    fs::write(&profile, with_value(text, "UART_BAUD_RATE", "9600")).unwrap();

    let report = Generator::osqa()
        .run(&request(dir.path(), RunMode::Write))
        .unwrap();
    for outcome in &report.artifacts {
        let expected = if outcome.kind == ArtifactKind::HdlPackage {
            ArtifactStatus::Written
        } else {
            ArtifactStatus::Unchanged
        };
        assert_eq!(outcome.status, expected, "{}", outcome.kind);
    }
}

#[test]
fn check_mode_reports_stale_then_clean() {
    let dir = project(|s| s);
    let generator = Generator::osqa();

    let report = generator.run(&request(dir.path(), RunMode::Check)).unwrap();
    assert!(!report.is_clean());
    assert!(!dir.path().join("os").exists());

    generator.run(&request(dir.path(), RunMode::Write)).unwrap();
    let report = generator.run(&request(dir.path(), RunMode::Check)).unwrap();
    assert!(report.is_clean());
    assert!(report
        .artifacts
        .iter()
        .all(|a| a.status == ArtifactStatus::UpToDate));

    fs::write(dir.path().join("src/configuration.sv"), "// edited\n").unwrap();
    let report = generator.run(&request(dir.path(), RunMode::Check)).unwrap();
    let stale: Vec<ArtifactKind> = report
        .artifacts
        .iter()
        .filter(|a| a.status == ArtifactStatus::Stale)
        .map(|a| a.kind)
        .collect();
    assert_eq!(stale, vec![ArtifactKind::HdlPackage]);
}

#[test]
fn missing_addressing_mode_fails_without_output() {
    let dir = project(|s| without_line(s, "RAM_ADDRESSING_MODE"));
    let err = Generator::osqa()
        .run(&request(dir.path(), RunMode::Write))
        .unwrap_err();
    match err {
        GenerateError::Profile(ParamError::MissingParameter { profile, name }) => {
            assert_eq!(profile, "tang_nano_20k");
            assert_eq!(name, "RAM_ADDRESSING_MODE");
        }
        other => panic!("unexpected error: {other}"),
    }
    for kind in ArtifactKind::ALL {
        assert!(!dir.path().join(kind.default_path()).exists(), "{kind}");
    }
}

#[test]
fn unrepresentable_memory_end_fails_without_output() {
    let dir = project(|s| with_value(s, "RAM_ADDRESS_BITWIDTH", "30"));
    let err = Generator::osqa()
        .run(&request(dir.path(), RunMode::Write))
        .unwrap_err();
    assert!(
        matches!(
            &err,
            GenerateError::Derive(DeriveError::DerivationDomain { rule, .. })
                if rule == "memory_end_address"
        ),
        "{err}"
    );
    for kind in ArtifactKind::ALL {
        assert!(!dir.path().join(kind.default_path()).exists(), "{kind}");
    }
}

#[test]
fn failed_run_leaves_previous_output_intact() {
    let dir = project(|s| s);
    Generator::osqa()
        .run(&request(dir.path(), RunMode::Write))
        .unwrap();
    let before = read_all(dir.path());

    let profile = dir.path().join("profiles/tang_nano_20k.toml");
    let text = fs::read_to_string(&profile).unwrap();
    fs::write(&profile, with_value(text, "RAM_ADDRESSING_MODE", "7")).unwrap();
    assert!(Generator::osqa()
        .run(&request(dir.path(), RunMode::Write))
        .is_err());
    assert_eq!(read_all(dir.path()), before);
}

#[test]
fn write_failure_reports_already_replaced_artifacts() {
    let dir = project(|s| s);
    // A directory where the header should go makes its write fail.
    fs::create_dir_all(dir.path().join("os/src/os_config.hpp")).unwrap();

    let err = Generator::osqa()
        .run(&request(dir.path(), RunMode::Write))
        .unwrap_err();
    let message = err.to_string();
    match err {
        GenerateError::Write { path, written, .. } => {
            assert_eq!(path, dir.path().join("os/src/os_config.hpp"));
            assert_eq!(written, vec![dir.path().join("os/src/os_start.S")]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(message.contains("already regenerated"), "{message}");

    assert!(dir.path().join("os/src/os_start.S").is_file());
    assert!(!dir.path().join("emulator/src/main_config.hpp").exists());
    assert!(!dir.path().join("src/configuration.sv").exists());
}

#[test]
fn validate_all_applies_derivation_rules() {
    let dir = project(|s| s);
    let profiles = dir.path().join("profiles");
    fs::write(
        profiles.join("too_wide.toml"),
        "extends = \"tang_nano_20k\"\n\n[parameters]\nRAM_ADDRESS_BITWIDTH = 31\n",
    )
    .unwrap();
    fs::write(
        profiles.join("short.toml"),
        "[parameters]\nBOARD_NAME = \"short\"\n",
    )
    .unwrap();

    let results = Generator::osqa().validate_all(&profiles).unwrap();
    let names: Vec<&str> = results.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, ["short", "tang_nano_20k", "too_wide"]);

    assert!(matches!(
        results[0].1,
        Err(GenerateError::Profile(ParamError::MissingParameter { .. }))
    ));
    let (profile, derived) = results[1].1.as_ref().unwrap();
    assert_eq!(profile.name, "tang_nano_20k");
    assert_eq!(derived.get("memory_end_address"), Some(0x0080_0000));
    assert!(matches!(
        &results[2].1,
        Err(GenerateError::Derive(DeriveError::DerivationDomain { rule, .. }))
            if rule == "memory_end_address"
    ));
}

#[test]
fn output_overrides_and_extends() {
    let dir = project(|s| s);
    fs::write(
        dir.path().join("profiles/tang_nano_20k_slow.toml"),
        "extends = \"tang_nano_20k\"\n\n[parameters]\nCPU_FREQUENCY_HZ = 13_500_000\n",
    )
    .unwrap();

    let request = RunRequest {
        profiles_dir: dir.path().join("profiles"),
        profile: ProfileRef::parse("tang_nano_20k_slow"),
        layout: OutputLayout::new(dir.path())
            .with_override(ArtifactKind::HdlPackage, "rtl/configuration.sv"),
        mode: RunMode::Write,
    };
    let report = Generator::osqa().run(&request).unwrap();
    assert_eq!(report.profile, "tang_nano_20k_slow");

    let hdl = fs::read_to_string(dir.path().join("rtl/configuration.sv")).unwrap();
    assert!(hdl.contains("CPU_FREQUENCY_HZ = 13500000;"));
    assert!(hdl.contains("CLOCK_FREQUENCY_HZ = 27000000;"));
    assert!(hdl
        .lines()
        .next()
        .unwrap()
        .contains("`profiles/tang_nano_20k_slow.toml`"));
    assert!(!dir.path().join("src/configuration.sv").exists());
}
