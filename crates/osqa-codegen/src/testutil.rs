//! Fixtures shared by unit tests.

use std::path::PathBuf;

use osqa_params::{BoardProfile, DerivationEngine, DerivedValues, ParameterSet, Schema};

pub const TANG_NANO_20K: &str = include_str!("../../../profiles/tang_nano_20k.toml");

/// The shipped profile with `edit` applied to its `[parameters]` table.
pub fn profile_with(edit: impl FnOnce(&mut toml::Table)) -> BoardProfile {
    let doc: toml::Table = toml::from_str(TANG_NANO_20K).unwrap();
    let mut table = doc["parameters"].as_table().unwrap().clone();
    edit(&mut table);
    BoardProfile {
        name: "tang_nano_20k".into(),
        description: None,
        source: PathBuf::from("profiles/tang_nano_20k.toml"),
        bases: Vec::new(),
        parameters: ParameterSet::from_table(&Schema::osqa(), "tang_nano_20k", &table).unwrap(),
    }
}

pub fn tang_nano_20k() -> (BoardProfile, DerivedValues) {
    let profile = profile_with(|_| {});
    let derived = DerivationEngine::osqa()
        .evaluate(&profile.parameters)
        .unwrap();
    (profile, derived)
}
