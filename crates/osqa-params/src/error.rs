//! Error types for profile loading and derivation.

use std::path::PathBuf;

/// Errors that can occur while loading or validating a board profile.
#[derive(Debug, thiserror::Error)]
pub enum ParamError {
    /// A schema name is absent from the profile.
    #[error("profile '{profile}' is missing required parameter {name}")]
    MissingParameter { profile: String, name: String },

    /// A profile binds a name the schema does not declare.
    #[error(
        "profile '{profile}' defines unknown parameter {name}{}",
        did_you_mean(hint.as_deref())
    )]
    UnknownParameter {
        profile: String,
        name: String,
        /// Canonical name when `name` is a known historical alias.
        hint: Option<String>,
    },

    /// A value does not match its declared type or width.
    #[error("parameter {name}: expected {expected}, found {found}")]
    TypeMismatch {
        name: String,
        expected: String,
        found: String,
    },

    /// Profile `extends` chain loops back on itself.
    #[error("profile extends cycle: {}", chain.join(" -> "))]
    ExtendsCycle { chain: Vec<String> },

    /// Profile file not found.
    #[error("profile file not found: {}", path.display())]
    NotFound {
        /// The path that was not found.
        path: PathBuf,
    },

    /// TOML deserialization error.
    #[error("TOML parse error in {}", path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// I/O error reading profile files.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn did_you_mean(hint: Option<&str>) -> String {
    hint.map(|h| format!(" (did you mean {h}?)")).unwrap_or_default()
}

/// Errors that can occur while evaluating derivation rules.
#[derive(Debug, thiserror::Error)]
pub enum DeriveError {
    /// The rules' dependency graph is not acyclic.
    #[error("derivation cycle among rules: {}", rules.join(", "))]
    DerivationCycle { rules: Vec<String> },

    /// A rule input is neither a parameter nor the output of another rule.
    #[error("rule {rule} requires {name}, which is missing from the profile")]
    MissingParameter { rule: String, name: String },

    /// A rule input is present but not an unsigned integer.
    #[error("rule {rule}: input {name} has type {found}, expected an unsigned integer")]
    TypeMismatch {
        rule: String,
        name: String,
        found: String,
    },

    /// Inputs make the rule's result undefined or unrepresentable.
    #[error("rule {rule}: {detail}")]
    DerivationDomain { rule: String, detail: String },

    /// Two rules claim the same output name.
    #[error("derived value {name} is produced by more than one rule")]
    DuplicateRule { name: String },
}

/// Result type for profile operations.
pub type Result<T> = std::result::Result<T, ParamError>;
