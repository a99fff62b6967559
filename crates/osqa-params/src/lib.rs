//! Board profile parameters for the osqa configuration generator.
//!
//! A board profile is a TOML file binding every name of a closed
//! [`Schema`](schema::Schema) to a typed value. Loading a profile yields an
//! immutable [`ParameterSet`](set::ParameterSet); the
//! [`DerivationEngine`](derive::DerivationEngine) then computes the values that
//! are functions of those parameters (memory end address, cache geometry).
//!
//! - [`schema`]: parameter names, types, and the osqa schema
//! - [`set`]: validated, immutable parameter sets
//! - [`profile`]: profile files, `extends` overrides, discovery
//! - [`derive`]: derivation rules evaluated once per run

pub mod derive;
pub mod error;
pub mod profile;
pub mod schema;
pub mod set;

pub use derive::{DerivationEngine, DerivedValues, Rule};
pub use error::{DeriveError, ParamError};
pub use profile::{BoardProfile, ProfileRef};
pub use schema::{ParamSpec, ParamType, ParamValue, Schema};
pub use set::ParameterSet;
