//! Derivation engine.
//!
//! Derived values are functions of parameters (and of other derived values)
//! that are never stored in a profile. Every rule runs exactly once per
//! evaluation, after all the rules whose outputs it consumes.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;
use tracing::debug;

use crate::error::DeriveError;
use crate::schema::ParamValue;
use crate::set::ParameterSet;

/// Width of the target's address word. Address-like derived values must fit.
pub const ADDRESS_BITS: u32 = 32;

/// Bytes per cache entry (one 32-bit word).
pub const CACHE_ENTRY_BYTES: u64 = 4;

/// Signature of a derivation function.
pub type RuleFn = fn(&RuleInputs) -> Result<u64, DeriveError>;

/// One derivation rule: `output = compute(inputs)`.
#[derive(Clone, Copy)]
pub struct Rule {
    /// Name of the derived value.
    pub output: &'static str,
    /// Parameters or derived values consumed.
    pub inputs: &'static [&'static str],
    pub compute: RuleFn,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("output", &self.output)
            .field("inputs", &self.inputs)
            .finish()
    }
}

/// Resolved input values handed to a rule.
#[derive(Debug)]
pub struct RuleInputs {
    rule: &'static str,
    values: Vec<(&'static str, u64)>,
}

impl RuleInputs {
    /// Value of a declared input.
    pub fn get(&self, name: &str) -> Result<u64, DeriveError> {
        self.values
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| *v)
            .ok_or_else(|| DeriveError::MissingParameter {
                rule: self.rule.to_string(),
                name: name.to_string(),
            })
    }

    /// Domain error attributed to this rule.
    pub fn domain(&self, detail: impl Into<String>) -> DeriveError {
        DeriveError::DerivationDomain {
            rule: self.rule.to_string(),
            detail: detail.into(),
        }
    }

    /// `2^exponent`, which must fit in an address word.
    pub fn pow2(&self, exponent: u64) -> Result<u64, DeriveError> {
        if exponent >= u64::from(ADDRESS_BITS) {
            return Err(self.domain(format!(
                "2^{exponent} does not fit in a {ADDRESS_BITS}-bit address"
            )));
        }
        Ok(1u64 << exponent)
    }
}

/// Derived values of one evaluation, by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DerivedValues {
    values: BTreeMap<&'static str, u64>,
}

impl DerivedValues {
    pub fn get(&self, name: &str) -> Option<u64> {
        self.values.get(name).copied()
    }

    /// Iterate name/value pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, u64)> + '_ {
        self.values.iter().map(|(k, v)| (*k, *v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(&'static str, u64)> for DerivedValues {
    fn from_iter<I: IntoIterator<Item = (&'static str, u64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// A fixed list of derivation rules.
#[derive(Debug, Clone)]
pub struct DerivationEngine {
    rules: Vec<Rule>,
}

impl DerivationEngine {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Rules for osqa boards.
    pub fn osqa() -> Self {
        Self::new(vec![
            Rule {
                output: "ram_word_bytes",
                inputs: &["RAM_ADDRESSING_MODE"],
                compute: ram_word_bytes,
            },
            Rule {
                output: "memory_end_address",
                inputs: &["RAM_ADDRESS_BITWIDTH", "RAM_ADDRESSING_MODE"],
                compute: memory_end_address,
            },
            Rule {
                output: "cache_line_bytes",
                inputs: &["CACHE_COLUMN_INDEX_BITWIDTH"],
                compute: cache_line_bytes,
            },
            Rule {
                output: "cache_size_bytes",
                inputs: &["cache_line_bytes", "CACHE_LINE_INDEX_BITWIDTH"],
                compute: cache_size_bytes,
            },
        ])
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Rule indices in dependency order.
    ///
    /// Kahn's algorithm; among ready rules the one declared first runs first,
    /// so the order is deterministic.
    pub fn order(&self) -> Result<Vec<usize>, DeriveError> {
        let mut producer: HashMap<&str, usize> = HashMap::new();
        for (idx, rule) in self.rules.iter().enumerate() {
            if producer.insert(rule.output, idx).is_some() {
                return Err(DeriveError::DuplicateRule {
                    name: rule.output.to_string(),
                });
            }
        }

        let mut in_degree = vec![0usize; self.rules.len()];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); self.rules.len()];
        for (idx, rule) in self.rules.iter().enumerate() {
            for input in rule.inputs {
                if let Some(&dep) = producer.get(input) {
                    in_degree[idx] += 1;
                    dependents[dep].push(idx);
                }
            }
        }

        let mut ready: BTreeSet<usize> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, &deg)| deg == 0)
            .map(|(idx, _)| idx)
            .collect();
        let mut order = Vec::with_capacity(self.rules.len());

        while let Some(idx) = ready.pop_first() {
            order.push(idx);
            for &next in &dependents[idx] {
                in_degree[next] -= 1;
                if in_degree[next] == 0 {
                    ready.insert(next);
                }
            }
        }

        if order.len() < self.rules.len() {
            let mut rules: Vec<String> = in_degree
                .iter()
                .enumerate()
                .filter(|(_, &deg)| deg > 0)
                .map(|(idx, _)| self.rules[idx].output.to_string())
                .collect();
            rules.sort();
            return Err(DeriveError::DerivationCycle { rules });
        }

        Ok(order)
    }

    /// Evaluate every rule once against `params`.
    pub fn evaluate(&self, params: &ParameterSet) -> Result<DerivedValues, DeriveError> {
        let mut derived = DerivedValues::default();

        for idx in self.order()? {
            let rule = &self.rules[idx];
            let mut values = Vec::with_capacity(rule.inputs.len());
            for &input in rule.inputs {
                let value = match derived.get(input) {
                    Some(v) => v,
                    None => match params.get(input) {
                        Some(ParamValue::UInt(v)) => *v,
                        Some(other) => {
                            return Err(DeriveError::TypeMismatch {
                                rule: rule.output.to_string(),
                                name: input.to_string(),
                                found: other.type_name().to_string(),
                            })
                        }
                        None => {
                            return Err(DeriveError::MissingParameter {
                                rule: rule.output.to_string(),
                                name: input.to_string(),
                            })
                        }
                    },
                };
                values.push((input, value));
            }

            let inputs = RuleInputs {
                rule: rule.output,
                values,
            };
            let value = (rule.compute)(&inputs)?;
            debug!(name = rule.output, value, "derived");
            derived.values.insert(rule.output, value);
        }

        Ok(derived)
    }
}

fn ram_word_bytes(inputs: &RuleInputs) -> Result<u64, DeriveError> {
    let mode = inputs.get("RAM_ADDRESSING_MODE")?;
    if mode > 3 {
        return Err(inputs.domain(format!(
            "RAM_ADDRESSING_MODE must be 0..=3 (1 to 8 bytes per address), got {mode}"
        )));
    }
    inputs.pow2(mode)
}

/// First address past the end of RAM; the initial stack pointer.
fn memory_end_address(inputs: &RuleInputs) -> Result<u64, DeriveError> {
    let width = inputs.get("RAM_ADDRESS_BITWIDTH")?;
    let mode = inputs.get("RAM_ADDRESSING_MODE")?;
    let exponent = width
        .checked_add(mode)
        .ok_or_else(|| inputs.domain("address exponent overflows"))?;
    inputs.pow2(exponent)
}

fn cache_line_bytes(inputs: &RuleInputs) -> Result<u64, DeriveError> {
    let entries = inputs.pow2(inputs.get("CACHE_COLUMN_INDEX_BITWIDTH")?)?;
    fit_address(inputs, entries.checked_mul(CACHE_ENTRY_BYTES))
}

fn cache_size_bytes(inputs: &RuleInputs) -> Result<u64, DeriveError> {
    let line = inputs.get("cache_line_bytes")?;
    let lines = inputs.pow2(inputs.get("CACHE_LINE_INDEX_BITWIDTH")?)?;
    fit_address(inputs, line.checked_mul(lines))
}

fn fit_address(inputs: &RuleInputs, value: Option<u64>) -> Result<u64, DeriveError> {
    match value {
        Some(v) if v >> ADDRESS_BITS == 0 => Ok(v),
        _ => Err(inputs.domain(format!(
            "result does not fit in a {ADDRESS_BITS}-bit address"
        ))),
    }
}
