//! Parameter schema.
//!
//! Every board profile binds exactly the names declared here. The schema is
//! closed: profiles may neither omit a name nor add one.

use std::fmt;

use serde::Serialize;

/// Declared type of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    /// Unsigned integer that must fit in `bits` bits (1..=64).
    UInt { bits: u32 },
    Str,
    Bool,
}

impl ParamType {
    /// 32-bit unsigned integer, the width of every numeric osqa parameter.
    pub const U32: ParamType = ParamType::UInt { bits: 32 };

    /// Largest value representable by an unsigned type of this width.
    pub fn max_value(&self) -> Option<u64> {
        match self {
            ParamType::UInt { bits } => 64u32
                .checked_sub(*bits)
                .and_then(|shift| u64::MAX.checked_shr(shift)),
            _ => None,
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::UInt { bits } => write!(f, "u{bits}"),
            ParamType::Str => write!(f, "string"),
            ParamType::Bool => write!(f, "bool"),
        }
    }
}

/// A bound parameter value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    UInt(u64),
    Str(String),
    Bool(bool),
}

impl ParamValue {
    /// Short type name used in mismatch diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            ParamValue::UInt(_) => "integer",
            ParamValue::Str(_) => "string",
            ParamValue::Bool(_) => "bool",
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::UInt(v) => write!(f, "{v}"),
            ParamValue::Str(s) => write!(f, "\"{s}\""),
            ParamValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// Declaration of one parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    /// Parameter name, unique within a schema.
    pub name: &'static str,
    /// Declared type.
    pub ty: ParamType,
    /// Unit or meaning. Documentation only.
    pub doc: &'static str,
}

impl ParamSpec {
    pub const fn new(name: &'static str, ty: ParamType, doc: &'static str) -> Self {
        Self { name, ty, doc }
    }
}

/// An ordered, closed set of parameter declarations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    params: Vec<ParamSpec>,
    /// Retired names mapped to their canonical replacement.
    aliases: Vec<(&'static str, &'static str)>,
}

impl Schema {
    /// Build a schema from declarations. Order is kept for reporting.
    pub fn new(params: Vec<ParamSpec>) -> Self {
        Self {
            params,
            aliases: Vec::new(),
        }
    }

    /// Register a retired name so profiles using it get a pointed diagnostic.
    pub fn with_alias(mut self, retired: &'static str, canonical: &'static str) -> Self {
        self.aliases.push((retired, canonical));
        self
    }

    /// The schema shared by every osqa board profile.
    pub fn osqa() -> Self {
        use ParamType::Str;
        const U32: ParamType = ParamType::U32;

        Self::new(vec![
            ParamSpec::new(
                "BOARD_NAME",
                Str,
                "board identifier used in generated banners",
            ),
            ParamSpec::new(
                "CLOCK_FREQUENCY_HZ",
                U32,
                "frequency of the input clock (signal 'clk')",
            ),
            ParamSpec::new("CPU_FREQUENCY_HZ", U32, "frequency the CPU runs on"),
            ParamSpec::new("RAM_ADDRESS_BITWIDTH", U32, "RAM address bus width in bits"),
            ParamSpec::new(
                "RAM_ADDRESSING_MODE",
                U32,
                "bytes per address as a power of two: 0 = 1 B, 1 = 2 B, 2 = 4 B, 3 = 8 B",
            ),
            ParamSpec::new(
                "UART_BAUD_RATE",
                U32,
                "baud, 8 data bits, 1 stop bit, no parity",
            ),
            ParamSpec::new(
                "CACHE_COLUMN_INDEX_BITWIDTH",
                U32,
                "log2 of 32-bit entries per cache line",
            ),
            ParamSpec::new("CACHE_LINE_INDEX_BITWIDTH", U32, "log2 of cache lines"),
            ParamSpec::new(
                "FLASH_TRANSFER_FROM_ADDRESS",
                U32,
                "flash read start address",
            ),
            ParamSpec::new(
                "FLASH_TRANSFER_BYTE_COUNT",
                U32,
                "bytes copied from flash to RAM at startup",
            ),
            ParamSpec::new(
                "STARTUP_WAIT_CYCLES",
                U32,
                "cycles to wait at startup for flash to initialise",
            ),
        ])
        .with_alias("FLASH_FROM_ADDRESS", "FLASH_TRANSFER_FROM_ADDRESS")
    }

    /// Look up a declaration by name.
    pub fn get(&self, name: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Canonical name for a retired alias.
    pub fn canonical_for(&self, alias: &str) -> Option<&'static str> {
        self.aliases
            .iter()
            .find(|(retired, _)| *retired == alias)
            .map(|(_, canonical)| *canonical)
    }

    /// Declared names, in schema order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.params.iter().map(|p| p.name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParamSpec> {
        self.params.iter()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}
