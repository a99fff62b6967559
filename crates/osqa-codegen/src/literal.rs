//! Integer literal encoders.
//!
//! Each style renders an unsigned value in the literal syntax of one target
//! toolchain. A value that does not fit the literal's bit width is an error;
//! nothing is truncated. [`decode`] is the exact inverse of [`encode`] and is
//! what consistency checks use to read generated files back.

use std::fmt;

use serde::Serialize;

use crate::error::LiteralError;

/// Literal syntax of a target format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LiteralStyle {
    /// Assembler immediate: `0x800000`.
    AsmHex,
    /// C++14 hex with digit separators every four digits: `0x0080'0000`.
    CHex,
    /// SystemVerilog sized hex: `32'h00800000`.
    SizedHex,
    /// Plain decimal: `27000000`.
    Decimal,
}

impl LiteralStyle {
    pub const ALL: [LiteralStyle; 4] = [
        LiteralStyle::AsmHex,
        LiteralStyle::CHex,
        LiteralStyle::SizedHex,
        LiteralStyle::Decimal,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            LiteralStyle::AsmHex => "asm-hex",
            LiteralStyle::CHex => "c-hex",
            LiteralStyle::SizedHex => "sized-hex",
            LiteralStyle::Decimal => "decimal",
        }
    }
}

impl fmt::Display for LiteralStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Encode `value` as a `bits`-wide literal in `style`.
pub fn encode(value: u64, style: LiteralStyle, bits: u32) -> Result<String, LiteralError> {
    check_width(bits)?;
    if !fits(value, bits) {
        return Err(LiteralError::EncodingRange { value, bits, style });
    }

    Ok(match style {
        LiteralStyle::AsmHex => format!("{value:#x}"),
        LiteralStyle::CHex => {
            let digits = format!("{value:0width$x}", width = grouped_digits(bits));
            let groups: Vec<&str> = digits
                .as_bytes()
                .chunks(4)
                .map(|chunk| std::str::from_utf8(chunk).unwrap_or_default())
                .collect();
            format!("0x{}", groups.join("'"))
        }
        LiteralStyle::SizedHex => {
            format!("{bits}'h{value:0width$x}", width = hex_digits(bits))
        }
        LiteralStyle::Decimal => value.to_string(),
    })
}

/// Parse a literal produced by [`encode`] with the same style and width.
///
/// Well-formed text whose value is wider than `bits` (including text wider
/// than 64 bits) is an [`LiteralError::EncodingRange`], not a syntax error.
pub fn decode(text: &str, style: LiteralStyle, bits: u32) -> Result<u64, LiteralError> {
    check_width(bits)?;
    let malformed = |detail: &str| LiteralError::Malformed {
        text: text.to_string(),
        style,
        detail: detail.to_string(),
    };

    let (digits, radix) = match style {
        LiteralStyle::AsmHex => {
            let digits = text
                .strip_prefix("0x")
                .ok_or_else(|| malformed("missing 0x"))?;
            (digits.to_string(), 16)
        }
        LiteralStyle::CHex => {
            let body = text
                .strip_prefix("0x")
                .ok_or_else(|| malformed("missing 0x"))?;
            if body.split('\'').any(str::is_empty) {
                return Err(malformed("misplaced digit separator"));
            }
            (body.replace('\'', ""), 16)
        }
        LiteralStyle::SizedHex => {
            let (size, digits) = text
                .split_once("'h")
                .ok_or_else(|| malformed("missing 'h"))?;
            if size != bits.to_string() {
                return Err(malformed(&format!("size {size} is not {bits}")));
            }
            (digits.to_string(), 16)
        }
        LiteralStyle::Decimal => (text.to_string(), 10),
    };

    if !is_digits(&digits, radix) {
        return Err(malformed("bad digits"));
    }
    // Valid digits only fail to parse by overflowing u64.
    let Ok(value) = u64::from_str_radix(&digits, radix) else {
        return Err(LiteralError::EncodingRange {
            value: u64::MAX,
            bits,
            style,
        });
    };
    if !fits(value, bits) {
        return Err(LiteralError::EncodingRange { value, bits, style });
    }
    Ok(value)
}

fn check_width(bits: u32) -> Result<(), LiteralError> {
    if (1..=64).contains(&bits) {
        Ok(())
    } else {
        Err(LiteralError::InvalidWidth { bits })
    }
}

fn fits(value: u64, bits: u32) -> bool {
    bits >= 64 || value >> bits == 0
}

fn hex_digits(bits: u32) -> usize {
    bits.div_ceil(4) as usize
}

/// Hex digits for a grouped literal: whole groups of four.
fn grouped_digits(bits: u32) -> usize {
    hex_digits(bits).div_ceil(4) * 4
}

/// Digits only: no sign, no whitespace, not empty.
fn is_digits(digits: &str, radix: u32) -> bool {
    !digits.is_empty() && digits.chars().all(|c| c.is_digit(radix))
}
