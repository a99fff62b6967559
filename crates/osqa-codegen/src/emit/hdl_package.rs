//! SystemVerilog `configuration` package with every tunable hardware knob.
//!
//! Counts, widths, and frequencies are decimal; addresses and byte counts are
//! sized hex. Every value is range-checked against the 32-bit `int unsigned`
//! it is assigned to.

use crate::emit::{ArtifactKind, WORD_BITS};
use crate::literal::LiteralStyle;
use crate::template::{Source, Template};

/// Package entries in output order.
const KNOBS: [(&str, Source, LiteralStyle); 11] = [
    knob("CLOCK_FREQUENCY_HZ", LiteralStyle::Decimal),
    knob("CPU_FREQUENCY_HZ", LiteralStyle::Decimal),
    knob("RAM_ADDRESS_BITWIDTH", LiteralStyle::Decimal),
    knob("RAM_ADDRESSING_MODE", LiteralStyle::Decimal),
    knob("CACHE_COLUMN_INDEX_BITWIDTH", LiteralStyle::Decimal),
    knob("CACHE_LINE_INDEX_BITWIDTH", LiteralStyle::Decimal),
    knob("UART_BAUD_RATE", LiteralStyle::Decimal),
    knob("FLASH_TRANSFER_FROM_ADDRESS", LiteralStyle::SizedHex),
    knob("FLASH_TRANSFER_BYTE_COUNT", LiteralStyle::SizedHex),
    knob("STARTUP_WAIT_CYCLES", LiteralStyle::Decimal),
    (
        "MEMORY_END_ADDRESS",
        Source::Derived("memory_end_address"),
        LiteralStyle::SizedHex,
    ),
];

const fn knob(name: &'static str, style: LiteralStyle) -> (&'static str, Source, LiteralStyle) {
    (name, Source::Param(name), style)
}

pub fn template() -> Template {
    let mut t = Template::new(ArtifactKind::HdlPackage, "//")
        .text("\n")
        .text("package configuration;\n\n");
    for (name, source, style) in KNOBS {
        t = t
            .text("  parameter int unsigned ")
            .text(name)
            .text(" = ")
            .value(name, source, style, WORD_BITS)
            .text(";\n");
    }
    t.text("\nendpackage\n")
}
