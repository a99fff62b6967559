//! Firmware header: memory-mapped I/O registers and the end of RAM.

use crate::emit::{ArtifactKind, MEMORY_MAP, WORD_BITS};
use crate::literal::LiteralStyle;
use crate::template::{Source, Template};

pub fn template() -> Template {
    let mut t = Template::new(ArtifactKind::NativeHeader, "//").text("#pragma once\n");
    for reg in MEMORY_MAP {
        t = t
            .text("#define ")
            .text(reg.macro_name)
            .text(" ((char volatile *)")
            .value(
                reg.macro_name,
                Source::Const(reg.address),
                LiteralStyle::CHex,
                WORD_BITS,
            )
            .text(")\n");
    }
    t.text("#define MEMORY_END ")
        .value(
            "memory_end_address",
            Source::Derived("memory_end_address"),
            LiteralStyle::CHex,
            WORD_BITS,
        )
        .text("\n")
}
