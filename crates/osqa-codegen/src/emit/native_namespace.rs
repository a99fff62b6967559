//! Emulator constants: the same memory map as typed constants in the
//! `osqa` namespace.

use crate::emit::{ArtifactKind, MEMORY_MAP, WORD_BITS};
use crate::literal::LiteralStyle;
use crate::template::{Source, Template};

pub fn template() -> Template {
    let mut t = Template::new(ArtifactKind::NativeNamespace, "//")
        .text("#pragma once\n")
        .text("#include <cstdint>\n\n")
        .text("namespace osqa {\n\n")
        .text("// memory map\n");
    for reg in MEMORY_MAP {
        t = t
            .text("std::uint32_t constexpr ")
            .text(reg.const_name)
            .text(" = ")
            .value(
                reg.const_name,
                Source::Const(reg.address),
                LiteralStyle::CHex,
                WORD_BITS,
            )
            .text(";\n");
    }
    t.text("std::uint32_t constexpr memory_end = ")
        .value(
            "memory_end_address",
            Source::Derived("memory_end_address"),
            LiteralStyle::CHex,
            WORD_BITS,
        )
        .text(";\n")
        .text("\n} // namespace osqa\n")
}
