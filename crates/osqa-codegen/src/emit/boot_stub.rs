//! Assembly entry point: set the stack pointer to the end of RAM and jump
//! to the firmware's `run`.

use crate::emit::{ArtifactKind, WORD_BITS};
use crate::literal::LiteralStyle;
use crate::template::{Source, Template};

pub fn template() -> Template {
    Template::new(ArtifactKind::BootStub, "#")
        .text(".global _start\n")
        .text("_start:\n")
        .text("    li sp, ")
        .value(
            "memory_end_address",
            Source::Derived("memory_end_address"),
            LiteralStyle::AsmHex,
            WORD_BITS,
        )
        .text("\n")
        .text("    j run\n")
}
