//! The four generated artifacts.
//!
//! Each artifact is a fixed [`Template`]; the functions in the submodules
//! build them. Memory-mapped I/O addresses are fixed by the hardware design,
//! not by profiles, and live here.

use std::fmt;

use serde::Serialize;

use crate::template::Template;

pub mod boot_stub;
pub mod hdl_package;
pub mod native_header;
pub mod native_namespace;

/// Width of every address and hardware parameter in the generated files.
pub const WORD_BITS: u32 = 32;

/// A memory-mapped I/O register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MmioRegister {
    /// Preprocessor name in the firmware header.
    pub macro_name: &'static str,
    /// Constant name in the emulator namespace.
    pub const_name: &'static str,
    pub address: u64,
}

/// Memory map shared by the firmware and the emulator.
pub const MEMORY_MAP: [MmioRegister; 3] = [
    MmioRegister {
        macro_name: "LED",
        const_name: "led",
        address: 0xffff_ffff,
    },
    MmioRegister {
        macro_name: "UART_OUT",
        const_name: "uart_out",
        address: 0xffff_fffe,
    },
    MmioRegister {
        macro_name: "UART_IN",
        const_name: "uart_in",
        address: 0xffff_fffd,
    },
];

/// A generated artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactKind {
    /// RISC-V entry point that sets up the stack.
    BootStub,
    /// Firmware header with the memory map.
    NativeHeader,
    /// Emulator constants in the `osqa` namespace.
    NativeNamespace,
    /// SystemVerilog `configuration` package.
    HdlPackage,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 4] = [
        ArtifactKind::BootStub,
        ArtifactKind::NativeHeader,
        ArtifactKind::NativeNamespace,
        ArtifactKind::HdlPackage,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ArtifactKind::BootStub => "boot-stub",
            ArtifactKind::NativeHeader => "native-header",
            ArtifactKind::NativeNamespace => "native-namespace",
            ArtifactKind::HdlPackage => "hdl-package",
        }
    }

    /// Parse an artifact name as used in `osqa.toml`.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == s)
    }

    /// Output path relative to the project root.
    pub fn default_path(&self) -> &'static str {
        match self {
            ArtifactKind::BootStub => "os/src/os_start.S",
            ArtifactKind::NativeHeader => "os/src/os_config.hpp",
            ArtifactKind::NativeNamespace => "emulator/src/main_config.hpp",
            ArtifactKind::HdlPackage => "src/configuration.sv",
        }
    }

    pub fn template(&self) -> Template {
        match self {
            ArtifactKind::BootStub => boot_stub::template(),
            ArtifactKind::NativeHeader => native_header::template(),
            ArtifactKind::NativeNamespace => native_namespace::template(),
            ArtifactKind::HdlPackage => hdl_package::template(),
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
