//! C/C++ build system.
//!
//! This module implements toolchain selection, the native compiler driver and
//! build planning for the extension module.

pub mod cython;
pub mod executor;
pub mod fingerprint;
pub mod native;
pub mod plan;
pub mod python;
pub mod toolchain;

pub use cython::CythonTranslator;
pub use executor::BuildExecutor;
pub use native::NativeBuilder;
pub use plan::ExtensionPlan;
pub use python::PythonConfig;
pub use toolchain::{
    detect_toolchain, select_toolchain_flags, CommandSpec, Define, FlagProfile, GccToolchain,
    InterpreterVersion, MsvcToolchain, TargetOs, Toolchain, ToolchainError, ToolchainFamily,
};
