//! Toolchain abstraction for C/C++ compilers.
//!
//! Two concerns live here:
//!
//! 1. [`select_toolchain_flags`] picks the macro table, compile flags, link
//!    flags and extra libraries for a (compiler family, host OS, interpreter)
//!    triple. Each set is a fixed constant chosen wholesale.
//! 2. The [`Toolchain`] trait turns compile and link inputs into concrete
//!    command lines for GCC-style drivers and MSVC.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;

use crate::core::extension::Language;

mod detect;
mod gcc;
mod msvc;

pub use detect::{detect_toolchain, DetectedToolchain};
pub use gcc::GccToolchain;
pub use msvc::MsvcToolchain;

/// Error selecting a toolchain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolchainError {
    #[error("unsupported toolchain `{name}` (expected one of: unix, mingw32, msvc)")]
    Unsupported { name: String },

    #[error("the {family} toolchain is only available on Windows hosts, not {os}")]
    HostMismatch {
        family: ToolchainFamily,
        os: TargetOs,
    },

    #[error("unknown operating system `{name}` (expected one of: linux, macos, windows, other)")]
    UnknownOs { name: String },

    #[error("invalid interpreter version `{text}` (expected MAJOR.MINOR)")]
    InvalidInterpreterVersion { text: String },
}

/// Classification of the active compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolchainFamily {
    /// GCC-like compilers on Unix (gcc, clang, cc)
    Unix,
    /// GCC targeting Windows (MinGW)
    Mingw32,
    /// Microsoft Visual C++
    Msvc,
}

impl ToolchainFamily {
    /// Get the family name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolchainFamily::Unix => "unix",
            ToolchainFamily::Mingw32 => "mingw32",
            ToolchainFamily::Msvc => "msvc",
        }
    }

    /// Whether this family drives a GCC-style command line.
    pub fn is_gcc_like(&self) -> bool {
        matches!(self, ToolchainFamily::Unix | ToolchainFamily::Mingw32)
    }
}

impl fmt::Display for ToolchainFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolchainFamily {
    type Err = ToolchainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "unix" | "gcc" | "clang" => Ok(ToolchainFamily::Unix),
            "mingw32" | "mingw" => Ok(ToolchainFamily::Mingw32),
            "msvc" | "cl" => Ok(ToolchainFamily::Msvc),
            _ => Err(ToolchainError::Unsupported {
                name: s.to_string(),
            }),
        }
    }
}

/// Host operating system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetOs {
    Linux,
    MacOs,
    Windows,
    /// Any other Unix-like system
    Other,
}

impl TargetOs {
    /// The operating system this binary runs on.
    pub fn host() -> Self {
        if cfg!(target_os = "windows") {
            TargetOs::Windows
        } else if cfg!(target_os = "macos") {
            TargetOs::MacOs
        } else if cfg!(target_os = "linux") {
            TargetOs::Linux
        } else {
            TargetOs::Other
        }
    }

    pub fn is_windows(&self) -> bool {
        *self == TargetOs::Windows
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TargetOs::Linux => "linux",
            TargetOs::MacOs => "macos",
            TargetOs::Windows => "windows",
            TargetOs::Other => "other",
        }
    }
}

impl fmt::Display for TargetOs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetOs {
    type Err = ToolchainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "linux" => Ok(TargetOs::Linux),
            "macos" | "darwin" => Ok(TargetOs::MacOs),
            "windows" | "win32" => Ok(TargetOs::Windows),
            "other" => Ok(TargetOs::Other),
            _ => Err(ToolchainError::UnknownOs {
                name: s.to_string(),
            }),
        }
    }
}

/// Version of the Python interpreter the extension targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InterpreterVersion {
    pub major: u32,
    pub minor: u32,
}

impl InterpreterVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        InterpreterVersion { major, minor }
    }
}

impl fmt::Display for InterpreterVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for InterpreterVersion {
    type Err = ToolchainError;

    /// Parse `MAJOR.MINOR`, ignoring any further components.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ToolchainError::InvalidInterpreterVersion {
            text: s.to_string(),
        };
        let mut parts = s.trim().split('.');
        let major = parts.next().and_then(|p| p.parse().ok()).ok_or_else(invalid)?;
        let minor = parts.next().and_then(|p| p.parse().ok()).ok_or_else(invalid)?;
        Ok(InterpreterVersion { major, minor })
    }
}

/// Interpreters older than this lack `_hypot` with MinGW headers.
pub const HYPOT_ALIAS_BEFORE: InterpreterVersion = InterpreterVersion::new(3, 7);

/// A preprocessor macro, with an optional replacement value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Define {
    pub name: String,
    pub value: Option<String>,
}

impl Define {
    pub fn new(name: impl Into<String>, value: Option<&str>) -> Self {
        Define {
            name: name.into(),
            value: value.map(str::to_string),
        }
    }

    /// Render as `NAME` or `NAME=VALUE` (without the driver's `-D`/`/D`).
    pub fn to_flag_body(&self) -> String {
        match &self.value {
            Some(v) => format!("{}={}", self.name, v),
            None => self.name.clone(),
        }
    }
}

/// Everything the selected toolchain adds to the extension build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagProfile {
    /// Macro table
    pub defines: Vec<Define>,
    /// Extra compiler flags
    pub compile_args: Vec<String>,
    /// Extra linker flags
    pub link_args: Vec<String>,
    /// Extra libraries (without prefix/suffix)
    pub libraries: Vec<String>,
}

const BASE_DEFINES: &[(&str, Option<&str>)] = &[
    ("M_PI", Some("PI")),
    ("_USE_MATH_DEFINES", None),
    ("ISOLATION_AWARE_ENABLED", None),
    ("LIBRARY", None),
    ("EXPORT_DLL", None),
    ("_CRT_SECURE_NO_WARNINGS", None),
];

const BASE_COMPILE_ARGS: &[&str] = &[
    "-O3",
    "-Wno-cpp",
    "-g",
    "-Wno-write-strings",
    "-fpermissive",
    "-fPIC",
    "-std=c++17",
];

const WINDOWS_COMPILE_ARGS: &[&str] = &["-Wno-format"];

const MINGW_LINK_ARGS: &[&str] = &[
    "-static-libgcc",
    "-static-libstdc++",
    "-Wl,-Bstatic,--whole-archive",
    "-lwinpthread",
    "-lbcrypt",
    "-lpsapi",
    "-Wl,--no-whole-archive",
];

const MSVC_COMPILE_ARGS: &[&str] = &["/O2"];

const MSVC_LIBRARIES: &[&str] = &["shell32"];

fn owned(flags: &[&str]) -> Vec<String> {
    flags.iter().map(|f| f.to_string()).collect()
}

/// The macro table for a host: the base table plus the host's additions.
fn host_defines(os: TargetOs, interpreter: InterpreterVersion) -> Vec<Define> {
    let mut defines: Vec<Define> = BASE_DEFINES
        .iter()
        .map(|(name, value)| Define::new(*name, *value))
        .collect();

    if os.is_windows() {
        defines.push(Define::new("WIN32", None));
        if interpreter < HYPOT_ALIAS_BEFORE {
            defines.push(Define::new("_hypot", Some("hypot")));
        }
    } else {
        defines.push(Define::new("UNIX_DATADIR", Some("\"solvespace\"")));
    }

    defines
}

/// The GCC-style compile flags for a host.
fn host_compile_args(os: TargetOs) -> Vec<String> {
    let mut args = owned(BASE_COMPILE_ARGS);
    if os.is_windows() {
        args.extend(owned(WINDOWS_COMPILE_ARGS));
    }
    args
}

/// Select macros, flags and libraries for a toolchain.
///
/// | family  | macros               | compile flags | link flags    | libraries |
/// |---------|----------------------|---------------|---------------|-----------|
/// | unix    | full table           | full set      | none          | none      |
/// | mingw32 | full table           | full set      | static bundle | none      |
/// | msvc    | table minus `M_PI`   | `/O2`         | none          | shell32   |
///
/// The "full" table and set already carry the host's additions: `WIN32`
/// (plus `_hypot` for interpreters before 3.7) and `-Wno-format` on Windows,
/// `UNIX_DATADIR` elsewhere.
pub fn select_toolchain_flags(
    family: ToolchainFamily,
    os: TargetOs,
    interpreter: InterpreterVersion,
) -> Result<FlagProfile, ToolchainError> {
    let defines = host_defines(os, interpreter);

    let profile = match family {
        ToolchainFamily::Unix => FlagProfile {
            defines,
            compile_args: host_compile_args(os),
            link_args: Vec::new(),
            libraries: Vec::new(),
        },
        ToolchainFamily::Mingw32 => {
            if !os.is_windows() {
                return Err(ToolchainError::HostMismatch { family, os });
            }
            FlagProfile {
                defines,
                compile_args: host_compile_args(os),
                link_args: owned(MINGW_LINK_ARGS),
                libraries: Vec::new(),
            }
        }
        ToolchainFamily::Msvc => FlagProfile {
            defines: defines.into_iter().skip(1).collect(),
            compile_args: owned(MSVC_COMPILE_ARGS),
            link_args: Vec::new(),
            libraries: owned(MSVC_LIBRARIES),
        },
    };

    tracing::debug!(
        "selected {} flags for {}: {} macros, {} compile flags, {} link flags",
        family,
        os,
        profile.defines.len(),
        profile.compile_args.len(),
        profile.link_args.len()
    );

    Ok(profile)
}

/// A command to execute, with program and arguments.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    /// The program to run (e.g., "g++", "cl.exe")
    pub program: PathBuf,
    /// Command arguments
    pub args: Vec<String>,
}

impl CommandSpec {
    /// Create a new command spec.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        CommandSpec {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Add an argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments.
    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(|a| a.into()));
        self
    }

    /// Program and arguments as one argv vector.
    pub fn to_argv(&self) -> Vec<String> {
        let mut argv = Vec::with_capacity(self.args.len() + 1);
        argv.push(self.program.display().to_string());
        argv.extend(self.args.iter().cloned());
        argv
    }
}

/// Input for a compile step.
#[derive(Debug, Clone)]
pub struct CompileInput {
    /// Source file to compile
    pub source: PathBuf,
    /// Output object file
    pub output: PathBuf,
    /// Include directories
    pub include_dirs: Vec<PathBuf>,
    /// Preprocessor defines
    pub defines: Vec<Define>,
    /// Additional compiler flags
    pub cflags: Vec<String>,
}

/// Input for linking the extension module.
#[derive(Debug, Clone)]
pub struct LinkInput {
    /// Object files to link
    pub objects: Vec<PathBuf>,
    /// Output shared module
    pub output: PathBuf,
    /// Library search paths
    pub lib_dirs: Vec<PathBuf>,
    /// Libraries to link (without -l prefix)
    pub libs: Vec<String>,
    /// Additional linker flags, placed last
    pub ldflags: Vec<String>,
    /// Symbols to export explicitly (MSVC only)
    pub exports: Vec<String>,
}

/// Trait for toolchain implementations.
///
/// Each toolchain knows how to generate commands for its specific compiler.
pub trait Toolchain: Send + Sync {
    /// Get the toolchain family.
    fn family(&self) -> ToolchainFamily;

    /// Get the C compiler path.
    fn compiler_path(&self) -> &Path;

    /// Get the C++ compiler path.
    fn cxx_compiler_path(&self) -> &Path;

    /// Generate a compile command for one translation unit.
    fn compile_command(&self, input: &CompileInput, lang: Language) -> CommandSpec;

    /// Generate the command linking the extension as a loadable module.
    fn link_extension_command(&self, input: &LinkInput, driver: Language) -> CommandSpec;

    /// Get the object file extension.
    fn object_extension(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(profile: &FlagProfile) -> Vec<String> {
        profile.defines.iter().map(Define::to_flag_body).collect()
    }

    const PY38: InterpreterVersion = InterpreterVersion::new(3, 8);
    const PY36: InterpreterVersion = InterpreterVersion::new(3, 6);

    #[test]
    fn test_unix_on_linux() {
        let profile = select_toolchain_flags(ToolchainFamily::Unix, TargetOs::Linux, PY38).unwrap();

        assert_eq!(
            names(&profile),
            vec![
                "M_PI=PI",
                "_USE_MATH_DEFINES",
                "ISOLATION_AWARE_ENABLED",
                "LIBRARY",
                "EXPORT_DLL",
                "_CRT_SECURE_NO_WARNINGS",
                "UNIX_DATADIR=\"solvespace\"",
            ]
        );
        assert_eq!(
            profile.compile_args,
            vec![
                "-O3",
                "-Wno-cpp",
                "-g",
                "-Wno-write-strings",
                "-fpermissive",
                "-fPIC",
                "-std=c++17",
            ]
        );
        assert!(profile.link_args.is_empty());
        assert!(profile.libraries.is_empty());
    }

    #[test]
    fn test_unix_on_macos_matches_linux() {
        let linux = select_toolchain_flags(ToolchainFamily::Unix, TargetOs::Linux, PY38).unwrap();
        let macos = select_toolchain_flags(ToolchainFamily::Unix, TargetOs::MacOs, PY38).unwrap();
        assert_eq!(linux, macos);
    }

    #[test]
    fn test_mingw_on_windows() {
        let profile =
            select_toolchain_flags(ToolchainFamily::Mingw32, TargetOs::Windows, PY38).unwrap();

        let defines = names(&profile);
        assert_eq!(defines.len(), 7);
        assert_eq!(defines[0], "M_PI=PI");
        assert_eq!(defines[6], "WIN32");
        assert!(!defines.iter().any(|d| d.starts_with("UNIX_DATADIR")));

        assert_eq!(profile.compile_args.len(), 8);
        assert_eq!(profile.compile_args.last().unwrap(), "-Wno-format");
        assert_eq!(
            profile.link_args,
            vec![
                "-static-libgcc",
                "-static-libstdc++",
                "-Wl,-Bstatic,--whole-archive",
                "-lwinpthread",
                "-lbcrypt",
                "-lpsapi",
                "-Wl,--no-whole-archive",
            ]
        );
        assert!(profile.libraries.is_empty());
    }

    #[test]
    fn test_mingw_old_interpreter_adds_hypot_alias() {
        let profile =
            select_toolchain_flags(ToolchainFamily::Mingw32, TargetOs::Windows, PY36).unwrap();
        let defines = names(&profile);
        assert_eq!(defines.len(), 8);
        assert_eq!(defines[7], "_hypot=hypot");
    }

    #[test]
    fn test_mingw_requires_windows() {
        let err = select_toolchain_flags(ToolchainFamily::Mingw32, TargetOs::Linux, PY38)
            .unwrap_err();
        assert_eq!(
            err,
            ToolchainError::HostMismatch {
                family: ToolchainFamily::Mingw32,
                os: TargetOs::Linux,
            }
        );
    }

    #[test]
    fn test_msvc_on_windows() {
        let profile =
            select_toolchain_flags(ToolchainFamily::Msvc, TargetOs::Windows, PY38).unwrap();

        assert_eq!(
            names(&profile),
            vec![
                "_USE_MATH_DEFINES",
                "ISOLATION_AWARE_ENABLED",
                "LIBRARY",
                "EXPORT_DLL",
                "_CRT_SECURE_NO_WARNINGS",
                "WIN32",
            ]
        );
        assert_eq!(profile.compile_args, vec!["/O2"]);
        assert!(profile.link_args.is_empty());
        assert_eq!(profile.libraries, vec!["shell32"]);
    }

    #[test]
    fn test_unix_on_windows() {
        let profile =
            select_toolchain_flags(ToolchainFamily::Unix, TargetOs::Windows, PY38).unwrap();

        let defines = names(&profile);
        assert_eq!(defines.len(), 7);
        assert_eq!(defines[0], "M_PI=PI");
        assert_eq!(defines[6], "WIN32");
        assert!(!defines.iter().any(|d| d.starts_with("UNIX_DATADIR")));

        assert_eq!(profile.compile_args.len(), 8);
        assert_eq!(profile.compile_args.last().unwrap(), "-Wno-format");
        assert!(profile.link_args.is_empty());
        assert!(profile.libraries.is_empty());
    }

    #[test]
    fn test_msvc_on_linux() {
        let profile = select_toolchain_flags(ToolchainFamily::Msvc, TargetOs::Linux, PY36).unwrap();

        assert_eq!(
            names(&profile),
            vec![
                "_USE_MATH_DEFINES",
                "ISOLATION_AWARE_ENABLED",
                "LIBRARY",
                "EXPORT_DLL",
                "_CRT_SECURE_NO_WARNINGS",
                "UNIX_DATADIR=\"solvespace\"",
            ]
        );
        assert_eq!(profile.compile_args, vec!["/O2"]);
        assert!(profile.link_args.is_empty());
        assert_eq!(profile.libraries, vec!["shell32"]);
    }

    #[test]
    fn test_msvc_old_interpreter() {
        let profile =
            select_toolchain_flags(ToolchainFamily::Msvc, TargetOs::Windows, PY36).unwrap();
        assert_eq!(names(&profile).last().unwrap(), "_hypot=hypot");
    }

    #[test]
    fn test_family_parsing() {
        assert_eq!("unix".parse::<ToolchainFamily>().unwrap(), ToolchainFamily::Unix);
        assert_eq!("MinGW32".parse::<ToolchainFamily>().unwrap(), ToolchainFamily::Mingw32);
        assert_eq!("msvc".parse::<ToolchainFamily>().unwrap(), ToolchainFamily::Msvc);

        let err = "bcpp".parse::<ToolchainFamily>().unwrap_err();
        assert!(err.to_string().contains("unsupported toolchain `bcpp`"));
    }

    #[test]
    fn test_interpreter_version_parsing() {
        assert_eq!(
            "3.6.9".parse::<InterpreterVersion>().unwrap(),
            InterpreterVersion::new(3, 6)
        );
        assert!("3".parse::<InterpreterVersion>().is_err());
        assert!("three.six".parse::<InterpreterVersion>().is_err());
        assert!(InterpreterVersion::new(3, 6) < HYPOT_ALIAS_BEFORE);
        assert!(InterpreterVersion::new(3, 10) > HYPOT_ALIAS_BEFORE);
    }

    #[test]
    fn test_os_parsing() {
        assert_eq!("Darwin".parse::<TargetOs>().unwrap(), TargetOs::MacOs);
        assert!("plan9".parse::<TargetOs>().is_err());
    }
}
