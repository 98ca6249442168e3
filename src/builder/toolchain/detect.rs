//! Toolchain detection functions.

use std::path::PathBuf;

use anyhow::{bail, Result};

use crate::util::config::ToolchainSettings;
use crate::util::process::find_executable;

use super::{GccToolchain, MsvcToolchain, TargetOs, Toolchain, ToolchainFamily};

/// A detected toolchain together with its family.
pub struct DetectedToolchain {
    pub family: ToolchainFamily,
    pub toolchain: Box<dyn Toolchain>,
}

impl std::fmt::Debug for DetectedToolchain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetectedToolchain")
            .field("family", &self.family)
            .field("cc", &self.toolchain.compiler_path())
            .field("cxx", &self.toolchain.cxx_compiler_path())
            .finish()
    }
}

/// Detect the toolchain to build with.
///
/// The family comes from `requested` when given; otherwise it is inferred
/// from the host: MSVC when a configured Developer Command Prompt is active,
/// MinGW when only `gcc` is available on Windows, and the Unix family
/// everywhere else.
///
/// Compiler paths are taken from, in order:
/// 1. The `[toolchain]` config section
/// 2. Environment variables (CC, CXX)
/// 3. A PATH search for common compilers of the family
pub fn detect_toolchain(
    settings: &ToolchainSettings,
    requested: Option<ToolchainFamily>,
    os: TargetOs,
) -> Result<DetectedToolchain> {
    let family = match requested {
        Some(family) => family,
        None => infer_family(settings, os),
    };

    tracing::debug!("detecting {} toolchain on {}", family, os);

    let toolchain: Box<dyn Toolchain> = match family {
        ToolchainFamily::Msvc => Box::new(detect_msvc(settings)?),
        ToolchainFamily::Unix | ToolchainFamily::Mingw32 => {
            Box::new(detect_gcc(settings, family, os)?)
        }
    };

    tracing::info!(
        "Using {} toolchain: cc={}, cxx={}",
        family,
        toolchain.compiler_path().display(),
        toolchain.cxx_compiler_path().display()
    );

    Ok(DetectedToolchain { family, toolchain })
}

fn infer_family(settings: &ToolchainSettings, os: TargetOs) -> ToolchainFamily {
    if !os.is_windows() {
        return ToolchainFamily::Unix;
    }

    // Explicit GCC-style driver on Windows means MinGW
    let configured_gcc = settings
        .cc
        .as_ref()
        .map(|cc| !cc.to_string_lossy().to_lowercase().contains("cl"))
        .unwrap_or(false);
    if configured_gcc || std::env::var("CC").is_ok() {
        return ToolchainFamily::Mingw32;
    }

    let dev_prompt = std::env::var("INCLUDE").is_ok() && std::env::var("LIB").is_ok();
    if find_executable("cl").is_some() && dev_prompt {
        return ToolchainFamily::Msvc;
    }

    if find_executable("gcc").is_some() {
        return ToolchainFamily::Mingw32;
    }

    ToolchainFamily::Msvc
}

fn detect_msvc(settings: &ToolchainSettings) -> Result<MsvcToolchain> {
    let cl = match settings.cc.clone().or_else(|| find_executable("cl")) {
        Some(cl) => cl,
        None => bail!(
            "cl.exe not found\n\
             \n\
             Run from a Developer Command Prompt for Visual Studio,\n\
             or set `[toolchain] cc` in slvs-build.toml."
        ),
    };

    let link = cl
        .parent()
        .map(|dir| dir.join("link.exe"))
        .filter(|p| p.exists())
        .or_else(|| find_executable("link"));

    let Some(link) = link else {
        bail!("MSVC cl.exe found at {} but link.exe is not in PATH", cl.display());
    };

    if std::env::var("INCLUDE").is_err() || std::env::var("LIB").is_err() {
        tracing::warn!("INCLUDE/LIB not set; cl.exe may not find system headers");
    }

    Ok(MsvcToolchain::new(cl, link))
}

fn detect_gcc(
    settings: &ToolchainSettings,
    family: ToolchainFamily,
    os: TargetOs,
) -> Result<GccToolchain> {
    let candidates: &[&str] = match family {
        ToolchainFamily::Mingw32 => &["gcc", "x86_64-w64-mingw32-gcc", "i686-w64-mingw32-gcc"],
        _ => &["cc", "gcc", "clang"],
    };

    let cc = settings
        .cc
        .clone()
        .or_else(|| std::env::var("CC").ok().map(PathBuf::from))
        .or_else(|| candidates.iter().find_map(|name| find_executable(name)));

    let Some(cc) = cc else {
        bail!(
            "no C compiler found\n\
             \n\
             Building the extension requires a C/C++ compiler ({}).\n\
             Set the CC environment variable, configure `[toolchain] cc`,\n\
             or install a compiler.",
            candidates.join(", ")
        );
    };

    let cxx = settings
        .cxx
        .clone()
        .or_else(|| std::env::var("CXX").ok().map(PathBuf::from))
        .unwrap_or_else(|| GccToolchain::infer_cxx(&cc));

    Ok(GccToolchain::new(cc, cxx, family, os))
}
