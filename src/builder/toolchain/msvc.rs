//! MSVC toolchain implementation.

use std::path::{Path, PathBuf};

use crate::core::extension::Language;

use super::{CommandSpec, CompileInput, LinkInput, Toolchain, ToolchainFamily};

/// MSVC toolchain (Windows).
#[derive(Debug, Clone)]
pub struct MsvcToolchain {
    /// Path to cl.exe (compiler)
    pub cl: PathBuf,
    /// Path to link.exe (linker)
    pub link: PathBuf,
}

impl MsvcToolchain {
    /// Create a new MSVC toolchain.
    pub fn new(cl: PathBuf, link: PathBuf) -> Self {
        MsvcToolchain { cl, link }
    }
}

impl Toolchain for MsvcToolchain {
    fn family(&self) -> ToolchainFamily {
        ToolchainFamily::Msvc
    }

    fn compiler_path(&self) -> &Path {
        &self.cl
    }

    fn cxx_compiler_path(&self) -> &Path {
        // MSVC uses the same cl.exe for both C and C++
        &self.cl
    }

    fn compile_command(&self, input: &CompileInput, lang: Language) -> CommandSpec {
        let mut cmd = CommandSpec::new(&self.cl);

        // Quiet logo, compile only, shared CRT
        cmd = cmd.arg("/nologo");
        cmd = cmd.arg("/c");
        cmd = cmd.arg("/MD");

        if lang == Language::Cxx {
            cmd = cmd.arg("/EHsc");
        }

        for dir in &input.include_dirs {
            cmd = cmd.arg(format!("/I{}", dir.display()));
        }

        for define in &input.defines {
            cmd = cmd.arg(format!("/D{}", define.to_flag_body()));
        }

        cmd = cmd.args(input.cflags.iter().cloned());

        // Force the language; cl.exe would otherwise guess from the extension
        match lang {
            Language::C => cmd = cmd.arg(format!("/Tc{}", input.source.display())),
            Language::Cxx => cmd = cmd.arg(format!("/Tp{}", input.source.display())),
        }

        cmd = cmd.arg(format!("/Fo{}", input.output.display()));

        cmd
    }

    fn link_extension_command(&self, input: &LinkInput, _driver: Language) -> CommandSpec {
        // MSVC uses link.exe for both C and C++ linking
        let mut cmd = CommandSpec::new(&self.link);

        cmd = cmd.arg("/nologo");
        cmd = cmd.arg("/DLL");

        for symbol in &input.exports {
            cmd = cmd.arg(format!("/EXPORT:{}", symbol));
        }

        for obj in &input.objects {
            cmd = cmd.arg(obj.display().to_string());
        }

        for dir in &input.lib_dirs {
            cmd = cmd.arg(format!("/LIBPATH:{}", dir.display()));
        }

        for lib in &input.libs {
            cmd = cmd.arg(format!("{}.lib", lib));
        }

        cmd = cmd.arg(format!("/OUT:{}", input.output.display()));

        cmd = cmd.args(input.ldflags.iter().cloned());

        cmd
    }

    fn object_extension(&self) -> &str {
        "obj"
    }
}
