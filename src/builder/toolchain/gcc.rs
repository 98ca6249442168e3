//! GCC/Clang/MinGW toolchain implementation.

use std::path::{Path, PathBuf};

use crate::core::extension::Language;

use super::{CommandSpec, CompileInput, LinkInput, TargetOs, Toolchain, ToolchainFamily};

/// GCC-style toolchain (Unix compilers and MinGW).
#[derive(Debug, Clone)]
pub struct GccToolchain {
    /// Path to the C compiler
    pub cc: PathBuf,
    /// Path to the C++ compiler
    pub cxx: PathBuf,
    /// Compiler family (unix or mingw32)
    pub family: ToolchainFamily,
    /// Host operating system
    pub os: TargetOs,
}

impl GccToolchain {
    /// Create a new GCC-style toolchain.
    pub fn new(cc: PathBuf, cxx: PathBuf, family: ToolchainFamily, os: TargetOs) -> Self {
        GccToolchain { cc, cxx, family, os }
    }

    /// Infer C++ compiler path from C compiler path.
    ///
    /// Handles common patterns:
    /// - gcc, x86_64-w64-mingw32-gcc -> g++, x86_64-w64-mingw32-g++
    /// - clang -> clang++
    /// - cc, /usr/bin/cc -> c++, /usr/bin/c++
    pub fn infer_cxx(cc: &Path) -> PathBuf {
        let cc_str = cc.to_string_lossy();
        let cc_str = cc_str.strip_suffix(".exe").unwrap_or(&cc_str);

        if cc_str.ends_with("gcc") {
            return PathBuf::from(format!("{}++", &cc_str[..cc_str.len() - 2]));
        }

        if cc_str.ends_with("clang") {
            return PathBuf::from(format!("{}++", cc_str));
        }

        // Only match "cc" when it's a complete basename (not "mycc")
        let is_standalone_cc = cc_str == "cc"
            || cc_str.ends_with("/cc")
            || cc_str.ends_with("\\cc")
            || cc_str.ends_with("-cc");

        if is_standalone_cc {
            return PathBuf::from(format!("{}++", &cc_str[..cc_str.len() - 1]));
        }

        PathBuf::from(format!("{}++", cc_str))
    }

    fn driver(&self, lang: Language) -> &Path {
        match lang {
            Language::C => &self.cc,
            Language::Cxx => &self.cxx,
        }
    }
}

impl Toolchain for GccToolchain {
    fn family(&self) -> ToolchainFamily {
        self.family
    }

    fn compiler_path(&self) -> &Path {
        &self.cc
    }

    fn cxx_compiler_path(&self) -> &Path {
        &self.cxx
    }

    fn compile_command(&self, input: &CompileInput, lang: Language) -> CommandSpec {
        let mut cmd = CommandSpec::new(self.driver(lang));

        // Compile only
        cmd = cmd.arg("-c");

        for dir in &input.include_dirs {
            cmd = cmd.arg(format!("-I{}", dir.display()));
        }

        for define in &input.defines {
            cmd = cmd.arg(format!("-D{}", define.to_flag_body()));
        }

        cmd = cmd.args(input.cflags.iter().cloned());

        cmd = cmd.arg(input.source.display().to_string());
        cmd = cmd.arg("-o");
        cmd = cmd.arg(input.output.display().to_string());

        cmd
    }

    fn link_extension_command(&self, input: &LinkInput, driver: Language) -> CommandSpec {
        let mut cmd = CommandSpec::new(self.driver(driver));

        cmd = cmd.arg("-shared");

        // Python symbols resolve at load time on macOS
        if self.os == TargetOs::MacOs {
            cmd = cmd.args(["-undefined", "dynamic_lookup"]);
        }

        for obj in &input.objects {
            cmd = cmd.arg(obj.display().to_string());
        }

        for dir in &input.lib_dirs {
            cmd = cmd.arg(format!("-L{}", dir.display()));
        }

        for lib in &input.libs {
            cmd = cmd.arg(format!("-l{}", lib));
        }

        cmd = cmd.arg("-o");
        cmd = cmd.arg(input.output.display().to_string());

        cmd = cmd.args(input.ldflags.iter().cloned());

        cmd
    }

    fn object_extension(&self) -> &str {
        "o"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::toolchain::Define;

    fn toolchain(family: ToolchainFamily, os: TargetOs) -> GccToolchain {
        GccToolchain::new(PathBuf::from("gcc"), PathBuf::from("g++"), family, os)
    }

    #[test]
    fn test_infer_cxx() {
        assert_eq!(GccToolchain::infer_cxx(Path::new("gcc")), PathBuf::from("g++"));
        assert_eq!(
            GccToolchain::infer_cxx(Path::new("x86_64-w64-mingw32-gcc")),
            PathBuf::from("x86_64-w64-mingw32-g++")
        );
        assert_eq!(GccToolchain::infer_cxx(Path::new("gcc.exe")), PathBuf::from("g++"));
        assert_eq!(GccToolchain::infer_cxx(Path::new("clang")), PathBuf::from("clang++"));
        assert_eq!(
            GccToolchain::infer_cxx(Path::new("/usr/bin/cc")),
            PathBuf::from("/usr/bin/c++")
        );
    }

    #[test]
    fn test_compile_command() {
        let input = CompileInput {
            source: PathBuf::from("src/util.cpp"),
            output: PathBuf::from("build/util.o"),
            include_dirs: vec![PathBuf::from("include")],
            defines: vec![
                Define::new("M_PI", Some("PI")),
                Define::new("LIBRARY", None),
            ],
            cflags: vec!["-O3".to_string()],
        };

        let cmd = toolchain(ToolchainFamily::Unix, TargetOs::Linux)
            .compile_command(&input, Language::Cxx);
        assert_eq!(cmd.program, PathBuf::from("g++"));
        assert_eq!(
            cmd.args,
            vec![
                "-c",
                "-Iinclude",
                "-DM_PI=PI",
                "-DLIBRARY",
                "-O3",
                "src/util.cpp",
                "-o",
                "build/util.o",
            ]
        );

        let cmd = toolchain(ToolchainFamily::Unix, TargetOs::Linux)
            .compile_command(&input, Language::C);
        assert_eq!(cmd.program, PathBuf::from("gcc"));
    }

    #[test]
    fn test_link_places_ldflags_last() {
        let input = LinkInput {
            objects: vec![PathBuf::from("a.o"), PathBuf::from("b.o")],
            output: PathBuf::from("slvs.pyd"),
            lib_dirs: vec![PathBuf::from("C:/Python38/libs")],
            libs: vec!["python38".to_string()],
            ldflags: vec!["-static-libgcc".to_string()],
            exports: vec!["PyInit_slvs".to_string()],
        };

        let cmd = toolchain(ToolchainFamily::Mingw32, TargetOs::Windows)
            .link_extension_command(&input, Language::Cxx);
        assert_eq!(
            cmd.args,
            vec![
                "-shared",
                "a.o",
                "b.o",
                "-LC:/Python38/libs",
                "-lpython38",
                "-o",
                "slvs.pyd",
                "-static-libgcc",
            ]
        );
    }

    #[test]
    fn test_link_on_macos_defers_python_symbols() {
        let input = LinkInput {
            objects: vec![PathBuf::from("a.o")],
            output: PathBuf::from("slvs.so"),
            lib_dirs: vec![],
            libs: vec![],
            ldflags: vec![],
            exports: vec![],
        };

        let cmd = toolchain(ToolchainFamily::Unix, TargetOs::MacOs)
            .link_extension_command(&input, Language::Cxx);
        assert_eq!(&cmd.args[..3], &["-shared", "-undefined", "dynamic_lookup"]);
    }
}
