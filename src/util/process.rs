//! Running compilers, cython and the interpreter as subprocesses.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use anyhow::{bail, Context, Result};

/// A command line to run, kept as plain strings so it can be logged,
/// fingerprinted and written to `compile_commands.json` verbatim.
#[derive(Debug, Clone)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<String>,
}

impl ProcessBuilder {
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        for arg in args {
            self = self.arg(arg);
        }
        self
    }

    /// Run to completion with stdout and stderr captured.
    pub fn exec(&self) -> Result<Output> {
        Command::new(&self.program)
            .args(&self.args)
            .output()
            .with_context(|| format!("failed to run `{}`", self.program.display()))
    }

    /// Run and fail with the command line and its stderr on a non-zero exit.
    pub fn exec_and_check(&self) -> Result<Output> {
        let output = self.exec()?;
        if !output.status.success() {
            bail!(
                "`{}` failed with exit code {:?}\n{}",
                self.display_command(),
                output.status.code(),
                String::from_utf8_lossy(&output.stderr)
            );
        }
        Ok(output)
    }

    /// Run, require success, and return stdout as text.
    pub fn exec_stdout(&self) -> Result<String> {
        let output = self.exec_and_check()?;
        String::from_utf8(output.stdout)
            .with_context(|| format!("`{}` printed invalid UTF-8", self.display_command()))
    }

    pub fn display_command(&self) -> String {
        std::iter::once(self.program.display().to_string())
            .chain(self.args.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Find an executable in PATH.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn test_exec_stdout() {
        let stdout = ProcessBuilder::new("echo").arg("slvs").exec_stdout().unwrap();
        assert_eq!(stdout.trim(), "slvs");
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_command_reports_command_line() {
        let err = ProcessBuilder::new("false")
            .args(["--cplus", "slvs.pyx"])
            .exec_and_check()
            .unwrap_err();
        assert!(err.to_string().contains("`false --cplus slvs.pyx` failed"));
    }

    #[test]
    fn test_display_command() {
        let pb = ProcessBuilder::new("g++").args(["-c", "util.cpp", "-o", "util.o"]);
        assert_eq!(pb.display_command(), "g++ -c util.cpp -o util.o");
    }

    #[test]
    fn test_spawn_failure_names_program() {
        let err = ProcessBuilder::new("definitely-not-a-real-program-xyz")
            .exec()
            .unwrap_err();
        assert!(format!("{:#}", err).contains("definitely-not-a-real-program-xyz"));
    }
}
