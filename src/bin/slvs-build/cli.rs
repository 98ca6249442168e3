//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// slvs-build - build and package the Solvespace Python extension
#[derive(Parser)]
#[command(name = "slvs-build")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Project directory (defaults to the nearest one holding slvs-build.toml)
    #[arg(short = 'C', long, global = true, env = "SLVS_BUILD_PROJECT_DIR")]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compile the extension module
    BuildExt(BuildExtArgs),

    /// Create a source distribution
    Sdist(SdistArgs),

    /// Copy the native sources into the package tree
    Stage(StageArgs),

    /// Remove staged sources (and optionally build outputs)
    Clean(CleanArgs),

    /// Show the compiler flags selected for a toolchain
    Flags(FlagsArgs),

    /// Print the package version
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct BuildExtArgs {
    /// Toolchain family (unix, mingw32, msvc)
    #[arg(long)]
    pub compiler: Option<String>,

    /// Python interpreter to build against
    #[arg(long)]
    pub python: Option<PathBuf>,

    /// Number of parallel jobs
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Copy the module into the package directory as well
    #[arg(short, long)]
    pub inplace: bool,

    /// Emit compile_commands.json into the build directory
    #[arg(long)]
    pub emit_compile_commands: bool,

    /// Show what would be done without doing it
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct SdistArgs {
    /// Directory to put the archive in
    #[arg(short, long)]
    pub dist_dir: Option<PathBuf>,

    /// Keep the staged sources after archiving
    #[arg(short, long)]
    pub keep_temp: bool,

    /// Show what would be done without doing it
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct StageArgs {
    /// Show what would be done without doing it
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct CleanArgs {
    /// Also remove the build and dist directories
    #[arg(long)]
    pub all: bool,

    /// Show what would be done without doing it
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct FlagsArgs {
    /// Toolchain family (unix, mingw32, msvc); defaults to the host's usual one
    #[arg(long)]
    pub compiler: Option<String>,

    /// Host operating system (linux, macos, windows)
    #[arg(long)]
    pub os: Option<String>,

    /// Target interpreter version
    #[arg(long, default_value = "3.8")]
    pub python_version: String,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: Shell,
}
