//! slvs-build CLI - builds and packages the Solvespace Python extension

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("slvs_build=debug")
    } else {
        EnvFilter::new("slvs_build=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let project_dir = cli.project_dir.as_deref();
    match cli.command {
        Commands::BuildExt(args) => commands::build_ext::execute(args, project_dir, cli.verbose),
        Commands::Sdist(args) => commands::sdist::execute(args, project_dir),
        Commands::Stage(args) => commands::stage::execute(args, project_dir),
        Commands::Clean(args) => commands::clean::execute(args, project_dir),
        Commands::Flags(args) => commands::flags::execute(args),
        Commands::Version => commands::version::execute(project_dir),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
