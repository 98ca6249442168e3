//! `slvs-build flags` command

use anyhow::Result;

use crate::cli::FlagsArgs;
use slvs_build::builder::{InterpreterVersion, TargetOs};
use slvs_build::{select_toolchain_flags, ToolchainFamily};

pub fn execute(args: FlagsArgs) -> Result<()> {
    let os = match args.os {
        Some(ref name) => name.parse::<TargetOs>()?,
        None => TargetOs::host(),
    };
    let family = match args.compiler {
        Some(ref name) => name.parse::<ToolchainFamily>()?,
        None if os.is_windows() => ToolchainFamily::Msvc,
        None => ToolchainFamily::Unix,
    };
    let python = args.python_version.parse::<InterpreterVersion>()?;

    let profile = select_toolchain_flags(family, os, python)?;
    let msvc = family == ToolchainFamily::Msvc;

    println!("# {} toolchain on {} (Python {})", family, os, python);

    println!("# Defines:");
    for define in &profile.defines {
        let prefix = if msvc { "/D" } else { "-D" };
        println!("  {}{}", prefix, define.to_flag_body());
    }

    println!("# Compile flags:");
    for flag in &profile.compile_args {
        println!("  {}", flag);
    }

    println!("# Link flags:");
    for flag in &profile.link_args {
        println!("  {}", flag);
    }

    println!("# Libraries:");
    for lib in &profile.libraries {
        if msvc {
            println!("  {}.lib", lib);
        } else {
            println!("  -l{}", lib);
        }
    }

    Ok(())
}
