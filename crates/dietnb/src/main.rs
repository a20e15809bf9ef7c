//! dietnb CLI entry point.
//!
//! The engine activates from inside a running session, not from the shell,
//! so the CLI's job is guidance: it explains how to wire a
//! `DisplayRegistry` into the host. The `install` subcommand for an
//! auto-run startup hook is deliberately stubbed out and performs no
//! filesystem action.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "dietnb")]
#[command(about = "Keep notebooks small by rendering figures to external files")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Install a startup hook for automatic activation (currently disabled)
    Install,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cli.log_level))
        .init();

    match cli.command {
        Some(Commands::Install) => install_startup_hook(),
        None => {
            print_activation_guidance();
            Ok(())
        }
    }
}

fn install_startup_hook() -> anyhow::Result<()> {
    println!("'dietnb install' is currently disabled.");
    if let Some(dir) = startup_hook_dir() {
        println!("(An auto-run hook would live under {}.)", dir.display());
    }
    println!();
    print_activation_guidance();
    Ok(())
}

fn print_activation_guidance() {
    println!("Activate dietnb manually in each session:");
    println!("  - construct a dietnb::strategy::DisplayRegistry,");
    println!("  - call activate() with your host session handle,");
    println!("  - route figure display through DisplayRegistry::display,");
    println!("  - call post_execute() after each cell.");
    println!();
    println!("Figures will then render to '{}' directories", dietnb::DEFAULT_FOLDER_NAME);
    println!("next to the notebook instead of bloating the notebook file.");
}

fn startup_hook_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("dietnb").join("startup"))
}
