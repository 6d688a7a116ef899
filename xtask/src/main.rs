use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process::Command;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Tasks for the project", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the whole workspace
    Build,
    /// Run the workspace test suite
    Test,
    /// Run the simulator CLI, forwarding extra arguments
    Run {
        #[arg(trailing_var_arg = true)]
        args: Vec<String>,
    },
}

fn cargo(args: &[&str]) -> Result<()> {
    let status = Command::new("cargo").args(args).status()?;
    if !status.success() {
        anyhow::bail!("cargo {} failed", args.join(" "));
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Build => cargo(&["build", "--workspace"]),
        Commands::Test => cargo(&["test", "--workspace"]),
        Commands::Run { args } => {
            let mut full = vec!["run", "-p", "pageboot-cli", "--"];
            full.extend(args.iter().map(String::as_str));
            cargo(&full)
        }
    }
}
