//! # benchseal CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use benchseal_cli::content::{
    run_address, run_commit, run_reveal, AddressArgs, CommitArgs, RevealArgs,
};
use benchseal_cli::signing::{
    run_keygen, run_sign, run_verify, KeygenArgs, SignArgs, VerifyArgs,
};

/// Prepare benchmark items for commit-reveal submission.
#[derive(Parser, Debug)]
#[command(name = "benchseal", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the digest and content address of a payload file.
    Address(AddressArgs),

    /// Generate an Ed25519 key and print its public half.
    Keygen(KeygenArgs),

    /// Sign a content digest.
    Sign(SignArgs),

    /// Verify a detached signature over a content digest.
    Verify(VerifyArgs),

    /// Print a commitment reference and a commit-only entry.
    Commit(CommitArgs),

    /// Print a revealed entry.
    Reveal(RevealArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(command = ?cli.command, "benchseal CLI starting");

    let result = match cli.command {
        Commands::Address(args) => run_address(&args),
        Commands::Keygen(args) => run_keygen(&args),
        Commands::Sign(args) => run_sign(&args),
        Commands::Verify(args) => run_verify(&args),
        Commands::Commit(args) => run_commit(&args),
        Commands::Reveal(args) => run_reveal(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
