//! CLI tool for listing login items from an OPVault directory.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use opvault::{Password, Profile, Result, Vault};

/// Read-only 1Password OPVault importer
#[derive(Parser)]
#[command(name = "opvault")]
#[command(author, version, about = "Read-only 1Password OPVault importer", long_about = None)]
struct Cli {
    /// Vault directory (the one containing default/)
    vault: PathBuf,

    /// Master password (will prompt if not provided)
    #[arg(short = 'p', long)]
    password: Option<String>,

    /// Include trashed login entries in the listing
    #[arg(long)]
    include_trashed: bool,
}

fn read_password(cli: &Cli) -> Result<Password> {
    match &cli.password {
        Some(password) => Ok(Password::new(password.clone())),
        None => {
            let prompted = rpassword::prompt_password("Master password: ")?;
            Ok(Password::new(prompted))
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let password = read_password(cli)?;

    let mut profile = Profile::load(cli.vault.join("default").join("profile.js"))?;
    profile.unlock(&password)?;

    let vault = Vault::open(&cli.vault, &profile)?;

    for entry in vault.entries() {
        if entry.category() != opvault::Category::Login {
            continue;
        }
        if entry.trashed() && !cli.include_trashed {
            continue;
        }
        println!("{}\t{}", entry.url(), entry.password().unwrap_or_default());
    }

    profile.lock();
    Ok(())
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version land here too; only real usage errors
            // should exit nonzero.
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
