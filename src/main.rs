// src/main.rs

mod cli;
mod commands;

use clap::{CommandFactory, Parser};
use cli::{Cli, Commands};
use commands::Session;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries command output
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    if let Commands::Remove = command {
        return commands::cmd_remove();
    }

    let session = Session::new(cli.config.as_deref(), cli.arch)?;
    match command {
        Commands::List => commands::cmd_list(&session),
        Commands::Download { version } => commands::cmd_download(&session, version.as_deref()),
        Commands::Install { version } => commands::cmd_install(&session, version.as_deref()),
        Commands::FromTarball {
            tarball,
            version,
            no_install,
        } => commands::cmd_from_tarball(&session, &tarball, &version, no_install),
        Commands::Remove => commands::cmd_remove(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_fromtarball() {
        let cli = Cli::try_parse_from([
            "godeb",
            "-v",
            "--arch",
            "386",
            "fromtarball",
            "go1.2.linux-386.tar.gz",
            "1.2",
            "--no-install",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.arch.as_deref(), Some("386"));
        assert!(matches!(
            cli.command,
            Some(Commands::FromTarball { ref version, no_install: true, .. }) if version == "1.2"
        ));
    }

    #[test]
    fn test_version_is_optional() {
        let cli = Cli::try_parse_from(["godeb", "install"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Install { version: None })));
    }
}
