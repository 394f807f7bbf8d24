use clap::{Parser, Subcommand};

use std::path::PathBuf;

use super::constants::{ENV_CONFIG, ENV_DEBUG, ENV_HOST, ENV_PORT, ENV_UPLOADS_ENABLED};

#[derive(Parser)]
#[command(name = "pacecrew")]
#[command(version, about = "Self-hosted social running-group server", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Server host address
    #[arg(long, short = 'H', global = true, env = ENV_HOST)]
    pub host: Option<String>,

    /// Server port
    #[arg(long, short = 'p', global = true, env = ENV_PORT)]
    pub port: Option<u16>,

    /// Disable authentication (for development)
    #[arg(long, global = true)]
    pub no_auth: bool,

    /// Enable debug mode (verbose request logging)
    #[arg(long, global = true, env = ENV_DEBUG)]
    pub debug: bool,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// Enable or disable image uploads
    #[arg(long, global = true, env = ENV_UPLOADS_ENABLED)]
    pub uploads_enabled: Option<bool>,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Start the server (default when no command is given)
    Start,
    /// System maintenance commands
    System {
        #[command(subcommand)]
        command: SystemCommands,
    },
}

#[derive(Subcommand, Clone, Debug)]
pub enum SystemCommands {
    /// Delete the local data directory
    Prune {
        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

/// Parsed CLI options that overlay the config file
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub no_auth: bool,
    pub debug: bool,
    pub config: Option<PathBuf>,
    pub uploads_enabled: Option<bool>,
}

/// Parse CLI arguments into overlay config plus the chosen command
pub fn parse() -> (CliConfig, Option<Commands>) {
    let cli = Cli::parse();
    (
        CliConfig {
            host: cli.host,
            port: cli.port,
            no_auth: cli.no_auth,
            debug: cli.debug,
            config: cli.config,
            uploads_enabled: cli.uploads_enabled,
        },
        cli.command,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_defaults() {
        let cli = Cli::try_parse_from(["pacecrew"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.no_auth);
    }

    #[test]
    fn test_cli_parses_start_with_overrides() {
        let cli =
            Cli::try_parse_from(["pacecrew", "start", "--host", "0.0.0.0", "-p", "9000"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Start)));
        assert_eq!(cli.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(cli.port, Some(9000));
    }

    #[test]
    fn test_cli_parses_prune() {
        let cli = Cli::try_parse_from(["pacecrew", "system", "prune", "-y"]).unwrap();
        match cli.command {
            Some(Commands::System {
                command: SystemCommands::Prune { yes },
            }) => assert!(yes),
            _ => panic!("expected prune command"),
        }
    }
}
