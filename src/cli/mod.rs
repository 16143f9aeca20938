//! Command-line interface.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use commands::run;

#[derive(Parser, Debug)]
#[command(
    name = "wasend",
    version,
    about = "Send WhatsApp messages through a connection backend and watch its state"
)]
pub struct Cli {
    /// Config file (defaults to ~/.wasend/config.toml)
    #[arg(long, global = true, env = "WASEND_CONFIG")]
    pub config: Option<PathBuf>,

    /// Backend origin, overrides backend.base_url
    #[arg(long, global = true, env = "WASEND_BASE_URL")]
    pub base_url: Option<String>,

    /// Force debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Send a single message
    Send {
        /// Destination, 10 to 15 digits
        #[arg(long, short)]
        number: String,
        /// Message text
        #[arg(long, short)]
        message: String,
    },
    /// Poll the backend once and print its connection state
    Status,
    /// Fetch the pairing QR code
    Qr {
        /// Write the decoded image to this file, or as qr.<ext> into this
        /// directory, instead of printing the payload
        #[arg(long, short)]
        out: Option<PathBuf>,
    },
    /// Print connection changes until interrupted
    Watch,
    /// Prompt for messages while watching the connection (default)
    Interactive,
    /// Write the default config file
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_send_args() {
        let cli = Cli::try_parse_from([
            "wasend",
            "--base-url",
            "http://127.0.0.1:9000",
            "send",
            "-n",
            "9876543210",
            "-m",
            "hello",
        ])
        .unwrap();
        assert_eq!(cli.base_url.as_deref(), Some("http://127.0.0.1:9000"));
        assert_eq!(
            cli.command,
            Some(Commands::Send {
                number: "9876543210".to_string(),
                message: "hello".to_string(),
            })
        );
    }

    #[test]
    fn test_no_subcommand_is_allowed() {
        let cli = Cli::try_parse_from(["wasend", "--debug"]).unwrap();
        assert!(cli.debug);
        assert_eq!(cli.command, None);
    }

    #[test]
    fn test_send_requires_message() {
        assert!(Cli::try_parse_from(["wasend", "send", "--number", "9876543210"]).is_err());
    }
}
