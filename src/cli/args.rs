use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "sftp-idp",
    version,
    about = "Custom identity provider for managed SFTP/FTP/FTPS servers"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v for verbose, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode: suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Answer a single login event and print the response JSON
    Invoke(InvokeArgs),

    /// Serve login lookups over HTTP
    Serve(ServeArgs),
}

/// Where secrets and gateway settings come from.
#[derive(clap::Args, Debug, Clone)]
pub struct SourceArgs {
    /// Gateway config file (TOML); environment variables override it
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Read secrets from a local JSON file instead of AWS Secrets Manager
    #[arg(long)]
    pub secrets_file: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct InvokeArgs {
    /// Event JSON file; reads stdin when omitted or "-"
    #[arg(long)]
    pub event: Option<PathBuf>,

    #[command(flatten)]
    pub source: SourceArgs,
}

#[derive(clap::Args, Debug)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0:8080")]
    pub bind: SocketAddr,

    #[command(flatten)]
    pub source: SourceArgs,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_invoke_with_sources() {
        let cli = Cli::try_parse_from([
            "sftp-idp",
            "-v",
            "invoke",
            "--event",
            "event.json",
            "--secrets-file",
            "secrets.json",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Commands::Invoke(args) => {
                assert_eq!(args.event, Some(PathBuf::from("event.json")));
                assert_eq!(args.source.secrets_file, Some(PathBuf::from("secrets.json")));
                assert!(args.source.config.is_none());
            }
            other => panic!("Expected Invoke, got {:?}", other),
        }
    }

    #[test]
    fn serve_default_bind() {
        let cli = Cli::try_parse_from(["sftp-idp", "serve"]).unwrap();
        match cli.command {
            Commands::Serve(args) => assert_eq!(args.bind.port(), 8080),
            other => panic!("Expected Serve, got {:?}", other),
        }
    }

    #[test]
    fn serve_rejects_bad_bind() {
        assert!(Cli::try_parse_from(["sftp-idp", "serve", "--bind", "not-an-addr"]).is_err());
    }
}
