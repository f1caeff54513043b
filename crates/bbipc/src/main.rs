mod cmd;
mod exit;
mod logging;
mod output;

use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "bbipc", version, about = "Baseband modem IPC and NV-data tool")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    /// JSON file overriding the NV file-set locations and parameters.
    #[arg(long, value_name = "FILE", global = true)]
    nv_profile: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::load_nv_config(cli.nv_profile.as_deref())
        .and_then(|nv| cmd::run(cli.command, format, nv));

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nv_read_subcommand() {
        let cli = Cli::try_parse_from([
            "bbipc", "nv", "read", "--offset", "0x10", "--length", "4",
        ])
        .expect("nv read args should parse");

        assert!(matches!(
            cli.command,
            Command::Nv(cmd::NvCommand::Read(_))
        ));
    }

    #[test]
    fn rejects_conflicting_write_payload_args() {
        let err = Cli::try_parse_from([
            "bbipc",
            "nv",
            "write",
            "--offset",
            "0",
            "--data-hex",
            "aabb",
            "--file",
            "/tmp/blob",
        ])
        .expect_err("conflicting args should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn parses_serve_rfs_with_device() {
        let cli = Cli::try_parse_from(["bbipc", "serve-rfs", "--device", "crespo"])
            .expect("serve-rfs args should parse");

        assert!(matches!(cli.command, Command::ServeRfs(_)));
    }

    #[test]
    fn nv_profile_is_global() {
        let cli = Cli::try_parse_from([
            "bbipc",
            "nv",
            "status",
            "--nv-profile",
            "/tmp/profile.json",
        ])
        .expect("global nv-profile should parse after subcommand");

        assert_eq!(cli.nv_profile, Some(PathBuf::from("/tmp/profile.json")));
    }
}
