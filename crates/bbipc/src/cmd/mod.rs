use std::path::{Path, PathBuf};

use bbipc_nv::NvConfig;
use clap::{Args, Subcommand, ValueEnum};

use crate::exit::{io_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod frame;
pub mod nv;
pub mod serve;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Inspect and repair the NV-data file set.
    #[command(subcommand)]
    Nv(NvCommand),
    /// Decode a captured wire frame.
    Frame(FrameArgs),
    /// Open the RFS channel and service modem NV requests until interrupted.
    ServeRfs(ServeArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat, nv: NvConfig) -> CliResult<i32> {
    match command {
        Command::Nv(command) => nv::run(command, format, nv),
        Command::Frame(args) => frame::run(args, format),
        Command::ServeRfs(args) => serve::run(args, nv),
        Command::Version(args) => version::run(args),
    }
}

/// Resolve the NV configuration, applying a JSON profile when given.
pub fn load_nv_config(profile: Option<&Path>) -> CliResult<NvConfig> {
    let Some(path) = profile else {
        return Ok(NvConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .map_err(|err| io_error(&format!("failed reading {}", path.display()), err))?;
    serde_json::from_str(&text)
        .map_err(|err| CliError::new(USAGE, format!("invalid nv profile: {err}")))
}

#[derive(Subcommand, Debug)]
pub enum NvCommand {
    /// Report file-set consistency without repairing anything.
    Status(NvStatusArgs),
    /// Run the consistency check, restoring from backup as needed.
    Check(NvCheckArgs),
    /// Read a byte range from the parameter blob.
    Read(NvReadArgs),
    /// Write bytes into the parameter blob and refresh the digest.
    Write(NvWriteArgs),
    /// Rebuild the backup pair from the primary.
    Backup(NvBackupArgs),
    /// Rebuild the primary from the backup.
    Restore(NvRestoreArgs),
}

#[derive(Args, Debug)]
pub struct NvStatusArgs {}

#[derive(Args, Debug)]
pub struct NvCheckArgs {}

#[derive(Args, Debug)]
pub struct NvReadArgs {
    /// Byte offset into the blob (decimal or 0x-prefixed hex).
    #[arg(long)]
    pub offset: String,
    /// Number of bytes to read.
    #[arg(long)]
    pub length: String,
}

#[derive(Args, Debug)]
pub struct NvWriteArgs {
    /// Byte offset into the blob (decimal or 0x-prefixed hex).
    #[arg(long)]
    pub offset: String,
    /// Bytes to write, hex-encoded.
    #[arg(long, conflicts_with = "file")]
    pub data_hex: Option<String>,
    /// File whose contents are written verbatim.
    #[arg(long)]
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct NvBackupArgs {}

#[derive(Args, Debug)]
pub struct NvRestoreArgs {}

#[derive(Args, Debug)]
pub struct FrameArgs {
    /// Wire variant the frame was captured from.
    #[arg(long, value_enum)]
    pub variant: FrameKind,
    /// Frame bytes, hex-encoded (whitespace tolerated).
    #[arg(long, conflicts_with = "file")]
    pub hex: Option<String>,
    /// File containing the raw frame bytes.
    #[arg(long)]
    pub file: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum FrameKind {
    Fixed,
    Hdlc,
    Rfs,
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Device family to open.
    #[arg(long, value_enum)]
    pub device: DeviceKind,
    /// Override the RFS device node.
    #[arg(long, value_name = "PATH")]
    pub rfs_node: Option<PathBuf>,
    /// Override the power control node.
    #[arg(long, value_name = "PATH")]
    pub power_node: Option<PathBuf>,
    /// Power the modem on before serving.
    #[arg(long)]
    pub power_on: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum DeviceKind {
    Crespo,
    H1,
    Aries,
    Xmm6260,
}

impl DeviceKind {
    pub fn as_variant(self) -> bbipc_transport::DeviceVariant {
        match self {
            DeviceKind::Crespo => bbipc_transport::DeviceVariant::Crespo,
            DeviceKind::H1 => bbipc_transport::DeviceVariant::H1,
            DeviceKind::Aries => bbipc_transport::DeviceVariant::Aries,
            DeviceKind::Xmm6260 => bbipc_transport::DeviceVariant::Xmm6260,
        }
    }
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Include build metadata.
    #[arg(long)]
    pub extended: bool,
}

/// Parse a decimal or 0x-prefixed hex number.
pub fn parse_number(input: &str) -> CliResult<usize> {
    let input = input.trim();
    let parsed = match input.strip_prefix("0x").or_else(|| input.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(hex, 16),
        None => input.parse(),
    };
    parsed.map_err(|_| CliError::new(USAGE, format!("invalid number: {input}")))
}
