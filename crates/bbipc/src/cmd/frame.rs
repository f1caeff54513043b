use bbipc_frame::codec::{self, FrameVariant};

use crate::cmd::{FrameArgs, FrameKind};
use crate::exit::{frame_error, io_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_message, OutputFormat};

pub fn run(args: FrameArgs, format: OutputFormat) -> CliResult<i32> {
    let bytes = resolve_bytes(&args)?;
    let variant = match args.variant {
        FrameKind::Fixed => FrameVariant::Fixed,
        FrameKind::Hdlc => FrameVariant::Hdlc,
        FrameKind::Rfs => FrameVariant::Rfs,
    };

    let msg = codec::decode(&bytes, variant)
        .map_err(|err| frame_error("frame decode failed", err))?;
    print_message(&msg, format);
    Ok(SUCCESS)
}

fn resolve_bytes(args: &FrameArgs) -> CliResult<Vec<u8>> {
    if let Some(hex_str) = &args.hex {
        let cleaned: String = hex_str.split_whitespace().collect();
        return hex::decode(&cleaned)
            .map_err(|err| CliError::new(USAGE, format!("--hex is not valid hex: {err}")));
    }
    if let Some(path) = &args.file {
        return std::fs::read(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err));
    }
    Err(CliError::new(USAGE, "one of --hex or --file is required"))
}
