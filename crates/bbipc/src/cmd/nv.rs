use bbipc_nv::{NvConfig, NvStore};

use crate::cmd::{parse_number, NvCommand, NvReadArgs, NvWriteArgs};
use crate::exit::{io_error, nv_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_bytes, print_nv_status, OutputFormat};

pub fn run(command: NvCommand, format: OutputFormat, nv: NvConfig) -> CliResult<i32> {
    let store = NvStore::new(nv);
    match command {
        NvCommand::Status(_) => {
            let status = store.status();
            print_nv_status(store.config(), &status, format);
            Ok(SUCCESS)
        }
        NvCommand::Check(_) => {
            store
                .check()
                .map_err(|err| nv_error("nv check failed", err))?;
            println!("nv file set consistent");
            Ok(SUCCESS)
        }
        NvCommand::Read(args) => read(&store, args, format),
        NvCommand::Write(args) => write(&store, args),
        NvCommand::Backup(_) => {
            store
                .backup_create()
                .map_err(|err| nv_error("nv backup failed", err))?;
            println!("backup created");
            Ok(SUCCESS)
        }
        NvCommand::Restore(_) => {
            store
                .restore()
                .map_err(|err| nv_error("nv restore failed", err))?;
            println!("primary restored from backup");
            Ok(SUCCESS)
        }
    }
}

fn read(store: &NvStore, args: NvReadArgs, format: OutputFormat) -> CliResult<i32> {
    let offset = parse_number(&args.offset)?;
    let length = parse_number(&args.length)?;

    let data = store
        .read(offset, length)
        .map_err(|err| nv_error("nv read failed", err))?;
    print_bytes(&data, format);
    Ok(SUCCESS)
}

fn write(store: &NvStore, args: NvWriteArgs) -> CliResult<i32> {
    let offset = parse_number(&args.offset)?;
    let data = resolve_data(&args)?;

    store
        .write(offset, &data)
        .map_err(|err| nv_error("nv write failed", err))?;
    println!("wrote {} bytes at {offset:#x}", data.len());
    Ok(SUCCESS)
}

fn resolve_data(args: &NvWriteArgs) -> CliResult<Vec<u8>> {
    if let Some(hex_str) = &args.data_hex {
        let cleaned: String = hex_str.split_whitespace().collect();
        return hex::decode(&cleaned)
            .map_err(|err| CliError::new(USAGE, format!("--data-hex is not valid hex: {err}")));
    }
    if let Some(path) = &args.file {
        return std::fs::read(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err));
    }
    Err(CliError::new(USAGE, "one of --data-hex or --file is required"))
}
