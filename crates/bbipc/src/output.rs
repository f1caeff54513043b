use std::io::IsTerminal;

use bbipc_frame::command::group_name;
use bbipc_frame::Message;
use bbipc_nv::{NvConfig, NvStatus};
use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

pub fn print_nv_status(config: &NvConfig, status: &NvStatus, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = serde_json::json!({
                "data_path": config.data_path,
                "size": config.size,
                "primary_present": status.primary_present,
                "primary_size_ok": status.primary_size_ok,
                "digest_match": status.digest_match,
                "backup_present": status.backup_present,
                "backup_size_ok": status.backup_size_ok,
                "state_committed": status.state_committed,
            });
            println!("{out}");
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["CHECK", "RESULT"])
                .add_row(vec!["primary present".into(), flag(status.primary_present)])
                .add_row(vec!["primary size".into(), flag(status.primary_size_ok)])
                .add_row(vec!["digest match".into(), flag(status.digest_match)])
                .add_row(vec!["backup present".into(), flag(status.backup_present)])
                .add_row(vec!["backup size".into(), flag(status.backup_size_ok)])
                .add_row(vec!["state committed".into(), flag(status.state_committed)]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "nv {} ({} bytes): primary={} size={} digest={} backup={} state={}",
                config.data_path.display(),
                config.size,
                flag(status.primary_present),
                flag(status.primary_size_ok),
                flag(status.digest_match),
                flag(status.backup_present && status.backup_size_ok),
                flag(status.state_committed),
            );
        }
    }
}

pub fn print_message(msg: &Message, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = serde_json::json!({
                "group": group_name(msg.group),
                "command": format!("{:#06x}", msg.command()),
                "mseq": msg.mseq,
                "aseq": msg.aseq,
                "type": msg.kind,
                "payload_size": msg.payload.len(),
                "payload_hex": hex::encode(&msg.payload),
            });
            println!("{out}");
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["GROUP", "COMMAND", "MSEQ", "ASEQ", "TYPE", "PAYLOAD"])
                .add_row(vec![
                    group_name(msg.group).to_string(),
                    format!("{:#06x}", msg.command()),
                    msg.mseq.to_string(),
                    msg.aseq.to_string(),
                    msg.kind.to_string(),
                    payload_preview(&msg.payload),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "group={} command={:#06x} mseq={} aseq={} type={} payload={}",
                group_name(msg.group),
                msg.command(),
                msg.mseq,
                msg.aseq,
                msg.kind,
                payload_preview(&msg.payload),
            );
        }
    }
}

pub fn print_bytes(data: &[u8], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = serde_json::json!({
                "size": data.len(),
                "hex": hex::encode(data),
            });
            println!("{out}");
        }
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("{}", hex::encode(data));
        }
    }
}

fn flag(ok: bool) -> String {
    if ok { "ok".into() } else { "MISSING".into() }
}

fn payload_preview(payload: &[u8]) -> String {
    const PREVIEW: usize = 32;
    if payload.len() <= PREVIEW {
        hex::encode(payload)
    } else {
        format!("{}… ({} bytes)", hex::encode(&payload[..PREVIEW]), payload.len())
    }
}
