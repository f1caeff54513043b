use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bbipc_client::{rfs, ClientError, IpcClient};
use bbipc_nv::{NvConfig, NvStore};
use bbipc_transport::{ClientKind, DeviceConfig, DeviceTransport};
use tracing::{info, warn};

use crate::cmd::ServeArgs;
use crate::exit::{client_error, nv_error, CliResult, SUCCESS};

/// Open the RFS channel and answer NV requests until Ctrl-C.
pub fn run(args: ServeArgs, nv: NvConfig) -> CliResult<i32> {
    let variant = args.device.as_variant();
    let mut config = DeviceConfig::for_variant(variant);
    if let Some(node) = args.rfs_node {
        config.rfs_node = node;
    }
    if let Some(node) = args.power_node {
        config.power_node = node;
    }

    let store = NvStore::new(nv);
    store
        .check()
        .map_err(|err| nv_error("nv check failed", err))?;

    let transport = DeviceTransport::with_config(variant, config);
    let mut client = IpcClient::new(variant, ClientKind::Rfs, transport);
    client
        .connect()
        .map_err(|err| client_error("connect failed", err))?;
    if args.power_on {
        client
            .power_on()
            .map_err(|err| client_error("power-on failed", err))?;
    }

    let running = Arc::new(AtomicBool::new(true));
    let flag = Arc::clone(&running);
    let _ = ctrlc::set_handler(move || {
        flag.store(false, Ordering::SeqCst);
    });

    info!(device = variant.name(), "serving rfs requests");
    while running.load(Ordering::SeqCst) {
        match rfs::serve_next(&mut client, &store) {
            Ok(()) => {}
            Err(ClientError::Disconnected) => {
                warn!("modem closed the rfs stream");
                break;
            }
            Err(err) => {
                let _ = client.disconnect();
                return Err(client_error("rfs service failed", err));
            }
        }
    }

    info!("stopping rfs service");
    client
        .disconnect()
        .map_err(|err| client_error("close failed", err))?;
    Ok(SUCCESS)
}
