use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::traits::{ClientKind, ModemTransport};

/// The modem chip families this HAL knows how to talk to.
///
/// Each family fixes the device nodes, the wire framing of each channel and
/// whether a receive must hold a wake-lock. The bootstrap sequence that gets
/// the chip to the point where these nodes exist is driven externally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceVariant {
    /// S5PC110-era chip behind `/dev/modem_fmt` / `/dev/modem_rfs`.
    Crespo,
    /// DPRAM tty chip, HDLC-delimited frames, no wake-lock requirement.
    H1,
    /// OneDRAM shared-memory chip, raw struct headers.
    Aries,
    /// XMM6260 behind `/dev/umts_ipc0` / `/dev/umts_rfs0`, HDLC-delimited.
    Xmm6260,
}

impl DeviceVariant {
    pub fn name(self) -> &'static str {
        match self {
            DeviceVariant::Crespo => "crespo",
            DeviceVariant::H1 => "h1",
            DeviceVariant::Aries => "aries",
            DeviceVariant::Xmm6260 => "xmm6260",
        }
    }

    /// Whether receives on this family must hold a wake-lock while blocked.
    pub fn needs_wake_lock(self) -> bool {
        !matches!(self, DeviceVariant::H1)
    }

    /// Wake-lock tag for a client handle of `kind`.
    pub fn wake_lock_tag(self, kind: ClientKind) -> String {
        format!("bbipc_{}-interface", kind.as_str())
    }

    fn default_fmt_node(self) -> &'static str {
        match self {
            DeviceVariant::Crespo => "/dev/modem_fmt",
            DeviceVariant::H1 => "/dev/dpram0",
            DeviceVariant::Aries => "/dev/onedram",
            DeviceVariant::Xmm6260 => "/dev/umts_ipc0",
        }
    }

    fn default_rfs_node(self) -> &'static str {
        match self {
            DeviceVariant::Crespo => "/dev/modem_rfs",
            DeviceVariant::H1 => "/dev/dpram1",
            DeviceVariant::Aries => "/dev/onedram",
            DeviceVariant::Xmm6260 => "/dev/umts_rfs0",
        }
    }

    fn default_power_node(self) -> &'static str {
        match self {
            DeviceVariant::Crespo => "/sys/devices/platform/modemctl/power_mode",
            DeviceVariant::H1 => "/sys/class/modemctl/dpram/power_mode",
            DeviceVariant::Aries => "/sys/class/modemctl/modemctl/power_mode",
            DeviceVariant::Xmm6260 => "/sys/devices/platform/modem_if/power_mode",
        }
    }
}

/// Device-node selection for one [`DeviceTransport`].
///
/// Defaults come from the variant; every path can be overridden, which is
/// how tests point the transport at FIFOs or plain files.
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    pub fmt_node: PathBuf,
    pub rfs_node: PathBuf,
    pub power_node: PathBuf,
    /// Open the descriptor non-blocking. Off by default: the IPC layers are
    /// plain blocking I/O.
    pub non_blocking: bool,
}

impl DeviceConfig {
    pub fn for_variant(variant: DeviceVariant) -> Self {
        Self {
            fmt_node: PathBuf::from(variant.default_fmt_node()),
            rfs_node: PathBuf::from(variant.default_rfs_node()),
            power_node: PathBuf::from(variant.default_power_node()),
            non_blocking: false,
        }
    }
}

/// Character-device transport for one client handle.
///
/// Owns at most one open descriptor at a time. Power control writes a single
/// `'1'`/`'0'` byte to the family's power-mode attribute.
pub struct DeviceTransport {
    variant: DeviceVariant,
    config: DeviceConfig,
    file: Option<File>,
    kind: Option<ClientKind>,
}

impl DeviceTransport {
    pub fn new(variant: DeviceVariant) -> Self {
        Self::with_config(variant, DeviceConfig::for_variant(variant))
    }

    pub fn with_config(variant: DeviceVariant, config: DeviceConfig) -> Self {
        Self {
            variant,
            config,
            file: None,
            kind: None,
        }
    }

    pub fn variant(&self) -> DeviceVariant {
        self.variant
    }

    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    fn node_for(&self, kind: ClientKind) -> &Path {
        match kind {
            ClientKind::Fmt => &self.config.fmt_node,
            ClientKind::Rfs => &self.config.rfs_node,
        }
    }

    fn open_node(&self, path: &Path) -> Result<File> {
        let mut options = OpenOptions::new();
        options.read(true).write(true);

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            let mut flags = libc::O_NOCTTY;
            if self.config.non_blocking {
                flags |= libc::O_NONBLOCK;
            }
            options.custom_flags(flags);
        }

        options.open(path).map_err(|e| TransportError::Open {
            path: path.to_path_buf(),
            source: e,
        })
    }

    fn write_power_mode(&self, value: &[u8]) -> Result<()> {
        let path = &self.config.power_node;
        let mut file = OpenOptions::new()
            .write(true)
            .open(path)
            .map_err(|e| TransportError::PowerControl {
                path: path.clone(),
                source: e,
            })?;
        file.write_all(value).map_err(|e| TransportError::PowerControl {
            path: path.clone(),
            source: e,
        })
    }
}

impl ModemTransport for DeviceTransport {
    fn open(&mut self, kind: ClientKind) -> Result<()> {
        let path = self.node_for(kind).to_path_buf();
        let file = self.open_node(&path)?;
        info!(device = self.variant.name(), kind = kind.as_str(), ?path, "opened modem node");
        self.file = Some(file);
        self.kind = Some(kind);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.file.take().is_some() {
            debug!(device = self.variant.name(), "closed modem node");
        }
        self.kind = None;
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let file = self.file.as_mut().ok_or(TransportError::NotOpen)?;
        let n = file.read(buf)?;
        Ok(n)
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        let file = self.file.as_mut().ok_or(TransportError::NotOpen)?;
        let n = file.write(buf)?;
        Ok(n)
    }

    fn power_on(&mut self) -> Result<()> {
        info!(device = self.variant.name(), "powering modem on");
        self.write_power_mode(b"1")
    }

    fn power_off(&mut self) -> Result<()> {
        info!(device = self.variant.name(), "powering modem off");
        self.write_power_mode(b"0")
    }
}
