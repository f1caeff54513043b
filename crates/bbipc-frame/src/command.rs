//! Message group, command and type identifiers.
//!
//! Groups partition the command space per subsystem; the RFS group is the
//! NV-data / remote-filesystem channel and uses its own narrower header.

/// Power control commands.
pub const GROUP_PWR: u8 = 0x01;

/// Voice call commands.
pub const GROUP_CALL: u8 = 0x02;

/// Short message service commands.
pub const GROUP_SMS: u8 = 0x04;

/// Network registration and PLMN commands.
pub const GROUP_NET: u8 = 0x08;

/// Miscellaneous device commands (versions, serial numbers, time).
pub const GROUP_MISC: u8 = 0x0a;

/// Packet data commands.
pub const GROUP_GPRS: u8 = 0x0d;

/// Remote filesystem (NV-data) commands.
pub const GROUP_RFS: u8 = 0x42;

/// RFS command indices.
pub const RFS_NV_READ_ITEM: u8 = 0x11;
pub const RFS_NV_WRITE_ITEM: u8 = 0x12;

/// Request type qualifiers.
pub const TYPE_EXEC: u8 = 0x01;
pub const TYPE_GET: u8 = 0x02;
pub const TYPE_SET: u8 = 0x03;
pub const TYPE_CFRM: u8 = 0x04;
pub const TYPE_EVENT: u8 = 0x05;

/// Response type qualifiers.
pub const TYPE_INDI: u8 = 0x01;
pub const TYPE_RESP: u8 = 0x02;
pub const TYPE_NOTI: u8 = 0x03;

/// Returns a human-readable name for a message group.
pub fn group_name(group: u8) -> &'static str {
    match group {
        GROUP_PWR => "PWR",
        GROUP_CALL => "CALL",
        GROUP_SMS => "SMS",
        GROUP_NET => "NET",
        GROUP_MISC => "MISC",
        GROUP_GPRS => "GPRS",
        GROUP_RFS => "RFS",
        _ => "UNKNOWN",
    }
}

/// Returns true for commands that route to the NV-data store.
pub fn is_rfs(group: u8) -> bool {
    group == GROUP_RFS
}
