//! Keyboard message normalization
//!
//! Generic modifier keys are resolved to their left/right variants so the
//! consumer never sees `VK_SHIFT`, `VK_CONTROL` or `VK_MENU`.

use log::debug;

use crate::backend::message::NativeMessage;
use crate::protocol::KeyboardEvent;

pub const VK_SHIFT: u32 = 0x10;
pub const VK_CONTROL: u32 = 0x11;
pub const VK_MENU: u32 = 0x12;
pub const VK_LSHIFT: u32 = 0xA0;
pub const VK_RSHIFT: u32 = 0xA1;
pub const VK_LCONTROL: u32 = 0xA2;
pub const VK_RCONTROL: u32 = 0xA3;
pub const VK_LMENU: u32 = 0xA4;
pub const VK_RMENU: u32 = 0xA5;

/// Scan code of the right shift key (set 1)
const SCAN_RIGHT_SHIFT: u32 = 0x36;

/// Bit 24 of a key message lparam: extended key (right-hand CTRL/ALT)
const EXTENDED_KEY_FLAG: usize = 0x0100_0000;

/// Hardware scan code in bits 16..24 of a key message lparam
pub fn scan_code(lparam: isize) -> u32 {
    ((lparam as usize & 0x00FF_0000) >> 16) as u32
}

/// Whether the extended-key bit is set
pub fn is_extended(lparam: isize) -> bool {
    lparam as usize & EXTENDED_KEY_FLAG != 0
}

/// Build a key message lparam from a scan code and extended flag
pub fn key_lparam(scan_code: u32, extended: bool) -> isize {
    let mut value = ((scan_code & 0xFF) as usize) << 16 | 1;
    if extended {
        value |= EXTENDED_KEY_FLAG;
    }
    value as isize
}

/// Resolve the virtual key of a key message to a side-specific key id
///
/// `map_scan_code` converts a scan code to a side-specific virtual key
/// (the platform's `MAPVK_VSC_TO_VK_EX` mapping). If it yields nothing
/// side-specific, the scan code decides.
pub fn resolve_key(
    virtual_key: u32,
    lparam: isize,
    map_scan_code: impl FnOnce(u32) -> u32,
) -> u32 {
    match virtual_key {
        VK_SHIFT => {
            let scan = scan_code(lparam);
            match map_scan_code(scan) {
                key @ (VK_LSHIFT | VK_RSHIFT) => key,
                other => {
                    debug!(
                        "Scan code {:#04x} mapped to {:#04x}, resolving shift side directly",
                        scan, other
                    );
                    if scan == SCAN_RIGHT_SHIFT {
                        VK_RSHIFT
                    } else {
                        VK_LSHIFT
                    }
                }
            }
        }
        VK_CONTROL if is_extended(lparam) => VK_RCONTROL,
        VK_CONTROL => VK_LCONTROL,
        VK_MENU if is_extended(lparam) => VK_RMENU,
        VK_MENU => VK_LMENU,
        other => other,
    }
}

/// Translate a key message into a keyboard event
pub fn translate(msg: &NativeMessage, map_scan_code: impl FnOnce(u32) -> u32) -> KeyboardEvent {
    KeyboardEvent {
        key: resolve_key(msg.wparam as u32, msg.lparam, map_scan_code),
    }
}
