//! Fixed byte layout of the shared region
//!
//! Producer and consumer builds must agree on every offset here. There is
//! no version field in the header, so any change to this file is a
//! breaking change for both sides.

use crate::input::controller::MAX_CONTROLLERS;
use crate::input::digitizer::MAX_TOUCH_CONTACTS;

/// Offset of the write-state tag (`u32`, atomic)
pub const WRITE_STATE_OFFSET: usize = 0;
/// Offset of the seqlock generation counter (`u32`, atomic)
pub const SEQUENCE_OFFSET: usize = 4;
/// Offset of the native window handle (`u64`), written once after creation
pub const WINDOW_HANDLE_OFFSET: usize = 8;
/// Offset of the native instance handle (`u64`), written once after creation
pub const INSTANCE_HANDLE_OFFSET: usize = 16;
/// Offset of the cached client width (`i32`)
pub const WINDOW_WIDTH_OFFSET: usize = 24;
/// Offset of the cached client height (`i32`)
pub const WINDOW_HEIGHT_OFFSET: usize = 28;
/// Offset of the raw native code of the last event (`u32`)
pub const EVENT_TYPE_OFFSET: usize = 32;
/// Offset of the payload variant tag (`u32`)
pub const PAYLOAD_TAG_OFFSET: usize = 36;
/// Start of the payload slot
pub const PAYLOAD_OFFSET: usize = 40;

/// Size of the fixed header preceding the payload slot
pub const HEADER_SIZE: usize = PAYLOAD_OFFSET;

/// Encoded size of one controller slot
pub const CONTROLLER_SLOT_SIZE: usize = 16;
/// Encoded size of one touch contact
pub const TOUCH_CONTACT_SIZE: usize = 16;

/// Largest encoded payload: a count followed by a full contact list
pub const PAYLOAD_CAPACITY: usize = 4 + MAX_TOUCH_CONTACTS * TOUCH_CONTACT_SIZE;

/// Bytes available for the text of a fatal message (after its length prefix)
pub const FATAL_MESSAGE_CAPACITY: usize = PAYLOAD_CAPACITY - 4;

/// Smallest region able to hold the header and every payload variant
pub const REGION_MIN_SIZE: usize = HEADER_SIZE + PAYLOAD_CAPACITY;

/// Required alignment of the region base address
pub const REGION_ALIGN: usize = 8;

/// Marker returned by a controller poll when at least one slot responded
pub const CONTROLLER_EVENT: u32 = 0xFFFF_FFFE;

const _: () = assert!(MAX_CONTROLLERS * CONTROLLER_SLOT_SIZE <= PAYLOAD_CAPACITY);
const _: () = assert!(PAYLOAD_OFFSET % REGION_ALIGN == 0);

/// Write-state tag naming which event, if any, is currently published
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WriteState {
    /// Nothing published since the last reset
    #[default]
    None,
    /// Window activation changed
    WindowActivity,
    /// Window moved
    WindowMove,
    /// Client area changed size
    WindowResize,
    /// Consumer has mapped the region but no window exists yet
    AwaitingContext,
    /// Window exists but the pump has not started
    AwaitingStart,
    /// Construction failed; payload holds the message
    Fatal,
    /// Window destroyed or quit requested
    Quit,
    /// Unrecognized raw value
    Other(u32),
}

impl WriteState {
    /// Decode from the raw header value
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            0x00 => WriteState::None,
            0xF9 => WriteState::WindowActivity,
            0xFA => WriteState::WindowMove,
            0xFB => WriteState::WindowResize,
            0xFC => WriteState::AwaitingContext,
            0xFD => WriteState::AwaitingStart,
            0xFE => WriteState::Fatal,
            0xFF => WriteState::Quit,
            other => WriteState::Other(other),
        }
    }

    /// Encode to the raw header value
    pub fn to_raw(self) -> u32 {
        match self {
            WriteState::None => 0x00,
            WriteState::WindowActivity => 0xF9,
            WriteState::WindowMove => 0xFA,
            WriteState::WindowResize => 0xFB,
            WriteState::AwaitingContext => 0xFC,
            WriteState::AwaitingStart => 0xFD,
            WriteState::Fatal => 0xFE,
            WriteState::Quit => 0xFF,
            WriteState::Other(v) => v,
        }
    }

    pub fn is_quit(self) -> bool {
        self == WriteState::Quit
    }
}
