//! Input handling module
//!
//! Translation of native input into payloads:
//! - pointer buttons, motion and wheels
//! - keyboard keys with left/right modifier resolution
//! - game controller polling with a disconnect grace period
//! - window touch messages and raw HID digitizer reports

pub mod controller;
pub mod digitizer;
pub mod keyboard;
pub mod pointer;
pub mod touch;

pub use controller::{ControllerPoller, ControllerSlotState, ControllerSource, GamepadButtons};
pub use digitizer::{
    ContactDecoder, DecoderRegistry, DeviceClass, FixedStrideDecoder, RawInputPacket,
    TouchContact,
};
