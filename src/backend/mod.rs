//! Backend module
//!
//! This module contains the window side of the bridge:
//! - the native message model and the [`Platform`] seam
//! - the window event pump ([`WindowContext`])
//! - the cursor command channel
//! - the Win32 implementation (Windows only)

pub mod cursor;
pub mod message;
pub mod platform;
pub mod pump;
#[cfg(test)]
pub(crate) mod testing;
#[cfg(target_os = "windows")]
pub mod win32;

pub use cursor::CursorId;
pub use message::{EventKind, NativeMessage};
pub use platform::{NativeHandle, Platform, PlatformError, WindowSpec};
pub use pump::{BridgeError, WindowContext};
