//! Pointer message normalization

use crate::backend::message::*;
use crate::protocol::PointerEvent;

/// Button id for plain motion and vertical wheel events
pub const BUTTON_NONE: i32 = -1;
pub const WHEEL_VERTICAL: i32 = -1;
pub const WHEEL_HORIZONTAL: i32 = -2;
pub const BUTTON_LEFT: i32 = 0;
pub const BUTTON_MIDDLE: i32 = 1;
pub const BUTTON_RIGHT: i32 = 2;
pub const BUTTON_X1: i32 = 3;
pub const BUTTON_X2: i32 = 4;

/// `XBUTTON1`/`XBUTTON2` flags in the high word of an extra-button wparam
const XBUTTON1_FLAG: usize = 0x0001_0000;
const XBUTTON2_FLAG: usize = 0x0002_0000;

/// One wheel notch
pub const WHEEL_DELTA: i32 = 120;

/// Pointer capture change requested by a button message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capture {
    /// Route all pointer input to the window until release
    Acquire,
    Release,
    Unchanged,
}

/// A translated pointer message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerAction {
    pub event: PointerEvent,
    pub capture: Capture,
}

/// Translate a pointer message
///
/// Returns `None` for non-pointer messages and for extra-button messages
/// that carry neither extra-button flag.
pub fn translate(msg: &NativeMessage) -> Option<PointerAction> {
    let (button, capture) = match msg.code {
        WM_MOUSEMOVE => (BUTTON_NONE, Capture::Unchanged),
        WM_LBUTTONDOWN => (BUTTON_LEFT, Capture::Acquire),
        WM_LBUTTONUP => (BUTTON_LEFT, Capture::Release),
        WM_MBUTTONDOWN => (BUTTON_MIDDLE, Capture::Acquire),
        WM_MBUTTONUP => (BUTTON_MIDDLE, Capture::Release),
        WM_RBUTTONDOWN => (BUTTON_RIGHT, Capture::Acquire),
        WM_RBUTTONUP => (BUTTON_RIGHT, Capture::Release),
        WM_XBUTTONDOWN | WM_XBUTTONUP => {
            if msg.wparam & XBUTTON1_FLAG != 0 {
                (BUTTON_X1, Capture::Unchanged)
            } else if msg.wparam & XBUTTON2_FLAG != 0 {
                (BUTTON_X2, Capture::Unchanged)
            } else {
                return None;
            }
        }
        WM_MOUSEWHEEL => (WHEEL_VERTICAL, Capture::Unchanged),
        WM_MOUSEHWHEEL => (WHEEL_HORIZONTAL, Capture::Unchanged),
        _ => return None,
    };

    let wheel_delta = match msg.code {
        WM_MOUSEWHEEL | WM_MOUSEHWHEEL => get_wheel_delta_wparam(msg.wparam),
        _ => 0,
    };

    Some(PointerAction {
        event: PointerEvent {
            button,
            x: get_x_lparam(msg.lparam),
            y: get_y_lparam(msg.lparam),
            wheel_delta,
        },
        capture,
    })
}

/// Convert a raw wheel delta to notches
pub fn scale_scroll_delta(delta: i32) -> f32 {
    delta as f32 / WHEEL_DELTA as f32
}
