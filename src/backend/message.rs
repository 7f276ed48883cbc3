//! Native message model
//!
//! Message codes and parameter packing follow the Win32 window message
//! conventions. They are plain numbers here so translation can be exercised
//! on any host.

/// A native window message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeMessage {
    pub code: u32,
    pub wparam: usize,
    pub lparam: isize,
}

impl NativeMessage {
    pub fn new(code: u32, wparam: usize, lparam: isize) -> Self {
        Self {
            code,
            wparam,
            lparam,
        }
    }
}

pub const WM_CREATE: u32 = 0x0001;
pub const WM_DESTROY: u32 = 0x0002;
pub const WM_MOVE: u32 = 0x0003;
pub const WM_SIZE: u32 = 0x0005;
pub const WM_ACTIVATE: u32 = 0x0006;
pub const WM_QUIT: u32 = 0x0012;
pub const WM_INPUT: u32 = 0x00FF;
pub const WM_KEYDOWN: u32 = 0x0100;
pub const WM_KEYUP: u32 = 0x0101;
pub const WM_SYSKEYDOWN: u32 = 0x0104;
pub const WM_SYSKEYUP: u32 = 0x0105;
pub const WM_MOUSEMOVE: u32 = 0x0200;
pub const WM_LBUTTONDOWN: u32 = 0x0201;
pub const WM_LBUTTONUP: u32 = 0x0202;
pub const WM_RBUTTONDOWN: u32 = 0x0204;
pub const WM_RBUTTONUP: u32 = 0x0205;
pub const WM_MBUTTONDOWN: u32 = 0x0207;
pub const WM_MBUTTONUP: u32 = 0x0208;
pub const WM_MOUSEWHEEL: u32 = 0x020A;
pub const WM_XBUTTONDOWN: u32 = 0x020B;
pub const WM_XBUTTONUP: u32 = 0x020C;
pub const WM_MOUSEHWHEEL: u32 = 0x020E;
pub const WM_TOUCH: u32 = 0x0240;
pub const WM_USER: u32 = 0x0400;

/// `WM_ACTIVATE` low-word values
pub const WA_INACTIVE: u16 = 0;
pub const WA_ACTIVE: u16 = 1;
pub const WA_CLICKACTIVE: u16 = 2;

pub fn loword(value: usize) -> u16 {
    (value & 0xFFFF) as u16
}

pub fn hiword(value: usize) -> u16 {
    ((value >> 16) & 0xFFFF) as u16
}

/// Signed x coordinate packed in the low word of an lparam
pub fn get_x_lparam(lparam: isize) -> i32 {
    loword(lparam as usize) as i16 as i32
}

/// Signed y coordinate packed in the high word of an lparam
pub fn get_y_lparam(lparam: isize) -> i32 {
    hiword(lparam as usize) as i16 as i32
}

/// Signed wheel delta packed in the high word of a wparam
pub fn get_wheel_delta_wparam(wparam: usize) -> i32 {
    hiword(wparam) as i16 as i32
}

/// Pack two signed words the way the native side packs coordinates
pub fn make_lparam(low: i32, high: i32) -> isize {
    (((high as u16 as u32) << 16) | (low as u16 as u32)) as i32 as isize
}

/// Consumer-facing classification of a raw event code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Quit,
    Move,
    Resize,
    Activity,
    KeyDown,
    KeyUp,
    MouseMove,
    LeftMouseDown,
    LeftMouseUp,
    MiddleMouseDown,
    MiddleMouseUp,
    RightMouseDown,
    RightMouseUp,
    ExtraMouseDown,
    ExtraMouseUp,
    MouseWheelVertical,
    MouseWheelHorizontal,
    Touch,
    RawInput,
    ControllerStates,
    Unknown,
}

impl EventKind {
    pub fn from_code(code: u32) -> Self {
        match code {
            WM_DESTROY | WM_QUIT => EventKind::Quit,
            WM_MOVE => EventKind::Move,
            WM_SIZE => EventKind::Resize,
            WM_ACTIVATE => EventKind::Activity,
            WM_KEYDOWN | WM_SYSKEYDOWN => EventKind::KeyDown,
            WM_KEYUP | WM_SYSKEYUP => EventKind::KeyUp,
            WM_MOUSEMOVE => EventKind::MouseMove,
            WM_LBUTTONDOWN => EventKind::LeftMouseDown,
            WM_LBUTTONUP => EventKind::LeftMouseUp,
            WM_MBUTTONDOWN => EventKind::MiddleMouseDown,
            WM_MBUTTONUP => EventKind::MiddleMouseUp,
            WM_RBUTTONDOWN => EventKind::RightMouseDown,
            WM_RBUTTONUP => EventKind::RightMouseUp,
            WM_XBUTTONDOWN => EventKind::ExtraMouseDown,
            WM_XBUTTONUP => EventKind::ExtraMouseUp,
            WM_MOUSEWHEEL => EventKind::MouseWheelVertical,
            WM_MOUSEHWHEEL => EventKind::MouseWheelHorizontal,
            WM_TOUCH => EventKind::Touch,
            WM_INPUT => EventKind::RawInput,
            crate::protocol::CONTROLLER_EVENT => EventKind::ControllerStates,
            _ => EventKind::Unknown,
        }
    }
}
