//! Native windowing seam
//!
//! The pump in [`super::pump`] only talks to the operating system through
//! [`Platform`]. The Win32 implementation lives in `backend::win32`; tests
//! drive the pump with a scripted implementation instead.

use crate::input::controller::ControllerSource;
use crate::input::digitizer::RawInputPacket;
use crate::input::touch::TouchPoint;

use super::cursor::{CursorHandle, SystemCursor};
use super::message::NativeMessage;

/// Opaque native handle (window or module instance)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NativeHandle(pub u64);

impl NativeHandle {
    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

/// Parameters for creating the window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowSpec {
    pub title: String,
    /// Requested client-area width
    pub width: i32,
    /// Requested client-area height
    pub height: i32,
    /// Left edge, `None` lets the OS choose
    pub x: Option<i32>,
    /// Top edge, `None` lets the OS choose
    pub y: Option<i32>,
}

impl WindowSpec {
    /// Create a new window spec at an OS-chosen position
    pub fn new(title: impl Into<String>, width: i32, height: i32) -> Self {
        Self {
            title: title.into(),
            width,
            height,
            x: None,
            y: None,
        }
    }

    /// Place the window; negative coordinates are left to the OS, per axis
    pub fn at(mut self, x: i32, y: i32) -> Self {
        self.x = (x >= 0).then_some(x);
        self.y = (y >= 0).then_some(y);
        self
    }
}

/// Result of a successful window creation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreatedWindow {
    pub window: NativeHandle,
    pub instance: NativeHandle,
    /// Actual client-area size after creation
    pub client_width: i32,
    pub client_height: i32,
}

/// Native windowing operations used by the pump
///
/// Messages reach the pump two ways. Queued messages come from
/// [`next_message`](Platform::next_message), which also translates and
/// dispatches them. Messages delivered straight to the window procedure
/// (during creation, showing, or dispatch) are buffered by the platform and
/// drained with [`take_notifications`](Platform::take_notifications).
pub trait Platform: ControllerSource {
    /// Create the window (hidden)
    fn create_window(&mut self, spec: &WindowSpec) -> Result<CreatedWindow, PlatformError>;

    /// Show the window and start receiving messages for it
    fn show_window(&mut self, window: NativeHandle);

    fn destroy_window(&mut self, window: NativeHandle) -> Result<(), PlatformError>;

    /// Retrieve, translate and dispatch one queued message without blocking
    fn next_message(&mut self, window: NativeHandle) -> Option<NativeMessage>;

    /// Messages the window procedure received since the last call
    fn take_notifications(&mut self, window: NativeHandle) -> Vec<NativeMessage>;

    /// Queue a message to the window
    fn post_message(&self, window: NativeHandle, msg: NativeMessage) -> Result<(), PlatformError>;

    /// Register touch and raw digitizer input for the window
    fn register_input_sources(&mut self, window: NativeHandle) -> Result<(), PlatformError>;

    /// Current client-area size
    fn client_size(&self, window: NativeHandle) -> Option<(i32, i32)>;

    /// Invalidate the client area so it is repainted
    fn request_repaint(&mut self, window: NativeHandle);

    fn set_capture(&mut self, window: NativeHandle);
    fn release_capture(&mut self);

    /// Map a scan code to a side-specific virtual key
    fn map_scan_code(&self, scan_code: u32) -> u32;

    /// Read the raw input packet referenced by a WM_INPUT message
    fn read_raw_input(&mut self, lparam: isize) -> Result<RawInputPacket, PlatformError>;

    /// Read and release the touch points of a WM_TOUCH message
    fn read_touch_points(
        &mut self,
        wparam: usize,
        lparam: isize,
    ) -> Result<Vec<TouchPoint>, PlatformError>;

    fn load_cursor(&mut self, cursor: SystemCursor) -> Option<CursorHandle>;

    /// Make a cursor the current one
    fn set_cursor(&mut self, cursor: CursorHandle);

    /// Make a cursor the window class default
    fn set_class_cursor(&mut self, window: NativeHandle, cursor: CursorHandle);

    /// Top-left corner of the window in screen coordinates
    fn window_position(&self, window: NativeHandle) -> Option<(i32, i32)>;
    fn set_window_position(&mut self, window: NativeHandle, x: i32, y: i32);
    /// Resize the window's outer frame
    fn set_window_size(&mut self, window: NativeHandle, width: i32, height: i32);
    /// Toggle the title bar and frame
    fn set_border(&mut self, window: NativeHandle, bordered: bool);
    /// Dots per inch of the monitor showing the window, 96 if unknown
    fn dpi(&self, window: NativeHandle) -> u32;
    /// Bring the window to the foreground and give it keyboard focus
    fn focus(&mut self, window: NativeHandle);
}

/// Platform errors
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("Failed to register window class: {0}")]
    ClassRegistration(String),
    #[error("Failed to create window: {0}")]
    WindowCreation(String),
    #[error("Failed to destroy window: {0}")]
    WindowDestruction(String),
    #[error("Failed to post message {code:#x}: {reason}")]
    PostMessage { code: u32, reason: String },
    #[error("Failed to register input source: {0}")]
    InputRegistration(String),
    #[error("Failed to read raw input: {0}")]
    RawInput(String),
    #[error("Failed to read touch input: {0}")]
    TouchInput(String),
}
