//! Win32 backend
//!
//! This module provides the Windows implementation of [`Platform`]:
//! - a window class whose procedure records messages into a per-window inbox
//! - raw input, touch and XInput acquisition
//! - the window property and cursor calls

mod input;
mod window;

use std::collections::HashMap;
use std::ffi::c_void;

use log::{debug, warn};
use windows::core::PCWSTR;
use windows::Win32::Foundation::{BOOL, HWND, LPARAM, RECT, WPARAM};
use windows::Win32::Graphics::Gdi::{InvalidateRect, UpdateWindow};
use windows::Win32::UI::HiDpi::GetDpiForWindow;
use windows::Win32::UI::Input::KeyboardAndMouse::{ReleaseCapture, SetCapture, SetFocus};
use windows::Win32::UI::WindowsAndMessaging::{
    DestroyWindow, DispatchMessageW, GetClientRect, GetWindowLongPtrW, GetWindowRect, IsWindow,
    LoadCursorW, PeekMessageW, PostMessageW, SetClassLongPtrW, SetCursor, SetForegroundWindow,
    SetWindowLongPtrW, SetWindowPos, ShowWindow, TranslateMessage, GCLP_HCURSOR, GWL_STYLE,
    HCURSOR, MSG, PM_REMOVE, SWP_FRAMECHANGED, SWP_NOMOVE, SWP_NOSIZE, SWP_NOZORDER, SW_SHOW,
    WM_QUIT, WS_OVERLAPPEDWINDOW,
};

use crate::input::controller::{ControllerSlotState, ControllerSource};
use crate::input::digitizer::RawInputPacket;
use crate::input::touch::TouchPoint;

use super::cursor::{CursorHandle, SystemCursor};
use super::message::NativeMessage;
use super::platform::{CreatedWindow, NativeHandle, Platform, PlatformError, WindowSpec};

use window::{hwnd, Inbox};

const DEFAULT_DPI: u32 = 96;

/// Win32 implementation of [`Platform`]
///
/// Must be used from the thread that creates its windows.
#[derive(Default)]
pub struct Win32Platform {
    /// Inboxes by window handle; each box outlives its window
    inboxes: HashMap<u64, Box<Inbox>>,
}

impl Win32Platform {
    /// Create a new Win32 platform
    pub fn new() -> Self {
        Self::default()
    }

    fn inbox(&self, window: NativeHandle) -> Option<&Inbox> {
        self.inboxes.get(&window.0).map(|inbox| inbox.as_ref())
    }
}

impl ControllerSource for Win32Platform {
    fn query_controller(&mut self, slot: usize) -> Option<ControllerSlotState> {
        input::query_controller(slot)
    }
}

impl Platform for Win32Platform {
    fn create_window(&mut self, spec: &WindowSpec) -> Result<CreatedWindow, PlatformError> {
        let inbox = Box::new(Inbox::default());
        let created = window::create(spec, &inbox)?;
        self.inboxes.insert(created.window.0, inbox);
        debug!(
            "Created native window {:#x} at {:?},{:?}",
            created.window.0, spec.x, spec.y
        );
        Ok(created)
    }

    fn show_window(&mut self, window: NativeHandle) {
        unsafe {
            let _ = ShowWindow(hwnd(window), SW_SHOW);
            let _ = UpdateWindow(hwnd(window));
        }
    }

    fn destroy_window(&mut self, window: NativeHandle) -> Result<(), PlatformError> {
        let result = unsafe {
            if IsWindow(hwnd(window)).as_bool() {
                DestroyWindow(hwnd(window))
                    .map_err(|e| PlatformError::WindowDestruction(e.to_string()))
            } else {
                Ok(())
            }
        };
        self.inboxes.remove(&window.0);
        result
    }

    fn next_message(&mut self, _window: NativeHandle) -> Option<NativeMessage> {
        let mut msg = MSG::default();
        unsafe {
            if !PeekMessageW(&mut msg, None, 0, 0, PM_REMOVE).as_bool() {
                return None;
            }
            if msg.message != WM_QUIT {
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }
        }
        Some(NativeMessage::new(msg.message, msg.wParam.0, msg.lParam.0))
    }

    fn take_notifications(&mut self, window: NativeHandle) -> Vec<NativeMessage> {
        self.inbox(window)
            .map(Inbox::take_messages)
            .unwrap_or_default()
    }

    fn post_message(&self, window: NativeHandle, msg: NativeMessage) -> Result<(), PlatformError> {
        unsafe {
            PostMessageW(
                hwnd(window),
                msg.code,
                WPARAM(msg.wparam),
                LPARAM(msg.lparam),
            )
        }
        .map_err(|e| PlatformError::PostMessage {
            code: msg.code,
            reason: e.to_string(),
        })
    }

    fn register_input_sources(&mut self, window: NativeHandle) -> Result<(), PlatformError> {
        input::register(hwnd(window))
    }

    fn client_size(&self, window: NativeHandle) -> Option<(i32, i32)> {
        let mut rect = RECT::default();
        unsafe { GetClientRect(hwnd(window), &mut rect) }.ok()?;
        Some((rect.right - rect.left, rect.bottom - rect.top))
    }

    fn request_repaint(&mut self, window: NativeHandle) {
        unsafe {
            let _ = InvalidateRect(hwnd(window), None, BOOL::from(false));
        }
    }

    fn set_capture(&mut self, window: NativeHandle) {
        unsafe {
            SetCapture(hwnd(window));
        }
    }

    fn release_capture(&mut self) {
        if let Err(e) = unsafe { ReleaseCapture() } {
            debug!("ReleaseCapture failed: {}", e);
        }
    }

    fn map_scan_code(&self, scan_code: u32) -> u32 {
        input::map_scan_code(scan_code)
    }

    fn read_raw_input(&mut self, lparam: isize) -> Result<RawInputPacket, PlatformError> {
        self.inboxes
            .values()
            .find_map(|inbox| inbox.take_raw_input(lparam))
            .unwrap_or_else(|| Err(PlatformError::RawInput("no data captured".into())))
    }

    fn read_touch_points(
        &mut self,
        _wparam: usize,
        lparam: isize,
    ) -> Result<Vec<TouchPoint>, PlatformError> {
        self.inboxes
            .values()
            .find_map(|inbox| inbox.take_touch(lparam))
            .unwrap_or_else(|| Err(PlatformError::TouchInput("no data captured".into())))
    }

    fn load_cursor(&mut self, cursor: SystemCursor) -> Option<CursorHandle> {
        let resource = PCWSTR(cursor.resource_id() as usize as *const u16);
        match unsafe { LoadCursorW(None, resource) } {
            Ok(handle) => Some(CursorHandle(handle.0 as u64)),
            Err(e) => {
                warn!("LoadCursorW({:?}) failed: {}", cursor, e);
                None
            }
        }
    }

    fn set_cursor(&mut self, cursor: CursorHandle) {
        unsafe {
            SetCursor(HCURSOR(cursor.0 as *mut c_void));
        }
    }

    fn set_class_cursor(&mut self, window: NativeHandle, cursor: CursorHandle) {
        unsafe {
            SetClassLongPtrW(hwnd(window), GCLP_HCURSOR, cursor.0 as isize);
        }
    }

    fn window_position(&self, window: NativeHandle) -> Option<(i32, i32)> {
        let mut rect = RECT::default();
        unsafe { GetWindowRect(hwnd(window), &mut rect) }.ok()?;
        Some((rect.left, rect.top))
    }

    fn set_window_position(&mut self, window: NativeHandle, x: i32, y: i32) {
        if let Err(e) =
            unsafe { SetWindowPos(hwnd(window), HWND::default(), x, y, 0, 0, SWP_NOSIZE | SWP_NOZORDER) }
        {
            warn!("Failed to move window: {}", e);
        }
    }

    fn set_window_size(&mut self, window: NativeHandle, width: i32, height: i32) {
        if let Err(e) = unsafe {
            SetWindowPos(hwnd(window), HWND::default(), 0, 0, width, height, SWP_NOMOVE | SWP_NOZORDER)
        } {
            warn!("Failed to resize window: {}", e);
        }
    }

    fn set_border(&mut self, window: NativeHandle, bordered: bool) {
        let frame = WS_OVERLAPPEDWINDOW.0 as isize;
        unsafe {
            let style = GetWindowLongPtrW(hwnd(window), GWL_STYLE);
            let style = if bordered { style | frame } else { style & !frame };
            SetWindowLongPtrW(hwnd(window), GWL_STYLE, style);
            let _ = SetWindowPos(
                hwnd(window),
                HWND::default(),
                0,
                0,
                0,
                0,
                SWP_FRAMECHANGED | SWP_NOMOVE | SWP_NOSIZE | SWP_NOZORDER,
            );
        }
    }

    fn dpi(&self, window: NativeHandle) -> u32 {
        match unsafe { GetDpiForWindow(hwnd(window)) } {
            0 => DEFAULT_DPI,
            dpi => dpi,
        }
    }

    fn focus(&mut self, window: NativeHandle) {
        unsafe {
            let _ = SetForegroundWindow(hwnd(window));
            let _ = SetFocus(hwnd(window));
        }
    }
}
