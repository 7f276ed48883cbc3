//! Scripted platform for exercising the pump without a native window system

use std::cell::RefCell;
use std::collections::VecDeque;

use crate::input::controller::{ControllerSlotState, ControllerSource, MAX_CONTROLLERS};
use crate::input::digitizer::RawInputPacket;
use crate::input::touch::TouchPoint;

use super::cursor::{CursorHandle, SystemCursor};
use super::message::{NativeMessage, WM_CREATE, WM_DESTROY, WM_QUIT};
use super::platform::{CreatedWindow, NativeHandle, Platform, PlatformError, WindowSpec};

pub const WINDOW: NativeHandle = NativeHandle(0x0001_0042);
pub const INSTANCE: NativeHandle = NativeHandle(0x0040_0000);

/// Platform double that records every call and replays scripted input
#[derive(Debug, Default)]
pub struct ScriptedPlatform {
    pub fail_create: Option<String>,
    /// Client size reported after creation and by `client_size`
    pub client: (i32, i32),
    queue: RefCell<VecDeque<NativeMessage>>,
    notifications: Vec<NativeMessage>,
    pub created: Option<WindowSpec>,
    pub shown: bool,
    pub destroyed: bool,
    pub input_registrations: usize,
    pub repaints: usize,
    pub captured: bool,
    pub capture_calls: usize,
    pub release_calls: usize,
    pub raw_inputs: VecDeque<Result<RawInputPacket, PlatformError>>,
    pub touch_reads: VecDeque<Result<Vec<TouchPoint>, PlatformError>>,
    pub controllers: [Option<ControllerSlotState>; MAX_CONTROLLERS],
    pub cursor: Option<CursorHandle>,
    pub class_cursor: Option<CursorHandle>,
    pub position: (i32, i32),
    pub size: (i32, i32),
    pub bordered: bool,
    pub focused: bool,
}

impl ScriptedPlatform {
    pub fn new() -> Self {
        Self {
            client: (640, 480),
            bordered: true,
            ..Default::default()
        }
    }

    /// Put a message on the queue as if the OS had posted it
    pub fn queue(&self, msg: NativeMessage) {
        self.queue.borrow_mut().push_back(msg);
    }

    /// Deliver a message straight to the window procedure
    pub fn send(&mut self, msg: NativeMessage) {
        self.notifications.push(msg);
    }

    pub fn queued(&self) -> usize {
        self.queue.borrow().len()
    }
}

impl ControllerSource for ScriptedPlatform {
    fn query_controller(&mut self, slot: usize) -> Option<ControllerSlotState> {
        self.controllers.get(slot).copied().flatten()
    }
}

impl Platform for ScriptedPlatform {
    fn create_window(&mut self, spec: &WindowSpec) -> Result<CreatedWindow, PlatformError> {
        if let Some(reason) = &self.fail_create {
            return Err(PlatformError::WindowCreation(reason.clone()));
        }
        self.created = Some(spec.clone());
        self.size = (spec.width, spec.height);
        self.position = (spec.x.unwrap_or(0), spec.y.unwrap_or(0));
        self.notifications.push(NativeMessage::new(WM_CREATE, 0, 0));
        Ok(CreatedWindow {
            window: WINDOW,
            instance: INSTANCE,
            client_width: self.client.0,
            client_height: self.client.1,
        })
    }

    fn show_window(&mut self, _window: NativeHandle) {
        self.shown = true;
    }

    fn destroy_window(&mut self, _window: NativeHandle) -> Result<(), PlatformError> {
        self.destroyed = true;
        self.notifications.push(NativeMessage::new(WM_DESTROY, 0, 0));
        Ok(())
    }

    fn next_message(&mut self, _window: NativeHandle) -> Option<NativeMessage> {
        let msg = self.queue.borrow_mut().pop_front()?;
        if msg.code != WM_QUIT {
            self.notifications.push(msg);
        }
        Some(msg)
    }

    fn take_notifications(&mut self, _window: NativeHandle) -> Vec<NativeMessage> {
        std::mem::take(&mut self.notifications)
    }

    fn post_message(&self, _window: NativeHandle, msg: NativeMessage) -> Result<(), PlatformError> {
        self.queue(msg);
        Ok(())
    }

    fn register_input_sources(&mut self, _window: NativeHandle) -> Result<(), PlatformError> {
        self.input_registrations += 1;
        Ok(())
    }

    fn client_size(&self, _window: NativeHandle) -> Option<(i32, i32)> {
        Some(self.client)
    }

    fn request_repaint(&mut self, _window: NativeHandle) {
        self.repaints += 1;
    }

    fn set_capture(&mut self, _window: NativeHandle) {
        self.captured = true;
        self.capture_calls += 1;
    }

    fn release_capture(&mut self) {
        self.captured = false;
        self.release_calls += 1;
    }

    fn map_scan_code(&self, scan_code: u32) -> u32 {
        match scan_code {
            0x2A => crate::input::keyboard::VK_LSHIFT,
            0x36 => crate::input::keyboard::VK_RSHIFT,
            _ => 0,
        }
    }

    fn read_raw_input(&mut self, _lparam: isize) -> Result<RawInputPacket, PlatformError> {
        self.raw_inputs
            .pop_front()
            .unwrap_or_else(|| Err(PlatformError::RawInput("nothing scripted".into())))
    }

    fn read_touch_points(
        &mut self,
        _wparam: usize,
        _lparam: isize,
    ) -> Result<Vec<TouchPoint>, PlatformError> {
        self.touch_reads
            .pop_front()
            .unwrap_or_else(|| Err(PlatformError::TouchInput("nothing scripted".into())))
    }

    fn load_cursor(&mut self, cursor: SystemCursor) -> Option<CursorHandle> {
        Some(CursorHandle(u64::from(cursor.resource_id())))
    }

    fn set_cursor(&mut self, cursor: CursorHandle) {
        self.cursor = Some(cursor);
    }

    fn set_class_cursor(&mut self, _window: NativeHandle, cursor: CursorHandle) {
        self.class_cursor = Some(cursor);
    }

    fn window_position(&self, _window: NativeHandle) -> Option<(i32, i32)> {
        Some(self.position)
    }

    fn set_window_position(&mut self, _window: NativeHandle, x: i32, y: i32) {
        self.position = (x, y);
    }

    fn set_window_size(&mut self, _window: NativeHandle, width: i32, height: i32) {
        self.size = (width, height);
    }

    fn set_border(&mut self, _window: NativeHandle, bordered: bool) {
        self.bordered = bordered;
    }

    fn dpi(&self, _window: NativeHandle) -> u32 {
        96
    }

    fn focus(&mut self, _window: NativeHandle) {
        self.focused = true;
    }
}
