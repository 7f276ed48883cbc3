//! Window event pump
//!
//! [`WindowContext`] is the producer-side control block for one window. It
//! owns the platform, the shared region writer, the controller poller and
//! the digitizer decoders, and is consumed by [`WindowContext::destroy`].

use log::{debug, error, info, warn};

use crate::input::controller::ControllerPoller;
use crate::input::digitizer::DecoderRegistry;
use crate::input::pointer::{self, Capture, PointerAction};
use crate::input::{keyboard, touch};
use crate::protocol::{EventPayload, SharedRegion, WriteState, CONTROLLER_EVENT};

use super::cursor::{cursor_command, CursorId, UWM_SET_CURSOR};
use super::message::*;
use super::platform::{NativeHandle, Platform, PlatformError, WindowSpec};

const MM_PER_INCH: f32 = 25.4;

/// Producer-side state for one bridged window
pub struct WindowContext<P: Platform> {
    platform: P,
    window: NativeHandle,
    instance: NativeHandle,
    /// Cached client-area size, mirrors the region header
    width: i32,
    height: i32,
    region: SharedRegion,
    poller: ControllerPoller,
    decoders: DecoderRegistry,
}

impl<P: Platform> WindowContext<P> {
    /// Create the native window and take over the region
    ///
    /// On failure the reason is written to the region's fatal channel and
    /// no window exists.
    pub fn create(
        mut platform: P,
        mut region: SharedRegion,
        spec: &WindowSpec,
    ) -> Result<Self, BridgeError> {
        let created = match platform.create_window(spec) {
            Ok(created) => created,
            Err(e) => {
                let message = e.to_string();
                error!("{}", message);
                region.write_fatal(&message);
                return Err(BridgeError::WindowCreation(message));
            }
        };

        region.set_handles(created.window.0, created.instance.0);
        region.set_dimensions(created.client_width, created.client_height);

        let mut ctx = Self {
            platform,
            window: created.window,
            instance: created.instance,
            width: created.client_width,
            height: created.client_height,
            region,
            poller: ControllerPoller::new(),
            decoders: DecoderRegistry::new(),
        };
        ctx.drain_notifications();

        if let Err(e) = ctx.set_cursor(CursorId::Arrow) {
            warn!("Failed to request initial cursor: {}", e);
        }

        info!(
            "Created window {:#x} \"{}\" ({}x{})",
            ctx.window.0, spec.title, ctx.width, ctx.height
        );
        Ok(ctx)
    }

    /// Report a slot disconnected only after `grace` consecutive misses
    pub fn with_controller_grace(mut self, grace: u32) -> Self {
        self.poller = ControllerPoller::with_grace(grace);
        self
    }

    /// Replace the digitizer decoders
    pub fn with_decoders(mut self, decoders: DecoderRegistry) -> Self {
        self.decoders = decoders;
        self
    }

    pub fn handle(&self) -> NativeHandle {
        self.window
    }

    pub fn instance(&self) -> NativeHandle {
        self.instance
    }

    /// Cached client-area size
    pub fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    pub fn region(&self) -> &SharedRegion {
        &self.region
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    /// Show the window
    pub fn show(&mut self) {
        self.platform.show_window(self.window);
        self.drain_notifications();
    }

    /// Process at most one queued message without blocking
    ///
    /// Returns the raw code of the queued message, or 0 if none was pending.
    pub fn poll(&mut self) -> u32 {
        let queued = self.platform.next_message(self.window);
        self.drain_notifications();

        match queued {
            Some(msg) => {
                if msg.code == WM_QUIT {
                    self.region
                        .publish(WriteState::Quit, WM_QUIT, &EventPayload::Empty);
                }
                msg.code
            }
            None => 0,
        }
    }

    /// Poll every controller slot and write the snapshot
    ///
    /// Returns [`CONTROLLER_EVENT`] if at least one slot responded, else 0.
    pub fn poll_controllers(&mut self) -> u32 {
        let any = self.poller.poll(&mut self.platform);
        self.region.write_event(
            CONTROLLER_EVENT,
            &EventPayload::Controllers(*self.poller.states()),
        );
        if any {
            CONTROLLER_EVENT
        } else {
            0
        }
    }

    /// Destroy the window and publish QUIT
    pub fn destroy(mut self) -> Result<(), BridgeError> {
        let result = self.platform.destroy_window(self.window);
        self.region
            .publish(WriteState::Quit, WM_DESTROY, &EventPayload::Empty);
        info!("Destroyed window {:#x}", self.window.0);
        result.map_err(BridgeError::from)
    }

    /// Request a cursor change, applied on a later poll
    pub fn set_cursor(&self, id: CursorId) -> Result<(), BridgeError> {
        self.platform.post_message(self.window, cursor_command(id))?;
        Ok(())
    }

    pub fn position(&self) -> Option<(i32, i32)> {
        self.platform.window_position(self.window)
    }

    pub fn set_position(&mut self, x: i32, y: i32) {
        self.platform.set_window_position(self.window, x, y);
    }

    pub fn set_size(&mut self, width: i32, height: i32) {
        self.platform.set_window_size(self.window, width, height);
    }

    pub fn add_border(&mut self) {
        self.platform.set_border(self.window, true);
    }

    pub fn remove_border(&mut self) {
        self.platform.set_border(self.window, false);
    }

    /// Dots per inch, not a scale factor
    pub fn dpi(&self) -> u32 {
        self.platform.dpi(self.window)
    }

    /// Display density in dots per millimetre
    pub fn dots_per_mm(&self) -> f32 {
        self.dpi() as f32 / MM_PER_INCH
    }

    pub fn focus(&mut self) {
        self.platform.focus(self.window);
    }

    fn drain_notifications(&mut self) {
        for msg in self.platform.take_notifications(self.window) {
            self.dispatch(&msg);
        }
    }

    fn dispatch(&mut self, msg: &NativeMessage) {
        if let Some(action) = pointer::translate(msg) {
            self.handle_pointer(msg.code, action);
            return;
        }

        match msg.code {
            WM_CREATE => {
                if let Err(e) = self.platform.register_input_sources(self.window) {
                    warn!("{}", e);
                }
            }
            WM_DESTROY => {
                self.region
                    .publish(WriteState::Quit, WM_DESTROY, &EventPayload::Empty);
            }
            WM_ACTIVATE => {
                let active = loword(msg.wparam) != WA_INACTIVE;
                debug!("Window activity changed: active={}", active);
                self.region.publish(
                    WriteState::WindowActivity,
                    msg.code,
                    &EventPayload::Activity { active },
                );
            }
            WM_MOVE => {
                let x = get_x_lparam(msg.lparam);
                let y = get_y_lparam(msg.lparam);
                self.region
                    .publish(WriteState::WindowMove, msg.code, &EventPayload::Move { x, y });
            }
            WM_SIZE => self.handle_resize(msg),
            WM_KEYDOWN | WM_KEYUP | WM_SYSKEYDOWN | WM_SYSKEYUP => {
                let platform = &self.platform;
                let event = keyboard::translate(msg, |scan| platform.map_scan_code(scan));
                self.region
                    .write_event(msg.code, &EventPayload::Keyboard(event));
            }
            WM_TOUCH => self.handle_touch(msg),
            WM_INPUT => self.handle_raw_input(msg),
            UWM_SET_CURSOR => self.apply_cursor(msg.wparam),
            _ => {}
        }
    }

    fn handle_pointer(&mut self, code: u32, action: PointerAction) {
        match action.capture {
            Capture::Acquire => self.platform.set_capture(self.window),
            Capture::Release => self.platform.release_capture(),
            Capture::Unchanged => {}
        }
        self.region
            .write_event(code, &EventPayload::Pointer(action.event));
    }

    fn handle_resize(&mut self, msg: &NativeMessage) {
        let (width, height) = self.platform.client_size(self.window).unwrap_or((
            i32::from(loword(msg.lparam as usize)),
            i32::from(hiword(msg.lparam as usize)),
        ));

        if (width, height) != (self.width, self.height) {
            debug!(
                "Client area resized from {}x{} to {}x{}",
                self.width, self.height, width, height
            );
            self.width = width;
            self.height = height;
            self.region.set_dimensions(width, height);
            self.region.publish(
                WriteState::WindowResize,
                msg.code,
                &EventPayload::Resize { width, height },
            );
        }
        self.platform.request_repaint(self.window);
    }

    fn handle_touch(&mut self, msg: &NativeMessage) {
        let points = match self.platform.read_touch_points(msg.wparam, msg.lparam) {
            Ok(points) => points,
            Err(e) => {
                debug!("Skipping touch message: {}", e);
                return;
            }
        };

        let contacts = touch::to_contacts(&points);
        for contact in &contacts {
            debug!(
                "Touch {}: x={} y={} active={}",
                contact.id, contact.x, contact.y, contact.active
            );
        }
        self.region
            .write_event(msg.code, &EventPayload::Touch(contacts));
    }

    fn handle_raw_input(&mut self, msg: &NativeMessage) {
        let packet = match self.platform.read_raw_input(msg.lparam) {
            Ok(packet) => packet,
            Err(e) => {
                debug!("Skipping raw input: {}", e);
                return;
            }
        };

        if let Some(contacts) = self.decoders.decode(&packet) {
            self.region
                .write_event(msg.code, &EventPayload::Touch(contacts));
        }
    }

    fn apply_cursor(&mut self, raw: usize) {
        let Some(id) = CursorId::from_raw(raw) else {
            warn!("Ignoring unknown cursor id {}", raw);
            return;
        };
        let Some(system) = id.system_cursor() else {
            debug!("Cursor {:?} has no system cursor bound", id);
            return;
        };
        match self.platform.load_cursor(system) {
            Some(cursor) => {
                self.platform.set_cursor(cursor);
                self.platform.set_class_cursor(self.window, cursor);
            }
            None => warn!("Failed to load system cursor {:?}", system),
        }
    }
}

impl<P: Platform> std::fmt::Debug for WindowContext<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowContext")
            .field("window", &self.window)
            .field("instance", &self.instance)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

/// Pump errors
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("Window creation failed: {0}")]
    WindowCreation(String),
    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::cursor::SystemCursor;
    use crate::backend::testing::{ScriptedPlatform, INSTANCE, WINDOW};
    use crate::input::controller::ControllerSlotState;
    use crate::input::digitizer::{
        HidDeviceInfo, RawDevice, RawInputPacket, TouchContact, HID_USAGE_DIGITIZER_TOUCH_PAD,
        HID_USAGE_PAGE_DIGITIZER,
    };
    use crate::input::keyboard::{
        key_lparam, VK_CONTROL, VK_LCONTROL, VK_LSHIFT, VK_MENU, VK_RMENU, VK_RSHIFT, VK_SHIFT,
    };
    use crate::input::touch::TouchPoint;
    use crate::protocol::{KeyboardEvent, RegionMemory, RegionReader};

    fn setup() -> (WindowContext<ScriptedPlatform>, RegionReader) {
        let region = SharedRegion::new(RegionMemory::anonymous(4096).unwrap());
        let reader = region.reader();
        let ctx = WindowContext::create(
            ScriptedPlatform::new(),
            region,
            &WindowSpec::new("test", 640, 480),
        )
        .unwrap();
        (ctx, reader)
    }

    /// Run polls until the queue is empty
    fn drain(ctx: &mut WindowContext<ScriptedPlatform>) {
        while ctx.poll() != 0 {}
    }

    fn touch_pad_packet(report: Vec<u8>) -> RawInputPacket {
        RawInputPacket {
            device: RawDevice::Hid(HidDeviceInfo {
                usage_page: HID_USAGE_PAGE_DIGITIZER,
                usage: HID_USAGE_DIGITIZER_TOUCH_PAD,
                ..Default::default()
            }),
            report_size: report.len(),
            report_count: 1,
            data: report,
        }
    }

    #[test]
    fn test_create_writes_handles_and_registers_input() {
        let (ctx, reader) = setup();
        let snapshot = reader.read().unwrap();
        assert_eq!(snapshot.window_handle, WINDOW.0);
        assert_eq!(snapshot.instance_handle, INSTANCE.0);
        assert_eq!((snapshot.window_width, snapshot.window_height), (640, 480));
        assert_eq!(ctx.platform().input_registrations, 1);
        // Initial arrow cursor request is queued
        assert_eq!(ctx.platform().queued(), 1);
    }

    #[test]
    fn test_create_failure_is_fatal() {
        let region = SharedRegion::new(RegionMemory::anonymous(4096).unwrap());
        let reader = region.reader();
        let mut platform = ScriptedPlatform::new();
        platform.fail_create = Some("class not registered".into());

        let result = WindowContext::create(platform, region, &WindowSpec::new("test", 1, 1));
        assert!(matches!(result, Err(BridgeError::WindowCreation(_))));

        let snapshot = reader.read().unwrap();
        assert_eq!(snapshot.write_state, WriteState::Fatal);
        assert_eq!(snapshot.window_handle, 0);
        match snapshot.payload {
            EventPayload::Fatal(message) => {
                assert!(!message.is_empty());
                assert!(message.contains("class not registered"));
            }
            other => panic!("Expected fatal payload, got {:?}", other),
        }
    }

    #[test]
    fn test_poll_returns_zero_when_idle() {
        let (mut ctx, _reader) = setup();
        drain(&mut ctx);
        assert_eq!(ctx.poll(), 0);
    }

    #[test]
    fn test_poll_handles_one_message_at_a_time() {
        let (mut ctx, reader) = setup();
        drain(&mut ctx);
        ctx.platform().queue(NativeMessage::new(WM_MOVE, 0, make_lparam(10, 20)));
        ctx.platform().queue(NativeMessage::new(WM_MOVE, 0, make_lparam(30, 40)));

        assert_eq!(ctx.poll(), WM_MOVE);
        assert_eq!(
            reader.read().unwrap().payload,
            EventPayload::Move { x: 10, y: 20 }
        );
        assert_eq!(ctx.platform().queued(), 1);
    }

    #[test]
    fn test_repeated_resize_publishes_once() {
        let (mut ctx, reader) = setup();
        drain(&mut ctx);
        ctx.platform_mut().client = (800, 600);

        ctx.platform_mut().send(NativeMessage::new(WM_SIZE, 0, make_lparam(800, 600)));
        ctx.poll();
        let first = reader.read().unwrap();
        assert_eq!(first.write_state, WriteState::WindowResize);
        assert_eq!(
            first.payload,
            EventPayload::Resize {
                width: 800,
                height: 600
            }
        );
        assert_eq!((first.window_width, first.window_height), (800, 600));

        ctx.platform_mut().send(NativeMessage::new(WM_SIZE, 0, make_lparam(800, 600)));
        ctx.poll();
        assert_eq!(reader.read().unwrap().sequence, first.sequence);

        // Repaint is requested for both
        assert_eq!(ctx.platform().repaints, 2);
    }

    #[test]
    fn test_resize_to_creation_size_is_not_published() {
        let (mut ctx, reader) = setup();
        drain(&mut ctx);
        let before = reader.read().unwrap();
        ctx.platform_mut().send(NativeMessage::new(WM_SIZE, 0, make_lparam(640, 480)));
        ctx.poll();
        assert_eq!(reader.read().unwrap().sequence, before.sequence);
    }

    #[test]
    fn test_shift_resolved_from_scan_code() {
        let (mut ctx, reader) = setup();
        drain(&mut ctx);

        for (scan, expected) in [(0x2A, VK_LSHIFT), (0x36, VK_RSHIFT)] {
            ctx.platform()
                .queue(NativeMessage::new(WM_KEYDOWN, VK_SHIFT as usize, key_lparam(scan, false)));
            ctx.poll();
            assert_eq!(
                reader.read().unwrap().payload,
                EventPayload::Keyboard(KeyboardEvent { key: expected })
            );
        }
    }

    #[test]
    fn test_control_and_alt_resolved_from_extended_flag() {
        let (mut ctx, reader) = setup();
        drain(&mut ctx);

        ctx.platform()
            .queue(NativeMessage::new(WM_KEYUP, VK_CONTROL as usize, key_lparam(0x1D, false)));
        ctx.poll();
        assert_eq!(
            reader.read().unwrap().payload,
            EventPayload::Keyboard(KeyboardEvent { key: VK_LCONTROL })
        );

        ctx.platform()
            .queue(NativeMessage::new(WM_SYSKEYDOWN, VK_MENU as usize, key_lparam(0x38, true)));
        ctx.poll();
        let snapshot = reader.read().unwrap();
        assert_eq!(snapshot.event_type, WM_SYSKEYDOWN);
        assert_eq!(
            snapshot.payload,
            EventPayload::Keyboard(KeyboardEvent { key: VK_RMENU })
        );
        // Input events leave the state tag alone
        assert_eq!(snapshot.write_state, WriteState::None);
    }

    #[test]
    fn test_pointer_capture_follows_buttons() {
        let (mut ctx, reader) = setup();
        drain(&mut ctx);

        ctx.platform()
            .queue(NativeMessage::new(WM_RBUTTONDOWN, 0, make_lparam(5, 6)));
        ctx.poll();
        assert!(ctx.platform().captured);

        ctx.platform()
            .queue(NativeMessage::new(WM_MOUSEMOVE, 0, make_lparam(-20, 900)));
        ctx.poll();
        match reader.read().unwrap().payload {
            EventPayload::Pointer(event) => assert_eq!((event.x, event.y), (-20, 900)),
            other => panic!("Expected pointer payload, got {:?}", other),
        }

        ctx.platform()
            .queue(NativeMessage::new(WM_RBUTTONUP, 0, make_lparam(5, 6)));
        ctx.poll();
        assert!(!ctx.platform().captured);
        assert_eq!(ctx.platform().release_calls, 1);
    }

    #[test]
    fn test_activity_and_quit() {
        let (mut ctx, reader) = setup();
        drain(&mut ctx);

        ctx.platform_mut()
            .send(NativeMessage::new(WM_ACTIVATE, WA_CLICKACTIVE as usize, 0));
        ctx.poll();
        let snapshot = reader.read().unwrap();
        assert_eq!(snapshot.write_state, WriteState::WindowActivity);
        assert_eq!(snapshot.payload, EventPayload::Activity { active: true });

        ctx.platform_mut()
            .send(NativeMessage::new(WM_ACTIVATE, WA_INACTIVE as usize, 0));
        ctx.poll();
        assert_eq!(
            reader.read().unwrap().payload,
            EventPayload::Activity { active: false }
        );

        ctx.platform_mut()
            .send(NativeMessage::new(WM_ACTIVATE, WA_ACTIVE as usize, 0));
        ctx.poll();
        assert_eq!(
            reader.read().unwrap().payload,
            EventPayload::Activity { active: true }
        );

        ctx.platform().queue(NativeMessage::new(WM_QUIT, 0, 0));
        assert_eq!(ctx.poll(), WM_QUIT);
        assert!(reader.read().unwrap().write_state.is_quit());
    }

    #[test]
    fn test_user_closed_window_publishes_quit() {
        let (mut ctx, reader) = setup();
        drain(&mut ctx);

        ctx.platform_mut().send(NativeMessage::new(WM_DESTROY, 0, 0));
        assert_eq!(ctx.poll(), 0);

        let snapshot = reader.read().unwrap();
        assert_eq!(snapshot.write_state, WriteState::Quit);
        assert_eq!(snapshot.event_type, WM_DESTROY);
        assert!(ctx.region().write_state().is_quit());
    }

    #[test]
    fn test_destroy_publishes_quit() {
        let (ctx, reader) = setup();
        ctx.destroy().unwrap();
        let snapshot = reader.read().unwrap();
        assert_eq!(snapshot.write_state, WriteState::Quit);
        assert_eq!(snapshot.event_type, WM_DESTROY);
    }

    #[test]
    fn test_poll_controllers_reports_responding_slots() {
        let (mut ctx, reader) = setup();
        assert_eq!(ctx.poll_controllers(), 0);

        let pad = ControllerSlotState {
            thumb_lx: -1200,
            left_trigger: 40,
            ..Default::default()
        };
        ctx.platform_mut().controllers[2] = Some(pad);
        assert_eq!(ctx.poll_controllers(), CONTROLLER_EVENT);

        let snapshot = reader.read().unwrap();
        assert_eq!(snapshot.event_type, CONTROLLER_EVENT);
        match snapshot.payload {
            EventPayload::Controllers(slots) => {
                for (index, slot) in slots.iter().enumerate() {
                    assert_eq!(slot.connected, index == 2);
                }
                assert_eq!(slots[2].thumb_lx, -1200);
            }
            other => panic!("Expected controller payload, got {:?}", other),
        }

        ctx.platform_mut().controllers[2] = None;
        assert_eq!(ctx.poll_controllers(), 0);
        match reader.read().unwrap().payload {
            EventPayload::Controllers(slots) => {
                assert_eq!(slots[2], ControllerSlotState::default())
            }
            other => panic!("Expected controller payload, got {:?}", other),
        }
    }

    #[test]
    fn test_controller_grace_keeps_last_state() {
        let (ctx, _reader) = setup();
        let mut ctx = ctx.with_controller_grace(2);
        ctx.platform_mut().controllers[0] = Some(ControllerSlotState::default());
        ctx.poll_controllers();

        ctx.platform_mut().controllers[0] = None;
        assert_eq!(ctx.poll_controllers(), 0);
        assert!(ctx.poller.states()[0].connected);
        ctx.poll_controllers();
        assert!(!ctx.poller.states()[0].connected);
    }

    #[test]
    fn test_cursor_command_applies_on_later_poll() {
        let (mut ctx, _reader) = setup();
        drain(&mut ctx);

        for id in CursorId::ALL {
            ctx.platform_mut().cursor = None;
            ctx.platform_mut().class_cursor = None;
            ctx.set_cursor(id).unwrap();
            // Nothing happens until the queue is drained
            assert_eq!(ctx.platform().cursor, None);

            assert_eq!(ctx.poll(), UWM_SET_CURSOR);
            let expected = id
                .system_cursor()
                .map(|system| crate::backend::cursor::CursorHandle(u64::from(system.resource_id())));
            assert_eq!(ctx.platform().cursor, expected, "cursor {:?}", id);
            assert_eq!(ctx.platform().class_cursor, expected, "cursor {:?}", id);
        }
    }

    #[test]
    fn test_initial_cursor_is_arrow() {
        let (mut ctx, _reader) = setup();
        ctx.poll();
        let arrow = SystemCursor::Arrow.resource_id();
        assert_eq!(ctx.platform().class_cursor.map(|c| c.0), Some(u64::from(arrow)));
    }

    #[test]
    fn test_touch_points_surface_as_contacts() {
        let (mut ctx, reader) = setup();
        drain(&mut ctx);
        ctx.platform_mut().touch_reads.push_back(Ok(vec![TouchPoint {
            id: 4,
            x: 25_000,
            y: 13_050,
            flags: 0,
        }]));
        ctx.platform().queue(NativeMessage::new(WM_TOUCH, 1, 0x1234));
        ctx.poll();

        assert_eq!(
            reader.read().unwrap().payload,
            EventPayload::Touch(vec![TouchContact {
                id: 4,
                x: 250,
                y: 130,
                active: true
            }])
        );
    }

    #[test]
    fn test_failed_acquisition_publishes_nothing() {
        let (mut ctx, reader) = setup();
        drain(&mut ctx);
        let before = reader.read().unwrap();

        ctx.platform()
            .queue(NativeMessage::new(WM_INPUT, 0, 0x10));
        ctx.platform().queue(NativeMessage::new(WM_TOUCH, 2, 0x20));
        drain(&mut ctx);

        assert_eq!(reader.read().unwrap().sequence, before.sequence);
    }

    #[test]
    fn test_raw_digitizer_report_surfaces_contacts() {
        let (mut ctx, reader) = setup();
        drain(&mut ctx);
        // Two contacts declared, one and a half present
        let report = vec![0x01, 2, 0x10, 0x00, 0x20, 0x00, 0x83, 0xFF, 0xFF];
        ctx.platform_mut()
            .raw_inputs
            .push_back(Ok(touch_pad_packet(report)));
        ctx.platform().queue(NativeMessage::new(WM_INPUT, 0, 0x10));
        ctx.poll();

        let snapshot = reader.read().unwrap();
        assert_eq!(snapshot.event_type, WM_INPUT);
        assert_eq!(
            snapshot.payload,
            EventPayload::Touch(vec![TouchContact {
                id: 3,
                x: 0x10,
                y: 0x20,
                active: true
            }])
        );
    }

    #[test]
    fn test_raw_input_from_other_devices_is_ignored() {
        let (mut ctx, reader) = setup();
        drain(&mut ctx);
        let before = reader.read().unwrap();

        let mut packet = touch_pad_packet(vec![0x01, 1, 0, 0, 0, 0, 0x80]);
        packet.device = RawDevice::Keyboard;
        ctx.platform_mut().raw_inputs.push_back(Ok(packet));
        ctx.platform().queue(NativeMessage::new(WM_INPUT, 0, 0x10));
        ctx.poll();

        assert_eq!(reader.read().unwrap().sequence, before.sequence);
    }

    #[test]
    fn test_replaced_decoders_skip_unregistered_touch_pad() {
        let (ctx, reader) = setup();
        let mut ctx = ctx.with_decoders(DecoderRegistry::empty());
        drain(&mut ctx);
        let before = reader.read().unwrap();

        ctx.platform_mut()
            .raw_inputs
            .push_back(Ok(touch_pad_packet(vec![0x01, 1, 0, 0, 0, 0, 0x80])));
        ctx.platform().queue(NativeMessage::new(WM_INPUT, 0, 0x10));
        ctx.poll();

        assert_eq!(reader.read().unwrap().sequence, before.sequence);
    }

    #[test]
    fn test_property_pass_throughs() {
        let (mut ctx, _reader) = setup();
        ctx.show();
        assert!(ctx.platform().shown);

        ctx.set_position(12, 34);
        assert_eq!(ctx.position(), Some((12, 34)));
        ctx.set_size(300, 200);
        assert_eq!(ctx.platform().size, (300, 200));
        ctx.remove_border();
        assert!(!ctx.platform().bordered);
        ctx.add_border();
        assert!(ctx.platform().bordered);
        ctx.focus();
        assert!(ctx.platform().focused);
        assert_eq!(ctx.dpi(), 96);
        assert!((ctx.dots_per_mm() - 96.0 / 25.4).abs() < 1e-4);
    }
}
