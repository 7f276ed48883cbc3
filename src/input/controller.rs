//! Game controller slot polling
//!
//! Slots are queried synchronously on demand. Every poll rewrites the
//! whole snapshot; nothing is diffed against the previous frame.

use bitflags::bitflags;
use log::debug;

/// Number of addressable controller slots
pub const MAX_CONTROLLERS: usize = 4;

bitflags! {
    /// Gamepad button mask, XInput layout
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct GamepadButtons: u16 {
        const DPAD_UP = 0x0001;
        const DPAD_DOWN = 0x0002;
        const DPAD_LEFT = 0x0004;
        const DPAD_RIGHT = 0x0008;
        const START = 0x0010;
        const BACK = 0x0020;
        const LEFT_THUMB = 0x0040;
        const RIGHT_THUMB = 0x0080;
        const LEFT_SHOULDER = 0x0100;
        const RIGHT_SHOULDER = 0x0200;
        const A = 0x1000;
        const B = 0x2000;
        const X = 0x4000;
        const Y = 0x8000;
    }
}

/// State of one controller slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControllerSlotState {
    pub buttons: GamepadButtons,
    pub left_trigger: u8,
    pub right_trigger: u8,
    pub thumb_lx: i16,
    pub thumb_ly: i16,
    pub thumb_rx: i16,
    pub thumb_ry: i16,
    pub connected: bool,
}

/// Something that can query a controller slot
pub trait ControllerSource {
    /// Query one slot; `None` if the slot did not respond
    fn query_controller(&mut self, slot: usize) -> Option<ControllerSlotState>;
}

/// Polls every slot and keeps the resulting snapshot
#[derive(Debug)]
pub struct ControllerPoller {
    /// Consecutive misses before a slot is reported disconnected
    grace: u32,
    misses: [u32; MAX_CONTROLLERS],
    states: [ControllerSlotState; MAX_CONTROLLERS],
}

impl ControllerPoller {
    /// Poller that reports a slot disconnected on its first miss
    pub fn new() -> Self {
        Self::with_grace(1)
    }

    /// Poller that keeps a slot's last state for `grace - 1` missed polls
    pub fn with_grace(grace: u32) -> Self {
        Self {
            grace: grace.max(1),
            misses: [0; MAX_CONTROLLERS],
            states: [ControllerSlotState::default(); MAX_CONTROLLERS],
        }
    }

    /// Query every slot; true if at least one responded
    pub fn poll(&mut self, source: &mut impl ControllerSource) -> bool {
        let mut any = false;
        for slot in 0..MAX_CONTROLLERS {
            match source.query_controller(slot) {
                Some(state) => {
                    self.states[slot] = ControllerSlotState {
                        connected: true,
                        ..state
                    };
                    self.misses[slot] = 0;
                    any = true;
                }
                None => {
                    self.misses[slot] = self.misses[slot].saturating_add(1);
                    if self.misses[slot] >= self.grace {
                        if self.states[slot].connected {
                            debug!("Controller slot {} disconnected", slot);
                        }
                        self.states[slot] = ControllerSlotState::default();
                    }
                }
            }
        }
        any
    }

    /// Snapshot produced by the last poll
    pub fn states(&self) -> &[ControllerSlotState; MAX_CONTROLLERS] {
        &self.states
    }
}

impl Default for ControllerPoller {
    fn default() -> Self {
        Self::new()
    }
}
