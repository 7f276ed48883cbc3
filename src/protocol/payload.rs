//! Event payload model and its fixed-slot encoding
//!
//! Exactly one payload is in flight at a time. The tag is written with the
//! payload and a reader must not interpret the slot under any other tag.

use crate::input::controller::{ControllerSlotState, GamepadButtons, MAX_CONTROLLERS};
use crate::input::digitizer::{TouchContact, MAX_TOUCH_CONTACTS};

use super::layout::{
    CONTROLLER_SLOT_SIZE, FATAL_MESSAGE_CAPACITY, PAYLOAD_CAPACITY, TOUCH_CONTACT_SIZE,
};

/// Pointer motion, button or wheel event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PointerEvent {
    /// Button id, one of the `BUTTON_*`/`WHEEL_*` constants in [`crate::input::pointer`]
    pub button: i32,
    pub x: i32,
    pub y: i32,
    /// Raw wheel delta in multiples of 120, zero for non-wheel events
    pub wheel_delta: i32,
}

/// Keyboard event carrying a side-specific virtual key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyboardEvent {
    pub key: u32,
}

/// Snapshot of every controller slot
pub type ControllerSnapshot = [ControllerSlotState; MAX_CONTROLLERS];

/// Tagged event payload
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EventPayload {
    /// Slot holds nothing meaningful
    #[default]
    Empty,
    Pointer(PointerEvent),
    Keyboard(KeyboardEvent),
    Move { x: i32, y: i32 },
    Resize { width: i32, height: i32 },
    Activity { active: bool },
    Controllers(ControllerSnapshot),
    Touch(Vec<TouchContact>),
    Fatal(String),
}

impl EventPayload {
    /// Stable numeric tag stored next to the payload
    pub fn tag(&self) -> u32 {
        match self {
            EventPayload::Empty => 0,
            EventPayload::Pointer(_) => 1,
            EventPayload::Keyboard(_) => 2,
            EventPayload::Move { .. } => 3,
            EventPayload::Resize { .. } => 4,
            EventPayload::Activity { .. } => 5,
            EventPayload::Controllers(_) => 6,
            EventPayload::Touch(_) => 7,
            EventPayload::Fatal(_) => 8,
        }
    }

    /// Build a fatal payload, truncating the message to fit the slot
    pub fn fatal(message: &str) -> Self {
        EventPayload::Fatal(truncate_utf8(message, FATAL_MESSAGE_CAPACITY).to_string())
    }

    /// Encode into a payload slot
    ///
    /// Touch lists longer than [`MAX_TOUCH_CONTACTS`] and fatal messages longer
    /// than [`FATAL_MESSAGE_CAPACITY`] are truncated.
    pub fn encode(&self, slot: &mut [u8; PAYLOAD_CAPACITY]) {
        match self {
            EventPayload::Empty => {}
            EventPayload::Pointer(evt) => {
                put_i32(slot, 0, evt.button);
                put_i32(slot, 4, evt.x);
                put_i32(slot, 8, evt.y);
                put_i32(slot, 12, evt.wheel_delta);
            }
            EventPayload::Keyboard(evt) => put_u32(slot, 0, evt.key),
            EventPayload::Move { x, y } => {
                put_i32(slot, 0, *x);
                put_i32(slot, 4, *y);
            }
            EventPayload::Resize { width, height } => {
                put_i32(slot, 0, *width);
                put_i32(slot, 4, *height);
            }
            EventPayload::Activity { active } => put_u32(slot, 0, u32::from(*active)),
            EventPayload::Controllers(states) => {
                for (i, state) in states.iter().enumerate() {
                    let base = i * CONTROLLER_SLOT_SIZE;
                    let out = &mut slot[base..base + CONTROLLER_SLOT_SIZE];
                    out.fill(0);
                    put_u16(out, 0, state.buttons.bits());
                    out[2] = state.left_trigger;
                    out[3] = state.right_trigger;
                    put_i16(out, 4, state.thumb_lx);
                    put_i16(out, 6, state.thumb_ly);
                    put_i16(out, 8, state.thumb_rx);
                    put_i16(out, 10, state.thumb_ry);
                    out[12] = u8::from(state.connected);
                }
            }
            EventPayload::Touch(contacts) => {
                let count = contacts.len().min(MAX_TOUCH_CONTACTS);
                put_u32(slot, 0, count as u32);
                for (i, contact) in contacts.iter().take(count).enumerate() {
                    let base = 4 + i * TOUCH_CONTACT_SIZE;
                    put_u32(slot, base, contact.id);
                    put_i32(slot, base + 4, contact.x);
                    put_i32(slot, base + 8, contact.y);
                    put_u32(slot, base + 12, u32::from(contact.active));
                }
            }
            EventPayload::Fatal(message) => {
                let text = truncate_utf8(message, FATAL_MESSAGE_CAPACITY).as_bytes();
                put_u32(slot, 0, text.len() as u32);
                slot[4..4 + text.len()].copy_from_slice(text);
            }
        }
    }

    /// Decode a payload slot under the given tag
    pub fn decode(tag: u32, slot: &[u8]) -> Result<Self, PayloadError> {
        if slot.len() < PAYLOAD_CAPACITY {
            return Err(PayloadError::SlotTooSmall(slot.len()));
        }

        let payload = match tag {
            0 => EventPayload::Empty,
            1 => EventPayload::Pointer(PointerEvent {
                button: get_i32(slot, 0),
                x: get_i32(slot, 4),
                y: get_i32(slot, 8),
                wheel_delta: get_i32(slot, 12),
            }),
            2 => EventPayload::Keyboard(KeyboardEvent {
                key: get_u32(slot, 0),
            }),
            3 => EventPayload::Move {
                x: get_i32(slot, 0),
                y: get_i32(slot, 4),
            },
            4 => EventPayload::Resize {
                width: get_i32(slot, 0),
                height: get_i32(slot, 4),
            },
            5 => EventPayload::Activity {
                active: get_u32(slot, 0) != 0,
            },
            6 => {
                let mut states = [ControllerSlotState::default(); MAX_CONTROLLERS];
                for (i, state) in states.iter_mut().enumerate() {
                    let raw = &slot[i * CONTROLLER_SLOT_SIZE..(i + 1) * CONTROLLER_SLOT_SIZE];
                    *state = ControllerSlotState {
                        buttons: GamepadButtons::from_bits_retain(get_u16(raw, 0)),
                        left_trigger: raw[2],
                        right_trigger: raw[3],
                        thumb_lx: get_i16(raw, 4),
                        thumb_ly: get_i16(raw, 6),
                        thumb_rx: get_i16(raw, 8),
                        thumb_ry: get_i16(raw, 10),
                        connected: raw[12] != 0,
                    };
                }
                EventPayload::Controllers(states)
            }
            7 => {
                let count = get_u32(slot, 0) as usize;
                if count > MAX_TOUCH_CONTACTS {
                    return Err(PayloadError::TooManyContacts(count));
                }
                let contacts = (0..count)
                    .map(|i| {
                        let base = 4 + i * TOUCH_CONTACT_SIZE;
                        TouchContact {
                            id: get_u32(slot, base),
                            x: get_i32(slot, base + 4),
                            y: get_i32(slot, base + 8),
                            active: get_u32(slot, base + 12) != 0,
                        }
                    })
                    .collect();
                EventPayload::Touch(contacts)
            }
            8 => {
                let len = get_u32(slot, 0) as usize;
                if len > FATAL_MESSAGE_CAPACITY {
                    return Err(PayloadError::MessageTooLong(len));
                }
                let text = String::from_utf8_lossy(&slot[4..4 + len]).into_owned();
                EventPayload::Fatal(text)
            }
            other => return Err(PayloadError::UnknownTag(other)),
        };

        Ok(payload)
    }
}

/// Payload encoding errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PayloadError {
    #[error("Payload slot of {0} bytes is smaller than the payload capacity")]
    SlotTooSmall(usize),
    #[error("Unknown payload tag {0}")]
    UnknownTag(u32),
    #[error("Touch payload declares {0} contacts")]
    TooManyContacts(usize),
    #[error("Fatal payload declares a {0} byte message")]
    MessageTooLong(usize),
}

/// Longest prefix of `text` no longer than `max` bytes that ends on a char boundary
pub(crate) fn truncate_utf8(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

fn put_u32(buf: &mut [u8], at: usize, value: u32) {
    buf[at..at + 4].copy_from_slice(&value.to_le_bytes());
}

fn put_i32(buf: &mut [u8], at: usize, value: i32) {
    buf[at..at + 4].copy_from_slice(&value.to_le_bytes());
}

fn put_u16(buf: &mut [u8], at: usize, value: u16) {
    buf[at..at + 2].copy_from_slice(&value.to_le_bytes());
}

fn put_i16(buf: &mut [u8], at: usize, value: i16) {
    buf[at..at + 2].copy_from_slice(&value.to_le_bytes());
}

pub(crate) fn get_u32(buf: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
}

pub(crate) fn get_i32(buf: &[u8], at: usize) -> i32 {
    i32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
}

fn get_u16(buf: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([buf[at], buf[at + 1]])
}

fn get_i16(buf: &[u8], at: usize) -> i16 {
    i16::from_le_bytes([buf[at], buf[at + 1]])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot() -> [u8; PAYLOAD_CAPACITY] {
        [0u8; PAYLOAD_CAPACITY]
    }

    #[test]
    fn test_tags_are_distinct() {
        let payloads = [
            EventPayload::Empty,
            EventPayload::Pointer(PointerEvent::default()),
            EventPayload::Keyboard(KeyboardEvent::default()),
            EventPayload::Move { x: 0, y: 0 },
            EventPayload::Resize {
                width: 0,
                height: 0,
            },
            EventPayload::Activity { active: false },
            EventPayload::Controllers([ControllerSlotState::default(); MAX_CONTROLLERS]),
            EventPayload::Touch(Vec::new()),
            EventPayload::Fatal(String::new()),
        ];
        let tags: Vec<u32> = payloads.iter().map(|p| p.tag()).collect();
        assert_eq!(tags, (0..9).collect::<Vec<u32>>());
    }

    #[test]
    fn test_negative_move_coordinates_survive() {
        let mut buf = slot();
        let payload = EventPayload::Move { x: -1920, y: -8 };
        payload.encode(&mut buf);
        assert_eq!(EventPayload::decode(3, &buf).unwrap(), payload);
    }

    #[test]
    fn test_controller_snapshot_layout() {
        let mut states = [ControllerSlotState::default(); MAX_CONTROLLERS];
        states[2] = ControllerSlotState {
            buttons: GamepadButtons::A | GamepadButtons::START,
            left_trigger: 255,
            right_trigger: 7,
            thumb_lx: -32768,
            thumb_ly: 32767,
            thumb_rx: 12,
            thumb_ry: -12,
            connected: true,
        };
        let mut buf = slot();
        EventPayload::Controllers(states).encode(&mut buf);

        // Slot 2 starts at byte 32; buttons are little-endian
        assert_eq!(get_u16(&buf, 32), (GamepadButtons::A | GamepadButtons::START).bits());
        assert_eq!(buf[34], 255);
        assert_eq!(buf[44], 1);
        assert_eq!(buf[12], 0);

        match EventPayload::decode(6, &buf).unwrap() {
            EventPayload::Controllers(decoded) => assert_eq!(decoded, states),
            other => panic!("Wrong payload: {:?}", other),
        }
    }

    #[test]
    fn test_touch_list_is_capped() {
        let contacts: Vec<TouchContact> = (0..20)
            .map(|i| TouchContact {
                id: i,
                x: i as i32,
                y: 0,
                active: true,
            })
            .collect();
        let mut buf = slot();
        EventPayload::Touch(contacts).encode(&mut buf);
        match EventPayload::decode(7, &buf).unwrap() {
            EventPayload::Touch(decoded) => {
                assert_eq!(decoded.len(), MAX_TOUCH_CONTACTS);
                assert_eq!(decoded[15].id, 15);
            }
            other => panic!("Wrong payload: {:?}", other),
        }
    }

    #[test]
    fn test_fatal_message_truncates_on_char_boundary() {
        let long = "é".repeat(FATAL_MESSAGE_CAPACITY);
        let payload = EventPayload::fatal(&long);
        match &payload {
            EventPayload::Fatal(text) => {
                assert!(text.len() <= FATAL_MESSAGE_CAPACITY);
                assert!(text.chars().all(|c| c == 'é'));
            }
            other => panic!("Wrong payload: {:?}", other),
        }

        let mut buf = slot();
        payload.encode(&mut buf);
        assert_eq!(EventPayload::decode(8, &buf).unwrap(), payload);
    }

    #[test]
    fn test_decode_rejects_bad_input() {
        let mut buf = slot();
        assert_eq!(
            EventPayload::decode(99, &buf),
            Err(PayloadError::UnknownTag(99))
        );

        put_u32(&mut buf, 0, 500);
        assert_eq!(
            EventPayload::decode(7, &buf),
            Err(PayloadError::TooManyContacts(500))
        );

        assert_eq!(
            EventPayload::decode(1, &buf[..8]),
            Err(PayloadError::SlotTooSmall(8))
        );
    }
}
