//! Window touch messages (WM_TOUCH)

use super::digitizer::TouchContact;

/// At most this many touch points are read per message
pub const MAX_TOUCH_INPUTS: usize = 10;

pub const TOUCHEVENTF_DOWN: u32 = 0x0002;
/// The point was lifted
pub const TOUCHEVENTF_UP: u32 = 0x0004;

/// A touch point as reported by the OS, coordinates in hundredths of a pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TouchPoint {
    pub id: u32,
    pub x: i32,
    pub y: i32,
    pub flags: u32,
}

/// Number of points to read for a touch message
pub fn input_count(wparam: usize) -> usize {
    (wparam & 0xFFFF).min(MAX_TOUCH_INPUTS)
}

/// Convert OS touch points to pixel contacts
pub fn to_contacts(points: &[TouchPoint]) -> Vec<TouchContact> {
    points
        .iter()
        .take(MAX_TOUCH_INPUTS)
        .map(|point| TouchContact {
            id: point.id,
            x: point.x / 100,
            y: point.y / 100,
            active: point.flags & TOUCHEVENTF_UP == 0,
        })
        .collect()
}
