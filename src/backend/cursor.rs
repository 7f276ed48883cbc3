//! Cursor command channel
//!
//! A cursor change is never applied directly. The requested id is posted to
//! the window's own queue under [`UWM_SET_CURSOR`] and applied when the
//! pump drains that message on a later poll.

use super::message::{NativeMessage, WM_USER};

/// Private message code carrying a [`CursorId`] in wparam
pub const UWM_SET_CURSOR: u32 = WM_USER + 1;

/// Logical cursor ids understood by the bridge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum CursorId {
    Arrow = 1,
    IBeam = 2,
    Wait = 3,
    Cross = 4,
    UpArrow = 5,
    SizeNwse = 6,
    SizeNesw = 7,
    SizeWe = 8,
    SizeNs = 9,
    SizeAll = 10,
    No = 11,
    Hand = 12,
    AppStarting = 13,
    Help = 14,
    /// Not bound to a system cursor
    Pin = 15,
    /// Not bound to a system cursor
    Person = 16,
}

impl CursorId {
    /// Every logical cursor id in catalogue order
    pub const ALL: [CursorId; 16] = [
        CursorId::Arrow,
        CursorId::IBeam,
        CursorId::Wait,
        CursorId::Cross,
        CursorId::UpArrow,
        CursorId::SizeNwse,
        CursorId::SizeNesw,
        CursorId::SizeWe,
        CursorId::SizeNs,
        CursorId::SizeAll,
        CursorId::No,
        CursorId::Hand,
        CursorId::AppStarting,
        CursorId::Help,
        CursorId::Pin,
        CursorId::Person,
    ];

    pub fn from_raw(raw: usize) -> Option<Self> {
        Self::ALL.into_iter().find(|id| *id as usize == raw)
    }

    /// System cursor shown for this id, `None` for the unbound ids
    pub fn system_cursor(self) -> Option<SystemCursor> {
        Some(match self {
            CursorId::Arrow => SystemCursor::Arrow,
            CursorId::IBeam => SystemCursor::IBeam,
            CursorId::Wait => SystemCursor::Wait,
            CursorId::Cross => SystemCursor::Cross,
            CursorId::UpArrow => SystemCursor::UpArrow,
            CursorId::SizeNwse => SystemCursor::SizeNwse,
            CursorId::SizeNesw => SystemCursor::SizeNesw,
            CursorId::SizeWe => SystemCursor::SizeWe,
            CursorId::SizeNs => SystemCursor::SizeNs,
            CursorId::SizeAll => SystemCursor::SizeAll,
            CursorId::No => SystemCursor::No,
            CursorId::Hand => SystemCursor::Hand,
            CursorId::AppStarting => SystemCursor::AppStarting,
            CursorId::Help => SystemCursor::Help,
            CursorId::Pin | CursorId::Person => return None,
        })
    }
}

/// Predefined system cursor resources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemCursor {
    Arrow,
    IBeam,
    Wait,
    Cross,
    UpArrow,
    SizeNwse,
    SizeNesw,
    SizeWe,
    SizeNs,
    SizeAll,
    No,
    Hand,
    AppStarting,
    Help,
}

impl SystemCursor {
    /// Integer resource id of the cursor (the IDC_* value)
    pub fn resource_id(self) -> u16 {
        match self {
            SystemCursor::Arrow => 32512,
            SystemCursor::IBeam => 32513,
            SystemCursor::Wait => 32514,
            SystemCursor::Cross => 32515,
            SystemCursor::UpArrow => 32516,
            SystemCursor::SizeNwse => 32642,
            SystemCursor::SizeNesw => 32643,
            SystemCursor::SizeWe => 32644,
            SystemCursor::SizeNs => 32645,
            SystemCursor::SizeAll => 32646,
            SystemCursor::No => 32648,
            SystemCursor::Hand => 32649,
            SystemCursor::AppStarting => 32650,
            SystemCursor::Help => 32651,
        }
    }
}

/// Loaded native cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CursorHandle(pub u64);

/// Build the message that requests a cursor change
pub fn cursor_command(id: CursorId) -> NativeMessage {
    NativeMessage::new(UWM_SET_CURSOR, id as usize, 0)
}
