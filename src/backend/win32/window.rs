//! Window class, window procedure and per-window inbox

use std::cell::RefCell;
use std::ffi::c_void;
use std::sync::atomic::{AtomicBool, Ordering};

use log::debug;
use windows::core::PCWSTR;
use windows::Win32::Foundation::{BOOL, HWND, LPARAM, LRESULT, RECT, WPARAM};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::WindowsAndMessaging::{
    AdjustWindowRectEx, CreateWindowExW, DefWindowProcW, GetClientRect, GetWindowLongPtrW,
    LoadCursorW, PostQuitMessage, RegisterClassW, SetWindowLongPtrW, CREATESTRUCTW,
    CS_HREDRAW, CS_OWNDC, CS_VREDRAW, CW_USEDEFAULT, GWLP_USERDATA, IDC_ARROW,
    WINDOW_EX_STYLE, WM_NCCREATE, WM_NCDESTROY, WNDCLASSW, WS_OVERLAPPEDWINDOW,
};

use crate::backend::cursor::UWM_SET_CURSOR;
use crate::backend::message::{EventKind, NativeMessage, WM_CREATE, WM_DESTROY, WM_INPUT, WM_TOUCH};
use crate::backend::platform::{CreatedWindow, NativeHandle, PlatformError, WindowSpec};
use crate::input::digitizer::RawInputPacket;
use crate::input::touch::TouchPoint;

use super::input;

const CLASS_NAME: &str = "EvbridgeWindowClass";

static CLASS_REGISTERED: AtomicBool = AtomicBool::new(false);

/// Messages and input data captured by the window procedure
///
/// Raw input and touch handles are only valid while their message is being
/// processed, so their data is read in the window procedure and kept here
/// keyed by the message lparam.
#[derive(Default)]
pub(super) struct Inbox {
    messages: RefCell<Vec<NativeMessage>>,
    raw_inputs: RefCell<Vec<(isize, Result<RawInputPacket, PlatformError>)>>,
    touches: RefCell<Vec<(isize, Result<Vec<TouchPoint>, PlatformError>)>>,
}

impl Inbox {
    pub(super) fn take_messages(&self) -> Vec<NativeMessage> {
        std::mem::take(&mut *self.messages.borrow_mut())
    }

    pub(super) fn take_raw_input(
        &self,
        lparam: isize,
    ) -> Option<Result<RawInputPacket, PlatformError>> {
        take_keyed(&self.raw_inputs, lparam)
    }

    pub(super) fn take_touch(&self, lparam: isize) -> Option<Result<Vec<TouchPoint>, PlatformError>> {
        take_keyed(&self.touches, lparam)
    }
}

fn take_keyed<T>(entries: &RefCell<Vec<(isize, T)>>, key: isize) -> Option<T> {
    let mut entries = entries.borrow_mut();
    let index = entries.iter().position(|(k, _)| *k == key)?;
    Some(entries.remove(index).1)
}

pub(super) fn wide(text: &str) -> Vec<u16> {
    text.encode_utf16().chain(std::iter::once(0)).collect()
}

pub(super) fn hwnd(handle: NativeHandle) -> HWND {
    HWND(handle.0 as *mut c_void)
}

/// Messages forwarded to the pump
fn is_bridged(msg: u32) -> bool {
    msg == WM_CREATE || msg == UWM_SET_CURSOR || EventKind::from_code(msg) != EventKind::Unknown
}

/// Window procedure shared by every bridged window
///
/// # Safety
/// Win32 callback; GWLP_USERDATA holds either null or a pointer to an
/// [`Inbox`] that outlives the window.
unsafe extern "system" fn wnd_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match msg {
        WM_NCCREATE => {
            let create = &*(lparam.0 as *const CREATESTRUCTW);
            SetWindowLongPtrW(hwnd, GWLP_USERDATA, create.lpCreateParams as isize);
            return DefWindowProcW(hwnd, msg, wparam, lparam);
        }
        WM_NCDESTROY => {
            SetWindowLongPtrW(hwnd, GWLP_USERDATA, 0);
            return DefWindowProcW(hwnd, msg, wparam, lparam);
        }
        _ => {}
    }

    let inbox = (GetWindowLongPtrW(hwnd, GWLP_USERDATA) as *const Inbox).as_ref();
    if let Some(inbox) = inbox {
        match msg {
            WM_INPUT => inbox
                .raw_inputs
                .borrow_mut()
                .push((lparam.0, input::read_raw_input(lparam))),
            WM_TOUCH => {
                // Reading closes the touch handle, so default handling is skipped
                inbox
                    .touches
                    .borrow_mut()
                    .push((lparam.0, input::read_touch_points(wparam, lparam)));
                inbox
                    .messages
                    .borrow_mut()
                    .push(NativeMessage::new(msg, wparam.0, lparam.0));
                return LRESULT(0);
            }
            _ => {}
        }
        if is_bridged(msg) {
            inbox
                .messages
                .borrow_mut()
                .push(NativeMessage::new(msg, wparam.0, lparam.0));
        }
    }

    match msg {
        WM_DESTROY => {
            PostQuitMessage(0);
            LRESULT(0)
        }
        UWM_SET_CURSOR => LRESULT(0),
        _ => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}

fn register_class() -> Result<(), PlatformError> {
    if CLASS_REGISTERED.load(Ordering::SeqCst) {
        return Ok(());
    }

    unsafe {
        let instance = GetModuleHandleW(None)
            .map_err(|e| PlatformError::ClassRegistration(e.to_string()))?;
        let class_name = wide(CLASS_NAME);

        let wc = WNDCLASSW {
            style: CS_HREDRAW | CS_VREDRAW | CS_OWNDC,
            lpfnWndProc: Some(wnd_proc),
            hInstance: instance.into(),
            lpszClassName: PCWSTR(class_name.as_ptr()),
            hCursor: LoadCursorW(None, IDC_ARROW)
                .map_err(|e| PlatformError::ClassRegistration(e.to_string()))?,
            ..Default::default()
        };

        if RegisterClassW(&wc) == 0 {
            return Err(PlatformError::ClassRegistration(
                windows::core::Error::from_win32().to_string(),
            ));
        }
    }

    CLASS_REGISTERED.store(true, Ordering::SeqCst);
    debug!("Registered window class {}", CLASS_NAME);
    Ok(())
}

/// Create a hidden window whose procedure records into `inbox`
pub(super) fn create(spec: &WindowSpec, inbox: &Inbox) -> Result<CreatedWindow, PlatformError> {
    register_class()?;

    unsafe {
        let instance =
            GetModuleHandleW(None).map_err(|e| PlatformError::WindowCreation(e.to_string()))?;
        let class_name = wide(CLASS_NAME);
        let title = wide(&spec.title);

        // Requested size is the client area
        let mut frame = RECT {
            left: 0,
            top: 0,
            right: spec.width,
            bottom: spec.height,
        };
        AdjustWindowRectEx(
            &mut frame,
            WS_OVERLAPPEDWINDOW,
            BOOL::from(false),
            WINDOW_EX_STYLE::default(),
        )
        .map_err(|e| PlatformError::WindowCreation(e.to_string()))?;

        let window = CreateWindowExW(
            WINDOW_EX_STYLE::default(),
            PCWSTR(class_name.as_ptr()),
            PCWSTR(title.as_ptr()),
            WS_OVERLAPPEDWINDOW,
            spec.x.unwrap_or(CW_USEDEFAULT),
            spec.y.unwrap_or(CW_USEDEFAULT),
            frame.right - frame.left,
            frame.bottom - frame.top,
            None,
            None,
            instance,
            Some(inbox as *const Inbox as *const c_void),
        )
        .map_err(|e| PlatformError::WindowCreation(e.to_string()))?;

        let mut client = RECT::default();
        if GetClientRect(window, &mut client).is_err() {
            client.right = spec.width;
            client.bottom = spec.height;
        }

        Ok(CreatedWindow {
            window: NativeHandle(window.0 as u64),
            instance: NativeHandle(instance.0 as u64),
            client_width: client.right - client.left,
            client_height: client.bottom - client.top,
        })
    }
}
