//! Raw input, touch, controller and keyboard layout calls

use std::ffi::c_void;
use std::mem::size_of;

use log::debug;
use windows::Win32::Foundation::{HANDLE, HWND, LPARAM, WPARAM};
use windows::Win32::UI::Input::KeyboardAndMouse::{MapVirtualKeyW, MAPVK_VSC_TO_VK_EX};
use windows::Win32::UI::Input::Touch::{
    CloseTouchInputHandle, GetTouchInputInfo, RegisterTouchWindow, HTOUCHINPUT,
    REGISTER_TOUCH_WINDOW_FLAGS, TOUCHINPUT,
};
use windows::Win32::UI::Input::XboxController::{XInputGetState, XINPUT_STATE};
use windows::Win32::UI::Input::{
    GetRawInputData, GetRawInputDeviceInfoW, RegisterRawInputDevices, HRAWINPUT, RAWINPUT,
    RAWINPUTDEVICE, RAWINPUTHEADER, RIDEV_INPUTSINK, RIDI_DEVICEINFO, RID_DEVICE_INFO, RID_INPUT,
};

use crate::backend::platform::PlatformError;
use crate::input::controller::{ControllerSlotState, GamepadButtons};
use crate::input::digitizer::{
    HidDeviceInfo, RawDevice, RawInputPacket, HID_USAGE_DIGITIZER_TOUCH_PAD,
    HID_USAGE_PAGE_DIGITIZER,
};
use crate::input::touch::{self, TouchPoint, MAX_TOUCH_INPUTS};

const RIM_TYPE_MOUSE: u32 = 0;
const RIM_TYPE_KEYBOARD: u32 = 1;
const RIM_TYPE_HID: u32 = 2;

const ERROR_SUCCESS: u32 = 0;

/// Register the window for multi-touch and raw digitizer reports
pub(super) fn register(hwnd: HWND) -> Result<(), PlatformError> {
    unsafe {
        RegisterTouchWindow(hwnd, REGISTER_TOUCH_WINDOW_FLAGS(0))
            .map_err(|e| PlatformError::InputRegistration(format!("touch: {}", e)))?;

        let devices = [RAWINPUTDEVICE {
            usUsagePage: HID_USAGE_PAGE_DIGITIZER,
            usUsage: HID_USAGE_DIGITIZER_TOUCH_PAD,
            dwFlags: RIDEV_INPUTSINK,
            hwndTarget: hwnd,
        }];
        RegisterRawInputDevices(&devices, size_of::<RAWINPUTDEVICE>() as u32)
            .map_err(|e| PlatformError::InputRegistration(format!("raw input: {}", e)))?;
    }
    debug!("Registered touch and digitizer input");
    Ok(())
}

/// Read the packet behind a WM_INPUT lparam
///
/// The size is probed first, then the data is fetched into one owned
/// buffer that is dropped on every return path.
pub(super) fn read_raw_input(lparam: LPARAM) -> Result<RawInputPacket, PlatformError> {
    let handle = HRAWINPUT(lparam.0 as *mut c_void);
    let header_size = size_of::<RAWINPUTHEADER>() as u32;

    let mut size = 0u32;
    let probe = unsafe { GetRawInputData(handle, RID_INPUT, None, &mut size, header_size) };
    if probe != 0 || size == 0 {
        return Err(PlatformError::RawInput("size probe failed".into()));
    }

    // u64 words keep the RAWINPUT view aligned
    let mut buffer = vec![0u64; (size as usize).div_ceil(8)];
    let read = unsafe {
        GetRawInputData(
            handle,
            RID_INPUT,
            Some(buffer.as_mut_ptr() as *mut c_void),
            &mut size,
            header_size,
        )
    };
    if read == u32::MAX || read as usize > buffer.len() * 8 || (read as usize) < header_size as usize
    {
        return Err(PlatformError::RawInput("data fetch failed".into()));
    }

    let base = buffer.as_ptr() as *const u8;
    // SAFETY: the buffer holds at least a header and is 8-byte aligned
    let raw = unsafe { &*(base as *const RAWINPUT) };

    match raw.header.dwType {
        RIM_TYPE_HID => {
            let info = device_info(raw.header.hDevice)?;
            // SAFETY: dwType says the union holds a RAWHID
            let hid = unsafe { &raw.data.hid };
            let report_size = hid.dwSizeHid as usize;
            let report_count = hid.dwCount as usize;

            let offset = hid.bRawData.as_ptr() as usize - base as usize;
            let available = (read as usize).saturating_sub(offset);
            let len = report_size.saturating_mul(report_count).min(available);
            // SAFETY: offset..offset + len lies inside the bytes written by the fetch
            let data = unsafe { std::slice::from_raw_parts(base.add(offset), len) }.to_vec();

            Ok(RawInputPacket {
                device: RawDevice::Hid(info),
                report_size,
                report_count,
                data,
            })
        }
        RIM_TYPE_MOUSE | RIM_TYPE_KEYBOARD => Ok(RawInputPacket {
            device: if raw.header.dwType == RIM_TYPE_MOUSE {
                RawDevice::Mouse
            } else {
                RawDevice::Keyboard
            },
            report_size: 0,
            report_count: 0,
            data: Vec::new(),
        }),
        other => Err(PlatformError::RawInput(format!(
            "unknown device type {}",
            other
        ))),
    }
}

fn device_info(device: HANDLE) -> Result<HidDeviceInfo, PlatformError> {
    let mut info = RID_DEVICE_INFO {
        cbSize: size_of::<RID_DEVICE_INFO>() as u32,
        ..Default::default()
    };
    let mut size = info.cbSize;
    let read = unsafe {
        GetRawInputDeviceInfoW(
            device,
            RIDI_DEVICEINFO,
            Some(&mut info as *mut RID_DEVICE_INFO as *mut c_void),
            &mut size,
        )
    };
    if read == u32::MAX || read == 0 {
        return Err(PlatformError::RawInput("device info unavailable".into()));
    }

    // SAFETY: only HID devices are queried
    let hid = unsafe { info.Anonymous.hid };
    Ok(HidDeviceInfo {
        vendor_id: hid.dwVendorId,
        product_id: hid.dwProductId,
        version: hid.dwVersionNumber,
        usage_page: hid.usUsagePage,
        usage: hid.usUsage,
    })
}

/// Read the points of a WM_TOUCH message and close its handle
pub(super) fn read_touch_points(
    wparam: WPARAM,
    lparam: LPARAM,
) -> Result<Vec<TouchPoint>, PlatformError> {
    let handle = HTOUCHINPUT(lparam.0 as *mut c_void);
    let count = touch::input_count(wparam.0);
    let mut inputs = vec![TOUCHINPUT::default(); count.min(MAX_TOUCH_INPUTS)];

    let result = unsafe {
        let result = GetTouchInputInfo(handle, &mut inputs, size_of::<TOUCHINPUT>() as i32);
        let _ = CloseTouchInputHandle(handle);
        result
    };
    result.map_err(|e| PlatformError::TouchInput(e.to_string()))?;

    Ok(inputs
        .iter()
        .map(|input| TouchPoint {
            id: input.dwID,
            x: input.x,
            y: input.y,
            flags: input.dwFlags.0,
        })
        .collect())
}

/// Query one XInput slot
pub(super) fn query_controller(slot: usize) -> Option<ControllerSlotState> {
    let mut state = XINPUT_STATE::default();
    let status = unsafe { XInputGetState(slot as u32, &mut state) };
    if status != ERROR_SUCCESS {
        return None;
    }

    let pad = state.Gamepad;
    Some(ControllerSlotState {
        buttons: GamepadButtons::from_bits_truncate(pad.wButtons.0),
        left_trigger: pad.bLeftTrigger,
        right_trigger: pad.bRightTrigger,
        thumb_lx: pad.sThumbLX,
        thumb_ly: pad.sThumbLY,
        thumb_rx: pad.sThumbRX,
        thumb_ry: pad.sThumbRY,
        connected: true,
    })
}

/// Side-specific virtual key for a scan code
pub(super) fn map_scan_code(scan_code: u32) -> u32 {
    unsafe { MapVirtualKeyW(scan_code, MAPVK_VSC_TO_VK_EX) }
}
