//! Raw HID digitizer (touchpad) report decoding
//!
//! Only reports from devices in a registered class reach a decoder. The
//! default decoder assumes a layout observed on common precision
//! touchpads and not taken from any published descriptor:
//!
//! ```text
//! byte 0      report id (skipped)
//! byte 1      contact count
//! byte 2..    contacts, 5 bytes each:
//!             x: u16 LE, y: u16 LE, flags: u8 (bit 7 active, bits 0..=3 id)
//! ```
//!
//! Treat it as an assumption until checked against captured reports from
//! the target hardware; other layouts plug in through [`ContactDecoder`].

use std::collections::HashMap;

use log::debug;

/// HID usage page for digitizers
pub const HID_USAGE_PAGE_DIGITIZER: u16 = 0x0D;
/// HID usage for a touch pad on the digitizer page
pub const HID_USAGE_DIGITIZER_TOUCH_PAD: u16 = 0x05;

/// Contact ids are 4 bits wide
pub const MAX_TOUCH_CONTACTS: usize = 16;

/// Bytes before the first contact record
const REPORT_HEADER_LEN: usize = 2;
/// Bytes per contact record
pub const CONTACT_STRIDE: usize = 5;

const CONTACT_ID_MASK: u8 = 0x0F;
const CONTACT_ACTIVE_FLAG: u8 = 0x80;

/// One touch contact, independent of any other report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TouchContact {
    pub id: u32,
    pub x: i32,
    pub y: i32,
    pub active: bool,
}

/// HID device identity from the raw input device info
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HidDeviceInfo {
    pub vendor_id: u32,
    pub product_id: u32,
    pub version: u32,
    pub usage_page: u16,
    pub usage: u16,
}

/// Kind of device a raw input packet came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawDevice {
    Mouse,
    Keyboard,
    Hid(HidDeviceInfo),
}

/// One raw input packet with its owned report buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawInputPacket {
    pub device: RawDevice,
    /// Size of each report in bytes
    pub report_size: usize,
    /// Number of reports in `data`
    pub report_count: usize,
    pub data: Vec<u8>,
}

impl RawInputPacket {
    /// Iterate the reports in the packet
    ///
    /// A truncated trailing report is still yielded so the decoder can keep
    /// the complete contacts it holds.
    pub fn reports(&self) -> impl Iterator<Item = &[u8]> {
        // chunks panics on zero
        let size = self.report_size.max(1);
        let count = if self.report_size == 0 {
            0
        } else {
            self.report_count
        };
        self.data.chunks(size).take(count)
    }
}

/// Device class a decoder is registered for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceClass {
    pub usage_page: u16,
    pub usage: u16,
    /// Restrict to one vendor; `None` matches any vendor
    pub vendor_id: Option<u32>,
}

impl DeviceClass {
    /// Any digitizer touch pad
    pub const TOUCH_PAD: DeviceClass = DeviceClass {
        usage_page: HID_USAGE_PAGE_DIGITIZER,
        usage: HID_USAGE_DIGITIZER_TOUCH_PAD,
        vendor_id: None,
    };

    pub fn for_vendor(self, vendor_id: u32) -> Self {
        Self {
            vendor_id: Some(vendor_id),
            ..self
        }
    }
}

/// Decodes the contacts of a single HID report
pub trait ContactDecoder: Send {
    /// Append decoded contacts to `out`; short reports decode partially
    fn decode(&self, report: &[u8], out: &mut Vec<TouchContact>);
}

/// Decoder for the fixed 5-byte stride layout described in the module docs
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedStrideDecoder;

impl ContactDecoder for FixedStrideDecoder {
    fn decode(&self, report: &[u8], out: &mut Vec<TouchContact>) {
        if report.len() < REPORT_HEADER_LEN {
            debug!("Report of {} bytes is too short to process", report.len());
            return;
        }

        let declared = report[1] as usize;
        let mut offset = REPORT_HEADER_LEN;
        for index in 0..declared {
            let Some(record) = report.get(offset..offset + CONTACT_STRIDE) else {
                debug!(
                    "Report truncated after {} of {} contacts",
                    index, declared
                );
                break;
            };

            let flags = record[4];
            let contact = TouchContact {
                id: u32::from(flags & CONTACT_ID_MASK),
                x: i32::from(u16::from_le_bytes([record[0], record[1]])),
                y: i32::from(u16::from_le_bytes([record[2], record[3]])),
                active: flags & CONTACT_ACTIVE_FLAG != 0,
            };
            debug!(
                "Contact {}: x={} y={} id={} active={}",
                index + 1,
                contact.x,
                contact.y,
                contact.id,
                contact.active
            );
            out.push(contact);
            offset += CONTACT_STRIDE;
        }
    }
}

/// Maps device classes to decoders
pub struct DecoderRegistry {
    decoders: HashMap<DeviceClass, Box<dyn ContactDecoder>>,
}

impl DecoderRegistry {
    /// Registry with no decoders; every report is ignored
    pub fn empty() -> Self {
        Self {
            decoders: HashMap::new(),
        }
    }

    /// Registry decoding any touch pad with [`FixedStrideDecoder`]
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(DeviceClass::TOUCH_PAD, FixedStrideDecoder);
        registry
    }

    /// Register a decoder, replacing any previous one for the class
    pub fn register(&mut self, class: DeviceClass, decoder: impl ContactDecoder + 'static) {
        self.decoders.insert(class, Box::new(decoder));
    }

    /// Classes with a registered decoder
    pub fn classes(&self) -> impl Iterator<Item = &DeviceClass> {
        self.decoders.keys()
    }

    /// Decoder for a device; a vendor-specific entry wins over a generic one
    pub fn decoder_for(&self, device: &HidDeviceInfo) -> Option<&dyn ContactDecoder> {
        let generic = DeviceClass {
            usage_page: device.usage_page,
            usage: device.usage,
            vendor_id: None,
        };
        self.decoders
            .get(&generic.for_vendor(device.vendor_id))
            .or_else(|| self.decoders.get(&generic))
            .map(|decoder| decoder.as_ref())
    }

    /// Decode every report of a packet
    ///
    /// Returns `None` if the packet is not from a registered device class;
    /// such packets never reach a decoder.
    pub fn decode(&self, packet: &RawInputPacket) -> Option<Vec<TouchContact>> {
        let RawDevice::Hid(info) = &packet.device else {
            return None;
        };
        let decoder = self.decoder_for(info)?;

        let mut contacts = Vec::new();
        for (index, report) in packet.reports().enumerate() {
            debug!("Digitizer report {} ({} bytes)", index, report.len());
            decoder.decode(report, &mut contacts);
        }
        contacts.truncate(MAX_TOUCH_CONTACTS);
        Some(contacts)
    }
}

impl Default for DecoderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DecoderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecoderRegistry")
            .field("classes", &self.decoders.keys().collect::<Vec<_>>())
            .finish()
    }
}
