//! Shared region protocol
//!
//! This module defines everything a consumer process needs to read the
//! bridge:
//! - the fixed byte layout of the region header and payload slot
//! - the tagged event payloads and their encoding
//! - the producer writer and the consumer reader

pub mod layout;
pub mod payload;
pub mod region;

pub use layout::{WriteState, CONTROLLER_EVENT, REGION_MIN_SIZE};
pub use payload::{ControllerSnapshot, EventPayload, KeyboardEvent, PayloadError, PointerEvent};
pub use region::{RegionError, RegionMemory, RegionReader, RegionSnapshot, SharedRegion};
