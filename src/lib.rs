//! Evbridge - a cross-process window event bridge
//!
//! A window-owning producer process pumps native window and input events
//! and publishes them into a fixed-layout shared memory region. A separate
//! consumer process maps the same region and polls it. Commands such as
//! cursor changes travel the other way through the window's own message
//! queue.
//!
//! # Architecture
//!
//! - **Protocol Layer**: region layout, tagged payloads, seqlock writer and reader
//! - **Input**: pointer, keyboard, controller, touch and digitizer normalization
//! - **Backend**: the platform seam, the window event pump and the Win32 implementation
//!
//! # Example
//!
//! ```no_run
//! use evbridge::protocol::{RegionMemory, RegionReader};
//!
//! let memory = RegionMemory::open_file(std::path::Path::new("evbridge.region")).unwrap();
//! let mut reader = RegionReader::new(memory);
//! if let Some(snapshot) = reader.poll().unwrap() {
//!     println!("{:?}", snapshot.payload);
//! }
//! ```

pub mod backend;
pub mod config;
pub mod input;
pub mod protocol;
