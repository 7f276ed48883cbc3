//! Shared region memory, producer writer and consumer reader
//!
//! The region is allocated by the consumer before the producer starts. The
//! producer only writes into it; the consumer only reads. Every write is
//! bracketed by the generation counter at [`SEQUENCE_OFFSET`]: odd while a
//! write is in progress, even once it is complete. A reader accepts a copy
//! only if the counter was even and unchanged across the copy.

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::ptr::NonNull;
use std::sync::atomic::{fence, AtomicU32, Ordering};
use std::sync::Arc;

use log::{debug, warn};
use memmap2::{MmapMut, MmapOptions};

use super::layout::*;
use super::payload::{get_i32, get_u32, EventPayload, PayloadError};

/// Number of copy attempts a reader makes before reporting contention
const READ_RETRIES: usize = 64;

/// Backing storage of a region
enum Backing {
    /// Mapping owned by this process
    Mapped(#[allow(dead_code)] MmapMut),
    /// Memory owned by a foreign caller
    External,
}

/// Memory block holding one shared region
pub struct RegionMemory {
    ptr: NonNull<u8>,
    len: usize,
    _backing: Backing,
}

// The block is only touched through volatile copies and atomics.
unsafe impl Send for RegionMemory {}
unsafe impl Sync for RegionMemory {}

impl std::fmt::Debug for RegionMemory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegionMemory")
            .field("ptr", &self.ptr)
            .field("len", &self.len)
            .finish()
    }
}

impl RegionMemory {
    /// Map an anonymous region, visible to this process only
    pub fn anonymous(size: usize) -> Result<Arc<Self>, RegionError> {
        check_size(size)?;
        let map = MmapOptions::new().len(size).map_anon()?;
        Self::from_map(map)
    }

    /// Allocate a zeroed file-backed region shared with other processes
    ///
    /// This is the consumer's side of the handshake; an existing file at
    /// `path` is truncated. The producer maps it with [`Self::open_file`].
    pub fn create_file(path: &Path, size: usize) -> Result<Arc<Self>, RegionError> {
        check_size(size)?;
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        file.set_len(size as u64)?;
        debug!("Created region file {} ({} bytes)", path.display(), size);
        Self::map_file(&file)
    }

    /// Map an existing file-backed region without resizing or clearing it
    pub fn open_file(path: &Path) -> Result<Arc<Self>, RegionError> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        check_size(file.metadata()?.len() as usize)?;
        Self::map_file(&file)
    }

    /// Adopt memory owned by a foreign caller
    ///
    /// # Safety
    /// `ptr` must be valid for reads and writes of `len` bytes for the whole
    /// lifetime of the returned value, and must not be written by anyone
    /// other than the single producer.
    pub unsafe fn from_raw(ptr: *mut u8, len: usize) -> Result<Arc<Self>, RegionError> {
        check_size(len)?;
        let ptr = NonNull::new(ptr).ok_or(RegionError::Null)?;
        check_align(ptr)?;
        Ok(Arc::new(Self {
            ptr,
            len,
            _backing: Backing::External,
        }))
    }

    fn map_file(file: &File) -> Result<Arc<Self>, RegionError> {
        // SAFETY: the file is a plain region file; concurrent modification by
        // the peer process is the point of the mapping and is handled by the
        // sequence protocol.
        let map = unsafe { MmapMut::map_mut(file)? };
        Self::from_map(map)
    }

    fn from_map(mut map: MmapMut) -> Result<Arc<Self>, RegionError> {
        let len = map.len();
        let ptr = NonNull::new(map.as_mut_ptr()).ok_or(RegionError::Null)?;
        check_align(ptr)?;
        Ok(Arc::new(Self {
            ptr,
            len,
            _backing: Backing::Mapped(map),
        }))
    }

    /// Size of the block in bytes
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false; regions are at least [`REGION_MIN_SIZE`] bytes
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn atomic(&self, offset: usize) -> &AtomicU32 {
        // SAFETY: offset is one of the 4-byte aligned header fields inside the
        // block, and the base is at least 8-byte aligned.
        unsafe { &*(self.ptr.as_ptr().add(offset) as *const AtomicU32) }
    }

    fn sequence(&self) -> &AtomicU32 {
        self.atomic(SEQUENCE_OFFSET)
    }

    fn write_state(&self) -> &AtomicU32 {
        self.atomic(WRITE_STATE_OFFSET)
    }

    fn store(&self, offset: usize, bytes: &[u8]) {
        debug_assert!(offset + bytes.len() <= self.len);
        let base = self.ptr.as_ptr();
        for (i, byte) in bytes.iter().enumerate() {
            // SAFETY: bounds checked against the region length above.
            unsafe { base.add(offset + i).write_volatile(*byte) };
        }
    }

    fn load(&self, offset: usize, out: &mut [u8]) {
        debug_assert!(offset + out.len() <= self.len);
        let base = self.ptr.as_ptr();
        for (i, byte) in out.iter_mut().enumerate() {
            // SAFETY: bounds checked against the region length above.
            *byte = unsafe { base.add(offset + i).read_volatile() };
        }
    }
}

fn check_size(size: usize) -> Result<(), RegionError> {
    if size < REGION_MIN_SIZE {
        return Err(RegionError::TooSmall {
            size,
            required: REGION_MIN_SIZE,
        });
    }
    Ok(())
}

fn check_align(ptr: NonNull<u8>) -> Result<(), RegionError> {
    let addr = ptr.as_ptr() as usize;
    if addr % REGION_ALIGN != 0 {
        return Err(RegionError::Misaligned(addr));
    }
    Ok(())
}

/// Producer side of a shared region
///
/// There must be at most one `SharedRegion` per block.
#[derive(Debug)]
pub struct SharedRegion {
    memory: Arc<RegionMemory>,
}

impl SharedRegion {
    /// Take the producer role for a block
    pub fn new(memory: Arc<RegionMemory>) -> Self {
        // A producer that died mid-write leaves the counter odd
        let seq = memory.sequence().load(Ordering::Relaxed);
        if seq % 2 == 1 {
            warn!("Region sequence {} was left mid-write, resetting", seq);
            memory.sequence().store(seq.wrapping_add(1), Ordering::Release);
        }
        Self { memory }
    }

    /// Size of the underlying block
    pub fn len(&self) -> usize {
        self.memory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memory.is_empty()
    }

    /// Create a reader over the same block (mainly useful in-process)
    pub fn reader(&self) -> RegionReader {
        RegionReader::new(self.memory.clone())
    }

    /// Current write-state tag
    pub fn write_state(&self) -> WriteState {
        WriteState::from_raw(self.memory.write_state().load(Ordering::Acquire))
    }

    /// Record the native window and instance handles
    pub fn set_handles(&mut self, window: u64, instance: u64) {
        self.locked(|mem| {
            mem.store(WINDOW_HANDLE_OFFSET, &window.to_le_bytes());
            mem.store(INSTANCE_HANDLE_OFFSET, &instance.to_le_bytes());
        });
    }

    /// Record the cached client-area dimensions
    pub fn set_dimensions(&mut self, width: i32, height: i32) {
        self.locked(|mem| {
            mem.store(WINDOW_WIDTH_OFFSET, &width.to_le_bytes());
            mem.store(WINDOW_HEIGHT_OFFSET, &height.to_le_bytes());
        });
    }

    /// Write an event without changing the write-state tag
    pub fn write_event(&mut self, event_type: u32, payload: &EventPayload) {
        let slot = encode_slot(payload);
        self.locked(|mem| {
            mem.store(EVENT_TYPE_OFFSET, &event_type.to_le_bytes());
            mem.store(PAYLOAD_TAG_OFFSET, &payload.tag().to_le_bytes());
            mem.store(PAYLOAD_OFFSET, &slot);
        });
    }

    /// Write an event and publish it under a write-state tag
    ///
    /// Tag, event type and payload become visible to a reader together.
    pub fn publish(&mut self, state: WriteState, event_type: u32, payload: &EventPayload) {
        let slot = encode_slot(payload);
        self.locked(|mem| {
            mem.store(EVENT_TYPE_OFFSET, &event_type.to_le_bytes());
            mem.store(PAYLOAD_TAG_OFFSET, &payload.tag().to_le_bytes());
            mem.store(PAYLOAD_OFFSET, &slot);
            mem.write_state().store(state.to_raw(), Ordering::Relaxed);
        });
    }

    /// Report a fatal error to the consumer
    ///
    /// Usable before any handle has been written. After this the producer
    /// must stop processing the window.
    pub fn write_fatal(&mut self, message: &str) {
        let message = if message.is_empty() {
            "Unknown fatal error"
        } else {
            message
        };
        self.publish(WriteState::Fatal, 0, &EventPayload::fatal(message));
    }

    fn locked(&mut self, write: impl FnOnce(&RegionMemory)) {
        let mem = &*self.memory;
        let seq = mem.sequence().load(Ordering::Relaxed);
        mem.sequence().store(seq.wrapping_add(1), Ordering::Relaxed);
        fence(Ordering::Release);
        write(mem);
        mem.sequence().store(seq.wrapping_add(2), Ordering::Release);
    }
}

fn encode_slot(payload: &EventPayload) -> [u8; PAYLOAD_CAPACITY] {
    let mut slot = [0u8; PAYLOAD_CAPACITY];
    payload.encode(&mut slot);
    slot
}

/// One consistent copy of the region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionSnapshot {
    /// Generation the copy was taken at
    pub sequence: u32,
    pub write_state: WriteState,
    pub window_handle: u64,
    pub instance_handle: u64,
    pub window_width: i32,
    pub window_height: i32,
    /// Raw native code of the last event
    pub event_type: u32,
    pub payload: EventPayload,
}

/// Consumer side of a shared region
#[derive(Debug)]
pub struct RegionReader {
    memory: Arc<RegionMemory>,
    last_sequence: Option<u32>,
}

impl RegionReader {
    pub fn new(memory: Arc<RegionMemory>) -> Self {
        Self {
            memory,
            last_sequence: None,
        }
    }

    /// Take one consistent snapshot
    pub fn read(&self) -> Result<RegionSnapshot, RegionError> {
        let mem = &*self.memory;
        let mut header = [0u8; HEADER_SIZE];
        let mut slot = [0u8; PAYLOAD_CAPACITY];

        for _ in 0..READ_RETRIES {
            let before = mem.sequence().load(Ordering::Acquire);
            if before % 2 == 1 {
                std::hint::spin_loop();
                continue;
            }

            mem.load(0, &mut header);
            mem.load(PAYLOAD_OFFSET, &mut slot);
            fence(Ordering::Acquire);

            let after = mem.sequence().load(Ordering::Relaxed);
            if before != after {
                std::hint::spin_loop();
                continue;
            }

            let tag = get_u32(&header, PAYLOAD_TAG_OFFSET);
            return Ok(RegionSnapshot {
                sequence: before,
                write_state: WriteState::from_raw(get_u32(&header, WRITE_STATE_OFFSET)),
                window_handle: get_u64(&header, WINDOW_HANDLE_OFFSET),
                instance_handle: get_u64(&header, INSTANCE_HANDLE_OFFSET),
                window_width: get_i32(&header, WINDOW_WIDTH_OFFSET),
                window_height: get_i32(&header, WINDOW_HEIGHT_OFFSET),
                event_type: get_u32(&header, EVENT_TYPE_OFFSET),
                payload: EventPayload::decode(tag, &slot)?,
            });
        }

        Err(RegionError::Contended)
    }

    /// Snapshot only if something was written since the last accepted poll
    pub fn poll(&mut self) -> Result<Option<RegionSnapshot>, RegionError> {
        let snapshot = self.read()?;
        if self.last_sequence == Some(snapshot.sequence) {
            return Ok(None);
        }
        self.last_sequence = Some(snapshot.sequence);
        Ok(Some(snapshot))
    }
}

fn get_u64(buf: &[u8], at: usize) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&buf[at..at + 8]);
    u64::from_le_bytes(bytes)
}

/// Region errors
#[derive(Debug, thiserror::Error)]
pub enum RegionError {
    #[error("Region of {size} bytes is smaller than the required {required}")]
    TooSmall { size: usize, required: usize },
    #[error("Region base address {0:#x} is not 8-byte aligned")]
    Misaligned(usize),
    #[error("Region pointer is null")]
    Null,
    #[error("Region is being written too often to take a consistent copy")]
    Contended,
    #[error("Region payload is invalid: {0}")]
    Payload(#[from] PayloadError),
    #[error("Region mapping failed: {0}")]
    Io(#[from] std::io::Error),
}
