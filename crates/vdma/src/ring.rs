//! Frame buffer ring allocator
//!
//! Partitions a caller-supplied address range into equally sized frame
//! slots. Nothing is allocated or freed: the memory belongs to the caller,
//! this module only computes where each slot starts.
//!
//! ```text
//! base ─┬─ slot 0 ─┬─ slot 1 ─┬─ slot 2 ─┬─ slot 3 ─┐
//!       │ slot_bytes│          │          │          │
//! ```
//!
//! Read slots are `hsize × vsize` bytes, write slots `stride × full_vsize`
//! bytes. Both directions start at the same base address, so when both
//! channels of an engine are active the caller must make sure the two rings
//! describe the same frames or do not overlap; [`RingLayout::overlaps`]
//! checks the latter.
//!
//! Address arithmetic wraps at 32 bits, the width of the frame-store
//! registers.

use crate::config::MAX_FRAME_STORES;

/// Frame-store start addresses of one channel.
pub type FrameStoreAddresses = heapless::Vec<u32, MAX_FRAME_STORES>;

/// Byte size of one read-direction slot.
pub const fn read_slot_bytes(horizontal_size_input: u32, vertical_size_input: u16) -> u32 {
    horizontal_size_input.wrapping_mul(vertical_size_input as u32)
}

/// Byte size of one write-direction slot.
pub const fn write_slot_bytes(stride: u32, full_vertical_resolution: u16) -> u32 {
    stride.wrapping_mul(full_vertical_resolution as u32)
}

/// Start addresses of `slots` consecutive slots of `slot_bytes` each.
///
/// `slots` is clamped to [`MAX_FRAME_STORES`]; anything above the count the
/// hardware reports is a caller contract violation and is not detected here.
pub fn slot_addresses(base: u32, slot_bytes: u32, slots: u16) -> FrameStoreAddresses {
    let mut addresses = FrameStoreAddresses::new();
    let mut addr = base;
    for _ in 0..usize::from(slots).min(MAX_FRAME_STORES) {
        if addresses.push(addr).is_err() {
            break;
        }
        addr = addr.wrapping_add(slot_bytes);
    }
    addresses
}

/// Layout of one ring: base, slot size and slot count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RingLayout {
    /// Address of slot 0
    pub base: u32,
    /// Bytes per slot
    pub slot_bytes: u32,
    /// Number of slots
    pub slots: u16,
}

impl RingLayout {
    /// Ring of read-direction slots.
    pub const fn read(
        base: u32,
        horizontal_size_input: u32,
        vertical_size_input: u16,
        slots: u16,
    ) -> Self {
        Self {
            base,
            slot_bytes: read_slot_bytes(horizontal_size_input, vertical_size_input),
            slots,
        }
    }

    /// Ring of write-direction slots.
    pub const fn write(
        base: u32,
        stride: u32,
        full_vertical_resolution: u16,
        slots: u16,
    ) -> Self {
        Self {
            base,
            slot_bytes: write_slot_bytes(stride, full_vertical_resolution),
            slots,
        }
    }

    /// Start address of every slot.
    pub fn addresses(&self) -> FrameStoreAddresses {
        slot_addresses(self.base, self.slot_bytes, self.slots)
    }

    /// Total bytes covered by the ring.
    pub fn span(&self) -> u64 {
        u64::from(self.slot_bytes).saturating_mul(u64::from(self.slots))
    }

    /// Whether the two rings share any byte of memory.
    ///
    /// Identical layouts overlap; that is the intended configuration when
    /// the read channel re-reads frames the write channel stored.
    pub fn overlaps(&self, other: &Self) -> bool {
        let a_start = u64::from(self.base);
        let b_start = u64::from(other.base);
        let a_end = a_start.saturating_add(self.span());
        let b_end = b_start.saturating_add(other.span());
        self.span() != 0 && other.span() != 0 && a_start < b_end && b_start < a_end
    }
}
