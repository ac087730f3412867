//! Per-direction channel configuration
//!
//! [`ChannelConfig`] is the value the driver hands to
//! [`VdmaHal::dma_config`](crate::VdmaHal::dma_config). It is built from
//! frame geometry and a [`GenlockRole`]; every genlock-related field is
//! derived from the role so the two can never disagree.
//!
//! Geometry invariants:
//! - `horizontal_size_input = h_res × stream_width` (bytes per line)
//! - `stride ≥ horizontal_size_input`
//! - write channels may place an `h_res × v_res` window inside a larger
//!   `full_h_res × full_v_res` framebuffer; stride and slot size follow the
//!   full framebuffer

use crate::genlock::GenlockRole;
use crate::hal::Direction;
use crate::ring::{FrameStoreAddresses, RingLayout};

/// Configuration of one channel, as last submitted to hardware.
///
/// Hardware keeps its own copy once submitted; this value is kept for
/// inspection only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelConfig {
    /// Channel direction
    pub direction: Direction,
    /// Genlock role the genlock fields were derived from
    pub role: GenlockRole,
    /// Line length in bytes (HSIZE)
    pub horizontal_size_input: u32,
    /// Lines per frame (VSIZE)
    pub vertical_size_input: u16,
    /// Bytes between the starts of consecutive lines
    pub stride: u32,
    /// Lines per frame store (write: full framebuffer height)
    pub full_vertical_resolution: u16,
    /// Frames this channel may lag its genlock reference
    pub frame_delay: u8,
    /// Cycle through all frame stores instead of parking on one
    pub enable_circular_buffer: bool,
    /// Follow the genlock reference
    pub enable_sync: bool,
    /// Genlock pointer index (the promoted master)
    pub point_num: u8,
    /// Stop after a fixed frame count
    pub enable_frame_counter: bool,
    /// Park frame store when circular mode is off
    pub fixed_frame_store_addr: u8,
    /// Repeat the previous frame on a frame error while genlocked
    pub genlock_repeat: bool,
    /// Frame-store start addresses, filled by [`assign_frame_stores`](Self::assign_frame_stores)
    pub frame_store_addresses: FrameStoreAddresses,
}

impl ChannelConfig {
    /// Read channel configuration. Read channels are always genlock slaves.
    pub fn read(h_res: u16, v_res: u16, stream_width: u16, master_select: u8) -> Self {
        let hsize = line_bytes(h_res, stream_width);
        Self::with_role(
            Direction::Read,
            GenlockRole::read(master_select),
            hsize,
            v_res,
            hsize,
            v_res,
        )
    }

    /// Write channel configuration.
    ///
    /// A `full_h_res` / `full_v_res` of zero, or smaller than the window,
    /// falls back to the window size so stride and slot size never undercut
    /// one frame.
    pub fn write(
        h_res: u16,
        v_res: u16,
        full_h_res: u16,
        full_v_res: u16,
        stream_width: u16,
        master_select: u8,
        is_master: bool,
    ) -> Self {
        let hsize = line_bytes(h_res, stream_width);
        let stride = line_bytes(full_h_res, stream_width).max(hsize);
        Self::with_role(
            Direction::Write,
            GenlockRole::write(master_select, is_master),
            hsize,
            v_res,
            stride,
            full_v_res.max(v_res),
        )
    }

    fn with_role(
        direction: Direction,
        role: GenlockRole,
        horizontal_size_input: u32,
        vertical_size_input: u16,
        stride: u32,
        full_vertical_resolution: u16,
    ) -> Self {
        Self {
            direction,
            role,
            horizontal_size_input,
            vertical_size_input,
            stride,
            full_vertical_resolution,
            frame_delay: role.frame_delay(direction),
            enable_circular_buffer: role.enable_circular_buffer(),
            enable_sync: role.enable_sync(),
            point_num: role.point_num(),
            enable_frame_counter: false,
            fixed_frame_store_addr: 0,
            genlock_repeat: true,
            frame_store_addresses: FrameStoreAddresses::new(),
        }
    }

    /// Ring layout of this channel starting at `base`.
    pub const fn ring_layout(&self, base: u32, slots: u16) -> RingLayout {
        match self.direction {
            Direction::Read => RingLayout::read(
                base,
                self.horizontal_size_input,
                self.vertical_size_input,
                slots,
            ),
            Direction::Write => {
                RingLayout::write(base, self.stride, self.full_vertical_resolution, slots)
            }
        }
    }

    /// Compute and store the frame-store addresses for `slots` slots from `base`.
    pub fn assign_frame_stores(&mut self, base: u32, slots: u16) -> &FrameStoreAddresses {
        self.frame_store_addresses = self.ring_layout(base, slots).addresses();
        &self.frame_store_addresses
    }

    /// Whether this channel is the promoted genlock master.
    pub const fn is_master(&self) -> bool {
        self.role.is_master()
    }
}

/// Bytes per line. Both factors are 16-bit, so the product fits in 32 bits.
fn line_bytes(pixels: u16, stream_width: u16) -> u32 {
    u32::from(pixels).saturating_mul(u32::from(stream_width))
}

#[cfg(test)]
#[allow(clippy::arithmetic_side_effects, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn read_config_follows_geometry_and_policy() {
        let cfg = ChannelConfig::read(640, 480, 4, 2);
        assert_eq!(cfg.horizontal_size_input, 2560);
        assert_eq!(cfg.vertical_size_input, 480);
        assert_eq!(cfg.stride, 2560);
        assert_eq!(cfg.frame_delay, 2);
        assert!(cfg.enable_sync);
        assert!(cfg.enable_circular_buffer);
        assert_eq!(cfg.point_num, 2);
        assert!(!cfg.enable_frame_counter);
        assert_eq!(cfg.fixed_frame_store_addr, 0);
        assert!(cfg.genlock_repeat);
    }

    #[test]
    fn write_window_uses_full_framebuffer_stride() {
        let cfg = ChannelConfig::write(640, 480, 1920, 1080, 3, 0, false);
        assert_eq!(cfg.horizontal_size_input, 640 * 3);
        assert_eq!(cfg.stride, 1920 * 3);
        assert_eq!(cfg.full_vertical_resolution, 1080);
    }

    #[test]
    fn zero_full_resolution_defaults_to_window() {
        let cfg = ChannelConfig::write(640, 480, 0, 0, 4, 0, false);
        assert_eq!(cfg.stride, cfg.horizontal_size_input);
        assert_eq!(cfg.full_vertical_resolution, 480);
    }

    #[test]
    fn narrower_full_width_never_undercuts_line() {
        let cfg = ChannelConfig::write(800, 600, 640, 480, 2, 0, false);
        assert_eq!(cfg.stride, 1600);
        assert_eq!(cfg.full_vertical_resolution, 600);
    }

    #[test]
    fn promoted_master_free_runs() {
        let master = ChannelConfig::write(1280, 720, 1280, 720, 4, 1, true);
        assert!(!master.enable_sync);
        assert!(master.is_master());
        assert!(master.enable_circular_buffer);

        let slave = ChannelConfig::write(1280, 720, 1280, 720, 4, 1, false);
        assert!(slave.enable_sync);
        assert_eq!(slave.frame_delay, 0);
        assert_eq!(slave.point_num, 1);
    }

    #[test]
    fn assign_frame_stores_uses_direction_slot_size() {
        let mut read = ChannelConfig::read(640, 480, 4, 0);
        let addrs = read.assign_frame_stores(0x1000, 4);
        assert_eq!(addrs.as_slice(), &[0x1000, 0x12_D000, 0x25_9000, 0x38_5000]);

        let mut write = ChannelConfig::write(640, 480, 1024, 768, 4, 0, true);
        write.assign_frame_stores(0, 2);
        assert_eq!(write.frame_store_addresses.as_slice(), &[0, 1024 * 4 * 768]);
    }
}
