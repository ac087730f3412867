//! Hardware abstraction boundary
//!
//! The vendor register library is reached only through [`VdmaHal`]. Every
//! mutating call returns a `Result`; the driver treats any `Err` as a
//! hardware rejection and does not look at finer status codes.
//!
//! Channel naming follows the core's register map:
//!
//! | Direction | Channel | Descriptor flag |
//! |-----------|---------|-----------------|
//! | Read      | MM2S    | `has_mm2s`      |
//! | Write     | S2MM    | `has_s2mm`      |

use crate::channel::ChannelConfig;

// ── Status and interrupt masks ───────────────────────────────────────────────

/// All error bits of a channel status register (DMA internal, slave, decode,
/// SOF/EOF early/late).
pub const SR_ERR_ALL_MASK: u32 = 0x0000_CFF0;

/// Interrupt on frame count reached.
pub const IXR_FRMCNT_MASK: u32 = 0x0000_1000;

/// Interrupt on delay count reached.
pub const IXR_DELAYCNT_MASK: u32 = 0x0000_2000;

/// Interrupt on error.
pub const IXR_ERROR_MASK: u32 = 0x0000_4000;

/// Every interrupt source of a channel.
pub const IXR_ALL_MASK: u32 = IXR_FRMCNT_MASK | IXR_DELAYCNT_MASK | IXR_ERROR_MASK;

/// Completion-type interrupt sources (frame and delay counters).
pub const IXR_COMPLETION_MASK: u32 = IXR_FRMCNT_MASK | IXR_DELAYCNT_MASK;

/// S2MM error-interrupt mask register: every maskable error source.
pub const S2MM_IRQ_ERR_ALL_MASK: u32 = 0x0000_000F;

// ── Direction ────────────────────────────────────────────────────────────────

/// One direction of the engine, configured and started independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Read channel (MM2S)
    Read,
    /// Write channel (S2MM)
    Write,
}

impl Direction {
    /// Both directions, read first.
    pub const ALL: [Self; 2] = [Self::Read, Self::Write];

    /// Register-map name of the channel.
    pub const fn channel_name(self) -> &'static str {
        match self {
            Self::Read => "MM2S",
            Self::Write => "S2MM",
        }
    }
}

impl core::fmt::Display for Direction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Read => write!(f, "read"),
            Self::Write => write!(f, "write"),
        }
    }
}

// ── Hardware descriptor ──────────────────────────────────────────────────────

/// Hardware configuration descriptor returned by [`VdmaHal::lookup_config`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HwConfig {
    /// Device identifier the descriptor belongs to
    pub device_id: u16,
    /// Register base address of the engine
    pub base_address: u32,
    /// Read (MM2S) channel is present
    pub has_mm2s: bool,
    /// Write (S2MM) channel is present
    pub has_s2mm: bool,
    /// Number of frame stores built into the core
    pub max_frame_slots: u16,
    /// Read stream width in bytes per pixel
    pub mm2s_stream_width: u16,
    /// Write stream width in bytes per pixel
    pub s2mm_stream_width: u16,
}

impl HwConfig {
    /// Whether the given direction exists in this instance.
    pub const fn has_direction(&self, direction: Direction) -> bool {
        match direction {
            Direction::Read => self.has_mm2s,
            Direction::Write => self.has_s2mm,
        }
    }

    /// Stream width in bytes per pixel of the given direction.
    pub const fn stream_width(&self, direction: Direction) -> u16 {
        match direction {
            Direction::Read => self.mm2s_stream_width,
            Direction::Write => self.s2mm_stream_width,
        }
    }
}

// ── Interrupt status ─────────────────────────────────────────────────────────

/// Snapshot taken by the interrupt handler of one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InterruptStatus {
    /// Pending `IXR_*` bits, already acknowledged in hardware
    pub pending: u32,
    /// `SR_ERR_*` bits latched in the status register
    pub errors: u32,
}

impl InterruptStatus {
    /// Frame-count or delay-count interrupt pending.
    pub const fn is_completion(&self) -> bool {
        self.pending & IXR_COMPLETION_MASK != 0
    }

    /// Error interrupt pending.
    pub const fn is_error(&self) -> bool {
        self.pending & IXR_ERROR_MASK != 0
    }
}

// ── HAL trait ────────────────────────────────────────────────────────────────

/// Register-level access to one VDMA engine.
///
/// Implemented over the vendor library on hardware and by
/// `mocks::MockVdmaHal` in tests.
pub trait VdmaHal {
    /// Error type
    type Error: core::fmt::Debug;

    /// Look up the hardware descriptor of `device_id`.
    fn lookup_config(&self, device_id: u16) -> Option<HwConfig>;

    /// Initialize the driver instance against `config`.
    ///
    /// Performs a hardware reset of both channels.
    fn initialize(&mut self, config: &HwConfig) -> Result<(), Self::Error>;

    /// Issue a soft reset on one channel. Completion is observed through
    /// [`reset_not_done`](Self::reset_not_done).
    fn channel_reset(&mut self, direction: Direction);

    /// `true` while the last reset of the channel is still in progress.
    fn reset_not_done(&self, direction: Direction) -> bool;

    /// Submit a channel configuration.
    fn dma_config(&mut self, direction: Direction, config: &ChannelConfig)
        -> Result<(), Self::Error>;

    /// Program the frame-store start addresses.
    fn set_buffer_addresses(
        &mut self,
        direction: Direction,
        addresses: &[u32],
    ) -> Result<(), Self::Error>;

    /// Set the number of frame stores the channel cycles through.
    ///
    /// Without the FRMSTR register in hardware the core keeps using all
    /// built-in stores.
    fn set_frame_store_count(&mut self, direction: Direction, count: u16)
        -> Result<(), Self::Error>;

    /// Clear error bits in the channel status register.
    fn clear_channel_errors(&mut self, direction: Direction, mask: u32);

    /// Enable interrupt sources of the channel.
    fn interrupt_enable(&mut self, direction: Direction, mask: u32);

    /// Write the S2MM error-interrupt mask register. Set bits mask an error
    /// source, cleared bits let it raise an interrupt.
    fn mask_s2mm_error_interrupts(&mut self, direction: Direction, mask: u32);

    /// Start the channel.
    fn dma_start(&mut self, direction: Direction) -> Result<(), Self::Error>;

    /// Read and acknowledge the pending interrupts of the channel, together
    /// with the error bits of its status register.
    ///
    /// Called from interrupt context.
    fn take_interrupt_status(&mut self, direction: Direction) -> InterruptStatus;
}
