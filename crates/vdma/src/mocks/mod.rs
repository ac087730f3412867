//! Mock implementations for testing
//!
//! [`MockVdmaHal`] and [`MockInterruptController`] record every call in order
//! and can be told to fail a specific step, so bring-up ordering, rollback and
//! error propagation can be checked without hardware.

#![cfg(any(test, feature = "std"))]

use core::cell::Cell;

use crate::channel::ChannelConfig;
use crate::hal::{Direction, HwConfig, InterruptStatus, VdmaHal};
use crate::irq::{InterruptController, IrqId, IsrRoute};
use crate::ring::FrameStoreAddresses;

/// Reset delay that never completes.
pub const STUCK_RESET: u32 = u32::MAX;

/// Capacity of the call logs.
const LOG_CAPACITY: usize = 128;

// ── VDMA HAL ─────────────────────────────────────────────────────────────────

/// One recorded HAL call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HalCall {
    /// `initialize`
    Initialize {
        /// Device being initialized
        device_id: u16,
    },
    /// `channel_reset`
    ChannelReset(Direction),
    /// `dma_config`
    DmaConfig(Direction),
    /// `set_buffer_addresses`
    SetBufferAddresses {
        /// Channel
        direction: Direction,
        /// Number of addresses programmed
        count: usize,
    },
    /// `set_frame_store_count`
    SetFrameStoreCount {
        /// Channel
        direction: Direction,
        /// Frame stores requested
        count: u16,
    },
    /// `clear_channel_errors`
    ClearErrors {
        /// Channel
        direction: Direction,
        /// Bits cleared
        mask: u32,
    },
    /// `interrupt_enable`
    InterruptEnable {
        /// Channel
        direction: Direction,
        /// Sources enabled
        mask: u32,
    },
    /// `mask_s2mm_error_interrupts`
    MaskS2mmErrors {
        /// Channel
        direction: Direction,
        /// Mask register value
        mask: u32,
    },
    /// `dma_start`
    DmaStart(Direction),
}

/// HAL step the mock is told to reject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HalFailure {
    /// `initialize`
    Initialize,
    /// `dma_config` on a channel
    DmaConfig(Direction),
    /// `set_buffer_addresses` on a channel
    BufferAddresses(Direction),
    /// `set_frame_store_count` on a channel
    FrameStoreCount(Direction),
    /// `dma_start` on a channel
    Start(Direction),
}

/// Error returned by an injected HAL failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockHalError(pub HalFailure);

/// Per-channel state of the mock engine.
#[derive(Debug, Default)]
struct MockChannel {
    reset_delay: u32,
    reset_samples: Cell<u32>,
    total_samples: Cell<u32>,
    config: Option<ChannelConfig>,
    addresses: FrameStoreAddresses,
    frame_store_count: Option<u16>,
    status: InterruptStatus,
    running: bool,
}

/// Mock VDMA register library
pub struct MockVdmaHal {
    configs: heapless::Vec<HwConfig, 4>,
    calls: heapless::Vec<HalCall, LOG_CAPACITY>,
    failure: Option<HalFailure>,
    read: MockChannel,
    write: MockChannel,
}

impl MockVdmaHal {
    /// Mock knowing the single engine `config`.
    pub fn new(config: HwConfig) -> Self {
        let mut configs = heapless::Vec::new();
        let _ = configs.push(config);
        Self {
            configs,
            calls: heapless::Vec::new(),
            failure: None,
            read: MockChannel::default(),
            write: MockChannel::default(),
        }
    }

    /// Mock with no engine at all: every lookup misses.
    pub fn empty() -> Self {
        Self {
            configs: heapless::Vec::new(),
            calls: heapless::Vec::new(),
            failure: None,
            read: MockChannel::default(),
            write: MockChannel::default(),
        }
    }

    /// Two-channel engine with four frame stores and 4-byte pixels.
    pub const fn default_config(device_id: u16) -> HwConfig {
        HwConfig {
            device_id,
            base_address: 0x4300_0000,
            has_mm2s: true,
            has_s2mm: true,
            max_frame_slots: 4,
            mm2s_stream_width: 4,
            s2mm_stream_width: 4,
        }
    }

    /// Reject `failure` from now on.
    pub fn fail_on(&mut self, failure: HalFailure) {
        self.failure = Some(failure);
    }

    /// Stop rejecting calls.
    pub fn clear_failure(&mut self) {
        self.failure = None;
    }

    /// Number of polls a reset of `direction` stays pending.
    ///
    /// [`STUCK_RESET`] keeps it pending forever.
    pub fn set_reset_delay(&mut self, direction: Direction, polls: u32) {
        self.channel_mut(direction).reset_delay = polls;
    }

    /// Latch an interrupt on `direction` for the next status read.
    pub fn raise_interrupt(&mut self, direction: Direction, pending: u32, errors: u32) {
        let status = &mut self.channel_mut(direction).status;
        status.pending |= pending;
        status.errors |= errors;
    }

    /// Every call recorded so far, in order.
    pub fn calls(&self) -> &[HalCall] {
        &self.calls
    }

    /// Forget recorded calls.
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// `reset_not_done` samples taken on `direction` since creation.
    pub fn reset_samples(&self, direction: Direction) -> u32 {
        self.channel(direction).total_samples.get()
    }

    /// Last configuration submitted on `direction`.
    pub fn submitted_config(&self, direction: Direction) -> Option<&ChannelConfig> {
        self.channel(direction).config.as_ref()
    }

    /// Frame-store addresses programmed on `direction`.
    pub fn buffer_addresses(&self, direction: Direction) -> &[u32] {
        &self.channel(direction).addresses
    }

    /// Frame-store count programmed on `direction`.
    pub fn frame_store_count(&self, direction: Direction) -> Option<u16> {
        self.channel(direction).frame_store_count
    }

    /// Whether `direction` was started and not reset since.
    pub fn is_running(&self, direction: Direction) -> bool {
        self.channel(direction).running
    }

    fn channel(&self, direction: Direction) -> &MockChannel {
        match direction {
            Direction::Read => &self.read,
            Direction::Write => &self.write,
        }
    }

    fn channel_mut(&mut self, direction: Direction) -> &mut MockChannel {
        match direction {
            Direction::Read => &mut self.read,
            Direction::Write => &mut self.write,
        }
    }

    fn record(&mut self, call: HalCall) {
        let _ = self.calls.push(call);
    }

    fn check(&self, step: HalFailure) -> Result<(), MockHalError> {
        if self.failure == Some(step) {
            Err(MockHalError(step))
        } else {
            Ok(())
        }
    }
}

impl VdmaHal for MockVdmaHal {
    type Error = MockHalError;

    fn lookup_config(&self, device_id: u16) -> Option<HwConfig> {
        self.configs.iter().find(|c| c.device_id == device_id).copied()
    }

    fn initialize(&mut self, config: &HwConfig) -> Result<(), Self::Error> {
        self.record(HalCall::Initialize {
            device_id: config.device_id,
        });
        self.check(HalFailure::Initialize)?;
        self.read.running = false;
        self.write.running = false;
        Ok(())
    }

    fn channel_reset(&mut self, direction: Direction) {
        self.record(HalCall::ChannelReset(direction));
        let channel = self.channel_mut(direction);
        channel.reset_samples.set(0);
        channel.running = false;
    }

    fn reset_not_done(&self, direction: Direction) -> bool {
        let channel = self.channel(direction);
        let seen = channel.reset_samples.get();
        channel.reset_samples.set(seen.saturating_add(1));
        channel
            .total_samples
            .set(channel.total_samples.get().saturating_add(1));
        channel.reset_delay == STUCK_RESET || seen < channel.reset_delay
    }

    fn dma_config(
        &mut self,
        direction: Direction,
        config: &ChannelConfig,
    ) -> Result<(), Self::Error> {
        self.record(HalCall::DmaConfig(direction));
        self.check(HalFailure::DmaConfig(direction))?;
        self.channel_mut(direction).config = Some(config.clone());
        Ok(())
    }

    fn set_buffer_addresses(
        &mut self,
        direction: Direction,
        addresses: &[u32],
    ) -> Result<(), Self::Error> {
        self.record(HalCall::SetBufferAddresses {
            direction,
            count: addresses.len(),
        });
        self.check(HalFailure::BufferAddresses(direction))?;
        let stored = &mut self.channel_mut(direction).addresses;
        stored.clear();
        for &addr in addresses {
            let _ = stored.push(addr);
        }
        Ok(())
    }

    fn set_frame_store_count(
        &mut self,
        direction: Direction,
        count: u16,
    ) -> Result<(), Self::Error> {
        self.record(HalCall::SetFrameStoreCount { direction, count });
        self.check(HalFailure::FrameStoreCount(direction))?;
        self.channel_mut(direction).frame_store_count = Some(count);
        Ok(())
    }

    fn clear_channel_errors(&mut self, direction: Direction, mask: u32) {
        self.record(HalCall::ClearErrors { direction, mask });
        self.channel_mut(direction).status.errors &= !mask;
    }

    fn interrupt_enable(&mut self, direction: Direction, mask: u32) {
        self.record(HalCall::InterruptEnable { direction, mask });
    }

    fn mask_s2mm_error_interrupts(&mut self, direction: Direction, mask: u32) {
        self.record(HalCall::MaskS2mmErrors { direction, mask });
    }

    fn dma_start(&mut self, direction: Direction) -> Result<(), Self::Error> {
        self.record(HalCall::DmaStart(direction));
        self.check(HalFailure::Start(direction))?;
        self.channel_mut(direction).running = true;
        Ok(())
    }

    fn take_interrupt_status(&mut self, direction: Direction) -> InterruptStatus {
        core::mem::take(&mut self.channel_mut(direction).status)
    }
}

// ── Interrupt controller ─────────────────────────────────────────────────────

/// One recorded controller call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrqEvent {
    /// `register_handler`
    Register(IrqId, IsrRoute),
    /// `enable_interrupt`
    Enable(IrqId),
    /// `enable_interrupts`
    EnableAll,
    /// `disable_interrupt`
    Disable(IrqId),
    /// `unregister_handler`
    Unregister(IrqId),
}

/// Controller step the mock is told to reject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrqFailure {
    /// `register_handler` on a line
    Register(IrqId),
    /// `enable_interrupt` on a line
    Enable(IrqId),
    /// `enable_interrupts`
    EnableAll,
    /// `disable_interrupt` on a line
    Disable(IrqId),
}

/// Error returned by the mock controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockIrqError {
    /// Injected with [`MockInterruptController::fail_on`]
    Injected(IrqFailure),
    /// Line already has a handler
    AlreadyRegistered(IrqId),
    /// Line has no handler
    NotRegistered(IrqId),
    /// Mock routing table is full
    TableFull,
}

/// Mock interrupt controller
#[derive(Debug, Default)]
pub struct MockInterruptController {
    events: heapless::Vec<IrqEvent, LOG_CAPACITY>,
    routes: heapless::Vec<(IrqId, IsrRoute), 16>,
    enabled: heapless::Vec<IrqId, 16>,
    globally_enabled: bool,
    failures: heapless::Vec<IrqFailure, 4>,
}

impl MockInterruptController {
    /// Controller with no lines registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject `failure` from now on, in addition to earlier failures.
    pub fn fail_on(&mut self, failure: IrqFailure) {
        if !self.failures.contains(&failure) {
            let _ = self.failures.push(failure);
        }
    }

    /// Stop rejecting calls.
    pub fn clear_failure(&mut self) {
        self.failures.clear();
    }

    /// Every call recorded so far, in order.
    pub fn events(&self) -> &[IrqEvent] {
        &self.events
    }

    /// Route registered on `id`.
    pub fn route(&self, id: IrqId) -> Option<IsrRoute> {
        self.routes
            .iter()
            .find(|(line, _)| *line == id)
            .map(|&(_, route)| route)
    }

    /// Number of lines with a registered handler.
    pub fn registered_count(&self) -> usize {
        self.routes.len()
    }

    /// Whether line `id` is enabled.
    pub fn is_enabled(&self, id: IrqId) -> bool {
        self.enabled.contains(&id)
    }

    /// Whether the aggregate signal is enabled.
    pub fn is_globally_enabled(&self) -> bool {
        self.globally_enabled
    }

    fn check(&self, step: IrqFailure) -> Result<(), MockIrqError> {
        if self.failures.contains(&step) {
            Err(MockIrqError::Injected(step))
        } else {
            Ok(())
        }
    }

    fn record(&mut self, event: IrqEvent) {
        let _ = self.events.push(event);
    }
}

impl InterruptController for MockInterruptController {
    type Error = MockIrqError;

    fn register_handler(&mut self, id: IrqId, route: IsrRoute) -> Result<(), Self::Error> {
        self.record(IrqEvent::Register(id, route));
        self.check(IrqFailure::Register(id))?;
        if self.route(id).is_some() {
            return Err(MockIrqError::AlreadyRegistered(id));
        }
        self.routes
            .push((id, route))
            .map_err(|_| MockIrqError::TableFull)
    }

    fn enable_interrupt(&mut self, id: IrqId) -> Result<(), Self::Error> {
        self.record(IrqEvent::Enable(id));
        self.check(IrqFailure::Enable(id))?;
        if self.route(id).is_none() {
            return Err(MockIrqError::NotRegistered(id));
        }
        if !self.enabled.contains(&id) {
            self.enabled.push(id).map_err(|_| MockIrqError::TableFull)?;
        }
        Ok(())
    }

    fn enable_interrupts(&mut self) -> Result<(), Self::Error> {
        self.record(IrqEvent::EnableAll);
        self.check(IrqFailure::EnableAll)?;
        self.globally_enabled = true;
        Ok(())
    }

    fn disable_interrupt(&mut self, id: IrqId) -> Result<(), Self::Error> {
        self.record(IrqEvent::Disable(id));
        self.check(IrqFailure::Disable(id))?;
        self.enabled.retain(|&line| line != id);
        Ok(())
    }

    fn unregister_handler(&mut self, id: IrqId) -> Result<(), Self::Error> {
        self.record(IrqEvent::Unregister(id));
        if self.route(id).is_none() {
            return Err(MockIrqError::NotRegistered(id));
        }
        self.routes.retain(|(line, _)| *line != id);
        Ok(())
    }
}
