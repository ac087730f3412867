//! VDMA driver instance
//!
//! One [`Vdma`] owns one engine: the HAL handle, the interrupt lines it
//! registered, the callback bindings and the last configuration of each
//! channel.
//!
//! ## Construction order
//!
//! ```text
//! lookup_config → initialize (hardware reset)
//!   for each present direction:
//!     bind callbacks → register_handler → enable_interrupt
//! enable_interrupts (aggregate, last)
//! ```
//!
//! No line is enabled before its handlers are bound, and the aggregate
//! signal is enabled only once every line is in place. Registration mutates
//! the shared interrupt controller, so constructing two engines on one
//! controller must be serialized by the caller.
//!
//! ## Ownership of interrupt lines
//!
//! The driver records every line it registered. [`Vdma::teardown`] disables
//! and unregisters exactly those lines, so an engine can be constructed again
//! on the same controller. A construction that fails half-way releases the
//! lines it had already registered.

use heapless::Vec;

use crate::callback::{CallbackKind, Callbacks, VdmaHandlers};
use crate::channel::ChannelConfig;
use crate::config::RESET_POLL;
use crate::error::{ConfigError, ConfigStep, InitError, ResetTimeout, StartError};
use crate::hal::{
    Direction, HwConfig, VdmaHal, IXR_ERROR_MASK, IXR_FRMCNT_MASK, S2MM_IRQ_ERR_ALL_MASK,
    SR_ERR_ALL_MASK,
};
use crate::irq::{InterruptController, IrqId, IsrRoute};
use crate::reset::ResetPoller;

/// Interrupt sources enabled on a configured channel.
const CHANNEL_IRQ_MASK: u32 = IXR_ERROR_MASK | IXR_FRMCNT_MASK;

/// Interrupt lines registered by one engine.
type IrqLines = Vec<(IrqId, Direction), 2>;

/// Driver for one VDMA engine.
pub struct Vdma<'h, H: VdmaHal> {
    hal: H,
    hw: HwConfig,
    initialized: bool,
    frame_buffer_base: u32,
    read_config: Option<ChannelConfig>,
    write_config: Option<ChannelConfig>,
    callbacks: Callbacks<'h>,
    irq_lines: IrqLines,
}

impl<'h, H: VdmaHal> Vdma<'h, H> {
    /// Bring up engine `device_id` with no-op event handlers.
    ///
    /// `frame_buffer_base` is the origin of the frame-buffer ring of both
    /// directions. `read_irq` / `write_irq` are the controller lines of the
    /// two channels; a line whose channel is absent in hardware is left
    /// untouched.
    pub fn new<C: InterruptController>(
        hal: H,
        device_id: u16,
        frame_buffer_base: u32,
        irq: &mut C,
        read_irq: IrqId,
        write_irq: IrqId,
    ) -> Result<Self, InitError> {
        Self::with_handlers(
            hal,
            device_id,
            frame_buffer_base,
            irq,
            read_irq,
            write_irq,
            VdmaHandlers::default(),
        )
    }

    /// Bring up engine `device_id`, binding `handlers` to its channel events.
    pub fn with_handlers<C: InterruptController>(
        mut hal: H,
        device_id: u16,
        frame_buffer_base: u32,
        irq: &mut C,
        read_irq: IrqId,
        write_irq: IrqId,
        handlers: VdmaHandlers<'h>,
    ) -> Result<Self, InitError> {
        let Some(hw) = hal.lookup_config(device_id) else {
            error!("VDMA device {}: no configuration", device_id);
            return Err(InitError::ConfigNotFound { device_id });
        };

        if hal.initialize(&hw).is_err() {
            error!("VDMA device {}: initialization failed", device_id);
            return Err(InitError::InitFailed { device_id });
        }

        let mut vdma = Self {
            hal,
            hw,
            initialized: false,
            frame_buffer_base,
            read_config: None,
            write_config: None,
            callbacks: Callbacks::new(),
            irq_lines: IrqLines::new(),
        };

        for direction in Direction::ALL {
            if !hw.has_direction(direction) {
                debug!("VDMA device {}: no {} channel", device_id, direction);
                continue;
            }
            let id = match direction {
                Direction::Read => read_irq,
                Direction::Write => write_irq,
            };
            if vdma.attach_line(irq, direction, id, &handlers).is_err() {
                return Err(vdma.abandon(irq, Some(direction)));
            }
        }

        if irq.enable_interrupts().is_err() {
            error!("VDMA device {}: global interrupt enable failed", device_id);
            return Err(vdma.abandon(irq, None));
        }

        vdma.initialized = true;
        info!(
            "VDMA device {} up: {} frame stores, base {}",
            device_id, hw.max_frame_slots, frame_buffer_base
        );
        Ok(vdma)
    }

    /// Bind the handlers of `direction`, then register and enable its line.
    fn attach_line<C: InterruptController>(
        &mut self,
        irq: &mut C,
        direction: Direction,
        id: IrqId,
        handlers: &VdmaHandlers<'h>,
    ) -> Result<(), ()> {
        self.callbacks.bind(direction, handlers);

        let route = IsrRoute {
            device_id: self.hw.device_id,
            direction,
        };

        if irq.register_handler(id, route).is_err() {
            error!("VDMA {} line {}: register failed", direction, id);
            return Err(());
        }
        // Recorded before enabling so a failed enable is still unregistered.
        self.irq_lines.push((id, direction)).map_err(|_| ())?;
        if irq.enable_interrupt(id).is_err() {
            error!("VDMA {} line {}: enable failed", direction, id);
            return Err(());
        }
        trace!("VDMA {} channel on line {}", direction, id);
        Ok(())
    }

    /// Roll back a failed construction and build its error.
    fn abandon<C: InterruptController>(
        &mut self,
        irq: &mut C,
        direction: Option<Direction>,
    ) -> InitError {
        if self.release_lines(irq).is_err() {
            warn!(
                "VDMA device {}: rollback left {} line(s) registered",
                self.hw.device_id,
                self.irq_lines.len()
            );
        }
        InitError::InterruptSetup {
            direction,
            stuck_lines: u8::try_from(self.irq_lines.len()).unwrap_or(u8::MAX),
        }
    }

    /// Disable and unregister every recorded line, most recent first.
    ///
    /// Lines that fail to release stay recorded; the first error is returned.
    fn release_lines<C: InterruptController>(&mut self, irq: &mut C) -> Result<(), C::Error> {
        let mut first_err = None;
        let mut kept = IrqLines::new();
        while let Some((id, direction)) = self.irq_lines.pop() {
            let released = irq
                .disable_interrupt(id)
                .and_then(|()| irq.unregister_handler(id));
            if let Err(e) = released {
                warn!("VDMA {} line {}: release failed", direction, id);
                let _ = kept.push((id, direction));
                first_err.get_or_insert(e);
            }
        }
        while let Some(line) = kept.pop() {
            let _ = self.irq_lines.push(line);
        }
        first_err.map_or(Ok(()), Err)
    }

    /// Disable and unregister the interrupt lines this engine registered.
    ///
    /// Safe to call again after a partial failure; released lines are not
    /// touched twice. Channels keep running: reset them first to stop DMA.
    pub fn teardown<C: InterruptController>(&mut self, irq: &mut C) -> Result<(), C::Error> {
        debug!("VDMA device {}: teardown", self.hw.device_id);
        self.release_lines(irq)
    }

    /// Consume the driver and return the HAL handle.
    pub fn into_hal(self) -> H {
        self.hal
    }

    // ── Reset ────────────────────────────────────────────────────────────────

    /// Reset the read channel.
    pub fn reset_read(&mut self) -> Result<(), ResetTimeout> {
        self.reset(Direction::Read)
    }

    /// Reset the write channel.
    pub fn reset_write(&mut self) -> Result<(), ResetTimeout> {
        self.reset(Direction::Write)
    }

    /// Reset one channel and wait up to [`RESET_POLL`] polls for completion.
    ///
    /// Required before reconfiguring a channel that has been used. Resetting
    /// an idle channel is harmless.
    pub fn reset(&mut self, direction: Direction) -> Result<(), ResetTimeout> {
        self.hal.channel_reset(direction);
        let hal = &self.hal;
        let mut poller = ResetPoller::new(direction, RESET_POLL);
        match poller.run(|| hal.reset_not_done(direction)) {
            Ok(polls) => {
                trace!("VDMA {} reset done after {} polls", direction, polls);
                Ok(())
            }
            Err(e) => {
                error!("VDMA {} reset timed out after {} polls", direction, e.polls);
                Err(e)
            }
        }
    }

    // ── Configuration ────────────────────────────────────────────────────────

    /// Configure the read channel as a genlock slave of `master_select`.
    pub fn configure_read(
        &mut self,
        h_res: u16,
        v_res: u16,
        master_select: u8,
    ) -> Result<(), ConfigError> {
        let direction = Direction::Read;
        self.read_config = None;
        self.require_channel(direction)?;

        let mut cfg = ChannelConfig::read(
            h_res,
            v_res,
            self.hw.stream_width(direction),
            master_select,
        );
        self.submit(&mut cfg)?;
        self.hal.clear_channel_errors(direction, SR_ERR_ALL_MASK);
        self.hal.interrupt_enable(direction, CHANNEL_IRQ_MASK);

        debug!(
            "VDMA read configured: {}x{} hsize {} master {}",
            h_res, v_res, cfg.horizontal_size_input, master_select
        );
        self.read_config = Some(cfg);
        Ok(())
    }

    /// Configure the write channel.
    ///
    /// The channel writes an `h_res × v_res` window into a
    /// `full_h_res × full_v_res` framebuffer. With `is_master` set it becomes
    /// the promoted genlock master; otherwise it slaves to `master_select`.
    ///
    /// A `full_h_res` or `full_v_res` that is zero or smaller than the window
    /// is raised to the window size. Stride and frame-store spacing therefore
    /// never undercut one window frame, and a framebuffer declared shorter
    /// than the window is laid out as `stride × v_res` per slot.
    pub fn configure_write(
        &mut self,
        h_res: u16,
        v_res: u16,
        full_h_res: u16,
        full_v_res: u16,
        master_select: u8,
        is_master: bool,
    ) -> Result<(), ConfigError> {
        let direction = Direction::Write;
        self.write_config = None;
        self.require_channel(direction)?;

        // Stale errors would block the configuration from taking effect.
        self.hal.clear_channel_errors(direction, SR_ERR_ALL_MASK);

        let mut cfg = ChannelConfig::write(
            h_res,
            v_res,
            full_h_res,
            full_v_res,
            self.hw.stream_width(direction),
            master_select,
            is_master,
        );
        self.submit(&mut cfg)?;
        self.hal.clear_channel_errors(direction, SR_ERR_ALL_MASK);
        self.hal
            .mask_s2mm_error_interrupts(direction, !S2MM_IRQ_ERR_ALL_MASK);
        self.hal.interrupt_enable(direction, CHANNEL_IRQ_MASK);

        debug!(
            "VDMA write configured: {}x{} in {}x{} stride {} master {} promoted {}",
            h_res, v_res, full_h_res, full_v_res, cfg.stride, master_select, is_master
        );
        self.write_config = Some(cfg);
        Ok(())
    }

    /// Submit `cfg`, then program its frame stores.
    fn submit(&mut self, cfg: &mut ChannelConfig) -> Result<(), ConfigError> {
        let direction = cfg.direction;
        let fail = |step| {
            error!("VDMA {} configure failed: {}", direction, step);
            ConfigError { direction, step }
        };

        self.hal
            .dma_config(direction, cfg)
            .map_err(|_| fail(ConfigStep::DmaConfig))?;

        let slots = self.hw.max_frame_slots;
        cfg.assign_frame_stores(self.frame_buffer_base, slots);
        self.hal
            .set_buffer_addresses(direction, &cfg.frame_store_addresses)
            .map_err(|_| fail(ConfigStep::BufferAddresses))?;

        self.hal
            .set_frame_store_count(direction, slots)
            .map_err(|_| fail(ConfigStep::FrameStoreCount))?;
        Ok(())
    }

    fn require_channel(&self, direction: Direction) -> Result<(), ConfigError> {
        if self.hw.has_direction(direction) {
            Ok(())
        } else {
            Err(ConfigError {
                direction,
                step: ConfigStep::ChannelAbsent,
            })
        }
    }

    // ── Start ────────────────────────────────────────────────────────────────

    /// Start the read channel.
    pub fn enable_read(&mut self) -> Result<(), StartError> {
        self.start(Direction::Read)
    }

    /// Start the write channel.
    pub fn enable_write(&mut self) -> Result<(), StartError> {
        self.start(Direction::Write)
    }

    fn start(&mut self, direction: Direction) -> Result<(), StartError> {
        if !self.hw.has_direction(direction) || self.hal.dma_start(direction).is_err() {
            error!("VDMA {} channel failed to start", direction);
            return Err(StartError { direction });
        }
        info!("VDMA {} channel started", direction);
        Ok(())
    }

    // ── Interrupt entry ──────────────────────────────────────────────────────

    /// Interrupt service routine of one channel.
    ///
    /// Acknowledges the pending status in hardware and dispatches it to the
    /// bound handler. Returns the kind of event dispatched, if any. Does not
    /// allocate or block.
    pub fn service_interrupt(&mut self, direction: Direction) -> Option<CallbackKind> {
        let status = self.hal.take_interrupt_status(direction);
        self.callbacks.dispatch(direction, status)
    }

    // ── Accessors ────────────────────────────────────────────────────────────

    /// Hardware bring-up completed.
    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Hardware descriptor of the engine.
    pub const fn hw_config(&self) -> &HwConfig {
        &self.hw
    }

    /// Origin of the frame-buffer ring.
    pub const fn frame_buffer_base(&self) -> u32 {
        self.frame_buffer_base
    }

    /// Frame stores built into the engine.
    pub const fn max_frame_slots(&self) -> u16 {
        self.hw.max_frame_slots
    }

    /// Last successful read channel configuration.
    pub const fn read_config(&self) -> Option<&ChannelConfig> {
        self.read_config.as_ref()
    }

    /// Last successful write channel configuration.
    pub const fn write_config(&self) -> Option<&ChannelConfig> {
        self.write_config.as_ref()
    }

    /// Callback bindings of the engine.
    pub const fn callbacks(&self) -> &Callbacks<'h> {
        &self.callbacks
    }

    /// Interrupt lines currently owned by the engine.
    pub fn irq_lines(&self) -> &[(IrqId, Direction)] {
        &self.irq_lines
    }

    /// Shared access to the HAL handle.
    pub const fn hal(&self) -> &H {
        &self.hal
    }

    /// Exclusive access to the HAL handle.
    pub fn hal_mut(&mut self) -> &mut H {
        &mut self.hal
    }
}

impl<H: VdmaHal> core::fmt::Debug for Vdma<'_, H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Vdma")
            .field("hw", &self.hw)
            .field("initialized", &self.initialized)
            .field("frame_buffer_base", &self.frame_buffer_base)
            .field("read_config", &self.read_config)
            .field("write_config", &self.write_config)
            .field("irq_lines", &self.irq_lines)
            .finish_non_exhaustive()
    }
}
