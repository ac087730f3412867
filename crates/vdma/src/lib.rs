//! Driver for AXI video frame-transfer DMA (VDMA) engines
//!
//! Moves video frames between a small ring of frame buffers and an AXI video
//! stream. Several engines share the same ring and stay phase-aligned through
//! the hardware genlock mechanism: exactly one write channel is promoted to
//! master and free-runs, every other channel slaves to it with a fixed frame
//! delay.
//!
//! # Architecture Layers
//!
//! ```text
//! Application (camera / display bring-up)
//!         ↓
//! Vdma driver instance (this crate: driver, channel, genlock, ring, reset)
//!         ↓
//! Hardware boundary traits (VdmaHal, InterruptController)
//!         ↓
//! Vendor register library + interrupt controller
//! ```
//!
//! # Bring-up
//!
//! 1. [`Vdma::new`] looks up and initializes the engine, binds callbacks and
//!    registers the interrupt lines.
//! 2. [`Vdma::reset_read`] / [`Vdma::reset_write`] before (re)configuring.
//! 3. [`Vdma::configure_read`] / [`Vdma::configure_write`] program geometry
//!    and genlock role.
//! 4. [`Vdma::enable_read`] / [`Vdma::enable_write`] start the transfer.
//! 5. The platform ISR calls [`Vdma::service_interrupt`].
//!
//! # Features
//!
//! - `std`: `std::error::Error` impls and the `mocks` module outside tests
//! - `defmt`: defmt logging and `defmt::Format` derives
//! - `tracing`: tracing logging for host builds
//!
//! # Example
//!
//! ```no_run
//! use vdma::{InterruptController, IrqId, Vdma, VdmaError, VdmaHal};
//!
//! fn bring_up<H: VdmaHal, C: InterruptController>(
//!     hal: H,
//!     intc: &mut C,
//! ) -> Result<Vdma<'static, H>, VdmaError> {
//!     let mut vdma = Vdma::new(hal, 0, 0x1000_0000, intc, IrqId(61), IrqId(62))?;
//!     vdma.reset_write()?;
//!     vdma.configure_write(1280, 720, 1280, 720, 0, true)?;
//!     vdma.enable_write()?;
//!     Ok(vdma)
//! }
//! ```

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_code)]
#![warn(clippy::print_stdout)] // prefer tracing/defmt over println! in lib code
// Pedantic lints suppressed for this hardware driver crate:
#![allow(clippy::doc_markdown)] // register names and hex addresses in doc comments
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)] // plain accessors, callers decide

// Logging macros must be declared before the modules that use them.
#[macro_use]
mod fmt;

pub mod callback;
pub mod channel;
pub mod config;
pub mod driver;
pub mod error;
pub mod genlock;
pub mod hal;
pub mod irq;
pub mod mocks;
pub mod reset;
pub mod ring;

pub use callback::{
    trampoline, CallbackBinding, CallbackKind, Callbacks, EventHandler, VdmaHandlers, NOOP_HANDLER,
};
pub use channel::ChannelConfig;
pub use driver::Vdma;
pub use error::{ConfigError, ConfigStep, InitError, ResetTimeout, StartError, VdmaError};
pub use genlock::{validate_topology, GenlockRole, TopologyError};
pub use hal::{Direction, HwConfig, InterruptStatus, VdmaHal};
pub use irq::{InterruptController, IrqId, IsrRoute};
pub use reset::{ResetPoller, ResetState};
pub use ring::{FrameStoreAddresses, RingLayout};
