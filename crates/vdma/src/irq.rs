//! Interrupt controller boundary
//!
//! The driver is generic over [`InterruptController`], so any concrete
//! controller (GIC, a PL interrupt concentrator, a test double) can be
//! plugged in with static dispatch.
//!
//! Registration does not hand the controller a function pointer. It hands
//! over an [`IsrRoute`] naming the engine and channel; the platform's
//! interrupt vector looks the route up and calls
//! [`Vdma::service_interrupt`](crate::Vdma::service_interrupt) on the
//! matching driver instance.

use crate::hal::Direction;

/// Interrupt line number on the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct IrqId(pub u16);

impl core::fmt::Display for IrqId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "IRQ{}", self.0)
    }
}

/// Where an interrupt line is routed: which engine, which channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IsrRoute {
    /// Device identifier of the VDMA engine
    pub device_id: u16,
    /// Channel whose handler services the line
    pub direction: Direction,
}

/// Interrupt controller capability used during bring-up and teardown.
pub trait InterruptController {
    /// Error type
    type Error: core::fmt::Debug;

    /// Connect `id` to the handler described by `route`.
    fn register_handler(&mut self, id: IrqId, route: IsrRoute) -> Result<(), Self::Error>;

    /// Enable a single interrupt line.
    fn enable_interrupt(&mut self, id: IrqId) -> Result<(), Self::Error>;

    /// Enable the aggregate interrupt signal.
    fn enable_interrupts(&mut self) -> Result<(), Self::Error>;

    /// Disable a single interrupt line.
    fn disable_interrupt(&mut self, id: IrqId) -> Result<(), Self::Error>;

    /// Disconnect the handler of `id`.
    fn unregister_handler(&mut self, id: IrqId) -> Result<(), Self::Error>;
}

impl<T: InterruptController + ?Sized> InterruptController for &mut T {
    type Error = T::Error;

    fn register_handler(&mut self, id: IrqId, route: IsrRoute) -> Result<(), Self::Error> {
        (**self).register_handler(id, route)
    }

    fn enable_interrupt(&mut self, id: IrqId) -> Result<(), Self::Error> {
        (**self).enable_interrupt(id)
    }

    fn enable_interrupts(&mut self) -> Result<(), Self::Error> {
        (**self).enable_interrupts()
    }

    fn disable_interrupt(&mut self, id: IrqId) -> Result<(), Self::Error> {
        (**self).disable_interrupt(id)
    }

    fn unregister_handler(&mut self, id: IrqId) -> Result<(), Self::Error> {
        (**self).unregister_handler(id)
    }
}
