//! Interrupt dispatch shim
//!
//! The vendor interrupt path calls back through one fixed signature,
//! `(context, event_mask)`. Here the context is a [`CallbackBinding`] and the
//! entry point is [`trampoline`], so typed handlers are reached without raw
//! pointers or casts.
//!
//! Four bindings exist per engine: completion and error, for each direction
//! present in hardware. They are bound once at construction and live as long
//! as the driver.
//!
//! Handlers run in interrupt context. They must not block and should only
//! touch interrupt-safe state (atomics, critical-section cells). A handler
//! has no way to report failure.

use crate::hal::{Direction, InterruptStatus, IXR_COMPLETION_MASK};

/// Typed receiver of channel events.
pub trait EventHandler: Sync {
    /// Called from interrupt context with the event bits.
    fn on_event(&self, mask: u32);
}

impl<F> EventHandler for F
where
    F: Fn(u32) + Sync,
{
    fn on_event(&self, mask: u32) {
        self(mask);
    }
}

fn ignore(_mask: u32) {}

/// Handler that ignores every event. Default for all bindings.
pub static NOOP_HANDLER: &dyn EventHandler = &ignore;

/// Kind of event a binding receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CallbackKind {
    /// Frame-count / delay-count completion
    Completion,
    /// Channel error
    Error,
}

/// Association of one direction and kind with its handler.
#[derive(Clone, Copy)]
pub struct CallbackBinding<'h> {
    /// Channel the binding serves
    pub direction: Direction,
    /// Event kind the binding serves
    pub kind: CallbackKind,
    handler: &'h dyn EventHandler,
}

impl<'h> CallbackBinding<'h> {
    /// Bind `handler` to `direction` / `kind`.
    pub const fn new(
        direction: Direction,
        kind: CallbackKind,
        handler: &'h dyn EventHandler,
    ) -> Self {
        Self {
            direction,
            kind,
            handler,
        }
    }
}

impl core::fmt::Debug for CallbackBinding<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CallbackBinding")
            .field("direction", &self.direction)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Fixed-signature entry point every binding is called through.
pub fn trampoline(binding: &CallbackBinding<'_>, mask: u32) {
    binding.handler.on_event(mask);
}

/// Handlers supplied by the caller at construction.
#[derive(Clone, Copy)]
pub struct VdmaHandlers<'h> {
    /// Read channel completion
    pub read_complete: &'h dyn EventHandler,
    /// Read channel error
    pub read_error: &'h dyn EventHandler,
    /// Write channel completion
    pub write_complete: &'h dyn EventHandler,
    /// Write channel error
    pub write_error: &'h dyn EventHandler,
}

impl Default for VdmaHandlers<'_> {
    fn default() -> Self {
        Self {
            read_complete: NOOP_HANDLER,
            read_error: NOOP_HANDLER,
            write_complete: NOOP_HANDLER,
            write_error: NOOP_HANDLER,
        }
    }
}

/// Binding table of one engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct Callbacks<'h> {
    read: Option<[CallbackBinding<'h>; 2]>,
    write: Option<[CallbackBinding<'h>; 2]>,
}

impl<'h> Callbacks<'h> {
    /// Empty table: no direction bound.
    pub const fn new() -> Self {
        Self {
            read: None,
            write: None,
        }
    }

    /// Bind the completion and error handlers of `direction`.
    ///
    /// Called once per present direction during construction.
    pub fn bind(&mut self, direction: Direction, handlers: &VdmaHandlers<'h>) {
        let (complete, error) = match direction {
            Direction::Read => (handlers.read_complete, handlers.read_error),
            Direction::Write => (handlers.write_complete, handlers.write_error),
        };
        let pair = [
            CallbackBinding::new(direction, CallbackKind::Completion, complete),
            CallbackBinding::new(direction, CallbackKind::Error, error),
        ];
        match direction {
            Direction::Read => self.read = Some(pair),
            Direction::Write => self.write = Some(pair),
        }
    }

    /// Whether `direction` has bound handlers.
    pub const fn is_bound(&self, direction: Direction) -> bool {
        match direction {
            Direction::Read => self.read.is_some(),
            Direction::Write => self.write.is_some(),
        }
    }

    /// Binding of `direction` / `kind`, if bound.
    pub fn binding(
        &self,
        direction: Direction,
        kind: CallbackKind,
    ) -> Option<&CallbackBinding<'h>> {
        let [complete, error] = match direction {
            Direction::Read => self.read.as_ref()?,
            Direction::Write => self.write.as_ref()?,
        };
        Some(match kind {
            CallbackKind::Completion => complete,
            CallbackKind::Error => error,
        })
    }

    /// Route an interrupt status snapshot to the matching handler.
    ///
    /// A pending error interrupt wins: the error handler gets the latched
    /// status error bits, possibly zero, and completion is not reported for
    /// that interrupt. Otherwise pending completion bits go to the completion
    /// handler. Latched error bits without a pending interrupt dispatch
    /// nothing. Returns the kind that was dispatched.
    pub fn dispatch(
        &self,
        direction: Direction,
        status: InterruptStatus,
    ) -> Option<CallbackKind> {
        let kind = if status.is_error() {
            CallbackKind::Error
        } else if status.is_completion() {
            CallbackKind::Completion
        } else {
            return None;
        };
        let binding = self.binding(direction, kind)?;
        let mask = match kind {
            CallbackKind::Error => status.errors,
            CallbackKind::Completion => status.pending & IXR_COMPLETION_MASK,
        };
        trampoline(binding, mask);
        Some(kind)
    }
}
