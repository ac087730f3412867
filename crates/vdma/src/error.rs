//! Driver error taxonomy
//!
//! Every failure surfaces synchronously to the caller as soon as the failing
//! hardware call returns. Nothing is retried inside the driver.
//!
//! | Error          | Raised by                 | Channel state afterwards        |
//! |----------------|---------------------------|---------------------------------|
//! | [`InitError`]    | [`Vdma::new`]             | no driver instance              |
//! | [`ResetTimeout`] | `reset_read/reset_write`  | reset still pending             |
//! | [`ConfigError`]  | `configure_read/_write`   | undefined, reset before retry   |
//! | [`StartError`]   | `enable_read/_write`      | configured, not running         |
//!
//! [`Vdma::new`]: crate::Vdma::new

use crate::hal::Direction;

// ── InitError ────────────────────────────────────────────────────────────────

/// Construction failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InitError {
    /// No hardware descriptor for the device identifier
    ConfigNotFound {
        /// Device identifier that was looked up
        device_id: u16,
    },
    /// Driver initialization (and the hardware reset it performs) failed
    InitFailed {
        /// Device identifier being initialized
        device_id: u16,
    },
    /// The interrupt controller rejected a registration or enable
    ///
    /// Lines registered before the failure are released again. A line the
    /// controller refused to release stays registered and is counted in
    /// `stuck_lines`.
    InterruptSetup {
        /// Channel whose line was being set up, `None` for the global enable
        direction: Option<Direction>,
        /// Lines still registered after the rollback
        stuck_lines: u8,
    },
}

impl core::fmt::Display for InitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ConfigNotFound { device_id } => {
                write!(f, "VDMA device {device_id}: configuration not found")
            }
            Self::InitFailed { device_id } => {
                write!(f, "VDMA device {device_id}: initialization failed")
            }
            Self::InterruptSetup {
                direction,
                stuck_lines,
            } => {
                match direction {
                    Some(direction) => write!(f, "VDMA {direction} interrupt setup failed")?,
                    None => write!(f, "VDMA global interrupt enable failed")?,
                }
                if *stuck_lines > 0 {
                    write!(f, ", {stuck_lines} line(s) left registered")?;
                }
                Ok(())
            }
        }
    }
}

// ── ResetTimeout ─────────────────────────────────────────────────────────────

/// Channel reset did not complete within the poll budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ResetTimeout {
    /// Channel that was being reset
    pub direction: Direction,
    /// Polls spent before giving up
    pub polls: u32,
}

impl core::fmt::Display for ResetTimeout {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "VDMA {} channel reset not done after {} polls",
            self.direction, self.polls
        )
    }
}

// ── ConfigError ──────────────────────────────────────────────────────────────

/// Step of channel configuration that the hardware rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigStep {
    /// The engine instance has no channel for this direction
    ChannelAbsent,
    /// Submitting the channel configuration
    DmaConfig,
    /// Programming frame-store start addresses
    BufferAddresses,
    /// Setting the frame-store count
    FrameStoreCount,
}

impl core::fmt::Display for ConfigStep {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ChannelAbsent => write!(f, "channel not present"),
            Self::DmaConfig => write!(f, "channel configuration rejected"),
            Self::BufferAddresses => write!(f, "frame-store addresses rejected"),
            Self::FrameStoreCount => write!(f, "frame-store count rejected"),
        }
    }
}

/// Hardware rejection during channel setup.
///
/// The channel is left partially programmed; reset it before retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConfigError {
    /// Channel being configured
    pub direction: Direction,
    /// Step that failed
    pub step: ConfigStep,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "VDMA {} configure: {}", self.direction, self.step)
    }
}

// ── StartError ───────────────────────────────────────────────────────────────

/// Hardware rejected the start command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StartError {
    /// Channel that failed to start
    pub direction: Direction,
}

impl core::fmt::Display for StartError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "VDMA {} channel failed to start", self.direction)
    }
}

// ── VdmaError ────────────────────────────────────────────────────────────────

/// Any driver error, for bring-up sequences that abort on the first failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VdmaError {
    /// See [`InitError`]
    Init(InitError),
    /// See [`ResetTimeout`]
    Reset(ResetTimeout),
    /// See [`ConfigError`]
    Config(ConfigError),
    /// See [`StartError`]
    Start(StartError),
}

impl core::fmt::Display for VdmaError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Init(e) => core::fmt::Display::fmt(e, f),
            Self::Reset(e) => core::fmt::Display::fmt(e, f),
            Self::Config(e) => core::fmt::Display::fmt(e, f),
            Self::Start(e) => core::fmt::Display::fmt(e, f),
        }
    }
}

impl From<InitError> for VdmaError {
    fn from(e: InitError) -> Self {
        Self::Init(e)
    }
}

impl From<ResetTimeout> for VdmaError {
    fn from(e: ResetTimeout) -> Self {
        Self::Reset(e)
    }
}

impl From<ConfigError> for VdmaError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<StartError> for VdmaError {
    fn from(e: StartError) -> Self {
        Self::Start(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for InitError {}

#[cfg(feature = "std")]
impl std::error::Error for ResetTimeout {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "std")]
impl std::error::Error for StartError {}

#[cfg(feature = "std")]
impl std::error::Error for VdmaError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_direction_and_step() {
        let err = ConfigError {
            direction: Direction::Write,
            step: ConfigStep::BufferAddresses,
        };
        assert_eq!(
            err.to_string(),
            "VDMA write configure: frame-store addresses rejected"
        );
    }

    #[test]
    fn reset_timeout_reports_poll_count() {
        let err = VdmaError::from(ResetTimeout {
            direction: Direction::Read,
            polls: 1000,
        });
        assert_eq!(
            err.to_string(),
            "VDMA read channel reset not done after 1000 polls"
        );
    }

    #[test]
    fn global_interrupt_failure_has_no_direction() {
        let err = InitError::InterruptSetup {
            direction: None,
            stuck_lines: 0,
        };
        assert_eq!(err.to_string(), "VDMA global interrupt enable failed");
    }

    #[test]
    fn incomplete_rollback_is_reported() {
        let err = InitError::InterruptSetup {
            direction: Some(Direction::Write),
            stuck_lines: 1,
        };
        assert_eq!(
            err.to_string(),
            "VDMA write interrupt setup failed, 1 line(s) left registered"
        );
    }
}
