//! Genlock role policy
//!
//! Every write channel is built as a genlock slave that can follow any
//! channel. At runtime exactly one of them is promoted to master by turning
//! its sync off: it then cycles blindly through all frame stores and becomes
//! the shared time base. Everything else slaves to it through `point_num`.
//!
//! | Role                   | Sync | Frame delay | Circular |
//! |------------------------|------|-------------|----------|
//! | Read slave             | on   | 2           | yes      |
//! | Write slave            | on   | 0           | yes      |
//! | Promoted write master  | off  | 0 (ignored) | yes      |
//!
//! Both input and output may trail their reference by one frame, so the
//! scheme needs at least [`MIN_GENLOCK_FRAME_SLOTS`] frame stores.

use crate::channel::ChannelConfig;
use crate::config::{
    MASTER_FRAME_DELAY, MIN_GENLOCK_FRAME_SLOTS, READ_FRAME_DELAY, WRITE_SLAVE_FRAME_DELAY,
};
use crate::hal::Direction;

/// Genlock role of one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GenlockRole {
    /// Free-running write channel, the time base of the topology
    PromotedMaster {
        /// Genlock pointer index this channel publishes
        point_num: u8,
    },
    /// Channel locked to the promoted master
    Slave {
        /// Genlock pointer index of the promoted master
        point_num: u8,
    },
}

impl GenlockRole {
    /// Role of a read channel. Read channels always slave.
    pub const fn read(master_select: u8) -> Self {
        Self::Slave {
            point_num: master_select,
        }
    }

    /// Role of a write channel.
    pub const fn write(master_select: u8, is_master: bool) -> Self {
        if is_master {
            Self::PromotedMaster {
                point_num: master_select,
            }
        } else {
            Self::Slave {
                point_num: master_select,
            }
        }
    }

    /// Whether this is the promoted master.
    pub const fn is_master(self) -> bool {
        matches!(self, Self::PromotedMaster { .. })
    }

    /// Genlock sync is on for every role but the promoted master.
    pub const fn enable_sync(self) -> bool {
        !self.is_master()
    }

    /// Genlock pointer index programmed into the channel.
    pub const fn point_num(self) -> u8 {
        match self {
            Self::PromotedMaster { point_num } | Self::Slave { point_num } => point_num,
        }
    }

    /// Frames the channel may lag behind its genlock reference.
    pub const fn frame_delay(self, direction: Direction) -> u8 {
        match (self, direction) {
            (Self::PromotedMaster { .. }, _) => MASTER_FRAME_DELAY,
            (Self::Slave { .. }, Direction::Read) => READ_FRAME_DELAY,
            (Self::Slave { .. }, Direction::Write) => WRITE_SLAVE_FRAME_DELAY,
        }
    }

    /// The master must cycle through all stores; slaves never park either.
    pub const fn enable_circular_buffer(self) -> bool {
        true
    }
}

/// Violation of the single-master genlock topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TopologyError {
    /// No write channel is promoted master
    NoMaster,
    /// More than one write channel is promoted master
    MultipleMasters {
        /// Number of promoted masters found
        count: usize,
    },
    /// A read channel claims the master role
    ReadChannelMaster,
    /// A slave references a different pointer than the master publishes
    PointNumMismatch {
        /// Pointer published by the master
        expected: u8,
        /// Pointer referenced by the slave
        found: u8,
    },
    /// Too few frame stores to absorb input and output lag
    TooFewFrameSlots {
        /// Frame stores available
        slots: u16,
        /// Frame stores required
        required: u16,
    },
}

impl core::fmt::Display for TopologyError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NoMaster => write!(f, "no promoted genlock master"),
            Self::MultipleMasters { count } => {
                write!(f, "{count} promoted genlock masters, expected one")
            }
            Self::ReadChannelMaster => write!(f, "read channel configured as genlock master"),
            Self::PointNumMismatch { expected, found } => {
                write!(f, "slave follows pointer {found}, master is {expected}")
            }
            Self::TooFewFrameSlots { slots, required } => {
                write!(f, "{slots} frame stores, genlock needs {required}")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for TopologyError {}

/// Check a set of configured channels against the genlock policy.
///
/// Exactly one write channel must be promoted master; every other channel
/// must sync to the master's pointer; the ring must have at least
/// [`MIN_GENLOCK_FRAME_SLOTS`] stores.
pub fn validate_topology(
    channels: &[&ChannelConfig],
    frame_slots: u16,
) -> Result<(), TopologyError> {
    if frame_slots < MIN_GENLOCK_FRAME_SLOTS {
        return Err(TopologyError::TooFewFrameSlots {
            slots: frame_slots,
            required: MIN_GENLOCK_FRAME_SLOTS,
        });
    }

    if channels
        .iter()
        .any(|c| c.direction == Direction::Read && c.role.is_master())
    {
        return Err(TopologyError::ReadChannelMaster);
    }

    let mut masters = channels.iter().filter(|c| c.role.is_master());
    let master = masters.next().ok_or(TopologyError::NoMaster)?;
    let extra = masters.count();
    if extra > 0 {
        return Err(TopologyError::MultipleMasters {
            count: extra.saturating_add(1),
        });
    }

    let expected = master.role.point_num();
    for slave in channels.iter().filter(|c| !c.role.is_master()) {
        let found = slave.role.point_num();
        if found != expected {
            return Err(TopologyError::PointNumMismatch { expected, found });
        }
    }

    debug!(
        "genlock topology ok: {} channels, master pointer {}",
        channels.len(),
        expected
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_master_disables_sync() {
        let role = GenlockRole::write(1, true);
        assert!(role.is_master());
        assert!(!role.enable_sync());
        assert_eq!(role.point_num(), 1);
    }

    #[test]
    fn write_slave_tracks_master_exactly() {
        let role = GenlockRole::write(1, false);
        assert!(role.enable_sync());
        assert_eq!(role.frame_delay(Direction::Write), 0);
    }

    #[test]
    fn read_channels_lag_by_two() {
        let role = GenlockRole::read(3);
        assert!(role.enable_sync());
        assert_eq!(role.frame_delay(Direction::Read), 2);
        assert_eq!(role.point_num(), 3);
    }

    #[test]
    fn every_role_cycles() {
        assert!(GenlockRole::read(0).enable_circular_buffer());
        assert!(GenlockRole::write(0, true).enable_circular_buffer());
        assert!(GenlockRole::write(0, false).enable_circular_buffer());
    }
}
