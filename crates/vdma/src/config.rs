//! Driver configuration constants
//!
//! Central values for the genlock scheme and the reset state machine. Code
//! elsewhere in the crate references these rather than hardcoding numbers.

/// Crate version (synchronized with Cargo.toml)
pub const CRATE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Poll budget for a channel reset.
///
/// This is an iteration count, not a wall-clock timeout: how long the budget
/// lasts depends on CPU and bus speed. 1000 polls are well above the handful
/// of AXI clock cycles a reset takes once the stream clocks are stable.
pub const RESET_POLL: u32 = 1000;

/// Frame delay of every read channel.
///
/// Camera inputs may already trail the promoted master by one frame, so the
/// read side is allowed to lag by two.
pub const READ_FRAME_DELAY: u8 = 2;

/// Frame delay of every write slave: slaves sit on the master's frame exactly.
pub const WRITE_SLAVE_FRAME_DELAY: u8 = 0;

/// Frame delay programmed for the promoted master.
///
/// Hardware ignores it while sync is disabled; zero keeps the register clean.
pub const MASTER_FRAME_DELAY: u8 = 0;

/// Minimum frame stores for the genlock topology.
///
/// ```text
/// master - 0: master and input slaves
/// master - 1: input slaves that are lagging
/// master - 2: output slave
/// master - 3: output slave if it is lagging
/// ```
pub const MIN_GENLOCK_FRAME_SLOTS: u16 = 4;

/// Upper bound on frame stores of the AXI VDMA core (C_NUM_FSTORES max).
pub const MAX_FRAME_STORES: usize = 32;
