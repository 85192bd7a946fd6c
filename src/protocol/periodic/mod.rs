//! Periodic transmission: frame assembly, the shared run flag, and the tick
//! scheduler driving both.
pub mod assembler;
pub mod run_state;
pub mod scheduler;

/// Reference transmit period (ms).
pub const DEFAULT_PERIOD_MS: u64 = 100;
