//! Runtime configuration of a transmit run.
use std::time::Duration;

use crate::protocol::{periodic::DEFAULT_PERIOD_MS, transport::DEFAULT_INTERFACE};

//==================================================================================CONF
/// Where and how often to transmit. Frame content is fixed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxConfig {
    /// CAN interface name, e.g. `vcan0`.
    pub interface: String,
    /// Transmit period.
    pub period: Duration,
}

impl Default for TxConfig {
    fn default() -> Self {
        Self {
            interface: DEFAULT_INTERFACE.to_owned(),
            period: Duration::from_millis(DEFAULT_PERIOD_MS),
        }
    }
}

impl TxConfig {
    /// Configuration for `interface` at the default period.
    pub fn new(interface: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
            ..Self::default()
        }
    }

    /// Override the transmit period.
    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }
}
