//! Driver configuration

use nextion_protocol::ReturnLevel;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Baud rate the display uses out of the factory
pub const DEFAULT_BAUDRATE: u32 = 9600;

/// How long to wait for the display to answer an instruction
pub const DEFAULT_RESPONSE_TIMEOUT_MS: u32 = 50;

/// Baud rates accepted by the display's `baud`/`bauds` instructions
pub const SUPPORTED_BAUDRATES: [u32; 13] = [
    2400, 4800, 9600, 19200, 31250, 38400, 57600, 115200, 230400, 250000, 256000, 512000,
    921600,
];

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// The display cannot run at this baud rate
    UnsupportedBaudrate(u32),
}

/// Serial and reporting settings for one display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DriverConfig {
    /// UART baud rate in bits per second
    pub baudrate: u32,
    /// Which instruction results the display should send back
    pub return_level: ReturnLevel,
    /// Time to wait for a result code or `get` reply
    pub response_timeout_ms: u32,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            baudrate: DEFAULT_BAUDRATE,
            return_level: ReturnLevel::default(),
            response_timeout_ms: DEFAULT_RESPONSE_TIMEOUT_MS,
        }
    }
}

impl DriverConfig {
    /// Create a config for a display running at `baudrate`
    pub const fn with_baudrate(baudrate: u32) -> Self {
        Self {
            baudrate,
            return_level: ReturnLevel::OnFailure,
            response_timeout_ms: DEFAULT_RESPONSE_TIMEOUT_MS,
        }
    }

    /// Check the settings against what the display supports
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !SUPPORTED_BAUDRATES.contains(&self.baudrate) {
            return Err(ConfigError::UnsupportedBaudrate(self.baudrate));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DriverConfig::default();
        assert_eq!(config.baudrate, 9600);
        assert_eq!(config.return_level, ReturnLevel::OnFailure);
        assert_eq!(config.response_timeout_ms, DEFAULT_RESPONSE_TIMEOUT_MS);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_unsupported_baudrate() {
        let config = DriverConfig::with_baudrate(14400);
        assert_eq!(
            config.validate(),
            Err(ConfigError::UnsupportedBaudrate(14400))
        );
        assert_eq!(DriverConfig::with_baudrate(115200).validate(), Ok(()));
    }
}
