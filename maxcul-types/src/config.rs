//! Bridge configuration

use std::path::PathBuf;

use crate::error::{Error, Result};

/// Default sysfs GPIO root
pub const DEFAULT_GPIO_PATH: &str = "/sys/class/gpio";

/// Configuration of one CUL bridge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Serial device path (e.g. /dev/ttyACM0)
    pub device: String,

    /// Root of the sysfs GPIO tree
    pub gpio_path: PathBuf,

    /// Pin pulsed low to reset the stick
    pub reset_pin: Option<u32>,

    /// Pin driven high to power the stick before reset
    pub power_pin: Option<u32>,

    /// Start in update mode (receiver not re-armed after transmit)
    pub update_mode: bool,
}

impl BridgeConfig {
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            gpio_path: PathBuf::from(DEFAULT_GPIO_PATH),
            reset_pin: None,
            power_pin: None,
            update_mode: false,
        }
    }

    /// Set the sysfs GPIO root
    pub fn with_gpio_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.gpio_path = path.into();
        self
    }

    /// Set the reset pin
    pub fn with_reset_pin(mut self, pin: u32) -> Self {
        self.reset_pin = Some(pin);
        self
    }

    /// Set the power pin
    pub fn with_power_pin(mut self, pin: u32) -> Self {
        self.power_pin = Some(pin);
        self
    }

    pub fn with_update_mode(mut self, enabled: bool) -> Self {
        self.update_mode = enabled;
        self
    }

    /// Check that a device path is configured
    pub fn validate(&self) -> Result<()> {
        if self.device.is_empty() {
            return Err(Error::Validation(
                "No device defined for family MAX! CUL".into(),
            ));
        }
        Ok(())
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self::new("")
    }
}

/// Convert a pin setting where `-1` (or any negative number) means unset
pub fn pin_from_setting(value: i64) -> Option<u32> {
    u32::try_from(value).ok()
}
