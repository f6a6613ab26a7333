//! GPIO access
//!
//! The CUL stick on some boards is wired to a power-enable pin and a
//! reset pin. [`SysfsGpio`] drives them through the Linux sysfs GPIO
//! interface.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, trace};

use crate::error::*;

/// GPIO pin controller
#[async_trait]
pub trait GpioController: Send + Sync {
    /// Open a pin for use
    async fn open(&mut self, pin: u32, active_low: bool) -> Result<()>;

    /// Read the logical pin value
    async fn get(&mut self, pin: u32) -> Result<bool>;

    /// Drive the pin to a logical value
    async fn set(&mut self, pin: u32, value: bool) -> Result<()>;

    /// Release the pin
    async fn close(&mut self, pin: u32) -> Result<()>;
}

/// Linux sysfs GPIO controller
#[derive(Debug)]
pub struct SysfsGpio {
    root: PathBuf,
    open_pins: HashSet<u32>,
}

impl SysfsGpio {
    /// Create a controller rooted at a sysfs GPIO directory (usually `/sys/class/gpio`)
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            open_pins: HashSet::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn pin_file(&self, pin: u32, name: &str) -> PathBuf {
        self.root.join(format!("gpio{}", pin)).join(name)
    }

    fn ensure_open(&self, pin: u32) -> Result<()> {
        if !self.open_pins.contains(&pin) {
            return Err(Error::PinNotOpen(pin));
        }
        Ok(())
    }
}

async fn read_attr(path: &Path) -> Result<String> {
    let value = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| Error::Gpio {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(value.trim().to_string())
}

async fn write_attr(path: &Path, value: &str) -> Result<()> {
    trace!("Writing {:?} to {}", value, path.display());

    tokio::fs::write(path, value)
        .await
        .map_err(|source| Error::Gpio {
            path: path.to_path_buf(),
            source,
        })
}

#[async_trait]
impl GpioController for SysfsGpio {
    async fn open(&mut self, pin: u32, active_low: bool) -> Result<()> {
        let pin_dir = self.root.join(format!("gpio{}", pin));

        if !tokio::fs::try_exists(&pin_dir).await.unwrap_or(false) {
            debug!("Exporting GPIO {}", pin);
            write_attr(&self.root.join("export"), &pin.to_string()).await?;
        }

        write_attr(
            &self.pin_file(pin, "active_low"),
            if active_low { "1" } else { "0" },
        )
        .await?;

        self.open_pins.insert(pin);
        Ok(())
    }

    async fn get(&mut self, pin: u32) -> Result<bool> {
        self.ensure_open(pin)?;

        let value = read_attr(&self.pin_file(pin, "value")).await?;
        match value.as_str() {
            "0" => Ok(false),
            "1" => Ok(true),
            _ => Err(Error::InvalidPinValue { pin, value }),
        }
    }

    async fn set(&mut self, pin: u32, value: bool) -> Result<()> {
        self.ensure_open(pin)?;

        let direction = self.pin_file(pin, "direction");
        if read_attr(&direction).await? != "out" {
            write_attr(&direction, "out").await?;
        }

        write_attr(&self.pin_file(pin, "value"), if value { "1" } else { "0" }).await
    }

    async fn close(&mut self, pin: u32) -> Result<()> {
        self.open_pins.remove(&pin);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn fake_pin(root: &Path, pin: u32, value: &str, direction: &str) {
        let dir = root.join(format!("gpio{}", pin));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("value"), value).unwrap();
        fs::write(dir.join("direction"), direction).unwrap();
        fs::write(dir.join("active_low"), "0").unwrap();
    }

    #[tokio::test]
    async fn test_open_get_set() {
        let root = tempfile::tempdir().unwrap();
        fake_pin(root.path(), 17, "0\n", "in\n");

        let mut gpio = SysfsGpio::new(root.path());
        gpio.open(17, false).await.unwrap();

        assert!(!gpio.get(17).await.unwrap());

        gpio.set(17, true).await.unwrap();
        assert!(gpio.get(17).await.unwrap());

        let direction = fs::read_to_string(root.path().join("gpio17/direction")).unwrap();
        assert_eq!(direction, "out");

        gpio.close(17).await.unwrap();
    }

    #[tokio::test]
    async fn test_active_low_is_written() {
        let root = tempfile::tempdir().unwrap();
        fake_pin(root.path(), 4, "1", "out");

        let mut gpio = SysfsGpio::new(root.path());
        gpio.open(4, true).await.unwrap();

        let active_low = fs::read_to_string(root.path().join("gpio4/active_low")).unwrap();
        assert_eq!(active_low, "1");
    }

    #[tokio::test]
    async fn test_pin_not_open() {
        let root = tempfile::tempdir().unwrap();
        fake_pin(root.path(), 17, "0", "out");

        let mut gpio = SysfsGpio::new(root.path());
        assert!(matches!(gpio.get(17).await, Err(Error::PinNotOpen(17))));
        assert!(matches!(gpio.set(17, true).await, Err(Error::PinNotOpen(17))));

        gpio.open(17, false).await.unwrap();
        gpio.close(17).await.unwrap();
        assert!(matches!(gpio.get(17).await, Err(Error::PinNotOpen(17))));
    }

    #[test]
    fn test_pin_error_display() {
        assert_eq!(Error::PinNotOpen(17).to_string(), "GPIO 17 is not open");
        assert_eq!(
            Error::InvalidPinValue { pin: 17, value: "x".into() }.to_string(),
            "GPIO 17 has unexpected value \"x\""
        );
    }

    #[tokio::test]
    async fn test_missing_pin_is_exported() {
        let root = tempfile::tempdir().unwrap();

        let mut gpio = SysfsGpio::new(root.path());

        // No kernel behind the temp dir, so the pin never appears
        let result = gpio.open(23, false).await;
        assert!(matches!(result, Err(Error::Gpio { .. })));

        let export = fs::read_to_string(root.path().join("export")).unwrap();
        assert_eq!(export, "23");
    }

    #[tokio::test]
    async fn test_invalid_value() {
        let root = tempfile::tempdir().unwrap();
        fake_pin(root.path(), 5, "x", "out");

        let mut gpio = SysfsGpio::new(root.path());
        gpio.open(5, false).await.unwrap();

        assert!(matches!(
            gpio.get(5).await,
            Err(Error::InvalidPinValue { pin: 5, .. })
        ));
    }
}
