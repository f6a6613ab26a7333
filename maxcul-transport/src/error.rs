//! Transport errors

use std::io;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Serial device is not open")]
    NotOpen,

    #[error("Serial device is already open")]
    AlreadyOpen,

    #[error("Could not open {device}: {source}")]
    Open {
        device: String,
        #[source]
        source: serialport::Error,
    },

    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("GPIO {0} is not open")]
    PinNotOpen(u32),

    #[error("GPIO {pin} has unexpected value {value:?}")]
    InvalidPinValue {
        pin: u32,
        value: String,
    },

    #[error("GPIO access to {path} failed: {source}")]
    Gpio {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
