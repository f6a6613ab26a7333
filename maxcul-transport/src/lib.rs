//! Transport layer for the CUL stick
//!
//! Provides the line-oriented serial link and GPIO access used to
//! bring the stick up.

pub mod error;
pub mod gpio;
pub mod listener;
pub mod serial;

pub use error::{Error, Result};
pub use gpio::{GpioController, SysfsGpio};
pub use listener::{LineListener, ListenerId, ListenerRegistry};
pub use serial::{SerialConnector, SerialProfile, SerialTransport};

use std::sync::Arc;

use async_trait::async_trait;

/// Options applied when opening a transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OpenOptions {
    /// Lock the device against other openers
    pub exclusive: bool,

    /// Start the background line reader
    pub events: bool,
}

/// Line-oriented transport to a device
///
/// Received lines are delivered to registered [`LineListener`]s from a
/// background task. The transport holds listeners weakly.
#[async_trait]
pub trait LineTransport: Send + Sync {
    /// Open the device
    async fn open(&mut self, options: OpenOptions) -> Result<()>;

    /// Close the device and stop the line reader
    async fn close(&mut self) -> Result<()>;

    /// Check if the device is open
    fn is_open(&self) -> bool;

    /// Write text to the device in one write
    ///
    /// The text is sent verbatim, so it carries its own line terminators.
    async fn write_line(&mut self, text: &str) -> Result<()>;

    /// Register a listener for received lines
    fn add_line_listener(&self, listener: &Arc<dyn LineListener>) -> ListenerId;

    /// Remove a listener, returning whether it was registered
    fn remove_line_listener(&self, id: ListenerId) -> bool;

    /// Device path
    fn device(&self) -> &str;
}

/// Creates transports for a device path
pub trait Connector: Send + Sync {
    fn connect(&self, device: &str, profile: &SerialProfile) -> Box<dyn LineTransport>;
}
