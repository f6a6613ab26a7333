//! MAX! CUL bridge
//!
//! Brings up the CUL stick, forwards received packets to the host and
//! transmits packets on the host's behalf.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use maxcul_core::command;
use maxcul_core::constants::{self, timing};
use maxcul_transport::{
    Connector, GpioController, LineListener, LineTransport, ListenerId, OpenOptions,
    SerialConnector, SerialProfile, SysfsGpio,
};
use maxcul_types::{BridgeConfig, RpcChannel, RpcResult, RpcValue};

use crate::error::{Error, Result};
use crate::ingress::PacketForwarder;
use crate::method::{Method, SendPacket};

/// Serial profile of a CUL stick running culfw
pub fn culfw_profile() -> SerialProfile {
    SerialProfile::new(constants::BAUD_RATE).with_read_timeout(constants::READ_TIMEOUT)
}

/// Open serial device with the bridge registered as its line listener
struct Link {
    transport: Box<dyn LineTransport>,
    listener: ListenerId,
}

impl Link {
    async fn release(mut self) -> Result<()> {
        self.transport.remove_line_listener(self.listener);
        self.transport.close().await?;
        Ok(())
    }
}

/// Bridge between a CUL stick and the host
///
/// All methods take `&self`; share the bridge with `Arc`. `start` and
/// `stop` are serialized with packet transmission, but the host should
/// not race them against its own traffic.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
///
/// use async_trait::async_trait;
/// use maxcul::{Bridge, BridgeConfig, RpcChannel, RpcResult, RpcValue};
///
/// struct Host;
///
/// #[async_trait]
/// impl RpcChannel for Host {
///     async fn invoke(&self, method: &str, params: Vec<RpcValue>) -> RpcResult {
///         println!("{}: {:?}", method, params);
///         Ok(RpcValue::Void)
///     }
/// }
///
/// #[tokio::main]
/// async fn main() -> maxcul::Result<()> {
///     let config = BridgeConfig::new("/dev/ttyACM0").with_reset_pin(17);
///     let bridge = Bridge::new(config, Arc::new(Host));
///
///     bridge.start().await?;
///     bridge.send_packet("0B0100401234560000000001", false).await?;
///     bridge.stop().await?;
///     Ok(())
/// }
/// ```
pub struct Bridge {
    config: BridgeConfig,
    connector: Box<dyn Connector>,
    gpio: Mutex<Box<dyn GpioController>>,
    forwarder: Arc<dyn LineListener>,
    link: Mutex<Option<Link>>,
    update_mode: AtomicBool,
}

impl Bridge {
    /// Create a bridge using the serial port and sysfs GPIO from `config`
    pub fn new(config: BridgeConfig, rpc: Arc<dyn RpcChannel>) -> Self {
        let gpio = SysfsGpio::new(config.gpio_path.clone());

        Self {
            update_mode: AtomicBool::new(config.update_mode),
            connector: Box::new(SerialConnector),
            gpio: Mutex::new(Box::new(gpio)),
            forwarder: Arc::new(PacketForwarder::new(rpc)),
            link: Mutex::new(None),
            config,
        }
    }

    /// Use a different transport connector
    pub fn with_connector(mut self, connector: impl Connector + 'static) -> Self {
        self.connector = Box::new(connector);
        self
    }

    /// Use a different GPIO controller
    pub fn with_gpio(mut self, gpio: impl GpioController + 'static) -> Self {
        self.gpio = Mutex::new(Box::new(gpio));
        self
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Check if update mode is active
    pub fn update_mode(&self) -> bool {
        self.update_mode.load(Ordering::Acquire)
    }

    /// Enter or leave update mode
    ///
    /// In update mode the receiver is not re-armed after a transmit.
    pub fn set_update_mode(&self, enabled: bool) {
        if self.update_mode.swap(enabled, Ordering::AcqRel) != enabled {
            info!("Update mode {}", if enabled { "enabled" } else { "disabled" });
        }
    }

    /// Check if the serial device is open
    pub async fn is_open(&self) -> bool {
        self.link
            .lock()
            .await
            .as_ref()
            .is_some_and(|link| link.transport.is_open())
    }

    /// Open the stick and bring it into receive mode
    ///
    /// On failure the bridge stays stopped with no device open.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - No device is configured
    /// - The serial device cannot be opened
    /// - A GPIO pin cannot be driven
    /// - The init sequence cannot be written
    pub async fn start(&self) -> Result<()> {
        let mut link = self.link.lock().await;

        if link.is_some() {
            warn!("Bridge on {} is already started", self.config.device);
            return Err(Error::AlreadyStarted {
                device: self.config.device.clone(),
            });
        }

        match self.bring_up().await {
            Ok(new_link) => {
                *link = Some(new_link);
                info!("MAX! CUL bridge started on {}", self.config.device);
                Ok(())
            }
            Err(e) => {
                error!("Could not start MAX! CUL bridge on {:?}: {}", self.config.device, e);
                Err(e)
            }
        }
    }

    async fn bring_up(&self) -> Result<Link> {
        self.config.validate()?;

        let device = &self.config.device;
        debug!("Opening {}...", device);

        let mut transport = self.connector.connect(device, &culfw_profile());
        transport
            .open(OpenOptions {
                exclusive: false,
                events: true,
            })
            .await?;

        if !transport.is_open() {
            return Err(Error::NotOpen {
                device: device.clone(),
            });
        }

        let listener = transport.add_line_listener(&self.forwarder);
        let mut link = Link {
            transport,
            listener,
        };

        if let Err(e) = self.initialize(link.transport.as_mut()).await {
            if let Err(close_err) = link.release().await {
                warn!("Failed to close {} after aborted start: {}", device, close_err);
            }
            return Err(e);
        }

        Ok(link)
    }

    async fn initialize(&self, transport: &mut dyn LineTransport) -> Result<()> {
        {
            let mut gpio = self.gpio.lock().await;

            if let Some(pin) = self.config.power_pin {
                enable_power(&mut **gpio, pin).await?;
            }

            if let Some(pin) = self.config.reset_pin {
                reset_pulse(&mut **gpio, pin).await?;
            }
        }

        transport.write_line(&command::init_sequence()).await?;
        sleep(timing::INIT_SETTLE).await;

        Ok(())
    }

    /// Close the stick
    ///
    /// Does nothing when the bridge is not started.
    pub async fn stop(&self) -> Result<()> {
        let Some(link) = self.link.lock().await.take() else {
            return Ok(());
        };

        info!("Stopping MAX! CUL bridge on {}...", self.config.device);

        link.release().await.inspect_err(|e| {
            error!("Error closing {}: {}", self.config.device, e);
        })
    }

    /// Transmit one MAX! packet
    ///
    /// With `wake_on_radio` the call returns only after the channel has
    /// been held long enough for wake-on-radio targets.
    pub async fn send_packet(&self, hex: &str, wake_on_radio: bool) -> Result<()> {
        let frame = command::transmit_sequence(hex, self.update_mode())?;

        {
            let mut link = self.link.lock().await;
            let Some(link) = link.as_mut() else {
                error!(
                    "Couldn't write to device, because the device descriptor is not valid: {}",
                    self.config.device
                );
                return Err(Error::NotOpen {
                    device: self.config.device.clone(),
                });
            };

            link.transport.write_line(&frame).await?;
        }

        if wake_on_radio {
            sleep(timing::WAKE_ON_RADIO).await;
        }

        Ok(())
    }

    /// Call a bridge method by name
    ///
    /// Failures are returned as faults and never escape as errors.
    pub async fn call_method(&self, name: &str, params: &[RpcValue]) -> RpcResult {
        let method: Method = match name.parse() {
            Ok(method) => method,
            Err(e) => {
                debug!("{}", e);
                return Err(e.to_fault());
            }
        };

        debug!("Host is calling RPC method: {}", method);

        let result = match method {
            Method::SendPacket => self.rpc_send_packet(params).await,
        };

        result.map_err(|e| {
            match &e {
                Error::InvalidParameters(reason) => debug!("{}(): {}", method, reason),
                Error::NotOpen { .. } => {}
                other => error!("Error in {}(): {}", method, other),
            }
            e.to_fault()
        })
    }

    async fn rpc_send_packet(&self, params: &[RpcValue]) -> Result<RpcValue> {
        let request = SendPacket::from_params(params)?;
        self.send_packet(&request.hex, request.wake_on_radio).await?;
        Ok(RpcValue::Void)
    }
}

impl Drop for Bridge {
    fn drop(&mut self) {
        if self.link.get_mut().is_some() {
            warn!("Bridge dropped while {} is still open", self.config.device);
        }
    }
}

/// Drive the power pin high unless it already is
async fn enable_power(gpio: &mut dyn GpioController, pin: u32) -> Result<()> {
    gpio.open(pin, false).await?;

    let result = async {
        if !gpio.get(pin).await? {
            debug!("Enabling power on GPIO {}", pin);
            gpio.set(pin, true).await?;
        }
        Ok::<(), Error>(())
    }
    .await;

    gpio.close(pin).await?;
    result
}

/// Pull the reset pin low, release it and let the stick boot
async fn reset_pulse(gpio: &mut dyn GpioController, pin: u32) -> Result<()> {
    debug!("Resetting CUL through GPIO {}", pin);

    gpio.open(pin, false).await?;

    let result = async {
        gpio.set(pin, false).await?;
        sleep(timing::RESET_LOW).await;
        gpio.set(pin, true).await?;
        sleep(timing::RESET_SETTLE).await;
        Ok::<(), Error>(())
    }
    .await;

    gpio.close(pin).await?;
    result
}
