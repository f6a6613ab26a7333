//! Serial transport backed by `serialport`
//!
//! Lines are read on a dedicated thread (serial reads block up to the
//! read timeout) and handed to a tokio task, which dispatches them to the
//! registered listeners.

use std::io::{self, Read, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use async_trait::async_trait;
use bytes::BytesMut;
use parking_lot::Mutex;
use serialport::{Parity, SerialPort};
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

use crate::listener::{LineListener, ListenerId, ListenerRegistry};
use crate::{error::*, Connector, LineTransport, OpenOptions};

/// Line settings of a serial port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerialProfile {
    pub baud_rate: u32,
    pub parity: Parity,
    pub read_timeout: Duration,
}

impl SerialProfile {
    /// Create a profile with no parity and a 100 ms read timeout
    pub fn new(baud_rate: u32) -> Self {
        Self {
            baud_rate,
            parity: Parity::None,
            read_timeout: Duration::from_millis(100),
        }
    }

    /// Set parity
    pub fn with_parity(mut self, parity: Parity) -> Self {
        self.parity = parity;
        self
    }

    /// Set read timeout
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }
}

/// Background reader state
struct LineReader {
    running: Arc<AtomicBool>,
    thread: thread::JoinHandle<()>,
    dispatcher: tokio::task::JoinHandle<()>,
}

/// Serial port transport
pub struct SerialTransport {
    device: String,
    profile: SerialProfile,
    port: Option<Arc<Mutex<Box<dyn SerialPort>>>>,
    reader: Option<LineReader>,
    listeners: Arc<ListenerRegistry>,
}

impl SerialTransport {
    /// Create new serial transport
    pub fn new(device: impl Into<String>, profile: SerialProfile) -> Self {
        Self {
            device: device.into(),
            profile,
            port: None,
            reader: None,
            listeners: Arc::new(ListenerRegistry::new()),
        }
    }

    /// Line settings used when opening
    pub fn profile(&self) -> &SerialProfile {
        &self.profile
    }

    fn open_port(&self, options: OpenOptions) -> Result<Box<dyn SerialPort>> {
        let builder = serialport::new(&self.device, self.profile.baud_rate)
            .parity(self.profile.parity)
            .timeout(self.profile.read_timeout);

        let open_error = |source: serialport::Error| Error::Open {
            device: self.device.clone(),
            source,
        };

        #[cfg(unix)]
        {
            let mut port = builder.open_native().map_err(open_error)?;
            port.set_exclusive(options.exclusive)?;
            let port: Box<dyn SerialPort> = Box::new(port);
            Ok(port)
        }

        #[cfg(not(unix))]
        {
            let _ = options;
            builder.open().map_err(open_error)
        }
    }

    fn spawn_reader(&self, port: Box<dyn SerialPort>) -> Result<LineReader> {
        let running = Arc::new(AtomicBool::new(true));
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();

        let thread = {
            let running = running.clone();
            let device = self.device.clone();
            thread::Builder::new()
                .name(format!("serial-reader {}", self.device))
                .spawn(move || read_lines(&device, port, &running, &tx))?
        };

        let listeners = self.listeners.clone();
        let dispatcher = tokio::spawn(async move {
            while let Some(line) = rx.recv().await {
                listeners.dispatch(&line).await;
            }
        });

        Ok(LineReader {
            running,
            thread,
            dispatcher,
        })
    }
}

/// Longest partial line kept while waiting for its terminator
pub const MAX_PENDING: usize = 1024;

/// Bytes received but not yet split into lines
#[derive(Debug, Default)]
struct LineBuffer {
    buf: BytesMut,
}

impl LineBuffer {
    fn extend(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    /// Take the next complete line, terminator included
    fn next_line(&mut self) -> Option<String> {
        let pos = self.buf.iter().position(|&b| b == b'\n')?;
        let line = self.buf.split_to(pos + 1);
        Some(String::from_utf8_lossy(&line).into_owned())
    }

    /// Drop a partial line that outgrew [`MAX_PENDING`], returning its length
    fn discard_overflow(&mut self) -> Option<usize> {
        let len = self.buf.len();
        if len <= MAX_PENDING {
            return None;
        }
        self.buf.clear();
        Some(len)
    }
}

/// Read from the port until stopped, sending each complete line
fn read_lines(
    device: &str,
    mut port: Box<dyn SerialPort>,
    running: &AtomicBool,
    tx: &mpsc::UnboundedSender<String>,
) {
    let mut lines = LineBuffer::default();
    let mut chunk = [0u8; 256];

    while running.load(Ordering::Acquire) {
        match port.read(&mut chunk) {
            Ok(0) => {
                warn!("{} reported end of file", device);
                break;
            }
            Ok(n) => lines.extend(&chunk[..n]),
            Err(ref e) if e.kind() == io::ErrorKind::TimedOut => continue,
            Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                warn!("Read error on {}: {}", device, e);
                break;
            }
        }

        while let Some(line) = lines.next_line() {
            trace!("Received line from {}: {:?}", device, line);

            if tx.send(line).is_err() {
                return;
            }
        }

        if let Some(len) = lines.discard_overflow() {
            warn!("Discarded {} bytes without line break from {}", len, device);
        }
    }

    debug!("Line reader for {} stopped", device);
}

#[async_trait]
impl LineTransport for SerialTransport {
    async fn open(&mut self, options: OpenOptions) -> Result<()> {
        if self.is_open() {
            return Err(Error::AlreadyOpen);
        }

        debug!("Opening {} at {} baud...", self.device, self.profile.baud_rate);

        let port = self.open_port(options)?;

        if options.events {
            let reader_port = port.try_clone()?;
            self.reader = Some(self.spawn_reader(reader_port)?);
        }

        debug!("Opened {}", self.device);

        self.port = Some(Arc::new(Mutex::new(port)));
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(LineReader { running, thread, dispatcher }) = self.reader.take() {
            running.store(false, Ordering::Release);

            // The reader notices the flag within one read timeout
            let _ = tokio::task::spawn_blocking(move || thread.join()).await;
            dispatcher.abort();
        }

        if self.port.take().is_some() {
            debug!("Closed {}", self.device);
        }

        Ok(())
    }

    fn is_open(&self) -> bool {
        self.port.is_some()
    }

    async fn write_line(&mut self, text: &str) -> Result<()> {
        let port = self.port.clone().ok_or(Error::NotOpen)?;

        trace!("Writing to {}: {:?}", self.device, text);

        // Writes block until drained or the port timeout expires
        let data = text.as_bytes().to_vec();
        tokio::task::spawn_blocking(move || {
            let mut port = port.lock();
            port.write_all(&data)?;
            port.flush()
        })
        .await
        .map_err(io::Error::other)??;

        Ok(())
    }

    fn add_line_listener(&self, listener: &Arc<dyn LineListener>) -> ListenerId {
        self.listeners.add(listener)
    }

    fn remove_line_listener(&self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    fn device(&self) -> &str {
        &self.device
    }
}

impl Drop for SerialTransport {
    fn drop(&mut self) {
        if self.is_open() {
            warn!("Serial transport for {} dropped while still open", self.device);
        }

        if let Some(reader) = self.reader.take() {
            reader.running.store(false, Ordering::Release);
            reader.dispatcher.abort();
        }
    }
}

/// Connector producing [`SerialTransport`]s
#[derive(Debug, Default, Clone, Copy)]
pub struct SerialConnector;

impl Connector for SerialConnector {
    fn connect(&self, device: &str, profile: &SerialProfile) -> Box<dyn LineTransport> {
        Box::new(SerialTransport::new(device, *profile))
    }
}
