//! Fakes for the bridge's collaborators
//!
//! Every fake records into a shared timeline stamped with tokio's clock,
//! so tests running with a paused clock can check ordering and timing.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::time::Instant;
use tracing::subscriber::DefaultGuard;

use maxcul::{RpcChannel, RpcFault, RpcResult, RpcValue};
use maxcul_transport::{
    Connector, GpioController, LineListener, LineTransport, ListenerId, ListenerRegistry,
    OpenOptions, SerialProfile,
};

pub type Timeline = Arc<Mutex<Vec<(Instant, String)>>>;

fn record(timeline: &Timeline, event: impl Into<String>) {
    timeline.lock().unwrap().push((Instant::now(), event.into()));
}

/// Events recorded so far, without timestamps
pub fn events(timeline: &Timeline) -> Vec<String> {
    timeline
        .lock()
        .unwrap()
        .iter()
        .map(|(_, event)| event.clone())
        .collect()
}

/// Time at which an event was recorded
pub fn time_of(timeline: &Timeline, event: &str) -> Instant {
    timeline
        .lock()
        .unwrap()
        .iter()
        .find(|(_, e)| e == event)
        .map(|(at, _)| *at)
        .unwrap_or_else(|| panic!("event {:?} not recorded", event))
}

/// Simulated CUL stick shared by every transport the connector hands out
pub struct FakeDevice {
    timeline: Timeline,
    writes: Mutex<Vec<String>>,
    profiles: Mutex<Vec<SerialProfile>>,
    open: AtomicBool,
    fail_open: AtomicBool,
    fail_write: AtomicBool,
    listeners: ListenerRegistry,
}

impl FakeDevice {
    pub fn new(timeline: Timeline) -> Arc<Self> {
        Arc::new(Self {
            timeline,
            writes: Mutex::new(Vec::new()),
            profiles: Mutex::new(Vec::new()),
            open: AtomicBool::new(false),
            fail_open: AtomicBool::new(false),
            fail_write: AtomicBool::new(false),
            listeners: ListenerRegistry::new(),
        })
    }

    pub fn fail_open(&self) {
        self.fail_open.store(true, Ordering::SeqCst);
    }

    pub fn fail_write(&self) {
        self.fail_write.store(true, Ordering::SeqCst);
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }

    pub fn profiles(&self) -> Vec<SerialProfile> {
        self.profiles.lock().unwrap().clone()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Deliver a line as the serial reader would
    pub async fn receive(&self, line: &str) -> usize {
        self.listeners.dispatch(line).await
    }
}

pub struct FakeConnector(pub Arc<FakeDevice>);

impl Connector for FakeConnector {
    fn connect(&self, device: &str, profile: &SerialProfile) -> Box<dyn LineTransport> {
        self.0.profiles.lock().unwrap().push(*profile);
        Box::new(FakeTransport {
            device: self.0.clone(),
            path: device.to_string(),
        })
    }
}

struct FakeTransport {
    device: Arc<FakeDevice>,
    path: String,
}

#[async_trait]
impl LineTransport for FakeTransport {
    async fn open(&mut self, options: OpenOptions) -> maxcul_transport::Result<()> {
        if self.device.fail_open.load(Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::NotFound, "no such device").into());
        }
        record(
            &self.device.timeline,
            format!("open exclusive={} events={}", options.exclusive, options.events),
        );
        self.device.open.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn close(&mut self) -> maxcul_transport::Result<()> {
        record(&self.device.timeline, "close");
        self.device.open.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.device.is_open()
    }

    async fn write_line(&mut self, text: &str) -> maxcul_transport::Result<()> {
        if !self.device.is_open() {
            return Err(maxcul_transport::Error::NotOpen);
        }
        if self.device.fail_write.load(Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "device gone").into());
        }
        record(&self.device.timeline, format!("write {:?}", text));
        self.device.writes.lock().unwrap().push(text.to_string());
        Ok(())
    }

    fn add_line_listener(&self, listener: &Arc<dyn LineListener>) -> ListenerId {
        self.device.listeners.add(listener)
    }

    fn remove_line_listener(&self, id: ListenerId) -> bool {
        self.device.listeners.remove(id)
    }

    fn device(&self) -> &str {
        &self.path
    }
}

/// GPIO controller backed by a map of pin values
pub struct FakeGpio {
    timeline: Timeline,
    values: HashMap<u32, bool>,
    failing_pin: Option<u32>,
}

impl FakeGpio {
    pub fn new(timeline: Timeline) -> Self {
        Self {
            timeline,
            values: HashMap::new(),
            failing_pin: None,
        }
    }

    /// Preset a pin value
    pub fn with_value(mut self, pin: u32, value: bool) -> Self {
        self.values.insert(pin, value);
        self
    }

    /// Make every `set` on this pin fail
    pub fn with_failing_pin(mut self, pin: u32) -> Self {
        self.failing_pin = Some(pin);
        self
    }
}

#[async_trait]
impl GpioController for FakeGpio {
    async fn open(&mut self, pin: u32, active_low: bool) -> maxcul_transport::Result<()> {
        record(&self.timeline, format!("gpio open {} active_low={}", pin, active_low));
        Ok(())
    }

    async fn get(&mut self, pin: u32) -> maxcul_transport::Result<bool> {
        record(&self.timeline, format!("gpio get {}", pin));
        Ok(self.values.get(&pin).copied().unwrap_or(false))
    }

    async fn set(&mut self, pin: u32, value: bool) -> maxcul_transport::Result<()> {
        if self.failing_pin == Some(pin) {
            return Err(maxcul_transport::Error::PinNotOpen(pin));
        }
        record(&self.timeline, format!("gpio set {} {}", pin, value));
        self.values.insert(pin, value);
        Ok(())
    }

    async fn close(&mut self, pin: u32) -> maxcul_transport::Result<()> {
        record(&self.timeline, format!("gpio close {}", pin));
        Ok(())
    }
}

/// Host that records every invocation
pub struct RecordingHost {
    calls: Mutex<Vec<(String, Vec<RpcValue>)>>,
    fault: Option<RpcFault>,
}

impl RecordingHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            fault: None,
        })
    }

    /// Host that answers every call with a fault
    pub fn failing(fault: RpcFault) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            fault: Some(fault),
        })
    }

    pub fn calls(&self) -> Vec<(String, Vec<RpcValue>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RpcChannel for RecordingHost {
    async fn invoke(&self, method: &str, params: Vec<RpcValue>) -> RpcResult {
        self.calls.lock().unwrap().push((method.to_string(), params));
        match &self.fault {
            Some(fault) => Err(fault.clone()),
            None => Ok(RpcValue::Void),
        }
    }
}

/// Formatted log output captured for the current thread
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    /// Install a WARN-level subscriber writing into a fresh capture
    pub fn install() -> (Self, DefaultGuard) {
        let capture = Self::default();
        let writer = capture.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .without_time()
            .with_writer(move || writer.clone())
            .finish();

        (capture, tracing::subscriber::set_default(subscriber))
    }

    /// Take the output captured so far
    pub fn take(&self) -> String {
        let bytes = std::mem::take(&mut *self.0.lock().unwrap());
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
