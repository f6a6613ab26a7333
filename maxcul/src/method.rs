//! Methods the host can call on the bridge

use std::fmt;
use std::str::FromStr;

use maxcul_types::RpcValue;

use crate::error::{Error, Result};

/// Callable bridge methods
///
/// Names are matched exactly, case-sensitive.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Method {
    /// `sendPacket(reserved, hex, wakeOnRadio)`
    SendPacket,
}

impl Method {
    /// All callable methods
    pub const ALL: &'static [Method] = &[Method::SendPacket];

    /// Get method name
    pub fn name(self) -> &'static str {
        match self {
            Self::SendPacket => "sendPacket",
        }
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|method| method.name() == name)
            .ok_or_else(|| Error::MethodNotFound(name.to_string()))
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Validated `sendPacket` parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendPacket {
    /// Hex-encoded MAX! packet
    pub hex: String,

    /// Hold the channel after sending so wake-on-radio targets can answer
    pub wake_on_radio: bool,
}

impl SendPacket {
    /// Number of positional parameters
    pub const ARITY: usize = 3;

    /// Parse `[reserved, hex, wakeOnRadio]`
    ///
    /// The first parameter is ignored.
    pub fn from_params(params: &[RpcValue]) -> Result<Self> {
        let [_, hex, wake_on_radio] = params else {
            return Err(Error::InvalidParameters(format!(
                "expected {} parameters, got {}",
                Self::ARITY,
                params.len()
            )));
        };

        let hex = hex
            .as_str()
            .map_err(|e| Error::InvalidParameters(format!("packet: {}", e)))?;
        if hex.is_empty() {
            return Err(Error::InvalidParameters("packet is empty".into()));
        }

        let wake_on_radio = wake_on_radio
            .as_bool()
            .map_err(|e| Error::InvalidParameters(format!("wake on radio: {}", e)))?;

        Ok(Self {
            hex: hex.to_string(),
            wake_on_radio,
        })
    }
}
