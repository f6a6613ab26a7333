//! RPC fault results

use std::fmt;

/// Structured error result returned to, or received from, the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcFault {
    /// Fault code
    pub code: i32,

    /// Human readable fault description
    pub message: String,
}

impl RpcFault {
    /// Generic application fault, also the default code of host faults
    pub const APPLICATION_ERROR: i32 = -1;

    /// Unknown application error
    pub const UNKNOWN_APPLICATION_ERROR: i32 = -32500;

    /// Requested method not found
    pub const METHOD_NOT_FOUND: i32 = -32601;

    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn method_not_found() -> Self {
        Self::new(Self::METHOD_NOT_FOUND, ": Requested method not found.")
    }

    pub fn unknown_application_error() -> Self {
        Self::new(
            Self::UNKNOWN_APPLICATION_ERROR,
            "Unknown application error. See log for more details.",
        )
    }

    pub fn invalid_parameters() -> Self {
        Self::new(Self::APPLICATION_ERROR, "Invalid parameters.")
    }

    pub fn device_not_open() -> Self {
        Self::new(Self::APPLICATION_ERROR, "Serial device is not open.")
    }

    /// Check if this fault carries the default code
    ///
    /// Hosts answer with the default code when they had nothing to report.
    pub fn is_default(&self) -> bool {
        self.code == Self::APPLICATION_ERROR
    }
}

impl fmt::Display for RpcFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.code)
    }
}

impl std::error::Error for RpcFault {}
