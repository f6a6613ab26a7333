//! High-level error types

use maxcul_types::RpcFault;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Core protocol error: {0}")]
    Core(#[from] maxcul_core::Error),

    #[error("Transport error: {0}")]
    Transport(#[from] maxcul_transport::Error),

    #[error("Type error: {0}")]
    Types(#[from] maxcul_types::Error),

    #[error("Serial device is not open: {device}")]
    NotOpen {
        device: String,
    },

    #[error("Bridge already started on {device}")]
    AlreadyStarted {
        device: String,
    },

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Method not found: {0}")]
    MethodNotFound(String),
}

impl Error {
    /// Fault reported to the host for this error
    pub fn to_fault(&self) -> RpcFault {
        match self {
            Self::InvalidParameters(_)
            | Self::Types(maxcul_types::Error::TypeMismatch { .. })
            | Self::Core(_) => RpcFault::invalid_parameters(),
            Self::NotOpen { .. } => RpcFault::device_not_open(),
            Self::MethodNotFound(_) => RpcFault::method_not_found(),
            _ => RpcFault::unknown_application_error(),
        }
    }
}
