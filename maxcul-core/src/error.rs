//! Error types for maxcul-core

/// Result type alias for protocol operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core protocol errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Transmit command without packet data
    #[error("Packet payload is empty")]
    EmptyPayload,

    /// Payload would be split into several device commands
    #[error("Packet payload contains a line break at offset {offset}")]
    LineBreakInPayload {
        offset: usize,
    },
}
