//! # maxcul-core
//!
//! Wire protocol for MAX! radio traffic through a CUL stick running culfw.
//!
//! This crate provides the protocol primitives only, no I/O:
//! - Fixed link constants (serial profile, timings, markers)
//! - Outbound command encoding (`X`, `Zr`, `Zs`)
//! - Inbound line classification

pub mod command;
pub mod constants;
pub mod error;
pub mod line;

pub use command::Command;
pub use error::{Error, Result};
pub use line::InboundLine;

/// Protocol family identifier attached to every packet handed to the host
pub const FAMILY_ID: i64 = 4;
