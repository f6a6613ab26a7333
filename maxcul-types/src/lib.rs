//! Host-facing types for maxcul
//!
//! RPC values and faults exchanged with the host, the channel the host
//! implements to receive packets, and the bridge configuration.

pub mod config;
pub mod error;
pub mod fault;
pub mod rpc;
pub mod value;

pub use config::BridgeConfig;
pub use error::{Error, Result};
pub use fault::RpcFault;
pub use rpc::{RpcChannel, RpcResult};
pub use value::RpcValue;
