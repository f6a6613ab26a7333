//! # maxcul
//!
//! Bridge between a CUL stick running culfw and a host that speaks in
//! MAX! packets.
//!
//! ## Features
//!
//! - Stick bring-up with optional GPIO power and reset pins
//! - Received packets delivered to the host as `packetReceived` calls
//! - Packets transmitted through the `sendPacket` method
//! - Async/await API using Tokio
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use async_trait::async_trait;
//! use maxcul::{Bridge, BridgeConfig, RpcChannel, RpcResult, RpcValue};
//!
//! struct Host;
//!
//! #[async_trait]
//! impl RpcChannel for Host {
//!     async fn invoke(&self, method: &str, params: Vec<RpcValue>) -> RpcResult {
//!         println!("{} {:?}", method, params);
//!         Ok(RpcValue::Void)
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> maxcul::Result<()> {
//!     let bridge = Bridge::new(BridgeConfig::new("/dev/ttyACM0"), Arc::new(Host));
//!     bridge.start().await?;
//!
//!     let params = vec![RpcValue::Void, "0B0100401234560000000001".into(), false.into()];
//!     let _ = bridge.call_method("sendPacket", &params).await;
//!
//!     bridge.stop().await?;
//!     Ok(())
//! }
//! ```

pub mod bridge;
pub mod error;
pub mod ingress;
pub mod method;

// Re-exports
pub use bridge::Bridge;
pub use error::{Error, Result};
pub use ingress::PacketForwarder;
pub use method::{Method, SendPacket};

// Re-export types
pub use maxcul_core::{Command, FAMILY_ID, InboundLine};
pub use maxcul_types::{BridgeConfig, RpcChannel, RpcFault, RpcResult, RpcValue};
