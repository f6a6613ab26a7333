//! Channel toward the host

use async_trait::async_trait;

use crate::{RpcFault, RpcValue};

/// Result of an RPC invocation
pub type RpcResult = std::result::Result<RpcValue, RpcFault>;

/// Method name used to deliver received packets to the host
pub const PACKET_RECEIVED: &str = "packetReceived";

/// RPC invocation channel implemented by the host
///
/// The bridge calls `invoke` from the serial reader's dispatch task, so
/// implementations must not block for long.
#[async_trait]
pub trait RpcChannel: Send + Sync {
    /// Invoke a method on the host
    async fn invoke(&self, method: &str, params: Vec<RpcValue>) -> RpcResult;
}
