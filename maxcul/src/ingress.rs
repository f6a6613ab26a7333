//! Forwarding of received lines to the host

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, trace, warn};

use maxcul_core::{FAMILY_ID, InboundLine};
use maxcul_transport::LineListener;
use maxcul_types::rpc::PACKET_RECEIVED;
use maxcul_types::{RpcChannel, RpcValue};

/// Line listener that hands received packets to the host
pub struct PacketForwarder {
    rpc: Arc<dyn RpcChannel>,
}

impl PacketForwarder {
    pub fn new(rpc: Arc<dyn RpcChannel>) -> Self {
        Self { rpc }
    }

    /// The host receives the packet hex without the leading marker
    /// character and surrounding whitespace, not the raw line.
    async fn forward(&self, packet: &str) {
        let params = vec![RpcValue::Integer(FAMILY_ID), RpcValue::from(packet)];

        match self.rpc.invoke(PACKET_RECEIVED, params).await {
            Ok(_) => trace!("Forwarded packet {}", packet),
            Err(fault) if fault.is_default() => {
                debug!("Host answered {}() with {}", PACKET_RECEIVED, fault);
            }
            Err(fault) => {
                error!("Error calling {}(): {}", PACKET_RECEIVED, fault.message);
            }
        }
    }
}

#[async_trait]
impl LineListener for PacketForwarder {
    async fn line_received(&self, line: &str) {
        match InboundLine::classify(line) {
            InboundLine::Packet(packet) => self.forward(packet).await,
            InboundLine::DutyCycleLimit => {
                warn!("CUL reached its 1% duty cycle limit. Sending is blocked until it recovers.");
            }
            InboundLine::TooShort(content) => {
                warn!("Too short packet received: {}", content);
            }
            InboundLine::Ack | InboundLine::Empty => {}
        }
    }
}
