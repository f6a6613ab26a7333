//! Listen for MAX! packets and optionally send one
//!
//! ```text
//! CUL_DEVICE=/dev/ttyACM0 CUL_RESET_PIN=17 CUL_PACKET=0B0100401234560000000001 \
//!     cargo run --example listen
//! ```

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use tracing::info;
use tracing_subscriber::EnvFilter;

use maxcul::{Bridge, BridgeConfig, RpcChannel, RpcResult, RpcValue};

/// Host that prints every packet it receives
struct PrintingHost;

#[async_trait]
impl RpcChannel for PrintingHost {
    async fn invoke(&self, method: &str, params: Vec<RpcValue>) -> RpcResult {
        println!("{}{}", method, RpcValue::Array(params));
        Ok(RpcValue::Void)
    }
}

fn pin_from_env(name: &str) -> anyhow::Result<Option<u32>> {
    match std::env::var(name) {
        Ok(value) => {
            let value: i64 = value
                .parse()
                .with_context(|| format!("{} is not a number", name))?;
            Ok(maxcul_types::config::pin_from_setting(value))
        }
        Err(_) => Ok(None),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .init();

    let device = std::env::var("CUL_DEVICE").unwrap_or_else(|_| "/dev/ttyACM0".to_string());

    let mut config = BridgeConfig::new(device);
    config.reset_pin = pin_from_env("CUL_RESET_PIN")?;
    config.power_pin = pin_from_env("CUL_POWER_PIN")?;

    let bridge = Bridge::new(config, Arc::new(PrintingHost));
    bridge.start().await?;

    if let Ok(packet) = std::env::var("CUL_PACKET") {
        let params = vec![RpcValue::Void, packet.into(), false.into()];
        let result = bridge.call_method("sendPacket", &params).await;
        info!("sendPacket: {:?}", result);
    }

    let secs: u64 = std::env::var("CUL_LISTEN_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(30);
    info!("Listening for {} seconds...", secs);
    tokio::time::sleep(Duration::from_secs(secs)).await;

    bridge.stop().await?;
    Ok(())
}
