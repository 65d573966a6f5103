use anyhow::{bail, Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gem_status::{AppSettings, ReceiveBackoff, StatusDisplay};
use protocol::{StatusReceiver, UdpStatusReceiver};

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("gem_status=debug".parse()?))
        .init();

    let settings = AppSettings::load();
    let addr = std::env::args().nth(1).unwrap_or(settings.listen_addr);
    let mut receiver = UdpStatusReceiver::bind(&addr)
        .await
        .with_context(|| format!("无法监听 {}", addr))?;
    let mut status_display = StatusDisplay::new();
    let mut backoff = ReceiveBackoff::default();

    info!("显示端监听 {}", receiver.local_addr().unwrap_or(addr));

    loop {
        tokio::select! {
            result = status_display.pump(&mut receiver) => match result {
                Ok(changed) => {
                    backoff.on_success();
                    if changed {
                        let [first, second] = status_display.lines();
                        info!("{} | {}", first, second);
                    }
                }
                Err(e) => match backoff.on_error() {
                    Some(delay) => {
                        warn!("接收出错: {}，{:?} 后重试", e, delay);
                        tokio::time::sleep(delay).await;
                    }
                    None => bail!("连续 {} 次接收出错，最后一次: {}", backoff.consecutive(), e),
                },
            },
            _ = tokio::signal::ctrl_c() => {
                info!("收到中断信号");
                break;
            }
        }
    }

    let (received, rejected) = (status_display.received(), status_display.rejected());
    info!("共收到 {} 个报文，丢弃 {} 个", received, rejected);
    Ok(())
}
