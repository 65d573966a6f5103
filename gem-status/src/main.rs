use std::time::Duration;

use anyhow::{Context, Result};
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gem_core::{ContactKind, RecordingAudio, Scene};
use gem_status::{AppSettings, DemoScript, StatusBroadcaster};
use protocol::StatusSource;

/// 演示帧间隔（约 60 FPS）
const FRAME: Duration = Duration::from_millis(16);

/// 脚本步长
const SCRIPT_STEP: Duration = Duration::from_secs(1);

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("gem_status=debug".parse()?)
            .add_directive("gem_core=info".parse()?))
        .init();

    let settings = match std::env::args().nth(1) {
        Some(path) => AppSettings::load_from(&path)?,
        None => AppSettings::load(),
    };
    let layout = settings.load_layout()?;
    let mut scene = Scene::load(layout, settings.policy, settings.audio.clone(), RecordingAudio::new())
        .context("无法加载场景")?;
    let mut broadcaster = StatusBroadcaster::connect(settings.broadcaster_config()).await;
    let mut script = DemoScript::new(&scene, SCRIPT_STEP, &mut rand::thread_rng());

    info!("演示开始: {} 步", script.remaining());

    let mut ticker = interval(FRAME);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let started = Instant::now();
    let mut last_frame = started;

    loop {
        tokio::select! {
            now = ticker.tick() => {
                let elapsed = now.duration_since(started);
                let dt = now.duration_since(last_frame).as_secs_f32();
                last_frame = now;

                for step in script.due(elapsed) {
                    // 先转向目标，正面碰撞规则下才会判定为命中
                    let player = scene.controller().pose().position;
                    if let Some(target) = scene.world().position(step.target) {
                        scene.set_player_pose(player, target - player);
                    }
                    let outcome = scene.dispatch_contact(step.target, ContactKind::Trigger);
                    info!("接触 {}: {:?}", step.target, outcome);
                }

                scene.advance(dt);
                broadcaster.tick(Some(&scene), now.into_std()).await;

                if script.is_finished(elapsed) {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("收到中断信号");
                break;
            }
        }
    }

    broadcaster.shutdown().await;
    let stats = broadcaster.stats();
    info!(
        "演示结束: {}（发送 {} 个，失败 {} 个，音效 {} 次）",
        scene.controller().snapshot(),
        stats.packets_sent,
        stats.send_failures,
        scene.controller().audio().played.len()
    );
    Ok(())
}
