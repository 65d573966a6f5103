//! 状态广播
//!
//! 按固定间隔轮询会话快照，值变化时（或心跳到期时）发送一次数据报。
//! 发送失败只记录，不重试；传输不可用或找不到状态来源时永久停用。

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use protocol::{
    DatagramConfig, StatusSink, StatusSnapshot, StatusSource, UdpStatusSink, SEND_INTERVAL,
};

/// 广播配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcasterConfig {
    /// 显示设备地址
    pub target: DatagramConfig,
    /// 轮询间隔
    pub send_interval: Duration,
    /// 心跳间隔，为空时只在变化时发送
    pub heartbeat: Option<Duration>,
}

impl Default for BroadcasterConfig {
    fn default() -> Self {
        Self {
            target: DatagramConfig::default(),
            send_interval: SEND_INTERVAL,
            heartbeat: None,
        }
    }
}

/// 停用原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisableReason {
    /// 无法创建传输
    TransportUnavailable,
    /// 没有可轮询的会话
    MissingSource,
    /// 已调用 shutdown
    Shutdown,
}

/// 单次 tick 的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// 广播器已停用
    Disabled,
    /// 未到发送时间
    NotDue,
    /// 快照未变化
    Unchanged,
    /// 已发送
    Sent(StatusSnapshot),
    /// 发送失败（已丢弃）
    SendFailed(StatusSnapshot),
}

/// 发送统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastStats {
    pub packets_sent: u64,
    pub send_failures: u64,
}

/// 状态广播器
pub struct StatusBroadcaster<S: StatusSink> {
    config: BroadcasterConfig,
    sink: Option<S>,
    disabled: Option<DisableReason>,
    next_send_at: Option<Instant>,
    last_sent: Option<StatusSnapshot>,
    last_sent_at: Option<Instant>,
    stats: BroadcastStats,
}

impl StatusBroadcaster<UdpStatusSink> {
    /// 创建 UDP 广播器，失败时返回已停用的广播器
    pub async fn connect(config: BroadcasterConfig) -> Self {
        match UdpStatusSink::connect(&config.target).await {
            Ok(sink) => {
                info!("状态广播目标: {}", sink.target());
                Self::new(config, sink)
            }
            Err(e) => {
                warn!("无法创建 UDP 客户端 {}: {}", config.target.addr(), e);
                Self::disabled(config, DisableReason::TransportUnavailable)
            }
        }
    }
}

impl<S: StatusSink> StatusBroadcaster<S> {
    pub fn new(config: BroadcasterConfig, sink: S) -> Self {
        Self {
            config,
            sink: Some(sink),
            disabled: None,
            next_send_at: None,
            last_sent: None,
            last_sent_at: None,
            stats: BroadcastStats::default(),
        }
    }

    /// 创建已停用的广播器
    pub fn disabled(config: BroadcasterConfig, reason: DisableReason) -> Self {
        Self {
            config,
            sink: None,
            disabled: Some(reason),
            next_send_at: None,
            last_sent: None,
            last_sent_at: None,
            stats: BroadcastStats::default(),
        }
    }

    /// 每帧调用一次
    ///
    /// 第一次 tick 立即采样；之后每隔 `send_interval` 采样一次。
    pub async fn tick<P: StatusSource + ?Sized>(&mut self, source: Option<&P>, now: Instant) -> TickOutcome {
        if self.disabled.is_some() {
            return TickOutcome::Disabled;
        }
        let Some(source) = source else {
            warn!("找不到可轮询的会话，停止状态广播");
            self.disable(DisableReason::MissingSource);
            return TickOutcome::Disabled;
        };
        if self.next_send_at.is_some_and(|at| now < at) {
            return TickOutcome::NotDue;
        }
        self.next_send_at = Some(now + self.config.send_interval);

        let snapshot = source.snapshot();
        if !self.should_send(snapshot, now) {
            return TickOutcome::Unchanged;
        }
        let Some(sink) = self.sink.as_mut() else {
            return TickOutcome::Disabled;
        };

        // 先记录再发送：失败的快照不会被重发
        self.last_sent = Some(snapshot);
        self.last_sent_at = Some(now);

        match sink.send(&snapshot).await {
            Ok(()) => {
                self.stats.packets_sent += 1;
                debug!("已发送状态 {}", snapshot);
                TickOutcome::Sent(snapshot)
            }
            Err(e) => {
                self.stats.send_failures += 1;
                warn!("状态发送失败: {}", e);
                TickOutcome::SendFailed(snapshot)
            }
        }
    }

    fn should_send(&self, snapshot: StatusSnapshot, now: Instant) -> bool {
        if self.last_sent != Some(snapshot) {
            return true;
        }
        match (self.config.heartbeat, self.last_sent_at) {
            (Some(heartbeat), Some(at)) => now.duration_since(at) >= heartbeat,
            _ => false,
        }
    }

    fn disable(&mut self, reason: DisableReason) {
        self.disabled = Some(reason);
        self.sink = None;
    }

    /// 关闭传输
    pub async fn shutdown(&mut self) {
        if self.disabled.is_none() {
            self.disabled = Some(DisableReason::Shutdown);
        }
        if let Some(mut sink) = self.sink.take() {
            if let Err(e) = sink.close().await {
                debug!("关闭状态传输出错: {}", e);
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.disabled.is_none()
    }

    pub fn disable_reason(&self) -> Option<DisableReason> {
        self.disabled
    }

    pub fn stats(&self) -> BroadcastStats {
        self.stats
    }

    pub fn last_sent(&self) -> Option<StatusSnapshot> {
        self.last_sent
    }

    pub fn config(&self) -> &BroadcasterConfig {
        &self.config
    }

    pub fn sink(&self) -> Option<&S> {
        self.sink.as_ref()
    }
}
