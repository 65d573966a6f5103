//! 显示端
//!
//! 数据报可能丢失、重复或乱序，显示端不做排序，始终以最后收到的值为准。

use std::net::SocketAddr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::warn;

use protocol::{ProtocolError, StatusReceiver, StatusSnapshot};

/// 当前显示的状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayedStatus {
    pub snapshot: StatusSnapshot,
    pub from: SocketAddr,
    pub received_at: DateTime<Utc>,
}

/// 状态显示
#[derive(Debug, Default)]
pub struct StatusDisplay {
    latest: Option<DisplayedStatus>,
    received: u64,
    rejected: u64,
}

impl StatusDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// 应用收到的快照，返回显示内容是否变化
    pub fn apply(&mut self, snapshot: StatusSnapshot, from: SocketAddr) -> bool {
        self.received += 1;
        let changed = self.latest.map(|s| s.snapshot) != Some(snapshot);
        self.latest = Some(DisplayedStatus {
            snapshot,
            from,
            received_at: Utc::now(),
        });
        changed
    }

    /// 接收一个数据报并应用
    ///
    /// 格式错误的报文只计数并忽略；IO 错误向上返回。
    pub async fn pump<R: StatusReceiver>(&mut self, receiver: &mut R) -> protocol::Result<bool> {
        match receiver.recv().await {
            Ok((snapshot, from)) => Ok(self.apply(snapshot, from)),
            Err(ProtocolError::MalformedStatus { payload, reason }) => {
                self.rejected += 1;
                warn!("忽略格式错误的状态 {:?}: {}", payload, reason);
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    pub fn latest(&self) -> Option<&DisplayedStatus> {
        self.latest.as_ref()
    }

    pub fn received(&self) -> u64 {
        self.received
    }

    pub fn rejected(&self) -> u64 {
        self.rejected
    }

    /// LCD 两行文本
    pub fn lines(&self) -> [String; 2] {
        match self.latest {
            Some(status) => [
                format!("Gems: {}", status.snapshot.gems),
                if status.snapshot.alive {
                    "ALIVE".to_string()
                } else {
                    "GAME OVER".to_string()
                },
            ],
            None => ["Waiting...".to_string(), String::new()],
        }
    }
}

/// 接收错误退避
///
/// 连续错误时等待时间翻倍，超过上限次数后放弃；收到任何报文即清零。
#[derive(Debug, Clone)]
pub struct ReceiveBackoff {
    consecutive: u32,
    max_errors: u32,
    base: Duration,
    cap: Duration,
}

impl ReceiveBackoff {
    pub fn new(max_errors: u32, base: Duration, cap: Duration) -> Self {
        Self {
            consecutive: 0,
            max_errors,
            base,
            cap,
        }
    }

    /// 记录一次错误，返回应等待的时间；`None` 表示应放弃
    pub fn on_error(&mut self) -> Option<Duration> {
        self.consecutive += 1;
        if self.consecutive > self.max_errors {
            return None;
        }
        let factor = 1u32 << (self.consecutive - 1).min(16);
        Some(self.base.saturating_mul(factor).min(self.cap))
    }

    pub fn on_success(&mut self) {
        self.consecutive = 0;
    }

    pub fn consecutive(&self) -> u32 {
        self.consecutive
    }
}

impl Default for ReceiveBackoff {
    fn default() -> Self {
        Self::new(10, Duration::from_millis(100), Duration::from_secs(5))
    }
}
