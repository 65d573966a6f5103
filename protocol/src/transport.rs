//! 传输层抽象
//!
//! 提供 StatusSink/StatusReceiver traits 使广播逻辑与具体传输实现解耦。
//! 状态报文走 UDP：尽力而为，不重试，不确认。

use std::net::SocketAddr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::net::UdpSocket;
use tokio::time::timeout;
use tracing::debug;

use crate::constants::{DEFAULT_DISPLAY_HOST, DEFAULT_STATUS_PORT, MAX_DATAGRAM_SIZE, SEND_TIMEOUT};
use crate::error::{ProtocolError, Result};
use crate::status::StatusSnapshot;

/// 数据报目标配置
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatagramConfig {
    pub host: String,
    pub port: u16,
}

impl DatagramConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// `host:port` 形式的地址
    pub fn addr(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            // IPv6 字面量
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

impl Default for DatagramConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_DISPLAY_HOST.to_string(),
            port: DEFAULT_STATUS_PORT,
        }
    }
}

/// 状态发送端 trait（广播器使用）
#[async_trait]
pub trait StatusSink: Send + Sync {
    /// 发送一次快照，不重试
    async fn send(&mut self, snapshot: &StatusSnapshot) -> Result<()>;

    /// 关闭传输
    async fn close(&mut self) -> Result<()>;

    /// 获取目标地址
    fn peer_addr(&self) -> Option<String>;
}

/// 状态接收端 trait（显示端使用）
#[async_trait]
pub trait StatusReceiver: Send + Sized {
    /// 绑定地址
    async fn bind(addr: &str) -> Result<Self>;

    /// 接收并解码一个数据报
    async fn recv(&mut self) -> Result<(StatusSnapshot, SocketAddr)>;

    /// 获取本地地址
    fn local_addr(&self) -> Option<String>;
}

// ============================================================================
// UDP 实现
// ============================================================================

/// UDP 状态发送端
pub struct UdpStatusSink {
    socket: Option<UdpSocket>,
    target: SocketAddr,
}

impl UdpStatusSink {
    /// 解析目标地址并创建本地套接字
    pub async fn connect(config: &DatagramConfig) -> Result<Self> {
        let addr = config.addr();
        let resolved = tokio::net::lookup_host(addr.as_str()).await?.next();
        let target = resolved.ok_or(ProtocolError::AddressResolution { addr })?;

        let local: SocketAddr = if target.is_ipv4() {
            ([0, 0, 0, 0], 0).into()
        } else {
            ([0u16; 8], 0).into()
        };
        let socket = UdpSocket::bind(local).await?;
        debug!("UDP 状态发送端绑定 {:?}，目标 {}", socket.local_addr().ok(), target);

        Ok(Self {
            socket: Some(socket),
            target,
        })
    }

    /// 目标地址
    pub fn target(&self) -> SocketAddr {
        self.target
    }
}

#[async_trait]
impl StatusSink for UdpStatusSink {
    async fn send(&mut self, snapshot: &StatusSnapshot) -> Result<()> {
        let socket = self.socket.as_ref().ok_or(ProtocolError::TransportClosed)?;
        let payload = snapshot.encode();

        // 等待可写但有上限：慢或不可达的目标只会丢包，不会拖住 tick
        timeout(SEND_TIMEOUT, socket.send_to(&payload, self.target))
            .await
            .map_err(|_| ProtocolError::SendTimeout(SEND_TIMEOUT))??;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        // UDP 套接字在 drop 时释放
        self.socket = None;
        Ok(())
    }

    fn peer_addr(&self) -> Option<String> {
        Some(self.target.to_string())
    }
}

/// UDP 状态接收端
pub struct UdpStatusReceiver {
    socket: UdpSocket,
    buffer: Vec<u8>,
}

#[async_trait]
impl StatusReceiver for UdpStatusReceiver {
    async fn bind(addr: &str) -> Result<Self> {
        let socket = UdpSocket::bind(addr).await?;
        Ok(Self {
            socket,
            // 多留一个字节以识别超长报文
            buffer: vec![0u8; MAX_DATAGRAM_SIZE + 1],
        })
    }

    async fn recv(&mut self) -> Result<(StatusSnapshot, SocketAddr)> {
        let (len, from) = self.socket.recv_from(&mut self.buffer).await?;
        if len > MAX_DATAGRAM_SIZE {
            return Err(ProtocolError::malformed(
                &self.buffer[..MAX_DATAGRAM_SIZE],
                format!("datagram exceeds {} bytes", MAX_DATAGRAM_SIZE),
            ));
        }
        let snapshot = StatusSnapshot::decode(&self.buffer[..len])?;
        Ok((snapshot, from))
    }

    fn local_addr(&self) -> Option<String> {
        self.socket.local_addr().ok().map(|a| a.to_string())
    }
}
