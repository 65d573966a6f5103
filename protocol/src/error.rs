//! 错误类型定义

use thiserror::Error;

/// 协议错误类型
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// IO 错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 状态报文格式错误
    #[error("Malformed status payload {payload:?}: {reason}")]
    MalformedStatus { payload: String, reason: String },

    /// 目标地址无法解析
    #[error("Cannot resolve address: {addr}")]
    AddressResolution { addr: String },

    /// 发送超时，数据报被丢弃
    #[error("Send timed out after {0:?}, datagram dropped")]
    SendTimeout(std::time::Duration),

    /// 传输已关闭
    #[error("Transport closed")]
    TransportClosed,
}

impl ProtocolError {
    /// 构造报文格式错误
    pub(crate) fn malformed(payload: &[u8], reason: impl Into<String>) -> Self {
        Self::MalformedStatus {
            payload: String::from_utf8_lossy(payload).into_owned(),
            reason: reason.into(),
        }
    }
}

/// 协议操作结果类型
pub type Result<T> = std::result::Result<T, ProtocolError>;
