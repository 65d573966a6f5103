//! 宝石追逐共享协议库
//!
//! 包含:
//! - 状态快照 (StatusSnapshot) 及其文本编解码
//! - 数据报传输层抽象 (StatusSink, StatusSource traits)
//! - UDP 发送端与接收端实现
//! - 协议常量与错误类型

mod constants;
mod error;
mod status;
mod transport;

pub use constants::*;
pub use error::{ProtocolError, Result};
pub use status::{StatusSnapshot, StatusSource};
pub use transport::{
    DatagramConfig, StatusReceiver, StatusSink,
    UdpStatusReceiver, UdpStatusSink,
};
