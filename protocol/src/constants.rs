//! 协议常量定义

use std::time::Duration;

/// 显示设备默认监听端口
pub const DEFAULT_STATUS_PORT: u16 = 8888;

/// 显示设备默认地址
pub const DEFAULT_DISPLAY_HOST: &str = "192.168.1.100";

/// 默认发送间隔（毫秒）
pub const SEND_INTERVAL_MS: u64 = 200;

/// 宝石数量字段前缀
pub const GEMS_PREFIX: &str = "G:";

/// 存活状态字段前缀
pub const STATUS_PREFIX: &str = "S:";

/// 字段分隔符
pub const FIELD_SEPARATOR: char = ',';

/// 单个状态数据报最大长度（"G:4294967295,S:1" 为 16 字节）
pub const MAX_DATAGRAM_SIZE: usize = 64;

/// 单次发送最长等待（毫秒）
pub const SEND_TIMEOUT_MS: u64 = 50;

/// 单次发送最长等待 Duration
pub const SEND_TIMEOUT: Duration = Duration::from_millis(SEND_TIMEOUT_MS);

/// 默认发送间隔 Duration
pub const SEND_INTERVAL: Duration = Duration::from_millis(SEND_INTERVAL_MS);
