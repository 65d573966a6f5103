//! 状态快照与文本报文
//!
//! 报文格式: `G:<gems>,S:<status>`，`<status>` 为 `1`（存活）或 `0`（出局）。
//! 无长度前缀、无校验和、无应答。

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{FIELD_SEPARATOR, GEMS_PREFIX, STATUS_PREFIX};
use crate::error::{ProtocolError, Result};

/// 玩家会话的只读投影
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatusSnapshot {
    /// 已收集宝石数
    pub gems: u32,
    /// 是否存活
    pub alive: bool,
}

impl StatusSnapshot {
    pub fn new(gems: u32, alive: bool) -> Self {
        Self { gems, alive }
    }

    /// 编码为 ASCII 报文
    pub fn encode(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }

    /// 从数据报解码
    ///
    /// 接收端可能收到任意字节，末尾的空白（如换行）会被忽略。
    pub fn decode(payload: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(payload)
            .map_err(|_| ProtocolError::malformed(payload, "not ASCII"))?;
        let text = text.trim_end();

        let (gems_field, status_field) = text
            .split_once(FIELD_SEPARATOR)
            .ok_or_else(|| ProtocolError::malformed(payload, "missing field separator"))?;

        let gems_digits = gems_field
            .strip_prefix(GEMS_PREFIX)
            .ok_or_else(|| ProtocolError::malformed(payload, "missing gems prefix"))?;
        if gems_digits.is_empty() || !gems_digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ProtocolError::malformed(payload, "gem count is not a decimal number"));
        }
        let gems = gems_digits
            .parse::<u32>()
            .map_err(|e| ProtocolError::malformed(payload, e.to_string()))?;

        let alive = match status_field.strip_prefix(STATUS_PREFIX) {
            Some("1") => true,
            Some("0") => false,
            Some(other) => {
                return Err(ProtocolError::malformed(
                    payload,
                    format!("unknown status flag {:?}", other),
                ))
            }
            None => return Err(ProtocolError::malformed(payload, "missing status prefix")),
        };

        Ok(Self { gems, alive })
    }
}

impl fmt::Display for StatusSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}{}{}",
            GEMS_PREFIX,
            self.gems,
            FIELD_SEPARATOR,
            STATUS_PREFIX,
            if self.alive { "1" } else { "0" }
        )
    }
}

impl FromStr for StatusSnapshot {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self> {
        Self::decode(s.as_bytes())
    }
}

/// 可被广播器轮询的状态来源
pub trait StatusSource {
    /// 读取当前快照
    fn snapshot(&self) -> StatusSnapshot;
}

impl<T: StatusSource + ?Sized> StatusSource for &T {
    fn snapshot(&self) -> StatusSnapshot {
        (**self).snapshot()
    }
}
