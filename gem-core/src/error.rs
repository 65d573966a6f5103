//! 错误类型定义

use thiserror::Error;

/// 场景与规则配置错误
#[derive(Error, Debug)]
pub enum SceneError {
    /// 胜利所需宝石数必须大于 0
    #[error("Win threshold must be positive, got {0}")]
    ZeroGemThreshold(u32),

    /// 鸡的移动速度无效
    #[error("Invalid chicken speed: {0}")]
    InvalidSpeed(f32),

    /// 朝向向量为零
    #[error("Forward direction of {what} must be non-zero")]
    ZeroDirection { what: &'static str },

    /// 场景文件解析失败
    #[error("Scene layout parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// 场景操作结果类型
pub type Result<T> = std::result::Result<T, SceneError>;
