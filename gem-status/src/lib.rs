//! 宝石追逐状态广播
//!
//! 包含:
//! - 状态广播器（变化触发，可选心跳）
//! - 显示端（以最后收到的值为准）
//! - 应用设置
//! - 演示脚本

pub mod broadcaster;
pub mod demo;
pub mod display;
pub mod settings;

pub use broadcaster::{BroadcastStats, BroadcasterConfig, DisableReason, StatusBroadcaster, TickOutcome};
pub use demo::{DemoScript, DemoStep};
pub use display::{DisplayedStatus, ReceiveBackoff, StatusDisplay};
pub use settings::AppSettings;
