//! 对局规则配置
//!
//! 同一套会话逻辑支持几种互斥的规则，必须显式选择其一。

use serde::{Deserialize, Serialize};

use crate::error::{Result, SceneError};

/// 默认胜利所需宝石数
pub const DEFAULT_TOTAL_GEMS: u32 = 4;

/// 接受的碰撞类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ContactFilter {
    /// 只处理触发器重叠
    #[default]
    TriggerOnly,
    /// 触发器与物理碰撞都处理
    TriggerAndCollision,
}

/// 碰到鸡时的判定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ChickenPolicy {
    /// 任何接触都出局
    #[default]
    Always,
    /// 只有鸡位于玩家视线前方半空间时出局
    FrontalOnly,
}

/// 收集完宝石后的处理
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum WinPolicy {
    /// 播放胜利音效，游戏继续
    #[default]
    Continue,
    /// 播放胜利音效并冻结模拟
    EndsGame,
}

/// 对局规则
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionPolicy {
    /// 胜利所需宝石数
    pub total_gems: u32,
    pub contact_filter: ContactFilter,
    pub chicken: ChickenPolicy,
    pub win: WinPolicy,
}

impl SessionPolicy {
    /// 校验配置
    pub fn validate(&self) -> Result<()> {
        if self.total_gems == 0 {
            return Err(SceneError::ZeroGemThreshold(self.total_gems));
        }
        Ok(())
    }

    /// 是否接受该类型的碰撞
    pub fn accepts(&self, kind: ContactKind) -> bool {
        match (self.contact_filter, kind) {
            (_, ContactKind::Trigger) => true,
            (ContactFilter::TriggerAndCollision, ContactKind::Collision) => true,
            (ContactFilter::TriggerOnly, ContactKind::Collision) => false,
        }
    }
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            total_gems: DEFAULT_TOTAL_GEMS,
            contact_filter: ContactFilter::default(),
            chicken: ChickenPolicy::default(),
            win: WinPolicy::default(),
        }
    }
}

/// 碰撞类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContactKind {
    /// 进入重叠区域
    Trigger,
    /// 物理碰撞
    Collision,
}
