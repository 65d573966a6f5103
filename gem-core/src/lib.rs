//! 宝石追逐游戏核心
//!
//! 包含:
//! - 场景对象注册表与类别
//! - 玩家会话状态机（收集宝石、被鸡碰到）
//! - 对局规则配置
//! - 音效提示
//! - 鸡的游荡
//! - 场景布局与重新加载

pub mod audio;
pub mod chicken;
pub mod controller;
pub mod error;
pub mod policy;
pub mod scene;
pub mod world;

pub use audio::{AudioCue, AudioSettings, AudioSink, ClipSettings, RecordingAudio, SilentAudio};
pub use chicken::{ChickenWalker, DEFAULT_CHICKEN_SPEED};
pub use controller::{
    is_frontal_hit, ContactOutcome, PlayerController, PlayerPose, PlayerSession, SimulationState,
};
pub use error::{Result, SceneError};
pub use policy::{ChickenPolicy, ContactFilter, ContactKind, SessionPolicy, WinPolicy, DEFAULT_TOTAL_GEMS};
pub use scene::{ChickenLayout, PoseLayout, SceneLayout, Scene};
pub use world::{ObjectCategory, ObjectId, World, WorldObject};
