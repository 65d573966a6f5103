//! 场景布局与加载
//!
//! 场景负责生成对象、把接触事件转交给控制器，并在冻结时停止推进世界。

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use protocol::{StatusSnapshot, StatusSource};

use crate::audio::{AudioSettings, AudioSink};
use crate::chicken::{ChickenWalker, DEFAULT_CHICKEN_SPEED};
use crate::controller::{ContactOutcome, PlayerController, SimulationState};
use crate::error::Result;
use crate::policy::{ContactKind, SessionPolicy};
use crate::world::{ObjectCategory, ObjectId, World};

/// 玩家初始位姿
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoseLayout {
    pub position: Vec3,
    pub forward: Vec3,
}

/// 鸡的初始配置
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChickenLayout {
    pub position: Vec3,
    /// 为空时随机朝向
    #[serde(default)]
    pub heading: Option<Vec3>,
    #[serde(default = "default_chicken_speed")]
    pub speed: f32,
}

fn default_chicken_speed() -> f32 {
    DEFAULT_CHICKEN_SPEED
}

/// 场景布局
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneLayout {
    pub player: PoseLayout,
    pub gems: Vec<Vec3>,
    #[serde(default)]
    pub chickens: Vec<ChickenLayout>,
    #[serde(default)]
    pub fences: Vec<Vec3>,
}

impl SceneLayout {
    /// 从 JSON 解析
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// 序列化为 JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Default for SceneLayout {
    /// 10x10 围栏场地，四角各一颗宝石，中央一只鸡
    fn default() -> Self {
        Self {
            player: PoseLayout {
                position: Vec3::new(0.0, 0.0, -8.0),
                forward: Vec3::Z,
            },
            gems: vec![
                Vec3::new(-6.0, 0.5, -6.0),
                Vec3::new(6.0, 0.5, -6.0),
                Vec3::new(-6.0, 0.5, 6.0),
                Vec3::new(6.0, 0.5, 6.0),
            ],
            chickens: vec![ChickenLayout {
                position: Vec3::ZERO,
                heading: Some(Vec3::X),
                speed: DEFAULT_CHICKEN_SPEED,
            }],
            fences: vec![
                Vec3::new(-10.0, 0.0, 0.0),
                Vec3::new(10.0, 0.0, 0.0),
                Vec3::new(0.0, 0.0, -10.0),
                Vec3::new(0.0, 0.0, 10.0),
            ],
        }
    }
}

/// 一局游戏的场景
pub struct Scene<A: AudioSink> {
    layout: SceneLayout,
    world: World,
    controller: PlayerController<A>,
    chickens: Vec<ChickenWalker>,
}

impl<A: AudioSink> Scene<A> {
    /// 按布局加载场景
    pub fn load(layout: SceneLayout, policy: SessionPolicy, audio_settings: AudioSettings, audio: A) -> Result<Self> {
        policy.validate()?;
        if (layout.gems.len() as u64) < u64::from(policy.total_gems) {
            warn!(
                "场景只有 {} 颗宝石，但获胜需要 {} 颗",
                layout.gems.len(),
                policy.total_gems
            );
        }

        let mut scene = Self {
            controller: PlayerController::new(policy, audio_settings, audio),
            world: World::new(),
            chickens: Vec::new(),
            layout,
        };
        scene.spawn_layout()?;
        Ok(scene)
    }

    fn spawn_layout(&mut self) -> Result<()> {
        let layout = &self.layout;
        let mut chickens = Vec::with_capacity(layout.chickens.len());
        let mut rng = rand::thread_rng();

        for (i, position) in layout.gems.iter().enumerate() {
            self.world.spawn(ObjectCategory::Gem, format!("Gem {}", i + 1), *position);
        }
        for (i, position) in layout.fences.iter().enumerate() {
            self.world.spawn(ObjectCategory::Fence, format!("Fence {}", i + 1), *position);
        }
        for (i, chicken) in layout.chickens.iter().enumerate() {
            let id = self
                .world
                .spawn(ObjectCategory::Chicken, format!("Chicken {}", i + 1), chicken.position);
            let walker = match chicken.heading {
                Some(heading) => ChickenWalker::new(id, heading, chicken.speed)?,
                None => ChickenWalker::with_random_heading(id, chicken.speed, &mut rng)?,
            };
            chickens.push(walker);
        }

        self.chickens = chickens;
        self.controller
            .set_pose(layout.player.position, layout.player.forward);

        info!(
            "场景已加载: {} 颗宝石，{} 只小鸡，{} 段围栏",
            layout.gems.len(),
            layout.chickens.len(),
            layout.fences.len()
        );
        Ok(())
    }

    /// 玩家与某对象接触
    pub fn dispatch_contact(&mut self, other: ObjectId, kind: ContactKind) -> ContactOutcome {
        self.controller.on_contact(&mut self.world, other, kind)
    }

    /// 鸡与某对象接触，返回是否掉头
    pub fn chicken_contact(&mut self, chicken: ObjectId, other: ObjectId) -> bool {
        match self.chickens.iter_mut().find(|c| c.id == chicken) {
            Some(walker) => walker.on_contact(&self.world, other),
            None => false,
        }
    }

    /// 推进世界 `dt` 秒，冻结时返回 false
    pub fn advance(&mut self, dt: f32) -> bool {
        if self.controller.simulation_state() == SimulationState::Frozen {
            return false;
        }
        for walker in &self.chickens {
            walker.step(&mut self.world, dt);
        }
        true
    }

    /// 更新玩家位姿
    pub fn set_player_pose(&mut self, position: Vec3, forward: Vec3) {
        self.controller.set_pose(position, forward);
    }

    /// 重新加载：重新生成全部对象并重置会话
    pub fn reload(&mut self) -> Result<()> {
        self.world.clear();
        self.controller.reset();
        self.spawn_layout()
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn controller(&self) -> &PlayerController<A> {
        &self.controller
    }

    pub fn chickens(&self) -> &[ChickenWalker] {
        &self.chickens
    }

    pub fn layout(&self) -> &SceneLayout {
        &self.layout
    }

    pub fn simulation_state(&self) -> SimulationState {
        self.controller.simulation_state()
    }
}

impl<A: AudioSink> StatusSource for Scene<A> {
    fn snapshot(&self) -> StatusSnapshot {
        self.controller.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::RecordingAudio;
    use crate::error::SceneError;
    use crate::policy::WinPolicy;

    fn load(policy: SessionPolicy) -> Scene<RecordingAudio> {
        Scene::load(SceneLayout::default(), policy, AudioSettings::default(), RecordingAudio::new()).unwrap()
    }

    #[test]
    fn test_default_layout() {
        let scene = load(SessionPolicy::default());
        assert_eq!(scene.world().remaining_gems(), 4);
        assert_eq!(scene.world().ids_of(ObjectCategory::Chicken).len(), 1);
        assert_eq!(scene.world().ids_of(ObjectCategory::Fence).len(), 4);
        assert_eq!(scene.controller().pose().position, Vec3::new(0.0, 0.0, -8.0));
    }

    #[test]
    fn test_four_gems_win_and_keep_running() {
        let mut scene = load(SessionPolicy::default());
        let gems = scene.world().ids_of(ObjectCategory::Gem);

        let mut wins = 0;
        for gem in gems {
            if let ContactOutcome::Won { .. } = scene.dispatch_contact(gem, ContactKind::Trigger) {
                wins += 1;
            }
        }

        assert_eq!(wins, 1);
        assert_eq!(scene.snapshot(), StatusSnapshot::new(4, true));
        assert_eq!(scene.simulation_state(), SimulationState::Running);
        assert!(scene.advance(0.1));
    }

    #[test]
    fn test_four_gems_win_and_freeze() {
        let mut scene = load(SessionPolicy {
            win: WinPolicy::EndsGame,
            ..Default::default()
        });
        for gem in scene.world().ids_of(ObjectCategory::Gem) {
            scene.dispatch_contact(gem, ContactKind::Trigger);
        }

        assert!(scene.controller().has_won());
        assert_eq!(scene.controller().audio().count("mixkit-winning-chimes-2015"), 1);
        assert_eq!(scene.simulation_state(), SimulationState::Frozen);
    }

    #[test]
    fn test_advance_stops_after_loss() {
        let mut scene = load(SessionPolicy::default());
        let chicken = scene.world().ids_of(ObjectCategory::Chicken)[0];

        assert!(scene.advance(1.0));
        assert_eq!(scene.world().position(chicken), Some(Vec3::new(2.0, 0.0, 0.0)));

        assert_eq!(scene.dispatch_contact(chicken, ContactKind::Trigger), ContactOutcome::Lost);
        assert!(!scene.advance(1.0));
        assert_eq!(scene.world().position(chicken), Some(Vec3::new(2.0, 0.0, 0.0)));
    }

    #[test]
    fn test_chicken_turns_at_fence() {
        let mut scene = load(SessionPolicy::default());
        let chicken = scene.world().ids_of(ObjectCategory::Chicken)[0];
        let fence = scene.world().ids_of(ObjectCategory::Fence)[1];

        assert!(scene.chicken_contact(chicken, fence));
        assert_eq!(scene.chickens()[0].heading(), Vec3::NEG_X);
        assert!(!scene.chicken_contact(999, fence));
    }

    #[test]
    fn test_reload() {
        let mut scene = load(SessionPolicy::default());
        let first_gem = scene.world().ids_of(ObjectCategory::Gem)[0];
        scene.dispatch_contact(first_gem, ContactKind::Trigger);
        let chicken = scene.world().ids_of(ObjectCategory::Chicken)[0];
        scene.dispatch_contact(chicken, ContactKind::Trigger);

        scene.reload().unwrap();
        assert_eq!(scene.snapshot(), StatusSnapshot::new(0, true));
        assert_eq!(scene.world().remaining_gems(), 4);
        assert_eq!(scene.simulation_state(), SimulationState::Running);
        // 旧 ID 已失效
        assert!(scene.world().get(first_gem).is_none());
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let result = Scene::load(
            SceneLayout::default(),
            SessionPolicy {
                total_gems: 0,
                ..Default::default()
            },
            AudioSettings::default(),
            RecordingAudio::new(),
        );
        assert!(matches!(result, Err(SceneError::ZeroGemThreshold(0))));
    }

    #[test]
    fn test_layout_json() {
        let json = r#"{
            "player": { "position": [0.0, 0.0, 0.0], "forward": [0.0, 0.0, 1.0] },
            "gems": [[1.0, 0.0, 1.0]],
            "chickens": [{ "position": [3.0, 0.0, 3.0] }]
        }"#;
        let layout = SceneLayout::from_json(json).unwrap();
        assert_eq!(layout.gems.len(), 1);
        assert_eq!(layout.chickens[0].speed, DEFAULT_CHICKEN_SPEED);
        assert!(layout.chickens[0].heading.is_none());
        assert!(layout.fences.is_empty());

        let scene = Scene::load(
            layout,
            SessionPolicy { total_gems: 1, ..Default::default() },
            AudioSettings::default(),
            RecordingAudio::new(),
        )
        .unwrap();
        assert_eq!(scene.chickens().len(), 1);
    }
}
