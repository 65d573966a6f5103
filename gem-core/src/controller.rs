//! 玩家会话控制
//!
//! 控制器是会话状态的唯一修改者。宿主引擎每发生一次接触就调用
//! [`PlayerController::on_contact`]，广播器通过 [`StatusSource`] 读取快照。

use glam::Vec3;
use tracing::{debug, info};

use protocol::{StatusSnapshot, StatusSource};

use crate::audio::{AudioCue, AudioSettings, AudioSink};
use crate::policy::{ChickenPolicy, ContactKind, SessionPolicy, WinPolicy};
use crate::world::{ObjectCategory, ObjectId, World};

/// 模拟运行状态（替代引擎全局时间缩放）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SimulationState {
    #[default]
    Running,
    /// 时间冻结，宿主应停止推进世界
    Frozen,
}

/// 单局会话状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerSession {
    gems_collected: u32,
    total_gems: u32,
    alive: bool,
    has_won: bool,
}

impl PlayerSession {
    pub fn new(total_gems: u32) -> Self {
        Self {
            gems_collected: 0,
            total_gems,
            alive: true,
            has_won: false,
        }
    }

    pub fn gems_collected(&self) -> u32 {
        self.gems_collected
    }

    pub fn total_gems(&self) -> u32 {
        self.total_gems
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn has_won(&self) -> bool {
        self.has_won
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot::new(self.gems_collected, self.alive)
    }
}

/// 玩家位姿（视线方向用于正面碰撞判定）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerPose {
    pub position: Vec3,
    pub forward: Vec3,
}

impl Default for PlayerPose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            forward: Vec3::Z,
        }
    }
}

/// 单次接触的处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactOutcome {
    /// 没有状态变化
    Ignored,
    /// 收集到一颗宝石
    GemCollected { gems: u32 },
    /// 收集到最后一颗宝石，胜利
    Won { gems: u32 },
    /// 被鸡碰到，出局
    Lost,
}

/// 判断目标是否位于视线前方半空间
///
/// 点积恰好为 0（正侧方）不算正面。
pub fn is_frontal_hit(forward: Vec3, player: Vec3, target: Vec3) -> bool {
    forward.dot(target - player) > 0.0
}

/// 玩家状态控制器
pub struct PlayerController<A: AudioSink> {
    policy: SessionPolicy,
    audio_settings: AudioSettings,
    audio: A,
    session: PlayerSession,
    simulation: SimulationState,
    pose: PlayerPose,
}

impl<A: AudioSink> PlayerController<A> {
    /// 创建控制器（规则应已通过 [`SessionPolicy::validate`]）
    pub fn new(policy: SessionPolicy, audio_settings: AudioSettings, audio: A) -> Self {
        Self {
            session: PlayerSession::new(policy.total_gems),
            policy,
            audio_settings,
            audio,
            simulation: SimulationState::Running,
            pose: PlayerPose::default(),
        }
    }

    /// 处理一次接触
    pub fn on_contact(&mut self, world: &mut World, other: ObjectId, kind: ContactKind) -> ContactOutcome {
        if !self.policy.accepts(kind) {
            debug!("忽略与 {} 的 {:?} 接触", other, kind);
            return ContactOutcome::Ignored;
        }
        // 出局或冻结后不再处理任何接触
        if !self.session.alive || self.simulation == SimulationState::Frozen {
            return ContactOutcome::Ignored;
        }

        match world.category(other) {
            ObjectCategory::Gem => self.collect_gem(world, other),
            ObjectCategory::Chicken => self.handle_chicken(world, other),
            ObjectCategory::Fence | ObjectCategory::Other => ContactOutcome::Ignored,
        }
    }

    fn collect_gem(&mut self, world: &mut World, gem: ObjectId) -> ContactOutcome {
        // 已被取走的宝石不再计数
        if world.take_gem(gem).is_none() {
            debug!("宝石 {} 已被拾取", gem);
            return ContactOutcome::Ignored;
        }

        self.session.gems_collected += 1;
        let gems = self.session.gems_collected;
        info!("已收集宝石: {}", gems);
        self.play(AudioCue::Reward);

        if gems == self.session.total_gems && !self.session.has_won {
            self.session.has_won = true;
            info!("已收集全部 {} 颗宝石，获胜", gems);
            self.play(AudioCue::Win);
            if self.policy.win == WinPolicy::EndsGame {
                self.simulation = SimulationState::Frozen;
            }
            return ContactOutcome::Won { gems };
        }

        ContactOutcome::GemCollected { gems }
    }

    fn handle_chicken(&mut self, world: &World, chicken: ObjectId) -> ContactOutcome {
        if self.policy.chicken == ChickenPolicy::FrontalOnly {
            let frontal = world
                .position(chicken)
                .map(|pos| is_frontal_hit(self.pose.forward, self.pose.position, pos))
                .unwrap_or(false);
            if !frontal {
                debug!("从背后碰到小鸡 {}，忽略", chicken);
                return ContactOutcome::Ignored;
            }
        }

        self.end_session();
        ContactOutcome::Lost
    }

    fn end_session(&mut self) {
        if !self.session.alive {
            return;
        }
        self.session.alive = false;
        info!("被小鸡抓住，游戏结束，共 {} 颗宝石", self.session.gems_collected);
        self.play(AudioCue::Loss);
        self.simulation = SimulationState::Frozen;
    }

    fn play(&mut self, cue: AudioCue) {
        let clip = self.audio_settings.clip(cue);
        self.audio.play_one_shot(&clip.clip, clip.volume);
    }

    /// 重置会话（场景重新加载时调用）
    pub fn reset(&mut self) {
        self.session = PlayerSession::new(self.policy.total_gems);
        self.simulation = SimulationState::Running;
        info!("会话已重置");
    }

    /// 更新玩家位姿（零向量视线会被忽略）
    pub fn set_pose(&mut self, position: Vec3, forward: Vec3) {
        self.pose.position = position;
        if forward != Vec3::ZERO {
            self.pose.forward = forward;
        }
    }

    pub fn pose(&self) -> PlayerPose {
        self.pose
    }

    pub fn session(&self) -> &PlayerSession {
        &self.session
    }

    pub fn gems_collected(&self) -> u32 {
        self.session.gems_collected
    }

    pub fn total_gems(&self) -> u32 {
        self.session.total_gems
    }

    pub fn is_alive(&self) -> bool {
        self.session.alive
    }

    pub fn has_won(&self) -> bool {
        self.session.has_won
    }

    pub fn simulation_state(&self) -> SimulationState {
        self.simulation
    }

    pub fn policy(&self) -> &SessionPolicy {
        &self.policy
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }
}

impl<A: AudioSink> StatusSource for PlayerController<A> {
    fn snapshot(&self) -> StatusSnapshot {
        self.session.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::RecordingAudio;
    use crate::policy::ContactFilter;

    fn controller(policy: SessionPolicy) -> PlayerController<RecordingAudio> {
        PlayerController::new(policy, AudioSettings::default(), RecordingAudio::new())
    }

    fn spawn_gems(world: &mut World, count: usize) -> Vec<ObjectId> {
        (0..count)
            .map(|i| world.spawn(ObjectCategory::Gem, format!("Gem {}", i), Vec3::new(i as f32, 0.0, 5.0)))
            .collect()
    }

    #[test]
    fn test_initial_state() {
        let ctrl = controller(SessionPolicy::default());
        assert_eq!(ctrl.gems_collected(), 0);
        assert!(ctrl.is_alive());
        assert!(!ctrl.has_won());
        assert_eq!(ctrl.simulation_state(), SimulationState::Running);
        assert_eq!(ctrl.snapshot(), StatusSnapshot::new(0, true));
    }

    #[test]
    fn test_duplicate_gem_contact_counts_once() {
        let mut world = World::new();
        let gems = spawn_gems(&mut world, 2);
        let mut ctrl = controller(SessionPolicy::default());

        assert_eq!(
            ctrl.on_contact(&mut world, gems[0], ContactKind::Trigger),
            ContactOutcome::GemCollected { gems: 1 }
        );
        assert_eq!(ctrl.on_contact(&mut world, gems[0], ContactKind::Trigger), ContactOutcome::Ignored);
        assert_eq!(ctrl.gems_collected(), 1);
        assert_eq!(ctrl.audio().count("reward"), 1);
        assert!(world.get(gems[0]).is_none());
        assert!(world.get(gems[1]).is_some());
    }

    #[test]
    fn test_win_fires_once() {
        let mut world = World::new();
        let gems = spawn_gems(&mut world, 6);
        let mut ctrl = controller(SessionPolicy::default());

        let outcomes: Vec<_> = gems
            .iter()
            .map(|&g| ctrl.on_contact(&mut world, g, ContactKind::Trigger))
            .collect();

        assert_eq!(outcomes[3], ContactOutcome::Won { gems: 4 });
        // 超过阈值后仍然计数，但不再触发胜利
        assert_eq!(outcomes[4], ContactOutcome::GemCollected { gems: 5 });
        assert_eq!(outcomes[5], ContactOutcome::GemCollected { gems: 6 });
        assert_eq!(ctrl.gems_collected(), 6);
        assert!(ctrl.has_won());
        assert_eq!(ctrl.audio().count("mixkit-winning-chimes-2015"), 1);
        assert_eq!(ctrl.simulation_state(), SimulationState::Running);
    }

    #[test]
    fn test_win_ends_game_policy() {
        let mut world = World::new();
        let gems = spawn_gems(&mut world, 4);
        let mut ctrl = controller(SessionPolicy {
            win: WinPolicy::EndsGame,
            ..Default::default()
        });

        for gem in gems {
            ctrl.on_contact(&mut world, gem, ContactKind::Trigger);
        }

        assert!(ctrl.has_won());
        assert!(ctrl.is_alive());
        assert_eq!(ctrl.simulation_state(), SimulationState::Frozen);
    }

    #[test]
    fn test_frozen_win_ignores_later_contacts() {
        let mut world = World::new();
        let gems = spawn_gems(&mut world, 5);
        let chicken = world.spawn(ObjectCategory::Chicken, "Chicken", Vec3::new(0.0, 0.0, 1.0));
        let mut ctrl = controller(SessionPolicy {
            win: WinPolicy::EndsGame,
            ..Default::default()
        });

        for &gem in &gems[..4] {
            ctrl.on_contact(&mut world, gem, ContactKind::Trigger);
        }
        assert_eq!(ctrl.simulation_state(), SimulationState::Frozen);

        assert_eq!(ctrl.on_contact(&mut world, chicken, ContactKind::Trigger), ContactOutcome::Ignored);
        assert_eq!(ctrl.on_contact(&mut world, gems[4], ContactKind::Trigger), ContactOutcome::Ignored);
        assert_eq!(ctrl.snapshot().to_string(), "G:4,S:1");
        assert_eq!(ctrl.audio().count("losing"), 0);
        assert!(world.get(gems[4]).is_some());
    }

    #[test]
    fn test_chicken_ends_session_once() {
        let mut world = World::new();
        let chicken = world.spawn(ObjectCategory::Chicken, "Chicken", Vec3::new(0.0, 0.0, -3.0));
        let gem = world.spawn(ObjectCategory::Gem, "Gem", Vec3::ONE);
        let mut ctrl = controller(SessionPolicy::default());

        assert_eq!(ctrl.on_contact(&mut world, chicken, ContactKind::Trigger), ContactOutcome::Lost);
        assert_eq!(ctrl.on_contact(&mut world, chicken, ContactKind::Trigger), ContactOutcome::Ignored);
        assert!(!ctrl.is_alive());
        assert_eq!(ctrl.simulation_state(), SimulationState::Frozen);
        assert_eq!(ctrl.audio().count("losing"), 1);

        // 出局后宝石不再计数，也不会被移除
        assert_eq!(ctrl.on_contact(&mut world, gem, ContactKind::Trigger), ContactOutcome::Ignored);
        assert_eq!(ctrl.gems_collected(), 0);
        assert!(world.get(gem).is_some());
        assert_eq!(ctrl.snapshot(), StatusSnapshot::new(0, false));
    }

    #[test]
    fn test_frontal_hit() {
        let forward = Vec3::Z;
        assert!(is_frontal_hit(forward, Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0)));
        assert!(!is_frontal_hit(forward, Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0)));
        // 正侧方不算正面
        assert!(!is_frontal_hit(forward, Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0)));
    }

    #[test]
    fn test_frontal_only_policy() {
        let mut world = World::new();
        let behind = world.spawn(ObjectCategory::Chicken, "chicken behind", Vec3::new(0.0, 0.0, -2.0));
        let beside = world.spawn(ObjectCategory::Chicken, "chicken beside", Vec3::new(2.0, 0.0, 0.0));
        let ahead = world.spawn(ObjectCategory::Chicken, "chicken ahead", Vec3::new(0.5, 0.0, 2.0));
        let mut ctrl = controller(SessionPolicy {
            chicken: ChickenPolicy::FrontalOnly,
            ..Default::default()
        });
        ctrl.set_pose(Vec3::ZERO, Vec3::Z);

        assert_eq!(ctrl.on_contact(&mut world, behind, ContactKind::Trigger), ContactOutcome::Ignored);
        assert_eq!(ctrl.on_contact(&mut world, beside, ContactKind::Trigger), ContactOutcome::Ignored);
        assert!(ctrl.is_alive());

        assert_eq!(ctrl.on_contact(&mut world, ahead, ContactKind::Trigger), ContactOutcome::Lost);
        assert!(!ctrl.is_alive());
    }

    #[test]
    fn test_frontal_uses_player_position() {
        let mut world = World::new();
        let chicken = world.spawn(ObjectCategory::Chicken, "chicken", Vec3::new(0.0, 0.0, 5.0));
        let mut ctrl = controller(SessionPolicy {
            chicken: ChickenPolicy::FrontalOnly,
            ..Default::default()
        });

        // 玩家已越过鸡，面朝 +Z，鸡在身后
        ctrl.set_pose(Vec3::new(0.0, 0.0, 8.0), Vec3::Z);
        assert_eq!(ctrl.on_contact(&mut world, chicken, ContactKind::Trigger), ContactOutcome::Ignored);

        // 转身
        ctrl.set_pose(Vec3::new(0.0, 0.0, 8.0), Vec3::NEG_Z);
        assert_eq!(ctrl.on_contact(&mut world, chicken, ContactKind::Trigger), ContactOutcome::Lost);
    }

    #[test]
    fn test_collision_filtered_by_default() {
        let mut world = World::new();
        let gem = world.spawn(ObjectCategory::Gem, "Gem", Vec3::ZERO);
        let mut ctrl = controller(SessionPolicy::default());

        assert_eq!(ctrl.on_contact(&mut world, gem, ContactKind::Collision), ContactOutcome::Ignored);
        assert!(world.get(gem).is_some());

        let mut ctrl = controller(SessionPolicy {
            contact_filter: ContactFilter::TriggerAndCollision,
            ..Default::default()
        });
        assert_eq!(
            ctrl.on_contact(&mut world, gem, ContactKind::Collision),
            ContactOutcome::GemCollected { gems: 1 }
        );
    }

    #[test]
    fn test_other_objects_ignored() {
        let mut world = World::new();
        let fence = world.spawn(ObjectCategory::Fence, "Fence", Vec3::ZERO);
        let rock = world.spawn(ObjectCategory::Other, "Rock", Vec3::ZERO);
        let mut ctrl = controller(SessionPolicy::default());

        assert_eq!(ctrl.on_contact(&mut world, fence, ContactKind::Trigger), ContactOutcome::Ignored);
        assert_eq!(ctrl.on_contact(&mut world, rock, ContactKind::Trigger), ContactOutcome::Ignored);
        assert_eq!(ctrl.on_contact(&mut world, 999, ContactKind::Trigger), ContactOutcome::Ignored);
        assert_eq!(ctrl.session(), &PlayerSession::new(4));
        assert!(ctrl.audio().played.is_empty());
    }

    #[test]
    fn test_reset() {
        let mut world = World::new();
        let gems = spawn_gems(&mut world, 4);
        let chicken = world.spawn(ObjectCategory::Chicken, "chicken", Vec3::ZERO);
        let mut ctrl = controller(SessionPolicy::default());

        for gem in gems {
            ctrl.on_contact(&mut world, gem, ContactKind::Trigger);
        }
        ctrl.on_contact(&mut world, chicken, ContactKind::Trigger);
        assert!(ctrl.has_won());
        assert!(!ctrl.is_alive());

        ctrl.reset();
        assert_eq!(ctrl.session(), &PlayerSession::new(4));
        assert_eq!(ctrl.simulation_state(), SimulationState::Running);
    }

    #[test]
    fn test_zero_forward_ignored() {
        let mut ctrl = controller(SessionPolicy::default());
        ctrl.set_pose(Vec3::ONE, Vec3::ZERO);
        assert_eq!(ctrl.pose().position, Vec3::ONE);
        assert_eq!(ctrl.pose().forward, Vec3::Z);
    }
}
