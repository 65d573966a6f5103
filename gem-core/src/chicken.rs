//! 鸡的移动
//!
//! 鸡沿自身朝向匀速前进，碰到围栏掉头。

use glam::Vec3;
use rand::Rng;

use crate::error::{Result, SceneError};
use crate::world::{ObjectCategory, ObjectId, World};

/// 默认移动速度（单位/秒）
pub const DEFAULT_CHICKEN_SPEED: f32 = 2.0;

/// 一只游荡的鸡
#[derive(Debug, Clone, PartialEq)]
pub struct ChickenWalker {
    pub id: ObjectId,
    /// 水平面上的单位朝向
    heading: Vec3,
    speed: f32,
}

impl ChickenWalker {
    pub fn new(id: ObjectId, heading: Vec3, speed: f32) -> Result<Self> {
        if !speed.is_finite() || speed < 0.0 {
            return Err(SceneError::InvalidSpeed(speed));
        }
        let flat = Vec3::new(heading.x, 0.0, heading.z);
        let heading = flat
            .try_normalize()
            .ok_or(SceneError::ZeroDirection { what: "chicken" })?;
        Ok(Self { id, heading, speed })
    }

    /// 随机朝向
    pub fn with_random_heading<R: Rng + ?Sized>(id: ObjectId, speed: f32, rng: &mut R) -> Result<Self> {
        let yaw: f32 = rng.gen_range(0.0..std::f32::consts::TAU);
        Self::new(id, Vec3::new(yaw.sin(), 0.0, yaw.cos()), speed)
    }

    pub fn heading(&self) -> Vec3 {
        self.heading
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// 前进 `dt` 秒，高度不变
    pub fn step(&self, world: &mut World, dt: f32) {
        if let Some(position) = world.position(self.id) {
            world.set_position(self.id, position + self.heading * self.speed * dt);
        }
    }

    /// 处理鸡自身的碰撞，碰到围栏时掉头
    pub fn on_contact(&mut self, world: &World, other: ObjectId) -> bool {
        if world.category(other) == ObjectCategory::Fence {
            self.heading = -self.heading;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_step_keeps_height() {
        let mut world = World::new();
        let id = world.spawn(ObjectCategory::Chicken, "chicken", Vec3::new(0.0, 1.5, 0.0));
        let walker = ChickenWalker::new(id, Vec3::new(1.0, 3.0, 0.0), 2.0).unwrap();

        walker.step(&mut world, 0.5);
        let pos = world.position(id).unwrap();
        assert!((pos - Vec3::new(1.0, 1.5, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_turn_on_fence() {
        let mut world = World::new();
        let id = world.spawn(ObjectCategory::Chicken, "chicken", Vec3::ZERO);
        let fence = world.spawn(ObjectCategory::Fence, "Fence", Vec3::X);
        let gem = world.spawn(ObjectCategory::Gem, "Gem", Vec3::X);
        let mut walker = ChickenWalker::new(id, Vec3::X, 1.0).unwrap();

        assert!(!walker.on_contact(&world, gem));
        assert_eq!(walker.heading(), Vec3::X);
        assert!(walker.on_contact(&world, fence));
        assert_eq!(walker.heading(), Vec3::NEG_X);
    }

    #[test]
    fn test_invalid_walker() {
        assert!(matches!(
            ChickenWalker::new(1, Vec3::Y, 1.0),
            Err(SceneError::ZeroDirection { .. })
        ));
        assert!(matches!(
            ChickenWalker::new(1, Vec3::X, f32::NAN),
            Err(SceneError::InvalidSpeed(_))
        ));
    }

    #[test]
    fn test_random_heading_is_flat() {
        let mut rng = StdRng::seed_from_u64(7);
        let walker = ChickenWalker::with_random_heading(1, DEFAULT_CHICKEN_SPEED, &mut rng).unwrap();
        assert_eq!(walker.heading().y, 0.0);
        assert!((walker.heading().length() - 1.0).abs() < 1e-5);
    }
}
