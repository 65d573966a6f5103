//! 演示脚本
//!
//! 没有物理引擎时，按时间表依次“碰到”宝石，最后撞上一只鸡。

use std::collections::VecDeque;
use std::time::Duration;

use rand::seq::SliceRandom;
use rand::Rng;

use gem_core::{AudioSink, ObjectCategory, ObjectId, Scene};

/// 单个脚本步骤
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemoStep {
    /// 相对开始的时间
    pub at: Duration,
    pub target: ObjectId,
}

/// 演示时间表
#[derive(Debug, Clone)]
pub struct DemoScript {
    steps: VecDeque<DemoStep>,
    end_at: Duration,
}

impl DemoScript {
    /// 随机顺序收集全部宝石，然后撞鸡
    pub fn new<A: AudioSink, R: Rng + ?Sized>(scene: &Scene<A>, step: Duration, rng: &mut R) -> Self {
        let mut targets = scene.world().ids_of(ObjectCategory::Gem);
        targets.shuffle(rng);
        if let Some(&chicken) = scene.world().ids_of(ObjectCategory::Chicken).first() {
            targets.push(chicken);
        }

        let steps: VecDeque<DemoStep> = targets
            .into_iter()
            .enumerate()
            .map(|(i, target)| DemoStep {
                at: step * (i as u32 + 1),
                target,
            })
            .collect();
        // 留两个步长让最后的状态发出去
        let end_at = steps.back().map(|s| s.at).unwrap_or_default() + step * 2;

        Self { steps, end_at }
    }

    /// 取出所有已到期的步骤
    pub fn due(&mut self, elapsed: Duration) -> Vec<DemoStep> {
        let mut due = Vec::new();
        while let Some(step) = self.steps.front() {
            if step.at > elapsed {
                break;
            }
            due.extend(self.steps.pop_front());
        }
        due
    }

    pub fn remaining(&self) -> usize {
        self.steps.len()
    }

    pub fn is_finished(&self, elapsed: Duration) -> bool {
        self.steps.is_empty() && elapsed >= self.end_at
    }
}
