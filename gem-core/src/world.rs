//! 场景对象注册表
//!
//! 每个对象在生成时即带有类别，碰撞分类不再依赖名称匹配。

use std::collections::HashMap;

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// 场景对象 ID
pub type ObjectId = u64;

/// 对象类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectCategory {
    /// 可收集的宝石
    Gem,
    /// 碰到即出局的鸡
    Chicken,
    /// 围栏（鸡碰到会掉头）
    Fence,
    /// 其他（忽略）
    Other,
}

impl ObjectCategory {
    /// 按显示名称分类（仅用于导入只有名称的旧场景）
    ///
    /// 规则（不区分大小写）: 以 `gem` 开头为宝石，包含 `chicken` 为鸡，
    /// 包含 `fence` 为围栏，其余为 Other。
    pub fn from_name(name: &str) -> Self {
        let lower = name.to_lowercase();
        if lower.starts_with("gem") {
            ObjectCategory::Gem
        } else if lower.contains("chicken") {
            ObjectCategory::Chicken
        } else if lower.contains("fence") {
            ObjectCategory::Fence
        } else {
            ObjectCategory::Other
        }
    }
}

/// 场景对象
#[derive(Debug, Clone, PartialEq)]
pub struct WorldObject {
    pub id: ObjectId,
    pub category: ObjectCategory,
    pub name: String,
    pub position: Vec3,
}

/// 场景对象注册表
#[derive(Debug)]
pub struct World {
    objects: HashMap<ObjectId, WorldObject>,
    next_id: ObjectId,
}

impl World {
    pub fn new() -> Self {
        Self {
            objects: HashMap::new(),
            next_id: 1,
        }
    }

    /// 生成对象，返回其 ID
    pub fn spawn(&mut self, category: ObjectCategory, name: impl Into<String>, position: Vec3) -> ObjectId {
        let id = self.next_id;
        self.next_id += 1;
        self.objects.insert(
            id,
            WorldObject {
                id,
                category,
                name: name.into(),
                position,
            },
        );
        id
    }

    /// 按名称分类后生成对象
    pub fn spawn_named(&mut self, name: impl Into<String>, position: Vec3) -> ObjectId {
        let name = name.into();
        let category = ObjectCategory::from_name(&name);
        self.spawn(category, name, position)
    }

    /// 获取对象
    pub fn get(&self, id: ObjectId) -> Option<&WorldObject> {
        self.objects.get(&id)
    }

    /// 获取对象类别（未知对象视为 Other）
    pub fn category(&self, id: ObjectId) -> ObjectCategory {
        self.objects
            .get(&id)
            .map(|o| o.category)
            .unwrap_or(ObjectCategory::Other)
    }

    /// 获取对象位置
    pub fn position(&self, id: ObjectId) -> Option<Vec3> {
        self.objects.get(&id).map(|o| o.position)
    }

    /// 移动对象
    pub fn set_position(&mut self, id: ObjectId, position: Vec3) -> bool {
        match self.objects.get_mut(&id) {
            Some(object) => {
                object.position = position;
                true
            }
            None => false,
        }
    }

    /// 取走宝石
    ///
    /// 移除与检查合为一步：只有仍在场景中的宝石才会被返回，
    /// 同一宝石的重复碰撞只会成功一次。
    pub fn take_gem(&mut self, id: ObjectId) -> Option<WorldObject> {
        if self.category(id) != ObjectCategory::Gem {
            return None;
        }
        self.objects.remove(&id)
    }

    /// 移除任意对象
    pub fn despawn(&mut self, id: ObjectId) -> Option<WorldObject> {
        self.objects.remove(&id)
    }

    /// 场景中剩余宝石数
    pub fn remaining_gems(&self) -> usize {
        self.ids_of(ObjectCategory::Gem).len()
    }

    /// 某类别的全部对象 ID（升序）
    pub fn ids_of(&self, category: ObjectCategory) -> Vec<ObjectId> {
        let mut ids: Vec<ObjectId> = self
            .objects
            .values()
            .filter(|o| o.category == category)
            .map(|o| o.id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// 对象总数
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// 清空场景（ID 不回收）
    pub fn clear(&mut self) {
        self.objects.clear();
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
