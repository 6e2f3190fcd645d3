use bevy::prelude::*;

/// 权限种类，对应等级表中的两张权限表
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PermissionKind {
    Teleport,
    Wearable,
}

impl PermissionKind {
    pub const ALL: [PermissionKind; 2] = [PermissionKind::Teleport, PermissionKind::Wearable];

    pub fn label(self) -> &'static str {
        match self {
            PermissionKind::Teleport => "teleport",
            PermissionKind::Wearable => "wearable",
        }
    }
}

/// 等级管理器通过它开关场景里的权限对象
pub trait PermissionTarget {
    /// 已经创建好的对象数量，下标不小于它的权限会被跳过
    fn handle_count(&self, kind: PermissionKind) -> usize;
    fn set_active(&mut self, kind: PermissionKind, index: usize, active: bool);
}

/// 标记场景中的权限对象
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionGate {
    pub kind: PermissionKind,
    pub index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionSlot {
    pub entity: Entity,
    pub active: bool,
}

/// 两组权限对象的句柄，场景初始化时按表顺序注册
#[derive(Resource, Debug, Default)]
pub struct PermissionObjects {
    teleports: Vec<PermissionSlot>,
    wearables: Vec<PermissionSlot>,
}

impl PermissionObjects {
    /// 追加一个对象，返回它的下标；新对象默认是激活状态
    pub fn register(&mut self, kind: PermissionKind, entity: Entity) -> usize {
        let slots = self.slots_mut(kind);
        slots.push(PermissionSlot {
            entity,
            active: true,
        });
        slots.len() - 1
    }

    pub fn slots(&self, kind: PermissionKind) -> &[PermissionSlot] {
        match kind {
            PermissionKind::Teleport => &self.teleports,
            PermissionKind::Wearable => &self.wearables,
        }
    }

    fn slots_mut(&mut self, kind: PermissionKind) -> &mut Vec<PermissionSlot> {
        match kind {
            PermissionKind::Teleport => &mut self.teleports,
            PermissionKind::Wearable => &mut self.wearables,
        }
    }

    pub fn is_active(&self, kind: PermissionKind, index: usize) -> Option<bool> {
        self.slots(kind).get(index).map(|slot| slot.active)
    }
}

impl PermissionTarget for PermissionObjects {
    fn handle_count(&self, kind: PermissionKind) -> usize {
        self.slots(kind).len()
    }

    fn set_active(&mut self, kind: PermissionKind, index: usize, active: bool) {
        if let Some(slot) = self.slots_mut(kind).get_mut(index) {
            slot.active = active;
        }
    }
}

/// 激活：正常尺寸可见；未激活：缩到 0 并隐藏
pub fn gate_transform_scale(active: bool) -> Vec3 {
    if active {
        Vec3::new(0.5, 2.0, 0.5)
    } else {
        Vec3::ZERO
    }
}
