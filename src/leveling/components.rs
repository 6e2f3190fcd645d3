use bevy::prelude::*;
use thiserror::Error;

use super::curve::LevelCurve;
use super::permissions::{PermissionKind, PermissionTarget};
use crate::data::schema::{LevelTables, PermissionDef, PermissionTables, RewardDef};
use crate::inventory::components::{Inventory, InventoryError, ItemKey};

/// 经验值保存在物品栏的这个条目里
pub const EXPERIENCE_ID: &str = "exp";
/// 等级（0 起）缓存在这个条目里
pub const LEVEL_ID: &str = "lvl";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LevelingError {
    #[error("物品目录缺少保留条目: {0}")]
    MissingReservedItem(&'static str),
    #[error("第 {level} 级奖励引用了未知物品: {id}")]
    UnknownRewardItem { level: usize, id: String },
}

/// 一次加经验前后的等级
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelProgress {
    pub from: u32,
    pub to: u32,
}

impl LevelProgress {
    pub fn changed(&self) -> bool {
        self.from != self.to
    }
}

/// 调试面板需要的全部数值
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelSnapshot {
    pub experience: i64,
    pub experience_to_next: i64,
    pub level: u32,
    pub prestige: u32,
}

impl LevelSnapshot {
    /// 显示用等级从 1 开始
    pub fn display_level(&self) -> u32 {
        self.level + 1
    }
}

/// 等级管理器（Resource）
///
/// 经验和等级本身存放在 [`Inventory`] 中，这里只持有曲线、转生次数和两张等级表。
/// 奖励只在正常升级时发放；直接设置经验只会重新计算等级和权限。
#[derive(Resource, Debug)]
pub struct LevelManager {
    curve: LevelCurve,
    experience_max: i64,
    prestige: u32,
    permissions: PermissionTables,
    rewards: Vec<Vec<RewardDef>>,
}

impl LevelManager {
    /// 检查保留条目和所有奖励物品都在物品栏里
    pub fn new(
        curve: LevelCurve,
        tables: &LevelTables,
        inventory: &Inventory,
    ) -> Result<Self, LevelingError> {
        for id in [EXPERIENCE_ID, LEVEL_ID] {
            if inventory.entry(ItemKey::Id(id)).is_err() {
                return Err(LevelingError::MissingReservedItem(id));
            }
        }
        for (level, row) in tables.rewards.iter().enumerate() {
            let missing = row.iter().find(|r| inventory.entry(ItemKey::Id(&r.id)).is_err());
            if let Some(reward) = missing {
                return Err(LevelingError::UnknownRewardItem {
                    level,
                    id: reward.id.clone(),
                });
            }
        }

        Ok(Self {
            experience_max: curve.experience_max(),
            curve,
            prestige: 0,
            permissions: tables.permissions.clone(),
            rewards: tables.rewards.clone(),
        })
    }

    pub fn curve(&self) -> &LevelCurve {
        &self.curve
    }

    pub fn experience_max(&self) -> i64 {
        self.experience_max
    }

    pub fn prestige(&self) -> u32 {
        self.prestige
    }

    pub fn permission_table(&self, kind: PermissionKind) -> &[PermissionDef] {
        match kind {
            PermissionKind::Teleport => &self.permissions.teleports,
            PermissionKind::Wearable => &self.permissions.wearables,
        }
    }

    pub fn experience(&self, inventory: &Inventory) -> Result<i64, InventoryError> {
        inventory.amount(ItemKey::Id(EXPERIENCE_ID))
    }

    pub fn level(&self, inventory: &Inventory) -> Result<u32, InventoryError> {
        let level = inventory.amount(ItemKey::Id(LEVEL_ID))?;
        Ok(u32::try_from(level).unwrap_or(0))
    }

    pub fn display_level(&self, inventory: &Inventory) -> Result<u32, InventoryError> {
        Ok(self.level(inventory)? + 1)
    }

    /// 距离下一级还差多少经验，满级时为 0
    pub fn experience_to_next(&self, inventory: &Inventory) -> Result<i64, InventoryError> {
        let level = self.level(inventory)?;
        if level == self.curve.level_cap {
            return Ok(0);
        }
        Ok(self.curve.experience_for_level(level + 1) - self.experience(inventory)?)
    }

    pub fn snapshot(&self, inventory: &Inventory) -> Result<LevelSnapshot, InventoryError> {
        Ok(LevelSnapshot {
            experience: self.experience(inventory)?,
            experience_to_next: self.experience_to_next(inventory)?,
            level: self.level(inventory)?,
            prestige: self.prestige,
        })
    }

    fn store_level(&self, level: u32, inventory: &mut Inventory) -> Result<(), InventoryError> {
        inventory.set(ItemKey::Id(LEVEL_ID), i64::from(level), false)
    }

    /// 重置等级系统；经验通过 `set_experience` 写入，不发奖励
    pub fn initialize(
        &mut self,
        experience: i64,
        prestige: u32,
        inventory: &mut Inventory,
        permissions: &mut impl PermissionTarget,
    ) -> Result<(), InventoryError> {
        debug!("等级系统初始化中...");
        self.experience_max = self.curve.experience_max();
        self.set_experience(experience, inventory, permissions)?;
        self.prestige = prestige;
        info!(
            "等级系统初始化完成 (experience={}, level={}, prestige={})",
            self.experience(inventory)?,
            self.level(inventory)? + 1,
            self.prestige
        );
        Ok(())
    }

    /// 增加经验并逐级发放奖励，等级有变化时只刷新一次权限
    pub fn add_experience(
        &mut self,
        amount: i64,
        inventory: &mut Inventory,
        permissions: &mut impl PermissionTarget,
    ) -> Result<LevelProgress, InventoryError> {
        let mut experience = self.experience(inventory)?.saturating_add(amount);
        if experience > self.experience_max {
            debug!(
                "经验超过上限，截断 (cur={experience}, max={})",
                self.experience_max
            );
            experience = self.experience_max;
        }
        inventory.set(ItemKey::Id(EXPERIENCE_ID), experience, false)?;

        let target = self.curve.level_for_experience(experience);
        let from = self.level(inventory)?;
        let mut level = from;

        if target < level {
            // 经验被扣减：直接降到对应等级，不发奖励
            level = target;
            self.store_level(level, inventory)?;
        } else {
            while level != target {
                if level >= self.curve.level_cap {
                    debug!("目标等级 {target} 超过上限，停在 {}", self.curve.level_cap);
                    level = self.curve.level_cap;
                    self.store_level(level, inventory)?;
                    break;
                }
                level += 1;
                self.store_level(level, inventory)?;
                self.process_level_rewards(level, inventory)?;
            }
        }

        let progress = LevelProgress { from, to: level };
        if progress.changed() {
            info!("等级变化 {} → {}", from + 1, level + 1);
            self.process_permissions(level, permissions);
        }
        debug!("增加经验 {amount} 完成 (experience={experience})");
        Ok(progress)
    }

    /// 直接设置经验：重新计算等级和权限，但不发奖励
    pub fn set_experience(
        &mut self,
        value: i64,
        inventory: &mut Inventory,
        permissions: &mut impl PermissionTarget,
    ) -> Result<(), InventoryError> {
        debug!("设置经验 {value}");
        inventory.set(ItemKey::Id(EXPERIENCE_ID), value, false)?;
        let level = self.curve.level_for_experience(value).min(self.curve.level_cap);
        self.store_level(level, inventory)?;
        self.process_permissions(level, permissions);
        Ok(())
    }

    /// 满级时转生：转生次数 +1 并清空经验。返回是否成功
    pub fn attempt_prestige(
        &mut self,
        inventory: &mut Inventory,
        permissions: &mut impl PermissionTarget,
    ) -> Result<bool, InventoryError> {
        let level = self.level(inventory)?;
        if level < self.curve.level_cap {
            info!("转生失败：等级不足 (level={})", level + 1);
            return Ok(false);
        }

        // TODO: 转生消耗表确定后，在这里检查并扣除所需资源
        self.prestige += 1;
        self.set_experience(0, inventory, permissions)?;

        info!("转生成功 (prestige={})", self.prestige);
        Ok(true)
    }

    /// 发放某一级的奖励；表里没有这一级就什么都不做
    pub fn process_level_rewards(
        &self,
        level: u32,
        inventory: &mut Inventory,
    ) -> Result<(), InventoryError> {
        let Some(rewards) = self.rewards.get(level as usize) else {
            return Ok(());
        };
        for reward in rewards {
            inventory.add(ItemKey::Id(&reward.id), reward.count)?;
        }
        debug!("发放第 {} 级奖励:\n{}", level + 1, self.rewards_summary(level));
        Ok(())
    }

    /// 按等级开关传送点和可穿戴领取点；还没创建的对象直接跳过
    pub fn process_permissions(&self, level: u32, target: &mut impl PermissionTarget) {
        for kind in PermissionKind::ALL {
            let created = target.handle_count(kind);
            for def in self.permission_table(kind) {
                if def.index >= created {
                    continue;
                }
                target.set_active(kind, def.index, level >= def.level);
            }
        }
        debug!("已按等级 {} 设置权限", level + 1);
    }

    /// 例如 `250 x fuel`，每条一行
    pub fn rewards_summary(&self, level: u32) -> String {
        self.rewards
            .get(level as usize)
            .map(|rewards| {
                rewards
                    .iter()
                    .map(|r| format!("{} x {}", r.count, r.id))
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .unwrap_or_default()
    }

    /// 恰好在这一级解锁的权限
    pub fn permissions_summary(&self, level: u32) -> String {
        PermissionKind::ALL
            .into_iter()
            .flat_map(|kind| {
                self.permission_table(kind)
                    .iter()
                    .filter(move |def| def.level == level)
                    .map(move |def| format!("{} ({})", def.name, kind.label()))
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
