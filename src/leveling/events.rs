use bevy::prelude::*;

/// 重置等级系统（经验 + 转生次数）
#[derive(Event, Debug, Clone, Copy)]
pub struct InitializeLevelingEvent {
    pub experience: i64,
    pub prestige: u32,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct AddExperienceEvent {
    pub amount: i64,
}

/// 直接设置经验，不发奖励
#[derive(Event, Debug, Clone, Copy)]
pub struct SetExperienceEvent {
    pub value: i64,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct AttemptPrestigeEvent;

/// 通过正常升级升到更高等级（内部 0 起的等级）
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelUpEvent {
    pub from: u32,
    pub to: u32,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrestigeEvent {
    pub prestige: u32,
}

/// 等级面板需要刷新
#[derive(Event, Debug, Clone, Copy)]
pub struct LevelingUpdated;
