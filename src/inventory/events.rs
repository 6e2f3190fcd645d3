use bevy::prelude::*;

use super::components::ItemAddress;
use crate::data::schema::ItemCategory;

/// 覆盖数量；`reset` 为 true 表示这是从服务器同步来的值
#[derive(Event, Debug, Clone)]
pub struct SetItemCountEvent {
    pub address: ItemAddress,
    pub value: i64,
    pub reset: bool,
}

#[derive(Event, Debug, Clone)]
pub struct AddItemCountEvent {
    pub address: ItemAddress,
    pub delta: i64,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct ResetCategoryEvent {
    pub category: ItemCategory,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct ListInventoryEvent {
    pub category: ItemCategory,
}
