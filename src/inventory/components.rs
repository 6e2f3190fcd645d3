use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use bevy::prelude::*;
use thiserror::Error;

use crate::data::schema::{ItemCatalog, ItemCategory, UnknownCategory};

/// 数量变化后调用的显示刷新回调
pub type UpdateCallback = Box<dyn FnMut() + Send + Sync>;

/// 调试显示的表头
pub fn display_header() -> String {
    format!("{:<24}{:<28}{:>10}  {}", "ID", "Name", "Count", "Needs Save")
}

/// 物品栏中的一个条目
///
/// `modified` 表示自上次与服务器同步后数量是否变过；
/// 标记从一种状态切换到另一种时，把当前数量记作 `amount_prev`。
pub struct InventoryEntry {
    id: String,
    name: String,
    category: ItemCategory,
    amount: i64,
    amount_prev: i64,
    modified: bool,
    callbacks: Vec<UpdateCallback>,
}

impl InventoryEntry {
    fn new(category: ItemCategory, id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            category,
            amount: 0,
            amount_prev: 0,
            modified: false,
            callbacks: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> ItemCategory {
        self.category
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    /// 上次同步以来的变化量
    pub fn amount_delta(&self) -> i64 {
        self.amount.saturating_sub(self.amount_prev)
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// 调试显示的一行，列与 [`display_header`] 对齐
    pub fn display_line(&self) -> String {
        format!(
            "{:<24}{:<28}{:>10}  {}",
            self.id,
            self.name,
            self.amount,
            if self.modified { "yes" } else { "no" }
        )
    }

    fn set_modified(&mut self, value: bool) {
        if self.modified != value {
            self.amount_prev = self.amount;
        }
        self.modified = value;
    }

    fn set_amount(&mut self, value: i64) {
        self.set_modified(true);
        self.amount = value;
        for callback in &mut self.callbacks {
            callback();
        }
    }
}

impl fmt::Debug for InventoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InventoryEntry")
            .field("id", &self.id)
            .field("category", &self.category)
            .field("amount", &self.amount)
            .field("amount_prev", &self.amount_prev)
            .field("modified", &self.modified)
            .field("callbacks", &self.callbacks.len())
            .finish()
    }
}

/// 物品的三种寻址方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKey<'a> {
    /// 分类内的位置
    Index(ItemCategory, usize),
    /// 分类 + id
    Typed(ItemCategory, &'a str),
    /// 全局 id
    Id(&'a str),
}

/// [`ItemKey`] 的持有版本，用在事件里
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemAddress {
    Index(ItemCategory, usize),
    Typed(ItemCategory, String),
    Id(String),
}

impl ItemAddress {
    pub fn as_key(&self) -> ItemKey<'_> {
        match self {
            ItemAddress::Index(category, index) => ItemKey::Index(*category, *index),
            ItemAddress::Typed(category, id) => ItemKey::Typed(*category, id),
            ItemAddress::Id(id) => ItemKey::Id(id),
        }
    }
}

impl fmt::Display for ItemAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemAddress::Index(category, index) => write!(f, "{category}:{index}"),
            ItemAddress::Typed(category, id) => write!(f, "{category}:{id}"),
            ItemAddress::Id(id) => f.write_str(id),
        }
    }
}

impl FromStr for ItemAddress {
    type Err = UnknownCategory;

    /// `resources:1` / `resources:fuel` / `fuel`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((category, rest)) => {
                let category = category.parse::<ItemCategory>()?;
                Ok(match rest.parse::<usize>() {
                    Ok(index) => ItemAddress::Index(category, index),
                    Err(_) => ItemAddress::Typed(category, rest.to_string()),
                })
            }
            None => Ok(ItemAddress::Id(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InventoryError {
    #[error("未知物品 id: {0}")]
    UnknownId(String),
    #[error("分类 {category} 中没有物品 {id}")]
    UnknownTypedId { category: ItemCategory, id: String },
    #[error("分类 {category} 下标越界: {index}（共 {len} 个）")]
    IndexOutOfRange {
        category: ItemCategory,
        index: usize,
        len: usize,
    },
    #[error("物品 id 重复: {0}")]
    DuplicateId(String),
}

/// 玩家物品栏（Resource）
///
/// 条目只存一份，三个索引都指向 `entries` 中的同一个位置。
#[derive(Resource, Default, Debug)]
pub struct Inventory {
    entries: Vec<InventoryEntry>,
    by_index: [Vec<usize>; ItemCategory::COUNT],
    by_type: [HashMap<String, usize>; ItemCategory::COUNT],
    by_id: HashMap<String, usize>,
}

impl Inventory {
    /// 为目录中的每个物品建一个数量为 0 的条目
    pub fn from_catalog(catalog: &ItemCatalog) -> Result<Self, InventoryError> {
        let mut inventory = Self::default();
        for (category, def) in catalog.iter() {
            inventory.insert(category, &def.id, &def.name)?;
        }
        debug!("物品栏初始化完成: {} 个条目", inventory.len());
        Ok(inventory)
    }

    pub fn insert(
        &mut self,
        category: ItemCategory,
        id: &str,
        name: &str,
    ) -> Result<(), InventoryError> {
        if self.by_id.contains_key(id) {
            return Err(InventoryError::DuplicateId(id.to_string()));
        }
        let slot = self.entries.len();
        self.entries.push(InventoryEntry::new(category, id, name));
        self.by_index[category.index()].push(slot);
        self.by_type[category.index()].insert(id.to_string(), slot);
        self.by_id.insert(id.to_string(), slot);
        Ok(())
    }

    fn resolve(&self, key: ItemKey<'_>) -> Result<usize, InventoryError> {
        match key {
            ItemKey::Index(category, index) => {
                let slots = &self.by_index[category.index()];
                slots
                    .get(index)
                    .copied()
                    .ok_or(InventoryError::IndexOutOfRange {
                        category,
                        index,
                        len: slots.len(),
                    })
            }
            ItemKey::Typed(category, id) => self.by_type[category.index()]
                .get(id)
                .copied()
                .ok_or_else(|| InventoryError::UnknownTypedId {
                    category,
                    id: id.to_string(),
                }),
            ItemKey::Id(id) => self
                .by_id
                .get(id)
                .copied()
                .ok_or_else(|| InventoryError::UnknownId(id.to_string())),
        }
    }

    pub fn entry(&self, key: ItemKey<'_>) -> Result<&InventoryEntry, InventoryError> {
        let slot = self.resolve(key)?;
        Ok(&self.entries[slot])
    }

    fn entry_mut(&mut self, key: ItemKey<'_>) -> Result<&mut InventoryEntry, InventoryError> {
        let slot = self.resolve(key)?;
        Ok(&mut self.entries[slot])
    }

    /// 读取数量；`reset` 为 true 时顺便清除修改标记（已同步到服务器）
    pub fn get(&mut self, key: ItemKey<'_>, reset: bool) -> Result<i64, InventoryError> {
        let entry = self.entry_mut(key)?;
        if reset {
            entry.set_modified(false);
        }
        Ok(entry.amount)
    }

    /// 只读版本，给显示用
    pub fn amount(&self, key: ItemKey<'_>) -> Result<i64, InventoryError> {
        Ok(self.entry(key)?.amount)
    }

    pub fn set(&mut self, key: ItemKey<'_>, value: i64, reset: bool) -> Result<(), InventoryError> {
        let entry = self.entry_mut(key)?;
        entry.set_amount(value);
        if reset {
            entry.set_modified(false);
        }
        Ok(())
    }

    pub fn add(&mut self, key: ItemKey<'_>, delta: i64) -> Result<(), InventoryError> {
        let entry = self.entry_mut(key)?;
        let amount = entry.amount.saturating_add(delta);
        entry.set_amount(amount);
        Ok(())
    }

    pub fn is_modified(&self, key: ItemKey<'_>) -> Result<bool, InventoryError> {
        Ok(self.entry(key)?.modified)
    }

    /// 把分类下所有物品清零
    pub fn reset_category(&mut self, category: ItemCategory) {
        for &slot in &self.by_index[category.index()] {
            self.entries[slot].set_amount(0);
        }
    }

    /// 回调里拿不到物品栏，不能在回调中再次修改数量
    pub fn register_update_callback(
        &mut self,
        key: ItemKey<'_>,
        callback: impl FnMut() + Send + Sync + 'static,
    ) -> Result<(), InventoryError> {
        self.entry_mut(key)?.callbacks.push(Box::new(callback));
        Ok(())
    }

    /// 按数据表顺序遍历一个分类
    pub fn entries(&self, category: ItemCategory) -> impl Iterator<Item = &InventoryEntry> {
        self.by_index[category.index()]
            .iter()
            .map(move |&slot| &self.entries[slot])
    }

    pub fn category_len(&self, category: ItemCategory) -> usize {
        self.by_index[category.index()].len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 尚未同步的条目
    pub fn pending_changes(&self) -> impl Iterator<Item = &InventoryEntry> {
        self.entries.iter().filter(|entry| entry.modified)
    }
}
