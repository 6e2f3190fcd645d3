use std::fmt;
use std::str::FromStr;

use bevy::asset::Asset;
use bevy::reflect::TypePath;
use serde::Deserialize;
use thiserror::Error;

/// 物品分类，顺序即数据表中的类型编号
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum ItemCategory {
    #[serde(rename = "leveling")]
    Leveling,
    #[serde(rename = "resources", alias = "resource")]
    Resource,
    #[serde(rename = "cargo")]
    Cargo,
    #[serde(rename = "tokens", alias = "token")]
    Token,
    #[serde(rename = "scores", alias = "race_scores")]
    RaceScore,
}

impl ItemCategory {
    pub const COUNT: usize = 5;
    pub const ALL: [ItemCategory; Self::COUNT] = [
        ItemCategory::Leveling,
        ItemCategory::Resource,
        ItemCategory::Cargo,
        ItemCategory::Token,
        ItemCategory::RaceScore,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            ItemCategory::Leveling => "leveling",
            ItemCategory::Resource => "resources",
            ItemCategory::Cargo => "cargo",
            ItemCategory::Token => "tokens",
            ItemCategory::RaceScore => "scores",
        }
    }
}

impl fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("未知物品分类: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for ItemCategory {
    type Err = UnknownCategory;

    /// 接受分类名（单复数均可）或数字编号
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        if let Ok(index) = lower.parse::<usize>() {
            return ItemCategory::ALL
                .get(index)
                .copied()
                .ok_or_else(|| UnknownCategory(s.to_string()));
        }
        match lower.as_str() {
            "leveling" | "level" => Ok(ItemCategory::Leveling),
            "resources" | "resource" | "res" => Ok(ItemCategory::Resource),
            "cargo" => Ok(ItemCategory::Cargo),
            "tokens" | "token" => Ok(ItemCategory::Token),
            "scores" | "score" | "race_scores" => Ok(ItemCategory::RaceScore),
            _ => Err(UnknownCategory(s.to_string())),
        }
    }
}

/// 目录中的一个物品定义
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ItemDef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub rarity: u8,
    /// 仅货箱使用：打开后的产出
    #[serde(default)]
    pub contents: Vec<CargoContent>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum CargoContentKind {
    LootRounds,
    Experience,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CargoContent {
    pub kind: CargoContentKind,
    pub count: u32,
}

/// 全部物品目录（`*.items.ron`）
#[derive(Asset, TypePath, Deserialize, Debug, Clone, Default)]
pub struct ItemCatalog {
    #[serde(default)]
    pub leveling: Vec<ItemDef>,
    #[serde(default)]
    pub resources: Vec<ItemDef>,
    #[serde(default)]
    pub cargo: Vec<ItemDef>,
    #[serde(default)]
    pub tokens: Vec<ItemDef>,
    #[serde(default)]
    pub race_scores: Vec<ItemDef>,
}

impl ItemCatalog {
    pub fn category(&self, category: ItemCategory) -> &[ItemDef] {
        match category {
            ItemCategory::Leveling => &self.leveling,
            ItemCategory::Resource => &self.resources,
            ItemCategory::Cargo => &self.cargo,
            ItemCategory::Token => &self.tokens,
            ItemCategory::RaceScore => &self.race_scores,
        }
    }

    /// 按分类顺序遍历全部物品
    pub fn iter(&self) -> impl Iterator<Item = (ItemCategory, &ItemDef)> {
        ItemCategory::ALL
            .into_iter()
            .flat_map(move |category| {
                self.category(category).iter().map(move |def| (category, def))
            })
    }

    pub fn item_count(&self) -> usize {
        ItemCategory::ALL
            .iter()
            .map(|category| self.category(*category).len())
            .sum()
    }

    /// id 或名称，不区分大小写
    pub fn find(&self, token: &str) -> Option<(ItemCategory, &ItemDef)> {
        self.iter()
            .find(|(_, def)| {
                def.id.eq_ignore_ascii_case(token) || def.name.eq_ignore_ascii_case(token)
            })
    }
}

/// 权限定义：达到 `level` 后激活第 `index` 个权限对象
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PermissionDef {
    pub level: u32,
    pub index: usize,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PermissionTables {
    #[serde(default)]
    pub teleports: Vec<PermissionDef>,
    #[serde(default)]
    pub wearables: Vec<PermissionDef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RewardDef {
    pub id: String,
    pub count: i64,
}

/// 等级表（`*.levels.ron`）：`rewards[n]` 在首次升到 n 级时发放
#[derive(Asset, TypePath, Deserialize, Debug, Clone, Default)]
pub struct LevelTables {
    pub permissions: PermissionTables,
    pub rewards: Vec<Vec<RewardDef>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures;

    #[test]
    fn catalog_has_every_category() {
        let catalog = fixtures::catalog();
        assert_eq!(catalog.leveling.len(), 2);
        assert_eq!(catalog.resources.len(), 10);
        assert_eq!(catalog.cargo.len(), 3);
        assert_eq!(catalog.tokens.len(), 3);
        assert_eq!(catalog.race_scores.len(), 9);
        assert_eq!(catalog.item_count(), 27);
    }

    #[test]
    fn catalog_lookup_by_id_or_name() {
        let catalog = fixtures::catalog();
        let (category, def) = catalog.find("circuit boards").unwrap();
        assert_eq!(category, ItemCategory::Resource);
        assert_eq!(def.id, "circuitBoard");
        assert_eq!(def.rarity, 2);

        let (category, def) = catalog.find("LGCARGO").unwrap();
        assert_eq!(category, ItemCategory::Cargo);
        assert_eq!(
            def.contents,
            vec![
                CargoContent { kind: CargoContentKind::LootRounds, count: 40 },
                CargoContent { kind: CargoContentKind::Experience, count: 25 },
            ]
        );
        assert!(catalog.find("nothing").is_none());
    }

    #[test]
    fn level_tables_cover_levels_zero_to_cap() {
        let tables = fixtures::level_tables();
        assert_eq!(tables.rewards.len(), 60);
        assert_eq!(tables.permissions.teleports.len(), 4);
        assert_eq!(tables.permissions.wearables.len(), 4);
        assert_eq!(
            tables.rewards[10],
            vec![
                RewardDef { id: "fuel".into(), count: 250 },
                RewardDef { id: "coins".into(), count: 100 },
                RewardDef { id: "smCargo".into(), count: 1 },
            ]
        );
    }

    #[test]
    fn category_parsing() {
        assert_eq!("resources".parse::<ItemCategory>(), Ok(ItemCategory::Resource));
        assert_eq!("Token".parse::<ItemCategory>(), Ok(ItemCategory::Token));
        assert_eq!("4".parse::<ItemCategory>(), Ok(ItemCategory::RaceScore));
        assert!("5".parse::<ItemCategory>().is_err());
        assert!("weapons".parse::<ItemCategory>().is_err());
        for category in ItemCategory::ALL {
            assert_eq!(category.name().parse::<ItemCategory>(), Ok(category));
            assert_eq!(ItemCategory::ALL[category.index()], category);
        }
    }
}
