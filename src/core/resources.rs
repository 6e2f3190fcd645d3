use std::io::ErrorKind;
use std::path::Path;

use anyhow::Context;
use bevy::log::Level;
use bevy::prelude::*;
use serde::Deserialize;

use crate::data::schema::ItemCategory;
use crate::leveling::curve::LevelCurve;

/// 默认配置文件位置（相对工作目录）
pub const CONFIG_PATH: &str = "config/game.toml";

/// 全局配置，启动时从 `config/game.toml` 读取
#[derive(Resource, Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// trace / debug / info / warn / error
    pub log_level: String,
    pub assets: AssetPaths,
    pub leveling: LevelCurve,
    pub debug: DebugSettings,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            log_level: "info".into(),
            assets: AssetPaths::default(),
            leveling: LevelCurve::default(),
            debug: DebugSettings::default(),
        }
    }
}

/// 数据表在 assets/ 下的路径
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AssetPaths {
    pub items: String,
    pub levels: String,
}

impl Default for AssetPaths {
    fn default() -> Self {
        Self {
            items: "data/inventory.items.ron".into(),
            levels: "data/leveling.levels.ron".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DebugSettings {
    /// 这个分类的每个物品都会注册显示回调
    pub display_category: ItemCategory,
}

impl Default for DebugSettings {
    fn default() -> Self {
        Self {
            display_category: ItemCategory::Resource,
        }
    }
}

impl GameConfig {
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// 文件不存在时使用默认值；文件存在但格式错误则直接报错
    pub fn load_or_default(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => {
                return Err(err).with_context(|| format!("无法读取配置 {}", path.display()));
            }
        };
        Self::from_toml(&text).with_context(|| format!("配置格式错误 {}", path.display()))
    }

    pub fn log_level(&self) -> anyhow::Result<Level> {
        self.log_level
            .parse::<Level>()
            .with_context(|| format!("未知日志级别: {}", self.log_level))
    }
}
