pub mod loader;
pub mod schema;

use anyhow::Context;
use bevy::asset::{LoadState, UntypedAssetId};
use bevy::prelude::*;

use crate::core::{resources::GameConfig, states::AppState};
use crate::inventory::components::Inventory;
use crate::leveling::components::LevelManager;
use crate::leveling::curve::LevelCurve;
use loader::RonAssetLoader;
use schema::{ItemCatalog, LevelTables};

// --------------------------- 资源 ---------------------------
#[derive(Resource, Default)]
pub struct DataAssets {
    pub items: Option<Handle<ItemCatalog>>,
    pub levels: Option<Handle<LevelTables>>,
}

impl DataAssets {
    pub fn catalog<'a>(&self, catalogs: &'a Assets<ItemCatalog>) -> Option<&'a ItemCatalog> {
        self.items.as_ref().and_then(|h| catalogs.get(h))
    }
}

// --------------------------- 插件 ---------------------------
pub struct DataPlugin;
impl Plugin for DataPlugin {
    fn build(&self, app: &mut App) {
        app
            // 注册资产类型 & Loader
            .init_asset::<ItemCatalog>()
            .init_asset::<LevelTables>()
            .register_asset_loader(RonAssetLoader::<ItemCatalog>::new(&["items.ron"]))
            .register_asset_loader(RonAssetLoader::<LevelTables>::new(&["levels.ron"]))
            .init_resource::<DataAssets>()
            // Loading 流程
            .add_systems(OnEnter(AppState::Loading), start_loading)
            .add_systems(Update, check_loaded.run_if(in_state(AppState::Loading)));
    }
}

// --------------------------- 系统 ---------------------------
fn start_loading(
    mut data: ResMut<DataAssets>,
    asset_server: Res<AssetServer>,
    config: Res<GameConfig>,
) {
    info!(
        "开始加载数据表: items={}, levels={}",
        config.assets.items, config.assets.levels
    );
    data.items = Some(asset_server.load(config.assets.items.clone()));
    data.levels = Some(asset_server.load(config.assets.levels.clone()));
}

fn check_loaded(
    mut commands: Commands,
    mut next: ResMut<NextState<AppState>>,
    data: Res<DataAssets>,
    catalogs: Res<Assets<ItemCatalog>>,
    tables: Res<Assets<LevelTables>>,
    asset_server: Res<AssetServer>,
    config: Res<GameConfig>,
) {
    let (Some(items), Some(levels)) = (&data.items, &data.levels) else {
        return;
    };

    if load_failed(&asset_server, items.id().untyped(), "物品目录")
        || load_failed(&asset_server, levels.id().untyped(), "等级表")
    {
        next.set(AppState::Shutdown);
        return;
    }

    let (Some(catalog), Some(level_tables)) = (catalogs.get(items), tables.get(levels)) else {
        return;
    };

    match build_services(catalog, level_tables, &config.leveling) {
        Ok((inventory, manager)) => {
            info!(
                "✔ 数据表加载完成: {} 个物品, {} 级奖励",
                catalog.item_count(),
                level_tables.rewards.len()
            );
            commands.insert_resource(inventory);
            commands.insert_resource(manager);
            next.set(AppState::InGame);
        }
        Err(err) => {
            error!("数据表无效: {err:#}");
            next.set(AppState::Shutdown);
        }
    }
}

fn load_failed(asset_server: &AssetServer, id: UntypedAssetId, label: &str) -> bool {
    if let LoadState::Failed(err) = asset_server.load_state(id) {
        error!("{label}加载失败: {err}");
        return true;
    }
    false
}

/// 目录 + 等级表 → 物品栏和等级管理器
pub fn build_services(
    catalog: &ItemCatalog,
    tables: &LevelTables,
    curve: &LevelCurve,
) -> anyhow::Result<(Inventory, LevelManager)> {
    let inventory = Inventory::from_catalog(catalog).context("无法根据物品目录构建物品栏")?;
    let manager = LevelManager::new(curve.clone(), tables, &inventory)
        .context("等级表引用了物品目录中不存在的物品")?;
    Ok((inventory, manager))
}
