use bevy::log::LogPlugin;
use bevy::prelude::*;

mod core;
mod data;
mod interface;
mod inventory;
mod leveling;

use core::CorePlugin;
use core::resources::{CONFIG_PATH, GameConfig};
use interface::{debug_cli::DebugCliPlugin, debug_display::DebugDisplayPlugin};
use crate::core::states;

fn main() -> anyhow::Result<()> {
    let config = GameConfig::load_or_default(CONFIG_PATH)?;
    let level = config.log_level()?;

    App::new()
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        visible: false,
                        ..default()
                    }), // 隐藏窗口，实现“无 UI”
                    ..default()
                })
                .set(LogPlugin {
                    level,
                    ..default()
                }),
        )
        .insert_resource(config)
        .add_plugins(CorePlugin)
        .add_plugins(data::DataPlugin)
        .add_plugins(inventory::InventoryPlugin)
        .add_plugins(leveling::LevelingPlugin)
        .add_plugins(DebugCliPlugin)
        .add_plugins(DebugDisplayPlugin)
        .add_systems(Update, forward_log_event) // 简单打印
        .add_systems(Startup, |mut next: ResMut<NextState<states::AppState>>| {
            next.set(states::AppState::Loading);
        })
        .run();
    Ok(())
}

fn forward_log_event(mut reader: EventReader<core::events::LogEvent>) {
    for e in reader.read() {
        println!("> {}", e.0);
    }
}
