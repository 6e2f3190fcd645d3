//! 调试显示：物品数量变化时刷新对应行，等级变化时刷新等级面板

use bevy::prelude::*;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::core::{events::LogEvent, resources::GameConfig, states::AppState};
use crate::inventory::components::{display_header, Inventory, ItemKey};
use crate::leveling::components::{LevelManager, LevelSnapshot};
use crate::leveling::events::LevelingUpdated;

/// 物品回调把 id 推进来，显示系统每帧取走
#[derive(Resource, Default, Clone)]
pub struct DisplayQueue(Arc<Mutex<VecDeque<String>>>);

impl DisplayQueue {
    fn push(&self, id: &str) {
        if let Ok(mut queue) = self.0.lock() {
            queue.push_back(id.to_string());
        }
    }

    /// 取出全部待刷新的 id，去重并保持先后顺序
    fn drain(&self) -> Vec<String> {
        let Ok(mut queue) = self.0.lock() else {
            return Vec::new();
        };
        let mut ids: Vec<String> = Vec::new();
        for id in queue.drain(..) {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }
}

pub struct DebugDisplayPlugin;
impl Plugin for DebugDisplayPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DisplayQueue>()
            .add_systems(OnEnter(AppState::InGame), register_item_displays)
            .add_systems(
                PostUpdate,
                (refresh_item_displays, show_leveling_panel).run_if(in_state(AppState::InGame)),
            );
    }
}

pub fn leveling_panel(snapshot: &LevelSnapshot) -> String {
    format!(
        "Prestige: {} | Level: {} | Experience: {} | Required: {}",
        snapshot.prestige,
        snapshot.display_level(),
        snapshot.experience,
        snapshot.experience_to_next
    )
}

fn register_item_displays(
    mut inventory: ResMut<Inventory>,
    queue: Res<DisplayQueue>,
    config: Res<GameConfig>,
    mut log: EventWriter<LogEvent>,
) {
    let category = config.debug.display_category;
    let ids: Vec<String> = inventory.entries(category).map(|e| e.id().to_string()).collect();

    for id in &ids {
        let queue = queue.clone();
        let tag = id.clone();
        let key = ItemKey::Typed(category, id);
        if let Err(err) = inventory.register_update_callback(key, move || queue.push(&tag)) {
            warn!("无法注册显示回调: {err}");
        }
    }
    debug!("已为分类 {category} 注册 {} 个显示回调", ids.len());

    let mut lines = vec![format!("[{category}]"), display_header()];
    lines.extend(inventory.entries(category).map(|e| e.display_line()));
    log.write(LogEvent(lines.join("\n")));
}

fn refresh_item_displays(
    inventory: Res<Inventory>,
    queue: Res<DisplayQueue>,
    mut log: EventWriter<LogEvent>,
) {
    for id in queue.drain() {
        match inventory.entry(ItemKey::Id(&id)) {
            Ok(entry) => {
                log.write(LogEvent(entry.display_line()));
            }
            Err(err) => warn!("显示刷新失败: {err}"),
        }
    }
}

fn show_leveling_panel(
    mut events: EventReader<LevelingUpdated>,
    manager: Res<LevelManager>,
    inventory: Res<Inventory>,
    mut log: EventWriter<LogEvent>,
) {
    if events.is_empty() {
        return;
    }
    events.clear();

    match manager.snapshot(&inventory) {
        Ok(snapshot) => {
            log.write(LogEvent(leveling_panel(&snapshot)));
        }
        Err(err) => warn!("等级面板刷新失败: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures;

    fn test_app() -> App {
        let (inventory, manager) = fixtures::services();
        let mut app = App::new();
        app.add_event::<LogEvent>()
            .add_event::<LevelingUpdated>()
            .init_resource::<DisplayQueue>()
            .init_resource::<GameConfig>()
            .insert_resource(inventory)
            .insert_resource(manager)
            .add_systems(Startup, register_item_displays)
            .add_systems(Update, (refresh_item_displays, show_leveling_panel));
        app.update();
        app
    }

    fn logs(app: &App) -> Vec<String> {
        let events = app.world().resource::<Events<LogEvent>>();
        events.get_cursor().read(events).map(|ev| ev.0.clone()).collect()
    }

    #[test]
    fn registration_prints_the_configured_category() {
        let app = test_app();
        let logs = logs(&app);
        assert_eq!(logs.len(), 1);
        assert!(logs[0].starts_with("[resources]"));
        // 标题 + 表头 + 10 个资源
        assert_eq!(logs[0].lines().count(), 12);
    }

    #[test]
    fn changed_items_are_refreshed_once_per_frame() {
        let mut app = test_app();
        {
            let mut inventory = app.world_mut().resource_mut::<Inventory>();
            inventory.add(ItemKey::Id("fuel"), 5).unwrap();
            inventory.add(ItemKey::Id("fuel"), 5).unwrap();
            // 不在显示分类里
            inventory.add(ItemKey::Id("smCargo"), 1).unwrap();
        }
        app.update();

        let refreshed: Vec<_> = logs(&app).into_iter().filter(|l| l.starts_with("fuel")).collect();
        assert_eq!(refreshed.len(), 1);
        assert!(refreshed[0].contains("10"));
        assert!(refreshed[0].ends_with("yes"));
        assert!(!logs(&app).iter().any(|l| l.starts_with("smCargo")));
    }

    #[test]
    fn leveling_panel_follows_updates() {
        let mut app = test_app();
        app.world_mut().send_event(LevelingUpdated);
        app.update();

        let panel = logs(&app).into_iter().find(|l| l.starts_with("Prestige")).unwrap();
        assert_eq!(panel, "Prestige: 0 | Level: 1 | Experience: 0 | Required: 204");
    }
}
