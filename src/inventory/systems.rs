use super::{components::*, events::*};
use crate::core::events::LogEvent;
use bevy::prelude::*;

/// 处理 set / give / reset，顺序固定为 set → add → reset
pub fn apply_item_changes(
    mut ev_set: EventReader<SetItemCountEvent>,
    mut ev_add: EventReader<AddItemCountEvent>,
    mut ev_reset: EventReader<ResetCategoryEvent>,
    mut inventory: ResMut<Inventory>,
    mut log_event: EventWriter<LogEvent>,
) {
    for ev in ev_set.read() {
        match inventory.set(ev.address.as_key(), ev.value, ev.reset) {
            Ok(()) => info!("设置 {} = {}", ev.address, ev.value),
            Err(err) => {
                warn!("设置数量失败: {err}");
                log_event.write(LogEvent(err.to_string()));
            }
        }
    }

    for ev in ev_add.read() {
        match inventory.add(ev.address.as_key(), ev.delta) {
            Ok(()) => {
                let name = inventory
                    .entry(ev.address.as_key())
                    .map(|entry| entry.name().to_string())
                    .unwrap_or_else(|_| ev.address.to_string());
                info!("获得 {name} ×{}", ev.delta);
            }
            Err(err) => {
                warn!("增加数量失败: {err}");
                log_event.write(LogEvent(err.to_string()));
            }
        }
    }

    for ev in ev_reset.read() {
        inventory.reset_category(ev.category);
        info!("已清零分类 {}", ev.category);
    }
}

/// 打印一个分类
pub fn print_inventory(
    mut ev_list: EventReader<ListInventoryEvent>,
    inventory: Res<Inventory>,
    mut log_event: EventWriter<LogEvent>,
) {
    for ev in ev_list.read() {
        let mut lines = vec![format!("[{}]", ev.category), display_header()];
        lines.extend(inventory.entries(ev.category).map(|entry| entry.display_line()));
        if inventory.category_len(ev.category) == 0 {
            lines.push("  (empty)".to_string());
        }
        log_event.write(LogEvent(lines.join("\n")));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures;
    use crate::data::schema::ItemCategory;

    fn test_app() -> App {
        let mut app = App::new();
        app.add_event::<LogEvent>()
            .add_event::<SetItemCountEvent>()
            .add_event::<AddItemCountEvent>()
            .add_event::<ResetCategoryEvent>()
            .add_event::<ListInventoryEvent>()
            .insert_resource(fixtures::inventory())
            .add_systems(Update, (apply_item_changes, print_inventory).chain());
        app
    }

    fn logs(app: &App) -> Vec<String> {
        let events = app.world().resource::<Events<LogEvent>>();
        events.get_cursor().read(events).map(|ev| ev.0.clone()).collect()
    }

    #[test]
    fn events_mutate_the_inventory() {
        let mut app = test_app();
        app.world_mut().send_event(SetItemCountEvent {
            address: ItemAddress::Id("coins".into()),
            value: 40,
            reset: true,
        });
        app.world_mut().send_event(AddItemCountEvent {
            address: ItemAddress::Typed(ItemCategory::Resource, "coins".into()),
            delta: 2,
        });
        app.world_mut().send_event(AddItemCountEvent {
            address: ItemAddress::Index(ItemCategory::Cargo, 0),
            delta: 3,
        });
        app.update();

        let inventory = app.world().resource::<Inventory>();
        let coins = inventory.entry(ItemKey::Id("coins")).unwrap();
        assert_eq!(coins.amount(), 42);
        assert_eq!(coins.amount_delta(), 2);
        assert_eq!(inventory.amount(ItemKey::Id("smCargo")).unwrap(), 3);
        assert!(logs(&app).is_empty());
    }

    #[test]
    fn reset_runs_after_additions_in_the_same_frame() {
        let mut app = test_app();
        app.world_mut().send_event(AddItemCountEvent {
            address: ItemAddress::Id("glass".into()),
            delta: 9,
        });
        app.world_mut().send_event(ResetCategoryEvent {
            category: ItemCategory::Resource,
        });
        app.update();

        let inventory = app.world().resource::<Inventory>();
        assert_eq!(inventory.amount(ItemKey::Id("glass")).unwrap(), 0);
    }

    #[test]
    fn unknown_items_are_reported_not_applied() {
        let mut app = test_app();
        app.world_mut().send_event(AddItemCountEvent {
            address: ItemAddress::Id("gold".into()),
            delta: 1,
        });
        app.update();

        assert_eq!(logs(&app), vec!["未知物品 id: gold".to_string()]);
        assert_eq!(app.world().resource::<Inventory>().pending_changes().count(), 0);
    }

    #[test]
    fn listing_prints_header_and_every_entry() {
        let mut app = test_app();
        app.world_mut().send_event(ListInventoryEvent {
            category: ItemCategory::Token,
        });
        app.update();

        let logs = logs(&app);
        assert_eq!(logs.len(), 1);
        let lines: Vec<_> = logs[0].lines().collect();
        assert_eq!(lines[0], "[tokens]");
        assert!(lines[1].starts_with("ID"));
        assert_eq!(lines.len(), 5);
        assert!(lines[2].starts_with("token0"));
        assert!(lines[2].ends_with("no"));
    }
}
