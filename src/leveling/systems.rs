use bevy::prelude::*;

use super::components::LevelManager;
use super::events::*;
use super::permissions::{gate_transform_scale, PermissionGate, PermissionKind, PermissionObjects};
use crate::core::events::LogEvent;
use crate::inventory::components::Inventory;

/// 进入游戏时按权限表生成场景对象，然后把等级系统重置为 (0, 0)
pub fn setup_permission_gates(
    mut commands: Commands,
    mut objects: ResMut<PermissionObjects>,
    manager: Res<LevelManager>,
    mut init: EventWriter<InitializeLevelingEvent>,
) {
    for kind in PermissionKind::ALL {
        let base_z = match kind {
            PermissionKind::Teleport => 1.0,
            PermissionKind::Wearable => 7.0,
        };
        for (i, def) in manager.permission_table(kind).iter().enumerate() {
            let entity = commands
                .spawn((
                    Name::new(def.name.clone()),
                    Transform::from_xyz(15.0, 1.0, base_z + i as f32)
                        .with_scale(gate_transform_scale(true)),
                    Visibility::Inherited,
                ))
                .id();
            let index = objects.register(kind, entity);
            commands.entity(entity).insert(PermissionGate { kind, index });
        }
    }
    debug!(
        "权限对象已生成: {} 个传送点, {} 个领取点",
        objects.slots(PermissionKind::Teleport).len(),
        objects.slots(PermissionKind::Wearable).len()
    );

    init.write(InitializeLevelingEvent {
        experience: 0,
        prestige: 0,
    });
}

pub fn handle_initialize(
    mut events: EventReader<InitializeLevelingEvent>,
    mut manager: ResMut<LevelManager>,
    mut inventory: ResMut<Inventory>,
    mut objects: ResMut<PermissionObjects>,
    mut updated: EventWriter<LevelingUpdated>,
) {
    for ev in events.read() {
        match manager.initialize(ev.experience, ev.prestige, &mut inventory, &mut *objects) {
            Ok(()) => {
                updated.write(LevelingUpdated);
            }
            Err(err) => error!("等级系统初始化失败: {err}"),
        }
    }
}

pub fn handle_set_experience(
    mut events: EventReader<SetExperienceEvent>,
    mut manager: ResMut<LevelManager>,
    mut inventory: ResMut<Inventory>,
    mut objects: ResMut<PermissionObjects>,
    mut updated: EventWriter<LevelingUpdated>,
) {
    for ev in events.read() {
        match manager.set_experience(ev.value, &mut inventory, &mut *objects) {
            Ok(()) => {
                updated.write(LevelingUpdated);
            }
            Err(err) => warn!("设置经验失败: {err}"),
        }
    }
}

pub fn handle_add_experience(
    mut events: EventReader<AddExperienceEvent>,
    mut manager: ResMut<LevelManager>,
    mut inventory: ResMut<Inventory>,
    mut objects: ResMut<PermissionObjects>,
    mut level_up: EventWriter<LevelUpEvent>,
    mut updated: EventWriter<LevelingUpdated>,
) {
    for ev in events.read() {
        match manager.add_experience(ev.amount, &mut inventory, &mut *objects) {
            Ok(progress) => {
                if progress.to > progress.from {
                    level_up.write(LevelUpEvent {
                        from: progress.from,
                        to: progress.to,
                    });
                }
                updated.write(LevelingUpdated);
            }
            Err(err) => warn!("增加经验失败: {err}"),
        }
    }
}

pub fn handle_prestige(
    mut events: EventReader<AttemptPrestigeEvent>,
    mut manager: ResMut<LevelManager>,
    mut inventory: ResMut<Inventory>,
    mut objects: ResMut<PermissionObjects>,
    mut prestiged: EventWriter<PrestigeEvent>,
    mut updated: EventWriter<LevelingUpdated>,
    mut log: EventWriter<LogEvent>,
) {
    for _ in events.read() {
        match manager.attempt_prestige(&mut inventory, &mut *objects) {
            Ok(true) => {
                prestiged.write(PrestigeEvent {
                    prestige: manager.prestige(),
                });
                log.write(LogEvent(format!("转生成功，当前转生次数 {}", manager.prestige())));
                updated.write(LevelingUpdated);
            }
            Ok(false) => {
                log.write(LogEvent(format!(
                    "需要达到 {} 级才能转生",
                    manager.curve().level_cap + 1
                )));
            }
            Err(err) => warn!("转生失败: {err}"),
        }
    }
}

/// 升级提示：每一级的奖励和新解锁的权限
pub fn announce_level_up(
    mut events: EventReader<LevelUpEvent>,
    manager: Res<LevelManager>,
    mut log: EventWriter<LogEvent>,
) {
    for ev in events.read() {
        log.write(LogEvent(format!("升级！{} → {}", ev.from + 1, ev.to + 1)));
        for level in ev.from + 1..=ev.to {
            let unlocked = manager.permissions_summary(level);
            if !unlocked.is_empty() {
                log.write(LogEvent(format!("解锁:\n{unlocked}")));
            }
        }
    }
}

/// 把激活状态同步到场景对象上
pub fn sync_permission_gates(
    objects: Res<PermissionObjects>,
    mut gates: Query<(&PermissionGate, &mut Transform, &mut Visibility)>,
) {
    for (gate, mut transform, mut visibility) in &mut gates {
        let Some(active) = objects.is_active(gate.kind, gate.index) else {
            continue;
        };
        transform.scale = gate_transform_scale(active);
        *visibility = if active {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures;
    use crate::inventory::components::ItemKey;

    fn test_app() -> App {
        let (inventory, manager) = fixtures::services();
        let mut app = App::new();
        app.add_event::<LogEvent>()
            .add_event::<InitializeLevelingEvent>()
            .add_event::<SetExperienceEvent>()
            .add_event::<AddExperienceEvent>()
            .add_event::<AttemptPrestigeEvent>()
            .add_event::<LevelUpEvent>()
            .add_event::<PrestigeEvent>()
            .add_event::<LevelingUpdated>()
            .insert_resource(inventory)
            .insert_resource(manager)
            .init_resource::<PermissionObjects>()
            .add_systems(Startup, setup_permission_gates)
            .add_systems(
                Update,
                (
                    handle_initialize,
                    handle_set_experience,
                    handle_add_experience,
                    handle_prestige,
                    announce_level_up,
                    sync_permission_gates,
                )
                    .chain(),
            );
        app.update();
        app
    }

    fn gate_visibility(app: &mut App, kind: PermissionKind, index: usize) -> (Vec3, Visibility) {
        let mut query = app.world_mut().query::<(&PermissionGate, &Transform, &Visibility)>();
        query
            .iter(app.world())
            .find(|(gate, _, _)| gate.kind == kind && gate.index == index)
            .map(|(_, transform, visibility)| (transform.scale, *visibility))
            .unwrap()
    }

    fn drain<E: Event + Copy>(app: &App) -> Vec<E> {
        let events = app.world().resource::<Events<E>>();
        events.get_cursor().read(events).copied().collect()
    }

    #[test]
    fn gates_spawn_and_start_at_level_one_state() {
        let mut app = test_app();

        let mut query = app.world_mut().query::<&PermissionGate>();
        assert_eq!(query.iter(app.world()).count(), 8);

        assert_eq!(
            gate_visibility(&mut app, PermissionKind::Teleport, 0),
            (Vec3::new(0.5, 2.0, 0.5), Visibility::Inherited)
        );
        assert_eq!(
            gate_visibility(&mut app, PermissionKind::Teleport, 1),
            (Vec3::ZERO, Visibility::Hidden)
        );
        assert_eq!(
            gate_visibility(&mut app, PermissionKind::Wearable, 0),
            (Vec3::ZERO, Visibility::Hidden)
        );
    }

    #[test]
    fn experience_event_levels_up_and_opens_gates() {
        let mut app = test_app();
        app.world_mut().send_event(AddExperienceEvent { amount: 20409 });
        app.update();

        let manager = app.world().resource::<LevelManager>();
        let inventory = app.world().resource::<Inventory>();
        assert_eq!(manager.level(inventory).unwrap(), 10);
        assert_eq!(inventory.amount(ItemKey::Id("fuel")).unwrap(), 2500);
        assert_eq!(drain::<LevelUpEvent>(&app), vec![LevelUpEvent { from: 0, to: 10 }]);

        assert_eq!(
            gate_visibility(&mut app, PermissionKind::Teleport, 1).1,
            Visibility::Inherited
        );
        assert_eq!(
            gate_visibility(&mut app, PermissionKind::Wearable, 0).1,
            Visibility::Inherited
        );
        assert_eq!(
            gate_visibility(&mut app, PermissionKind::Teleport, 2).1,
            Visibility::Hidden
        );
    }

    #[test]
    fn prestige_event_needs_the_cap() {
        let mut app = test_app();
        app.world_mut().send_event(AttemptPrestigeEvent);
        app.update();
        assert!(drain::<PrestigeEvent>(&app).is_empty());

        let max = app.world().resource::<LevelManager>().experience_max();
        app.world_mut().send_event(SetExperienceEvent { value: max });
        app.world_mut().send_event(AttemptPrestigeEvent);
        app.update();

        assert_eq!(drain::<PrestigeEvent>(&app), vec![PrestigeEvent { prestige: 1 }]);
        let manager = app.world().resource::<LevelManager>();
        let inventory = app.world().resource::<Inventory>();
        assert_eq!(manager.experience(inventory).unwrap(), 0);
        assert_eq!(
            gate_visibility(&mut app, PermissionKind::Wearable, 2).1,
            Visibility::Hidden
        );
    }
}
