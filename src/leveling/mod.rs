pub mod components;
pub mod curve;
pub mod events;
pub mod permissions;
mod systems;

use bevy::prelude::*;
use crate::core::states::AppState;
use events::*;
use permissions::PermissionObjects;
use systems::*;

pub struct LevelingPlugin;
impl Plugin for LevelingPlugin {
    fn build(&self, app: &mut App) {
        app
            .init_resource::<PermissionObjects>()
            .add_event::<InitializeLevelingEvent>()
            .add_event::<SetExperienceEvent>()
            .add_event::<AddExperienceEvent>()
            .add_event::<AttemptPrestigeEvent>()
            .add_event::<LevelUpEvent>()
            .add_event::<PrestigeEvent>()
            .add_event::<LevelingUpdated>()
            .add_systems(OnEnter(AppState::InGame), setup_permission_gates)
            .add_systems(
                Update,
                (
                    handle_initialize,
                    handle_set_experience,
                    handle_add_experience,
                    handle_prestige,
                    announce_level_up,
                    sync_permission_gates.run_if(resource_changed::<PermissionObjects>),
                )
                    .chain()
                    .run_if(in_state(AppState::InGame)),
            );
    }
}
