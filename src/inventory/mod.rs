pub mod components;
pub mod events;
mod systems;

use bevy::prelude::*;
use crate::core::states::AppState;
use events::*;
use systems::*;

pub struct InventoryPlugin;
impl Plugin for InventoryPlugin {
    fn build(&self, app: &mut App) {
        // Inventory 资源由数据加载完成后插入
        app
            .add_event::<SetItemCountEvent>()
            .add_event::<AddItemCountEvent>()
            .add_event::<ResetCategoryEvent>()
            .add_event::<ListInventoryEvent>()
            .add_systems(
                Update,
                (
                    apply_item_changes,
                    print_inventory,
                )
                    .chain()
                    .run_if(in_state(AppState::InGame)),
            );
    }
}
