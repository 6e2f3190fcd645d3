use bevy::prelude::*;

pub mod events;
pub mod resources;
pub mod states;

/// 核心插件：注册全局资源 / 事件 / 状态
pub struct CorePlugin;

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        use states::AppState;

        // main 里已经插入了读取好的配置，这里只在缺失时补默认值
        app.init_state::<AppState>()
            .add_event::<events::LogEvent>()
            .init_resource::<resources::GameConfig>()
            .add_systems(Startup, events::announce_startup)
            .add_systems(OnEnter(AppState::Shutdown), events::exit_on_shutdown);
    }
}
