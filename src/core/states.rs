use bevy::prelude::*;

/// 应用的大状态
#[derive(States, Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
pub enum AppState {
    #[default]
    Startup,
    /// 等待物品目录和等级表加载
    Loading,
    InGame,
    /// 数据出错或收到退出命令
    Shutdown,
}
