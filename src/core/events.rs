use bevy::app::AppExit;
use bevy::prelude::*;

/// 控制台输出的一行文字
#[derive(Event, Debug, Clone)]
pub struct LogEvent(pub String);

pub fn announce_startup(mut writer: EventWriter<LogEvent>) {
    writer.write(LogEvent("Progression demo 启动中，输入 help 查看命令".into()));
}

/// 进入 Shutdown 时退出程序
pub fn exit_on_shutdown(mut app_exit: EventWriter<AppExit>) {
    info!("进入 Shutdown 状态，准备退出");
    app_exit.write(AppExit::Success);
}
