//! 文字 CLI：读取 stdin → 解析命令 → 发出事件 / 查询并打印

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use once_cell::sync::Lazy;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use super::debug_display::leveling_panel;
use crate::core::{events::LogEvent, states::AppState};
use crate::data::{schema::ItemCatalog, schema::ItemCategory, DataAssets};
use crate::inventory::components::{Inventory, ItemAddress};
use crate::inventory::events::{
    AddItemCountEvent, ListInventoryEvent, ResetCategoryEvent, SetItemCountEvent,
};
use crate::leveling::components::LevelManager;
use crate::leveling::events::{
    AddExperienceEvent, AttemptPrestigeEvent, InitializeLevelingEvent, SetExperienceEvent,
};

static CLI_BUFFER: Lazy<Arc<Mutex<VecDeque<String>>>> =
    Lazy::new(|| Arc::new(Mutex::new(VecDeque::new())));

/// `exp` 不带参数时加的经验
const DEFAULT_EXPERIENCE_GAIN: i64 = 100;

const HELP: &str = "命令列表:
  help                      查看帮助
  status                    查看当前状态
  exit / quit               退出程序
  items [token]             列出物品目录，或用 id / uuid / 名称查询单个物品
  inv [category]            查看一个分类（默认 resources）
  give <item> [count]       增加物品数量（item 可写 id、分类:id、分类:下标）
  set <item> <value>        设置物品数量
  reset <category>          把一个分类清零
  exp [amount]              增加经验（默认 100）
  setexp <value>            直接设置经验，不发奖励
  init [exp] [prestige]     重置等级系统（默认 0 0）
  level                     查看等级面板
  prestige                  尝试转生
  rewards [level]           查看某一级的奖励（默认下一级）
  perms [level]             查看某一级解锁的权限（默认下一级）
  save / load               与服务器同步";

/// 插件入口
pub struct DebugCliPlugin;
impl Plugin for DebugCliPlugin {
    fn build(&self, app: &mut App) {
        {
            let buffer = CLI_BUFFER.clone();
            std::thread::spawn(move || {
                use std::io::{self, BufRead};
                let stdin = io::stdin();
                for line in stdin.lock().lines().map_while(Result::ok) {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    if let Ok(mut buf) = buffer.lock() {
                        buf.push_back(line.to_string());
                    }
                }
            });
        }
        app
            // 事件：原始输入行
            .add_event::<CliLine>()
            // 每帧从 buffer 取出所有命令行写入事件
            .add_systems(Update, read_stdin)
            // 仅在 InGame 处理命令
            .add_systems(
                Update,
                execute_cli_commands
                    .after(read_stdin)
                    .run_if(in_state(AppState::InGame)),
            );
    }
}

/* ---------------------------- 事件与枚举 ---------------------------- */

/// 终端敲的一整行
#[derive(Event)]
struct CliLine(String);

/// 我们支持的命令
#[derive(Debug, PartialEq)]
enum Command {
    Help,
    Status,
    Exit,
    Items(Option<String>), // None=全部；Some(token)=按 id/uuid/name 查询
    Inventory(ItemCategory),
    Give { address: ItemAddress, count: i64 },
    Set { address: ItemAddress, value: i64 },
    Reset(ItemCategory),
    Exp(i64),
    SetExp(i64),
    Init { experience: i64, prestige: u32 },
    Level,
    Prestige,
    Rewards(Option<u32>),
    Perms(Option<u32>),
    Save,
    Load,
    Usage(&'static str),
    Invalid(String),
    Unsupported(String),
}

/// 命令会用到的所有事件写入器
#[derive(SystemParam)]
struct CommandWriters<'w> {
    log: EventWriter<'w, LogEvent>,
    set_item: EventWriter<'w, SetItemCountEvent>,
    add_item: EventWriter<'w, AddItemCountEvent>,
    reset: EventWriter<'w, ResetCategoryEvent>,
    list: EventWriter<'w, ListInventoryEvent>,
    init: EventWriter<'w, InitializeLevelingEvent>,
    add_exp: EventWriter<'w, AddExperienceEvent>,
    set_exp: EventWriter<'w, SetExperienceEvent>,
    prestige: EventWriter<'w, AttemptPrestigeEvent>,
}

impl CommandWriters<'_> {
    fn say(&mut self, text: impl Into<String>) {
        self.log.write(LogEvent(text.into()));
    }
}

/* ---------------------------- 读取 stdin ---------------------------- */

fn read_stdin(mut writer: EventWriter<CliLine>) {
    let Ok(mut buffer) = CLI_BUFFER.lock() else {
        return;
    };
    while let Some(line) = buffer.pop_front() {
        writer.write(CliLine(line));
    }
}

/* ---------------------------- 命令执行 ---------------------------- */

#[allow(clippy::too_many_arguments)]
fn execute_cli_commands(
    mut line_reader: EventReader<CliLine>,
    mut out: CommandWriters,
    state: Res<State<AppState>>,
    mut next: ResMut<NextState<AppState>>,
    data: Res<DataAssets>,
    catalogs: Res<Assets<ItemCatalog>>,
    inventory: Option<Res<Inventory>>,
    manager: Option<Res<LevelManager>>,
) {
    for CliLine(input) in line_reader.read() {
        debug!("CLI: {input}");
        match parse_command(input) {
            Command::Help => out.say(HELP),

            Command::Status => {
                let items = data.catalog(&catalogs).map_or(0, |c| c.item_count());
                let pending = inventory.as_ref().map_or(0, |inv| inv.pending_changes().count());
                out.say(format!(
                    "State: {:?}, Items Loaded: {items}, Pending Changes: {pending}",
                    state.get()
                ));
            }

            Command::Exit => {
                out.say("Bye~");
                next.set(AppState::Shutdown);
            }

            Command::Items(token) => {
                let Some(catalog) = data.catalog(&catalogs) else {
                    out.say("物品目录未加载");
                    continue;
                };
                match token {
                    None => {
                        // 全部列出
                        for (category, def) in catalog.iter() {
                            out.say(format!(
                                "{} | {category} | {} | {}",
                                uuid_from_id(&def.id),
                                def.id,
                                def.name
                            ));
                        }
                    }
                    Some(t) => match find_item(catalog, &t) {
                        Some((category, def)) => {
                            let mut detail = format!(
                                "==================================================
UUID     : {}
ID       : {}
Name     : {}
Category : {category}
Rarity   : {}
Desc     : {}",
                                uuid_from_id(&def.id),
                                def.id,
                                def.name,
                                def.rarity,
                                def.desc
                            );
                            for content in &def.contents {
                                detail.push_str(&format!(
                                    "\nContains : {:?} ×{}",
                                    content.kind, content.count
                                ));
                            }
                            detail.push_str("\n==================================================");
                            out.say(detail);
                        }
                        None => out.say("未找到匹配物品"),
                    },
                }
            }

            Command::Inventory(category) => {
                out.list.write(ListInventoryEvent { category });
            }

            Command::Give { address, count } => {
                out.add_item.write(AddItemCountEvent {
                    address,
                    delta: count,
                });
            }

            Command::Set { address, value } => {
                out.set_item.write(SetItemCountEvent {
                    address,
                    value,
                    reset: false,
                });
            }

            Command::Reset(category) => {
                out.reset.write(ResetCategoryEvent { category });
            }

            Command::Exp(amount) => {
                out.add_exp.write(AddExperienceEvent { amount });
            }

            Command::SetExp(value) => {
                out.set_exp.write(SetExperienceEvent { value });
            }

            Command::Init {
                experience,
                prestige,
            } => {
                out.init.write(InitializeLevelingEvent {
                    experience,
                    prestige,
                });
            }

            Command::Prestige => {
                out.prestige.write(AttemptPrestigeEvent);
            }

            Command::Level => {
                let (Some(manager), Some(inventory)) = (&manager, &inventory) else {
                    out.say("等级系统未就绪");
                    continue;
                };
                match manager.snapshot(inventory) {
                    Ok(snapshot) => out.say(leveling_panel(&snapshot)),
                    Err(err) => out.say(err.to_string()),
                }
            }

            Command::Rewards(level) => {
                let (Some(manager), Some(inventory)) = (&manager, &inventory) else {
                    out.say("等级系统未就绪");
                    continue;
                };
                let level = level.unwrap_or_else(|| next_level(manager, inventory));
                let rewards = manager.rewards_summary(level);
                if rewards.is_empty() {
                    out.say(format!("第 {level} 级没有奖励"));
                } else {
                    out.say(format!("第 {level} 级奖励:\n{rewards}"));
                }
            }

            Command::Perms(level) => {
                let (Some(manager), Some(inventory)) = (&manager, &inventory) else {
                    out.say("等级系统未就绪");
                    continue;
                };
                let level = level.unwrap_or_else(|| next_level(manager, inventory));
                let unlocked = manager.permissions_summary(level);
                if unlocked.is_empty() {
                    out.say(format!("第 {level} 级没有解锁权限"));
                } else {
                    out.say(format!("第 {level} 级解锁:\n{unlocked}"));
                }
            }

            Command::Save => {
                let Some(inventory) = &inventory else {
                    out.say("物品栏未就绪");
                    continue;
                };
                let pending: Vec<String> = inventory
                    .pending_changes()
                    .map(|e| format!("  {} {:+}", e.id(), e.amount_delta()))
                    .collect();
                // TODO: 接入服务器接口后把这些变化提交并调用 get(key, true) 清除标记
                out.say(format!(
                    "服务器同步尚未实现，待同步 {} 个条目:\n{}",
                    pending.len(),
                    pending.join("\n")
                ));
            }

            Command::Load => out.say("服务器同步尚未实现"),

            Command::Usage(usage) => out.say(format!("用法: {usage}")),

            Command::Invalid(reason) => out.say(reason),

            Command::Unsupported(cmd) => out.say(format!("不支持的命令: {cmd}")),
        }
    }
}

/* ---------------------------- 工具函数 ---------------------------- */

fn parse_command(input: &str) -> Command {
    let mut parts = input.split_whitespace();
    let cmd = parts.next().unwrap_or("").to_lowercase();
    let arg1 = parts.next();
    let arg2 = parts.next();

    match cmd.as_str() {
        "help" | "h" | "?" => Command::Help,
        "status" | "s" => Command::Status,
        "exit" | "quit" | "q" => Command::Exit,
        "items" | "item" | "i" => Command::Items(arg1.map(|s| s.to_string())),
        "inventory" | "inv" => match arg1.map(str::parse::<ItemCategory>) {
            None => Command::Inventory(ItemCategory::Resource),
            Some(Ok(category)) => Command::Inventory(category),
            Some(Err(err)) => Command::Invalid(err.to_string()),
        },
        "give" => {
            let (Some(item), Some(count)) = (arg1, parse_number(arg2, 1)) else {
                return Command::Usage("give <item> [count]");
            };
            match item.parse() {
                Ok(address) => Command::Give { address, count },
                Err(err) => Command::Invalid(err.to_string()),
            }
        }
        "set" => {
            let (Some(item), Some(Ok(value))) = (arg1, arg2.map(str::parse::<i64>)) else {
                return Command::Usage("set <item> <value>");
            };
            match item.parse() {
                Ok(address) => Command::Set { address, value },
                Err(err) => Command::Invalid(err.to_string()),
            }
        }
        "reset" => match arg1.map(str::parse::<ItemCategory>) {
            None => Command::Usage("reset <category>"),
            Some(Ok(category)) => Command::Reset(category),
            Some(Err(err)) => Command::Invalid(err.to_string()),
        },
        "exp" | "xp" => match parse_number(arg1, DEFAULT_EXPERIENCE_GAIN) {
            Some(amount) => Command::Exp(amount),
            None => Command::Usage("exp [amount]"),
        },
        "setexp" => match arg1.map(str::parse::<i64>) {
            Some(Ok(value)) => Command::SetExp(value),
            _ => Command::Usage("setexp <value>"),
        },
        "init" | "reset_level" => match (parse_number(arg1, 0), parse_number(arg2, 0)) {
            (Some(experience), Some(prestige)) => Command::Init {
                experience,
                prestige,
            },
            _ => Command::Usage("init [exp] [prestige]"),
        },
        "level" | "lvl" => Command::Level,
        "prestige" => Command::Prestige,
        "rewards" => match arg1.map(str::parse::<u32>) {
            None => Command::Rewards(None),
            Some(Ok(level)) => Command::Rewards(Some(level)),
            Some(Err(_)) => Command::Usage("rewards [level]"),
        },
        "perms" | "permissions" => match arg1.map(str::parse::<u32>) {
            None => Command::Perms(None),
            Some(Ok(level)) => Command::Perms(Some(level)),
            Some(Err(_)) => Command::Usage("perms [level]"),
        },
        "save" => Command::Save,
        "load" => Command::Load,
        other => Command::Unsupported(other.into()),
    }
}

/// 缺省时返回 `default`，写了但解析失败返回 None
fn parse_number<T: std::str::FromStr>(arg: Option<&str>, default: T) -> Option<T> {
    match arg {
        None => Some(default),
        Some(s) => s.parse().ok(),
    }
}

/// 当前等级的下一级，满级时停在上限
fn next_level(manager: &LevelManager, inventory: &Inventory) -> u32 {
    let level = manager.level(inventory).unwrap_or(0);
    (level + 1).min(manager.curve().level_cap)
}

/// id / 名称 / uuid 三种方式查找
fn find_item<'a>(
    catalog: &'a ItemCatalog,
    token: &str,
) -> Option<(ItemCategory, &'a crate::data::schema::ItemDef)> {
    catalog.find(token).or_else(|| {
        catalog
            .iter()
            .find(|(_, def)| uuid_from_id(&def.id).to_string().eq_ignore_ascii_case(token))
    })
}

fn uuid_from_id(id: &str) -> Uuid {
    // 用固定 namespace + id 字节生成版本 5 UUID，保证可重复得到同一值
    Uuid::new_v5(&Uuid::NAMESPACE_OID, id.as_bytes())
}
