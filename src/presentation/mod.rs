//! 展示层（Presentation Layer）
//!
//! - `intent` - 用户意图及交互命令解析
//! - `view` - 会话状态到视图的纯投影，包含操作禁用规则
//! - `render` - 视图渲染为终端文本
//!
//! 展示层不修改会话状态，所有修改都经由 `App::dispatch`。

pub mod intent;
pub mod render;
pub mod view;

pub use intent::{Intent, IntentKind, HELP_TEXT};
pub use render::{render, render_gauge};
pub use view::{project, Band, Gauge, SessionView};
