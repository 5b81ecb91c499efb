//! 事件记录（用于离线回放/可视化）
//!
//! 把核心发出的每一个通知记成一条结构化 JSON 事件，而不是去解析文本日志。

mod types;

pub use types::{EventLog, LoggedEvent, LoggedEventKind};
