//! 场景：描述、加载与组装
//!
//! 一个场景 = 协议 + 信道参数 + 发送节拍 + 若干按时间执行的手动操作。

mod build;
mod driver;
mod model;

pub use build::{build_link, Link, LinkConfig};
pub use driver::ScriptedAction;
pub use model::{Action, ActionSpec, Protocol, Scenario};
