//! 世界 trait
//!
//! 定义仿真世界接口：事件执行时通过 `as_any_mut` 向下转型到具体世界。

use super::simulator::Simulator;
use std::any::Any;

/// 仿真世界：由业务层实现（例如 ARQ 网络：节点、信道、定时器）。
pub trait World: Any {
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn on_tick(&mut self, _sim: &mut Simulator) {}
}
