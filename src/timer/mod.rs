//! 定时器原语
//!
//! 可暂停、可恢复、可停止的单次/重复延迟回调。
//!
//! 定时器本身不持有闭包：每个定时器携带一个 `target` 值，到期时由宿主世界
//! （[`TimerHost`]）根据 target 分派。取消依靠“代数”（generation）：暂停、停止、
//! 重新装填都会让代数加一，队列里已经排好的旧 [`TimerFired`] 事件执行时发现代数
//! 不匹配就直接丢弃，因此即使回调已经入队也不会再触发。

mod table;
mod timer_fired;

pub use table::{TimerId, TimerState, Timers};
pub use timer_fired::TimerFired;

use crate::sim::{Simulator, World};

/// 定时器宿主：拥有定时器表，并负责执行到期的 target。
pub trait TimerHost: World + Sized {
    type Target: Copy + std::fmt::Debug + Send + 'static;

    fn timers(&mut self) -> &mut Timers<Self>;

    /// 定时器到期回调。调用时定时器已处于 ENDED（或已为下一轮重新装填）。
    fn on_timer(&mut self, id: TimerId, target: Self::Target, sim: &mut Simulator);
}
