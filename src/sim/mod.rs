//! 仿真核心模块
//!
//! 单线程离散事件仿真：仿真时间、事件、世界和仿真器。
//! 所有节点/信道/定时器状态的修改都发生在事件执行期间，保证同一时间线上不会并发。

mod event;
mod simulator;
mod time;
mod world;

pub use event::{Event, ScheduledEvent};
pub use simulator::Simulator;
pub use time::SimTime;
pub use world::World;
