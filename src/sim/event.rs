//! 事件 trait 与调度项
//!
//! 定义仿真事件接口以及事件队列中的调度项（含优先级比较）。

use super::simulator::Simulator;
use super::time::SimTime;
use super::world::World;
use std::cmp::Ordering;

/// 事件：可被调度执行。使用 `self: Box<Self>` 以支持 move/所有权转移。
pub trait Event: Send + 'static {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World);
}

/// 调度项：执行时间 + 入队序号 + 事件对象。
///
/// 同一时刻的事件按入队顺序执行，这是“损坏先于交付”等时序保证的基础。
pub struct ScheduledEvent {
    pub(crate) at: SimTime,
    pub(crate) seq: u64,
    pub(crate) ev: Box<dyn Event>,
}

impl ScheduledEvent {
    pub fn at(&self) -> SimTime {
        self.at
    }
}

// BinaryHeap 是 max-heap；最早时间（其次最小序号）需要排在堆顶，因此反向比较。
impl Ord for ScheduledEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .at
            .cmp(&self.at)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ScheduledEvent {
    fn eq(&self, other: &Self) -> bool {
        self.at == other.at && self.seq == other.seq
    }
}

impl Eq for ScheduledEvent {}
