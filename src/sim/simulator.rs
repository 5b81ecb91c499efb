//! 仿真器
//!
//! 定义事件驱动仿真器，维护当前时间与事件队列。

use super::event::{Event, ScheduledEvent};
use super::time::SimTime;
use super::world::World;
use std::collections::BinaryHeap;
use tracing::{debug, info, trace};

/// 事件驱动仿真器：维护当前时间与事件队列。
#[derive(Default)]
pub struct Simulator {
    now: SimTime,
    next_seq: u64,
    executed: u64,
    q: BinaryHeap<ScheduledEvent>,
}

impl Simulator {
    /// 获取当前仿真时间
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// 队列中尚未执行的事件数（包括已经失效、执行时会被忽略的定时器事件）
    pub fn pending(&self) -> usize {
        self.q.len()
    }

    /// 已执行的事件总数
    pub fn executed(&self) -> u64 {
        self.executed
    }

    /// 调度事件在指定时刻执行；早于当前时间的时刻按当前时间处理。
    pub fn schedule<E: Event>(&mut self, at: SimTime, ev: E) {
        let at = at.max(self.now);
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        trace!(
            now = %self.now,
            at = %at,
            seq,
            event_type = std::any::type_name::<E>(),
            "调度事件"
        );
        self.q.push(ScheduledEvent {
            at,
            seq,
            ev: Box::new(ev),
        });
    }

    /// 调度事件在 `delay` 之后执行
    pub fn schedule_in<E: Event>(&mut self, delay: SimTime, ev: E) {
        let at = self.now.saturating_add(delay);
        self.schedule(at, ev);
    }

    /// 执行队首的一个事件；队列为空时返回 false。
    pub fn step(&mut self, world: &mut dyn World) -> bool {
        let Some(item) = self.q.pop() else {
            return false;
        };
        self.now = item.at;
        self.executed += 1;
        item.ev.execute(self, world);
        world.on_tick(self);
        true
    }

    /// 运行直到事件队列为空或到达 `until`（恰好在 `until` 的事件也会执行）。
    #[tracing::instrument(skip(self, world), fields(until = %until))]
    pub fn run_until(&mut self, until: SimTime, world: &mut dyn World) {
        let before = self.executed;
        while self.q.peek().is_some_and(|top| top.at() <= until) {
            self.step(world);
        }
        self.now = self.now.max(until);
        debug!(
            executed = self.executed - before,
            remaining_queue = self.q.len(),
            now = %self.now,
            "run_until 结束"
        );
    }

    /// 运行所有事件直到队列为空。
    ///
    /// 注意：重复定时器（例如发送节拍）会让队列永不为空，此时应使用 [`Simulator::run_until`]。
    #[tracing::instrument(skip(self, world))]
    pub fn run(&mut self, world: &mut dyn World) {
        info!("▶️  开始运行仿真");
        let before = self.executed;
        while self.step(world) {}
        info!(
            total_events = self.executed - before,
            final_time = %self.now,
            "✅ 仿真完成"
        );
    }
}
