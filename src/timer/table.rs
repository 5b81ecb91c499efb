//! 定时器表
//!
//! 以 `TimerId` 为下标的定时器 arena，实现 RUNNING/PAUSED/STOPPED/ENDED 状态机。
//! 进入终态的槽位放回空闲链表，下次 `start` 时复用；复用会让槽位的 `epoch`
//! 加一，持有旧 id 的一方之后的调用都落空。

use std::marker::PhantomData;

use super::timer_fired::TimerFired;
use super::TimerHost;
use crate::sim::{SimTime, Simulator};
use tracing::trace;

/// 定时器标识符：槽位下标加上该槽位被复用的次数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId {
    index: usize,
    epoch: u32,
}

impl TimerId {
    pub(crate) fn new(index: usize, epoch: u32) -> Self {
        Self { index, epoch }
    }

    pub fn index(self) -> usize {
        self.index
    }
}

/// 定时器状态。STOPPED 与 ENDED 是终态。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Running,
    Paused,
    Stopped,
    Ended,
}

#[derive(Debug)]
struct Slot<T> {
    state: TimerState,
    duration: SimTime,
    /// 之前各个运行区间累计的已流逝时间
    elapsed: SimTime,
    /// 当前运行区间的起点（仅 RUNNING 时有意义）
    started_at: SimTime,
    repeat: bool,
    /// 同一槽位内单调递增，复用时也不清零
    generation: u64,
    epoch: u32,
    target: T,
}

impl<T> Slot<T> {
    fn is_terminal(&self) -> bool {
        matches!(self.state, TimerState::Stopped | TimerState::Ended)
    }
}

/// 定时器表：由 [`TimerHost`] 持有。
pub struct Timers<H: TimerHost> {
    slots: Vec<Slot<H::Target>>,
    /// 处于终态、可以复用的槽位
    free: Vec<usize>,
    _host: PhantomData<fn() -> H>,
}

impl<H: TimerHost> Default for Timers<H> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            _host: PhantomData,
        }
    }
}

impl<H: TimerHost> Timers<H> {
    /// 创建并立即启动一个定时器。
    pub fn start(
        &mut self,
        sim: &mut Simulator,
        duration: SimTime,
        target: H::Target,
        repeat: bool,
    ) -> TimerId {
        let now = sim.now();
        let (id, generation) = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index];
                slot.state = TimerState::Running;
                slot.duration = duration;
                slot.elapsed = SimTime::ZERO;
                slot.started_at = now;
                slot.repeat = repeat;
                slot.generation += 1;
                slot.epoch = slot.epoch.wrapping_add(1);
                slot.target = target;
                (TimerId::new(index, slot.epoch), slot.generation)
            }
            None => {
                self.slots.push(Slot {
                    state: TimerState::Running,
                    duration,
                    elapsed: SimTime::ZERO,
                    started_at: now,
                    repeat,
                    generation: 0,
                    epoch: 0,
                    target,
                });
                (TimerId::new(self.slots.len() - 1, 0), 0)
            }
        };
        trace!(timer = id.index, epoch = id.epoch, duration = %duration, repeat, ?target, "启动定时器");
        sim.schedule_in(duration, TimerFired::<H>::new(id, generation));
        id
    }

    /// 已分配的槽位数（含空闲槽位）
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// 处于 RUNNING 或 PAUSED 的定时器个数
    pub fn live(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    fn slot(&self, id: TimerId) -> Option<&Slot<H::Target>> {
        self.slots.get(id.index).filter(|s| s.epoch == id.epoch)
    }

    fn slot_mut(&mut self, id: TimerId) -> Option<&mut Slot<H::Target>> {
        self.slots.get_mut(id.index).filter(|s| s.epoch == id.epoch)
    }

    fn release(&mut self, index: usize) {
        debug_assert!(self.slots[index].is_terminal());
        self.free.push(index);
    }

    /// 当前状态；未知的 id 或槽位已被复用时返回 None
    pub fn state(&self, id: TimerId) -> Option<TimerState> {
        self.slot(id).map(|s| s.state)
    }

    pub fn target(&self, id: TimerId) -> Option<H::Target> {
        self.slot(id).map(|s| s.target)
    }

    /// 距离到期还剩多少时间（终态返回 None）
    pub fn remaining(&self, id: TimerId, now: SimTime) -> Option<SimTime> {
        let slot = self.slot(id)?;
        match slot.state {
            TimerState::Running => {
                let run = now.saturating_sub(slot.started_at);
                Some(slot.duration.saturating_sub(slot.elapsed.saturating_add(run)))
            }
            TimerState::Paused => Some(slot.duration.saturating_sub(slot.elapsed)),
            TimerState::Stopped | TimerState::Ended => None,
        }
    }

    /// RUNNING → PAUSED；其它状态下无操作。
    pub fn pause(&mut self, id: TimerId, now: SimTime) {
        let Some(slot) = self.slot_mut(id) else {
            return;
        };
        if slot.state != TimerState::Running {
            return;
        }
        let run = now.saturating_sub(slot.started_at);
        slot.elapsed = slot.elapsed.saturating_add(run);
        slot.state = TimerState::Paused;
        slot.generation += 1;
        trace!(timer = id.index, elapsed = %slot.elapsed, "暂停定时器");
    }

    /// PAUSED → RUNNING，按剩余时间（不小于 0）重新调度；其它状态下无操作。
    pub fn resume(&mut self, id: TimerId, sim: &mut Simulator) {
        let Some(slot) = self.slot_mut(id) else {
            return;
        };
        if slot.state != TimerState::Paused {
            return;
        }
        let remaining = slot.duration.saturating_sub(slot.elapsed);
        slot.state = TimerState::Running;
        slot.started_at = sim.now();
        slot.generation += 1;
        trace!(timer = id.index, remaining = %remaining, "恢复定时器");
        sim.schedule_in(remaining, TimerFired::<H>::new(id, slot.generation));
    }

    /// RUNNING/PAUSED → STOPPED，之后不会再触发也无法恢复；终态下无操作。
    pub fn stop(&mut self, id: TimerId) {
        let Some(slot) = self.slot_mut(id) else {
            return;
        };
        if matches!(slot.state, TimerState::Running | TimerState::Paused) {
            slot.state = TimerState::Stopped;
            slot.generation += 1;
            trace!(timer = id.index, "停止定时器");
            self.release(id.index);
        }
    }

    /// 处理一次到期。代数不匹配或状态不是 RUNNING 时返回 None（事件已失效）。
    ///
    /// 重复定时器先以完整时长重新装填再返回 target；单次定时器先进入 ENDED。
    /// 因此回调内部对同一个定时器调用 `stop` 是安全的。
    pub(crate) fn fire(
        &mut self,
        id: TimerId,
        generation: u64,
        sim: &mut Simulator,
    ) -> Option<H::Target> {
        let slot = self.slot_mut(id)?;
        if slot.state != TimerState::Running || slot.generation != generation {
            trace!(timer = id.index, generation, current = slot.generation, "忽略失效的定时器事件");
            return None;
        }
        let target = slot.target;
        if slot.repeat {
            slot.elapsed = SimTime::ZERO;
            slot.started_at = sim.now();
            slot.generation += 1;
            sim.schedule_in(slot.duration, TimerFired::<H>::new(id, slot.generation));
        } else {
            slot.state = TimerState::Ended;
            self.release(id.index);
        }
        Some(target)
    }
}
