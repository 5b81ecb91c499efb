//! 发送方公共部分
//!
//! 信道与对端句柄、重传超时时长，以及“每个序号一个定时器”的登记表。

use std::collections::BTreeMap;

use super::config::SenderConfig;
use crate::net::{ChannelId, NodeCtx, NodeId, TimerTarget};
use crate::sim::SimTime;
use crate::timer::TimerId;
use tracing::trace;

#[derive(Debug)]
pub struct SenderCore {
    channel: ChannelId,
    receiver: NodeId,
    timeout: SimTime,
    timers: BTreeMap<u32, TimerId>,
    /// `stop` 之后不再发送，也不再装填定时器
    stopped: bool,
}

impl SenderCore {
    pub fn new(cfg: &SenderConfig) -> Self {
        Self {
            channel: cfg.channel,
            receiver: cfg.receiver,
            timeout: cfg.timeout,
            timers: BTreeMap::new(),
            stopped: false,
        }
    }

    pub fn channel(&self) -> ChannelId {
        self.channel
    }

    pub fn receiver(&self) -> NodeId {
        self.receiver
    }

    pub fn timeout(&self) -> SimTime {
        self.timeout
    }

    /// 发出序号为 `seq` 的数据包
    pub fn send_data(&self, seq: u32, retransmitted: bool, ctx: &mut NodeCtx<'_>) {
        let pkt = ctx.data_packet(seq, self.receiver, retransmitted);
        ctx.send_pkt(self.channel, pkt);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// 为 `seq` 启动重传定时器；发送方已停止时无操作。
    ///
    /// # Panics
    ///
    /// 该序号已有定时器时 panic：这说明协议实现本身有 bug。
    pub fn set_timeout(&mut self, seq: u32, ctx: &mut NodeCtx<'_>) {
        if self.stopped {
            trace!(seq, "发送方已停止，不再设置定时器");
            return;
        }
        if self.timers.contains_key(&seq) {
            panic!("timeout for sequence {seq} is already set on node {:?}", ctx.me());
        }
        let node = ctx.me();
        let timer = ctx.start_timer(self.timeout, TimerTarget::SeqTimeout { node, seq });
        trace!(seq, timer = timer.index(), "设置重传定时器");
        self.timers.insert(seq, timer);
        ctx.notify(|o, at, me| o.on_timeout_set(at, me, seq));
    }

    pub fn is_timeout_set(&self, seq: u32) -> bool {
        self.timers.contains_key(&seq)
    }

    /// 取消 `seq` 的定时器；没有时无操作
    pub fn unset_timeout(&mut self, seq: u32, ctx: &mut NodeCtx<'_>) {
        let Some(timer) = self.timers.remove(&seq) else {
            return;
        };
        ctx.stop_timer(timer);
        trace!(seq, timer = timer.index(), "取消重传定时器");
        ctx.notify(|o, at, me| o.on_timeout_unset(at, me, seq));
    }

    /// 已登记定时器的序号（升序）
    pub fn armed(&self) -> impl Iterator<Item = u32> + '_ {
        self.timers.keys().copied()
    }

    /// 定时器到期：只有登记的正是这个定时器时才注销并返回 true
    pub(crate) fn take_fired(&mut self, seq: u32, timer: TimerId) -> bool {
        if self.timers.get(&seq) == Some(&timer) {
            self.timers.remove(&seq);
            true
        } else {
            false
        }
    }

    pub fn pause(&mut self, ctx: &mut NodeCtx<'_>) {
        for &timer in self.timers.values() {
            ctx.pause_timer(timer);
        }
    }

    pub fn resume(&mut self, ctx: &mut NodeCtx<'_>) {
        for &timer in self.timers.values() {
            ctx.resume_timer(timer);
        }
    }

    /// 取消全部定时器并逐个通知 `on_timeout_unset`；此后发送方保持停止
    pub fn stop(&mut self, ctx: &mut NodeCtx<'_>) {
        self.stopped = true;
        for (seq, timer) in std::mem::take(&mut self.timers) {
            ctx.stop_timer(timer);
            ctx.notify(|o, at, me| o.on_timeout_unset(at, me, seq));
        }
    }
}
