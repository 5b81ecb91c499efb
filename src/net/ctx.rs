//! 节点上下文
//!
//! 协议代码通过 `NodeCtx` 发送数据包、操作定时器、发出通知。
//! 节点在被调用期间已从 `Network` 中取出，因此这里可以安全地持有 `&mut Network`。

use super::id::{ChannelId, NodeId};
use super::network::{Network, TimerTarget};
use super::observer::ArqObserver;
use super::packet::Packet;
use crate::sim::{SimTime, Simulator};
use crate::timer::TimerId;
use tracing::info;

pub struct NodeCtx<'a> {
    me: NodeId,
    net: &'a mut Network,
    sim: &'a mut Simulator,
}

impl<'a> NodeCtx<'a> {
    pub(crate) fn new(me: NodeId, net: &'a mut Network, sim: &'a mut Simulator) -> Self {
        Self { me, net, sim }
    }

    /// 当前节点
    pub fn me(&self) -> NodeId {
        self.me
    }

    pub fn now(&self) -> SimTime {
        self.sim.now()
    }

    pub fn data_packet(&mut self, seq: u32, receiver: NodeId, retransmitted: bool) -> Packet {
        self.net.make_data(seq, self.me, receiver, retransmitted)
    }

    pub fn ack_packet(&mut self, ack_num: u32, receiver: NodeId, cumulative: bool) -> Packet {
        self.net.make_ack(ack_num, self.me, receiver, cumulative)
    }

    /// 经信道发出数据包，然后通知 `on_send`
    pub fn send_pkt(&mut self, channel: ChannelId, pkt: Packet) {
        info!(
            node = self.me.0,
            seq = pkt.seq_num(),
            ack = pkt.is_ack(),
            retransmitted = pkt.was_retransmitted(),
            "📤 发送数据包"
        );
        let view = pkt.clone();
        self.net.channel_send(channel, pkt, self.sim);
        self.notify(|o, at, me| o.on_send(at, me, &view));
    }

    /// 发出通知：回调拿到 (观察者, 当前时间, 当前节点)
    pub fn notify(&mut self, mut f: impl FnMut(&mut dyn ArqObserver, SimTime, NodeId)) {
        let at = self.sim.now();
        let me = self.me;
        self.net.notify(|o| f(o, at, me));
    }

    pub(crate) fn start_timer(&mut self, duration: SimTime, target: TimerTarget) -> TimerId {
        self.net.timers.start(self.sim, duration, target, false)
    }

    pub(crate) fn stop_timer(&mut self, id: TimerId) {
        self.net.timers.stop(id);
    }

    pub(crate) fn pause_timer(&mut self, id: TimerId) {
        let now = self.sim.now();
        self.net.timers.pause(id, now);
    }

    pub(crate) fn resume_timer(&mut self, id: TimerId) {
        self.net.timers.resume(id, self.sim);
    }
}
