//! 仿真网络
//!
//! `Network` 是仿真世界：持有所有节点、信道、定时器与观察者。
//! 节点之间只通过 `NodeId`/`ChannelId` 相互引用。

use std::any::Any;
use std::collections::BTreeMap;

use super::channel::{Channel, ChannelConfig};
use super::id::{ChannelId, NodeId, PacketId};
use super::observer::ArqObserver;
use super::packet::Packet;
use crate::arq::ArqNode;
use crate::error::ConfigError;
use crate::sim::{Simulator, World};
use crate::timer::{TimerHost, TimerId, Timers};
use tracing::{debug, trace};

/// 定时器到期后要做的事
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTarget {
    /// 发送方某个序号的重传超时
    SeqTimeout { node: NodeId, seq: u32 },
    /// 途中损坏
    Damage { channel: ChannelId, pkt: PacketId },
    /// 途中丢失
    Loss { channel: ChannelId, pkt: PacketId },
    /// 到达接收方
    Deliver { channel: ChannelId, pkt: PacketId },
    /// 外部驱动的发送节拍：调用一次 `send()`
    SendTick { node: NodeId },
}

/// 发送节拍（重复定时器）及其剩余的可接受发送次数
#[derive(Debug, Clone, Copy)]
pub(crate) struct Cadence {
    pub(crate) timer: TimerId,
    pub(crate) remaining: Option<u64>,
}

/// 仿真网络
#[derive(Default)]
pub struct Network {
    pub(crate) nodes: Vec<Option<Box<dyn ArqNode>>>,
    pub(crate) channels: Vec<Channel>,
    pub(crate) timers: Timers<Network>,
    pub(crate) observers: Vec<Box<dyn ArqObserver>>,
    pub(crate) cadences: BTreeMap<NodeId, Cadence>,
    next_pkt_id: u64,
}

impl Network {
    /// 添加信道
    pub fn add_channel(&mut self, cfg: ChannelConfig) -> Result<ChannelId, ConfigError> {
        let channel = Channel::new(cfg)?;
        let id = ChannelId(self.channels.len());
        debug!(channel = ?id, delay = %channel.delay(), "添加信道");
        self.channels.push(channel);
        Ok(id)
    }

    /// 添加节点（发送方或接收方）
    pub fn add_node<N: ArqNode>(&mut self, node: N) -> NodeId {
        let id = NodeId(self.nodes.len());
        debug!(node = ?id, node_type = std::any::type_name::<N>(), "添加节点");
        self.nodes.push(Some(Box::new(node)));
        id
    }

    /// 注册观察者
    pub fn add_observer(&mut self, observer: impl ArqObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn channel(&self, id: ChannelId) -> Option<&Channel> {
        self.channels.get(id.0)
    }

    pub fn has_node(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    /// 以具体类型只读访问节点（例如读取 `base`、`next_seq_num`）
    pub fn node<T: ArqNode>(&self, id: NodeId) -> Option<&T> {
        self.nodes
            .get(id.0)?
            .as_ref()?
            .as_any()
            .downcast_ref::<T>()
    }

    pub fn timers(&self) -> &Timers<Network> {
        &self.timers
    }

    pub(crate) fn next_packet_id(&mut self) -> PacketId {
        let id = PacketId(self.next_pkt_id);
        self.next_pkt_id = self.next_pkt_id.wrapping_add(1);
        id
    }

    /// 创建数据包
    pub fn make_data(&mut self, seq: u32, sender: NodeId, receiver: NodeId, retransmitted: bool) -> Packet {
        let id = self.next_packet_id();
        Packet::data(id, seq, sender, receiver, retransmitted)
    }

    /// 创建确认包
    pub fn make_ack(&mut self, ack_num: u32, sender: NodeId, receiver: NodeId, cumulative: bool) -> Packet {
        let id = self.next_packet_id();
        Packet::ack(id, ack_num, sender, receiver, cumulative)
    }

    pub(crate) fn notify(&mut self, mut f: impl FnMut(&mut dyn ArqObserver)) {
        for observer in self.observers.iter_mut() {
            f(observer.as_mut());
        }
    }

    /// 暂停整个仿真：发送节拍、所有信道、所有发送方的定时器
    pub fn pause(&mut self, sim: &mut Simulator) {
        let now = sim.now();
        debug!(now = %now, "⏸️  暂停网络");
        let cadence_timers: Vec<TimerId> = self.cadences.values().map(|c| c.timer).collect();
        for timer in cadence_timers {
            self.timers.pause(timer, now);
        }
        for ch in 0..self.channels.len() {
            self.pause_channel(ChannelId(ch), now);
        }
        for node in 0..self.nodes.len() {
            self.pause_node(NodeId(node), sim);
        }
    }

    pub fn resume(&mut self, sim: &mut Simulator) {
        debug!(now = %sim.now(), "▶️  恢复网络");
        let cadence_timers: Vec<TimerId> = self.cadences.values().map(|c| c.timer).collect();
        for timer in cadence_timers {
            self.timers.resume(timer, sim);
        }
        for ch in 0..self.channels.len() {
            self.resume_channel(ChannelId(ch), sim);
        }
        for node in 0..self.nodes.len() {
            self.resume_node(NodeId(node), sim);
        }
    }

    /// 停止整个仿真：之后不会再有任何回调触发
    pub fn stop(&mut self, sim: &mut Simulator) {
        debug!(now = %sim.now(), "⏹️  停止网络");
        let nodes: Vec<NodeId> = self.cadences.keys().copied().collect();
        for node in nodes {
            self.stop_send_cadence(node);
        }
        for ch in 0..self.channels.len() {
            self.stop_channel(ChannelId(ch), sim.now());
        }
        for node in 0..self.nodes.len() {
            self.stop_node(NodeId(node), sim);
        }
    }
}

impl World for Network {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl TimerHost for Network {
    type Target = TimerTarget;

    fn timers(&mut self) -> &mut Timers<Self> {
        &mut self.timers
    }

    #[tracing::instrument(skip(self, sim), fields(now = %sim.now()))]
    fn on_timer(&mut self, id: TimerId, target: TimerTarget, sim: &mut Simulator) {
        trace!("定时器到期");
        match target {
            TimerTarget::SeqTimeout { node, seq } => self.on_seq_timeout(node, seq, id, sim),
            TimerTarget::Damage { channel, pkt } => self.on_damage_point(channel, pkt, sim.now()),
            TimerTarget::Loss { channel, pkt } => self.on_loss_point(channel, pkt, sim.now()),
            TimerTarget::Deliver { channel, pkt } => self.on_deliver(channel, pkt, sim),
            TimerTarget::SendTick { node } => self.on_send_tick(node, sim),
        }
    }
}
