//! 节点操作
//!
//! 外部驱动调用的入口（send/receive/pause/resume/stop），以及重传超时与发送节拍的分派。

use super::ctx::NodeCtx;
use super::id::NodeId;
use super::network::{Cadence, Network, TimerTarget};
use super::packet::Packet;
use crate::arq::ArqNode;
use crate::error::ConfigError;
use crate::sim::{SimTime, Simulator};
use crate::timer::TimerId;
use tracing::{debug, info, warn};

impl Network {
    /// 暂时把节点取出来，避免 &mut self 与 &mut node 的重叠借用。
    fn with_node<R>(
        &mut self,
        id: NodeId,
        sim: &mut Simulator,
        f: impl FnOnce(&mut dyn ArqNode, &mut NodeCtx<'_>) -> R,
    ) -> Option<R> {
        let Some(mut node) = self.nodes.get_mut(id.0).and_then(Option::take) else {
            warn!(node = ?id, "节点不存在或正在处理中");
            return None;
        };
        let result = {
            let mut ctx = NodeCtx::new(id, self, sim);
            f(node.as_mut(), &mut ctx)
        };
        self.nodes[id.0] = Some(node);
        Some(result)
    }

    /// 让发送方尝试发送一次；窗口已满（或节点不是发送方）时返回 false。
    pub fn send(&mut self, sender: NodeId, sim: &mut Simulator) -> bool {
        self.with_node(sender, sim, |node, ctx| match node.as_sender_mut() {
            Some(s) => s.send(ctx),
            None => {
                warn!(node = ?ctx.me(), "节点不是发送方");
                false
            }
        })
        .unwrap_or(false)
    }

    /// 把数据包交给节点的 `receive`
    #[tracing::instrument(skip(self, pkt, sim), fields(pkt_id = pkt.id().0, seq = pkt.seq_num()))]
    pub fn receive(&mut self, node: NodeId, pkt: Packet, sim: &mut Simulator) {
        self.with_node(node, sim, |n, ctx| n.receive(pkt, ctx));
    }

    /// 暂停发送方的所有定时器；接收方没有定时器，无操作。
    pub fn pause_node(&mut self, node: NodeId, sim: &mut Simulator) {
        self.with_node(node, sim, |n, ctx| {
            if let Some(s) = n.as_sender_mut() {
                s.core_mut().pause(ctx);
            }
        });
    }

    pub fn resume_node(&mut self, node: NodeId, sim: &mut Simulator) {
        self.with_node(node, sim, |n, ctx| {
            if let Some(s) = n.as_sender_mut() {
                s.core_mut().resume(ctx);
            }
        });
    }

    /// 停止发送方：取消发送节拍与所有定时器，之后既不发送也不重传。幂等。
    pub fn stop_node(&mut self, node: NodeId, sim: &mut Simulator) {
        self.stop_send_cadence(node);
        self.with_node(node, sim, |n, ctx| {
            if let Some(s) = n.as_sender_mut() {
                s.core_mut().stop(ctx);
            }
        });
    }

    pub(crate) fn on_seq_timeout(&mut self, node: NodeId, seq: u32, timer: TimerId, sim: &mut Simulator) {
        self.with_node(node, sim, |n, ctx| {
            let Some(s) = n.as_sender_mut() else {
                return;
            };
            if s.core_mut().take_fired(seq, timer) {
                info!(node = node.0, seq, "⏰ 重传超时");
                s.on_timeout(seq, ctx);
            }
        });
    }

    /// 以固定间隔驱动 `send()`。`limit` 为可接受发送的次数上限，达到后节拍自动停止。
    pub fn start_send_cadence(
        &mut self,
        node: NodeId,
        interval: SimTime,
        limit: Option<u64>,
        sim: &mut Simulator,
    ) -> Result<TimerId, ConfigError> {
        if !self.has_node(node) {
            return Err(ConfigError::UnknownNode(node));
        }
        if interval == SimTime::ZERO {
            return Err(ConfigError::ZeroSendInterval);
        }
        self.stop_send_cadence(node);
        let timer = self
            .timers
            .start(sim, interval, TimerTarget::SendTick { node }, true);
        debug!(node = ?node, interval = %interval, ?limit, "启动发送节拍");
        self.cadences.insert(
            node,
            Cadence {
                timer,
                remaining: limit,
            },
        );
        Ok(timer)
    }

    pub fn stop_send_cadence(&mut self, node: NodeId) {
        if let Some(cadence) = self.cadences.remove(&node) {
            self.timers.stop(cadence.timer);
        }
    }

    pub(crate) fn on_send_tick(&mut self, node: NodeId, sim: &mut Simulator) {
        if !self.send(node, sim) {
            return;
        }
        let Some(cadence) = self.cadences.get_mut(&node) else {
            return;
        };
        if let Some(remaining) = cadence.remaining.as_mut() {
            *remaining = remaining.saturating_sub(1);
            if *remaining == 0 {
                debug!(node = ?node, "发送次数已达上限，停止节拍");
                self.stop_send_cadence(node);
            }
        }
    }
}
