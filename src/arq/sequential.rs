//! 顺序接收方
//!
//! 停等与回退 N 共用：只接受恰好等于 `expected_seq_num` 的未损坏数据包。
//! 其它情况重复确认上一个正确收到的序号。

use std::any::Any;

use super::config::ReceiverConfig;
use super::node::ArqNode;
use super::seq::SeqSpace;
use crate::error::ConfigError;
use crate::net::{ChannelId, NodeCtx, NodeId, Packet};
use tracing::debug;

#[derive(Debug)]
pub struct SequentialReceiver {
    channel: ChannelId,
    space: SeqSpace,
    expected_seq_num: u32,
}

impl SequentialReceiver {
    pub fn new(channel: ChannelId, seq_num_limit: u32) -> Self {
        Self {
            channel,
            space: SeqSpace::new(seq_num_limit),
            expected_seq_num: 0,
        }
    }

    /// 停等接收方：序号空间为 2
    pub fn stop_and_wait(channel: ChannelId) -> Self {
        Self::new(channel, 2)
    }

    /// 回退 N 接收方：序号空间与发送方一致，为 2·window
    pub fn go_back_n(cfg: &ReceiverConfig) -> Result<Self, ConfigError> {
        cfg.validate_windowed()?;
        Ok(Self::new(cfg.channel, cfg.window_size * 2))
    }

    pub fn expected_seq_num(&self) -> u32 {
        self.expected_seq_num
    }

    pub fn seq_num_limit(&self) -> u32 {
        self.space.limit()
    }

    fn send_ack(&self, ack_num: u32, to: NodeId, ctx: &mut NodeCtx<'_>) {
        let ack = ctx.ack_packet(ack_num, to, false);
        ctx.send_pkt(self.channel, ack);
    }
}

impl ArqNode for SequentialReceiver {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn check_received_pkt(&self, pkt: &Packet) -> bool {
        !pkt.is_corrupted() && !pkt.is_ack() && pkt.seq_num() == self.expected_seq_num
    }

    fn process_expected_pkt(&mut self, pkt: Packet, ctx: &mut NodeCtx<'_>) {
        self.send_ack(self.expected_seq_num, pkt.sender(), ctx);
        self.expected_seq_num = self.space.next(self.expected_seq_num);
    }

    fn process_unexpected_pkt(&mut self, pkt: Packet, ctx: &mut NodeCtx<'_>) {
        let last_good = self.space.previous(self.expected_seq_num);
        debug!(
            seq = pkt.seq_num(),
            expected = self.expected_seq_num,
            corrupted = pkt.is_corrupted(),
            "乱序或损坏，重复确认 {last_good}"
        );
        self.send_ack(last_good, pkt.sender(), ctx);
    }
}
