//! 停等协议（Stop-and-Wait）发送方
//!
//! 序号空间为 2，同一时间最多一个未确认的数据包。
//! 接收方就是序号空间为 2 的 [`SequentialReceiver`](super::SequentialReceiver)。

use std::any::Any;

use super::config::SenderConfig;
use super::node::{ArqNode, ArqSender};
use super::sender_core::SenderCore;
use super::seq::SeqSpace;
use crate::error::ConfigError;
use crate::net::{NodeCtx, Packet};
use tracing::info;

#[derive(Debug)]
pub struct StopAndWaitSender {
    core: SenderCore,
    space: SeqSpace,
    current_seq_num: u32,
    waiting_ack: bool,
}

impl StopAndWaitSender {
    /// `cfg.window_size` 被忽略
    pub fn new(cfg: &SenderConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;
        Ok(Self {
            core: SenderCore::new(cfg),
            space: SeqSpace::new(2),
            current_seq_num: 0,
            waiting_ack: false,
        })
    }

    pub fn current_seq_num(&self) -> u32 {
        self.current_seq_num
    }

    pub fn is_waiting_ack(&self) -> bool {
        self.waiting_ack
    }
}

impl ArqNode for StopAndWaitSender {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_sender_mut(&mut self) -> Option<&mut dyn ArqSender> {
        Some(self)
    }

    fn check_received_pkt(&self, pkt: &Packet) -> bool {
        self.waiting_ack
            && !pkt.is_corrupted()
            && pkt.ack_num() == Some(self.current_seq_num)
    }

    fn process_expected_pkt(&mut self, _pkt: Packet, ctx: &mut NodeCtx<'_>) {
        let seq = self.current_seq_num;
        info!(seq, "✅ 确认");
        ctx.notify(|o, at, me| o.on_pkt_confirmed(at, me, seq));
        self.core.unset_timeout(seq, ctx);
        self.waiting_ack = false;
        self.current_seq_num = self.space.next(seq);
    }
}

impl ArqSender for StopAndWaitSender {
    fn core(&self) -> &SenderCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut SenderCore {
        &mut self.core
    }

    fn can_send(&self) -> bool {
        !self.waiting_ack
    }

    fn process_sending(&mut self, ctx: &mut NodeCtx<'_>) {
        let seq = self.current_seq_num;
        self.core.send_data(seq, false, ctx);
        self.core.set_timeout(seq, ctx);
        self.waiting_ack = true;
    }

    /// 重发当前数据包并重新计时；等待状态保持不变
    fn on_timeout(&mut self, seq: u32, ctx: &mut NodeCtx<'_>) {
        self.core.send_data(seq, true, ctx);
        self.core.set_timeout(seq, ctx);
    }
}
