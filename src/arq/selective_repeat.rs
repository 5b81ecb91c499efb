//! 选择重传（Selective-Repeat）
//!
//! 发送方为每个未确认序号各挂一个定时器，超时只重发该序号；
//! 接收方缓存窗口内的乱序数据包，可选使用累计确认（cAck）。

use std::any::Any;

use super::config::{ReceiverConfig, SenderConfig};
use super::node::{ArqNode, ArqSender};
use super::sender_core::SenderCore;
use super::seq::SeqSpace;
use super::window::Window;
use crate::error::ConfigError;
use crate::net::{ChannelId, NodeCtx, NodeId, Packet};
use tracing::{debug, info};

/// 选择重传发送方
#[derive(Debug)]
pub struct SelectiveRepeatSender {
    core: SenderCore,
    window: Window,
}

impl SelectiveRepeatSender {
    pub fn new(cfg: &SenderConfig) -> Result<Self, ConfigError> {
        cfg.validate_windowed()?;
        Ok(Self {
            core: SenderCore::new(cfg),
            window: Window::new(cfg.window_size)?,
        })
    }

    pub fn base(&self) -> u32 {
        self.window.base()
    }

    pub fn next_seq_num(&self) -> u32 {
        self.window.next_seq_num()
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    fn confirm(&mut self, seq: u32, ctx: &mut NodeCtx<'_>) {
        ctx.notify(|o, at, me| o.on_pkt_confirmed(at, me, seq));
        self.core.unset_timeout(seq, ctx);
    }
}

impl ArqNode for SelectiveRepeatSender {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_sender_mut(&mut self) -> Option<&mut dyn ArqSender> {
        Some(self)
    }

    fn check_received_pkt(&self, pkt: &Packet) -> bool {
        let Some(ack) = pkt.ack_num() else {
            return false;
        };
        !pkt.is_corrupted()
            && ((pkt.is_cumulative_ack() && self.window.is_outstanding(ack))
                || self.core.is_timeout_set(ack))
    }

    fn process_expected_pkt(&mut self, pkt: Packet, ctx: &mut NodeCtx<'_>) {
        let Some(ack) = pkt.ack_num() else {
            return;
        };
        let cumulative = pkt.is_cumulative_ack();
        let base = self.window.base();

        if cumulative {
            let space = self.window.space();
            let timed: Vec<u32> = space
                .walk(base, space.next(ack))
                .filter(|&seq| self.core.is_timeout_set(seq))
                .collect();
            info!(from = base, through = ack, count = timed.len(), "✅ 累计确认");
            for seq in timed {
                self.confirm(seq, ctx);
            }
        } else {
            info!(seq = ack, "✅ 确认");
            self.confirm(ack, ctx);
        }

        if cumulative || !self.core.is_timeout_set(base) {
            // 跳过所有已确认（不再有定时器）的序号
            let new_base = self
                .window
                .outstanding_seqs()
                .find(|&seq| self.core.is_timeout_set(seq))
                .unwrap_or(self.window.next_seq_num());
            self.window.set_base(new_base, ctx);
        }
    }
}

impl ArqSender for SelectiveRepeatSender {
    fn core(&self) -> &SenderCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut SenderCore {
        &mut self.core
    }

    fn can_send(&self) -> bool {
        self.window.can_send()
    }

    fn process_sending(&mut self, ctx: &mut NodeCtx<'_>) {
        let seq = self.window.take_next();
        self.core.send_data(seq, false, ctx);
        self.core.set_timeout(seq, ctx);
    }

    /// 只重发超时的那一个序号
    fn on_timeout(&mut self, seq: u32, ctx: &mut NodeCtx<'_>) {
        self.core.send_data(seq, true, ctx);
        self.core.set_timeout(seq, ctx);
    }
}

/// 选择重传接收方
#[derive(Debug)]
pub struct SelectiveRepeatReceiver {
    channel: ChannelId,
    base: u32,
    window_size: u32,
    space: SeqSpace,
    /// 以序号为下标：已收到、尚未随窗口滑出
    buffered: Vec<bool>,
    use_cack: bool,
}

impl SelectiveRepeatReceiver {
    pub fn new(cfg: &ReceiverConfig) -> Result<Self, ConfigError> {
        cfg.validate_windowed()?;
        let limit = cfg.window_size * 2;
        Ok(Self {
            channel: cfg.channel,
            base: 0,
            window_size: cfg.window_size,
            space: SeqSpace::new(limit),
            buffered: vec![false; limit as usize],
            use_cack: cfg.use_cack,
        })
    }

    pub fn base(&self) -> u32 {
        self.base
    }

    /// 窗口上沿（不含）：`base + window_size`
    pub fn next_seq_num(&self) -> u32 {
        self.space.add(self.base, self.window_size)
    }

    pub fn window_size(&self) -> u32 {
        self.window_size
    }

    pub fn uses_cack(&self) -> bool {
        self.use_cack
    }

    pub fn is_buffered(&self, seq: u32) -> bool {
        self.buffered.get(seq as usize).copied().unwrap_or(false)
    }

    fn in_window(&self, seq: u32) -> bool {
        self.space.in_range(seq, self.base, self.next_seq_num())
    }

    /// 上一个窗口 `[base - window_size, base)`：已交付、但确认可能丢了
    fn in_previous_window(&self, seq: u32) -> bool {
        let lower = self.space.add(self.base, self.window_size);
        self.space.in_range(seq, lower, self.base)
    }

    fn send_ack(&self, ack_num: u32, cumulative: bool, to: NodeId, ctx: &mut NodeCtx<'_>) {
        let ack = ctx.ack_packet(ack_num, to, cumulative);
        ctx.send_pkt(self.channel, ack);
    }
}

impl ArqNode for SelectiveRepeatReceiver {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn check_received_pkt(&self, pkt: &Packet) -> bool {
        !pkt.is_corrupted()
            && !pkt.is_ack()
            && !self.is_buffered(pkt.seq_num())
            && self.in_window(pkt.seq_num())
    }

    fn process_expected_pkt(&mut self, pkt: Packet, ctx: &mut NodeCtx<'_>) {
        let seq = pkt.seq_num();
        self.buffered[seq as usize] = true;

        if seq != self.base {
            debug!(seq, base = self.base, "乱序到达，缓存");
            self.send_ack(seq, false, pkt.sender(), ctx);
            return;
        }

        let mut spaces = 0;
        while self.buffered[self.base as usize] {
            self.buffered[self.base as usize] = false;
            self.base = self.space.next(self.base);
            spaces += 1;
        }
        debug!(new_base = self.base, spaces, "接收窗口前移");
        ctx.notify(|o, at, me| o.on_window_moved(at, me, spaces));

        if self.use_cack {
            self.send_ack(self.space.previous(self.base), true, pkt.sender(), ctx);
        } else {
            self.send_ack(seq, false, pkt.sender(), ctx);
        }
    }

    /// 无效包：损坏、重复或不在窗口内
    fn process_unexpected_pkt(&mut self, pkt: Packet, ctx: &mut NodeCtx<'_>) {
        if pkt.is_ack() {
            return;
        }
        let seq = pkt.seq_num();
        let intact = !pkt.is_corrupted();
        let duplicate = intact && self.is_buffered(seq);

        if self.use_cack {
            if duplicate {
                self.send_ack(seq, false, pkt.sender(), ctx);
            } else {
                self.send_ack(self.space.previous(self.base), true, pkt.sender(), ctx);
            }
        } else if duplicate || (intact && self.in_previous_window(seq)) {
            self.send_ack(seq, false, pkt.sender(), ctx);
        } else {
            debug!(seq, corrupted = pkt.is_corrupted(), "静默丢弃");
        }
    }
}
