//! 回退 N（Go-Back-N）发送方
//!
//! - 确认按累计语义处理：确认 `ack_num` 即确认 `base..=ack_num`
//! - 任何时刻只有一个定时器，挂在 `base` 上
//! - 超时后重发 `base..next_seq_num` 的全部数据包
//!
//! 接收方是序号空间为 2·window 的 [`SequentialReceiver`](super::SequentialReceiver)，
//! 只按序接收。

use std::any::Any;

use super::config::SenderConfig;
use super::node::{ArqNode, ArqSender};
use super::sender_core::SenderCore;
use super::window::Window;
use crate::error::ConfigError;
use crate::net::{NodeCtx, Packet};
use tracing::info;

#[derive(Debug)]
pub struct GoBackNSender {
    core: SenderCore,
    window: Window,
}

impl GoBackNSender {
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
}

impl ArqNode for GoBackNSender {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_sender_mut(&mut self) -> Option<&mut dyn ArqSender> {
        Some(self)
    }

    fn check_received_pkt(&self, pkt: &Packet) -> bool {
        !pkt.is_corrupted()
            && pkt
                .ack_num()
                .is_some_and(|ack| self.window.is_outstanding(ack))
    }

    fn process_expected_pkt(&mut self, pkt: Packet, ctx: &mut NodeCtx<'_>) {
        let Some(ack) = pkt.ack_num() else {
            return;
        };
        let space = self.window.space();
        let old_base = self.window.base();
        for seq in space.walk(old_base, space.next(ack)) {
            ctx.notify(|o, at, me| o.on_pkt_confirmed(at, me, seq));
        }
        info!(from = old_base, through = ack, "✅ 累计确认");
        self.core.unset_timeout(old_base, ctx);
        self.window.set_base(space.next(ack), ctx);
        if !self.window.is_empty() {
            self.core.set_timeout(self.window.base(), ctx);
        }
    }
}

impl ArqSender for GoBackNSender {
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
        let was_empty = self.window.is_empty();
        let seq = self.window.take_next();
        self.core.send_data(seq, false, ctx);
        if was_empty {
            self.core.set_timeout(seq, ctx);
        }
    }

    /// 回退：按升序重发全部未确认的数据包，再为 base 重新计时
    fn on_timeout(&mut self, _seq: u32, ctx: &mut NodeCtx<'_>) {
        let outstanding: Vec<u32> = self.window.outstanding_seqs().collect();
        info!(base = self.window.base(), count = outstanding.len(), "↩️  回退重发");
        for seq in outstanding {
            self.core.send_data(seq, true, ctx);
        }
        if !self.window.is_empty() {
            self.core.set_timeout(self.window.base(), ctx);
        }
    }
}
