//! 节点 trait
//!
//! `ArqNode` 是所有节点共有的接收模板，`ArqSender` 在其上加发送模板与超时处理。
//! 具体协议只实现“什么包算有效”“有效/无效时怎么处理”“能否发送”“怎么发送”“超时怎么办”。

use std::any::Any;

use super::sender_core::SenderCore;
use crate::net::{NodeCtx, Packet};

/// 节点接口
pub trait ArqNode: Any + Send {
    fn as_any(&self) -> &dyn Any;

    /// 发送方返回自身；接收方保持默认的 None
    fn as_sender_mut(&mut self) -> Option<&mut dyn ArqSender> {
        None
    }

    /// 协议相关的有效性判断；不得修改状态
    fn check_received_pkt(&self, pkt: &Packet) -> bool;

    fn process_expected_pkt(&mut self, pkt: Packet, ctx: &mut NodeCtx<'_>);

    /// 默认忽略无效的数据包
    fn process_unexpected_pkt(&mut self, _pkt: Packet, _ctx: &mut NodeCtx<'_>) {}

    /// 接收模板：先判断、再通知 `on_receive`（此时状态与数据包都未被改动）、最后分派。
    fn receive(&mut self, pkt: Packet, ctx: &mut NodeCtx<'_>) {
        let is_ok = self.check_received_pkt(&pkt);
        ctx.notify(|o, at, me| o.on_receive(at, me, &pkt, is_ok));
        if is_ok {
            self.process_expected_pkt(pkt, ctx);
        } else {
            self.process_unexpected_pkt(pkt, ctx);
        }
    }
}

/// 发送方接口
pub trait ArqSender: ArqNode {
    fn core(&self) -> &SenderCore;

    fn core_mut(&mut self) -> &mut SenderCore;

    fn can_send(&self) -> bool;

    fn process_sending(&mut self, ctx: &mut NodeCtx<'_>);

    /// 序号 `seq` 的重传定时器到期；进入时该序号已不再登记定时器
    fn on_timeout(&mut self, seq: u32, ctx: &mut NodeCtx<'_>);

    /// 发送模板：已停止或不能发送时返回 false 且不改动任何状态
    fn send(&mut self, ctx: &mut NodeCtx<'_>) -> bool {
        if self.core().is_stopped() || !self.can_send() {
            return false;
        }
        self.process_sending(ctx);
        true
    }
}
