//! 观察者接口
//!
//! 可视化、统计等外部组件通过实现 [`ArqObserver`] 订阅核心发出的通知。
//! 所有回调默认无操作，只拿到只读引用；在拆除（stop）过程中也可能收到过时的信息。

use std::sync::{Arc, Mutex};

use super::id::{ChannelId, NodeId};
use super::packet::Packet;
use crate::sim::SimTime;

/// 节点与信道的通知回调
pub trait ArqObserver {
    /// 节点把数据包交给信道之后
    fn on_send(&mut self, _at: SimTime, _node: NodeId, _pkt: &Packet) {}

    /// 节点收到数据包，在任何状态修改之前；`is_ok` 为协议的有效性判断结果
    fn on_receive(&mut self, _at: SimTime, _node: NodeId, _pkt: &Packet, _is_ok: bool) {}

    /// 发送方确认某个序号已被对端收到
    fn on_pkt_confirmed(&mut self, _at: SimTime, _node: NodeId, _seq: u32) {}

    fn on_timeout_set(&mut self, _at: SimTime, _node: NodeId, _seq: u32) {}

    fn on_timeout_unset(&mut self, _at: SimTime, _node: NodeId, _seq: u32) {}

    /// 窗口基序号前移了 `spaces` 个位置
    fn on_window_moved(&mut self, _at: SimTime, _node: NodeId, _spaces: u32) {}

    fn on_packet_lost(&mut self, _at: SimTime, _channel: ChannelId, _pkt: &Packet) {}

    fn on_packet_damaged(&mut self, _at: SimTime, _channel: ChannelId, _pkt: &Packet) {}

    /// 信道被停止时仍在途中的数据包
    fn on_packet_stopped(&mut self, _at: SimTime, _channel: ChannelId, _pkt: &Packet) {}
}

/// 共享句柄：注册 `Arc<Mutex<O>>` 后调用方仍可以读取观察者的内容。
impl<O: ArqObserver> ArqObserver for Arc<Mutex<O>> {
    fn on_send(&mut self, at: SimTime, node: NodeId, pkt: &Packet) {
        if let Ok(mut o) = self.lock() {
            o.on_send(at, node, pkt);
        }
    }

    fn on_receive(&mut self, at: SimTime, node: NodeId, pkt: &Packet, is_ok: bool) {
        if let Ok(mut o) = self.lock() {
            o.on_receive(at, node, pkt, is_ok);
        }
    }

    fn on_pkt_confirmed(&mut self, at: SimTime, node: NodeId, seq: u32) {
        if let Ok(mut o) = self.lock() {
            o.on_pkt_confirmed(at, node, seq);
        }
    }

    fn on_timeout_set(&mut self, at: SimTime, node: NodeId, seq: u32) {
        if let Ok(mut o) = self.lock() {
            o.on_timeout_set(at, node, seq);
        }
    }

    fn on_timeout_unset(&mut self, at: SimTime, node: NodeId, seq: u32) {
        if let Ok(mut o) = self.lock() {
            o.on_timeout_unset(at, node, seq);
        }
    }

    fn on_window_moved(&mut self, at: SimTime, node: NodeId, spaces: u32) {
        if let Ok(mut o) = self.lock() {
            o.on_window_moved(at, node, spaces);
        }
    }

    fn on_packet_lost(&mut self, at: SimTime, channel: ChannelId, pkt: &Packet) {
        if let Ok(mut o) = self.lock() {
            o.on_packet_lost(at, channel, pkt);
        }
    }

    fn on_packet_damaged(&mut self, at: SimTime, channel: ChannelId, pkt: &Packet) {
        if let Ok(mut o) = self.lock() {
            o.on_packet_damaged(at, channel, pkt);
        }
    }

    fn on_packet_stopped(&mut self, at: SimTime, channel: ChannelId, pkt: &Packet) {
        if let Ok(mut o) = self.lock() {
            o.on_packet_stopped(at, channel, pkt);
        }
    }
}
