//! 统计信息
//!
//! 一个只做计数的观察者，外加几个派生比率。

use serde::Serialize;

use super::id::{ChannelId, NodeId};
use super::observer::ArqObserver;
use super::packet::Packet;
use crate::sim::SimTime;

/// 仿真统计信息
#[derive(Debug, Default, Clone, Serialize)]
pub struct Stats {
    /// 发出的数据包（含重传）
    pub data_sent: u64,
    pub retransmissions: u64,
    pub acks_sent: u64,
    pub received_ok: u64,
    pub received_bad: u64,
    pub confirmed: u64,
    pub timeouts_set: u64,
    pub window_moves: u64,
    pub lost: u64,
    pub damaged: u64,
    pub stopped: u64,
}

impl Stats {
    /// 有效率：被确认的数据包 / 发出的数据包
    pub fn efficiency(&self) -> f64 {
        ratio(self.confirmed, self.data_sent)
    }

    /// 重传占比：重传 / 发出的数据包
    pub fn retransmission_ratio(&self) -> f64 {
        ratio(self.retransmissions, self.data_sent)
    }

    /// 每秒确认数（goodput，以数据包计）
    pub fn confirmed_per_sec(&self, elapsed: SimTime) -> f64 {
        if elapsed == SimTime::ZERO {
            return 0.0;
        }
        self.confirmed as f64 / (elapsed.0 as f64 / 1e9)
    }
}

fn ratio(num: u64, den: u64) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

impl ArqObserver for Stats {
    fn on_send(&mut self, _at: SimTime, _node: NodeId, pkt: &Packet) {
        if pkt.is_ack() {
            self.acks_sent += 1;
        } else {
            self.data_sent += 1;
            if pkt.was_retransmitted() {
                self.retransmissions += 1;
            }
        }
    }

    fn on_receive(&mut self, _at: SimTime, _node: NodeId, _pkt: &Packet, is_ok: bool) {
        if is_ok {
            self.received_ok += 1;
        } else {
            self.received_bad += 1;
        }
    }

    fn on_pkt_confirmed(&mut self, _at: SimTime, _node: NodeId, _seq: u32) {
        self.confirmed += 1;
    }

    fn on_timeout_set(&mut self, _at: SimTime, _node: NodeId, _seq: u32) {
        self.timeouts_set += 1;
    }

    fn on_window_moved(&mut self, _at: SimTime, _node: NodeId, _spaces: u32) {
        self.window_moves += 1;
    }

    fn on_packet_lost(&mut self, _at: SimTime, _channel: ChannelId, _pkt: &Packet) {
        self.lost += 1;
    }

    fn on_packet_damaged(&mut self, _at: SimTime, _channel: ChannelId, _pkt: &Packet) {
        self.damaged += 1;
    }

    fn on_packet_stopped(&mut self, _at: SimTime, _channel: ChannelId, _pkt: &Packet) {
        self.stopped += 1;
    }
}
