use serde::Serialize;

use crate::net::{ArqObserver, ChannelId, NodeId, Packet};
use crate::sim::SimTime;

/// 事件类型
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LoggedEventKind {
    Send { node: NodeId, pkt: Packet },
    Receive { node: NodeId, pkt: Packet, is_ok: bool },
    PktConfirmed { node: NodeId, seq: u32 },
    TimeoutSet { node: NodeId, seq: u32 },
    TimeoutUnset { node: NodeId, seq: u32 },
    WindowMoved { node: NodeId, spaces: u32 },
    PacketLost { channel: ChannelId, pkt: Packet },
    PacketDamaged { channel: ChannelId, pkt: Packet },
    PacketStopped { channel: ChannelId, pkt: Packet },
}

/// 一条可回放的事件
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoggedEvent {
    /// 仿真时间（纳秒，和 `SimTime.0` 同口径）
    pub t_ns: u64,
    #[serde(flatten)]
    pub kind: LoggedEventKind,
}

/// 事件收集器（存内存，仿真结束后写 JSON 文件）
#[derive(Debug, Default)]
pub struct EventLog {
    pub events: Vec<LoggedEvent>,
}

impl EventLog {
    pub fn push(&mut self, at: SimTime, kind: LoggedEventKind) {
        self.events.push(LoggedEvent { t_ns: at.0, kind });
    }

    pub fn kinds(&self) -> impl Iterator<Item = &LoggedEventKind> {
        self.events.iter().map(|e| &e.kind)
    }
}

impl ArqObserver for EventLog {
    fn on_send(&mut self, at: SimTime, node: NodeId, pkt: &Packet) {
        self.push(at, LoggedEventKind::Send { node, pkt: pkt.clone() });
    }

    fn on_receive(&mut self, at: SimTime, node: NodeId, pkt: &Packet, is_ok: bool) {
        self.push(
            at,
            LoggedEventKind::Receive {
                node,
                pkt: pkt.clone(),
                is_ok,
            },
        );
    }

    fn on_pkt_confirmed(&mut self, at: SimTime, node: NodeId, seq: u32) {
        self.push(at, LoggedEventKind::PktConfirmed { node, seq });
    }

    fn on_timeout_set(&mut self, at: SimTime, node: NodeId, seq: u32) {
        self.push(at, LoggedEventKind::TimeoutSet { node, seq });
    }

    fn on_timeout_unset(&mut self, at: SimTime, node: NodeId, seq: u32) {
        self.push(at, LoggedEventKind::TimeoutUnset { node, seq });
    }

    fn on_window_moved(&mut self, at: SimTime, node: NodeId, spaces: u32) {
        self.push(at, LoggedEventKind::WindowMoved { node, spaces });
    }

    fn on_packet_lost(&mut self, at: SimTime, channel: ChannelId, pkt: &Packet) {
        self.push(at, LoggedEventKind::PacketLost { channel, pkt: pkt.clone() });
    }

    fn on_packet_damaged(&mut self, at: SimTime, channel: ChannelId, pkt: &Packet) {
        self.push(at, LoggedEventKind::PacketDamaged { channel, pkt: pkt.clone() });
    }

    fn on_packet_stopped(&mut self, at: SimTime, channel: ChannelId, pkt: &Packet) {
        self.push(at, LoggedEventKind::PacketStopped { channel, pkt: pkt.clone() });
    }
}
