//! 数据包类型
//!
//! 构造之后只有“损坏”标记可以被信道单向地置位，其余字段只读。

use serde::Serialize;

use super::id::{NodeId, PacketId};

/// 数据包种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PacketKind {
    /// 数据包
    Data,
    /// 确认包；`cumulative` 表示累计确认（确认 `ack_num` 及之前的所有序号）
    Ack { ack_num: u32, cumulative: bool },
}

/// 节点之间交换的一个数据单元
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Packet {
    id: PacketId,
    seq_num: u32,
    sender: NodeId,
    receiver: NodeId,
    kind: PacketKind,
    corrupted: bool,
    retransmitted: bool,
}

impl Packet {
    /// 数据包
    pub fn data(
        id: PacketId,
        seq_num: u32,
        sender: NodeId,
        receiver: NodeId,
        retransmitted: bool,
    ) -> Self {
        Self {
            id,
            seq_num,
            sender,
            receiver,
            kind: PacketKind::Data,
            corrupted: false,
            retransmitted,
        }
    }

    /// 确认包。确认包的序号就是被确认的序号。
    pub fn ack(
        id: PacketId,
        ack_num: u32,
        sender: NodeId,
        receiver: NodeId,
        cumulative: bool,
    ) -> Self {
        Self {
            id,
            seq_num: ack_num,
            sender,
            receiver,
            kind: PacketKind::Ack {
                ack_num,
                cumulative,
            },
            corrupted: false,
            retransmitted: false,
        }
    }

    pub fn id(&self) -> PacketId {
        self.id
    }

    pub fn seq_num(&self) -> u32 {
        self.seq_num
    }

    pub fn sender(&self) -> NodeId {
        self.sender
    }

    pub fn receiver(&self) -> NodeId {
        self.receiver
    }

    pub fn kind(&self) -> PacketKind {
        self.kind
    }

    pub fn is_ack(&self) -> bool {
        matches!(self.kind, PacketKind::Ack { .. })
    }

    /// 被确认的序号；数据包没有这个字段
    pub fn ack_num(&self) -> Option<u32> {
        match self.kind {
            PacketKind::Ack { ack_num, .. } => Some(ack_num),
            PacketKind::Data => None,
        }
    }

    pub fn is_cumulative_ack(&self) -> bool {
        matches!(self.kind, PacketKind::Ack { cumulative: true, .. })
    }

    pub fn is_corrupted(&self) -> bool {
        self.corrupted
    }

    pub fn was_retransmitted(&self) -> bool {
        self.retransmitted
    }

    /// 标记为损坏（不可撤销）。仅由信道调用。
    pub(crate) fn mark_corrupted(&mut self) {
        self.corrupted = true;
    }
}
