//! 标识符类型
//!
//! 节点、信道、数据包都放在 `Network` 的 arena 里，彼此之间只通过这些句柄引用，
//! 避免发送方/接收方之间的循环引用。

use serde::Serialize;

/// 节点标识符（发送方或接收方）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub usize);

/// 信道标识符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ChannelId(pub usize);

/// 数据包标识符：同一个 `Network` 内单调递增，也就是发送顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PacketId(pub u64);
