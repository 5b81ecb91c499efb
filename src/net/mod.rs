//! 网络模拟模块
//!
//! 数据包、信道、观察者接口，以及持有这一切的仿真世界 `Network`。

// 子模块声明
mod channel;
mod channel_ops;
mod ctx;
mod id;
mod network;
mod node_ops;
mod observer;
mod packet;
mod stats;

// 重新导出公共接口
pub use channel::{Channel, ChannelConfig, ChannelSpec};
pub use ctx::NodeCtx;
pub use id::{ChannelId, NodeId, PacketId};
pub use network::{Network, TimerTarget};
pub use observer::ArqObserver;
pub use packet::{Packet, PacketKind};
pub use stats::Stats;
