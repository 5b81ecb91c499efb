//! ARQ 协议模块
//!
//! 节点 trait、公共组件（序号空间、发送方定时器登记、发送窗口、顺序接收方），
//! 以及停等、回退 N、选择重传三种协议。

mod config;
mod go_back_n;
mod node;
mod selective_repeat;
mod sender_core;
mod seq;
mod sequential;
mod stop_and_wait;
mod window;

pub use config::{ReceiverConfig, SenderConfig};
pub use go_back_n::GoBackNSender;
pub use node::{ArqNode, ArqSender};
pub use selective_repeat::{SelectiveRepeatReceiver, SelectiveRepeatSender};
pub use sender_core::SenderCore;
pub use seq::SeqSpace;
pub use sequential::SequentialReceiver;
pub use stop_and_wait::StopAndWaitSender;
pub use window::Window;
