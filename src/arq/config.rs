//! 节点配置

use crate::error::ConfigError;
use crate::net::{ChannelId, NodeId};
use crate::sim::SimTime;

/// 发送方配置
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SenderConfig {
    pub receiver: NodeId,
    pub channel: ChannelId,
    /// 重传超时
    pub timeout: SimTime,
    /// 窗口大小；停等协议忽略此项（固定为 1）
    pub window_size: u32,
}

impl SenderConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout == SimTime::ZERO {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }

    pub(crate) fn validate_windowed(&self) -> Result<(), ConfigError> {
        self.validate()?;
        check_window(self.window_size)
    }
}

/// 接收方配置
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReceiverConfig {
    pub channel: ChannelId,
    pub window_size: u32,
    /// 选择重传接收方是否使用累计确认
    pub use_cack: bool,
}

impl ReceiverConfig {
    pub(crate) fn validate_windowed(&self) -> Result<(), ConfigError> {
        check_window(self.window_size)
    }
}

/// 窗口大小不能超过序号空间的一半；序号空间取 2·window，需要放得进 u32
pub(crate) fn check_window(window_size: u32) -> Result<(), ConfigError> {
    if window_size == 0 {
        return Err(ConfigError::ZeroWindow);
    }
    if window_size > u32::MAX / 2 {
        return Err(ConfigError::WindowTooLarge(window_size));
    }
    Ok(())
}
