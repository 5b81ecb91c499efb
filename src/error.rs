//! 错误类型
//!
//! 只有配置/场景层面的错误会以 `Result` 返回；协议层的异常（损坏、重复、窗口外）
//! 走 `receive` 的有效性分支，不是错误。

use std::path::PathBuf;

use thiserror::Error;

use crate::net::NodeId;

/// 构造信道、节点或链路时的参数错误
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be a probability in [0, 1], got {value}")]
    InvalidProbability { name: &'static str, value: f64 },

    #[error("window size must be at least 1")]
    ZeroWindow,

    #[error("window size {0} does not fit the sequence space (limit is 2 * window)")]
    WindowTooLarge(u32),

    #[error("retransmission timeout must be greater than zero")]
    ZeroTimeout,

    #[error("send interval must be greater than zero")]
    ZeroSendInterval,

    #[error("unknown node {0:?}")]
    UnknownNode(NodeId),
}

/// 加载场景文件时的错误
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read scenario {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse scenario: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
