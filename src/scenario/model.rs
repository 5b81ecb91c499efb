use serde::Deserialize;

use crate::net::ChannelSpec;

/// 协议选择
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Protocol {
    #[default]
    StopAndWait,
    GoBackN,
    SelectiveRepeat,
}

/// 一次仿真的完整描述（scenario.json）
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub protocol: Protocol,
    #[serde(default = "default_window_size")]
    pub window_size: u32,
    /// 选择重传接收方是否使用累计确认
    #[serde(default)]
    pub use_cack: bool,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default)]
    pub channel: ChannelSpec,
    /// 外部驱动调用 `send()` 的间隔
    #[serde(default = "default_send_interval_ms")]
    pub send_interval_ms: u64,
    /// 最多接受多少次发送；None 表示不限
    #[serde(default)]
    pub max_packets: Option<u64>,
    #[serde(default = "default_until_ms")]
    pub until_ms: u64,
    /// 按时间执行的手动操作（对应交互界面里的点击丢包/损坏、暂停、停止）
    #[serde(default)]
    pub actions: Vec<ActionSpec>,
}

fn default_window_size() -> u32 {
    4
}

fn default_timeout_ms() -> u64 {
    3_000
}

fn default_send_interval_ms() -> u64 {
    500
}

fn default_until_ms() -> u64 {
    30_000
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            protocol: Protocol::default(),
            window_size: default_window_size(),
            use_cack: false,
            timeout_ms: default_timeout_ms(),
            channel: ChannelSpec::default(),
            send_interval_ms: default_send_interval_ms(),
            max_packets: None,
            until_ms: default_until_ms(),
            actions: Vec::new(),
        }
    }
}

/// 在 `at_ms` 时刻执行的手动操作
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ActionSpec {
    pub at_ms: u64,
    pub action: Action,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// 丢弃信道中最早发出的在途数据包
    LoseOldest,
    /// 损坏信道中最早发出、尚未损坏的在途数据包
    DamageOldest,
    Pause,
    Resume,
    Stop,
}
