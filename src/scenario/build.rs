//! 组装：按配置创建信道、接收方、发送方并把它们连起来

use std::fs;
use std::path::Path;

use super::driver::ScriptedAction;
use super::model::{Protocol, Scenario};
use crate::arq::{
    GoBackNSender, ReceiverConfig, SelectiveRepeatReceiver, SelectiveRepeatSender, SenderConfig,
    SequentialReceiver, StopAndWaitSender,
};
use crate::error::{ConfigError, ScenarioError};
use crate::net::{ChannelConfig, ChannelId, Network, NodeId};
use crate::sim::{SimTime, Simulator};
use tracing::info;

/// 一条模拟链路：信道 + 接收方 + 发送方
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link {
    pub channel: ChannelId,
    pub sender: NodeId,
    pub receiver: NodeId,
}

/// 链路配置
#[derive(Debug, Clone)]
pub struct LinkConfig {
    pub protocol: Protocol,
    pub window_size: u32,
    pub use_cack: bool,
    pub timeout: SimTime,
    pub channel: ChannelConfig,
}

/// 先建信道，再建接收方，最后建指向接收方的发送方
pub fn build_link(net: &mut Network, cfg: &LinkConfig) -> Result<Link, ConfigError> {
    let channel = net.add_channel(cfg.channel.clone())?;
    let receiver_cfg = ReceiverConfig {
        channel,
        window_size: cfg.window_size,
        use_cack: cfg.use_cack,
    };

    let receiver = match cfg.protocol {
        Protocol::StopAndWait => net.add_node(SequentialReceiver::stop_and_wait(channel)),
        Protocol::GoBackN => net.add_node(SequentialReceiver::go_back_n(&receiver_cfg)?),
        Protocol::SelectiveRepeat => net.add_node(SelectiveRepeatReceiver::new(&receiver_cfg)?),
    };

    let sender_cfg = SenderConfig {
        receiver,
        channel,
        timeout: cfg.timeout,
        window_size: cfg.window_size,
    };
    let sender = match cfg.protocol {
        Protocol::StopAndWait => net.add_node(StopAndWaitSender::new(&sender_cfg)?),
        Protocol::GoBackN => net.add_node(GoBackNSender::new(&sender_cfg)?),
        Protocol::SelectiveRepeat => net.add_node(SelectiveRepeatSender::new(&sender_cfg)?),
    };

    info!(protocol = ?cfg.protocol, ?channel, ?sender, ?receiver, "🔗 链路已建立");
    Ok(Link {
        channel,
        sender,
        receiver,
    })
}

impl Scenario {
    pub fn from_json(raw: &str) -> Result<Self, ScenarioError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let raw = fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn link_config(&self) -> LinkConfig {
        LinkConfig {
            protocol: self.protocol,
            window_size: self.window_size,
            use_cack: self.use_cack,
            timeout: SimTime::from_millis(self.timeout_ms),
            channel: ChannelConfig::from(&self.channel),
        }
    }

    pub fn until(&self) -> SimTime {
        SimTime::from_millis(self.until_ms)
    }

    /// 建立链路、启动发送节拍并排好所有手动操作
    pub fn install(&self, net: &mut Network, sim: &mut Simulator) -> Result<Link, ConfigError> {
        let link = build_link(net, &self.link_config())?;
        net.start_send_cadence(
            link.sender,
            SimTime::from_millis(self.send_interval_ms),
            self.max_packets,
            sim,
        )?;
        for spec in &self.actions {
            sim.schedule(
                SimTime::from_millis(spec.at_ms),
                ScriptedAction {
                    link,
                    action: spec.action,
                },
            );
        }
        Ok(link)
    }
}
