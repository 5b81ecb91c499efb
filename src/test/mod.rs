mod config_errors;
mod lossy_runs;
mod selective_repeat;
mod sim_time;

use std::sync::{Arc, Mutex};

use crate::net::{ChannelConfig, Network, NodeId, Packet};
use crate::scenario::{build_link, Link, LinkConfig, Protocol};
use crate::sim::{SimTime, Simulator};
use crate::viz::{EventLog, LoggedEvent, LoggedEventKind};

/// 一条装好事件记录器的链路
pub(crate) struct Bench {
    pub sim: Simulator,
    pub net: Network,
    pub log: Arc<Mutex<EventLog>>,
    pub link: Link,
}

pub(crate) fn bench(protocol: Protocol, window_size: u32, use_cack: bool, channel: ChannelConfig, timeout: SimTime) -> Bench {
    let mut net = Network::default();
    let log = Arc::new(Mutex::new(EventLog::default()));
    net.add_observer(Arc::clone(&log));
    let link = build_link(
        &mut net,
        &LinkConfig {
            protocol,
            window_size,
            use_cack,
            timeout,
            channel,
        },
    )
    .expect("build link");
    Bench {
        sim: Simulator::default(),
        net,
        log,
        link,
    }
}

/// 无损信道，固定种子
pub(crate) fn clean_channel(delay_ms: u64) -> ChannelConfig {
    ChannelConfig::new(SimTime::from_millis(delay_ms), 0.0, 0.0).with_seed(7)
}

impl Bench {
    pub fn events(&self) -> Vec<LoggedEvent> {
        self.log.lock().expect("log lock").events.clone()
    }

    /// 绕过信道直接把数据包交给 `node`
    pub fn inject(&mut self, node: NodeId, pkt: Packet) {
        self.net.receive(node, pkt, &mut self.sim);
    }

    pub fn inject_data(&mut self, seq: u32) {
        let pkt = self
            .net
            .make_data(seq, self.link.sender, self.link.receiver, false);
        self.inject(self.link.receiver, pkt);
    }

    pub fn inject_ack(&mut self, ack_num: u32, cumulative: bool) {
        let pkt = self
            .net
            .make_ack(ack_num, self.link.receiver, self.link.sender, cumulative);
        self.inject(self.link.sender, pkt);
    }

    /// 某节点发出的数据包，按发送顺序
    pub fn sent_by(&self, node: NodeId) -> Vec<Packet> {
        self.events()
            .into_iter()
            .filter_map(|e| match e.kind {
                LoggedEventKind::Send { node: n, pkt } if n == node => Some(pkt),
                _ => None,
            })
            .collect()
    }

    pub fn confirmed(&self) -> Vec<u32> {
        self.events()
            .into_iter()
            .filter_map(|e| match e.kind {
                LoggedEventKind::PktConfirmed { seq, .. } => Some(seq),
                _ => None,
            })
            .collect()
    }

    pub fn window_moves(&self, node: NodeId) -> Vec<u32> {
        self.events()
            .into_iter()
            .filter_map(|e| match e.kind {
                LoggedEventKind::WindowMoved { node: n, spaces } if n == node => Some(spaces),
                _ => None,
            })
            .collect()
    }

    /// 节点收到的数据包及其有效性
    pub fn received_by(&self, node: NodeId) -> Vec<(Packet, bool)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e.kind {
                LoggedEventKind::Receive { node: n, pkt, is_ok } if n == node => Some((pkt, is_ok)),
                _ => None,
            })
            .collect()
    }
}
