//! 手动操作事件
//!
//! 对应交互界面里的“点击数据包丢弃/损坏”“暂停/继续”“停止”。

use super::build::Link;
use super::model::Action;
use crate::net::Network;
use crate::sim::{Event, Simulator, World};
use tracing::{info, warn};

/// 事件：在指定时刻对链路执行一个手动操作
#[derive(Debug)]
pub struct ScriptedAction {
    pub link: Link,
    pub action: Action,
}

impl Event for ScriptedAction {
    #[tracing::instrument(skip(self, sim, world), fields(action = ?self.action, now = %sim.now()))]
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) {
        let ScriptedAction { link, action } = *self;
        let Some(net) = world.as_any_mut().downcast_mut::<Network>() else {
            warn!("world is not a Network");
            return;
        };
        let now = sim.now();

        match action {
            Action::LoseOldest => {
                let oldest = net
                    .channel(link.channel)
                    .and_then(|ch| ch.traveling_packets().next())
                    .map(|p| p.id());
                match oldest {
                    Some(pkt) => {
                        net.lose_packet(link.channel, pkt, now);
                    }
                    None => info!("信道中没有在途数据包"),
                }
            }
            Action::DamageOldest => {
                let target = net
                    .channel(link.channel)
                    .and_then(|ch| ch.traveling_packets().find(|p| !p.is_corrupted()))
                    .map(|p| p.id());
                match target {
                    Some(pkt) => {
                        net.damage_packet(link.channel, pkt, now);
                    }
                    None => info!("信道中没有可损坏的在途数据包"),
                }
            }
            Action::Pause => net.pause(sim),
            Action::Resume => net.resume(sim),
            Action::Stop => net.stop(sim),
        }
    }
}
