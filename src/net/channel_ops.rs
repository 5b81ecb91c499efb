//! 信道操作
//!
//! 发送、强制丢弃/损坏、暂停/恢复/停止，以及信道定时器到期后的处理。

use super::channel::{Fate, InFlight};
use super::id::{ChannelId, PacketId};
use super::network::{Network, TimerTarget};
use super::packet::Packet;
use crate::sim::{SimTime, Simulator};
use tracing::{debug, info, trace, warn};

impl Network {
    /// 把数据包交给信道。
    ///
    /// 发送时先抽一次丢包；若丢，只安排途中的丢失事件、不安排交付。
    /// 否则再抽一次损坏；若损坏，安排途中的损坏事件。未丢的包总会在 `delay` 后交付。
    #[tracing::instrument(skip(self, pkt, sim), fields(pkt_id = pkt.id().0, seq = pkt.seq_num(), ack = pkt.is_ack()))]
    pub fn channel_send(&mut self, channel: ChannelId, pkt: Packet, sim: &mut Simulator) {
        let Some(ch) = self.channels.get_mut(channel.0) else {
            warn!(?channel, "信道不存在，丢弃数据包");
            return;
        };
        let pkt_id = pkt.id();
        let delay = ch.delay();

        let fate = if ch.roll_loss() {
            let at = ch.mid_flight_offset();
            debug!(at = %at, "数据包将在途中丢失");
            let loss = self.timers.start(
                sim,
                at,
                TimerTarget::Loss {
                    channel,
                    pkt: pkt_id,
                },
                false,
            );
            Fate::Lose { loss }
        } else {
            let damage = if ch.roll_damage() {
                let at = ch.mid_flight_offset();
                debug!(at = %at, "数据包将在途中损坏");
                Some(self.timers.start(
                    sim,
                    at,
                    TimerTarget::Damage {
                        channel,
                        pkt: pkt_id,
                    },
                    false,
                ))
            } else {
                None
            };
            let deliver = self.timers.start(
                sim,
                delay,
                TimerTarget::Deliver {
                    channel,
                    pkt: pkt_id,
                },
                false,
            );
            Fate::Deliver { damage, deliver }
        };

        trace!(?fate, "数据包进入信道");
        self.channels[channel.0]
            .in_flight
            .insert(pkt_id, InFlight { pkt, fate });
    }

    /// 立即丢弃一个在途数据包；返回它是否在途。
    pub fn lose_packet(&mut self, channel: ChannelId, pkt: PacketId, now: SimTime) -> bool {
        let Some(entry) = self.take_in_flight(channel, pkt) else {
            return false;
        };
        info!(pkt_id = pkt.0, seq = entry.pkt.seq_num(), "💥 手动丢弃在途数据包");
        self.notify(|o| o.on_packet_lost(now, channel, &entry.pkt));
        true
    }

    /// 立即损坏一个在途数据包（它仍会到达，只是带着损坏标记）。
    ///
    /// 返回它是否在途且尚未损坏。
    pub fn damage_packet(&mut self, channel: ChannelId, pkt: PacketId, now: SimTime) -> bool {
        let Some(entry) = self
            .channels
            .get_mut(channel.0)
            .and_then(|ch| ch.in_flight.get_mut(&pkt))
        else {
            return false;
        };
        if entry.pkt.is_corrupted() {
            return false;
        }
        if let Fate::Deliver {
            damage: Some(timer),
            deliver,
        } = entry.fate
        {
            self.timers.stop(timer);
            entry.fate = Fate::Deliver {
                damage: None,
                deliver,
            };
        }
        entry.pkt.mark_corrupted();
        info!(pkt_id = pkt.0, seq = entry.pkt.seq_num(), "⚡ 手动损坏在途数据包");
        let view = entry.pkt.clone();
        self.notify(|o| o.on_packet_damaged(now, channel, &view));
        true
    }

    /// 停止信道：取消所有在途数据包的定时器并逐个通知，之后它们既不会到达也不会再丢失/损坏。
    pub fn stop_channel(&mut self, channel: ChannelId, now: SimTime) {
        let Some(ch) = self.channels.get_mut(channel.0) else {
            return;
        };
        let stopped = std::mem::take(&mut ch.in_flight);
        if !stopped.is_empty() {
            info!(?channel, count = stopped.len(), "⏹️  停止信道");
        }
        for entry in stopped.values() {
            for timer in entry.fate.timers() {
                self.timers.stop(timer);
            }
        }
        for entry in stopped.values() {
            self.notify(|o| o.on_packet_stopped(now, channel, &entry.pkt));
        }
    }

    pub fn pause_channel(&mut self, channel: ChannelId, now: SimTime) {
        let Some(ch) = self.channels.get(channel.0) else {
            return;
        };
        for entry in ch.in_flight.values() {
            for timer in entry.fate.timers() {
                self.timers.pause(timer, now);
            }
        }
    }

    /// 恢复信道；同一数据包的损坏定时器先于交付定时器恢复。
    pub fn resume_channel(&mut self, channel: ChannelId, sim: &mut Simulator) {
        let Some(ch) = self.channels.get(channel.0) else {
            return;
        };
        for entry in ch.in_flight.values() {
            for timer in entry.fate.timers() {
                self.timers.resume(timer, sim);
            }
        }
    }

    fn take_in_flight(&mut self, channel: ChannelId, pkt: PacketId) -> Option<InFlight> {
        let entry = self.channels.get_mut(channel.0)?.in_flight.remove(&pkt)?;
        for timer in entry.fate.timers() {
            self.timers.stop(timer);
        }
        Some(entry)
    }

    pub(crate) fn on_damage_point(&mut self, channel: ChannelId, pkt: PacketId, now: SimTime) {
        let Some(entry) = self
            .channels
            .get_mut(channel.0)
            .and_then(|ch| ch.in_flight.get_mut(&pkt))
        else {
            return;
        };
        if let Fate::Deliver { deliver, .. } = entry.fate {
            entry.fate = Fate::Deliver {
                damage: None,
                deliver,
            };
        }
        entry.pkt.mark_corrupted();
        info!(pkt_id = pkt.0, seq = entry.pkt.seq_num(), "⚡ 数据包在途中损坏");
        let view = entry.pkt.clone();
        self.notify(|o| o.on_packet_damaged(now, channel, &view));
    }

    pub(crate) fn on_loss_point(&mut self, channel: ChannelId, pkt: PacketId, now: SimTime) {
        let Some(entry) = self
            .channels
            .get_mut(channel.0)
            .and_then(|ch| ch.in_flight.remove(&pkt))
        else {
            return;
        };
        info!(pkt_id = pkt.0, seq = entry.pkt.seq_num(), "💥 数据包在途中丢失");
        self.notify(|o| o.on_packet_lost(now, channel, &entry.pkt));
    }

    /// 交付：从在途表移除并交给接收方的 `receive`。
    #[tracing::instrument(skip(self, sim), fields(now = %sim.now()))]
    pub(crate) fn on_deliver(&mut self, channel: ChannelId, pkt: PacketId, sim: &mut Simulator) {
        let Some(entry) = self
            .channels
            .get_mut(channel.0)
            .and_then(|ch| ch.in_flight.remove(&pkt))
        else {
            return;
        };
        let to = entry.pkt.receiver();
        debug!(
            to = ?to,
            seq = entry.pkt.seq_num(),
            corrupted = entry.pkt.is_corrupted(),
            "📨 数据包到达"
        );
        self.receive(to, entry.pkt, sim);
    }
}
