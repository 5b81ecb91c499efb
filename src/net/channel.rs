//! 信道类型
//!
//! 有时延、会丢包、会损坏数据包的模拟链路。这里只定义信道自身的状态
//! （配置、随机数、在途数据包表）；发送/丢弃/停止等操作需要定时器表与观察者，
//! 实现在 `Network` 上（见 `channel_ops.rs`）。

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;

use super::id::PacketId;
use super::packet::Packet;
use crate::error::ConfigError;
use crate::sim::SimTime;
use crate::timer::TimerId;

/// 信道配置
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelConfig {
    /// 单向传播时延
    pub delay: SimTime,
    /// 丢包概率 [0, 1]
    pub loss_prob: f64,
    /// 损坏概率 [0, 1]（只对未被判定丢弃的数据包抽样）
    pub damage_prob: f64,
    /// 随机数种子；None 表示每次运行都不同
    pub seed: Option<u64>,
}

impl ChannelConfig {
    pub fn new(delay: SimTime, loss_prob: f64, damage_prob: f64) -> Self {
        Self {
            delay,
            loss_prob,
            damage_prob,
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_probability("loss_prob", self.loss_prob)?;
        check_probability("damage_prob", self.damage_prob)
    }
}

/// 场景文件里的信道配置（毫秒）
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelSpec {
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
    #[serde(default)]
    pub loss_prob: f64,
    #[serde(default)]
    pub damage_prob: f64,
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_delay_ms() -> u64 {
    1_000
}

impl Default for ChannelSpec {
    fn default() -> Self {
        Self {
            delay_ms: default_delay_ms(),
            loss_prob: 0.0,
            damage_prob: 0.0,
            seed: None,
        }
    }
}

impl From<&ChannelSpec> for ChannelConfig {
    fn from(spec: &ChannelSpec) -> Self {
        Self {
            delay: SimTime::from_millis(spec.delay_ms),
            loss_prob: spec.loss_prob,
            damage_prob: spec.damage_prob,
            seed: spec.seed,
        }
    }
}

fn check_probability(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidProbability { name, value })
    }
}

/// 在途数据包的命运：要么中途丢失，要么（可能先被损坏再）按时交付，二者互斥。
#[derive(Debug, Clone, Copy)]
pub(crate) enum Fate {
    Lose { loss: TimerId },
    Deliver {
        damage: Option<TimerId>,
        deliver: TimerId,
    },
}

impl Fate {
    /// 该数据包的所有定时器，损坏定时器排在交付定时器之前
    pub(crate) fn timers(self) -> impl Iterator<Item = TimerId> {
        let (first, second) = match self {
            Fate::Lose { loss } => (Some(loss), None),
            Fate::Deliver { damage, deliver } => (damage, Some(deliver)),
        };
        first.into_iter().chain(second)
    }
}

#[derive(Debug)]
pub(crate) struct InFlight {
    pub(crate) pkt: Packet,
    pub(crate) fate: Fate,
}

/// 模拟信道
#[derive(Debug)]
pub struct Channel {
    cfg: ChannelConfig,
    rng: StdRng,
    /// 已发送但尚未结束（交付/丢失/停止）的数据包；按 PacketId 即发送顺序排列
    pub(crate) in_flight: BTreeMap<PacketId, InFlight>,
}

impl Channel {
    pub fn new(cfg: ChannelConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;
        let rng = match cfg.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Ok(Self {
            cfg,
            rng,
            in_flight: BTreeMap::new(),
        })
    }

    pub fn config(&self) -> &ChannelConfig {
        &self.cfg
    }

    pub fn delay(&self) -> SimTime {
        self.cfg.delay
    }

    /// 在途数据包（只读，按发送顺序）
    pub fn traveling_packets(&self) -> impl Iterator<Item = &Packet> {
        self.in_flight.values().map(|f| &f.pkt)
    }

    pub fn is_traveling(&self, id: PacketId) -> bool {
        self.in_flight.contains_key(&id)
    }

    pub fn traveling_count(&self) -> usize {
        self.in_flight.len()
    }

    pub(crate) fn roll_loss(&mut self) -> bool {
        self.rng.random_bool(self.cfg.loss_prob)
    }

    pub(crate) fn roll_damage(&mut self) -> bool {
        self.rng.random_bool(self.cfg.damage_prob)
    }

    /// 途中随机一点：[delay/4, 3·delay/4]，避免在链路两端发生丢失/损坏
    pub(crate) fn mid_flight_offset(&mut self) -> SimTime {
        let d = self.cfg.delay.0;
        let lo = d / 4;
        let hi = d.saturating_mul(3) / 4;
        SimTime(self.rng.random_range(lo..=hi))
    }
}
