//! ARQ 协议仿真
//!
//! 在有损信道上运行停等 / 回退 N / 选择重传，打印统计信息，可选输出事件 JSON。

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use arq_sim::net::{ChannelSpec, Network, Stats};
use arq_sim::scenario::{Protocol, Scenario};
use arq_sim::sim::Simulator;
use arq_sim::viz::EventLog;
use clap::{Parser, ValueEnum};
use tracing::info;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ProtocolArg {
    StopAndWait,
    GoBackN,
    SelectiveRepeat,
}

impl From<ProtocolArg> for Protocol {
    fn from(p: ProtocolArg) -> Self {
        match p {
            ProtocolArg::StopAndWait => Protocol::StopAndWait,
            ProtocolArg::GoBackN => Protocol::GoBackN,
            ProtocolArg::SelectiveRepeat => Protocol::SelectiveRepeat,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "arq-sim", about = "ARQ 协议仿真：停等 / 回退 N / 选择重传")]
struct Args {
    /// scenario.json；给出时忽略下面的协议与信道参数
    #[arg(long)]
    scenario: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = ProtocolArg::StopAndWait)]
    protocol: ProtocolArg,
    #[arg(long, default_value_t = 4)]
    window_size: u32,
    /// 选择重传接收方使用累计确认
    #[arg(long)]
    use_cack: bool,
    /// 重传超时（毫秒）
    #[arg(long, default_value_t = 3_000)]
    timeout_ms: u64,
    /// 信道单向时延（毫秒）
    #[arg(long, default_value_t = 1_000)]
    delay_ms: u64,
    #[arg(long, default_value_t = 0.0)]
    loss_prob: f64,
    #[arg(long, default_value_t = 0.0)]
    damage_prob: f64,
    /// 随机数种子（用于复现）
    #[arg(long)]
    seed: Option<u64>,
    /// 两次调用 send() 的间隔（毫秒）
    #[arg(long, default_value_t = 500)]
    send_interval_ms: u64,
    /// 最多接受多少次发送
    #[arg(long)]
    max_packets: Option<u64>,
    /// 仿真运行到多少毫秒
    #[arg(long, default_value_t = 30_000)]
    until_ms: u64,

    /// 输出事件 JSON 文件
    #[arg(long)]
    events_json: Option<PathBuf>,
}

impl Args {
    fn scenario(&self) -> Scenario {
        Scenario {
            protocol: self.protocol.into(),
            window_size: self.window_size,
            use_cack: self.use_cack,
            timeout_ms: self.timeout_ms,
            channel: ChannelSpec {
                delay_ms: self.delay_ms,
                loss_prob: self.loss_prob,
                damage_prob: self.damage_prob,
                seed: self.seed,
            },
            send_interval_ms: self.send_interval_ms,
            max_packets: self.max_packets,
            until_ms: self.until_ms,
            actions: Vec::new(),
        }
    }
}

fn main() -> ExitCode {
    // 初始化 tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let scenario = match &args.scenario {
        Some(path) => match Scenario::load(path) {
            Ok(s) => s,
            Err(err) => {
                eprintln!("error: {err}");
                return ExitCode::FAILURE;
            }
        },
        None => args.scenario(),
    };

    let mut sim = Simulator::default();
    let mut net = Network::default();

    let stats = Arc::new(Mutex::new(Stats::default()));
    net.add_observer(Arc::clone(&stats));
    let log = args.events_json.as_ref().map(|_| {
        let log = Arc::new(Mutex::new(EventLog::default()));
        net.add_observer(Arc::clone(&log));
        log
    });

    if let Err(err) = scenario.install(&mut net, &mut sim) {
        eprintln!("error: {err}");
        return ExitCode::FAILURE;
    }

    info!(protocol = ?scenario.protocol, until = %scenario.until(), "开始仿真");
    sim.run_until(scenario.until(), &mut net);

    let stats = stats.lock().map(|s| s.clone()).unwrap_or_default();
    println!(
        "done @ {}, data_sent={}, retransmissions={}, acks_sent={}, confirmed={}, lost={}, damaged={}, efficiency={:.3}",
        sim.now(),
        stats.data_sent,
        stats.retransmissions,
        stats.acks_sent,
        stats.confirmed,
        stats.lost,
        stats.damaged,
        stats.efficiency()
    );

    if let (Some(path), Some(log)) = (args.events_json, log) {
        let events = log.lock().map(|l| l.events.clone()).unwrap_or_default();
        let json = match serde_json::to_string_pretty(&events) {
            Ok(json) => json,
            Err(err) => {
                eprintln!("error: serialize events: {err}");
                return ExitCode::FAILURE;
            }
        };
        if let Err(err) = fs::write(&path, json) {
            eprintln!("error: write {}: {err}", path.display());
            return ExitCode::FAILURE;
        }
        eprintln!("wrote {} events to {}", events.len(), path.display());
    }

    ExitCode::SUCCESS
}
