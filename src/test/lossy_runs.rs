use super::{bench, clean_channel, Bench};
use crate::arq::{ArqSender, GoBackNSender, SelectiveRepeatSender, StopAndWaitSender, Window};
use crate::net::ChannelConfig;
use crate::scenario::Protocol;
use crate::sim::SimTime;

fn ms(v: u64) -> SimTime {
    SimTime::from_millis(v)
}

const SEEDS: u64 = 20;

/// 在 25% 丢失、25% 损坏的信道上以固定节拍发送，每 5ms 检查一次 `check`
fn lossy_run(protocol: Protocol, window_size: u32, use_cack: bool, seed: u64, check: impl Fn(&Bench)) -> Bench {
    let channel = ChannelConfig::new(ms(50), 0.25, 0.25).with_seed(seed);
    let mut b = bench(protocol, window_size, use_cack, channel, ms(200));
    b.net
        .start_send_cadence(b.link.sender, ms(20), None, &mut b.sim)
        .expect("cadence");
    for step in 1..=2_000 {
        b.sim.run_until(ms(step * 5), &mut b.net);
        check(&b);
    }
    b
}

fn window_holds(w: &Window) {
    assert!(w.outstanding() <= w.size(), "outstanding {} > size {}", w.outstanding(), w.size());
    assert!(w.base() < w.space().limit());
    assert!(w.next_seq_num() < w.space().limit());
}

/// 按序确认：每个被确认的序号都是上一个的后继
fn assert_in_order(confirmed: &[u32], limit: u32) {
    for pair in confirmed.windows(2) {
        assert_eq!(pair[1], (pair[0] + 1) % limit, "confirmed {confirmed:?}");
    }
}

#[test]
fn stop_and_wait_keeps_one_packet_outstanding() {
    for seed in 0..SEEDS {
        let b = lossy_run(Protocol::StopAndWait, 1, false, seed, |b| {
            let s = b.net.node::<StopAndWaitSender>(b.link.sender).expect("sender");
            let armed = s.core().armed().count();
            assert!(armed <= 1);
            assert!(armed == 0 || s.is_waiting_ack());
        });
        let confirmed = b.confirmed();
        assert!(!confirmed.is_empty(), "seed {seed} confirmed nothing");
        assert_in_order(&confirmed, 2);
    }
}

#[test]
fn go_back_n_window_stays_bounded_under_loss_and_damage() {
    for window in 1..=4 {
        for seed in 0..SEEDS {
            let b = lossy_run(Protocol::GoBackN, window, false, seed, |b| {
                let s = b.net.node::<GoBackNSender>(b.link.sender).expect("sender");
                window_holds(s.window());
                let armed: Vec<u32> = s.core().armed().collect();
                if s.window().is_empty() {
                    assert!(armed.is_empty());
                } else {
                    assert_eq!(armed, vec![s.base()]);
                }
            });
            let confirmed = b.confirmed();
            assert!(!confirmed.is_empty(), "window {window} seed {seed} confirmed nothing");
            assert_in_order(&confirmed, window * 2);
        }
    }
}

#[test]
fn selective_repeat_window_stays_bounded_under_loss_and_damage() {
    for use_cack in [false, true] {
        for window in 1..=4 {
            for seed in 0..SEEDS {
                let b = lossy_run(Protocol::SelectiveRepeat, window, use_cack, seed, |b| {
                    let s = b
                        .net
                        .node::<SelectiveRepeatSender>(b.link.sender)
                        .expect("sender");
                    window_holds(s.window());
                    assert!(s.core().armed().all(|seq| s.window().is_outstanding(seq)));
                    // base 要么是窗口末尾，要么仍在等待确认
                    assert!(s.window().is_empty() || s.core().is_timeout_set(s.base()));
                });
                assert!(
                    !b.confirmed().is_empty(),
                    "cack {use_cack} window {window} seed {seed} confirmed nothing"
                );
            }
        }
    }
}

#[test]
fn long_cadence_run_recycles_timer_slots() {
    let mut b = bench(Protocol::GoBackN, 4, false, clean_channel(10), ms(100));
    b.net
        .start_send_cadence(b.link.sender, ms(1), None, &mut b.sim)
        .expect("cadence");
    b.sim.run_until(SimTime::from_secs(10), &mut b.net);

    assert!(b.confirmed().len() > 1_000);
    let timers = b.net.timers();
    assert!(timers.capacity() < 32, "timer slots: {}", timers.capacity());
    assert!(timers.live() <= timers.capacity());
}
