use super::{bench, clean_channel, Bench};
use crate::arq::{ArqSender, SelectiveRepeatReceiver, SelectiveRepeatSender};
use crate::net::ChannelConfig;
use crate::scenario::Protocol;
use crate::sim::SimTime;

fn ms(v: u64) -> SimTime {
    SimTime::from_millis(v)
}

fn sr(window: u32, use_cack: bool) -> Bench {
    bench(
        Protocol::SelectiveRepeat,
        window,
        use_cack,
        clean_channel(1_000),
        ms(5_000),
    )
}

fn receiver_acks(b: &Bench) -> Vec<(u32, bool)> {
    b.sent_by(b.link.receiver)
        .iter()
        .filter_map(|p| p.ack_num().map(|a| (a, p.is_cumulative_ack())))
        .collect()
}

#[test]
fn individual_ack_confirms_only_that_sequence() {
    let mut b = sr(4, false);
    for _ in 0..4 {
        b.net.send(b.link.sender, &mut b.sim);
    }
    b.inject_ack(2, false);

    assert_eq!(b.confirmed(), vec![2]);
    let sender = b.net.node::<SelectiveRepeatSender>(b.link.sender).expect("sender");
    assert_eq!(sender.base(), 0);
    assert_eq!(sender.core().armed().collect::<Vec<_>>(), vec![0, 1, 3]);
    assert!(b.window_moves(b.link.sender).is_empty());
}

#[test]
fn base_skips_over_already_confirmed_sequences() {
    let mut b = sr(4, false);
    for _ in 0..4 {
        b.net.send(b.link.sender, &mut b.sim);
    }
    b.inject_ack(1, false);
    b.inject_ack(0, false);

    let sender = b.net.node::<SelectiveRepeatSender>(b.link.sender).expect("sender");
    assert_eq!(sender.base(), 2);
    assert_eq!(b.window_moves(b.link.sender), vec![2]);

    // 重复确认无效
    b.inject_ack(0, false);
    let last = b.received_by(b.link.sender).pop().expect("receive event");
    assert!(!last.1);
}

#[test]
fn cumulative_ack_confirms_every_pending_sequence_through_it() {
    let mut b = sr(4, false);
    for _ in 0..4 {
        b.net.send(b.link.sender, &mut b.sim);
    }
    b.inject_ack(2, false);
    b.inject_ack(3, true);

    assert_eq!(b.confirmed(), vec![2, 0, 1, 3]);
    let sender = b.net.node::<SelectiveRepeatSender>(b.link.sender).expect("sender");
    assert_eq!(sender.base(), 4);
    assert!(sender.window().is_empty());
    assert_eq!(b.window_moves(b.link.sender), vec![4]);
}

#[test]
fn timeout_resends_only_the_expired_sequence() {
    let lossy = ChannelConfig::new(ms(10), 1.0, 0.0).with_seed(5);
    let mut b = bench(Protocol::SelectiveRepeat, 4, false, lossy, ms(100));
    b.net.send(b.link.sender, &mut b.sim);
    b.sim.run_until(ms(50), &mut b.net);
    b.net.send(b.link.sender, &mut b.sim);
    b.sim.run_until(ms(120), &mut b.net);

    let resent: Vec<(u32, bool)> = b
        .sent_by(b.link.sender)
        .iter()
        .map(|p| (p.seq_num(), p.was_retransmitted()))
        .collect();
    assert_eq!(resent, vec![(0, false), (1, false), (0, true)]);
}

#[test]
fn receiver_buffers_out_of_order_and_slides_over_the_run() {
    let mut b = sr(4, false);
    for seq in [2, 3, 0, 1] {
        b.inject_data(seq);
    }

    assert_eq!(b.window_moves(b.link.receiver), vec![1, 3]);
    assert_eq!(
        receiver_acks(&b),
        vec![(2, false), (3, false), (0, false), (1, false)]
    );
    let receiver = b
        .net
        .node::<SelectiveRepeatReceiver>(b.link.receiver)
        .expect("receiver");
    assert_eq!(receiver.base(), 4);
    assert_eq!(receiver.next_seq_num(), 0);
    assert!((0..8).all(|seq| !receiver.is_buffered(seq)));
}

#[test]
fn cack_receiver_acknowledges_the_contiguous_prefix() {
    let mut b = sr(4, true);
    for seq in [2, 3, 0, 1] {
        b.inject_data(seq);
    }

    assert_eq!(
        receiver_acks(&b),
        vec![(2, false), (3, false), (0, true), (3, true)]
    );
}

#[test]
fn corrupted_packet_is_dropped_silently_without_cack() {
    let mut b = sr(3, false);
    let mut pkt = b.net.make_data(0, b.link.sender, b.link.receiver, false);
    pkt.mark_corrupted();
    b.inject(b.link.receiver, pkt);

    assert!(receiver_acks(&b).is_empty());
    assert!(!b.received_by(b.link.receiver)[0].1);
}

#[test]
fn corrupted_packet_triggers_cumulative_ack_with_cack() {
    let mut b = sr(3, true);
    b.inject_data(0);
    let mut pkt = b.net.make_data(1, b.link.sender, b.link.receiver, false);
    pkt.mark_corrupted();
    b.inject(b.link.receiver, pkt);

    assert_eq!(receiver_acks(&b), vec![(0, true), (0, true)]);
}

#[test]
fn duplicates_and_previous_window_packets_are_reacknowledged() {
    let mut b = sr(3, false);
    b.inject_data(1);
    b.inject_data(1);
    for seq in [0, 2] {
        b.inject_data(seq);
    }
    // base 现在是 3，2 属于上一个窗口
    b.inject_data(2);

    assert_eq!(
        receiver_acks(&b),
        vec![(1, false), (1, false), (0, false), (2, false), (2, false)]
    );
    let oks: Vec<bool> = b
        .received_by(b.link.receiver)
        .iter()
        .map(|(_, ok)| *ok)
        .collect();
    assert_eq!(oks, vec![true, false, true, true, false]);
}

#[test]
fn cack_link_runs_clean_across_sequence_wraparound() {
    let mut b = bench(
        Protocol::SelectiveRepeat,
        2,
        true,
        clean_channel(10),
        ms(100),
    );
    for step in 0..6 {
        b.sim.run_until(ms(step * 30), &mut b.net);
        b.net.send(b.link.sender, &mut b.sim);
    }
    b.sim.run_until(ms(1_000), &mut b.net);

    assert_eq!(b.confirmed(), vec![0, 1, 2, 3, 0, 1]);
    let sender = b.net.node::<SelectiveRepeatSender>(b.link.sender).expect("sender");
    assert!(sender.window().is_empty());
    assert_eq!(sender.core().armed().count(), 0);
}
