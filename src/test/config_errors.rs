use crate::arq::{
    GoBackNSender, ReceiverConfig, SelectiveRepeatReceiver, SelectiveRepeatSender, SenderConfig,
    SenderCore, StopAndWaitSender,
};
use crate::error::ConfigError;
use crate::net::{ChannelConfig, ChannelId, Network, NodeCtx, NodeId};
use crate::sim::{SimTime, Simulator};

fn sender_cfg(window_size: u32, timeout: SimTime) -> SenderConfig {
    SenderConfig {
        receiver: NodeId(0),
        channel: ChannelId(0),
        timeout,
        window_size,
    }
}

#[test]
fn probabilities_outside_unit_interval_are_rejected() {
    let mut net = Network::default();
    let err = net
        .add_channel(ChannelConfig::new(SimTime::from_millis(1), 1.5, 0.0))
        .expect_err("loss > 1");
    assert_eq!(
        err,
        ConfigError::InvalidProbability {
            name: "loss_prob",
            value: 1.5
        }
    );
    let err = net
        .add_channel(ChannelConfig::new(SimTime::from_millis(1), 0.0, -0.1))
        .expect_err("damage < 0");
    assert!(matches!(
        err,
        ConfigError::InvalidProbability {
            name: "damage_prob",
            ..
        }
    ));
    assert!(net.channel(ChannelId(0)).is_none());
}

#[test]
fn windowed_protocols_reject_bad_window_sizes() {
    let timeout = SimTime::from_millis(100);
    assert_eq!(
        GoBackNSender::new(&sender_cfg(0, timeout)).err(),
        Some(ConfigError::ZeroWindow)
    );
    assert_eq!(
        SelectiveRepeatSender::new(&sender_cfg(u32::MAX, timeout)).err(),
        Some(ConfigError::WindowTooLarge(u32::MAX))
    );
    let receiver_cfg = ReceiverConfig {
        channel: ChannelId(0),
        window_size: 0,
        use_cack: true,
    };
    assert_eq!(
        SelectiveRepeatReceiver::new(&receiver_cfg).err(),
        Some(ConfigError::ZeroWindow)
    );
}

#[test]
fn stop_and_wait_ignores_window_but_not_timeout() {
    assert!(StopAndWaitSender::new(&sender_cfg(0, SimTime::from_millis(1))).is_ok());
    assert_eq!(
        StopAndWaitSender::new(&sender_cfg(1, SimTime::ZERO)).err(),
        Some(ConfigError::ZeroTimeout)
    );
}

#[test]
fn send_cadence_requires_a_known_node_and_positive_interval() {
    let mut net = Network::default();
    let mut sim = Simulator::default();
    assert_eq!(
        net.start_send_cadence(NodeId(3), SimTime::from_millis(1), None, &mut sim)
            .err(),
        Some(ConfigError::UnknownNode(NodeId(3)))
    );

    let sender = net.add_node(
        StopAndWaitSender::new(&sender_cfg(1, SimTime::from_millis(1))).expect("sender"),
    );
    assert_eq!(
        net.start_send_cadence(sender, SimTime::ZERO, None, &mut sim)
            .err(),
        Some(ConfigError::ZeroSendInterval)
    );
}

#[test]
#[should_panic(expected = "already set")]
fn setting_a_timeout_twice_panics() {
    let mut net = Network::default();
    let mut sim = Simulator::default();
    let mut core = SenderCore::new(&sender_cfg(1, SimTime::from_millis(10)));
    let mut ctx = NodeCtx::new(NodeId(0), &mut net, &mut sim);
    core.set_timeout(0, &mut ctx);
    core.set_timeout(0, &mut ctx);
}
