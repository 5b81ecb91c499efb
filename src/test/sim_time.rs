use crate::sim::SimTime;

#[test]
fn sim_time_unit_conversions() {
    assert_eq!(SimTime::from_micros(1), SimTime(1_000));
    assert_eq!(SimTime::from_millis(1), SimTime(1_000_000));
    assert_eq!(SimTime::from_secs(1), SimTime(1_000_000_000));
    assert_eq!(SimTime::from_millis(1_500).as_millis_f64(), 1_500.0);
}

#[test]
fn sim_time_unit_conversions_saturate_on_overflow() {
    assert_eq!(SimTime::from_micros(u64::MAX), SimTime(u64::MAX));
    assert_eq!(SimTime::from_millis(u64::MAX), SimTime(u64::MAX));
    assert_eq!(SimTime::from_secs(u64::MAX), SimTime(u64::MAX));
}

#[test]
fn sim_time_arithmetic_saturates() {
    assert_eq!(SimTime(5).saturating_sub(SimTime(9)), SimTime::ZERO);
    assert_eq!(SimTime(u64::MAX).saturating_add(SimTime(1)), SimTime(u64::MAX));
    assert_eq!(SimTime(3).saturating_add(SimTime(4)), SimTime(7));
}

#[test]
fn sim_time_displays_as_millis() {
    assert_eq!(SimTime::from_micros(1_250).to_string(), "1.250ms");
    assert_eq!(SimTime::ZERO.to_string(), "0.000ms");
}
