use super::*;

#[test]
fn default_policy_matches_the_gateway_contract() {
    let policy = RetryPolicy::default();
    assert_eq!(policy.max_attempts, 10);
    assert_eq!(policy.initial_delay, Duration::from_secs(1));
    assert_eq!(policy.backoff_multiplier, 2.0);
}

#[test]
fn delay_doubles_each_attempt() {
    let policy = RetryPolicy::default();
    assert_eq!(policy.calculate_delay(0), Duration::from_secs(1));
    assert_eq!(policy.calculate_delay(1), Duration::from_secs(2));
    assert_eq!(policy.calculate_delay(2), Duration::from_secs(4));
}

#[test]
fn delay_is_capped_at_max_delay() {
    let policy = RetryPolicy::new(20, Duration::from_secs(1), Duration::from_secs(10), 2.0);
    assert_eq!(policy.calculate_delay(10), Duration::from_secs(10));
}

#[test]
fn should_retry_stops_at_max_attempts() {
    let policy = RetryPolicy::new(3, Duration::from_millis(1), Duration::from_secs(1), 2.0);
    assert!(policy.should_retry(0));
    assert!(policy.should_retry(1));
    assert!(!policy.should_retry(2));
}
