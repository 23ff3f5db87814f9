use crate::stats::window::{RollingCounter, TopCounter};

use std::time::{Duration, Instant};

const WINDOW: Duration = Duration::from_secs(300);

#[test]
fn rolling_counter_counts_events_inside_the_window() {
    // Arrange
    let t0 = Instant::now();
    let mut counter = RollingCounter::new(WINDOW);

    // Act
    counter.record("a", t0);
    counter.record("a", t0 + Duration::from_secs(100));
    counter.record("b", t0 + Duration::from_secs(200));

    // Assert
    counter.evict(t0 + Duration::from_secs(200));
    assert_eq!(counter.get(&"a"), 2);
    assert_eq!(counter.get(&"b"), 1);
}

#[test]
fn rolling_counter_expires_events_older_than_the_window() {
    // Arrange
    let t0 = Instant::now();
    let mut counter = RollingCounter::new(WINDOW);
    counter.record("a", t0);
    counter.record("a", t0 + Duration::from_secs(100));

    // Act: t0 is exactly window-old now, the other event is not
    counter.evict(t0 + Duration::from_secs(300));

    // Assert
    assert_eq!(counter.get(&"a"), 1);

    counter.evict(t0 + Duration::from_secs(400));
    assert_eq!(counter.get(&"a"), 0);
}

#[test]
fn rolling_counter_drops_unseeded_keys_at_zero() {
    // Arrange
    let t0 = Instant::now();
    let mut counter = RollingCounter::new(WINDOW);
    counter.record("transient", t0);

    // Act
    counter.evict(t0 + Duration::from_secs(301));

    // Assert
    assert!(!counter.counts().contains_key(&"transient"));
}

#[test]
fn rolling_counter_keeps_seeded_keys_at_zero() {
    // Arrange
    let t0 = Instant::now();
    let mut counter = RollingCounter::new(WINDOW);
    counter.seed("steady");
    counter.record("steady", t0);

    // Act
    counter.evict(t0 + Duration::from_secs(301));

    // Assert
    assert_eq!(counter.counts().get(&"steady"), Some(&0));
}

#[test]
fn top_counter_compacts_at_one_and_a_half_times_retention() {
    // Arrange
    let mut counter = TopCounter::new(4);

    // keep two keys hot
    for _ in 0..5 {
        counter.record("hot-1");
        counter.record("hot-2");
    }

    // Act: cold distinct keys push cardinality up to the compaction point
    for i in 0..4 {
        let key: &'static str = format!("cold-{i}").leak();
        counter.record(key);
        assert!(counter.len() < 6, "cardinality bound violated");
    }

    // Assert: compacted back down to exactly the retention size
    assert_eq!(counter.len(), 4);
    assert_eq!(counter.get(&"hot-1"), 5);
    assert_eq!(counter.get(&"hot-2"), 5);
}

#[test]
fn top_counter_keeps_most_frequent_keys_when_compacting() {
    // Arrange
    let mut counter = TopCounter::new(2);
    counter.record("a");
    counter.record("a");
    counter.record("b");

    // Act: third distinct key reaches 1.5x retention and compacts
    counter.record("c");

    // Assert
    assert_eq!(counter.len(), 2);
    assert_eq!(counter.get(&"a"), 2);
    assert_eq!(counter.get(&"c"), 0, "least frequent keys are dropped");
}

#[test]
fn most_common_orders_by_count_then_key() {
    // Arrange
    let mut counter = TopCounter::new(100);
    for _ in 0..3 {
        counter.record("o");
        counter.record("m");
    }
    for _ in 0..4 {
        counter.record(" ");
    }
    counter.record("l");

    // Act
    let top = counter.most_common(3);

    // Assert
    assert_eq!(
        top,
        vec![(&" ", 4), (&"m", 3), (&"o", 3)],
    );
}
