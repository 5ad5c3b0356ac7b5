//! End-to-end pipeline tests
//!
//! Exercises fleet -> batcher -> encoder -> publisher through the publish
//! loop, using the in-memory publisher as the transport.

use std::collections::HashMap;
use std::time::Duration;

use fleetsim::{
    DeviceFleet, MemoryPublisher, PayloadEncoder, PublishLoop, PublishLoopConfig, RetryPolicy,
    TelemetryBatcher, MAX_HUMIDITY, MAX_TEMPERATURE, MIN_HUMIDITY, MIN_TEMPERATURE,
};
use tokio::sync::watch;
use uuid::Uuid;

#[tokio::test]
async fn pipeline_roundtrips_batches_in_order() {
    let fleet = DeviceFleet::new(2).unwrap();
    let a = fleet.get(0).unwrap().id();
    let b = fleet.get(1).unwrap().id();

    let batcher = TelemetryBatcher::with_seed(fleet, 42);
    let config = PublishLoopConfig::default().with_batch_size(3);
    let mut publish_loop = PublishLoop::new(batcher, MemoryPublisher::new(), config).unwrap();

    publish_loop.run_cycle().await.unwrap();
    publish_loop.run_cycle().await.unwrap();

    let encoder = PayloadEncoder::new();
    let first: Vec<Uuid> = encoder
        .decode(&publish_loop.publisher().published()[0])
        .unwrap()
        .iter()
        .map(|r| r.device_id)
        .collect();
    let second: Vec<Uuid> = encoder
        .decode(&publish_loop.publisher().published()[1])
        .unwrap()
        .iter()
        .map(|r| r.device_id)
        .collect();

    // Rotation continues across published batches.
    assert_eq!(first, vec![a, b, a]);
    assert_eq!(second, vec![b, a, b]);
}

#[tokio::test]
async fn pipeline_readings_stay_in_sensor_ranges() {
    let fleet = DeviceFleet::new(10).unwrap();
    let batcher = TelemetryBatcher::with_seed(fleet, 7);
    let config = PublishLoopConfig::default().with_batch_size(100);
    let mut publish_loop = PublishLoop::new(batcher, MemoryPublisher::new(), config).unwrap();

    for _ in 0..20 {
        publish_loop.run_cycle().await.unwrap();
    }

    let encoder = PayloadEncoder::new();
    for payload in publish_loop.publisher().published() {
        for reading in encoder.decode(payload).unwrap() {
            assert!((MIN_TEMPERATURE..=MAX_TEMPERATURE).contains(&reading.temperature));
            assert!((MIN_HUMIDITY..=MAX_HUMIDITY).contains(&reading.humidity));
        }
    }
}

#[tokio::test]
async fn pipeline_samples_devices_equally_over_many_cycles() {
    let fleet = DeviceFleet::new(10).unwrap();
    let batcher = TelemetryBatcher::with_seed(fleet, 1);
    let config = PublishLoopConfig::default().with_batch_size(100);
    let mut publish_loop = PublishLoop::new(batcher, MemoryPublisher::new(), config).unwrap();

    for _ in 0..5 {
        publish_loop.run_cycle().await.unwrap();
    }

    let encoder = PayloadEncoder::new();
    let mut counts: HashMap<Uuid, usize> = HashMap::new();
    for payload in publish_loop.publisher().published() {
        for reading in encoder.decode(payload).unwrap() {
            *counts.entry(reading.device_id).or_insert(0) += 1;
        }
    }

    // 500 readings over 10 devices: exactly 50 each.
    assert_eq!(counts.len(), 10);
    assert!(counts.values().all(|&c| c == 50));
}

#[tokio::test]
async fn pipeline_reports_compression_over_full_batches() {
    let fleet = DeviceFleet::new(10).unwrap();
    let batcher = TelemetryBatcher::with_seed(fleet, 2);
    let config = PublishLoopConfig::default().with_batch_size(100);
    let mut publish_loop = PublishLoop::new(batcher, MemoryPublisher::new(), config).unwrap();

    publish_loop.run_cycle().await.unwrap();

    let stats = publish_loop.stats();
    assert_eq!(stats.batches_published, 1);
    assert_eq!(stats.readings_published, 100);
    assert!(stats.raw_bytes > stats.compressed_bytes);
    assert!(stats.compression_ratio() > 1.0);

    let report = stats.report();
    assert!(report.contains("Batches published: 1"));
}

#[tokio::test]
async fn pipeline_recovers_from_transient_outage() {
    let mut publisher = MemoryPublisher::new();
    publisher.fail_next(3);

    let fleet = DeviceFleet::new(4).unwrap();
    let batcher = TelemetryBatcher::with_seed(fleet, 9);
    let config = PublishLoopConfig::default()
        .with_batch_size(8)
        .with_publish_interval(Duration::from_millis(1))
        .with_retry(RetryPolicy::exponential(5, Duration::from_millis(1)));
    let mut publish_loop = PublishLoop::new(batcher, publisher, config).unwrap();

    let (tx, rx) = watch::channel(false);
    let handle = tokio::spawn(async move {
        let result = publish_loop.run(rx).await;
        (publish_loop, result)
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    tx.send(true).unwrap();

    let (publish_loop, result) = handle.await.unwrap();
    result.unwrap();

    assert!(publish_loop.publisher().message_count() >= 1);
    assert_eq!(publish_loop.stats().retries, 3);
    assert_eq!(publish_loop.stats().publish_failures, 0);
}
