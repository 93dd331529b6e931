//! Synthetic workload feeding a running pipeline

use crate::common::*;
use mtfind::{Dictionary, MessageRecorder, MtfindConfig, Rendezvous, Workload, WorkloadConfig};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_workload_requests_are_served_after_stop() {
    let sources = corpus();
    let dictionary = Arc::new(Dictionary::from_sources(&sources).unwrap());
    assert!(dictionary.words().iter().any(|w| w == "hello"));

    let pipeline = Pipeline::new(&sources, 2, 0.8, 15);
    let recorder = Arc::new(MessageRecorder::new());
    let workload = Arc::new(Workload::new(
        Arc::clone(&pipeline.scheduler),
        dictionary,
        recorder.clone(),
        WorkloadConfig {
            clients: 3,
            requests_per_client: 2,
            period_ms: 10,
        },
        15,
    ));

    pipeline.start();
    let stop = Rendezvous::new();
    let producer = {
        let workload = Arc::clone(&workload);
        let stop = stop.clone();
        std::thread::spawn(move || workload.run_until(&stop, Some(3)))
    };
    std::thread::sleep(Duration::from_millis(60));
    stop.signal();
    let stats = producer.join().unwrap();

    pipeline.drain(stats.requests);
    pipeline.stop();

    assert!(stats.batches >= 1);
    assert_eq!(stats.requests, stats.batches * 6);
    // Every generated word occurs somewhere, so every request found something
    assert!(recorder.count("result_found") as u64 >= stats.requests);
    assert_eq!(recorder.count("admission_denied"), 0);
}

#[test]
fn test_config_file_drives_pipeline_settings() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("mtfind.toml");
    std::fs::write(
        &path,
        "premium_bias = 1.0\nrecharge_amount = 2\nseed = 4\n[workload]\nclients = 1\n",
    )
    .unwrap();

    let config = MtfindConfig::from_file(&path).unwrap();
    assert_eq!(config.scheduler_config().premium_bias, 1.0);
    assert_eq!(config.payment_config().recharge_amount, 2);
    assert_eq!(config.workload.clients, 1);
    assert_eq!(config.workload.requests_per_client, 4);
}
