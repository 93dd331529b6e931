//! Tier sampling and in-tier ordering through real executors

use crate::common::*;
use mtfind::{Credit, Message, MessageRecorder, RequestId, SearchRequest, Tier};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Request ids in the order their first message arrived
fn arrival_order(log: &MessageRecorder) -> Vec<RequestId> {
    let mut order: Vec<RequestId> = Vec::new();
    for message in log.messages() {
        let id = match &message {
            Message::ResultFound { request, .. } | Message::NoResultsFound { request, .. } => {
                request.id()
            }
            _ => continue,
        };
        if order.last() != Some(&id) {
            order.push(id);
        }
    }
    order
}

#[test]
fn test_premium_only_serves_in_timestamp_order() {
    let pipeline = Pipeline::new(&corpus(), 1, 1.0, 15);
    let (client, log) = recorded_client(Tier::Premium, Credit::Unmetered);

    let t1 = Instant::now();
    let t2 = t1 + Duration::from_millis(1);
    let t3 = t2 + Duration::from_millis(1);
    for (id, at) in [(3, t3), (1, t1), (2, t2)] {
        pipeline.scheduler.submit(
            Arc::clone(&client),
            Arc::new(SearchRequest::with_timestamp(id, "hello", at)),
        );
    }

    pipeline.start();
    pipeline.drain(3);
    pipeline.stop();

    assert_eq!(arrival_order(&log), vec![1, 2, 3]);
}

#[test]
fn test_standard_only_leaves_premium_queued() {
    let pipeline = Pipeline::new(&corpus(), 2, 0.0, 15);
    let (premium, premium_log) = recorded_client(Tier::Premium, Credit::Unmetered);
    let (standard, standard_log) = recorded_client(Tier::Standard, Credit::Unmetered);

    pipeline
        .scheduler
        .submit(Arc::clone(&premium), Arc::new(SearchRequest::new(1, "hello")));
    for id in 2..5 {
        pipeline
            .scheduler
            .submit(Arc::clone(&standard), Arc::new(SearchRequest::new(id, "hello")));
    }

    pipeline.start();
    pipeline.drain(3);
    pipeline.stop();

    assert!(premium_log.is_empty());
    assert_eq!(standard_log.count("result_found"), 9);
    let stats = pipeline.scheduler.stats();
    assert_eq!(stats.premium_queue_depth, 1);
    assert_eq!(stats.standard_dispatched, 3);
}

#[test]
fn test_busy_standard_queue_does_not_block_premium() {
    let pipeline = Pipeline::new(&corpus(), 2, 0.5, 15);
    let (premium, premium_log) = recorded_client(Tier::Premium, Credit::Unmetered);
    let (standard, _) = recorded_client(Tier::Standard, Credit::Unmetered);

    for id in 0..200 {
        pipeline
            .scheduler
            .submit(Arc::clone(&standard), Arc::new(SearchRequest::new(id, "o")));
    }
    pipeline.start();
    pipeline
        .scheduler
        .submit(Arc::clone(&premium), Arc::new(SearchRequest::new(1000, "hello")));

    wait_until(|| premium_log.count("result_found") == 3);
    pipeline.stop();
}
