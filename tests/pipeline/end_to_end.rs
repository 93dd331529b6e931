//! Whole-pipeline behaviour with mixed clients

use crate::common::*;
use mtfind::{Credit, Message, SearchRequest, Tier};
use std::collections::HashMap;
use std::sync::Arc;

#[test]
fn test_mixed_clients_all_served() {
    let pipeline = Pipeline::new(&corpus(), 4, 0.8, 15);
    let (premium, premium_log) = recorded_client(Tier::Premium, Credit::Metered(15));
    let (standard, standard_log) = recorded_client(Tier::Standard, Credit::Unmetered);

    let queries = ["hello", "world", "test", "says"];
    let mut id = 0;
    for query in queries {
        for client in [&premium, &standard] {
            id += 1;
            pipeline
                .scheduler
                .submit(Arc::clone(client), Arc::new(SearchRequest::new(id, query)));
        }
    }

    pipeline.start();
    pipeline.drain(8);
    pipeline.stop();

    // hello: 3, world: 3, test: 3, says: 3 occurrences across the corpus
    assert_eq!(standard_log.count("result_found"), 12);
    assert_eq!(premium_log.count("result_found"), 12);
    // 12 units spent from 15: no recharge needed
    assert_eq!(premium.credit(), Credit::Metered(3));
    assert_eq!(premium_log.count("credit_exhausted"), 0);
    // Sources without a match: hello→source3, world→source3,
    // test→source2, says→source3
    assert_eq!(standard_log.count("no_results_found"), 4);
}

#[test]
fn test_final_flag_at_most_once_per_request_and_source() {
    let pipeline = Pipeline::new(&corpus(), 2, 0.5, 15);
    let (client, log) = recorded_client(Tier::Standard, Credit::Unmetered);
    for (id, query) in ["hello", "o", "is", "test"].into_iter().enumerate() {
        pipeline
            .scheduler
            .submit(Arc::clone(&client), Arc::new(SearchRequest::new(id as u64, query)));
    }

    pipeline.start();
    pipeline.drain(4);
    pipeline.stop();

    let mut finals: HashMap<(u64, String), usize> = HashMap::new();
    let mut totals: HashMap<(u64, String), usize> = HashMap::new();
    for message in log.messages() {
        if let Message::ResultFound { request, result } = message {
            let key = (request.id(), result.source.name().to_string());
            *totals.entry(key.clone()).or_default() += 1;
            if result.is_final {
                *finals.entry(key).or_default() += 1;
            }
        }
    }
    // Every (request, source) pair with results has exactly one final
    assert!(!totals.is_empty());
    for key in totals.keys() {
        assert_eq!(finals.get(key), Some(&1), "pair {:?}", key);
    }
}

#[test]
fn test_source_added_between_queries_is_seen_by_later_ones() {
    let pipeline = Pipeline::new(&corpus()[..1], 1, 1.0, 15);
    let (client, log) = recorded_client(Tier::Premium, Credit::Unmetered);

    pipeline.start();
    pipeline
        .scheduler
        .submit(Arc::clone(&client), Arc::new(SearchRequest::new(1, "dave")));
    pipeline.drain(1);
    assert_eq!(log.count("result_found"), 0);
    assert_eq!(log.count("no_results_found"), 1);

    pipeline.executors[0].add_source(Arc::clone(&corpus()[1]));
    pipeline
        .scheduler
        .submit(Arc::clone(&client), Arc::new(SearchRequest::new(2, "dave")));
    pipeline.drain(2);
    pipeline.stop();

    assert_eq!(log.count("result_found"), 1);
}
