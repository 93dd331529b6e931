//! Suspend/resume and denial as seen by clients of a running pipeline

use crate::common::*;
use mtfind::{
    ContentSource, Credit, Message, MessageRecorder, SearchExecutor, SearchRequest, Tier,
};
use std::collections::HashMap;
use std::sync::Arc;

/// `(source name, line, column)` of every result, grouped by source in
/// arrival order
fn results_by_source(log: &MessageRecorder) -> HashMap<String, Vec<(usize, usize)>> {
    let mut grouped: HashMap<String, Vec<(usize, usize)>> = HashMap::new();
    for result in log.results() {
        grouped
            .entry(result.source.name().to_string())
            .or_default()
            .push((result.line, result.column));
    }
    grouped
}

#[test]
fn test_one_credit_two_matches() {
    let source = Arc::new(ContentSource::from_text("s", "the cat sat\nthe cat ran"));
    let pipeline = Pipeline::new(&[source], 1, 1.0, 15);
    let (client, log) = recorded_client(Tier::Premium, Credit::Metered(1));

    pipeline
        .scheduler
        .submit(Arc::clone(&client), Arc::new(SearchRequest::new(1, "cat")));
    pipeline.start();
    pipeline.drain(1);
    pipeline.stop();

    let kinds: Vec<&str> = log.messages().iter().map(Message::kind).collect();
    assert_eq!(
        kinds,
        vec!["result_found", "credit_exhausted", "credit_recharged", "result_found"]
    );
    let results = log.results();
    assert_eq!((results[0].line, results[0].column, results[0].is_final), (1, 5, false));
    assert_eq!((results[1].line, results[1].column, results[1].is_final), (2, 5, true));
    assert_eq!(client.credit(), Credit::Metered(14));
}

#[test]
fn test_recharged_run_matches_unlimited_run() {
    let sources = corpus();
    let queries = ["hello", "o", "s", "test"];

    // Reference: unlimited credit, executor called directly
    let reference = SearchExecutor::new(Arc::new(mtfind::PaymentAuthority::default()));
    for source in &sources {
        reference.add_source(Arc::clone(source));
    }

    // Several metered clients at once, each recharged one unit at a time
    let pipeline = Pipeline::new(&sources, 3, 1.0, 1);
    let mut runs = Vec::new();
    for (id, query) in queries.into_iter().enumerate() {
        let (unlimited, unlimited_log) = recorded_client(Tier::Premium, Credit::Unmetered);
        reference.execute(&unlimited, &Arc::new(SearchRequest::new(id as u64, query)));

        let (metered, metered_log) = recorded_client(Tier::Premium, Credit::Metered(0));
        pipeline
            .scheduler
            .submit(metered, Arc::new(SearchRequest::new(id as u64, query)));
        runs.push((unlimited_log, metered_log));
    }

    pipeline.start();
    pipeline.drain(queries.len() as u64);
    pipeline.stop();

    for (unlimited_log, metered_log) in &runs {
        assert_eq!(results_by_source(metered_log), results_by_source(unlimited_log));
        assert_eq!(
            metered_log.count("credit_exhausted"),
            metered_log.count("credit_recharged")
        );
    }
    // Many clients racing for recharges, one transaction at a time
    let stats = pipeline.payment.stats();
    assert!(stats.recharges_completed > 0);
    assert_eq!(stats.peak_in_progress, 1);
}

#[test]
fn test_metered_standard_client_denied_once_per_request() {
    let pipeline = Pipeline::new(&corpus(), 1, 0.0, 15);
    let (client, log) = recorded_client(Tier::Standard, Credit::Metered(0));

    for id in 1..=2 {
        pipeline
            .scheduler
            .submit(Arc::clone(&client), Arc::new(SearchRequest::new(id, "hello")));
    }
    pipeline.start();
    pipeline.drain(2);
    pipeline.stop();

    assert_eq!(log.count("admission_denied"), 2);
    assert_eq!(log.count("result_found"), 0);
    // source3 has no "hello" and reports so only if the request survived
    assert_eq!(log.len(), 2 + log.count("no_results_found"));
    assert_eq!(pipeline.payment.stats().recharges_completed, 0);
}
