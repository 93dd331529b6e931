//! mtfind: multi-threaded find.
//!
//! Composition root. Loads the content sources and the word list, builds a
//! single payment authority shared by one search executor per worker,
//! registers the executors with the admission scheduler, then lets the
//! synthetic workload submit requests for the configured duration before
//! shutting everything down and printing a summary.

mod commands;
mod format;
mod parse;

use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use mtfind_concurrency::PaymentAuthority;
use mtfind_core::{ContentSource, Error, Fanout, LogSink, MessageSink, Rendezvous, Result};
use mtfind_engine::{AdmissionScheduler, Dictionary, MtfindConfig, Workload, WorkloadStats};
use mtfind_search::SearchExecutor;
use tracing::{error, info};

use commands::build_cli;
use format::{format_summary, MessageTally, RunSummary};
use parse::{matches_to_action, verbosity, CliAction, RunOptions};

fn main() {
    let matches = build_cli().get_matches();

    tracing_subscriber::fmt()
        .with_max_level(verbosity(&matches))
        .with_writer(std::io::stderr)
        .with_thread_names(true)
        .init();

    let action = match matches_to_action(&matches) {
        Ok(action) => action,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    let outcome = match action {
        CliAction::Init(path) => run_init(&path),
        CliAction::Run(options) => run(options),
    };
    if let Err(e) = outcome {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run_init(path: &Path) -> Result<()> {
    if path.exists() {
        eprintln!("{} already exists, leaving it untouched", path.display());
        return Ok(());
    }
    MtfindConfig::write_default_if_missing(path)?;
    eprintln!("Wrote {}", path.display());
    Ok(())
}

fn load_sources(paths: &[PathBuf]) -> Result<Vec<Arc<ContentSource>>> {
    paths
        .iter()
        .map(|path| {
            let source = ContentSource::from_path(path)?;
            info!(source = %source, lines = source.lines().len(), "content source loaded");
            Ok(Arc::new(source))
        })
        .collect()
}

fn load_dictionary(config: &MtfindConfig, sources: &[Arc<ContentSource>]) -> Result<Dictionary> {
    let dictionary = match &config.dictionary {
        Some(path) => Dictionary::load(path)?,
        None => Dictionary::from_sources(sources).ok_or_else(|| {
            Error::invalid_config("content sources hold no searchable words; pass --dictionary")
        })?,
    };
    info!(words = dictionary.len(), "dictionary ready");
    Ok(dictionary)
}

fn run(options: RunOptions) -> Result<()> {
    let config = options.config;
    let sources = load_sources(&config.sources)?;
    let dictionary = Arc::new(load_dictionary(&config, &sources)?);

    let payment = Arc::new(PaymentAuthority::new(config.payment_config()));
    payment.start();

    let scheduler = Arc::new(AdmissionScheduler::new(config.scheduler_config())?);
    let executors: Vec<Arc<SearchExecutor>> = (0..config.effective_workers())
        .map(|_| {
            let executor = SearchExecutor::new(Arc::clone(&payment));
            for source in &sources {
                executor.add_source(Arc::clone(source));
            }
            Arc::new(executor)
        })
        .collect();
    for executor in &executors {
        scheduler.register_executor(executor.clone())?;
    }

    let tally = Arc::new(MessageTally::default());
    let sinks: Vec<Arc<dyn MessageSink>> = vec![Arc::new(LogSink), tally.clone()];
    let workload = Arc::new(Workload::new(
        Arc::clone(&scheduler),
        dictionary,
        Arc::new(Fanout(sinks)),
        config.workload,
        config.premium_credit,
    ));

    scheduler.start()?;

    let stop = Rendezvous::new();
    let producer = {
        let workload = Arc::clone(&workload);
        let stop = stop.clone();
        let seed = config.seed;
        std::thread::Builder::new()
            .name("mtfind-workload".to_string())
            .spawn(move || workload.run_until(&stop, seed))
            .expect("failed to spawn workload thread")
    };

    std::thread::sleep(options.duration);
    stop.signal();
    let workload_stats = producer.join().unwrap_or_else(|_| {
        error!("workload thread panicked");
        WorkloadStats::default()
    });

    // In-flight queries finish (recharges included) before the authority stops
    scheduler.stop();
    payment.shutdown();

    let summary = RunSummary {
        workload: workload_stats,
        scheduler: scheduler.stats(),
        payment: payment.stats(),
        queries_completed: executors.iter().map(|e| e.queries_completed()).collect(),
        tally: &tally,
    };
    print!("{}", format_summary(&summary));
    Ok(())
}
