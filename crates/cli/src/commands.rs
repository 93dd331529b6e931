//! Clap command tree definition.

use clap::{value_parser, Arg, ArgAction, Command};

/// Build the complete CLI command tree.
pub fn build_cli() -> Command {
    Command::new("mtfind")
        .about("Multi-threaded find: tiered, credit-metered parallel text search")
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("Config file (default: mtfind.toml if present)")
                .value_parser(value_parser!(std::path::PathBuf))
                .global(true),
        )
        .arg(
            Arg::new("source")
                .long("source")
                .short('s')
                .help("Text file to search; may be repeated")
                .value_parser(value_parser!(std::path::PathBuf))
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("dictionary")
                .long("dictionary")
                .short('d')
                .help("Word list for generated queries (default: words from the sources)")
                .value_parser(value_parser!(std::path::PathBuf)),
        )
        .arg(
            Arg::new("duration-secs")
                .long("duration-secs")
                .help("How long to produce requests before shutting down")
                .value_parser(value_parser!(u64))
                .default_value("10"),
        )
        .arg(
            Arg::new("workers")
                .long("workers")
                .short('w')
                .help("Search executors, one dispatch worker each (0 = one per CPU)")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("premium-bias")
                .long("premium-bias")
                .help("Probability of serving the Premium queue, within [0, 1]")
                .value_parser(value_parser!(f64)),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .help("Seed for tier sampling and generated requests")
                .value_parser(value_parser!(u64)),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Increase log verbosity (-v info, -vv debug, -vvv trace)")
                .action(ArgAction::Count)
                .global(true),
        )
        .subcommand(
            Command::new("init").about("Write a default mtfind.toml if none exists"),
        )
}
