use linrep::prelude::*;

use clap::{Arg, ArgAction, ArgMatches, Command};
use std::fs::File;
use tracing::{debug, info};
use tracing_subscriber::{filter, prelude::*};

fn cli() -> clap::Command {
    Command::new("dfa2mat")
        .about("converts a Walnut DFA into the linear representation of its counting sequence")
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbosity")
                .num_args(0..=1)
                .require_equals(true)
                .value_parser(["info", "debug", "trace"])
                .default_missing_value("info"),
        )
        .arg(
            Arg::new("vars")
                .long("vars")
                .required(true)
                .help("comma-separated label coordinates to project onto, e.g. 1,2"),
        )
        .arg(
            Arg::new("no-check")
                .long("no-check")
                .action(ArgAction::SetTrue)
                .help("skip the integer-only check on exported weights"),
        )
        .arg(Arg::new("input").required(true).help("Walnut automaton file"))
        .arg(Arg::new("output").required(true).help("matrix output file"))
}

fn setup_logging(matches: &ArgMatches) {
    let level = match matches
        .try_get_one::<String>("verbosity")
        .ok()
        .flatten()
        .map(|m| m.as_str())
    {
        Some("trace") => filter::LevelFilter::TRACE,
        Some("debug") => filter::LevelFilter::DEBUG,
        _ => filter::LevelFilter::INFO,
    };

    let stdout_log = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    tracing_subscriber::registry()
        .with(stdout_log.with_filter(level))
        .init();
}

pub fn main() {
    let matches = cli().get_matches();
    setup_logging(&matches);

    let input = matches.get_one::<String>("input").expect("required");
    let output = matches.get_one::<String>("output").expect("required");
    let vars: Vec<usize> = matches
        .get_one::<String>("vars")
        .expect("required")
        .split(',')
        .map(|t| t.trim().parse().expect("--vars takes numeric coordinates"))
        .collect();
    let check_int = !matches.get_flag("no-check");

    debug!("loading {input}");
    let start = std::time::Instant::now();
    let mut mapper = LabelMapper::new();
    let dfa = match walnut::read_file(input, &mut mapper) {
        Ok(dfa) => dfa,
        Err(e) => {
            eprintln!("{input}: {e}");
            std::process::exit(1);
        }
    };
    info!(
        "loaded {} states, {} labels in {}ms",
        dfa.state_count(),
        mapper.len(),
        start.elapsed().as_millis()
    );

    let start = std::time::Instant::now();
    let (counted, proj_map) = match dfa_count(&dfa, &mapper, &vars) {
        Ok(res) => res,
        Err(e) => {
            eprintln!("{input}: {e}");
            std::process::exit(1);
        }
    };
    info!(
        "counting automaton has {} states, {} transitions ({}ms)",
        counted.state_count(),
        counted.transition_count(),
        start.elapsed().as_millis()
    );

    let start = std::time::Instant::now();
    let reduced = reduce(&counted);
    info!(
        "reduced to {} states in {}ms",
        reduced.state_count(),
        start.elapsed().as_millis()
    );

    let rep = LinearRep::from_wfa(&reduced);
    let mut out = File::create(output).expect("cannot create output file");
    let stats = rep
        .write(&proj_map, &mut out, check_int)
        .expect("cannot write output file");
    info!("weight range: min {} max {}", stats.min, stats.max);
}
