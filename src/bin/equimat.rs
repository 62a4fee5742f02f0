use linrep::prelude::*;

use clap::{Arg, ArgMatches, Command};
use std::fs::File;
use tracing::{debug, info};
use tracing_subscriber::{filter, prelude::*};

fn cli() -> clap::Command {
    Command::new("equimat")
        .about(
            "builds the occurrence-equalizer representation of a numeration system: \
             reads occ_<ns>.txt, subtracts the i/j-swapped counting automaton from \
             the original and writes equi<ns>_mat.txt",
        )
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbosity")
                .num_args(0..=1)
                .require_equals(true)
                .value_parser(["info", "debug", "trace"])
                .default_missing_value("info"),
        )
        .arg(Arg::new("ns").required(true).help("numeration system name"))
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

    let ns = matches.get_one::<String>("ns").expect("required");
    let input = format!("occ_{ns}.txt");
    let output = format!("equi{ns}_mat.txt");

    debug!("loading {input}");
    let start = std::time::Instant::now();
    let mut mapper = LabelMapper::new();
    let dfa = match walnut::read_file(&input, &mut mapper) {
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
    let (counted, mut proj_map) = match dfa_count(&dfa, &mapper, &[0, 1, 2, 3, 4]) {
        Ok(res) => res,
        Err(e) => {
            eprintln!("{input}: {e}");
            std::process::exit(1);
        }
    };
    info!(
        "counting automaton has {} states ({}ms)",
        counted.state_count(),
        start.elapsed().as_millis()
    );

    let start = std::time::Instant::now();
    let s1 = reduce(&counted);
    info!(
        "reduced to {} states in {}ms",
        s1.state_count(),
        start.elapsed().as_millis()
    );

    // the occurrence predicate is symmetric in its two position variables, so
    // swapping them and subtracting yields the equalizer sequence
    let start = std::time::Instant::now();
    let swapped = remap_labels(&s1, &mut proj_map, |t| vec![t[0], t[2], t[1], t[3], t[4]]);
    let s2 = opposite(&swapped);
    let difference = sum(&s1, &s2);
    info!(
        "difference automaton has {} states ({}ms)",
        difference.state_count(),
        start.elapsed().as_millis()
    );

    let start = std::time::Instant::now();
    let red = reduce(&difference);
    info!(
        "reduced to {} states in {}ms",
        red.state_count(),
        start.elapsed().as_millis()
    );

    let rep = LinearRep::from_wfa(&red);
    let mut out = File::create(&output).expect("cannot create output file");
    let stats = rep
        .write(&proj_map, &mut out, true)
        .expect("cannot write output file");
    info!("weight range: min {} max {}", stats.min, stats.max);
    info!("wrote {output}");
}
