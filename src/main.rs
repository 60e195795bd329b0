//! The main entry point for the `litrep` command-line application.
//!
//! Parses arguments, runs the replacement and maps the outcome to an exit
//! status: 0 with `Success` on stdout, or 1 with the error on stderr.

use litrep::cli;
use litrep::config::RunConfig;
use litrep::resolver;
use std::process;

fn main() {
    let args = cli::parse_args();
    litrep::init_logging(args.verbose);
    let quiet = args.quiet;

    let stats = match RunConfig::from_args(args).and_then(|config| resolver::run_replace(&config)) {
        Ok(stats) => stats,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    if !quiet {
        println!("\n{}", "-".repeat(50));
        println!("Files visited : {}", stats.files_visited);
        println!("Files changed : {}", stats.files_changed);
        println!("Replacements  : {}", stats.replacements);
    }
    println!("Success");
}
