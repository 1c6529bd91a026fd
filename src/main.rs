use clap::Parser;
use log::{error, LevelFilter};
use snafu::ErrorCompat;

mod args;
mod report;

use crate::args::Args;

fn main() {
    let args = Args::parse();

    let mut builder = env_logger::Builder::from_default_env();
    if args.verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.init();

    if let Err(e) = report::run_cli(&args) {
        error!("Error occured {:?}", e);
        for (idx, cause) in e.iter_chain().enumerate() {
            if idx == 0 {
                eprintln!("Error: {}", cause);
            } else {
                eprintln!("  caused by: {}", cause);
            }
        }
        std::process::exit(1);
    }
}
