use std::env;
use std::path::Path;

use anyhow::Result;

use tracetools::datafile::DataFile;
use tracetools::plot::{plot_traces, print_page, PLOT_FILE};

const HELP: &str = "usage: printtrace [trace file]";

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let Some(input) = args.get(1) else {
        eprintln!("{}", HELP);
        return Ok(());
    };

    let df = DataFile::open(input)?;
    let out = Path::new(PLOT_FILE);
    plot_traces(out, &df)?;
    print_page(out)?;
    Ok(())
}
