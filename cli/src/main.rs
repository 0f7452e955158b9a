//! Command-line frontend for simulating cellular automata on a torus.

#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};
use simple_logger::SimpleLogger;
use std::io::{self, BufWriter, Write};

use ndtorus_core::prelude::*;

mod args;
mod presets;
mod settings;

use args::Args;
use settings::Settings;

fn main() {
    let args = Args::parse();
    if let Err(e) = run(&args) {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    SimpleLogger::new()
        .with_level(args.log_level())
        .init()
        .context("unable to initialize logger")?;
    info!("Starting ndtorus v{} ...", env!("CARGO_PKG_VERSION"));

    let files = args
        .file
        .iter()
        .map(|path| {
            debug!("Loading settings from {}", path.display());
            Settings::load(path)
        })
        .collect::<Result<Vec<_>>>()?;
    let config = settings::layer(&args.preset, files, args.settings())?.into_config()?;
    let sim = Simulation::new(config).context("unable to start simulation")?;
    info!(
        "Simulating {} on {} cells with {} worker(s)",
        sim.rule(),
        sim.lattice().len(),
        sim.workers(),
    );

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for state in sim {
        let state = state?;
        match writeln!(out, "{}", state).and_then(|()| out.flush()) {
            Ok(()) => (),
            // The reader hung up, e.g. `ndtorus ... | head`.
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                debug!("Output closed");
                return Ok(());
            }
            Err(e) => return Err(e).context("unable to write state"),
        }
    }
    Ok(())
}
