mod cli;

use std::error::Error;

use clap::Parser;
use itertools::Itertools;
use log::info;

use inlinect::config::read_config_file;
use inlinect::io::{read_record, write_record, GeometryRecord};
use inlinect::utils::{group_digits, timing::Progress};

use cli::{Cli, Command};

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Cli::parse();
    match args.command {
        Command::Geometry { config, out } => geometry(&config, out.as_deref()),
        Command::Inspect  { record, rows } => inspect(&record, rows),
    }
}

fn geometry(config: &std::path::Path, out: Option<&std::path::Path>) -> Result<(), Box<dyn Error>> {
    let mut progress = Progress::new();

    progress.start(&format!("Building geometry from {}", config.display()));
    let config = read_config_file(config)?;
    let scan = config.scanning_object()?;
    progress.done();

    let projection = scan.projection_geometry();
    println!("{} geometry: {} instants, {} projections after aggregation (S = {})",
             projection.kind(),
             group_digits(projection.instants()),
             group_digits(scan.desired_projections()),
             scan.oversampling());
    println!("sinogram {:?} -> {:?}",
             projection.sinogram_shape(),
             scan.reduced_geometry()?.sinogram_shape());
    println!("volume {:?}, {}", scan.volume_geometry().array_shape(), scan.algorithm().name());

    if let Some(out) = out {
        progress.start("Exporting geometry record");
        write_record(out, &GeometryRecord::new(&scan)?)?;
        progress.done_with_message(&format!("wrote {}", out.display()));
        info!("wrote geometry record {}", out.display());
    }
    Ok(())
}

fn inspect(path: &std::path::Path, rows: usize) -> Result<(), Box<dyn Error>> {
    let record = read_record(path)?;
    println!("{record}");
    let width = record.components.max(1) as usize;
    for row in record.blurred.chunks(width).take(rows) {
        println!("  {}", row.iter().map(|x| format!("{x:9.3}")).join(" "));
    }
    Ok(())
}
