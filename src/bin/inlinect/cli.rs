use std::path::PathBuf;

/// Command line interface for `inlinect` executable
#[derive(clap::Parser, Debug, Clone)]
#[clap(
    name = "inlinect",
    about = "Build inline/continuous CT scan geometries and export them",
)]
pub (super) struct Cli {
    #[clap(subcommand)]
    pub (super) command: Command,
}

#[derive(clap::Subcommand, Debug, Clone)]
pub (super) enum Command {

    /// Build the geometry described by a TOML config, optionally exporting it
    Geometry {
        /// TOML scan configuration
        config: PathBuf,

        /// Geometry record to write
        #[clap(short, long)]
        out: Option<PathBuf>,
    },

    /// Summarize a geometry record
    Inspect {
        /// Geometry record to read
        record: PathBuf,

        /// Number of rows of the aggregated pose table to print
        #[clap(short = 'n', long, default_value = "5")]
        rows: usize,
    },
}
