use std::path::PathBuf;

/// Replay boundary edits against reference geography
#[derive(clap::Parser, Debug)]
#[command(name = "openmander-edit", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Build a plan from an edit script and print its district feed
    Replay(ReplayArgs),
}

#[derive(clap::Args, Debug)]
pub struct ReplayArgs {
    /// Unit geometry as a GeoJSON FeatureCollection (id, level, name properties)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub units: PathBuf,

    /// Base unit characteristics, one `unit_id` column plus one column per subject
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub stats: PathBuf,

    /// Edit script: levels, district names and the edits to apply in order
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub script: PathBuf,

    /// Engine configuration (JSON), defaults apply when absent
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Subject reported in the feed
    #[arg(short, long, default_value = "POPTOT")]
    pub subject: String,

    /// Output feed file, defaults to stdout
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,
}
