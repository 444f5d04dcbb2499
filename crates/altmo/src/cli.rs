use std::path::PathBuf;

use batches::{pages::DEFAULT_PAGE_SIZE, Output, Parallel};
use clap::{Args, Parser, Subcommand, ValueEnum};
use model::Costing;

#[derive(Debug, Parser)]
#[command(name = "altmo", version, about = "Accessibility metrics for urban study areas")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Calculate network distances between residences and amenities.
    Network(NetworkArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    Pedestrian,
    Bicycle,
}

impl From<Mode> for Costing {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Pedestrian => Costing::Pedestrian,
            Mode::Bicycle => Costing::Bicycle,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Parallelism {
    /// 5 concurrent requests, 5 writers
    Low,
    /// 40 concurrent requests, 20 writers
    High,
}

impl From<Parallelism> for Parallel {
    fn from(parallelism: Parallelism) -> Self {
        match parallelism {
            Parallelism::Low => Parallel::Low,
            Parallelism::High => Parallel::High,
        }
    }
}

#[derive(Debug, Args)]
pub struct NetworkArgs {
    /// Name of the study area.
    pub study_area: String,

    #[arg(short, long, value_enum, default_value_t = Mode::Pedestrian)]
    pub mode: Mode,

    /// Only measure amenities of this category.
    #[arg(short, long)]
    pub category: Option<String>,

    /// Only measure amenities with this name.
    #[arg(short, long)]
    pub name: Option<String>,

    /// Where to write the distances: db, csv or stdout.
    #[arg(short, long, default_value = "db")]
    pub out: Output,

    /// Base name of the CSV files, one per page prefixed with its number.
    #[arg(short, long, required_if_eq("out", "csv"))]
    pub file_name: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value_t = Parallelism::Low)]
    pub parallel: Parallelism,

    /// Rows read from the database per page.
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: u64,
}
