use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cosmic_orders")]
#[command(about = "Concurrent order and ingredient pipeline simulator")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full fan-out pipeline over a random task batch
    Run {
        /// Number of worker pool execution units
        #[arg(short, long, default_value = "10")]
        pool_size: usize,

        /// Number of fan-out output streams
        #[arg(short, long, default_value = "5")]
        fan_out: usize,

        /// Number of AddOrder tasks (half as many RemoveOrder tasks are generated)
        #[arg(short, long, default_value = "5")]
        orders: usize,

        /// Number of InsertIngredient tasks (and as many SearchIngredient tasks)
        #[arg(short, long, default_value = "6")]
        ingredients: usize,

        /// Suppress progress output
        #[arg(short, long)]
        quiet: bool,

        /// Write the final report as JSON to this path
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Submit order and ingredient jobs directly to two worker pools
    PoolSim {
        /// Number of order jobs
        #[arg(short, long, default_value = "5")]
        orders: usize,

        /// Number of ingredient jobs
        #[arg(short, long, default_value = "5")]
        ingredients: usize,

        /// Number of execution units per pool
        #[arg(short, long, default_value = "10")]
        pool_size: usize,
    },

    /// Exercise the non-fatal error paths (bad index, duplicate ingredient, late task)
    EdgeCases,
}
