pub mod export;
pub mod init;
pub mod lookup;
pub mod report;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "salespivot",
    about = "Pivot reports and client lookup from sales spreadsheet exports."
)]
pub struct Cli {
    /// Enable debug logging (stderr)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Write an .xlsx file to this path instead of printing
    #[arg(long)]
    pub output: Option<String>,
    /// Write an .xlsx file to the configured export directory
    #[arg(long)]
    pub export: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Pivot the sales file by sales rep.
    Report {
        /// Report kind: products, orders, net
        kind: String,
        /// Path to the XLSX/XLS/ODS/CSV sales export
        file: String,
        #[command(flatten)]
        out: OutputArgs,
    },
    /// List filtered sales lines, optionally searching by client name.
    Lookup {
        /// Path to the XLSX/XLS/ODS/CSV sales export
        file: String,
        /// Case-insensitive client name search
        #[arg(long)]
        search: Option<String>,
        #[command(flatten)]
        out: OutputArgs,
    },
    /// Export every report plus the client lookup to .xlsx files.
    ExportAll {
        /// Path to the XLSX/XLS/ODS/CSV sales export
        file: String,
        /// Output directory (default: configured export directory)
        #[arg(long = "output-dir")]
        output_dir: Option<String>,
    },
    /// Write a default settings file if none exists.
    Init,
    /// Show the active settings.
    Settings,
}
