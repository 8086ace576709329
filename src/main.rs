mod cli;
mod error;
mod filter;
mod fmt;
mod importer;
mod logger;
mod models;
mod reports;
mod settings;
mod xlsx;

use clap::Parser;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    logger::init_logger(cli.verbose);

    let result = match cli.command {
        Commands::Report { kind, file, out } => cli::report::run(&kind, &file, out),
        Commands::Lookup { file, search, out } => cli::lookup::run(&file, search.as_deref(), out),
        Commands::ExportAll { file, output_dir } => cli::export::all(&file, output_dir),
        Commands::Init => cli::init::run(),
        Commands::Settings => cli::init::show(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(if e.is_bad_input() { 2 } else { 1 });
    }
}
