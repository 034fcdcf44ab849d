mod audit;
mod cli;
mod context;
mod error;
mod filter;
mod fmt;
mod importer;
mod kpi;
mod models;
mod reconciler;
mod schema;
mod session;
mod settings;

use clap::Parser;
use tracing::Level;
use tracing_subscriber::fmt::time::ChronoLocal;

use cli::{Cli, Commands};

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(false)
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Init { force } => cli::init::run(force),
        Commands::Sheets { file } => cli::sheets::run(&file),
        Commands::Schema { source, mapping } => cli::schema::run(&source, &mapping),
        Commands::Summary {
            source,
            mapping,
            analysis,
            series,
            rows,
        } => cli::summary::run(&source, &mapping, &analysis, series, rows),
        Commands::Audit {
            source,
            mapping,
            analysis,
        } => cli::audit::run(&source, &mapping, &analysis),
        Commands::Groups {
            source,
            mapping,
            analysis,
        } => cli::groups::run(&source, &mapping, &analysis),
        Commands::Context {
            source,
            mapping,
            analysis,
            question,
            excerpt_rows,
        } => cli::context::run(&source, &mapping, &analysis, &question, excerpt_rows),
        Commands::Session { source, mapping } => cli::session::run(&source, &mapping),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
