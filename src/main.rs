use clap::Parser;
use dmxctrl::cli::{Cli, Commands};
use dmxctrl::output::Printer;
use miette::Result;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let printer = Printer::new();

    match cli.command {
        Commands::Check(args) => dmxctrl::cli::check::run(args, &printer)?,
        Commands::Dump(args) => dmxctrl::cli::dump::run(args, &printer)?,
        Commands::Frame(args) => dmxctrl::cli::frame::run(args, &printer)?,
        Commands::Colours(args) => dmxctrl::cli::colours::run(args, &printer)?,
        Commands::Completions(args) => dmxctrl::cli::completions::run(args)?,
    }

    Ok(())
}

/// Logs go to stderr; RUST_LOG takes precedence over -v.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
