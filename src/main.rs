use clap::{Parser, ValueEnum};
use logic_layers::{RowFilter, SimConfig, Simulator};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Which table to print
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TableKind {
    Logic,
    Ones,
    Zeros,
    UniformOnes,
    UniformZeros,
}

impl From<TableKind> for RowFilter {
    fn from(kind: TableKind) -> Self {
        match kind {
            TableKind::Logic => RowFilter::All,
            TableKind::Ones => RowFilter::Ones,
            TableKind::Zeros => RowFilter::Zeros,
            TableKind::UniformOnes => RowFilter::UniformOnes,
            TableKind::UniformZeros => RowFilter::UniformZeros,
        }
    }
}

/// Simulate a layered combinational circuit and print its truth tables
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Circuit description: one layer per line, comma separated tokens
    file: PathBuf,

    /// Tables to print, in order
    #[arg(short, long = "table", value_enum, default_values_t = [TableKind::Logic])]
    tables: Vec<TableKind>,

    /// Show intermediate signals
    #[arg(long)]
    verbose: bool,

    /// Evaluate without the per-gate caches
    #[arg(long)]
    no_memo: bool,

    /// Enumerate rows on a single thread
    #[arg(long)]
    sequential: bool,

    /// Refuse to enumerate circuits with more inputs than this
    #[arg(long, default_value_t = SimConfig::default().max_inputs)]
    max_inputs: usize,

    /// Print the complete table as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Log build and enumeration progress
    #[arg(short = 'v', long = "log")]
    log: bool,
}

fn run(args: &Args) -> logic_layers::Result<()> {
    let config = SimConfig::default()
        .with_verbose(args.verbose)
        .with_memoize(!args.no_memo)
        .with_parallel(!args.sequential)
        .with_max_inputs(args.max_inputs);
    let mut sim = Simulator::load(&args.file, config)?;

    if args.json {
        return print_json(&mut sim, args.verbose);
    }

    for kind in &args.tables {
        print!("{}", sim.render((*kind).into(), args.verbose)?);
    }
    Ok(())
}

#[cfg(feature = "serde")]
fn print_json(sim: &mut Simulator, verbose: bool) -> logic_layers::Result<()> {
    let table = sim.table(verbose)?;
    let stdout = std::io::stdout();
    table
        .to_json(stdout.lock())
        .map_err(|e| logic_layers::Error::Io(e.into()))
}

#[cfg(not(feature = "serde"))]
fn print_json(_sim: &mut Simulator, _verbose: bool) -> logic_layers::Result<()> {
    Err(logic_layers::Error::Io(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "JSON output needs the `serde` feature",
    )))
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = if args.log { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            debug!(error = ?e, "run failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
