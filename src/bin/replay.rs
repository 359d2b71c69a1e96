use std::fs::File;
use std::path::PathBuf;

use clap::Parser;
use memfo::io_utils::CliError;
use memfo::{
    read_samples_csv, ColumnSelector, PanCommand, ReportBuilder, ReportInterval, SampleStore,
    StoreLimits, Units, ValueFormat, MAX_SAMPLES, MAX_VALUE, RETENTION_SECONDS,
};

/// Feed recorded samples through the store and selector and print the
/// resulting columns.
#[derive(Parser)]
#[command(name = "memfo-replay")]
struct Args {
    /// CSV with a time_key column followed by counters
    input: PathBuf,
    /// Column spacing: "var" or a fixed interval such as 5, 30s, 5m
    #[arg(short = 'r', long, default_value = "var")]
    report_interval: ReportInterval,
    /// Number of columns, live column included
    #[arg(long, default_value_t = 8)]
    columns: usize,
    /// Pan keys applied before the final selection, e.g. "<<{"
    #[arg(long, default_value = "")]
    pan: String,
    /// Memory units for the printed report
    #[arg(short, long, default_value = "MiB")]
    units: Units,
    /// Show deltas between columns
    #[arg(long)]
    deltas: bool,
    /// Samples kept before compressing
    #[arg(long, default_value_t = MAX_SAMPLES)]
    max_samples: usize,
    /// History window in seconds
    #[arg(long, default_value_t = RETENTION_SECONDS)]
    retention: u64,
    /// Only print the selected time keys
    #[arg(long)]
    keys: bool,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp_millis()
        .init();
    let args = Args::parse();

    if args.input.extension().and_then(|e| e.to_str()) != Some("csv") {
        return Err(CliError::extension(&args.input, "csv").into());
    }
    let pans = args
        .pan
        .chars()
        .map(|c| {
            PanCommand::from_key(c)
                .ok_or_else(|| CliError::new(format!("unknown pan key '{c}'; use [ ] < > {{ }}")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let file = File::open(&args.input).map_err(|e| CliError::io("opening input", &args.input, e))?;
    let samples = read_samples_csv(file).map_err(|e| CliError::memfo("reading samples", e))?;

    let limits = StoreLimits {
        max_samples: args.max_samples,
        retention_secs: args.retention,
    };
    let mut store = SampleStore::with_limits(1, limits);
    for sample in samples {
        store.append(sample);
    }

    let budget = args.columns.max(1);
    let mut selector = ColumnSelector::new();
    let columns = match args.report_interval.seconds() {
        None => selector.select_uniform(&store, budget),
        Some(secs) => {
            selector.select_fixed_interval(&store, secs, budget, true);
            for command in pans {
                selector.queue_pan(command);
            }
            selector.select_fixed_interval(&store, secs, budget, false)
        }
    };

    if args.keys {
        let keys: Vec<String> = columns.iter().map(|s| s.time_key.to_string()).collect();
        println!("{}", keys.join(" "));
        return Ok(());
    }

    println!(
        "# {} samples, quantum {}s, stage {}",
        store.len(),
        store.quantum(),
        store.stage()
    );
    let format = ValueFormat::new(args.units, MAX_VALUE);
    let report = ReportBuilder::new().build(&columns, &format, args.deltas);
    println!("{}", report.time.text());
    for row in &report.rows {
        println!("{}", row.line());
    }
    Ok(())
}
