use std::fs::OpenOptions;
use std::path::PathBuf;

use clap::Parser;
use log::warn;
use memfo::io_utils::CliError;
use memfo::{
    clamp_poll_secs, config_path, open_source, tui, Dashboard, FieldConfig, MeminfoSource,
    MetricSource, MonotonicClock, ReportInterval, Settings, SourceKind, Units,
};

/// Live /proc/meminfo report with history columns.
#[derive(Parser)]
#[command(name = "memfo", version)]
struct Args {
    /// Memory units: KiB, MB, MiB, GB, GiB or human
    #[arg(short, long, default_value = "MiB")]
    units: Units,
    /// Field layout name, stored as <config dir>/memfo/<NAME>.json
    #[arg(short, long, default_value = "memfo")]
    config: String,
    /// Seconds between polls, clamped to 0.5..=3600
    #[arg(short = 'i', long = "interval-sec", default_value_t = 1.0)]
    interval_sec: f64,
    /// Column spacing: "var" or a fixed interval such as 5, 30s, 5m, 1h
    #[arg(short = 'r', long, default_value = "var")]
    report_interval: ReportInterval,
    /// Show the "VmallocTotal" row (which is mostly useless)
    #[arg(long)]
    vmalloc_total: bool,
    /// Show lines with all zeros
    #[arg(short, long)]
    zeros: bool,
    /// Start with deltas between columns
    #[arg(long)]
    deltas: bool,
    /// Print the data once rather than display it
    #[arg(short, long)]
    dump: bool,
    /// Where counters come from
    #[arg(long, value_enum, default_value_t = SourceKind::Meminfo)]
    source: SourceKind,
    /// Read this meminfo-format file instead of /proc/meminfo
    #[arg(long)]
    meminfo: Option<PathBuf>,
    /// Directory for CSV dumps written with the D key
    #[arg(long, default_value = ".")]
    dump_dir: PathBuf,
    /// Append log records to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_logging(&args)?;

    let poll_secs = clamp_poll_secs(args.interval_sec);
    if poll_secs != args.interval_sec {
        warn!("poll interval {}s clamped to {}s", args.interval_sec, poll_secs);
    }
    let settings = Settings {
        units: args.units,
        report_interval: args.report_interval,
        deltas: args.deltas,
        zeros: args.zeros,
        vmalloc_total: args.vmalloc_total,
        poll_secs,
    };
    let source: Box<dyn MetricSource> = match &args.meminfo {
        Some(path) => Box::new(MeminfoSource::with_clock(
            path,
            args.vmalloc_total,
            MonotonicClock::start(),
        )),
        None => open_source(args.source, args.vmalloc_total),
    };

    if args.dump {
        let width = crossterm::terminal::size()
            .map(|(w, _)| w as usize)
            .unwrap_or(80);
        let mut dashboard = Dashboard::new(source, settings, FieldConfig::default(), None);
        dashboard
            .tick(width)
            .map_err(|e| CliError::memfo("reading memory counters", e))?;
        println!("\n{}\n", dashboard.dump_lines().join("\n"));
        return Ok(());
    }

    let path = config_path(&args.config);
    let fields = FieldConfig::load_or_create(&path);
    let mut dashboard =
        Dashboard::new(source, settings, fields, Some(path)).with_dump_dir(args.dump_dir);
    tui::run(&mut dashboard).map_err(|e| CliError::memfo("running dashboard", e))?;
    Ok(())
}

/// Logs go to stderr in dump mode and to `--log-file` otherwise; the full
/// screen report leaves no room for them.
fn init_logging(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let default = if args.dump || args.log_file.is_some() {
        "warn"
    } else {
        "off"
    };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default));
    builder.format_timestamp_millis();
    if let Some(path) = &args.log_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| CliError::io("opening log file", path, e))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}
