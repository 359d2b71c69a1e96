//! Metric sources: each read produces one [`Sample`].
//!
//! Time keys come from a [`Clock`] counting whole seconds since the source
//! was created, so they never run backwards under normal operation.

use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Instant;

use chrono::Local;
use sysinfo::{System, SystemExt};

use crate::error::MemfoError;
use crate::sample::{Sample, TimeKey};

/// Kernel memory statistics on Linux.
pub const PROC_MEMINFO: &str = "/proc/meminfo";

pub trait MetricSource {
    fn read(&mut self) -> Result<Sample, MemfoError>;
}

pub trait Clock {
    /// Whole seconds since the clock started.
    fn elapsed_secs(&self) -> TimeKey;
}

#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    start: Instant,
}

impl MonotonicClock {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Clock for MonotonicClock {
    fn elapsed_secs(&self) -> TimeKey {
        self.start.elapsed().as_secs_f64().round() as TimeKey
    }
}

/// Hand-driven clock; clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock(Rc<Cell<TimeKey>>);

impl ManualClock {
    pub fn new(secs: TimeKey) -> Self {
        Self(Rc::new(Cell::new(secs)))
    }

    pub fn set(&self, secs: TimeKey) {
        self.0.set(secs);
    }

    pub fn advance(&self, secs: TimeKey) {
        self.0.set(self.0.get() + secs);
    }
}

impl Clock for ManualClock {
    fn elapsed_secs(&self) -> TimeKey {
        self.0.get()
    }
}

/// Parse `/proc/meminfo` text into `(name, bytes)` pairs, in file order.
///
/// Lines look like `MemFree:  123456 kB`; `kB` values are scaled to bytes and
/// unsuffixed counts are kept as is. Anything else is skipped.
pub fn parse_meminfo(text: &str, include_vmalloc: bool) -> Vec<(String, u64)> {
    let mut fields = Vec::new();
    for line in text.lines() {
        let Some((key, rest)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() || (key == "VmallocTotal" && !include_vmalloc) {
            continue;
        }
        let mut parts = rest.split_whitespace();
        let Some(Ok(value)) = parts.next().map(str::parse::<u64>) else {
            continue;
        };
        let value = match (parts.next(), parts.next()) {
            (None, None) => value,
            (Some("kB"), None) => value.saturating_mul(1024),
            _ => continue,
        };
        fields.push((key.to_string(), value));
    }
    fields
}

/// Reads a meminfo-format file on every call.
pub struct MeminfoSource<C: Clock = MonotonicClock> {
    path: PathBuf,
    include_vmalloc: bool,
    clock: C,
}

impl MeminfoSource<MonotonicClock> {
    pub fn new(include_vmalloc: bool) -> Self {
        Self::with_clock(PROC_MEMINFO, include_vmalloc, MonotonicClock::start())
    }
}

impl<C: Clock> MeminfoSource<C> {
    pub fn with_clock<P: AsRef<Path>>(path: P, include_vmalloc: bool, clock: C) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            include_vmalloc,
            clock,
        }
    }
}

impl<C: Clock> MetricSource for MeminfoSource<C> {
    fn read(&mut self) -> Result<Sample, MemfoError> {
        let text = std::fs::read_to_string(&self.path)
            .map_err(|e| MemfoError::file("reading", &self.path, e))?;
        let fields = parse_meminfo(&text, self.include_vmalloc);
        if fields.is_empty() {
            return Err(MemfoError::Source(format!(
                "no counters found in {}",
                self.path.display()
            )));
        }
        Ok(Sample::from_fields(self.clock.elapsed_secs(), fields).with_wall_clock(Local::now()))
    }
}

/// Portable memory and swap totals via `sysinfo`.
pub struct SysinfoSource<C: Clock = MonotonicClock> {
    sys: System,
    clock: C,
}

impl SysinfoSource<MonotonicClock> {
    pub fn new() -> Self {
        Self::with_clock(MonotonicClock::start())
    }
}

impl Default for SysinfoSource<MonotonicClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> SysinfoSource<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            sys: System::new(),
            clock,
        }
    }
}

impl<C: Clock> MetricSource for SysinfoSource<C> {
    fn read(&mut self) -> Result<Sample, MemfoError> {
        self.sys.refresh_memory();
        let total = self.sys.total_memory();
        if total == 0 {
            return Err(MemfoError::Source("sysinfo reported no memory".into()));
        }
        let fields = [
            ("MemTotal", total),
            ("MemFree", self.sys.free_memory()),
            ("MemAvailable", self.sys.available_memory()),
            ("MemUsed", self.sys.used_memory()),
            ("SwapTotal", self.sys.total_swap()),
            ("SwapFree", self.sys.free_swap()),
            ("SwapUsed", self.sys.used_swap()),
        ];
        Ok(Sample::from_fields(self.clock.elapsed_secs(), fields).with_wall_clock(Local::now()))
    }
}

/// Which reader the binary uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SourceKind {
    #[default]
    Meminfo,
    Sysinfo,
}

/// Open the requested source; `/proc/meminfo` falls back to `sysinfo` when
/// it does not exist.
pub fn open_source(kind: SourceKind, include_vmalloc: bool) -> Box<dyn MetricSource> {
    match kind {
        SourceKind::Meminfo if Path::new(PROC_MEMINFO).exists() => {
            Box::new(MeminfoSource::new(include_vmalloc))
        }
        SourceKind::Meminfo => {
            log::warn!("{} not available; using sysinfo", PROC_MEMINFO);
            Box::new(SysinfoSource::new())
        }
        SourceKind::Sysinfo => Box::new(SysinfoSource::new()),
    }
}
