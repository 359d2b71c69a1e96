//! Live memory counters with a bounded, self-compressing history.
//!
//! Samples from a [`MetricSource`] go into a [`SampleStore`], which keeps
//! them evenly spaced, fills gaps, and coarsens its resolution as it grows.
//! A [`ColumnSelector`] picks which stored samples to show as columns and a
//! [`ReportBuilder`] turns them into text rows.

pub mod config;
pub mod dashboard;
pub mod dump;
pub mod error;
pub mod format;
pub mod io_utils;
pub mod report;
pub mod sample;
pub mod selector;
pub mod source;
pub mod store;
pub mod tui;

pub use config::{clamp_poll_secs, config_path, FieldConfig, Placement, Settings};
pub use dashboard::{Action, Dashboard, Key, Page, Screen};
pub use dump::{dump_csv, dump_csv_to_path, read_samples_csv};
pub use error::MemfoError;
pub use format::{ago_str, human, ReportInterval, Units, ValueFormat, MAX_VALUE};
pub use report::{Report, ReportBuilder, ReportLines, Row};
pub use sample::{synthesize, Sample, TimeKey};
pub use selector::{
    effective_interval, jump_steps, resolve_anchor, uniform_indices, Anchor, AnchorRange,
    ColumnSelector, PanCommand, ViewState,
};
pub use source::{
    open_source, parse_meminfo, Clock, ManualClock, MeminfoSource, MetricSource, MonotonicClock,
    SourceKind, SysinfoSource,
};
pub use store::{
    AppendOutcome, SampleStore, StoreLimits, COMPRESSION_MULTIPLIERS, MAX_SAMPLES,
    RETENTION_SECONDS,
};
