//! Runtime settings and the persisted per-field layout.
//!
//! Field layout (which counters are frozen above the line and which are
//! hidden) is stored as JSON under the user's config directory. A missing
//! file is created with defaults; an unreadable one is logged and ignored.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::MemfoError;
use crate::format::{ReportInterval, Units};

/// Fastest accepted polling period.
pub const MIN_POLL_SECS: f64 = 0.5;
/// Slowest accepted polling period.
pub const MAX_POLL_SECS: f64 = 3600.0;

/// Display settings toggled at runtime.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub units: Units,
    pub report_interval: ReportInterval,
    /// Show differences to the next newer column instead of values.
    pub deltas: bool,
    /// Show rows whose values have always been zero.
    pub zeros: bool,
    /// Include the (mostly useless) `VmallocTotal` counter.
    pub vmalloc_total: bool,
    /// Seconds between polls.
    pub poll_secs: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            units: Units::MiB,
            report_interval: ReportInterval::Var,
            deltas: false,
            zeros: false,
            vmalloc_total: false,
            poll_secs: 1.0,
        }
    }
}

pub fn clamp_poll_secs(secs: f64) -> f64 {
    if secs.is_nan() {
        return 1.0;
    }
    secs.clamp(MIN_POLL_SECS, MAX_POLL_SECS)
}

/// Where a field's row is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Frozen,
    Body,
    Hidden,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    pub frozen: BTreeSet<String>,
    pub hidden: BTreeSet<String>,
    #[serde(skip)]
    dirty: bool,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            frozen: ["MemTotal", "MemAvailable"].map(String::from).into(),
            hidden: ["KernelStack", "Active(file)"].map(String::from).into(),
            dirty: false,
        }
    }
}

impl FieldConfig {
    /// An empty layout: nothing frozen, nothing hidden.
    pub fn empty() -> Self {
        Self {
            frozen: BTreeSet::new(),
            hidden: BTreeSet::new(),
            dirty: false,
        }
    }

    pub fn placement(&self, field: &str) -> Placement {
        if self.frozen.contains(field) {
            Placement::Frozen
        } else if self.hidden.contains(field) {
            Placement::Hidden
        } else {
            Placement::Body
        }
    }

    pub fn freeze(&mut self, field: &str) {
        self.hidden.remove(field);
        self.frozen.insert(field.to_string());
        self.dirty = true;
    }

    pub fn hide(&mut self, field: &str) {
        self.frozen.remove(field);
        self.hidden.insert(field.to_string());
        self.dirty = true;
    }

    pub fn reset(&mut self, field: &str) {
        self.frozen.remove(field);
        self.hidden.remove(field);
        self.dirty = true;
    }

    pub fn reset_all(&mut self) {
        self.frozen.clear();
        self.hidden.clear();
        self.dirty = true;
    }

    /// True when there are edits not yet written.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Load `path`, creating it with defaults when missing.
    pub fn load_or_create(path: &Path) -> Self {
        if !path.exists() {
            info!("no field config at {:?}; writing defaults", path);
            let mut config = Self::default();
            config.dirty = true;
            if let Err(e) = config.commit(path) {
                warn!("could not write default field config: {}", e);
            }
            return config;
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!("ignoring field config {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    pub fn load(path: &Path) -> Result<Self, MemfoError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| MemfoError::file("reading config", path, e))?;
        serde_json::from_str(&text).map_err(|e| MemfoError::Config(e.to_string()))
    }

    /// Write the layout if it has unsaved edits. Returns whether it wrote.
    pub fn commit(&mut self, path: &Path) -> Result<bool, MemfoError> {
        if !self.dirty {
            return Ok(false);
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| MemfoError::file("creating config dir", parent, e))?;
        }
        let json =
            serde_json::to_string_pretty(self).map_err(|e| MemfoError::Config(e.to_string()))?;
        std::fs::write(path, json + "\n")
            .map_err(|e| MemfoError::file("writing config", path, e))?;
        self.dirty = false;
        Ok(true)
    }
}

/// `<config dir>/memfo/<name>.json`, falling back to the home directory.
pub fn config_path(name: &str) -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
        .join("memfo")
        .join(format!("{name}.json"))
}
