//! The interactive report, independent of any terminal library.
//!
//! A [`Dashboard`] owns the whole session: the metric source, the sample
//! store, the column selector and the display settings. Each [`tick`] polls
//! once and rebuilds the report; [`handle_key`] applies one keystroke.
//!
//! [`tick`]: Dashboard::tick
//! [`handle_key`]: Dashboard::handle_key

use std::path::PathBuf;

use chrono::Local;
use log::{info, warn};

use crate::config::{FieldConfig, Placement, Settings};
use crate::dump::dump_csv_to_path;
use crate::error::MemfoError;
use crate::format::{ago_str, ReportInterval, ValueFormat, MAX_VALUE};
use crate::report::{Report, ReportBuilder, EDIT_MARKER_WIDTH};
use crate::sample::Sample;
use crate::selector::{ColumnSelector, PanCommand};
use crate::source::MetricSource;
use crate::store::{AppendOutcome, SampleStore};

/// Keys the dashboard understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Up,
    Down,
    Enter,
    Interrupt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Normal,
    Edit,
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    Quit,
}

/// What a front end should draw.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Screen {
    /// Lines pinned to the top.
    pub header: Vec<String>,
    pub body: Vec<String>,
    /// Highlighted body line on the edit page.
    pub cursor: Option<usize>,
}

pub const HELP: &[&str] = &[
    "u      cycle memory units",
    "i      cycle report interval (Var spreads columns over all history)",
    "d      toggle deltas between columns",
    "z      toggle rows that have always been zero",
    "e      edit page: freeze or hide rows",
    "[ ]    fixed interval: oldest / newest (live) position",
    "< >    fixed interval: step one column older / newer",
    "{ }    fixed interval: jump older / newer",
    "D      dump the retained history as CSV",
    "?      toggle this help",
    "q      quit (also Ctrl-C)",
    "",
    "On the edit page:",
    "Up/Down  move the cursor",
    "*        freeze the row above the line (again to undo)",
    "-        hide the row (again to undo)",
    "r        reset the row",
    "R        reset every row",
    "ENTER    leave the edit page",
];

pub struct Dashboard {
    source: Box<dyn MetricSource>,
    store: SampleStore,
    selector: ColumnSelector,
    builder: ReportBuilder,
    settings: Settings,
    fields: FieldConfig,
    config_path: Option<PathBuf>,
    dump_dir: PathBuf,
    format: ValueFormat,
    page: Page,
    edit_mode: bool,
    cursor: usize,
    key_width: usize,
    last_interval: Option<ReportInterval>,
    report: Option<Report>,
    status: Option<String>,
}

impl Dashboard {
    /// Field edits are committed to `config_path` when leaving the edit page
    /// and on [`finish`](Self::finish); `None` keeps them in memory only.
    pub fn new(
        source: Box<dyn MetricSource>,
        settings: Settings,
        fields: FieldConfig,
        config_path: Option<PathBuf>,
    ) -> Self {
        let format = ValueFormat::new(settings.units, max_value(&settings));
        Self {
            source,
            store: SampleStore::default(),
            selector: ColumnSelector::new(),
            builder: ReportBuilder::new(),
            settings,
            fields,
            config_path,
            dump_dir: PathBuf::from("."),
            format,
            page: Page::Normal,
            edit_mode: false,
            cursor: 0,
            key_width: 0,
            last_interval: None,
            report: None,
            status: None,
        }
    }

    /// Directory that `D` writes CSV dumps into.
    pub fn with_dump_dir(mut self, dir: PathBuf) -> Self {
        self.dump_dir = dir;
        self
    }

    pub fn store(&self) -> &SampleStore {
        &self.store
    }

    pub fn selector(&self) -> &ColumnSelector {
        &self.selector
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn fields(&self) -> &FieldConfig {
        &self.fields
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn report(&self) -> Option<&Report> {
        self.report.as_ref()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn value_format(&self) -> &ValueFormat {
        &self.format
    }

    /// Columns that fit in `term_width`.
    pub fn column_budget(&self, term_width: usize) -> usize {
        let mut width = term_width.saturating_sub(self.key_width);
        if self.page == Page::Edit {
            width = width.saturating_sub(EDIT_MARKER_WIDTH);
        }
        (width / (self.format.width + 1)).max(1)
    }

    /// Poll once, store the sample and rebuild the report.
    pub fn tick(&mut self, term_width: usize) -> Result<AppendOutcome, MemfoError> {
        let sample = self.source.read()?;
        Ok(self.ingest(sample, term_width))
    }

    /// Store an already-read sample and rebuild the report.
    pub fn ingest(&mut self, sample: Sample, term_width: usize) -> AppendOutcome {
        if self.key_width == 0 {
            self.key_width = sample.field_names().map(str::len).max().unwrap_or(0);
        }
        let outcome = self.store.append(sample);
        self.rebuild(term_width);
        outcome
    }

    /// Reselect columns and rebuild rows from the current store.
    pub fn rebuild(&mut self, term_width: usize) {
        let budget = self.column_budget(term_width);
        let interval = self.settings.report_interval;
        let mode_changed = self.last_interval != Some(interval);
        self.last_interval = Some(interval);

        let columns = match interval.seconds() {
            None => self.selector.select_uniform(&self.store, budget),
            Some(secs) => self
                .selector
                .select_fixed_interval(&self.store, secs, budget, mode_changed),
        };
        let report = self
            .builder
            .build(&columns, &self.format, self.settings.deltas);
        self.report = Some(report);
        self.clamp_cursor();
    }

    /// Apply one keystroke.
    pub fn handle_key(&mut self, key: Key) -> Action {
        if let Key::Char(c) = key {
            if let Some(command) = PanCommand::from_key(c) {
                self.selector.queue_pan(command);
                return Action::Continue;
            }
        }
        match key {
            Key::Interrupt | Key::Char('q') => return Action::Quit,
            Key::Enter => {
                if self.page == Page::Help {
                    self.set_page(false, self.edit_mode);
                } else if self.edit_mode {
                    self.set_page(false, false);
                }
            }
            Key::Char('?') => self.set_page(self.page != Page::Help, self.edit_mode),
            Key::Char('e') => self.set_page(false, !self.edit_mode),
            Key::Char('u') => {
                self.settings.units = self.settings.units.next();
                self.format = ValueFormat::new(self.settings.units, max_value(&self.settings));
            }
            Key::Char('i') => {
                self.settings.report_interval = self.settings.report_interval.next();
            }
            Key::Char('d') => self.settings.deltas = !self.settings.deltas,
            Key::Char('z') => self.settings.zeros = !self.settings.zeros,
            Key::Char('D') => self.dump(),
            key if self.page == Page::Edit => self.edit_key(key),
            _ => {}
        }
        Action::Continue
    }

    /// Write any unsaved field edits.
    pub fn finish(&mut self) {
        self.commit_fields();
    }

    /// Lines for the current page.
    pub fn screen(&self) -> Screen {
        let mut screen = Screen {
            header: vec![self.lead_line()],
            ..Screen::default()
        };
        if self.page == Page::Help {
            screen.body = HELP.iter().map(|s| s.to_string()).collect();
            return screen;
        }
        let Some(report) = &self.report else {
            return screen;
        };
        screen.header.push(report.time.text());
        if self.page == Page::Edit {
            screen.body = report.edit_lines(&self.fields);
            screen.cursor = Some(self.cursor);
        } else {
            let lines = report.lines(&self.fields, self.settings.zeros);
            screen.header.extend(lines.header);
            screen.body = lines.body;
        }
        screen
    }

    /// Every row, regardless of placement, for one-shot printing.
    pub fn dump_lines(&self) -> Vec<String> {
        self.report
            .as_ref()
            .map(|r| r.rows.iter().map(|row| row.line()).collect())
            .unwrap_or_default()
    }

    fn lead_line(&self) -> String {
        if self.page == Page::Edit {
            return "EDIT SCREEN:  e,ENTER:exit-edit *:put-on-top -:hide-line \
                    r:reset-line R:reset-all  ?=help"
                .to_string();
        }
        if self.page == Page::Help {
            return "-- HELP SCREEN ['?' or ENTER closes Help; q or Ctrl-C exits] --".to_string();
        }
        let delta = if self.settings.deltas { "show-values" } else { "show-deltas" };
        let zeros = if self.settings.zeros { "hide-if-zero" } else { "show-if-zero" };
        let mut text = format!(
            "u:{} i:{} d:{} z:{} e:enter-edit ?=help",
            self.settings.units, self.settings.report_interval, delta, zeros
        );
        if let (Some(pin), Some(live)) = (self.selector.pin(), self.store.newest()) {
            let age = live.time_key.saturating_sub(pin);
            text.push_str(&format!("  PINNED@{} (] for live)", ago_str(age as i64, false)));
        }
        if let Some(status) = &self.status {
            text.push_str("  ");
            text.push_str(status);
        }
        text
    }

    fn set_page(&mut self, help: bool, edit: bool) {
        let leaving_edit = self.page == Page::Edit;
        self.edit_mode = edit;
        self.page = match (help, edit) {
            (true, _) => Page::Help,
            (false, true) => Page::Edit,
            (false, false) => Page::Normal,
        };
        if leaving_edit && self.page != Page::Edit {
            self.commit_fields();
        }
    }

    fn edit_key(&mut self, key: Key) {
        let row_count = self.report.as_ref().map_or(0, |r| r.rows.len());
        match key {
            Key::Up => self.cursor = self.cursor.saturating_sub(1),
            Key::Down => self.cursor += 1,
            Key::Char('R') => self.fields.reset_all(),
            Key::Char(c @ ('*' | '-' | 'r')) => {
                let Some(field) = self.cursor_field() else {
                    return;
                };
                match (c, self.fields.placement(&field)) {
                    ('*', Placement::Frozen) | ('-', Placement::Hidden) | ('r', _) => {
                        self.fields.reset(&field)
                    }
                    ('*', _) => self.fields.freeze(&field),
                    _ => self.fields.hide(&field),
                }
                if c != 'r' {
                    self.cursor += 1;
                }
            }
            _ => {}
        }
        if row_count > 0 {
            self.cursor = self.cursor.min(row_count - 1);
        }
    }

    fn cursor_field(&self) -> Option<String> {
        self.report
            .as_ref()
            .and_then(|r| r.rows.get(self.cursor))
            .map(|row| row.key.clone())
    }

    fn clamp_cursor(&mut self) {
        let rows = self.report.as_ref().map_or(0, |r| r.rows.len());
        self.cursor = self.cursor.min(rows.saturating_sub(1));
    }

    fn commit_fields(&mut self) {
        let Some(path) = &self.config_path else {
            return;
        };
        match self.fields.commit(path) {
            Ok(true) => info!("saved field layout to {:?}", path),
            Ok(false) => {}
            Err(e) => {
                warn!("could not save field layout: {}", e);
                self.status = Some(format!("config not saved: {e}"));
            }
        }
    }

    fn dump(&mut self) {
        let name = format!("memfo-{}.csv", Local::now().format("%Y%m%d-%H%M%S"));
        let path = self.dump_dir.join(name);
        self.status = Some(match dump_csv_to_path(&self.store, &path) {
            Ok(rows) => {
                info!("dumped {} samples to {:?}", rows, path);
                format!("dumped {} rows to {}", rows, path.display())
            }
            Err(e) => {
                warn!("dump failed: {}", e);
                format!("dump failed: {e}")
            }
        });
    }
}

/// Largest value cells must fit; `VmallocTotal` needs three more digits.
fn max_value(settings: &Settings) -> i64 {
    if settings.vmalloc_total {
        MAX_VALUE * 1000
    } else {
        MAX_VALUE
    }
}
