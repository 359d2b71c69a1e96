//! User-facing error messages for the binaries.

use std::fmt;
use std::io;
use std::path::Path;

use crate::MemfoError;

/// An error ready for the terminal: one line of context plus a hint.
#[derive(Debug)]
pub struct CliError {
    pub msg: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl CliError {
    pub fn new(msg: impl Into<String>) -> Self {
        CliError {
            msg: msg.into(),
            source: None,
        }
    }

    /// A failed file operation, e.g. `("opening input", path, err)`.
    pub fn io(operation: &'static str, path: &Path, err: io::Error) -> Self {
        Self::memfo("Error", MemfoError::file(operation, path, err))
    }

    /// Input whose extension is not `.{expected}`.
    pub fn extension(path: &Path, expected: &str) -> Self {
        Self::new(format!(
            "Invalid file extension for '{}'. Expected .{}. Check the input file.",
            path.display(),
            expected
        ))
    }

    /// A library error under `context`, with the hint for its variant.
    pub fn memfo(context: &str, err: MemfoError) -> Self {
        CliError {
            msg: format!("{}: {}", context, cli_hint(&err)),
            source: Some(Box::new(err)),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.msg.fmt(f)
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// What to try next after an I/O failure.
fn io_hint(err: &io::Error) -> &'static str {
    match err.kind() {
        io::ErrorKind::NotFound => "Check the path; /proc/meminfo exists only on Linux.",
        io::ErrorKind::PermissionDenied => "Check permissions on the file or directory.",
        io::ErrorKind::InvalidData => "The file is not valid UTF-8 text.",
        io::ErrorKind::WriteZero => "Disk may be full. Free up space and try again.",
        _ if err.raw_os_error() == Some(28) => "Disk may be full. Free up space and try again.",
        _ => "Check the path and permissions.",
    }
}

/// Return an actionable hint for a memfo error variant.
pub fn cli_hint(err: &MemfoError) -> String {
    if let Some(io) = err.io_source() {
        return format!("{err}. {}", io_hint(io));
    }
    match err {
        MemfoError::Parse(msg) => format!("{msg}. Check the input format."),
        MemfoError::Config(msg) => format!("{msg}. Fix or delete the config file."),
        MemfoError::Csv(e) => format!("{e}. Check the CSV file."),
        MemfoError::Source(msg) => format!("{msg}. Try --source sysinfo."),
        MemfoError::Terminal(msg) => format!("{msg}. Try --dump for plain output."),
        other => other.to_string(),
    }
}
