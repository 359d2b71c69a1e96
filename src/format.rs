//! Turning counter values and ages into fixed-width text cells.

use std::fmt;
use std::str::FromStr;

use crate::error::MemfoError;

/// Largest value a cell must fit: 999 TB.
pub const MAX_VALUE: i64 = 999 * 1000 * 1000 * 1000 * 1000;

/// Memory units for rendering byte counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Units {
    KiB,
    MB,
    #[default]
    MiB,
    GB,
    GiB,
    Human,
}

impl Units {
    pub const ALL: [Units; 6] = [
        Units::KiB,
        Units::MB,
        Units::MiB,
        Units::GB,
        Units::GiB,
        Units::Human,
    ];

    /// Bytes per displayed unit; `None` for human-readable rendering.
    pub fn divisor(self) -> Option<u64> {
        match self {
            Units::KiB => Some(1024),
            Units::MB => Some(1000 * 1000),
            Units::MiB => Some(1024 * 1024),
            Units::GB => Some(1000 * 1000 * 1000),
            Units::GiB => Some(1024 * 1024 * 1024),
            Units::Human => None,
        }
    }

    /// Decimal places shown.
    pub fn precision(self) -> usize {
        match self {
            Units::KiB | Units::Human => 0,
            _ => 1,
        }
    }

    /// Next units in the cycle used by the `u` key.
    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|u| *u == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    pub fn label(self) -> &'static str {
        match self {
            Units::KiB => "KiB",
            Units::MB => "MB",
            Units::MiB => "MiB",
            Units::GB => "GB",
            Units::GiB => "GiB",
            Units::Human => "human",
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Units {
    type Err = MemfoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|u| u.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| MemfoError::Parse(format!("unknown units '{s}'")))
    }
}

/// Renders values in one of the [`Units`] at a fixed cell width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueFormat {
    pub units: Units,
    pub width: usize,
}

impl ValueFormat {
    /// Width is that of the most negative value the cell must hold.
    pub fn new(units: Units, max_value: i64) -> Self {
        let mut format = Self { units, width: 1 };
        format.width = format.render(-max_value, false).len();
        format
    }

    pub fn render(&self, value: i64, signed: bool) -> String {
        let text = match self.units.divisor() {
            None => {
                let text = human(value as f64);
                if signed && !text.starts_with('-') {
                    format!("+{text}")
                } else {
                    text
                }
            }
            Some(divisor) => fixed(value, divisor, self.units.precision(), signed),
        };
        format!("{:>width$}", text, width = self.width)
    }
}

fn fixed(value: i64, divisor: u64, precision: usize, signed: bool) -> String {
    let scale = 10u64.pow(precision as u32) as f64;
    let scaled = (value as f64 / divisor as f64 * scale).round();
    let negative = scaled < 0.0;
    let magnitude = scaled.abs() as u64;
    let whole = magnitude / scale as u64;

    let mut text = String::new();
    if negative {
        text.push('-');
    } else if signed {
        text.push('+');
    }
    text.push_str(&group_thousands(whole));
    if precision > 0 {
        let frac = magnitude % scale as u64;
        text.push_str(&format!(".{:0p$}", frac, p = precision));
    }
    text
}

/// `1234567` -> `"1,234,567"`.
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Concise binary-scaled size, e.g. `2048.0` -> `"2.0K"`.
pub fn human(number: f64) -> String {
    if number < 0.0 {
        return format!("-{}", human(-number));
    }
    let mut number = number / 1024.0;
    for suffix in ['K', 'M', 'G'] {
        if number < 999.95 {
            return format!("{number:.1}{suffix}");
        }
        number /= 1024.0;
    }
    format!("{number:.1}T")
}

/// Compact age, e.g. `45` -> `"45s"`, `67140` -> `"18h39m"`.
pub fn ago_str(delta_secs: i64, signed: bool) -> String {
    const DIVS: [u64; 5] = [60, 24, 7, 52, u64::MAX];
    const UNITS: [char; 6] = ['s', 'm', 'h', 'd', 'w', 'y'];

    let ago = delta_secs.unsigned_abs();
    let (mut low, mut high) = (ago % 60, ago / 60);
    let mut unit = 1;
    for div in DIVS {
        if high < div {
            break;
        }
        low = high % div;
        high /= div;
        unit += 1;
    }

    let mut text = String::new();
    if signed && delta_secs < 0 {
        text.push('-');
    }
    if high > 0 {
        text.push_str(&format!("{}{}", high, UNITS[unit]));
    }
    text.push_str(&format!("{}{}", low, UNITS[unit - 1]));
    text
}

/// Column spacing of the report: spread over all history, or fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportInterval {
    #[default]
    Var,
    Fixed(u64),
}

impl ReportInterval {
    /// Choices cycled by the `i` key.
    pub const CHOICES: [ReportInterval; 8] = [
        ReportInterval::Var,
        ReportInterval::Fixed(5),
        ReportInterval::Fixed(15),
        ReportInterval::Fixed(30),
        ReportInterval::Fixed(60),
        ReportInterval::Fixed(300),
        ReportInterval::Fixed(900),
        ReportInterval::Fixed(3600),
    ];

    pub fn next(self) -> Self {
        let i = Self::CHOICES.iter().position(|c| *c == self);
        match i {
            Some(i) => Self::CHOICES[(i + 1) % Self::CHOICES.len()],
            None => ReportInterval::Var,
        }
    }

    pub fn seconds(self) -> Option<u64> {
        match self {
            ReportInterval::Var => None,
            ReportInterval::Fixed(secs) => Some(secs),
        }
    }
}

impl fmt::Display for ReportInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ReportInterval::Var => f.write_str("Var"),
            ReportInterval::Fixed(secs) if secs % 3600 == 0 => write!(f, "{}h", secs / 3600),
            ReportInterval::Fixed(secs) if secs % 60 == 0 => write!(f, "{}m", secs / 60),
            ReportInterval::Fixed(secs) => write!(f, "{secs}s"),
        }
    }
}

impl FromStr for ReportInterval {
    type Err = MemfoError;

    /// Accepts `var`, bare seconds, or a number with an `s`/`m`/`h` suffix.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("var") {
            return Ok(ReportInterval::Var);
        }
        let bad = || MemfoError::Parse(format!("invalid report interval '{s}'"));
        let (digits, scale) = match s.char_indices().last() {
            Some((i, 's')) => (&s[..i], 1),
            Some((i, 'm')) => (&s[..i], 60),
            Some((i, 'h')) => (&s[..i], 3600),
            _ => (s, 1),
        };
        let value: u64 = digits.parse().map_err(|_| bad())?;
        if value == 0 {
            return Err(bad());
        }
        let secs = value.checked_mul(scale).ok_or_else(bad)?;
        Ok(ReportInterval::Fixed(secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ago_str_examples() {
        assert_eq!(ago_str(0, false), "0s");
        assert_eq!(ago_str(45, false), "45s");
        assert_eq!(ago_str(125, false), "2m5s");
        assert_eq!(ago_str(67_140, false), "18h39m");
        assert_eq!(ago_str(-90, true), "-1m30s");
        assert_eq!(ago_str(-90, false), "1m30s");
    }

    #[test]
    fn human_scales_by_1024() {
        assert_eq!(human(2048.0), "2.0K");
        assert_eq!(human(1536.0 * 1024.0), "1.5M");
        assert_eq!(human(-1024.0), "-1.0K");
    }

    #[test]
    fn grouping() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
    }
}
