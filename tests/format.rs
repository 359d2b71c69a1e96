use memfo::{ReportInterval, Units, ValueFormat, MAX_VALUE};

#[test]
fn widths_fit_the_largest_value() {
    assert_eq!(ValueFormat::new(Units::MiB, MAX_VALUE).width, 14);
    assert_eq!(ValueFormat::new(Units::KiB, MAX_VALUE).width, 16);
    assert_eq!(ValueFormat::new(Units::GiB, MAX_VALUE).width, 10);
    assert_eq!(ValueFormat::new(Units::Human, MAX_VALUE).width, 7);
}

#[test]
fn renders_right_aligned_with_grouping() {
    let f = ValueFormat::new(Units::MiB, MAX_VALUE);
    assert_eq!(f.render(16_318_412 * 1024, false), "      15,935.9");
    assert_eq!(f.render(-3 * 1024 * 1024, true), "          -3.0");
    assert_eq!(f.render(512 * 1024, true), "          +0.5");

    let f = ValueFormat::new(Units::KiB, MAX_VALUE);
    assert_eq!(f.render(2048, false).trim(), "2");

    let f = ValueFormat::new(Units::Human, MAX_VALUE);
    assert_eq!(f.render(3 * 1024 * 1024, false), "   3.0M");
    assert_eq!(f.render(2048, true), "  +2.0K");
}

#[test]
fn units_cycle_and_parse() {
    let mut units = Units::KiB;
    let mut seen = Vec::new();
    for _ in 0..Units::ALL.len() {
        seen.push(units);
        units = units.next();
    }
    assert_eq!(seen, Units::ALL);
    assert_eq!(units, Units::KiB);

    assert_eq!("gib".parse::<Units>().unwrap(), Units::GiB);
    assert_eq!("human".parse::<Units>().unwrap(), Units::Human);
    assert!("bytes".parse::<Units>().is_err());
}

#[test]
fn report_interval_labels() {
    let labels: Vec<String> = ReportInterval::CHOICES.iter().map(|c| c.to_string()).collect();
    assert_eq!(labels, ["Var", "5s", "15s", "30s", "1m", "5m", "15m", "1h"]);
    assert_eq!(ReportInterval::Fixed(3600).next(), ReportInterval::Var);
    assert_eq!(ReportInterval::Fixed(7).next(), ReportInterval::Var);

    assert_eq!("var".parse::<ReportInterval>().unwrap(), ReportInterval::Var);
    assert_eq!("90".parse::<ReportInterval>().unwrap(), ReportInterval::Fixed(90));
    assert_eq!("5m".parse::<ReportInterval>().unwrap(), ReportInterval::Fixed(300));
    assert_eq!("2h".parse::<ReportInterval>().unwrap(), ReportInterval::Fixed(7200));
    assert!("0".parse::<ReportInterval>().is_err());
    assert!("soon".parse::<ReportInterval>().is_err());
    assert!("6000000000000000h".parse::<ReportInterval>().is_err());
    assert!("99999999999999999999".parse::<ReportInterval>().is_err());
}
