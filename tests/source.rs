use std::fs;

use memfo::{parse_meminfo, ManualClock, MemfoError, MeminfoSource, MetricSource};

const MEMINFO: &str = "\
MemTotal:       16318412 kB
MemFree:         1045284 kB
MemAvailable:    9120036 kB
Cached:          7735876 kB
VmallocTotal:   34359738367 kB
HugePages_Total:       0
Hugepagesize:       2048 kB
garbage line
Weird:           12 pages
";

#[test]
fn parses_kb_and_plain_counts() {
    let fields = parse_meminfo(MEMINFO, false);
    let names: Vec<&str> = fields.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(
        names,
        ["MemTotal", "MemFree", "MemAvailable", "Cached", "HugePages_Total", "Hugepagesize"]
    );
    assert_eq!(fields[0].1, 16_318_412 * 1024);
    assert_eq!(fields[4].1, 0);
    assert_eq!(fields[5].1, 2048 * 1024);
}

#[test]
fn vmalloc_total_is_opt_in() {
    let fields = parse_meminfo(MEMINFO, true);
    let vmalloc = fields.iter().find(|(n, _)| n == "VmallocTotal");
    assert_eq!(vmalloc.map(|(_, v)| *v), Some(34_359_738_367 * 1024));
}

#[test]
fn meminfo_source_reads_file_with_clock() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("meminfo");
    fs::write(&path, MEMINFO).unwrap();

    let clock = ManualClock::new(3);
    let mut source = MeminfoSource::with_clock(&path, false, clock.clone());
    let first = source.read().unwrap();
    assert_eq!(first.time_key, 3);
    assert!(first.wall_clock.is_some());
    assert!(!first.synthetic);
    assert_eq!(first.get("MemFree"), Some(1_045_284 * 1024));

    clock.advance(2);
    fs::write(&path, "MemFree: 10 kB\n").unwrap();
    let second = source.read().unwrap();
    assert_eq!(second.time_key, 5);
    assert_eq!(second.get("MemFree"), Some(10 * 1024));
}

#[test]
fn meminfo_source_errors() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope");
    let mut source = MeminfoSource::with_clock(&missing, false, ManualClock::new(0));
    assert!(matches!(
        source.read(),
        Err(MemfoError::File { operation: "reading", .. })
    ));

    let empty = dir.path().join("empty");
    fs::write(&empty, "nothing here\n").unwrap();
    let mut source = MeminfoSource::with_clock(&empty, false, ManualClock::new(0));
    assert!(matches!(source.read(), Err(MemfoError::Source(_))));
}
