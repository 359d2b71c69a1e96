use honggfuzz::fuzz;
use memfo::{ColumnSelector, PanCommand, Sample, SampleStore, StoreLimits};

const KEYS: [char; 6] = ['[', ']', '<', '>', '{', '}'];

fn main() {
    loop {
        fuzz!(|data: &[u8]| {
            if data.len() < 3 {
                return;
            }
            let limits = StoreLimits {
                max_samples: 40,
                retention_secs: 86_400,
            };
            let mut store = SampleStore::with_limits(1, limits);
            let interval = u64::from(data[0] % 30) + 1;
            let budget = usize::from(data[1] % 12);
            let mut selector = ColumnSelector::new();
            let mut t = 0u64;
            for &b in &data[2..] {
                t += u64::from(b >> 4);
                store.append(Sample::from_fields(t, [("v", t)]));
                if let Some(cmd) = PanCommand::from_key(KEYS[usize::from(b & 0x0f) % KEYS.len()]) {
                    if b & 0x08 != 0 {
                        selector.queue_pan(cmd);
                    }
                }
                let columns = selector.select_fixed_interval(&store, interval, budget, false);
                if budget == 0 {
                    continue;
                }
                assert!(columns.len() <= budget.max(1));
                let live = store.newest().map(|s| s.time_key);
                assert_eq!(columns.last().map(|s| s.time_key), live);
                for w in columns.windows(2) {
                    assert!(w[0].time_key < w[1].time_key);
                }
            }
        });
    }
}
