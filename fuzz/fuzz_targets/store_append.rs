use honggfuzz::fuzz;
use memfo::{Sample, SampleStore, StoreLimits};

fn main() {
    loop {
        fuzz!(|data: &[u8]| {
            let limits = StoreLimits {
                max_samples: 16,
                retention_secs: 3600,
            };
            let mut store = SampleStore::with_limits(1, limits);
            let mut t = 0u64;
            for pair in data.chunks(2) {
                let step = u16::from_le_bytes([pair[0], pair.get(1).copied().unwrap_or(0)]);
                if step & 0x8000 != 0 {
                    t = t.saturating_sub(u64::from(step & 0xff));
                } else {
                    t += u64::from(step % 900);
                }
                store.append(Sample::from_fields(t, [("v", t)]));

                let q = store.quantum();
                assert!(store.len() <= limits.max_samples);
                let keys: Vec<u64> = store.iter().map(|s| s.time_key).collect();
                for w in keys.windows(2) {
                    assert_eq!(w[0] - w[1], q);
                }
                assert!(keys.iter().all(|k| k % q == 0));
            }
        });
    }
}
