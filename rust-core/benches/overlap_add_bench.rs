//! Throughput of the overlap-add band filter

use bandfilter::{FilterConfig, OverlapAddFilter};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn bench_overlap_add(c: &mut Criterion) {
    // One second of a two-tone signal at 48 kHz
    let input: Vec<f64> = (0..48000)
        .map(|n| 0.4 * (0.05 * n as f64).sin() + 0.3 * (0.9 * n as f64).sin())
        .collect();

    let mut group = c.benchmark_group("overlap_add");
    for block_size in [1024, 4096, 16384] {
        for phase_cancel in [false, true] {
            let config = FilterConfig {
                block_size,
                band_levels_db: vec![0.0, -12.0, 0.0, -24.0],
                phase_cancel,
                ..Default::default()
            };
            let mut filter = match OverlapAddFilter::from_config(&config, 48000) {
                Ok(filter) => filter,
                Err(e) => panic!("invalid bench config: {}", e),
            };

            let id = BenchmarkId::new(
                if phase_cancel { "phase_cancel" } else { "plain" },
                block_size,
            );
            group.bench_with_input(id, &input, |b, input| {
                b.iter(|| filter.process(black_box(input)))
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_overlap_add);
criterion_main!(benches);
