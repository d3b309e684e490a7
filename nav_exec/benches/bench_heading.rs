//! # Heading Selection Benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use nav_lib::radial_scan::{
    find_peaks, select_heading, HeadingParams, RadialMap, RadialScanParams, RadialScanner,
    RADIAL_MAP_SLOTS,
};

fn heading_benchmark(c: &mut Criterion) {
    // ---- Build a synthetic scan ----

    // Floor with a slow ripple, a bright line ahead and a fainter one behind
    let slots: Vec<u16> = (0..RADIAL_MAP_SLOTS)
        .map(|i| {
            let ripple = ((i as f64).to_radians() * 7.0).sin() * 150.0;
            let line = match i {
                58..=62 => 1600.0,
                178..=182 => 1200.0,
                _ => 0.0,
            };
            (500.0 + ripple + line) as u16
        })
        .collect();

    let map = RadialMap::from_slots(slots).unwrap();
    let params = HeadingParams::default();

    c.bench_function("radial_scan::find_peaks", |b| {
        b.iter(|| find_peaks(black_box(&map), &params))
    });

    c.bench_function("radial_scan::select_heading", |b| {
        b.iter(|| select_heading(black_box(&map), &params))
    });

    // Full scan sampling, one sample per tick of the calibration rotation
    c.bench_function("RadialScanner::sample", |b| {
        let mut scanner = RadialScanner::new(RadialScanParams::default());
        let mut scan_map = RadialMap::new();

        b.iter(|| {
            scanner.begin(&mut scan_map);
            for ticks in 0..3600u32 {
                scanner.sample(ticks, black_box([1500, 1600, 1700]), &mut scan_map);
            }
        })
    });
}

criterion_group!(benches, heading_benchmark);
criterion_main!(benches);
