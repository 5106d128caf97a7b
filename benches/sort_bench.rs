use criterion::{Criterion, black_box, criterion_group, criterion_main};
use msort::sort::submit_sort;
use rand::seq::SliceRandom;

fn shuffled(n: usize) -> Vec<i64> {
    let mut elements: Vec<i64> = (0..n as i64).collect();
    elements.shuffle(&mut rand::thread_rng());
    elements
}

fn bench_pooled_sort(c: &mut Criterion) {
    for &n in &[1024usize, 4096] {
        let elements = shuffled(n);
        c.bench_function(&format!("pooled_sort_{}", n), |b| {
            b.iter(|| {
                let handle = submit_sort(black_box(elements.clone()), 8).unwrap();
                handle.read_sorted().unwrap()
            })
        });
    }
}

fn bench_std_sort_baseline(c: &mut Criterion) {
    let elements = shuffled(4096);
    c.bench_function("std_sort_4096", |b| {
        b.iter(|| {
            let mut v = black_box(elements.clone());
            v.sort();
            v
        })
    });
}

criterion_group!(benches, bench_pooled_sort, bench_std_sort_baseline);
criterion_main!(benches);
