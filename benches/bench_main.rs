use criterion::{Criterion, criterion_group, criterion_main};
use ferrograph::GraphBuilder;

fn bench_transit_build(c: &mut Criterion) {
    let feed = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/toy_gtfs");

    c.bench_function("transit_only_build", |b| {
        b.iter(|| {
            // Fresh builder per iteration so the cache does not short-circuit.
            let builder = GraphBuilder::new();
            builder.build_transit_only(feed).unwrap()
        });
    });
}

criterion_group!(benches, bench_transit_build);
criterion_main!(benches);
