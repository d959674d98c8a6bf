//! Resolution benchmarks: cached singletons, transient chains and wide graphs

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use skitrack_core::Container;

/// Chain of `depth` transients ending in a singleton
fn transient_chain(depth: usize) -> Container {
    let mut builder = Container::builder()
        .add_singleton("Leaf", Vec::<String>::new(), |_| Ok(0u64))
        .expect("leaf registration");

    for level in 0..depth {
        let dependency = if level == 0 {
            "Leaf".to_string()
        } else {
            format!("Node{}", level - 1)
        };
        builder = builder
            .add_transient(format!("Node{}", level), [dependency], |args| {
                Ok(*args.get::<u64>(0)? + 1)
            })
            .expect("node registration");
    }

    builder.build().expect("valid graph")
}

/// One transient depending on `width` singletons
fn wide_graph(width: usize) -> Container {
    let mut builder = Container::builder();
    let mut names = Vec::with_capacity(width);

    for i in 0..width {
        let name = format!("Svc{}", i);
        builder = builder
            .add_singleton(name.clone(), Vec::<String>::new(), move |_| Ok(i as u64))
            .expect("service registration");
        names.push(name);
    }

    builder
        .add_transient("Root", names, |args| {
            let mut total = 0u64;
            for i in 0..args.len() {
                total += *args.get::<u64>(i)?;
            }
            Ok(total)
        })
        .expect("root registration")
        .build()
        .expect("valid graph")
}

fn benchmark_singleton_hit(c: &mut Criterion) {
    let container = transient_chain(0);
    container.resolve("Leaf").expect("warm");

    c.bench_function("singleton_cache_hit", |b| {
        b.iter(|| black_box(container.resolve(black_box("Leaf")).expect("resolve")))
    });
}

fn benchmark_transient_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("transient_chain");

    for depth in [1usize, 8, 32] {
        let container = transient_chain(depth);
        let top = format!("Node{}", depth - 1);
        group.bench_with_input(BenchmarkId::from_parameter(depth), &top, |b, top| {
            b.iter(|| black_box(container.resolve(top).expect("resolve")))
        });
    }

    group.finish();
}

fn benchmark_wide_graph(c: &mut Criterion) {
    let mut group = c.benchmark_group("wide_graph");

    for width in [4usize, 32, 128] {
        let container = wide_graph(width);
        group.bench_with_input(BenchmarkId::from_parameter(width), &width, |b, _| {
            b.iter(|| black_box(container.resolve("Root").expect("resolve")))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_singleton_hit,
    benchmark_transient_chain,
    benchmark_wide_graph
);
criterion_main!(benches);
