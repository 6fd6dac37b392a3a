// crates/locator-core/benches/benchmarks.rs
use criterion::{criterion_group, criterion_main, Criterion};
use locator_core::{match_query_with, LocationIndex, PartnershipSnapshot, Server, PARTNER_MARKER};
use std::hint::black_box;

const COUNTRIES: &[(&str, &str)] = &[
    ("CH", "Zurich"),
    ("DE", "Berlin"),
    ("SE", "Stockholm"),
    ("US", "New York"),
    ("JP", "Tokyo"),
    ("UA", "Kyiv"),
    ("CA", "Toronto"),
    ("NL", "Amsterdam"),
];

fn synthetic_catalog(per_country: usize) -> Vec<Server> {
    let mut servers = Vec::new();
    for (code, city) in COUNTRIES {
        for n in 1..=per_country {
            let id = format!("{code}-{n}");
            let name = format!("{code}#{n}");
            servers.push(Server::new(&id, &name, city, code));
        }
    }
    servers
}

fn bench_index(c: &mut Criterion) {
    let servers = synthetic_catalog(500);
    c.bench_function("index_build_4000", |b| {
        b.iter(|| LocationIndex::build(black_box(servers.clone())))
    });
}

fn bench_match(c: &mut Criterion) {
    let index = LocationIndex::build(synthetic_catalog(500));
    let partnerships = PartnershipSnapshot::empty();

    let mut group = c.benchmark_group("match_query");
    for query in ["s", "new yo", "ua#1", "zzz"] {
        group.bench_function(query, |b| {
            b.iter(|| match_query_with(black_box(query), &index, &partnerships, PARTNER_MARKER))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_index, bench_match);
criterion_main!(benches);
