//! DIT Performance Benchmarks
//!
//! This benchmark suite measures schema loading, entry construction, lookup
//! and search over trees of increasing size.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use ldap_dit::{Dit, Dn, Entry, EntryOptions, Filter, Schema, SearchScope};
use std::sync::Arc;

/// Build `dc=bench` -> `ou=People` -> `size` person entries
fn create_tree(schema: &Arc<Schema>, size: usize) -> Dit {
    let mut dit = Dit::new(schema.clone());
    for (dn, class) in [("dc=bench", "domain"), ("ou=People,dc=bench", "organizationalUnit")] {
        let dn = Dn::parse(schema, dn).unwrap();
        let entry = Entry::new(schema, dn.clone(), EntryOptions::new(class)).unwrap();
        dit.insert_entry(&dn, entry).unwrap();
    }
    for i in 0..size {
        let dn = Dn::parse(schema, &format!("uid=user{i},ou=People,dc=bench")).unwrap();
        let entry = create_person(schema, dn.clone(), i);
        dit.insert_entry(&dn, entry).unwrap();
    }
    dit
}

fn create_person(schema: &Schema, dn: Dn, id: usize) -> Entry {
    Entry::new(
        schema,
        dn,
        EntryOptions::new("inetOrgPerson")
            .attribute("cn", [format!("User {id}")])
            .attribute("sn", [if id % 10 == 0 { "Tester" } else { "User" }])
            .attribute("mail", [format!("user{id}@example.com")]),
    )
    .unwrap()
}

/// Benchmark loading the embedded schema
fn bench_schema_loading(c: &mut Criterion) {
    c.bench_function("schema_core_load", |b| {
        b.iter(|| black_box(Schema::core().unwrap()));
    });
}

/// Benchmark DN parsing and validated entry construction
fn bench_entry_construction(c: &mut Criterion) {
    let schema = Schema::core().unwrap();
    let mut group = c.benchmark_group("entry_construction");

    group.bench_function("dn_parse", |b| {
        b.iter(|| black_box(Dn::parse(&schema, black_box("uid=user1,ou=People,dc=bench")).unwrap()));
    });

    group.bench_function("entry_new", |b| {
        let dn = Dn::parse(&schema, "uid=user1,ou=People,dc=bench").unwrap();
        b.iter(|| black_box(create_person(&schema, dn.clone(), 1)));
    });

    group.finish();
}

/// Benchmark lookups and searches as the tree grows
fn bench_tree_operations(c: &mut Criterion) {
    let schema = Arc::new(Schema::core().unwrap());
    let mut group = c.benchmark_group("tree_operations");

    for size in [10, 100, 1000].iter() {
        let dit = create_tree(&schema, *size);
        let leaf = Dn::parse(&schema, &format!("uid=user{},ou=People,dc=bench", size - 1)).unwrap();
        let base = Dn::parse(&schema, "dc=bench").unwrap();
        let filter = Filter::parse("(&(objectClass=person)(sn=Tester))").unwrap();

        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::new("get_entry_last_child", size), size, |b, _| {
            b.iter(|| black_box(dit.get_entry(&leaf).unwrap()));
        });
        group.bench_with_input(BenchmarkId::new("search_subtree", size), size, |b, _| {
            b.iter(|| black_box(dit.search(&base, SearchScope::WholeSubtree, &filter).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_schema_loading,
    bench_entry_construction,
    bench_tree_operations
);
criterion_main!(benches);
