use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lgtv_remote::{CommandCatalog, ResponseTable, SerialCommandIndex};

fn builtin_catalog(c: &mut Criterion) {
    let catalog = CommandCatalog::builtin();

    c.bench_function("response_table_build", |b| {
        b.iter(|| ResponseTable::build(black_box(&catalog)))
    });

    c.bench_function("serial_index_build", |b| {
        b.iter(|| SerialCommandIndex::build(black_box(&catalog)))
    });

    let table = ResponseTable::build(&catalog);
    c.bench_function("response_table_json", |b| b.iter(|| table.to_json()));
}

criterion_group!(benches, builtin_catalog);
criterion_main!(benches);
