use criterion::{Criterion, black_box, criterion_group, criterion_main};

use quarry_blocks::registry::CatalogStore;
use quarry_mesh::{AtlasLayout, Form, synthesize};

fn load_catalog() -> CatalogStore {
    let root = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    CatalogStore::load_from_path(root.join("../../assets/blocks.toml")).unwrap()
}

fn bench_synthesize_catalog(c: &mut Criterion) {
    let cat = load_catalog();
    let atlas = AtlasLayout::from_config(&cat.atlas);
    let resolved: Vec<_> = cat
        .iter()
        .filter_map(|def| {
            let r = cat.resolve_variant(def.id, 0)?;
            Some((def.shape, r.faces.ok()?))
        })
        .collect();
    c.bench_function("synthesize_catalog", |b| {
        b.iter(|| {
            for (shape, faces) in &resolved {
                black_box(synthesize(*shape, Form::Standard, faces, &atlas));
            }
        })
    });
}

criterion_group!(benches, bench_synthesize_catalog);
criterion_main!(benches);
