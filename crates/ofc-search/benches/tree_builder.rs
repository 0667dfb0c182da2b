use criterion::{Criterion, black_box, criterion_group, criterion_main};
use ofc_core::{Deck, Layout};
use ofc_search::{PlacementPolicy, TreeBuilder, TreeConfig};

fn bench_build(c: &mut Criterion) {
    let deck = Deck::shuffled_with_seed(5).into_cards();
    let layout = Layout::from_rows(deck[..1].to_vec(), deck[1..3].to_vec(), deck[3..5].to_vec())
        .unwrap_or_default();
    let rest = &deck[5..];

    for (name, placement, depth) in [
        ("build_first_available_depth4", PlacementPolicy::FirstAvailable, 4),
        ("build_exhaustive_depth2", PlacementPolicy::Exhaustive, 2),
    ] {
        let config = TreeConfig::default()
            .with_max_depth(depth)
            .with_placement(placement);
        c.bench_function(name, |b| {
            b.iter(|| {
                let mut builder = TreeBuilder::new(config);
                black_box(builder.build(black_box(&layout), rest));
                black_box(builder.get_tree_stats())
            })
        });
    }
}

criterion_group!(benches, bench_build);
criterion_main!(benches);
