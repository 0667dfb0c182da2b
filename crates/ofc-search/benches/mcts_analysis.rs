use criterion::{Criterion, black_box, criterion_group, criterion_main};
use ofc_core::{Deck, GameRules, Layout, PlayerId, Position, Seat};
use ofc_search::{MctsConfig, MctsSimulator};

fn bench_analyze(c: &mut Criterion) {
    let deck = Deck::shuffled_with_seed(17).into_cards();
    let seats = vec![
        Seat {
            player: PlayerId(0),
            layout: Layout::new().with_dealt(&deck[..5]).unwrap_or_default(),
        },
        Seat {
            player: PlayerId(1),
            layout: Layout::new().with_dealt(&deck[5..10]).unwrap_or_default(),
        },
    ];
    let Ok(position) = Position::new(
        "bench",
        seats,
        deck[10..].to_vec(),
        PlayerId(0),
        1,
        GameRules::default(),
    ) else {
        return;
    };
    let config = MctsConfig::for_testing().with_simulations(500).with_batch_size(50);

    c.bench_function("mcts_500_simulations", |b| {
        b.iter(|| {
            let Ok(mut simulator) = MctsSimulator::new(config.clone()) else {
                return;
            };
            black_box(simulator.analyze(black_box(&position)));
        })
    });
}

criterion_group!(benches, bench_analyze);
criterion_main!(benches);
