use ofc_core::model::parse_cards;
use ofc_core::{Deck, Layout};
use ofc_search::tree::TranspositionKey;
use ofc_search::{PlacementPolicy, TreeBuilder, TreeConfig, build_tree_with};

fn opening() -> (Layout, Vec<ofc_core::Card>) {
    let placed = parse_cards("Ah Kd 7c 7s 2d").unwrap();
    let layout = Layout::from_rows(
        placed[..1].to_vec(),
        placed[1..3].to_vec(),
        placed[3..].to_vec(),
    )
    .unwrap();
    let deck = Deck::shuffled_with_seed(21).without(&placed).into_cards();
    (layout, deck)
}

#[test]
fn transpositions_never_grow_the_tree() {
    let (layout, deck) = opening();
    for placement in [PlacementPolicy::FirstAvailable, PlacementPolicy::Exhaustive] {
        let config = TreeConfig::default().with_max_depth(2).with_placement(placement);
        let with = build_tree_with(&layout, &deck, config.with_transpositions(true));
        let without = build_tree_with(&layout, &deck, config.with_transpositions(false));
        assert!(with.tree.len() <= without.tree.len(), "{placement:?}");
        if with.transpositions.hits == 0 {
            assert_eq!(with.tree.len(), without.tree.len());
        }
    }
}

#[test]
fn equal_layouts_share_a_key_regardless_of_card_order() {
    let a = Layout::from_rows(
        parse_cards("Ah Kd").unwrap(),
        parse_cards("7c 7s").unwrap(),
        vec![],
    )
    .unwrap();
    let b = Layout::from_rows(
        parse_cards("Kd Ah").unwrap(),
        parse_cards("7s 7c").unwrap(),
        vec![],
    )
    .unwrap();
    assert_eq!(TranspositionKey::new(&a, 4), TranspositionKey::new(&b, 4));
    assert_ne!(TranspositionKey::new(&a, 4), TranspositionKey::new(&a, 6));
}

#[test]
fn builder_reuses_its_table_across_builds() {
    let (layout, deck) = opening();
    let mut builder = TreeBuilder::new(TreeConfig::default().with_max_depth(1));
    let first = builder.build(&layout, &deck);
    let nodes_after_first = builder.tree().len();
    let second = builder.build(&layout, &deck);
    assert_ne!(first, second);
    assert!(builder.transposition_stats().hits > 0);
    assert!(builder.tree().len() > nodes_after_first);
}

#[test]
fn leaves_are_deepest_or_terminal() {
    let (layout, deck) = opening();
    let built = build_tree_with(&layout, &deck, TreeConfig::default().with_max_depth(3));
    let leaves = built.tree.collect_leaves(built.root);
    assert!(!leaves.is_empty());
    for id in leaves {
        let node = built.tree.get(id).unwrap();
        assert!(node.depth == 3 || node.is_terminal || node.is_fouled);
    }
    let path = built.tree.get_path_to_node(built.tree.collect_leaves(built.root)[0]);
    assert_eq!(path.first(), Some(&built.root));
}

#[test]
fn rebuilding_from_a_child_links_existing_grandchildren() {
    let (layout, deck) = opening();
    let build = |use_transpositions: bool| {
        let config = TreeConfig::default()
            .with_max_depth(2)
            .with_transpositions(use_transpositions);
        let mut builder = TreeBuilder::new(config);
        let root = builder.build(&layout, &deck);
        let child = builder.tree().get(root).unwrap().children[0];
        let child_layout = builder.tree().get(child).unwrap().layout.clone();
        let again = builder.build_tree(&child_layout, &deck[3..], 1);
        let linked = builder.tree().get(again).unwrap().children.clone();
        (builder, linked)
    };

    let (with, linked) = build(true);
    let (without, _) = build(false);
    assert_eq!(without.tree().len(), 1 + 3 + 9 + 1 + 3);
    assert_eq!(with.tree().len(), 1 + 3 + 9 + 1);
    assert!(with.tree().len() < without.tree().len());
    assert!(with.transposition_stats().hits >= 3);
    assert!(linked.iter().all(|id| with.tree().get(*id).unwrap().depth == 2));
}
