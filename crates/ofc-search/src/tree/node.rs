use core::fmt;
use ofc_core::{Card, Layout, Move};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node_{}", self.0)
    }
}

/// Two of the three dealt cards placed, the third thrown away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PineappleAction {
    pub placements: [Move; 2],
    pub discard: Card,
}

impl PineappleAction {
    pub fn apply(&self, layout: &Layout) -> Option<Layout> {
        let [first, second] = self.placements;
        layout
            .place_card(first.card, first.row)
            .and_then(|next| next.place_card(second.card, second.row))
            .ok()
    }
}

impl fmt::Display for PineappleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} x{}",
            self.placements[0], self.placements[1], self.discard
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameTreeNode {
    pub id: NodeId,
    pub depth: u32,
    pub layout: Layout,
    pub cards_placed: usize,
    /// The three cards dealt at this node, once it has been expanded.
    pub dealt: Option<[Card; 3]>,
    pub possible_actions: Vec<PineappleAction>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub is_terminal: bool,
    pub is_fouled: bool,
}

impl GameTreeNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_expanded(&self) -> bool {
        self.dealt.is_some()
    }
}

/// Edge between two nodes. Kept outside the nodes so that a transposed node
/// can have several incoming edges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeAction {
    pub from: NodeId,
    pub to: NodeId,
    pub action: PineappleAction,
    pub action_index: usize,
}

impl NodeAction {
    pub fn placed_cards(&self) -> [Card; 2] {
        [
            self.action.placements[0].card,
            self.action.placements[1].card,
        ]
    }

    pub fn discarded(&self) -> Card {
        self.action.discard
    }
}

#[cfg(test)]
mod tests {
    use super::{NodeId, PineappleAction};
    use ofc_core::model::parse_cards;
    use ofc_core::{Layout, Move, Row};

    #[test]
    fn node_id_displays_with_prefix() {
        assert_eq!(NodeId(7).to_string(), "node_7");
    }

    #[test]
    fn action_places_both_cards() {
        let cards = parse_cards("As Kd 2c").unwrap();
        let action = PineappleAction {
            placements: [Move::new(cards[0], Row::Top), Move::new(cards[1], Row::Bottom)],
            discard: cards[2],
        };
        let layout = action.apply(&Layout::new()).unwrap();
        assert_eq!(layout.top(), &cards[..1]);
        assert_eq!(layout.bottom(), &cards[1..2]);
        assert_eq!(action.to_string(), "As@top Kd@bottom x2c");
    }
}
