use crate::domain::board::{Board, Stage};
use crate::domain::card::Card;
use serde::Serialize;
use std::collections::BTreeMap;

/// Stages in display sequence.
///
/// Sorted by `order`; the sort is stable so stages sharing an `order` keep
/// their position in the board.
///
/// # Examples
/// ```
/// use kanban_sync_core::domain::{board::{Board, Stage}, sorting::ordered_stages};
///
/// let board = Board::new(vec![
///     Stage::new("done", "Done", 2),
///     Stage::new("todo", "To Do", 0),
/// ]);
///
/// let ids: Vec<&str> = ordered_stages(&board).iter().map(|s| s.id.as_str()).collect();
/// assert_eq!(ids, vec!["todo", "done"]);
/// ```
pub fn ordered_stages(board: &Board) -> Vec<&Stage> {
    let mut stages: Vec<&Stage> = board.stages.iter().collect();
    stages.sort_by_key(|stage| stage.order);
    stages
}

/// Cards of a stage in display sequence, by each card's own `order`
pub fn ordered_cards(stage: &Stage) -> Vec<&Card> {
    let mut cards: Vec<&Card> = stage.cards.iter().collect();
    cards.sort_by_key(|card| card.order);
    cards
}

/// Card counts for a board header
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BoardStats {
    pub total_cards: usize,
    pub per_stage: BTreeMap<String, usize>,
}

impl BoardStats {
    pub fn from_board(board: &Board) -> Self {
        let per_stage: BTreeMap<String, usize> = board
            .stages
            .iter()
            .map(|stage| (stage.id.clone(), stage.cards.len()))
            .collect();
        Self {
            total_cards: per_stage.values().sum(),
            per_stage,
        }
    }

    /// Cards in a stage; zero for unknown stages
    pub fn count_in(&self, stage_id: &str) -> usize {
        self.per_stage.get(stage_id).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::card::CardId;

    #[test]
    fn test_ordered_stages_stable_on_ties() {
        let board = Board::new(vec![
            Stage::new("b", "B", 1),
            Stage::new("a", "A", 0),
            Stage::new("c", "C", 1),
        ]);
        let ids: Vec<&str> = ordered_stages(&board).iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_ordered_cards() {
        let stage = Stage::new("s", "S", 0).with_cards(vec![
            Card::new(CardId::new("late"), "Late", 5),
            Card::new(CardId::new("early"), "Early", 0),
            Card::new(CardId::new("tie"), "Tie", 5),
        ]);
        let ids: Vec<&str> = ordered_cards(&stage).iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["early", "late", "tie"]);
    }

    #[test]
    fn test_board_stats() {
        let board = Board::new(vec![
            Stage::new("active", "Active", 0).with_cards(vec![
                Card::new(CardId::new("m1"), "One", 0),
                Card::new(CardId::new("m2"), "Two", 1),
            ]),
            Stage::new("pending-renewal", "Renewal", 1)
                .with_cards(vec![Card::new(CardId::new("m3"), "Three", 0)]),
            Stage::new("inactive", "Inactive", 2),
        ]);
        let stats = BoardStats::from_board(&board);

        assert_eq!(stats.total_cards, 3);
        assert_eq!(stats.count_in("active"), 2);
        assert_eq!(stats.count_in("pending-renewal"), 1);
        assert_eq!(stats.count_in("inactive"), 0);
        assert_eq!(stats.count_in("missing"), 0);
    }
}
