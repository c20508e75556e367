use crate::domain::card::{Card, CardId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A named, ordered column holding cards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub order: i64,
    #[serde(default)]
    pub cards: Vec<Card>,
}

impl Stage {
    pub fn new(id: impl Into<String>, name: impl Into<String>, order: i64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            order,
            cards: Vec::new(),
        }
    }

    pub fn with_cards(mut self, cards: Vec<Card>) -> Self {
        self.cards = cards;
        self
    }

    /// Position of a card within this stage's card list
    pub fn position_of(&self, card_id: &CardId) -> Option<usize> {
        self.cards.iter().position(|card| &card.id == card_id)
    }

    /// Sets every card's `order` to its position in the list
    pub fn renumber(&mut self) {
        for (index, card) in self.cards.iter_mut().enumerate() {
            card.order = index as i64;
        }
    }
}

/// Kanban board state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub stages: Vec<Stage>,
}

impl Board {
    pub fn new(stages: Vec<Stage>) -> Self {
        Self { stages }
    }

    /// Parses a board from its persisted JSON form
    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes the board to its persisted JSON form
    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn stage(&self, stage_id: &str) -> Option<&Stage> {
        self.stages.iter().find(|stage| stage.id == stage_id)
    }

    /// Finds a card anywhere on the board
    pub fn find_card(&self, card_id: &CardId) -> Option<&Card> {
        self.stages
            .iter()
            .flat_map(|stage| stage.cards.iter())
            .find(|card| &card.id == card_id)
    }

    /// Gets the stage currently holding a card
    pub fn stage_of_card(&self, card_id: &CardId) -> Option<&Stage> {
        self.stages
            .iter()
            .find(|stage| stage.position_of(card_id).is_some())
    }

    pub fn card_count(&self) -> usize {
        self.stages.iter().map(|stage| stage.cards.len()).sum()
    }

    /// Checks structural invariants: unique stage ids and card ids unique
    /// across the whole board. Returns a description of the first violation.
    pub fn validate(&self) -> Result<(), String> {
        let mut stage_ids = HashSet::new();
        let mut card_ids = HashSet::new();

        for stage in &self.stages {
            if !stage_ids.insert(stage.id.as_str()) {
                return Err(format!("duplicate stage id '{}'", stage.id));
            }
            for card in &stage.cards {
                if !card_ids.insert(card.id.as_str()) {
                    return Err(format!("duplicate card id '{}'", card.id));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_board() -> Board {
        Board::new(vec![
            Stage::new("todo", "To Do", 0).with_cards(vec![
                Card::new(CardId::new("c1"), "First", 0),
                Card::new(CardId::new("c2"), "Second", 1),
            ]),
            Stage::new("done", "Done", 1).with_cards(vec![Card::new(CardId::new("c3"), "Third", 0)]),
        ])
    }

    #[test]
    fn test_board_lookup() {
        let board = sample_board();

        assert_eq!(board.stage("done").map(|s| s.name.as_str()), Some("Done"));
        assert!(board.stage("missing").is_none());

        let card = board.find_card(&CardId::new("c3")).unwrap();
        assert_eq!(card.title, "Third");

        let stage = board.stage_of_card(&CardId::new("c2")).unwrap();
        assert_eq!(stage.id, "todo");
        assert!(board.stage_of_card(&CardId::new("nope")).is_none());

        assert_eq!(board.card_count(), 3);
    }

    #[test]
    fn test_stage_renumber() {
        let mut stage = Stage::new("s1", "S1", 0).with_cards(vec![
            Card::new(CardId::new("a"), "A", 7),
            Card::new(CardId::new("b"), "B", 3),
        ]);
        stage.renumber();
        let orders: Vec<i64> = stage.cards.iter().map(|c| c.order).collect();
        assert_eq!(orders, vec![0, 1]);
    }

    #[test]
    fn test_board_json_shape() {
        let board = sample_board();
        let json = board.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["stages"][0]["id"], "todo");
        assert_eq!(value["stages"][0]["cards"][1]["id"], "c2");
        assert_eq!(value["stages"][0]["cards"][1]["dueDate"], "");

        let parsed = Board::from_json(&json).unwrap();
        assert_eq!(parsed, board);
    }

    #[test]
    fn test_from_json_rejects_malformed() {
        assert!(Board::from_json("not json").is_err());
        assert!(Board::from_json(r#"{"stages": "nope"}"#).is_err());
        assert!(Board::from_json(r#"{"stages": [{"name": "no id"}]}"#).is_err());
    }

    #[test]
    fn test_validate_detects_duplicates() {
        assert!(sample_board().validate().is_ok());

        let mut dup_stage = sample_board();
        dup_stage.stages.push(Stage::new("todo", "Again", 2));
        assert!(dup_stage.validate().unwrap_err().contains("stage id 'todo'"));

        let mut dup_card = sample_board();
        dup_card.stages[1]
            .cards
            .push(Card::new(CardId::new("c1"), "Clone", 1));
        assert!(dup_card.validate().unwrap_err().contains("card id 'c1'"));
    }
}
