//! Pure board transformations for user intents.
//!
//! Every function takes the current board by reference and returns a new
//! board. Intents that reference unknown stages or cards, or carry blank
//! text, return an unchanged copy.

use crate::domain::{
    board::Board,
    card::{Card, CardId, CardUpdate},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One end of a drag: a stage and a position within its card list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropLocation {
    pub stage_id: String,
    pub index: usize,
}

impl DropLocation {
    pub fn new(stage_id: impl Into<String>, index: usize) -> Self {
        Self {
            stage_id: stage_id.into(),
            index,
        }
    }
}

/// Appends a new card with a generated id to the end of a stage
pub fn add_card(board: &Board, stage_id: &str, title: &str) -> Board {
    add_card_with_id(board, stage_id, title, CardId::generate())
}

/// Same as [`add_card`] with a caller-chosen id
pub fn add_card_with_id(board: &Board, stage_id: &str, title: &str, id: CardId) -> Board {
    let title = title.trim();
    if title.is_empty() {
        debug!(stage_id, "ignoring add with blank title");
        return board.clone();
    }

    let Some(stage_idx) = board.stages.iter().position(|stage| stage.id == stage_id) else {
        debug!(stage_id, "ignoring add to unknown stage");
        return board.clone();
    };

    let mut next = board.clone();
    let stage = &mut next.stages[stage_idx];
    let order = stage.cards.len() as i64;
    stage.cards.push(Card::new(id, title, order));
    next
}

/// Moves a card between (or within) stages and renumbers both stages.
///
/// The card is located by id in the source stage; `destination.index` is
/// clamped to the destination list length after removal.
pub fn move_card(
    board: &Board,
    source: &DropLocation,
    destination: &DropLocation,
    card_id: &CardId,
) -> Board {
    let Some(source_idx) = board
        .stages
        .iter()
        .position(|stage| stage.id == source.stage_id)
    else {
        debug!(stage_id = %source.stage_id, "ignoring move from unknown stage");
        return board.clone();
    };
    let Some(destination_idx) = board
        .stages
        .iter()
        .position(|stage| stage.id == destination.stage_id)
    else {
        debug!(stage_id = %destination.stage_id, "ignoring move to unknown stage");
        return board.clone();
    };
    let Some(card_pos) = board.stages[source_idx].position_of(card_id) else {
        debug!(%card_id, stage_id = %source.stage_id, "ignoring move of card not in source stage");
        return board.clone();
    };

    let mut next = board.clone();
    let card = next.stages[source_idx].cards.remove(card_pos);

    let destination_cards = &mut next.stages[destination_idx].cards;
    let at = destination.index.min(destination_cards.len());
    destination_cards.insert(at, card);

    next.stages[source_idx].renumber();
    next.stages[destination_idx].renumber();
    next
}

/// Shallow-merges `updates` onto the card with the given id
pub fn edit_card(board: &Board, card_id: &CardId, updates: &CardUpdate) -> Board {
    let mut next = board.clone();
    for stage in &mut next.stages {
        if let Some(card) = stage.cards.iter_mut().find(|card| &card.id == card_id) {
            *card = updates.apply_to(card);
            return next;
        }
    }
    debug!(%card_id, "ignoring edit of unknown card");
    next
}

/// Removes a card. Sibling `order` values are left as they are.
pub fn delete_card(board: &Board, card_id: &CardId) -> Board {
    let mut next = board.clone();
    for stage in &mut next.stages {
        if let Some(pos) = stage.position_of(card_id) {
            stage.cards.remove(pos);
            return next;
        }
    }
    debug!(%card_id, "ignoring delete of unknown card");
    next
}

/// Renames a stage
pub fn edit_column(board: &Board, stage_id: &str, new_name: &str) -> Board {
    let mut next = board.clone();
    if new_name.trim().is_empty() {
        debug!(stage_id, "ignoring rename to blank name");
        return next;
    }
    match next.stages.iter_mut().find(|stage| stage.id == stage_id) {
        Some(stage) => stage.name = new_name.to_string(),
        None => debug!(stage_id, "ignoring rename of unknown stage"),
    }
    next
}
