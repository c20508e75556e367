use crate::{
    domain::board::{Board, Stage},
    error::KanbanError,
};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// How to combine a locally persisted board with a newer baseline
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReconcileStrategy {
    /// Take the baseline verbatim, discarding local cards
    ReplaceAll,
    /// Keep local stages and cards, take stage names and order from the baseline
    UpdateColumnNames,
    /// Baseline stage structure, local cards
    #[default]
    SmartMerge,
    /// Keep the local board as is
    KeepCurrent,
}

impl ReconcileStrategy {
    pub const ALL: [ReconcileStrategy; 4] = [
        Self::SmartMerge,
        Self::UpdateColumnNames,
        Self::ReplaceAll,
        Self::KeepCurrent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReplaceAll => "replaceAll",
            Self::UpdateColumnNames => "updateColumnNames",
            Self::SmartMerge => "smartMerge",
            Self::KeepCurrent => "keepCurrent",
        }
    }
}

impl fmt::Display for ReconcileStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReconcileStrategy {
    type Err = KanbanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_'))
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "replaceall" => Ok(Self::ReplaceAll),
            "updatecolumnnames" => Ok(Self::UpdateColumnNames),
            "smartmerge" => Ok(Self::SmartMerge),
            "keepcurrent" => Ok(Self::KeepCurrent),
            _ => Err(KanbanError::UnknownStrategy(s.to_string())),
        }
    }
}

/// Produces the reconciled board. Stages are matched by id.
pub fn apply_strategy(strategy: ReconcileStrategy, persisted: &Board, baseline: &Board) -> Board {
    match strategy {
        ReconcileStrategy::ReplaceAll => baseline.clone(),
        ReconcileStrategy::UpdateColumnNames => update_column_names(persisted, baseline),
        ReconcileStrategy::SmartMerge => smart_merge(persisted, baseline),
        ReconcileStrategy::KeepCurrent => persisted.clone(),
    }
}

// Baseline-only stages are not added.
fn update_column_names(persisted: &Board, baseline: &Board) -> Board {
    let stages = persisted
        .stages
        .iter()
        .map(|stage| match baseline.stage(&stage.id) {
            Some(configured) => Stage {
                name: configured.name.clone(),
                order: configured.order,
                ..stage.clone()
            },
            None => stage.clone(),
        })
        .collect();
    Board::new(stages)
}

// Persisted-only stages are dropped.
fn smart_merge(persisted: &Board, baseline: &Board) -> Board {
    let stages = baseline
        .stages
        .iter()
        .map(|configured| match persisted.stage(&configured.id) {
            Some(saved) => Stage {
                cards: saved.cards.clone(),
                ..configured.clone()
            },
            None => configured.clone(),
        })
        .collect();
    Board::new(stages)
}
