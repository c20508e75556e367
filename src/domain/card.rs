use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{fmt, str::FromStr};
use tracing::debug;
use uuid::Uuid;

/// Unique identifier for a card, unique across the whole board
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(String);

impl CardId {
    /// Wraps an existing identifier without validation
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh random identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for CardId {
    type Err = crate::error::KanbanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(crate::error::KanbanError::InvalidCardId(s.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A card on the board.
///
/// The generic fields are typed; anything else a board variant stores on its
/// cards (member check-ins, renewal dates, ...) lives in `extra` and is written
/// back out verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: CardId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub due_date: String,
    #[serde(default)]
    pub progress: String,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub order: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Card {
    /// Creates a card with every optional field empty
    pub fn new(id: CardId, title: impl Into<String>, order: i64) -> Self {
        Self {
            id,
            title: title.into(),
            description: String::new(),
            due_date: String::new(),
            progress: String::new(),
            labels: Vec::new(),
            order,
            extra: Map::new(),
        }
    }

    /// Sets a field by its JSON name
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.assign(key.into(), value.into());
        self
    }

    /// Writes `value` under its JSON name. Typed fields take the value only
    /// when it has the right shape; `id` is never reassigned.
    pub fn assign(&mut self, key: String, value: Value) {
        match TypedField::from_key(&key) {
            Some(field) => field.write(self, value),
            None => {
                self.extra.insert(key, value);
            }
        }
    }

    fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
    }

    /// Last recorded activity (a member's last check-in)
    pub fn last_check_in(&self) -> Option<&str> {
        self.extra_str("lastCheckIn")
    }

    /// Renewal date, falling back to the generic due date
    pub fn renewal_date(&self) -> Option<&str> {
        self.extra_str("renewalDate").or_else(|| {
            if self.due_date.trim().is_empty() {
                None
            } else {
                Some(self.due_date.as_str())
            }
        })
    }

    pub fn membership_type(&self) -> Option<&str> {
        self.extra_str("membershipType")
    }

    pub fn join_date(&self) -> Option<&str> {
        self.extra_str("joinDate")
    }

    /// Total check-ins; zero counts as missing
    pub fn check_in_count(&self) -> Option<u64> {
        self.extra
            .get("checkInCount")
            .and_then(Value::as_u64)
            .filter(|count| *count > 0)
    }
}

/// Partial update for a card. Fields left as `None` are untouched; entries in
/// `extra` overwrite the card's domain-specific fields key by key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CardUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CardUpdate {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn labels(mut self, labels: Vec<String>) -> Self {
        self.labels = Some(labels);
        self
    }

    /// Sets a field by its JSON name, routing the generic card fields to
    /// their typed slots
    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        let value = value.into();
        match TypedField::from_key(&key) {
            Some(TypedField::Id) => debug!("ignoring id in card update"),
            Some(TypedField::Title) => self.title = string_value(value),
            Some(TypedField::Description) => self.description = string_value(value),
            Some(TypedField::DueDate) => self.due_date = string_value(value),
            Some(TypedField::Progress) => self.progress = string_value(value),
            Some(TypedField::Labels) => self.labels = labels_value(value),
            Some(TypedField::Order) => self.order = value.as_i64(),
            None => {
                self.extra.insert(key, value);
            }
        }
        self
    }

    /// Shallow-merges this update onto `card`. The card id is never changed.
    pub fn apply_to(&self, card: &Card) -> Card {
        let mut updated = card.clone();
        if let Some(title) = &self.title {
            updated.title = title.clone();
        }
        if let Some(description) = &self.description {
            updated.description = description.clone();
        }
        if let Some(due_date) = &self.due_date {
            updated.due_date = due_date.clone();
        }
        if let Some(progress) = &self.progress {
            updated.progress = progress.clone();
        }
        if let Some(labels) = &self.labels {
            updated.labels = labels.clone();
        }
        if let Some(order) = self.order {
            updated.order = order;
        }
        for (key, value) in &self.extra {
            updated.assign(key.clone(), value.clone());
        }
        updated
    }
}

/// Card fields that serialize under a fixed name and must not land in `extra`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypedField {
    Id,
    Title,
    Description,
    DueDate,
    Progress,
    Labels,
    Order,
}

impl TypedField {
    fn from_key(key: &str) -> Option<Self> {
        match key {
            "id" => Some(Self::Id),
            "title" => Some(Self::Title),
            "description" => Some(Self::Description),
            "dueDate" => Some(Self::DueDate),
            "progress" => Some(Self::Progress),
            "labels" => Some(Self::Labels),
            "order" => Some(Self::Order),
            _ => None,
        }
    }

    fn write(self, card: &mut Card, value: Value) {
        let applied = match self {
            Self::Id => {
                debug!(card_id = %card.id, "ignoring id in card fields");
                return;
            }
            Self::Title => string_value(value).map(|v| card.title = v).is_some(),
            Self::Description => string_value(value).map(|v| card.description = v).is_some(),
            Self::DueDate => string_value(value).map(|v| card.due_date = v).is_some(),
            Self::Progress => string_value(value).map(|v| card.progress = v).is_some(),
            Self::Labels => labels_value(value).map(|v| card.labels = v).is_some(),
            Self::Order => value.as_i64().map(|v| card.order = v).is_some(),
        };
        if !applied {
            debug!(field = ?self, card_id = %card.id, "ignoring card field with wrong shape");
        }
    }
}

fn string_value(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        _ => None,
    }
}

fn labels_value(value: Value) -> Option<Vec<String>> {
    serde_json::from_value(value).ok()
}
