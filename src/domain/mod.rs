pub mod board;
pub mod card;
pub mod dates;
pub mod mutation;
pub mod sorting;
pub mod status;

pub use board::{Board, Stage};
pub use card::{Card, CardId, CardUpdate};
pub use dates::{format_date, membership_duration, DateFormat};
pub use mutation::{add_card, delete_card, edit_card, edit_column, move_card, DropLocation};
pub use sorting::{ordered_cards, ordered_stages, BoardStats};
pub use status::{calculate_status, classify_urgency, derive_alert, MemberStatus, Urgency};
