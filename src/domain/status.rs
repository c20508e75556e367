//! Derived member status, badges, urgency and alerts.
//!
//! Nothing here is stored on the card; everything is recomputed from the
//! card's dates and the caller-supplied `now`.

use crate::domain::{
    card::Card,
    dates::{days_since, days_until, format_short, parse_date},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Membership lifecycle status.
///
/// Only `Registration`, `Active`, `PendingRenewal` and `Inactive` are ever
/// derived; the others can still appear as stored statuses on legacy cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MemberStatus {
    Registration,
    PendingPayment,
    PendingActivation,
    Active,
    PendingRenewal,
    RenewalPending,
    Inactive,
    AtRisk,
}

impl MemberStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Registration => "registration",
            Self::PendingPayment => "pending-payment",
            Self::PendingActivation => "pending-activation",
            Self::Active => "active",
            Self::PendingRenewal => "pending-renewal",
            Self::RenewalPending => "renewal-pending",
            Self::Inactive => "inactive",
            Self::AtRisk => "at-risk",
        }
    }

    /// Stage id a member with this status belongs in
    pub fn stage_id(&self) -> &'static str {
        match self {
            Self::Registration | Self::PendingPayment | Self::PendingActivation => "registration",
            Self::Active => "active",
            Self::PendingRenewal | Self::RenewalPending => "pending-renewal",
            Self::Inactive | Self::AtRisk => "inactive",
        }
    }
}

impl fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemberStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "registration" => Ok(Self::Registration),
            "pending-payment" => Ok(Self::PendingPayment),
            "pending-activation" => Ok(Self::PendingActivation),
            "active" => Ok(Self::Active),
            "pending-renewal" => Ok(Self::PendingRenewal),
            "renewal-pending" => Ok(Self::RenewalPending),
            "inactive" => Ok(Self::Inactive),
            "at-risk" => Ok(Self::AtRisk),
            _ => Err(format!("Invalid member status '{}'", s)),
        }
    }
}

/// Days until renewal at or below which a member is pending renewal
pub const RENEWAL_WINDOW_DAYS: i64 = 14;
/// Days since last check-in above which a member is inactive
pub const INACTIVE_AFTER_DAYS: i64 = 30;
/// Days until renewal at or below which an urgent alert is raised
pub const URGENT_RENEWAL_DAYS: i64 = 7;
/// Days since last check-in above which a warning is raised
pub const WARN_AFTER_DAYS: i64 = 14;

/// Derives the member's lifecycle status at `now`
pub fn calculate_status(card: &Card, now: DateTime<Utc>) -> MemberStatus {
    let Some(last_check_in) = card.last_check_in() else {
        return MemberStatus::Registration;
    };

    if let Some(days) = renewal_days(card, now) {
        if (0..=RENEWAL_WINDOW_DAYS).contains(&days) {
            return MemberStatus::PendingRenewal;
        }
        if days < 0 {
            return MemberStatus::Inactive;
        }
    }

    match parse_date(last_check_in).map(|date| days_since(date, now)) {
        Some(days) if days > INACTIVE_AFTER_DAYS => MemberStatus::Inactive,
        _ => MemberStatus::Active,
    }
}

/// Stage id the card's derived status maps to
pub fn member_stage(card: &Card, now: DateTime<Utc>) -> &'static str {
    calculate_status(card, now).stage_id()
}

fn renewal_days(card: &Card, now: DateTime<Utc>) -> Option<i64> {
    card.renewal_date()
        .and_then(parse_date)
        .map(|date| days_until(date, now))
}

/// Colour family a badge is drawn in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeTone {
    Blue,
    Yellow,
    Green,
    Orange,
    Red,
    Purple,
    Indigo,
    Pink,
    Cyan,
    Gray,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusBadge {
    pub label: &'static str,
    pub tone: BadgeTone,
}

/// Badge for a status name; unrecognised names get a gray "Unknown" badge
pub fn status_badge(status: &str) -> StatusBadge {
    let (label, tone) = match MemberStatus::from_str(status) {
        Ok(MemberStatus::Registration) => ("New", BadgeTone::Blue),
        Ok(MemberStatus::PendingPayment) => ("Payment Pending", BadgeTone::Yellow),
        Ok(MemberStatus::PendingActivation) => ("Activating", BadgeTone::Blue),
        Ok(MemberStatus::Active) => ("Active", BadgeTone::Green),
        Ok(MemberStatus::PendingRenewal | MemberStatus::RenewalPending) => {
            ("Renewal Due", BadgeTone::Orange)
        }
        Ok(MemberStatus::Inactive) => ("Inactive", BadgeTone::Red),
        Ok(MemberStatus::AtRisk) => ("At Risk", BadgeTone::Red),
        Err(_) => ("Unknown", BadgeTone::Gray),
    };
    StatusBadge { label, tone }
}

/// Badge tone for a membership type
pub fn membership_badge(membership_type: Option<&str>) -> BadgeTone {
    match membership_type {
        Some("Premium") => BadgeTone::Purple,
        Some("PT Package") => BadgeTone::Indigo,
        Some("Family") => BadgeTone::Pink,
        Some("Student") => BadgeTone::Cyan,
        _ => BadgeTone::Gray,
    }
}

/// How close a renewal date is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Expired,
    Critical,
    Urgent,
    Warning,
    Normal,
    None,
}

/// Classifies whole days until a due date. Boundaries fall in the more urgent band.
pub fn classify_urgency(days_until_due: i64) -> Urgency {
    match days_until_due {
        d if d < 0 => Urgency::Expired,
        0 | 1 => Urgency::Critical,
        d if d <= 7 => Urgency::Urgent,
        d if d <= 14 => Urgency::Warning,
        _ => Urgency::Normal,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenewalNotice {
    pub text: String,
    pub urgency: Urgency,
    pub days: Option<i64>,
}

/// Renewal text and urgency for display next to a card
pub fn renewal_notice(card: &Card, now: DateTime<Utc>) -> RenewalNotice {
    let Some(raw) = card.renewal_date() else {
        return RenewalNotice {
            text: "No renewal date".to_string(),
            urgency: Urgency::None,
            days: None,
        };
    };
    let Some(date) = parse_date(raw) else {
        return RenewalNotice {
            text: "Invalid date".to_string(),
            urgency: Urgency::None,
            days: None,
        };
    };

    let days = days_until(date, now);
    let urgency = classify_urgency(days);
    let text = match days {
        d if d < 0 => format!("Expired {} days ago", d.abs()),
        0 => "Expires today!".to_string(),
        1 => "Expires tomorrow!".to_string(),
        d if d <= 14 => format!("Expires in {d} days"),
        _ => format_short(date),
    };

    RenewalNotice {
        text,
        urgency,
        days: Some(days),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Urgent,
    Expired,
    Inactive,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberAlert {
    pub kind: AlertKind,
    pub message: String,
    pub action: &'static str,
}

/// The single most pressing alert for a member, renewal before activity
pub fn derive_alert(card: &Card, now: DateTime<Utc>) -> Option<MemberAlert> {
    if let Some(days) = renewal_days(card, now) {
        if (0..=URGENT_RENEWAL_DAYS).contains(&days) {
            let plural = if days == 1 { "" } else { "s" };
            return Some(MemberAlert {
                kind: AlertKind::Urgent,
                message: format!("Renewal in {days} day{plural}"),
                action: "Send reminder",
            });
        }
        if days < 0 {
            return Some(MemberAlert {
                kind: AlertKind::Expired,
                message: "Membership expired".to_string(),
                action: "Contact member",
            });
        }
    }

    let days = days_since(card.last_check_in().and_then(parse_date)?, now);
    if days > INACTIVE_AFTER_DAYS {
        Some(MemberAlert {
            kind: AlertKind::Inactive,
            message: format!("No check-in for {days} days"),
            action: "Engagement outreach",
        })
    } else if days > WARN_AFTER_DAYS {
        Some(MemberAlert {
            kind: AlertKind::Warning,
            message: format!("Last seen {days} days ago"),
            action: "Check-in reminder",
        })
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngagementLevel {
    High,
    Medium,
    Low,
    Unknown,
}

/// Engagement from average monthly check-ins since joining
pub fn engagement_level(card: &Card, now: DateTime<Utc>) -> EngagementLevel {
    let (Some(count), Some(joined)) = (card.check_in_count(), card.join_date().and_then(parse_date))
    else {
        return EngagementLevel::Unknown;
    };

    let months = days_since(joined, now).div_euclid(30).max(1);
    let per_month = count as f64 / months as f64;

    if per_month >= 12.0 {
        EngagementLevel::High
    } else if per_month >= 8.0 {
        EngagementLevel::Medium
    } else {
        EngagementLevel::Low
    }
}
