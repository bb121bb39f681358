use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::currency::DealValue;
use crate::domain::outreach::{EmailSlot, OutreachState, EMAIL_SLOTS};
use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProspectId(pub u64);

impl fmt::Display for ProspectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeadStatus {
    #[default]
    New,
    Contacted,
    Opened,
    Replied,
    Qualified,
    #[serde(rename = "Not Interested")]
    NotInterested,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DealStage {
    Prospecting,
    #[serde(rename = "Meeting Scheduled")]
    MeetingScheduled,
    #[serde(rename = "Proposal Sent")]
    ProposalSent,
    Negotiation,
    #[serde(rename = "Closed Won")]
    ClosedWon,
    #[serde(rename = "Closed Lost")]
    ClosedLost,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// Lead score in `0..=100`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct LeadScore(u8);

impl LeadScore {
    pub const MAX: u8 = 100;

    pub fn new(value: i64) -> Result<Self, DomainError> {
        u8::try_from(value)
            .ok()
            .filter(|score| *score <= Self::MAX)
            .map(Self)
            .ok_or(DomainError::LeadScoreOutOfRange(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for LeadScore {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<LeadScore> for u8 {
    fn from(score: LeadScore) -> Self {
        score.0
    }
}

impl fmt::Display for LeadScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

macro_rules! labelled_enum {
    ($ty:ident, $field:literal, { $($variant:ident => $label:literal),+ $(,)? }) => {
        impl $ty {
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            pub fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $ty {
            type Err = DomainError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                let wanted = value.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|candidate| candidate.label().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| DomainError::UnknownLabel {
                        field: $field,
                        value: value.to_string(),
                    })
            }
        }
    };
}

labelled_enum!(LeadStatus, "lead status", {
    New => "New",
    Contacted => "Contacted",
    Opened => "Opened",
    Replied => "Replied",
    Qualified => "Qualified",
    NotInterested => "Not Interested",
});

labelled_enum!(DealStage, "deal stage", {
    Prospecting => "Prospecting",
    MeetingScheduled => "Meeting Scheduled",
    ProposalSent => "Proposal Sent",
    Negotiation => "Negotiation",
    ClosedWon => "Closed Won",
    ClosedLost => "Closed Lost",
});

labelled_enum!(Priority, "priority", {
    High => "High",
    Medium => "Medium",
    Low => "Low",
});

/// One sales lead.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prospect {
    pub id: ProspectId,
    pub name: String,
    pub title: String,
    pub company: String,
    pub industry: String,
    pub company_size: String,
    pub location: String,
    pub email: String,
    pub phone: String,
    pub linkedin_url: String,
    pub website: String,
    pub source: String,
    pub owner: String,
    pub lead_status: LeadStatus,
    pub deal_stage: Option<DealStage>,
    pub priority: Option<Priority>,
    pub deal_value: DealValue,
    /// Text of a stored deal value that did not parse, such as "TBD" or "$100K-$500K".
    pub deal_value_text: String,
    pub lead_score: LeadScore,
    pub emails: [EmailSlot; EMAIL_SLOTS],
    pub opened_emails: u32,
    pub replies: u32,
    pub date_added: Option<NaiveDate>,
    pub call_date: Option<NaiveDate>,
    pub last_contact: Option<NaiveDate>,
    pub next_follow_up: Option<NaiveDate>,
    pub pain_points: String,
    pub solution_interest: String,
    pub notes: String,
    pub employee_count: String,
    pub revenue: String,
    pub budget: String,
}

impl Prospect {
    pub fn new(id: ProspectId, name: impl Into<String>, company: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            title: String::new(),
            company: company.into(),
            industry: String::new(),
            company_size: String::new(),
            location: String::new(),
            email: String::new(),
            phone: String::new(),
            linkedin_url: String::new(),
            website: String::new(),
            source: String::new(),
            owner: String::new(),
            lead_status: LeadStatus::New,
            deal_stage: Some(DealStage::Prospecting),
            priority: None,
            deal_value: DealValue::Unknown,
            deal_value_text: String::new(),
            lead_score: LeadScore::default(),
            emails: [EmailSlot::unsent(); EMAIL_SLOTS],
            opened_emails: 0,
            replies: 0,
            date_added: None,
            call_date: None,
            last_contact: None,
            next_follow_up: None,
            pain_points: String::new(),
            solution_interest: String::new(),
            notes: String::new(),
            employee_count: String::new(),
            revenue: String::new(),
            budget: String::new(),
        }
    }

    pub fn is_contacted(&self) -> bool {
        self.lead_status != LeadStatus::New
    }

    pub fn is_in_stage(&self, stage: DealStage) -> bool {
        self.deal_stage == Some(stage)
    }

    /// Slot by its 1-based number, as shown to users ("Email 2").
    pub fn email(&self, number: usize) -> Result<&EmailSlot, DomainError> {
        number
            .checked_sub(1)
            .and_then(|index| self.emails.get(index))
            .ok_or(DomainError::EmailSlotOutOfRange { slot: number })
    }

    pub fn emails_dispatched(&self) -> usize {
        self.emails.iter().filter(|slot| slot.is_dispatched()).count()
    }

    /// Opens count once, replies twice.
    pub fn engagement_points(&self) -> u64 {
        u64::from(self.opened_emails) + 2 * u64::from(self.replies)
    }

    pub fn mark_contacted(&mut self) {
        if self.lead_status == LeadStatus::New {
            self.lead_status = LeadStatus::Contacted;
        }
    }

    /// Dispatches the first unused outreach email and returns its 1-based number.
    pub fn send_next_email(&mut self, on: NaiveDate) -> Result<usize, DomainError> {
        let index = self
            .emails
            .iter()
            .position(|slot| !slot.is_dispatched())
            .ok_or(DomainError::OutreachExhausted(self.id))?;
        self.emails[index].dispatch(on)?;
        self.mark_contacted();
        Ok(index + 1)
    }

    /// Records engagement on a dispatched email. The opened/reply counters are tracked
    /// separately and are not touched here.
    pub fn advance_email(&mut self, number: usize, next: OutreachState) -> Result<(), DomainError> {
        let index = number
            .checked_sub(1)
            .filter(|index| *index < EMAIL_SLOTS)
            .ok_or(DomainError::EmailSlotOutOfRange { slot: number })?;
        self.emails[index].advance(next)
    }

    pub fn append_note(&mut self, note: &str, on: NaiveDate) {
        let entry = format!("[{}] {}", on.format("%Y-%m-%d"), note.trim());
        if self.notes.is_empty() {
            self.notes = entry;
        } else {
            self.notes.push('\n');
            self.notes.push_str(&entry);
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{DealStage, LeadScore, LeadStatus, Priority, Prospect, ProspectId};
    use crate::domain::outreach::OutreachState;
    use crate::errors::DomainError;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, d).expect("valid date")
    }

    #[test]
    fn lead_score_rejects_values_outside_range() {
        assert_eq!(LeadScore::new(100).map(LeadScore::value), Ok(100));
        assert_eq!(LeadScore::new(0).map(LeadScore::value), Ok(0));
        assert_eq!(LeadScore::new(101), Err(DomainError::LeadScoreOutOfRange(101)));
        assert_eq!(LeadScore::new(-1), Err(DomainError::LeadScoreOutOfRange(-1)));
    }

    #[test]
    fn lead_score_deserialization_enforces_range() {
        assert!(serde_json::from_str::<LeadScore>("85").is_ok());
        assert!(serde_json::from_str::<LeadScore>("140").is_err());
    }

    #[test]
    fn labels_round_trip_through_from_str() {
        for stage in DealStage::ALL {
            assert_eq!(stage.label().parse::<DealStage>(), Ok(*stage));
        }
        assert_eq!("not interested".parse::<LeadStatus>(), Ok(LeadStatus::NotInterested));
        assert_eq!("HIGH".parse::<Priority>(), Ok(Priority::High));
        assert!(matches!(
            "Closed".parse::<DealStage>(),
            Err(DomainError::UnknownLabel { field: "deal stage", .. })
        ));
    }

    #[test]
    fn stages_serialize_with_display_labels() {
        let json = serde_json::to_string(&DealStage::MeetingScheduled).expect("serialize");
        assert_eq!(json, "\"Meeting Scheduled\"");
    }

    #[test]
    fn sending_fills_slots_in_order_and_marks_contacted() {
        let mut prospect = Prospect::new(ProspectId(7), "Jane Smith", "TechNova");

        assert_eq!(prospect.send_next_email(day(1)), Ok(1));
        assert_eq!(prospect.lead_status, LeadStatus::Contacted);
        assert_eq!(prospect.send_next_email(day(4)), Ok(2));
        assert_eq!(prospect.send_next_email(day(11)), Ok(3));
        assert_eq!(prospect.emails_dispatched(), 3);
        assert_eq!(
            prospect.send_next_email(day(12)),
            Err(DomainError::OutreachExhausted(ProspectId(7)))
        );
        assert_eq!(prospect.email(2).map(|slot| slot.sent_on()), Ok(Some(day(4))));
    }

    #[test]
    fn advancing_email_leaves_counters_alone() {
        let mut prospect = Prospect::new(ProspectId(1), "Mark Taylor", "RetailPro");
        prospect.send_next_email(day(2)).expect("send");
        prospect.advance_email(1, OutreachState::Opened).expect("open");

        assert_eq!(prospect.opened_emails, 0);
        assert_eq!(prospect.email(1).map(|slot| slot.state()), Ok(OutreachState::Opened));
        assert_eq!(
            prospect.advance_email(4, OutreachState::Opened),
            Err(DomainError::EmailSlotOutOfRange { slot: 4 })
        );
        assert!(prospect.email(0).is_err());
    }

    #[test]
    fn notes_are_appended_with_date_stamp() {
        let mut prospect = Prospect::new(ProspectId(3), "Sofia Martinez", "HealthWorks");
        prospect.append_note("Intro call booked", day(3));
        prospect.append_note(" Sent pricing ", day(9));

        assert_eq!(prospect.notes, "[2026-05-03] Intro call booked\n[2026-05-09] Sent pricing");
    }

    #[test]
    fn engagement_weights_replies_double() {
        let mut prospect = Prospect::new(ProspectId(6), "Michael Brown", "LogiCorp");
        prospect.opened_emails = 3;
        prospect.replies = 2;
        assert_eq!(prospect.engagement_points(), 7);
    }
}
