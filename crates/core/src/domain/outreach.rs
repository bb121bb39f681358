use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Number of outreach emails tracked per prospect.
pub const EMAIL_SLOTS: usize = 3;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutreachState {
    #[default]
    NotSent,
    Sent,
    Opened,
    Clicked,
    Replied,
}

impl OutreachState {
    pub const ALL: [Self; 5] =
        [Self::NotSent, Self::Sent, Self::Opened, Self::Clicked, Self::Replied];

    pub fn label(self) -> &'static str {
        match self {
            Self::NotSent => "",
            Self::Sent => "Sent",
            Self::Opened => "Opened",
            Self::Clicked => "Clicked",
            Self::Replied => "Replied",
        }
    }

    /// Any state past `NotSent` means the email was dispatched, whatever happened afterwards.
    pub fn is_dispatched(self) -> bool {
        !matches!(self, Self::NotSent)
    }

    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::NotSent, Self::Sent)
                | (Self::Sent, Self::Opened)
                | (Self::Sent, Self::Clicked)
                | (Self::Sent, Self::Replied)
                | (Self::Opened, Self::Clicked)
                | (Self::Opened, Self::Replied)
                | (Self::Clicked, Self::Replied)
        )
    }
}

impl fmt::Display for OutreachState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotSent => f.write_str("Not Sent"),
            other => f.write_str(other.label()),
        }
    }
}

impl FromStr for OutreachState {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "not sent" => Ok(Self::NotSent),
            "sent" => Ok(Self::Sent),
            "opened" => Ok(Self::Opened),
            "clicked" => Ok(Self::Clicked),
            "replied" => Ok(Self::Replied),
            _ => Err(DomainError::UnknownLabel { field: "email status", value: value.to_string() }),
        }
    }
}

/// One outreach email. A slot is either unsent (no date) or dispatched on a date and tracked
/// through [`OutreachState`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailSlot {
    sent_on: Option<NaiveDate>,
    state: OutreachState,
}

impl EmailSlot {
    pub fn unsent() -> Self {
        Self::default()
    }

    pub fn sent(on: NaiveDate, state: OutreachState) -> Self {
        Self::from_parts(Some(on), state)
    }

    /// Builds a slot from loosely-related stored fields. A status without a date, or a date
    /// without a status, is treated as not sent.
    pub fn from_parts(sent_on: Option<NaiveDate>, state: OutreachState) -> Self {
        match sent_on {
            Some(date) if state.is_dispatched() => Self { sent_on: Some(date), state },
            _ => Self::unsent(),
        }
    }

    pub fn sent_on(&self) -> Option<NaiveDate> {
        self.sent_on
    }

    pub fn state(&self) -> OutreachState {
        self.state
    }

    pub fn is_dispatched(&self) -> bool {
        self.state.is_dispatched()
    }

    pub fn dispatch(&mut self, on: NaiveDate) -> Result<(), DomainError> {
        if !self.state.can_transition_to(OutreachState::Sent) {
            return Err(DomainError::InvalidOutreachTransition {
                from: self.state,
                to: OutreachState::Sent,
            });
        }
        self.state = OutreachState::Sent;
        self.sent_on = Some(on);
        Ok(())
    }

    /// Moves a dispatched slot forward. Sending goes through [`EmailSlot::dispatch`] so the
    /// slot always carries its date.
    pub fn advance(&mut self, next: OutreachState) -> Result<(), DomainError> {
        if next == OutreachState::Sent || !self.state.can_transition_to(next) {
            return Err(DomainError::InvalidOutreachTransition { from: self.state, to: next });
        }
        self.state = next;
        Ok(())
    }
}
