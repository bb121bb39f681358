//! Outreach campaigns: targeting, launching, email activity and follow-up sequences.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::{LeadStatus, OutreachState, Priority, Prospect, ProspectId};
use crate::errors::DomainError;

/// Audience of a campaign. Industries and priorities constrain only when non-empty.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignTarget {
    pub statuses: Vec<LeadStatus>,
    pub industries: Vec<String>,
    pub priorities: Vec<Priority>,
}

impl Default for CampaignTarget {
    fn default() -> Self {
        Self { statuses: vec![LeadStatus::New], industries: Vec::new(), priorities: Vec::new() }
    }
}

impl CampaignTarget {
    pub fn matches(&self, prospect: &Prospect) -> bool {
        self.statuses.contains(&prospect.lead_status)
            && (self.industries.is_empty() || self.industries.contains(&prospect.industry))
            && (self.priorities.is_empty()
                || prospect
                    .priority
                    .map(|priority| self.priorities.contains(&priority))
                    .unwrap_or(false))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchReport {
    pub targeted: usize,
    /// Prospect and the 1-based number of the email sent to them.
    pub sent: Vec<(ProspectId, usize)>,
    /// Targets whose outreach slots were all used already.
    pub exhausted: Vec<ProspectId>,
}

/// Sends the next outreach email to every prospect matching `target`. Targets still in `New`
/// move to `Contacted` even when no slot is left.
pub fn launch(
    table: &mut [Prospect],
    target: &CampaignTarget,
    on: NaiveDate,
) -> Result<LaunchReport, DomainError> {
    let mut report = LaunchReport::default();
    for prospect in table.iter_mut().filter(|prospect| target.matches(prospect)) {
        report.targeted += 1;
        match prospect.send_next_email(on) {
            Ok(number) => report.sent.push((prospect.id, number)),
            Err(DomainError::OutreachExhausted(id)) => {
                prospect.mark_contacted();
                report.exhausted.push(id);
            }
            Err(error) => return Err(error),
        }
    }
    Ok(report)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailActivity {
    pub email: usize,
    pub date: NaiveDate,
    pub state: OutreachState,
    pub prospect: String,
    pub industry: String,
}

/// Every dispatched email in table order.
pub fn email_activity(table: &[Prospect]) -> Vec<EmailActivity> {
    table
        .iter()
        .flat_map(|prospect| {
            prospect.emails.iter().enumerate().filter_map(move |(index, slot)| {
                Some(EmailActivity {
                    email: index + 1,
                    date: slot.sent_on()?,
                    state: slot.state(),
                    prospect: prospect.name.clone(),
                    industry: prospect.industry.clone(),
                })
            })
        })
        .collect()
}

/// Count of dispatched emails per outreach state, in state order, omitting empty states.
pub fn state_distribution(activity: &[EmailActivity]) -> Vec<(OutreachState, usize)> {
    OutreachState::ALL
        .iter()
        .map(|state| (*state, activity.iter().filter(|entry| entry.state == *state).count()))
        .filter(|(_, count)| *count > 0)
        .collect()
}

/// Days between consecutive sequence emails.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceDelays {
    pub first_follow_up_days: u32,
    pub second_follow_up_days: u32,
}

impl Default for SequenceDelays {
    fn default() -> Self {
        Self { first_follow_up_days: 3, second_follow_up_days: 7 }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveSequence {
    pub id: ProspectId,
    pub name: String,
    pub company: String,
    pub lead_status: LeadStatus,
    pub next_email: usize,
    pub next_due: Option<NaiveDate>,
}

/// Prospects whose first email went out without engagement beyond an open, and whose final
/// email is still unsent.
pub fn active_sequences(table: &[Prospect], delays: SequenceDelays) -> Vec<ActiveSequence> {
    table
        .iter()
        .filter(|prospect| {
            matches!(prospect.emails[0].state(), OutreachState::Sent | OutreachState::Opened)
                && !prospect.emails[2].is_dispatched()
        })
        .map(|prospect| {
            let (next_email, previous, delay) = if prospect.emails[1].is_dispatched() {
                (3, prospect.emails[1].sent_on(), delays.second_follow_up_days)
            } else {
                (2, prospect.emails[0].sent_on(), delays.first_follow_up_days)
            };
            ActiveSequence {
                id: prospect.id,
                name: prospect.name.clone(),
                company: prospect.company.clone(),
                lead_status: prospect.lead_status,
                next_email,
                next_due: previous.map(|date| date + Duration::days(i64::from(delay))),
            }
        })
        .collect()
}
