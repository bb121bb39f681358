//! Calendar, task list and reminders derived from prospect dates.

use std::cmp::Ordering;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::{DealStage, LeadStatus, Priority, Prospect};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    Email(usize),
    CallDemo,
    FollowUp,
}

impl EventKind {
    pub fn label(self) -> String {
        match self {
            Self::Email(number) => format!("Email {number}"),
            Self::CallDemo => "Call/Demo".to_string(),
            Self::FollowUp => "Follow-up".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub date: NaiveDate,
    pub kind: EventKind,
    pub prospect: String,
    pub company: String,
    pub status: String,
    pub priority: Option<Priority>,
    pub owner: String,
}

/// Dated activity between `from` and `to` inclusive, ordered by date. `owners`, when not empty,
/// restricts events to those reps.
pub fn calendar_events(
    table: &[Prospect],
    from: NaiveDate,
    to: NaiveDate,
    owners: &[String],
) -> Vec<CalendarEvent> {
    let mut events = Vec::new();
    for prospect in table {
        if !owners.is_empty() && !owners.contains(&prospect.owner) {
            continue;
        }
        let mut push = |date: Option<NaiveDate>, kind: EventKind, status: &str| {
            if let Some(date) = date.filter(|date| (from..=to).contains(date)) {
                events.push(CalendarEvent {
                    date,
                    kind,
                    prospect: prospect.name.clone(),
                    company: prospect.company.clone(),
                    status: status.to_string(),
                    priority: prospect.priority,
                    owner: prospect.owner.clone(),
                });
            }
        };
        for (index, slot) in prospect.emails.iter().enumerate() {
            push(slot.sent_on(), EventKind::Email(index + 1), slot.state().label());
        }
        push(prospect.call_date, EventKind::CallDemo, "Scheduled");
        push(prospect.next_follow_up, EventKind::FollowUp, "Scheduled");
    }
    events.sort_by_key(|event| event.date);
    events
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskKind {
    FollowUp,
    ProposalFollowUp,
    InitialContact,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    Overdue,
    DueToday,
    Pending,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub title: String,
    pub prospect: String,
    pub company: String,
    pub due: NaiveDate,
    pub priority: Option<Priority>,
    pub kind: TaskKind,
    pub status: TaskStatus,
}

/// Work due on `today`: follow-ups that have come due, proposals left without contact for
/// `proposal_stale_days`, and new leads added before today that still need a first touch.
pub fn tasks(table: &[Prospect], today: NaiveDate, proposal_stale_days: u32) -> Vec<Task> {
    let mut tasks = Vec::new();
    for prospect in table {
        let task = |title: String, due, priority, kind, status| Task {
            title,
            prospect: prospect.name.clone(),
            company: prospect.company.clone(),
            due,
            priority,
            kind,
            status,
        };

        if let Some(follow_up) = prospect.next_follow_up.filter(|date| *date <= today) {
            let status = if follow_up < today { TaskStatus::Overdue } else { TaskStatus::DueToday };
            tasks.push(task(
                format!("Follow up with {}", prospect.name),
                follow_up,
                prospect.priority,
                TaskKind::FollowUp,
                status,
            ));
        }

        let stale = prospect
            .last_contact
            .map(|last| (today - last).num_days() >= i64::from(proposal_stale_days))
            .unwrap_or(false);
        if prospect.is_in_stage(DealStage::ProposalSent) && stale {
            tasks.push(task(
                format!("Follow up on proposal with {}", prospect.name),
                today,
                Some(Priority::High),
                TaskKind::ProposalFollowUp,
                TaskStatus::Overdue,
            ));
        }

        let waiting = prospect.date_added.map(|added| added < today).unwrap_or(false);
        if prospect.lead_status == LeadStatus::New && waiting {
            tasks.push(task(
                format!("Initial outreach to {}", prospect.name),
                today,
                prospect.priority,
                TaskKind::InitialContact,
                TaskStatus::Pending,
            ));
        }
    }
    tasks.sort_by(|left, right| {
        priority_rank(left.priority, right.priority).then(left.due.cmp(&right.due))
    });
    tasks
}

/// High before Medium before Low; unset priorities last.
fn priority_rank(left: Option<Priority>, right: Option<Priority>) -> Ordering {
    match (left, right) {
        (Some(left), Some(right)) => right.cmp(&left),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub date: NaiveDate,
    pub message: String,
    pub priority: Option<Priority>,
}

/// One reminder `lead_days` ahead of each follow-up, skipping reminders already in the past.
pub fn reminders(table: &[Prospect], today: NaiveDate, lead_days: u32) -> Vec<Reminder> {
    let mut reminders: Vec<Reminder> = table
        .iter()
        .filter_map(|prospect| {
            let follow_up = prospect.next_follow_up?;
            let date = follow_up - Duration::days(i64::from(lead_days));
            (date >= today).then(|| Reminder {
                date,
                message: format!("Follow up with {} on {follow_up}", prospect.name),
                priority: prospect.priority,
            })
        })
        .collect();
    reminders.sort_by_key(|reminder| reminder.date);
    reminders
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Urgency {
    Urgent,
    Soon,
    Later,
}

impl Urgency {
    pub fn from_days(days_until: i64) -> Self {
        match days_until {
            i64::MIN..=1 => Self::Urgent,
            2..=3 => Self::Soon,
            _ => Self::Later,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpcomingFollowUp {
    pub name: String,
    pub company: String,
    pub date: NaiveDate,
    pub days_until: i64,
    pub urgency: Urgency,
}

pub fn upcoming_follow_ups(
    table: &[Prospect],
    today: NaiveDate,
    limit: usize,
) -> Vec<UpcomingFollowUp> {
    let mut upcoming: Vec<UpcomingFollowUp> = table
        .iter()
        .filter_map(|prospect| {
            let date = prospect.next_follow_up.filter(|date| *date >= today)?;
            let days_until = (date - today).num_days();
            Some(UpcomingFollowUp {
                name: prospect.name.clone(),
                company: prospect.company.clone(),
                date,
                days_until,
                urgency: Urgency::from_days(days_until),
            })
        })
        .collect();
    upcoming.sort_by_key(|follow_up| follow_up.date);
    upcoming.truncate(limit);
    upcoming
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{
        calendar_events, reminders, tasks, upcoming_follow_ups, EventKind, TaskKind, TaskStatus,
        Urgency,
    };
    use crate::domain::{DealStage, EmailSlot, LeadStatus, OutreachState, Priority, Prospect};
    use crate::testing::prospect;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, d).expect("valid date")
    }

    #[test]
    fn calendar_collects_emails_calls_and_follow_ups_in_range() {
        let mut row = prospect(1);
        row.owner = "Rep A".to_string();
        row.emails[0] = EmailSlot::sent(day(2), OutreachState::Opened);
        row.emails[1] = EmailSlot::sent(day(20), OutreachState::Sent);
        row.call_date = Some(day(5));
        row.next_follow_up = Some(day(4));

        let events = calendar_events(&[row], day(1), day(10), &[]);
        let kinds: Vec<EventKind> = events.iter().map(|event| event.kind).collect();

        assert_eq!(kinds, [EventKind::Email(1), EventKind::FollowUp, EventKind::CallDemo]);
        assert_eq!(events[0].status, "Opened");
        assert_eq!(events[2].status, "Scheduled");
    }

    #[test]
    fn calendar_owner_filter_drops_other_reps() {
        let mut mine = prospect(1);
        mine.owner = "Rep A".to_string();
        mine.call_date = Some(day(3));
        let mut theirs = prospect(2);
        theirs.owner = "Rep B".to_string();
        theirs.call_date = Some(day(3));

        let events = calendar_events(&[mine, theirs], day(1), day(30), &["Rep B".to_string()]);

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].owner, "Rep B");
    }

    #[test]
    fn tasks_cover_due_follow_ups_stale_proposals_and_new_leads() {
        let today = day(15);
        let mut overdue = prospect(1);
        overdue.lead_status = LeadStatus::Contacted;
        overdue.priority = Some(Priority::Low);
        overdue.next_follow_up = Some(day(13));
        let mut proposal = prospect(2);
        proposal.lead_status = LeadStatus::Qualified;
        proposal.deal_stage = Some(DealStage::ProposalSent);
        proposal.last_contact = Some(day(8));
        let mut fresh = prospect(3);
        fresh.priority = Some(Priority::Medium);
        fresh.date_added = Some(day(10));
        let mut added_today = prospect(4);
        added_today.date_added = Some(today);

        let tasks = tasks(&[overdue, proposal, fresh, added_today], today, 7);
        let kinds: Vec<TaskKind> = tasks.iter().map(|task| task.kind).collect();

        assert_eq!(
            kinds,
            [TaskKind::ProposalFollowUp, TaskKind::InitialContact, TaskKind::FollowUp]
        );
        assert_eq!(tasks[2].status, TaskStatus::Overdue);
        assert_eq!(tasks[2].due, day(13));
        assert_eq!(tasks[1].status, TaskStatus::Pending);
    }

    #[test]
    fn follow_up_due_today_is_not_overdue() {
        let mut row = prospect(1);
        row.lead_status = LeadStatus::Contacted;
        row.next_follow_up = Some(day(15));

        let tasks = tasks(&[row], day(15), 7);

        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].status, TaskStatus::DueToday);
    }

    #[test]
    fn reminders_skip_dates_already_past() {
        let mut soon = prospect(1);
        soon.next_follow_up = Some(day(16));
        let mut tomorrow = prospect(2);
        tomorrow.next_follow_up = Some(day(15));

        let reminders = reminders(&[soon, tomorrow], day(15), 1);

        assert_eq!(reminders.len(), 1);
        assert_eq!(reminders[0].date, day(15));
    }

    #[test]
    fn upcoming_follow_ups_are_ranked_by_urgency_window() {
        let rows: Vec<Prospect> = [16, 12, 18, 25]
            .into_iter()
            .enumerate()
            .map(|(index, d)| {
                let mut row = prospect(index as u64 + 1);
                row.next_follow_up = Some(day(d));
                row
            })
            .collect();

        let upcoming = upcoming_follow_ups(&rows, day(15), 5);
        let urgencies: Vec<Urgency> = upcoming.iter().map(|item| item.urgency).collect();

        assert_eq!(urgencies, [Urgency::Urgent, Urgency::Soon, Urgency::Later]);
        assert_eq!(upcoming[1].days_until, 3);
        assert_eq!(upcoming_follow_ups(&rows, day(15), 1).len(), 1);
    }
}
