use chrono::{Duration, NaiveDate};
use clap::Args;
use coldcrm_core::agenda::{self, CalendarEvent, Reminder, Task, UpcomingFollowUp};
use serde::Serialize;

use crate::commands::{parse_date, CommandContext, CommandResult};

const DEFAULT_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Clone, Default, Args)]
pub struct AgendaArgs {
    #[arg(long, help = "First calendar day, YYYY-MM-DD (defaults to today)")]
    pub from: Option<String>,
    #[arg(long, help = "Last calendar day, YYYY-MM-DD (defaults to 30 days after --from)")]
    pub to: Option<String>,
    #[arg(long = "owner", help = "Only show calendar events for these reps (repeatable)")]
    pub owners: Vec<String>,
}

#[derive(Debug, Serialize)]
struct Agenda {
    today: NaiveDate,
    from: NaiveDate,
    to: NaiveDate,
    tasks: Vec<Task>,
    reminders: Vec<Reminder>,
    upcoming_follow_ups: Vec<UpcomingFollowUp>,
    calendar: Vec<CalendarEvent>,
}

pub fn run(context: &CommandContext, args: &AgendaArgs) -> CommandResult {
    let today = context.today();
    let from = args.from.as_deref().map(|raw| parse_date("agenda", "from", raw)).transpose();
    let from = match from {
        Ok(from) => from.unwrap_or(today),
        Err(failure) => return failure,
    };
    let to = match args.to.as_deref().map(|raw| parse_date("agenda", "to", raw)).transpose() {
        Ok(to) => to.unwrap_or(from + Duration::days(DEFAULT_WINDOW_DAYS)),
        Err(failure) => return failure,
    };
    if to < from {
        return CommandResult::bad_request(
            "agenda",
            format!("`to` ({to}) is before `from` ({from})"),
        );
    }

    let workspace = match context.open("agenda") {
        Ok(workspace) => workspace,
        Err(failure) => return failure,
    };
    let table = workspace.store.prospects();
    let config = &workspace.config;

    let agenda = Agenda {
        today,
        from,
        to,
        tasks: agenda::tasks(table, today, config.reminders.proposal_stale_days),
        reminders: agenda::reminders(table, today, config.reminders.follow_up_lead_days),
        upcoming_follow_ups: agenda::upcoming_follow_ups(
            table,
            today,
            config.analytics.upcoming_follow_ups,
        ),
        calendar: agenda::calendar_events(table, from, to, &args.owners),
    };

    let message = format!(
        "{} tasks, {} reminders, {} calendar events",
        agenda.tasks.len(),
        agenda.reminders.len(),
        agenda.calendar.len()
    );
    CommandResult::success_with("agenda", message, agenda)
}
