use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Subcommand};
use coldcrm_core::{
    select, DealStage, DealValue, LeadScore, LeadStatus, Priority, ProspectFilter, ProspectId,
    SortKey,
};
use coldcrm_store::{FieldUpdate, NewProspect};
use serde_json::json;

use crate::commands::{
    parse_all, parse_date, parse_one, rows, CommandContext, CommandResult, ProspectRow, Workspace,
};

#[derive(Debug, Clone, Default, Args)]
pub struct ProspectsArgs {
    #[arg(long = "status", help = "Only these lead statuses (repeatable)")]
    pub statuses: Vec<String>,
    #[arg(long = "industry", help = "Only these industries (repeatable)")]
    pub industries: Vec<String>,
    #[arg(long = "stage", help = "Only these deal stages (repeatable)")]
    pub stages: Vec<String>,
    #[arg(long = "priority", help = "Only these priorities (repeatable)")]
    pub priorities: Vec<String>,
    #[arg(long = "owner", help = "Only prospects owned by these reps (repeatable)")]
    pub owners: Vec<String>,
    #[arg(long, help = "Lowest lead score to include")]
    pub min_score: Option<u8>,
    #[arg(long, help = "Highest lead score to include")]
    pub max_score: Option<u8>,
    #[arg(long, help = "Earliest date added, YYYY-MM-DD")]
    pub added_from: Option<String>,
    #[arg(long, help = "Latest date added, YYYY-MM-DD")]
    pub added_to: Option<String>,
    #[arg(long, help = "Case-insensitive match on name, company, email or notes")]
    pub search: Option<String>,
    #[arg(long, help = "lead_score | date_added | name | company | deal_value")]
    pub sort: Option<String>,
    #[arg(long, help = "Return at most this many rows")]
    pub limit: Option<usize>,
}

impl ProspectsArgs {
    fn filter(&self) -> Result<ProspectFilter, CommandResult> {
        let filter = ProspectFilter {
            statuses: parse_all::<LeadStatus>("prospects", &self.statuses)?,
            industries: self.industries.clone(),
            stages: parse_all::<DealStage>("prospects", &self.stages)?,
            priorities: parse_all::<Priority>("prospects", &self.priorities)?,
            owners: self.owners.clone(),
            min_score: self.min_score.unwrap_or(0),
            max_score: self.max_score.unwrap_or(100),
            added_from: self
                .added_from
                .as_deref()
                .map(|raw| parse_date("prospects", "added_from", raw))
                .transpose()?,
            added_to: self
                .added_to
                .as_deref()
                .map(|raw| parse_date("prospects", "added_to", raw))
                .transpose()?,
            search: self.search.clone().filter(|search| !search.trim().is_empty()),
        };
        if filter.min_score > filter.max_score {
            return Err(CommandResult::bad_request(
                "prospects",
                format!("min_score {} is above max_score {}", filter.min_score, filter.max_score),
            ));
        }
        Ok(filter)
    }
}

pub fn run(context: &CommandContext, args: &ProspectsArgs) -> CommandResult {
    let filter = match args.filter() {
        Ok(filter) => filter,
        Err(failure) => return failure,
    };
    let sort = match args.sort.as_deref().map(str::parse::<SortKey>).transpose() {
        Ok(sort) => sort.unwrap_or_default(),
        Err(message) => return CommandResult::bad_request("prospects", message),
    };
    let workspace = match context.open("prospects") {
        Ok(workspace) => workspace,
        Err(failure) => return failure,
    };

    let selected = select(workspace.store.prospects(), &filter, sort);
    let matched = selected.len();
    let limit = args.limit.unwrap_or(matched);
    let listed = rows(selected.into_iter().take(limit));

    CommandResult::success_with(
        "prospects",
        format!("{matched} of {} prospects match", workspace.store.len()),
        listed,
    )
}

#[derive(Debug, Clone, Subcommand)]
pub enum ProspectAction {
    #[command(about = "Add a prospect; name, company and email are required")]
    Add(AddArgs),
    #[command(about = "Change one or more fields of a prospect")]
    Update(UpdateArgs),
    #[command(about = "Append a dated note to a prospect")]
    Note(NoteArgs),
    #[command(about = "Set the lead status of several prospects at once")]
    BulkStatus(BulkStatusArgs),
}

#[derive(Debug, Clone, Default, Args)]
pub struct AddArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub company: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub industry: Option<String>,
    #[arg(long, help = "Size label such as \"Mid (51-500)\"; the first word is kept")]
    pub company_size: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub website: Option<String>,
    #[arg(long)]
    pub source: Option<String>,
    #[arg(long)]
    pub owner: Option<String>,
    #[arg(long, help = "High | Medium | Low")]
    pub priority: Option<String>,
    #[arg(long, help = "Lead score, 0-100")]
    pub score: Option<i64>,
    #[arg(long)]
    pub pain_points: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
    #[arg(long, help = "Write the updated table to this .csv or .json file")]
    pub save: Option<PathBuf>,
}

impl AddArgs {
    fn new_prospect(&self) -> Result<NewProspect, CommandResult> {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();
        Ok(NewProspect {
            name: self.name.clone(),
            title: text(&self.title),
            company: self.company.clone(),
            industry: text(&self.industry),
            company_size: text(&self.company_size),
            location: text(&self.location),
            email: self.email.clone(),
            phone: text(&self.phone),
            website: text(&self.website),
            source: text(&self.source),
            owner: text(&self.owner),
            priority: self
                .priority
                .as_deref()
                .map(|raw| parse_one::<Priority>("prospects", raw))
                .transpose()?,
            lead_score: self
                .score
                .map(LeadScore::new)
                .transpose()
                .map_err(|error| CommandResult::bad_request("prospects", error.to_string()))?
                .unwrap_or_default(),
            pain_points: text(&self.pain_points),
            notes: text(&self.notes),
            ..NewProspect::default()
        })
    }
}

#[derive(Debug, Clone, Default, Args)]
pub struct UpdateArgs {
    #[arg(help = "Prospect id")]
    pub id: u64,
    #[arg(long, help = "New lead status")]
    pub status: Option<String>,
    #[arg(long, help = "New deal stage, or `none` to clear it")]
    pub stage: Option<String>,
    #[arg(long, help = "Deal value such as $75,000 or $50K; empty clears it")]
    pub value: Option<String>,
    #[arg(long, help = "High | Medium | Low, or `none` to clear it")]
    pub priority: Option<String>,
    #[arg(long, help = "Lead score, 0-100")]
    pub score: Option<i64>,
    #[arg(long)]
    pub owner: Option<String>,
    #[arg(long, help = "YYYY-MM-DD")]
    pub next_follow_up: Option<String>,
    #[arg(long, help = "YYYY-MM-DD")]
    pub last_contact: Option<String>,
    #[arg(long, help = "YYYY-MM-DD")]
    pub call_date: Option<String>,
    #[arg(long, help = "Opened-email counter")]
    pub opened: Option<u32>,
    #[arg(long, help = "Reply counter")]
    pub replies: Option<u32>,
    #[arg(long, help = "Send the next outreach email today")]
    pub send_email: bool,
    #[arg(long, help = "Write the updated table to this .csv or .json file")]
    pub save: Option<PathBuf>,
}

impl UpdateArgs {
    fn updates(&self, today: NaiveDate) -> Result<Vec<FieldUpdate>, CommandResult> {
        let mut updates = Vec::new();
        if let Some(raw) = &self.status {
            updates.push(FieldUpdate::LeadStatus(parse_one("prospects", raw)?));
        }
        if let Some(raw) = &self.stage {
            updates.push(FieldUpdate::DealStage(optional_label(raw)?));
        }
        if let Some(raw) = &self.value {
            let value = DealValue::parse(raw);
            if !raw.trim().is_empty() && !value.is_known() {
                return Err(CommandResult::bad_request(
                    "prospects",
                    format!("`value` must be an amount such as $75,000 or $50K, got `{raw}`"),
                ));
            }
            updates.push(FieldUpdate::DealValue(value));
        }
        if let Some(raw) = &self.priority {
            updates.push(FieldUpdate::Priority(optional_label(raw)?));
        }
        if let Some(score) = self.score {
            let score = LeadScore::new(score)
                .map_err(|error| CommandResult::bad_request("prospects", error.to_string()))?;
            updates.push(FieldUpdate::LeadScore(score));
        }
        if let Some(owner) = &self.owner {
            updates.push(FieldUpdate::Owner(owner.trim().to_string()));
        }
        if let Some(raw) = &self.next_follow_up {
            updates.push(FieldUpdate::NextFollowUp(optional_date("next_follow_up", raw)?));
        }
        if let Some(raw) = &self.last_contact {
            updates.push(FieldUpdate::LastContact(optional_date("last_contact", raw)?));
        }
        if let Some(raw) = &self.call_date {
            updates.push(FieldUpdate::CallDate(optional_date("call_date", raw)?));
        }
        if let Some(count) = self.opened {
            updates.push(FieldUpdate::OpenedEmails(count));
        }
        if let Some(count) = self.replies {
            updates.push(FieldUpdate::Replies(count));
        }
        if self.send_email {
            updates.push(FieldUpdate::SendEmail(today));
        }
        if updates.is_empty() {
            return Err(CommandResult::bad_request("prospects", "no fields to update"));
        }
        Ok(updates)
    }
}

#[derive(Debug, Clone, Default, Args)]
pub struct NoteArgs {
    #[arg(help = "Prospect id")]
    pub id: u64,
    #[arg(help = "Note text; stamped with today's date")]
    pub text: String,
    #[arg(long, help = "Write the updated table to this .csv or .json file")]
    pub save: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Args)]
pub struct BulkStatusArgs {
    #[arg(long, help = "Lead status applied to every listed prospect")]
    pub status: String,
    #[arg(required = true, num_args = 1.., help = "Prospect ids")]
    pub ids: Vec<u64>,
    #[arg(long, help = "Write the updated table to this .csv or .json file")]
    pub save: Option<PathBuf>,
}

pub fn run_action(context: &CommandContext, action: &ProspectAction) -> CommandResult {
    let outcome = match action {
        ProspectAction::Add(args) => add(context, args),
        ProspectAction::Update(args) => update(context, args),
        ProspectAction::Note(args) => note(context, args),
        ProspectAction::BulkStatus(args) => bulk_status(context, args),
    };
    outcome.unwrap_or_else(|failure| failure)
}

fn add(context: &CommandContext, args: &AddArgs) -> Result<CommandResult, CommandResult> {
    let new = args.new_prospect()?;
    let mut workspace = context.open("prospects")?;
    let id = workspace
        .store
        .add(new, workspace.today)
        .map_err(|error| CommandResult::store_failure("prospects", error))?;
    workspace.save_to("prospects", args.save.as_deref())?;

    Ok(edited(&workspace, id, format!("added prospect {id}"), &args.save, &[]))
}

fn update(context: &CommandContext, args: &UpdateArgs) -> Result<CommandResult, CommandResult> {
    let updates = args.updates(context.today())?;
    let mut workspace = context.open("prospects")?;
    let id = ProspectId(args.id);
    let mut fields = Vec::with_capacity(updates.len());
    for update in updates {
        fields.push(field_name(&update));
        workspace
            .store
            .update(id, update)
            .map_err(|error| CommandResult::store_failure("prospects", error))?;
    }
    workspace.save_to("prospects", args.save.as_deref())?;

    let message = format!("updated {} of prospect {id}", fields.join(", "));
    Ok(edited(&workspace, id, message, &args.save, &fields))
}

fn note(context: &CommandContext, args: &NoteArgs) -> Result<CommandResult, CommandResult> {
    let mut workspace = context.open("prospects")?;
    let id = ProspectId(args.id);
    workspace
        .store
        .add_note(id, &args.text, workspace.today)
        .map_err(|error| CommandResult::store_failure("prospects", error))?;
    workspace.save_to("prospects", args.save.as_deref())?;

    Ok(edited(&workspace, id, format!("noted prospect {id}"), &args.save, &["notes"]))
}

fn bulk_status(
    context: &CommandContext,
    args: &BulkStatusArgs,
) -> Result<CommandResult, CommandResult> {
    let status: LeadStatus = parse_one("prospects", &args.status)?;
    if args.ids.is_empty() {
        return Err(CommandResult::bad_request("prospects", "no prospect ids given"));
    }
    let ids: Vec<ProspectId> = args.ids.iter().copied().map(ProspectId).collect();

    let mut workspace = context.open("prospects")?;
    let updated = workspace
        .store
        .bulk_update_status(&ids, status)
        .map_err(|error| CommandResult::store_failure("prospects", error))?;
    workspace.save_to("prospects", args.save.as_deref())?;

    Ok(CommandResult::success_with(
        "prospects",
        format!("set {updated} prospects to {status}"),
        json!({ "status": status.label(), "ids": args.ids, "saved_to": args.save }),
    ))
}

fn edited(
    workspace: &Workspace,
    id: ProspectId,
    message: String,
    saved_to: &Option<PathBuf>,
    fields: &[&str],
) -> CommandResult {
    let prospect = workspace.store.get(id).map(ProspectRow::from);
    CommandResult::success_with(
        "prospects",
        message,
        json!({ "prospect": prospect, "fields": fields, "saved_to": saved_to }),
    )
}

fn field_name(update: &FieldUpdate) -> &'static str {
    match update {
        FieldUpdate::LeadStatus(_) => "lead_status",
        FieldUpdate::DealStage(_) => "deal_stage",
        FieldUpdate::DealValue(_) => "deal_value",
        FieldUpdate::Priority(_) => "priority",
        FieldUpdate::LeadScore(_) => "lead_score",
        FieldUpdate::Owner(_) => "owner",
        FieldUpdate::NextFollowUp(_) => "next_follow_up",
        FieldUpdate::LastContact(_) => "last_contact",
        FieldUpdate::CallDate(_) => "call_date",
        FieldUpdate::OpenedEmails(_) => "opened_emails",
        FieldUpdate::Replies(_) => "replies",
        FieldUpdate::SendEmail(_) | FieldUpdate::EmailState { .. } => "emails",
    }
}

fn optional_label<T>(raw: &str) -> Result<Option<T>, CommandResult>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    parse_one("prospects", trimmed).map(Some)
}

fn optional_date(field: &str, raw: &str) -> Result<Option<NaiveDate>, CommandResult> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    parse_date("prospects", field, raw).map(Some)
}
