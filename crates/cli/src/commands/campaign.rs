use std::path::PathBuf;

use clap::{Args, Subcommand};
use coldcrm_core::campaign::{self, ActiveSequence, EmailActivity};
use coldcrm_core::{CampaignTarget, LaunchReport, LeadStatus, OutreachState, Priority};
use serde::Serialize;

use crate::commands::{parse_all, CommandContext, CommandResult};

#[derive(Debug, Clone, Subcommand)]
pub enum CampaignAction {
    #[command(about = "Show email activity, state distribution and active follow-up sequences")]
    Overview,
    #[command(about = "Send the next outreach email to every targeted prospect")]
    Launch(LaunchArgs),
}

#[derive(Debug, Clone, Default, Args)]
pub struct LaunchArgs {
    #[arg(long, default_value = "Campaign", help = "Campaign name used in logs and output")]
    pub name: String,
    #[arg(long = "status", help = "Target lead statuses (repeatable, defaults to New)")]
    pub statuses: Vec<String>,
    #[arg(long = "industry", help = "Target industries (repeatable)")]
    pub industries: Vec<String>,
    #[arg(long = "priority", help = "Target priorities (repeatable)")]
    pub priorities: Vec<String>,
    #[arg(long, help = "Write the updated table to this .csv or .json file")]
    pub save: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct Overview {
    activity: Vec<EmailActivity>,
    state_distribution: Vec<StateCount>,
    active_sequences: Vec<ActiveSequence>,
}

#[derive(Debug, Serialize)]
struct StateCount {
    state: &'static str,
    emails: usize,
}

#[derive(Debug, Serialize)]
struct Launch {
    campaign: String,
    target: CampaignTarget,
    report: LaunchReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    saved_to: Option<PathBuf>,
}

pub fn run(context: &CommandContext, action: &CampaignAction) -> CommandResult {
    match action {
        CampaignAction::Overview => overview(context),
        CampaignAction::Launch(args) => launch(context, args),
    }
}

fn overview(context: &CommandContext) -> CommandResult {
    let workspace = match context.open("campaign") {
        Ok(workspace) => workspace,
        Err(failure) => return failure,
    };
    let table = workspace.store.prospects();

    let activity = campaign::email_activity(table);
    let state_distribution = campaign::state_distribution(&activity)
        .into_iter()
        .map(|(state, emails)| StateCount { state: state.label(), emails })
        .collect();
    let overview = Overview {
        state_distribution,
        active_sequences: campaign::active_sequences(
            table,
            workspace.config.outreach.sequence_delays(),
        ),
        activity,
    };

    let replied = overview
        .activity
        .iter()
        .filter(|entry| entry.state == OutreachState::Replied)
        .count();
    let message = format!(
        "{} emails tracked, {} replied, {} active sequences",
        overview.activity.len(),
        replied,
        overview.active_sequences.len()
    );
    CommandResult::success_with("campaign", message, overview)
}

fn launch(context: &CommandContext, args: &LaunchArgs) -> CommandResult {
    let mut target = CampaignTarget::default();
    if !args.statuses.is_empty() {
        target.statuses = match parse_all::<LeadStatus>("campaign", &args.statuses) {
            Ok(statuses) => statuses,
            Err(failure) => return failure,
        };
    }
    target.industries = args.industries.clone();
    target.priorities = match parse_all::<Priority>("campaign", &args.priorities) {
        Ok(priorities) => priorities,
        Err(failure) => return failure,
    };

    let mut workspace = match context.open("campaign") {
        Ok(workspace) => workspace,
        Err(failure) => return failure,
    };
    let report = match workspace.store.launch_campaign(&args.name, &target, workspace.today) {
        Ok(report) => report,
        Err(error) => return CommandResult::store_failure("campaign", error),
    };
    if let Err(failure) = workspace.save_to("campaign", args.save.as_deref()) {
        return failure;
    }

    let message = format!(
        "campaign `{}` sent {} emails to {} targeted prospects",
        args.name,
        report.sent.len(),
        report.targeted
    );
    let launch =
        Launch { campaign: args.name.clone(), target, report, saved_to: args.save.clone() };
    CommandResult::success_with("campaign", message, launch)
}
