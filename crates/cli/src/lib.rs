pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use chrono::NaiveDate;

use crate::commands::agenda::AgendaArgs;
use crate::commands::analytics::AnalyticsArgs;
use crate::commands::campaign::CampaignAction;
use crate::commands::export::ExportArgs;
use crate::commands::import::ImportArgs;
use crate::commands::prospects::{ProspectAction, ProspectsArgs};
use crate::commands::templates::TemplatesArgs;
use crate::commands::{CommandContext, CommandResult};

#[derive(Debug, Parser)]
#[command(
    name = "coldcrm",
    about = "coldcrm sales pipeline CLI",
    long_about = "Inspect prospect pipeline metrics, forecasts, agendas and outreach campaigns.",
    after_help = "Examples:\n  coldcrm dashboard\n  coldcrm prospects --status New --sort date_added\n  \
                  coldcrm --data pipeline.csv forecast\n  \
                  coldcrm prospects note 3 \"Sent pricing\" --save leads.csv"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Prospect file (.csv or .json) used instead of data.path")]
    pub data: Option<PathBuf>,
    #[arg(long, global = true, help = "Config file used instead of coldcrm.toml")]
    pub config: Option<PathBuf>,
    #[arg(long, global = true, help = "Evaluate dates as of this day (YYYY-MM-DD)")]
    pub today: Option<NaiveDate>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Headline metrics, pipeline funnel, forecast and hot prospects")]
    Dashboard,
    #[command(
        about = "Filter and sort the prospect table, or edit prospects",
        args_conflicts_with_subcommands = true
    )]
    Prospects {
        #[command(subcommand)]
        action: Option<ProspectAction>,
        #[command(flatten)]
        args: ProspectsArgs,
    },
    #[command(about = "Segment reports, lead insights and trends")]
    Analytics(AnalyticsArgs),
    #[command(about = "Stage-weighted revenue projections")]
    Forecast,
    #[command(about = "Tasks, reminders, upcoming follow-ups and calendar events")]
    Agenda(AgendaArgs),
    #[command(about = "Outreach campaign activity and launches")]
    Campaign {
        #[command(subcommand)]
        action: Option<CampaignAction>,
    },
    #[command(about = "List email templates or personalize one for a prospect")]
    Templates(TemplatesArgs),
    #[command(about = "Append prospects from a .csv or .json file")]
    Import(ImportArgs),
    #[command(about = "Write the prospect table to a .csv or .json file")]
    Export(ExportArgs),
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
}

impl Cli {
    pub fn context(&self) -> CommandContext {
        CommandContext {
            config_path: self.config.clone(),
            data_path: self.data.clone(),
            today: self.today,
        }
    }

    pub fn execute(&self) -> CommandResult {
        let context = self.context();
        match &self.command {
            Command::Dashboard => commands::dashboard::run(&context),
            Command::Prospects { action: Some(action), .. } => {
                commands::prospects::run_action(&context, action)
            }
            Command::Prospects { action: None, args } => commands::prospects::run(&context, args),
            Command::Analytics(args) => commands::analytics::run(&context, args),
            Command::Forecast => commands::forecast::run(&context),
            Command::Agenda(args) => commands::agenda::run(&context, args),
            Command::Campaign { action } => {
                let action = action.as_ref().unwrap_or(&CampaignAction::Overview);
                commands::campaign::run(&context, action)
            }
            Command::Templates(args) => commands::templates::run(&context, args),
            Command::Import(args) => commands::import::run(&context, args),
            Command::Export(args) => commands::export::run(&context, args),
            Command::Config => commands::config::run(&context),
        }
    }
}

pub fn run(cli: &Cli) -> ExitCode {
    let result = cli.execute();
    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
