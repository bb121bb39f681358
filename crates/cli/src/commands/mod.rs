pub mod agenda;
pub mod analytics;
pub mod campaign;
pub mod config;
pub mod dashboard;
pub mod export;
pub mod forecast;
pub mod import;
pub mod prospects;
pub mod templates;

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use chrono::{Local, NaiveDate};
use coldcrm_core::config::{AppConfig, ConfigOverrides, LoadOptions};
use coldcrm_core::Prospect;
use coldcrm_store::{ExportFilter, ProspectStore, StoreError};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl CommandResult {
    pub fn success_with(command: &str, message: impl Into<String>, data: impl Serialize) -> Self {
        let data = match serde_json::to_value(data) {
            Ok(data) => data,
            Err(error) => {
                return Self::failure(command, "serialization", error.to_string(), 1);
            }
        };
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            data: Some(data),
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            data: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    pub(crate) fn bad_request(command: &str, message: impl Into<String>) -> Self {
        Self::failure(command, "invalid_argument", message, 4)
    }

    pub(crate) fn store_failure(command: &str, error: StoreError) -> Self {
        Self::failure(command, "store", error.to_string(), 5)
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

/// Settings shared by every command: where config and data come from, and which day counts
/// as today.
#[derive(Debug, Clone, Default)]
pub struct CommandContext {
    pub config_path: Option<PathBuf>,
    pub data_path: Option<PathBuf>,
    pub today: Option<NaiveDate>,
}

impl CommandContext {
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            config_path: self.config_path.clone(),
            require_file: self.config_path.is_some(),
            overrides: ConfigOverrides {
                data_path: self.data_path.clone(),
                ..ConfigOverrides::default()
            },
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    /// Loads config and the prospect table, or the failure payload for `command`.
    pub(crate) fn open(&self, command: &str) -> Result<Workspace, CommandResult> {
        let config = AppConfig::load(self.load_options()).map_err(|error| {
            CommandResult::failure(
                command,
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            )
        })?;
        let today = self.today();
        let store = load_store(&config, today).map_err(|error| {
            CommandResult::failure(command, "data_load", format!("{error:#}"), 3)
        })?;
        Ok(Workspace { config, store, today })
    }
}

pub(crate) struct Workspace {
    pub config: AppConfig,
    pub store: ProspectStore,
    pub today: NaiveDate,
}

impl Workspace {
    /// Writes the whole table to `path` when one was given.
    pub(crate) fn save_to(&self, command: &str, path: Option<&Path>) -> Result<(), CommandResult> {
        let Some(path) = path else {
            return Ok(());
        };
        self.store.save(path, ExportFilter::All).map(|_| ()).map_err(|error| {
            CommandResult::failure(command, "data_write", error.to_string(), 6)
        })
    }
}

fn load_store(config: &AppConfig, today: NaiveDate) -> anyhow::Result<ProspectStore> {
    match &config.data.path {
        Some(path) => ProspectStore::load(path)
            .with_context(|| format!("failed to load prospects from `{}`", path.display())),
        None => {
            debug!(
                event_name = "cli.data.demo",
                seed = config.data.demo_seed,
                extra = config.data.demo_extra_prospects,
                "no data path configured, using demo prospects"
            );
            Ok(ProspectStore::demo(today, config.data.demo_seed, config.data.demo_extra_prospects))
        }
    }
}

/// Flat prospect summary used in list output.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct ProspectRow {
    pub id: u64,
    pub name: String,
    pub company: String,
    pub industry: String,
    pub owner: String,
    pub lead_status: &'static str,
    pub deal_stage: Option<&'static str>,
    pub priority: Option<&'static str>,
    pub lead_score: u8,
    pub deal_value: String,
    pub next_follow_up: Option<NaiveDate>,
}

impl From<&Prospect> for ProspectRow {
    fn from(prospect: &Prospect) -> Self {
        Self {
            id: prospect.id.0,
            name: prospect.name.clone(),
            company: prospect.company.clone(),
            industry: prospect.industry.clone(),
            owner: prospect.owner.clone(),
            lead_status: prospect.lead_status.label(),
            deal_stage: prospect.deal_stage.map(|stage| stage.label()),
            priority: prospect.priority.map(|priority| priority.label()),
            lead_score: prospect.lead_score.value(),
            deal_value: prospect.deal_value.to_string(),
            next_follow_up: prospect.next_follow_up,
        }
    }
}

pub(crate) fn rows<'a>(prospects: impl IntoIterator<Item = &'a Prospect>) -> Vec<ProspectRow> {
    prospects.into_iter().map(ProspectRow::from).collect()
}

/// Parses every value with `FromStr`, reporting the first failure as a bad request.
pub(crate) fn parse_all<T>(command: &str, values: &[String]) -> Result<Vec<T>, CommandResult>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    values.iter().map(|value| parse_one(command, value)).collect()
}

pub(crate) fn parse_one<T>(command: &str, raw: &str) -> Result<T, CommandResult>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>().map_err(|error| CommandResult::bad_request(command, error.to_string()))
}

pub(crate) fn parse_date(
    command: &str,
    field: &str,
    raw: &str,
) -> Result<NaiveDate, CommandResult> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
        let message = format!("`{field}` must be a YYYY-MM-DD date, got `{raw}`");
        CommandResult::bad_request(command, message)
    })
}
