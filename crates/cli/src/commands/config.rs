use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use coldcrm_core::config::AppConfig;
use serde::Serialize;
use toml::Value;

use crate::commands::{CommandContext, CommandResult};

#[derive(Debug, Serialize)]
struct ConfigLine {
    key: &'static str,
    value: String,
    source: String,
}

pub fn run(context: &CommandContext) -> CommandResult {
    let config = match AppConfig::load(context.load_options()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "config",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    let config_file_path = detect_config_path(context.config_path.as_deref());
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let line = |key: &'static str, value: String, env_keys: &[&str], flag: Option<bool>| {
        let source = if flag == Some(true) {
            "flag (--data)".to_string()
        } else {
            field_source(key, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
        };
        ConfigLine { key, value, source }
    };

    let data_path = config
        .data
        .path
        .as_ref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "<demo dataset>".to_string());

    let lines = vec![
        line("data.path", data_path, &["COLDCRM_DATA_PATH"], Some(context.data_path.is_some())),
        line("data.demo_seed", config.data.demo_seed.to_string(), &["COLDCRM_DEMO_SEED"], None),
        line(
            "data.demo_extra_prospects",
            config.data.demo_extra_prospects.to_string(),
            &["COLDCRM_DEMO_EXTRA_PROSPECTS"],
            None,
        ),
        line(
            "analytics.hot_lead_threshold",
            config.analytics.hot_lead_threshold.to_string(),
            &["COLDCRM_HOT_LEAD_THRESHOLD"],
            None,
        ),
        line("analytics.top_prospects", config.analytics.top_prospects.to_string(), &[], None),
        line(
            "analytics.upcoming_follow_ups",
            config.analytics.upcoming_follow_ups.to_string(),
            &[],
            None,
        ),
        line(
            "outreach.first_follow_up_delay_days",
            config.outreach.first_follow_up_delay_days.to_string(),
            &[],
            None,
        ),
        line(
            "outreach.second_follow_up_delay_days",
            config.outreach.second_follow_up_delay_days.to_string(),
            &[],
            None,
        ),
        line(
            "reminders.follow_up_lead_days",
            config.reminders.follow_up_lead_days.to_string(),
            &["COLDCRM_FOLLOW_UP_LEAD_DAYS"],
            None,
        ),
        line(
            "reminders.proposal_stale_days",
            config.reminders.proposal_stale_days.to_string(),
            &["COLDCRM_PROPOSAL_STALE_DAYS"],
            None,
        ),
        line(
            "logging.level",
            config.logging.level.clone(),
            &["COLDCRM_LOGGING_LEVEL", "COLDCRM_LOG_LEVEL"],
            None,
        ),
        line(
            "logging.format",
            format!("{:?}", config.logging.format).to_ascii_lowercase(),
            &["COLDCRM_LOGGING_FORMAT", "COLDCRM_LOG_FORMAT"],
            None,
        ),
    ];

    CommandResult::success_with(
        "config",
        "effective config (source precedence: flag > env > file > default)",
        lines,
    )
}

fn detect_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    let root = PathBuf::from("coldcrm.toml");
    if root.exists() {
        return Some(root);
    }

    let nested = PathBuf::from("config/coldcrm.toml");
    if nested.exists() {
        return Some(nested);
    }

    None
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}
