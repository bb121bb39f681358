use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::campaign::SequenceDelays;

#[derive(Clone, Debug, Serialize)]
pub struct AppConfig {
    pub data: DataConfig,
    pub analytics: AnalyticsConfig,
    pub outreach: OutreachConfig,
    pub reminders: ReminderConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, Serialize)]
pub struct DataConfig {
    /// Prospect table to load. When unset the generated demo dataset is used.
    pub path: Option<PathBuf>,
    pub demo_seed: u64,
    pub demo_extra_prospects: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct AnalyticsConfig {
    pub hot_lead_threshold: u8,
    pub top_prospects: usize,
    pub upcoming_follow_ups: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct OutreachConfig {
    pub first_follow_up_delay_days: u32,
    pub second_follow_up_delay_days: u32,
}

impl OutreachConfig {
    pub fn sequence_delays(&self) -> SequenceDelays {
        SequenceDelays {
            first_follow_up_days: self.first_follow_up_delay_days,
            second_follow_up_days: self.second_follow_up_delay_days,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct ReminderConfig {
    pub follow_up_lead_days: u32,
    pub proposal_stale_days: u32,
}

#[derive(Clone, Debug, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub data_path: Option<PathBuf>,
    pub log_level: Option<String>,
    pub hot_lead_threshold: Option<u8>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data: DataConfig { path: None, demo_seed: 42, demo_extra_prospects: 0 },
            analytics: AnalyticsConfig {
                hot_lead_threshold: 85,
                top_prospects: 5,
                upcoming_follow_ups: 5,
            },
            outreach: OutreachConfig {
                first_follow_up_delay_days: 3,
                second_follow_up_delay_days: 7,
            },
            reminders: ReminderConfig { follow_up_lead_days: 1, proposal_stale_days: 7 },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("coldcrm.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(data) = patch.data {
            if let Some(path) = data.path {
                self.data.path = Some(path);
            }
            if let Some(demo_seed) = data.demo_seed {
                self.data.demo_seed = demo_seed;
            }
            if let Some(demo_extra_prospects) = data.demo_extra_prospects {
                self.data.demo_extra_prospects = demo_extra_prospects;
            }
        }

        if let Some(analytics) = patch.analytics {
            if let Some(hot_lead_threshold) = analytics.hot_lead_threshold {
                self.analytics.hot_lead_threshold = hot_lead_threshold;
            }
            if let Some(top_prospects) = analytics.top_prospects {
                self.analytics.top_prospects = top_prospects;
            }
            if let Some(upcoming_follow_ups) = analytics.upcoming_follow_ups {
                self.analytics.upcoming_follow_ups = upcoming_follow_ups;
            }
        }

        if let Some(outreach) = patch.outreach {
            if let Some(days) = outreach.first_follow_up_delay_days {
                self.outreach.first_follow_up_delay_days = days;
            }
            if let Some(days) = outreach.second_follow_up_delay_days {
                self.outreach.second_follow_up_delay_days = days;
            }
        }

        if let Some(reminders) = patch.reminders {
            if let Some(days) = reminders.follow_up_lead_days {
                self.reminders.follow_up_lead_days = days;
            }
            if let Some(days) = reminders.proposal_stale_days {
                self.reminders.proposal_stale_days = days;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("COLDCRM_DATA_PATH") {
            self.data.path = Some(PathBuf::from(value));
        }
        if let Some(value) = read_env("COLDCRM_DEMO_SEED") {
            self.data.demo_seed = parse_u64("COLDCRM_DEMO_SEED", &value)?;
        }
        if let Some(value) = read_env("COLDCRM_DEMO_EXTRA_PROSPECTS") {
            self.data.demo_extra_prospects = parse_usize("COLDCRM_DEMO_EXTRA_PROSPECTS", &value)?;
        }

        if let Some(value) = read_env("COLDCRM_HOT_LEAD_THRESHOLD") {
            self.analytics.hot_lead_threshold = parse_u8("COLDCRM_HOT_LEAD_THRESHOLD", &value)?;
        }

        if let Some(value) = read_env("COLDCRM_FOLLOW_UP_LEAD_DAYS") {
            self.reminders.follow_up_lead_days = parse_u32("COLDCRM_FOLLOW_UP_LEAD_DAYS", &value)?;
        }
        if let Some(value) = read_env("COLDCRM_PROPOSAL_STALE_DAYS") {
            self.reminders.proposal_stale_days = parse_u32("COLDCRM_PROPOSAL_STALE_DAYS", &value)?;
        }

        let log_level = read_env("COLDCRM_LOGGING_LEVEL").or_else(|| read_env("COLDCRM_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("COLDCRM_LOGGING_FORMAT").or_else(|| read_env("COLDCRM_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(data_path) = overrides.data_path {
            self.data.path = Some(data_path);
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(threshold) = overrides.hot_lead_threshold {
            self.analytics.hot_lead_threshold = threshold;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_data(&self.data)?;
        validate_analytics(&self.analytics)?;
        validate_outreach(&self.outreach)?;
        validate_reminders(&self.reminders)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("coldcrm.toml"), PathBuf::from("config/coldcrm.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_data(data: &DataConfig) -> Result<(), ConfigError> {
    if let Some(path) = &data.path {
        let supported = matches!(
            path.extension().and_then(|ext| ext.to_str()).map(str::to_ascii_lowercase).as_deref(),
            Some("csv" | "json")
        );
        if !supported {
            return Err(ConfigError::Validation(format!(
                "data.path `{}` must point to a .csv or .json file",
                path.display()
            )));
        }
    }

    if data.demo_extra_prospects > 1_000 {
        return Err(ConfigError::Validation(
            "data.demo_extra_prospects must be in range 0..=1000".to_string(),
        ));
    }

    Ok(())
}

fn validate_analytics(analytics: &AnalyticsConfig) -> Result<(), ConfigError> {
    if analytics.hot_lead_threshold > 100 {
        return Err(ConfigError::Validation(
            "analytics.hot_lead_threshold must be in range 0..=100".to_string(),
        ));
    }

    if analytics.top_prospects == 0 || analytics.upcoming_follow_ups == 0 {
        return Err(ConfigError::Validation(
            "analytics.top_prospects and analytics.upcoming_follow_ups must be greater than zero"
                .to_string(),
        ));
    }

    Ok(())
}

fn validate_outreach(outreach: &OutreachConfig) -> Result<(), ConfigError> {
    if !(1..=14).contains(&outreach.first_follow_up_delay_days) {
        return Err(ConfigError::Validation(
            "outreach.first_follow_up_delay_days must be in range 1..=14".to_string(),
        ));
    }

    if !(1..=21).contains(&outreach.second_follow_up_delay_days) {
        return Err(ConfigError::Validation(
            "outreach.second_follow_up_delay_days must be in range 1..=21".to_string(),
        ));
    }

    Ok(())
}

fn validate_reminders(reminders: &ReminderConfig) -> Result<(), ConfigError> {
    if reminders.follow_up_lead_days > 7 {
        return Err(ConfigError::Validation(
            "reminders.follow_up_lead_days must be in range 0..=7".to_string(),
        ));
    }

    if !(1..=30).contains(&reminders.proposal_stale_days) {
        return Err(ConfigError::Validation(
            "reminders.proposal_stale_days must be in range 1..=30".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u8(key: &str, value: &str) -> Result<u8, ConfigError> {
    value.parse::<u8>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.parse::<usize>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    data: Option<DataPatch>,
    analytics: Option<AnalyticsPatch>,
    outreach: Option<OutreachPatch>,
    reminders: Option<ReminderPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct DataPatch {
    path: Option<PathBuf>,
    demo_seed: Option<u64>,
    demo_extra_prospects: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct AnalyticsPatch {
    hot_lead_threshold: Option<u8>,
    top_prospects: Option<usize>,
    upcoming_follow_ups: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct OutreachPatch {
    first_follow_up_delay_days: Option<u32>,
    second_follow_up_delay_days: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct ReminderPatch {
    follow_up_lead_days: Option<u32>,
    proposal_stale_days: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
