use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use chrono::NaiveDate;
use clap::Parser;
use coldcrm_cli::commands::agenda::{self, AgendaArgs};
use coldcrm_cli::commands::analytics::{self, AnalyticsArgs};
use coldcrm_cli::commands::campaign::{self, CampaignAction, LaunchArgs};
use coldcrm_cli::commands::export::{self, ExportArgs};
use coldcrm_cli::commands::import::{self, ImportArgs};
use coldcrm_cli::commands::prospects::{
    self, AddArgs, BulkStatusArgs, NoteArgs, ProspectAction, ProspectsArgs, UpdateArgs,
};
use coldcrm_cli::commands::templates::{self, TemplatesArgs};
use coldcrm_cli::commands::{config, dashboard, forecast, CommandContext};
use coldcrm_cli::Cli;
use coldcrm_store::read_records;
use serde_json::Value;
use tempfile::TempDir;

fn context() -> CommandContext {
    CommandContext { today: NaiveDate::from_ymd_opt(2026, 10, 19), ..CommandContext::default() }
}

fn context_with_data(path: PathBuf) -> CommandContext {
    CommandContext { data_path: Some(path), ..context() }
}

#[test]
fn dashboard_reports_demo_metrics() {
    with_env(&[], || {
        let result = dashboard::run(&context());
        assert_eq!(result.exit_code, 0, "expected dashboard success: {}", result.output);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "dashboard");
        assert_eq!(payload["status"], "ok");
        assert_eq!(payload["data"]["metrics"]["total"], 6);
        assert_eq!(payload["data"]["metrics"]["contacted"], 4);
        assert_eq!(payload["data"]["pipeline_value"], "$450,000");
        assert_eq!(payload["data"]["average_deal"], "$112,500");

        let hot: Vec<&str> = payload["data"]["hot_prospects"]
            .as_array()
            .expect("hot prospects should be an array")
            .iter()
            .filter_map(|row| row["name"].as_str())
            .collect();
        assert_eq!(hot, vec!["Mark Taylor", "David Chen", "Michael Brown"]);
    });
}

#[test]
fn dashboard_honours_threshold_from_env() {
    with_env(&[("COLDCRM_HOT_LEAD_THRESHOLD", "90")], || {
        let payload = parse_payload(&dashboard::run(&context()).output);
        let hot = payload["data"]["hot_prospects"].as_array().expect("array");
        assert_eq!(hot.len(), 1);
        assert_eq!(hot[0]["company"], "RetailPro");
    });
}

#[test]
fn dashboard_returns_config_failure_for_bad_env() {
    with_env(&[("COLDCRM_HOT_LEAD_THRESHOLD", "250")], || {
        let result = dashboard::run(&context());
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn prospects_filters_by_status_and_sorts_by_score() {
    with_env(&[], || {
        let args = ProspectsArgs { statuses: vec!["New".to_string()], ..ProspectsArgs::default() };
        let result = prospects::run(&context(), &args);
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["message"], "2 of 6 prospects match");
        let names: Vec<&str> = payload["data"]
            .as_array()
            .expect("rows should be an array")
            .iter()
            .filter_map(|row| row["name"].as_str())
            .collect();
        assert_eq!(names, vec!["David Chen", "Jane Smith"]);
    });
}

#[test]
fn prospects_rejects_unknown_labels_and_sort_keys() {
    with_env(&[], || {
        let args = ProspectsArgs { statuses: vec!["Warm".to_string()], ..ProspectsArgs::default() };
        let result = prospects::run(&context(), &args);
        assert_eq!(result.exit_code, 4);
        assert_eq!(parse_payload(&result.output)["error_class"], "invalid_argument");

        let args = ProspectsArgs { sort: Some("revenue".to_string()), ..ProspectsArgs::default() };
        assert_eq!(prospects::run(&context(), &args).exit_code, 4);
    });
}

#[test]
fn analytics_includes_requested_breakdown() {
    with_env(&[], || {
        let args = AnalyticsArgs { group_by: Some("owner".to_string()) };
        let result = analytics::run(&context(), &args);
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        let segments = payload["data"]["breakdown"]["segments"].as_array().expect("segments");
        assert_eq!(segments[0]["key"], "Rep A");
        assert_eq!(segments[0]["values"][0], 3);
        assert_eq!(payload["data"]["leads"]["score_stats"]["highest"], 92);
        assert!(payload["data"]["segments"]["industry_funnel"].is_array());
    });
}

#[test]
fn forecast_reports_projection_totals() {
    with_env(&[], || {
        let result = forecast::run(&context());
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        assert_eq!(
            payload["message"],
            "conservative $157,500, weighted $202,500, optimistic $300,000"
        );
        assert!(payload["data"]["stages"].as_array().is_some_and(|stages| !stages.is_empty()));
    });
}

#[test]
fn agenda_lists_initial_contact_tasks() {
    with_env(&[], || {
        let result = agenda::run(&context(), &AgendaArgs::default());
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        let tasks = payload["data"]["tasks"].as_array().expect("tasks");
        assert!(tasks.iter().any(|task| task["company"] == "TechNova"));
        assert_eq!(payload["data"]["from"], "2026-10-19");
        assert_eq!(payload["data"]["to"], "2026-11-18");
    });
}

#[test]
fn agenda_rejects_inverted_range() {
    with_env(&[], || {
        let args = AgendaArgs {
            from: Some("2026-10-20".to_string()),
            to: Some("2026-10-01".to_string()),
            owners: Vec::new(),
        };
        assert_eq!(agenda::run(&context(), &args).exit_code, 4);
    });
}

#[test]
fn campaign_launch_saves_updated_table() {
    with_env(&[], || {
        let dir = TempDir::new().expect("tempdir");
        let saved = dir.path().join("after-launch.csv");
        let action = CampaignAction::Launch(LaunchArgs {
            name: "Q4 push".to_string(),
            save: Some(saved.clone()),
            ..LaunchArgs::default()
        });

        let result = campaign::run(&context(), &action);
        assert_eq!(result.exit_code, 0, "expected launch success: {}", result.output);
        let payload = parse_payload(&result.output);
        assert_eq!(payload["data"]["report"]["targeted"], 2);
        assert_eq!(payload["data"]["report"]["sent"].as_array().map(Vec::len), Some(2));

        let args = ProspectsArgs { statuses: vec!["New".to_string()], ..ProspectsArgs::default() };
        let reloaded = parse_payload(&prospects::run(&context_with_data(saved), &args).output);
        assert_eq!(reloaded["message"], "0 of 6 prospects match");
    });
}

#[test]
fn campaign_overview_counts_active_sequences() {
    with_env(&[], || {
        let result = campaign::run(&context(), &CampaignAction::Overview);
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["data"]["activity"].as_array().map(Vec::len), Some(10));
        assert!(payload["data"]["state_distribution"].is_array());
    });
}

#[test]
fn templates_render_for_prospect() {
    with_env(&[], || {
        let args = TemplatesArgs { name: Some("initial outreach".to_string()), prospect: Some(1) };
        let result = templates::run(&context(), &args);
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["data"]["to"], "jane@technova.com");
        let subject = payload["data"]["email"]["subject"].as_str().expect("subject");
        assert!(subject.contains("TechNova"), "subject should name the company: {subject}");
    });
}

#[test]
fn templates_reject_unknown_name_and_prospect() {
    with_env(&[], || {
        let unknown = TemplatesArgs { name: Some("Breakup".to_string()), prospect: None };
        assert_eq!(templates::run(&context(), &unknown).exit_code, 4);

        let missing = TemplatesArgs { name: Some("Follow-up".to_string()), prospect: Some(99) };
        assert_eq!(templates::run(&context(), &missing).exit_code, 4);

        let listed = parse_payload(&templates::run(&context(), &TemplatesArgs::default()).output);
        assert_eq!(listed["data"].as_array().map(Vec::len), Some(4));
    });
}

#[test]
fn export_writes_filtered_rows() {
    with_env(&[], || {
        let dir = TempDir::new().expect("tempdir");
        let output = dir.path().join("high.json");
        let args = ExportArgs { output: output.clone(), filter: "high".to_string() };

        let result = export::run(&context(), &args);
        assert_eq!(result.exit_code, 0);
        assert_eq!(parse_payload(&result.output)["data"]["prospects"], 4);
        assert!(output.exists());
    });
}

#[test]
fn export_fails_for_unsupported_extension() {
    with_env(&[], || {
        let dir = TempDir::new().expect("tempdir");
        let args =
            ExportArgs { output: dir.path().join("pipeline.xlsx"), filter: "all".to_string() };

        let result = export::run(&context(), &args);
        assert_eq!(result.exit_code, 6);
        assert_eq!(parse_payload(&result.output)["error_class"], "data_write");
    });
}

#[test]
fn missing_data_file_is_a_load_failure() {
    with_env(&[], || {
        let dir = TempDir::new().expect("tempdir");
        let result = dashboard::run(&context_with_data(dir.path().join("missing.csv")));
        assert_eq!(result.exit_code, 3);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "data_load");
        assert!(payload["message"].as_str().is_some_and(|message| message.contains("missing.csv")));
    });
}

#[test]
fn config_reports_env_sources() {
    with_env(&[("COLDCRM_DEMO_SEED", "7"), ("COLDCRM_LOG_LEVEL", "debug")], || {
        let result = config::run(&context());
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        let lines = payload["data"].as_array().expect("config lines");
        let line = |key: &str| {
            lines
                .iter()
                .find(|line| line["key"] == key)
                .cloned()
                .expect("config key should be listed")
        };
        assert_eq!(line("data.demo_seed")["value"], "7");
        assert_eq!(line("data.demo_seed")["source"], "env (COLDCRM_DEMO_SEED)");
        assert_eq!(line("logging.level")["source"], "env (COLDCRM_LOG_LEVEL)");
        assert_eq!(line("data.path")["value"], "<demo dataset>");
        assert_eq!(line("analytics.top_prospects")["source"], "default");
    });
}

#[test]
fn prospects_add_saves_new_row() {
    with_env(&[], || {
        let dir = TempDir::new().expect("tempdir");
        let saved = dir.path().join("with-priya.csv");
        let action = ProspectAction::Add(AddArgs {
            name: "Priya Patel".to_string(),
            company: "Northwind Labs".to_string(),
            email: "priya@northwind.com".to_string(),
            priority: Some("medium".to_string()),
            score: Some(64),
            save: Some(saved.clone()),
            ..AddArgs::default()
        });

        let result = prospects::run_action(&context(), &action);
        assert_eq!(result.exit_code, 0, "expected add success: {}", result.output);
        let payload = parse_payload(&result.output);
        assert_eq!(payload["message"], "added prospect 7");
        assert_eq!(payload["data"]["prospect"]["priority"], "Medium");

        let reloaded = search(&saved, "Northwind");
        assert_eq!(reloaded["message"], "1 of 7 prospects match");
        assert_eq!(reloaded["data"][0]["lead_score"], 64);
    });
}

#[test]
fn prospects_add_requires_email() {
    with_env(&[], || {
        let action = ProspectAction::Add(AddArgs {
            name: "Priya Patel".to_string(),
            company: "Northwind Labs".to_string(),
            ..AddArgs::default()
        });

        let result = prospects::run_action(&context(), &action);
        assert_eq!(result.exit_code, 5);
        assert_eq!(parse_payload(&result.output)["error_class"], "store");
    });
}

#[test]
fn prospects_update_persists_exact_deal_value() {
    with_env(&[], || {
        let dir = TempDir::new().expect("tempdir");
        let saved = dir.path().join("updated.json");
        let action = ProspectAction::Update(UpdateArgs {
            id: 3,
            stage: Some("Closed Won".to_string()),
            value: Some("$80,000.50".to_string()),
            save: Some(saved.clone()),
            ..UpdateArgs::default()
        });

        let result = prospects::run_action(&context(), &action);
        assert_eq!(result.exit_code, 0, "expected update success: {}", result.output);
        let payload = parse_payload(&result.output);
        assert_eq!(payload["data"]["fields"], serde_json::json!(["deal_stage", "deal_value"]));
        assert_eq!(payload["data"]["prospect"]["deal_stage"], "Closed Won");

        let records = read_records(&saved).expect("saved table should read back");
        assert_eq!(records[2].deal_stage, "Closed Won");
        assert_eq!(records[2].deal_value, "$80,000.50");
    });
}

#[test]
fn prospects_update_rejects_bad_input() {
    with_env(&[], || {
        let empty = ProspectAction::Update(UpdateArgs { id: 3, ..UpdateArgs::default() });
        assert_eq!(prospects::run_action(&context(), &empty).exit_code, 4);

        let score = ProspectAction::Update(UpdateArgs {
            id: 3,
            score: Some(150),
            ..UpdateArgs::default()
        });
        assert_eq!(prospects::run_action(&context(), &score).exit_code, 4);

        let value = ProspectAction::Update(UpdateArgs {
            id: 3,
            value: Some("$100K-$500K".to_string()),
            ..UpdateArgs::default()
        });
        assert_eq!(prospects::run_action(&context(), &value).exit_code, 4);

        let unknown = ProspectAction::Update(UpdateArgs {
            id: 99,
            status: Some("Qualified".to_string()),
            ..UpdateArgs::default()
        });
        let result = prospects::run_action(&context(), &unknown);
        assert_eq!(result.exit_code, 5);
        assert_eq!(parse_payload(&result.output)["error_class"], "store");
    });
}

#[test]
fn prospects_note_appends_to_saved_table() {
    with_env(&[], || {
        let dir = TempDir::new().expect("tempdir");
        let saved = dir.path().join("noted.csv");
        let action = ProspectAction::Note(NoteArgs {
            id: 4,
            text: "Asked for a security review".to_string(),
            save: Some(saved.clone()),
        });

        let result = prospects::run_action(&context(), &action);
        assert_eq!(result.exit_code, 0, "expected note success: {}", result.output);

        let reloaded = search(&saved, "security review");
        assert_eq!(reloaded["message"], "1 of 6 prospects match");
        assert_eq!(reloaded["data"][0]["name"], "David Chen");
    });
}

#[test]
fn prospects_bulk_status_is_all_or_nothing() {
    with_env(&[], || {
        let dir = TempDir::new().expect("tempdir");
        let saved = dir.path().join("bulk.csv");
        let unknown = ProspectAction::BulkStatus(BulkStatusArgs {
            status: "Not Interested".to_string(),
            ids: vec![1, 42],
            save: Some(saved.clone()),
        });
        assert_eq!(prospects::run_action(&context(), &unknown).exit_code, 5);
        assert!(!saved.exists(), "failed bulk update should not write the table");

        let action = ProspectAction::BulkStatus(BulkStatusArgs {
            status: "Not Interested".to_string(),
            ids: vec![1, 4],
            save: Some(saved.clone()),
        });
        let result = prospects::run_action(&context(), &action);
        assert_eq!(result.exit_code, 0, "expected bulk success: {}", result.output);
        assert_eq!(parse_payload(&result.output)["message"], "set 2 prospects to Not Interested");

        let args = ProspectsArgs {
            statuses: vec!["Not Interested".to_string()],
            ..ProspectsArgs::default()
        };
        let reloaded = parse_payload(&prospects::run(&context_with_data(saved), &args).output);
        assert_eq!(reloaded["message"], "2 of 6 prospects match");
    });
}

#[test]
fn import_appends_rows_under_fresh_ids() {
    with_env(&[], || {
        let dir = TempDir::new().expect("tempdir");
        let incoming = dir.path().join("incoming.json");
        fs::write(
            &incoming,
            r#"[{"Prospect ID": 2, "Name": "Lena Fischer", "Company": "Alpine Data"},
                {"Name": "Tom Okafor", "Company": "Kestrel", "Deal Value": "$12,500.25"}]"#,
        )
        .expect("write import file");
        let saved = dir.path().join("merged.csv");

        let args = ImportArgs { file: incoming, save: Some(saved.clone()) };
        let result = import::run(&context(), &args);
        assert_eq!(result.exit_code, 0, "expected import success: {}", result.output);
        let payload = parse_payload(&result.output);
        assert_eq!(payload["data"]["ids"], serde_json::json!([7, 8]));
        assert_eq!(payload["data"]["prospects"], 8);

        let reloaded = search(&saved, "Kestrel");
        assert_eq!(reloaded["message"], "1 of 8 prospects match");
        assert_eq!(reloaded["data"][0]["id"], 8);
    });
}

#[test]
fn import_reports_unreadable_and_invalid_files() {
    with_env(&[], || {
        let dir = TempDir::new().expect("tempdir");
        let missing = ImportArgs { file: dir.path().join("absent.csv"), save: None };
        let result = import::run(&context(), &missing);
        assert_eq!(result.exit_code, 3);
        assert_eq!(parse_payload(&result.output)["error_class"], "data_load");

        let invalid = dir.path().join("invalid.json");
        fs::write(&invalid, r#"[{"Name": "X", "Lead Status": "Maybe"}]"#).expect("write file");
        let result = import::run(&context(), &ImportArgs { file: invalid, save: None });
        assert_eq!(result.exit_code, 5);
        assert!(parse_payload(&result.output)["message"]
            .as_str()
            .is_some_and(|message| message.contains("row 1")));
    });
}

#[test]
fn cli_routes_prospect_subcommands() {
    with_env(&[], || {
        let cli = Cli::try_parse_from([
            "coldcrm",
            "--today",
            "2026-10-19",
            "prospects",
            "bulk-status",
            "--status",
            "Qualified",
            "1",
            "4",
        ])
        .expect("bulk-status should parse");
        let result = cli.execute();
        assert_eq!(result.exit_code, 0, "expected bulk success: {}", result.output);
        assert_eq!(parse_payload(&result.output)["message"], "set 2 prospects to Qualified");

        let args = ["coldcrm", "--today", "2026-10-19", "prospects", "--status", "New"];
        let cli = Cli::try_parse_from(args).expect("listing should parse");
        assert_eq!(parse_payload(&cli.execute().output)["message"], "2 of 6 prospects match");
    });
}

fn search(data: &Path, term: &str) -> Value {
    let args = ProspectsArgs { search: Some(term.to_string()), ..ProspectsArgs::default() };
    parse_payload(&prospects::run(&context_with_data(data.to_path_buf()), &args).output)
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "COLDCRM_DATA_PATH",
        "COLDCRM_DEMO_SEED",
        "COLDCRM_DEMO_EXTRA_PROSPECTS",
        "COLDCRM_HOT_LEAD_THRESHOLD",
        "COLDCRM_FOLLOW_UP_LEAD_DAYS",
        "COLDCRM_PROPOSAL_STALE_DAYS",
        "COLDCRM_LOGGING_LEVEL",
        "COLDCRM_LOGGING_FORMAT",
        "COLDCRM_LOG_LEVEL",
        "COLDCRM_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
