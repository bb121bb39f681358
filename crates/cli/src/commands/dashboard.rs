use chrono::NaiveDate;
use coldcrm_core::agenda::{self, UpcomingFollowUp};
use coldcrm_core::{compute, forecast, format_currency, leads, pipeline_funnel};
use coldcrm_core::{Forecast, FunnelStage, MetricsSnapshot};
use serde::Serialize;

use crate::commands::{rows, CommandContext, CommandResult, ProspectRow};

#[derive(Debug, Serialize)]
struct Dashboard {
    as_of: NaiveDate,
    metrics: MetricsSnapshot,
    pipeline_value: String,
    average_deal: String,
    funnel: Vec<FunnelStage>,
    forecast: Forecast,
    hot_prospects: Vec<ProspectRow>,
    upcoming_follow_ups: Vec<UpcomingFollowUp>,
}

pub fn run(context: &CommandContext) -> CommandResult {
    let workspace = match context.open("dashboard") {
        Ok(workspace) => workspace,
        Err(failure) => return failure,
    };
    let table = workspace.store.prospects();
    let analytics = &workspace.config.analytics;

    let metrics = compute(table);
    let dashboard = Dashboard {
        as_of: workspace.today,
        pipeline_value: format_currency(metrics.total_pipeline),
        average_deal: format_currency(metrics.avg_deal),
        funnel: pipeline_funnel(table),
        forecast: forecast(table),
        hot_prospects: rows(leads::hot_prospects(table, analytics.hot_lead_threshold)),
        upcoming_follow_ups: agenda::upcoming_follow_ups(
            table,
            workspace.today,
            analytics.upcoming_follow_ups,
        ),
        metrics,
    };

    let message = format!(
        "{} prospects, {} contacted, pipeline {}",
        dashboard.metrics.total, dashboard.metrics.contacted, dashboard.pipeline_value
    );
    CommandResult::success_with("dashboard", message, dashboard)
}
