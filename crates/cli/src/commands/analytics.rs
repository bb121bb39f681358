use clap::Args;
use coldcrm_core::leads::{self, Engagement, ScoreStats};
use coldcrm_core::segments::{self, SegmentAmount, SegmentCounts};
use coldcrm_core::trends::{self, DatedCount};
use coldcrm_core::{aggregate, GroupKey, Reducer, RowPredicate, Segment};
use serde::Serialize;

use crate::commands::{rows, CommandContext, CommandResult, ProspectRow};

#[derive(Debug, Clone, Default, Args)]
pub struct AnalyticsArgs {
    #[arg(long, help = "Also break the table down by industry | source | company_size | owner")]
    pub group_by: Option<String>,
}

#[derive(Debug, Serialize)]
struct Analytics {
    segments: Segments,
    leads: LeadInsights,
    trends: Trends,
    #[serde(skip_serializing_if = "Option::is_none")]
    breakdown: Option<Breakdown>,
}

#[derive(Debug, Serialize)]
struct Segments {
    industry_funnel: Vec<SegmentCounts>,
    source_funnel: Vec<SegmentCounts>,
    rep_summary: Vec<SegmentCounts>,
    revenue_by_industry: Vec<SegmentAmount>,
    deal_size_by_company_size: Vec<SegmentAmount>,
    opens_by_industry: Vec<(String, usize)>,
}

#[derive(Debug, Serialize)]
struct LeadInsights {
    hot_lead_threshold: u8,
    hot: Vec<ProspectRow>,
    top: Vec<ProspectRow>,
    score_stats: ScoreStats,
    engagement: Vec<Engagement>,
}

#[derive(Debug, Serialize)]
struct Trends {
    weekly_additions: Vec<DatedCount>,
    email_timeline: Vec<DatedCount>,
}

/// Generic per-group view: prospects, contacted, pipeline value and average known deal.
#[derive(Debug, Serialize)]
struct Breakdown {
    group_by: GroupKey,
    columns: [&'static str; 4],
    segments: Vec<Segment>,
}

fn parse_group_key(raw: &str) -> Result<GroupKey, String> {
    match raw.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
        "industry" => Ok(GroupKey::Industry),
        "source" => Ok(GroupKey::Source),
        "company_size" | "size" => Ok(GroupKey::CompanySize),
        "owner" | "rep" => Ok(GroupKey::Owner),
        other => Err(format!(
            "unsupported group key `{other}` (expected industry|source|company_size|owner)"
        )),
    }
}

pub fn run(context: &CommandContext, args: &AnalyticsArgs) -> CommandResult {
    let group_by = match args.group_by.as_deref().map(parse_group_key).transpose() {
        Ok(group_by) => group_by,
        Err(message) => return CommandResult::bad_request("analytics", message),
    };
    let workspace = match context.open("analytics") {
        Ok(workspace) => workspace,
        Err(failure) => return failure,
    };
    let table = workspace.store.prospects();
    let settings = &workspace.config.analytics;

    let analytics = Analytics {
        segments: Segments {
            industry_funnel: segments::industry_funnel(table),
            source_funnel: segments::source_funnel(table),
            rep_summary: segments::rep_summary(table),
            revenue_by_industry: segments::revenue_by_industry(table),
            deal_size_by_company_size: segments::deal_size_by_company_size(table),
            opens_by_industry: segments::opens_by_industry(table),
        },
        leads: LeadInsights {
            hot_lead_threshold: settings.hot_lead_threshold,
            hot: rows(leads::hot_prospects(table, settings.hot_lead_threshold)),
            top: rows(leads::top_prospects(table, settings.top_prospects)),
            score_stats: leads::score_stats(table),
            engagement: leads::engagement_leaderboard(table, settings.top_prospects),
        },
        trends: Trends {
            weekly_additions: trends::weekly_additions(table),
            email_timeline: trends::email_timeline(table),
        },
        breakdown: group_by.map(|key| Breakdown {
            group_by: key,
            columns: ["prospects", "contacted", "pipeline", "average_deal"],
            segments: aggregate(
                table,
                key,
                &[
                    Reducer::CountWhere(RowPredicate::Any),
                    Reducer::CountWhere(RowPredicate::Contacted),
                    Reducer::SumDealValue,
                    Reducer::MeanDealValue,
                ],
            ),
        }),
    };

    let message = format!(
        "{} industries, {} hot prospects",
        analytics.segments.industry_funnel.len(),
        analytics.leads.hot.len()
    );
    CommandResult::success_with("analytics", message, analytics)
}
