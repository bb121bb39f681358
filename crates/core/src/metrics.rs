//! Funnel, engagement and pipeline metrics over a snapshot of the prospect table.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{DealStage, Prospect};

const RATE_DP: u32 = 1;
const MONEY_DP: u32 = 2;

/// Stages shown in the pipeline funnel, top to bottom. Closed Lost is not part of the funnel.
pub const FUNNEL_STAGES: [DealStage; 5] = [
    DealStage::Prospecting,
    DealStage::MeetingScheduled,
    DealStage::ProposalSent,
    DealStage::Negotiation,
    DealStage::ClosedWon,
];

/// Aggregate metrics. Rates are percentages rounded to one decimal; every rate whose
/// denominator is zero is reported as zero.
///
/// `open_rate` and `reply_rate` may exceed 100: the opened/reply counters are stored
/// independently of the email slots and are trusted as-is.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub total: usize,
    pub contacted: usize,
    pub meetings: usize,
    pub proposals: usize,
    pub negotiations: usize,
    pub closed_won: usize,
    pub closed_lost: usize,
    pub total_emails_sent: usize,
    pub total_opened: u64,
    pub total_replies: u64,
    pub open_rate: Decimal,
    pub reply_rate: Decimal,
    pub contact_to_meeting: Decimal,
    pub meeting_to_proposal: Decimal,
    pub proposal_to_close: Decimal,
    pub avg_deal: Decimal,
    pub total_pipeline: Decimal,
    pub avg_lead_score: Decimal,
}

pub fn compute(table: &[Prospect]) -> MetricsSnapshot {
    let mut contacted = 0;
    let mut stage_counts = [0usize; 6];
    let mut total_emails_sent = 0;
    let mut total_opened = 0u64;
    let mut total_replies = 0u64;
    let mut known_deals = 0u64;
    let mut total_pipeline = Decimal::ZERO;
    let mut score_sum = 0u64;

    for prospect in table {
        if prospect.is_contacted() {
            contacted += 1;
        }
        if let Some(stage) = prospect.deal_stage {
            stage_counts[stage_index(stage)] += 1;
        }
        total_emails_sent += prospect.emails_dispatched();
        total_opened += u64::from(prospect.opened_emails);
        total_replies += u64::from(prospect.replies);
        if let Some(amount) = prospect.deal_value.amount() {
            known_deals += 1;
            total_pipeline += amount;
        }
        score_sum += u64::from(prospect.lead_score.value());
    }

    let count = |stage| stage_counts[stage_index(stage)];
    let meetings = count(DealStage::MeetingScheduled);
    let proposals = count(DealStage::ProposalSent);
    let closed_won = count(DealStage::ClosedWon);
    let sent = total_emails_sent as u64;

    MetricsSnapshot {
        total: table.len(),
        contacted,
        meetings,
        proposals,
        negotiations: count(DealStage::Negotiation),
        closed_won,
        closed_lost: count(DealStage::ClosedLost),
        total_emails_sent,
        total_opened,
        total_replies,
        open_rate: percentage(total_opened, sent),
        reply_rate: percentage(total_replies, sent),
        contact_to_meeting: percentage(meetings as u64, contacted as u64),
        meeting_to_proposal: percentage(proposals as u64, meetings as u64),
        proposal_to_close: percentage(closed_won as u64, proposals as u64),
        avg_deal: mean(total_pipeline, known_deals).round_dp(MONEY_DP),
        total_pipeline: total_pipeline.round_dp(MONEY_DP),
        avg_lead_score: mean(Decimal::from(score_sum), table.len() as u64).round_dp(RATE_DP),
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunnelStage {
    pub stage: DealStage,
    pub count: usize,
    /// Share of the first funnel stage, in percent.
    pub percent_of_initial: Decimal,
}

pub fn pipeline_funnel(table: &[Prospect]) -> Vec<FunnelStage> {
    let counts = FUNNEL_STAGES
        .map(|stage| table.iter().filter(|prospect| prospect.is_in_stage(stage)).count());
    let initial = counts[0] as u64;

    FUNNEL_STAGES
        .iter()
        .zip(counts)
        .map(|(stage, count)| FunnelStage {
            stage: *stage,
            count,
            percent_of_initial: percentage(count as u64, initial),
        })
        .collect()
}

/// `numerator / denominator * 100` rounded to one decimal, zero when the denominator is zero.
pub(crate) fn percentage(numerator: u64, denominator: u64) -> Decimal {
    if denominator == 0 {
        return Decimal::ZERO;
    }
    (Decimal::from(numerator) * Decimal::ONE_HUNDRED / Decimal::from(denominator)).round_dp(RATE_DP)
}

/// Arithmetic mean, zero for an empty population. Not rounded.
pub(crate) fn mean(sum: Decimal, count: u64) -> Decimal {
    if count == 0 {
        return Decimal::ZERO;
    }
    sum / Decimal::from(count)
}

fn stage_index(stage: DealStage) -> usize {
    match stage {
        DealStage::Prospecting => 0,
        DealStage::MeetingScheduled => 1,
        DealStage::ProposalSent => 2,
        DealStage::Negotiation => 3,
        DealStage::ClosedWon => 4,
        DealStage::ClosedLost => 5,
    }
}
