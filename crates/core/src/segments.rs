//! Group-by reductions over the prospect table, used for per-segment charts.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{DealStage, LeadStatus, OutreachState, Prospect};
use crate::metrics::mean;

const MONEY_DP: u32 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKey {
    Industry,
    Source,
    CompanySize,
    Owner,
}

impl GroupKey {
    fn value_of(self, prospect: &Prospect) -> &str {
        match self {
            Self::Industry => &prospect.industry,
            Self::Source => &prospect.source,
            Self::CompanySize => &prospect.company_size,
            Self::Owner => &prospect.owner,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RowPredicate {
    Any,
    /// Lead status is anything but New.
    Contacted,
    StatusIs(LeadStatus),
    StageIn(Vec<DealStage>),
}

impl RowPredicate {
    pub fn matches(&self, prospect: &Prospect) -> bool {
        match self {
            Self::Any => true,
            Self::Contacted => prospect.is_contacted(),
            Self::StatusIs(status) => prospect.lead_status == *status,
            Self::StageIn(stages) => {
                prospect.deal_stage.map(|stage| stages.contains(&stage)).unwrap_or(false)
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reducer {
    CountWhere(RowPredicate),
    /// Email slots per group currently in the given state.
    CountEmailsIn(OutreachState),
    /// Sum of deal values, unknown values counting as zero.
    SumDealValue,
    /// Mean of known deal values, zero when the group has none.
    MeanDealValue,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReducedValue {
    Count(usize),
    Amount(Decimal),
}

impl ReducedValue {
    pub fn as_count(&self) -> Option<usize> {
        match self {
            Self::Count(count) => Some(*count),
            Self::Amount(_) => None,
        }
    }

    pub fn as_amount(&self) -> Option<Decimal> {
        match self {
            Self::Amount(amount) => Some(*amount),
            Self::Count(_) => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub key: String,
    pub values: Vec<ReducedValue>,
}

/// Groups rows by exact key match and applies every reducer to each group. Groups come out in
/// the order their key first appears in `table`; empty groups are never produced.
pub fn aggregate(table: &[Prospect], key: GroupKey, reducers: &[Reducer]) -> Vec<Segment> {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<&Prospect>> = HashMap::new();

    for prospect in table {
        let value = key.value_of(prospect);
        groups
            .entry(value)
            .or_insert_with(|| {
                order.push(value);
                Vec::new()
            })
            .push(prospect);
    }

    order
        .into_iter()
        .map(|value| {
            let members = groups.get(value).map(Vec::as_slice).unwrap_or_default();
            Segment {
                key: value.to_string(),
                values: reducers.iter().map(|reducer| reduce(reducer, members)).collect(),
            }
        })
        .collect()
}

fn reduce(reducer: &Reducer, members: &[&Prospect]) -> ReducedValue {
    match reducer {
        Reducer::CountWhere(predicate) => {
            let count = members.iter().filter(|prospect| predicate.matches(prospect)).count();
            ReducedValue::Count(count)
        }
        Reducer::CountEmailsIn(state) => ReducedValue::Count(
            members
                .iter()
                .flat_map(|prospect| prospect.emails.iter())
                .filter(|slot| slot.state() == *state)
                .count(),
        ),
        Reducer::SumDealValue => ReducedValue::Amount(
            members
                .iter()
                .map(|prospect| prospect.deal_value.or_zero())
                .sum::<Decimal>()
                .round_dp(MONEY_DP),
        ),
        Reducer::MeanDealValue => {
            let known: Vec<Decimal> =
                members.iter().filter_map(|prospect| prospect.deal_value.amount()).collect();
            let total = known.iter().copied().sum::<Decimal>();
            ReducedValue::Amount(mean(total, known.len() as u64).round_dp(MONEY_DP))
        }
    }
}

/// Two-series segment row used by the prebuilt reports.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentCounts {
    pub key: String,
    pub first: usize,
    pub second: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentAmount {
    pub key: String,
    pub amount: Decimal,
}

fn counts_report(
    table: &[Prospect],
    key: GroupKey,
    first: RowPredicate,
    second: RowPredicate,
) -> Vec<SegmentCounts> {
    aggregate(table, key, &[Reducer::CountWhere(first), Reducer::CountWhere(second)])
        .into_iter()
        .map(|segment| SegmentCounts {
            first: count_at(&segment, 0),
            second: count_at(&segment, 1),
            key: segment.key,
        })
        .collect()
}

fn amount_report(table: &[Prospect], key: GroupKey, reducer: Reducer) -> Vec<SegmentAmount> {
    aggregate(table, key, &[reducer])
        .into_iter()
        .map(|segment| SegmentAmount {
            amount: segment.values.first().and_then(ReducedValue::as_amount).unwrap_or_default(),
            key: segment.key,
        })
        .collect()
}

fn count_at(segment: &Segment, index: usize) -> usize {
    segment.values.get(index).and_then(ReducedValue::as_count).unwrap_or_default()
}

/// Per industry: contacted prospects (`first`) and prospects with a meeting scheduled (`second`).
pub fn industry_funnel(table: &[Prospect]) -> Vec<SegmentCounts> {
    counts_report(
        table,
        GroupKey::Industry,
        RowPredicate::Contacted,
        RowPredicate::StageIn(vec![DealStage::MeetingScheduled]),
    )
}

/// Per lead source: contacted prospects (`first`) and prospects advanced to a meeting or
/// proposal (`second`).
pub fn source_funnel(table: &[Prospect]) -> Vec<SegmentCounts> {
    counts_report(
        table,
        GroupKey::Source,
        RowPredicate::Contacted,
        RowPredicate::StageIn(vec![DealStage::MeetingScheduled, DealStage::ProposalSent]),
    )
}

/// Per owner: prospects owned (`first`) and meetings scheduled (`second`).
pub fn rep_summary(table: &[Prospect]) -> Vec<SegmentCounts> {
    counts_report(
        table,
        GroupKey::Owner,
        RowPredicate::Any,
        RowPredicate::StageIn(vec![DealStage::MeetingScheduled]),
    )
}

pub fn revenue_by_industry(table: &[Prospect]) -> Vec<SegmentAmount> {
    amount_report(table, GroupKey::Industry, Reducer::SumDealValue)
}

pub fn deal_size_by_company_size(table: &[Prospect]) -> Vec<SegmentAmount> {
    amount_report(table, GroupKey::CompanySize, Reducer::MeanDealValue)
}

/// Per industry: email slots currently sitting in the Opened state.
pub fn opens_by_industry(table: &[Prospect]) -> Vec<(String, usize)> {
    aggregate(table, GroupKey::Industry, &[Reducer::CountEmailsIn(OutreachState::Opened)])
        .into_iter()
        .map(|segment| {
            let opens = count_at(&segment, 0);
            (segment.key, opens)
        })
        .collect()
}
