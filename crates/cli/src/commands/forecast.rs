use coldcrm_core::forecast::{conservative_factor, forecast, stage_weight};
use coldcrm_core::{format_currency, DealStage, Forecast};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::commands::{CommandContext, CommandResult};

#[derive(Debug, Serialize)]
struct ForecastReport {
    projection: Forecast,
    conservative_factor: Decimal,
    stages: Vec<StageLine>,
}

#[derive(Debug, Serialize)]
struct StageLine {
    stage: Option<&'static str>,
    deals: usize,
    value: Decimal,
    weight: Decimal,
    weighted: Decimal,
}

const STAGES: [Option<DealStage>; 7] = [
    Some(DealStage::Prospecting),
    Some(DealStage::MeetingScheduled),
    Some(DealStage::ProposalSent),
    Some(DealStage::Negotiation),
    Some(DealStage::ClosedWon),
    Some(DealStage::ClosedLost),
    None,
];

pub fn run(context: &CommandContext) -> CommandResult {
    let workspace = match context.open("forecast") {
        Ok(workspace) => workspace,
        Err(failure) => return failure,
    };
    let table = workspace.store.prospects();

    let stages = STAGES
        .iter()
        .filter_map(|stage| {
            let in_stage: Vec<_> =
                table.iter().filter(|prospect| prospect.deal_stage == *stage).collect();
            if in_stage.is_empty() {
                return None;
            }
            let value: Decimal =
                in_stage.iter().map(|prospect| prospect.deal_value.or_zero()).sum();
            let weight = stage_weight(*stage);
            Some(StageLine {
                stage: stage.map(DealStage::label),
                deals: in_stage.len(),
                value,
                weight,
                weighted: value * weight,
            })
        })
        .collect();

    let projection = forecast(table);
    let message = format!(
        "conservative {}, weighted {}, optimistic {}",
        format_currency(projection.conservative),
        format_currency(projection.weighted),
        format_currency(projection.optimistic)
    );
    let report = ForecastReport { projection, conservative_factor: conservative_factor(), stages };
    CommandResult::success_with("forecast", message, report)
}
