//! Stage-weighted revenue projections.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{DealStage, Prospect};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Forecast {
    /// 70% of the value sitting in Proposal Sent and Negotiation.
    pub conservative: Decimal,
    /// Every deal past Prospecting at full value.
    pub optimistic: Decimal,
    /// Each deal discounted by the likelihood of its stage closing.
    pub weighted: Decimal,
}

/// Share of late-stage value counted by the conservative projection.
pub fn conservative_factor() -> Decimal {
    Decimal::new(7, 1)
}

/// Probability that a deal in `stage` closes. Absent stages weigh nothing.
pub fn stage_weight(stage: Option<DealStage>) -> Decimal {
    match stage {
        Some(DealStage::Prospecting) => Decimal::new(10, 2),
        Some(DealStage::MeetingScheduled) => Decimal::new(20, 2),
        Some(DealStage::ProposalSent) => Decimal::new(50, 2),
        Some(DealStage::Negotiation) => Decimal::new(80, 2),
        Some(DealStage::ClosedWon) => Decimal::ONE,
        Some(DealStage::ClosedLost) | None => Decimal::ZERO,
    }
}

pub fn forecast(table: &[Prospect]) -> Forecast {
    let mut late_stage = Decimal::ZERO;
    let mut optimistic = Decimal::ZERO;
    let mut weighted = Decimal::ZERO;

    for prospect in table {
        let value = prospect.deal_value.or_zero();
        if matches!(prospect.deal_stage, Some(DealStage::Negotiation | DealStage::ProposalSent)) {
            late_stage += value;
        }
        if prospect.deal_stage != Some(DealStage::Prospecting) {
            optimistic += value;
        }
        weighted += value * stage_weight(prospect.deal_stage);
    }

    Forecast { conservative: late_stage * conservative_factor(), optimistic, weighted }
}
