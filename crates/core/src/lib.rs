pub mod agenda;
pub mod campaign;
pub mod config;
pub mod currency;
pub mod domain;
pub mod errors;
pub mod forecast;
pub mod leads;
pub mod metrics;
pub mod query;
pub mod segments;
pub mod templates;
pub mod trends;

#[cfg(test)]
mod testing;

pub use campaign::{CampaignTarget, LaunchReport, SequenceDelays};
pub use currency::{format_amount, format_currency, parse_currency, DealValue};
pub use domain::{
    DealStage, EmailSlot, LeadScore, LeadStatus, OutreachState, Priority, Prospect, ProspectId,
    EMAIL_SLOTS,
};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use forecast::{forecast, Forecast};
pub use metrics::{compute, pipeline_funnel, FunnelStage, MetricsSnapshot};
pub use query::{select, ProspectFilter, SortKey};
pub use segments::{aggregate, GroupKey, Reducer, ReducedValue, RowPredicate, Segment};
