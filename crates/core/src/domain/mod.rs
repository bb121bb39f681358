pub mod outreach;
pub mod prospect;

pub use outreach::{EmailSlot, OutreachState, EMAIL_SLOTS};
pub use prospect::{DealStage, LeadScore, LeadStatus, Priority, Prospect, ProspectId};
