use crate::domain::{Prospect, ProspectId};

/// Blank prospect in its initial state: New, Prospecting, no deal value, score 0.
pub(crate) fn prospect(id: u64) -> Prospect {
    Prospect::new(ProspectId(id), format!("Prospect {id}"), format!("Company {id}"))
}

pub(crate) fn in_industry(id: u64, industry: &str) -> Prospect {
    let mut prospect = prospect(id);
    prospect.industry = industry.to_string();
    prospect
}
