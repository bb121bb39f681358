//! Filtering, search and sort for the prospect browser.

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{DealStage, LeadStatus, Priority, Prospect};

/// Prospect filter. Empty selections do not constrain; all populated criteria must hold.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProspectFilter {
    pub statuses: Vec<LeadStatus>,
    pub industries: Vec<String>,
    pub stages: Vec<DealStage>,
    pub priorities: Vec<Priority>,
    pub owners: Vec<String>,
    pub min_score: u8,
    pub max_score: u8,
    pub added_from: Option<NaiveDate>,
    pub added_to: Option<NaiveDate>,
    /// Case-insensitive substring over name, company, email and notes.
    pub search: Option<String>,
}

impl Default for ProspectFilter {
    fn default() -> Self {
        Self {
            statuses: Vec::new(),
            industries: Vec::new(),
            stages: Vec::new(),
            priorities: Vec::new(),
            owners: Vec::new(),
            min_score: 0,
            max_score: 100,
            added_from: None,
            added_to: None,
            search: None,
        }
    }
}

impl ProspectFilter {
    pub fn matches(&self, prospect: &Prospect) -> bool {
        let score = prospect.lead_score.value();
        selected(&self.statuses, &prospect.lead_status)
            && selected(&self.industries, &prospect.industry)
            && (self.stages.is_empty()
                || prospect.deal_stage.map(|stage| self.stages.contains(&stage)).unwrap_or(false))
            && (self.priorities.is_empty()
                || prospect
                    .priority
                    .map(|priority| self.priorities.contains(&priority))
                    .unwrap_or(false))
            && selected(&self.owners, &prospect.owner)
            && (self.min_score..=self.max_score).contains(&score)
            && self.added_in_range(prospect.date_added)
            && self.search_matches(prospect)
    }

    fn added_in_range(&self, added: Option<NaiveDate>) -> bool {
        if self.added_from.is_none() && self.added_to.is_none() {
            return true;
        }
        let Some(added) = added else {
            return false;
        };
        self.added_from.map_or(true, |from| added >= from)
            && self.added_to.map_or(true, |to| added <= to)
    }

    fn search_matches(&self, prospect: &Prospect) -> bool {
        let term = self.search.as_deref().map(str::trim).filter(|term| !term.is_empty());
        let Some(term) = term else {
            return true;
        };
        let needle = term.to_lowercase();
        [&prospect.name, &prospect.company, &prospect.email, &prospect.notes]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

fn selected<T: PartialEq>(selection: &[T], value: &T) -> bool {
    selection.is_empty() || selection.contains(value)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Highest score first.
    #[default]
    LeadScore,
    /// Most recently added first; unset dates last.
    DateAdded,
    Name,
    Company,
    /// Smallest deal first; unknown values last.
    DealValue,
}

impl std::str::FromStr for SortKey {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "lead_score" | "score" => Ok(Self::LeadScore),
            "date_added" | "added" => Ok(Self::DateAdded),
            "name" => Ok(Self::Name),
            "company" => Ok(Self::Company),
            "deal_value" | "value" => Ok(Self::DealValue),
            other => Err(format!(
                "unsupported sort key `{other}` \
                 (expected lead_score|date_added|name|company|deal_value)"
            )),
        }
    }
}

/// Rows matching `filter`, stably ordered by `sort`.
pub fn select<'a>(
    table: &'a [Prospect],
    filter: &ProspectFilter,
    sort: SortKey,
) -> Vec<&'a Prospect> {
    let mut rows: Vec<&Prospect> =
        table.iter().filter(|prospect| filter.matches(prospect)).collect();
    rows.sort_by(|left, right| compare(left, right, sort));
    rows
}

fn compare(left: &Prospect, right: &Prospect, sort: SortKey) -> Ordering {
    match sort {
        SortKey::LeadScore => right.lead_score.cmp(&left.lead_score),
        SortKey::DateAdded => descending_none_last(left.date_added, right.date_added),
        SortKey::Name => left.name.cmp(&right.name),
        SortKey::Company => left.company.cmp(&right.company),
        SortKey::DealValue => match (left.deal_value.amount(), right.deal_value.amount()) {
            (Some(left), Some(right)) => left.cmp(&right),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
    }
}

fn descending_none_last<T: Ord>(left: Option<T>, right: Option<T>) -> Ordering {
    match (left, right) {
        (Some(left), Some(right)) => right.cmp(&left),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
