//! Time series over prospect and email dates.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::Prospect;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatedCount {
    pub date: NaiveDate,
    pub count: usize,
}

/// Prospects added per week, keyed by the Monday that starts the week. Rows without a date
/// added are skipped.
pub fn weekly_additions(table: &[Prospect]) -> Vec<DatedCount> {
    tally(table.iter().filter_map(|prospect| prospect.date_added).map(week_start))
}

/// Dispatched emails per day.
pub fn email_timeline(table: &[Prospect]) -> Vec<DatedCount> {
    tally(
        table
            .iter()
            .flat_map(|prospect| prospect.emails.iter().filter_map(|slot| slot.sent_on())),
    )
}

pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

fn tally(dates: impl Iterator<Item = NaiveDate>) -> Vec<DatedCount> {
    let mut counts: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for date in dates {
        *counts.entry(date).or_default() += 1;
    }
    counts.into_iter().map(|(date, count)| DatedCount { date, count }).collect()
}
