//! Lead-score insights: hot prospects, leaderboards and score statistics.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::Prospect;
use crate::metrics::mean;

/// Prospects scoring strictly above `threshold`, highest first. Ties keep table order.
pub fn hot_prospects(table: &[Prospect], threshold: u8) -> Vec<&Prospect> {
    let mut hot: Vec<&Prospect> =
        table.iter().filter(|prospect| prospect.lead_score.value() > threshold).collect();
    hot.sort_by(|left, right| right.lead_score.cmp(&left.lead_score));
    hot
}

pub fn top_prospects(table: &[Prospect], limit: usize) -> Vec<&Prospect> {
    let mut ranked: Vec<&Prospect> = table.iter().collect();
    ranked.sort_by(|left, right| right.lead_score.cmp(&left.lead_score));
    ranked.truncate(limit);
    ranked
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreStats {
    pub average: Decimal,
    pub highest: u8,
    pub lowest: u8,
}

pub fn score_stats(table: &[Prospect]) -> ScoreStats {
    let scores = table.iter().map(|prospect| prospect.lead_score.value());
    let (Some(highest), Some(lowest)) = (scores.clone().max(), scores.clone().min()) else {
        return ScoreStats::default();
    };
    let sum: u64 = scores.map(u64::from).sum();

    let average = mean(Decimal::from(sum), table.len() as u64).round_dp(1);
    ScoreStats { average, highest, lowest }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engagement {
    pub name: String,
    pub company: String,
    pub points: u64,
}

/// Engagement leaderboard, most engaged first. Prospects with no engagement are left out.
pub fn engagement_leaderboard(table: &[Prospect], limit: usize) -> Vec<Engagement> {
    let mut rows: Vec<Engagement> = table
        .iter()
        .filter(|prospect| prospect.engagement_points() > 0)
        .map(|prospect| Engagement {
            name: prospect.name.clone(),
            company: prospect.company.clone(),
            points: prospect.engagement_points(),
        })
        .collect();
    rows.sort_by(|left, right| right.points.cmp(&left.points));
    rows.truncate(limit);
    rows
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{engagement_leaderboard, hot_prospects, score_stats, top_prospects};
    use crate::domain::{LeadScore, Prospect};
    use crate::testing::prospect;

    fn scored(scores: &[i64]) -> Vec<Prospect> {
        scores
            .iter()
            .enumerate()
            .map(|(index, score)| {
                let mut row = prospect(index as u64 + 1);
                row.lead_score = LeadScore::new(*score).expect("score");
                row
            })
            .collect()
    }

    fn ids(rows: &[&Prospect]) -> Vec<u64> {
        rows.iter().map(|row| row.id.0).collect()
    }

    #[test]
    fn hot_threshold_is_exclusive() {
        let rows = scored(&[85, 92, 78, 90, 72, 88]);

        assert_eq!(ids(&hot_prospects(&rows, 85)), [2, 4, 6]);
    }

    #[test]
    fn top_prospects_keep_table_order_on_ties() {
        let rows = scored(&[85, 92, 85, 60]);

        assert_eq!(ids(&top_prospects(&rows, 3)), [2, 1, 3]);
        assert!(top_prospects(&rows, 0).is_empty());
    }

    #[test]
    fn score_stats_summarise_the_table() {
        let stats = score_stats(&scored(&[85, 92, 78, 90, 72, 88]));

        assert_eq!(stats.average, Decimal::new(842, 1));
        assert_eq!(stats.highest, 92);
        assert_eq!(stats.lowest, 72);
    }

    #[test]
    fn score_stats_of_empty_table_are_zero() {
        let stats = score_stats(&[]);
        assert_eq!(stats.average, Decimal::ZERO);
        assert_eq!(stats.highest, 0);
    }

    #[test]
    fn leaderboard_ranks_replies_above_opens() {
        let mut rows = scored(&[50, 50, 50]);
        rows[0].opened_emails = 3;
        rows[1].opened_emails = 1;
        rows[1].replies = 2;

        let board = engagement_leaderboard(&rows, 10);

        assert_eq!(board.len(), 2);
        assert_eq!(board[0].points, 5);
        assert_eq!(board[1].points, 3);
    }
}
