//! Team aggregation and ranking over approved scores.

use std::cmp::Ordering;

use crate::dao::models::{ScoreEntity, ScoreStatus};
use crate::state::scoring::signed;

/// Sums of a team's approved scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TeamTotals {
    /// Sum of strokes.
    pub gross_total: u32,
    /// Sum of net scores; negative for a team playing well under its handicaps.
    pub net_total: i32,
    /// Sum of par over the holes played.
    pub par_total: u32,
    /// Handicap strokes received over the holes played.
    pub shots_total: u32,
    /// Number of approved scores counted.
    pub holes_played: u32,
}

impl TeamTotals {
    /// Aggregate the approved scores among `scores`; other statuses are ignored.
    pub fn from_scores<'a>(scores: impl IntoIterator<Item = &'a ScoreEntity>) -> Self {
        scores
            .into_iter()
            .filter(|score| score.status == ScoreStatus::Approved)
            .fold(Self::default(), |mut totals, score| {
                totals.gross_total += score.strokes;
                totals.net_total += score.net_score;
                totals.par_total += score.par;
                totals.shots_total += score.shots_received;
                totals.holes_played += 1;
                totals
            })
    }

    /// Net total minus par total.
    pub fn net_relative_to_par(&self) -> i32 {
        self.net_total - signed(self.par_total)
    }

    /// Gross total minus par total.
    pub fn gross_relative_to_par(&self) -> i32 {
        signed(self.gross_total) - signed(self.par_total)
    }
}

/// Which total a ranking sorts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankBy {
    /// Lowest net total first.
    Net,
    /// Lowest gross total first.
    Gross,
}

/// Ordering used by the leaderboard and team listings.
///
/// Lower totals rank first, except that a team with no holes played always
/// ranks after every team that has played. Two empty teams compare equal.
pub fn compare_totals(a: &TeamTotals, b: &TeamTotals, by: RankBy) -> Ordering {
    match (a.holes_played == 0, b.holes_played == 0) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => match by {
            RankBy::Net => a.net_total.cmp(&b.net_total),
            RankBy::Gross => a.gross_total.cmp(&b.gross_total),
        },
    }
}

/// Stable in-place ranking of `entries` by their totals.
pub fn rank<T>(entries: &mut [T], by: RankBy, totals: impl Fn(&T) -> &TeamTotals) {
    entries.sort_by(|a, b| compare_totals(totals(a), totals(b), by));
}

#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use uuid::Uuid;

    use super::*;

    fn totals(net_total: i32, holes_played: u32) -> TeamTotals {
        TeamTotals {
            gross_total: u32::try_from(net_total.max(0)).unwrap() + holes_played,
            net_total,
            holes_played,
            ..TeamTotals::default()
        }
    }

    fn score(strokes: u32, net_score: i32, status: ScoreStatus) -> ScoreEntity {
        ScoreEntity {
            id: Uuid::new_v4(),
            player_id: Uuid::new_v4(),
            team_id: Uuid::new_v4(),
            hole: 1,
            strokes,
            putts: 2,
            par: 4,
            hole_index: 18,
            net_score,
            shots_received: strokes.abs_diff(u32::try_from(net_score).unwrap()),
            status,
            input_by: Uuid::new_v4(),
            approved_by: None,
            approved_at: None,
            updated_at: SystemTime::now(),
        }
    }

    #[test]
    fn empty_teams_rank_last() {
        let mut teams = vec![("A", totals(10, 3)), ("B", totals(5, 2)), ("C", totals(0, 0))];
        rank(&mut teams, RankBy::Net, |(_, totals)| totals);
        let order: Vec<_> = teams.iter().map(|(name, _)| *name).collect();
        assert_eq!(order, ["B", "A", "C"]);
    }

    #[test]
    fn empty_teams_keep_their_relative_order() {
        let mut teams = vec![("X", totals(0, 0)), ("Y", totals(0, 0)), ("Z", totals(-2, 1))];
        rank(&mut teams, RankBy::Gross, |(_, totals)| totals);
        let order: Vec<_> = teams.iter().map(|(name, _)| *name).collect();
        assert_eq!(order, ["Z", "X", "Y"]);
    }

    #[test]
    fn only_approved_scores_count() {
        let scores = [
            score(5, 4, ScoreStatus::Approved),
            score(3, 3, ScoreStatus::Approved),
            score(9, 8, ScoreStatus::Pending),
            score(7, 7, ScoreStatus::Rejected),
        ];
        let totals = TeamTotals::from_scores(&scores);
        assert_eq!(totals.gross_total, 8);
        assert_eq!(totals.net_total, 7);
        assert_eq!(totals.par_total, 8);
        assert_eq!(totals.shots_total, 1);
        assert_eq!(totals.holes_played, 2);
        assert_eq!(totals.net_relative_to_par(), -1);
        assert_eq!(totals.gross_relative_to_par(), 0);
    }
}
