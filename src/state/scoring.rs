//! Handicap stroke allocation and net scoring.
//!
//! Every function here is pure: no storage, no clock.

use std::fmt;

const HOLES_PER_ROUND: u32 = 18;

/// Handicap shots a player receives on a hole of the given stroke index.
///
/// One shot per full 18 handicap points on every hole, plus one extra shot on
/// the `handicap % 18` hardest holes (lowest index first).
pub fn shots_received(handicap: u32, hole_index: u8) -> u32 {
    let base = handicap / HOLES_PER_ROUND;
    let remainder = handicap % HOLES_PER_ROUND;
    base + u32::from(u32::from(hole_index) <= remainder)
}

/// Gross strokes minus the shots received on the hole. Not clamped; may be negative.
pub fn net_score(gross_strokes: u32, handicap: u32, hole_index: u8) -> i32 {
    signed(gross_strokes) - signed(shots_received(handicap, hole_index))
}

/// Net total over `(gross strokes, hole index)` pairs for one handicap.
pub fn total_net_score(scores: &[(u32, u8)], handicap: u32) -> i32 {
    scores
        .iter()
        .map(|&(strokes, index)| net_score(strokes, handicap, index))
        .sum()
}

/// Human label for a number of shots received.
pub fn format_shots_received(shots: u32) -> String {
    match shots {
        0 => "No shots".to_owned(),
        1 => "1 shot".to_owned(),
        n => format!("{n} shots"),
    }
}

pub(crate) fn signed(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// Classification of a score against par.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParLabel {
    /// Three or more under par.
    Albatross,
    /// Two under.
    Eagle,
    /// One under.
    Birdie,
    Par,
    /// One over.
    Bogey,
    /// Two over.
    DoubleBogey,
    /// Three or more over par, carrying the strokes over.
    Over(i32),
}

impl ParLabel {
    fn classify(relative: i32) -> Self {
        match relative {
            i32::MIN..=-3 => ParLabel::Albatross,
            -2 => ParLabel::Eagle,
            -1 => ParLabel::Birdie,
            0 => ParLabel::Par,
            1 => ParLabel::Bogey,
            2 => ParLabel::DoubleBogey,
            n => ParLabel::Over(n),
        }
    }

    /// Emoji shown next to the score in feed messages.
    pub fn emoji(self) -> &'static str {
        match self {
            ParLabel::Albatross => "🦅🦅",
            ParLabel::Eagle => "🦅",
            ParLabel::Birdie => "🐦",
            ParLabel::Par => "✅",
            ParLabel::Bogey => "😐",
            ParLabel::DoubleBogey => "😬",
            ParLabel::Over(_) => "💀",
        }
    }
}

impl fmt::Display for ParLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParLabel::Albatross => f.write_str("Albatross"),
            ParLabel::Eagle => f.write_str("Eagle"),
            ParLabel::Birdie => f.write_str("Birdie"),
            ParLabel::Par => f.write_str("Par"),
            ParLabel::Bogey => f.write_str("Bogey"),
            ParLabel::DoubleBogey => f.write_str("Double Bogey"),
            ParLabel::Over(n) => write!(f, "+{n}"),
        }
    }
}

/// A score expressed against par.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelativeToPar {
    /// `score - par`.
    pub relative: i32,
    pub label: ParLabel,
}

impl RelativeToPar {
    /// `"E"` for level par, otherwise the signed difference (`"+3"`, `"-2"`).
    pub fn display(&self) -> String {
        match self.relative {
            0 => "E".to_owned(),
            n if n > 0 => format!("+{n}"),
            n => n.to_string(),
        }
    }
}

/// Classify `score` (net or gross) against `par`.
pub fn score_relative_to_par(score: i32, par: i32) -> RelativeToPar {
    let relative = score - par;
    RelativeToPar {
        relative,
        label: ParLabel::classify(relative),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_allocation_formula_everywhere() {
        for handicap in 0..=54u32 {
            for index in 1..=18u8 {
                let expected = handicap / 18 + u32::from(u32::from(index) <= handicap % 18);
                assert_eq!(shots_received(handicap, index), expected);
            }
        }
    }

    #[test]
    fn handicap_eighteen_gives_one_shot_per_hole() {
        assert!((1..=18u8).all(|index| shots_received(18, index) == 1));
    }

    #[test]
    fn handicap_nineteen_adds_a_shot_on_the_hardest_hole() {
        assert_eq!(shots_received(19, 1), 2);
        assert_eq!(shots_received(19, 2), 1);
    }

    #[test]
    fn known_allocations() {
        assert_eq!(shots_received(20, 5), 1);
        assert_eq!(shots_received(20, 2), 2);
        assert_eq!(shots_received(10, 5), 1);
        assert_eq!(shots_received(0, 1), 0);
        assert_eq!(shots_received(10, 11), 0);
    }

    #[test]
    fn net_score_can_go_negative() {
        assert_eq!(net_score(5, 10, 5), 4);
        assert_eq!(net_score(1, 54, 1), -2);
    }

    #[test]
    fn totals_net_over_holes() {
        assert_eq!(total_net_score(&[(5, 1), (4, 18), (3, 2)], 1), 11);
        assert_eq!(total_net_score(&[], 12), 0);
    }

    #[test]
    fn labels_relative_to_par() {
        let cases = [
            (1, 5, "Albatross", "-4"),
            (2, 5, "Albatross", "-3"),
            (2, 4, "Eagle", "-2"),
            (3, 4, "Birdie", "-1"),
            (4, 4, "Par", "E"),
            (5, 4, "Bogey", "+1"),
            (6, 4, "Double Bogey", "+2"),
            (8, 4, "+4", "+4"),
        ];
        for (score, par, label, display) in cases {
            let relative = score_relative_to_par(score, par);
            assert_eq!(relative.label.to_string(), label);
            assert_eq!(relative.display(), display);
        }
        assert_eq!(score_relative_to_par(3, 4).label.emoji(), "🐦");
    }

    #[test]
    fn formats_shots_received() {
        assert_eq!(format_shots_received(0), "No shots");
        assert_eq!(format_shots_received(1), "1 shot");
        assert_eq!(format_shots_received(3), "3 shots");
    }
}
