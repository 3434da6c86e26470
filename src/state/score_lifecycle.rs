use thiserror::Error;

use crate::dao::models::ScoreStatus;

/// Events that move a score through its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreEvent {
    /// A player (or teammate) types the score in, or retypes it.
    Submit,
    /// A captain of the score's team accepts it.
    Approve,
    /// A captain of the score's team turns it down.
    Reject,
}

/// Error returned when an event cannot be applied to a score in its current status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid score transition: {event:?} cannot be applied while {from:?}")]
pub struct InvalidScoreTransition {
    /// Status the score was in, `None` when the score does not exist yet.
    pub from: Option<ScoreStatus>,
    /// Event that was refused.
    pub event: ScoreEvent,
}

/// Compute the status reached by applying `event` to a score currently in `from`.
///
/// Submission is always allowed and resets to `Pending`, discarding any
/// previous decision. Decisions are only taken on pending scores, which keeps
/// approval side effects from firing twice for the same submission.
pub fn next_status(
    from: Option<ScoreStatus>,
    event: ScoreEvent,
) -> Result<ScoreStatus, InvalidScoreTransition> {
    match (from, event) {
        (_, ScoreEvent::Submit) => Ok(ScoreStatus::Pending),
        (Some(ScoreStatus::Pending), ScoreEvent::Approve) => Ok(ScoreStatus::Approved),
        (Some(ScoreStatus::Pending), ScoreEvent::Reject) => Ok(ScoreStatus::Rejected),
        (from, event) => Err(InvalidScoreTransition { from, event }),
    }
}

/// Side effects triggered by approving a score.
///
/// The checks are independent of each other: birdie is exactly one under par,
/// eagle is two or more under, and a three-putt hands over the snake whatever
/// the stroke count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ApprovalEffects {
    /// Exactly one under par.
    pub birdie: bool,
    /// Two or more under par.
    pub eagle: bool,
    /// Three putts or more; the player takes the snake.
    pub snake: bool,
}

/// Putts from which a player takes the snake.
pub const SNAKE_PUTTS: u32 = 3;

impl ApprovalEffects {
    /// Effects for a gross score on a hole of the given par.
    pub fn for_score(strokes: u32, putts: u32, par: u32) -> Self {
        Self {
            birdie: par.checked_sub(1) == Some(strokes),
            eagle: par.checked_sub(2).is_some_and(|limit| strokes <= limit),
            snake: putts >= SNAKE_PUTTS,
        }
    }
}
