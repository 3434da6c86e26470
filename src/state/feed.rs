//! Domain events published to the social feed.

use std::time::SystemTime;

use uuid::Uuid;

use crate::dao::models::{FeedItemEntity, FeedKind, PowerupKind, UserEntity};

/// Who a feed event is about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    pub player_id: Uuid,
    pub player_name: String,
    pub team_id: Uuid,
}

impl From<&UserEntity> for Subject {
    fn from(user: &UserEntity) -> Self {
        Self {
            player_id: user.id,
            player_name: user.name.clone(),
            team_id: user.team_id,
        }
    }
}

/// Why the snake changed hands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnakeCause {
    /// Approved score with three putts or more on `hole`.
    ThreePutt { hole: u8 },
    /// Organizer handed it over directly.
    Transfer,
}

/// Kinds a user may post directly; every other kind is derived by the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostKind {
    Info,
    Powerup,
}

impl TryFrom<FeedKind> for PostKind {
    type Error = FeedKind;

    fn try_from(value: FeedKind) -> Result<Self, Self::Error> {
        match value {
            FeedKind::Info => Ok(PostKind::Info),
            FeedKind::Powerup => Ok(PostKind::Powerup),
            other => Err(other),
        }
    }
}

/// Event published to the feed. Each variant carries only what it needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedEvent {
    /// System announcement (welcome, team creation, reset).
    Info {
        message: String,
        player_id: Option<Uuid>,
        team_id: Option<Uuid>,
    },
    Birdie { subject: Subject, hole: u8 },
    Eagle { subject: Subject, hole: u8 },
    Snake { subject: Subject, cause: SnakeCause },
    /// Summary of an approved score.
    Score {
        subject: Subject,
        team_name: String,
        strokes: u32,
        hole: u8,
    },
    /// A power-up played against another team.
    Sabotage {
        kind: PowerupKind,
        player_id: Uuid,
        player_name: String,
        team_id: Uuid,
        team_name: String,
        target_team_id: Uuid,
        target_team_name: String,
    },
    /// User-authored post.
    Post {
        kind: PostKind,
        message: String,
        media_url: Option<String>,
        player_id: Option<Uuid>,
        team_id: Option<Uuid>,
        target_team_id: Option<Uuid>,
    },
}

impl FeedEvent {
    /// Announcement for a freshly created team.
    pub fn team_created(team_id: Uuid, team_name: &str) -> Self {
        FeedEvent::Info {
            message: format!("Team \"{team_name}\" has entered the game!"),
            player_id: None,
            team_id: Some(team_id),
        }
    }

    /// Greeting posted once when the roster is seeded.
    pub fn welcome() -> Self {
        FeedEvent::Info {
            message: "Welcome to Merry Mulligan! May the best team win!".to_owned(),
            player_id: None,
            team_id: None,
        }
    }

    /// Announcement for a new player.
    pub fn player_joined(subject: &Subject, team_name: &str, captain: bool) -> Self {
        let mut message = format!("{} joined {team_name}!", subject.player_name);
        if captain {
            message.push_str(" They're the team captain!");
        }
        FeedEvent::Info {
            message,
            player_id: Some(subject.player_id),
            team_id: Some(subject.team_id),
        }
    }

    pub fn powerups_reset() -> Self {
        FeedEvent::Info {
            message: "⚡ All power-ups have been reset! Chaos incoming!".to_owned(),
            player_id: None,
            team_id: None,
        }
    }

    pub fn kind(&self) -> FeedKind {
        match self {
            FeedEvent::Info { .. } => FeedKind::Info,
            FeedEvent::Birdie { .. } => FeedKind::Birdie,
            FeedEvent::Eagle { .. } => FeedKind::Eagle,
            FeedEvent::Snake { .. } => FeedKind::Snake,
            FeedEvent::Score { .. } => FeedKind::Score,
            FeedEvent::Sabotage { .. } => FeedKind::Sabotage,
            FeedEvent::Post {
                kind: PostKind::Info,
                ..
            } => FeedKind::Info,
            FeedEvent::Post {
                kind: PostKind::Powerup,
                ..
            } => FeedKind::Powerup,
        }
    }

    /// Rendered text of the event.
    pub fn message(&self) -> String {
        match self {
            FeedEvent::Info { message, .. } | FeedEvent::Post { message, .. } => message.clone(),
            FeedEvent::Birdie { subject, hole } => {
                format!("🐦 BIRDIE! {} crushed hole {hole}!", subject.player_name)
            }
            FeedEvent::Eagle { subject, hole } => {
                format!("🦅 EAGLE!! {} is on fire at hole {hole}!", subject.player_name)
            }
            FeedEvent::Snake {
                subject,
                cause: SnakeCause::ThreePutt { hole },
            } => format!(
                "🐍 THE SNAKE! {} 3-putted on hole {hole}! Shame!",
                subject.player_name
            ),
            FeedEvent::Snake {
                subject,
                cause: SnakeCause::Transfer,
            } => format!(
                "{} got the SNAKE! 3-putt shame incoming...",
                subject.player_name
            ),
            FeedEvent::Score {
                subject,
                team_name,
                strokes,
                hole,
            } => format!(
                "{} ({team_name}) scored {strokes} on hole {hole}",
                subject.player_name
            ),
            FeedEvent::Sabotage {
                kind,
                player_name,
                team_name,
                target_team_name,
                ..
            } => sabotage_message(*kind, player_name, team_name, target_team_name),
        }
    }

    /// Flatten into the persisted record, stamped with `timestamp`.
    pub fn into_entity(self, timestamp: SystemTime) -> FeedItemEntity {
        let kind = self.kind();
        let message = self.message();
        let mut item = FeedItemEntity {
            id: Uuid::new_v4(),
            kind,
            message,
            timestamp,
            player_id: None,
            team_id: None,
            target_team_id: None,
            media_url: None,
        };

        match self {
            FeedEvent::Info {
                player_id, team_id, ..
            } => {
                item.player_id = player_id;
                item.team_id = team_id;
            }
            FeedEvent::Birdie { subject, .. }
            | FeedEvent::Eagle { subject, .. }
            | FeedEvent::Snake { subject, .. }
            | FeedEvent::Score { subject, .. } => {
                item.player_id = Some(subject.player_id);
                item.team_id = Some(subject.team_id);
            }
            FeedEvent::Sabotage {
                player_id,
                team_id,
                target_team_id,
                ..
            } => {
                item.player_id = Some(player_id);
                item.team_id = Some(team_id);
                item.target_team_id = Some(target_team_id);
            }
            FeedEvent::Post {
                media_url,
                player_id,
                team_id,
                target_team_id,
                ..
            } => {
                item.player_id = player_id;
                item.team_id = team_id;
                item.target_team_id = target_team_id;
                item.media_url = media_url;
            }
        }

        item
    }
}

/// Text announcing a power-up played by `player` of `team` against `target`.
pub fn sabotage_message(kind: PowerupKind, player: &str, team: &str, target: &str) -> String {
    match kind {
        PowerupKind::Mulligan => {
            format!("🔄 MULLIGAN! {player} ({team}) gave {target} a do-over nightmare!")
        }
        PowerupKind::Grenade => format!("💣 GRENADE! {player} ({team}) lobbed chaos at {target}!"),
        PowerupKind::ClubTheft => {
            format!("🏌️ CLUB THEFT! {player} ({team}) swiped a club from {target}!")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subject() -> Subject {
        Subject {
            player_id: Uuid::new_v4(),
            player_name: "Rudy".into(),
            team_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn join_message_mentions_captaincy() {
        let subject = subject();
        let captain = FeedEvent::player_joined(&subject, "Marketing Elves", true);
        assert_eq!(
            captain.message(),
            "Rudy joined Marketing Elves! They're the team captain!"
        );
        let player = FeedEvent::player_joined(&subject, "Marketing Elves", false);
        assert_eq!(player.message(), "Rudy joined Marketing Elves!");
        assert_eq!(player.kind(), FeedKind::Info);
    }

    #[test]
    fn score_events_reference_player_and_team() {
        let subject = subject();
        let event = FeedEvent::Score {
            subject: subject.clone(),
            team_name: "Sales Sleigh".into(),
            strokes: 4,
            hole: 7,
        };
        assert_eq!(event.message(), "Rudy (Sales Sleigh) scored 4 on hole 7");

        let item = event.into_entity(SystemTime::now());
        assert_eq!(item.kind, FeedKind::Score);
        assert_eq!(item.player_id, Some(subject.player_id));
        assert_eq!(item.team_id, Some(subject.team_id));
        assert_eq!(item.target_team_id, None);
    }

    #[test]
    fn snake_message_depends_on_cause() {
        let three_putt = FeedEvent::Snake {
            subject: subject(),
            cause: SnakeCause::ThreePutt { hole: 3 },
        };
        assert_eq!(
            three_putt.message(),
            "🐍 THE SNAKE! Rudy 3-putted on hole 3! Shame!"
        );
        let transfer = FeedEvent::Snake {
            subject: subject(),
            cause: SnakeCause::Transfer,
        };
        assert_eq!(transfer.message(), "Rudy got the SNAKE! 3-putt shame incoming...");
    }

    #[test]
    fn sabotage_carries_target_team() {
        let target = Uuid::new_v4();
        let item = FeedEvent::Sabotage {
            kind: PowerupKind::Grenade,
            player_id: Uuid::new_v4(),
            player_name: "Rudy".into(),
            team_id: Uuid::new_v4(),
            team_name: "Sales Sleigh".into(),
            target_team_id: target,
            target_team_name: "Product Penguins".into(),
        }
        .into_entity(SystemTime::now());
        assert_eq!(item.kind, FeedKind::Sabotage);
        assert_eq!(item.target_team_id, Some(target));
        assert_eq!(
            item.message,
            "💣 GRENADE! Rudy (Sales Sleigh) lobbed chaos at Product Penguins!"
        );
    }

    #[test]
    fn only_info_and_powerup_can_be_posted() {
        assert_eq!(PostKind::try_from(FeedKind::Info), Ok(PostKind::Info));
        assert_eq!(PostKind::try_from(FeedKind::Powerup), Ok(PostKind::Powerup));
        assert_eq!(PostKind::try_from(FeedKind::Birdie), Err(FeedKind::Birdie));
    }
}
