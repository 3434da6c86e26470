//! Team registry, listings and the net leaderboard.

use std::{sync::Arc, time::SystemTime};

use tracing::info;
use uuid::Uuid;

use crate::{
    dao::{
        golf_store::{GolfStore, WriteBatch},
        models::{ScoreStatus, TeamEntity},
    },
    dto::{
        team::{
            CreateTeamRequest, LeaderboardEntry, SeedTeamsResponse, TeamDetail, TeamListing,
            TeamMemberSummary, TeamSummary,
        },
        user::UserResponse,
    },
    error::ServiceError,
    services::{feed_service, sse_events, writes},
    state::{
        SharedState,
        feed::FeedEvent,
        leaderboard::{RankBy, TeamTotals, rank},
    },
};

/// Load a team or fail with `NotFound`.
pub(crate) async fn load_team(
    store: &Arc<dyn GolfStore>,
    team_id: Uuid,
) -> Result<TeamEntity, ServiceError> {
    store
        .find_team(team_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("team `{team_id}` not found")))
}

async fn approved_totals(
    store: &Arc<dyn GolfStore>,
    team_id: Uuid,
) -> Result<TeamTotals, ServiceError> {
    let scores = store
        .list_team_scores(team_id, Some(ScoreStatus::Approved))
        .await?;
    Ok(TeamTotals::from_scores(&scores))
}

// Stage the team and its entrance item; announce only after the commit.
fn stage_team(batch: &mut WriteBatch, name: &str, color: &str) -> TeamEntity {
    let team = TeamEntity {
        id: Uuid::new_v4(),
        name: name.trim().to_owned(),
        color: color.to_owned(),
        created_at: SystemTime::now(),
    };
    batch.teams.push(team.clone());
    feed_service::stage(batch, FeedEvent::team_created(team.id, &team.name));
    team
}

fn announce_team(state: &SharedState, team: &TeamEntity) {
    sse_events::broadcast_team_created(state, team.clone().into());
    info!(team_id = %team.id, name = %team.name, "team created");
}

/// Register a new team. Names are unique.
pub async fn create_team(
    state: &SharedState,
    request: CreateTeamRequest,
) -> Result<TeamSummary, ServiceError> {
    let store = state.require_store().await?;
    let team = state
        .run_mutation("create_team", || async {
            let mut batch = WriteBatch::new();
            let team = stage_team(&mut batch, &request.name, &request.color);
            writes::commit(state, &store, batch).await?;
            announce_team(state, &team);
            Ok(team)
        })
        .await?;
    Ok(team.into())
}

/// Create the configured roster when no team exists yet.
///
/// Seeding is idempotent: with at least one team registered nothing is
/// written and the existing teams are returned. The roster lands in one
/// commit, so a clash leaves no partial roster behind.
pub async fn seed_teams(state: &SharedState) -> Result<SeedTeamsResponse, ServiceError> {
    let store = state.require_store().await?;
    state
        .run_mutation("seed_teams", || async {
            let existing = store.list_teams().await?;
            if !existing.is_empty() {
                return Ok(SeedTeamsResponse {
                    created: false,
                    message: "Teams already exist".to_owned(),
                    teams: existing.into_iter().map(Into::into).collect(),
                });
            }

            let mut batch = WriteBatch::new();
            let teams: Vec<TeamEntity> = state
                .config()
                .seed_teams()
                .iter()
                .map(|seed| stage_team(&mut batch, &seed.name, &seed.color))
                .collect();
            feed_service::stage(&mut batch, FeedEvent::welcome());
            writes::commit(state, &store, batch).await?;
            for team in &teams {
                announce_team(state, team);
            }

            Ok(SeedTeamsResponse {
                created: true,
                message: format!("Created {} teams", teams.len()),
                teams: teams.into_iter().map(Into::into).collect(),
            })
        })
        .await
}

/// Every team with its approved gross total and members, best gross first.
pub async fn get_all_teams(state: &SharedState) -> Result<Vec<TeamListing>, ServiceError> {
    let store = state.require_store().await?;
    let snake_holder = store.snake_holder().await?;

    let teams = store.list_teams().await?;
    let mut rows = Vec::with_capacity(teams.len());
    for team in teams {
        let totals = approved_totals(&store, team.id).await?;
        let members = store.list_team_members(team.id).await?;
        let listing = TeamListing {
            gross_total: totals.gross_total,
            holes_played: totals.holes_played,
            member_count: members.len(),
            members: members
                .into_iter()
                .map(|member| TeamMemberSummary::new(member, snake_holder))
                .collect(),
            team: team.into(),
        };
        rows.push((totals, listing));
    }

    rank(&mut rows, RankBy::Gross, |(totals, _)| totals);
    Ok(rows.into_iter().map(|(_, listing)| listing).collect())
}

pub async fn get_team(state: &SharedState, team_id: Uuid) -> Result<TeamDetail, ServiceError> {
    let store = state.require_store().await?;
    let team = load_team(&store, team_id).await?;
    let snake_holder = store.snake_holder().await?;
    let totals = approved_totals(&store, team_id).await?;
    let members = store.list_team_members(team_id).await?;

    Ok(TeamDetail {
        team: team.into(),
        members: members
            .into_iter()
            .map(|member| UserResponse::new(member, snake_holder))
            .collect(),
        gross_total: totals.gross_total,
        holes_played: totals.holes_played,
    })
}

/// Teams ranked by net total; teams without approved scores come last.
pub async fn get_leaderboard(state: &SharedState) -> Result<Vec<LeaderboardEntry>, ServiceError> {
    let store = state.require_store().await?;
    let teams = store.list_teams().await?;

    let mut rows = Vec::with_capacity(teams.len());
    for team in teams {
        let totals = approved_totals(&store, team.id).await?;
        let members = store.list_team_members(team.id).await?;
        let entry = LeaderboardEntry::new(team, &totals, &members);
        rows.push((totals, entry));
    }

    rank(&mut rows, RankBy::Net, |(totals, _)| totals);
    Ok(rows
        .into_iter()
        .enumerate()
        .map(|(position, (_, mut entry))| {
            entry.rank = position + 1;
            entry
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::AppConfig,
        dao::golf_store::{MemoryGolfStore, flaky::FlakyFeedStore},
        state::AppState,
    };

    async fn state() -> SharedState {
        AppState::with_store(AppConfig::default(), Arc::new(MemoryGolfStore::new())).await
    }

    fn request(name: &str) -> CreateTeamRequest {
        CreateTeamRequest {
            name: name.into(),
            color: "#123456".into(),
        }
    }

    #[tokio::test]
    async fn team_names_are_unique() {
        let state = state().await;
        create_team(&state, request("Birdie Hunters")).await.unwrap();

        let err = create_team(&state, request("Birdie Hunters")).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
        assert_eq!(get_all_teams(&state).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn seeding_runs_once() {
        let state = state().await;
        let first = seed_teams(&state).await.unwrap();
        assert!(first.created);
        assert_eq!(first.teams.len(), state.config().seed_teams().len());

        let second = seed_teams(&state).await.unwrap();
        assert!(!second.created);
        assert_eq!(second.teams.len(), first.teams.len());
        assert_eq!(get_all_teams(&state).await.unwrap().len(), first.teams.len());
    }

    #[tokio::test]
    async fn created_team_is_announced_in_the_feed() {
        let state = state().await;
        let team = create_team(&state, request("Fore Play")).await.unwrap();

        let feed = feed_service::get_latest_feed(&state, None).await.unwrap();
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].item.team_id, Some(team.id));
        assert!(feed[0].item.message.contains("Fore Play"));
    }

    #[tokio::test]
    async fn unknown_team_is_not_found() {
        let state = state().await;
        assert!(matches!(
            get_team(&state, Uuid::new_v4()).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn empty_teams_rank_in_creation_order() {
        let state = state().await;
        for name in ["A", "B", "C"] {
            create_team(&state, request(name)).await.unwrap();
        }

        let board = get_leaderboard(&state).await.unwrap();
        let names: Vec<_> = board.iter().map(|entry| entry.team.name.as_str()).collect();
        assert_eq!(names, ["A", "B", "C"]);
        assert_eq!(board[0].rank, 1);
        assert_eq!(board[2].rank, 3);
        assert_eq!(board[0].net_relative_display, "E");
    }

    #[tokio::test]
    async fn failed_commit_registers_no_team() {
        let store = FlakyFeedStore::new();
        let state = AppState::with_store(AppConfig::default(), Arc::new(store.clone())).await;
        store.fail_feed_writes(true);

        let err = create_team(&state, request("Ghost Ball")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Unavailable(_)));
        let seeded = seed_teams(&state).await;
        assert!(matches!(seeded, Err(ServiceError::Unavailable(_))));
        assert!(get_all_teams(&state).await.unwrap().is_empty());

        store.fail_feed_writes(false);
        assert!(seed_teams(&state).await.unwrap().created);
    }
}
