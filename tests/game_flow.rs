use std::sync::Arc;

use merry_mulligan::{
    config::AppConfig,
    dao::{golf_store::MemoryGolfStore, models::FeedKind},
    dto::{
        score::SubmitScoreRequest,
        team::CreateTeamRequest,
        user::CreateUserRequest,
    },
    error::ServiceError,
    services::{feed_service, powerup_service, score_service, team_service, user_service},
    state::{AppState, SharedState},
};
use uuid::Uuid;

async fn fresh_state() -> SharedState {
    AppState::with_store(AppConfig::default(), Arc::new(MemoryGolfStore::new())).await
}

async fn create_team(state: &SharedState, name: &str) -> Uuid {
    team_service::create_team(
        state,
        CreateTeamRequest {
            name: name.into(),
            color: "#336699".into(),
        },
    )
    .await
    .expect("team created")
    .id
}

async fn register(state: &SharedState, team_id: Uuid, name: &str, handicap: u32) -> Uuid {
    user_service::create_user(
        state,
        CreateUserRequest {
            name: name.into(),
            handicap,
            team_id,
            avatar_url: None,
        },
    )
    .await
    .expect("player registered")
    .id
}

async fn play_hole(state: &SharedState, player: Uuid, captain: Uuid, hole: u8, strokes: u32) {
    let submitted = score_service::submit_score(
        state,
        SubmitScoreRequest {
            player_id: player,
            hole,
            strokes,
            putts: 2,
            input_by: player,
        },
    )
    .await
    .expect("score submitted");
    score_service::approve_score(state, submitted.score_id, captain)
        .await
        .expect("score approved");
}

#[tokio::test]
async fn approved_scores_drive_the_net_leaderboard() {
    let state = fresh_state().await;
    let alpha = create_team(&state, "Alpha").await;
    let bravo = create_team(&state, "Bravo").await;
    let idle = create_team(&state, "Idle").await;

    let alpha_captain = register(&state, alpha, "Ann", 0).await;
    let bravo_captain = register(&state, bravo, "Ben", 18).await;
    register(&state, idle, "Ida", 0).await;

    // Alpha: gross 5 + 5 with no shots. Bravo: gross 5 + 5 with one shot per hole.
    play_hole(&state, alpha_captain, alpha_captain, 1, 5).await;
    play_hole(&state, alpha_captain, alpha_captain, 2, 5).await;
    play_hole(&state, bravo_captain, bravo_captain, 1, 5).await;
    play_hole(&state, bravo_captain, bravo_captain, 2, 5).await;

    let board = team_service::get_leaderboard(&state).await.unwrap();
    let order: Vec<_> = board.iter().map(|entry| entry.team.id).collect();
    assert_eq!(order, [bravo, alpha, idle]);
    assert_eq!(board[0].net_total, 8);
    assert_eq!(board[1].net_total, 10);
    assert_eq!(board[2].holes_played, 0);
    assert_eq!(board[0].rank, 1);

    let card = score_service::get_team_scorecard(&state, bravo).await.unwrap();
    assert_eq!(card.len(), 1);
    assert_eq!(card[0].total_strokes, 10);
    assert_eq!(card[0].net_total, 8);
    assert_eq!(card[0].holes_played, 2);

    let scores = feed_service::get_feed_by_type(&state, FeedKind::Score, None)
        .await
        .unwrap();
    assert_eq!(scores.len(), 4);
}

#[tokio::test]
async fn powerup_cannot_target_the_players_own_team() {
    let state = fresh_state().await;
    let home = create_team(&state, "Home").await;
    let away = create_team(&state, "Away").await;
    let player = register(&state, home, "Sly", 10).await;

    let powerup = powerup_service::get_user_powerups(&state, player)
        .await
        .unwrap()
        .remove(0);
    let sabotage_before = feed_service::get_feed_by_type(&state, FeedKind::Sabotage, None)
        .await
        .unwrap()
        .len();

    let refused = powerup_service::use_powerup(&state, powerup.id, home).await;
    assert!(matches!(refused, Err(ServiceError::InvalidState(_))));
    assert_eq!(
        feed_service::get_feed_by_type(&state, FeedKind::Sabotage, None)
            .await
            .unwrap()
            .len(),
        sabotage_before
    );

    powerup_service::use_powerup(&state, powerup.id, away)
        .await
        .expect("played against another team");
    assert_eq!(
        feed_service::get_feed_by_type(&state, FeedKind::Sabotage, None)
            .await
            .unwrap()
            .len(),
        sabotage_before + 1
    );
}

#[tokio::test]
async fn the_snake_moves_between_players() {
    let state = fresh_state().await;
    let team = create_team(&state, "Greens").await;
    let captain = register(&state, team, "Cap", 4).await;
    let player = register(&state, team, "Putt", 4).await;

    user_service::transfer_snake(&state, captain).await.unwrap();
    let holder = user_service::get_snake_holder(&state).await.unwrap();
    assert_eq!(holder.holder.map(|user| user.id), Some(captain));
    assert_eq!(holder.team.map(|team| team.id), Some(team));

    let submitted = score_service::submit_score(
        &state,
        SubmitScoreRequest {
            player_id: player,
            hole: 9,
            strokes: 5,
            putts: 4,
            input_by: captain,
        },
    )
    .await
    .unwrap();
    score_service::approve_score(&state, submitted.score_id, captain)
        .await
        .unwrap();

    let members = user_service::get_team_members(&state, team).await.unwrap();
    let holders: Vec<_> = members.iter().filter(|member| member.has_snake).collect();
    assert_eq!(holders.len(), 1);
    assert_eq!(holders[0].id, player);
}
