//! Course table seen plainly or through a player's handicap.

use uuid::Uuid;

use crate::{
    dto::course::{
        CourseResponse, HandicapHoleResponse, HoleInfoResponse, NetScoreQuery, NetScoreResponse,
        ShotsQuery, ShotsResponse,
    },
    error::ServiceError,
    services::user_service,
    state::{
        SharedState,
        scoring::{format_shots_received, net_score, shots_received},
    },
};

pub fn get_course(state: &SharedState) -> CourseResponse {
    CourseResponse::from(state.course())
}

/// Every hole with the shots `player_id` receives on it.
pub async fn get_course_with_handicap(
    state: &SharedState,
    player_id: Uuid,
) -> Result<Vec<HandicapHoleResponse>, ServiceError> {
    let store = state.require_store().await?;
    let player = user_service::load_user(&store, player_id).await?;
    Ok(state
        .course()
        .holes()
        .iter()
        .map(|hole| HandicapHoleResponse::new(hole, shots_received(player.handicap, hole.index)))
        .collect())
}

pub async fn get_hole_info(
    state: &SharedState,
    player_id: Uuid,
    hole_number: u8,
) -> Result<HoleInfoResponse, ServiceError> {
    let store = state.require_store().await?;
    let player = user_service::load_user(&store, player_id).await?;
    let hole = state
        .course()
        .hole(hole_number)
        .ok_or_else(|| ServiceError::NotFound(format!("hole {hole_number} is not on the course")))?;

    Ok(HoleInfoResponse {
        player_id: player.id,
        handicap: player.handicap,
        hole: HandicapHoleResponse::new(hole, shots_received(player.handicap, hole.index)),
    })
}

/// Shots a handicap receives on a hole of the given stroke index.
pub fn calculate_shots(query: &ShotsQuery) -> ShotsResponse {
    let shots = shots_received(query.handicap, query.hole_index);
    ShotsResponse {
        shots_received: shots,
        shots_label: format_shots_received(shots),
    }
}

pub fn calculate_net_score(query: &NetScoreQuery) -> NetScoreResponse {
    NetScoreResponse {
        net_score: net_score(query.strokes, query.handicap, query.hole_index),
        shots_received: shots_received(query.handicap, query.hole_index),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::golf_store::MemoryGolfStore,
        dto::{team::CreateTeamRequest, user::CreateUserRequest},
        services::team_service,
        state::AppState,
    };

    async fn player_with_handicap(handicap: u32) -> (SharedState, Uuid) {
        let state =
            AppState::with_store(AppConfig::default(), Arc::new(MemoryGolfStore::new())).await;
        let team_id = team_service::create_team(
            &state,
            CreateTeamRequest {
                name: "Course".into(),
                color: "#000".into(),
            },
        )
        .await
        .unwrap()
        .id;
        let player = user_service::create_user(
            &state,
            CreateUserRequest {
                name: "Walker".into(),
                handicap,
                team_id,
                avatar_url: None,
            },
        )
        .await
        .unwrap()
        .id;
        (state, player)
    }

    #[test]
    fn calculators_follow_the_allocation_rule() {
        let shots = calculate_shots(&ShotsQuery {
            handicap: 20,
            hole_index: 2,
        });
        assert_eq!(shots.shots_received, 2);
        assert_eq!(shots.shots_label, "2 shots");

        let net = calculate_net_score(&NetScoreQuery {
            strokes: 1,
            handicap: 36,
            hole_index: 3,
        });
        assert_eq!(net.shots_received, 2);
        assert_eq!(net.net_score, -1);
    }

    #[tokio::test]
    async fn course_totals_add_up() {
        let state = AppState::new(AppConfig::default());
        let course = get_course(&state);
        assert_eq!(course.holes.len(), 18);
        assert_eq!(course.total_par, course.front_nine_par + course.back_nine_par);
    }

    #[tokio::test]
    async fn handicap_view_spreads_shots_over_the_hardest_holes() {
        let (state, player) = player_with_handicap(19).await;
        let holes = get_course_with_handicap(&state, player).await.unwrap();
        assert_eq!(holes.iter().map(|hole| hole.shots_received).sum::<u32>(), 19);
        let hardest = holes.iter().find(|hole| hole.hole.index == 1).unwrap();
        assert_eq!(hardest.shots_received, 2);
        assert_eq!(hardest.shots_label, "2 shots");
    }

    #[tokio::test]
    async fn hole_info_requires_a_known_hole() {
        let (state, player) = player_with_handicap(0).await;
        let info = get_hole_info(&state, player, 7).await.unwrap();
        assert_eq!(info.hole.hole.number, 7);
        assert_eq!(info.hole.shots_label, "No shots");

        assert!(matches!(
            get_hole_info(&state, player, 19).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            get_hole_info(&state, Uuid::new_v4(), 1).await,
            Err(ServiceError::NotFound(_))
        ));
    }
}
