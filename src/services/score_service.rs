//! Score submission, captain decisions and scorecards.

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
    time::SystemTime,
};

use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    dao::{
        golf_store::{GolfStore, WriteBatch},
        models::{Role, ScoreEntity, ScoreStatus, UserEntity},
    },
    dto::{
        score::{
            EnrichedScore, MemberScorecard, ScoreDecisionResponse, ScoreResponse,
            SubmitScoreRequest, SubmitScoreResponse,
        },
        user::PlayerRef,
    },
    error::ServiceError,
    services::{feed_service, sse_events, team_service, user_service, writes},
    state::{
        SharedState,
        feed::{FeedEvent, SnakeCause, Subject},
        score_lifecycle::{ApprovalEffects, ScoreEvent, next_status},
        scoring::{net_score, shots_received, total_net_score},
    },
};

async fn load_score(
    store: &Arc<dyn GolfStore>,
    score_id: Uuid,
) -> Result<ScoreEntity, ServiceError> {
    store
        .find_score(score_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("score `{score_id}` not found")))
}

/// Captains decide on the scores of their own team only.
fn ensure_captain_of(captain: &UserEntity, score: &ScoreEntity) -> Result<(), ServiceError> {
    if captain.role != Role::Captain {
        return Err(ServiceError::Forbidden(format!(
            "user `{}` is not a captain",
            captain.id
        )));
    }
    if captain.team_id != score.team_id {
        return Err(ServiceError::Forbidden(
            "captains can only decide on scores of their own team".into(),
        ));
    }
    Ok(())
}

/// Record a player's score for a hole, replacing any earlier submission.
///
/// Par and stroke index come from the course; the net score is computed
/// from the player's handicap. The score goes back to `pending` whatever
/// its previous status was.
pub async fn submit_score(
    state: &SharedState,
    request: SubmitScoreRequest,
) -> Result<SubmitScoreResponse, ServiceError> {
    let store = state.require_store().await?;
    state
        .run_mutation("submit_score", || async {
            let player = user_service::load_user(&store, request.player_id).await?;
            let rating = state.course().rating_for(request.hole);
            let existing = store
                .find_score_by_player_hole(player.id, request.hole)
                .await?;
            let status = next_status(existing.as_ref().map(|score| score.status), ScoreEvent::Submit)?;

            let score = ScoreEntity {
                id: existing.map_or_else(Uuid::new_v4, |score| score.id),
                player_id: player.id,
                team_id: player.team_id,
                hole: request.hole,
                strokes: request.strokes,
                putts: request.putts,
                par: rating.par,
                hole_index: rating.index,
                net_score: net_score(request.strokes, player.handicap, rating.index),
                shots_received: shots_received(player.handicap, rating.index),
                status,
                input_by: request.input_by,
                approved_by: None,
                approved_at: None,
                updated_at: SystemTime::now(),
            };
            let mut batch = WriteBatch::new();
            batch.scores.push(score.clone());
            writes::commit(state, &store, batch).await?;
            sse_events::broadcast_score_updated(state, &score);
            debug!(
                score_id = %score.id,
                player_id = %score.player_id,
                hole = score.hole,
                strokes = score.strokes,
                "score submitted"
            );

            Ok(SubmitScoreResponse { score_id: score.id })
        })
        .await
}

/// Approve a pending score and fire its feed side effects.
///
/// Birdie, eagle and snake are checked independently; a score summary is
/// always posted. The status flip and every side effect commit together, so
/// a failed approval leaves the score pending and can be retried.
pub async fn approve_score(
    state: &SharedState,
    score_id: Uuid,
    captain_id: Uuid,
) -> Result<ScoreDecisionResponse, ServiceError> {
    let store = state.require_store().await?;
    state
        .run_mutation("approve_score", || async {
            let mut score = load_score(&store, score_id).await?;
            let captain = user_service::load_user(&store, captain_id).await?;
            ensure_captain_of(&captain, &score)?;
            let status = next_status(Some(score.status), ScoreEvent::Approve)?;

            let player = user_service::load_user(&store, score.player_id).await?;
            let team = team_service::load_team(&store, score.team_id).await?;

            let now = SystemTime::now();
            score.status = status;
            score.approved_by = Some(captain.id);
            score.approved_at = Some(now);
            score.updated_at = now;

            let mut batch = WriteBatch::new();
            batch.scores.push(score.clone());
            let subject = Subject::from(&player);
            let effects = ApprovalEffects::for_score(score.strokes, score.putts, score.par);
            if effects.birdie {
                let event = FeedEvent::Birdie {
                    subject: subject.clone(),
                    hole: score.hole,
                };
                feed_service::stage(&mut batch, event);
            }
            if effects.eagle {
                let event = FeedEvent::Eagle {
                    subject: subject.clone(),
                    hole: score.hole,
                };
                feed_service::stage(&mut batch, event);
            }
            let snake_from = if effects.snake {
                let cause = SnakeCause::ThreePutt { hole: score.hole };
                Some(user_service::stage_snake(&store, &mut batch, &player, cause).await?)
            } else {
                None
            };
            let summary = FeedEvent::Score {
                subject,
                team_name: team.name,
                strokes: score.strokes,
                hole: score.hole,
            };
            feed_service::stage(&mut batch, summary);
            writes::commit(state, &store, batch).await?;

            if let Some(previous) = snake_from {
                user_service::announce_snake(state, previous, player.id);
            }
            sse_events::broadcast_score_updated(state, &score);
            info!(
                score_id = %score.id,
                captain_id = %captain.id,
                birdie = effects.birdie,
                eagle = effects.eagle,
                snake = effects.snake,
                "score approved"
            );

            Ok(ScoreDecisionResponse {
                success: true,
                status,
            })
        })
        .await
}

/// Reject a pending score. Rejected scores leave every aggregate until resubmitted.
pub async fn reject_score(
    state: &SharedState,
    score_id: Uuid,
    captain_id: Uuid,
) -> Result<ScoreDecisionResponse, ServiceError> {
    let store = state.require_store().await?;
    state
        .run_mutation("reject_score", || async {
            let mut score = load_score(&store, score_id).await?;
            let captain = user_service::load_user(&store, captain_id).await?;
            ensure_captain_of(&captain, &score)?;
            let status = next_status(Some(score.status), ScoreEvent::Reject)?;

            score.status = status;
            score.updated_at = SystemTime::now();
            let mut batch = WriteBatch::new();
            batch.scores.push(score.clone());
            writes::commit(state, &store, batch).await?;

            sse_events::broadcast_score_updated(state, &score);
            info!(score_id = %score.id, captain_id = %captain.id, "score rejected");

            Ok(ScoreDecisionResponse {
                success: true,
                status,
            })
        })
        .await
}

/// Pending scores of a team with the player and the submitter resolved.
pub async fn get_pending_scores(
    state: &SharedState,
    team_id: Uuid,
) -> Result<Vec<EnrichedScore>, ServiceError> {
    let store = state.require_store().await?;
    let scores = store
        .list_team_scores(team_id, Some(ScoreStatus::Pending))
        .await?;
    enrich(&store, scores, true).await
}

/// Every score of a player, ordered by hole.
pub async fn get_player_scores(
    state: &SharedState,
    player_id: Uuid,
) -> Result<Vec<ScoreResponse>, ServiceError> {
    let store = state.require_store().await?;
    let scores = store.list_player_scores(player_id).await?;
    Ok(scores.into_iter().map(ScoreResponse::from).collect())
}

/// Approved scores of a team with the player resolved.
pub async fn get_team_scores(
    state: &SharedState,
    team_id: Uuid,
) -> Result<Vec<EnrichedScore>, ServiceError> {
    let store = state.require_store().await?;
    let scores = store
        .list_team_scores(team_id, Some(ScoreStatus::Approved))
        .await?;
    enrich(&store, scores, false).await
}

/// Hole-by-hole approved strokes of every team member.
pub async fn get_team_scorecard(
    state: &SharedState,
    team_id: Uuid,
) -> Result<Vec<MemberScorecard>, ServiceError> {
    let store = state.require_store().await?;
    let members = store.list_team_members(team_id).await?;
    let scores = store
        .list_team_scores(team_id, Some(ScoreStatus::Approved))
        .await?;

    Ok(members
        .into_iter()
        .map(|member| {
            let mut card = MemberScorecard {
                handicap: member.handicap,
                holes: BTreeMap::new(),
                total_strokes: 0,
                net_total: 0,
                holes_played: 0,
                player: PlayerRef::from(member),
            };
            let mut played = Vec::new();
            for score in scores.iter().filter(|score| score.player_id == card.player.id) {
                card.holes.insert(score.hole, score.strokes);
                card.total_strokes += score.strokes;
                card.holes_played += 1;
                played.push((score.strokes, score.hole_index));
            }
            card.net_total = total_net_score(&played, card.handicap);
            card
        })
        .collect())
}

async fn enrich(
    store: &Arc<dyn GolfStore>,
    scores: Vec<ScoreEntity>,
    with_submitter: bool,
) -> Result<Vec<EnrichedScore>, ServiceError> {
    let mut users: HashMap<Uuid, Option<PlayerRef>> = HashMap::new();
    let mut enriched = Vec::with_capacity(scores.len());
    for score in scores {
        let player = resolve_player(store, &mut users, score.player_id).await?;
        let input_by_user = if with_submitter {
            resolve_player(store, &mut users, score.input_by).await?
        } else {
            None
        };
        enriched.push(EnrichedScore {
            score: score.into(),
            player,
            input_by_user,
        });
    }
    Ok(enriched)
}

async fn resolve_player(
    store: &Arc<dyn GolfStore>,
    cache: &mut HashMap<Uuid, Option<PlayerRef>>,
    user_id: Uuid,
) -> Result<Option<PlayerRef>, ServiceError> {
    if let Some(found) = cache.get(&user_id) {
        return Ok(found.clone());
    }
    let found = store.find_user(user_id).await?.map(PlayerRef::from);
    cache.insert(user_id, found.clone());
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::AppConfig,
        dao::{
            golf_store::{MemoryGolfStore, flaky::FlakyFeedStore},
            models::FeedKind,
        },
        dto::{team::CreateTeamRequest, user::CreateUserRequest},
        state::AppState,
    };

    struct Fixture {
        state: SharedState,
        team_id: Uuid,
        captain: Uuid,
        player: Uuid,
    }

    async fn team(state: &SharedState, name: &str) -> Uuid {
        team_service::create_team(
            state,
            CreateTeamRequest {
                name: name.into(),
                color: "#00ff00".into(),
            },
        )
        .await
        .unwrap()
        .id
    }

    async fn join(state: &SharedState, team_id: Uuid, name: &str, handicap: u32) -> Uuid {
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
        .unwrap()
        .id
    }

    async fn fixture() -> Fixture {
        fixture_on(Arc::new(MemoryGolfStore::new())).await
    }

    async fn fixture_on(store: Arc<dyn GolfStore>) -> Fixture {
        let state = AppState::with_store(AppConfig::default(), store).await;
        let team_id = team(&state, "Eagles").await;
        let captain = join(&state, team_id, "Captain", 0).await;
        let player = join(&state, team_id, "Player", 20).await;
        Fixture {
            state,
            team_id,
            captain,
            player,
        }
    }

    fn submission(player: Uuid, hole: u8, strokes: u32, putts: u32) -> SubmitScoreRequest {
        SubmitScoreRequest {
            player_id: player,
            hole,
            strokes,
            putts,
            input_by: player,
        }
    }

    async fn feed_kinds(state: &SharedState) -> Vec<FeedKind> {
        feed_service::get_latest_feed(state, None)
            .await
            .unwrap()
            .into_iter()
            .map(|item| item.item.kind)
            .collect()
    }

    #[tokio::test]
    async fn submission_computes_net_score_from_the_course() {
        let fx = fixture().await;
        let hole = fx.state.course().hole(1).unwrap().clone();

        let submitted = submit_score(&fx.state, submission(fx.player, 1, 6, 2))
            .await
            .unwrap();
        let scores = get_player_scores(&fx.state, fx.player).await.unwrap();
        assert_eq!(scores.len(), 1);
        let score = &scores[0];
        assert_eq!(score.id, submitted.score_id);
        assert_eq!(score.par, hole.par);
        assert_eq!(score.hole_index, hole.index);
        assert_eq!(score.shots_received, shots_received(20, hole.index));
        assert_eq!(score.net_score, net_score(6, 20, hole.index));
        assert_eq!(score.status, ScoreStatus::Pending);
    }

    #[tokio::test]
    async fn resubmission_overwrites_and_resets_to_pending() {
        let fx = fixture().await;
        let first = submit_score(&fx.state, submission(fx.player, 3, 5, 2))
            .await
            .unwrap();
        approve_score(&fx.state, first.score_id, fx.captain).await.unwrap();

        let second = submit_score(&fx.state, submission(fx.player, 3, 4, 1))
            .await
            .unwrap();
        assert_eq!(first.score_id, second.score_id);

        let scores = get_player_scores(&fx.state, fx.player).await.unwrap();
        assert_eq!(scores.len(), 1);
        assert_eq!(scores[0].strokes, 4);
        assert_eq!(scores[0].status, ScoreStatus::Pending);
        assert_eq!(scores[0].approved_by, None);
    }

    #[tokio::test]
    async fn unknown_player_cannot_submit() {
        let fx = fixture().await;
        let err = submit_score(&fx.state, submission(Uuid::new_v4(), 1, 4, 2))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn only_a_captain_of_the_team_decides() {
        let fx = fixture().await;
        let rivals = team(&fx.state, "Rivals").await;
        let rival_captain = join(&fx.state, rivals, "Rival", 5).await;
        let score = submit_score(&fx.state, submission(fx.player, 2, 4, 2))
            .await
            .unwrap()
            .score_id;

        let err = approve_score(&fx.state, score, fx.player).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
        let err = approve_score(&fx.state, score, rival_captain).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
        let err = reject_score(&fx.state, score, rival_captain).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        let pending = get_pending_scores(&fx.state, fx.team_id).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(
            pending[0].input_by_user.as_ref().map(|user| user.id),
            Some(fx.player)
        );
    }

    #[tokio::test]
    async fn approval_posts_birdie_and_score_once() {
        let fx = fixture().await;
        let par = fx.state.course().rating_for(1).par;
        let score = submit_score(&fx.state, submission(fx.player, 1, par - 1, 1))
            .await
            .unwrap()
            .score_id;
        let before = feed_kinds(&fx.state).await.len();

        let decision = approve_score(&fx.state, score, fx.captain).await.unwrap();
        assert_eq!(decision.status, ScoreStatus::Approved);

        let kinds = feed_kinds(&fx.state).await;
        assert_eq!(kinds.len(), before + 2);
        assert_eq!(kinds[0], FeedKind::Score);
        assert_eq!(kinds[1], FeedKind::Birdie);

        let err = approve_score(&fx.state, score, fx.captain).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
        assert_eq!(feed_kinds(&fx.state).await.len(), before + 2);
    }

    #[tokio::test]
    async fn eagle_approval_posts_eagle_and_score() {
        let fx = fixture().await;
        let par = fx.state.course().rating_for(1).par;
        let score = submit_score(&fx.state, submission(fx.player, 1, par - 2, 1))
            .await
            .unwrap()
            .score_id;
        let before = feed_kinds(&fx.state).await.len();

        approve_score(&fx.state, score, fx.captain).await.unwrap();

        let kinds = feed_kinds(&fx.state).await;
        assert_eq!(kinds.len(), before + 2);
        assert_eq!(&kinds[..2], &[FeedKind::Score, FeedKind::Eagle]);
    }

    #[tokio::test]
    async fn three_putt_takes_the_snake() {
        let fx = fixture().await;
        user_service::transfer_snake(&fx.state, fx.captain).await.unwrap();

        let score = submit_score(&fx.state, submission(fx.player, 4, 6, 3))
            .await
            .unwrap()
            .score_id;
        approve_score(&fx.state, score, fx.captain).await.unwrap();

        let holder = user_service::get_snake_holder(&fx.state).await.unwrap();
        assert_eq!(holder.holder.map(|user| user.id), Some(fx.player));
        let members = user_service::get_team_members(&fx.state, fx.team_id)
            .await
            .unwrap();
        assert_eq!(members.iter().filter(|member| member.has_snake).count(), 1);
        assert!(feed_kinds(&fx.state).await.contains(&FeedKind::Snake));
    }

    #[tokio::test]
    async fn rejected_scores_leave_the_scorecard() {
        let fx = fixture().await;
        let kept = submit_score(&fx.state, submission(fx.player, 1, 5, 2))
            .await
            .unwrap()
            .score_id;
        let dropped = submit_score(&fx.state, submission(fx.player, 2, 7, 2))
            .await
            .unwrap()
            .score_id;
        approve_score(&fx.state, kept, fx.captain).await.unwrap();
        let decision = reject_score(&fx.state, dropped, fx.captain).await.unwrap();
        assert_eq!(decision.status, ScoreStatus::Rejected);

        let card = get_team_scorecard(&fx.state, fx.team_id).await.unwrap();
        let player = card
            .iter()
            .find(|member| member.player.id == fx.player)
            .unwrap();
        assert_eq!(player.holes_played, 1);
        assert_eq!(player.total_strokes, 5);
        assert_eq!(player.holes.get(&1), Some(&5));
        assert!(player.holes.get(&2).is_none());

        let approved = get_team_scores(&fx.state, fx.team_id).await.unwrap();
        assert_eq!(approved.len(), 1);
        assert_eq!(approved[0].player.as_ref().map(|p| p.id), Some(fx.player));
    }

    #[tokio::test]
    async fn failed_approval_stays_pending_and_can_be_retried() {
        let store = FlakyFeedStore::new();
        let fx = fixture_on(Arc::new(store.clone())).await;
        user_service::transfer_snake(&fx.state, fx.captain).await.unwrap();
        let score = submit_score(&fx.state, submission(fx.player, 4, 6, 3))
            .await
            .unwrap()
            .score_id;
        let before = feed_kinds(&fx.state).await;

        store.fail_feed_writes(true);
        let err = approve_score(&fx.state, score, fx.captain).await.unwrap_err();
        assert!(matches!(err, ServiceError::Unavailable(_)));

        let scores = get_player_scores(&fx.state, fx.player).await.unwrap();
        assert_eq!(scores[0].status, ScoreStatus::Pending);
        assert_eq!(scores[0].approved_by, None);
        let holder = user_service::get_snake_holder(&fx.state).await.unwrap();
        assert_eq!(holder.holder.map(|user| user.id), Some(fx.captain));
        assert_eq!(feed_kinds(&fx.state).await, before);

        store.fail_feed_writes(false);
        let decision = approve_score(&fx.state, score, fx.captain).await.unwrap();
        assert_eq!(decision.status, ScoreStatus::Approved);
        let holder = user_service::get_snake_holder(&fx.state).await.unwrap();
        assert_eq!(holder.holder.map(|user| user.id), Some(fx.player));
        let kinds = feed_kinds(&fx.state).await;
        assert_eq!(&kinds[..2], &[FeedKind::Score, FeedKind::Snake]);
        assert_eq!(kinds.len(), before.len() + 2);
    }
}
