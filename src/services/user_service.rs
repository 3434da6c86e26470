//! Player registration, roles and the snake.

use std::{sync::Arc, time::SystemTime};

use tracing::info;
use uuid::Uuid;

use crate::{
    dao::{
        golf_store::{GolfStore, WriteBatch},
        models::{PowerupEntity, PowerupKind, PowerupStatus, Role, UserEntity},
    },
    dto::user::{
        CreateUserRequest, CreatedResponse, SnakeHolderResponse, SnakeTransferResponse,
        UserResponse, UserWithTeam,
    },
    error::ServiceError,
    services::{feed_service, sse_events, team_service, writes},
    state::{
        SharedState,
        feed::{FeedEvent, SnakeCause, Subject},
    },
};

/// Load a user or fail with `NotFound`.
pub(crate) async fn load_user(
    store: &Arc<dyn GolfStore>,
    user_id: Uuid,
) -> Result<UserEntity, ServiceError> {
    store
        .find_user(user_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("user `{user_id}` not found")))
}

/// Stage handing the snake to `holder` with its feed item.
///
/// Returns the previous holder; pass it to [`announce_snake`] once the batch
/// has committed. Must run under the write gate.
pub(crate) async fn stage_snake(
    store: &Arc<dyn GolfStore>,
    batch: &mut WriteBatch,
    holder: &UserEntity,
    cause: SnakeCause,
) -> Result<Option<Uuid>, ServiceError> {
    let previous = store.snake_holder().await?;
    batch.snake_holder = Some(holder.id);
    feed_service::stage(
        batch,
        FeedEvent::Snake {
            subject: holder.into(),
            cause,
        },
    );
    Ok(previous)
}

pub(crate) fn announce_snake(state: &SharedState, previous: Option<Uuid>, holder: Uuid) {
    sse_events::broadcast_snake_transferred(state, previous, holder);
    info!(holder = %holder, previous = ?previous, "snake transferred");
}

/// Register a player. The first member of a team becomes its captain, and
/// every player starts with one power-up of each kind.
pub async fn create_user(
    state: &SharedState,
    request: CreateUserRequest,
) -> Result<CreatedResponse, ServiceError> {
    let store = state.require_store().await?;
    state
        .run_mutation("create_user", || async {
            let team = team_service::load_team(&store, request.team_id).await?;
            let captain = store.list_team_members(team.id).await?.is_empty();

            let user = UserEntity {
                id: Uuid::new_v4(),
                name: request.name.trim().to_owned(),
                handicap: request.handicap,
                team_id: team.id,
                avatar_url: request.avatar_url.clone(),
                role: if captain { Role::Captain } else { Role::Player },
                created_at: SystemTime::now(),
            };
            let mut batch = WriteBatch::new();
            batch.users.push(user.clone());
            batch.powerups.extend(PowerupKind::ALL.into_iter().map(|kind| PowerupEntity {
                id: Uuid::new_v4(),
                user_id: user.id,
                kind,
                status: PowerupStatus::Available,
                used_at: None,
                target_team_id: None,
            }));
            let subject = Subject::from(&user);
            feed_service::stage(
                &mut batch,
                FeedEvent::player_joined(&subject, &team.name, captain),
            );
            writes::commit(state, &store, batch).await?;
            info!(user_id = %user.id, team_id = %team.id, captain, "player registered");

            Ok(CreatedResponse { id: user.id })
        })
        .await
}

/// User with their team resolved.
pub async fn get_user(state: &SharedState, user_id: Uuid) -> Result<UserWithTeam, ServiceError> {
    let store = state.require_store().await?;
    let user = load_user(&store, user_id).await?;
    let team = store.find_team(user.team_id).await?;
    let snake_holder = store.snake_holder().await?;

    Ok(UserWithTeam {
        user: UserResponse::new(user, snake_holder),
        team: team.map(Into::into),
    })
}

pub async fn get_team_members(
    state: &SharedState,
    team_id: Uuid,
) -> Result<Vec<UserResponse>, ServiceError> {
    let store = state.require_store().await?;
    let snake_holder = store.snake_holder().await?;
    let members = store.list_team_members(team_id).await?;
    Ok(members
        .into_iter()
        .map(|member| UserResponse::new(member, snake_holder))
        .collect())
}

pub async fn update_avatar(
    state: &SharedState,
    user_id: Uuid,
    avatar_url: String,
) -> Result<UserResponse, ServiceError> {
    let store = state.require_store().await?;
    state
        .run_mutation("update_avatar", || async {
            let mut user = load_user(&store, user_id).await?;
            user.avatar_url = Some(avatar_url);
            let mut batch = WriteBatch::new();
            batch.users.push(user.clone());
            writes::commit(state, &store, batch).await?;
            let snake_holder = store.snake_holder().await?;
            Ok(UserResponse::new(user, snake_holder))
        })
        .await
}

/// Current snake holder with their team, empty until someone three-putts.
pub async fn get_snake_holder(state: &SharedState) -> Result<SnakeHolderResponse, ServiceError> {
    let store = state.require_store().await?;
    let Some(holder_id) = store.snake_holder().await? else {
        return Ok(SnakeHolderResponse {
            holder: None,
            team: None,
        });
    };

    // A dangling holder (user removed from storage) reads as nobody.
    let Some(holder) = store.find_user(holder_id).await? else {
        return Ok(SnakeHolderResponse {
            holder: None,
            team: None,
        });
    };
    let team = store.find_team(holder.team_id).await?;

    Ok(SnakeHolderResponse {
        holder: Some(UserResponse::new(holder, Some(holder_id))),
        team: team.map(Into::into),
    })
}

/// Organizer override: hand the snake to `new_holder_id`.
pub async fn transfer_snake(
    state: &SharedState,
    new_holder_id: Uuid,
) -> Result<SnakeTransferResponse, ServiceError> {
    let store = state.require_store().await?;
    state
        .run_mutation("transfer_snake", || async {
            let holder = load_user(&store, new_holder_id).await?;
            let mut batch = WriteBatch::new();
            let previous = stage_snake(&store, &mut batch, &holder, SnakeCause::Transfer).await?;
            writes::commit(state, &store, batch).await?;
            announce_snake(state, previous, holder.id);
            Ok(SnakeTransferResponse {
                previous_holder_id: previous,
                new_holder: UserResponse::new(holder, Some(new_holder_id)),
            })
        })
        .await
}

/// Promote `user_id` to captain. Only a captain of the same team may do it.
pub async fn promote_to_captain(
    state: &SharedState,
    user_id: Uuid,
    promoted_by: Uuid,
) -> Result<UserResponse, ServiceError> {
    let store = state.require_store().await?;
    state
        .run_mutation("promote_to_captain", || async {
            let promoter = load_user(&store, promoted_by).await?;
            let mut user = load_user(&store, user_id).await?;

            if promoter.role != Role::Captain {
                return Err(ServiceError::Forbidden(
                    "only captains can promote players".into(),
                ));
            }
            if promoter.team_id != user.team_id {
                return Err(ServiceError::Forbidden(
                    "captains can only promote members of their own team".into(),
                ));
            }

            user.role = Role::Captain;
            let mut batch = WriteBatch::new();
            batch.users.push(user.clone());
            writes::commit(state, &store, batch).await?;
            info!(user_id = %user.id, promoted_by = %promoter.id, "player promoted to captain");
            let snake_holder = store.snake_holder().await?;
            Ok(UserResponse::new(user, snake_holder))
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::AppConfig,
        dao::golf_store::{MemoryGolfStore, flaky::FlakyFeedStore},
        dto::team::CreateTeamRequest,
        state::AppState,
    };

    async fn state() -> SharedState {
        AppState::with_store(AppConfig::default(), Arc::new(MemoryGolfStore::new())).await
    }

    async fn team(state: &SharedState, name: &str) -> Uuid {
        team_service::create_team(
            state,
            CreateTeamRequest {
                name: name.into(),
                color: "#abcdef".into(),
            },
        )
        .await
        .unwrap()
        .id
    }

    async fn join(state: &SharedState, team_id: Uuid, name: &str) -> Uuid {
        create_user(
            state,
            CreateUserRequest {
                name: name.into(),
                handicap: 12,
                team_id,
                avatar_url: None,
            },
        )
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn first_member_becomes_captain_with_powerups() {
        let state = state().await;
        let team_id = team(&state, "Sand Trappers").await;
        let captain = join(&state, team_id, "Ada").await;
        let player = join(&state, team_id, "Bob").await;

        let captain = get_user(&state, captain).await.unwrap();
        assert_eq!(captain.user.role, Role::Captain);
        assert_eq!(captain.team.map(|team| team.id), Some(team_id));
        assert_eq!(get_user(&state, player).await.unwrap().user.role, Role::Player);

        let store = state.store().await.unwrap();
        let powerups = store
            .list_user_powerups(player, Some(PowerupStatus::Available))
            .await
            .unwrap();
        assert_eq!(powerups.len(), PowerupKind::ALL.len());
    }

    #[tokio::test]
    async fn joining_an_unknown_team_fails() {
        let state = state().await;
        let err = create_user(
            &state,
            CreateUserRequest {
                name: "Ghost".into(),
                handicap: 0,
                team_id: Uuid::new_v4(),
                avatar_url: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn only_captains_of_the_same_team_promote() {
        let state = state().await;
        let home = team(&state, "Home").await;
        let away = team(&state, "Away").await;
        let home_captain = join(&state, home, "Cap").await;
        let home_player = join(&state, home, "Pat").await;
        let away_captain = join(&state, away, "Rival").await;

        let err = promote_to_captain(&state, home_captain, home_player)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
        let err = promote_to_captain(&state, home_player, away_captain)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        let promoted = promote_to_captain(&state, home_player, home_captain)
            .await
            .unwrap();
        assert_eq!(promoted.role, Role::Captain);
    }

    #[tokio::test]
    async fn snake_has_a_single_holder() {
        let state = state().await;
        let team_id = team(&state, "Putters").await;
        let first = join(&state, team_id, "One").await;
        let second = join(&state, team_id, "Two").await;

        assert!(get_snake_holder(&state).await.unwrap().holder.is_none());

        let transfer = transfer_snake(&state, first).await.unwrap();
        assert_eq!(transfer.previous_holder_id, None);
        let transfer = transfer_snake(&state, second).await.unwrap();
        assert_eq!(transfer.previous_holder_id, Some(first));

        let members = get_team_members(&state, team_id).await.unwrap();
        let holders: Vec<_> = members.iter().filter(|member| member.has_snake).collect();
        assert_eq!(holders.len(), 1);
        assert_eq!(holders[0].id, second);
    }

    #[tokio::test]
    async fn avatar_can_be_replaced() {
        let state = state().await;
        let team_id = team(&state, "Pixels").await;
        let user = join(&state, team_id, "Pic").await;

        let updated = update_avatar(&state, user, "https://cdn.example.com/pic.png".into())
            .await
            .unwrap();
        assert_eq!(
            updated.avatar_url.as_deref(),
            Some("https://cdn.example.com/pic.png")
        );
    }

    #[tokio::test]
    async fn failed_commit_leaves_no_half_registered_player() {
        let store = FlakyFeedStore::new();
        let state = AppState::with_store(AppConfig::default(), Arc::new(store.clone())).await;
        let team_id = team(&state, "Halfway House").await;
        let holder = join(&state, team_id, "Holder").await;
        let second = join(&state, team_id, "Second").await;
        transfer_snake(&state, holder).await.unwrap();

        store.fail_feed_writes(true);
        let err = create_user(
            &state,
            CreateUserRequest {
                name: "Phantom".into(),
                handicap: 3,
                team_id,
                avatar_url: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::Unavailable(_)));
        assert_eq!(get_team_members(&state, team_id).await.unwrap().len(), 2);
        assert_eq!(
            store.list_powerups().await.unwrap().len(),
            2 * PowerupKind::ALL.len()
        );

        let err = transfer_snake(&state, second).await.unwrap_err();
        assert!(matches!(err, ServiceError::Unavailable(_)));
        let current = get_snake_holder(&state).await.unwrap().holder;
        assert_eq!(current.map(|user| user.id), Some(holder));

        store.fail_feed_writes(false);
        let late = join(&state, team_id, "Phantom").await;
        assert_eq!(get_user(&state, late).await.unwrap().user.role, Role::Player);
    }
}
