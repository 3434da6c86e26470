//! The commit every mutation ends with.

use std::sync::Arc;

use tracing::debug;

use crate::{
    dao::{
        golf_store::{GolfStore, WriteBatch},
        storage::StorageError,
    },
    error::ServiceError,
    services::sse_events,
    state::SharedState,
};

/// Apply `batch` in a single storage commit, then announce its feed items.
///
/// The commit runs on its own task: when the write gate times out the
/// mutation, the batch still lands whole or not at all.
pub(crate) async fn commit(
    state: &SharedState,
    store: &Arc<dyn GolfStore>,
    batch: WriteBatch,
) -> Result<(), ServiceError> {
    if batch.is_empty() {
        return Ok(());
    }

    let feed_items = batch.feed_items.clone();
    let committed = tokio::spawn(store.commit(batch))
        .await
        .map_err(|err| StorageError::unavailable("commit task aborted".into(), err))?;
    committed?;

    for item in &feed_items {
        debug!(kind = item.kind.as_str(), id = %item.id, "feed item published");
        sse_events::broadcast_feed_item(state, item);
    }
    Ok(())
}
