use paddock_proto::api::EVENT_OCCURRENCE_PATTERN;
use tracing::{debug, info};

use super::sessions::session_node;
use super::{BuildContext, BuildError, ContentNode, InSubtree};

/// Look for a live session through the homepage feed.
///
/// The feed leads with the current event while a weekend is running; its
/// sessions are checked in order and the first live one wins. Returns the
/// ready-built session node, or `None` when nothing is on air.
pub async fn detect_live_session(ctx: &BuildContext) -> Result<Option<ContentNode>, BuildError> {
    let home = ctx.api.fetch_homepage().await.in_subtree(|| "homepage")?;
    let Some(first) = home.first_content_url() else {
        debug!("homepage feed is empty");
        return Ok(None);
    };
    if !first.contains(EVENT_OCCURRENCE_PATTERN) {
        debug!("homepage leads with {}, no live event", first);
        return Ok(None);
    }

    let event = ctx
        .api
        .fetch_event(first)
        .await
        .in_subtree(|| format!("live event {}", first))?;
    for id in &event.session_ids {
        let session = ctx
            .api
            .fetch_session(id)
            .await
            .in_subtree(|| format!("live sessions for {}", event.official_name))?;
        if !session.is_live() {
            continue;
        }
        info!("live session: {} ({})", session.name, event.official_name);
        let streams = ctx
            .api
            .fetch_streams(&session.slug)
            .await
            .in_subtree(|| format!("streams for {}", session.name))?;
        return session_node(&session, streams).await.map(Some);
    }
    Ok(None)
}
