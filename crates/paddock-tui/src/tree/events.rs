use std::sync::Arc;

use paddock_proto::dto::Season;
use tracing::debug;

use super::fanout::fan_out;
use super::{BuildContext, BuildError, ContentNode, InSubtree, Payload};

/// One node per season of full race weekends.
pub async fn build_season_nodes(ctx: &BuildContext) -> Result<Vec<ContentNode>, BuildError> {
    debug!("loading seasons");
    let seasons = ctx.api.fetch_seasons().await.in_subtree(|| "seasons")?;
    Ok(seasons
        .seasons
        .into_iter()
        .map(|s| ContentNode::new(s.name.clone(), Payload::Season(s)))
        .collect())
}

/// Events of a season that have at least one session, in season order.
pub async fn build_event_nodes(
    ctx: &BuildContext,
    season: &Season,
) -> Result<Vec<ContentNode>, BuildError> {
    let api = Arc::clone(&ctx.api);
    let season_name = season.name.clone();
    let slots = fan_out(Some(ctx.permits()), season.event_ids.clone(), move |id| {
        let api = Arc::clone(&api);
        let context = format!("events for {}: event {}", season_name, id);
        async move {
            debug!("loading event {}", id);
            let event = api.fetch_event(&id).await.in_subtree(|| context)?;
            if event.session_ids.is_empty() {
                return Ok(None);
            }
            Ok(Some(ContentNode::new(event.official_name.clone(), Payload::Event(event))))
        }
    })
    .await?;

    Ok(slots.into_iter().flatten().collect())
}

/// One node per archive category. Episodes are fetched when a category is
/// expanded.
pub async fn build_archive_nodes(ctx: &BuildContext) -> Result<Vec<ContentNode>, BuildError> {
    debug!("loading archive categories");
    let list = ctx
        .api
        .fetch_vod_types()
        .await
        .in_subtree(|| "archive categories")?;
    Ok(list
        .vod_types
        .into_iter()
        .filter(|v| !v.content_ids.is_empty())
        .map(|v| ContentNode::new(v.name.clone(), Payload::Archive(v)))
        .collect())
}
